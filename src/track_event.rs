use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    bbox::BoundingBox,
    error::{Result, TrackError},
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Lifecycle of a track.
///
///  - `Initiated`: the track was created but has not seen enough sensor updates.
///  - `Active`: the track got enough sensor updates.
///  - `Occluded`: another object covers the track. The box of the last
///    update before the occlusion is carried forward until a new sensor update.
///  - `Dead`: the track went too long without sensor updates. Terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrackerState {
    Initiated,
    Active,
    Occluded,
    Dead,
}

impl TrackerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackerState::Initiated => "INITIATED",
            TrackerState::Active => "ACTIVE",
            TrackerState::Occluded => "OCCLUDED",
            TrackerState::Dead => "DEAD",
        }
    }
}

impl fmt::Display for TrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a track at one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackEvent {
    pub bounding_box: BoundingBox,
    pub timestamp: NaiveDateTime,
    pub state: TrackerState,
    pub frame_id: i64,
    pub track_id: i64,
    pub speed: f64,
}

impl TrackEvent {
    /// Dictionary form of the event.
    ///
    /// With `raw_type` the timestamp is kept in its serde form instead of the
    /// `%Y-%m-%d_%H-%M-%S` string. `reduced` selects the compact box format.
    pub fn to_value(&self, raw_type: bool, reduced: bool) -> Result<Value> {
        let timestamp = if raw_type {
            serde_json::to_value(self.timestamp)?
        } else {
            Value::String(self.timestamp.format(TIMESTAMP_FORMAT).to_string())
        };

        Ok(json!({
            "bounding_box": self.bounding_box.to_value(reduced)?,
            "timestamp": timestamp,
            "state": self.state.as_str(),
            "frame_id": self.frame_id,
            "track_id": self.track_id,
            "speed": self.speed,
        }))
    }

    /// Inverse of [`TrackEvent::to_value`] with `raw_type = false`.
    pub fn from_value(value: &Value, reduced: bool) -> Result<Self> {
        let timestamp = value["timestamp"]
            .as_str()
            .and_then(|ts| NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).ok())
            .ok_or_else(|| TrackError::InvalidField {
                field: "timestamp",
                value: value["timestamp"].to_string(),
            })?;

        Ok(Self {
            bounding_box: BoundingBox::from_value(&value["bounding_box"], reduced)?,
            timestamp,
            state: TrackerState::deserialize(&value["state"])?,
            frame_id: int_field(value, "frame_id")?,
            track_id: int_field(value, "track_id")?,
            speed: value["speed"]
                .as_f64()
                .ok_or_else(|| TrackError::InvalidField {
                    field: "speed",
                    value: value["speed"].to_string(),
                })?,
        })
    }
}

fn int_field(value: &Value, field: &'static str) -> Result<i64> {
    value[field].as_i64().ok_or_else(|| TrackError::InvalidField {
        field,
        value: value[field].to_string(),
    })
}

impl fmt::Display for TrackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.bounding_box.bbox;
        write!(
            f,
            "TrackEvent - timestamp: {} state: {} frame_id: {} track_id: {} speed: {} \
             bounding_box: [{}, {}, {}, {}] class_id: {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.state,
            self.frame_id,
            self.track_id,
            self.speed,
            b.x_1,
            b.y_1,
            b.x_2,
            b.y_2,
            self.bounding_box.class_id(),
        )
    }
}

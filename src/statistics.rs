use std::collections::BTreeMap;

use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

use crate::{config::TrackerConfig, track::Track};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeInfo {
    pub max: f64,
    pub min: f64,
    pub avg: f64,
}

impl RangeInfo {
    fn from_values(values: impl Iterator<Item = f64> + Clone) -> Option<Self> {
        let (min, max) = match values.clone().minmax_by(f64::total_cmp) {
            MinMaxResult::NoElements => return None,
            MinMaxResult::OneElement(value) => (value, value),
            MinMaxResult::MinMax(min, max) => (min, max),
        };
        let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

        Some(Self {
            max,
            min,
            avg: sum / count as f64,
        })
    }
}

/// Speed and box size ranges over the whole history of a track.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackStatistics {
    pub speed: RangeInfo,
    pub width: RangeInfo,
    pub height: RangeInfo,
}

impl TrackStatistics {
    /// Frames without movement are left out of the speed range. Returns
    /// `None` for a track that never moved.
    pub fn from_track(track: &Track) -> Option<Self> {
        let events = track.track_events().values();

        Some(Self {
            speed: RangeInfo::from_values(
                events
                    .clone()
                    .map(|event| event.speed)
                    .filter(|&speed| speed > 0.0),
            )?,
            width: RangeInfo::from_values(
                events.clone().map(|event| event.bounding_box.bbox.width()),
            )?,
            height: RangeInfo::from_values(events.map(|event| event.bounding_box.bbox.height()))?,
        })
    }
}

pub fn compute_track_statistics<'a>(
    tracks: impl IntoIterator<Item = &'a Track>,
) -> BTreeMap<i64, TrackStatistics> {
    tracks
        .into_iter()
        .filter_map(|track| Some((track.track_id(), TrackStatistics::from_track(track)?)))
        .collect()
}

pub fn valid_tracks(tracks: &[Track]) -> impl Iterator<Item = &Track> {
    tracks.iter().filter(|track| track.is_valid())
}

pub fn active_tracks(tracks: &[Track]) -> impl Iterator<Item = &Track> {
    tracks.iter().filter(|track| track.is_active())
}

pub fn alive_tracks(tracks: &[Track]) -> impl Iterator<Item = &Track> {
    tracks.iter().filter(|track| track.is_alive())
}

/// Drops dead tracks unless the config asks to keep them.
pub fn retain_alive(tracks: &mut Vec<Track>, config: &TrackerConfig) {
    if !config.keep_dead_tracks {
        tracks.retain(Track::is_alive);
    }
}

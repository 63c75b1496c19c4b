use std::{collections::BTreeMap, fmt, sync::Arc};

use chrono::{Local, NaiveDateTime, TimeDelta};
use nalgebra::DVector;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::{
    bbox::{BoundingBox, ClassIdentifier, compute_iou, euclidean_distance},
    config::TrackerConfig,
    error::{Result, TrackError},
    kalman::CenterKalmanFilter,
    track_event::{TrackEvent, TrackerState},
};

/// Appearance signature of a track, e.g. a flattened color histogram.
pub type ColorHistogram = DVector<f64>;

/// A single object followed over time by its bounding box.
///
/// Owns a Kalman filter over the box center, the lifecycle state and one
/// [`TrackEvent`] per processed frame. Per frame the caller must invoke
/// [`Track::predict`] exactly once and may follow it with one
/// [`Track::update`]. Frame ids in the history have no gaps as long as this
/// order is kept; calling `predict` twice for the same frame advances the
/// frame counter twice.
#[derive(Debug)]
pub struct Track {
    config: Arc<TrackerConfig>,
    track_id: i64,
    class_identifier: ClassIdentifier,
    meta_info: Option<Map<String, Value>>,
    start_frame_id: i64,

    current_state: TrackerState,
    // Set once the track reaches `Active` and never cleared.
    was_active: bool,
    current_color_hist: Option<ColorHistogram>,
    current_frame_id: i64,
    // Pixels travelled between the two latest frames.
    current_speed: f64,
    current_bounding_box: BoundingBox,

    track_events: BTreeMap<i64, TrackEvent>,
    // Construction counts as the first sensor update.
    sensor_updates: BTreeMap<i64, BoundingBox>,
    kalman_filter: CenterKalmanFilter,
}

impl Track {
    pub fn new(
        config: Arc<TrackerConfig>,
        track_id: i64,
        initial_frame_id: i64,
        initial_bbox: &BoundingBox,
        initial_color_hist: Option<ColorHistogram>,
        meta_info: Option<Map<String, Value>>,
    ) -> Self {
        let (current_state, was_active) = if config.min_detections_active == 0 {
            (TrackerState::Active, true)
        } else {
            (TrackerState::Initiated, false)
        };

        let kalman_filter =
            CenterKalmanFilter::new(&config.kalman_filter_config, &initial_bbox.bbox);

        let initial_event = TrackEvent {
            bounding_box: initial_bbox.clone(),
            timestamp: Local::now().naive_local(),
            state: current_state,
            frame_id: initial_frame_id,
            track_id,
            speed: 0.0,
        };

        debug!(
            track_id,
            frame_id = initial_frame_id,
            class_id = initial_bbox.class_id(),
            state = %current_state,
            "track created"
        );

        Self {
            config,
            track_id,
            class_identifier: initial_bbox.class_identifier.clone(),
            meta_info,
            start_frame_id: initial_frame_id,
            current_state,
            was_active,
            current_color_hist: initial_color_hist,
            current_frame_id: initial_frame_id,
            current_speed: 0.0,
            current_bounding_box: initial_bbox.clone(),
            track_events: BTreeMap::from([(initial_frame_id, initial_event)]),
            sensor_updates: BTreeMap::from([(initial_frame_id, initial_bbox.clone())]),
            kalman_filter,
        }
    }

    /// Advances the track by one frame.
    ///
    /// Runs the filter prediction, kills the track when it has gone more than
    /// `max_age` frames without a sensor update and marks an active track as
    /// occluded when its box overlaps any of `occlusion_bounding_boxes`. Has
    /// no effect on a dead track.
    pub fn predict(&mut self, occlusion_bounding_boxes: Option<&[BoundingBox]>) {
        if self.current_state == TrackerState::Dead {
            return;
        }

        let age = self.current_frame_id - self.last_sensor_update_frame_id();
        if age > self.config.max_age {
            self.die();
            return;
        }

        self.current_frame_id += 1;
        self.kalman_filter.predict();

        self.update_current_bounding_box();

        if self.current_state == TrackerState::Active {
            if let Some(occluder) = occlusion_bounding_boxes.and_then(|boxes| {
                boxes.iter().find(|occluder| {
                    compute_iou(&occluder.bbox, &self.current_bounding_box.bbox) > 0.0
                })
            }) {
                debug!(
                    track_id = self.track_id,
                    frame_id = self.current_frame_id,
                    occluder_class_id = occluder.class_id(),
                    "track occluded"
                );
                self.current_state = TrackerState::Occluded;
            }
        }

        trace!(
            track_id = self.track_id,
            frame_id = self.current_frame_id,
            age,
            "predicted"
        );

        self.update_speed_and_track_event();
    }

    /// Feeds a detection for the current frame into the track.
    ///
    /// Must follow this frame's [`Track::predict`] and refines the event that
    /// call recorded. Has no effect on a dead track.
    pub fn update(&mut self, bounding_box: &BoundingBox) {
        if self.current_state == TrackerState::Dead {
            return;
        }

        if self.current_state == TrackerState::Occluded {
            debug!(
                track_id = self.track_id,
                frame_id = self.current_frame_id,
                "track visible again"
            );
            self.current_state = TrackerState::Active;
        }

        self.sensor_updates
            .insert(self.current_frame_id, bounding_box.clone());
        self.kalman_filter.update(bounding_box.center());

        if self.current_state == TrackerState::Initiated
            && self.sensor_updates.len() >= self.config.min_detections_active as usize
        {
            debug!(
                track_id = self.track_id,
                frame_id = self.current_frame_id,
                sensor_updates = self.sensor_updates.len(),
                "track activated"
            );
            self.current_state = TrackerState::Active;
            self.was_active = true;
        }

        self.update_current_bounding_box();
        self.update_speed_and_track_event();

        trace!(
            track_id = self.track_id,
            frame_id = self.current_frame_id,
            speed = self.current_speed,
            "updated"
        );
    }

    fn die(&mut self) {
        self.current_state = TrackerState::Dead;
        if let Some(mut latest) = self.track_events.last_entry() {
            latest.get_mut().state = TrackerState::Dead;
        }

        debug!(
            track_id = self.track_id,
            frame_id = self.current_frame_id,
            last_sensor_update = self.last_sensor_update_frame_id(),
            was_active = self.was_active,
            "track died"
        );
    }

    /// Uses the raw detections for the first `kalman_delay` sensor updates,
    /// the filter needs some of them before its velocity is usable.
    fn update_current_bounding_box(&mut self) {
        if self.config.kalman_filter_config.kalman_delay as usize >= self.sensor_updates.len() {
            if let Some(latest) = self.sensor_updates.values().next_back() {
                self.current_bounding_box = latest.clone();
            }
        } else {
            let (cx, cy) = self.kalman_filter.center();
            self.current_bounding_box.bbox.new_center(cx.trunc(), cy.trunc());
        }
    }

    fn update_speed_and_track_event(&mut self) {
        if self.track_events.len() >= 2 {
            if let Some(previous) = self.track_events.get(&(self.current_frame_id - 1)) {
                self.current_speed = euclidean_distance(
                    &self.current_bounding_box.bbox,
                    &previous.bounding_box.bbox,
                );
            }
        }

        self.track_events.insert(
            self.current_frame_id,
            TrackEvent {
                bounding_box: self.current_bounding_box.clone(),
                timestamp: Local::now().naive_local(),
                state: self.current_state,
                frame_id: self.current_frame_id,
                track_id: self.track_id,
                speed: self.current_speed,
            },
        );
    }

    /// Smooths the stored histogram exponentially with `color_filter_alpha`.
    ///
    /// Without a stored histogram, or with `alpha >= 1`, the given one
    /// replaces it, `None` included.
    pub fn set_color_histogram(&mut self, color_hist: Option<ColorHistogram>) -> Result<()> {
        let alpha = self
            .config
            .assignment_cost_config
            .color_cost
            .color_filter_alpha;

        if alpha < 1.0 {
            if let (Some(current), Some(new)) =
                (self.current_color_hist.as_mut(), color_hist.as_ref())
            {
                if current.len() != new.len() {
                    return Err(TrackError::HistogramShape {
                        expected: current.len(),
                        found: new.len(),
                    });
                }
                *current = current.scale(1.0 - alpha) + new.scale(alpha);
                return Ok(());
            }
        }

        self.current_color_hist = color_hist;
        Ok(())
    }

    /// A track is valid once it was active for at least one frame.
    pub fn is_valid(&self) -> bool {
        self.was_active
    }

    pub fn is_alive(&self) -> bool {
        self.current_state != TrackerState::Dead
    }

    /// Occluded tracks still count as active.
    pub fn is_active(&self) -> bool {
        matches!(
            self.current_state,
            TrackerState::Active | TrackerState::Occluded
        )
    }

    pub fn last_sensor_update_frame_id(&self) -> i64 {
        *self
            .sensor_updates
            .keys()
            .next_back()
            .expect("construction always records a sensor update")
    }

    /// Radius around the current position in which the object can be found
    /// again, assuming it kept moving at the configured worst-case speed of
    /// its class since the last sensor update.
    pub fn get_redetect_radius(&self) -> Result<f64> {
        let speed_model = self.config.speed_model(self.class_identifier.class_id)?;

        Ok(speed_model.radius(self.current_frame_id - self.last_sensor_update_frame_id()))
    }

    pub fn get_latest_track_event(&self) -> &TrackEvent {
        self.track_events
            .values()
            .next_back()
            .expect("construction always records a track event")
    }

    pub fn get_current_bounding_box(&self) -> &BoundingBox {
        &self.current_bounding_box
    }

    pub fn get_start_time(&self) -> NaiveDateTime {
        self.track_events
            .get(&self.start_frame_id)
            .map(|event| event.timestamp)
            .unwrap_or_else(|| self.get_latest_track_event().timestamp)
    }

    pub fn get_alive_time(&self) -> TimeDelta {
        Local::now().naive_local() - self.get_start_time()
    }

    /// Timestamp of the latest event once the track is no longer active.
    pub fn get_stop_time(&self) -> Option<NaiveDateTime> {
        if self.is_active() {
            return None;
        }

        Some(self.get_latest_track_event().timestamp)
    }

    pub fn track_id(&self) -> i64 {
        self.track_id
    }

    pub fn class_identifier(&self) -> &ClassIdentifier {
        &self.class_identifier
    }

    pub fn start_frame_id(&self) -> i64 {
        self.start_frame_id
    }

    pub fn current_frame_id(&self) -> i64 {
        self.current_frame_id
    }

    pub fn current_state(&self) -> TrackerState {
        self.current_state
    }

    pub fn current_speed(&self) -> f64 {
        self.current_speed
    }

    pub fn current_color_hist(&self) -> Option<&ColorHistogram> {
        self.current_color_hist.as_ref()
    }

    pub fn track_events(&self) -> &BTreeMap<i64, TrackEvent> {
        &self.track_events
    }

    pub fn sensor_updates(&self) -> &BTreeMap<i64, BoundingBox> {
        &self.sensor_updates
    }

    pub fn kalman_center(&self) -> (f64, f64) {
        self.kalman_filter.center()
    }

    pub fn kalman_velocity(&self) -> (f64, f64) {
        self.kalman_filter.velocity()
    }

    pub fn meta_info(&self) -> Option<&Map<String, Value>> {
        self.meta_info.as_ref()
    }

    pub fn set_meta_info(&mut self, meta_info: Option<Map<String, Value>>) {
        self.meta_info = meta_info;
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Dictionary form of the event at the current frame.
    pub fn to_value(&self, raw_type: bool, reduced: bool) -> Result<Value> {
        self.track_events
            .get(&self.current_frame_id)
            .unwrap_or_else(|| self.get_latest_track_event())
            .to_value(raw_type, reduced)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_value(false, false)?)?)
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ImageTrack: class-identifier={}:{}, len: {}, latest_track_event: {}",
            self.class_identifier.class_id,
            self.class_identifier.class_name,
            self.track_events.len(),
            self.get_latest_track_event()
        )
    }
}

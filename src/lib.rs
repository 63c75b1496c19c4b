//! Per-object tracking core: a Kalman filter over the box center, a
//! lifecycle state machine and a gap-free per-frame history for every
//! tracked object. Matching detections to tracks is left to the caller,
//! which calls [`Track::predict`] on every live track once per frame and
//! [`Track::update`] on the tracks it matched.

mod bbox;
mod config;
mod error;
mod kalman;
mod statistics;
mod track;
mod track_event;

#[cfg(feature = "python")]
mod python_api;

pub use bbox::{BBox, BoundingBox, ClassIdentifier, compute_iou, euclidean_distance};
pub use config::{
    AssignmentCostConfig, ColorCostConfig, DistanceCostConfig, KalmanFilterConfig,
    ObjectSpeedConfig, TrackerConfig,
};
pub use error::{ConfigError, Result, TrackError};
pub use kalman::CenterKalmanFilter;
pub use statistics::{
    RangeInfo, TrackStatistics, active_tracks, alive_tracks, compute_track_statistics,
    retain_alive, valid_tracks,
};
pub use track::{ColorHistogram, Track};
pub use track_event::{TrackEvent, TrackerState};

#[cfg(feature = "python")]
use pyo3::{
    Bound, PyResult, pymodule,
    types::{PyModule, PyModuleMethods},
};

#[cfg(feature = "python")]
use crate::python_api::{PyBBox, PyBoundingBox, PyImageTrack, PyTrackerConfig};

#[cfg(feature = "python")]
#[pymodule]
fn image_track(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyBBox>()?;
    m.add_class::<PyBoundingBox>()?;
    m.add_class::<PyTrackerConfig>()?;
    m.add_class::<PyImageTrack>()?;

    Ok(())
}

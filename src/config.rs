use std::{collections::BTreeMap, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result, TrackError};

/// Settings shared by every track of a tracker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Number of frames a track survives without a sensor update.
    pub max_age: i64,
    /// Sensor updates needed before a track becomes active. Zero means
    /// tracks are born active.
    pub min_detections_active: u32,
    pub keep_dead_tracks: bool,
    pub kalman_filter_config: KalmanFilterConfig,
    pub assignment_cost_config: AssignmentCostConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_age: 20,
            min_detections_active: 5,
            keep_dead_tracks: false,
            kalman_filter_config: KalmanFilterConfig::default(),
            assignment_cost_config: AssignmentCostConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KalmanFilterConfig {
    /// Measurement noise, used on both diagonal entries of `R`.
    #[serde(rename = "R")]
    pub r: f64,
    /// Initial state covariance, scales the identity.
    #[serde(rename = "P")]
    pub p: f64,
    /// Number of sensor updates during which raw detections are used as
    /// position instead of the filter estimate.
    pub kalman_delay: u32,
    /// Scales the identity used as process noise `Q`.
    pub process_noise: f64,
}

impl Default for KalmanFilterConfig {
    fn default() -> Self {
        Self {
            r: 1000.0,
            p: 10.0,
            kalman_delay: 10,
            process_noise: 1.0,
        }
    }
}

/// Costs of the detection to track assignment. Only `obj_speed` and
/// `color_filter_alpha` are read here, the other fields are carried so that
/// configs of a complete tracker load unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentCostConfig {
    pub iou_weight: f64,
    pub assignment_threshold: f64,
    pub distance_cost: DistanceCostConfig,
    pub color_cost: ColorCostConfig,
}

impl Default for AssignmentCostConfig {
    fn default() -> Self {
        Self {
            iou_weight: 1.0,
            assignment_threshold: 1.5,
            distance_cost: DistanceCostConfig::default(),
            color_cost: ColorCostConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceCostConfig {
    pub weight: f64,
    /// Linear speed model per class id.
    pub obj_speed: BTreeMap<u32, ObjectSpeedConfig>,
}

impl Default for DistanceCostConfig {
    fn default() -> Self {
        Self {
            weight: 1.0,
            obj_speed: BTreeMap::new(),
        }
    }
}

/// Worst case displacement `s = x * frames + b` of an undetected object.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpeedConfig {
    pub x: f64,
    pub b: f64,
}

impl ObjectSpeedConfig {
    pub fn radius(&self, frames: i64) -> f64 {
        frames as f64 * self.x + self.b
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorCostConfig {
    pub weight: f64,
    pub margin_x: f64,
    pub margin_y: f64,
    /// Smoothing factor for color histograms, 1.0 disables smoothing.
    pub color_filter_alpha: f64,
}

impl Default for ColorCostConfig {
    fn default() -> Self {
        Self {
            weight: 0.0,
            margin_x: 0.0,
            margin_y: 0.0,
            color_filter_alpha: 1.0,
        }
    }
}

impl TrackerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json_str(&content)
    }

    pub fn speed_model(&self, class_id: u32) -> Result<&ObjectSpeedConfig> {
        self.assignment_cost_config
            .distance_cost
            .obj_speed
            .get(&class_id)
            .ok_or(TrackError::MissingSpeedModel { class_id })
    }

    /// Checks value ranges and that every class in `class_ids` has a speed model.
    pub fn validate(&self, class_ids: impl IntoIterator<Item = u32>) -> Result<(), ConfigError> {
        if self.max_age < 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_age",
                reason: format!("must not be negative, got {}", self.max_age),
            });
        }

        let kalman_filter_config = &self.kalman_filter_config;
        if kalman_filter_config.r <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "kalman_filter_config.R",
                reason: format!("must be positive, got {}", kalman_filter_config.r),
            });
        }
        if kalman_filter_config.p <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "kalman_filter_config.P",
                reason: format!("must be positive, got {}", kalman_filter_config.p),
            });
        }
        if kalman_filter_config.process_noise < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "kalman_filter_config.process_noise",
                reason: format!(
                    "must not be negative, got {}",
                    kalman_filter_config.process_noise
                ),
            });
        }

        let alpha = self.assignment_cost_config.color_cost.color_filter_alpha;
        if !(0.0..=1.0).contains(&alpha) {
            return Err(ConfigError::InvalidValue {
                field: "assignment_cost_config.color_cost.color_filter_alpha",
                reason: format!("must be within [0, 1], got {alpha}"),
            });
        }

        for class_id in class_ids {
            if self.speed_model(class_id).is_err() {
                return Err(ConfigError::MissingSpeedModel { class_id });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config = TrackerConfig::from_json_str(
            r#"{
                "max_age": 3,
                "kalman_filter_config": {"R": 5.0, "P": 2.0},
                "assignment_cost_config": {
                    "distance_cost": {"obj_speed": {"0": {"x": 4.0, "b": 10.0}}}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.max_age, 3);
        assert_eq!(config.min_detections_active, 5);
        assert_eq!(config.kalman_filter_config.r, 5.0);
        assert_eq!(config.kalman_filter_config.p, 2.0);
        assert_eq!(config.kalman_filter_config.kalman_delay, 10);
        assert_eq!(config.kalman_filter_config.process_noise, 1.0);
        assert_eq!(
            config.speed_model(0).unwrap(),
            &ObjectSpeedConfig { x: 4.0, b: 10.0 }
        );
    }

    #[test]
    fn test_assignment_fields_of_full_tracker_config_are_accepted() {
        let config = TrackerConfig::from_json_str(
            r#"{
                "keep_dead_tracks": true,
                "assignment_cost_config": {
                    "iou_weight": 0.5,
                    "assignment_threshold": 0.9,
                    "distance_cost": {"weight": 2.0, "obj_speed": {}},
                    "color_cost": {
                        "weight": 0.3,
                        "margin_x": 0.1,
                        "margin_y": 0.2,
                        "color_filter_alpha": 0.4
                    }
                }
            }"#,
        )
        .unwrap();

        let assignment = &config.assignment_cost_config;
        assert!(config.keep_dead_tracks);
        assert_eq!(assignment.iou_weight, 0.5);
        assert_eq!(assignment.assignment_threshold, 0.9);
        assert_eq!(assignment.distance_cost.weight, 2.0);
        assert_eq!(assignment.color_cost.margin_y, 0.2);
        assert_eq!(assignment.color_cost.color_filter_alpha, 0.4);
        assert!(config.validate([]).is_ok());
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        assert!(matches!(
            TrackerConfig::from_json_str("{\"max_age\": \"old\"}"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        assert!(matches!(
            TrackerConfig::from_path("/nonexistent/tracker.json"),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_unconfigured_class() {
        let mut config = TrackerConfig::default();
        config
            .assignment_cost_config
            .distance_cost
            .obj_speed
            .insert(1, ObjectSpeedConfig { x: 1.0, b: 0.0 });

        assert!(config.validate([1]).is_ok());
        assert!(matches!(
            config.validate([1, 2]),
            Err(ConfigError::MissingSpeedModel { class_id: 2 })
        ));
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let mut config = TrackerConfig::default();
        config.assignment_cost_config.color_cost.color_filter_alpha = 1.5;
        assert!(matches!(
            config.validate([]),
            Err(ConfigError::InvalidValue { .. })
        ));

        let mut config = TrackerConfig::default();
        config.kalman_filter_config.r = 0.0;
        assert!(matches!(
            config.validate([]),
            Err(ConfigError::InvalidValue { field: "kalman_filter_config.R", .. })
        ));
    }

    #[test]
    fn test_speed_model_radius_is_linear_in_frames() {
        let speed = ObjectSpeedConfig { x: 2.5, b: 4.0 };

        assert_eq!(speed.radius(0), 4.0);
        assert_eq!(speed.radius(4), 14.0);
    }
}

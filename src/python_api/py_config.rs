use std::sync::Arc;

use pyo3::{PyResult, exceptions::PyValueError, pyclass, pymethods};

use crate::TrackerConfig;

#[pyclass(name = "TrackerConfig")]
pub struct PyTrackerConfig {
    pub inner: Arc<TrackerConfig>,
}

#[pymethods]
impl PyTrackerConfig {
    /// Builds the config from a JSON document, missing fields take their defaults.
    #[new]
    #[pyo3(signature = (json = None))]
    pub fn new(json: Option<&str>) -> PyResult<Self> {
        let config = match json {
            Some(json) => TrackerConfig::from_json_str(json)
                .map_err(|e| PyValueError::new_err(e.to_string()))?,
            None => TrackerConfig::default(),
        };

        Ok(Self {
            inner: Arc::new(config),
        })
    }

    #[staticmethod]
    pub fn from_path(path: &str) -> PyResult<Self> {
        let config =
            TrackerConfig::from_path(path).map_err(|e| PyValueError::new_err(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(config),
        })
    }

    fn validate(&self, class_ids: Vec<u32>) -> PyResult<()> {
        self.inner
            .validate(class_ids)
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    #[getter]
    fn max_age(&self) -> i64 {
        self.inner.max_age
    }

    #[getter]
    fn min_detections_active(&self) -> u32 {
        self.inner.min_detections_active
    }
}

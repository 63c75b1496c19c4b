use nalgebra::DVector;
use pyo3::{PyRef, PyResult, exceptions::PyValueError, pyclass, pymethods};

use crate::{
    BoundingBox, Track,
    python_api::{PyBoundingBox, PyTrackerConfig},
};

#[pyclass(name = "ImageTrack")]
pub struct PyImageTrack {
    inner: Track,
}

#[pymethods]
impl PyImageTrack {
    #[new]
    #[pyo3(signature = (config, track_id, initial_frame_id, initial_bbox, initial_color_hist = None))]
    pub fn new(
        config: &PyTrackerConfig,
        track_id: i64,
        initial_frame_id: i64,
        initial_bbox: &PyBoundingBox,
        initial_color_hist: Option<Vec<f64>>,
    ) -> Self {
        Self {
            inner: Track::new(
                config.inner.clone(),
                track_id,
                initial_frame_id,
                &initial_bbox.inner,
                initial_color_hist.map(DVector::from_vec),
                None,
            ),
        }
    }

    #[pyo3(signature = (occlusion_bounding_boxes = None))]
    pub fn predict(&mut self, occlusion_bounding_boxes: Option<Vec<PyRef<PyBoundingBox>>>) {
        let occluders = occlusion_bounding_boxes.map(|boxes| {
            boxes
                .iter()
                .map(|bounding_box| bounding_box.inner.clone())
                .collect::<Vec<BoundingBox>>()
        });

        self.inner.predict(occluders.as_deref());
    }

    pub fn update(&mut self, bounding_box: &PyBoundingBox) {
        self.inner.update(&bounding_box.inner);
    }

    #[pyo3(signature = (color_hist = None))]
    fn set_color_histogram(&mut self, color_hist: Option<Vec<f64>>) -> PyResult<()> {
        self.inner
            .set_color_histogram(color_hist.map(DVector::from_vec))
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn is_valid(&self) -> bool {
        self.inner.is_valid()
    }

    fn is_alive(&self) -> bool {
        self.inner.is_alive()
    }

    fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    fn last_sensor_update_frame_id(&self) -> i64 {
        self.inner.last_sensor_update_frame_id()
    }

    fn get_redetect_radius(&self) -> PyResult<f64> {
        self.inner
            .get_redetect_radius()
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn get_current_bounding_box(&self) -> PyBoundingBox {
        PyBoundingBox {
            inner: self.inner.get_current_bounding_box().clone(),
        }
    }

    #[getter]
    fn track_id(&self) -> i64 {
        self.inner.track_id()
    }

    #[getter]
    fn current_frame_id(&self) -> i64 {
        self.inner.current_frame_id()
    }

    #[getter]
    fn current_speed(&self) -> f64 {
        self.inner.current_speed()
    }

    #[getter]
    fn current_state(&self) -> &'static str {
        self.inner.current_state().as_str()
    }

    #[getter]
    fn current_color_hist(&self) -> Option<Vec<f64>> {
        self.inner
            .current_color_hist()
            .map(|hist| hist.iter().copied().collect())
    }

    fn to_json(&self) -> PyResult<String> {
        self.inner
            .to_json()
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn __repr__(&self) -> String {
        self.inner.to_string()
    }
}

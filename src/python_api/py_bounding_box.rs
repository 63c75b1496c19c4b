use pyo3::{pyclass, pymethods};

use crate::{BoundingBox, ClassIdentifier, python_api::PyBBox};

#[pyclass(name = "BoundingBox")]
#[derive(Clone)]
pub struct PyBoundingBox {
    pub inner: BoundingBox,
}

#[pymethods]
impl PyBoundingBox {
    #[new]
    #[pyo3(signature = (bbox, class_id, class_name = String::new()))]
    pub fn new(bbox: &PyBBox, class_id: u32, class_name: String) -> Self {
        Self {
            inner: BoundingBox::new(bbox.inner, ClassIdentifier::new(class_id, class_name)),
        }
    }

    #[getter]
    fn bbox(&self) -> PyBBox {
        PyBBox {
            inner: self.inner.bbox,
        }
    }

    #[getter]
    fn class_id(&self) -> u32 {
        self.inner.class_identifier.class_id
    }

    #[getter]
    fn class_name(&self) -> String {
        self.inner.class_identifier.class_name.clone()
    }

    fn center(&self) -> (f64, f64) {
        self.inner.center()
    }
}

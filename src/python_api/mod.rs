mod py_bbox;
mod py_bounding_box;
mod py_config;
mod py_image_track;

pub use py_bbox::PyBBox;
pub use py_bounding_box::PyBoundingBox;
pub use py_config::PyTrackerConfig;
pub use py_image_track::PyImageTrack;

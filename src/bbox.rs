use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{Result, TrackError};

#[derive(Clone, Copy, Default, Debug, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x_1: f64,
    pub y_1: f64,
    pub x_2: f64,
    pub y_2: f64,
}

impl BBox {
    pub fn new(x_1: f64, y_1: f64, x_2: f64, y_2: f64) -> Self {
        if x_1 > x_2 || y_1 > y_2 {
            return BBox {
                x_1: 0.0,
                y_1: 0.0,
                x_2: 0.0,
                y_2: 0.0,
            };
        };
        BBox { x_1, y_1, x_2, y_2 }
    }

    pub fn width(&self) -> f64 {
        (self.x_2 - self.x_1).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.y_2 - self.y_1).max(0.0)
    }

    pub fn center(&self) -> (f64, f64) {
        (
            self.x_1 + self.width() / 2.0,
            self.y_1 + self.height() / 2.0,
        )
    }

    /// Moves the box so that its center lands on `(cx, cy)`, keeping its size.
    pub fn new_center(&mut self, cx: f64, cy: f64) {
        let (w, h) = (self.width(), self.height());

        self.x_1 = cx - w / 2.0;
        self.y_1 = cy - h / 2.0;
        self.x_2 = cx + w / 2.0;
        self.y_2 = cy + h / 2.0;
    }

    pub fn iou(&self, other: &Self) -> f64 {
        let iwidth = (self.x_2.min(other.x_2) - self.x_1.max(other.x_1)).max(0.0);
        let iheight = (self.y_2.min(other.y_2) - self.y_1.max(other.y_1)).max(0.0);
        let iarea = iwidth * iheight;

        let union = self.area() + other.area() - iarea;

        if union == 0.0 {
            return 0.0;
        }

        iarea / union
    }

    pub fn area(&self) -> f64 {
        ((self.x_2 - self.x_1) * (self.y_2 - self.y_1)).max(0.0)
    }
}

pub fn compute_iou(bbox_1: &BBox, bbox_2: &BBox) -> f64 {
    bbox_1.iou(bbox_2)
}

/// Distance in pixels between the centers of both boxes.
pub fn euclidean_distance(bbox_1: &BBox, bbox_2: &BBox) -> f64 {
    let (x_1, y_1) = bbox_1.center();
    let (x_2, y_2) = bbox_2.center();

    (x_1 - x_2).hypot(y_1 - y_2)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassIdentifier {
    pub class_id: u32,
    pub class_name: String,
}

impl ClassIdentifier {
    pub fn new(class_id: u32, class_name: impl Into<String>) -> Self {
        Self {
            class_id,
            class_name: class_name.into(),
        }
    }
}

/// An observed box together with the class it was detected as.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(rename = "box")]
    pub bbox: BBox,
    pub class_identifier: ClassIdentifier,
}

impl BoundingBox {
    pub fn new(bbox: BBox, class_identifier: ClassIdentifier) -> Self {
        Self {
            bbox,
            class_identifier,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        self.bbox.center()
    }

    pub fn class_id(&self) -> u32 {
        self.class_identifier.class_id
    }

    /// The reduced form drops the class name and stores the corners as a plain array.
    pub fn to_value(&self, reduced: bool) -> Result<Value> {
        if reduced {
            let BBox { x_1, y_1, x_2, y_2 } = self.bbox;
            return Ok(json!({
                "box": [x_1, y_1, x_2, y_2],
                "class_id": self.class_identifier.class_id,
            }));
        }

        Ok(serde_json::to_value(self)?)
    }

    pub fn from_value(value: &Value, reduced: bool) -> Result<Self> {
        if !reduced {
            return Ok(BoundingBox::deserialize(value)?);
        }

        let [x_1, y_1, x_2, y_2]: [f64; 4] = serde_json::from_value(value["box"].clone())?;
        let class_id = value["class_id"]
            .as_u64()
            .and_then(|id| u32::try_from(id).ok())
            .ok_or_else(|| TrackError::InvalidField {
                field: "class_id",
                value: value["class_id"].to_string(),
            })?;

        Ok(Self {
            bbox: BBox::new(x_1, y_1, x_2, y_2),
            class_identifier: ClassIdentifier::new(class_id, ""),
        })
    }
}

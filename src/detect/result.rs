/// Detector output bounding box, `(x1, y1)` top-left to `(x2, y2)` bottom-right
/// in pixel coordinates of the frame the detector was given.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl BoundingBox {
    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }
}

/// One detected object in one frame. Detections carry no identity across
/// frames; there is no tracking.
#[derive(Clone, Debug)]
pub struct Detection {
    /// Class label as reported by the model (e.g. "hand", "pizza", "scooper").
    pub label: String,
    /// Model confidence in `[0, 1]`.
    pub confidence: f32,
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32, bbox: BoundingBox) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox,
        }
    }
}

/// Normalized bounding box, coordinates in 0..1 of frame size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingBox {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

/// One detected object. Produced only by a `DetectorBackend`, scoped to a
/// single inference call.
#[derive(Clone, Debug)]
pub struct Detection {
    /// Label from the model's fixed taxonomy (e.g. COCO class names).
    pub label: String,
    /// Confidence score in 0.0..=1.0.
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

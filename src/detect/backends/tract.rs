#![cfg(feature = "backend-tract")]

use std::path::Path;

use tract_onnx::prelude::*;

use crate::detect::backend::DetectorBackend;
use crate::detect::result::{BoundingBox, Detection};
use crate::error::InferenceError;
use crate::frame::Frame;

/// COCO class names, the fixed taxonomy YOLO-family models are trained on.
const COCO_LABELS: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich",
    "orange", "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch",
    "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote",
    "keyboard", "cell phone", "microwave", "oven", "toaster", "sink", "refrigerator", "book",
    "clock", "vase", "scissors", "teddy bear", "hair drier", "toothbrush",
];

/// Tract-based backend for YOLO-style ONNX models.
///
/// Loads a local model file once at construction and runs CPU inference on
/// RGB frames. Expects the common YOLOv5 export layout: one output of shape
/// `[1, rows, 5 + classes]` where each row is `[cx, cy, w, h, obj, scores..]`
/// in input-pixel coordinates.
pub struct TractBackend {
    model: TypedSimplePlan<TypedModel>,
    input_width: u32,
    input_height: u32,
    confidence_threshold: f32,
}

impl TractBackend {
    /// Load an ONNX model from disk and prepare it for inference.
    pub fn new<P: AsRef<Path>>(
        model_path: P,
        input_width: u32,
        input_height: u32,
    ) -> Result<Self, InferenceError> {
        let model_path = model_path.as_ref();
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .map_err(|e| {
                InferenceError::Model(format!(
                    "failed to load ONNX model from {}: {}",
                    model_path.display(),
                    e
                ))
            })?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(1, 3, input_height as usize, input_width as usize),
                ),
            )
            .map_err(|e| InferenceError::Model(format!("failed to set input fact: {}", e)))?
            .into_optimized()
            .map_err(|e| InferenceError::Model(format!("failed to optimize model: {}", e)))?
            .into_runnable()
            .map_err(|e| InferenceError::Model(format!("failed to build runnable model: {}", e)))?;

        Ok(Self {
            model,
            input_width,
            input_height,
            confidence_threshold: 0.25,
        })
    }

    /// Override the default confidence threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    fn build_input(&self, frame: &Frame) -> Result<Tensor, InferenceError> {
        if frame.width() != self.input_width || frame.height() != self.input_height {
            return Err(InferenceError::BadInput(format!(
                "frame size {}x{} does not match model input {}x{}",
                frame.width(),
                frame.height(),
                self.input_width,
                self.input_height
            )));
        }

        let width = frame.width() as usize;
        let pixels = frame.pixels();
        let input = tract_ndarray::Array4::from_shape_fn(
            (1, 3, frame.height() as usize, width),
            |(_, channel, y, x)| {
                let idx = (y * width + x) * 3 + channel;
                pixels[idx] as f32 / 255.0
            },
        );
        Ok(input.into_tensor())
    }

    fn parse_output(&self, outputs: TVec<TValue>) -> Result<Vec<Detection>, InferenceError> {
        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::Model("model produced no outputs".to_string()))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::Model(format!("model output was not f32: {}", e)))?;

        let shape = view.shape();
        if shape.len() != 3 || shape[2] < 5 + COCO_LABELS.len() {
            return Err(InferenceError::Model(format!(
                "unexpected output shape {:?}",
                shape
            )));
        }

        let mut detections = Vec::new();
        for row in view.index_axis(tract_ndarray::Axis(0), 0).outer_iter() {
            let objectness = row[4];
            if objectness < self.confidence_threshold {
                continue;
            }
            let (class, score) = row
                .iter()
                .skip(5)
                .take(COCO_LABELS.len())
                .enumerate()
                .fold((0usize, f32::NEG_INFINITY), |best, (i, &s)| {
                    if s > best.1 {
                        (i, s)
                    } else {
                        best
                    }
                });
            let confidence = objectness * score;
            if confidence < self.confidence_threshold {
                continue;
            }

            let (cx, cy, w, h) = (row[0], row[1], row[2], row[3]);
            let fw = self.input_width as f32;
            let fh = self.input_height as f32;
            detections.push(Detection::new(
                COCO_LABELS[class],
                confidence.clamp(0.0, 1.0),
                BoundingBox {
                    x_min: ((cx - w / 2.0) / fw).clamp(0.0, 1.0),
                    y_min: ((cy - h / 2.0) / fh).clamp(0.0, 1.0),
                    x_max: ((cx + w / 2.0) / fw).clamp(0.0, 1.0),
                    y_max: ((cy + h / 2.0) / fh).clamp(0.0, 1.0),
                },
            ));
        }
        Ok(detections)
    }
}

impl DetectorBackend for TractBackend {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, InferenceError> {
        let input = self.build_input(frame)?;
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::Model(format!("ONNX inference failed: {}", e)))?;
        self.parse_output(outputs)
    }
}

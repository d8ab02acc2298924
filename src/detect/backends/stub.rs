use std::collections::VecDeque;

use crate::detect::backend::DetectorBackend;
use crate::detect::result::Detection;
use crate::error::InferenceError;
use crate::frame::Frame;

/// Stub backend for testing and dry runs.
///
/// Detections are scripted: queued responses are returned in order, after
/// which the backend falls back to a constant response (empty by default).
/// With no script and no constant it simply never detects anything, which is
/// the default for an unconfigured deployment.
pub struct StubBackend {
    script: VecDeque<Result<Vec<Detection>, InferenceError>>,
    constant: Vec<Detection>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            constant: Vec::new(),
        }
    }

    /// Return `detections` on every call once the script is exhausted.
    pub fn with_constant(detections: Vec<Detection>) -> Self {
        Self {
            script: VecDeque::new(),
            constant: detections,
        }
    }

    /// Queue one scripted response.
    pub fn push(&mut self, detections: Vec<Detection>) {
        self.script.push_back(Ok(detections));
    }

    /// Queue one scripted failure.
    pub fn push_error(&mut self, error: InferenceError) {
        self.script.push_back(Err(error));
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, _frame: &Frame) -> Result<Vec<Detection>, InferenceError> {
        match self.script.pop_front() {
            Some(response) => response,
            None => Ok(self.constant.clone()),
        }
    }
}

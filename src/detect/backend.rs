use crate::detect::result::Detection;
use crate::error::InferenceError;
use crate::frame::Frame;

/// Detector backend trait.
///
/// Implementations must be pure with respect to the frame argument: no state
/// retained between calls beyond the weights loaded at construction. They must
/// treat the frame as read-only and must not hold onto it past the call.
pub trait DetectorBackend: Send {
    /// Backend identifier for logs.
    fn name(&self) -> &'static str;

    /// Run inference on one frame.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, InferenceError>;

    /// Optional warm-up hook, called once before the loop starts.
    fn warm_up(&mut self) -> Result<(), InferenceError> {
        Ok(())
    }
}

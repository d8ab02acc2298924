//! Error taxonomy for the watch pipeline.
//!
//! Each external collaborator gets its own error kind so the pipeline can
//! apply the right recovery policy per tick:
//!
//! - `CaptureError`: recovered per tick, escalates to fatal after repeated
//!   consecutive failures (camera presumed disconnected).
//! - `InferenceError`: always recovered per tick.
//! - `DeliveryError`: always recovered; a missed notification is lower
//!   severity than pipeline termination.
//! - `ConfigError`: fatal at startup, before any loop begins.

use std::io;

use thiserror::Error;

/// Camera-side failure: device unavailable or malformed frame data.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("camera unavailable: {0}")]
    Unavailable(String),

    #[error("failed to decode captured image: {0}")]
    Decode(String),

    #[error("malformed frame: expected {expected} bytes, got {actual}")]
    Malformed { expected: usize, actual: usize },

    #[error("camera i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Detection-model failure on a given frame.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("model rejected input: {0}")]
    BadInput(String),

    #[error("model failure: {0}")]
    Model(String),
}

/// Notification transport failure, including timeouts and auth rejection.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to encode alert image: {0}")]
    Encode(String),

    #[error("failed to write alert image: {0}")]
    Io(#[from] io::Error),

    #[error("notification transport error: {0}")]
    Transport(String),

    #[error("notification rejected with status {status}")]
    Rejected { status: u16 },
}

/// Invalid startup configuration. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("skip interval must be at least 1")]
    InvalidSkipInterval,

    #[error("watch list must contain at least one label")]
    EmptyWatchList,

    #[error("minimum alert interval must be greater than zero")]
    InvalidAlertInterval,

    #[error("notifier timeout must be greater than zero")]
    InvalidTimeout,

    #[error("capture resolution must be non-zero")]
    InvalidResolution,

    #[error("confidence threshold must be within 0.0..=1.0, got {0}")]
    InvalidConfidence(f32),

    #[error("unsupported camera url '{url}': {reason}")]
    InvalidCameraUrl { url: String, reason: String },

    #[error("{0}")]
    Invalid(String),
}

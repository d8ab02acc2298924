//! critter-watch: always-on animal monitoring for constrained hardware.
//!
//! The daemon samples frames from one camera, runs object detection on every
//! N-th tick, and raises rate-limited Telegram alerts (with an attached JPEG)
//! when a frame contains a watch-listed label. Full-rate inference is too
//! costly on the target hardware, so raw capture is decoupled from inference
//! by a counter-based sampling scheduler.
//!
//! # Architecture
//!
//! Two long-running loops share one mutex-guarded camera handle and nothing
//! else:
//!
//! - the detection pipeline (`pipeline`): tick scheduling, capture, inference,
//!   watch-list filtering, alert dispatch through the debouncing gate;
//! - the optional preview loop (`preview`): capture only, no inference.
//!
//! # Module structure
//!
//! - `camera`: frame sources and the serialized `SharedCamera` handle
//! - `detect`: detector backends, detection results, the watch-list
//! - `scheduler`: inference cadence
//! - `alert`: alert payloads, debounce gate, notifiers
//! - `pipeline`: the per-tick decision procedure
//! - `config`: startup configuration
//! - `error`: per-collaborator error taxonomy

pub mod alert;
pub mod camera;
pub mod config;
pub mod detect;
pub mod error;
pub mod frame;
pub mod pipeline;
pub mod preview;
pub mod scheduler;

pub use alert::{Alert, AlertGate, LogNotifier, Notifier, TelegramNotifier};
pub use camera::{CameraConfig, FrameSource, HttpCamera, SharedCamera, SyntheticCamera};
pub use config::WatchdConfig;
pub use detect::{BoundingBox, Detection, DetectorBackend, StubBackend, WatchList};
#[cfg(feature = "backend-tract")]
pub use detect::TractBackend;
pub use error::{CaptureError, ConfigError, DeliveryError, InferenceError};
pub use frame::{Frame, PixelFormat};
pub use pipeline::{DetectionPipeline, TickOutcome};
pub use scheduler::SamplingScheduler;

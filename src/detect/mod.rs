//! Object detection.
//!
//! Backends wrap the external detection model behind one synchronous call:
//! frame in, labeled detections out. Model weights load once at construction;
//! `detect` holds no other state between calls. Callers must treat each call
//! as potentially slow and blocking.

mod backend;
mod backends;
mod result;
mod watchlist;

pub use backend::DetectorBackend;
pub use backends::StubBackend;
#[cfg(feature = "backend-tract")]
pub use backends::TractBackend;
pub use result::{BoundingBox, Detection};
pub use watchlist::WatchList;

//! Frame acquisition.
//!
//! This module provides the camera sources and the serialization discipline
//! around the single physical device:
//!
//! - `FrameSource`: one synchronous "capture one frame" operation.
//! - `SyntheticCamera` (`stub://` URLs): pattern generator for tests and
//!   dry runs.
//! - `HttpCamera` (`http(s)://` URLs): JPEG snapshot endpoints, as exposed by
//!   ESP32-class and most IP cameras.
//! - `SharedCamera`: cloneable handle that mutex-guards the source so the
//!   detection pipeline and the preview loop can both capture concurrently
//!   without torn frames. Callers never reach the device directly.

mod http;
mod synthetic;

use std::sync::{Arc, Mutex};
use std::time::Duration;

pub use http::HttpCamera;
pub use synthetic::SyntheticCamera;

use crate::error::{CaptureError, ConfigError};
use crate::frame::Frame;

/// Capture settings for the single camera device.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    /// Source URL. `stub://` selects the synthetic camera, `http(s)://` a
    /// JPEG snapshot endpoint.
    pub url: String,
    /// Requested capture width (synthetic frames; snapshot sources report
    /// their native size).
    pub width: u32,
    /// Requested capture height.
    pub height: u32,
    /// Delay before the first capture is considered valid.
    pub warmup: Duration,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            url: "stub://paddock".to_string(),
            width: 640,
            height: 480,
            warmup: Duration::from_secs(2),
        }
    }
}

/// A source of freshly captured frames.
///
/// Every call produces a new capture; sources never cache or reuse frames.
/// Implementations are driven through `SharedCamera` and may assume calls are
/// serialized.
pub trait FrameSource: Send {
    /// Capture one frame, advancing the device's internal capture state.
    fn capture(&mut self) -> Result<Frame, CaptureError>;

    /// Human-readable source description for logs.
    fn describe(&self) -> String;

    /// Frames captured since the source was opened.
    fn frames_captured(&self) -> u64;
}

/// Thread-safe handle to the single camera device.
///
/// Capture calls are serialized internally; at most one physical capture is
/// in flight at a time. Clones share the same underlying source.
#[derive(Clone)]
pub struct SharedCamera {
    inner: Arc<Mutex<Box<dyn FrameSource>>>,
}

impl SharedCamera {
    /// Open the source selected by the config URL and run its warm-up delay,
    /// discarding the first capture.
    pub fn open(config: &CameraConfig) -> Result<Self, ConfigError> {
        let source: Box<dyn FrameSource> = if config.url.starts_with("stub://") {
            Box::new(SyntheticCamera::new(config.clone()))
        } else if config.url.starts_with("http://") || config.url.starts_with("https://") {
            Box::new(HttpCamera::new(config.clone())?)
        } else {
            return Err(ConfigError::InvalidCameraUrl {
                url: config.url.clone(),
                reason: "expected stub:// or http(s)://".to_string(),
            });
        };

        let camera = Self::from_source(source);
        camera.warm_up(config.warmup);
        Ok(camera)
    }

    /// Wrap an already-built source. Used by tests to inject scripted sources.
    pub fn from_source(source: Box<dyn FrameSource>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(source)),
        }
    }

    fn warm_up(&self, warmup: Duration) {
        if !warmup.is_zero() {
            log::info!("camera warming up for {:?}", warmup);
            std::thread::sleep(warmup);
        }
        // The first frame after power-on is routinely garbage; capture and
        // discard it so callers only ever see warmed-up frames.
        if let Err(e) = self.capture() {
            log::warn!("warm-up capture failed: {}", e);
        }
    }

    /// Capture one frame. Blocks while another caller holds the device.
    pub fn capture(&self) -> Result<Frame, CaptureError> {
        let mut source = self
            .inner
            .lock()
            .map_err(|_| CaptureError::Unavailable("camera lock poisoned".to_string()))?;
        source.capture()
    }

    pub fn describe(&self) -> String {
        match self.inner.lock() {
            Ok(source) => source.describe(),
            Err(_) => "<poisoned>".to_string(),
        }
    }

    pub fn frames_captured(&self) -> u64 {
        match self.inner.lock() {
            Ok(source) => source.frames_captured(),
            Err(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub_config() -> CameraConfig {
        CameraConfig {
            url: "stub://test".to_string(),
            width: 64,
            height: 48,
            warmup: Duration::ZERO,
        }
    }

    #[test]
    fn open_rejects_unknown_scheme() {
        let config = CameraConfig {
            url: "rtsp://camera-1".to_string(),
            ..stub_config()
        };
        assert!(SharedCamera::open(&config).is_err());
    }

    #[test]
    fn shared_camera_produces_configured_frames() {
        let camera = SharedCamera::open(&stub_config()).unwrap();
        let frame = camera.capture().unwrap();
        assert_eq!(frame.width(), 64);
        assert_eq!(frame.height(), 48);
    }

    #[test]
    fn concurrent_captures_are_serialized_and_complete() {
        let camera = SharedCamera::open(&stub_config()).unwrap();
        let mut handles = Vec::new();
        for _ in 0..4 {
            let camera = camera.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..25 {
                    let frame = camera.capture().expect("capture");
                    assert_eq!(frame.byte_len(), 64 * 48 * 3);
                }
            }));
        }
        for handle in handles {
            handle.join().expect("capture thread");
        }
        // 4 threads x 25 captures, plus the warm-up discard.
        assert_eq!(camera.frames_captured(), 101);
    }
}

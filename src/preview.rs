//! Preview loop.
//!
//! Pulls frames through the shared camera handle at its own cadence with no
//! inference, standing in for a local display feed. It shares nothing with
//! the detection pipeline except the camera lock, so a slow or failing
//! inference call never stalls it (and vice versa, beyond transient lock
//! contention).

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::camera::SharedCamera;
use crate::config::PreviewSettings;

const STATS_INTERVAL: Duration = Duration::from_secs(5);

/// Capture frames until the shutdown flag is set. Capture errors are logged
/// and the loop keeps going; escalation policy for a dead camera lives in the
/// detection pipeline, not here.
pub fn run_preview(camera: SharedCamera, settings: PreviewSettings, shutdown: &AtomicBool) {
    let mut frames = 0u64;
    let mut errors = 0u64;
    let mut last_stats = Instant::now();

    log::info!("preview loop running on {}", camera.describe());
    while !shutdown.load(Ordering::Relaxed) {
        match camera.capture() {
            Ok(_) => frames += 1,
            Err(e) => {
                errors += 1;
                log::debug!("preview capture failed: {}", e);
            }
        }

        if last_stats.elapsed() >= STATS_INTERVAL {
            log::debug!("preview: {} frames, {} errors", frames, errors);
            last_stats = Instant::now();
        }

        std::thread::sleep(settings.delay);
    }
    log::info!("preview loop stopped after {} frames", frames);
}

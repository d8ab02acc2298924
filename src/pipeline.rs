//! The per-tick decision procedure and the detection loop.
//!
//! Each tick: ask the scheduler whether to infer; if so capture a frame
//! through the shared camera, run the detector, filter against the
//! watch-list, and offer any match to the alert gate. Capture and inference
//! failures are logged and the tick is skipped; repeated consecutive capture
//! failures escalate to a fatal error, since silent infinite retry against a
//! dead device wastes resources without signal.
//!
//! Ticks are processed strictly in order on one thread; there is never more
//! than one inference in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::alert::{Alert, AlertGate};
use crate::camera::SharedCamera;
use crate::config::{SamplingSettings, WatchSettings};
use crate::detect::{DetectorBackend, WatchList};
use crate::scheduler::SamplingScheduler;

/// What one tick did. Returned by `tick` so tests and the run loop can see
/// the branch taken without parsing logs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not an inference tick.
    Skipped,
    /// Inference ran; nothing on the watch-list was present.
    Clear,
    /// Alert dispatched with these labels.
    Dispatched(Vec<String>),
    /// Watch-list hit inside the cooldown window; alert dropped.
    Suppressed(Vec<String>),
    /// Watch-list hit but the notifier failed; alert dropped.
    DeliveryFailed(Vec<String>),
    /// Capture failed; tick skipped, retry on the next scheduled tick.
    CaptureFailed,
    /// Inference failed; tick skipped.
    InferenceFailed,
}

pub struct DetectionPipeline {
    camera: SharedCamera,
    detector: Box<dyn DetectorBackend>,
    watch_list: WatchList,
    scheduler: SamplingScheduler,
    gate: AlertGate,
    min_confidence: f32,
    sampling: SamplingSettings,
    consecutive_capture_failures: u32,
}

impl DetectionPipeline {
    pub fn new(
        camera: SharedCamera,
        detector: Box<dyn DetectorBackend>,
        watch: &WatchSettings,
        sampling: SamplingSettings,
        gate: AlertGate,
    ) -> Result<Self> {
        let watch_list = WatchList::new(&watch.labels)?;
        let scheduler = SamplingScheduler::new(sampling.skip_interval)?;
        Ok(Self {
            camera,
            detector,
            watch_list,
            scheduler,
            gate,
            min_confidence: watch.min_confidence,
            sampling,
            consecutive_capture_failures: 0,
        })
    }

    /// Run one tick. `Err` means a fatal condition: the caller must stop the
    /// loop and exit non-zero.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        if !self.scheduler.next_tick_is_inference() {
            return Ok(TickOutcome::Skipped);
        }

        let frame = match self.camera.capture() {
            Ok(frame) => {
                self.consecutive_capture_failures = 0;
                Arc::new(frame)
            }
            Err(e) => {
                self.consecutive_capture_failures += 1;
                log::warn!(
                    "capture failed ({} consecutive): {}",
                    self.consecutive_capture_failures,
                    e
                );
                if self.consecutive_capture_failures >= self.sampling.max_capture_failures {
                    return Err(anyhow!(e).context(format!(
                        "camera presumed disconnected after {} consecutive capture failures",
                        self.consecutive_capture_failures
                    )));
                }
                return Ok(TickOutcome::CaptureFailed);
            }
        };

        let detections = match self.detector.detect(&frame) {
            Ok(detections) => detections,
            Err(e) => {
                log::warn!("inference failed on tick {}: {}", self.scheduler.ticks() - 1, e);
                return Ok(TickOutcome::InferenceFailed);
            }
        };

        let matched = self.watch_list.matched_labels(&detections, self.min_confidence);
        if matched.is_empty() {
            return Ok(TickOutcome::Clear);
        }

        let alert = Alert::new(frame, matched.clone());
        match self.gate.offer(&alert) {
            Ok(true) => {
                log::info!("alert dispatched: {}", matched.join(", "));
                Ok(TickOutcome::Dispatched(matched))
            }
            Ok(false) => Ok(TickOutcome::Suppressed(matched)),
            Err(e) => {
                log::warn!("alert delivery failed: {}", e);
                Ok(TickOutcome::DeliveryFailed(matched))
            }
        }
    }

    /// Blocking loop: tick, sleep, repeat until the shutdown flag is set or a
    /// fatal condition surfaces. Any in-flight capture/inference/send
    /// completes before the loop observes the flag.
    pub fn run(&mut self, shutdown: &AtomicBool) -> Result<()> {
        log::info!(
            "detection pipeline running: camera={}, detector={}, watching [{}]",
            self.camera.describe(),
            self.detector.name(),
            self.watch_list.labels().collect::<Vec<_>>().join(", ")
        );

        while !shutdown.load(Ordering::Relaxed) {
            let outcome = self.tick()?;
            if outcome != TickOutcome::Skipped {
                std::thread::sleep(self.sampling.post_inference_delay);
            }
            std::thread::sleep(self.sampling.idle_delay);
        }

        log::info!(
            "detection pipeline stopped after {} ticks",
            self.scheduler.ticks()
        );
        Ok(())
    }
}

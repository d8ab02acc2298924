//! End-to-end pipeline scenarios with scripted collaborators.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use critter_watch::{
    alert::{AlertGate, Notifier},
    camera::{FrameSource, SharedCamera},
    config::{SamplingSettings, WatchSettings},
    detect::{BoundingBox, Detection, StubBackend},
    error::{CaptureError, DeliveryError},
    frame::{Frame, PixelFormat},
    pipeline::{DetectionPipeline, TickOutcome},
};

fn frame() -> Frame {
    Frame::new(vec![60u8; 16 * 16 * 3], 16, 16, PixelFormat::Rgb8).unwrap()
}

fn det(label: &str, confidence: f32) -> Detection {
    Detection::new(label, confidence, BoundingBox::default())
}

/// Camera with a scripted capture sequence; once the script runs out it
/// produces good frames forever.
struct ScriptedCamera {
    script: VecDeque<Result<Frame, CaptureError>>,
    captured: u64,
}

impl ScriptedCamera {
    fn ok_forever() -> Self {
        Self::with_script(Vec::new())
    }

    fn with_script(script: Vec<Result<Frame, CaptureError>>) -> Self {
        Self {
            script: script.into(),
            captured: 0,
        }
    }

    fn failing(times: usize) -> Self {
        Self::with_script(
            (0..times)
                .map(|_| Err(CaptureError::Unavailable("device gone".to_string())))
                .collect(),
        )
    }
}

impl FrameSource for ScriptedCamera {
    fn capture(&mut self) -> Result<Frame, CaptureError> {
        let result = self.script.pop_front().unwrap_or_else(|| Ok(frame()));
        if result.is_ok() {
            self.captured += 1;
        }
        result
    }

    fn describe(&self) -> String {
        "scripted://camera".to_string()
    }

    fn frames_captured(&self) -> u64 {
        self.captured
    }
}

/// Notifier that records captions and can be switched into failure mode.
#[derive(Clone)]
struct RecordingNotifier {
    captions: Arc<Mutex<Vec<String>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingNotifier {
    fn new() -> Self {
        Self {
            captions: Arc::new(Mutex::new(Vec::new())),
            fail: Arc::new(AtomicBool::new(false)),
        }
    }

    fn sent(&self) -> Vec<String> {
        self.captions.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn send_photo(&self, _jpeg: &[u8], caption: &str) -> Result<(), DeliveryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DeliveryError::Transport("telegram unreachable".to_string()));
        }
        self.captions.lock().unwrap().push(caption.to_string());
        Ok(())
    }
}

struct Harness {
    pipeline: DetectionPipeline,
    notifier: RecordingNotifier,
    _image_dir: tempfile::TempDir,
}

fn harness(
    camera: ScriptedCamera,
    detector: StubBackend,
    skip_interval: u64,
    min_interval: Duration,
) -> Harness {
    let image_dir = tempfile::tempdir().unwrap();
    let notifier = RecordingNotifier::new();
    let gate = AlertGate::new(
        min_interval,
        image_dir.path().to_path_buf(),
        Box::new(notifier.clone()),
    );
    let sampling = SamplingSettings {
        skip_interval,
        idle_delay: Duration::ZERO,
        post_inference_delay: Duration::ZERO,
        max_capture_failures: 3,
    };
    let watch = WatchSettings {
        labels: vec!["cat".to_string(), "dog".to_string()],
        min_confidence: 0.5,
    };
    let pipeline = DetectionPipeline::new(
        SharedCamera::from_source(Box::new(camera)),
        Box::new(detector),
        &watch,
        sampling,
        gate,
    )
    .unwrap();
    Harness {
        pipeline,
        notifier,
        _image_dir: image_dir,
    }
}

#[test]
fn sampled_detection_with_debounced_alerts() {
    // N=5, watch {cat, dog}. Inference runs on ticks 0, 5, 10.
    let mut detector = StubBackend::new();
    detector.push(vec![det("person", 0.9)]); // tick 0: nothing watched
    detector.push(vec![det("cat", 0.8), det("person", 0.9)]); // tick 5: alert
    detector.push(vec![det("cat", 0.8)]); // tick 10: inside cooldown

    let mut h = harness(
        ScriptedCamera::ok_forever(),
        detector,
        5,
        Duration::from_secs(60),
    );

    assert_eq!(h.pipeline.tick().unwrap(), TickOutcome::Clear); // tick 0
    for _ in 1..5 {
        assert_eq!(h.pipeline.tick().unwrap(), TickOutcome::Skipped);
    }
    assert_eq!(
        h.pipeline.tick().unwrap(),
        TickOutcome::Dispatched(vec!["cat".to_string()])
    ); // tick 5
    for _ in 6..10 {
        assert_eq!(h.pipeline.tick().unwrap(), TickOutcome::Skipped);
    }
    assert_eq!(
        h.pipeline.tick().unwrap(),
        TickOutcome::Suppressed(vec!["cat".to_string()])
    ); // tick 10

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("cat"));
    assert!(!sent[0].contains("person"));
}

#[test]
fn single_capture_failure_recovers_on_next_tick() {
    let detector = StubBackend::new();
    let mut h = harness(
        ScriptedCamera::failing(1),
        detector,
        1,
        Duration::from_secs(60),
    );

    assert_eq!(h.pipeline.tick().unwrap(), TickOutcome::CaptureFailed);
    assert_eq!(h.pipeline.tick().unwrap(), TickOutcome::Clear);
    assert!(h.notifier.sent().is_empty());
}

#[test]
fn three_consecutive_capture_failures_escalate() {
    let detector = StubBackend::new();
    let mut h = harness(
        ScriptedCamera::failing(10),
        detector,
        1,
        Duration::from_secs(60),
    );

    assert_eq!(h.pipeline.tick().unwrap(), TickOutcome::CaptureFailed);
    assert_eq!(h.pipeline.tick().unwrap(), TickOutcome::CaptureFailed);
    let fatal = h.pipeline.tick();
    assert!(fatal.is_err());
    assert!(format!("{:#}", fatal.unwrap_err()).contains("presumed disconnected"));
}

#[test]
fn interleaved_success_resets_failure_count() {
    let detector = StubBackend::new();
    let script = vec![
        Err(CaptureError::Unavailable("blip".to_string())),
        Err(CaptureError::Unavailable("blip".to_string())),
        Ok(frame()),
        Err(CaptureError::Unavailable("blip".to_string())),
        Err(CaptureError::Unavailable("blip".to_string())),
    ];
    let mut h = harness(
        ScriptedCamera::with_script(script),
        detector,
        1,
        Duration::from_secs(60),
    );

    assert_eq!(h.pipeline.tick().unwrap(), TickOutcome::CaptureFailed);
    assert_eq!(h.pipeline.tick().unwrap(), TickOutcome::CaptureFailed);
    assert_eq!(h.pipeline.tick().unwrap(), TickOutcome::Clear);
    // Counter restarted: two more failures are still below the threshold.
    assert_eq!(h.pipeline.tick().unwrap(), TickOutcome::CaptureFailed);
    assert_eq!(h.pipeline.tick().unwrap(), TickOutcome::CaptureFailed);
    assert_eq!(h.pipeline.tick().unwrap(), TickOutcome::Clear);
}

#[test]
fn inference_failure_skips_tick_without_terminating() {
    let mut detector = StubBackend::new();
    detector.push_error(critter_watch::error::InferenceError::Model(
        "bad tensor".to_string(),
    ));
    detector.push(vec![det("dog", 0.9)]);

    let mut h = harness(
        ScriptedCamera::ok_forever(),
        detector,
        1,
        Duration::from_secs(60),
    );

    assert_eq!(h.pipeline.tick().unwrap(), TickOutcome::InferenceFailed);
    assert_eq!(
        h.pipeline.tick().unwrap(),
        TickOutcome::Dispatched(vec!["dog".to_string()])
    );
}

#[test]
fn delivery_failure_does_not_arm_the_cooldown() {
    let detector = StubBackend::with_constant(vec![det("cat", 0.9)]);
    let mut h = harness(
        ScriptedCamera::ok_forever(),
        detector,
        1,
        Duration::from_secs(3600),
    );

    h.notifier.fail.store(true, Ordering::SeqCst);
    assert_eq!(
        h.pipeline.tick().unwrap(),
        TickOutcome::DeliveryFailed(vec!["cat".to_string()])
    );

    // Transport recovers: the very next qualifying detection dispatches.
    h.notifier.fail.store(false, Ordering::SeqCst);
    assert_eq!(
        h.pipeline.tick().unwrap(),
        TickOutcome::Dispatched(vec!["cat".to_string()])
    );
    // And the cooldown is now armed.
    assert_eq!(
        h.pipeline.tick().unwrap(),
        TickOutcome::Suppressed(vec!["cat".to_string()])
    );
    assert_eq!(h.notifier.sent().len(), 1);
}

#[test]
fn run_loop_stops_on_shutdown_flag() {
    let detector = StubBackend::new();
    let mut h = harness(
        ScriptedCamera::ok_forever(),
        detector,
        1,
        Duration::from_secs(60),
    );

    let shutdown = Arc::new(AtomicBool::new(true));
    // Flag already set: run must return promptly and cleanly.
    h.pipeline.run(&shutdown).unwrap();
}

#[test]
fn alert_image_is_written_next_to_dispatch() {
    let detector = StubBackend::with_constant(vec![det("cat", 0.9)]);
    let image_dir = tempfile::tempdir().unwrap();
    let notifier = RecordingNotifier::new();
    let gate = AlertGate::new(
        Duration::from_secs(60),
        image_dir.path().to_path_buf(),
        Box::new(notifier.clone()),
    );
    let sampling = SamplingSettings {
        skip_interval: 1,
        idle_delay: Duration::ZERO,
        post_inference_delay: Duration::ZERO,
        max_capture_failures: 3,
    };
    let watch = WatchSettings {
        labels: vec!["cat".to_string()],
        min_confidence: 0.5,
    };
    let mut pipeline = DetectionPipeline::new(
        SharedCamera::from_source(Box::new(ScriptedCamera::ok_forever())),
        Box::new(detector),
        &watch,
        sampling,
        gate,
    )
    .unwrap();

    assert_eq!(
        pipeline.tick().unwrap(),
        TickOutcome::Dispatched(vec!["cat".to_string()])
    );

    let artifacts: Vec<PathBuf> = std::fs::read_dir(image_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(artifacts.len(), 1);
    let name = artifacts[0].file_name().unwrap().to_string_lossy();
    assert!(name.starts_with("animal_detected_"));
    assert!(name.ends_with(".jpg"));
}

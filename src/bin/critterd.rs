//! critterd - animal watch daemon
//!
//! This daemon:
//! 1. Opens the configured camera behind a serialized shared handle
//! 2. Runs the detection pipeline: sampled inference, watch-list filtering,
//!    debounced Telegram alerts with a JPEG artifact per dispatch
//! 3. Optionally runs a preview loop that captures with no inference
//! 4. Shuts both loops down cleanly on Ctrl-C (exit 0); escalated camera
//!    failure terminates with a non-zero status

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use critter_watch::{
    alert::{AlertGate, LogNotifier, Notifier, TelegramNotifier},
    camera::SharedCamera,
    config::{AlertSettings, DetectorSettings, WatchdConfig},
    detect::{DetectorBackend, StubBackend},
    pipeline::DetectionPipeline,
    preview::run_preview,
};

#[derive(Debug, Parser)]
#[command(name = "critterd", about = "Animal watch daemon")]
struct Cli {
    /// Path to the JSON config file (also: CRITTER_CONFIG).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Force-enable the preview loop regardless of config.
    #[arg(long)]
    preview: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cfg = WatchdConfig::load(cli.config.as_deref()).context("configuration error")?;

    let camera = SharedCamera::open(&cfg.camera)?;
    log::info!("camera ready: {}", camera.describe());

    let mut detector = build_detector(&cfg.detector)?;
    detector
        .warm_up()
        .with_context(|| format!("detector '{}' failed to warm up", detector.name()))?;

    let notifier = build_notifier(&cfg.alert);
    let gate = AlertGate::new(cfg.alert.min_interval, cfg.alert.image_dir.clone(), notifier);
    let mut pipeline = DetectionPipeline::new(
        camera.clone(),
        detector,
        &cfg.watch,
        cfg.sampling.clone(),
        gate,
    )?;

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            log::info!("interrupt received, shutting down");
            shutdown.store(true, Ordering::Relaxed);
        })
        .context("failed to install Ctrl-C handler")?;
    }

    let preview_handle = if cfg.preview.enabled || cli.preview {
        let camera = camera.clone();
        let settings = cfg.preview.clone();
        let shutdown = shutdown.clone();
        Some(std::thread::spawn(move || {
            run_preview(camera, settings, &shutdown)
        }))
    } else {
        None
    };

    let result = pipeline.run(&shutdown);

    // Stop the preview loop too, whether we exited cleanly or fatally.
    shutdown.store(true, Ordering::Relaxed);
    if let Some(handle) = preview_handle {
        if handle.join().is_err() {
            log::warn!("preview thread panicked during shutdown");
        }
    }

    match &result {
        Ok(()) => log::info!("critterd stopped"),
        Err(e) => log::error!("critterd failed: {:#}", e),
    }
    result
}

fn build_detector(settings: &DetectorSettings) -> Result<Box<dyn DetectorBackend>> {
    match &settings.model_path {
        None => {
            log::warn!("no detector model configured; using stub backend (never detects)");
            Ok(Box::new(StubBackend::new()))
        }
        #[cfg(feature = "backend-tract")]
        Some(path) => {
            use critter_watch::detect::TractBackend;
            let backend = TractBackend::new(path, 640, 640)
                .with_context(|| format!("failed to load model {}", path.display()))?;
            Ok(Box::new(backend))
        }
        #[cfg(not(feature = "backend-tract"))]
        Some(path) => Err(anyhow!(
            "detector.model_path is set ({}) but this build lacks the backend-tract feature",
            path.display()
        )),
    }
}

fn build_notifier(settings: &AlertSettings) -> Box<dyn Notifier> {
    match (&settings.chat_id, &settings.bot_token) {
        (Some(chat_id), Some(token)) => {
            log::info!("telegram notifier configured for chat {}", chat_id);
            Box::new(TelegramNotifier::new(token, chat_id.clone(), settings.timeout))
        }
        _ => {
            log::warn!("no telegram chat configured; alerts will be logged only");
            Box::new(LogNotifier)
        }
    }
}

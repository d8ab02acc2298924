//! Daemon configuration.
//!
//! Configuration is read from an optional JSON file (path from the CLI or the
//! `CRITTER_CONFIG` environment variable), then overridden by individual
//! environment variables, then validated. Invalid configuration is fatal at
//! startup, before any loop begins.
//!
//! The bot credential is intentionally not part of the config file; it is
//! only accepted via `CRITTER_BOT_TOKEN`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::camera::CameraConfig;
use crate::error::ConfigError;

const DEFAULT_CAMERA_URL: &str = "stub://paddock";
const DEFAULT_WIDTH: u32 = 640;
const DEFAULT_HEIGHT: u32 = 480;
const DEFAULT_WARMUP_MS: u64 = 2_000;
const DEFAULT_SKIP_INTERVAL: u64 = 5;
const DEFAULT_IDLE_DELAY_MS: u64 = 100;
const DEFAULT_POST_INFERENCE_DELAY_MS: u64 = 1_000;
const DEFAULT_MAX_CAPTURE_FAILURES: u32 = 3;
const DEFAULT_MIN_CONFIDENCE: f32 = 0.5;
const DEFAULT_ALERT_MIN_INTERVAL_SECS: u64 = 60;
const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PREVIEW_DELAY_MS: u64 = 100;

/// COCO classes watched when no watch-list is configured.
const DEFAULT_WATCH_LABELS: [&str; 6] = ["cat", "dog", "bird", "cow", "horse", "sheep"];

#[derive(Debug, Deserialize, Default)]
struct WatchdConfigFile {
    camera: Option<CameraConfigFile>,
    sampling: Option<SamplingConfigFile>,
    watch: Option<WatchConfigFile>,
    alert: Option<AlertConfigFile>,
    detector: Option<DetectorConfigFile>,
    preview: Option<PreviewConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    url: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    warmup_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct SamplingConfigFile {
    skip_interval: Option<u64>,
    idle_delay_ms: Option<u64>,
    post_inference_delay_ms: Option<u64>,
    max_capture_failures: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct WatchConfigFile {
    labels: Option<Vec<String>>,
    min_confidence: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct AlertConfigFile {
    min_interval_secs: Option<u64>,
    image_dir: Option<PathBuf>,
    chat_id: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectorConfigFile {
    model_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
struct PreviewConfigFile {
    enabled: Option<bool>,
    delay_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct WatchdConfig {
    pub camera: CameraConfig,
    pub sampling: SamplingSettings,
    pub watch: WatchSettings,
    pub alert: AlertSettings,
    pub detector: DetectorSettings,
    pub preview: PreviewSettings,
}

#[derive(Debug, Clone)]
pub struct SamplingSettings {
    /// Run inference every N-th tick.
    pub skip_interval: u64,
    /// Per-tick sleep, taken on every loop iteration.
    pub idle_delay: Duration,
    /// Extra sleep after an inference tick, bounding camera/CPU load.
    pub post_inference_delay: Duration,
    /// Consecutive capture failures before the camera is presumed dead.
    pub max_capture_failures: u32,
}

#[derive(Debug, Clone)]
pub struct WatchSettings {
    pub labels: Vec<String>,
    pub min_confidence: f32,
}

#[derive(Debug, Clone)]
pub struct AlertSettings {
    pub min_interval: Duration,
    pub image_dir: PathBuf,
    /// Telegram chat to notify. `None` falls back to log-only alerts.
    pub chat_id: Option<String>,
    /// Bot credential, environment-only.
    pub bot_token: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct DetectorSettings {
    /// ONNX model path for the tract backend; `None` selects the stub.
    pub model_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct PreviewSettings {
    pub enabled: bool,
    pub delay: Duration,
}

impl WatchdConfig {
    /// Load configuration: file (explicit path or `CRITTER_CONFIG`), then
    /// environment overrides, then validation.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var("CRITTER_CONFIG").ok().map(PathBuf::from);
        let path = config_path.map(Path::to_path_buf).or(env_path);
        let file_cfg = match path.as_deref() {
            Some(path) => Some(read_config_file(path)?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: WatchdConfigFile) -> Self {
        let camera_file = file.camera.unwrap_or_default();
        let camera = CameraConfig {
            url: camera_file
                .url
                .unwrap_or_else(|| DEFAULT_CAMERA_URL.to_string()),
            width: camera_file.width.unwrap_or(DEFAULT_WIDTH),
            height: camera_file.height.unwrap_or(DEFAULT_HEIGHT),
            warmup: Duration::from_millis(camera_file.warmup_ms.unwrap_or(DEFAULT_WARMUP_MS)),
        };

        let sampling_file = file.sampling.unwrap_or_default();
        let sampling = SamplingSettings {
            skip_interval: sampling_file.skip_interval.unwrap_or(DEFAULT_SKIP_INTERVAL),
            idle_delay: Duration::from_millis(
                sampling_file.idle_delay_ms.unwrap_or(DEFAULT_IDLE_DELAY_MS),
            ),
            post_inference_delay: Duration::from_millis(
                sampling_file
                    .post_inference_delay_ms
                    .unwrap_or(DEFAULT_POST_INFERENCE_DELAY_MS),
            ),
            max_capture_failures: sampling_file
                .max_capture_failures
                .unwrap_or(DEFAULT_MAX_CAPTURE_FAILURES),
        };

        let watch_file = file.watch.unwrap_or_default();
        let watch = WatchSettings {
            labels: watch_file.labels.unwrap_or_else(|| {
                DEFAULT_WATCH_LABELS.iter().map(|s| s.to_string()).collect()
            }),
            min_confidence: watch_file.min_confidence.unwrap_or(DEFAULT_MIN_CONFIDENCE),
        };

        let alert_file = file.alert.unwrap_or_default();
        let alert = AlertSettings {
            min_interval: Duration::from_secs(
                alert_file
                    .min_interval_secs
                    .unwrap_or(DEFAULT_ALERT_MIN_INTERVAL_SECS),
            ),
            image_dir: alert_file.image_dir.unwrap_or_else(|| PathBuf::from(".")),
            chat_id: alert_file.chat_id,
            bot_token: None,
            timeout: Duration::from_secs(
                alert_file.timeout_secs.unwrap_or(DEFAULT_NOTIFY_TIMEOUT_SECS),
            ),
        };

        let detector = DetectorSettings {
            model_path: file.detector.unwrap_or_default().model_path,
        };

        let preview_file = file.preview.unwrap_or_default();
        let preview = PreviewSettings {
            enabled: preview_file.enabled.unwrap_or(false),
            delay: Duration::from_millis(preview_file.delay_ms.unwrap_or(DEFAULT_PREVIEW_DELAY_MS)),
        };

        Self {
            camera,
            sampling,
            watch,
            alert,
            detector,
            preview,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("CRITTER_CAMERA_URL") {
            if !url.trim().is_empty() {
                self.camera.url = url;
            }
        }
        if let Ok(labels) = std::env::var("CRITTER_WATCH_LABELS") {
            let parsed = split_csv(&labels);
            if !parsed.is_empty() {
                self.watch.labels = parsed;
            }
        }
        if let Ok(interval) = std::env::var("CRITTER_SKIP_INTERVAL") {
            self.sampling.skip_interval = interval
                .parse()
                .map_err(|_| anyhow!("CRITTER_SKIP_INTERVAL must be an integer"))?;
        }
        if let Ok(secs) = std::env::var("CRITTER_ALERT_MIN_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| anyhow!("CRITTER_ALERT_MIN_SECS must be an integer number of seconds"))?;
            self.alert.min_interval = Duration::from_secs(secs);
        }
        if let Ok(chat_id) = std::env::var("CRITTER_CHAT_ID") {
            if !chat_id.trim().is_empty() {
                self.alert.chat_id = Some(chat_id);
            }
        }
        if let Ok(token) = std::env::var("CRITTER_BOT_TOKEN") {
            if !token.trim().is_empty() {
                self.alert.bot_token = Some(token);
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling.skip_interval == 0 {
            return Err(ConfigError::InvalidSkipInterval);
        }
        if self.watch.labels.iter().all(|label| label.trim().is_empty()) {
            return Err(ConfigError::EmptyWatchList);
        }
        if !(0.0..=1.0).contains(&self.watch.min_confidence) {
            return Err(ConfigError::InvalidConfidence(self.watch.min_confidence));
        }
        if self.alert.min_interval.is_zero() {
            return Err(ConfigError::InvalidAlertInterval);
        }
        if self.alert.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(ConfigError::InvalidResolution);
        }
        if self.alert.chat_id.is_some() && self.alert.bot_token.is_none() {
            return Err(ConfigError::Invalid(
                "alert.chat_id is set but CRITTER_BOT_TOKEN is not".to_string(),
            ));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<WatchdConfigFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let cfg = serde_json::from_str(&raw)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    Ok(cfg)
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.to_string())
        .collect()
}

//! Alert construction and dispatch.
//!
//! `Alert` is the outbound payload: the triggering frame, the matched labels,
//! and a timestamp that names the image artifact. `AlertGate` sits between
//! the pipeline and the notifier and enforces the minimum inter-alert
//! interval; `Notifier` is the transport seam.

mod gate;
mod notifier;

use std::sync::Arc;

use chrono::{DateTime, Local};

pub use gate::AlertGate;
pub use notifier::{LogNotifier, Notifier, TelegramNotifier};

use crate::frame::Frame;

/// One outbound alert. Created by the pipeline, consumed once by the gate,
/// then discarded; no history is retained.
#[derive(Clone, Debug)]
pub struct Alert {
    pub timestamp: DateTime<Local>,
    pub frame: Arc<Frame>,
    /// Matched watch-list labels, sorted and distinct.
    pub labels: Vec<String>,
}

impl Alert {
    pub fn new(frame: Arc<Frame>, labels: Vec<String>) -> Self {
        Self {
            timestamp: Local::now(),
            frame,
            labels,
        }
    }

    fn timestamp_string(&self) -> String {
        self.timestamp.format("%Y-%m-%d_%H-%M-%S").to_string()
    }

    /// Deterministic artifact name, compatible with the historical
    /// `animal_detected_<timestamp>.jpg` pattern.
    pub fn image_filename(&self) -> String {
        format!("animal_detected_{}.jpg", self.timestamp_string())
    }

    /// Notification caption listing the matched labels.
    pub fn caption(&self) -> String {
        format!(
            "Animal detected at {}!\nDetected: {}",
            self.timestamp_string(),
            self.labels.join(", ")
        )
    }
}

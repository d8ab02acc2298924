use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::alert::{Alert, Notifier};
use crate::error::DeliveryError;

const JPEG_QUALITY: u8 = 85;

/// Debounce layer between the pipeline and the notifier.
///
/// Token-bucket-of-one: an alert offered within `min_interval` of the last
/// successful dispatch is dropped outright (not queued, not merged). An alert
/// that clears the window has its image artifact written to disk, then is
/// forwarded synchronously; `last_dispatch` advances only when the send
/// succeeds, so a transient delivery failure does not extend the suppression
/// window.
pub struct AlertGate {
    min_interval: Duration,
    image_dir: PathBuf,
    notifier: Box<dyn Notifier>,
    last_dispatch: Option<Instant>,
}

impl AlertGate {
    pub fn new(min_interval: Duration, image_dir: PathBuf, notifier: Box<dyn Notifier>) -> Self {
        Self {
            min_interval,
            image_dir,
            notifier,
            last_dispatch: None,
        }
    }

    /// Offer an alert for dispatch. Returns `Ok(true)` when it was sent,
    /// `Ok(false)` when suppressed by the cooldown, `Err` when delivery
    /// failed (the alert is dropped either way; there is no retry).
    pub fn offer(&mut self, alert: &Alert) -> Result<bool, DeliveryError> {
        self.offer_at(alert, Instant::now())
    }

    fn offer_at(&mut self, alert: &Alert, now: Instant) -> Result<bool, DeliveryError> {
        if let Some(last) = self.last_dispatch {
            let since = now.saturating_duration_since(last);
            if since < self.min_interval {
                log::debug!(
                    "alert suppressed ({:?} since last dispatch, cooldown {:?}): {:?}",
                    since,
                    self.min_interval,
                    alert.labels
                );
                return Ok(false);
            }
        }

        let jpeg = alert
            .frame
            .encode_jpeg(JPEG_QUALITY)
            .map_err(DeliveryError::Encode)?;

        // The artifact is written before the send and stays on disk afterwards.
        let path = self.image_dir.join(alert.image_filename());
        std::fs::write(&path, &jpeg)?;
        log::debug!("alert image written to {}", path.display());

        self.notifier.send_photo(&jpeg, &alert.caption())?;
        self.last_dispatch = Some(now);
        Ok(true)
    }
}

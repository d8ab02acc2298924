use std::time::Duration;

use crate::error::DeliveryError;

/// Outbound notification channel.
///
/// `send_photo` is synchronous and must be bounded by a transport timeout;
/// a timeout surfaces as a `DeliveryError` like any other transport failure.
pub trait Notifier: Send {
    fn send_photo(&self, jpeg: &[u8], caption: &str) -> Result<(), DeliveryError>;
}

/// Telegram bot notifier: `sendPhoto` with a multipart upload.
pub struct TelegramNotifier {
    agent: ureq::Agent,
    endpoint: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, chat_id: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            endpoint: format!("https://api.telegram.org/bot{}/sendPhoto", bot_token),
            chat_id: chat_id.into(),
        }
    }

    fn multipart_body(&self, boundary: &str, jpeg: &[u8], caption: &str) -> Vec<u8> {
        let mut body = Vec::with_capacity(jpeg.len() + 512);
        let mut text_part = |name: &str, value: &str| {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        };
        text_part("chat_id", &self.chat_id);
        text_part("caption", caption);
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"photo\"; \
                 filename=\"alert.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(jpeg);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        body
    }
}

impl Notifier for TelegramNotifier {
    fn send_photo(&self, jpeg: &[u8], caption: &str) -> Result<(), DeliveryError> {
        let boundary = format!("critterwatch{:016x}", rand::random::<u64>());
        let body = self.multipart_body(&boundary, jpeg, caption);

        let response = self
            .agent
            .post(&self.endpoint)
            .set(
                "Content-Type",
                &format!("multipart/form-data; boundary={}", boundary),
            )
            .send_bytes(&body);

        match response {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(status, _)) => Err(DeliveryError::Rejected { status }),
            Err(ureq::Error::Transport(transport)) => {
                Err(DeliveryError::Transport(transport.to_string()))
            }
        }
    }
}

/// Fallback notifier used when no chat credential is configured: alerts are
/// reported on the operator log only.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send_photo(&self, jpeg: &[u8], caption: &str) -> Result<(), DeliveryError> {
        log::info!(
            "alert (no notifier configured, {} byte photo): {}",
            jpeg.len(),
            caption.replace('\n', " ")
        );
        Ok(())
    }
}

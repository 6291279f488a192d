//! Best-effort run notifications.

use serde::Serialize;

use crate::error::NotifyError;

/// Sender label shown by the webhook receiver.
pub const WEBHOOK_USERNAME: &str = "GitHub Mirror Bot";

/// Delivers a summary message. Failures are reported to the caller, which
/// logs them and carries on.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
    username: &'a str,
}

/// POSTs `{"content": ..., "username": ...}` to a Discord-compatible webhook.
/// One attempt per message, no retries.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    endpoint: String,
}

impl WebhookNotifier {
    /// `None` for an empty endpoint.
    pub fn new(endpoint: &str) -> Option<Self> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return None;
        }
        Some(Self {
            endpoint: endpoint.to_string(),
        })
    }
}

impl Notifier for WebhookNotifier {
    fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let payload = WebhookPayload {
            content: message,
            username: WEBHOOK_USERNAME,
        };
        // Error text from ureq can include the endpoint, which embeds the
        // webhook token; only the status or transport kind is kept.
        match ureq::post(&self.endpoint).send_json(&payload) {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(code, _)) => Err(NotifyError::Status(code)),
            Err(ureq::Error::Transport(transport)) => {
                Err(NotifyError::Transport(transport.kind().to_string()))
            }
        }
    }
}

//! Notification handlers for alerts and reports

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use super::config::NotifyTarget;

const PUSHOVER_URL: &str = "https://api.pushover.net/1/messages.json";

/// Anything that can deliver a titled message.
///
/// Delivery is fire-and-forget from the caller's point of view: callers log
/// the error and carry on.
#[async_trait]
pub trait Notify: Send + Sync {
    async fn send(&self, title: &str, message: &str) -> Result<(), NotifierError>;
}

/// Notifier fanning a message out to every configured target
pub struct Notifier {
    client: reqwest::Client,
    targets: Vec<NotifyTarget>,
}

impl Notifier {
    /// Create a new notifier
    pub fn new(targets: Vec<NotifyTarget>) -> Result<Self, NotifierError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| NotifierError::Client(e.to_string()))?;
        Ok(Self { client, targets })
    }

    /// Send notification to a single target
    async fn notify_target(
        &self,
        target: &NotifyTarget,
        title: &str,
        message: &str,
    ) -> Result<(), NotifierError> {
        match target {
            NotifyTarget::Log => {
                tracing::warn!(title = %title, "Notification: {}", message);
                Ok(())
            }
            NotifyTarget::Webhook { url, headers } => {
                self.send_webhook(url, headers, title, message).await
            }
            NotifyTarget::Pushover {
                api_token,
                user_key,
            } => self.send_pushover(api_token, user_key, title, message).await,
        }
    }

    /// Send webhook notification
    async fn send_webhook(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        title: &str,
        message: &str,
    ) -> Result<(), NotifierError> {
        let payload = serde_json::json!({
            "title": title,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let mut request = self.client.post(url).json(&payload);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NotifierError::Webhook(format!("Failed to send webhook: {}", e)))?;

        if !response.status().is_success() {
            return Err(NotifierError::Webhook(format!(
                "Webhook returned status {}",
                response.status()
            )));
        }

        tracing::debug!(url = %url, "Webhook notification sent");

        Ok(())
    }

    /// Send Pushover notification
    async fn send_pushover(
        &self,
        api_token: &str,
        user_key: &str,
        title: &str,
        message: &str,
    ) -> Result<(), NotifierError> {
        if api_token.is_empty() || user_key.is_empty() {
            return Err(NotifierError::Pushover(
                "api_token and user_key must both be set".to_string(),
            ));
        }

        let form = [
            ("token", api_token),
            ("user", user_key),
            ("title", title),
            ("message", message),
        ];

        let response = self
            .client
            .post(PUSHOVER_URL)
            .form(&form)
            .send()
            .await
            .map_err(|e| NotifierError::Pushover(format!("Failed to send message: {}", e)))?;

        if !response.status().is_success() {
            return Err(NotifierError::Pushover(format!(
                "Pushover returned status {}",
                response.status()
            )));
        }

        tracing::info!("Pushover notification sent");

        Ok(())
    }
}

#[async_trait]
impl Notify for Notifier {
    /// Send to all targets, collecting failures
    async fn send(&self, title: &str, message: &str) -> Result<(), NotifierError> {
        let mut errors = Vec::new();

        for target in &self.targets {
            if let Err(e) = self.notify_target(target, title, message).await {
                errors.push(e);
            }
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(NotifierError::Multiple(errors)),
        }
    }
}

/// Notifier errors
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("Webhook error: {0}")]
    Webhook(String),

    #[error("Pushover error: {0}")]
    Pushover(String),

    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("Multiple notification failures: {0:?}")]
    Multiple(Vec<NotifierError>),
}

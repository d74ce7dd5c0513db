use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when delivering a message
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("No recipients given")]
    NoRecipients,
}

/// Outbound chat notifications
#[allow(async_fn_in_trait)]
pub trait Notifier {
    /// Send one private message addressed to all `recipients`
    async fn send(&self, recipients: &[&str], content: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Deserialize)]
struct ZulipResponse {
    result: String,
    #[serde(default)]
    msg: String,
}

/// Zulip API client
///
/// Built once by the caller and passed into the daily pipeline.
pub struct ZulipClient {
    base_url: String,
    bot_email: String,
    api_key: String,
    client: Client,
}

impl ZulipClient {
    /// Create a new Zulip client
    pub fn new(
        base_url: String,
        bot_email: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            bot_email,
            api_key,
            client,
        })
    }
}

impl Notifier for ZulipClient {
    async fn send(&self, recipients: &[&str], content: &str) -> Result<(), NotifyError> {
        if recipients.is_empty() {
            return Err(NotifyError::NoRecipients);
        }

        let url = format!("{}/messages", self.base_url.trim_end_matches('/'));
        let to = recipients.join(", ");

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.bot_email, Some(&self.api_key))
            .form(&[("type", "private"), ("to", to.as_str()), ("content", content)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(NotifyError::ApiError(format!(
                "Failed to send message to {}: {} - {}",
                to, status, body
            )));
        }

        let reply: ZulipResponse = response.json().await?;
        if reply.result != "success" {
            return Err(NotifyError::ApiError(reply.msg));
        }

        tracing::debug!("Message delivered to {}", to);

        Ok(())
    }
}

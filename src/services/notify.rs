use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Errors from the notification topic
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("topic returned status {0}")]
    Status(StatusCode),
}

/// Fire-and-forget notification seam: publish (subject, message) to a topic.
/// No delivery tracking beyond the call succeeding.
#[async_trait]
pub trait NotifySink: Send + Sync {
    async fn publish(&self, subject: &str, message: &str) -> Result<(), NotifyError>;
}

/// Publishes alerts to an HTTP topic endpoint.
pub struct TopicPublisher {
    client: Client,
    topic_url: String,
}

impl TopicPublisher {
    pub fn new(topic_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");
        Self { client, topic_url }
    }
}

#[async_trait]
impl NotifySink for TopicPublisher {
    async fn publish(&self, subject: &str, message: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.topic_url)
            .json(&json!({ "subject": subject, "message": message }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status));
        }

        tracing::debug!("Published notification: {}", subject);
        Ok(())
    }
}

//! Outgoing email notifications.
//!
//! Best-effort: a sink always returns an [`EmailRecord`] describing what
//! happened, never an error. A message with no recipients is marked failed
//! without being dispatched.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::types::FeedInventory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailStatus {
    Pending,
    Sent,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRecord {
    pub id: String,
    pub recipients: Vec<String>,
    pub subject: String,
    pub status: EmailStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EmailRecord {
    pub fn pending(message: &EmailMessage) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            recipients: message.recipients.clone(),
            subject: message.subject.clone(),
            status: EmailStatus::Pending,
            created_at: Utc::now(),
            error: None,
        }
    }

    fn sent(mut self) -> Self {
        self.status = EmailStatus::Sent;
        self
    }

    fn failed(mut self, error: impl Into<String>) -> Self {
        self.status = EmailStatus::Failed;
        self.error = Some(error.into());
        self
    }
}

/// Recipients after trimming, with blanks removed.
fn clean_recipients(message: &EmailMessage) -> Vec<String> {
    message
        .recipients
        .iter()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect()
}

#[async_trait]
pub trait EmailSink: Send + Sync {
    async fn send(&self, message: EmailMessage) -> EmailRecord;
}

/// Writes messages to the log and reports them sent.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl EmailSink for LogSink {
    async fn send(&self, message: EmailMessage) -> EmailRecord {
        let record = EmailRecord::pending(&message);
        let recipients = clean_recipients(&message);
        if recipients.is_empty() {
            log::warn!("Email '{}' has no recipients", message.subject);
            return record.failed("no recipients");
        }
        log::info!(
            "Email to {}: {}\n{}",
            recipients.join(", "),
            message.subject,
            message.body
        );
        record.sent()
    }
}

/// POSTs each message as JSON to a webhook. Any non-2xx reply is a failure.
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
        }
    }

    async fn post(&self, message: &EmailMessage) -> Result<(), ServiceError> {
        let resp = self
            .client
            .post(&self.url)
            .timeout(std::time::Duration::from_secs(
                crate::intelligence::REQUEST_TIMEOUT_SECS,
            ))
            .json(message)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl EmailSink for WebhookSink {
    async fn send(&self, message: EmailMessage) -> EmailRecord {
        let record = EmailRecord::pending(&message);
        let recipients = clean_recipients(&message);
        if recipients.is_empty() {
            log::warn!("Email '{}' has no recipients", message.subject);
            return record.failed("no recipients");
        }
        let message = EmailMessage {
            recipients,
            ..message
        };
        match self.post(&message).await {
            Ok(()) => {
                log::info!("Email '{}' delivered to webhook", message.subject);
                record.sent()
            }
            Err(e) => {
                log::warn!("Email '{}' failed: {}", message.subject, e);
                record.failed(e.to_string())
            }
        }
    }
}

/// Pick the sink for a configured webhook URL, logging when none is set.
pub fn sink_from_config(config: &crate::config::FarmConfig) -> Box<dyn EmailSink> {
    match config
        .email_webhook_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
    {
        Some(url) => Box::new(WebhookSink::new(url)),
        None => Box::new(LogSink),
    }
}

/// Compose a reorder reminder for low feed stock. `None` when nothing is low.
pub fn feed_reorder_notice(
    low_stock: &[&FeedInventory],
    recipients: Vec<String>,
) -> Option<EmailMessage> {
    if low_stock.is_empty() {
        return None;
    }
    let subject = if low_stock.len() == 1 {
        format!("Reorder needed: {}", low_stock[0].name)
    } else {
        format!("Reorder needed: {} feed items", low_stock.len())
    };
    let mut body = String::from("The following feed is at or below its reorder level:\n\n");
    for item in low_stock {
        body.push_str(&format!(
            "- {}: {:.0} kg on hand (reorder at {:.0} kg, last restocked {})\n",
            item.name, item.quantity, item.reorder_level, item.last_restocked
        ));
    }
    Some(EmailMessage {
        recipients,
        subject,
        body,
    })
}

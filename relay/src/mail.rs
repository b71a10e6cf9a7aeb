//! Mailer trait and the Brevo transactional-email implementation.

use async_trait::async_trait;
use serde::Serialize;

use crate::config::RelayConfig;

/// Brevo's transactional send endpoint.
pub const BREVO_ENDPOINT: &str = "https://api.brevo.com/v3/smtp/email";

/// Sender display name used when none is configured.
const DEFAULT_SENDER_NAME: &str = "アンケート";

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("BREVO_API_KEY/BREVO_SENDER_EMAIL/BREVO_TO_EMAIL を設定してください。")]
    MissingConfig,

    #[error("failed to reach the mail provider: {0}")]
    Transport(String),

    #[error("Brevo送信に失敗しました。")]
    Rejected { detail: String },
}

/// Async email sending seam.
///
/// Implement this trait to provide alternative providers.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Send a plain-text email with the configured sender and recipient.
    async fn send(&self, subject: &str, text_body: &str) -> Result<(), MailError>;
}

/// `{email, name?}` participant entry in a Brevo send request.
#[derive(Debug, Clone, Serialize)]
pub struct Mailbox {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest<'a> {
    sender: &'a Mailbox,
    to: [&'a Mailbox; 1],
    subject: &'a str,
    text_content: &'a str,
}

/// HTTP mailer against the Brevo API.
#[derive(Debug, Clone)]
pub struct BrevoMailer {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    sender: Mailbox,
    to: Mailbox,
}

impl BrevoMailer {
    /// Builds a mailer when all three required credentials are configured.
    /// Blank values count as missing.
    pub fn from_config(config: &RelayConfig) -> Result<Self, MailError> {
        let (Some(api_key), Some(sender_email), Some(to_email)) = (
            configured(&config.brevo_api_key),
            configured(&config.brevo_sender_email),
            configured(&config.brevo_to_email),
        ) else {
            return Err(MailError::MissingConfig);
        };

        let sender = Mailbox {
            email: sender_email,
            name: Some(
                configured(&config.brevo_sender_name)
                    .unwrap_or_else(|| DEFAULT_SENDER_NAME.to_string()),
            ),
        };
        // recipient name is attached only when configured non-blank
        let to = Mailbox {
            email: to_email,
            name: configured(&config.brevo_to_name),
        };

        Ok(BrevoMailer {
            http: reqwest::Client::new(),
            endpoint: config
                .brevo_endpoint
                .clone()
                .unwrap_or_else(|| BREVO_ENDPOINT.to_string()),
            api_key,
            sender,
            to,
        })
    }

    pub fn sender(&self) -> &Mailbox {
        &self.sender
    }

    pub fn recipient(&self) -> &Mailbox {
        &self.to
    }
}

fn configured(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl Mailer for BrevoMailer {
    async fn send(&self, subject: &str, text_body: &str) -> Result<(), MailError> {
        let request = SendRequest {
            sender: &self.sender,
            to: [&self.to],
            subject,
            text_content: text_body,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| MailError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected { detail });
        }

        Ok(())
    }
}

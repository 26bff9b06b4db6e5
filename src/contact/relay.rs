//! Email relay clients

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// A message handed to the relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub reply_to: String,
    pub html: String,
}

/// Acknowledgement from the relay
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayReceipt {
    #[serde(default)]
    pub id: Option<String>,
}

/// Delivery attempt failed
#[derive(Error, Debug)]
pub enum RelayError {
    /// The relay answered but refused the message
    #[error("relay rejected message ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The relay could not be reached
    #[error("relay request failed: {0}")]
    Transport(String),

    /// No answer within the configured bound
    #[error("relay did not answer within {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        RelayError::Transport(e.to_string())
    }
}

/// Something that can deliver an email
#[async_trait]
pub trait EmailRelay: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<RelayReceipt, RelayError>;
}

/// Relay backed by the Resend HTTP API
pub struct ResendRelay {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl ResendRelay {
    /// Create a configured client; `timeout` bounds every request
    pub fn new(api_key: &str, endpoint: &str, timeout: Duration) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("portfolio-rs/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl EmailRelay for ResendRelay {
    async fn send(&self, email: &OutboundEmail) -> Result<RelayReceipt, RelayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RelayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        // A success status is what matters; an unexpected body is not a failure
        let receipt = response.json::<RelayReceipt>().await.unwrap_or_default();
        Ok(receipt)
    }
}

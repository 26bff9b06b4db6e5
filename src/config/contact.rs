//! Contact relay secrets, supplied by the environment

use std::time::Duration;

use super::ContactConfig;

/// Environment variable holding the relay credential
pub const API_KEY_VAR: &str = "RESEND_API_KEY";

/// Environment variable holding the destination mailbox
pub const RECEIVER_VAR: &str = "CONTACT_FORM_RECEIVER_EMAIL";

/// Everything the contact flow needs to reach the relay.
///
/// Missing secrets are kept as `None` rather than failing start-up: the
/// contact endpoint reports a server misconfiguration per request while
/// the rest of the site keeps serving.
#[derive(Debug, Clone)]
pub struct ContactSettings {
    pub api_key: Option<String>,
    pub receiver: Option<String>,
    pub sender: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl ContactSettings {
    /// Combine the file configuration with secrets from the process environment
    pub fn from_env(config: &ContactConfig) -> Self {
        Self::from_lookup(config, |key| std::env::var(key).ok())
    }

    /// Same as [`ContactSettings::from_env`] with an explicit variable source
    pub fn from_lookup<F>(config: &ContactConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let settings = Self {
            api_key: non_empty(API_KEY_VAR),
            receiver: non_empty(RECEIVER_VAR),
            sender: config.sender.clone(),
            endpoint: config.endpoint.clone(),
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
        };

        if settings.api_key.is_none() {
            tracing::warn!("{} is not set; contact form will be unavailable", API_KEY_VAR);
        }
        if settings.receiver.is_none() {
            tracing::warn!("{} is not set; contact form will be unavailable", RECEIVER_VAR);
        }

        settings
    }
}

//! Contact form submissions
//!
//! A submission moves through validation, a configuration check and a single
//! relay call. It is never retried or persisted; every outcome is reported
//! back to the caller as a [`SubmissionResult`].

mod relay;
mod response;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{ContactSettings, API_KEY_VAR, RECEIVER_VAR};
use crate::content::html_escape;

pub use relay::{EmailRelay, OutboundEmail, RelayError, RelayReceipt, ResendRelay};
pub use response::{invalid_request, ContactReply};

lazy_static! {
    static ref MAILBOX: Regex = Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").unwrap();
}

/// Raw request body, before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A validated submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Form field names, as the client sends them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Message => "message",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What was wrong with a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputProblem {
    Missing,
    InvalidEmail,
}

impl fmt::Display for InputProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputProblem::Missing => f.write_str("is required"),
            InputProblem::InvalidEmail => f.write_str("is not a valid email address"),
        }
    }
}

/// Why a submission failed
#[derive(Error, Debug)]
pub enum FailureKind {
    #[error("invalid input: {field} {problem}")]
    InvalidInput { field: Field, problem: InputProblem },

    #[error("server misconfigured: {missing} is not set")]
    ServerMisconfigured { missing: &'static str },

    /// A credential is set but the relay client could not be built
    #[error("email relay client unavailable: {0}")]
    RelayUnavailable(String),

    #[error(transparent)]
    RelayError(#[from] RelayError),
}

/// Outcome of one submission
#[derive(Debug)]
pub enum SubmissionResult {
    Succeeded,
    Failed(FailureKind),
}

impl SubmissionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionResult::Succeeded)
    }
}

/// Check required fields and the mailbox pattern, in form order
pub fn validate_input(input: &ContactInput) -> Result<ContactMessage, FailureKind> {
    let required = |value: &Option<String>, field: Field| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or(FailureKind::InvalidInput {
                field,
                problem: InputProblem::Missing,
            })
    };

    let name = required(&input.name, Field::Name)?;
    let email = required(&input.email, Field::Email)?;
    if !is_valid_email(&email) {
        return Err(FailureKind::InvalidInput {
            field: Field::Email,
            problem: InputProblem::InvalidEmail,
        });
    }
    let message = required(&input.message, Field::Message)?;

    Ok(ContactMessage {
        name,
        email,
        message,
    })
}

/// Simple mailbox check: local part, `@`, domain with a 2+ letter TLD
pub fn is_valid_email(email: &str) -> bool {
    MAILBOX.is_match(email)
}

/// Build the outbound email for a validated submission
pub fn compose(message: &ContactMessage, sender: &str, receiver: &str) -> OutboundEmail {
    let body = html_escape(&message.message.replace("\r\n", "\n")).replace('\n', "<br>");

    OutboundEmail {
        from: sender.to_string(),
        to: vec![receiver.to_string()],
        subject: format!("New Contact Form Submission from {}", message.name),
        reply_to: message.email.clone(),
        html: format!(
            "<p>You received a new message from your portfolio contact form:</p>\n\
             <p><strong>Name:</strong> {}</p>\n\
             <p><strong>Email:</strong> {}</p>\n\
             <p><strong>Message:</strong></p>\n\
             <p>{}</p>\n",
            html_escape(&message.name),
            html_escape(&message.email),
            body
        ),
    }
}

/// Validates submissions and relays them to the site owner
#[derive(Clone)]
pub struct ContactService {
    relay: Option<Arc<dyn EmailRelay>>,
    /// Why the relay is absent even though a credential was configured
    relay_problem: Option<String>,
    receiver: Option<String>,
    sender: String,
    timeout: Duration,
}

impl ContactService {
    pub fn new(
        relay: Option<Arc<dyn EmailRelay>>,
        receiver: Option<String>,
        sender: &str,
        timeout: Duration,
    ) -> Self {
        Self {
            relay,
            relay_problem: None,
            receiver,
            sender: sender.to_string(),
            timeout,
        }
    }

    /// Service whose relay client failed to build; every valid submission
    /// reports [`FailureKind::RelayUnavailable`]
    pub fn unavailable(
        problem: impl Into<String>,
        receiver: Option<String>,
        sender: &str,
        timeout: Duration,
    ) -> Self {
        Self {
            relay_problem: Some(problem.into()),
            ..Self::new(None, receiver, sender, timeout)
        }
    }

    /// Service backed by the Resend API, if a credential is configured
    pub fn from_settings(settings: &ContactSettings) -> Self {
        let relay = match settings.api_key.as_deref() {
            Some(key) => match ResendRelay::new(key, &settings.endpoint, settings.timeout) {
                Ok(relay) => Some(Arc::new(relay) as Arc<dyn EmailRelay>),
                Err(e) => {
                    tracing::error!("Failed to create email relay client: {}", e);
                    return Self::unavailable(
                        e.to_string(),
                        settings.receiver.clone(),
                        &settings.sender,
                        settings.timeout,
                    );
                }
            },
            None => None,
        };
        Self::new(
            relay,
            settings.receiver.clone(),
            &settings.sender,
            settings.timeout,
        )
    }

    /// Run one submission to completion
    pub async fn submit(&self, input: ContactInput) -> SubmissionResult {
        match self.try_submit(input).await {
            Ok(()) => SubmissionResult::Succeeded,
            Err(kind) => SubmissionResult::Failed(kind),
        }
    }

    async fn try_submit(&self, input: ContactInput) -> Result<(), FailureKind> {
        let message = validate_input(&input)?;
        tracing::info!(
            "Contact form submission received from {} <{}>",
            message.name,
            message.email
        );

        if let Some(problem) = &self.relay_problem {
            tracing::error!("Email relay client is unavailable: {}", problem);
            return Err(FailureKind::RelayUnavailable(problem.clone()));
        }
        let Some(relay) = &self.relay else {
            tracing::error!("{} environment variable is not set.", API_KEY_VAR);
            return Err(FailureKind::ServerMisconfigured {
                missing: API_KEY_VAR,
            });
        };
        let Some(receiver) = &self.receiver else {
            tracing::error!("{} environment variable is not set.", RECEIVER_VAR);
            return Err(FailureKind::ServerMisconfigured {
                missing: RECEIVER_VAR,
            });
        };

        let email = compose(&message, &self.sender, receiver);
        let receipt = match tokio::time::timeout(self.timeout, relay.send(&email)).await {
            Ok(result) => result,
            Err(_) => Err(RelayError::Timeout(self.timeout)),
        }
        .map_err(|e| {
            tracing::error!("Error sending email via relay: {}", e);
            e
        })?;

        tracing::info!("Email sent successfully (id: {:?})", receipt.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Relay double that records what it was asked to send
    #[derive(Default)]
    struct MockRelay {
        calls: AtomicUsize,
        reject: bool,
        delay: Option<Duration>,
        sent: Mutex<Vec<OutboundEmail>>,
    }

    #[async_trait::async_trait]
    impl EmailRelay for MockRelay {
        async fn send(&self, email: &OutboundEmail) -> Result<RelayReceipt, RelayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.sent.lock().unwrap().push(email.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.reject {
                return Err(RelayError::Rejected {
                    status: 422,
                    message: "invalid from address".to_string(),
                });
            }
            Ok(RelayReceipt {
                id: Some("msg_1".to_string()),
            })
        }
    }

    fn service(relay: Arc<MockRelay>) -> ContactService {
        ContactService::new(
            Some(relay as Arc<dyn EmailRelay>),
            Some("owner@example.com".to_string()),
            "Portfolio Contact Form <onboarding@resend.dev>",
            Duration::from_secs(5),
        )
    }

    fn input(name: &str, email: &str, message: &str) -> ContactInput {
        ContactInput {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            message: Some(message.to_string()),
        }
    }

    fn assert_invalid(result: SubmissionResult, expected: Field, expected_problem: InputProblem) {
        match result {
            SubmissionResult::Failed(FailureKind::InvalidInput { field, problem }) => {
                assert_eq!(field, expected);
                assert_eq!(problem, expected_problem);
            }
            other => panic!("expected invalid input, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_successful_submission() {
        let relay = Arc::new(MockRelay::default());
        let result = service(relay.clone())
            .submit(input("Ada", "ada@example.com", "Hello\nthere"))
            .await;
        assert!(result.is_success());
        assert_eq!(relay.calls.load(Ordering::SeqCst), 1);

        let sent = relay.sent.lock().unwrap();
        assert_eq!(sent[0].to, vec!["owner@example.com"]);
        assert_eq!(sent[0].reply_to, "ada@example.com");
        assert_eq!(sent[0].subject, "New Contact Form Submission from Ada");
        assert!(sent[0].html.contains("Hello<br>there"));
    }

    #[tokio::test]
    async fn test_empty_message_never_reaches_relay() {
        let relay = Arc::new(MockRelay::default());
        let result = service(relay.clone())
            .submit(input("Ada", "ada@example.com", "   "))
            .await;
        assert_invalid(result, Field::Message, InputProblem::Missing);
        assert_eq!(relay.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_name() {
        let relay = Arc::new(MockRelay::default());
        let result = service(relay.clone())
            .submit(ContactInput {
                name: None,
                ..input("", "ada@example.com", "Hi")
            })
            .await;
        assert_invalid(result, Field::Name, InputProblem::Missing);
        assert_eq!(relay.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bad_email() {
        let relay = Arc::new(MockRelay::default());
        let result = service(relay.clone())
            .submit(input("Ada", "not-an-email", "Hi"))
            .await;
        assert_invalid(result, Field::Email, InputProblem::InvalidEmail);
        assert_eq!(relay.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_relay_rejection() {
        let relay = Arc::new(MockRelay {
            reject: true,
            ..MockRelay::default()
        });
        let result = service(relay.clone())
            .submit(input("Ada", "ada@example.com", "Hi"))
            .await;
        assert!(matches!(
            result,
            SubmissionResult::Failed(FailureKind::RelayError(RelayError::Rejected { .. }))
        ));
        assert_eq!(relay.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_relay_timeout() {
        let relay = Arc::new(MockRelay {
            delay: Some(Duration::from_secs(10)),
            ..MockRelay::default()
        });
        let service = ContactService::new(
            Some(relay.clone() as Arc<dyn EmailRelay>),
            Some("owner@example.com".to_string()),
            "form@example.com",
            Duration::from_millis(50),
        );
        let result = service.submit(input("Ada", "ada@example.com", "Hi")).await;
        assert!(matches!(
            result,
            SubmissionResult::Failed(FailureKind::RelayError(RelayError::Timeout(_)))
        ));
    }

    #[tokio::test]
    async fn test_relay_client_failure_is_not_a_missing_key() {
        let service = ContactService::unavailable(
            "builder error",
            Some("owner@example.com".to_string()),
            "form@example.com",
            Duration::from_secs(5),
        );
        match service.submit(input("Ada", "ada@example.com", "Hi")).await {
            SubmissionResult::Failed(FailureKind::RelayUnavailable(problem)) => {
                assert_eq!(problem, "builder error")
            }
            other => panic!("unexpected result: {other:?}"),
        }

        // Bad input is still reported first
        assert!(matches!(
            service.submit(input("Ada", "nope", "Hi")).await,
            SubmissionResult::Failed(FailureKind::InvalidInput { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_configuration() {
        let no_key = ContactService::new(
            None,
            Some("owner@example.com".to_string()),
            "form@example.com",
            Duration::from_secs(5),
        );
        assert!(matches!(
            no_key.submit(input("Ada", "ada@example.com", "Hi")).await,
            SubmissionResult::Failed(FailureKind::ServerMisconfigured {
                missing: API_KEY_VAR
            })
        ));

        let relay = Arc::new(MockRelay::default());
        let no_receiver = ContactService::new(
            Some(relay.clone() as Arc<dyn EmailRelay>),
            None,
            "form@example.com",
            Duration::from_secs(5),
        );
        assert!(matches!(
            no_receiver.submit(input("Ada", "ada@example.com", "Hi")).await,
            SubmissionResult::Failed(FailureKind::ServerMisconfigured {
                missing: RECEIVER_VAR
            })
        ));
        assert_eq!(relay.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("tyler@example.com"));
        assert!(is_valid_email("First.Last+tag@sub.Example.CO"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@b.c"));
        assert!(!is_valid_email("spaces in@example.com"));
    }

    #[test]
    fn test_compose_escapes_html() {
        let message = ContactMessage {
            name: "<script>".to_string(),
            email: "x@example.com".to_string(),
            message: "line one\r\nline <two>".to_string(),
        };
        let email = compose(&message, "from@example.com", "to@example.com");
        assert!(email.html.contains("&lt;script&gt;"));
        assert!(email.html.contains("line one<br>line &lt;two&gt;"));
        assert!(!email.html.contains("<script>"));
    }
}

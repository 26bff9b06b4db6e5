//! Mapping submission outcomes to HTTP responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use super::{FailureKind, InputProblem, SubmissionResult};

/// JSON body returned by the contact endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

impl ContactReply {
    fn ok(message: &str) -> Self {
        Self {
            message: Some(message.to_string()),
            error: None,
            field: None,
        }
    }

    fn error(error: &str) -> Self {
        Self {
            message: None,
            error: Some(error.to_string()),
            field: None,
        }
    }
}

impl SubmissionResult {
    /// Status code and body the client sees for this outcome
    pub fn reply(&self) -> (StatusCode, ContactReply) {
        match self {
            SubmissionResult::Succeeded => {
                (StatusCode::OK, ContactReply::ok("Message sent successfully!"))
            }
            SubmissionResult::Failed(FailureKind::InvalidInput { field, problem }) => {
                let error = match problem {
                    InputProblem::Missing => "Missing required fields",
                    InputProblem::InvalidEmail => "Invalid email address",
                };
                let reply = ContactReply {
                    field: Some(field.as_str()),
                    ..ContactReply::error(error)
                };
                (StatusCode::BAD_REQUEST, reply)
            }
            SubmissionResult::Failed(
                FailureKind::ServerMisconfigured { .. } | FailureKind::RelayUnavailable(_),
            ) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ContactReply::error("Server configuration error."),
            ),
            SubmissionResult::Failed(FailureKind::RelayError(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ContactReply::error("Failed to send message."),
            ),
        }
    }
}

impl IntoResponse for SubmissionResult {
    fn into_response(self) -> Response {
        let (status, reply) = self.reply();
        (status, Json(reply)).into_response()
    }
}

/// Response for a body that is not a JSON object of strings
pub fn invalid_request() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ContactReply::error("Invalid request format.")),
    )
        .into_response()
}

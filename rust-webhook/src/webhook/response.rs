//! Mapping from pipeline outcome to HTTP response.

use super::signature::SignatureVerification;

/// How a request left the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    MissingSignature,
    MissingSecret,
    SignatureMismatch,
    /// Verified, but not an event type this service handles.
    UnsupportedEvent(String),
    /// Verified workflow_job event, archived and, when queued, provisioned.
    Accepted { provisioned: bool },
}

impl Outcome {
    /// The terminal outcome for a failed verification, `None` once verified.
    pub fn from_verification(result: SignatureVerification) -> Option<Self> {
        match result {
            SignatureVerification::Verified => None,
            SignatureVerification::MissingSignature => Some(Outcome::MissingSignature),
            SignatureVerification::MissingSecret => Some(Outcome::MissingSecret),
            SignatureVerification::SignatureMismatch => Some(Outcome::SignatureMismatch),
        }
    }
}

/// Transport-neutral response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status_code: u16,
    pub body: Option<String>,
}

impl Response {
    pub fn status(status_code: u16) -> Self {
        Self {
            status_code,
            body: None,
        }
    }
}

pub fn build_response(outcome: &Outcome) -> Response {
    match outcome {
        Outcome::MissingSignature | Outcome::MissingSecret => Response::status(500),
        Outcome::SignatureMismatch => Response::status(401),
        Outcome::UnsupportedEvent(event_type) => Response {
            status_code: 202,
            body: Some(format!("Ignoring unsupported event {}", event_type)),
        },
        Outcome::Accepted { .. } => Response::status(201),
    }
}

//! Fatal errors raised by the webhook pipeline.
//!
//! Rejected signatures and unsupported events are not errors; they are
//! ordinary outcomes mapped to status codes by [`build_response`]. Only
//! failures of the external capabilities, or a verified body that cannot be
//! read, end up here.
//!
//! [`build_response`]: crate::webhook::build_response

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebhookError {
    /// The secret store could not be reached.
    #[error("failed to fetch webhook secret: {0:#}")]
    SecretFetch(#[source] anyhow::Error),

    /// A queue rejected or failed to confirm a message.
    #[error("failed to enqueue message to {queue}: {source:#}")]
    Enqueue {
        queue: String,
        #[source]
        source: anyhow::Error,
    },

    /// A verified workflow_job body that is not a well-formed event.
    #[error("malformed workflow_job payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

pub type Result<T, E = WebhookError> = std::result::Result<T, E>;

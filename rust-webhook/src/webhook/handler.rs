//! The webhook pipeline.
//!
//! ```text
//! headers → normalize → verify → route → dispatch → response
//! ```
//!
//! A failed verification stops the pipeline before the body is read.

use tracing::Instrument;

use crate::error::Result;
use crate::queue::EventSink;
use crate::secrets::SecretStore;

use super::headers::{normalize_headers, NormalizedHeaders};
use super::response::{build_response, Outcome, Response};
use super::router::{route, RouteDecision};
use super::signature::verify;

/// Handle one webhook delivery with raw, mixed-case headers.
pub async fn handle<I, K, V>(
    headers: I,
    body: &str,
    secrets: &dyn SecretStore,
    secret_name: &str,
    sink: &dyn EventSink,
) -> Result<Response>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let headers = normalize_headers(headers);
    handle_normalized(&headers, body, secrets, secret_name, sink).await
}

/// Handle one webhook delivery whose headers are already normalized.
pub async fn handle_normalized(
    headers: &NormalizedHeaders,
    body: &str,
    secrets: &dyn SecretStore,
    secret_name: &str,
    sink: &dyn EventSink,
) -> Result<Response> {
    let outcome = process(headers, body, secrets, secret_name, sink).await?;
    Ok(build_response(&outcome))
}

/// Run the pipeline and report how the request ended.
///
/// # Errors
///
/// Secret store and queue failures, and malformed `workflow_job` bodies,
/// are returned as errors; no response is built for them.
pub async fn process(
    headers: &NormalizedHeaders,
    body: &str,
    secrets: &dyn SecretStore,
    secret_name: &str,
    sink: &dyn EventSink,
) -> Result<Outcome> {
    let event_type = headers.event_type();

    let verification = verify(event_type, headers, body.as_bytes(), secrets, secret_name).await?;
    if let Some(rejected) = Outcome::from_verification(verification) {
        return Ok(rejected);
    }

    match route(event_type, headers.delivery_id(), body)? {
        RouteDecision::Ignored(_) => Ok(Outcome::UnsupportedEvent(event_type.to_string())),
        RouteDecision::WorkflowJob(routed) => {
            let span = routed.fields.span();
            super::dispatch::dispatch(*routed, sink).instrument(span).await
        }
    }
}

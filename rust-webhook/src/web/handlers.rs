//! Webhook endpoint handlers.
//!
//! These handlers only adapt HTTP to the pipeline in [`crate::webhook`];
//! all decisions are made there.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::queue::EventSink;
use crate::secrets::SecretStore;
use crate::webhook::{handle_normalized, NormalizedHeaders};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub secrets: Arc<dyn SecretStore>,
    pub sink: Arc<dyn EventSink>,
}

impl AppState {
    pub fn new(
        config: Config,
        secrets: Arc<dyn SecretStore>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            secrets,
            sink,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// GitHub Webhook
// =============================================================================

/// GitHub webhook endpoint.
///
/// The body is taken as a raw string because the signature covers the exact
/// bytes GitHub sent.
pub async fn github_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let headers = NormalizedHeaders::from(&headers);

    let result = handle_normalized(
        &headers,
        &body,
        state.secrets.as_ref(),
        &state.config.webhook_secret_name,
        state.sink.as_ref(),
    )
    .await;

    match result {
        Ok(response) => {
            let status = StatusCode::from_u16(response.status_code)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            match response.body {
                Some(body) => (status, body).into_response(),
                None => status.into_response(),
            }
        }
        Err(e) => {
            error!(
                error = %e,
                event = %headers.event_type(),
                delivery_id = headers.delivery_id().unwrap_or_default(),
                "github_webhook_failed"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    use crate::queue::sink::RecordingSink;
    use crate::secrets::StaticSecretStore;
    use crate::webhook::{sign_payload, SignatureAlgorithm};

    const SECRET: &str = "TEST_SECRET";

    fn state(sink: Arc<RecordingSink>) -> AppState {
        let config = Config {
            port: 8080,
            max_body_bytes: crate::config::DEFAULT_MAX_BODY_BYTES,
            amqp_url: "amqp://localhost:5672".to_string(),
            webhook_secret_name: "WEBHOOK_SECRET".to_string(),
            action_request_queue: "action_requests".to_string(),
            workflow_job_queue: Some("workflow_jobs".to_string()),
        };
        AppState::new(config, Arc::new(StaticSecretStore(SECRET.to_string())), sink)
    }

    fn signed_headers(event: &'static str, body: &str) -> HeaderMap {
        let signature = sign_payload(SignatureAlgorithm::Sha256, SECRET, body.as_bytes()).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("x-github-event", HeaderValue::from_static(event));
        headers.insert("x-hub-signature-256", HeaderValue::from_str(&signature).unwrap());
        headers
    }

    const QUEUED: &str = r#"{"action":"queued","workflow_job":{"id":1,"name":"build","status":"queued"},"repository":{"name":"runners","full_name":"acme/runners","owner":{"login":"acme"}},"installation":null}"#;

    #[tokio::test]
    async fn test_github_webhook_created() {
        let sink = Arc::new(RecordingSink::new());
        let response = github_webhook(
            State(state(sink.clone())),
            signed_headers("workflow_job", QUEUED),
            QUEUED.to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(sink.action_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_github_webhook_unsupported_event() {
        let sink = Arc::new(RecordingSink::new());
        let response = github_webhook(
            State(state(sink.clone())),
            signed_headers("push", QUEUED),
            QUEUED.to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(sink.workflow_job_events().is_empty());
    }

    #[tokio::test]
    async fn test_github_webhook_unauthorized() {
        let sink = Arc::new(RecordingSink::new());
        let mut headers = signed_headers("workflow_job", "other body");
        headers.insert("x-github-delivery", HeaderValue::from_static("abc"));
        let response = github_webhook(State(state(sink.clone())), headers, QUEUED.to_string()).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(sink.action_requests().is_empty());
    }

    #[tokio::test]
    async fn test_github_webhook_non_utf8_sha256_does_not_fall_back_to_sha1() {
        let sink = Arc::new(RecordingSink::new());
        let sha1 = sign_payload(SignatureAlgorithm::Sha1, SECRET, QUEUED.as_bytes()).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("x-github-event", HeaderValue::from_static("workflow_job"));
        headers.insert("x-hub-signature-256", HeaderValue::from_bytes(b"sha256=\xff").unwrap());
        headers.insert("x-hub-signature", HeaderValue::from_str(&sha1).unwrap());

        let response = github_webhook(State(state(sink.clone())), headers, QUEUED.to_string()).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(sink.action_requests().is_empty());
        assert!(sink.workflow_job_events().is_empty());
    }

    #[tokio::test]
    async fn test_github_webhook_enqueue_failure_is_500() {
        let sink = Arc::new(RecordingSink {
            fail_workflow_job_events: true,
            ..RecordingSink::new()
        });
        let response = github_webhook(
            State(state(sink.clone())),
            signed_headers("workflow_job", QUEUED),
            QUEUED.to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

//! Event routing: decides what a verified event leads to.
//!
//! Only `workflow_job` events are handled. Every other event type is
//! acknowledged with 202 and dropped.

use serde_json::Value;
use tracing::{info, warn};

use crate::error::Result;

use super::event::{repository_full_name, LogFields, WorkflowJobAction, WorkflowJobEvent, WORKFLOW_JOB_EVENT};
use super::response::{build_response, Outcome, Response};

/// A verified `workflow_job` event ready for dispatch.
#[derive(Debug, Clone)]
pub struct RoutedEvent {
    pub event_type: String,
    pub event: WorkflowJobEvent,
    /// The complete payload as received, for archiving.
    pub payload: Value,
    pub fields: LogFields,
    pub should_dispatch_provisioning_request: bool,
}

#[derive(Debug, Clone)]
pub enum RouteDecision {
    Ignored(Response),
    WorkflowJob(Box<RoutedEvent>),
}

pub fn is_supported_event(event_type: &str) -> bool {
    event_type == WORKFLOW_JOB_EVENT
}

/// Only a queued job needs a runner.
pub fn should_dispatch_provisioning_request(action: &WorkflowJobAction) -> bool {
    *action == WorkflowJobAction::Queued
}

/// Route a verified request.
///
/// # Errors
///
/// Returns [`WebhookError::MalformedPayload`] when a `workflow_job` body is
/// not valid JSON or lacks the fields read from it.
///
/// [`WebhookError::MalformedPayload`]: crate::error::WebhookError::MalformedPayload
pub fn route(event_type: &str, delivery_id: Option<&str>, body: &str) -> Result<RouteDecision> {
    if !is_supported_event(event_type) {
        warn!(
            event = %event_type,
            delivery_id = delivery_id.unwrap_or_default(),
            repository = %repository_full_name(body).unwrap_or_default(),
            "webhook_event_unsupported"
        );
        let outcome = Outcome::UnsupportedEvent(event_type.to_string());
        return Ok(RouteDecision::Ignored(build_response(&outcome)));
    }

    let payload: Value = serde_json::from_str(body)?;
    let event: WorkflowJobEvent = serde_json::from_value(payload.clone())?;
    let fields = LogFields::from_event(event_type, delivery_id, &event);

    info!(
        event = %fields.event,
        delivery_id = %fields.delivery_id,
        repository = %fields.repository,
        action = %fields.action,
        name = %fields.name,
        status = %fields.status,
        workflow_job_id = fields.workflow_job_id,
        started_at = %fields.started_at,
        completed_at = %fields.completed_at,
        conclusion = %fields.conclusion,
        "webhook_event_processing"
    );

    Ok(RouteDecision::WorkflowJob(Box::new(RoutedEvent {
        event_type: event_type.to_string(),
        should_dispatch_provisioning_request: should_dispatch_provisioning_request(&event.action),
        event,
        payload,
        fields,
    })))
}

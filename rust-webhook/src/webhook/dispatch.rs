//! Fan-out of a routed `workflow_job` event to the two queues.
//!
//! ```text
//! RoutedEvent ─┬→ ActionRequest            (action == queued only)
//!              └→ WorkflowJobEventMessage  (always, after the request)
//! ```

use tracing::info;

use crate::error::{Result, WebhookError};
use crate::queue::{ActionRequest, EventSink, WorkflowJobEventMessage};

use super::event::WorkflowJobEvent;
use super::response::Outcome;
use super::router::RoutedEvent;

/// Build the provisioning request for a queued job.
pub fn action_request(event_type: &str, event: &WorkflowJobEvent) -> ActionRequest {
    ActionRequest {
        id: event.workflow_job.id,
        repository_name: event.repository.name.clone(),
        repository_owner: event.repository.owner.login.clone(),
        event_type: event_type.to_string(),
        installation_id: event.installation_id(),
    }
}

/// Send the provisioning request (queued jobs only), then archive the event.
///
/// Each message is sent at most once per call. A failure of either queue
/// aborts the request; nothing is retried here.
pub async fn dispatch(routed: RoutedEvent, sink: &dyn EventSink) -> Result<Outcome> {
    let RoutedEvent {
        event_type,
        event,
        payload,
        fields,
        should_dispatch_provisioning_request,
    } = routed;

    if should_dispatch_provisioning_request {
        let request = action_request(&event_type, &event);
        sink.send_action_request(&request)
            .await
            .map_err(|source| WebhookError::Enqueue {
                queue: sink.action_request_queue().to_string(),
                source,
            })?;
        info!(
            repository = %fields.repository,
            workflow_job_id = request.id,
            installation_id = request.installation_id,
            "workflow_job_queued"
        );
    }

    let message = WorkflowJobEventMessage::new(payload);
    sink.send_workflow_job_event(&message)
        .await
        .map_err(|source| WebhookError::Enqueue {
            queue: sink.workflow_job_queue().unwrap_or_default().to_string(),
            source,
        })?;

    Ok(Outcome::Accepted {
        provisioned: should_dispatch_provisioning_request,
    })
}

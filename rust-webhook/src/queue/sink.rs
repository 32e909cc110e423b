//! Outbound enqueue capabilities used by the dispatch stage.

use anyhow::Result;
use async_trait::async_trait;

use super::types::{ActionRequest, WorkflowJobEventMessage};

/// Destination for the two messages produced by a workflow_job event.
///
/// Implementations perform a single attempt per call; retry belongs to the
/// caller or the upstream webhook delivery.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Name of the provisioning queue, used in error reports.
    fn action_request_queue(&self) -> &str;

    /// Name of the archival queue, if one is configured.
    fn workflow_job_queue(&self) -> Option<&str>;

    /// Enqueue a provisioning request.
    async fn send_action_request(&self, request: &ActionRequest) -> Result<()>;

    /// Enqueue an archived event. A no-op when no archival queue is configured.
    async fn send_workflow_job_event(&self, message: &WorkflowJobEventMessage) -> Result<()>;
}

#[cfg(test)]
pub use recording::RecordingSink;

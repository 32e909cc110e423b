//! Queue message types for the two-queue fan-out.
//!
//! This module defines the message formats for:
//! - the action request queue: provisioning requests for queued jobs
//! - the workflow job queue: raw workflow_job events archived for metrics

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Action Request (provisioning queue)
// =============================================================================

/// Request to provision a runner for a queued workflow job.
///
/// Field names are camelCase to stay compatible with the provisioning
/// consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    /// Workflow job id
    pub id: u64,
    /// Repository name without the owner
    pub repository_name: String,
    /// Login of the repository owner
    pub repository_owner: String,
    /// GitHub event type that produced this request
    pub event_type: String,
    /// GitHub App installation id, 0 when the event carried none
    pub installation_id: u64,
}

impl ActionRequest {
    /// Message id used for broker-side tracking.
    pub fn message_id(&self) -> String {
        format!("action-request-{}", self.id)
    }
}

// =============================================================================
// Workflow Job Event (archival queue)
// =============================================================================

/// Full workflow_job payload, archived as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowJobEventMessage {
    pub workflow_job_event: Value,
}

impl WorkflowJobEventMessage {
    pub fn new(workflow_job_event: Value) -> Self {
        Self { workflow_job_event }
    }

    /// Message id used for broker-side tracking.
    pub fn message_id(&self) -> String {
        let job_id = self
            .workflow_job_event
            .pointer("/workflow_job/id")
            .and_then(Value::as_u64)
            .unwrap_or_default();
        let action = self
            .workflow_job_event
            .get("action")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        format!("workflow-job-{}-{}", job_id, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_request_uses_camel_case() {
        let request = ActionRequest {
            id: 42,
            repository_name: "runners".to_string(),
            repository_owner: "acme".to_string(),
            event_type: "workflow_job".to_string(),
            installation_id: 0,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            json!({
                "id": 42,
                "repositoryName": "runners",
                "repositoryOwner": "acme",
                "eventType": "workflow_job",
                "installationId": 0
            })
        );
        assert_eq!(request.message_id(), "action-request-42");
    }

    #[test]
    fn test_workflow_job_event_message_wraps_payload() {
        let payload = json!({
            "action": "completed",
            "workflow_job": { "id": 7, "conclusion": "success" }
        });
        let message = WorkflowJobEventMessage::new(payload.clone());

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["workflowJobEvent"], payload);
        assert_eq!(message.message_id(), "workflow-job-7-completed");
    }

    #[test]
    fn test_workflow_job_event_message_id_without_job() {
        let message = WorkflowJobEventMessage::new(json!({}));
        assert_eq!(message.message_id(), "workflow-job-0-unknown");
    }
}

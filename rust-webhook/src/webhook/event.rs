//! GitHub `workflow_job` event payload and the per-request log context.

use serde::Deserialize;
use serde_json::Value;
use tracing::{info_span, Span};

/// The only event type this service acts on.
pub const WORKFLOW_JOB_EVENT: &str = "workflow_job";

/// Phase of a workflow job reported by the event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum WorkflowJobAction {
    Queued,
    InProgress,
    Completed,
    Waiting,
    Other(String),
}

impl From<String> for WorkflowJobAction {
    fn from(action: String) -> Self {
        match action.as_str() {
            "queued" => WorkflowJobAction::Queued,
            "in_progress" => WorkflowJobAction::InProgress,
            "completed" => WorkflowJobAction::Completed,
            "waiting" => WorkflowJobAction::Waiting,
            _ => WorkflowJobAction::Other(action),
        }
    }
}

impl WorkflowJobAction {
    pub fn as_str(&self) -> &str {
        match self {
            WorkflowJobAction::Queued => "queued",
            WorkflowJobAction::InProgress => "in_progress",
            WorkflowJobAction::Completed => "completed",
            WorkflowJobAction::Waiting => "waiting",
            WorkflowJobAction::Other(action) => action,
        }
    }
}

/// The fields of a `workflow_job` webhook this service reads.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowJobEvent {
    pub action: WorkflowJobAction,
    pub workflow_job: WorkflowJob,
    pub repository: Repository,
    /// Absent or `null` for events not delivered through a GitHub App.
    #[serde(default)]
    pub installation: Option<Installation>,
}

impl WorkflowJobEvent {
    /// Installation id, or 0 when the event carries none.
    pub fn installation_id(&self) -> u64 {
        self.installation.as_ref().map(|i| i.id).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowJob {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub conclusion: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub owner: Owner,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Installation {
    pub id: u64,
}

/// Best-effort `repository.full_name` from any event body.
///
/// Used only to label logs for events that are otherwise ignored.
pub fn repository_full_name(body: &str) -> Option<String> {
    let payload: Value = serde_json::from_str(body).ok()?;
    payload
        .pointer("/repository/full_name")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Observability fields for one request.
///
/// Built once per request from the verified event and handed to each later
/// stage, so nothing is shared between concurrent requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFields {
    pub event: String,
    pub delivery_id: String,
    pub repository: String,
    pub action: String,
    pub name: String,
    pub status: String,
    pub workflow_job_id: u64,
    pub started_at: String,
    pub completed_at: String,
    pub conclusion: String,
}

impl LogFields {
    pub fn from_event(event_type: &str, delivery_id: Option<&str>, event: &WorkflowJobEvent) -> Self {
        let job = &event.workflow_job;
        Self {
            event: event_type.to_string(),
            delivery_id: delivery_id.unwrap_or_default().to_string(),
            repository: event.repository.full_name.clone(),
            action: event.action.as_str().to_string(),
            name: job.name.clone(),
            status: job.status.clone(),
            workflow_job_id: job.id,
            started_at: job.started_at.clone().unwrap_or_default(),
            completed_at: job.completed_at.clone().unwrap_or_default(),
            conclusion: job.conclusion.clone().unwrap_or_default(),
        }
    }

    /// A span carrying every field, for instrumenting the later stages.
    pub fn span(&self) -> Span {
        info_span!(
            "workflow_job",
            event = %self.event,
            delivery_id = %self.delivery_id,
            repository = %self.repository,
            action = %self.action,
            name = %self.name,
            status = %self.status,
            workflow_job_id = self.workflow_job_id,
            started_at = %self.started_at,
            completed_at = %self.completed_at,
            conclusion = %self.conclusion
        )
    }
}

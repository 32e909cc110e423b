//! Runner Webhook - GitHub webhook ingress for self-hosted runner scaling.
//!
//! This library backs the `runner-webhook` binary, which receives signed
//! GitHub webhook deliveries, authenticates them and forwards `workflow_job`
//! events to RabbitMQ.
//!
//! ## Architecture
//!
//! ```text
//!                                  ┌→ action_requests → runner provisioning
//! GitHub → Web Server → webhook ───┤
//!                                  └→ workflow_jobs   → metrics archive
//! ```

pub mod config;
pub mod error;
pub mod queue;
pub mod secrets;
pub mod web;
pub mod webhook;

// Re-export commonly used types
pub use config::Config;
pub use error::WebhookError;
pub use queue::{ActionRequest, EventSink, Publisher, WorkflowJobEventMessage};
pub use secrets::{EnvSecretStore, SecretStore};
pub use web::AppState;
pub use webhook::{handle, Outcome, Response};

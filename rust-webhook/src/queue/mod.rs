//! Queue module for RabbitMQ operations.
//!
//! This module provides:
//! - Message types for the provisioning and archival queues
//! - The [`EventSink`] capability the dispatch stage writes to
//! - An async RabbitMQ publisher implementing it
//!
//! ## Architecture
//!
//! ```text
//!                          ┌→ action request queue → runner provisioning
//! GitHub → Web Server ─────┤
//!                          └→ workflow job queue   → metrics archive
//! ```

pub mod publisher;
pub mod sink;
pub mod types;

pub use publisher::Publisher;
pub use sink::EventSink;
pub use types::{ActionRequest, WorkflowJobEventMessage};

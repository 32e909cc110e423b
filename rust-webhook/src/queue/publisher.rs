//! Async RabbitMQ publisher for the provisioning and archival queues.
//!
//! The publisher holds a single lazily-opened connection and channel that
//! is shared by every request handled by the web server.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use lapin::{
    options::{BasicPublishOptions, QueueDeclareOptions},
    types::FieldTable,
    BasicProperties, Channel, Connection, ConnectionProperties,
};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::sink::EventSink;
use super::types::{ActionRequest, WorkflowJobEventMessage};

/// Async RabbitMQ publisher with connection management.
///
/// The publisher maintains a persistent connection and channel to RabbitMQ,
/// reconnecting on the next publish after a failure.
#[derive(Clone)]
pub struct Publisher {
    inner: Arc<PublisherInner>,
}

struct PublisherInner {
    url: String,
    action_request_queue: String,
    workflow_job_queue: Option<String>,
    connection: RwLock<Option<Connection>>,
    channel: RwLock<Option<Channel>>,
}

impl Publisher {
    /// Create a new publisher for the given RabbitMQ URL and queue names.
    ///
    /// Passing `None` for `workflow_job_queue` disables archiving.
    pub fn new(
        url: String,
        action_request_queue: String,
        workflow_job_queue: Option<String>,
    ) -> Self {
        Self {
            inner: Arc::new(PublisherInner {
                url,
                action_request_queue,
                workflow_job_queue,
                connection: RwLock::new(None),
                channel: RwLock::new(None),
            }),
        }
    }

    /// Ensure we have a valid connection and channel.
    async fn ensure_connected(&self) -> Result<Channel> {
        {
            let channel = self.inner.channel.read().await;
            if let Some(ch) = channel.as_ref() {
                if ch.status().connected() {
                    return Ok(ch.clone());
                }
            }
        }

        let mut connection = self.inner.connection.write().await;
        let mut channel = self.inner.channel.write().await;

        // Double-check after acquiring write lock
        if let Some(ch) = channel.as_ref() {
            if ch.status().connected() {
                return Ok(ch.clone());
            }
        }

        info!("rabbitmq_publisher_connecting");

        let conn = Connection::connect(&self.inner.url, ConnectionProperties::default())
            .await
            .context("Failed to connect to RabbitMQ")?;

        let ch = conn
            .create_channel()
            .await
            .context("Failed to create channel")?;

        let queues = std::iter::once(self.inner.action_request_queue.as_str())
            .chain(self.inner.workflow_job_queue.as_deref());
        for queue in queues {
            ch.queue_declare(
                queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .with_context(|| format!("Failed to declare queue {}", queue))?;
        }

        info!(
            action_request_queue = %self.inner.action_request_queue,
            workflow_job_queue = ?self.inner.workflow_job_queue,
            "rabbitmq_queues_declared"
        );

        *connection = Some(conn);
        *channel = Some(ch.clone());

        Ok(ch)
    }

    /// Publish a persistent JSON message and wait for the broker confirmation.
    async fn publish_json<T: Serialize>(
        &self,
        queue: &str,
        message_id: String,
        message: &T,
    ) -> Result<()> {
        let channel = self.ensure_connected().await?;

        let body = serde_json::to_vec(message).context("Failed to serialize message")?;

        channel
            .basic_publish(
                "",
                queue,
                BasicPublishOptions::default(),
                &body,
                BasicProperties::default()
                    .with_delivery_mode(2) // Persistent
                    .with_content_type("application/json".into())
                    .with_message_id(message_id.clone().into()),
            )
            .await
            .with_context(|| format!("Failed to publish to {}", queue))?
            .await
            .context("Failed to confirm publish")?;

        info!(
            queue = %queue,
            message_id = %message_id,
            body_length = body.len(),
            "rabbitmq_message_published"
        );

        Ok(())
    }

    /// Close the connection gracefully.
    pub async fn close(&self) {
        let mut connection = self.inner.connection.write().await;
        let mut channel = self.inner.channel.write().await;

        if let Some(ch) = channel.take() {
            if let Err(e) = ch.close(200, "Normal shutdown").await {
                warn!(error = %e, "rabbitmq_channel_close_error");
            }
        }

        if let Some(conn) = connection.take() {
            if let Err(e) = conn.close(200, "Normal shutdown").await {
                warn!(error = %e, "rabbitmq_connection_close_error");
            }
        }

        info!("rabbitmq_publisher_closed");
    }
}

#[async_trait]
impl EventSink for Publisher {
    fn action_request_queue(&self) -> &str {
        &self.inner.action_request_queue
    }

    fn workflow_job_queue(&self) -> Option<&str> {
        self.inner.workflow_job_queue.as_deref()
    }

    async fn send_action_request(&self, request: &ActionRequest) -> Result<()> {
        self.publish_json(&self.inner.action_request_queue, request.message_id(), request)
            .await
    }

    async fn send_workflow_job_event(&self, message: &WorkflowJobEventMessage) -> Result<()> {
        let Some(queue) = self.inner.workflow_job_queue.as_deref() else {
            debug!("workflow_job_queue_not_configured");
            return Ok(());
        };
        self.publish_json(queue, message.message_id(), message).await
    }
}

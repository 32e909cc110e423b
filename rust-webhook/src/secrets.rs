//! Secret retrieval.
//!
//! The webhook secret is fetched on every request rather than cached at
//! startup, so a rotated secret takes effect without a restart.

use std::env;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

/// Source of named secrets.
///
/// An empty string means the secret is not configured.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get_secret(&self, name: &str) -> Result<String>;
}

/// Reads secrets from process environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvSecretStore;

#[async_trait]
impl SecretStore for EnvSecretStore {
    async fn get_secret(&self, name: &str) -> Result<String> {
        let value = env::var(name).unwrap_or_default();
        debug!(secret_name = name, configured = !value.is_empty(), "secret_fetched");
        Ok(value)
    }
}

/// Fixed in-memory secret, used by tests.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct StaticSecretStore(pub String);

#[cfg(test)]
#[async_trait]
impl SecretStore for StaticSecretStore {
    async fn get_secret(&self, _name: &str) -> Result<String> {
        Ok(self.0.clone())
    }
}

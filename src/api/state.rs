use std::sync::Arc;

use crate::anime::client::MetadataProvider;
use crate::global::config::AppConfig;

/// Application state shared across API handlers
#[derive(Clone)]
pub struct ApiState {
    pub config: Arc<AppConfig>,
    /// Shared outbound client, used directly by the relay.
    pub http: reqwest::Client,
    /// Upstream metadata operations, behind the port so tests can stub them.
    pub provider: Arc<dyn MetadataProvider>,
}

impl ApiState {
    pub fn new(
        config: Arc<AppConfig>,
        http: reqwest::Client,
        provider: Arc<dyn MetadataProvider>,
    ) -> Self {
        Self {
            config,
            http,
            provider,
        }
    }
}

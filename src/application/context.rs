use std::sync::Arc;

use crate::config::Settings;
use crate::domain::workflows::reliability::ReliabilityPolicy;
use crate::domain::workflows::retry_policy::RetryPolicy;
use crate::infrastructure::db::repositories::Repositories;
use crate::infrastructure::transport::WebhookTransport;

/// Shared application resources used by use cases and services.
pub struct AppContext {
    pub repos: Repositories,
    pub transport: Arc<dyn WebhookTransport>,
    pub settings: Settings,
}

impl AppContext {
    /// Build a new application context with shared repositories and the outbound transport.
    pub fn new(repos: Repositories, transport: Arc<dyn WebhookTransport>, settings: Settings) -> Self {
        Self {
            repos,
            transport,
            settings,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.settings.delivery.retry_policy()
    }

    pub fn reliability_policy(&self) -> ReliabilityPolicy {
        self.settings.reliability.policy()
    }

    pub fn user_agent(&self) -> &str {
        &self.settings.delivery.user_agent
    }
}

//! Outbound HTTP seam used by the delivery executor.
//!
//! [`WebhookTransport`] performs exactly one POST; production code uses
//! [`reqwest_transport::ReqwestTransport`], tests substitute scripted fakes.

pub mod reqwest_transport;

use async_trait::async_trait;
use thiserror::Error;

pub use reqwest_transport::ReqwestTransport;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("dns resolution failed: {0}")]
    Dns(String),

    #[error("destination blocked: {0}")]
    Blocked(String),

    #[error("request failed: {0}")]
    Other(String),
}

/// A fully prepared outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl TransportRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
}

#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// Send one POST and return the response status.
    async fn post(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

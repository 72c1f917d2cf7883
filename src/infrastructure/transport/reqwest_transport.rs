use std::error::Error as StdError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use thiserror::Error;

use crate::domain::services::url_guard::{is_blocked_ip, validate_resolved_addr};
use crate::infrastructure::transport::{
    TransportError, TransportRequest, TransportResponse, WebhookTransport,
};

/// Default per-attempt network timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
#[error("{0} resolves to a blocked address")]
struct BlockedAddress(String);

#[derive(Debug, Error)]
#[error("{host}: {reason}")]
struct LookupFailed {
    host: String,
    reason: String,
}

/// Resolver that refuses to hand out loopback/private/unspecified addresses,
/// so a hostname re-pointed after registration cannot reach internal targets.
struct GuardedResolver;

impl Resolve for GuardedResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(async move {
            let host = name.as_str().to_string();
            let addrs: Vec<SocketAddr> = match tokio::net::lookup_host((host.clone(), 0)).await {
                Ok(found) => found.collect(),
                Err(e) => {
                    let err: Box<dyn StdError + Send + Sync> = Box::new(LookupFailed {
                        host,
                        reason: e.to_string(),
                    });
                    return Err(err);
                }
            };
            if addrs.is_empty() {
                let err: Box<dyn StdError + Send + Sync> = Box::new(LookupFailed {
                    host,
                    reason: "no addresses".to_string(),
                });
                return Err(err);
            }
            if addrs.iter().any(|a| is_blocked_ip(&a.ip())) {
                let err: Box<dyn StdError + Send + Sync> = Box::new(BlockedAddress(host));
                return Err(err);
            }
            Ok::<Addrs, Box<dyn StdError + Send + Sync>>(Box::new(addrs.into_iter()))
        })
    }
}

/// `reqwest`-backed transport with a fixed timeout and no redirects.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    verify_resolved: bool,
}

impl ReqwestTransport {
    /// Build a transport. With `verify_resolved`, every DNS answer and every
    /// literal IP host is re-checked against the SSRF guard before sending.
    pub fn new(timeout: Duration, verify_resolved: bool) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none());
        if verify_resolved {
            builder = builder.dns_resolver(Arc::new(GuardedResolver));
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Self {
            client,
            verify_resolved,
        })
    }

    fn check_literal_host(&self, raw: &str) -> Result<(), TransportError> {
        if !self.verify_resolved {
            return Ok(());
        }
        let url = url::Url::parse(raw).map_err(|e| TransportError::Other(e.to_string()))?;
        let ip = match url.host() {
            Some(url::Host::Ipv4(v4)) => std::net::IpAddr::V4(v4),
            Some(url::Host::Ipv6(v6)) => std::net::IpAddr::V6(v6),
            _ => return Ok(()),
        };
        validate_resolved_addr(ip).map_err(|e| TransportError::Blocked(e.to_string()))
    }
}

#[async_trait]
impl WebhookTransport for ReqwestTransport {
    async fn post(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        // Step 1: Re-check literal IP destinations.
        self.check_literal_host(&request.url)?;

        // Step 2: Build and send the request.
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(classify)?;

        // Step 3: Only the status matters to the caller.
        Ok(TransportResponse {
            status: response.status().as_u16(),
        })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    let mut source = err.source();
    while let Some(inner) = source {
        if let Some(blocked) = inner.downcast_ref::<BlockedAddress>() {
            return TransportError::Blocked(blocked.to_string());
        }
        if let Some(failed) = inner.downcast_ref::<LookupFailed>() {
            return TransportError::Dns(failed.to_string());
        }
        source = inner.source();
    }
    if err.is_timeout() {
        return TransportError::Timeout;
    }
    if err.is_connect() {
        return TransportError::Connect(err.to_string());
    }
    TransportError::Other(err.to_string())
}

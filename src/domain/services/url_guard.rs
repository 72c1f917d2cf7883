//! Endpoint validation and SSRF guard for subscription URLs.
//!
//! A URL is accepted only when its scheme is exactly `https` and its host is not
//! `localhost` or a loopback, private-use, link-local or unspecified address.
//! Literal hosts are checked here; [`validate_resolved_addr`] applies the same
//! rules to addresses obtained from DNS right before a request is sent.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use thiserror::Error;
use url::{Host, Url};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlValidationError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("webhook urls must use https, got scheme `{0}`")]
    Scheme(String),

    #[error("destination `{0}` is a loopback, private or unspecified address")]
    PrivateAddress(String),
}

/// Validate a candidate webhook endpoint.
pub fn validate_webhook_url(raw: &str) -> Result<Url, UrlValidationError> {
    // Step 1: Parse the URL.
    let url = Url::parse(raw.trim()).map_err(|e| UrlValidationError::InvalidUrl(e.to_string()))?;

    // Step 2: Require https, nothing else.
    if url.scheme() != "https" {
        return Err(UrlValidationError::Scheme(url.scheme().to_string()));
    }

    // Step 3: Reject internal hosts.
    match url.host() {
        None => Err(UrlValidationError::InvalidUrl("url must have a host".to_string())),
        Some(Host::Domain(domain)) => {
            if is_localhost(domain) {
                return Err(UrlValidationError::PrivateAddress(domain.to_string()));
            }
            Ok(url)
        }
        Some(Host::Ipv4(v4)) => {
            validate_resolved_addr(IpAddr::V4(v4))?;
            Ok(url)
        }
        Some(Host::Ipv6(v6)) => {
            validate_resolved_addr(IpAddr::V6(v6))?;
            Ok(url)
        }
    }
}

/// Reject an address that a webhook must never be delivered to.
pub fn validate_resolved_addr(ip: IpAddr) -> Result<(), UrlValidationError> {
    if is_blocked_ip(&ip) {
        return Err(UrlValidationError::PrivateAddress(ip.to_string()));
    }
    Ok(())
}

fn is_localhost(domain: &str) -> bool {
    let lower = domain.trim_end_matches('.').to_ascii_lowercase();
    lower == "localhost" || lower.ends_with(".localhost")
}

pub fn is_blocked_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_blocked_v4(v4),
        IpAddr::V6(v6) => is_blocked_v6(v6),
    }
}

fn is_blocked_v4(v4: &Ipv4Addr) -> bool {
    v4.is_loopback() || v4.is_private() || v4.is_link_local() || v4.is_unspecified()
}

fn is_blocked_v6(v6: &Ipv6Addr) -> bool {
    if v6.is_loopback() || v6.is_unspecified() {
        return true;
    }
    // ::ffff:a.b.c.d and ::a.b.c.d carry an IPv4 destination.
    if let Some(embedded) = v6.to_ipv4() {
        return is_blocked_v4(&embedded);
    }
    let segments = v6.segments();
    // 64:ff9b::/96 translates to the IPv4 address in the low 32 bits.
    if segments[..6] == [0x64, 0xff9b, 0, 0, 0, 0] {
        let [.., hi, lo] = segments;
        let nat64 = Ipv4Addr::from((u32::from(hi) << 16) | u32::from(lo));
        return is_blocked_v4(&nat64);
    }
    let first = segments[0];
    // fc00::/7 unique local, fe80::/10 link-local.
    (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
}

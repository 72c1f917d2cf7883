use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, Observability};

#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("failed to install metrics recorder: {0}")]
    Metrics(String),
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(settings: &Observability) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}=info,hookshot=info", settings.service_name)));

    let (json, pretty) = match settings.log_format {
        LogFormat::Json => (Some(fmt::layer().json().with_current_span(true)), None),
        LogFormat::Pretty => (None, Some(fmt::layer())),
    };

    // A subscriber may already be installed in tests.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .try_init();
}

/// Install the Prometheus recorder when metrics are enabled.
pub fn init_metrics(settings: &Observability) -> Result<Option<PrometheusHandle>, ObservabilityError> {
    if !settings.enable_metrics {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ObservabilityError::Metrics(e.to_string()))?;
    describe_metrics();

    Ok(Some(handle))
}

fn describe_metrics() {
    describe_counter!(
        "webhook_delivery_attempts_total",
        "Single HTTP delivery attempts by outcome"
    );
    describe_histogram!(
        "webhook_delivery_attempt_duration_ms",
        "Latency of a single delivery attempt"
    );
    describe_counter!(
        "webhook_deliveries_total",
        "Completed deliveries (after retries) by outcome"
    );
    describe_counter!(
        "webhook_subscriptions_disabled_total",
        "Subscriptions disabled by the failure-rate policy"
    );
    describe_counter!("http_requests_total", "HTTP requests by method and status");
    describe_histogram!("http_request_duration_ms", "HTTP request latency");
}

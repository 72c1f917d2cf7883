use serde::Deserialize;

use crate::domain::workflows::reliability::ReliabilityPolicy;
use crate::domain::workflows::retry_policy::RetryPolicy;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub server: Server,
    pub db: Db,
    pub delivery: Delivery,
    pub reliability: Reliability,
    pub observability: Observability,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Db {
    /// Postgres connection string. The in-memory store is used when absent.
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for Db {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Delivery {
    pub request_timeout_ms: u64,
    pub max_attempts: u32,
    pub backoff_ms: Vec<u64>,
    pub user_agent: String,
    pub verify_resolved_addresses: bool,
}

impl Default for Delivery {
    fn default() -> Self {
        Self {
            request_timeout_ms: 10_000,
            max_attempts: 3,
            backoff_ms: vec![1_000, 5_000],
            user_agent: format!("hookshot-webhooks/{}", env!("CARGO_PKG_VERSION")),
            verify_resolved_addresses: true,
        }
    }
}

impl Delivery {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_millis(self.max_attempts, &self.backoff_ms)
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Reliability {
    pub window_size: usize,
    pub failure_rate_threshold: f64,
    /// Outcomes required in the window before the policy may disable.
    /// Defaults to `window_size`.
    pub min_samples: Option<usize>,
}

impl Default for Reliability {
    fn default() -> Self {
        Self {
            window_size: 20,
            failure_rate_threshold: 0.5,
            min_samples: None,
        }
    }
}

impl Reliability {
    pub fn policy(&self) -> ReliabilityPolicy {
        let policy = ReliabilityPolicy::new(self.window_size, self.failure_rate_threshold);
        match self.min_samples {
            Some(min) => policy.with_min_samples(min),
            None => policy,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Observability {
    pub service_name: String,
    pub log_format: LogFormat,
    pub enable_metrics: bool,
}

impl Default for Observability {
    fn default() -> Self {
        Self {
            service_name: "hookshot".to_string(),
            log_format: LogFormat::Pretty,
            enable_metrics: true,
        }
    }
}

/// Load settings from `config/default.toml`, `config/<env>.toml`, and env overrides.
pub fn load() -> Result<Settings, config::ConfigError> {
    let env_name = std::env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());
    config::Config::builder()
        .add_source(config::File::with_name("config/default").required(false))
        .add_source(config::File::with_name(&format!("config/{env_name}")).required(false))
        .add_source(
            config::Environment::with_prefix("HOOKSHOT")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("delivery.backoff_ms")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn given_defaults_should_match_delivery_constants() {
        let settings = Settings::default();

        let retry = settings.delivery.retry_policy();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.delay_before(2), Duration::from_secs(1));
        assert_eq!(retry.delay_before(3), Duration::from_secs(5));
        assert_eq!(settings.delivery.request_timeout(), Duration::from_secs(10));
        assert!(settings.delivery.user_agent.starts_with("hookshot-webhooks/"));
    }

    #[test]
    fn given_defaults_should_build_twenty_outcome_reliability_policy() {
        let policy = Reliability::default().policy();

        assert_eq!(policy.window_size, 20);
        assert_eq!(policy.min_samples, 20);
        assert!((policy.failure_rate_threshold - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn given_min_samples_override_should_apply_it() {
        let reliability = Reliability {
            min_samples: Some(5),
            ..Reliability::default()
        };

        assert_eq!(reliability.policy().min_samples, 5);
    }

    #[test]
    fn given_partial_toml_when_deserialize_should_fill_missing_sections() {
        let settings: Settings = config::Config::builder()
            .add_source(config::File::from_str(
                "[server]\nport = 9090\n[observability]\nlog_format = \"json\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.observability.log_format, LogFormat::Json);
        assert!(settings.db.url.is_none());
        assert_eq!(settings.delivery.backoff_ms, vec![1_000, 5_000]);
    }
}

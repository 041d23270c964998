use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::proxy::headers::DEFAULT_USER_AGENT;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub upstream: UpstreamSettings,
    pub registry: RegistrySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub environment: String,
    /// Externally visible origin (scheme + host) used when rewriting
    /// manifest references. When unset, the origin is derived per-request
    /// from the `x-forwarded-proto` and `Host` headers.
    #[serde(default)]
    pub public_origin: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamSettings {
    /// Timeout for the response-header phase of an upstream fetch, in
    /// seconds. Body streaming is not bounded by this so long-running
    /// segment downloads are unaffected.
    pub timeout_secs: u64,
    /// User-Agent sent upstream when the client did not provide one.
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegistrySettings {
    /// Path to the JSON file the channel registry is loaded from.
    pub channels_file: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("application.host", "0.0.0.0")?
            .set_default("application.port", 8080)?
            .set_default("application.environment", environment.clone())?
            .set_default("upstream.timeout_secs", 15)?
            .set_default("upstream.user_agent", DEFAULT_USER_AGENT)?
            .set_default("registry.channels_file", "config/channels.json")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            // Add configuration file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix
            .add_source(Environment::with_prefix("STREAMGATE").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_can_be_loaded() {
        let settings = Settings::new();
        assert!(settings.is_ok());
    }

    #[test]
    fn test_default_upstream_settings() {
        let settings = Settings::new().unwrap();
        assert!(settings.upstream.timeout_secs > 0);
        assert!(!settings.upstream.user_agent.is_empty());
    }

    #[test]
    fn test_bind_addr_format() {
        let settings = Settings::new().unwrap();
        let addr = settings.bind_addr();
        assert!(addr.contains(':'));
        assert!(addr.ends_with(&settings.application.port.to_string()));
    }
}

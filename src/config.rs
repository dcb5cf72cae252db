use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::errors::ServiceError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_EVENT_BUFFER: usize = 1024;
const CONFIG_FILE: &str = "config/default";
const DEV_DEFAULT_JWT_SECRET: &str =
    "this_is_a_development_secret_key_that_is_long_enough_for_local_use";

/// Push-notification collaborator settings. Both optional: without a server
/// key the service runs with notifications disabled.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FcmConfig {
    /// FCM server key. Required only when push delivery is wanted.
    pub server_key: Option<String>,
    /// Device token the shop dashboard registered for order alerts.
    pub notify_token: Option<String>,
}

impl FcmConfig {
    pub fn enabled(&self) -> bool {
        self.server_key.is_some()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Secret shared with the identity provider for bearer-token verification.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// When set, status changes must follow the workshop sequence instead of
    /// the permissive default.
    #[serde(default)]
    pub strict_transitions: bool,

    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    #[serde(default)]
    pub fcm: FcmConfig,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_jwt_secret() -> String {
    DEV_DEFAULT_JWT_SECRET.to_string()
}
fn default_event_buffer() -> usize {
    DEFAULT_EVENT_BUFFER
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_json: false,
            jwt_secret: default_jwt_secret(),
            strict_transitions: false,
            event_buffer: default_event_buffer(),
            fcm: FcmConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.jwt_secret.len() < 32 {
            return Err(ServiceError::configuration(
                "jwt_secret",
                "Provide a secret of at least 32 characters via ATELIER_JWT_SECRET.",
            ));
        }
        Ok(())
    }
}

/// Layers `config/default.toml` (optional) under `ATELIER_*` environment
/// overrides, e.g. `ATELIER_PORT=9090` or `ATELIER_FCM__SERVER_KEY=...`.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    Config::builder()
        .add_source(File::with_name(CONFIG_FILE).required(false))
        .add_source(Environment::with_prefix("ATELIER").separator("__"))
        .build()?
        .try_deserialize()
}

pub fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.log_level, "info");
        assert!(!cfg.strict_transitions);
        assert!(!cfg.fcm.enabled());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn short_jwt_secret_is_a_configuration_error() {
        let cfg = AppConfig {
            jwt_secret: "short".into(),
            ..AppConfig::default()
        };
        match cfg.validate() {
            Err(ServiceError::Configuration { setting, .. }) => assert_eq!(setting, "jwt_secret"),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }
}

//! Configuration management for spike-emitter
//!
//! Parses TOML configuration files and provides typed access to settings.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ingress: IngressConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Which sink receives emitted gauges
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Post envelopes to an HTTP ingestion endpoint
    #[default]
    Http,
    /// Write envelopes to the service log
    Log,
}

/// Ingestion endpoint configuration
///
/// Fields are private; `Config::validate()` checks their combination and the
/// accessors expose them read-only afterwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngressConfig {
    #[serde(default)]
    kind: SinkKind,
    #[serde(default)]
    url: Option<String>,
    #[serde(default = "default_ingress_timeout")]
    timeout_seconds: u64,
    #[serde(default)]
    ca_cert_path: Option<PathBuf>,
    #[serde(default)]
    cert_path: Option<PathBuf>,
    #[serde(default)]
    key_path: Option<PathBuf>,
}

fn default_ingress_timeout() -> u64 {
    5
}

impl IngressConfig {
    pub fn kind(&self) -> SinkKind {
        self.kind
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Per-post timeout for the HTTP sink
    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    pub fn ca_cert_path(&self) -> Option<&Path> {
        self.ca_cert_path.as_deref()
    }

    pub fn cert_path(&self) -> Option<&Path> {
        self.cert_path.as_deref()
    }

    pub fn key_path(&self) -> Option<&Path> {
        self.key_path.as_deref()
    }

    fn validate(&self) -> crate::error::AppResult<()> {
        if self.timeout_seconds == 0 || self.timeout_seconds > 300 {
            return Err(crate::error::AppError::Config(format!(
                "ingress.timeout_seconds must be between 1 and 300, got {}",
                self.timeout_seconds
            )));
        }

        if self.cert_path.is_some() != self.key_path.is_some() {
            return Err(crate::error::AppError::Config(
                "ingress.cert_path and ingress.key_path must be set together".to_string(),
            ));
        }

        if self.kind == SinkKind::Log {
            return Ok(());
        }

        let Some(url) = self.url.as_deref() else {
            return Err(crate::error::AppError::Config(
                "ingress.url is required when ingress.kind = \"http\"".to_string(),
            ));
        };

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(crate::error::AppError::Config(format!(
                "ingress.url '{}' must start with 'http://' or 'https://'",
                url
            )));
        }

        let uses_tls_files =
            self.ca_cert_path.is_some() || self.cert_path.is_some() || self.key_path.is_some();
        if uses_tls_files && !url.starts_with("https://") {
            return Err(crate::error::AppError::Config(format!(
                "ingress.url '{}' must use https:// when TLS certificate paths are configured",
                url
            )));
        }

        Ok(())
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::error::AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            crate::error::AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|source| {
            crate::error::AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            }
        })?;

        config
            .validate()
            .map_err(|e| crate::error::AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Validate configuration after parsing
    ///
    /// Called by `from_file()` and `from_str()`; call it explicitly when a
    /// `Config` is built by other means.
    pub fn validate(&self) -> crate::error::AppResult<()> {
        if self.server.port == 0 {
            return Err(crate::error::AppError::Config(
                "server.port must be greater than 0".to_string(),
            ));
        }

        self.ingress.validate()?;

        let level = self.observability.log_level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(crate::error::AppError::Config(format!(
                "observability.log_level '{}' must be one of {}",
                self.observability.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = crate::error::AppError;

    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(toml_str).map_err(|source| {
            crate::error::AppError::ConfigParseFailed {
                path: "<string>".to_string(),
                source,
            }
        })?;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 8080

[ingress]
kind = "http"
url = "https://ingress.example.com/v2/envelopes"
timeout_seconds = 10
ca_cert_path = "/etc/spike-emitter/ca.crt"
cert_path = "/etc/spike-emitter/client.crt"
key_path = "/etc/spike-emitter/client.key"

[observability]
log_level = "debug"
log_format = "json"
"#;

    #[test]
    fn test_config_from_str_parses_successfully() {
        let config = Config::from_str(TEST_CONFIG).expect("should parse config");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.ingress.kind(), SinkKind::Http);
        assert_eq!(
            config.ingress.url(),
            Some("https://ingress.example.com/v2/envelopes")
        );
        assert_eq!(config.ingress.timeout_seconds(), 10);
        assert_eq!(
            config.ingress.cert_path(),
            Some(Path::new("/etc/spike-emitter/client.crt"))
        );
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_str(
            r#"
[server]
port = 8080

[ingress]
url = "http://localhost:3458/v2/envelopes"
"#,
        )
        .expect("minimal config should parse");

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.ingress.kind(), SinkKind::Http);
        assert_eq!(config.ingress.timeout_seconds(), 5);
        assert!(config.ingress.ca_cert_path().is_none());
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.observability.log_format, LogFormat::Text);
    }

    #[test]
    fn test_log_sink_needs_no_url() {
        let config = Config::from_str(
            r#"
[server]
port = 8080

[ingress]
kind = "log"
"#,
        )
        .expect("log sink config should parse");
        assert_eq!(config.ingress.kind(), SinkKind::Log);
        assert!(config.ingress.url().is_none());
    }

    #[test]
    fn test_missing_port_fails_to_parse() {
        let result = Config::from_str("[server]\n[ingress]\nkind = \"log\"\n");
        assert!(matches!(
            result,
            Err(crate::error::AppError::ConfigParseFailed { .. })
        ));
    }

    #[test]
    fn test_unknown_sink_kind_fails_to_parse() {
        let result = Config::from_str("[server]\nport = 1\n[ingress]\nkind = \"grpc\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_zero_port_fails() {
        let err = Config::from_str("[server]\nport = 0\n[ingress]\nkind = \"log\"\n").unwrap_err();
        assert!(err.to_string().contains("server.port"));
    }

    #[test]
    fn test_validation_http_without_url_fails() {
        let err = Config::from_str("[server]\nport = 8080\n[ingress]\n").unwrap_err();
        assert!(err.to_string().contains("ingress.url is required"));
    }

    #[test]
    fn test_validation_url_scheme() {
        let err = Config::from_str(
            "[server]\nport = 8080\n[ingress]\nurl = \"localhost:3458\"\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("must start with"));
    }

    #[test]
    fn test_validation_cert_without_key_fails() {
        let err = Config::from_str(
            r#"
[server]
port = 8080
[ingress]
url = "https://localhost:3458"
cert_path = "/tmp/client.crt"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("set together"));
    }

    #[test]
    fn test_validation_tls_paths_require_https() {
        let err = Config::from_str(
            r#"
[server]
port = 8080
[ingress]
url = "http://localhost:3458"
ca_cert_path = "/tmp/ca.crt"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("https://"));
    }

    #[test]
    fn test_validation_timeout_bounds() {
        for timeout in [0, 301] {
            let toml = format!(
                "[server]\nport = 8080\n[ingress]\nkind = \"log\"\ntimeout_seconds = {}\n",
                timeout
            );
            assert!(Config::from_str(&toml).is_err(), "timeout {} should fail", timeout);
        }
        for timeout in [1, 300] {
            let toml = format!(
                "[server]\nport = 8080\n[ingress]\nkind = \"log\"\ntimeout_seconds = {}\n",
                timeout
            );
            assert!(Config::from_str(&toml).is_ok(), "timeout {} should pass", timeout);
        }
    }

    #[test]
    fn test_validation_log_level() {
        let err = Config::from_str(
            "[server]\nport = 8080\n[ingress]\nkind = \"log\"\n[observability]\nlog_level = \"loud\"\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("observability.log_level"));

        let ok = Config::from_str(
            "[server]\nport = 8080\n[ingress]\nkind = \"log\"\n[observability]\nlog_level = \"WARN\"\n",
        );
        assert!(ok.is_ok());
    }
}

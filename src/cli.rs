//! Command-line interface for spike-emitter

use clap::{Parser, Subcommand};

/// Re-emits posted spike/spoke intervals as gauge metrics
#[derive(Parser)]
#[command(name = "spike-emitter")]
#[command(version)]
#[command(about = "Re-emits posted spike/spoke intervals as gauge metrics")]
#[command(
    long_about = "spike-emitter accepts interval test events on POST /spike and POST /spoke \
    and forwards each one as a gauge envelope to the configured telemetry ingress."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Load and validate the configuration file, then exit
    Check,
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# spike-emitter configuration

# ─────────────────────────────────────────────────────────────────────────────
# SERVER
# ─────────────────────────────────────────────────────────────────────────────

[server]
# IP address to bind to (0.0.0.0 for all interfaces, 127.0.0.1 for localhost only)
host = "0.0.0.0"

# Port to listen on
port = 8080

# ─────────────────────────────────────────────────────────────────────────────
# INGRESS
# ─────────────────────────────────────────────────────────────────────────────
#
# Where gauge envelopes are sent:
#   - "http": POST each envelope as JSON to `url`
#   - "log":  write envelopes to the service log (no url needed)

[ingress]
kind = "http"
url = "https://ingress.example.com/v2/envelopes"

# Per-post timeout in seconds (1-300)
timeout_seconds = 5

# Mutual TLS (optional, requires an https:// url).
# cert_path and key_path must be set together.
# ca_cert_path = "/etc/spike-emitter/ca.crt"
# cert_path = "/etc/spike-emitter/client.crt"
# key_path = "/etc/spike-emitter/client.key"

# ─────────────────────────────────────────────────────────────────────────────
# OBSERVABILITY
# ─────────────────────────────────────────────────────────────────────────────

[observability]
# Log level: "trace", "debug", "info", "warn", "error" (RUST_LOG overrides)
log_level = "info"

# Log format: "text" or "json"
log_format = "text"

# Prometheus self-metrics are always available at /metrics on the server port
"#
}

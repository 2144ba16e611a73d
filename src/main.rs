//! spike-emitter HTTP server
//!
//! Loads configuration, builds the metrics sink once and serves the interval
//! endpoints until Ctrl-C or SIGTERM.

use clap::Parser;
use spike_emitter::{
    cli::{Cli, Command, generate_config_template},
    config::{Config, SinkKind},
    emitter::{HttpIngressSink, LogSink, MetricsSink},
    handlers::{self, AppState},
    metrics::Metrics,
    telemetry,
};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Config { output: Some(path) }) => {
            std::fs::write(&path, generate_config_template())?;
            println!("Wrote template configuration to {}", path);
            return Ok(());
        }
        Some(Command::Config { output: None }) => {
            print!("{}", generate_config_template());
            return Ok(());
        }
        Some(Command::Check) => {
            Config::from_file(&cli.config)?;
            println!("{} is valid", cli.config);
            return Ok(());
        }
        None => {}
    }

    let config = Config::from_file(&cli.config)?;

    telemetry::init(
        &config.observability.log_level,
        config.observability.log_format,
    );

    let metrics = Arc::new(Metrics::new()?);
    let sink: Arc<dyn MetricsSink> = match config.ingress.kind() {
        SinkKind::Http => Arc::new(HttpIngressSink::new(&config.ingress, metrics.clone())?),
        SinkKind::Log => {
            tracing::warn!("Ingress kind is \"log\"; gauges will only be written to the log");
            Arc::new(LogSink)
        }
    };

    let app = handlers::router(AppState::new(sink, metrics));

    let ip = config
        .server
        .host
        .parse::<std::net::IpAddr>()
        .map_err(|e| format!("Invalid server.host '{}': {}", config.server.host, e))?;
    let addr = SocketAddr::from((ip, config.server.port));

    tracing::info!("Starting spike-emitter on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}

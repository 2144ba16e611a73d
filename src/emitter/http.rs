//! HTTP ingress sink
//!
//! Posts each envelope as a single-item Loggregator v2 JSON batch:
//!
//! ```json
//! {"batch": [{
//!   "timestamp": "1672531500000000000",
//!   "source_id": "app1",
//!   "instance_id": "0",
//!   "tags": {"process_instance_id": "p1"},
//!   "gauge": {"metrics": {
//!     "spike_start": {"unit": "seconds", "value": 1672531200.0},
//!     "spike_end": {"unit": "seconds", "value": 1672531500.0}
//!   }}
//! }]}
//! ```
//!
//! Delivery happens on a spawned task. Failures are logged and counted, never
//! returned to the emitting request.

use super::{GaugeEnvelope, GaugeValue, MetricsSink};
use crate::config::IngressConfig;
use crate::error::{AppError, AppResult};
use crate::metrics::{Metrics, SinkFailure};
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Serialize)]
struct EnvelopeBatch<'a> {
    batch: [WireEnvelope<'a>; 1],
}

#[derive(Serialize)]
struct WireEnvelope<'a> {
    timestamp: String,
    source_id: &'a str,
    instance_id: &'a str,
    tags: &'a BTreeMap<String, String>,
    gauge: WireGauge<'a>,
}

#[derive(Serialize)]
struct WireGauge<'a> {
    metrics: &'a BTreeMap<String, GaugeValue>,
}

/// Encode an envelope in the ingress wire format
pub fn encode_batch(envelope: &GaugeEnvelope) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(&EnvelopeBatch {
        batch: [WireEnvelope {
            timestamp: envelope.timestamp.to_string(),
            source_id: &envelope.source_id,
            instance_id: &envelope.instance_id,
            tags: &envelope.tags,
            gauge: WireGauge {
                metrics: &envelope.metrics,
            },
        }],
    })
}

/// Sink delivering envelopes to an HTTP ingestion endpoint
///
/// The underlying `reqwest::Client` is pooled and cheap to clone, so one sink
/// serves every request for the life of the process.
pub struct HttpIngressSink {
    client: reqwest::Client,
    url: String,
    metrics: Arc<Metrics>,
}

impl HttpIngressSink {
    /// Build the sink from validated ingress configuration
    ///
    /// # Errors
    ///
    /// Returns `AppError::SinkSetup` if no URL is configured, a certificate or
    /// key file cannot be read or parsed, or the HTTP client cannot be built.
    pub fn new(config: &IngressConfig, metrics: Arc<Metrics>) -> AppResult<Self> {
        let url = config
            .url()
            .ok_or_else(|| AppError::SinkSetup("ingress.url is required for the http sink".into()))?
            .to_string();

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds()));

        if let Some(ca_path) = config.ca_cert_path() {
            let pem = read_pem(ca_path, "CA certificate")?;
            let ca = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                AppError::SinkSetup(format!(
                    "Invalid CA certificate {}: {}",
                    ca_path.display(),
                    e
                ))
            })?;
            builder = builder.add_root_certificate(ca);
        }

        if let (Some(cert_path), Some(key_path)) = (config.cert_path(), config.key_path()) {
            let mut pem = read_pem(cert_path, "client certificate")?;
            pem.push(b'\n');
            pem.extend(read_pem(key_path, "client key")?);
            let identity = reqwest::Identity::from_pem(&pem).map_err(|e| {
                AppError::SinkSetup(format!(
                    "Invalid client identity ({}, {}): {}",
                    cert_path.display(),
                    key_path.display(),
                    e
                ))
            })?;
            builder = builder.identity(identity);
        }

        let client = builder
            .build()
            .map_err(|e| AppError::SinkSetup(format!("Failed to build HTTP client: {}", e)))?;

        tracing::info!(url = %url, "HTTP ingress sink ready");

        Ok(Self {
            client,
            url,
            metrics,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn read_pem(path: &Path, what: &str) -> AppResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        AppError::SinkSetup(format!("Failed to read {} {}: {}", what, path.display(), e))
    })
}

async fn post_batch(client: reqwest::Client, url: String, body: Vec<u8>, metrics: Arc<Metrics>) {
    let started = Instant::now();
    let result = client
        .post(&url)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await;
    metrics.observe_sink_post(started.elapsed().as_secs_f64() * 1000.0);

    match result {
        Ok(response) if response.status().is_success() => {
            tracing::debug!(url = %url, status = %response.status(), "Envelope delivered");
        }
        Ok(response) => {
            tracing::warn!(
                url = %url,
                status = %response.status(),
                "Ingress rejected envelope"
            );
            metrics.sink_failure(SinkFailure::Rejected);
        }
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Failed to deliver envelope");
            metrics.sink_failure(SinkFailure::Transport);
        }
    }
}

impl MetricsSink for HttpIngressSink {
    fn emit_gauge(&self, envelope: GaugeEnvelope) {
        let body = match encode_batch(&envelope) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode envelope");
                self.metrics.sink_failure(SinkFailure::Encode);
                return;
            }
        };

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(post_batch(
                    self.client.clone(),
                    self.url.clone(),
                    body,
                    self.metrics.clone(),
                ));
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    source_id = %envelope.source_id,
                    "No async runtime available, dropping envelope"
                );
                self.metrics.sink_failure(SinkFailure::NoRuntime);
            }
        }
    }
}

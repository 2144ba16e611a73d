//! Prometheus self-metrics for spike-emitter
//!
//! Tracks what the service itself does, independent of the gauges it forwards:
//! - Requests by interval kind and outcome
//! - Emissions handed to the sink, by kind
//! - Sink delivery failures by reason
//! - Latency of ingress posts
//!
//! Metrics are exposed via the `/metrics` endpoint in Prometheus text format.

use crate::emitter::IntervalKind;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Request outcome enum for type-safe metrics labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    MethodNotAllowed,
    BodyReadFailed,
    DecodeFailed,
    ParseFailed,
}

impl Outcome {
    /// Convert outcome to Prometheus label string
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Accepted => "accepted",
            Outcome::MethodNotAllowed => "method_not_allowed",
            Outcome::BodyReadFailed => "body_read_failed",
            Outcome::DecodeFailed => "decode_failed",
            Outcome::ParseFailed => "parse_failed",
        }
    }
}

/// Reason an envelope did not reach the ingress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkFailure {
    /// Connection, TLS or timeout failure
    Transport,
    /// Ingress answered with a non-2xx status
    Rejected,
    /// Envelope could not be serialized
    Encode,
    /// Emit was called outside a tokio runtime
    NoRuntime,
}

impl SinkFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            SinkFailure::Transport => "transport",
            SinkFailure::Rejected => "rejected",
            SinkFailure::Encode => "encode",
            SinkFailure::NoRuntime => "no_runtime",
        }
    }
}

/// Metrics collector for spike-emitter
#[derive(Clone)]
pub struct Metrics {
    pub registry: Arc<Registry>,
    requests_total: IntCounterVec,
    emissions_total: IntCounterVec,
    sink_failures_total: IntCounterVec,
    sink_post_duration: Histogram,
}

impl Metrics {
    /// Create a new Metrics instance
    ///
    /// Registers all metrics with a new Prometheus registry.
    ///
    /// # Errors
    ///
    /// Returns an error if metric registration fails (e.g., duplicate names).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Cardinality: 2 kinds × 5 outcomes = 10 time series
        let requests_total = IntCounterVec::new(
            Opts::new(
                "spike_emitter_requests_total",
                "Total number of interval requests by kind and outcome",
            ),
            &["kind", "outcome"],
        )?;

        let emissions_total = IntCounterVec::new(
            Opts::new(
                "spike_emitter_emissions_total",
                "Total number of gauge envelopes handed to the sink by kind",
            ),
            &["kind"],
        )?;

        // Alert on sustained increase: the ingress is dropping test events.
        let sink_failures_total = IntCounterVec::new(
            Opts::new(
                "spike_emitter_sink_failures_total",
                "Total number of envelopes that failed to reach the ingress by reason",
            ),
            &["reason"],
        )?;

        let sink_post_duration = Histogram::with_opts(
            HistogramOpts::new(
                "spike_emitter_sink_post_duration_ms",
                "Latency of envelope posts to the ingress in milliseconds",
            )
            .buckets(vec![1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0]),
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(emissions_total.clone()))?;
        registry.register(Box::new(sink_failures_total.clone()))?;
        registry.register(Box::new(sink_post_duration.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            requests_total,
            emissions_total,
            sink_failures_total,
            sink_post_duration,
        })
    }

    /// Record the outcome of an interval request
    pub fn request(&self, kind: IntervalKind, outcome: Outcome) {
        self.requests_total
            .with_label_values(&[kind.as_str(), outcome.as_str()])
            .inc();
    }

    /// Record an envelope handed to the sink
    pub fn emission(&self, kind: IntervalKind) {
        self.emissions_total.with_label_values(&[kind.as_str()]).inc();
    }

    /// Record a sink delivery failure
    pub fn sink_failure(&self, reason: SinkFailure) {
        self.sink_failures_total
            .with_label_values(&[reason.as_str()])
            .inc();
    }

    /// Record ingress post latency
    ///
    /// Non-finite and negative values are dropped; they would corrupt the
    /// histogram sum.
    pub fn observe_sink_post(&self, duration_ms: f64) {
        if !duration_ms.is_finite() || duration_ms < 0.0 {
            tracing::warn!(duration_ms, "Ignoring invalid sink post duration");
            return;
        }
        self.sink_post_duration.observe(duration_ms);
    }

    pub fn requests_count(&self, kind: IntervalKind, outcome: Outcome) -> u64 {
        self.requests_total
            .with_label_values(&[kind.as_str(), outcome.as_str()])
            .get()
    }

    pub fn emissions_count(&self, kind: IntervalKind) -> u64 {
        self.emissions_total.with_label_values(&[kind.as_str()]).get()
    }

    pub fn sink_failures_count(&self, reason: SinkFailure) -> u64 {
        self.sink_failures_total
            .with_label_values(&[reason.as_str()])
            .get()
    }

    pub fn sink_posts_count(&self) -> u64 {
        self.sink_post_duration.get_sample_count()
    }

    /// Encode all registered metrics in Prometheus text format
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or produces invalid UTF-8.
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let metric_families = self.registry.gather();

        tracing::debug!(
            metric_family_count = metric_families.len(),
            "Encoding metrics to Prometheus text format"
        );

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer)?;

        String::from_utf8(buffer).map_err(|e| {
            prometheus::Error::Msg(format!(
                "Prometheus encoder produced invalid UTF-8 at byte {}",
                e.utf8_error().valid_up_to()
            ))
        })
    }
}

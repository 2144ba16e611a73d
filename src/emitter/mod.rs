//! Gauge emission for interval records
//!
//! [`IntervalEmitter`] maps an [`IntervalRecord`] onto a single [`GaugeEnvelope`]
//! and hands it to a [`MetricsSink`]. The sink owns delivery; emission is
//! fire-and-forget from the caller's point of view.

pub mod http;
pub mod log;
pub mod recording;

pub use http::HttpIngressSink;
pub use log::LogSink;
pub use recording::RecordingSink;

use crate::interval::IntervalRecord;
use crate::metrics::Metrics;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Unit attached to every interval gauge value
pub const SECONDS: &str = "seconds";

/// Envelope tag carrying the record's process identity
pub const PROCESS_INSTANCE_ID_TAG: &str = "process_instance_id";

/// Naming scheme used when emitting an interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalKind {
    Spike,
    Spoke,
}

impl IntervalKind {
    /// Lowercase label, also used for metrics and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spike => "spike",
            Self::Spoke => "spoke",
        }
    }

    /// Gauge name for the interval start
    pub fn start_metric(&self) -> &'static str {
        match self {
            Self::Spike => "spike_start",
            Self::Spoke => "spoke_start",
        }
    }

    /// Gauge name for the interval end
    pub fn end_metric(&self) -> &'static str {
        match self {
            Self::Spike => "spike_end",
            Self::Spoke => "spoke_end",
        }
    }
}

impl std::fmt::Display for IntervalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single named gauge reading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeValue {
    pub unit: String,
    pub value: f64,
}

/// Gauge metric envelope as handed to a sink
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeEnvelope {
    pub source_id: String,
    pub instance_id: String,
    /// Emission time, nanoseconds since the Unix epoch
    pub timestamp: i64,
    pub tags: BTreeMap<String, String>,
    pub metrics: BTreeMap<String, GaugeValue>,
}

impl GaugeEnvelope {
    /// Start an envelope for the given source and instance, stamped now
    pub fn new(source_id: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            instance_id: instance_id.into(),
            timestamp: now_nanos(),
            tags: BTreeMap::new(),
            metrics: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, name: &str, value: f64, unit: &str) -> Self {
        self.metrics.insert(
            name.to_string(),
            GaugeValue {
                unit: unit.to_string(),
                value,
            },
        );
        self
    }

    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.tags.insert(key.to_string(), value.to_string());
        self
    }

    /// Look up a gauge value by name
    pub fn value(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).map(|gauge| gauge.value)
    }
}

fn now_nanos() -> i64 {
    let now = chrono::Utc::now();
    now.timestamp_nanos_opt().unwrap_or_else(|| {
        tracing::warn!(
            now = %now,
            "System clock is outside the nanosecond timestamp range, stamping envelope with 0"
        );
        0
    })
}

/// Destination for gauge envelopes
///
/// Implementations must be safe to share across concurrent requests. Delivery
/// failures stay inside the sink; callers never observe them.
pub trait MetricsSink: Send + Sync {
    fn emit_gauge(&self, envelope: GaugeEnvelope);
}

/// Turns interval records into gauge emissions
#[derive(Clone)]
pub struct IntervalEmitter {
    sink: Arc<dyn MetricsSink>,
    metrics: Arc<Metrics>,
}

impl IntervalEmitter {
    pub fn new(sink: Arc<dyn MetricsSink>, metrics: Arc<Metrics>) -> Self {
        Self { sink, metrics }
    }

    /// Build the envelope for a record without emitting it
    pub fn envelope(record: &IntervalRecord, kind: IntervalKind) -> GaugeEnvelope {
        GaugeEnvelope::new(record.source_id(), record.instance_id())
            .with_value(kind.start_metric(), record.start().timestamp() as f64, SECONDS)
            .with_value(kind.end_metric(), record.end().timestamp() as f64, SECONDS)
            .with_tag(PROCESS_INSTANCE_ID_TAG, record.process_instance_id())
    }

    /// Emit one gauge envelope for the record under the kind's naming scheme
    pub fn emit(&self, record: &IntervalRecord, kind: IntervalKind) {
        let envelope = Self::envelope(record, kind);

        tracing::debug!(
            kind = %kind,
            source_id = %envelope.source_id,
            instance_id = %envelope.instance_id,
            "Emitting interval gauge"
        );

        self.sink.emit_gauge(envelope);
        self.metrics.emission(kind);
    }
}

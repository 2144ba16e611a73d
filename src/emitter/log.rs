//! Sink that writes envelopes to the structured log
//!
//! Useful for running the service locally without an ingestion endpoint.

use super::{GaugeEnvelope, MetricsSink};

#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl MetricsSink for LogSink {
    fn emit_gauge(&self, envelope: GaugeEnvelope) {
        let values: Vec<String> = envelope
            .metrics
            .iter()
            .map(|(name, gauge)| format!("{}={}{}", name, gauge.value, unit_suffix(&gauge.unit)))
            .collect();

        tracing::info!(
            source_id = %envelope.source_id,
            instance_id = %envelope.instance_id,
            timestamp = envelope.timestamp,
            tags = ?envelope.tags,
            values = %values.join(" "),
            "Gauge envelope"
        );
    }
}

fn unit_suffix(unit: &str) -> String {
    if unit.is_empty() {
        String::new()
    } else {
        format!(" {}", unit)
    }
}

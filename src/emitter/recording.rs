//! In-memory sink that keeps every envelope it receives

use super::{GaugeEnvelope, MetricsSink};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Sink that records envelopes instead of delivering them
#[derive(Debug, Default)]
pub struct RecordingSink {
    envelopes: Mutex<Vec<GaugeEnvelope>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far, in emission order
    pub fn envelopes(&self) -> Vec<GaugeEnvelope> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave the Vec half-written.
    fn lock(&self) -> MutexGuard<'_, Vec<GaugeEnvelope>> {
        self.envelopes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MetricsSink for RecordingSink {
    fn emit_gauge(&self, envelope: GaugeEnvelope) {
        self.lock().push(envelope);
    }
}

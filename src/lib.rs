//! spike-emitter - re-emits posted test intervals as gauge metrics
//!
//! Accepts "spike"/"spoke" interval events over HTTP, validates them into
//! [`interval::IntervalRecord`]s and forwards each one as a single gauge
//! envelope to a [`emitter::MetricsSink`].

pub mod cli;
pub mod config;
pub mod emitter;
pub mod error;
pub mod handlers;
pub mod interval;
pub mod metrics;
pub mod middleware;
pub mod telemetry;

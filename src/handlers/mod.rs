//! HTTP request handlers for spike-emitter

use crate::emitter::{IntervalEmitter, MetricsSink};
use crate::metrics::Metrics;
use crate::middleware::request_id_middleware;
use axum::{
    Router, middleware,
    routing::{any, get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod health;
pub mod interval;
pub mod metrics;
pub mod usage;

/// Application state shared across all handlers
///
/// Holds the emitter (and through it the sink handle) plus the self-metrics.
/// All fields are Arc'd for cheap cloning across Axum handlers.
#[derive(Clone)]
pub struct AppState {
    emitter: Arc<IntervalEmitter>,
    metrics: Arc<Metrics>,
}

impl AppState {
    /// Create state around an already-built sink
    pub fn new(sink: Arc<dyn MetricsSink>, metrics: Arc<Metrics>) -> Self {
        let emitter = Arc::new(IntervalEmitter::new(sink, metrics.clone()));
        Self { emitter, metrics }
    }

    pub fn emitter(&self) -> &IntervalEmitter {
        &self.emitter
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

/// Build the full application router
///
/// `/spike` and `/spoke` only accept POST; any other method gets a 405 with
/// the service's own message. Unknown paths get the usage text.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", any(usage::handler))
        .route(
            "/spike",
            post(interval::spike).fallback(interval::spike_method_not_allowed),
        )
        .route(
            "/spoke",
            post(interval::spoke).fallback(interval::spoke_method_not_allowed),
        )
        .route("/health", get(health::handler))
        .route("/metrics", get(metrics::handler))
        .fallback(usage::handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}

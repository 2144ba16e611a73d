//! `/spike` and `/spoke` endpoints
//!
//! Both routes take the same body, a flat JSON object of string values:
//!
//! ```json
//! {
//!   "source_id": "app1",
//!   "instance_id": "0",
//!   "process_instance_id": "p1",
//!   "spike_start": "2023-01-01T00:00:00Z",
//!   "spike_end": "2023-01-01T00:05:00Z"
//! }
//! ```
//!
//! They differ only in the gauge names emitted.

use crate::emitter::IntervalKind;
use crate::error::{AppError, AppResult};
use crate::handlers::AppState;
use crate::interval::IntervalRecord;
use crate::metrics::Outcome;
use axum::{
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::StatusCode,
};
use std::collections::HashMap;

/// POST /spike
pub async fn spike(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<StatusCode> {
    accept(&state, IntervalKind::Spike, body)
}

/// POST /spoke
pub async fn spoke(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<StatusCode> {
    accept(&state, IntervalKind::Spoke, body)
}

/// Any non-POST method on /spike
pub async fn spike_method_not_allowed(State(state): State<AppState>) -> AppError {
    reject_method(&state, IntervalKind::Spike)
}

/// Any non-POST method on /spoke
pub async fn spoke_method_not_allowed(State(state): State<AppState>) -> AppError {
    reject_method(&state, IntervalKind::Spoke)
}

fn reject_method(state: &AppState, kind: IntervalKind) -> AppError {
    state.metrics().request(kind, Outcome::MethodNotAllowed);
    AppError::MethodNotAllowed
}

fn accept(
    state: &AppState,
    kind: IntervalKind,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<StatusCode> {
    let result = decode_and_emit(state, kind, body);

    match &result {
        Ok(_) => state.metrics().request(kind, Outcome::Accepted),
        Err(e) => {
            tracing::debug!(kind = %kind, error = %e, "Rejected interval request");
            state.metrics().request(kind, outcome_of(e));
        }
    }

    result
}

fn decode_and_emit(
    state: &AppState,
    kind: IntervalKind,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<StatusCode> {
    let body = body.map_err(|rejection| AppError::BodyRead(rejection.body_text()))?;

    let fields: HashMap<String, String> =
        serde_json::from_slice(&body).map_err(AppError::Decode)?;

    let record = IntervalRecord::parse(&fields).map_err(|source| AppError::Parse {
        kind: kind.as_str(),
        source,
    })?;

    state.emitter().emit(&record, kind);
    Ok(StatusCode::OK)
}

fn outcome_of(error: &AppError) -> Outcome {
    match error {
        AppError::MethodNotAllowed => Outcome::MethodNotAllowed,
        AppError::Decode(_) => Outcome::DecodeFailed,
        AppError::Parse { .. } => Outcome::ParseFailed,
        _ => Outcome::BodyReadFailed,
    }
}

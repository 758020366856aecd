use std::future::Future;

use serde::Deserialize;
use shared::{CompareRequest, CompareResponse, HealthStatus, Route};

use crate::error::ComparisonError;

/// The remote route-comparison service, as seen by a session.
///
/// Implementations perform exactly one request per call and report every
/// transport, status or payload problem as a [`ComparisonError`].
pub trait ComparisonService {
    fn compare(
        &self,
        request: &CompareRequest,
    ) -> impl Future<Output = Result<Vec<Route>, ComparisonError>>;

    fn check_health(&self) -> impl Future<Output = Result<HealthStatus, ComparisonError>>;
}

/// Decode a successful `/routes/compare` body.
pub fn decode_compare_response(body: &str) -> Result<Vec<Route>, ComparisonError> {
    serde_json::from_str::<CompareResponse>(body)
        .map(|response| response.routes)
        .map_err(|err| ComparisonError::MalformedPayload(err.to_string()))
}

pub fn decode_health(body: &str) -> Result<HealthStatus, ComparisonError> {
    serde_json::from_str(body).map_err(|err| ComparisonError::MalformedPayload(err.to_string()))
}

#[derive(Deserialize)]
struct ServiceErrorBody {
    detail: Option<String>,
    message: Option<String>,
}

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Build the error for a non-success answer. The body is only logged and
/// summarised; its structure is not relied upon.
pub fn status_error(status: u16, body: &str) -> ComparisonError {
    tracing::warn!("comparison service answered {status}: {body}");
    let message = serde_json::from_str::<ServiceErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.detail.or(parsed.message))
        .unwrap_or_else(|| body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect());
    ComparisonError::Status { status, message }
}

use thiserror::Error;

/// Failure of a call to the comparison service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComparisonError {
    #[error("comparison service unreachable: {0}")]
    Transport(String),
    #[error("comparison service answered {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed comparison payload: {0}")]
    MalformedPayload(String),
    #[error("comparison service returned no candidate routes")]
    NoCandidates,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("start and end points must both be set before comparing routes")]
    InvalidRequest,
    #[error(transparent)]
    Comparison(#[from] ComparisonError),
}

use frontend::SessionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid point {0:?}, expected `lat,lon`")]
    InvalidPoint(String),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

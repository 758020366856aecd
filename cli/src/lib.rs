pub mod error;
pub mod http;
pub mod report;

use frontend::{ComparisonService, ComparisonSession, Completion, SessionError};
use shared::GeoPoint;

pub use error::CliError;
pub use http::HttpComparisonService;

/// Parse a `lat,lon` pair as typed on the command line.
pub fn parse_point(raw: &str) -> Result<GeoPoint, CliError> {
    let invalid = || CliError::InvalidPoint(raw.to_string());
    let (lat, lon) = raw.split_once(',').ok_or_else(invalid)?;
    let lat = lat.trim().parse::<f64>().map_err(|_| invalid())?;
    let lon = lon.trim().parse::<f64>().map_err(|_| invalid())?;
    Ok(GeoPoint { lat, lon })
}

/// Replay map clicks against a session, running each comparison a click
/// issues before handling the next click. Returns one outcome per issued
/// comparison.
pub async fn replay_clicks<S: ComparisonService>(
    session: &mut ComparisonSession,
    service: &S,
    clicks: &[GeoPoint],
) -> Vec<Result<Completion, SessionError>> {
    let mut outcomes = Vec::new();
    for &click in clicks {
        let Some(pending) = session.submit_click(click).comparison else {
            continue;
        };
        let result = service.compare(&pending.request).await;
        outcomes.push(session.complete_comparison(pending.seq, result));
    }
    outcomes
}

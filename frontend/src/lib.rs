pub mod bounds;
pub mod config;
pub mod error;
pub mod metrics;
pub mod route_set;
pub mod selection;
pub mod service;
pub mod session;
pub mod summary;

#[cfg(target_arch = "wasm32")]
mod app;

pub use config::SessionConfig;
pub use error::{ComparisonError, SessionError};
pub use metrics::DerivedMetrics;
pub use route_set::RouteSet;
pub use selection::{PointSelector, SelectionState};
pub use service::ComparisonService;
pub use session::{ClickOutcome, ComparisonSession, Completion, PendingComparison, SessionSnapshot};

use serde::Serialize;
use shared::{CompareRequest, GeoPoint};

/// Where the two-click start/end picking currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SelectionState {
    #[default]
    NoneSet,
    StartSet { start: GeoPoint },
    BothSet { start: GeoPoint, end: GeoPoint },
}

impl SelectionState {
    pub fn start(&self) -> Option<GeoPoint> {
        match *self {
            SelectionState::NoneSet => None,
            SelectionState::StartSet { start } | SelectionState::BothSet { start, .. } => {
                Some(start)
            }
        }
    }

    pub fn end(&self) -> Option<GeoPoint> {
        match *self {
            SelectionState::BothSet { end, .. } => Some(end),
            _ => None,
        }
    }

    /// The comparison request for this selection, once both points are set.
    pub fn to_request(&self) -> Option<CompareRequest> {
        match *self {
            SelectionState::BothSet { start, end } => Some(CompareRequest { start, end }),
            _ => None,
        }
    }
}

/// Turns map clicks into a start/end pair.
///
/// Click once for the start, a second time for the end, and a third time to
/// start over from the clicked point.
#[derive(Debug, Clone, Default)]
pub struct PointSelector {
    state: SelectionState,
}

impl PointSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn submit_click(&mut self, point: GeoPoint) -> SelectionState {
        self.state = match self.state {
            SelectionState::NoneSet => SelectionState::StartSet { start: point },
            SelectionState::StartSet { start } => SelectionState::BothSet { start, end: point },
            SelectionState::BothSet { .. } => SelectionState::StartSet { start: point },
        };
        self.state
    }
}

use std::collections::BTreeSet;

use serde::Serialize;

use crate::route_set::RouteSet;

/// One line of the candidate list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub id: String,
    pub distance_km: f64,
    pub duration_min: f64,
    pub ascent_m: f64,
    pub steps_count: u32,
    pub accessibility_score: Option<f64>,
    pub flags: BTreeSet<String>,
    pub recommended: bool,
    pub selected: bool,
}

pub fn summarize(routes: &RouteSet) -> Vec<RouteSummary> {
    let selected_id = routes.selected_id();
    let recommended_id = routes.recommended().map(|route| route.id.as_str());
    routes
        .routes()
        .iter()
        .map(|route| RouteSummary {
            id: route.id.clone(),
            distance_km: route.distance_m / 1000.0,
            duration_min: route.duration_s / 60.0,
            ascent_m: route.elevation_metrics.ascent_m,
            steps_count: route.osm_summary.steps_count,
            accessibility_score: route.accessibility_score,
            flags: route.flags.clone(),
            recommended: recommended_id == Some(route.id.as_str()),
            selected: selected_id == Some(route.id.as_str()),
        })
        .collect()
}

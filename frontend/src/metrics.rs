use std::collections::BTreeMap;

use serde::Serialize;
use shared::Route;

use crate::route_set::RouteSet;

/// Chart and breakdown data for the selected candidate.
///
/// Every field is `None` when nothing is selected; that means "nothing to
/// show", not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivedMetrics {
    /// `(dist_m, elev_m)` pairs in profile order.
    pub elevation_series: Option<Vec<(f64, f64)>>,
    pub surface_breakdown: Option<BTreeMap<String, u32>>,
    pub smoothness_breakdown: Option<BTreeMap<String, u32>>,
    /// Share of samples with no surface tag, in whole percent.
    pub unknown_surface_percent: Option<f64>,
}

impl DerivedMetrics {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

pub fn project(routes: &RouteSet) -> DerivedMetrics {
    routes.selected().map(project_route).unwrap_or_default()
}

fn project_route(route: &Route) -> DerivedMetrics {
    let elevation_series = route
        .elevation_profile
        .iter()
        .map(|sample| (sample.dist_m, sample.elev_m))
        .collect();

    DerivedMetrics {
        elevation_series: Some(elevation_series),
        surface_breakdown: Some(route.osm_summary.surfaces.clone()),
        smoothness_breakdown: Some(route.osm_summary.smoothness.clone()),
        unknown_surface_percent: Some((route.osm_summary.unknown_surface_ratio * 100.0).round()),
    }
}

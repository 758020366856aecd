use shared::{GeoPoint, Route, RouteBounds};

/// Smallest rectangle enclosing every geometry point of `routes`, grown by
/// `padding` on each side. `None` when there is no point at all.
///
/// `padding` is in the renderer's unit (degrees for the map pages here) and
/// only keeps routes off the viewport edge.
pub fn fit(routes: &[Route], padding: f64) -> Option<RouteBounds> {
    let mut points = routes.iter().flat_map(|route| route.geometry.iter());
    let first = points.next()?;
    let bounds = points.fold(point_bounds(*first), |bounds, point| RouteBounds {
        min_lat: bounds.min_lat.min(point.lat),
        max_lat: bounds.max_lat.max(point.lat),
        min_lon: bounds.min_lon.min(point.lon),
        max_lon: bounds.max_lon.max(point.lon),
    });
    Some(bounds.padded(padding))
}

fn point_bounds(point: GeoPoint) -> RouteBounds {
    RouteBounds {
        min_lat: point.lat,
        max_lat: point.lat,
        min_lon: point.lon,
        max_lon: point.lon,
    }
}

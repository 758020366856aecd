use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

/// Latitude/longitude pair in degrees.
///
/// Accepts both `{"lat": .., "lon": ..}` objects and `[lat, lon]` pairs on the
/// wire (the comparison service emits geometries as pairs), always serializes
/// as an object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "GeoPointRepr")]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GeoPointRepr {
    Pair([f64; 2]),
    Object { lat: f64, lon: f64 },
}

impl From<GeoPointRepr> for GeoPoint {
    fn from(repr: GeoPointRepr) -> Self {
        match repr {
            GeoPointRepr::Pair([lat, lon]) => Self { lat, lon },
            GeoPointRepr::Object { lat, lon } => Self { lat, lon },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SteepDistance {
    #[serde(default)]
    pub gt5: f64,
    #[serde(default)]
    pub gt8: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ElevationMetrics {
    #[serde(default)]
    pub ascent_m: f64,
    #[serde(default)]
    pub descent_m: f64,
    #[serde(default)]
    pub max_slope_percent: f64,
    #[serde(default)]
    pub steep_distance_m: SteepDistance,
}

/// One sample of the elevation-vs-distance curve along a route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationSample {
    pub i: u32,
    pub lat: f64,
    pub lon: f64,
    pub elev_m: f64,
    pub dist_m: f64,
}

/// Aggregated OSM tag statistics sampled along a route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OsmSummary {
    #[serde(default)]
    pub steps_count: u32,
    #[serde(default)]
    pub surfaces: BTreeMap<String, u32>,
    #[serde(default)]
    pub smoothness: BTreeMap<String, u32>,
    #[serde(default)]
    pub highway_types: BTreeMap<String, u32>,
    #[serde(default)]
    pub kerb_nodes_count: u32,
    #[serde(default)]
    pub unknown_surface_ratio: f64,
    #[serde(default)]
    pub sample_points_used: u32,
}

/// A candidate route as returned by the comparison service.
///
/// Only `id` and `geometry` are mandatory; the service may omit the metric
/// blocks, in which case they default to empty values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: String,
    pub geometry: Vec<GeoPoint>,
    #[serde(default)]
    pub distance_m: f64,
    #[serde(default)]
    pub duration_s: f64,
    #[serde(default)]
    pub elevation_metrics: ElevationMetrics,
    #[serde(default)]
    pub elevation_profile: Vec<ElevationSample>,
    #[serde(default)]
    pub osm_summary: OsmSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility_score: Option<f64>,
    #[serde(default)]
    pub flags: BTreeSet<String>,
}

impl Route {
    /// Bare route with geometry only; metrics left at their defaults.
    pub fn new(id: impl Into<String>, geometry: Vec<GeoPoint>) -> Self {
        Self {
            id: id.into(),
            geometry,
            distance_m: 0.0,
            duration_s: 0.0,
            elevation_metrics: ElevationMetrics::default(),
            elevation_profile: Vec::new(),
            osm_summary: OsmSummary::default(),
            accessibility_score: None,
            flags: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompareRequest {
    pub start: GeoPoint,
    pub end: GeoPoint,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompareResponse {
    #[serde(default, deserialize_with = "routes_or_empty")]
    pub routes: Vec<Route>,
}

/// A missing, null or non-array `routes` field means "no candidates".
fn routes_or_empty<'de, D>(deserializer: D) -> Result<Vec<Route>, D::Error>
where
    D: Deserializer<'de>,
{
    struct RoutesVisitor;

    impl<'de> Visitor<'de> for RoutesVisitor {
        type Value = Vec<Route>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a list of routes")
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut routes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(route) = seq.next_element::<Route>()? {
                routes.push(route);
            }
            Ok(routes)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(Vec::new())
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_any(self)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_str<E: de::Error>(self, _: &str) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(RoutesVisitor)
}

/// Axis-aligned lat/lon rectangle used to frame the map view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl RouteBounds {
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lon >= self.min_lon
            && point.lon <= self.max_lon
    }

    /// Grow every side by `padding`.
    pub fn padded(self, padding: f64) -> Self {
        Self {
            min_lat: self.min_lat - padding,
            max_lat: self.max_lat + padding,
            min_lon: self.min_lon - padding,
            max_lon: self.max_lon + padding,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub ok: bool,
}

use std::collections::BTreeMap;
use std::fmt::Write;

use frontend::{SelectionState, SessionSnapshot};

/// Plain-text rendering of a session for the terminal.
pub fn render_text(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();

    match snapshot.selection {
        SelectionState::NoneSet => out.push_str("points: none selected\n"),
        SelectionState::StartSet { start } => {
            let _ = writeln!(out, "points: start {:.5},{:.5}", start.lat, start.lon);
        }
        SelectionState::BothSet { start, end } => {
            let _ = writeln!(
                out,
                "points: start {:.5},{:.5} -> end {:.5},{:.5}",
                start.lat, start.lon, end.lat, end.lon
            );
        }
    }

    let viewport = snapshot.viewport;
    let _ = writeln!(
        out,
        "viewport: [{:.5}..{:.5}] lat / [{:.5}..{:.5}] lon",
        viewport.min_lat, viewport.max_lat, viewport.min_lon, viewport.max_lon
    );

    if let Some(error) = &snapshot.error {
        let _ = writeln!(out, "error: {error}");
    }

    if snapshot.routes.is_empty() {
        out.push_str("no candidate routes\n");
        return out;
    }

    out.push_str("candidates:\n");
    for route in &snapshot.routes {
        let marker = if route.selected { '*' } else { ' ' };
        let score = route
            .accessibility_score
            .map(|score| format!("{score:.1}"))
            .unwrap_or_else(|| "-".to_string());
        let _ = write!(
            out,
            " {marker} {:<10} {:>7.2} km {:>6.0} min  +{:.0} m  score {score}",
            route.id, route.distance_km, route.duration_min, route.ascent_m
        );
        if route.recommended {
            out.push_str("  [recommended]");
        }
        if !route.flags.is_empty() {
            let flags: Vec<&str> = route.flags.iter().map(String::as_str).collect();
            let _ = write!(out, "  flags: {}", flags.join(","));
        }
        out.push('\n');
    }

    let metrics = &snapshot.metrics;
    if let Some(series) = &metrics.elevation_series {
        let _ = writeln!(out, "elevation samples: {}", series.len());
    }
    write_breakdown(&mut out, "surfaces", metrics.surface_breakdown.as_ref());
    write_breakdown(&mut out, "smoothness", metrics.smoothness_breakdown.as_ref());
    if let Some(percent) = metrics.unknown_surface_percent {
        let _ = writeln!(out, "unknown surface: {percent:.0}%");
    }

    out
}

fn write_breakdown(out: &mut String, label: &str, counts: Option<&BTreeMap<String, u32>>) {
    let Some(counts) = counts else {
        return;
    };
    let parts: Vec<String> = counts
        .iter()
        .map(|(tag, count)| format!("{tag}={count}"))
        .collect();
    let _ = writeln!(out, "{label}: {}", parts.join(" "));
}

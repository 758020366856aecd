use seed::{prelude::*, *};
use serde::Deserialize;
use serde_wasm_bindgen::to_value;
use shared::{GeoPoint, Route};
use wasm_bindgen::{
    JsCast,
    prelude::{JsValue, wasm_bindgen},
};

use crate::{
    ComparisonError, ComparisonSession, Completion, PendingComparison, SelectionState,
    SessionConfig,
    metrics::DerivedMetrics,
    service::{decode_compare_response, status_error},
    summary::RouteSummary,
};

#[wasm_bindgen(module = "/maplibre_map.js")]
extern "C" {
    #[wasm_bindgen(js_name = initMap)]
    fn init_map();
    #[wasm_bindgen(js_name = updateRoutes)]
    fn update_routes_js(routes: JsValue, selected_id: JsValue);
    #[wasm_bindgen(js_name = updateSelectionMarkers)]
    fn update_selection_markers(start: JsValue, end: JsValue);
    #[wasm_bindgen(js_name = fitBounds)]
    fn fit_bounds_js(bounds: JsValue);
    #[wasm_bindgen(js_name = renderElevationChart)]
    fn render_elevation_chart(series: JsValue);
}

pub struct Model {
    session: ComparisonSession,
}

pub enum Msg {
    MapClicked { lat: f64, lon: f64 },
    SelectRoute(String),
    ComparisonFetched {
        seq: u64,
        result: Result<Vec<Route>, ComparisonError>,
    },
}

#[derive(Deserialize)]
struct MapClickPayload {
    lat: f64,
    lon: f64,
}

fn init(_: Url, orders: &mut impl Orders<Msg>) -> Model {
    orders.stream(streams::window_event(Ev::from("map-click"), |event| {
        let event = event.dyn_into::<web_sys::CustomEvent>().ok()?;
        let payload: MapClickPayload = serde_wasm_bindgen::from_value(event.detail()).ok()?;
        Some(Msg::MapClicked {
            lat: payload.lat,
            lon: payload.lon,
        })
    }));

    let model = Model {
        session: ComparisonSession::new(SessionConfig::from_env()),
    };
    sync_map(&model.session);
    model
}

fn update(msg: Msg, model: &mut Model, orders: &mut impl Orders<Msg>) {
    match msg {
        Msg::MapClicked { lat, lon } => {
            web_sys::console::debug_1(
                &format!("[frontend] map click lat={lat:.5} lon={lon:.5}").into(),
            );
            let outcome = model.session.submit_click(GeoPoint { lat, lon });
            sync_selection_markers(outcome.state);
            if let Some(pending) = outcome.comparison {
                let url = model.session.config().compare_url();
                orders.perform_cmd(send_comparison(url, pending));
            }
        }
        Msg::SelectRoute(id) => {
            if model.session.select_route(&id) {
                sync_routes(&model.session);
                sync_chart(&model.session.derived_metrics());
            } else {
                orders.skip();
            }
        }
        Msg::ComparisonFetched { seq, result } => {
            match model.session.complete_comparison(seq, result) {
                Ok(Completion::Stale) => {
                    orders.skip();
                }
                Ok(Completion::Applied) => sync_map(&model.session),
                Err(err) => {
                    web_sys::console::error_1(&format!("[frontend] {err}").into());
                    sync_map(&model.session);
                }
            }
        }
    }
}

async fn send_comparison(url: String, pending: PendingComparison) -> Msg {
    let seq = pending.seq;
    let result = match Request::new(url).method(Method::Post).json(&pending.request) {
        Err(err) => Err(ComparisonError::Transport(format!("{err:?}"))),
        Ok(request) => match request.fetch().await {
            Err(err) => Err(ComparisonError::Transport(format!("{err:?}"))),
            Ok(raw) => {
                let status = raw.status();
                match raw.text().await {
                    Err(err) => Err(ComparisonError::MalformedPayload(format!("{err:?}"))),
                    Ok(body) if status.is_ok() => decode_compare_response(&body),
                    Ok(body) => Err(status_error(status.code, &body)),
                }
            }
        },
    };
    Msg::ComparisonFetched { seq, result }
}

fn view(model: &Model) -> Node<Msg> {
    let session = &model.session;
    div![
        C!["app-container"],
        h1!["Comparer des itinéraires accessibles"],
        view_selection_hint(session.selection(), session.is_pending()),
        view_candidates(&session.summaries()),
        view_metrics(&session.derived_metrics()),
        if let Some(error) = session.last_error() {
            p![C!["error"], error.to_string()]
        } else {
            empty![]
        }
    ]
}

fn view_selection_hint(state: SelectionState, pending: bool) -> Node<Msg> {
    let hint = match state {
        SelectionState::NoneSet => "Cliquez sur la carte pour placer le départ.",
        SelectionState::StartSet { .. } => "Cliquez sur la carte pour placer l'arrivée.",
        SelectionState::BothSet { .. } if pending => "Recherche des itinéraires…",
        SelectionState::BothSet { .. } => "Cliquez à nouveau pour recommencer.",
    };
    p![C!["selection-hint"], hint]
}

fn view_candidates(summaries: &[RouteSummary]) -> Node<Msg> {
    if summaries.is_empty() {
        return empty![];
    }
    ul![C!["candidates"], summaries.iter().map(view_candidate)]
}

fn view_candidate(summary: &RouteSummary) -> Node<Msg> {
    let id = summary.id.clone();
    let score = summary
        .accessibility_score
        .map(|score| format!(" — score {score:.0}"))
        .unwrap_or_default();
    li![
        C!["candidate", IF!(summary.selected => "selected")],
        button![
            format!(
                "{}{} · {:.2} km · {:.0} min · +{:.0} m{score}",
                summary.id,
                if summary.recommended { " (recommandé)" } else { "" },
                summary.distance_km,
                summary.duration_min,
                summary.ascent_m,
            ),
            ev(Ev::Click, move |_| Msg::SelectRoute(id.clone())),
        ],
        summary
            .flags
            .iter()
            .map(|flag| span![C!["flag"], flag.as_str()]),
    ]
}

fn view_metrics(metrics: &DerivedMetrics) -> Node<Msg> {
    if metrics.is_empty() {
        return empty![];
    }
    let breakdown = |title: &str, counts: &Option<std::collections::BTreeMap<String, u32>>| {
        div![
            C!["breakdown"],
            h3![title],
            ul![counts
                .iter()
                .flatten()
                .map(|(tag, count)| li![format!("{tag}: {count}")])],
        ]
    };

    div![
        C!["metrics"],
        breakdown("Revêtements", &metrics.surface_breakdown),
        breakdown("Qualité", &metrics.smoothness_breakdown),
        metrics
            .unknown_surface_percent
            .map(|percent| p![format!("Revêtement inconnu : {percent:.0} %")])
            .unwrap_or_else(|| empty![]),
    ]
}

fn sync_map(session: &ComparisonSession) {
    sync_selection_markers(session.selection());
    sync_routes(session);
    if let Ok(bounds) = to_value(&session.viewport()) {
        fit_bounds_js(bounds);
    }
    sync_chart(&session.derived_metrics());
}

fn sync_routes(session: &ComparisonSession) {
    let routes = session.route_set();
    if let Ok(value) = to_value(routes.routes()) {
        let selected = routes
            .selected_id()
            .map(JsValue::from_str)
            .unwrap_or(JsValue::NULL);
        update_routes_js(value, selected);
    }
}

fn sync_selection_markers(state: SelectionState) {
    let to_js = |point: Option<GeoPoint>| {
        point
            .and_then(|point| to_value(&point).ok())
            .unwrap_or(JsValue::NULL)
    };
    update_selection_markers(to_js(state.start()), to_js(state.end()));
}

fn sync_chart(metrics: &DerivedMetrics) {
    let series = metrics
        .elevation_series
        .as_ref()
        .and_then(|series| to_value(series).ok())
        .unwrap_or(JsValue::NULL);
    render_elevation_chart(series);
}

#[wasm_bindgen(start)]
pub fn start() {
    init_map();
    App::start("app", init, update, view);
}

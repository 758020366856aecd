use std::collections::BTreeMap;

use serde::Serialize;
use shared::{CompareRequest, GeoPoint, Route, RouteBounds};

use crate::{
    bounds,
    config::SessionConfig,
    error::{ComparisonError, SessionError},
    metrics::{self, DerivedMetrics},
    route_set::RouteSet,
    selection::{PointSelector, SelectionState},
    service::ComparisonService,
    summary::{self, RouteSummary},
};

/// A comparison request handed out by the session, tagged with its sequence
/// number. Feed the service's answer back through
/// [`ComparisonSession::complete_comparison`] with the same `seq`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingComparison {
    pub seq: u64,
    pub request: CompareRequest,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickOutcome {
    pub state: SelectionState,
    /// Set when this click completed the start/end pair.
    pub comparison: Option<PendingComparison>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer comparison already completed; this answer was dropped.
    Stale,
}

/// Everything the presentation layer renders, in one serializable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub selection: SelectionState,
    pub routes: Vec<RouteSummary>,
    pub selected_id: Option<String>,
    pub metrics: DerivedMetrics,
    pub viewport: RouteBounds,
    pub pending: bool,
    pub error: Option<String>,
}

/// Client-side state of one route comparison page.
///
/// Owns the click selector and the candidate set. Comparisons are split into
/// an issue step and a completion step so callers can keep handling clicks
/// while a request is outstanding; answers arriving after a newer one has
/// been applied are discarded.
///
/// A comparison is outstanding from the moment it is issued until its answer
/// is applied, or until a newer answer is applied, which makes its own answer
/// stale.
pub struct ComparisonSession {
    config: SessionConfig,
    selector: PointSelector,
    routes: RouteSet,
    fitted: Option<RouteBounds>,
    last_error: Option<ComparisonError>,
    last_issued_seq: u64,
    last_applied_seq: u64,
    outstanding: BTreeMap<u64, CompareRequest>,
}

impl ComparisonSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            selector: PointSelector::new(),
            routes: RouteSet::new(),
            fitted: None,
            last_error: None,
            last_issued_seq: 0,
            last_applied_seq: 0,
            outstanding: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Advance the start/end selection; the click that sets the end point
    /// also issues a comparison.
    pub fn submit_click(&mut self, point: GeoPoint) -> ClickOutcome {
        let state = self.selector.submit_click(point);
        tracing::debug!(
            "map click lat={:.5} lon={:.5} -> {state:?}",
            point.lat,
            point.lon
        );
        let comparison = state.to_request().map(|request| self.issue(request));
        ClickOutcome { state, comparison }
    }

    /// Issue a comparison between `start` and `end`. Nothing changes when
    /// either point is missing.
    pub fn begin_comparison(
        &mut self,
        start: Option<GeoPoint>,
        end: Option<GeoPoint>,
    ) -> Result<PendingComparison, SessionError> {
        match (start, end) {
            (Some(start), Some(end)) => Ok(self.issue(CompareRequest { start, end })),
            _ => {
                tracing::debug!("comparison requested without both points, not issued");
                Err(SessionError::InvalidRequest)
            }
        }
    }

    fn issue(&mut self, request: CompareRequest) -> PendingComparison {
        self.last_issued_seq += 1;
        self.outstanding.insert(self.last_issued_seq, request);
        self.last_error = None;
        tracing::info!(
            "issuing comparison #{} start=({:.5},{:.5}) end=({:.5},{:.5})",
            self.last_issued_seq,
            request.start.lat,
            request.start.lon,
            request.end.lat,
            request.end.lon
        );
        PendingComparison {
            seq: self.last_issued_seq,
            request,
        }
    }

    /// Apply the service's answer to comparison `seq`.
    ///
    /// A non-empty candidate list replaces the route set and selects its
    /// first route. An empty list or a failure empties the route set and is
    /// returned as an error for the caller to show. Answers older than the
    /// last applied one, repeated answers and answers to comparisons this
    /// session never issued are dropped without touching any state.
    pub fn complete_comparison(
        &mut self,
        seq: u64,
        result: Result<Vec<Route>, ComparisonError>,
    ) -> Result<Completion, SessionError> {
        if self.outstanding.remove(&seq).is_none() {
            tracing::debug!(
                "dropping comparison #{seq}, not outstanding (#{} already applied)",
                self.last_applied_seq
            );
            return Ok(Completion::Stale);
        }
        self.last_applied_seq = seq;
        self.outstanding = self.outstanding.split_off(&(seq + 1));

        match result {
            Ok(routes) if !routes.is_empty() => {
                tracing::info!("comparison #{seq} returned {} candidate(s)", routes.len());
                self.replace_routes(routes);
                self.last_error = None;
                Ok(Completion::Applied)
            }
            Ok(_) => Err(self.fail(seq, ComparisonError::NoCandidates)),
            Err(err) => Err(self.fail(seq, err)),
        }
    }

    fn fail(&mut self, seq: u64, err: ComparisonError) -> SessionError {
        tracing::warn!("comparison #{seq} failed: {err}");
        self.routes.clear();
        self.fitted = None;
        self.last_error = Some(err.clone());
        SessionError::Comparison(err)
    }

    fn replace_routes(&mut self, routes: Vec<Route>) {
        self.routes.replace(routes, None);
        self.fitted = bounds::fit(self.routes.routes(), self.config.fit_padding);
    }

    /// Issue, await and apply one comparison.
    pub async fn request_comparison<S: ComparisonService>(
        &mut self,
        service: &S,
        start: Option<GeoPoint>,
        end: Option<GeoPoint>,
    ) -> Result<RouteSet, SessionError> {
        let pending = self.begin_comparison(start, end)?;
        let result = service.compare(&pending.request).await;
        self.complete_comparison(pending.seq, result)?;
        Ok(self.routes.clone())
    }

    /// [`request_comparison`](Self::request_comparison) for the currently
    /// clicked points. When the click that set the end point issued a
    /// comparison that is still outstanding, that comparison is the one sent.
    pub async fn compare_selection<S: ComparisonService>(
        &mut self,
        service: &S,
    ) -> Result<RouteSet, SessionError> {
        let state = self.selector.state();
        let pending = match self.outstanding_for(state.to_request()) {
            Some(pending) => pending,
            None => self.begin_comparison(state.start(), state.end())?,
        };
        let result = service.compare(&pending.request).await;
        self.complete_comparison(pending.seq, result)?;
        Ok(self.routes.clone())
    }

    /// Latest outstanding comparison, if it asks for `request`.
    fn outstanding_for(&self, request: Option<CompareRequest>) -> Option<PendingComparison> {
        let request = request?;
        let (&seq, &issued) = self.outstanding.last_key_value()?;
        (issued == request).then_some(PendingComparison { seq, request })
    }

    /// Switch the active candidate. Unknown ids are ignored and reported as
    /// `false`.
    pub fn select_route(&mut self, id: &str) -> bool {
        self.routes.select(id)
    }

    pub fn selection(&self) -> SelectionState {
        self.selector.state()
    }

    pub fn route_set(&self) -> &RouteSet {
        &self.routes
    }

    pub fn derived_metrics(&self) -> DerivedMetrics {
        metrics::project(&self.routes)
    }

    pub fn summaries(&self) -> Vec<RouteSummary> {
        summary::summarize(&self.routes)
    }

    /// Region fitted around the current candidates, if any.
    pub fn fitted_region(&self) -> Option<RouteBounds> {
        self.fitted
    }

    /// Region the map should show: the fitted one, else the configured default.
    pub fn viewport(&self) -> RouteBounds {
        self.fitted.unwrap_or(self.config.default_viewport)
    }

    pub fn last_error(&self) -> Option<&ComparisonError> {
        self.last_error.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        !self.outstanding.is_empty()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            selection: self.selection(),
            routes: self.summaries(),
            selected_id: self.routes.selected_id().map(str::to_owned),
            metrics: self.derived_metrics(),
            viewport: self.viewport(),
            pending: self.is_pending(),
            error: self.last_error.as_ref().map(ToString::to_string),
        }
    }
}

impl Default for ComparisonSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use shared::HealthStatus;

    use super::*;

    /// Answers comparisons from a queue and records what was asked.
    #[derive(Default)]
    struct ScriptedService {
        answers: RefCell<VecDeque<Result<Vec<Route>, ComparisonError>>>,
        requests: RefCell<Vec<CompareRequest>>,
    }

    impl ScriptedService {
        fn answering(answers: Vec<Result<Vec<Route>, ComparisonError>>) -> Self {
            Self {
                answers: RefCell::new(answers.into()),
                requests: RefCell::default(),
            }
        }
    }

    impl ComparisonService for ScriptedService {
        async fn compare(&self, request: &CompareRequest) -> Result<Vec<Route>, ComparisonError> {
            self.requests.borrow_mut().push(*request);
            self.answers
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(ComparisonError::Transport("no scripted answer".into())))
        }

        async fn check_health(&self) -> Result<HealthStatus, ComparisonError> {
            Ok(HealthStatus { ok: true })
        }
    }

    fn p(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint { lat, lon }
    }

    fn route(id: &str, geometry: &[(f64, f64)]) -> Route {
        Route::new(id, geometry.iter().map(|&(lat, lon)| p(lat, lon)).collect())
    }

    fn two_routes() -> Vec<Route> {
        vec![
            route("route-1", &[(45.930, 4.577), (45.935, 4.576), (45.940, 4.575)]),
            route("via-1", &[(45.930, 4.577), (45.936, 4.581), (45.940, 4.575)]),
        ]
    }

    #[test]
    fn second_click_issues_exactly_one_comparison() {
        let mut session = ComparisonSession::default();
        let a = p(45.930, 4.577);
        let b = p(45.940, 4.575);

        assert_eq!(session.submit_click(a).comparison, None);
        let outcome = session.submit_click(b);
        assert_eq!(outcome.state, SelectionState::BothSet { start: a, end: b });
        let pending = outcome.comparison.unwrap();
        assert_eq!(pending.request, CompareRequest { start: a, end: b });
        assert!(session.is_pending());

        let third = session.submit_click(p(45.0, 4.0));
        assert_eq!(third.comparison, None);
        assert_eq!(third.state, SelectionState::StartSet { start: p(45.0, 4.0) });
    }

    #[test]
    fn success_selects_recommended_and_fits_all_routes() {
        let mut session = ComparisonSession::default();
        session.submit_click(p(45.930, 4.577));
        let pending = session.submit_click(p(45.940, 4.575)).comparison.unwrap();

        let outcome = session.complete_comparison(pending.seq, Ok(two_routes()));
        assert_eq!(outcome, Ok(Completion::Applied));
        assert!(!session.is_pending());
        assert_eq!(session.route_set().selected_id(), Some("route-1"));

        let region = session.fitted_region().unwrap();
        for point in session.route_set().routes().iter().flat_map(|r| &r.geometry) {
            assert!(region.contains(*point));
        }
        assert_eq!(session.viewport(), region);
        assert!(session.derived_metrics().elevation_series.is_some());
    }

    #[test]
    fn failure_resets_routes_but_keeps_points() {
        let mut session = ComparisonSession::default();
        let a = p(45.930, 4.577);
        let b = p(45.940, 4.575);
        session.submit_click(a);
        let first = session.submit_click(b).comparison.unwrap();
        session.complete_comparison(first.seq, Ok(two_routes())).unwrap();

        let retry = session.begin_comparison(Some(a), Some(b)).unwrap();
        let err = session
            .complete_comparison(
                retry.seq,
                Err(ComparisonError::Status {
                    status: 502,
                    message: "No routes found".into(),
                }),
            )
            .unwrap_err();

        assert!(matches!(err, SessionError::Comparison(ComparisonError::Status { status: 502, .. })));
        assert!(session.route_set().is_empty());
        assert_eq!(session.route_set().selected_id(), None);
        assert_eq!(session.fitted_region(), None);
        assert_eq!(session.viewport(), session.config().default_viewport);
        assert_eq!(session.selection(), SelectionState::BothSet { start: a, end: b });
        assert!(session.last_error().is_some());
        assert!(session.derived_metrics().is_empty());
    }

    #[test]
    fn empty_candidate_list_is_reported_and_clears_routes() {
        let mut session = ComparisonSession::default();
        let first = session.begin_comparison(Some(p(0.0, 0.0)), Some(p(1.0, 1.0))).unwrap();
        session.complete_comparison(first.seq, Ok(two_routes())).unwrap();

        let second = session.begin_comparison(Some(p(0.0, 0.0)), Some(p(1.0, 1.0))).unwrap();
        assert_eq!(
            session.complete_comparison(second.seq, Ok(Vec::new())),
            Err(SessionError::Comparison(ComparisonError::NoCandidates))
        );
        assert!(session.route_set().is_empty());
        assert_eq!(session.route_set().selected_id(), None);
    }

    #[test]
    fn missing_point_is_an_invalid_request_without_side_effects() {
        let mut session = ComparisonSession::default();
        session.submit_click(p(1.0, 1.0));
        assert_eq!(
            session.begin_comparison(Some(p(1.0, 1.0)), None),
            Err(SessionError::InvalidRequest)
        );
        assert!(!session.is_pending());
        assert_eq!(session.selection(), SelectionState::StartSet { start: p(1.0, 1.0) });

        let next = session.begin_comparison(Some(p(1.0, 1.0)), Some(p(2.0, 2.0))).unwrap();
        assert_eq!(next.seq, 1);
    }

    #[test]
    fn late_answer_to_older_request_is_dropped() {
        let mut session = ComparisonSession::default();
        let older = session.begin_comparison(Some(p(0.0, 0.0)), Some(p(1.0, 1.0))).unwrap();
        let newer = session.begin_comparison(Some(p(0.0, 0.0)), Some(p(2.0, 2.0))).unwrap();
        assert!(newer.seq > older.seq);

        session
            .complete_comparison(newer.seq, Ok(vec![route("newer", &[(0.0, 0.0), (2.0, 2.0)])]))
            .unwrap();
        let stale = session.complete_comparison(
            older.seq,
            Ok(vec![route("older", &[(0.0, 0.0), (1.0, 1.0)])]),
        );

        assert_eq!(stale, Ok(Completion::Stale));
        assert_eq!(session.route_set().selected_id(), Some("newer"));
        assert!(!session.is_pending());
    }

    #[test]
    fn stale_failure_does_not_clear_newer_routes() {
        let mut session = ComparisonSession::default();
        let older = session.begin_comparison(Some(p(0.0, 0.0)), Some(p(1.0, 1.0))).unwrap();
        let newer = session.begin_comparison(Some(p(0.0, 0.0)), Some(p(2.0, 2.0))).unwrap();
        session.complete_comparison(newer.seq, Ok(two_routes())).unwrap();

        let stale = session.complete_comparison(
            older.seq,
            Err(ComparisonError::Transport("connection reset".into())),
        );
        assert_eq!(stale, Ok(Completion::Stale));
        assert_eq!(session.route_set().len(), 2);
        assert!(session.last_error().is_none());
    }

    #[test]
    fn repeated_answer_does_not_clear_pending_of_newer_request() {
        let mut session = ComparisonSession::default();
        let first = session.begin_comparison(Some(p(0.0, 0.0)), Some(p(1.0, 1.0))).unwrap();
        session.complete_comparison(first.seq, Ok(two_routes())).unwrap();
        let second = session.begin_comparison(Some(p(0.0, 0.0)), Some(p(2.0, 2.0))).unwrap();

        assert_eq!(
            session.complete_comparison(first.seq, Ok(Vec::new())),
            Ok(Completion::Stale)
        );
        assert!(session.is_pending());
        assert_eq!(session.route_set().len(), 2);

        assert_eq!(
            session.complete_comparison(99, Ok(Vec::new())),
            Ok(Completion::Stale)
        );
        assert!(session.is_pending());

        session.complete_comparison(second.seq, Ok(two_routes())).unwrap();
        assert!(!session.is_pending());
    }

    #[test]
    fn applying_a_newer_answer_settles_older_requests() {
        let mut session = ComparisonSession::default();
        let older = session.begin_comparison(Some(p(0.0, 0.0)), Some(p(1.0, 1.0))).unwrap();
        let newer = session.begin_comparison(Some(p(0.0, 0.0)), Some(p(2.0, 2.0))).unwrap();
        session.complete_comparison(newer.seq, Ok(two_routes())).unwrap();

        assert!(!session.is_pending());
        assert_eq!(
            session.complete_comparison(older.seq, Ok(Vec::new())),
            Ok(Completion::Stale)
        );
    }

    #[test]
    fn answers_arriving_in_issue_order_are_all_applied() {
        let mut session = ComparisonSession::default();
        let first = session.begin_comparison(Some(p(0.0, 0.0)), Some(p(1.0, 1.0))).unwrap();
        let second = session.begin_comparison(Some(p(0.0, 0.0)), Some(p(2.0, 2.0))).unwrap();

        assert_eq!(
            session.complete_comparison(first.seq, Ok(vec![route("first", &[(0.0, 0.0), (1.0, 1.0)])])),
            Ok(Completion::Applied)
        );
        assert!(session.is_pending());
        assert_eq!(
            session.complete_comparison(second.seq, Ok(vec![route("second", &[(0.0, 0.0), (2.0, 2.0)])])),
            Ok(Completion::Applied)
        );
        assert_eq!(session.route_set().selected_id(), Some("second"));
    }

    #[test]
    fn selecting_another_route_keeps_viewport() {
        let mut session = ComparisonSession::default();
        let pending = session.begin_comparison(Some(p(0.0, 0.0)), Some(p(1.0, 1.0))).unwrap();
        session.complete_comparison(pending.seq, Ok(two_routes())).unwrap();
        let before = session.viewport();

        assert!(session.select_route("via-1"));
        assert!(!session.select_route("via-7"));
        assert_eq!(session.route_set().selected_id(), Some("via-1"));
        assert_eq!(session.viewport(), before);
    }

    #[test]
    fn snapshot_reflects_session_state() {
        let mut session = ComparisonSession::default();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.selection, SelectionState::NoneSet);
        assert!(snapshot.routes.is_empty());
        assert_eq!(snapshot.viewport, session.config().default_viewport);

        session.submit_click(p(45.930, 4.577));
        let pending = session.submit_click(p(45.940, 4.575)).comparison.unwrap();
        assert!(session.snapshot().pending);
        session.complete_comparison(pending.seq, Ok(two_routes())).unwrap();

        let snapshot = session.snapshot();
        assert!(!snapshot.pending);
        assert_eq!(snapshot.selected_id.as_deref(), Some("route-1"));
        assert!(snapshot.routes[0].recommended && snapshot.routes[0].selected);
        assert_eq!(snapshot.error, None);
    }

    #[tokio::test]
    async fn click_click_compare_then_failure() {
        let service = ScriptedService::answering(vec![
            Ok(two_routes()),
            Err(ComparisonError::Transport("connection refused".into())),
        ]);
        let mut session = ComparisonSession::default();
        let a = p(45.930, 4.577);
        let b = p(45.940, 4.575);
        session.submit_click(a);
        session.submit_click(b);

        let routes = session.compare_selection(&service).await.unwrap();
        assert_eq!(routes.selected_id(), Some("route-1"));
        assert_eq!(
            service.requests.borrow().as_slice(),
            &[CompareRequest { start: a, end: b }]
        );
        assert!(!session.is_pending());

        let err = session.compare_selection(&service).await.unwrap_err();
        assert!(matches!(err, SessionError::Comparison(ComparisonError::Transport(_))));
        assert!(session.route_set().is_empty());
        assert_eq!(session.selection(), SelectionState::BothSet { start: a, end: b });
        assert!(!session.is_pending());
    }

    #[tokio::test]
    async fn compare_selection_sends_the_comparison_the_click_issued() {
        let service = ScriptedService::answering(vec![Ok(two_routes())]);
        let mut session = ComparisonSession::default();
        session.submit_click(p(0.0, 0.0));
        let issued = session.submit_click(p(1.0, 1.0)).comparison.unwrap();
        assert_eq!(issued.seq, 1);

        session.compare_selection(&service).await.unwrap();
        assert!(!session.is_pending());
        assert!(!session.snapshot().pending);
        assert_eq!(service.requests.borrow().len(), 1);
        assert_eq!(
            session.complete_comparison(issued.seq, Ok(two_routes())),
            Ok(Completion::Stale)
        );

        let next = session.begin_comparison(Some(p(0.0, 0.0)), Some(p(1.0, 1.0))).unwrap();
        assert_eq!(next.seq, 2);
    }

    #[tokio::test]
    async fn compare_without_points_never_calls_service() {
        let service = ScriptedService::default();
        let mut session = ComparisonSession::default();
        let err = session.compare_selection(&service).await.unwrap_err();
        assert_eq!(err, SessionError::InvalidRequest);
        assert!(service.requests.borrow().is_empty());
    }
}

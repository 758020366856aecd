use serde::Serialize;
use shared::Route;

/// Candidate routes of the last comparison plus the active one.
///
/// Routes keep the order the service returned them in; index 0 is the
/// recommended candidate. `selected_id`, when set, always names a route in
/// `routes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteSet {
    routes: Vec<Route>,
    selected_id: Option<String>,
}

impl RouteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `id` the active candidate. Returns `false` and keeps the previous
    /// selection when no route carries that id.
    pub fn select(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            tracing::debug!("ignoring selection of unknown route {id}");
            return false;
        }
        self.selected_id = Some(id.to_string());
        true
    }

    /// Swap in a new candidate list.
    ///
    /// A non-empty list always ends up with its first (recommended) route
    /// selected; `requested` cannot override that. An empty list clears the
    /// selection.
    pub fn replace(&mut self, routes: Vec<Route>, requested: Option<&str>) {
        let selected_id = routes.first().map(|route| route.id.clone());
        if let (Some(requested), Some(first)) = (requested, selected_id.as_deref()) {
            if requested != first {
                tracing::debug!("selection {requested} replaced by recommended route {first}");
            }
        }
        self.routes = routes;
        self.selected_id = selected_id;
    }

    pub fn clear(&mut self) {
        self.routes.clear();
        self.selected_id = None;
    }

    pub fn current(&self) -> (&[Route], Option<&str>) {
        (&self.routes, self.selected_id.as_deref())
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn selected(&self) -> Option<&Route> {
        self.selected_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn recommended(&self) -> Option<&Route> {
        self.routes.first()
    }

    pub fn get(&self, id: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.id == id)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

use shared::RouteBounds;

pub const DEFAULT_API_ROOT: &str = "http://localhost:8000";
pub const COMPARE_PATH: &str = "/routes/compare";
pub const HEALTH_PATH: &str = "/health";
pub const DEFAULT_FIT_PADDING: f64 = 0.002;

/// Map framing used until a comparison returns routes (Le Bois-d'Oingt area).
pub const DEFAULT_VIEWPORT: RouteBounds = RouteBounds {
    min_lat: 45.920,
    max_lat: 45.950,
    min_lon: 4.560,
    max_lon: 4.590,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub api_root: String,
    /// Margin added around fitted routes, in degrees.
    pub fit_padding: f64,
    pub default_viewport: RouteBounds,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_root: DEFAULT_API_ROOT.to_string(),
            fit_padding: DEFAULT_FIT_PADDING,
            default_viewport: DEFAULT_VIEWPORT,
        }
    }
}

impl SessionConfig {
    /// `ROUTE_COMPARE_API` at runtime, then `FRONTEND_API_ROOT` at build time,
    /// then the local default. `ROUTE_COMPARE_PADDING` overrides the padding.
    pub fn from_env() -> Self {
        let mut config = Self {
            api_root: api_root(),
            ..Self::default()
        };
        if let Ok(raw) = std::env::var("ROUTE_COMPARE_PADDING") {
            match raw.trim().parse::<f64>() {
                Ok(padding) if padding >= 0.0 => config.fit_padding = padding,
                _ => tracing::warn!("ignoring invalid ROUTE_COMPARE_PADDING={raw}"),
            }
        }
        config
    }

    pub fn with_api_root(mut self, api_root: impl Into<String>) -> Self {
        self.api_root = api_root.into().trim_end_matches('/').to_string();
        self
    }

    pub fn compare_url(&self) -> String {
        format!("{}{COMPARE_PATH}", self.api_root)
    }

    pub fn health_url(&self) -> String {
        format!("{}{HEALTH_PATH}", self.api_root)
    }
}

fn api_root() -> String {
    if let Ok(url) = std::env::var("ROUTE_COMPARE_API") {
        return url.trim_end_matches('/').to_string();
    }
    if let Some(url) = option_env!("FRONTEND_API_ROOT") {
        return url.trim_end_matches('/').to_string();
    }
    DEFAULT_API_ROOT.to_string()
}

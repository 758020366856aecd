use std::time::Duration;

use frontend::{
    ComparisonError, ComparisonService, SessionConfig,
    service::{decode_compare_response, decode_health, status_error},
};
use reqwest::{Client, Response};
use shared::{CompareRequest, HealthStatus, Route};

use crate::error::CliError;

/// [`ComparisonService`] over HTTP/JSON.
pub struct HttpComparisonService {
    client: Client,
    compare_url: String,
    health_url: String,
}

impl HttpComparisonService {
    pub fn new(config: &SessionConfig, timeout: Duration) -> Result<Self, CliError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            compare_url: config.compare_url(),
            health_url: config.health_url(),
        })
    }
}

impl ComparisonService for HttpComparisonService {
    async fn compare(&self, request: &CompareRequest) -> Result<Vec<Route>, ComparisonError> {
        tracing::debug!("POST {}", self.compare_url);
        let response = self
            .client
            .post(&self.compare_url)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;
        let body = success_body(response).await?;
        decode_compare_response(&body)
    }

    async fn check_health(&self) -> Result<HealthStatus, ComparisonError> {
        tracing::debug!("GET {}", self.health_url);
        let response = self
            .client
            .get(&self.health_url)
            .send()
            .await
            .map_err(transport_error)?;
        let body = success_body(response).await?;
        decode_health(&body)
    }
}

async fn success_body(response: Response) -> Result<String, ComparisonError> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(status_error(status.as_u16(), &body))
    }
}

fn transport_error(err: reqwest::Error) -> ComparisonError {
    ComparisonError::Transport(err.to_string())
}

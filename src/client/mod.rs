mod types;

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ServiceConfig;
use crate::core::{MonteCarloRequest, ProjectionRequest};
use crate::error::ClientError;

pub use types::{FiMetrics, PercentileBand, ProjectionResponse, SimulationResult, YearlyProjection};

pub trait ProjectionService: Send + Sync + 'static {
    fn project(
        &self,
        request: &ProjectionRequest,
    ) -> impl Future<Output = Result<ProjectionResponse, ClientError>> + Send;

    fn simulate(
        &self,
        request: &MonteCarloRequest,
    ) -> impl Future<Output = Result<SimulationResult, ClientError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpProjectionClient {
    http: reqwest::Client,
    projection_url: String,
    monte_carlo_url: String,
}

impl HttpProjectionClient {
    pub fn new(config: &ServiceConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(http: reqwest::Client, config: &ServiceConfig) -> Self {
        Self {
            http,
            projection_url: config.projection_url(),
            monte_carlo_url: config.monte_carlo_url(),
        }
    }

    async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!(url, "posting projection request");
        let resp = self.http.post(url).json(body).send().await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(serde_json::from_str(&text)?)
    }
}

impl ProjectionService for HttpProjectionClient {
    async fn project(
        &self,
        request: &ProjectionRequest,
    ) -> Result<ProjectionResponse, ClientError> {
        self.post_json(&self.projection_url, request).await
    }

    async fn simulate(
        &self,
        request: &MonteCarloRequest,
    ) -> Result<SimulationResult, ClientError> {
        self.post_json(&self.monte_carlo_url, request).await
    }
}

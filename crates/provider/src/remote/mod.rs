mod wire;

use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use progress_core::model::{CourseSummary, ProgressFilter, ProgressRow};

use crate::provider::{ProgressProvider, ProviderError};

#[derive(Clone, Debug)]
pub struct RemoteProviderConfig {
    pub endpoint: Url,
    pub api_token: String,
}

impl RemoteProviderConfig {
    /// Reads `PROGRESS_API_URL` and `PROGRESS_API_TOKEN`.
    ///
    /// Returns `None` when either is missing or unusable, letting callers
    /// fall back to the synthetic provider.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_token = env::var("PROGRESS_API_TOKEN").ok()?;
        if api_token.trim().is_empty() {
            return None;
        }
        let endpoint = env::var("PROGRESS_API_URL").ok()?;
        let endpoint = Url::parse(endpoint.trim()).ok()?;
        Some(Self {
            endpoint,
            api_token,
        })
    }
}

/// Provider backed by the company's GraphQL reporting endpoint.
#[derive(Clone)]
pub struct RemoteProvider {
    client: Client,
    config: RemoteProviderConfig,
}

impl RemoteProvider {
    #[must_use]
    pub fn new(config: RemoteProviderConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn from_env() -> Option<Self> {
        RemoteProviderConfig::from_env().map(Self::new)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &'static str,
        filter: &ProgressFilter,
    ) -> Result<T, ProviderError> {
        let payload = wire::GraphqlRequest::new(query, filter);
        let response = self
            .client
            .post(self.config.endpoint.clone())
            .bearer_auth(&self.config.api_token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(target: "provider", %status, "course progress query failed");
            return Err(ProviderError::HttpStatus(status));
        }

        let body: wire::GraphqlResponse<T> = response.json().await?;
        body.into_data()
    }
}

#[async_trait]
impl ProgressProvider for RemoteProvider {
    async fn list_rows(&self, filter: &ProgressFilter) -> Result<Vec<ProgressRow>, ProviderError> {
        let filter = filter.normalized();
        let data: wire::RowListingData =
            self.execute(wire::COURSE_PROGRESS_QUERY, &filter).await?;
        let rows = data.into_rows()?;
        debug!(target: "provider", rows = rows.len(), "fetched progress page");
        Ok(rows)
    }

    async fn list_summaries(
        &self,
        filter: &ProgressFilter,
    ) -> Result<Vec<CourseSummary>, ProviderError> {
        let filter = filter.normalized().without_pagination();
        let data: wire::SummaryListingData =
            self.execute(wire::COURSE_SUMMARIES_QUERY, &filter).await?;
        let summaries = data.into_summaries()?;
        debug!(target: "provider", summaries = summaries.len(), "fetched course summaries");
        Ok(summaries)
    }
}

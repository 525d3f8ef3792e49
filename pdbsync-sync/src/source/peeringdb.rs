//! PeeringDB REST API client.

use super::RecordSource;
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use pdbsync_schema::EntityType;
use pdbsync_types::{Record, Timestamp};
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Connection settings for the PeeringDB API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the API host (e.g. `https://www.peeringdb.com`).
    pub base_url: String,
    /// API key sent as `Authorization: Api-Key <key>`.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Objects per request; 0 fetches each entity type in one request.
    pub page_size: usize,
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.peeringdb.com".to_string(),
            api_key: None,
            timeout: Duration::from_secs(60),
            page_size: 0,
            user_agent: format!("peeringdb-sync/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl SourceConfig {
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

/// Response envelope of every list endpoint.
#[derive(Debug, Deserialize)]
struct ListResponse {
    data: Vec<serde_json::Value>,
}

/// [`RecordSource`] backed by the PeeringDB API.
pub struct PeeringDbClient {
    config: SourceConfig,
    client: Client,
}

impl PeeringDbClient {
    /// Creates a new client.
    pub fn new(config: SourceConfig) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| SyncError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    fn endpoint(&self, entity: &EntityType) -> String {
        format!(
            "{}/api/{}",
            self.config.base_url.trim_end_matches('/'),
            entity.api_tag
        )
    }

    async fn fetch_page(
        &self,
        url: &str,
        since: Timestamp,
        skip: usize,
    ) -> SyncResult<Vec<Record>> {
        let mut query = vec![
            ("since", since.as_unix().to_string()),
            ("depth", "0".to_string()),
        ];
        if self.config.page_size > 0 {
            query.push(("limit", self.config.page_size.to_string()));
            query.push(("skip", skip.to_string()));
        }

        let mut request = self.client.get(url).query(&query);
        if let Some(key) = &self.config.api_key {
            request = request.header(AUTHORIZATION, format!("Api-Key {key}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Http { status, body });
        }

        let list: ListResponse = response
            .json()
            .await
            .map_err(|e| SyncError::Decode(format!("failed to parse {url} response: {e}")))?;

        list.data
            .into_iter()
            .map(|object| Record::from_json(object).map_err(SyncError::from))
            .collect()
    }
}

#[async_trait]
impl RecordSource for PeeringDbClient {
    async fn fetch(&self, entity: &EntityType, since: Timestamp) -> SyncResult<Vec<Record>> {
        let url = self.endpoint(entity);
        let mut records = Vec::new();
        loop {
            let page = self.fetch_page(&url, since, records.len()).await?;
            let received = page.len();
            records.extend(page);
            if self.config.page_size == 0 || received < self.config.page_size {
                break;
            }
        }
        debug!(entity = %entity.name, %since, count = records.len(), "fetched records");
        Ok(records)
    }
}

//! Snapshot source backed by the orchestration service's HTTP API.

use std::time::Duration;

use allocheck_model::{AllocationDetail, AllocationSummary, Namespace, NodeDetail, NodeSummary};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{SnapshotSource, SourceError, SourceResult, StatusError};

/// Default service address.
pub const DEFAULT_ADDRESS: &str = "http://127.0.0.1:4646";

/// Default per-request deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// ACL token header understood by the service.
const TOKEN_HEADER: &str = "X-Nomad-Token";

/// Connection settings for the live source.
#[derive(Debug, Clone)]
pub struct LiveSourceConfig {
    /// Base URL of the service (example: http://127.0.0.1:4646).
    pub address: String,

    /// ACL token, if the cluster requires one.
    pub token: Option<String>,

    /// Region to query; the agent's own region when unset.
    pub region: Option<String>,

    /// Deadline for each request.
    pub timeout: Duration,
}

impl Default for LiveSourceConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            token: None,
            region: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Live snapshot source. Every call is one request; nothing is cached.
#[derive(Debug, Clone)]
pub struct LiveSource {
    client: reqwest::Client,
    base_url: Url,
    region: Option<String>,
}

impl LiveSource {
    /// Build a client for the configured service.
    pub fn new(config: &LiveSourceConfig) -> SourceResult<Self> {
        let base_url = Url::parse(&config.address)
            .map_err(|e| SourceError::unavailable("service", config.address.clone(), e))?;
        if base_url.cannot_be_a_base() {
            return Err(SourceError::unavailable(
                "service",
                config.address.clone(),
                "address cannot carry a path",
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = config.token.as_deref() {
            let value = HeaderValue::from_str(token)
                .map_err(|e| SourceError::unavailable("service", config.address.clone(), e))?;
            headers.insert(TOKEN_HEADER, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| SourceError::unavailable("service", config.address.clone(), e))?;

        Ok(Self {
            client,
            base_url,
            region: config.region.clone(),
        })
    }

    /// Build a URL for an endpoint. Each segment is percent-encoded, so an
    /// id can never add path components or a query.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`: the base always accepts path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, url: Url, all_namespaces: bool) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url);
        if all_namespaces {
            request = request.query(&[("namespace", "*")]);
        }
        if let Some(region) = self.region.as_deref() {
            request = request.query(&[("region", region)]);
        }
        request
    }

    /// Run a list call. Any failure here is fatal to the run.
    async fn list<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        segments: &[&str],
        all_namespaces: bool,
    ) -> SourceResult<Vec<T>> {
        let url = self.url(segments);
        debug!(resource, url = %url, "Listing");
        let response = self
            .request(url.clone(), all_namespaces)
            .send()
            .await
            .map_err(|e| SourceError::unavailable(resource, url.to_string(), e))?;

        if !response.status().is_success() {
            let err = status_error(response).await;
            return Err(SourceError::ListFailure {
                resource,
                source: Box::new(err),
            });
        }

        // The service answers `null` for an empty listing.
        let items: Option<Vec<T>> = response
            .json()
            .await
            .map_err(|e| SourceError::ListFailure {
                resource,
                source: Box::new(e),
            })?;
        Ok(items.unwrap_or_default())
    }

    /// Fetch a single record by id.
    async fn fetch<T: DeserializeOwned>(
        &self,
        kind: &'static str,
        id: &str,
        segments: &[&str],
        all_namespaces: bool,
    ) -> SourceResult<T> {
        let fetch_failed = |source: Box<dyn std::error::Error + Send + Sync>| {
            SourceError::FetchFailed {
                kind,
                id: id.to_string(),
                source,
            }
        };

        debug!(kind, id, "Fetching");
        let response = self
            .request(self.url(segments), all_namespaces)
            .send()
            .await
            .map_err(|e| fetch_failed(Box::new(e)))?;

        match response.status() {
            status if status.is_success() => response
                .json()
                .await
                .map_err(|e| fetch_failed(Box::new(e))),
            StatusCode::NOT_FOUND => Err(SourceError::not_found(kind, id)),
            _ => Err(fetch_failed(Box::new(status_error(response).await))),
        }
    }
}

async fn status_error(response: reqwest::Response) -> StatusError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    StatusError {
        status,
        body: body.trim().to_string(),
    }
}

#[async_trait]
impl SnapshotSource for LiveSource {
    fn kind(&self) -> &'static str {
        "live"
    }

    async fn list_allocations(&self) -> SourceResult<Vec<AllocationSummary>> {
        self.list("allocations", &["v1", "allocations"], true).await
    }

    async fn list_nodes(&self) -> SourceResult<Vec<NodeSummary>> {
        self.list("nodes", &["v1", "nodes"], false).await
    }

    async fn list_namespaces(&self) -> SourceResult<Option<Vec<Namespace>>> {
        self.list("namespaces", &["v1", "namespaces"], false)
            .await
            .map(Some)
    }

    async fn get_allocation(&self, id: &str) -> SourceResult<AllocationDetail> {
        self.fetch("alloc", id, &["v1", "allocation", id], true)
            .await
    }

    async fn get_node(&self, id: &str) -> SourceResult<NodeDetail> {
        self.fetch("node", id, &["v1", "node", id], false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building_trims_trailing_slash() {
        let source = LiveSource::new(&LiveSourceConfig {
            address: "http://nomad.example:4646/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            source.url(&["v1", "nodes"]).as_str(),
            "http://nomad.example:4646/v1/nodes"
        );
    }

    #[test]
    fn test_url_keeps_base_path_prefix() {
        let source = LiveSource::new(&LiveSourceConfig {
            address: "https://gateway.example/nomad".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            source.url(&["v1", "node", "n1"]).as_str(),
            "https://gateway.example/nomad/v1/node/n1"
        );
    }

    #[test]
    fn test_url_encodes_ids() {
        let source = LiveSource::new(&LiveSourceConfig::default()).unwrap();
        assert_eq!(
            source.url(&["v1", "allocation", "../node/x?namespace=prod"]).as_str(),
            "http://127.0.0.1:4646/v1/allocation/..%2Fnode%2Fx%3Fnamespace=prod"
        );
    }

    #[test]
    fn test_unparsable_address_rejected() {
        let err = LiveSource::new(&LiveSourceConfig {
            address: "not a url".to_string(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, SourceError::Unavailable { resource: "service", .. }));
    }

    #[test]
    fn test_invalid_token_rejected() {
        let err = LiveSource::new(&LiveSourceConfig {
            token: Some("bad\ntoken".to_string()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, SourceError::Unavailable { .. }));
    }
}

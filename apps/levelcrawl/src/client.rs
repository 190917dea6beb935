//! # HTTP Neighbor Source
//!
//! `GET <service-base>/<escaped vertex>` against the neighbor service.
//!
//! The service answers with a JSON object holding a `neighbors` array of
//! names. A missing (or null) `neighbors` field means no neighbors; anything
//! that is not a JSON object, or a `neighbors` value that is not a list of
//! strings, is a decode failure.
//!
//! One `HttpNeighborSource` is shared by every expansion task of a crawl.
//! The underlying `reqwest::Client` pools connections internally and is safe
//! for concurrent use.

use crate::config::Settings;
use crate::limiter::{self, OutboundLimiter};
use levelcrawl_core::{CrawlError, FetchError, NeighborSource, Vertex};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Field of the response object that holds the neighbor names.
pub const NEIGHBORS_FIELD: &str = "neighbors";

/// Maximum number of redirects followed per request.
const MAX_REDIRECTS: usize = 10;

/// HTTP client for the neighbor-lookup service.
#[derive(Clone)]
pub struct HttpNeighborSource {
    http: reqwest::Client,
    base_url: Url,
    retries: u32,
    retry_backoff: Duration,
    limiter: Option<OutboundLimiter>,
}

impl HttpNeighborSource {
    /// Build a source from resolved settings.
    pub fn new(settings: &Settings) -> Result<Self, CrawlError> {
        let base_url = settings.service_url()?;

        let mut builder = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS));
        if settings.timeout_ms > 0 {
            builder = builder.timeout(Duration::from_millis(settings.timeout_ms));
        }
        let http = builder
            .build()
            .map_err(|e| CrawlError::Config(format!("Cannot build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            retries: settings.retries,
            retry_backoff: Duration::from_millis(settings.retry_backoff_ms),
            limiter: limiter::create_rate_limiter(settings.rate_limit),
        })
    }

    /// The configured service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the neighbor lookup for `vertex`.
    ///
    /// The name is percent-encoded as a single path segment, so spaces,
    /// slashes and `?` in names never change the request's shape.
    pub fn neighbor_url(&self, vertex: &Vertex) -> Url {
        let mut url = self.base_url.clone();
        // `service_url()` rejected cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(vertex.as_str());
        }
        url
    }

    /// Issue one request, no retry.
    async fn fetch_once(&self, vertex: &Vertex) -> Result<Vec<Vertex>, FetchError> {
        limiter::admit(self.limiter.as_ref()).await;

        let url = self.neighbor_url(vertex);
        tracing::debug!(%url, "Sending request");

        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transport(format!("{}: {}", url, e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Transport(format!("{}: HTTP {}", url, status)));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::Transport(format!("{}: reading body: {}", url, e)))?;
        tracing::trace!(%url, body = %body, "Response received");

        decode_neighbors(&body)
    }
}

impl NeighborSource for HttpNeighborSource {
    async fn fetch_neighbors(&self, vertex: &Vertex) -> Result<Vec<Vertex>, FetchError> {
        let mut attempt: u32 = 0;
        loop {
            match self.fetch_once(vertex).await {
                Err(FetchError::Transport(reason)) if attempt < self.retries => {
                    attempt += 1;
                    tracing::warn!(
                        vertex = %vertex,
                        attempt,
                        "Transport failure, retrying: {}",
                        reason
                    );
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                result => return result,
            }
        }
    }
}

// =============================================================================
// RESPONSE DECODING
// =============================================================================

/// Decode a neighbor-service response body.
pub fn decode_neighbors(body: &str) -> Result<Vec<Vertex>, FetchError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::Decode(format!("body is not JSON: {}", e)))?;

    let Value::Object(mut object) = value else {
        return Err(FetchError::Decode(
            "expected a JSON object at top level".to_string(),
        ));
    };

    match object.remove(NEIGHBORS_FIELD) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(neighbors) => serde_json::from_value(neighbors).map_err(|e| {
            FetchError::Decode(format!("'{}' is not a list of names: {}", NEIGHBORS_FIELD, e))
        }),
    }
}

// =============================================================================
// TESTS
// =============================================================================

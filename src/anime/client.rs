use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, warn};

use crate::anime::model::{AnimeDetails, DetailsEnvelope, FeedEnvelope, FeedResults, SearchEnvelope};
use crate::global::error::ClientError;

/// Port over the upstream metadata operations. Route handlers hold this as
/// a trait object so tests can substitute a stub upstream.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch the home feed sections.
    async fn fetch_feed(&self) -> Result<FeedResults, ClientError>;

    /// Search by keyword. An empty keyword short-circuits to an empty
    /// success without a network call.
    async fn search(&self, keyword: &str, page: Option<u32>) -> Result<SearchEnvelope, ClientError>;

    /// Fetch details for one anime id, unwrapped from its envelope.
    async fn fetch_details(&self, id: &str) -> Result<AnimeDetails, ClientError>;

    /// Degrade-to-empty search policy: any failure becomes an empty
    /// envelope with `success: false`. Callers that must never surface a
    /// search error (the search-as-you-type flow) use this instead of
    /// `search`.
    async fn search_lenient(&self, keyword: &str, page: Option<u32>) -> SearchEnvelope {
        match self.search(keyword, page).await {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, keyword = %keyword, "search degraded to empty result set");
                SearchEnvelope::empty(false)
            }
        }
    }
}

/// Client for the upstream anime metadata API.
#[derive(Debug, Clone)]
pub struct AnimeClient {
    client: Client,
    base_url: String,
}

impl AnimeClient {
    pub fn new(client: Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_checked(&self, url: &str) -> Result<reqwest::Response, ClientError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            error!(url = %url, error = %e, "upstream request failed");
            ClientError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(url = %url, status = status.as_u16(), "upstream returned an error status");
            return Err(ClientError::RequestFailed {
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl MetadataProvider for AnimeClient {
    async fn fetch_feed(&self) -> Result<FeedResults, ClientError> {
        let url = format!("{}/api", self.base_url);
        debug!(url = %url, "fetching home feed");

        let response = self.get_checked(&url).await?;
        let envelope = response.json::<FeedEnvelope>().await.map_err(|e| {
            error!(error = %e, "failed to decode home feed response");
            ClientError::Deserialization(e.to_string())
        })?;

        // An absent results object is an empty feed, not an error
        Ok(envelope.results.unwrap_or_default())
    }

    async fn search(&self, keyword: &str, page: Option<u32>) -> Result<SearchEnvelope, ClientError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(SearchEnvelope::empty(true));
        }

        let mut url = format!(
            "{}/api/search?keyword={}",
            self.base_url,
            urlencoding::encode(keyword)
        );
        if let Some(page) = page {
            url.push_str(&format!("&page={}", page));
        }
        debug!(url = %url, "searching anime");

        let response = self.get_checked(&url).await?;
        let body = response.json::<serde_json::Value>().await.map_err(|e| {
            error!(error = %e, "failed to decode search response");
            ClientError::Deserialization(e.to_string())
        })?;

        // A response without a results.data array is substituted, not
        // treated as a shape error.
        let has_data = body
            .get("results")
            .and_then(|results| results.get("data"))
            .is_some_and(|data| data.is_array());
        if !has_data {
            warn!(keyword = %keyword, "search response missing results.data, substituting empty result set");
            return Ok(SearchEnvelope::empty(true));
        }

        serde_json::from_value::<SearchEnvelope>(body).map_err(|e| {
            error!(error = %e, "failed to decode search response");
            ClientError::Deserialization(e.to_string())
        })
    }

    async fn fetch_details(&self, id: &str) -> Result<AnimeDetails, ClientError> {
        if id.is_empty() {
            error!("anime details requested without an id");
            return Err(ClientError::MissingParameter("id"));
        }

        let url = format!("{}/api/info?id={}", self.base_url, urlencoding::encode(id));
        debug!(url = %url, "fetching anime details");

        let response = self.get_checked(&url).await?;
        let envelope = response.json::<DetailsEnvelope>().await.map_err(|e| {
            error!(error = %e, "failed to decode details response");
            ClientError::Deserialization(e.to_string())
        })?;

        if !envelope.success {
            error!(id = %id, "details response not marked successful");
            return Err(ClientError::InvalidShape(
                "details response not marked successful",
            ));
        }

        envelope.results.and_then(|results| results.data).ok_or_else(|| {
            error!(id = %id, "details response missing results.data");
            ClientError::InvalidShape("details response missing results.data")
        })
    }
}

/// Monotonic token source for overlapping in-flight requests. Interactive
/// callers tag each call with `issue()` and drop any response whose token
/// is no longer `is_current`, so a slow earlier search can never overwrite
/// a later one.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next token, invalidating all previously issued ones.
    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether the token belongs to the most recently issued request.
    pub fn is_current(&self, token: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    /// Nothing listens on the discard port, so any network call errors.
    const UNREACHABLE: &str = "http://127.0.0.1:9";

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn client_for(router: Router) -> AnimeClient {
        AnimeClient::new(Client::new(), serve(router).await)
    }

    fn json_route(path: &str, value: Value) -> Router {
        Router::new().route(path, get(move || async move { Json(value) }))
    }

    #[tokio::test]
    async fn empty_keyword_short_circuits_without_network_call() {
        let client = AnimeClient::new(Client::new(), UNREACHABLE.to_string());

        for keyword in ["", "   "] {
            let envelope = client.search(keyword, None).await.unwrap();
            assert!(envelope.success);
            assert!(envelope.results.data.is_empty());
            assert_eq!(envelope.results.total_page, 1);
        }
    }

    #[tokio::test]
    async fn search_passes_well_formed_results_through() {
        let client = client_for(json_route(
            "/api/search",
            json!({ "results": { "data": [{ "id": "1", "title": "X" }], "totalPage": 3 } }),
        ))
        .await;

        let envelope = client.search("x", None).await.unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.results.data.len(), 1);
        assert_eq!(envelope.results.data[0].id, "1");
        assert_eq!(envelope.results.data[0].title, "X");
        assert_eq!(envelope.results.total_page, 3);
    }

    #[tokio::test]
    async fn search_substitutes_empty_set_when_data_is_missing() {
        let client = client_for(json_route("/api/search", json!({ "results": {} }))).await;

        let envelope = client.search("x", None).await.unwrap();
        assert!(envelope.success);
        assert!(envelope.results.data.is_empty());
        assert_eq!(envelope.results.total_page, 1);
    }

    #[tokio::test]
    async fn search_substitutes_empty_set_when_data_is_not_an_array() {
        let client = client_for(json_route(
            "/api/search",
            json!({ "results": { "data": "nope", "totalPage": 7 } }),
        ))
        .await;

        let envelope = client.search("x", None).await.unwrap();
        assert!(envelope.success);
        assert!(envelope.results.data.is_empty());
        assert_eq!(envelope.results.total_page, 1);
    }

    #[tokio::test]
    async fn search_reports_upstream_error_status() {
        let router = Router::new().route(
            "/api/search",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
        let client = client_for(router).await;

        let err = client.search("x", None).await.unwrap_err();
        assert!(matches!(err, ClientError::RequestFailed { status: 503 }));
    }

    #[tokio::test]
    async fn search_lenient_never_fails() {
        let client = AnimeClient::new(Client::new(), UNREACHABLE.to_string());

        let envelope = client.search_lenient("x", None).await;
        assert!(!envelope.success);
        assert!(envelope.results.data.is_empty());
    }

    #[tokio::test]
    async fn search_encodes_keyword_and_forwards_page() {
        let router = Router::new().route(
            "/api/search",
            get(
                |axum::extract::RawQuery(query): axum::extract::RawQuery| async move {
                    assert_eq!(query.as_deref(), Some("keyword=fullmetal%20alchemist&page=2"));
                    Json(json!({ "results": { "data": [], "totalPage": 1 } }))
                },
            ),
        );
        let client = client_for(router).await;

        let envelope = client.search("fullmetal alchemist", Some(2)).await.unwrap();
        assert!(envelope.success);
    }

    #[tokio::test]
    async fn details_require_an_id_before_any_network_call() {
        let client = AnimeClient::new(Client::new(), UNREACHABLE.to_string());

        let err = client.fetch_details("").await.unwrap_err();
        assert!(matches!(err, ClientError::MissingParameter("id")));
    }

    #[tokio::test]
    async fn details_reject_unsuccessful_envelope_on_http_200() {
        let client = client_for(json_route(
            "/api/info",
            json!({ "success": false, "results": { "data": { "id": "42" } } }),
        ))
        .await;

        let err = client.fetch_details("42").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidShape(_)));
    }

    #[tokio::test]
    async fn details_reject_missing_data_on_http_200() {
        let client = client_for(json_route(
            "/api/info",
            json!({ "success": true, "results": {} }),
        ))
        .await;

        let err = client.fetch_details("42").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidShape(_)));
    }

    #[tokio::test]
    async fn details_unwrap_the_envelope() {
        let client = client_for(json_route(
            "/api/info",
            json!({ "success": true, "results": { "data": { "id": "42", "title": "Y" } } }),
        ))
        .await;

        let details = client.fetch_details("42").await.unwrap();
        assert_eq!(details.id, "42");
        assert_eq!(details.title, "Y");
    }

    #[tokio::test]
    async fn feed_reports_upstream_error_status() {
        let router = Router::new().route(
            "/api",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let client = client_for(router).await;

        let err = client.fetch_feed().await.unwrap_err();
        assert!(matches!(err, ClientError::RequestFailed { status: 500 }));
    }

    #[tokio::test]
    async fn feed_returns_results_with_absent_sections_empty() {
        let client = client_for(json_route(
            "/api",
            json!({
                "results": {
                    "trending": [{ "id": "one-piece-100", "title": "One Piece" }],
                    "genres": ["Action"]
                }
            }),
        ))
        .await;

        let feed = client.fetch_feed().await.unwrap();
        assert_eq!(feed.trending.len(), 1);
        assert_eq!(feed.genres, vec!["Action".to_string()]);
        assert!(feed.spotlights.is_empty());
        assert!(feed.today.schedule.is_empty());
    }

    #[test]
    fn request_sequence_invalidates_stale_tokens() {
        let seq = RequestSequence::new();

        let first = seq.issue();
        assert!(seq.is_current(first));

        let second = seq.issue();
        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));
    }
}

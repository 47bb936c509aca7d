use crate::catalog::{Catalog, DetailResponse, Item, ListResponse, SummaryPage};
use crate::util::{validate_base_url, UrlValidationError};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Public PokeAPI v2 root.
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2/";

/// Default per-request budget (connect + headers + body).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Detail payloads are ~200 KB; anything past this is not a catalog response.
const MAX_RESPONSE_SIZE: usize = 2 * 1024 * 1024;

/// Failures of a single catalog request.
///
/// [`ApiError::NotFound`] is the only "well-formed" failure; everything else
/// means the request could not be completed.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("'{0}' not found")]
    NotFound(String),
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error(transparent)]
    InvalidBaseUrl(#[from] UrlValidationError),
}

impl ApiError {
    /// True when the service answered that the requested entry does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

/// Redirect policy: at most 3 hops, no loops.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev == url) {
            return attempt.error("Redirect loop detected");
        }

        tracing::debug!(
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );
        attempt.follow()
    })
}

/// HTTP binding of the two catalog endpoints.
///
/// Cheap to clone: the inner `reqwest::Client` shares its connection pool.
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl PokeApiClient {
    /// Build a client for `base_url` with a pooled, keepalive connection setup.
    ///
    /// # Errors
    ///
    /// - [`ApiError::InvalidBaseUrl`] if the URL is unparsable or plain HTTP
    ///   to a non-loopback host
    /// - [`ApiError::Network`] if the TLS backend fails to initialise
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = validate_base_url(base_url)?;

        let http = reqwest::Client::builder()
            .redirect(create_redirect_policy())
            .pool_max_idle_per_host(8) // one page fans out to ~20 detail requests on the same host
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        tracing::debug!(base_url = %base_url, timeout_secs = timeout.as_secs(), "Catalog client ready");

        Ok(Self {
            http,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/seg1/seg2...`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // validate_base_url rejects cannot-be-a-base URLs, so segments are always available
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET `url` and decode the JSON body, bounded by the request timeout.
    ///
    /// A 404 maps to [`ApiError::NotFound`] carrying `not_found_key` when given,
    /// otherwise to [`ApiError::HttpStatus`].
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        not_found_key: Option<&str>,
    ) -> Result<T, ApiError> {
        let body = tokio::time::timeout(self.timeout, self.get_body(url, not_found_key))
            .await
            .map_err(|_| ApiError::Timeout(self.timeout.as_secs()))??;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get_body(&self, url: Url, not_found_key: Option<&str>) -> Result<Vec<u8>, ApiError> {
        tracing::trace!(url = %url, "GET");
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            if let Some(key) = not_found_key {
                return Err(ApiError::NotFound(key.to_string()));
            }
        }
        if !status.is_success() {
            return Err(ApiError::HttpStatus(status.as_u16()));
        }

        read_limited_body(response, MAX_RESPONSE_SIZE).await
    }
}

/// Collect the body, failing fast once it grows past `limit`.
async fn read_limited_body(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, ApiError> {
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

#[async_trait]
impl Catalog for PokeApiClient {
    async fn fetch_page(&self, limit: usize, offset: usize) -> Result<SummaryPage, ApiError> {
        let mut url = self.endpoint(&["pokemon"]);
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());

        let response: ListResponse = self.get_json(url, None).await?;
        let page = SummaryPage::from(response);
        tracing::debug!(
            limit,
            offset,
            received = page.results.len(),
            has_more = page.has_more,
            "Fetched summary page"
        );
        Ok(page)
    }

    async fn fetch_detail(&self, name_or_id: &str) -> Result<Item, ApiError> {
        // Resource slugs upstream are lower-case; "Pikachu" and "pikachu" are the same entry.
        let key = name_or_id.trim().to_lowercase();
        if key.is_empty() {
            return Err(ApiError::NotFound(name_or_id.to_string()));
        }

        let url = self.endpoint(&["pokemon", &key]);
        let response: DetailResponse = self.get_json(url, Some(name_or_id)).await?;
        Ok(Item::from(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> PokeApiClient {
        PokeApiClient::new(&server.uri(), DEFAULT_REQUEST_TIMEOUT).unwrap()
    }

    fn detail_json(id: u32, name: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "name": name,
            "height": 7,
            "weight": 69,
            "sprites": {
                "front_default": format!("https://img.example/{id}.png"),
                "other": { "official-artwork": { "front_default": null } }
            },
            "types": [
                { "slot": 1, "type": { "name": "grass", "url": "https://x/type/12/" } },
                { "slot": 2, "type": { "name": "poison", "url": "https://x/type/4/" } }
            ],
            "stats": [ { "base_stat": 45, "effort": 0, "stat": { "name": "hp", "url": "https://x/stat/1/" } } ]
        })
    }

    #[tokio::test]
    async fn test_fetch_page_sends_limit_and_offset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pokemon"))
            .and(query_param("limit", "20"))
            .and(query_param("offset", "40"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "count": 1302,
                "next": "https://pokeapi.co/api/v2/pokemon?offset=60&limit=20",
                "previous": "https://pokeapi.co/api/v2/pokemon?offset=20&limit=20",
                "results": [
                    { "name": "nidoking", "url": "https://pokeapi.co/api/v2/pokemon/34/" },
                    { "name": "clefairy", "url": "https://pokeapi.co/api/v2/pokemon/35/" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = client_for(&server).fetch_page(20, 40).await.unwrap();
        assert!(page.has_more);
        let names: Vec<_> = page.results.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["nidoking", "clefairy"]);
    }

    #[tokio::test]
    async fn test_fetch_page_last_page_has_no_continuation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pokemon"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "count": 2, "next": null, "previous": null, "results": []
            })))
            .mount(&server)
            .await;

        let page = client_for(&server).fetch_page(20, 2000).await.unwrap();
        assert!(!page.has_more);
        assert!(page.results.is_empty());
    }

    #[tokio::test]
    async fn test_base_url_path_is_preserved() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/pokemon/bulbasaur"))
            .respond_with(ResponseTemplate::new(200).set_body_json(detail_json(1, "bulbasaur")))
            .mount(&server)
            .await;

        let client =
            PokeApiClient::new(&format!("{}/api/v2/", server.uri()), DEFAULT_REQUEST_TIMEOUT)
                .unwrap();
        let item = client.fetch_detail("bulbasaur").await.unwrap();
        assert_eq!(item.id, 1);
    }

    #[tokio::test]
    async fn test_fetch_detail_normalizes_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pokemon/bulbasaur"))
            .respond_with(ResponseTemplate::new(200).set_body_json(detail_json(1, "bulbasaur")))
            .expect(1)
            .mount(&server)
            .await;

        let item = client_for(&server).fetch_detail("  Bulbasaur ").await.unwrap();
        assert_eq!(item.name, "bulbasaur");
        assert_eq!(item.type_names(), vec!["Grass", "Poison"]);
        assert_eq!(item.image_url(), Some("https://img.example/1.png"));
    }

    #[tokio::test]
    async fn test_fetch_detail_404_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_detail("qqq").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "'qqq' not found");
    }

    #[tokio::test]
    async fn test_fetch_page_404_is_service_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_page(20, 0).await.unwrap_err();
        assert!(matches!(err, ApiError::HttpStatus(404)));
    }

    #[tokio::test]
    async fn test_http_500() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_detail("pikachu").await.unwrap_err();
        assert!(matches!(err, ApiError::HttpStatus(500)));
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_detail("pikachu").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(MAX_RESPONSE_SIZE + 1)))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_detail("pikachu").await.unwrap_err();
        assert!(matches!(err, ApiError::ResponseTooLarge(_)));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(detail_json(25, "pikachu"))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = PokeApiClient::new(&server.uri(), Duration::from_millis(200)).unwrap();
        let err = client.fetch_detail("pikachu").await.unwrap_err();
        assert!(matches!(err, ApiError::Timeout(_)));
    }

    #[test]
    fn test_insecure_base_url_rejected() {
        let err = PokeApiClient::new("http://pokeapi.co/api/v2/", DEFAULT_REQUEST_TIMEOUT)
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::InvalidBaseUrl(UrlValidationError::InsecureBaseUrl)
        ));
    }

    #[test]
    fn test_unparsable_base_url_rejected() {
        let err = PokeApiClient::new("not a url", DEFAULT_REQUEST_TIMEOUT).unwrap_err();
        assert!(matches!(
            err,
            ApiError::InvalidBaseUrl(UrlValidationError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = PokeApiClient::new(DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT).unwrap();
        assert_eq!(
            client.endpoint(&["pokemon", "mr mime"]).as_str(),
            "https://pokeapi.co/api/v2/pokemon/mr%20mime"
        );
        assert_eq!(
            client.endpoint(&["pokemon", "../type"]).path(),
            "/api/v2/pokemon/..%2Ftype"
        );
    }
}

//! HTTP client for the OMDb movie-metadata service
//!
//! This module wraps the two endpoints the app needs, title search and
//! detail lookup, and turns both transport failures and the service's own
//! `"Response": "False"` payloads into [`MovieError`] values.
//! There are no retries; callers surface failures to the user immediately.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{MovieError, Result};
use crate::types::{MovieDetail, MovieSummary, PaginatedResult};

/// Base URL of the OMDb API
const OMDB_BASE_URL: &str = "https://www.omdbapi.com/";

/// Public demo key, heavily rate limited by the service
const DEMO_API_KEY: &str = "trilogy";

/// Result-type filter sent with every search
const RESULT_TYPE: &str = "movie";

const SEARCH_FAILED_MESSAGE: &str = "Failed to fetch movies";
const DETAILS_FAILED_MESSAGE: &str = "Failed to fetch movie details";

const ENV_BASE_URL: &str = "MOVIEVERSE_BASE_URL";
const ENV_API_KEY: &str = "MOVIEVERSE_API_KEY";
const ENV_TIMEOUT_SECS: &str = "MOVIEVERSE_TIMEOUT_SECS";

/// Configuration for the metadata HTTP client
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Service endpoint (default: OMDb)
    pub base_url: String,
    /// API key; `None` falls back to the demo key
    pub api_key: Option<String>,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: OMDB_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Build a configuration from `MOVIEVERSE_*` environment variables,
    /// keeping defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let timeout_secs = match non_empty(ENV_TIMEOUT_SECS) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "ignoring invalid {}", ENV_TIMEOUT_SECS);
                defaults.timeout_secs
            }),
            None => defaults.timeout_secs,
        };

        Self {
            base_url: non_empty(ENV_BASE_URL).unwrap_or(defaults.base_url),
            api_key: non_empty(ENV_API_KEY),
            timeout_secs,
        }
    }
}

/// Raw search payload
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "Search", default)]
    search: Vec<MovieSummary>,
    #[serde(rename = "totalResults", default)]
    total_results: Option<String>,
}

/// HTTP client for the metadata service
pub struct OmdbClient {
    /// Underlying HTTP client
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    /// Create a new client with default configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let api_key = match config.api_key {
            Some(key) => key,
            None => {
                tracing::warn!(
                    "no API key configured, using the rate-limited demo key; set {}",
                    ENV_API_KEY
                );
                DEMO_API_KEY.to_string()
            }
        };

        Ok(Self {
            client,
            base_url: config.base_url,
            api_key,
        })
    }

    /// Search movies by title.
    ///
    /// # Arguments
    /// * `query` - Title to search for
    /// * `page` - Page number (1-based)
    ///
    /// # Errors
    /// - `MovieError::ValidationError` - empty query or page 0
    /// - `MovieError::TransportError` - non-success HTTP status
    /// - `MovieError::ApiError` - the service reported a failure
    pub async fn search(&self, query: &str, page: u32) -> Result<PaginatedResult<MovieSummary>> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(MovieError::ValidationError(
                "Search query cannot be empty".to_string(),
            ));
        }
        if page == 0 {
            return Err(MovieError::ValidationError(
                "Page number must be positive".to_string(),
            ));
        }

        tracing::debug!(query = trimmed, page, "searching movies");

        let url = format!(
            "{}?apikey={}&s={}&page={}&type={}",
            self.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(trimmed),
            page,
            RESULT_TYPE
        );

        let response: SearchResponse = self.fetch(&url, SEARCH_FAILED_MESSAGE).await?;
        let total_results = response
            .total_results
            .and_then(|total| total.trim().parse().ok())
            .unwrap_or(0);

        tracing::debug!(
            query = trimmed,
            page,
            count = response.search.len(),
            total_results,
            "search completed"
        );

        Ok(PaginatedResult::new(response.search, page, total_results))
    }

    /// Get the full record of one title, with the long plot.
    ///
    /// # Errors
    /// Same failure modes as [`OmdbClient::search`].
    pub async fn get_details(&self, imdb_id: &str) -> Result<MovieDetail> {
        let imdb_id = imdb_id.trim();
        if imdb_id.is_empty() {
            return Err(MovieError::ValidationError(
                "Movie identifier cannot be empty".to_string(),
            ));
        }

        tracing::debug!(imdb_id, "fetching movie details");

        let url = format!(
            "{}?apikey={}&i={}&plot=full",
            self.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(imdb_id)
        );

        self.fetch(&url, DETAILS_FAILED_MESSAGE).await
    }

    /// Probe the service with a test search.
    ///
    /// Returns true when the service answers with a success status and a
    /// payload carrying a `Response` flag, even if that flag is "False".
    pub async fn validate_api_key(&self) -> bool {
        let url = format!(
            "{}?apikey={}&s=test&page=1",
            self.base_url,
            urlencoding::encode(&self.api_key)
        );

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "API key validation failed");
                return false;
            }
        };
        if !response.status().is_success() {
            tracing::warn!(status = response.status().as_u16(), "API key rejected");
            return false;
        }

        match response.json::<Value>().await {
            Ok(body) => body.get("Response").is_some(),
            Err(e) => {
                tracing::error!(error = %e, "API key validation failed");
                false
            }
        }
    }

    /// GET `url`, check status and the service's failure flag, then decode.
    async fn fetch<T: DeserializeOwned>(&self, url: &str, default_message: &str) -> Result<T> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "metadata request failed");
            return Err(MovieError::TransportError(status.as_u16()));
        }

        let body: Value = response.json().await?;
        check_api_failure(&body, default_message)?;

        Ok(serde_json::from_value(body)?)
    }
}

/// Map a `"Response": "False"` payload to `MovieError::ApiError`.
fn check_api_failure(body: &Value, default_message: &str) -> Result<()> {
    let failed = body
        .get("Response")
        .and_then(Value::as_str)
        .is_some_and(|flag| flag.eq_ignore_ascii_case("false"));

    if !failed {
        return Ok(());
    }

    let message = body
        .get("Error")
        .and_then(Value::as_str)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or(default_message);

    tracing::warn!(error = message, "metadata service reported a failure");
    Err(MovieError::ApiError(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OmdbClient {
        OmdbClient::with_config(ClientConfig {
            base_url: server.uri(),
            api_key: Some("test-key".to_string()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn search_body(ids: &[&str], total: u32) -> Value {
        let movies: Vec<Value> = ids
            .iter()
            .map(|id| {
                json!({
                    "Title": format!("Batman {}", id),
                    "Year": "2005",
                    "imdbID": id,
                    "Type": "movie",
                    "Poster": "N/A"
                })
            })
            .collect();
        json!({"Search": movies, "totalResults": total.to_string(), "Response": "True"})
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://www.omdbapi.com/");
        assert_eq!(config.api_key, None);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_client_config_from_lookup() {
        let config = ClientConfig::from_lookup(|key| match key {
            "MOVIEVERSE_BASE_URL" => Some("http://localhost:9000/".to_string()),
            "MOVIEVERSE_API_KEY" => Some("abc123".to_string()),
            "MOVIEVERSE_TIMEOUT_SECS" => Some("12".to_string()),
            _ => None,
        });
        assert_eq!(config.base_url, "http://localhost:9000/");
        assert_eq!(config.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.timeout_secs, 12);
    }

    #[test]
    fn test_client_config_from_lookup_ignores_bad_values() {
        let config = ClientConfig::from_lookup(|key| match key {
            "MOVIEVERSE_API_KEY" => Some("   ".to_string()),
            "MOVIEVERSE_TIMEOUT_SECS" => Some("soon".to_string()),
            _ => None,
        });
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_client_creation() {
        assert!(OmdbClient::new().is_ok());
    }

    #[test]
    fn test_check_api_failure_uses_service_message() {
        let body = json!({"Response": "False", "Error": "Movie not found!"});
        match check_api_failure(&body, SEARCH_FAILED_MESSAGE) {
            Err(MovieError::ApiError(msg)) => assert_eq!(msg, "Movie not found!"),
            other => panic!("Expected ApiError, got {:?}", other),
        }
    }

    #[test]
    fn test_check_api_failure_default_message() {
        let body = json!({"Response": "False"});
        match check_api_failure(&body, SEARCH_FAILED_MESSAGE) {
            Err(MovieError::ApiError(msg)) => assert_eq!(msg, "Failed to fetch movies"),
            other => panic!("Expected ApiError, got {:?}", other),
        }
    }

    #[test]
    fn test_check_api_failure_success() {
        assert!(check_api_failure(&json!({"Response": "True"}), SEARCH_FAILED_MESSAGE).is_ok());
    }

    #[tokio::test]
    async fn test_search_parses_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("apikey", "test-key"))
            .and(query_param("s", "batman"))
            .and(query_param("page", "1"))
            .and(query_param("type", "movie"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body(&["tt1", "tt2"], 25)))
            .mount(&server)
            .await;

        let result = client_for(&server).search("batman", 1).await.unwrap();
        assert_eq!(result.items.len(), 2);
        assert_eq!(result.items[0].imdb_id, "tt1");
        assert_eq!(result.total_results, 25);
        assert_eq!(result.current_page, 1);
        assert!(result.has_next_page());
    }

    #[tokio::test]
    async fn test_search_encodes_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("s", "the dark knight"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body(&["tt0468569"], 1)))
            .mount(&server)
            .await;

        let result = client_for(&server).search("  the dark knight ", 1).await.unwrap();
        assert_eq!(result.items.len(), 1);
    }

    #[tokio::test]
    async fn test_search_unparsable_total_is_zero() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"Response": "True", "totalResults": "many"})),
            )
            .mount(&server)
            .await;

        let result = client_for(&server).search("batman", 1).await.unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.total_results, 0);
    }

    #[tokio::test]
    async fn test_search_http_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        match client_for(&server).search("batman", 1).await {
            Err(MovieError::TransportError(status)) => assert_eq!(status, 500),
            other => panic!("Expected TransportError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_search_api_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"Response": "False", "Error": "Too many results."})),
            )
            .mount(&server)
            .await;

        match client_for(&server).search("a", 1).await {
            Err(MovieError::ApiError(msg)) => assert_eq!(msg, "Too many results."),
            other => panic!("Expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_search_empty_query_never_hits_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = client_for(&server).search("   ", 1).await;
        assert!(matches!(result, Err(MovieError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_search_page_zero_rejected() {
        let server = MockServer::start().await;
        let result = client_for(&server).search("batman", 0).await;
        assert!(matches!(result, Err(MovieError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_get_details_requests_full_plot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("i", "tt0372784"))
            .and(query_param("plot", "full"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Title": "Batman Begins",
                "Year": "2005",
                "imdbID": "tt0372784",
                "Plot": "After training with his mentor, Batman begins his fight.",
                "Director": "Christopher Nolan",
                "imdbRating": "8.2",
                "Awards": "N/A",
                "Response": "True"
            })))
            .mount(&server)
            .await;

        let detail = client_for(&server).get_details("tt0372784").await.unwrap();
        assert_eq!(detail.director, "Christopher Nolan");
        assert_eq!(detail.imdb_rating, "8.2");
        assert_eq!(detail.awards, "N/A");
        assert_eq!(detail.genre, "N/A");
    }

    #[tokio::test]
    async fn test_get_details_api_failure_default_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Response": "False"})))
            .mount(&server)
            .await;

        match client_for(&server).get_details("tt404").await {
            Err(MovieError::ApiError(msg)) => assert_eq!(msg, "Failed to fetch movie details"),
            other => panic!("Expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_validate_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("s", "test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"Response": "False", "Error": "Movie not found!"})),
            )
            .mount(&server)
            .await;

        assert!(client_for(&server).validate_api_key().await);
    }

    #[tokio::test]
    async fn test_validate_api_key_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"Response": "False"})))
            .mount(&server)
            .await;

        assert!(!client_for(&server).validate_api_key().await);
    }
}

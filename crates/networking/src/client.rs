//! JSON HTTP client
//!
//! A thin wrapper around `reqwest` with a base URL, default headers, an
//! optional bearer token, and retry of transient failures.

use crate::retry::{retry, RetryConfig};
use reqwest::{Client as ReqwestClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Errors
// =============================================================================

/// HTTP error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// Connection or transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Non-success response
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error message extracted from the body
        message: String,
    },

    /// Response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Client could not be built from its configuration
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl HttpError {
    /// HTTP status, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the request may succeed if sent again
    pub fn is_transient(&self) -> bool {
        match self {
            HttpError::Network(_) | HttpError::Timeout => true,
            HttpError::Status { status, .. } => *status == 429 || *status >= 500,
            HttpError::Decode(_) | HttpError::InvalidConfig(_) => false,
        }
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HttpError::Timeout
        } else if err.is_decode() {
            HttpError::Decode(err.to_string())
        } else {
            HttpError::Network(err.to_string())
        }
    }
}

/// Result type for HTTP operations
pub type Result<T> = std::result::Result<T, HttpError>;

// =============================================================================
// Client Configuration
// =============================================================================

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL every path is appended to
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Bearer token sent in the `Authorization` header
    pub bearer_token: Option<String>,
    /// Custom headers to include in all requests
    pub default_headers: HashMap<String, String>,
    /// Retry policy for transient failures
    pub retry: RetryConfig,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: Duration::from_secs(30),
            user_agent: format!("Cinema-DB/{}", env!("CARGO_PKG_VERSION")),
            bearer_token: None,
            default_headers: HashMap::new(),
            retry: RetryConfig::default(),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config with a base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the bearer token
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Add a default header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set the retry policy
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

/// Error body shapes returned by the services this client talks to
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    /// `{"error": {"message": "..."}}`
    Nested { error: NestedError },
    /// `{"status_message": "..."}`
    StatusMessage { status_message: String },
    /// `{"message": "..."}`
    Message { message: String },
}

#[derive(Debug, Deserialize)]
struct NestedError {
    message: String,
}

impl ErrorBody {
    fn into_message(self) -> String {
        match self {
            ErrorBody::Nested { error } => error.message,
            ErrorBody::StatusMessage { status_message } => status_message,
            ErrorBody::Message { message } => message,
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// JSON HTTP client
///
/// # Examples
/// ```
/// use networking::client::{HttpClient, HttpClientConfig};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Configuration {
///     change_keys: Vec<String>,
/// }
///
/// async fn example() -> Result<(), Box<dyn std::error::Error>> {
///     let config = HttpClientConfig::new("https://api.themoviedb.org/3")
///         .with_bearer_token("token");
///     let client = HttpClient::new(config)?;
///
///     let configuration: Configuration = client.get_json("/configuration", &[]).await?;
///     println!("{} change keys", configuration.change_keys.len());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// - `HttpError::InvalidConfig` - The underlying client could not be built
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| HttpError::InvalidConfig(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Full URL for `path`
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// GET `path` and decode the JSON body, retrying transient failures
    pub async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.url(path);
        retry(&self.config.retry, || {
            let request = self.prepare(self.client.get(&url)).query(query);
            Self::execute(request)
        })
        .await
    }

    /// POST a JSON body to `path` and decode the JSON response
    ///
    /// Retries transient failures; callers must only use it for requests
    /// that are safe to repeat.
    pub async fn post_json<B, T>(&self, path: &str, query: &[(&str, String)], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        retry(&self.config.retry, || {
            let request = self
                .prepare(self.client.post(&url))
                .query(query)
                .json(body);
            Self::execute(request)
        })
        .await
    }

    fn prepare(&self, mut request: RequestBuilder) -> RequestBuilder {
        for (key, value) in &self.config.default_headers {
            request = request.header(key, value);
        }
        if let Some(token) = &self.config.bearer_token {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn execute<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let response = Self::check_status(response).await?;

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| HttpError::Decode(e.to_string()))
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(ErrorBody::into_message)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| status.as_str().to_string())
            });

        tracing::debug!("HTTP {} error: {}", status.as_u16(), message);
        Err(HttpError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

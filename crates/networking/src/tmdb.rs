//! TMDB movie catalog
//!
//! [`TmdbCatalog`] implements [`MovieCatalog`] against the TMDB v3 REST API,
//! authenticated with a v4 read access token.

use crate::client::{HttpClient, HttpClientConfig, HttpError};
use crate::retry::RetryConfig;
use app_core::movies::{CatalogError, MovieCatalog, MovieDetails, MoviePage, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Default TMDB API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Default response language
pub const DEFAULT_LANGUAGE: &str = "en-US";

impl From<HttpError> for CatalogError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Status { status, message } => CatalogError::Status { status, message },
            HttpError::Decode(message) => CatalogError::Decode(message),
            other => CatalogError::Network(other.to_string()),
        }
    }
}

/// TMDB client configuration
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    /// API base URL
    pub base_url: String,
    /// Read access token
    pub access_token: String,
    /// Response language
    pub language: String,
    /// Request timeout
    pub timeout: Duration,
    /// Retry policy
    pub retry: RetryConfig,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: String::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }
}

impl TmdbConfig {
    /// Create a configuration with an access token
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..Default::default()
        }
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the response language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

/// Movie catalog backed by TMDB
///
/// # Examples
/// ```
/// use app_core::movies::MovieCatalog;
/// use networking::tmdb::{TmdbCatalog, TmdbConfig};
///
/// async fn example() -> Result<(), Box<dyn std::error::Error>> {
///     let catalog = TmdbCatalog::new(TmdbConfig::new("read-access-token"))?;
///     let page = catalog.fetch_movies(1).await?;
///     println!("{} of {} pages", page.page, page.total_pages);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TmdbCatalog {
    http: HttpClient,
    language: String,
}

impl TmdbCatalog {
    /// Create a catalog client
    ///
    /// # Errors
    ///
    /// - `HttpError::InvalidConfig` - The HTTP client could not be built
    pub fn new(config: TmdbConfig) -> std::result::Result<Self, HttpError> {
        let http = HttpClient::new(
            HttpClientConfig::new(config.base_url)
                .with_bearer_token(config.access_token)
                .with_timeout(config.timeout)
                .with_retry(config.retry),
        )?;
        Ok(Self {
            http,
            language: config.language,
        })
    }
}

#[async_trait]
impl MovieCatalog for TmdbCatalog {
    async fn fetch_movies(&self, page: u32) -> Result<MoviePage> {
        tracing::debug!("Fetching popular movies page {}", page);
        let query = [("language", self.language.clone()), ("page", page.to_string())];
        Ok(self.http.get_json("/movie/popular", &query).await?)
    }

    async fn fetch_movie_details(&self, id: u64) -> Result<MovieDetails> {
        tracing::debug!("Fetching details of movie {}", id);
        let query = [
            ("language", self.language.clone()),
            ("append_to_response", "credits".to_string()),
        ];
        self.http
            .get_json(&format!("/movie/{}", id), &query)
            .await
            .map_err(|e| match e {
                HttpError::Status { status: 404, .. } => CatalogError::NotFound(id),
                other => other.into(),
            })
    }
}

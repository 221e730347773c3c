//! Movie catalog models and pagination
//!
//! The catalog itself is an external service reached through the
//! [`MovieCatalog`] trait; this module owns the response models and the
//! paginated feed state shown on the home screen.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Catalog error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("Catalog error ({status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error message from the service
        message: String,
    },

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Unknown movie id
    #[error("Movie not found: {0}")]
    NotFound(u64),
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

// =============================================================================
// Models
// =============================================================================

/// A movie in a catalog listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Catalog id
    pub id: u64,
    /// Display title
    pub title: String,
    /// Poster image path, relative to the image base URL
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl Movie {
    /// Create a movie entry
    pub fn new(id: u64, title: impl Into<String>, poster_path: Option<String>) -> Self {
        Self {
            id,
            title: title.into(),
            poster_path,
        }
    }

    /// Full poster URL under `image_base`
    pub fn poster_url(&self, image_base: &str) -> Option<String> {
        self.poster_path
            .as_ref()
            .map(|path| format!("{}{}", image_base.trim_end_matches('/'), path))
    }
}

/// One page of a catalog listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoviePage {
    /// 1-based page number
    #[serde(default = "first_page")]
    pub page: u32,
    /// Movies on this page
    pub results: Vec<Movie>,
    /// Total number of pages available
    pub total_pages: u32,
}

fn first_page() -> u32 {
    1
}

/// A cast member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    /// Actor name
    pub name: String,
    /// Character played
    #[serde(default)]
    pub character: Option<String>,
}

/// Credits attached to movie details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Credits {
    /// Cast in billing order
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

/// Detailed information about a movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    /// Catalog id
    pub id: u64,
    /// Display title
    pub title: String,
    /// Plot overview
    #[serde(default)]
    pub overview: String,
    /// Average rating out of 10
    #[serde(default)]
    pub vote_average: f64,
    /// Release date as `YYYY-MM-DD`
    #[serde(default)]
    pub release_date: String,
    /// Credits
    #[serde(default)]
    pub credits: Credits,
}

impl MovieDetails {
    /// Rating rendered as `x.y/10`
    pub fn rating_label(&self) -> String {
        format!("{:?}/10", self.vote_average)
    }

    /// Release year, if the date parses
    pub fn release_year(&self) -> Option<i32> {
        NaiveDate::parse_from_str(&self.release_date, "%Y-%m-%d")
            .ok()
            .map(|date| date.year())
    }

    /// Actor names joined with commas
    pub fn cast_line(&self) -> String {
        self.credits
            .cast
            .iter()
            .map(|member| member.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// =============================================================================
// Catalog Service
// =============================================================================

/// Movie catalog service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Fetch one page of popular movies (1-based)
    async fn fetch_movies(&self, page: u32) -> Result<MoviePage>;

    /// Fetch details, including credits, for one movie
    async fn fetch_movie_details(&self, id: u64) -> Result<MovieDetails>;
}

// =============================================================================
// Paginated Feed
// =============================================================================

/// Paginated list of movies
///
/// Pages are appended in order. A movie already in the feed is not added
/// again when a later page repeats it.
#[derive(Debug, Clone, Default)]
pub struct MovieFeed {
    movies: Vec<Movie>,
    seen: HashSet<u64>,
    page: u32,
    total_pages: u32,
    loading: bool,
}

impl MovieFeed {
    /// Create an empty feed
    pub fn new() -> Self {
        Self::default()
    }

    /// Movies loaded so far
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    /// Last page loaded (0 before the first load)
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Total pages reported by the catalog
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Whether a page request is in flight
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The next page to request, if any remain
    pub fn next_page(&self) -> Option<u32> {
        if self.page == 0 {
            Some(1)
        } else if self.page < self.total_pages {
            Some(self.page + 1)
        } else {
            None
        }
    }

    /// Whether the item at `index` appearing should trigger the next page
    pub fn should_load_more(&self, index: usize) -> bool {
        !self.loading
            && index.checked_add(1) == Some(self.movies.len())
            && self.next_page().is_some()
    }

    /// Append a fetched page, returning how many new movies were added
    pub fn apply_page(&mut self, page: MoviePage) -> usize {
        self.page = page.page.max(self.page);
        self.total_pages = page.total_pages;

        let before = self.movies.len();
        for movie in page.results {
            if self.seen.insert(movie.id) {
                self.movies.push(movie);
            }
        }
        self.movies.len() - before
    }

    /// Mark a request as in flight and return the page to fetch
    ///
    /// `None` when every page is loaded or a request is already in flight.
    /// Callers that hold the feed behind a `RefCell` use this pair instead
    /// of [`MovieFeed::load_next`] so no borrow is held across the fetch.
    pub fn begin_load(&mut self) -> Option<u32> {
        if self.loading {
            return None;
        }
        let page = self.next_page()?;
        self.loading = true;
        Some(page)
    }

    /// Complete the request started by [`MovieFeed::begin_load`]
    pub fn finish_load(&mut self, page: u32, result: Result<MoviePage>) -> Result<usize> {
        self.loading = false;
        match result {
            Ok(mut fetched) => {
                fetched.page = page;
                Ok(self.apply_page(fetched))
            }
            Err(e) => {
                tracing::warn!("Failed to fetch movies page {}: {}", page, e);
                Err(e)
            }
        }
    }

    /// Fetch and append the next page
    ///
    /// Returns `Ok(0)` without calling the catalog when every page is loaded
    /// or a request is already in flight.
    pub async fn load_next(&mut self, catalog: &dyn MovieCatalog) -> Result<usize> {
        let Some(page) = self.begin_load() else {
            return Ok(0);
        };
        let result = catalog.fetch_movies(page).await;
        self.finish_load(page, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(number: u32, ids: &[u64], total_pages: u32) -> MoviePage {
        MoviePage {
            page: number,
            results: ids
                .iter()
                .map(|id| Movie::new(*id, format!("Movie {}", id), None))
                .collect(),
            total_pages,
        }
    }

    #[test]
    fn test_movie_page_deserialize() {
        let json = r#"{
            "page": 1,
            "results": [
                {"id": 550, "title": "Fight Club", "poster_path": "/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg", "adult": false},
                {"id": 13, "title": "Forrest Gump", "poster_path": null}
            ],
            "total_pages": 42,
            "total_results": 840
        }"#;

        let page: MoviePage = serde_json::from_str(json).unwrap();
        assert_eq!(page.total_pages, 42);
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[1].poster_path, None);
    }

    #[test]
    fn test_movie_details_deserialize() {
        let json = r#"{
            "id": 550,
            "title": "Fight Club",
            "overview": "A ticking-time-bomb insomniac...",
            "vote_average": 8.4,
            "release_date": "1999-10-15",
            "credits": {"cast": [{"name": "Brad Pitt", "character": "Tyler Durden"}, {"name": "Edward Norton"}]}
        }"#;

        let details: MovieDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.rating_label(), "8.4/10");
        assert_eq!(details.release_year(), Some(1999));
        assert_eq!(details.cast_line(), "Brad Pitt, Edward Norton");
    }

    #[test]
    fn test_movie_details_missing_fields() {
        let details: MovieDetails =
            serde_json::from_str(r#"{"id": 1, "title": "Untitled"}"#).unwrap();
        assert_eq!(details.cast_line(), "");
        assert_eq!(details.release_year(), None);
        assert_eq!(details.rating_label(), "0.0/10");
    }

    #[test]
    fn test_rating_label_keeps_decimal() {
        let mut details = crate::test_utils::movies::details(1);
        details.vote_average = 7.0;
        assert_eq!(details.rating_label(), "7.0/10");
    }

    #[test]
    fn test_poster_url() {
        let movie = Movie::new(1, "A", Some("/poster.jpg".to_string()));
        assert_eq!(
            movie.poster_url("https://image.tmdb.org/t/p/w500/").as_deref(),
            Some("https://image.tmdb.org/t/p/w500/poster.jpg")
        );
        assert_eq!(Movie::new(2, "B", None).poster_url("x"), None);
    }

    #[test]
    fn test_feed_next_page() {
        let mut feed = MovieFeed::new();
        assert_eq!(feed.next_page(), Some(1));

        feed.apply_page(page(1, &[1, 2], 2));
        assert_eq!(feed.next_page(), Some(2));

        feed.apply_page(page(2, &[3], 2));
        assert_eq!(feed.next_page(), None);
    }

    #[test]
    fn test_feed_should_load_more_only_at_last_item() {
        let mut feed = MovieFeed::new();
        feed.apply_page(page(1, &[1, 2, 3], 3));

        assert!(!feed.should_load_more(0));
        assert!(!feed.should_load_more(1));
        assert!(feed.should_load_more(2));

        feed.apply_page(page(3, &[4], 3));
        assert!(!feed.should_load_more(3));
    }

    #[test]
    fn test_feed_should_load_more_out_of_range_index() {
        let mut feed = MovieFeed::new();
        feed.apply_page(page(1, &[1, 2], 2));

        assert!(!feed.should_load_more(5));
        assert!(!feed.should_load_more(usize::MAX));
    }

    #[test]
    fn test_feed_skips_duplicates() {
        let mut feed = MovieFeed::new();
        assert_eq!(feed.apply_page(page(1, &[1, 2], 3)), 2);
        assert_eq!(feed.apply_page(page(2, &[2, 3], 3)), 1);
        let ids: Vec<u64> = feed.movies().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_feed_load_next() {
        let mut catalog = MockMovieCatalog::new();
        catalog
            .expect_fetch_movies()
            .withf(|page| *page == 1)
            .times(1)
            .returning(|_| Ok(page(1, &[10, 11], 2)));
        catalog
            .expect_fetch_movies()
            .withf(|page| *page == 2)
            .times(1)
            .returning(|_| Ok(page(2, &[12], 2)));

        let mut feed = MovieFeed::new();
        assert_eq!(feed.load_next(&catalog).await.unwrap(), 2);
        assert_eq!(feed.load_next(&catalog).await.unwrap(), 1);
        // Exhausted: the catalog is not called again
        assert_eq!(feed.load_next(&catalog).await.unwrap(), 0);
        assert_eq!(feed.movies().len(), 3);
        assert!(!feed.is_loading());
    }

    #[test]
    fn test_feed_begin_load_blocks_second_request() {
        let mut feed = MovieFeed::new();
        assert_eq!(feed.begin_load(), Some(1));
        assert!(feed.is_loading());
        assert_eq!(feed.begin_load(), None);

        feed.finish_load(1, Ok(page(1, &[1], 1))).unwrap();
        assert!(!feed.is_loading());
        assert_eq!(feed.begin_load(), None);
    }

    #[tokio::test]
    async fn test_feed_load_error_keeps_page() {
        let mut catalog = MockMovieCatalog::new();
        catalog
            .expect_fetch_movies()
            .returning(|_| Err(CatalogError::Network("offline".to_string())));

        let mut feed = MovieFeed::new();
        assert!(feed.load_next(&catalog).await.is_err());
        assert_eq!(feed.page(), 0);
        assert_eq!(feed.next_page(), Some(1));
        assert!(!feed.is_loading());
    }
}

//! Integration tests for the TMDB catalog
//!
//! A wiremock server stands in for the TMDB API.

use app_core::movies::{CatalogError, MovieCatalog};
use networking::retry::RetryConfig;
use networking::tmdb::{TmdbCatalog, TmdbConfig};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn catalog(server: &MockServer) -> TmdbCatalog {
    let config = TmdbConfig::new("test-token")
        .with_base_url(server.uri())
        .with_retry(
            RetryConfig::new(2)
                .with_initial_delay(Duration::from_millis(1))
                .with_max_delay(Duration::from_millis(5))
                .with_jitter(0.0),
        );
    TmdbCatalog::new(config).unwrap()
}

// =============================================================================
// Popular Movies
// =============================================================================

#[tokio::test]
async fn test_fetch_popular_movies() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .and(query_param("page", "2"))
        .and(query_param("language", "en-US"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 2,
            "results": [
                {"id": 550, "title": "Fight Club", "poster_path": "/fc.jpg", "adult": false},
                {"id": 680, "title": "Pulp Fiction", "poster_path": null}
            ],
            "total_pages": 500,
            "total_results": 10000
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = catalog(&server).fetch_movies(2).await.unwrap();

    assert_eq!(page.page, 2);
    assert_eq!(page.total_pages, 500);
    assert_eq!(page.results.len(), 2);
    assert_eq!(page.results[0].title, "Fight Club");
    assert_eq!(page.results[0].poster_path.as_deref(), Some("/fc.jpg"));
    assert!(page.results[1].poster_path.is_none());
}

#[tokio::test]
async fn test_unauthorized_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status_code": 7,
            "status_message": "Invalid API key: You must be granted a valid key.",
            "success": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = catalog(&server).fetch_movies(1).await.unwrap_err();

    assert_eq!(
        err,
        CatalogError::Status {
            status: 401,
            message: "Invalid API key: You must be granted a valid key.".to_string()
        }
    );
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "results": [{"id": 1, "title": "Recovered", "poster_path": "/r.jpg"}],
            "total_pages": 1
        })))
        .mount(&server)
        .await;

    let page = catalog(&server).fetch_movies(1).await.unwrap();
    assert_eq!(page.results[0].title, "Recovered");
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = catalog(&server).fetch_movies(1).await.unwrap_err();
    assert!(matches!(err, CatalogError::Decode(_)));
}

// =============================================================================
// Movie Details
// =============================================================================

#[tokio::test]
async fn test_fetch_movie_details_with_credits() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/movie/550"))
        .and(query_param("append_to_response", "credits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 550,
            "title": "Fight Club",
            "overview": "An insomniac office worker...",
            "vote_average": 8.4,
            "release_date": "1999-10-15",
            "credits": {
                "cast": [
                    {"name": "Edward Norton", "character": "The Narrator"},
                    {"name": "Brad Pitt", "character": "Tyler Durden"}
                ],
                "crew": []
            }
        })))
        .mount(&server)
        .await;

    let details = catalog(&server).fetch_movie_details(550).await.unwrap();

    assert_eq!(details.title, "Fight Club");
    assert_eq!(details.rating_label(), "8.4/10");
    assert_eq!(details.release_year(), Some(1999));
    assert_eq!(details.cast_line(), "Edward Norton, Brad Pitt");
}

#[tokio::test]
async fn test_unknown_movie_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/movie/999999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status_code": 34,
            "status_message": "The resource you requested could not be found."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = catalog(&server).fetch_movie_details(999999).await.unwrap_err();
    assert_eq!(err, CatalogError::NotFound(999999));
}

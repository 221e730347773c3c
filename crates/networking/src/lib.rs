//! Networking for Cinema DB
//!
//! A JSON HTTP client with retry of transient failures, plus the two
//! remote services the app talks to:
//!
//! - [`tmdb::TmdbCatalog`] - popular movies and movie details from TMDB
//! - [`firebase::FirebaseAuth`] - email/password accounts via Firebase

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod firebase;
pub mod retry;
pub mod tmdb;

pub use client::{HttpClient, HttpClientConfig, HttpError};
pub use firebase::{FirebaseAuth, FirebaseConfig};
pub use retry::RetryConfig;
pub use tmdb::{TmdbCatalog, TmdbConfig};

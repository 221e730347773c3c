//! Test utilities and fixtures for Cinema DB
//!
//! In-memory stand-ins for the identity provider and the movie catalog,
//! plus sample data. Used by unit tests across the workspace and by the
//! integration tests of the application crate.

#![allow(dead_code)] // Test utilities may not all be used yet

use crate::auth::{AuthBackend, AuthError, AuthUser, Result as AuthResult};
use crate::movies::{
    CastMember, CatalogError, Credits, Movie, MovieCatalog, MovieDetails, MoviePage,
    Result as CatalogResult,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Sample movies
pub mod movies {
    use super::*;

    /// A listing entry
    pub fn movie(id: u64) -> Movie {
        Movie::new(id, format!("Movie {}", id), Some(format!("/poster{}.jpg", id)))
    }

    /// Details for a listing entry
    pub fn details(id: u64) -> MovieDetails {
        MovieDetails {
            id,
            title: format!("Movie {}", id),
            overview: format!("Overview of movie {}", id),
            vote_average: 7.5,
            release_date: "2021-06-01".to_string(),
            credits: Credits {
                cast: vec![
                    CastMember {
                        name: "Jane Doe".to_string(),
                        character: Some("Lead".to_string()),
                    },
                    CastMember {
                        name: "John Roe".to_string(),
                        character: None,
                    },
                ],
            },
        }
    }
}

// =============================================================================
// In-memory identity provider
// =============================================================================

/// Identity provider keeping accounts in memory
#[derive(Default)]
pub struct InMemoryAuthBackend {
    accounts: RwLock<HashMap<String, String>>,
    current: RwLock<Option<AuthUser>>,
    sign_in_calls: AtomicUsize,
}

impl InMemoryAuthBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account
    pub async fn add_user(&self, email: &str, password: &str) {
        self.accounts
            .write()
            .await
            .insert(email.to_string(), password.to_string());
    }

    /// Pretend `email` is still signed in from a previous session
    pub async fn restore_session(&self, email: &str) {
        *self.current.write().await = Some(Self::user_for(email));
    }

    /// Number of sign-in attempts seen
    pub fn sign_in_calls(&self) -> usize {
        self.sign_in_calls.load(Ordering::SeqCst)
    }

    fn user_for(email: &str) -> AuthUser {
        AuthUser {
            uid: format!("uid-{}", email),
            email: Some(email.to_string()),
            is_anonymous: false,
        }
    }
}

#[async_trait]
impl AuthBackend for InMemoryAuthBackend {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthUser> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        let accounts = self.accounts.read().await;
        match accounts.get(email) {
            Some(stored) if stored == password => {
                let user = Self::user_for(email);
                *self.current.write().await = Some(user.clone());
                Ok(user)
            }
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<AuthUser> {
        if password.chars().count() < 6 {
            return Err(AuthError::WeakPassword(
                "Password should be at least 6 characters".to_string(),
            ));
        }

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(email) {
            return Err(AuthError::EmailAlreadyInUse);
        }
        accounts.insert(email.to_string(), password.to_string());

        let user = Self::user_for(email);
        *self.current.write().await = Some(user.clone());
        Ok(user)
    }

    async fn sign_out(&self) -> AuthResult<()> {
        *self.current.write().await = None;
        Ok(())
    }

    async fn current_user(&self) -> Option<AuthUser> {
        self.current.read().await.clone()
    }
}

// =============================================================================
// Static catalog
// =============================================================================

/// Catalog serving fixed pages
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    pages: Vec<Vec<Movie>>,
    details: HashMap<u64, MovieDetails>,
}

impl StaticCatalog {
    /// Build a catalog of `pages` pages with `per_page` generated movies each
    pub fn generated(pages: u32, per_page: u64) -> Self {
        let mut catalog = Self::default();
        let mut next_id = 1;
        for _ in 0..pages {
            let page: Vec<Movie> = (next_id..next_id + per_page).map(movies::movie).collect();
            for movie in &page {
                catalog.details.insert(movie.id, movies::details(movie.id));
            }
            next_id += per_page;
            catalog.pages.push(page);
        }
        catalog
    }

    /// Append a page
    pub fn with_page(mut self, movies: Vec<Movie>) -> Self {
        self.pages.push(movies);
        self
    }

    /// Add details for a movie
    pub fn with_details(mut self, details: MovieDetails) -> Self {
        self.details.insert(details.id, details);
        self
    }
}

#[async_trait]
impl MovieCatalog for StaticCatalog {
    async fn fetch_movies(&self, page: u32) -> CatalogResult<MoviePage> {
        let index = page.checked_sub(1).ok_or_else(|| CatalogError::Status {
            status: 400,
            message: "page must be at least 1".to_string(),
        })?;

        let results = self
            .pages
            .get(index as usize)
            .cloned()
            .unwrap_or_default();

        Ok(MoviePage {
            page,
            results,
            total_pages: self.pages.len() as u32,
        })
    }

    async fn fetch_movie_details(&self, id: u64) -> CatalogResult<MovieDetails> {
        self.details
            .get(&id)
            .cloned()
            .ok_or(CatalogError::NotFound(id))
    }
}

//! Core application logic for Cinema DB
//!
//! This crate contains the form validation engine, the field state model
//! backing every text input, the authentication manager, and the movie
//! catalog contracts shared by the UI and networking layers.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod input;
pub mod movies;
pub mod test_utils;
pub mod validation;

pub use auth::{AuthBackend, AuthError, AuthManager, AuthState, AuthUser};
pub use input::InputState;
pub use movies::{CatalogError, Movie, MovieCatalog, MovieDetails, MovieFeed, MoviePage};
pub use validation::{
    ErrorMapped, InputValidator, InputValidatorExt, LengthValidator, NonEmpty, PatternValidator,
    Sequence, ValidationError, ValidatorChain,
};

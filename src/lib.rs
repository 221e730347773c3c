//! Cinema DB
//!
//! Browse popular movies after signing in with email and password.
//!
//! - [`config`] - Settings from file and environment
//! - [`telemetry`] - Logging setup
//! - [`app`] - Composition root

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod app;
pub mod config;
pub mod telemetry;

pub use app::{App, AppError};
pub use config::{AppConfig, ConfigError};
pub use telemetry::init_tracing;

//! Logging setup

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` takes precedence over `default_filter`. Returns false when a
/// subscriber is already installed or the filter does not parse.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match EnvFilter::try_new(default_filter) {
            Ok(filter) => filter,
            Err(e) => {
                eprintln!("Invalid log filter {:?}: {}", default_filter, e);
                return false;
            }
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}

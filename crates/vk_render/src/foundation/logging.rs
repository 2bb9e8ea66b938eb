//! Logging setup

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system with a default filter level.
///
/// `RUST_LOG` still takes precedence when set, so the configured level is
/// only a fallback.
pub fn init(default_level: &str) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_level),
    )
    .init();
}

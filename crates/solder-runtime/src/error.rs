//! Runtime bootstrap errors.

use thiserror::Error;

/// Failures while loading configuration or booting the runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("bot token is not configured")]
    MissingToken,
}

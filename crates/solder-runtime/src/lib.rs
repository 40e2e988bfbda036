//! Runtime orchestration layer for the Solder bot framework.
//!
//! Provides the long-poll [`Runtime`] (event loop + router), bootstrap
//! [`BotConfig`] loading, and tracing setup.

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{BotConfig, CONFIG_FILE, LoggingConfig};
pub use error::RuntimeError;
pub use logging::LoggingBuilder;
pub use runtime::{Runtime, process_matchers, update_stream};

//! Error types for the Solder framework.

use std::time::Duration;

use thiserror::Error;

use solder_core::ApiError;

/// Boxed error used at handler boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced while delivering one event through the pipeline.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The resolver walked every provider without producing the type.
    #[error("cannot resolve type {type_name}")]
    Unresolved {
        /// Full name of the unresolved parameter type.
        type_name: &'static str,
    },

    /// The handler callable returned an error value.
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),

    /// The handler callable panicked; the payload is rendered as text.
    #[error("handler panicked: {0}")]
    HandlerPanic(String),

    /// The event did not finish within a middleware deadline.
    #[error("dispatch timed out after {0:?}")]
    Timeout(Duration),

    /// Admission control rejected the event; nothing downstream ran.
    #[error("rate limit: user {user_id} exceeded {max_requests} requests within {window:?}")]
    RateLimited {
        user_id: i64,
        max_requests: usize,
        window: Duration,
    },

    /// The event's cancellation scope fired before dispatch completed.
    #[error("event cancelled before dispatch completed")]
    Cancelled,

    /// A platform call made by the pipeline itself failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Error raised by a plugin lifecycle hook or capability.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("{0}")]
    Message(String),

    /// The plugin does not implement the requested capability.
    #[error("capability not supported")]
    Unsupported,

    #[error(transparent)]
    Other(#[from] BoxError),
}

impl PluginError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// Errors produced by [`PluginRegistry`](crate::plugin::PluginRegistry)
/// operations. A registration error means no plugin of the failing batch was
/// inserted.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("plugin id must not be empty")]
    EmptyId,

    #[error("plugin name must not be empty (id: {0})")]
    EmptyName(String),

    #[error("duplicate plugin id: {0}")]
    DuplicateId(String),

    #[error("duplicate plugin name: {0}")]
    DuplicateName(String),

    /// A lifecycle hook failed during registration or reconfiguration.
    #[error("plugin {plugin} failed during {stage}: {source}")]
    Lifecycle {
        plugin: String,
        stage: &'static str,
        #[source]
        source: PluginError,
    },

    #[error("unknown plugin: {0}")]
    UnknownPlugin(String),

    #[error("plugin {0} does not accept configuration")]
    ConfigUnsupported(String),
}

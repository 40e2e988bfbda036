//! Tracing setup.
//!
//! Thin builder over `tracing-subscriber`. `RUST_LOG` always wins over the
//! configured default, so operators can re-filter a running deployment
//! without touching its config file.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initializes logging at `info`.
///
/// # Panics
///
/// Panics if a global subscriber is already set; use
/// [`LoggingBuilder::try_init`] when that is a possibility.
pub fn init() {
    init_with_filter("info");
}

/// Initializes logging with a filter directive such as
/// `"solder_runtime=debug,hyper=warn"`.
pub fn init_with_filter(filter: &str) {
    LoggingBuilder::new().directive(filter).init();
}

/// Builder for the logging subscriber.
///
/// ```rust,ignore
/// LoggingBuilder::new()
///     .directive("solder_framework=debug")
///     .with_target(true)
///     .init();
/// ```
#[derive(Default)]
pub struct LoggingBuilder {
    directives: Vec<String>,
    with_target: bool,
    with_thread_ids: bool,
}

impl LoggingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter directive. The first directive doubles as the default
    /// level when `RUST_LOG` is unset.
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Include the emitting module path in log lines.
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    /// Include thread ids in log lines.
    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.with_thread_ids = enabled;
        self
    }

    fn build_filter(&self) -> EnvFilter {
        let default = self
            .directives
            .first()
            .map(String::as_str)
            .unwrap_or("info");
        let mut filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
        for directive in self.directives.iter().skip(1) {
            if let Ok(parsed) = directive.parse() {
                filter = filter.add_directive(parsed);
            }
        }
        filter
    }

    /// Installs the subscriber.
    ///
    /// # Panics
    ///
    /// Panics if a global subscriber is already set.
    pub fn init(self) {
        let filter = self.build_filter();
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(self.with_target)
                    .with_thread_ids(self.with_thread_ids),
            )
            .with(filter)
            .init();
    }

    /// Installs the subscriber, reporting failure instead of panicking.
    pub fn try_init(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let filter = self.build_filter();
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(self.with_target)
                    .with_thread_ids(self.with_thread_ids),
            )
            .with(filter)
            .try_init()
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
    }
}

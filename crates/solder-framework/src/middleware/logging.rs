//! Timing and outcome logging for each dispatched event.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use solder_core::{Context, PLUGIN_NAME};

use crate::error::DispatchError;
use crate::middleware::{Middleware, Next};

/// Logs how long dispatch took and which plugin claimed the event.
///
/// Reads the [`PLUGIN_NAME`] storage entry after the tail finishes; when no
/// matcher claimed the event it reports `"unknown"`.
#[derive(Default)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Middleware for LoggingMiddleware {
    fn name(&self) -> &str {
        "logging"
    }

    async fn process(&self, ctx: Arc<Context>, next: Next) -> Result<(), DispatchError> {
        let start = Instant::now();
        let result = next.run(ctx.clone()).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(()) => {
                let plugin = ctx
                    .storage()
                    .get_string(PLUGIN_NAME)
                    .unwrap_or_else(|| "unknown".to_string());
                tracing::info!(
                    update_id = ctx.update().update_id,
                    plugin = %plugin,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "event handled"
                );
            }
            Err(e) => {
                tracing::warn!(
                    update_id = ctx.update().update_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "event failed"
                );
            }
        }

        result
    }
}

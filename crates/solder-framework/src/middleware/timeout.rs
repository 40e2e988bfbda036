//! Per-event deadline.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use solder_core::Context;

use crate::error::DispatchError;
use crate::middleware::{Middleware, Next};

/// Bounds how long one event may spend in the pipeline.
///
/// The tail runs on a detached worker task; whichever of (worker result,
/// deadline) arrives first wins. On expiry the context's cancellation token
/// fires, so cooperative handlers in flight observe it and wind down even
/// though the middleware has already returned.
pub struct TimeoutMiddleware {
    timeout: Duration,
}

impl TimeoutMiddleware {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Middleware for TimeoutMiddleware {
    fn name(&self) -> &str {
        "timeout"
    }

    async fn process(&self, ctx: Arc<Context>, next: Next) -> Result<(), DispatchError> {
        let worker = tokio::spawn({
            let ctx = ctx.clone();
            let next = next.clone();
            async move { next.run(ctx).await }
        });

        tokio::select! {
            joined = worker => match joined {
                Ok(result) => result,
                Err(join_error) if join_error.is_panic() => {
                    Err(DispatchError::HandlerPanic(join_error.to_string()))
                }
                Err(_) => Err(DispatchError::Cancelled),
            },
            _ = tokio::time::sleep(self.timeout) => {
                ctx.cancel();
                tracing::warn!(
                    update_id = ctx.update().update_id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "dispatch deadline exceeded; context cancelled"
                );
                Err(DispatchError::Timeout(self.timeout))
            }
        }
    }
}

//! Chain-level panic recovery.

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;

use solder_core::Context;

use crate::error::DispatchError;
use crate::middleware::{Middleware, Next};

/// Converts a panic anywhere below it into a logged error.
///
/// The chain reports success afterwards, so one crashing event never takes
/// the loop down. The router additionally isolates panics per matcher; this
/// layer is the backstop for faults outside any matcher (predicates,
/// providers, other middlewares).
#[derive(Default)]
pub struct RecoveryMiddleware;

impl RecoveryMiddleware {
    pub fn new() -> Self {
        Self
    }
}

/// Renders a panic payload the way `std` would print it.
pub fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[async_trait]
impl Middleware for RecoveryMiddleware {
    fn name(&self) -> &str {
        "recovery"
    }

    async fn process(&self, ctx: Arc<Context>, next: Next) -> Result<(), DispatchError> {
        match std::panic::AssertUnwindSafe(next.run(ctx.clone()))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(payload) => {
                tracing::error!(
                    update_id = ctx.update().update_id,
                    panic = %panic_message(payload),
                    "panic caught during dispatch; event dropped"
                );
                Ok(())
            }
        }
    }
}

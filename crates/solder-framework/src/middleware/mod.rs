//! Middleware chain.
//!
//! A [`Middleware`] wraps the rest of the pipeline onion-style: it receives
//! the context and a [`Next`] and decides whether (and how) to run the tail.
//! [`chain`] composes a list right-to-left around a terminal [`HandlerFunc`],
//! so `chain([a, b], t)` behaves as `a(ctx, b(ctx, t))`.

pub mod logging;
pub mod rate_limit;
pub mod recovery;
pub mod timeout;

pub use logging::LoggingMiddleware;
pub use rate_limit::RateLimitMiddleware;
pub use recovery::{RecoveryMiddleware, panic_message};
pub use timeout::TimeoutMiddleware;

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;

use solder_core::Context;

use crate::error::DispatchError;

/// The terminal (or composed) step of a pipeline.
pub type HandlerFunc =
    Arc<dyn Fn(Arc<Context>) -> BoxFuture<'static, Result<(), DispatchError>> + Send + Sync>;

/// The tail of the chain as seen from one middleware.
#[derive(Clone)]
pub struct Next(HandlerFunc);

impl Next {
    pub fn new(f: HandlerFunc) -> Self {
        Self(f)
    }

    /// Runs the remainder of the chain.
    pub async fn run(&self, ctx: Arc<Context>) -> Result<(), DispatchError> {
        (self.0)(ctx).await
    }
}

/// One onion layer around event dispatch.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Name used in log lines.
    fn name(&self) -> &str;

    /// Processes the event, calling `next.run(ctx)` zero or one times.
    async fn process(&self, ctx: Arc<Context>, next: Next) -> Result<(), DispatchError>;
}

/// Composes `middlewares` around `terminal`. The first middleware in the
/// slice is the outermost layer; an empty slice returns the terminal
/// unchanged.
pub fn chain(middlewares: &[Arc<dyn Middleware>], terminal: HandlerFunc) -> HandlerFunc {
    let mut current = terminal;
    for middleware in middlewares.iter().rev() {
        let middleware = Arc::clone(middleware);
        let next = Next::new(current);
        current = Arc::new(move |ctx| {
            let middleware = Arc::clone(&middleware);
            let next = next.clone();
            async move { middleware.process(ctx, next).await }.boxed()
        });
    }
    current
}

struct FnMiddleware<F> {
    name: String,
    f: F,
}

#[async_trait]
impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(Arc<Context>, Next) -> BoxFuture<'static, Result<(), DispatchError>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn process(&self, ctx: Arc<Context>, next: Next) -> Result<(), DispatchError> {
        (self.f)(ctx, next).await
    }
}

/// Lifts a closure into a named middleware.
pub fn middleware_fn<F>(name: impl Into<String>, f: F) -> Arc<dyn Middleware>
where
    F: Fn(Arc<Context>, Next) -> BoxFuture<'static, Result<(), DispatchError>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(FnMiddleware {
        name: name.into(),
        f,
    })
}

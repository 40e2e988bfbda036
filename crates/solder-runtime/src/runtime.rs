//! The event loop and router.
//!
//! [`Runtime`] owns the long-poll loop and the per-event pipeline: each
//! update becomes a [`Context`], travels through the middleware chain, and
//! lands in [`process_matchers`] — the router walk over the registry's
//! matcher snapshot in priority order.
//!
//! ```rust,ignore
//! let config = BotConfig::load()?;
//! let mut runtime = Runtime::new(api, config);
//! runtime.use_middleware(Arc::new(RecoveryMiddleware::new()));
//! runtime.registry().register_plugins([echo_plugin()]).await?;
//! runtime.run().await;
//! ```

use std::cmp::Reverse;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use solder_core::{Context, PLUGIN_NAME, PlatformApi, Shared, Update};
use solder_framework::middleware::{HandlerFunc, Middleware, chain, panic_message};
use solder_framework::on::message_provider;
use solder_framework::plugin::PluginRegistry;
use solder_framework::provider::{Provided, dynamic_provider, static_provider, static_value};
use solder_framework::{Container, DispatchError};

use crate::config::BotConfig;

/// Number of characters of user text shown in receipt log lines.
const RECEIPT_TEXT_LIMIT: usize = 64;

/// Long-poll runtime around a [`PlatformApi`] handle.
///
/// Cloning is cheap and shares all state; configure middlewares before
/// cloning or running.
#[derive(Clone)]
pub struct Runtime {
    api: Shared<dyn PlatformApi>,
    registry: Arc<PluginRegistry>,
    middlewares: Vec<Arc<dyn Middleware>>,
    container: Arc<Container>,
    config: BotConfig,
    shutdown: CancellationToken,
}

impl Runtime {
    /// Creates a runtime and populates the global dependency container:
    /// static providers for the API handle and the plugin registry, dynamic
    /// providers for the per-event context, update, and message.
    pub fn new(api: Shared<dyn PlatformApi>, config: BotConfig) -> Self {
        let registry = Arc::new(PluginRegistry::new());

        let registry_handle = Shared::from_arc(registry.clone());
        let container = Container::new()
            .with_static(static_value(api.clone()))
            .with_static(static_provider(move |_| {
                Some(Provided::new(registry_handle.clone()))
            }))
            .with_dynamic(dynamic_provider(|ctx: &Arc<Context>| {
                Some(Provided::new(Shared::from_arc(ctx.clone())))
            }))
            .with_dynamic(dynamic_provider(|ctx: &Arc<Context>| {
                Some(Provided::new(ctx.update().clone()))
            }))
            .with_dynamic(message_provider());

        Self {
            api,
            registry,
            middlewares: Vec::new(),
            container: Arc::new(container),
            config,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn api(&self) -> &Shared<dyn PlatformApi> {
        &self.api
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    /// The global dependency container.
    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Appends a middleware; the first one added is the outermost layer.
    pub fn use_middleware(&mut self, middleware: Arc<dyn Middleware>) -> &mut Self {
        self.middlewares.push(middleware);
        self
    }

    /// Builder-style variant of [`use_middleware`](Self::use_middleware).
    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Token observed by the event loop and, as the parent of every event's
    /// scope, by in-flight handlers.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Runs until a shutdown signal or [`shutdown_token`](Self::shutdown_token)
    /// cancellation, then unloads every plugin.
    pub async fn run(&self) {
        let offset = self.discard_history().await;
        self.run_from(offset).await;
    }

    /// Probes the platform for the newest pending update and returns the
    /// offset just past it, so history accumulated while the process was
    /// offline is never dispatched.
    pub async fn discard_history(&self) -> i64 {
        match self.api.get_updates(-1, 1, Duration::ZERO).await {
            Ok(batch) => batch.last().map(|u| u.update_id + 1).unwrap_or(0),
            Err(e) => {
                warn!(error = %e, "could not probe pending updates; starting unskipped");
                0
            }
        }
    }

    /// Event loop starting at an explicit offset.
    pub async fn run_from(&self, mut offset: i64) {
        info!(offset, "event loop started");
        let limiter = self
            .config
            .max_in_flight
            .map(|permits| Arc::new(Semaphore::new(permits)));

        loop {
            let batch = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = shutdown_signal() => {
                    self.shutdown.cancel();
                    break;
                }
                polled = self.api.get_updates(
                    offset,
                    self.config.poll_limit,
                    self.config.poll_timeout(),
                ) => match polled {
                    Ok(batch) => batch,
                    Err(e) => {
                        error!(error = %e, "failed to read updates; retrying");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        continue;
                    }
                },
            };

            for update in batch {
                offset = offset.max(update.update_id + 1);

                let permit = match &limiter {
                    Some(semaphore) => semaphore.clone().acquire_owned().await.ok(),
                    None => None,
                };
                let runtime = self.clone();
                tokio::spawn(async move {
                    let _permit = permit;
                    if let Err(e) = runtime.dispatch(update).await {
                        error!(error = %e, "event dispatch failed");
                    }
                });
            }
        }

        info!("event loop stopped; unloading plugins");
        self.registry.unload_all().await;
    }

    /// Requests shutdown: stops the loop and cancels every in-flight event's
    /// scope.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Delivers one update through the full pipeline: context construction,
    /// middleware chain, then the router walk. Public so embedders can feed
    /// events from sources other than long polling.
    pub async fn dispatch(&self, update: Update) -> Result<(), DispatchError> {
        let ctx = Arc::new(Context::with_cancellation(
            update,
            self.api.clone(),
            self.shutdown.clone(),
        ));

        if ctx.is_message() {
            info!(
                update_id = ctx.update().update_id,
                user = ctx.username().unwrap_or("-"),
                text = %truncate(ctx.text_or_caption().unwrap_or(""), RECEIPT_TEXT_LIMIT),
                "update received"
            );
        } else {
            debug!(
                update_id = ctx.update().update_id,
                kind = ctx.update().kind_name(),
                "update received"
            );
        }

        let pipeline = chain(&self.middlewares, self.terminal());
        pipeline(ctx).await
    }

    /// The terminal chain step: the router walk.
    fn terminal(&self) -> HandlerFunc {
        let registry = self.registry.clone();
        let container = self.container.clone();
        Arc::new(move |ctx| {
            let registry = registry.clone();
            let container = container.clone();
            async move { process_matchers(ctx, registry, container).await }.boxed()
        })
    }
}

/// Walks the matcher snapshot in priority order.
///
/// Per matcher: a failed rule or permission just moves on; a claimed event
/// records the owning plugin in [`PLUGIN_NAME`] storage and runs the
/// handlers with per-matcher fault isolation — an error or panic is logged
/// and, unless the matcher blocks, the walk continues. A blocking matcher
/// always ends the walk once its handlers finish, success or not.
///
/// A cancelled context stops the walk before the next matcher starts.
pub async fn process_matchers(
    ctx: Arc<Context>,
    registry: Arc<PluginRegistry>,
    global: Arc<Container>,
) -> Result<(), DispatchError> {
    let mut matchers = registry.matcher_snapshot().await;
    // The snapshot is kept ordered by the registry; re-assert here so the
    // walk stays correct even against a future registration path. Stable, so
    // ties keep registration order.
    matchers.sort_by_key(|m| Reverse(m.priority()));

    for matcher in matchers {
        if ctx.is_cancelled() {
            return Err(DispatchError::Cancelled);
        }
        if !matcher.matches(&ctx) {
            continue;
        }

        let plugin_name = matcher
            .owner()
            .map(|tag| tag.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        ctx.storage().set(PLUGIN_NAME, plugin_name.clone());
        debug!(
            plugin = %plugin_name,
            priority = matcher.priority(),
            "matcher claimed event"
        );

        let outcome = AssertUnwindSafe(matcher.call(&ctx, &global))
            .catch_unwind()
            .await;
        let result = match outcome {
            Ok(result) => result,
            Err(payload) => Err(DispatchError::HandlerPanic(panic_message(payload))),
        };

        if let Err(e) = result {
            error!(plugin = %plugin_name, error = %e, "matcher handlers failed");
        }
        if matcher.is_blocking() {
            debug!(plugin = %plugin_name, "blocking matcher stopped propagation");
            break;
        }
    }

    Ok(())
}

/// Streaming variant of the update source: a lazy, non-restartable sequence
/// of updates starting at `offset`, ending when `cancellation` fires.
///
/// The long-poll loop inside retries read errors with a short backoff, like
/// the runtime's own loop.
pub fn update_stream(
    api: Shared<dyn PlatformApi>,
    offset: i64,
    limit: u32,
    poll_timeout: Duration,
    cancellation: CancellationToken,
) -> impl futures::Stream<Item = Update> + Send {
    futures::stream::unfold(
        (api, offset, std::collections::VecDeque::new(), cancellation),
        move |(api, mut offset, mut buffer, cancellation)| async move {
            loop {
                if cancellation.is_cancelled() {
                    return None;
                }
                if let Some(update) = buffer.pop_front() {
                    return Some((update, (api, offset, buffer, cancellation)));
                }

                let polled = tokio::select! {
                    _ = cancellation.cancelled() => return None,
                    polled = api.get_updates(offset, limit, poll_timeout) => polled,
                };
                match polled {
                    Ok(batch) => {
                        for update in &batch {
                            offset = offset.max(update.update_id + 1);
                        }
                        buffer.extend(batch);
                    }
                    Err(e) => {
                        warn!(error = %e, "update stream read failed; retrying");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        },
    )
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let mut shortened: String = text.chars().take(limit).collect();
        shortened.push('…');
        shortened
    }
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("received ctrl-c"),
                    _ = sigterm.recv() => info!("received SIGTERM"),
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                info!("received ctrl-c");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("received ctrl-c");
    }
}

//! Framework layer of the Solder bot runtime.
//!
//! Everything between the raw event stream and user handler code lives here:
//!
//! - **Dependency injection** ([`provider`], [`container`], [`resolver`]) –
//!   providers produce values per event, containers store them in two
//!   ordered tiers, and the per-invocation [`Resolver`](resolver::Resolver)
//!   fulfills a handler's parameter list with identity / deref / ref /
//!   declared structural conversions.
//! - **Handlers** ([`handler`]) – plain async functions whose parameters are
//!   resolved by type, Axum-style.
//! - **Matchers** ([`matcher`], [`on`], [`rules`], [`permission`]) – the
//!   rule + permission + priority + block bundles the router walks.
//! - **Plugins** ([`plugin`]) – named matcher bundles with lifecycle hooks,
//!   indexed by the [`PluginRegistry`](plugin::PluginRegistry).
//! - **Middleware** ([`middleware`]) – the onion chain around matcher
//!   processing, with logging, recovery, timeout, and rate-limit layers
//!   included.

pub mod container;
pub mod error;
pub mod handler;
pub mod matcher;
pub mod middleware;
pub mod on;
pub mod params;
pub mod permission;
pub mod plugin;
pub mod provider;
pub mod resolver;
pub mod rules;

#[cfg(test)]
mod testutil;

pub use container::Container;
pub use error::{BoxError, DispatchError, PluginError, RegistryError};
pub use handler::{Handler, HandlerFn, IntoHandlerResult, handler};
pub use matcher::{DEFAULT_PRIORITY, Matcher, OwnerTag};
pub use middleware::{
    HandlerFunc, LoggingMiddleware, Middleware, Next, RateLimitMiddleware, RecoveryMiddleware,
    TimeoutMiddleware, chain, middleware_fn,
};
pub use on::{
    on, on_callback, on_callback_full_match, on_callback_starts_with, on_command, on_ends_with,
    on_full_match, on_inline_query, on_keyword, on_message, on_notice, on_regex, on_starts_with,
};
pub use params::{CallbackData, CommandArgs, CommandContext};
pub use plugin::{ConfigMap, Plugin, PluginBuilder, PluginInfo, PluginRegistry};
pub use provider::{Provided, Provider, dynamic_provider, static_provider, static_value};
pub use resolver::{Dependency, DependencyList, Resolver, SharedTarget};

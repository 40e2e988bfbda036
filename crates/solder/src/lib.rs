//! # Solder
//!
//! A plugin-oriented chat-bot runtime framework.
//!
//! Solder consumes a long-polled stream of platform updates and delivers
//! each one through three chained layers: a middleware chain, a
//! priority-ordered matcher walk, and dependency-injected handler
//! invocation. Plugins bundle matchers with lifecycle hooks; faults inside
//! any one handler never take down the loop.
//!
//! ```text
//! ┌─────────┐    ┌────────────────┐    ┌─────────────────────┐
//! │ Runtime │───▶│ middleware     │───▶│ matchers (by prio)  │──▶ handlers (DI)
//! │ (poll)  │    │ chain          │    │ rule ∧ permission   │
//! └─────────┘    └────────────────┘    └─────────────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use solder::prelude::*;
//!
//! async fn echo(ctx: Shared<Context>, cmd: CommandContext) -> Result<(), ContextError> {
//!     ctx.reply(&cmd.args.join(" ")).await?;
//!     Ok(())
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = BotConfig::load().expect("config");
//!     let api = my_platform_client(&config.token);
//!
//!     let runtime = Runtime::new(api, config)
//!         .with_middleware(Arc::new(RecoveryMiddleware::new()))
//!         .with_middleware(Arc::new(LoggingMiddleware::new()));
//!
//!     let plugin = PluginBuilder::new("echo", "Echo")
//!         .matcher(on_command(["/echo"], false, handler(echo)))
//!         .build();
//!     runtime.registry().register_plugins([plugin]).await.expect("register");
//!
//!     runtime.run().await;
//! }
//! ```

pub use solder_core::*;

pub use solder_framework;
pub use solder_runtime;

/// Everything most bots need, in one import.
pub mod prelude {
    // Runtime entry points.
    pub use solder_runtime::{BotConfig, LoggingBuilder, Runtime};

    // Event model and context.
    pub use solder_core::{
        ApiError, ApiResult, CallbackQuery, Chat, ChatKind, Context, ContextError, InlineQuery,
        Message, PlatformApi, Shared, Storage, Update, UpdateKind, User,
    };

    // Predicate algebra.
    pub use solder_core::{Permission, Predicate, Rule, all, any, not, predicate};

    // Handlers, matchers, and the DSL.
    pub use solder_framework::{
        CallbackData, CommandArgs, CommandContext, Handler, Matcher, handler, on, on_callback,
        on_callback_full_match, on_callback_starts_with, on_command, on_ends_with, on_full_match,
        on_inline_query, on_keyword, on_message, on_notice, on_regex, on_starts_with,
    };

    // Plugins.
    pub use solder_framework::{Plugin, PluginBuilder, PluginInfo, PluginRegistry};

    // Dependency injection.
    pub use solder_framework::{
        Container, Dependency, Provided, Provider, dynamic_provider, static_provider, static_value,
    };
    pub use solder_framework::injectable;

    // Middleware.
    pub use solder_framework::{
        LoggingMiddleware, Middleware, Next, RateLimitMiddleware, RecoveryMiddleware,
        TimeoutMiddleware,
    };

    // Rule and permission helpers under their own names.
    pub use solder_framework::{permission, rules};
}

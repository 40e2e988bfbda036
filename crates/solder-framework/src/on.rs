//! Matcher construction sugar.
//!
//! The `on_*` helpers pair a rule with a handler and pre-register the
//! handler-local providers the rule implies — `on_command` makes the parsed
//! [`CommandContext`] and [`CommandArgs`] injectable, `on_callback*` the
//! [`CallbackData`], and so on.
//!
//! ```rust,ignore
//! async fn echo(ctx: Shared<Context>, cmd: CommandContext) {
//!     ctx.reply(&cmd.args.join(" ")).await.ok();
//! }
//!
//! let matcher = on_command(["/echo"], false, handler(echo))
//!     .with_priority(20)
//!     .with_block(true);
//! ```

use std::sync::Arc;

use solder_core::{Context, Rule};

use crate::handler::Handler;
use crate::matcher::Matcher;
use crate::params::{CallbackData, CommandContext};
use crate::provider::{Provided, Provider, dynamic_provider};
use crate::rules;

// ─── Event-payload providers ─────────────────────────────────────────────

/// Injects the current message.
pub fn message_provider() -> Arc<dyn Provider> {
    dynamic_provider(|ctx: &Arc<Context>| ctx.message().cloned().map(Provided::new))
}

/// Injects the callback payload as [`CallbackData`].
pub fn callback_data_provider() -> Arc<dyn Provider> {
    dynamic_provider(|ctx: &Arc<Context>| {
        ctx.callback_data()
            .map(|data| Provided::new(CallbackData(data.to_string())))
    })
}

/// Injects the current inline query.
pub fn inline_query_provider() -> Arc<dyn Provider> {
    dynamic_provider(|ctx: &Arc<Context>| ctx.inline_query().cloned().map(Provided::new))
}

/// Injects the parsed command line as [`CommandContext`].
pub fn command_context_provider() -> Arc<dyn Provider> {
    dynamic_provider(|ctx: &Arc<Context>| {
        ctx.text_or_caption()
            .map(|text| Provided::new(CommandContext::parse(text)))
    })
}

/// Injects just the command arguments.
pub fn command_args_provider() -> Arc<dyn Provider> {
    dynamic_provider(|ctx: &Arc<Context>| {
        ctx.text_or_caption()
            .map(|text| Provided::new(CommandContext::parse(text).args))
    })
}

// ─── Matcher constructors ────────────────────────────────────────────────

/// A matcher guarded by an explicit rule.
pub fn on(rule: Rule, handler: Handler) -> Matcher {
    Matcher::new(rule, handler)
}

/// Matches every message-shaped event and injects the message.
pub fn on_message(handler: Handler) -> Matcher {
    Matcher::new(
        rules::is_message(),
        handler.register_dynamic(message_provider()),
    )
}

/// Matches notification events.
pub fn on_notice(handler: Handler) -> Matcher {
    Matcher::new(rules::is_notice(), handler)
}

/// Matches interactive events and injects the callback payload.
pub fn on_callback(handler: Handler) -> Matcher {
    Matcher::new(
        rules::is_callback(),
        handler.register_dynamic(callback_data_provider()),
    )
}

/// Matches callback payloads by prefix.
pub fn on_callback_starts_with<I, S>(prefixes: I, handler: Handler) -> Matcher
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Matcher::new(
        rules::callback_starts_with(prefixes),
        handler.register_dynamic(callback_data_provider()),
    )
}

/// Matches callback payloads exactly.
pub fn on_callback_full_match<I, S>(patterns: I, handler: Handler) -> Matcher
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Matcher::new(
        rules::callback_full_match(patterns),
        handler.register_dynamic(callback_data_provider()),
    )
}

/// Matches inline queries and injects them.
pub fn on_inline_query(handler: Handler) -> Matcher {
    Matcher::new(
        rules::is_inline_query(),
        handler.register_dynamic(inline_query_provider()),
    )
}

/// Matches text or captions by prefix.
pub fn on_starts_with<I, S>(prefixes: I, handler: Handler) -> Matcher
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Matcher::new(rules::starts_with(prefixes), handler)
}

/// Matches text or captions by suffix.
pub fn on_ends_with<I, S>(suffixes: I, handler: Handler) -> Matcher
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Matcher::new(rules::ends_with(suffixes), handler)
}

/// Matches text or captions exactly.
pub fn on_full_match<I, S>(patterns: I, handler: Handler) -> Matcher
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Matcher::new(rules::full_match(patterns), handler)
}

/// Matches text or captions containing a keyword.
pub fn on_keyword<I, S>(keywords: I, handler: Handler) -> Matcher
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Matcher::new(rules::keyword(keywords), handler)
}

/// Matches text or captions against regular expressions. Fails eagerly on an
/// invalid pattern rather than inside the dispatch loop.
pub fn on_regex<I, S>(patterns: I, handler: Handler) -> Result<Matcher, regex::Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Ok(Matcher::new(rules::regex(patterns)?, handler))
}

/// Matches commands and injects the parsed command line.
///
/// `commands` carry their prefix (`"/echo"`); a `@botname` suffix on the
/// incoming token is accepted transparently.
pub fn on_command<I, S>(commands: I, case_sensitive: bool, handler: Handler) -> Matcher
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Matcher::new(
        rules::command(commands, case_sensitive),
        handler
            .register_dynamic(command_context_provider())
            .register_dynamic(command_args_provider()),
    )
}

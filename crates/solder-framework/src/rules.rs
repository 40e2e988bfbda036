//! Rule helpers over message text, captions, callback payloads, and event
//! shapes.
//!
//! Text rules match case-insensitively against both the message text and the
//! media caption. They are plain [`Rule`]s — combine them freely with
//! [`all`](solder_core::all), [`any`](solder_core::any), and
//! [`not`](solder_core::not).

use regex::RegexBuilder;

use solder_core::{Context, Rule, predicate};

fn collect_lower<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().to_lowercase())
        .collect()
}

fn match_text(ctx: &Context, check: impl Fn(&str) -> bool) -> bool {
    ctx.message_text().is_some_and(|t| check(t)) || ctx.caption().is_some_and(|t| check(t))
}

/// Text or caption starts with any of the prefixes.
pub fn starts_with<I, S>(prefixes: I) -> Rule
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let prefixes = collect_lower(prefixes);
    predicate(move |ctx| {
        match_text(ctx, |text| {
            let text = text.to_lowercase();
            prefixes.iter().any(|p| text.starts_with(p.as_str()))
        })
    })
}

/// Text or caption ends with any of the suffixes.
pub fn ends_with<I, S>(suffixes: I) -> Rule
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let suffixes = collect_lower(suffixes);
    predicate(move |ctx| {
        match_text(ctx, |text| {
            let text = text.to_lowercase();
            suffixes.iter().any(|s| text.ends_with(s.as_str()))
        })
    })
}

/// Text or caption equals any of the patterns.
pub fn full_match<I, S>(patterns: I) -> Rule
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let patterns = collect_lower(patterns);
    predicate(move |ctx| {
        match_text(ctx, |text| {
            let text = text.to_lowercase();
            patterns.iter().any(|p| text == *p)
        })
    })
}

/// Text or caption contains any of the keywords.
pub fn keyword<I, S>(keywords: I) -> Rule
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let keywords = collect_lower(keywords);
    predicate(move |ctx| {
        match_text(ctx, |text| {
            let text = text.to_lowercase();
            keywords.iter().any(|k| text.contains(k.as_str()))
        })
    })
}

/// Text or caption matches any of the patterns (case-insensitive).
///
/// Patterns are compiled here, once; an invalid pattern surfaces as an error
/// instead of failing inside the dispatch loop.
pub fn regex<I, S>(patterns: I) -> Result<Rule, regex::Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut compiled = Vec::new();
    for pattern in patterns {
        compiled.push(
            RegexBuilder::new(pattern.as_ref())
                .case_insensitive(true)
                .build()?,
        );
    }
    Ok(predicate(move |ctx| {
        match_text(ctx, |text| compiled.iter().any(|re| re.is_match(text)))
    }))
}

/// The first token of the text or caption is one of the commands.
///
/// Commands are given with their prefix (`"/start"`). A `@botname` suffix on
/// the incoming token is ignored, so `/start@somebot` matches `"/start"`.
pub fn command<I, S>(commands: I, case_sensitive: bool) -> Rule
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let commands: Vec<String> = commands
        .into_iter()
        .map(|c| {
            if case_sensitive {
                c.as_ref().to_string()
            } else {
                c.as_ref().to_lowercase()
            }
        })
        .collect();

    predicate(move |ctx| {
        match_text(ctx, |text| {
            let Some(first) = text.split_whitespace().next() else {
                return false;
            };
            let bare = first.split('@').next().unwrap_or(first);
            if case_sensitive {
                commands.iter().any(|c| c == bare)
            } else {
                let bare = bare.to_lowercase();
                commands.iter().any(|c| *c == bare)
            }
        })
    })
}

// ─── Event-shape rules ───────────────────────────────────────────────────

/// The event is message-shaped (new, edited, or channel post).
pub fn is_message() -> Rule {
    predicate(Context::is_message)
}

/// The event is a state-change notification.
pub fn is_notice() -> Rule {
    predicate(Context::is_notice)
}

/// The event is interactive (callback query, inline query, chosen result,
/// join request).
pub fn is_callback() -> Rule {
    predicate(Context::is_callback)
}

/// The event is a message starting with a bot command.
pub fn is_command() -> Rule {
    predicate(Context::is_command)
}

/// The event is an inline query.
pub fn is_inline_query() -> Rule {
    predicate(Context::is_inline_query)
}

// ─── Callback-payload rules ──────────────────────────────────────────────

fn match_callback(ctx: &Context, check: impl Fn(&str) -> bool) -> bool {
    ctx.callback_data().is_some_and(|d| check(d))
}

/// Callback payload starts with any of the prefixes.
pub fn callback_starts_with<I, S>(prefixes: I) -> Rule
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let prefixes = collect_lower(prefixes);
    predicate(move |ctx| {
        match_callback(ctx, |data| {
            let data = data.to_lowercase();
            prefixes.iter().any(|p| data.starts_with(p.as_str()))
        })
    })
}

/// Callback payload equals any of the patterns.
pub fn callback_full_match<I, S>(patterns: I) -> Rule
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let patterns = collect_lower(patterns);
    predicate(move |ctx| {
        match_callback(ctx, |data| {
            let data = data.to_lowercase();
            patterns.iter().any(|p| data == *p)
        })
    })
}

/// Callback payload contains any of the keywords.
pub fn callback_keyword<I, S>(keywords: I) -> Rule
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let keywords = collect_lower(keywords);
    predicate(move |ctx| {
        match_callback(ctx, |data| {
            let data = data.to_lowercase();
            keywords.iter().any(|k| data.contains(k.as_str()))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{callback_ctx, caption_ctx, message_ctx};
    use solder_core::Predicate;

    #[test]
    fn text_rules_are_case_insensitive() {
        let ctx = message_ctx("Hello World");
        assert!(starts_with(["hello"]).matches(&ctx));
        assert!(ends_with(["WORLD"]).matches(&ctx));
        assert!(full_match(["hello world"]).matches(&ctx));
        assert!(keyword(["lo wo"]).matches(&ctx));
        assert!(!starts_with(["world"]).matches(&ctx));
    }

    #[test]
    fn text_rules_lift_over_captions() {
        let ctx = caption_ctx("a photo of a cat");
        assert!(keyword(["cat"]).matches(&ctx));
        assert!(starts_with(["a photo"]).matches(&ctx));
        assert!(!keyword(["dog"]).matches(&ctx));
    }

    #[test]
    fn regex_rule_compiles_and_matches() {
        let rule = regex([r"^h.llo\b"]).unwrap();
        assert!(rule.matches(&message_ctx("Hallo there")));
        assert!(!rule.matches(&message_ctx("say hallo")));
        assert!(regex(["("]).is_err());
    }

    #[test]
    fn command_rule_matches_first_token_only() {
        let rule = command(["/echo"], false);
        assert!(rule.matches(&message_ctx("/echo hi")));
        assert!(rule.matches(&message_ctx("/Echo hi")));
        assert!(rule.matches(&message_ctx("/echo@somebot hi")));
        assert!(!rule.matches(&message_ctx("/echoes hi")));
        assert!(!rule.matches(&message_ctx("say /echo")));
    }

    #[test]
    fn command_rule_case_sensitive_variant() {
        let rule = command(["/Echo"], true);
        assert!(rule.matches(&message_ctx("/Echo hi")));
        assert!(!rule.matches(&message_ctx("/echo hi")));
    }

    #[test]
    fn shape_rules_discriminate() {
        let msg = message_ctx("hi");
        let cb = callback_ctx("page:2");
        assert!(is_message().matches(&msg));
        assert!(!is_message().matches(&cb));
        assert!(is_callback().matches(&cb));
        assert!(!is_callback().matches(&msg));
    }

    #[test]
    fn callback_rules_read_payload() {
        let ctx = callback_ctx("Page:2");
        assert!(callback_starts_with(["page:"]).matches(&ctx));
        assert!(callback_full_match(["page:2"]).matches(&ctx));
        assert!(callback_keyword(["age"]).matches(&ctx));
        assert!(!callback_starts_with(["page:"]).matches(&message_ctx("page:2")));
    }
}

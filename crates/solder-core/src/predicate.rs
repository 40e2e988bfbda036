//! Predicate algebra shared by rules and permissions.
//!
//! A [`Predicate`] answers one question about the current event. The two
//! brands used around the framework — [`Rule`] ("is this event of interest")
//! and [`Permission`] ("is this principal allowed") — are the same interface;
//! the aliases exist only for documentation.
//!
//! Predicates return `bool` and therefore cannot fail; logic that needs to
//! fail loudly belongs in a middleware.

use std::sync::Arc;

use crate::context::Context;

/// A yes/no question about an event.
pub trait Predicate: Send + Sync {
    fn matches(&self, ctx: &Context) -> bool;
}

/// Plain closures are predicates.
impl<F> Predicate for F
where
    F: Fn(&Context) -> bool + Send + Sync,
{
    fn matches(&self, ctx: &Context) -> bool {
        self(ctx)
    }
}

/// Predicate brand for event selection.
pub type Rule = Arc<dyn Predicate>;

/// Predicate brand for principal authorization.
pub type Permission = Arc<dyn Predicate>;

/// Lifts a closure into a shareable predicate.
pub fn predicate<F>(f: F) -> Arc<dyn Predicate>
where
    F: Fn(&Context) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

struct AllOf(Vec<Arc<dyn Predicate>>);

impl Predicate for AllOf {
    fn matches(&self, ctx: &Context) -> bool {
        self.0.iter().all(|p| p.matches(ctx))
    }
}

struct AnyOf(Vec<Arc<dyn Predicate>>);

impl Predicate for AnyOf {
    fn matches(&self, ctx: &Context) -> bool {
        self.0.iter().any(|p| p.matches(ctx))
    }
}

struct NotOf(Arc<dyn Predicate>);

impl Predicate for NotOf {
    fn matches(&self, ctx: &Context) -> bool {
        !self.0.matches(ctx)
    }
}

/// True iff every predicate is true. Evaluates left to right and
/// short-circuits on the first false; `all([])` is true.
pub fn all<I>(predicates: I) -> Arc<dyn Predicate>
where
    I: IntoIterator<Item = Arc<dyn Predicate>>,
{
    Arc::new(AllOf(predicates.into_iter().collect()))
}

/// True iff at least one predicate is true. Evaluates left to right and
/// short-circuits on the first true; `any([])` is false.
pub fn any<I>(predicates: I) -> Arc<dyn Predicate>
where
    I: IntoIterator<Item = Arc<dyn Predicate>>,
{
    Arc::new(AnyOf(predicates.into_iter().collect()))
}

/// Inverts a predicate.
pub fn not(predicate: Arc<dyn Predicate>) -> Arc<dyn Predicate> {
    Arc::new(NotOf(predicate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PlatformApi;
    use crate::error::{ApiError, ApiResult};
    use crate::event::{Chat, ChatKind, ChatMember, Message, Update, UpdateKind};
    use crate::shared::Shared;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    struct NoopApi;

    #[async_trait]
    impl PlatformApi for NoopApi {
        async fn get_updates(
            &self,
            _offset: i64,
            _limit: u32,
            _timeout: Duration,
        ) -> ApiResult<Vec<Update>> {
            Err(ApiError::NotConnected)
        }

        async fn send_message(&self, _chat_id: i64, _text: &str) -> ApiResult<Message> {
            Err(ApiError::NotConnected)
        }

        async fn edit_message(
            &self,
            _chat_id: i64,
            _message_id: i64,
            _text: &str,
        ) -> ApiResult<Message> {
            Err(ApiError::NotConnected)
        }

        async fn delete_message(&self, _chat_id: i64, _message_id: i64) -> ApiResult<()> {
            Err(ApiError::NotConnected)
        }

        async fn answer_callback(&self, _callback_id: &str, _text: Option<&str>) -> ApiResult<()> {
            Err(ApiError::NotConnected)
        }

        async fn get_chat_member(&self, _chat_id: i64, _user_id: i64) -> ApiResult<ChatMember> {
            Err(ApiError::NotConnected)
        }

        async fn get_file(&self, _file_id: &str) -> ApiResult<Vec<u8>> {
            Err(ApiError::NotConnected)
        }

        fn username(&self) -> &str {
            "noop"
        }
    }

    fn ctx() -> Context {
        let update = Update {
            update_id: 1,
            kind: UpdateKind::Message(Message {
                message_id: 1,
                from: None,
                chat: Chat {
                    id: 1,
                    kind: ChatKind::Private,
                    title: None,
                    username: None,
                },
                date: 0,
                text: Some("hello".into()),
                caption: None,
                entities: Vec::new(),
                reply_to_message: None,
                new_chat_members: None,
                left_chat_member: None,
                pinned_message: None,
            }),
        };
        Context::new(update, Shared::from_arc(Arc::new(NoopApi)))
    }

    fn lit(value: bool) -> Arc<dyn Predicate> {
        predicate(move |_| value)
    }

    #[test]
    fn all_truth_table() {
        let ctx = ctx();
        assert!(all([]).matches(&ctx));
        assert!(all([lit(true), lit(true)]).matches(&ctx));
        assert!(!all([lit(true), lit(false)]).matches(&ctx));
        assert!(!all([lit(false), lit(false)]).matches(&ctx));
    }

    #[test]
    fn any_truth_table() {
        let ctx = ctx();
        assert!(!any([]).matches(&ctx));
        assert!(any([lit(false), lit(true)]).matches(&ctx));
        assert!(any([lit(true), lit(true)]).matches(&ctx));
        assert!(!any([lit(false), lit(false)]).matches(&ctx));
    }

    #[test]
    fn not_inverts() {
        let ctx = ctx();
        assert!(!not(lit(true)).matches(&ctx));
        assert!(not(lit(false)).matches(&ctx));
        assert!(not(not(lit(true))).matches(&ctx));
    }

    #[test]
    fn combinators_nest() {
        let ctx = ctx();
        let nested = all([any([lit(false), lit(true)]), not(lit(false))]);
        assert!(nested.matches(&ctx));
    }
}

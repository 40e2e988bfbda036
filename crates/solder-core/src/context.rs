//! Per-event context.
//!
//! A [`Context`] is created for each incoming [`Update`] and dropped when
//! dispatch ends. It bundles the event payload, the platform-API handle, a
//! cancellation scope, and a [`Storage`] for values that flow between
//! middlewares and handlers. Contexts are never shared across events.

use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::api::PlatformApi;
use crate::error::{ApiResult, ContextError};
use crate::event::{
    CallbackQuery, Chat, ChatJoinRequest, ChatKind, ChatMemberUpdated, ChosenInlineResult,
    InlineQuery, Message, Poll, PollAnswer, Update, UpdateKind, User,
};
use crate::shared::Shared;
use crate::storage::Storage;

/// Envelope around one in-flight event.
pub struct Context {
    update: Update,
    api: Shared<dyn PlatformApi>,
    cancellation: CancellationToken,
    started_at: Instant,
    storage: Storage,
}

impl Context {
    /// Creates a context with a fresh cancellation scope.
    pub fn new(update: Update, api: Shared<dyn PlatformApi>) -> Self {
        Self::with_cancellation(update, api, CancellationToken::new())
    }

    /// Creates a context whose cancellation scope is a child of `parent`;
    /// cancelling the parent cancels this event too.
    pub fn with_cancellation(
        update: Update,
        api: Shared<dyn PlatformApi>,
        parent: CancellationToken,
    ) -> Self {
        Self {
            update,
            api,
            cancellation: parent.child_token(),
            started_at: Instant::now(),
            storage: Storage::new(),
        }
    }

    pub fn update(&self) -> &Update {
        &self.update
    }

    pub fn api(&self) -> &Shared<dyn PlatformApi> {
        &self.api
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    // ─── Cancellation ────────────────────────────────────────────────────

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Cancels this event's scope. Cooperative handlers observe it via
    /// [`cancelled`](Self::cancelled); the router will not start new
    /// handlers on a cancelled context.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Resolves when the event is cancelled.
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await;
    }

    // ─── Flat event queries ──────────────────────────────────────────────

    /// The message payload for every message-shaped branch.
    pub fn message(&self) -> Option<&Message> {
        match &self.update.kind {
            UpdateKind::Message(m)
            | UpdateKind::EditedMessage(m)
            | UpdateKind::ChannelPost(m)
            | UpdateKind::EditedChannelPost(m) => Some(m),
            _ => None,
        }
    }

    pub fn callback_query(&self) -> Option<&CallbackQuery> {
        match &self.update.kind {
            UpdateKind::CallbackQuery(q) => Some(q),
            _ => None,
        }
    }

    pub fn inline_query(&self) -> Option<&InlineQuery> {
        match &self.update.kind {
            UpdateKind::InlineQuery(q) => Some(q),
            _ => None,
        }
    }

    pub fn chosen_inline_result(&self) -> Option<&ChosenInlineResult> {
        match &self.update.kind {
            UpdateKind::ChosenInlineResult(r) => Some(r),
            _ => None,
        }
    }

    pub fn join_request(&self) -> Option<&ChatJoinRequest> {
        match &self.update.kind {
            UpdateKind::ChatJoinRequest(r) => Some(r),
            _ => None,
        }
    }

    pub fn member_update(&self) -> Option<&ChatMemberUpdated> {
        match &self.update.kind {
            UpdateKind::ChatMember(u) | UpdateKind::MyChatMember(u) => Some(u),
            _ => None,
        }
    }

    pub fn poll(&self) -> Option<&Poll> {
        match &self.update.kind {
            UpdateKind::Poll(p) => Some(p),
            _ => None,
        }
    }

    pub fn poll_answer(&self) -> Option<&PollAnswer> {
        match &self.update.kind {
            UpdateKind::PollAnswer(a) => Some(a),
            _ => None,
        }
    }

    /// The acting user, whatever shape the event has.
    pub fn user(&self) -> Option<&User> {
        match &self.update.kind {
            UpdateKind::Message(m)
            | UpdateKind::EditedMessage(m)
            | UpdateKind::ChannelPost(m)
            | UpdateKind::EditedChannelPost(m) => m.from.as_ref(),
            UpdateKind::CallbackQuery(q) => Some(&q.from),
            UpdateKind::InlineQuery(q) => Some(&q.from),
            UpdateKind::ChosenInlineResult(r) => Some(&r.from),
            UpdateKind::ChatJoinRequest(r) => Some(&r.from),
            UpdateKind::ChatMember(u) | UpdateKind::MyChatMember(u) => Some(&u.from),
            UpdateKind::PollAnswer(a) => Some(&a.user),
            UpdateKind::Poll(_) => None,
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user().map(|u| u.id)
    }

    pub fn username(&self) -> Option<&str> {
        self.user().and_then(|u| u.username.as_deref())
    }

    /// The chat the event happened in, when it has one.
    pub fn chat(&self) -> Option<&Chat> {
        match &self.update.kind {
            UpdateKind::Message(m)
            | UpdateKind::EditedMessage(m)
            | UpdateKind::ChannelPost(m)
            | UpdateKind::EditedChannelPost(m) => Some(&m.chat),
            UpdateKind::CallbackQuery(q) => q.message.as_ref().map(|m| &m.chat),
            UpdateKind::ChatJoinRequest(r) => Some(&r.chat),
            UpdateKind::ChatMember(u) | UpdateKind::MyChatMember(u) => Some(&u.chat),
            _ => None,
        }
    }

    pub fn chat_id(&self) -> Option<i64> {
        self.chat().map(|c| c.id)
    }

    pub fn chat_kind(&self) -> Option<ChatKind> {
        self.chat().map(|c| c.kind)
    }

    pub fn message_text(&self) -> Option<&str> {
        self.message().and_then(|m| m.text.as_deref())
    }

    pub fn caption(&self) -> Option<&str> {
        self.message().and_then(|m| m.caption.as_deref())
    }

    pub fn text_or_caption(&self) -> Option<&str> {
        self.message().and_then(|m| m.text_or_caption())
    }

    pub fn callback_data(&self) -> Option<&str> {
        self.callback_query().and_then(|q| q.data.as_deref())
    }

    // ─── Shape tests ─────────────────────────────────────────────────────

    pub fn is_message(&self) -> bool {
        self.message().is_some()
    }

    pub fn is_edited(&self) -> bool {
        matches!(
            self.update.kind,
            UpdateKind::EditedMessage(_) | UpdateKind::EditedChannelPost(_)
        )
    }

    pub fn is_channel_post(&self) -> bool {
        matches!(
            self.update.kind,
            UpdateKind::ChannelPost(_) | UpdateKind::EditedChannelPost(_)
        )
    }

    pub fn is_callback_query(&self) -> bool {
        matches!(self.update.kind, UpdateKind::CallbackQuery(_))
    }

    pub fn is_inline_query(&self) -> bool {
        matches!(self.update.kind, UpdateKind::InlineQuery(_))
    }

    /// Interactive events: button presses, inline queries and their chosen
    /// results, join requests.
    pub fn is_callback(&self) -> bool {
        matches!(
            self.update.kind,
            UpdateKind::CallbackQuery(_)
                | UpdateKind::InlineQuery(_)
                | UpdateKind::ChosenInlineResult(_)
                | UpdateKind::ChatJoinRequest(_)
        )
    }

    /// State-change notifications: membership updates, polls, members
    /// joining or leaving.
    pub fn is_notice(&self) -> bool {
        if matches!(
            self.update.kind,
            UpdateKind::ChatMember(_)
                | UpdateKind::MyChatMember(_)
                | UpdateKind::Poll(_)
                | UpdateKind::PollAnswer(_)
        ) {
            return true;
        }
        self.message()
            .is_some_and(|m| m.new_chat_members.is_some() || m.left_chat_member.is_some())
    }

    pub fn is_command(&self) -> bool {
        self.message().is_some_and(Message::is_command)
    }

    pub fn is_private(&self) -> bool {
        self.chat_kind() == Some(ChatKind::Private)
    }

    pub fn is_group(&self) -> bool {
        self.chat_kind() == Some(ChatKind::Group)
    }

    pub fn is_supergroup(&self) -> bool {
        self.chat_kind() == Some(ChatKind::Supergroup)
    }

    pub fn is_group_chat(&self) -> bool {
        matches!(
            self.chat_kind(),
            Some(ChatKind::Group) | Some(ChatKind::Supergroup)
        )
    }

    pub fn is_reply(&self) -> bool {
        self.message().is_some_and(|m| m.reply_to_message.is_some())
    }

    pub fn is_from_bot(&self) -> bool {
        self.user().is_some_and(|u| u.is_bot)
    }

    // ─── Outbound helpers ────────────────────────────────────────────────

    /// Sends `text` into the event's chat.
    pub async fn reply(&self, text: &str) -> Result<Message, ContextError> {
        let chat_id = self.chat_id().ok_or(ContextError::NoChat)?;
        Ok(self.api.send_message(chat_id, text).await?)
    }

    /// Sends `text` into an explicit chat.
    pub async fn send(&self, chat_id: i64, text: &str) -> ApiResult<Message> {
        self.api.send_message(chat_id, text).await
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("update_id", &self.update.update_id)
            .field("kind", &self.update.kind_name())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

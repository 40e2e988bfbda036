//! The platform-API contract.
//!
//! The runtime treats the platform client as an opaque collaborator: the core
//! depends only on the shape of [`Update`] and on the small surface below.
//! Concrete HTTP clients live outside this workspace; tests use in-process
//! doubles.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::event::{ChatMember, Message, Update};

/// Surface every platform adapter must expose.
///
/// # Offset convention
///
/// `offset` advances monotonically past the last consumed `update_id`. An
/// offset of `-1` asks for at most the single most recent pending update,
/// which the runtime uses at boot to discard history accumulated while the
/// process was offline.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Blocking long poll. Returns a (possibly empty) batch of updates once
    /// one is available or `timeout` elapses.
    async fn get_updates(
        &self,
        offset: i64,
        limit: u32,
        timeout: Duration,
    ) -> ApiResult<Vec<Update>>;

    /// Sends a text message into a chat.
    async fn send_message(&self, chat_id: i64, text: &str) -> ApiResult<Message>;

    /// Replaces the text of a previously sent message.
    async fn edit_message(&self, chat_id: i64, message_id: i64, text: &str) -> ApiResult<Message>;

    /// Deletes a previously sent message.
    async fn delete_message(&self, chat_id: i64, message_id: i64) -> ApiResult<()>;

    /// Acknowledges a callback query, optionally with a toast text.
    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> ApiResult<()>;

    /// Looks up a member's status inside a chat.
    async fn get_chat_member(&self, chat_id: i64, user_id: i64) -> ApiResult<ChatMember>;

    /// Fetches the raw bytes of a platform-hosted file.
    async fn get_file(&self, file_id: &str) -> ApiResult<Vec<u8>>;

    /// The bot's own username, without the leading `@`.
    ///
    /// Used to recognise `/command@botname` addressing.
    fn username(&self) -> &str;
}

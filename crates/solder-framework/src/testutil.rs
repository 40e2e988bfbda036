//! Shared helpers for the crate's unit tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use solder_core::{
    ApiError, ApiResult, CallbackQuery, Chat, ChatKind, ChatMember, Context, Message, PlatformApi,
    Shared, Update, UpdateKind, User,
};

pub(crate) struct NoopApi;

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
        "testbot"
    }
}

pub(crate) fn api() -> Shared<dyn PlatformApi> {
    Shared::from_arc(Arc::new(NoopApi))
}

pub(crate) fn user(id: i64) -> User {
    User {
        id,
        is_bot: false,
        first_name: format!("user{id}"),
        username: Some(format!("user{id}")),
    }
}

pub(crate) fn private_chat(id: i64) -> Chat {
    Chat {
        id,
        kind: ChatKind::Private,
        title: None,
        username: None,
    }
}

pub(crate) fn text_message(text: &str) -> Message {
    Message {
        message_id: 1,
        from: Some(user(1)),
        chat: private_chat(1),
        date: 0,
        text: Some(text.to_string()),
        caption: None,
        entities: Vec::new(),
        reply_to_message: None,
        new_chat_members: None,
        left_chat_member: None,
        pinned_message: None,
    }
}

pub(crate) fn message_ctx(text: &str) -> Context {
    let update = Update {
        update_id: 1,
        kind: UpdateKind::Message(text_message(text)),
    };
    Context::new(update, api())
}

pub(crate) fn caption_ctx(caption: &str) -> Context {
    let mut message = text_message("");
    message.text = None;
    message.caption = Some(caption.to_string());
    let update = Update {
        update_id: 1,
        kind: UpdateKind::Message(message),
    };
    Context::new(update, api())
}

pub(crate) fn callback_ctx(data: &str) -> Context {
    let update = Update {
        update_id: 1,
        kind: UpdateKind::CallbackQuery(CallbackQuery {
            id: "cb1".into(),
            from: user(1),
            message: Some(text_message("menu")),
            data: Some(data.to_string()),
        }),
    };
    Context::new(update, api())
}

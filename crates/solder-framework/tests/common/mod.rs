//! Test doubles shared by the integration suites.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use solder_core::{
    ApiError, ApiResult, CallbackQuery, Chat, ChatKind, ChatMember, Context, MemberStatus, Message,
    PlatformApi, Shared, Update, UpdateKind, User,
};

/// Records every outbound message; all other calls succeed trivially.
pub struct MockApi {
    pub sent: Mutex<Vec<(i64, String)>>,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent.lock().iter().map(|(_, t)| t.clone()).collect()
    }
}

#[async_trait]
impl PlatformApi for MockApi {
    async fn get_updates(
        &self,
        _offset: i64,
        _limit: u32,
        _timeout: Duration,
    ) -> ApiResult<Vec<Update>> {
        Ok(Vec::new())
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> ApiResult<Message> {
        self.sent.lock().push((chat_id, text.to_string()));
        Ok(message(100, chat_id, text))
    }

    async fn edit_message(&self, chat_id: i64, message_id: i64, text: &str) -> ApiResult<Message> {
        Ok(message(message_id, chat_id, text))
    }

    async fn delete_message(&self, _chat_id: i64, _message_id: i64) -> ApiResult<()> {
        Ok(())
    }

    async fn answer_callback(&self, _callback_id: &str, _text: Option<&str>) -> ApiResult<()> {
        Ok(())
    }

    async fn get_chat_member(&self, _chat_id: i64, user_id: i64) -> ApiResult<ChatMember> {
        Ok(ChatMember {
            user: user(user_id),
            status: MemberStatus::Member,
        })
    }

    async fn get_file(&self, _file_id: &str) -> ApiResult<Vec<u8>> {
        Err(ApiError::Decode("mock api hosts no files".into()))
    }

    fn username(&self) -> &str {
        "mockbot"
    }
}

pub fn user(id: i64) -> User {
    User {
        id,
        is_bot: false,
        first_name: format!("user{id}"),
        username: Some(format!("user{id}")),
    }
}

pub fn message(message_id: i64, chat_id: i64, text: &str) -> Message {
    Message {
        message_id,
        from: Some(user(1)),
        chat: Chat {
            id: chat_id,
            kind: ChatKind::Private,
            title: None,
            username: None,
        },
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

pub fn text_update(update_id: i64, text: &str) -> Update {
    Update {
        update_id,
        kind: UpdateKind::Message(message(update_id, 1, text)),
    }
}

/// A text update from a specific user id.
pub fn text_update_from(update_id: i64, user_id: i64, text: &str) -> Update {
    let mut msg = message(update_id, 1, text);
    msg.from = Some(user(user_id));
    Update {
        update_id,
        kind: UpdateKind::Message(msg),
    }
}

pub fn callback_update(update_id: i64, data: &str) -> Update {
    Update {
        update_id,
        kind: UpdateKind::CallbackQuery(CallbackQuery {
            id: format!("cb{update_id}"),
            from: user(1),
            message: Some(message(update_id, 1, "menu")),
            data: Some(data.to_string()),
        }),
    }
}

pub fn shared_api(api: Arc<MockApi>) -> Shared<dyn PlatformApi> {
    Shared::from_arc(api)
}

pub fn message_ctx(text: &str) -> Arc<Context> {
    Arc::new(Context::new(text_update(1, text), shared_api(MockApi::new())))
}

pub fn message_ctx_from(user_id: i64, text: &str) -> Arc<Context> {
    Arc::new(Context::new(
        text_update_from(1, user_id, text),
        shared_api(MockApi::new()),
    ))
}

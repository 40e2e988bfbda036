//! Event model for the Solder framework.
//!
//! One [`Update`] is pulled from the platform per event. Its payload is a
//! tagged union ([`UpdateKind`]) with exactly one active branch; the
//! [`Context`](crate::context::Context) accessors flatten the union into
//! simple queries so rules and handlers rarely need to match on it directly.

use serde::{Deserialize, Serialize};

/// One message-like object pulled from the platform source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    /// Monotonically increasing identifier assigned by the platform.
    pub update_id: i64,
    /// The event payload.
    #[serde(flatten)]
    pub kind: UpdateKind,
}

impl Update {
    /// Short name of the active payload branch, for logging.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            UpdateKind::Message(_) => "message",
            UpdateKind::EditedMessage(_) => "edited_message",
            UpdateKind::ChannelPost(_) => "channel_post",
            UpdateKind::EditedChannelPost(_) => "edited_channel_post",
            UpdateKind::CallbackQuery(_) => "callback_query",
            UpdateKind::InlineQuery(_) => "inline_query",
            UpdateKind::ChosenInlineResult(_) => "chosen_inline_result",
            UpdateKind::ChatJoinRequest(_) => "chat_join_request",
            UpdateKind::ChatMember(_) => "chat_member",
            UpdateKind::MyChatMember(_) => "my_chat_member",
            UpdateKind::Poll(_) => "poll",
            UpdateKind::PollAnswer(_) => "poll_answer",
        }
    }
}

/// The discriminated event payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    /// A new chat message (private, group, or supergroup).
    Message(Message),
    /// A previously sent message was edited.
    EditedMessage(Message),
    /// A new post in a channel.
    ChannelPost(Message),
    /// A channel post was edited.
    EditedChannelPost(Message),
    /// An inline-keyboard button was pressed.
    CallbackQuery(CallbackQuery),
    /// An inline query was typed at the bot.
    InlineQuery(InlineQuery),
    /// A result of an inline query was chosen.
    ChosenInlineResult(ChosenInlineResult),
    /// A user asked to join a chat that requires approval.
    ChatJoinRequest(ChatJoinRequest),
    /// A chat member's status changed.
    ChatMember(ChatMemberUpdated),
    /// The bot's own status in a chat changed.
    MyChatMember(ChatMemberUpdated),
    /// A poll state changed.
    Poll(Poll),
    /// A user answered a poll.
    PollAnswer(PollAnswer),
}

/// A chat message or channel post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    /// Absent for channel posts.
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub text: Option<String>,
    /// Caption of a media message; text rules match on it as well.
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub entities: Vec<MessageEntity>,
    #[serde(default)]
    pub reply_to_message: Option<Box<Message>>,
    #[serde(default)]
    pub new_chat_members: Option<Vec<User>>,
    #[serde(default)]
    pub left_chat_member: Option<User>,
    #[serde(default)]
    pub pinned_message: Option<Box<Message>>,
}

impl Message {
    /// Text of the message, falling back to the media caption.
    pub fn text_or_caption(&self) -> Option<&str> {
        self.text.as_deref().or(self.caption.as_deref())
    }

    /// Whether this message starts with a bot command.
    ///
    /// Prefers the platform's entity annotation; when no entities were
    /// attached, falls back to a leading `/` in the text.
    pub fn is_command(&self) -> bool {
        if self
            .entities
            .iter()
            .any(|e| e.kind == EntityKind::BotCommand && e.offset == 0)
        {
            return true;
        }
        self.entities.is_empty() && self.text.as_deref().is_some_and(|t| t.starts_with('/'))
    }
}

/// A platform user or bot account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// The conversation an event belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ChatKind,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Chat flavor as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

/// A span of special meaning inside message text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEntity {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub offset: usize,
    pub length: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    BotCommand,
    Mention,
    Hashtag,
    Url,
    #[serde(other)]
    Other,
}

/// An inline-keyboard button press.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    /// The message the pressed keyboard was attached to, if still available.
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

/// An inline query typed at the bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineQuery {
    pub id: String,
    pub from: User,
    pub query: String,
    #[serde(default)]
    pub offset: String,
}

/// A chosen inline-query result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChosenInlineResult {
    pub result_id: String,
    pub from: User,
    pub query: String,
}

/// A pending request to join a gated chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatJoinRequest {
    pub chat: Chat,
    pub from: User,
    #[serde(default)]
    pub date: i64,
}

/// A change in someone's membership status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMemberUpdated {
    pub chat: Chat,
    pub from: User,
    pub old_status: MemberStatus,
    pub new_status: MemberStatus,
}

/// Membership status inside a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
}

/// A chat member as returned by member queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMember {
    pub user: User,
    pub status: MemberStatus,
}

/// A poll attached to a message or broadcast on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub options: Vec<PollOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollOption {
    pub text: String,
    #[serde(default)]
    pub voter_count: i64,
}

/// A user's answer in a poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollAnswer {
    pub poll_id: String,
    pub user: User,
    #[serde(default)]
    pub option_ids: Vec<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_round_trips_through_tagged_union() {
        let json = r#"{
            "update_id": 42,
            "message": {
                "message_id": 7,
                "from": {"id": 1, "first_name": "mira"},
                "chat": {"id": 10, "type": "private"},
                "text": "/echo hi"
            }
        }"#;

        let update: Update = serde_json::from_str(json).unwrap();
        assert_eq!(update.update_id, 42);
        let UpdateKind::Message(msg) = &update.kind else {
            panic!("expected message branch");
        };
        assert_eq!(msg.text.as_deref(), Some("/echo hi"));
        assert_eq!(msg.chat.kind, ChatKind::Private);
        assert!(msg.is_command());
    }

    #[test]
    fn entity_annotation_wins_over_leading_slash() {
        let msg = Message {
            message_id: 1,
            from: None,
            chat: Chat {
                id: 1,
                kind: ChatKind::Group,
                title: None,
                username: None,
            },
            date: 0,
            text: Some("not a command /later".into()),
            caption: None,
            entities: vec![MessageEntity {
                kind: EntityKind::BotCommand,
                offset: 14,
                length: 6,
            }],
            reply_to_message: None,
            new_chat_members: None,
            left_chat_member: None,
            pinned_message: None,
        };
        assert!(!msg.is_command());
    }
}

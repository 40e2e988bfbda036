//! Echo bot against a scripted platform stub.
//!
//! No network involved: `ScriptedApi` serves two update batches and then
//! asks the runtime to shut down, so `cargo run -p echo_bot` shows one full
//! pass through the pipeline — command routing, keyword matching, rate
//! limiting, and the reply path.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use solder::prelude::*;
use solder::{ApiError, Chat, ChatMember, ContextError, MemberStatus};

struct ScriptedApi {
    batches: Mutex<VecDeque<Vec<Update>>>,
    done: CancellationToken,
}

impl ScriptedApi {
    fn new(batches: Vec<Vec<Update>>, done: CancellationToken) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            done,
        }
    }
}

#[async_trait]
impl PlatformApi for ScriptedApi {
    async fn get_updates(
        &self,
        offset: i64,
        _limit: u32,
        _timeout: Duration,
    ) -> ApiResult<Vec<Update>> {
        // History probe at boot: nothing pending.
        if offset < 0 {
            return Ok(Vec::new());
        }
        let batch = self.batches.lock().pop_front();
        match batch {
            Some(batch) => Ok(batch),
            None => {
                // Script exhausted: let in-flight events settle, then stop.
                tokio::time::sleep(Duration::from_millis(200)).await;
                self.done.cancel();
                Ok(Vec::new())
            }
        }
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> ApiResult<Message> {
        tracing::info!(chat_id, reply = text, "bot sent a message");
        Ok(message(9000, chat_id, text))
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
        Err(ApiError::Decode("scripted api hosts no files".into()))
    }

    fn username(&self) -> &str {
        "echodemo_bot"
    }
}

fn user(id: i64) -> User {
    User {
        id,
        is_bot: false,
        first_name: format!("demo{id}"),
        username: Some(format!("demo{id}")),
    }
}

fn message(message_id: i64, chat_id: i64, text: &str) -> Message {
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

fn text_update(update_id: i64, text: &str) -> Update {
    Update {
        update_id,
        kind: UpdateKind::Message(message(update_id, 1, text)),
    }
}

async fn echo(ctx: Shared<Context>, cmd: CommandContext) -> Result<(), ContextError> {
    ctx.reply(&cmd.args.join(" ")).await?;
    Ok(())
}

async fn pong(ctx: Shared<Context>) -> Result<(), ContextError> {
    ctx.reply("pong").await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    LoggingBuilder::new().directive("info").init();

    let script = vec![
        vec![
            text_update(1, "/echo hello world"),
            text_update(2, "/echo@echodemo_bot addressed"),
        ],
        vec![text_update(3, "ping"), text_update(4, "just chatting")],
    ];

    let config = BotConfig {
        token: "demo:token".into(),
        poll_timeout_secs: 1,
        ..BotConfig::default()
    };

    // Wire the stub's completion signal to the runtime's shutdown token.
    let done = CancellationToken::new();
    let api: Shared<dyn PlatformApi> =
        Shared::from_arc(Arc::new(ScriptedApi::new(script, done.clone())));

    let runtime = Runtime::new(api, config)
        .with_middleware(Arc::new(RecoveryMiddleware::new()))
        .with_middleware(Arc::new(LoggingMiddleware::new()))
        .with_middleware(Arc::new(RateLimitMiddleware::new(
            10,
            Duration::from_secs(60),
        )));

    let shutdown = runtime.shutdown_token();
    tokio::spawn(async move {
        done.cancelled().await;
        shutdown.cancel();
    });

    let echo_plugin = PluginBuilder::new("echo", "Echo")
        .description("replies with whatever follows /echo")
        .matcher(on_command(["/echo"], false, handler(echo)).with_priority(20))
        .build();

    let ping_plugin = PluginBuilder::new("ping", "Ping")
        .description("answers ping with pong")
        .matcher(on_full_match(["ping"], handler(pong)))
        .build();

    runtime
        .registry()
        .register_plugins([echo_plugin, ping_plugin])
        .await
        .expect("plugin registration");

    runtime.run().await;
}

//! Core engine for the Solder bot framework.
//!
//! This crate holds the platform-independent foundation:
//!
//! - [`event`] – the [`Update`](event::Update) tagged union and its records
//! - [`api`] – the [`PlatformApi`](api::PlatformApi) contract the runtime
//!   long-polls against
//! - [`context`] – the per-event [`Context`](context::Context) envelope
//! - [`storage`] – concurrency-safe per-event key/value storage
//! - [`predicate`] – the rule/permission algebra with `all` / `any` / `not`
//! - [`shared`] – the [`Shared<T>`](shared::Shared) cheap-clone handle
//!
//! Everything event-routing and dependency-injection related lives one layer
//! up in `solder-framework`.

pub mod api;
pub mod context;
pub mod error;
pub mod event;
pub mod predicate;
pub mod shared;
pub mod storage;

pub use api::PlatformApi;
pub use context::Context;
pub use error::{ApiError, ApiResult, ContextError};
pub use event::{
    CallbackQuery, Chat, ChatJoinRequest, ChatKind, ChatMember, ChatMemberUpdated,
    ChosenInlineResult, EntityKind, InlineQuery, MemberStatus, Message, MessageEntity, Poll,
    PollAnswer, PollOption, Update, UpdateKind, User,
};
pub use predicate::{Permission, Predicate, Rule, all, any, not, predicate};
pub use shared::Shared;
pub use storage::{PLUGIN_NAME, Storage};

//! Permission helpers.
//!
//! Permissions are the authorization brand of the predicate algebra: they
//! look at *who* is acting rather than *what* was said. Like all predicates
//! they must stay pure queries of the [`Context`] — anything that needs a
//! platform call (chat-member roles, for instance) belongs in a handler or a
//! middleware that stashes its verdict in [`Storage`](solder_core::Storage).

use std::collections::HashSet;

use solder_core::{Context, Permission, predicate};

/// Allows every principal. The implicit default of a matcher without an
/// explicit permission.
pub fn everyone() -> Permission {
    predicate(|_| true)
}

/// Allows only the configured user ids.
pub fn super_user<I>(user_ids: I) -> Permission
where
    I: IntoIterator<Item = i64>,
{
    let allowed: HashSet<i64> = user_ids.into_iter().collect();
    predicate(move |ctx| ctx.user_id().is_some_and(|id| allowed.contains(&id)))
}

/// Allows events arriving in a private chat.
pub fn private_chat() -> Permission {
    predicate(Context::is_private)
}

/// Allows events arriving in a group or supergroup.
pub fn group_chat() -> Permission {
    predicate(Context::is_group_chat)
}

/// Allows channel posts.
pub fn channel_post() -> Permission {
    predicate(Context::is_channel_post)
}

/// Rejects events sent by bot accounts.
pub fn not_bot() -> Permission {
    predicate(|ctx| !ctx.is_from_bot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{callback_ctx, message_ctx};
    use solder_core::Predicate;

    #[test]
    fn everyone_always_allows() {
        assert!(everyone().matches(&message_ctx("hi")));
        assert!(everyone().matches(&callback_ctx("x")));
    }

    #[test]
    fn super_user_checks_sender_id() {
        let ctx = message_ctx("hi"); // sender id 1
        assert!(super_user([1, 42]).matches(&ctx));
        assert!(!super_user([42]).matches(&ctx));
        assert!(!super_user([]).matches(&ctx));
    }

    #[test]
    fn chat_shape_permissions() {
        let ctx = message_ctx("hi"); // private chat
        assert!(private_chat().matches(&ctx));
        assert!(!group_chat().matches(&ctx));
        assert!(not_bot().matches(&ctx));
    }
}

//! Matchers: the selection and invocation unit of the router.
//!
//! A [`Matcher`] bundles a rule, a permission, a priority, a block flag, and
//! one or more handlers. The router walks matchers in priority order
//! (descending, ties in registration order); a matcher whose rule and
//! permission both pass claims the event for its handlers, and a blocking
//! matcher stops propagation afterwards.

use std::sync::{Arc, OnceLock, Weak};

use solder_core::{Context, Permission, Predicate, Rule, all, any};

use crate::container::Container;
use crate::error::DispatchError;
use crate::handler::Handler;
use crate::plugin::Plugin;

/// Default priority assigned by [`Matcher::new`].
pub const DEFAULT_PRIORITY: i32 = 10;

/// Back-reference to the plugin that contributed a matcher.
///
/// Set by the registry during registration. Purely a lookup relation — the
/// weak handle never keeps a plugin alive.
#[derive(Clone)]
pub struct OwnerTag {
    name: String,
    plugin: Weak<dyn Plugin>,
}

impl OwnerTag {
    pub(crate) fn new(name: String, plugin: Weak<dyn Plugin>) -> Self {
        Self { name, plugin }
    }

    /// Display name of the owning plugin.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Upgrades to the owning plugin, when it is still registered.
    pub fn plugin(&self) -> Option<Arc<dyn Plugin>> {
        self.plugin.upgrade()
    }
}

/// Rule + permission + priority + block flag + handlers.
pub struct Matcher {
    rule: Option<Rule>,
    permission: Option<Permission>,
    priority: i32,
    block: bool,
    handlers: Vec<Handler>,
    owner: OnceLock<OwnerTag>,
}

impl Matcher {
    /// A matcher guarded by `rule`, with default priority, non-blocking, and
    /// no explicit permission (which admits everyone).
    pub fn new(rule: Rule, handler: Handler) -> Self {
        Self {
            rule: Some(rule),
            permission: None,
            priority: DEFAULT_PRIORITY,
            block: false,
            handlers: vec![handler],
            owner: OnceLock::new(),
        }
    }

    /// A matcher with no rule at all; it claims every event its permission
    /// admits.
    pub fn catch_all(handler: Handler) -> Self {
        Self {
            rule: None,
            permission: None,
            priority: DEFAULT_PRIORITY,
            block: false,
            handlers: vec![handler],
            owner: OnceLock::new(),
        }
    }

    /// Higher priorities run first.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// A blocking matcher stops event propagation after it runs, whether its
    /// handlers succeeded or not.
    pub fn with_block(mut self, block: bool) -> Self {
        self.block = block;
        self
    }

    /// Replaces the permission.
    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = Some(permission);
        self
    }

    /// Conjoins another rule: both must now pass.
    pub fn and_rule(mut self, rule: Rule) -> Self {
        self.rule = Some(match self.rule.take() {
            Some(existing) => all([existing, rule]),
            None => rule,
        });
        self
    }

    /// Disjoins another permission: either may now admit the principal.
    pub fn or_permission(mut self, permission: Permission) -> Self {
        self.permission = Some(match self.permission.take() {
            Some(existing) => any([existing, permission]),
            None => permission,
        });
        self
    }

    /// Appends a handler; handlers run in insertion order.
    pub fn with_handler(mut self, handler: Handler) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn is_blocking(&self) -> bool {
        self.block
    }

    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }

    /// The owning plugin's tag, once registered.
    pub fn owner(&self) -> Option<&OwnerTag> {
        self.owner.get()
    }

    /// Binds the owner tag. First binding wins; re-registration of the same
    /// matcher instance keeps the original owner.
    pub(crate) fn bind_owner(&self, tag: OwnerTag) {
        let _ = self.owner.set(tag);
    }

    /// Rule ∧ permission; an absent predicate passes.
    pub fn matches(&self, ctx: &Context) -> bool {
        if let Some(rule) = &self.rule
            && !rule.matches(ctx)
        {
            return false;
        }
        if let Some(permission) = &self.permission
            && !permission.matches(ctx)
        {
            return false;
        }
        true
    }

    /// Runs every handler in order against the global container; the first
    /// handler error stops the remaining handlers and is returned.
    pub async fn call(&self, ctx: &Arc<Context>, global: &Container) -> Result<(), DispatchError> {
        self.call_with(ctx, global, None).await
    }

    /// [`call`](Self::call) with an extra override container that outranks
    /// both the handler containers and the global one.
    pub async fn call_with(
        &self,
        ctx: &Arc<Context>,
        global: &Container,
        overrides: Option<&Container>,
    ) -> Result<(), DispatchError> {
        for handler in &self.handlers {
            handler.call(ctx, global, overrides).await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher")
            .field("priority", &self.priority)
            .field("block", &self.block)
            .field("handlers", &self.handlers.len())
            .field("owner", &self.owner.get().map(|t| t.name().to_string()))
            .finish()
    }
}

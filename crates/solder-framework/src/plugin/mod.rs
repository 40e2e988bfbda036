//! Plugins: named bundles of matchers with optional lifecycle hooks.
//!
//! A plugin implements [`Plugin`]: required metadata and matcher list, plus
//! optional capabilities as default-implemented hooks (the trait-object
//! rendition of optional interfaces). The [`PluginRegistry`] drives the
//! lifecycle: Init → Load → Validate at registration, Unload at removal.
//!
//! Small plugins can skip the boilerplate with [`PluginBuilder`]:
//!
//! ```rust,ignore
//! let plugin = PluginBuilder::new("echo", "Echo")
//!     .description("replies with its arguments")
//!     .matcher(on_command(["/echo"], false, handler(echo)))
//!     .build();
//! registry.register_plugins([plugin]).await?;
//! ```

pub mod registry;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PluginError;
use crate::matcher::Matcher;

pub use registry::PluginRegistry;

/// Free-form plugin configuration, keyed by option name.
pub type ConfigMap = HashMap<String, serde_json::Value>;

/// Descriptive metadata attached to every plugin.
#[derive(Debug, Clone, Default)]
pub struct PluginInfo {
    /// Unique identifier within a registry. Required.
    pub id: String,
    /// Unique display name within a registry. Required.
    pub name: String,
    pub description: String,
    pub version: String,
    pub author: String,
    pub usage: String,
    pub examples: Vec<String>,
    /// Optional grouping key for registry lookups.
    pub group: String,
    /// Anything else a plugin wants to expose.
    pub extra: HashMap<String, serde_json::Value>,
}

impl PluginInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A named unit of bot behavior.
///
/// `matchers()` is called exactly once, at registration; the returned
/// matchers are the plugin's routable surface until it is unregistered.
#[async_trait]
pub trait Plugin: Send + Sync + 'static {
    fn info(&self) -> &PluginInfo;

    fn matchers(&self) -> Vec<Arc<Matcher>>;

    /// First lifecycle hook, before [`load`](Self::load).
    async fn init(&self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Second lifecycle hook; acquire resources here.
    async fn load(&self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Third lifecycle hook; a failed validation aborts registration.
    async fn validate(&self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called on removal and registry teardown. Errors are logged, never
    /// fatal.
    async fn unload(&self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Admin-triggered liveness probe.
    async fn health_check(&self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Applies configuration. The default declines, which the registry
    /// reports as "does not accept configuration".
    fn set_config(&self, _config: ConfigMap) -> Result<(), PluginError> {
        Err(PluginError::Unsupported)
    }

    fn get_config(&self) -> ConfigMap {
        ConfigMap::new()
    }
}

type HookFn = Arc<dyn Fn() -> Result<(), PluginError> + Send + Sync>;

/// Builder for plugins that need no custom state.
pub struct PluginBuilder {
    info: PluginInfo,
    matchers: Vec<Arc<Matcher>>,
    on_init: Option<HookFn>,
    on_load: Option<HookFn>,
    on_validate: Option<HookFn>,
    on_unload: Option<HookFn>,
}

impl PluginBuilder {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            info: PluginInfo::new(id, name),
            matchers: Vec::new(),
            on_init: None,
            on_load: None,
            on_validate: None,
            on_unload: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.info.description = description.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.info.version = version.into();
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.info.author = author.into();
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.info.usage = usage.into();
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.info.group = group.into();
        self
    }

    pub fn matcher(mut self, matcher: Matcher) -> Self {
        self.matchers.push(Arc::new(matcher));
        self
    }

    pub fn on_init<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<(), PluginError> + Send + Sync + 'static,
    {
        self.on_init = Some(Arc::new(f));
        self
    }

    pub fn on_load<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<(), PluginError> + Send + Sync + 'static,
    {
        self.on_load = Some(Arc::new(f));
        self
    }

    pub fn on_validate<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<(), PluginError> + Send + Sync + 'static,
    {
        self.on_validate = Some(Arc::new(f));
        self
    }

    pub fn on_unload<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<(), PluginError> + Send + Sync + 'static,
    {
        self.on_unload = Some(Arc::new(f));
        self
    }

    pub fn build(self) -> Arc<dyn Plugin> {
        Arc::new(BuiltPlugin {
            info: self.info,
            matchers: self.matchers,
            on_init: self.on_init,
            on_load: self.on_load,
            on_validate: self.on_validate,
            on_unload: self.on_unload,
        })
    }
}

struct BuiltPlugin {
    info: PluginInfo,
    matchers: Vec<Arc<Matcher>>,
    on_init: Option<HookFn>,
    on_load: Option<HookFn>,
    on_validate: Option<HookFn>,
    on_unload: Option<HookFn>,
}

fn run_hook(hook: &Option<HookFn>) -> Result<(), PluginError> {
    match hook {
        Some(f) => f(),
        None => Ok(()),
    }
}

#[async_trait]
impl Plugin for BuiltPlugin {
    fn info(&self) -> &PluginInfo {
        &self.info
    }

    fn matchers(&self) -> Vec<Arc<Matcher>> {
        self.matchers.clone()
    }

    async fn init(&self) -> Result<(), PluginError> {
        run_hook(&self.on_init)
    }

    async fn load(&self) -> Result<(), PluginError> {
        run_hook(&self.on_load)
    }

    async fn validate(&self) -> Result<(), PluginError> {
        run_hook(&self.on_validate)
    }

    async fn unload(&self) -> Result<(), PluginError> {
        run_hook(&self.on_unload)
    }
}

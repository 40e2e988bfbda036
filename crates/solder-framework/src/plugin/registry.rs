//! Plugin registry: lifecycle, indexes, and matcher aggregation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use solder_core::Shared;

use crate::error::{PluginError, RegistryError};
use crate::matcher::{Matcher, OwnerTag};
use crate::plugin::{ConfigMap, Plugin};
use crate::provider::Provided;
use crate::resolver::Dependency;

#[derive(Default)]
struct Inner {
    by_id: HashMap<String, Arc<dyn Plugin>>,
    /// name → id
    names: HashMap<String, String>,
    /// group → ids, in registration order
    groups: HashMap<String, Vec<String>>,
    /// Global matcher list, priority-descending, stable on ties.
    matchers: Vec<Arc<Matcher>>,
    matchers_by_plugin: HashMap<String, Vec<Arc<Matcher>>>,
}

/// Holds every registered plugin for the lifetime of the process.
///
/// Read per event (matcher snapshots), written rarely (startup, admin
/// operations); an async reader-writer lock covers both.
#[derive(Default)]
pub struct PluginRegistry {
    inner: RwLock<Inner>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a batch of plugins atomically.
    ///
    /// The whole batch is validated first — empty ids or names and
    /// duplicates (against the registry or within the batch) fail before any
    /// side effect. Then every plugin runs Init → Load → Validate; any hook
    /// failure aborts the call before a single plugin is inserted, so a
    /// failed batch leaves no index entry and no routable matcher behind.
    pub async fn register_plugins<I>(&self, plugins: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = Arc<dyn Plugin>>,
    {
        let plugins: Vec<Arc<dyn Plugin>> = plugins.into_iter().collect();
        let mut inner = self.inner.write().await;

        let mut batch_ids = HashSet::new();
        let mut batch_names = HashSet::new();
        for plugin in &plugins {
            let info = plugin.info();
            if info.id.is_empty() {
                return Err(RegistryError::EmptyId);
            }
            if info.name.is_empty() {
                return Err(RegistryError::EmptyName(info.id.clone()));
            }
            if inner.by_id.contains_key(&info.id) || !batch_ids.insert(info.id.clone()) {
                warn!(plugin = %info.id, "duplicate plugin id rejected");
                return Err(RegistryError::DuplicateId(info.id.clone()));
            }
            if inner.names.contains_key(&info.name) || !batch_names.insert(info.name.clone()) {
                warn!(plugin = %info.name, "duplicate plugin name rejected");
                return Err(RegistryError::DuplicateName(info.name.clone()));
            }
        }

        for plugin in &plugins {
            let id = plugin.info().id.clone();
            let lifecycle = |stage| {
                let plugin = id.clone();
                move |source| RegistryError::Lifecycle {
                    plugin,
                    stage,
                    source,
                }
            };
            plugin.init().await.map_err(lifecycle("init"))?;
            plugin.load().await.map_err(lifecycle("load"))?;
            plugin.validate().await.map_err(lifecycle("validate"))?;
        }

        let mut added = 0usize;
        for plugin in plugins {
            let info = plugin.info().clone();
            let matchers = plugin.matchers();
            let tag = OwnerTag::new(info.name.clone(), Arc::downgrade(&plugin));
            for matcher in &matchers {
                matcher.bind_owner(tag.clone());
            }

            inner.by_id.insert(info.id.clone(), plugin);
            inner.names.insert(info.name.clone(), info.id.clone());
            if !info.group.is_empty() {
                inner
                    .groups
                    .entry(info.group.clone())
                    .or_default()
                    .push(info.id.clone());
            }
            added += matchers.len();
            inner.matchers.extend(matchers.iter().cloned());
            inner.matchers_by_plugin.insert(info.id.clone(), matchers);

            info!(
                plugin = %info.id,
                name = %info.name,
                version = %info.version,
                group = %info.group,
                "plugin registered"
            );
        }

        // Higher priority first; the stable sort keeps registration order on
        // ties, which the router's tie-breaking guarantee relies on.
        inner
            .matchers
            .sort_by_key(|m| std::cmp::Reverse(m.priority()));

        if added > 0 {
            info!(matchers = added, "matchers registered");
        }
        Ok(())
    }

    /// Removes a plugin and its matchers, then calls its `unload` hook.
    /// An unload error is logged but does not undo the removal.
    pub async fn unregister_plugin(&self, id: &str) -> Result<(), RegistryError> {
        let plugin = {
            let mut inner = self.inner.write().await;
            let Some(plugin) = inner.by_id.remove(id) else {
                return Err(RegistryError::UnknownPlugin(id.to_string()));
            };

            let info = plugin.info();
            inner.names.remove(&info.name);
            if !info.group.is_empty() {
                let now_empty = inner
                    .groups
                    .get_mut(&info.group)
                    .map(|members| {
                        members.retain(|member| member != id);
                        members.is_empty()
                    })
                    .unwrap_or(false);
                if now_empty {
                    inner.groups.remove(&info.group);
                }
            }

            let removed = inner.matchers_by_plugin.remove(id).unwrap_or_default();
            inner
                .matchers
                .retain(|m| !removed.iter().any(|r| Arc::ptr_eq(m, r)));

            info!(plugin = %id, "plugin unregistered");
            plugin
        };

        if let Err(e) = plugin.unload().await {
            error!(plugin = %id, error = %e, "plugin unload failed");
        }
        Ok(())
    }

    /// Unloads every plugin; used at registry teardown.
    pub async fn unload_all(&self) {
        let ids: Vec<String> = self.inner.read().await.by_id.keys().cloned().collect();
        for id in ids {
            if let Err(e) = self.unregister_plugin(&id).await {
                error!(plugin = %id, error = %e, "teardown unregister failed");
            }
        }
    }

    pub async fn get(&self, id: &str) -> Option<Arc<dyn Plugin>> {
        self.inner.read().await.by_id.get(id).cloned()
    }

    pub async fn get_by_name(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        let inner = self.inner.read().await;
        let id = inner.names.get(name)?;
        inner.by_id.get(id).cloned()
    }

    pub async fn group(&self, group: &str) -> Vec<Arc<dyn Plugin>> {
        let inner = self.inner.read().await;
        inner
            .groups
            .get(group)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.by_id.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Snapshot of all registered plugins.
    pub async fn plugins(&self) -> Vec<Arc<dyn Plugin>> {
        self.inner.read().await.by_id.values().cloned().collect()
    }

    pub async fn plugin_count(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    /// Copy of the global matcher list, priority-descending. The router
    /// dispatches against this snapshot, so unregistering mid-event is safe.
    pub async fn matcher_snapshot(&self) -> Vec<Arc<Matcher>> {
        self.inner.read().await.matchers.clone()
    }

    /// Runs every plugin's health probe; the lock is released before any
    /// hook runs.
    pub async fn health_check_all(&self) -> HashMap<String, Result<(), PluginError>> {
        let plugins: Vec<(String, Arc<dyn Plugin>)> = {
            let inner = self.inner.read().await;
            inner
                .by_id
                .iter()
                .map(|(id, p)| (id.clone(), p.clone()))
                .collect()
        };

        let mut report = HashMap::with_capacity(plugins.len());
        for (id, plugin) in plugins {
            report.insert(id, plugin.health_check().await);
        }
        report
    }

    /// Applies configuration to one plugin and re-validates it.
    pub async fn configure_plugin(&self, id: &str, config: ConfigMap) -> Result<(), RegistryError> {
        let plugin = self
            .get(id)
            .await
            .ok_or_else(|| RegistryError::UnknownPlugin(id.to_string()))?;

        match plugin.set_config(config) {
            Ok(()) => {}
            Err(PluginError::Unsupported) => {
                return Err(RegistryError::ConfigUnsupported(id.to_string()));
            }
            Err(source) => {
                return Err(RegistryError::Lifecycle {
                    plugin: id.to_string(),
                    stage: "configure",
                    source,
                });
            }
        }

        plugin
            .validate()
            .await
            .map_err(|source| RegistryError::Lifecycle {
                plugin: id.to_string(),
                stage: "validate",
                source,
            })?;

        info!(plugin = %id, "plugin reconfigured");
        Ok(())
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry").finish_non_exhaustive()
    }
}

// Handlers may depend on the registry itself (help/admin plugins list their
// peers this way).
impl Dependency for Shared<PluginRegistry> {
    fn from_provided(provided: &Provided) -> Option<Self> {
        provided.exact::<Shared<PluginRegistry>>()
    }
}

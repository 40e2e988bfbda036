//! Plugin registry: uniqueness, lifecycle order, atomic batches, teardown.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use solder_core::predicate;
use solder_framework::{
    Matcher, Plugin, PluginBuilder, PluginError, PluginInfo, PluginRegistry, RegistryError,
    handler,
};

fn noop_matcher() -> Matcher {
    Matcher::new(predicate(|_| true), handler(|| async {}))
}

#[tokio::test]
async fn rejects_duplicate_ids_and_names() {
    let registry = PluginRegistry::new();
    registry
        .register_plugins([PluginBuilder::new("a", "Alpha").build()])
        .await
        .unwrap();

    let err = registry
        .register_plugins([PluginBuilder::new("a", "Other").build()])
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateId(id) if id == "a"));

    let err = registry
        .register_plugins([PluginBuilder::new("b", "Alpha").build()])
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateName(name) if name == "Alpha"));

    // Duplicates within one batch are caught too.
    let err = registry
        .register_plugins([
            PluginBuilder::new("c", "Gamma").build(),
            PluginBuilder::new("c", "Delta").build(),
        ])
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateId(id) if id == "c"));

    assert_eq!(registry.plugin_count().await, 1);
}

#[tokio::test]
async fn rejects_empty_metadata() {
    let registry = PluginRegistry::new();

    let err = registry
        .register_plugins([PluginBuilder::new("", "Nameless").build()])
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::EmptyId));

    let err = registry
        .register_plugins([PluginBuilder::new("id", "").build()])
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::EmptyName(id) if id == "id"));
}

#[tokio::test]
async fn lifecycle_hooks_run_in_order() {
    let calls = Arc::new(Mutex::new(Vec::new()));

    let plugin = {
        let init = calls.clone();
        let load = calls.clone();
        let validate = calls.clone();
        PluginBuilder::new("ordered", "Ordered")
            .on_init(move || {
                init.lock().push("init");
                Ok(())
            })
            .on_load(move || {
                load.lock().push("load");
                Ok(())
            })
            .on_validate(move || {
                validate.lock().push("validate");
                Ok(())
            })
            .build()
    };

    PluginRegistry::new()
        .register_plugins([plugin])
        .await
        .unwrap();
    assert_eq!(*calls.lock(), vec!["init", "load", "validate"]);
}

#[tokio::test]
async fn failed_batch_leaves_no_trace() {
    // One healthy plugin and one that fails validation: neither may land in
    // any index, and no matcher of the batch may become routable.
    let registry = PluginRegistry::new();

    let healthy = PluginBuilder::new("healthy", "Healthy")
        .matcher(noop_matcher())
        .build();
    let broken = PluginBuilder::new("broken", "Broken")
        .matcher(noop_matcher())
        .on_validate(|| Err(PluginError::msg("bad config")))
        .build();

    let err = registry
        .register_plugins([healthy, broken])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Lifecycle { plugin, stage, .. } if plugin == "broken" && stage == "validate"
    ));

    assert_eq!(registry.plugin_count().await, 0);
    assert!(registry.get("healthy").await.is_none());
    assert!(registry.matcher_snapshot().await.is_empty());
}

#[tokio::test]
async fn matchers_carry_their_owner() {
    let registry = PluginRegistry::new();
    registry
        .register_plugins([
            PluginBuilder::new("owned", "Owned")
                .matcher(noop_matcher())
                .matcher(noop_matcher())
                .build(),
        ])
        .await
        .unwrap();

    let matchers = registry.matcher_snapshot().await;
    assert_eq!(matchers.len(), 2);
    for matcher in matchers {
        let owner = matcher.owner().expect("owner bound at registration");
        assert_eq!(owner.name(), "Owned");
        assert_eq!(owner.plugin().unwrap().info().id, "owned");
    }
}

#[tokio::test]
async fn unregister_removes_matchers_and_unloads() {
    let registry = PluginRegistry::new();
    let unloaded = Arc::new(Mutex::new(false));

    let flag = unloaded.clone();
    registry
        .register_plugins([
            PluginBuilder::new("a", "Alpha")
                .matcher(noop_matcher())
                .on_unload(move || {
                    *flag.lock() = true;
                    Ok(())
                })
                .build(),
            PluginBuilder::new("b", "Beta").matcher(noop_matcher()).build(),
        ])
        .await
        .unwrap();
    assert_eq!(registry.matcher_snapshot().await.len(), 2);

    registry.unregister_plugin("a").await.unwrap();

    assert!(*unloaded.lock());
    assert!(registry.get("a").await.is_none());
    assert!(registry.get_by_name("Alpha").await.is_none());
    assert_eq!(registry.matcher_snapshot().await.len(), 1);

    // The id can be reused afterwards.
    registry
        .register_plugins([PluginBuilder::new("a", "Alpha").build()])
        .await
        .unwrap();
}

#[tokio::test]
async fn unload_errors_do_not_block_removal() {
    let registry = PluginRegistry::new();
    registry
        .register_plugins([
            PluginBuilder::new("grumpy", "Grumpy")
                .on_unload(|| Err(PluginError::msg("refuses to go")))
                .build(),
        ])
        .await
        .unwrap();

    registry.unregister_plugin("grumpy").await.unwrap();
    assert_eq!(registry.plugin_count().await, 0);
}

#[tokio::test]
async fn unknown_plugin_operations_fail() {
    let registry = PluginRegistry::new();
    assert!(matches!(
        registry.unregister_plugin("ghost").await.unwrap_err(),
        RegistryError::UnknownPlugin(id) if id == "ghost"
    ));
}

#[tokio::test]
async fn group_index_tracks_membership() {
    let registry = PluginRegistry::new();
    registry
        .register_plugins([
            PluginBuilder::new("g1", "G1").group("games").build(),
            PluginBuilder::new("g2", "G2").group("games").build(),
            PluginBuilder::new("u1", "U1").group("utils").build(),
        ])
        .await
        .unwrap();

    assert_eq!(registry.group("games").await.len(), 2);
    assert_eq!(registry.group("utils").await.len(), 1);
    assert!(registry.group("absent").await.is_empty());

    registry.unregister_plugin("g1").await.unwrap();
    assert_eq!(registry.group("games").await.len(), 1);
}

struct SickPlugin {
    info: PluginInfo,
}

impl SickPlugin {
    fn new() -> Arc<dyn Plugin> {
        Arc::new(Self {
            info: PluginInfo::new("sick", "Sick"),
        })
    }
}

#[async_trait]
impl Plugin for SickPlugin {
    fn info(&self) -> &PluginInfo {
        &self.info
    }

    fn matchers(&self) -> Vec<Arc<Matcher>> {
        Vec::new()
    }

    async fn health_check(&self) -> Result<(), PluginError> {
        Err(PluginError::msg("dependency down"))
    }
}

#[tokio::test]
async fn health_check_reports_per_plugin() {
    let registry = PluginRegistry::new();
    registry
        .register_plugins([PluginBuilder::new("ok", "Ok").build(), SickPlugin::new()])
        .await
        .unwrap();

    let report = registry.health_check_all().await;
    assert_eq!(report.len(), 2);
    assert!(report["ok"].is_ok());
    assert!(report["sick"].is_err());
}

#[tokio::test]
async fn configure_unsupported_is_reported() {
    let registry = PluginRegistry::new();
    registry
        .register_plugins([PluginBuilder::new("plain", "Plain").build()])
        .await
        .unwrap();

    let err = registry
        .configure_plugin("plain", Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::ConfigUnsupported(id) if id == "plain"));
}

#[tokio::test]
async fn unload_all_drains_the_registry() {
    let registry = PluginRegistry::new();
    registry
        .register_plugins([
            PluginBuilder::new("a", "A").build(),
            PluginBuilder::new("b", "B").build(),
        ])
        .await
        .unwrap();

    registry.unload_all().await;
    assert_eq!(registry.plugin_count().await, 0);
    assert!(registry.matcher_snapshot().await.is_empty());
}

//! Dependency-injection behavior: conversion matrix, container ranking,
//! per-invocation caching, and failure diagnostics.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use solder_core::{Message, PlatformApi, Shared};
use solder_framework::{
    Container, DispatchError, Provided, dynamic_provider, handler, injectable, static_provider,
    static_value,
};

use common::{MockApi, message, message_ctx, shared_api};

#[derive(Clone, Debug, PartialEq)]
struct Greeting(String);
injectable!(Greeting);

#[derive(Clone, Debug, PartialEq)]
struct Token(usize);
injectable!(Token);

#[derive(Clone, Debug, PartialEq)]
struct Flavor(&'static str);
injectable!(Flavor);

#[derive(Clone, Debug)]
struct NeverProvided;
injectable!(NeverProvided);

/// A plugin-local view of the platform message with the same field shape.
#[derive(Clone, Debug, PartialEq)]
struct LocalMessage {
    message_id: i64,
    text: Option<String>,
}

impl From<Message> for LocalMessage {
    fn from(m: Message) -> Self {
        Self {
            message_id: m.message_id,
            text: m.text,
        }
    }
}

injectable!(LocalMessage => Message);

#[tokio::test]
async fn resolves_by_identity() {
    let ctx = message_ctx("hi");
    let global = Container::new().with_static(static_value(Greeting("hello".into())));

    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    let h = handler(move |g: Greeting| {
        let sink = sink.clone();
        async move {
            *sink.lock() = Some(g);
        }
    });

    h.call(&ctx, &global, None).await.unwrap();
    assert_eq!(*seen.lock(), Some(Greeting("hello".into())));
}

#[tokio::test]
async fn auto_deref_and_structural_conversion() {
    // The provider yields a handle to the platform message; the handler
    // declares a local struct with the same shape.
    let ctx = message_ctx("hi");
    let platform = message(7, 1, "payload");
    let global = Container::new().with_static(static_value(Shared::new(platform.clone())));

    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    let h = handler(move |local: LocalMessage| {
        let sink = sink.clone();
        async move {
            *sink.lock() = Some(local);
        }
    });

    h.call(&ctx, &global, None).await.unwrap();
    let local = seen.lock().clone().unwrap();
    assert_eq!(local.message_id, platform.message_id);
    assert_eq!(local.text, platform.text);
}

#[tokio::test]
async fn auto_ref_materializes_a_handle() {
    let ctx = message_ctx("hi");
    let global = Container::new().with_static(static_value(message(3, 1, "plain")));

    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    let h = handler(move |shared: Shared<Message>| {
        let sink = sink.clone();
        async move {
            *sink.lock() = Some(shared.message_id);
        }
    });

    h.call(&ctx, &global, None).await.unwrap();
    assert_eq!(*seen.lock(), Some(3));
}

#[tokio::test]
async fn pointer_to_pointer_with_inner_conversion() {
    let ctx = message_ctx("hi");
    let global = Container::new().with_static(static_value(Shared::new(message(9, 1, "inner"))));

    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    let h = handler(move |local: Shared<LocalMessage>| {
        let sink = sink.clone();
        async move {
            *sink.lock() = Some((local.message_id, local.text.clone()));
        }
    });

    h.call(&ctx, &global, None).await.unwrap();
    assert_eq!(*seen.lock(), Some((9, Some("inner".into()))));
}

#[tokio::test]
async fn trait_object_handle_resolves_by_identity() {
    let ctx = message_ctx("hi");
    let api: Shared<dyn PlatformApi> = shared_api(MockApi::new());
    let global = Container::new().with_static(static_value(api));

    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    let h = handler(move |api: Shared<dyn PlatformApi>| {
        let sink = sink.clone();
        async move {
            *sink.lock() = Some(api.username().to_string());
        }
    });

    h.call(&ctx, &global, None).await.unwrap();
    assert_eq!(seen.lock().as_deref(), Some("mockbot"));
}

#[tokio::test]
async fn same_type_resolves_once_per_invocation() {
    let ctx = message_ctx("hi");
    let counter = Arc::new(AtomicUsize::new(0));
    let source = counter.clone();
    let global = Container::new().with_dynamic(dynamic_provider(move |_| {
        Some(Provided::new(Token(source.fetch_add(1, Ordering::SeqCst))))
    }));

    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    let h = handler(move |a: Token, b: Token| {
        let sink = sink.clone();
        async move {
            *sink.lock() = Some((a, b));
        }
    });

    h.call(&ctx, &global, None).await.unwrap();
    let (a, b) = seen.lock().clone().unwrap();
    assert_eq!(a, b);
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    // A new invocation gets a fresh resolver and a fresh value.
    h.call(&ctx, &global, None).await.unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn static_providers_are_memoized_dynamic_are_not() {
    let ctx = message_ctx("hi");

    let static_calls = Arc::new(AtomicUsize::new(0));
    let dynamic_calls = Arc::new(AtomicUsize::new(0));

    let sc = static_calls.clone();
    let dc = dynamic_calls.clone();
    let global = Container::new()
        .with_static(static_provider(move |_| {
            sc.fetch_add(1, Ordering::SeqCst);
            Some(Provided::new(Greeting("static".into())))
        }))
        .with_dynamic(dynamic_provider(move |_| {
            dc.fetch_add(1, Ordering::SeqCst);
            Some(Provided::new(Token(0)))
        }));

    let h = handler(|_g: Greeting, _t: Token| async {});
    h.call(&ctx, &global, None).await.unwrap();
    h.call(&ctx, &global, None).await.unwrap();

    assert_eq!(static_calls.load(Ordering::SeqCst), 1);
    assert_eq!(dynamic_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn resolution_failure_names_the_type() {
    let ctx = message_ctx("hi");
    let global = Container::new();

    let h = handler(|_missing: NeverProvided| async {});
    let err = h.call(&ctx, &global, None).await.unwrap_err();

    match &err {
        DispatchError::Unresolved { type_name } => {
            assert!(type_name.contains("NeverProvided"), "got {type_name}");
        }
        other => panic!("expected Unresolved, got {other:?}"),
    }
    assert!(err.to_string().starts_with("cannot resolve type"));
}

#[tokio::test]
async fn container_chain_ranks_overrides_over_handler_over_global() {
    let ctx = message_ctx("hi");
    let global = Container::new().with_static(static_value(Flavor("global")));

    // Handler-local provider outranks the global container.
    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    let h = handler(move |f: Flavor| {
        let sink = sink.clone();
        async move {
            *sink.lock() = Some(f);
        }
    })
    .register_dynamic(dynamic_provider(|_| Some(Provided::new(Flavor("handler")))));

    h.call(&ctx, &global, None).await.unwrap();
    assert_eq!(*seen.lock(), Some(Flavor("handler")));

    // A per-call override outranks both.
    let overrides = Container::new().with_static(static_value(Flavor("override")));
    h.call(&ctx, &global, Some(&overrides)).await.unwrap();
    assert_eq!(*seen.lock(), Some(Flavor("override")));
}

#[tokio::test]
async fn resolve_all_is_all_or_nothing() {
    let ctx = message_ctx("hi");
    let global = Container::new().with_static(static_value(Greeting("hello".into())));

    let mut resolver = global.resolver(&ctx, &[]);
    let (greeting,) = resolver.resolve_all::<(Greeting,)>().unwrap();
    assert_eq!(greeting, Greeting("hello".into()));

    let mut resolver = global.resolver(&ctx, &[]);
    let err = resolver
        .resolve_all::<(Greeting, NeverProvided)>()
        .unwrap_err();
    assert!(matches!(err, DispatchError::Unresolved { .. }));
}

#[tokio::test]
async fn statics_rank_before_dynamics_within_a_container() {
    let ctx = message_ctx("hi");
    let global = Container::new()
        .with_dynamic(dynamic_provider(|_| Some(Provided::new(Flavor("dynamic")))))
        .with_static(static_value(Flavor("static")));

    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    let h = handler(move |f: Flavor| {
        let sink = sink.clone();
        async move {
            *sink.lock() = Some(f);
        }
    });

    h.call(&ctx, &global, None).await.unwrap();
    assert_eq!(*seen.lock(), Some(Flavor("static")));
}

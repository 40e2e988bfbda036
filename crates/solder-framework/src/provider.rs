//! Value providers for the dependency-injection layer.
//!
//! A [`Provider`] produces one value for the current event on demand. Two
//! variants exist:
//!
//! - *static* ([`static_provider`], [`static_value`]) — the value does not
//!   depend on the current event; the first production is memoized.
//! - *dynamic* ([`dynamic_provider`]) — recomputed per event, free to consult
//!   the [`Context`].
//!
//! The tag advises memoization only; both kinds sit in the same resolution
//! walk. Providers should be cheap, pure queries of the context — anything
//! slow or fallible belongs in a handler.

use std::any::{Any, TypeId, type_name};
use std::sync::{Arc, OnceLock};

use solder_core::{Context, Shared};

/// Type-erased value produced by a [`Provider`]. Cheap to clone.
#[derive(Clone)]
pub struct Provided {
    type_id: TypeId,
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl Provided {
    /// Wraps a concrete value.
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            value: Arc::new(value),
        }
    }

    /// `TypeId` of the wrapped value.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Name of the wrapped type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Identity probe: the wrapped value is exactly `T`.
    pub fn exact<T: Clone + 'static>(&self) -> Option<T> {
        self.value.downcast_ref::<T>().cloned()
    }

    /// Auto-deref probe: the wrapped value is a [`Shared<T>`]; clones the
    /// target out of the handle. A handle in hand is always live, so the
    /// null check of pointer-based designs has no counterpart here — a
    /// provider with nothing to offer returns `None` instead.
    pub fn deref_shared<T: Clone + Send + Sync + 'static>(&self) -> Option<T> {
        self.value.downcast_ref::<Shared<T>>().map(|s| (**s).clone())
    }

    /// Identity, then one auto-deref hop. The workhorse probe behind
    /// [`injectable!`](crate::injectable).
    pub fn value<T: Clone + Send + Sync + 'static>(&self) -> Option<T> {
        self.exact::<T>().or_else(|| self.deref_shared::<T>())
    }
}

impl std::fmt::Debug for Provided {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provided")
            .field("type", &self.type_name)
            .finish()
    }
}

/// Produces a value for the current event, or `None` to let the resolution
/// walk continue with the next provider.
pub trait Provider: Send + Sync {
    fn provide(&self, ctx: &Arc<Context>) -> Option<Provided>;
}

struct StaticFn<F> {
    f: F,
    cell: OnceLock<Option<Provided>>,
}

impl<F> Provider for StaticFn<F>
where
    F: Fn(&Arc<Context>) -> Option<Provided> + Send + Sync,
{
    fn provide(&self, ctx: &Arc<Context>) -> Option<Provided> {
        self.cell.get_or_init(|| (self.f)(ctx)).clone()
    }
}

struct DynamicFn<F>(F);

impl<F> Provider for DynamicFn<F>
where
    F: Fn(&Arc<Context>) -> Option<Provided> + Send + Sync,
{
    fn provide(&self, ctx: &Arc<Context>) -> Option<Provided> {
        (self.0)(ctx)
    }
}

/// A provider whose value is independent of the event. The closure runs at
/// most once; the result is served from a cell afterwards.
pub fn static_provider<F>(f: F) -> Arc<dyn Provider>
where
    F: Fn(&Arc<Context>) -> Option<Provided> + Send + Sync + 'static,
{
    Arc::new(StaticFn {
        f,
        cell: OnceLock::new(),
    })
}

/// Static provider over an already-built value.
pub fn static_value<T: Clone + Send + Sync + 'static>(value: T) -> Arc<dyn Provider> {
    let provided = Provided::new(value);
    static_provider(move |_| Some(provided.clone()))
}

/// A provider re-evaluated for every event.
pub fn dynamic_provider<F>(f: F) -> Arc<dyn Provider>
where
    F: Fn(&Arc<Context>) -> Option<Provided> + Send + Sync + 'static,
{
    Arc::new(DynamicFn(f))
}

//! Type-directed argument resolution.
//!
//! A [`Resolver`] is created per handler invocation over a ranked chain of
//! [`Container`]s (call overrides first, then the handler's private
//! container, then the global container). For each requested type it walks
//! containers in priority order — static providers before dynamic ones inside
//! each container — and asks every provider for a value until one converts.
//!
//! # Conversion matrix
//!
//! The conversion rules are canonicalized into the [`Dependency`] trait, with
//! [`Shared<T>`] in the pointer role:
//!
//! | requested | provided | path |
//! |---|---|---|
//! | `T` | `T` | identity |
//! | `T` | `Shared<T>` | auto-deref |
//! | `T` | `P` or `Shared<P>` with `T: From<P>` | declared conversion (`injectable!(T => P)`) |
//! | `Shared<T>` | `Shared<T>` | identity |
//! | `Shared<T>` | `T` | auto-ref (a fresh handle is materialized) |
//! | `Shared<T>` | `Shared<P>` with `T: From<P>` | deref, convert, re-wrap |
//! | `Shared<dyn Trait>` | `Shared<dyn Trait>` | identity; the unsizing coercion happens at registration |
//!
//! Double hops never resolve: `Shared<Shared<T>>` is not a [`Dependency`]
//! because [`SharedTarget`] is only implemented for leaf types.
//!
//! Resolved values are cached per resolver, so a type requested twice within
//! one invocation yields the same value.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use solder_core::{Context, PlatformApi, Shared};

use crate::container::Container;
use crate::error::DispatchError;
use crate::provider::Provided;

/// A type the resolver can produce from a provided value.
///
/// Implementations are generated with [`injectable!`](crate::injectable) —
/// either the plain form (identity + auto-deref) or the alias form
/// `injectable!(Local => Platform)`, which additionally converts from a
/// platform type with the same shape via `From`.
pub trait Dependency: Clone + Send + Sync + Sized + 'static {
    fn from_provided(provided: &Provided) -> Option<Self>;
}

/// Leaf types a `Shared<T>` request may wrap via auto-ref.
///
/// Deliberately never implemented for `Shared<_>` itself, so the double-ref
/// and double-deref cases fail to type-check instead of resolving oddly.
pub trait SharedTarget: Clone + Send + Sync + Sized + 'static {
    /// Non-pointer conversions only: identity and declared aliases.
    fn direct(provided: &Provided) -> Option<Self>;
}

impl<T: SharedTarget> Dependency for Shared<T> {
    fn from_provided(provided: &Provided) -> Option<Self> {
        if let Some(existing) = provided.exact::<Shared<T>>() {
            return Some(existing);
        }
        T::direct(provided).map(Shared::new)
    }
}

/// Declares types as resolvable handler parameters.
///
/// ```rust,ignore
/// struct Stats { hits: u64 }
/// injectable!(Stats);
///
/// // A plugin-local alias of a platform type, converted structurally:
/// struct MyMessage { /* same fields as Message */ }
/// impl From<Message> for MyMessage { /* field-for-field */ }
/// injectable!(MyMessage => Message);
/// ```
#[macro_export]
macro_rules! injectable {
    ($ty:ty => $src:ty) => {
        impl $crate::resolver::Dependency for $ty {
            fn from_provided(provided: &$crate::provider::Provided) -> Option<Self> {
                provided
                    .value::<$ty>()
                    .or_else(|| provided.value::<$src>().map(<$ty>::from))
            }
        }

        impl $crate::resolver::SharedTarget for $ty {
            fn direct(provided: &$crate::provider::Provided) -> Option<Self> {
                provided
                    .exact::<$ty>()
                    .or_else(|| provided.value::<$src>().map(<$ty>::from))
            }
        }
    };
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::resolver::Dependency for $ty {
                fn from_provided(provided: &$crate::provider::Provided) -> Option<Self> {
                    provided.value::<$ty>()
                }
            }

            impl $crate::resolver::SharedTarget for $ty {
                fn direct(provided: &$crate::provider::Provided) -> Option<Self> {
                    provided.exact::<$ty>()
                }
            }
        )+
    };
}

// The context and API handles resolve by identity only; neither target is
// Clone, so they never travel outside a Shared.
impl Dependency for Shared<Context> {
    fn from_provided(provided: &Provided) -> Option<Self> {
        provided.exact::<Shared<Context>>()
    }
}

impl Dependency for Shared<dyn PlatformApi> {
    fn from_provided(provided: &Provided) -> Option<Self> {
        provided.exact::<Shared<dyn PlatformApi>>()
    }
}

// Platform event payloads are injectable out of the box.
crate::injectable!(
    solder_core::Update,
    solder_core::Message,
    solder_core::User,
    solder_core::CallbackQuery,
    solder_core::InlineQuery,
);

/// Per-event, per-invocation view over a container chain.
pub struct Resolver<'a> {
    ctx: &'a Arc<Context>,
    containers: Vec<&'a Container>,
    cache: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(ctx: &'a Arc<Context>, containers: Vec<&'a Container>) -> Self {
        Self {
            ctx,
            containers,
            cache: HashMap::new(),
        }
    }

    /// The event this resolver serves.
    pub fn context(&self) -> &Arc<Context> {
        self.ctx
    }

    /// Bulk form of [`resolve`](Self::resolve): fulfills a whole parameter
    /// tuple, failing on the first unresolved element.
    ///
    /// ```rust,ignore
    /// let (msg, cmd) = resolver.resolve_all::<(Message, CommandContext)>()?;
    /// ```
    pub fn resolve_all<L: DependencyList>(&mut self) -> Result<L, DispatchError> {
        L::resolve_from(self)
    }

    /// Resolves one dependency, caching the result for the rest of the
    /// invocation.
    pub fn resolve<T: Dependency>(&mut self) -> Result<T, DispatchError> {
        let key = TypeId::of::<T>();
        if let Some(hit) = self.cache.get(&key)
            && let Some(value) = hit.downcast_ref::<T>()
        {
            return Ok(value.clone());
        }

        for container in &self.containers {
            for provider in container.providers() {
                let Some(provided) = provider.provide(self.ctx) else {
                    continue;
                };
                if let Some(value) = T::from_provided(&provided) {
                    self.cache.insert(key, Box::new(value.clone()));
                    return Ok(value);
                }
            }
        }

        Err(DispatchError::Unresolved {
            type_name: type_name::<T>(),
        })
    }
}

/// Tuples of [`Dependency`] types, resolvable in one call.
pub trait DependencyList: Sized {
    fn resolve_from(resolver: &mut Resolver<'_>) -> Result<Self, DispatchError>;
}

macro_rules! impl_dependency_list {
    ($($ty:ident),*) => {
        #[allow(unused_variables)]
        impl<$($ty: Dependency,)*> DependencyList for ($($ty,)*) {
            fn resolve_from(resolver: &mut Resolver<'_>) -> Result<Self, DispatchError> {
                Ok(($(resolver.resolve::<$ty>()?,)*))
            }
        }
    };
}

impl_dependency_list!();
impl_dependency_list!(T1);
impl_dependency_list!(T1, T2);
impl_dependency_list!(T1, T2, T3);
impl_dependency_list!(T1, T2, T3, T4);
impl_dependency_list!(T1, T2, T3, T4, T5);
impl_dependency_list!(T1, T2, T3, T4, T5, T6);
impl_dependency_list!(T1, T2, T3, T4, T5, T6, T7);
impl_dependency_list!(T1, T2, T3, T4, T5, T6, T7, T8);

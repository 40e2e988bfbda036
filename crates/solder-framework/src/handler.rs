//! Handlers: user callables with injected parameters.
//!
//! A [`Handler`] wraps an async function whose parameters all implement
//! [`Dependency`]. The parameter list is captured at construction (the
//! statically-typed counterpart of signature inspection); invocation resolves
//! every parameter through a [`Resolver`] and then awaits the callable.
//!
//! ```rust,ignore
//! async fn echo(ctx: Shared<Context>, cmd: CommandContext) -> Result<(), ContextError> {
//!     ctx.reply(&cmd.args.join(" ")).await?;
//!     Ok(())
//! }
//!
//! let matcher = on_command(["/echo"], false, handler(echo));
//! ```
//!
//! Handlers install no panic recovery of their own; the router and the
//! recovery middleware own fault isolation.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use solder_core::Context;

use crate::container::Container;
use crate::error::{BoxError, DispatchError};
use crate::provider::Provider;
use crate::resolver::{Dependency, Resolver};

/// Return types a handler may have.
///
/// A trailing error-shaped value that is not `Ok` becomes the invocation
/// error; `()` always succeeds.
pub trait IntoHandlerResult: Send + 'static {
    fn into_handler_result(self) -> Result<(), BoxError>;
}

impl IntoHandlerResult for () {
    fn into_handler_result(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E> IntoHandlerResult for Result<(), E>
where
    E: Into<BoxError> + Send + 'static,
{
    fn into_handler_result(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

/// Async functions usable as handlers, implemented for arities 0 through 8.
///
/// The tuple parameter `T` carries the parameter types for trait selection,
/// mirroring the Axum-style blanket-impl pattern.
pub trait HandlerFn<T>: Clone + Send + Sync + 'static {
    /// Resolves all parameters now; returns the invocation future.
    fn call(
        &self,
        resolver: &mut Resolver<'_>,
    ) -> Result<BoxFuture<'static, Result<(), BoxError>>, DispatchError>;

    /// Names of the declared parameter types, in order.
    fn param_types() -> Vec<&'static str>;
}

macro_rules! impl_handler_fn {
    ($($ty:ident),*) => {
        #[allow(non_snake_case, unused_variables, unused_mut)]
        impl<F, Fut, Res, $($ty,)*> HandlerFn<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Res> + Send + 'static,
            Res: IntoHandlerResult,
            $($ty: Dependency,)*
        {
            fn call(
                &self,
                resolver: &mut Resolver<'_>,
            ) -> Result<BoxFuture<'static, Result<(), BoxError>>, DispatchError> {
                $(let $ty = resolver.resolve::<$ty>()?;)*
                let f = self.clone();
                Ok(async move { f($($ty),*).await.into_handler_result() }.boxed())
            }

            fn param_types() -> Vec<&'static str> {
                vec![$(std::any::type_name::<$ty>()),*]
            }
        }
    };
}

impl_handler_fn!();
impl_handler_fn!(T1);
impl_handler_fn!(T1, T2);
impl_handler_fn!(T1, T2, T3);
impl_handler_fn!(T1, T2, T3, T4);
impl_handler_fn!(T1, T2, T3, T4, T5);
impl_handler_fn!(T1, T2, T3, T4, T5, T6);
impl_handler_fn!(T1, T2, T3, T4, T5, T6, T7);
impl_handler_fn!(T1, T2, T3, T4, T5, T6, T7, T8);

type ErasedCall = dyn Fn(&mut Resolver<'_>) -> Result<BoxFuture<'static, Result<(), BoxError>>, DispatchError>
    + Send
    + Sync;

/// A user callable plus its parameter metadata and private provider
/// container.
#[derive(Clone)]
pub struct Handler {
    call_fn: Arc<ErasedCall>,
    params: Vec<&'static str>,
    container: Container,
}

impl Handler {
    /// Wraps `f`. The parameter type list is recorded for diagnostics; the
    /// handler starts with an empty private container.
    pub fn new<F, T>(f: F) -> Self
    where
        F: HandlerFn<T>,
        T: 'static,
    {
        Self {
            params: F::param_types(),
            container: Container::new(),
            call_fn: Arc::new(move |resolver: &mut Resolver<'_>| f.call(resolver)),
        }
    }

    /// Declared parameter type names, in order.
    pub fn param_types(&self) -> &[&'static str] {
        &self.params
    }

    /// Adds a handler-local dynamic provider. Used by the `on_*` sugar to
    /// inject derived values such as the parsed command context.
    pub fn register_dynamic(mut self, provider: Arc<dyn Provider>) -> Self {
        self.container.register_dynamic(provider);
        self
    }

    /// Adds a handler-local static provider.
    pub fn register_static(mut self, provider: Arc<dyn Provider>) -> Self {
        self.container.register_static(provider);
        self
    }

    /// Invokes the callable.
    ///
    /// The resolver chain is: `overrides` (when given) > the handler's
    /// private container > `global`. All parameters are resolved before the
    /// callable runs; an unresolved parameter fails the invocation without
    /// calling it.
    pub async fn call(
        &self,
        ctx: &Arc<Context>,
        global: &Container,
        overrides: Option<&Container>,
    ) -> Result<(), DispatchError> {
        let mut chain: Vec<&Container> = Vec::with_capacity(3);
        if let Some(extra) = overrides {
            chain.push(extra);
        }
        chain.push(&self.container);
        chain.push(global);

        let mut resolver = Resolver::new(ctx, chain);
        let fut = (self.call_fn)(&mut resolver)?;
        fut.await.map_err(DispatchError::Handler)
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("params", &self.params)
            .finish()
    }
}

/// Shorthand for [`Handler::new`].
pub fn handler<F, T>(f: F) -> Handler
where
    F: HandlerFn<T>,
    T: 'static,
{
    Handler::new(f)
}

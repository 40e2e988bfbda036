//! Dependency container.

use std::sync::Arc;

use solder_core::Context;

use crate::provider::Provider;
use crate::resolver::Resolver;

/// Durable store of providers, split into the two ordered lists the resolver
/// walks: static first, then dynamic. Containers compose linearly — a
/// [`Resolver`] is built over a child container plus any number of parents.
///
/// One global container lives for the process; each [`Handler`] owns a
/// private one for handler-local providers.
///
/// [`Handler`]: crate::handler::Handler
#[derive(Default, Clone)]
pub struct Container {
    static_providers: Vec<Arc<dyn Provider>>,
    dynamic_providers: Vec<Arc<dyn Provider>>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a static provider; registration order is preserved.
    pub fn register_static(&mut self, provider: Arc<dyn Provider>) -> &mut Self {
        self.static_providers.push(provider);
        self
    }

    /// Appends a dynamic provider; registration order is preserved.
    pub fn register_dynamic(&mut self, provider: Arc<dyn Provider>) -> &mut Self {
        self.dynamic_providers.push(provider);
        self
    }

    /// Builder-style variant of [`register_static`](Self::register_static).
    pub fn with_static(mut self, provider: Arc<dyn Provider>) -> Self {
        self.static_providers.push(provider);
        self
    }

    /// Builder-style variant of [`register_dynamic`](Self::register_dynamic).
    pub fn with_dynamic(mut self, provider: Arc<dyn Provider>) -> Self {
        self.dynamic_providers.push(provider);
        self
    }

    /// All providers in resolution order: static, then dynamic.
    pub(crate) fn providers(&self) -> impl Iterator<Item = &Arc<dyn Provider>> {
        self.static_providers
            .iter()
            .chain(self.dynamic_providers.iter())
    }

    pub fn provider_count(&self) -> usize {
        self.static_providers.len() + self.dynamic_providers.len()
    }

    /// Creates the per-event resolver over `self` followed by `parents`.
    pub fn resolver<'a>(&'a self, ctx: &'a Arc<Context>, parents: &[&'a Container]) -> Resolver<'a> {
        let mut containers = Vec::with_capacity(1 + parents.len());
        containers.push(self);
        containers.extend_from_slice(parents);
        Resolver::new(ctx, containers)
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("static", &self.static_providers.len())
            .field("dynamic", &self.dynamic_providers.len())
            .finish()
    }
}

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Cheap-clone shared handle used throughout the framework.
///
/// `Shared<T>` is the framework's pointer type: the platform API handle, the
/// per-event context, and every other long-lived collaborator travel through
/// the dependency-injection layer wrapped in one of these. Cloning only bumps
/// a reference count.
///
/// Trait objects are produced by coercing at construction:
///
/// ```rust,ignore
/// let api: Shared<dyn PlatformApi> = Shared::from_arc(Arc::new(MyApi::new()));
/// ```
pub struct Shared<T: ?Sized>(Arc<T>);

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl<T: ?Sized> Shared<T> {
    pub fn from_arc(arc: Arc<T>) -> Self {
        Self(arc)
    }

    pub fn into_arc(self) -> Arc<T> {
        self.0
    }

    pub fn as_arc(&self) -> &Arc<T> {
        &self.0
    }

    /// Returns `true` if both handles point at the same allocation.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl<T: ?Sized> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> Deref for Shared<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized> From<Arc<T>> for Shared<T> {
    fn from(arc: Arc<T>) -> Self {
        Self(arc)
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shared").field(&self.0).finish()
    }
}

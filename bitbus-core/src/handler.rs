//! # Handlers
//!
//! A handler is the callback a dispatcher invokes when a published code
//! overlaps the channels it listens on. It receives the payload and the full
//! published code.
//!
//! # Identity
//!
//! Handlers are compared by identity, never by value. A [`HandlerRef`] is a
//! shared handle to one handler allocation; clones of a `HandlerRef` are the
//! same handler, while two handles built from equal closures are not.
//!
//! # Usage Patterns
//!
//! 1. **Closure**: `HandlerRef::from_fn(|data: &Event, code| { ... })`
//! 2. **Fallible closure**: return `Result<(), E>` to abort a publish
//! 3. **Struct implementation**: `impl Handler<Event> for MyHandler`

use crate::{error::BoxError, mask::Mask};
use std::{fmt, hash, sync::Arc};

/// Trait for converting a handler's return value into a dispatch outcome.
///
/// # Default Implementations
///
/// - `()` → success
/// - `Result<(), E>` → the error is boxed and aborts the publish
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a handler outcome",
    label = "handlers must return `()` or `Result<(), E>`",
    note = "The error type of a `Result` must convert into `BoxError`."
)]
pub trait IntoOutcome {
    /// Convert the value into success or a boxed error.
    fn into_outcome(self) -> Result<(), BoxError>;
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E> IntoOutcome for Result<(), E>
where
    E: Into<BoxError>,
{
    fn into_outcome(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

/// A callback subscribed to one or more channels.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle payloads of type `{T}`",
    label = "missing `Handler<{T}>` implementation",
    note = "Closures of shape `Fn(&{T}, Mask) -> ()` or `-> Result<(), E>` are handlers."
)]
pub trait Handler<T: ?Sized>: Send + Sync + 'static {
    /// Handle one publish. `code` is the full published mask.
    fn call(&self, data: &T, code: Mask) -> Result<(), BoxError>;
}

// Blanket impl for closures
impl<T, F, R> Handler<T> for F
where
    T: ?Sized,
    R: IntoOutcome,
    F: Fn(&T, Mask) -> R + Send + Sync + 'static,
{
    fn call(&self, data: &T, code: Mask) -> Result<(), BoxError> {
        (self)(data, code).into_outcome()
    }
}

/// Opaque identity of a handler allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(usize);

/// A shared, identity-compared handle to a handler.
///
/// Keep a clone of the handle used to subscribe in order to unsubscribe
/// later.
///
/// # Example
///
/// ```rust
/// use bitbus_core::HandlerRef;
///
/// let a = HandlerRef::<u32>::from_fn(|_, _| {});
/// let b = HandlerRef::<u32>::from_fn(|_, _| {});
/// assert_eq!(a, a.clone());
/// assert_ne!(a, b);
/// ```
pub struct HandlerRef<T: ?Sized>(Arc<dyn Handler<T>>);

impl<T: ?Sized + 'static> HandlerRef<T> {
    /// Wrap a handler in a fresh identity.
    pub fn new<H: Handler<T>>(handler: H) -> Self {
        Self(Arc::new(handler))
    }

    /// Wrap a closure in a fresh identity.
    ///
    /// Same as [`HandlerRef::new`], but lets the compiler infer the closure's
    /// argument types.
    pub fn from_fn<F, R>(f: F) -> Self
    where
        F: Fn(&T, Mask) -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        Self::new(f)
    }
}

impl<T: ?Sized + 'static> HandlerRef<T> {
    /// The identity of the underlying allocation.
    pub fn id(&self) -> HandlerId {
        HandlerId(Arc::as_ptr(&self.0).cast::<()>() as usize)
    }

    /// Invoke the handler.
    pub fn call(&self, data: &T, code: Mask) -> Result<(), BoxError> {
        self.0.call(data, code)
    }

    /// Whether both handles refer to the same handler.
    pub fn same(&self, other: &HandlerRef<T>) -> bool {
        self.id() == other.id()
    }
}

impl<T: ?Sized> Clone for HandlerRef<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: ?Sized + 'static> PartialEq for HandlerRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl<T: ?Sized + 'static> Eq for HandlerRef<T> {}

impl<T: ?Sized + 'static> hash::Hash for HandlerRef<T> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl<T: ?Sized + 'static> fmt::Debug for HandlerRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandlerRef").field(&self.id()).finish()
    }
}

impl<T: ?Sized + 'static, H: Handler<T>> From<Arc<H>> for HandlerRef<T> {
    fn from(handler: Arc<H>) -> Self {
        Self(handler)
    }
}

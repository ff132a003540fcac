//! One-shot adapter.
//!
//! [`Dispatcher::once`](crate::Dispatcher::once) registers a [`OneShot`]
//! instead of the caller's handler. The adapter has an identity of its own,
//! so unsubscribing the wrapped handler leaves the adapter armed. The
//! dispatcher retires the adapter from every bit after its first successful
//! call.

use bitbus_core::{BoxError, Handler, HandlerRef, Mask};

/// Forwards to the wrapped handler.
pub(crate) struct OneShot<T: ?Sized> {
    inner: HandlerRef<T>,
}

impl<T: ?Sized + 'static> OneShot<T> {
    /// Wrap `inner` in a new adapter identity.
    pub(crate) fn wrap(inner: HandlerRef<T>) -> HandlerRef<T> {
        HandlerRef::new(Self { inner })
    }
}

impl<T: ?Sized + 'static> Handler<T> for OneShot<T> {
    fn call(&self, data: &T, code: Mask) -> Result<(), BoxError> {
        self.inner.call(data, code)
    }
}

//! Testing utilities for bitbus.
//!
//! This module provides handlers that make asserting on dispatch behaviour
//! easier.
//!
//! # Features
//!
//! - [`RecordingHandler`]: records every `(data, code)` it receives
//! - [`CountingHandler`]: counts invocations
//! - [`FailingHandler`]: always returns an error

use bitbus_core::{BoxError, Handler, HandlerRef, Mask};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Recording Handler
// ============================================================================

/// A handler that records all payloads and codes it receives.
///
/// # Example
///
/// ```rust
/// use bitbus::{Dispatcher, Mask, testing::RecordingHandler};
///
/// let recorder = RecordingHandler::<u32>::new();
/// let handler = recorder.handler();
///
/// let mut bus = Dispatcher::new();
/// bus.on(0b1u8, &handler);
/// bus.emit(0b11u8, &7).unwrap();
///
/// assert_eq!(recorder.calls(), vec![(7, Mask::new(0b11))]);
/// ```
pub struct RecordingHandler<T: Clone> {
    calls: Arc<Mutex<Vec<(T, Mask)>>>,
    handler: HandlerRef<T>,
}

impl<T: Clone + Send + 'static> RecordingHandler<T> {
    /// Create a new recording handler with one fixed identity.
    pub fn new() -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        let handler = HandlerRef::from_fn(move |data: &T, code: Mask| {
            sink.lock().unwrap().push((data.clone(), code));
        });
        Self { calls, handler }
    }
}

impl<T: Clone> RecordingHandler<T> {
    /// The handle to subscribe. Every call returns the same identity.
    pub fn handler(&self) -> HandlerRef<T> {
        self.handler.clone()
    }

    /// Get a clone of the recorded calls.
    pub fn calls(&self) -> Vec<(T, Mask)> {
        self.calls.lock().unwrap().clone()
    }

    /// Get the recorded payloads only.
    pub fn payloads(&self) -> Vec<T> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(data, _)| data.clone())
            .collect()
    }

    /// Get the number of recorded calls.
    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Clear all recorded calls.
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl<T: Clone + Send + 'static> Default for RecordingHandler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for RecordingHandler<T> {
    fn clone(&self) -> Self {
        Self {
            calls: self.calls.clone(),
            handler: self.handler.clone(),
        }
    }
}

// ============================================================================
// Counting Handler
// ============================================================================

/// A handler that counts invocations.
///
/// Clones share the counter. Each [`CountingHandler::handler`] call wraps the
/// counter in a fresh identity, so distinct handles count into the same total.
pub struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    /// Create a new counting handler.
    pub fn new() -> Self {
        Self {
            count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A new handle that increments this counter.
    pub fn handler<T: ?Sized + 'static>(&self) -> HandlerRef<T> {
        HandlerRef::new(self.clone())
    }

    /// Get the current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl Default for CountingHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CountingHandler {
    fn clone(&self) -> Self {
        Self {
            count: self.count.clone(),
        }
    }
}

impl<T: ?Sized> Handler<T> for CountingHandler {
    fn call(&self, _data: &T, _code: Mask) -> Result<(), BoxError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Failing Handler
// ============================================================================

/// A handler that counts its calls and always fails with `message`.
#[derive(Clone)]
pub struct FailingHandler {
    message: &'static str,
    attempts: Arc<AtomicUsize>,
}

impl FailingHandler {
    /// Create a handler failing with `message`.
    pub fn new(message: &'static str) -> Self {
        Self {
            message,
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A new handle that fails with this handler's message.
    pub fn handler<T: ?Sized + 'static>(&self) -> HandlerRef<T> {
        HandlerRef::new(self.clone())
    }

    /// How many times any handle of this handler was called.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl<T: ?Sized> Handler<T> for FailingHandler {
    fn call(&self, _data: &T, _code: Mask) -> Result<(), BoxError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(self.message.into())
    }
}

//! # Bit-Indexed Dispatcher
//!
//! A [`Dispatcher`] owns one handler slot per bit position. Subscribing adds
//! a handler to the slot of every bit set in its code; publishing walks the
//! slots of every bit set in the published code and invokes each handler it
//! finds, at most once per publish.
//!
//! # Dispatch Order
//!
//! Bits are visited in ascending order and each slot in insertion order. A
//! handler listening on several of the published bits fires on the lowest
//! one and is skipped afterwards.
//!
//! # Bits Hint
//!
//! The `*_within` variants take a `bits_hint` that narrows the scanned range
//! to `[0, min(bits_hint, max_bits))`. The plain variants scan every slot.
//!
//! # Concurrency
//!
//! Every mutating operation takes `&mut self` and runs to completion on the
//! caller's thread. To share a dispatcher across threads, wrap it in a lock
//! such as `Mutex<Dispatcher<T>>`; handlers are `Send + Sync` so the
//! dispatcher itself is as well.

use crate::{
    config::{DEFAULT_MAX_BITS, DispatcherBuilder, DispatcherConfig},
    once::OneShot,
};
use bitbus_core::{ConfigError, DispatchError, HandlerId, HandlerRef, Mask};
use std::{collections::HashSet, fmt};

struct Entry<T: ?Sized> {
    handler: HandlerRef<T>,
    one_shot: bool,
}

/// Handlers listening on one bit, in insertion order, unique by identity.
///
/// Membership checks scan the slot linearly, so filling one bit with `n`
/// handlers costs `O(n²)` in total.
struct Slot<T: ?Sized> {
    entries: Vec<Entry<T>>,
}

impl<T: ?Sized + 'static> Slot<T> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn position(&self, id: HandlerId) -> Option<usize> {
        self.entries.iter().position(|e| e.handler.id() == id)
    }

    fn insert(&mut self, handler: &HandlerRef<T>, one_shot: bool) {
        if self.position(handler.id()).is_none() {
            self.entries.push(Entry {
                handler: handler.clone(),
                one_shot,
            });
        }
    }

    fn remove(&mut self, id: HandlerId) {
        if let Some(index) = self.position(id) {
            self.entries.remove(index);
        }
    }
}

/// Removes fired one-shot adapters from every slot when dropped, so they
/// retire even if a later handler panics.
struct Retire<'a, T: ?Sized + 'static> {
    table: &'a mut [Slot<T>],
    spent: Vec<HandlerId>,
}

impl<T: ?Sized + 'static> Drop for Retire<'_, T> {
    fn drop(&mut self) {
        for id in self.spent.drain(..) {
            #[cfg(feature = "tracing")]
            tracing::debug!(handler = ?id, "one-shot retired");
            for slot in self.table.iter_mut() {
                slot.remove(id);
            }
        }
    }
}

/// Publish/subscribe keyed by bitmask channels.
///
/// # Example
///
/// ```rust
/// use bitbus::{Dispatcher, HandlerRef, Mask};
/// use std::sync::{Arc, Mutex};
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let log = seen.clone();
/// let handler = HandlerRef::from_fn(move |data: &String, code: Mask| {
///     log.lock().unwrap().push((data.clone(), code.bits()));
/// });
///
/// let mut bus = Dispatcher::new();
/// bus.on(0b0011u32, &handler);
/// bus.emit(0b0110u32, &"hello".to_string()).unwrap();
///
/// assert_eq!(*seen.lock().unwrap(), vec![("hello".to_string(), 0b0110)]);
/// ```
pub struct Dispatcher<T: ?Sized> {
    max_bits: u32,
    table: Vec<Slot<T>>,
}

impl<T: ?Sized + 'static> Dispatcher<T> {
    /// Create a dispatcher with [`DEFAULT_MAX_BITS`] slots.
    pub fn new() -> Self {
        Self::allocate(DEFAULT_MAX_BITS)
    }

    /// Create a dispatcher with `max_bits` slots.
    ///
    /// Fails if `max_bits` is zero or wider than [`Mask::WIDTH`].
    pub fn with_max_bits(max_bits: u32) -> Result<Self, ConfigError> {
        Self::from_config(DispatcherConfig { max_bits })
    }

    /// Create a dispatcher from a validated configuration.
    pub fn from_config(config: DispatcherConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::allocate(config.max_bits))
    }

    /// Start building a dispatcher.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    fn allocate(max_bits: u32) -> Self {
        Self {
            max_bits,
            table: (0..max_bits).map(|_| Slot::new()).collect(),
        }
    }

    /// Subscribe `handler` to every bit set in `code`.
    pub fn on(&mut self, code: impl Into<Mask>, handler: &HandlerRef<T>) -> &mut Self {
        self.on_within(code, handler, self.max_bits)
    }

    /// Subscribe `handler` to every bit set in `code` below `bits_hint`.
    pub fn on_within(
        &mut self,
        code: impl Into<Mask>,
        handler: &HandlerRef<T>,
        bits_hint: u32,
    ) -> &mut Self {
        self.subscribe(code.into(), handler, bits_hint, false)
    }

    /// Subscribe `handler` for a single successful call.
    ///
    /// The handler is wrapped in an adapter with its own identity, so
    /// [`remove`](Self::remove) on `handler` does not cancel it. After the
    /// first publish in which the handler returns `Ok`, the adapter is
    /// removed from every bit. A failed call leaves it subscribed.
    pub fn once(&mut self, code: impl Into<Mask>, handler: &HandlerRef<T>) -> &mut Self {
        self.once_within(code, handler, self.max_bits)
    }

    /// [`once`](Self::once), scanning only bits below `bits_hint`.
    pub fn once_within(
        &mut self,
        code: impl Into<Mask>,
        handler: &HandlerRef<T>,
        bits_hint: u32,
    ) -> &mut Self {
        let adapter = OneShot::wrap(handler.clone());
        self.subscribe(code.into(), &adapter, bits_hint, true)
    }

    fn subscribe(
        &mut self,
        code: Mask,
        handler: &HandlerRef<T>,
        bits_hint: u32,
        one_shot: bool,
    ) -> &mut Self {
        let limit = self.limit(bits_hint);
        #[cfg(feature = "tracing")]
        tracing::trace!(%code, limit, handler = ?handler.id(), one_shot, "subscribe");
        for bit in code.bits_below(limit) {
            self.table[bit as usize].insert(handler, one_shot);
        }
        self
    }

    /// Unsubscribe `handler` from every bit.
    pub fn remove(&mut self, handler: &HandlerRef<T>) -> &mut Self {
        self.remove_within(handler, self.max_bits)
    }

    /// Unsubscribe `handler` from every bit below `bits_hint`.
    pub fn remove_within(&mut self, handler: &HandlerRef<T>, bits_hint: u32) -> &mut Self {
        let limit = self.limit(bits_hint);
        let id = handler.id();
        #[cfg(feature = "tracing")]
        tracing::trace!(handler = ?id, limit, "remove");
        for slot in &mut self.table[..limit as usize] {
            slot.remove(id);
        }
        self
    }

    /// Unsubscribe every handler in `handlers` from every bit.
    ///
    /// The collection is walked once per slot.
    pub fn remove_group<'a, I>(&mut self, handlers: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a HandlerRef<T>>,
        I::IntoIter: Clone,
    {
        self.remove_group_within(handlers, self.max_bits)
    }

    /// [`remove_group`](Self::remove_group), limited to bits below `bits_hint`.
    pub fn remove_group_within<'a, I>(&mut self, handlers: I, bits_hint: u32) -> &mut Self
    where
        I: IntoIterator<Item = &'a HandlerRef<T>>,
        I::IntoIter: Clone,
    {
        let limit = self.limit(bits_hint);
        let handlers = handlers.into_iter();
        #[cfg(feature = "tracing")]
        tracing::trace!(limit, "remove group");
        for slot in &mut self.table[..limit as usize] {
            for handler in handlers.clone() {
                slot.remove(handler.id());
            }
        }
        self
    }

    /// Publish `data` on every bit set in `code`.
    ///
    /// Each matching handler is called once with `(data, code)`, where `code`
    /// is the full published mask. The first handler error stops delivery
    /// and is returned; handlers not yet reached are skipped.
    pub fn emit(&mut self, code: impl Into<Mask>, data: &T) -> Result<&mut Self, DispatchError> {
        self.emit_within(code, data, self.max_bits)
    }

    /// [`emit`](Self::emit), scanning only bits below `bits_hint`.
    pub fn emit_within(
        &mut self,
        code: impl Into<Mask>,
        data: &T,
        bits_hint: u32,
    ) -> Result<&mut Self, DispatchError> {
        let code = code.into();
        let limit = self.limit(bits_hint);
        let mut called = HashSet::new();
        let mut outcome = Ok(());
        let mut retire = Retire {
            table: &mut self.table,
            spent: Vec::new(),
        };

        'bits: for bit in code.bits_below(limit) {
            for entry in &retire.table[bit as usize].entries {
                if !called.insert(entry.handler.id()) {
                    continue;
                }
                if let Err(source) = entry.handler.call(data, code) {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(%code, bit, handler = ?entry.handler.id(), "handler failed, publish aborted");
                    outcome = Err(DispatchError::Handler { bit, code, source });
                    break 'bits;
                }
                if entry.one_shot {
                    retire.spent.push(entry.handler.id());
                }
            }
        }

        // Fired one-shots retire here, even when a later handler failed.
        drop(retire);
        outcome.map(|()| self)
    }

    /// Number of bit slots.
    pub fn max_bits(&self) -> u32 {
        self.max_bits
    }

    /// Number of handlers listening on `bit`; `0` when out of range.
    pub fn listeners_on(&self, bit: u32) -> usize {
        self.table
            .get(bit as usize)
            .map_or(0, |slot| slot.entries.len())
    }

    /// Whether `handler` is listening on `bit`.
    pub fn is_listening(&self, handler: &HandlerRef<T>, bit: u32) -> bool {
        self.table
            .get(bit as usize)
            .is_some_and(|slot| slot.position(handler.id()).is_some())
    }

    /// Whether `handler` is listening on any bit.
    pub fn is_registered(&self, handler: &HandlerRef<T>) -> bool {
        let id = handler.id();
        self.table.iter().any(|slot| slot.position(id).is_some())
    }

    /// The bits `handler` is listening on.
    pub fn subscriptions(&self, handler: &HandlerRef<T>) -> Mask {
        let id = handler.id();
        (0..self.max_bits)
            .filter(|&bit| self.table[bit as usize].position(id).is_some())
            .collect()
    }

    /// Whether no handler is listening on any bit.
    pub fn is_empty(&self) -> bool {
        self.table.iter().all(|slot| slot.entries.is_empty())
    }

    /// Drop every subscription. Capacity is unchanged.
    pub fn clear(&mut self) -> &mut Self {
        for slot in &mut self.table {
            slot.entries.clear();
        }
        self
    }

    fn limit(&self, bits_hint: u32) -> u32 {
        bits_hint.min(self.max_bits)
    }
}

impl<T: ?Sized + 'static> Default for Dispatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners: Vec<usize> = self.table.iter().map(|s| s.entries.len()).collect();
        f.debug_struct("Dispatcher")
            .field("max_bits", &self.max_bits)
            .field("listeners", &listeners)
            .finish()
    }
}

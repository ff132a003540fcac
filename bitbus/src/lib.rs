//! # bitbus - Bitmask-Keyed Publish/Subscribe
//!
//! `bitbus` is an in-process publish/subscribe primitive whose event
//! identifiers are integer bitmasks. Each bit is a channel: a handler
//! subscribes to several channels with one code, and a publish reaches every
//! handler whose channels overlap the published code by at least one bit.
//!
//! ## Quick Start
//!
//! ```rust
//! use bitbus::{Dispatcher, HandlerRef, Mask};
//!
//! const INPUT: u32 = 1 << 0;
//! const NETWORK: u32 = 1 << 1;
//! const TIMER: u32 = 1 << 2;
//!
//! let io = HandlerRef::from_fn(|event: &String, code: Mask| {
//!     println!("io saw {event} on {code}");
//! });
//! let timer = HandlerRef::from_fn(|event: &String, _| println!("tick {event}"));
//!
//! let mut bus = Dispatcher::new();
//! bus.on(INPUT | NETWORK, &io).once(TIMER, &timer);
//!
//! // `io` fires once even though both of its channels are published.
//! bus.emit(INPUT | NETWORK | TIMER, &"ready".to_string())?;
//! # Ok::<(), bitbus::DispatchError>(())
//! ```
//!
//! ## Semantics
//!
//! - Handlers are compared by identity ([`HandlerRef`]), never by value.
//! - A publish invokes each matching handler exactly once, lowest bit first.
//! - [`Dispatcher::remove`] unsubscribes a handler from every bit at once.
//! - [`Dispatcher::once`] handlers retire after their first successful call.
//! - A handler error aborts the publish and is returned to the caller.
//!
//! ## Features
//!
//! - `tracing`: emit `trace!`/`debug!` events for subscriptions, one-shot
//!   retirement and aborted publishes.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod config;
mod dispatcher;
mod once;
pub mod testing;

pub use bitbus_core::{
    // Error types
    BitbusError,
    BoxError,
    ConfigError,
    DispatchError,
    // Handler
    Handler,
    HandlerId,
    HandlerRef,
    IntoOutcome,
    // Mask
    Mask,
    SetBits,
};
pub use config::{DEFAULT_MAX_BITS, DispatcherBuilder, DispatcherConfig};
pub use dispatcher::Dispatcher;

pub use bitflags;

/// Prelude module - common imports for bitbus.
///
/// # Usage
///
/// ```rust
/// use bitbus::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        DispatchError, Dispatcher, DispatcherBuilder, Handler, HandlerRef, IntoOutcome, Mask,
    };
}

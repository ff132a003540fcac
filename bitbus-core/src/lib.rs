//! # bitbus-core
//!
//! Core types for the bitbus bit-indexed dispatcher.
//!
//! This crate has minimal dependencies and is meant to be imported by code
//! that defines handlers or channel masks without needing the dispatcher
//! itself.
//!
//! # Vocabulary
//!
//! - [`Mask`] - the event identifier; each set bit is one channel
//! - [`Handler`] - a callback invoked with `(data, code)`
//! - [`HandlerRef`] - the identity-compared handle a dispatcher stores
//! - [`IntoOutcome`] - what a handler may return (`()` or `Result<(), E>`)
//!
//! # Error Types
//!
//! - [`BitbusError`] - Top-level error type
//! - [`ConfigError`] - Rejected capacity
//! - [`DispatchError`] - A handler failure that aborted a publish

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod handler;
mod mask;

// Re-exports
pub use error::{BitbusError, BoxError, ConfigError, DispatchError};
pub use handler::{Handler, HandlerId, HandlerRef, IntoOutcome};
pub use mask::{Mask, SetBits};

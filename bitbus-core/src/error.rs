//! Error types for bitbus.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`BitbusError`] - Top-level error type for all bitbus operations
//! - [`ConfigError`] - Rejected dispatcher configuration
//! - [`DispatchError`] - Errors raised by handlers during a publish

use crate::mask::Mask;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all bitbus operations.
///
/// No dispatcher method returns it directly. It lets callers mix
/// construction and publishing behind one `?`.
#[derive(Error, Debug)]
pub enum BitbusError {
    /// The dispatcher could not be constructed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A publish was aborted by a failing handler.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Errors that can occur while validating a dispatcher configuration.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A dispatcher needs at least one bit slot.
    #[error("max_bits must be at least 1")]
    ZeroCapacity,

    /// The requested capacity exceeds the width of a [`Mask`].
    #[error("max_bits {requested} exceeds the mask width of {max} bits")]
    CapacityTooLarge {
        /// The capacity that was asked for.
        requested: u32,
        /// The largest supported capacity.
        max: u32,
    },
}

/// Errors that can occur during a publish.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A handler returned an error; handlers after it were not invoked.
    #[error("handler on bit {bit} failed while publishing {code}")]
    Handler {
        /// The bit whose slot was being walked when the handler failed.
        bit: u32,
        /// The full code passed to `emit`.
        code: Mask,
        /// The handler's error.
        #[source]
        source: BoxError,
    },
}

impl DispatchError {
    /// The code of the aborted publish.
    pub fn code(&self) -> Mask {
        match self {
            DispatchError::Handler { code, .. } => *code,
        }
    }

    /// The bit whose slot held the failing handler.
    pub fn bit(&self) -> u32 {
        match self {
            DispatchError::Handler { bit, .. } => *bit,
        }
    }
}

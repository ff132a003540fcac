//! Dispatcher configuration and builder.

use crate::dispatcher::Dispatcher;
use bitbus_core::{ConfigError, Mask};

/// Capacity used when none is configured, matching a 32-bit native mask.
pub const DEFAULT_MAX_BITS: u32 = 32;

/// Settings fixed for the lifetime of a [`Dispatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Number of bit slots; valid positions are `[0, max_bits)`.
    pub max_bits: u32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_bits: DEFAULT_MAX_BITS,
        }
    }
}

impl DispatcherConfig {
    /// Check that `max_bits` is within `1..=Mask::WIDTH`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.max_bits {
            0 => Err(ConfigError::ZeroCapacity),
            n if n > Mask::WIDTH => Err(ConfigError::CapacityTooLarge {
                requested: n,
                max: Mask::WIDTH,
            }),
            _ => Ok(()),
        }
    }
}

/// Builder for constructing a [`Dispatcher`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatcherBuilder {
    config: DispatcherConfig,
}

impl DispatcherBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of bit slots.
    pub fn max_bits(mut self, max_bits: u32) -> Self {
        self.config.max_bits = max_bits;
        self
    }

    /// The configuration built so far.
    pub fn config(&self) -> DispatcherConfig {
        self.config
    }

    /// Build the dispatcher.
    pub fn build<T: ?Sized + 'static>(self) -> Result<Dispatcher<T>, ConfigError> {
        Dispatcher::from_config(self.config)
    }
}

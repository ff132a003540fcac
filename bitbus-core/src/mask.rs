//! # Channel Masks
//!
//! A [`Mask`] is the event identifier of bitbus: every set bit selects one
//! channel, so a single value names any combination of channels at once.
//!
//! # Conversions
//!
//! - Unsigned integers widen losslessly.
//! - Signed integers keep their two's-complement bit pattern at their own
//!   width, so `-1i32` selects bits `0..32` and nothing above.
//! - `bitflags` types convert through [`Mask::from_flags`].
//!
//! # Example
//!
//! ```rust
//! use bitbus_core::Mask;
//!
//! let code = Mask::from(0b1010u8);
//! assert_eq!(code.bits_below(8).collect::<Vec<_>>(), vec![1, 3]);
//! assert!(code.overlaps(Mask::bit(3)));
//! ```

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// A set of channels, one per bit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Mask(u64);

impl Mask {
    /// Number of addressable bits in a mask.
    pub const WIDTH: u32 = u64::BITS;

    /// The mask selecting no channel.
    pub const EMPTY: Mask = Mask(0);

    /// Wrap raw bits.
    pub const fn new(bits: u64) -> Self {
        Self(bits)
    }

    /// The mask selecting only `position`.
    ///
    /// Positions at or above [`Mask::WIDTH`] yield [`Mask::EMPTY`].
    pub const fn bit(position: u32) -> Self {
        match 1u64.checked_shl(position) {
            Some(bits) => Self(bits),
            None => Self::EMPTY,
        }
    }

    /// Convert any `bitflags` value whose storage widens to `u64`.
    pub fn from_flags<F>(flags: F) -> Self
    where
        F: bitflags::Flags,
        F::Bits: Into<u64>,
    {
        Self(flags.bits().into())
    }

    /// The raw bits.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Whether no channel is selected.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether `position` is selected.
    pub const fn contains_bit(self, position: u32) -> bool {
        self.0 & Self::bit(position).0 != 0
    }

    /// Whether the two masks share at least one channel.
    pub const fn overlaps(self, other: Mask) -> bool {
        self.0 & other.0 != 0
    }

    /// Number of selected channels.
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Keep only positions in `[0, limit)`.
    pub const fn truncate(self, limit: u32) -> Self {
        if limit >= Self::WIDTH {
            self
        } else {
            Self(self.0 & ((1u64 << limit) - 1))
        }
    }

    /// Iterate selected positions in `[0, limit)`, ascending.
    pub fn bits_below(self, limit: u32) -> SetBits {
        SetBits {
            remaining: self.truncate(limit).0,
        }
    }

    /// Iterate every selected position, ascending.
    pub fn iter(self) -> SetBits {
        self.bits_below(Self::WIDTH)
    }
}

impl IntoIterator for Mask {
    type Item = u32;
    type IntoIter = SetBits;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the set bit positions of a [`Mask`], lowest first.
#[derive(Debug, Clone)]
pub struct SetBits {
    remaining: u64,
}

impl Iterator for SetBits {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }
        let position = self.remaining.trailing_zeros();
        // clear lowest set bit
        self.remaining &= self.remaining - 1;
        Some(position)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for SetBits {}

impl std::iter::FusedIterator for SetBits {}

impl FromIterator<u32> for Mask {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        iter.into_iter().fold(Mask::EMPTY, |acc, position| acc | Mask::bit(position))
    }
}

impl BitAnd for Mask {
    type Output = Mask;

    fn bitand(self, rhs: Mask) -> Mask {
        Mask(self.0 & rhs.0)
    }
}

impl BitOr for Mask {
    type Output = Mask;

    fn bitor(self, rhs: Mask) -> Mask {
        Mask(self.0 | rhs.0)
    }
}

impl BitOrAssign for Mask {
    fn bitor_assign(&mut self, rhs: Mask) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#b}", self.0)
    }
}

impl fmt::Binary for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Binary::fmt(&self.0, f)
    }
}

macro_rules! impl_from_unsigned {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Mask {
                fn from(bits: $ty) -> Self {
                    Mask(u64::from(bits))
                }
            }
        )*
    };
}

impl_from_unsigned!(u8, u16, u32, u64);

impl From<i32> for Mask {
    fn from(bits: i32) -> Self {
        Mask(u64::from(bits as u32))
    }
}

impl From<i64> for Mask {
    fn from(bits: i64) -> Self {
        Mask(bits as u64)
    }
}

impl From<Mask> for u64 {
    fn from(mask: Mask) -> Self {
        mask.0
    }
}

use std::fmt;

/// Width, in bits, of the window of random bits that r-values are counted over.
const WINDOW_BITS: u32 = 62;
const WINDOW_MASK: u64 = (1 << WINDOW_BITS) - 1;

/// An r-value: an integer in the closed range `[0, 62]`.
///
/// The r-value is the number of leading zero bits in a 62-bit window of random bits. Every outcome beyond 61 leading
/// zeroes, which can only be the all-zero window, is reported as [`RValue::MAX`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RValue(u8);

impl RValue {
    /// The smallest r-value, produced when the first bit of the window is set.
    pub const MIN: Self = Self(0);

    /// The largest r-value, produced when no bit of the window is set.
    pub const MAX: Self = Self(WINDOW_BITS as u8);

    /// Creates an `RValue` from a raw value.
    ///
    /// Returns `None` if `value` is greater than 62.
    pub const fn new(value: u8) -> Option<Self> {
        if value <= Self::MAX.0 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Computes the r-value of the given random bits.
    ///
    /// Only the least-significant 62 bits are considered. The r-value is the number of zero bits preceding the first
    /// set bit, counting down from bit 61, or 62 if none of those bits are set.
    pub const fn from_random_bits(bits: u64) -> Self {
        let window = bits & WINDOW_MASK;

        // The two bits above the window are always clear after masking, so they always count as leading zeroes.
        Self((window.leading_zeros() - (u64::BITS - WINDOW_BITS)) as u8)
    }

    /// Returns the raw value.
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Returns `true` if this is the largest possible r-value.
    pub const fn is_max(self) -> bool {
        self.0 == Self::MAX.0
    }

    /// Returns an iterator over every r-value, in increasing order.
    pub fn all() -> impl DoubleEndedIterator<Item = Self> + ExactSizeIterator {
        (Self::MIN.0..=Self::MAX.0).map(Self)
    }
}

impl From<RValue> for u8 {
    fn from(value: RValue) -> Self {
        value.0
    }
}

impl fmt::Display for RValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

use std::{fmt, str::FromStr};

use crate::error::{GeneratorError, InvalidTraceId};

const TRACE_ID_LEN: usize = 16;
const TRACE_ID_HEX_LEN: usize = TRACE_ID_LEN * 2;

/// A 128-bit trace identifier.
///
/// The identifier is stored as 16 bytes in big-endian order, which is the order used by the W3C trace context
/// `traceparent` header. Every bit pattern is a valid `TraceId`, including all zeroes: validation only applies when
/// building one from untrusted input with the wrong length or format.
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TraceId([u8; TRACE_ID_LEN]);

impl TraceId {
    /// Creates a `TraceId` from its big-endian byte representation.
    pub const fn from_bytes(bytes: [u8; TRACE_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Creates a `TraceId` from its high and low 64-bit halves.
    ///
    /// This is the representation used when 128-bit trace IDs are carried as two 64-bit integers.
    pub const fn from_parts(high: u64, low: u64) -> Self {
        Self::from_u128(((high as u128) << 64) | low as u128)
    }

    /// Creates a `TraceId` from its integer representation.
    pub const fn from_u128(value: u128) -> Self {
        Self(value.to_be_bytes())
    }

    /// Parses a `TraceId` from its canonical text form: exactly 32 lowercase hexadecimal characters.
    ///
    /// # Errors
    ///
    /// If the input is not 32 bytes long, or contains anything other than `0-9` and `a-f`, an error is returned.
    pub fn from_hex(s: &str) -> Result<Self, GeneratorError> {
        if s.len() != TRACE_ID_HEX_LEN {
            return Err(InvalidTraceId::WrongTextLength { actual: s.len() }.into());
        }

        let mut bytes = [0u8; TRACE_ID_LEN];
        for (position, character) in s.chars().enumerate() {
            let nibble = match character {
                '0'..='9' => character as u8 - b'0',
                'a'..='f' => character as u8 - b'a' + 10,
                _ => return Err(InvalidTraceId::InvalidCharacter { position, character }.into()),
            };

            // Even positions hold the high nibble of each byte.
            let shift = if position % 2 == 0 { 4 } else { 0 };
            bytes[position / 2] |= nibble << shift;
        }

        Ok(Self(bytes))
    }

    /// Returns the big-endian byte representation.
    pub const fn to_bytes(&self) -> [u8; TRACE_ID_LEN] {
        self.0
    }

    /// Returns the integer representation.
    pub const fn to_u128(&self) -> u128 {
        u128::from_be_bytes(self.0)
    }

    /// Returns the most-significant 64 bits.
    pub const fn high(&self) -> u64 {
        (self.to_u128() >> 64) as u64
    }

    /// Returns the least-significant 64 bits.
    pub const fn low(&self) -> u64 {
        self.to_u128() as u64
    }
}

impl From<[u8; TRACE_ID_LEN]> for TraceId {
    fn from(bytes: [u8; TRACE_ID_LEN]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<u128> for TraceId {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

impl TryFrom<&[u8]> for TraceId {
    type Error = GeneratorError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; TRACE_ID_LEN]>::try_from(bytes)
            .map(Self)
            .map_err(|_| InvalidTraceId::WrongByteLength { actual: bytes.len() }.into())
    }
}

impl FromStr for TraceId {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::LowerHex for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(self, f)
    }
}

impl fmt::Debug for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TraceId({:x})", self)
    }
}

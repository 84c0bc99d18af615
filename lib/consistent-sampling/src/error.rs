use std::fmt;

use snafu::Snafu;

/// Reasons a trace ID can fail structural validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InvalidTraceId {
    /// The binary trace ID was not exactly 16 bytes long.
    WrongByteLength {
        /// Number of bytes given.
        actual: usize,
    },

    /// The textual trace ID was not exactly 32 characters long.
    WrongTextLength {
        /// Number of bytes given.
        actual: usize,
    },

    /// The textual trace ID contained a character that is not a lowercase hexadecimal digit.
    InvalidCharacter {
        /// Zero-based character position of the offending character.
        position: usize,

        /// The offending character.
        character: char,
    },
}

impl fmt::Display for InvalidTraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongByteLength { actual } => write!(f, "expected 16 bytes, got {}", actual),
            Self::WrongTextLength { actual } => write!(f, "expected 32 hexadecimal characters, got {} bytes", actual),
            Self::InvalidCharacter { position, character } => write!(
                f,
                "character {:?} at position {} is not a lowercase hexadecimal digit",
                character, position
            ),
        }
    }
}

/// An r-value generation error.
///
/// Generating from an already-constructed [`TraceId`][crate::TraceId] never fails: the only failure is an input that
/// cannot be turned into a trace ID in the first place. Such errors are never transient, so retrying is pointless, and
/// they must not be replaced with a fallback r-value since that would skew the distribution seen by samplers.
#[derive(Clone, Debug, Eq, PartialEq, Snafu)]
#[snafu(context(suffix(false)))]
pub enum GeneratorError {
    /// The trace ID failed structural validation.
    #[snafu(display("Invalid trace ID: {}.", reason))]
    InvalidInput {
        /// Why the trace ID is invalid.
        reason: InvalidTraceId,
    },
}

impl From<InvalidTraceId> for GeneratorError {
    fn from(reason: InvalidTraceId) -> Self {
        InvalidInput { reason }.build()
    }
}

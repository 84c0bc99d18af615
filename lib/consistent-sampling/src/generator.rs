//! R-value generators.

use std::hash::Hasher as _;

use serde::{Deserialize, Serialize};
use twox_hash::XxHash64;

use crate::{GeneratorError, RValue, TraceId};

/// Seed for the XXH64 hash used by [`RandomBitsSource::Hashed`].
///
/// Every implementation that hashes trace IDs must use the same algorithm, seed, and input encoding, otherwise
/// samplers in different services silently disagree. Changing this value breaks consistency with every other
/// implementation.
pub const HASH_SEED: u64 = 0;

/// Generates r-values from trace IDs.
///
/// Implementations must be pure: the r-value may depend on nothing but the bits of the trace ID, so that every sampler
/// observing the same trace derives the same value.
///
/// Any `Fn(&TraceId) -> RValue` closure is a generator.
pub trait RValueGenerator {
    /// Generates the r-value for the given trace ID.
    fn generate(&self, trace_id: &TraceId) -> RValue;
}

impl<F> RValueGenerator for F
where
    F: Fn(&TraceId) -> RValue,
{
    fn generate(&self, trace_id: &TraceId) -> RValue {
        self(trace_id)
    }
}

/// Where the random bits of a trace ID come from.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RandomBitsSource {
    /// Use the least-significant 64 bits of the trace ID directly.
    ///
    /// Only valid when the trace ID generator guarantees that at least the low 62 bits are drawn from a strong random
    /// source, such as when the whole ID is random. Avoids hashing.
    Structural,

    /// Hash the whole trace ID with XXH64 and use the hash output.
    ///
    /// Safe for any trace ID format.
    #[default]
    Hashed,
}

impl RandomBitsSource {
    /// Derives 64 random bits from the given trace ID.
    pub fn random_bits(self, trace_id: &TraceId) -> u64 {
        match self {
            Self::Structural => structural_random_bits(trace_id),
            Self::Hashed => hashed_random_bits(trace_id),
        }
    }

    /// Returns the configuration name of this source.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::Hashed => "hashed",
        }
    }
}

/// Returns the least-significant 64 bits of the trace ID.
pub fn structural_random_bits(trace_id: &TraceId) -> u64 {
    trace_id.low()
}

/// Returns the XXH64 hash, seeded with [`HASH_SEED`], of the 16 big-endian bytes of the trace ID.
pub fn hashed_random_bits(trace_id: &TraceId) -> u64 {
    let mut hasher = XxHash64::with_seed(HASH_SEED);
    hasher.write(&trace_id.to_bytes());
    hasher.finish()
}

/// The standard r-value generator.
///
/// Derives 64 random bits from the trace ID using the configured [`RandomBitsSource`], and counts the leading zeroes
/// of the low 62 bits. Holds no state besides the source, so it is freely copyable and shareable across threads.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ConsistentRValueGenerator {
    source: RandomBitsSource,
}

impl ConsistentRValueGenerator {
    /// Creates a new `ConsistentRValueGenerator` using the given source of random bits.
    pub const fn new(source: RandomBitsSource) -> Self {
        Self { source }
    }

    /// Creates a new `ConsistentRValueGenerator` that uses the trace ID bits directly.
    pub const fn structural() -> Self {
        Self::new(RandomBitsSource::Structural)
    }

    /// Creates a new `ConsistentRValueGenerator` that hashes the trace ID.
    pub const fn hashed() -> Self {
        Self::new(RandomBitsSource::Hashed)
    }

    /// Returns the source of random bits.
    pub const fn source(&self) -> RandomBitsSource {
        self.source
    }
}

impl RValueGenerator for ConsistentRValueGenerator {
    fn generate(&self, trace_id: &TraceId) -> RValue {
        RValue::from_random_bits(self.source.random_bits(trace_id))
    }
}

/// Parses a trace ID from its canonical text form and generates its r-value.
///
/// # Errors
///
/// If the trace ID is not exactly 32 lowercase hexadecimal characters, an error is returned. No r-value is generated
/// in that case.
pub fn generate_from_hex<G>(generator: &G, trace_id: &str) -> Result<RValue, GeneratorError>
where
    G: RValueGenerator + ?Sized,
{
    let trace_id = TraceId::from_hex(trace_id)?;
    Ok(generator.generate(&trace_id))
}

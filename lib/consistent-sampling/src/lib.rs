//! Deterministic r-value generation for consistent probability sampling.
//!
//! An r-value is an integer in `[0, 62]` derived from a trace ID such that, over a population of uniformly distributed
//! trace IDs, `P(r = k) = 2^-(k+1)` for `k <= 61`, with every remaining outcome collapsed into `r = 62`. Because the
//! value depends only on the bits of the trace ID, every sampler that sees the same trace derives the same r-value
//! and reaches the same keep/drop decision for a given power-of-two sampling probability, without exchanging any
//! state.
//!
//! The entry point is [`RValueGenerator`], implemented for the standard derivation by [`ConsistentRValueGenerator`].
#![deny(warnings)]
#![deny(missing_docs)]

mod config;
pub use self::config::{ConfigurationError, RValueGeneratorConfiguration};

pub mod distribution;

mod error;
pub use self::error::{GeneratorError, InvalidTraceId};

mod generator;
pub use self::generator::{
    generate_from_hex, hashed_random_bits, structural_random_bits, ConsistentRValueGenerator, RValueGenerator,
    RandomBitsSource, HASH_SEED,
};

mod rvalue;
pub use self::rvalue::RValue;

mod trace_id;
pub use self::trace_id::TraceId;

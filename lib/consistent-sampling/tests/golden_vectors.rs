//! Fixed r-values that every implementation of each derivation must agree on.
//!
//! The hashed derivation is pinned to XXH64 with a seed of 0, applied to the 16 big-endian trace ID bytes, with the
//! r-value counted over the low 62 bits of the hash. Any change to these vectors breaks consistency with samplers
//! running elsewhere.

use consistent_sampling::{
    generate_from_hex, hashed_random_bits, structural_random_bits, ConsistentRValueGenerator, RValueGenerator as _,
    TraceId, HASH_SEED,
};

struct GoldenVector {
    trace_id: &'static str,
    structural_r: u8,
    hash: u64,
    hashed_r: u8,
}

const fn vector(trace_id: &'static str, structural_r: u8, hash: u64, hashed_r: u8) -> GoldenVector {
    GoldenVector {
        trace_id,
        structural_r,
        hash,
        hashed_r,
    }
}

const GOLDEN_VECTORS: &[GoldenVector] = &[
    // W3C trace context examples.
    vector("4bf92f3577b34da6a3ce929d0e0e4736", 0, 0x4699cde8cc77b7f6, 3),
    vector("0af7651916cd43dd8448eb211c80319c", 3, 0x500ae820e0eb0c6a, 1),
    // Edge patterns.
    vector("00000000000000000000000000000000", 62, 0xaf09f71516247c32, 0),
    vector("00000000000000000000000000000001", 61, 0xf1dd97d1b9d614c7, 0),
    vector("ffffffffffffffffffffffffffffffff", 0, 0xa721445d6a57c444, 0),
    vector("80000000000000000000000000000000", 62, 0xe148d03d0526856e, 0),
    vector("00000000000000004000000000000000", 62, 0xb03a9b474e1dcb40, 0),
    vector("0000000000000000c000000000000000", 62, 0xb442ca002f950d36, 0),
    vector("00000000000000002000000000000000", 0, 0x72525de376c44574, 0),
    vector("00000000000000001000000000000000", 1, 0xdc8dce70b7c34975, 1),
    vector("000000000000000008f0000000000000", 2, 0xfb3e5f55787e87b1, 0),
    vector("0123456789abcdef0123456789abcdef", 5, 0x2c0239c4572445f1, 0),
    vector("5b8efff798038103d269b633813fc60c", 1, 0x68f7f7b2f0402155, 0),
    // Rare hashed r-values; the first two also have bits set above the 62-bit window.
    vector("00000000000000000000000000063130", 43, 0x400000fd54266fb0, 22),
    vector("000000000000000000000000000b2de1", 42, 0x800004caa05dca6b, 19),
    vector("000000000000000000000000000fe992", 42, 0x000008274ad07365, 18),
];

#[test]
fn hash_is_pinned() {
    assert_eq!(HASH_SEED, 0);
    for v in GOLDEN_VECTORS {
        let trace_id = TraceId::from_hex(v.trace_id).unwrap();
        assert_eq!(hashed_random_bits(&trace_id), v.hash, "trace ID {}", v.trace_id);
    }
}

#[test]
fn structural_vectors() {
    let generator = ConsistentRValueGenerator::structural();
    for v in GOLDEN_VECTORS {
        let trace_id = TraceId::from_hex(v.trace_id).unwrap();
        assert_eq!(structural_random_bits(&trace_id), trace_id.low());
        assert_eq!(generator.generate(&trace_id).get(), v.structural_r, "trace ID {}", v.trace_id);
        assert_eq!(generate_from_hex(&generator, v.trace_id).unwrap().get(), v.structural_r);
    }
}

#[test]
fn hashed_vectors() {
    let generator = ConsistentRValueGenerator::hashed();
    for v in GOLDEN_VECTORS {
        let trace_id = TraceId::from_hex(v.trace_id).unwrap();
        assert_eq!(generator.generate(&trace_id).get(), v.hashed_r, "trace ID {}", v.trace_id);
        assert_eq!(generate_from_hex(&generator, v.trace_id).unwrap().get(), v.hashed_r);
    }
}

#[test]
fn constructors_agree() {
    for v in GOLDEN_VECTORS {
        let parsed = TraceId::from_hex(v.trace_id).unwrap();
        let from_bytes = TraceId::try_from(&parsed.to_bytes()[..]).unwrap();
        let from_parts = TraceId::from_parts(parsed.high(), parsed.low());
        let from_int = TraceId::from(u128::from_str_radix(v.trace_id, 16).unwrap());

        for other in [from_bytes, from_parts, from_int] {
            assert_eq!(other, parsed);
            for generator in [ConsistentRValueGenerator::structural(), ConsistentRValueGenerator::hashed()] {
                assert_eq!(generator.generate(&other), generator.generate(&parsed));
            }
        }
    }
}

//! Binary kernels against an independent bit-by-bit reference.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use simdist_core::dispatch::{self, Capabilities, Kernel, Tier};
use simdist_core::{BitVector, Operation, binary};

fn bits_set(words: &[u64], keep: impl Fn(u64) -> u64) -> f32 {
    let mut count = 0u32;
    for &w in words {
        let w = keep(w);
        for bit in 0..64 {
            count += u32::from((w >> bit) & 1 == 1);
        }
    }
    count as f32
}

fn reference_pair(a: &[u64], b: &[u64], op: impl Fn(u64, u64) -> u64) -> f32 {
    let combined: Vec<u64> = a.iter().zip(b).map(|(&x, &y)| op(x, y)).collect();
    bits_set(&combined, |w| w)
}

#[test]
fn test_dispatched_binary_matches_reference() {
    let mut rng = StdRng::seed_from_u64(0xb175);
    // Word counts deliberately straddle the 8-word AVX-512 chunk.
    for n in [1, 2, 5, 7, 9, 13, 15, 17, 31, 63, 127] {
        let a: Vec<u64> = (0..n).map(|_| rng.random()).collect();
        let b: Vec<u64> = (0..n).map(|_| rng.random()).collect();

        assert_eq!(binary::cnt(&a), bits_set(&a, |w| w), "cnt n={n}");
        assert_eq!(binary::dot(&a, &b), reference_pair(&a, &b, |x, y| x & y), "dot n={n}");
        assert_eq!(binary::sl2(&a, &b), reference_pair(&a, &b, |x, y| x ^ y), "sl2 n={n}");
        assert_eq!(
            binary::or_count(&a, &b),
            reference_pair(&a, &b, |x, y| x | y),
            "or_count n={n}"
        );

        let and = reference_pair(&a, &b, |x, y| x & y);
        let or = reference_pair(&a, &b, |x, y| x | y);
        assert!((binary::jaccard(&a, &b) - and / or).abs() < 1e-6, "jaccard n={n}");
        let cosine = and / (bits_set(&a, |w| w) * bits_set(&b, |w| w)).sqrt();
        assert!((binary::cosine(&a, &b) - cosine).abs() < 1e-6, "cosine n={n}");
    }
}

#[test]
fn test_every_detected_tier_matches_reference() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let detected = dispatch::detect();
    for tier in Tier::ALL {
        if !detected.contains(tier) {
            println!("skipping {tier}: not supported on this CPU");
            continue;
        }
        let caps = Capabilities::from_tiers([tier]);
        for n in [3, 8, 11, 24, 41] {
            let a: Vec<u64> = (0..n).map(|_| rng.random()).collect();
            let b: Vec<u64> = (0..n).map(|_| rng.random()).collect();
            let Kernel::BitPair(dot) = dispatch::select(Operation::BinaryDot, caps).kernel else {
                panic!("binary_dot resolved to a non-binary kernel");
            };
            let Kernel::BitPair(sl2) = dispatch::select(Operation::BinarySl2, caps).kernel else {
                panic!("binary_sl2 resolved to a non-binary kernel");
            };
            assert_eq!(dot(&a, &b), reference_pair(&a, &b, |x, y| x & y), "{tier} n={n}");
            assert_eq!(sl2(&a, &b), reference_pair(&a, &b, |x, y| x ^ y), "{tier} n={n}");
        }
    }
}

#[test]
fn test_masked_bit_vectors() {
    let mut words = vec![u64::MAX; 3];
    BitVector::mask_trailing(&mut words, 130);
    assert_eq!(binary::cnt(&words), 130.0);

    let v = BitVector::from_bits(&[true; 70]);
    assert_eq!(binary::cnt(v.words()), 70.0);
    assert_eq!(binary::dot(v.words(), &words[..2]), 70.0);
}

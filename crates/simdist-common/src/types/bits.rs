//! Bit-packed binary vectors.
//!
//! Binary kernels take `&[u64]` and count words, not bits. Bits past the
//! logical length must be zero in the final word, otherwise popcount results
//! include them. [`BitVector`] owns a word buffer that always satisfies this,
//! and [`BitVector::mask_trailing`] fixes up a caller-owned buffer in place.

use serde::{Deserialize, Serialize};

use crate::utils::{Error, Result};

const WORD_BITS: usize = u64::BITS as usize;

/// An owned bit-vector with a logical length in bits.
///
/// Holds exactly [`BitVector::words_needed`] words with the trailing bits
/// clear. Deserialization goes through [`BitVector::from_words`], so decoded
/// values hold the same invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBitVector")]
pub struct BitVector {
    words: Vec<u64>,
    bits: usize,
}

impl BitVector {
    /// Number of `u64` words needed to hold `bits` bits.
    #[must_use]
    pub const fn words_needed(bits: usize) -> usize {
        bits.div_ceil(WORD_BITS)
    }

    /// Creates an all-zero bit-vector of `bits` bits.
    #[must_use]
    pub fn zeros(bits: usize) -> Self {
        Self {
            words: vec![0; Self::words_needed(bits)],
            bits,
        }
    }

    /// Packs booleans, one per dimension, into words (bit `i` is `bools[i]`).
    #[must_use]
    pub fn from_bits(bools: &[bool]) -> Self {
        let mut vector = Self::zeros(bools.len());
        for (i, &bit) in bools.iter().enumerate() {
            if bit {
                vector.words[i / WORD_BITS] |= 1 << (i % WORD_BITS);
            }
        }
        vector
    }

    /// Wraps existing words, validating that `bits` fits and trailing bits are clear.
    ///
    /// Surplus words past [`BitVector::words_needed`] must be zero and are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BitLengthOverflow`] if `bits` needs more words than
    /// supplied, or [`Error::TrailingBits`] if bits at or past `bits` are set.
    pub fn from_words(mut words: Vec<u64>, bits: usize) -> Result<Self> {
        Self::check_trailing(&words, bits)?;
        words.truncate(Self::words_needed(bits));
        Ok(Self { words, bits })
    }

    /// Verifies that `words` can hold `bits` bits and nothing past `bits` is set.
    ///
    /// # Errors
    ///
    /// See [`BitVector::from_words`].
    pub fn check_trailing(words: &[u64], bits: usize) -> Result<()> {
        if bits > words.len() * WORD_BITS {
            return Err(Error::BitLengthOverflow {
                bits,
                words: words.len(),
            });
        }
        let full = bits / WORD_BITS;
        let rem = bits % WORD_BITS;
        let tail_dirty = rem != 0 && words[full] & !low_mask(rem) != 0;
        let start = if rem == 0 { full } else { full + 1 };
        if tail_dirty || words[start..].iter().any(|&w| w != 0) {
            return Err(Error::TrailingBits {
                bits,
                words: words.len(),
            });
        }
        Ok(())
    }

    /// Clears every bit at or past `bits` in a caller-owned buffer.
    pub fn mask_trailing(words: &mut [u64], bits: usize) {
        let full = bits / WORD_BITS;
        if full >= words.len() {
            return;
        }
        let rem = bits % WORD_BITS;
        let start = if rem == 0 {
            full
        } else {
            words[full] &= low_mask(rem);
            full + 1
        };
        words[start..].fill(0);
    }

    /// Returns the logical length in bits.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.bits
    }

    /// Returns true if the vector has no dimensions.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Returns the packed words.
    #[must_use]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Returns bit `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    #[must_use]
    pub fn get(&self, i: usize) -> bool {
        assert!(i < self.bits, "bit index {i} out of range for {}", self.bits);
        (self.words[i / WORD_BITS] >> (i % WORD_BITS)) & 1 == 1
    }

    /// Sets bit `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    pub fn set(&mut self, i: usize, value: bool) {
        assert!(i < self.bits, "bit index {i} out of range for {}", self.bits);
        let mask = 1u64 << (i % WORD_BITS);
        if value {
            self.words[i / WORD_BITS] |= mask;
        } else {
            self.words[i / WORD_BITS] &= !mask;
        }
    }
}

#[derive(Deserialize)]
struct RawBitVector {
    words: Vec<u64>,
    bits: usize,
}

impl TryFrom<RawBitVector> for BitVector {
    type Error = Error;

    fn try_from(raw: RawBitVector) -> Result<Self> {
        Self::from_words(raw.words, raw.bits)
    }
}

#[inline]
const fn low_mask(bits: usize) -> u64 {
    (1u64 << bits) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_needed() {
        assert_eq!(BitVector::words_needed(0), 0);
        assert_eq!(BitVector::words_needed(1), 1);
        assert_eq!(BitVector::words_needed(64), 1);
        assert_eq!(BitVector::words_needed(65), 2);
        assert_eq!(BitVector::words_needed(1024), 16);
    }

    #[test]
    fn test_from_bits() {
        let v = BitVector::from_bits(&[false, true, false, true]);
        assert_eq!(v.words(), &[0b1010]);
        assert_eq!(v.len(), 4);
        assert!(v.get(1));
        assert!(!v.get(2));
    }

    #[test]
    fn test_from_bits_spans_words() {
        let mut bools = vec![false; 130];
        bools[0] = true;
        bools[64] = true;
        bools[129] = true;
        let v = BitVector::from_bits(&bools);
        assert_eq!(v.words(), &[1, 1, 0b10]);
    }

    #[test]
    fn test_set_and_clear() {
        let mut v = BitVector::zeros(70);
        v.set(69, true);
        assert!(v.get(69));
        v.set(69, false);
        assert_eq!(v.words(), &[0, 0]);
    }

    #[test]
    fn test_from_words_rejects_dirty_tail() {
        let err = BitVector::from_words(vec![0b1_0000], 4).unwrap_err();
        assert_eq!(err, Error::TrailingBits { bits: 4, words: 1 });
    }

    #[test]
    fn test_from_words_rejects_dirty_trailing_word() {
        let err = BitVector::from_words(vec![u64::MAX, 1], 64).unwrap_err();
        assert_eq!(err, Error::TrailingBits { bits: 64, words: 2 });
    }

    #[test]
    fn test_from_words_rejects_overflow() {
        let err = BitVector::from_words(vec![0], 65).unwrap_err();
        assert_eq!(err, Error::BitLengthOverflow { bits: 65, words: 1 });
    }

    #[test]
    fn test_from_words_accepts_exact() {
        let v = BitVector::from_words(vec![u64::MAX, 0b111], 67).unwrap();
        assert_eq!(v.len(), 67);
    }

    #[test]
    fn test_from_words_drops_zero_surplus() {
        let v = BitVector::from_words(vec![0b101, 0, 0], 10).unwrap();
        assert_eq!(v.words(), &[0b101]);
        let mut bools = [false; 10];
        bools[0] = true;
        bools[2] = true;
        assert_eq!(v, BitVector::from_bits(&bools));
    }

    #[test]
    fn test_deserialize_validates() {
        let v: BitVector = serde_json::from_str(r#"{"words":[1,0,0],"bits":10}"#).unwrap();
        assert_eq!(v.words(), &[1]);

        let err = serde_json::from_str::<BitVector>(r#"{"words":[1],"bits":100}"#).unwrap_err();
        assert!(err.to_string().contains("100"), "{err}");
        assert!(serde_json::from_str::<BitVector>(r#"{"words":[4096],"bits":10}"#).is_err());
    }

    #[test]
    fn test_serialize_round_trips() {
        let v = BitVector::from_bits(&[true; 70]);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(serde_json::from_str::<BitVector>(&json).unwrap(), v);
    }

    #[test]
    fn test_mask_trailing() {
        let mut words = [u64::MAX, u64::MAX, u64::MAX];
        BitVector::mask_trailing(&mut words, 68);
        assert_eq!(words, [u64::MAX, 0b1111, 0]);
        assert!(BitVector::check_trailing(&words, 68).is_ok());
    }

    #[test]
    fn test_mask_trailing_word_aligned() {
        let mut words = [u64::MAX, u64::MAX];
        BitVector::mask_trailing(&mut words, 64);
        assert_eq!(words, [u64::MAX, 0]);
        BitVector::mask_trailing(&mut words, 128);
        assert_eq!(words, [u64::MAX, 0]);
    }
}

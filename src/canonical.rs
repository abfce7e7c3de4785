//! Canonical kmer key, orientation, and the hash used to order candidates.
//!
//! Mirrors [`crate::kmer::KmerAccumulator`]'s forward/reverse-complement
//! pair into a single orientation-symmetric record, the way the teacher's
//! `CanonicalKmer` pairs a forward and reverse-complement `Kmer` (see
//! `naive_impl/canonical_kmer.rs`) — but keyed by a 64-bit hash rather than
//! the raw packed value, since minimizer selection orders by hash first.

use crate::kmer::{KmerAccumulator, NO_KEY};

/// A canonical (key, hash, orientation) triple for one ready kmer.
///
/// `key` is `min(forward, reverse_complement)` by packed numeric value;
/// `is_reverse` records which side won.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanonicalKmer {
    pub key: u64,
    pub hash: u64,
    pub is_reverse: bool,
}

impl CanonicalKmer {
    /// Reads the canonical form out of a ready accumulator.
    pub fn from_accumulator(acc: &KmerAccumulator) -> Self {
        debug_assert!(acc.is_ready());
        Self::new(acc.key(), acc.rc_key())
    }

    /// Builds the canonical form directly from a forward/reverse-complement
    /// pair, without going through an accumulator.
    pub fn new(forward: u64, reverse_complement: u64) -> Self {
        let is_reverse = reverse_complement < forward;
        let key = if is_reverse { reverse_complement } else { forward };
        Self {
            key,
            hash: hash64(key),
            is_reverse,
        }
    }
}

/// Total order used when comparing minimizer candidates: ascending by
/// hash, tie-broken by key, per §4.B.
impl PartialOrd for CanonicalKmer {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CanonicalKmer {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.hash.cmp(&other.hash).then(self.key.cmp(&other.key))
    }
}

/// Wang-style 64-bit integer mixing hash: multiply/xor-shift, no
/// cryptographic intent, only good avalanche over small inputs like packed
/// kmers. Grounded on the `LexHasher`/`hash_one` pattern in
/// `naive_impl/hash.rs`.
pub fn hash64(mut key: u64) -> u64 {
    if key == NO_KEY {
        return u64::MAX;
    }
    key = (!key).wrapping_add(key << 21);
    key ^= key >> 24;
    key = key.wrapping_add(key << 3).wrapping_add(key << 8);
    key ^= key >> 14;
    key = key.wrapping_add(key << 2).wrapping_add(key << 4);
    key ^= key >> 28;
    key = key.wrapping_add(key << 31);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_picks_numeric_minimum() {
        let c = CanonicalKmer::new(10, 3);
        assert!(c.is_reverse);
        assert_eq!(c.key, 3);

        let c = CanonicalKmer::new(3, 10);
        assert!(!c.is_reverse);
        assert_eq!(c.key, 3);
    }

    #[test]
    fn ties_in_value_favor_forward() {
        // forward == rc (palindromic 2-bit pattern): reverse_complement is
        // not strictly less, so is_reverse stays false.
        let c = CanonicalKmer::new(5, 5);
        assert!(!c.is_reverse);
    }

    #[test]
    fn hash_is_deterministic_and_distinct_for_distinct_keys() {
        assert_eq!(hash64(42), hash64(42));
        assert_ne!(hash64(42), hash64(43));
    }

    #[test]
    fn ordering_breaks_ties_by_key() {
        let a = CanonicalKmer {
            key: 1,
            hash: 100,
            is_reverse: false,
        };
        let b = CanonicalKmer {
            key: 2,
            hash: 100,
            is_reverse: false,
        };
        assert!(a < b);
    }

    #[quickcheck]
    fn canonical_key_is_never_greater_than_either_side(forward: u64, rc: u64) -> bool {
        let c = CanonicalKmer::new(forward, rc);
        c.key <= forward && c.key <= rc
    }
}

//! Fixed-size Bloom filter over a bit vector.
//!
//! Sized with the textbook formulas `m = -n ln p / (ln 2)^2` and
//! `k = (m / n) ln 2`. Bit positions come from BLAKE3 double hashing, so two
//! processes always agree on which bits a key sets.

use std::f64::consts::LN_2;

use bitvec::prelude::*;

use crate::hashing::hash_pair;

pub struct BloomBits {
    bits: BitVec<u64, Lsb0>,
    num_hashes: u32,
    count: u64,
}

impl BloomBits {
    /// Creates a filter for `expected_elements` items at `false_positive_rate`.
    ///
    /// Callers validate the parameters; degenerate inputs are clamped to a
    /// 64-bit, single-hash filter.
    pub fn new(expected_elements: u64, false_positive_rate: f64) -> Self {
        let num_bits = Self::optimal_bits(expected_elements, false_positive_rate);
        let num_hashes = Self::optimal_hashes(num_bits, expected_elements);
        Self::with_params(num_bits, num_hashes)
    }

    pub fn with_params(num_bits: usize, num_hashes: u32) -> Self {
        let num_bits = num_bits.max(64);
        Self {
            bits: bitvec![u64, Lsb0; 0; num_bits],
            num_hashes: num_hashes.max(1),
            count: 0,
        }
    }

    pub fn optimal_bits(expected_elements: u64, false_positive_rate: f64) -> usize {
        let n = expected_elements.max(1) as f64;
        let p = false_positive_rate.clamp(f64::MIN_POSITIVE, 0.5);
        let m = (-n * p.ln() / (LN_2 * LN_2)).ceil();
        (m as usize).max(64)
    }

    pub fn optimal_hashes(num_bits: usize, expected_elements: u64) -> u32 {
        let k = (num_bits as f64 / expected_elements.max(1) as f64) * LN_2;
        (k.round() as u32).max(1)
    }

    /// Sets the bits for `item`. Returns `true` if at least one bit was newly
    /// set (the item was definitely not present before).
    pub fn insert(&mut self, item: &[u8]) -> bool {
        let mut changed = false;
        for index in self.positions(item) {
            if !self.bits[index] {
                self.bits.set(index, true);
                changed = true;
            }
        }
        if changed {
            self.count += 1;
        }
        changed
    }

    /// Returns `false` only if `item` was never inserted.
    pub fn contains(&self, item: &[u8]) -> bool {
        self.positions(item).all(|index| self.bits[index])
    }

    pub fn num_bits(&self) -> usize {
        self.bits.len()
    }

    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    /// Number of inserts that changed the filter.
    pub fn count(&self) -> u64 {
        self.count
    }

    fn positions(&self, item: &[u8]) -> impl Iterator<Item = usize> + use<> {
        let (h1, h2) = hash_pair(item);
        let num_bits = self.bits.len() as u64;
        (0..u64::from(self.num_hashes))
            .map(move |i| (h1.wrapping_add(i.wrapping_mul(h2)) % num_bits) as usize)
    }
}

impl std::fmt::Debug for BloomBits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BloomBits")
            .field("num_bits", &self.bits.len())
            .field("num_hashes", &self.num_hashes)
            .field("count", &self.count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizing_matches_formulas() {
        let m = BloomBits::optimal_bits(1_000, 0.01);
        // -1000 * ln(0.01) / ln(2)^2 ≈ 9585.06
        assert_eq!(m, 9586);
        assert_eq!(BloomBits::optimal_hashes(m, 1_000), 7);
    }

    #[test]
    fn test_minimum_size() {
        let filter = BloomBits::with_params(1, 0);
        assert_eq!(filter.num_bits(), 64);
        assert_eq!(filter.num_hashes(), 1);
    }

    #[test]
    fn test_no_false_negatives() {
        let mut filter = BloomBits::new(1_000, 0.01);
        let keys: Vec<String> = (0..1_000).map(|i| format!("naid-{i}")).collect();

        for key in &keys {
            filter.insert(key.as_bytes());
        }

        for key in &keys {
            assert!(filter.contains(key.as_bytes()), "false negative for {key}");
        }
    }

    #[test]
    fn test_false_positive_rate_is_bounded() {
        let mut filter = BloomBits::new(1_000, 0.01);
        for i in 0..1_000 {
            filter.insert(format!("present-{i}").as_bytes());
        }

        let false_positives = (0..10_000)
            .filter(|i| filter.contains(format!("absent-{i}").as_bytes()))
            .count();

        // Target is 1%; allow generous slack.
        assert!(
            false_positives < 300,
            "false positives: {false_positives}/10000"
        );
    }

    #[test]
    fn test_insert_reports_novelty() {
        let mut filter = BloomBits::new(100, 0.001);

        assert!(filter.insert(b"country-Italy"));
        assert!(!filter.insert(b"country-Italy"));
        assert_eq!(filter.count(), 1);
    }

    #[test]
    fn test_empty_filter_contains_nothing() {
        let filter = BloomBits::new(100, 0.01);
        assert!(!filter.contains(b"country-Italy"));
    }
}

// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::hash::Hash;

use crate::bits::BitArray;
use crate::hash::DEFAULT_HASH_SEED;
use crate::hash::HashFamily;
use crate::hash::hash128;

const MIN_NUM_BITS: u64 = 64;
const MAX_NUM_BITS: u64 = (1u64 << 35) - 64;

/// A Bloom filter for probabilistic set membership testing.
///
/// Provides fast membership queries with:
/// - No false negatives (inserted items always return `true`)
/// - Tunable false positive rate
/// - Constant space usage
///
/// Use [`BloomFilterBuilder`] to construct instances.
#[derive(Debug, Clone, PartialEq)]
pub struct BloomFilter {
    /// Hash seed shared by all derived hash functions
    seed: u32,
    /// Number of hash functions to use (k)
    num_hashes: u16,
    /// Derive the k bit indices from one 128-bit digest instead of k
    /// independent digests
    double_hashing: bool,
    /// Count of bits set to 1
    num_bits_set: u64,
    bits: BitArray,
}

impl BloomFilter {
    /// Returns a builder for creating a Bloom filter.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyclass::bloom::BloomFilterBuilder;
    ///
    /// // By accuracy (recommended)
    /// let filter = BloomFilterBuilder::with_accuracy(1000, 0.01).build();
    ///
    /// // By size (manual)
    /// let filter = BloomFilterBuilder::with_size(10_000, 7).build();
    /// ```
    pub fn builder() -> BloomFilterBuilder {
        BloomFilterBuilder::default()
    }

    /// Tests whether an item is possibly in the set.
    ///
    /// Returns:
    /// - `true`: Item was **possibly** inserted (or false positive)
    /// - `false`: Item was **definitely not** inserted
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyclass::bloom::BloomFilterBuilder;
    /// let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01).build();
    /// filter.insert("apple");
    ///
    /// assert!(filter.contains(&"apple"));
    /// assert!(!filter.contains(&"grape")); // never inserted (probably)
    /// ```
    pub fn contains<T: Hash + ?Sized>(&self, item: &T) -> bool {
        if self.is_empty() {
            return false;
        }

        for i in 0..self.num_hashes {
            if !self.bits.test(self.bit_index(item, i)) {
                return false;
            }
        }
        true
    }

    /// Inserts an item into the filter.
    ///
    /// After insertion, `contains(item)` will always return `true`.
    pub fn insert<T: Hash>(&mut self, item: T) {
        for i in 0..self.num_hashes {
            let index = self.bit_index(&item, i);
            if !self.bits.test(index) {
                self.bits.set(index);
                self.num_bits_set += 1;
            }
        }
    }

    /// Resets the filter to its initial empty state.
    ///
    /// Clears all bits while preserving capacity and configuration.
    pub fn clear(&mut self) {
        self.bits.reset_all();
        self.num_bits_set = 0;
    }

    /// Returns whether the filter is empty (no items inserted).
    pub fn is_empty(&self) -> bool {
        self.num_bits_set == 0
    }

    /// Returns the number of bits set to 1.
    pub fn bits_used(&self) -> u64 {
        self.num_bits_set
    }

    /// Returns the total number of bits in the filter.
    pub fn len_bits(&self) -> usize {
        self.bits.len()
    }

    /// Returns the backing storage size in bytes.
    pub fn byte_size(&self) -> usize {
        self.bits.byte_size()
    }

    /// Returns the number of hash functions used.
    pub fn num_hashes(&self) -> u16 {
        self.num_hashes
    }

    /// Returns the hash seed.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Returns the current load factor (fraction of bits set).
    ///
    /// Values above 0.5 indicate degraded false positive rates.
    pub fn load_factor(&self) -> f64 {
        self.num_bits_set as f64 / self.bits.len() as f64
    }

    /// Computes the i-th derived bit index for an item.
    ///
    /// Double hashing uses the Kirsch-Mitzenmacher scheme `h1 + i * h2`
    /// over one 128-bit digest; the independent mode hashes once per
    /// derived index with a per-index seed.
    fn bit_index<T: Hash + ?Sized>(&self, item: &T, i: u16) -> usize {
        let m = self.bits.len() as u64;
        let digest = if self.double_hashing {
            let (h1, h2) = hash128(self.seed, item);
            h1.wrapping_add(u64::from(i).wrapping_mul(h2))
        } else {
            let member = HashFamily::with_seed(self.seed.wrapping_add(u32::from(i)));
            u64::from(member.hash(item))
        };
        (digest % m) as usize
    }
}

/// Builder for creating [`BloomFilter`] instances.
///
/// Provides two construction modes:
/// - [`with_accuracy()`](Self::with_accuracy): target item count and false
///   positive rate (recommended)
/// - [`with_size()`](Self::with_size): exact bit count and hash functions
#[derive(Debug, Clone)]
pub struct BloomFilterBuilder {
    num_bits: Option<u64>,
    num_hashes: Option<u16>,
    seed: u32,
    double_hashing: bool,
}

impl Default for BloomFilterBuilder {
    fn default() -> Self {
        BloomFilterBuilder {
            num_bits: None,
            num_hashes: None,
            seed: DEFAULT_HASH_SEED,
            double_hashing: true,
        }
    }
}

impl BloomFilterBuilder {
    /// Creates a builder with optimal parameters for a target accuracy.
    ///
    /// # Arguments
    ///
    /// - `max_items`: Maximum expected number of distinct items
    /// - `fpp`: Target false positive probability (e.g., 0.01 for 1%)
    ///
    /// # Panics
    ///
    /// Panics if `max_items` is 0 or `fpp` is not in (0.0, 1.0).
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyclass::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_accuracy(10_000, 0.01)
    ///     .seed(42)
    ///     .build();
    /// ```
    pub fn with_accuracy(max_items: u64, fpp: f64) -> Self {
        assert!(max_items > 0, "max_items must be greater than 0");
        assert!(
            fpp > 0.0 && fpp < 1.0,
            "fpp must be between 0.0 and 1.0 (exclusive)"
        );

        let num_bits = Self::suggest_num_bits(max_items, fpp);
        let num_hashes = Self::suggest_num_hashes(max_items, num_bits);

        BloomFilterBuilder {
            num_bits: Some(num_bits),
            num_hashes: Some(num_hashes),
            ..Self::default()
        }
    }

    /// Creates a builder with manual size specification.
    ///
    /// # Panics
    ///
    /// Panics if `num_bits` or `num_hashes` is out of the supported range.
    pub fn with_size(num_bits: u64, num_hashes: u16) -> Self {
        assert!(
            (MIN_NUM_BITS..=MAX_NUM_BITS).contains(&num_bits),
            "num_bits must be within [{MIN_NUM_BITS}, {MAX_NUM_BITS}]"
        );
        assert!(
            (1..=100).contains(&num_hashes),
            "num_hashes must be within [1, 100]"
        );

        BloomFilterBuilder {
            num_bits: Some(num_bits),
            num_hashes: Some(num_hashes),
            ..Self::default()
        }
    }

    /// Sets a custom hash seed.
    ///
    /// Filters with different seeds report unrelated false positives.
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Chooses between double hashing (default) and independently seeded
    /// hash functions for deriving the k bit indices.
    pub fn double_hashing(mut self, double_hashing: bool) -> Self {
        self.double_hashing = double_hashing;
        self
    }

    /// Builds the Bloom filter.
    ///
    /// # Panics
    ///
    /// Panics if neither `with_accuracy()` nor `with_size()` was called.
    pub fn build(self) -> BloomFilter {
        let num_bits = self
            .num_bits
            .expect("Must call with_accuracy() or with_size() before build()");
        let num_hashes = self
            .num_hashes
            .expect("Must call with_accuracy() or with_size() before build()");

        BloomFilter {
            seed: self.seed,
            num_hashes,
            double_hashing: self.double_hashing,
            num_bits_set: 0,
            bits: BitArray::new(num_bits as usize),
        }
    }

    /// Suggests the optimal number of bits given max items and target FPP.
    ///
    /// Formula: `m = -n * ln(p) / (ln(2)^2)`, rounded up to a word multiple.
    pub fn suggest_num_bits(max_items: u64, fpp: f64) -> u64 {
        let n = max_items as f64;
        let ln2_squared = std::f64::consts::LN_2 * std::f64::consts::LN_2;

        let bits = (-n * fpp.ln() / ln2_squared).ceil() as u64;
        let bits = bits.div_ceil(64) * 64;

        bits.clamp(MIN_NUM_BITS, MAX_NUM_BITS)
    }

    /// Suggests the optimal number of hash functions given max items and
    /// bit count.
    ///
    /// Formula: `k = (m/n) * ln(2)`.
    pub fn suggest_num_hashes(max_items: u64, num_bits: u64) -> u16 {
        let k = (num_bits as f64 / max_items as f64 * std::f64::consts::LN_2).round();
        (k as u16).clamp(1, 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_with_accuracy() {
        let filter = BloomFilterBuilder::with_accuracy(1000, 0.01).build();
        assert!(filter.len_bits() >= 9000);
        assert_eq!(filter.num_hashes(), 7);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_builder_with_size() {
        let filter = BloomFilterBuilder::with_size(1024, 5).build();
        assert_eq!(filter.len_bits(), 1024);
        assert_eq!(filter.num_hashes(), 5);
    }

    #[test]
    fn test_insert_and_contains() {
        let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01).build();

        assert!(!filter.contains(&"apple"));
        filter.insert("apple");
        assert!(filter.contains(&"apple"));
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_no_false_negatives() {
        let mut filter = BloomFilterBuilder::with_accuracy(1000, 0.01).build();
        for i in 0..1000u64 {
            filter.insert(i);
        }
        for i in 0..1000u64 {
            assert!(filter.contains(&i));
        }
    }

    #[test]
    fn test_single_hash_filter() {
        let mut filter = BloomFilterBuilder::with_size(4096, 1).build();
        filter.insert("x");
        assert_eq!(filter.bits_used(), 1);
        assert!(filter.contains(&"x"));
    }

    #[test]
    fn test_independent_hashing_mode() {
        let mut filter = BloomFilterBuilder::with_size(4096, 4)
            .double_hashing(false)
            .build();
        for i in 0..64u64 {
            filter.insert(i);
        }
        for i in 0..64u64 {
            assert!(filter.contains(&i));
        }
    }

    #[test]
    fn test_clear() {
        let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01).build();
        filter.insert("test");
        assert!(!filter.is_empty());

        filter.clear();
        assert!(filter.is_empty());
        assert!(!filter.contains(&"test"));
    }

    #[test]
    fn test_seed_changes_bit_pattern() {
        let mut f1 = BloomFilterBuilder::with_size(4096, 1).seed(1).build();
        let mut f2 = BloomFilterBuilder::with_size(4096, 1).seed(2).build();
        for i in 0..128u64 {
            f1.insert(i);
            f2.insert(i);
        }
        assert_ne!(f1, f2);
    }

    #[test]
    #[should_panic(expected = "max_items must be greater than 0")]
    fn test_invalid_max_items() {
        BloomFilterBuilder::with_accuracy(0, 0.01);
    }

    #[test]
    #[should_panic(expected = "fpp must be between")]
    fn test_invalid_fpp() {
        BloomFilterBuilder::with_accuracy(100, 1.5);
    }
}

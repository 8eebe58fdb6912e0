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

use crate::bloom::BloomFilter;
use crate::bloom::BloomFilterBuilder;
use crate::hash::DEFAULT_HASH_SEED;

/// A multi-level Bloom filter classifying keys into R (true) or S (false).
///
/// Exact on the key sets it was built from; keys outside R ∪ S resolve to
/// whichever side the filters happen to vote for.
///
/// Use [`MlbfBuilder`] to construct instances.
#[derive(Debug, Clone)]
pub struct MlbfCascade {
    levels: Vec<BloomFilter>,
}

impl MlbfCascade {
    /// Returns a builder for creating a cascade.
    pub fn builder() -> MlbfBuilder {
        MlbfBuilder::default()
    }

    /// Classifies a key: `true` = R, `false` = S.
    ///
    /// A key absent from some level is conclusively classified by the
    /// number of levels that reported it present so far; a key present in
    /// every level is classified by the parity of the level count.
    pub fn contains<T: Hash + ?Sized>(&self, key: &T) -> bool {
        let mut in_revoked = false;
        for level in &self.levels {
            if level.contains(key) {
                in_revoked = !in_revoked;
            } else {
                return in_revoked;
            }
        }
        self.levels.len() % 2 == 1
    }

    /// Returns the number of levels the build produced.
    pub fn levels(&self) -> usize {
        self.levels.len()
    }

    /// Returns the total backing storage across all levels, in bytes.
    pub fn byte_size(&self) -> usize {
        self.levels.iter().map(BloomFilter::byte_size).sum()
    }

    /// Returns true if the cascade holds no levels.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Builder for [`MlbfCascade`] instances.
///
/// The defaults reproduce the canonical cascade: every level sized at
/// `base_fpp` with a single hash function, building until a level yields
/// no false positives. The remaining knobs express the benchmark-oriented
/// variants: a distinct first-level rate, optimal per-level hash counts,
/// and early termination at a small residual.
///
/// # Examples
///
/// ```
/// use keyclass::mlbf::MlbfCascade;
///
/// let revoked: Vec<String> = (0..500).map(|i| format!("r{i}")).collect();
/// let stay: Vec<String> = (0..500).map(|i| format!("s{i}")).collect();
///
/// let cascade = MlbfCascade::builder()
///     .base_fpp(0.5)
///     .build(&revoked, &stay);
///
/// assert!(cascade.contains(&revoked[17]));
/// assert!(!cascade.contains(&stay[17]));
/// ```
#[derive(Debug, Clone)]
pub struct MlbfBuilder {
    base_fpp: f64,
    first_level_fpp: Option<f64>,
    optimal_hashes: bool,
    stop_threshold: usize,
    seed: u32,
}

impl Default for MlbfBuilder {
    fn default() -> Self {
        Self {
            base_fpp: 0.5,
            first_level_fpp: None,
            optimal_hashes: false,
            stop_threshold: 0,
            seed: DEFAULT_HASH_SEED,
        }
    }
}

impl MlbfBuilder {
    /// Sets the per-level false positive rate target.
    ///
    /// # Panics
    ///
    /// Panics if `fpp` is not in (0.0, 1.0).
    pub fn base_fpp(mut self, fpp: f64) -> Self {
        assert!(
            fpp > 0.0 && fpp < 1.0,
            "fpp must be between 0.0 and 1.0 (exclusive)"
        );
        self.base_fpp = fpp;
        self
    }

    /// Sets a distinct rate for level 1 only.
    ///
    /// A tighter first level shrinks the largest residual at the cost of
    /// the largest filter; later levels keep the base rate.
    ///
    /// # Panics
    ///
    /// Panics if `fpp` is not in (0.0, 1.0).
    pub fn first_level_fpp(mut self, fpp: f64) -> Self {
        assert!(
            fpp > 0.0 && fpp < 1.0,
            "fpp must be between 0.0 and 1.0 (exclusive)"
        );
        self.first_level_fpp = Some(fpp);
        self
    }

    /// Uses the optimal hash count per level instead of the single hash
    /// the cascade is normally run with.
    ///
    /// One hash per level is the behavior the cascade's published numbers
    /// come from; the optimal count trades query time for fewer levels.
    pub fn optimal_hashes(mut self, optimal: bool) -> Self {
        self.optimal_hashes = optimal;
        self
    }

    /// Stops building once a level's residual is no larger than this
    /// (default 0: build until the residual is empty).
    ///
    /// A nonzero threshold leaves up to that many keys misclassified.
    pub fn stop_threshold(mut self, threshold: usize) -> Self {
        self.stop_threshold = threshold;
        self
    }

    /// Sets the base hash seed shared by the levels.
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Builds a cascade from disjoint key sequences `revoked` and `stay`.
    pub fn build<K: Hash + Clone>(self, revoked: &[K], stay: &[K]) -> MlbfCascade {
        let mut levels = Vec::new();
        let mut to_insert: Vec<K> = revoked.to_vec();
        let mut to_check: Vec<K> = stay.to_vec();

        for level in 1u32.. {
            let fpp = if level == 1 {
                self.first_level_fpp.unwrap_or(self.base_fpp)
            } else {
                self.base_fpp
            };

            let capacity = (to_insert.len() + to_check.len()).max(1) as u64;
            let num_bits = BloomFilterBuilder::suggest_num_bits(capacity, fpp);
            let num_hashes = if self.optimal_hashes {
                BloomFilterBuilder::suggest_num_hashes(capacity, num_bits)
            } else {
                1
            };
            // each level gets its own seed: with a shared seed a colliding
            // key pair would collide again at every level of equal size and
            // the residual would never drain
            let mut filter = BloomFilterBuilder::with_size(num_bits, num_hashes)
                .seed(self.seed.wrapping_add(level))
                .build();

            for key in &to_insert {
                filter.insert(key);
            }
            let false_positives: Vec<K> = to_check
                .iter()
                .filter(|key| filter.contains(*key))
                .cloned()
                .collect();
            levels.push(filter);

            if false_positives.len() <= self.stop_threshold {
                break;
            }

            // the survivors go down a level and the roles swap
            to_check = std::mem::replace(&mut to_insert, false_positives);
        }

        MlbfCascade { levels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_sets_classify_exactly() {
        let revoked = ["a", "b", "c"];
        let stay = ["d", "e", "f"];
        let cascade = MlbfCascade::builder().base_fpp(0.5).build(&revoked, &stay);

        for key in revoked {
            assert!(cascade.contains(key));
        }
        for key in stay {
            assert!(!cascade.contains(key));
        }
    }

    #[test]
    fn test_empty_stay_side() {
        let revoked = ["a", "b"];
        let cascade = MlbfCascade::builder().build(&revoked, &[]);
        assert_eq!(cascade.levels(), 1);
        assert!(cascade.contains("a"));
        assert!(cascade.contains("b"));
    }

    #[test]
    fn test_empty_revoked_side() {
        let stay = ["x", "y"];
        let cascade = MlbfCascade::builder().build(&[], &stay);
        assert!(!cascade.contains("x"));
        assert!(!cascade.contains("y"));
    }

    #[test]
    fn test_both_sides_empty() {
        let cascade = MlbfCascade::builder().build::<&str>(&[], &[]);
        assert_eq!(cascade.levels(), 1);
        assert!(!cascade.contains("anything"));
    }

    #[test]
    fn test_byte_size_sums_levels() {
        let revoked: Vec<u64> = (0..100).collect();
        let stay: Vec<u64> = (100..200).collect();
        let cascade = MlbfCascade::builder().build(&revoked, &stay);
        assert!(cascade.byte_size() >= cascade.levels() * 8);
    }

    #[test]
    fn test_first_level_fpp_grows_first_filter() {
        let revoked: Vec<u64> = (0..1000).collect();
        let stay: Vec<u64> = (1000..2000).collect();
        let loose = MlbfCascade::builder().build(&revoked, &stay);
        let tight = MlbfCascade::builder()
            .first_level_fpp(0.01)
            .build(&revoked, &stay);
        assert!(tight.levels[0].len_bits() > loose.levels[0].len_bits());
    }

    #[test]
    fn test_stop_threshold_shortens_cascade() {
        let revoked: Vec<u64> = (0..2000).collect();
        let stay: Vec<u64> = (2000..4000).collect();
        let full = MlbfCascade::builder().build(&revoked, &stay);
        let cut = MlbfCascade::builder()
            .stop_threshold(50)
            .build(&revoked, &stay);
        assert!(cut.levels() <= full.levels());
    }
}

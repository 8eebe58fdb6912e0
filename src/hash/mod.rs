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

//! Seeded hash functions over arbitrary `Hash` keys.
//!
//! Othello needs a *family* of 32-bit hash functions: the build draws seed
//! pairs until the induced bipartite graph is acyclic, so the seed must be
//! settable after construction and two members with independent seeds must
//! behave independently. [`HashFamily`] provides exactly that on top of
//! 32-bit murmur3.

use std::hash::Hash;
use std::hash::Hasher;

/// Seed used by a [`HashFamily`] constructed with [`HashFamily::new`].
pub const DEFAULT_HASH_SEED: u32 = 1_611_623_773;

/// A settable-seed 32-bit hash function over any `Hash` key.
///
/// Deterministic for a given (seed, key) pair. Reseeding with
/// [`set_seed`](Self::set_seed) yields a statistically unrelated member of
/// the family, which is what the Othello build relies on when it rehashes.
///
/// # Examples
///
/// ```
/// use keyclass::hash::HashFamily;
///
/// let mut h = HashFamily::with_seed(12);
/// let before = h.hash(&"key");
/// assert_eq!(before, h.hash(&"key"));
///
/// h.set_seed(13);
/// assert_ne!(before, h.hash(&"key"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashFamily {
    seed: u32,
}

impl HashFamily {
    /// Creates a family member with the default seed.
    pub fn new() -> Self {
        Self {
            seed: DEFAULT_HASH_SEED,
        }
    }

    /// Creates a family member with the given seed.
    pub fn with_seed(seed: u32) -> Self {
        Self { seed }
    }

    /// Replaces the seed, selecting a different member of the family.
    pub fn set_seed(&mut self, seed: u32) {
        self.seed = seed;
    }

    /// Returns the current seed.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Hashes a key to a 32-bit digest.
    pub fn hash<T: Hash + ?Sized>(&self, key: &T) -> u32 {
        let mut hasher = mur3::Hasher32::with_seed(self.seed);
        key.hash(&mut hasher);
        hasher.finish() as u32
    }
}

impl Default for HashFamily {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes a 128-bit digest split into two 64-bit halves.
///
/// The Bloom filter derives all of its bit indices from one such digest via
/// double hashing, so a lookup costs a single pass over the key.
pub(crate) fn hash128<T: Hash + ?Sized>(seed: u32, key: &T) -> (u64, u64) {
    let mut hasher = mur3::Hasher128::with_seed(seed);
    key.hash(&mut hasher);
    hasher.finish128()
}

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

use crate::error::Error;
use crate::error::ErrorKind;
use crate::othello::cells::CellStore;
use crate::othello::cells::Value;
use crate::othello::control::ControlPlaneOthello;
use crate::othello::control::DEFAULT_MAX_REHASH;
use crate::othello::control::PackedOthello;

/// Default seed of the build RNG; fixed so builds reproduce exactly.
pub const DEFAULT_BUILD_SEED: u64 = 0x1990_0111;

/// Builder for [`ControlPlaneOthello`] instances.
///
/// # Examples
///
/// ```
/// use keyclass::othello::OthelloBuilder;
///
/// let keys: Vec<u64> = (0..100).collect();
/// let values: Vec<u32> = (0..100).collect();
/// let othello = OthelloBuilder::default()
///     .rng_seed(42)
///     .max_rehash(100)
///     .build(keys, values)
///     .unwrap();
///
/// assert_eq!(othello.query(&99), 99);
/// ```
#[derive(Debug, Clone)]
pub struct OthelloBuilder {
    rng_seed: u64,
    max_rehash: u32,
}

impl Default for OthelloBuilder {
    fn default() -> Self {
        Self {
            rng_seed: DEFAULT_BUILD_SEED,
            max_rehash: DEFAULT_MAX_REHASH,
        }
    }
}

impl OthelloBuilder {
    /// Sets the seed of the build RNG, which drives both the hash seed
    /// pairs and the random cell initialization.
    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    /// Sets the maximum number of seed pairs a build may try.
    ///
    /// # Panics
    ///
    /// Panics if `max_rehash` is 0.
    pub fn max_rehash(mut self, max_rehash: u32) -> Self {
        assert!(max_rehash > 0, "max_rehash must be at least 1");
        self.max_rehash = max_rehash;
        self
    }

    /// Builds from parallel key and value arrays.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidArgument`](crate::error::ErrorKind) if the
    /// arrays differ in length;
    /// [`ErrorKind::BuildExhausted`](crate::error::ErrorKind) if no
    /// acyclic seed pair is found within the rehash budget.
    pub fn build<K: Hash, V: Value>(
        self,
        keys: Vec<K>,
        values: Vec<V>,
    ) -> Result<ControlPlaneOthello<K, V>, Error> {
        if keys.len() != values.len() {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "keys and values must have equal length",
            )
            .with_context("keys", keys.len())
            .with_context("values", values.len()));
        }
        self.build_pairs(keys.into_iter().zip(values).collect())
    }

    /// Builds from key-value pairs.
    pub fn build_pairs<K: Hash, V: Value>(
        self,
        kvs: Vec<(K, V)>,
    ) -> Result<ControlPlaneOthello<K, V>, Error> {
        self.build_with_cells(kvs)
    }

    /// Builds a 12-bit Othello over the packed cell layout.
    ///
    /// Values are masked to their low 12 bits when stored.
    pub fn build_packed<K: Hash>(self, kvs: Vec<(K, u16)>) -> Result<PackedOthello<K>, Error> {
        let kvs = kvs
            .into_iter()
            .map(|(key, value)| (key, value & 0x0FFF))
            .collect();
        self.build_with_cells(kvs)
    }

    /// Builds over an explicit cell storage type.
    pub(super) fn build_with_cells<K: Hash, V: Value, C: CellStore<V>>(
        self,
        kvs: Vec<(K, V)>,
    ) -> Result<ControlPlaneOthello<K, V, C>, Error> {
        ControlPlaneOthello::with_kvs(kvs, self.rng_seed, self.max_rehash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch_is_rejected() {
        let result = OthelloBuilder::default().build(vec![1u64, 2], vec![1u32]);
        let err = result.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_same_seed_builds_identical_tables() {
        let keys: Vec<u64> = (0..50).collect();
        let values: Vec<u32> = (0..50).collect();
        let a = OthelloBuilder::default()
            .rng_seed(9)
            .build(keys.clone(), values.clone())
            .unwrap();
        let b = OthelloBuilder::default()
            .rng_seed(9)
            .build(keys.clone(), values)
            .unwrap();
        for key in &keys {
            assert_eq!(a.query(key), b.query(key));
            assert_eq!(a.query_index(key), b.query_index(key));
        }
    }

    #[test]
    fn test_packed_masks_values() {
        let othello = OthelloBuilder::default()
            .build_packed(vec![(1u64, 0xFFFF_u16), (2, 0x0123)])
            .unwrap();
        assert_eq!(othello.query(&1), 0x0FFF);
        assert_eq!(othello.query(&2), 0x0123);
    }

    #[test]
    #[should_panic(expected = "max_rehash must be at least 1")]
    fn test_zero_max_rehash_panics() {
        let _ = OthelloBuilder::default().max_rehash(0);
    }
}

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
use std::marker::PhantomData;

use crate::hash::HashFamily;
use crate::othello::cells::CellStore;
use crate::othello::cells::FlatCells;
use crate::othello::cells::Value;
use crate::othello::control::ControlPlaneOthello;

/// A read-only snapshot of an Othello: tables and hash seeds, nothing else.
///
/// Queries cost two hashes, two cell reads, and one XOR. There is no
/// interior mutation, so a snapshot can be shared freely across reader
/// threads; refreshing after control-plane changes is an explicit
/// [`update_from_control_plane`](Self::update_from_control_plane) followed
/// by whatever reader-visible swap the caller uses.
///
/// # Examples
///
/// ```
/// use keyclass::othello::OthelloBuilder;
///
/// let othello = OthelloBuilder::default()
///     .build(vec![7u64, 8, 9], vec![70u32, 80, 90])
///     .unwrap();
/// let plane = othello.snapshot();
///
/// assert_eq!(plane.query(&8), othello.query(&8));
/// ```
#[derive(Debug, Clone)]
pub struct DataPlaneOthello<K, V: Value, C: CellStore<V> = FlatCells<V>> {
    mem: C,
    ma: usize,
    mb: usize,
    hash_a: HashFamily,
    hash_b: HashFamily,
    _marker: PhantomData<fn(&K) -> V>,
}

impl<K: Hash, V: Value, C: CellStore<V>> DataPlaneOthello<K, V, C> {
    pub(super) fn from_control_plane(control: &ControlPlaneOthello<K, V, C>) -> Self {
        Self {
            mem: control.mem.clone(),
            ma: control.ma,
            mb: control.mb,
            hash_a: control.hash_a,
            hash_b: control.hash_b,
            _marker: PhantomData,
        }
    }

    /// Re-copies the tables and seeds from a control plane.
    pub fn update_from_control_plane(&mut self, control: &ControlPlaneOthello<K, V, C>) {
        self.mem = control.mem.clone();
        self.ma = control.ma;
        self.mb = control.mb;
        self.hash_a = control.hash_a;
        self.hash_b = control.hash_b;
    }

    /// Returns the value stored for `key`; arbitrary for unknown keys.
    pub fn query(&self, key: &K) -> V {
        let a = (self.hash_a.hash(key) as usize) & (self.ma - 1);
        let b = self.ma + ((self.hash_b.hash(key) as usize) & (self.mb - 1));
        self.mem.get(a) ^ self.mem.get(b)
    }

    /// Returns the length of table A.
    pub fn ma(&self) -> usize {
        self.ma
    }

    /// Returns the length of table B.
    pub fn mb(&self) -> usize {
        self.mb
    }

    /// Returns the size of the value tables in bytes.
    pub fn byte_size(&self) -> usize {
        self.mem.byte_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::othello::OthelloBuilder;

    #[test]
    fn test_snapshot_agrees_with_control_plane() {
        let keys: Vec<u64> = (0..2_000).collect();
        let values: Vec<u32> = (0..2_000).map(|v| v * 3 + 1).collect();
        let othello = OthelloBuilder::default()
            .build(keys.clone(), values)
            .unwrap();
        let plane = othello.snapshot();

        for key in &keys {
            assert_eq!(plane.query(key), othello.query(key));
        }
        assert_eq!(plane.byte_size(), othello.byte_size());
    }

    #[test]
    fn test_update_from_control_plane_tracks_changes() {
        let mut othello = OthelloBuilder::default()
            .build(vec![1u64, 2, 3], vec![10u32, 20, 30])
            .unwrap();
        let mut plane = othello.snapshot();

        othello.insert((4, 40)).unwrap();
        othello.update(&1, 11).unwrap();
        plane.update_from_control_plane(&othello);

        assert_eq!(plane.query(&1), 11);
        assert_eq!(plane.query(&4), 40);
    }

    #[test]
    fn test_snapshot_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DataPlaneOthello<u64, u32>>();
        assert_send_sync::<DataPlaneOthello<String, bool>>();
    }
}

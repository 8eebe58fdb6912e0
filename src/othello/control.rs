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

use std::collections::HashSet;
use std::collections::VecDeque;
use std::hash::Hash;

use crate::common::random::RandomSource;
use crate::common::random::XorShift64;
use crate::disjoint::DisjointSet;
use crate::error::Error;
use crate::error::ErrorKind;
use crate::hash::HashFamily;
use crate::othello::cells::CellStore;
use crate::othello::cells::FlatCells;
use crate::othello::cells::PackedCells12;
use crate::othello::cells::Value;
use crate::othello::data::DataPlaneOthello;

/// Maximum number of seed pairs tried before a build is abandoned.
pub const DEFAULT_MAX_REHASH: u32 = 5000;

/// Adjacency-list sentinel: no further key on this list.
const NO_KEY: i32 = -1;

/// An Othello that stores 12-bit values in the packed cell layout.
///
/// The store truncates cells to 12 bits, so values must stay within
/// `0..0x1000` for queries to round-trip.
pub type PackedOthello<K> = ControlPlaneOthello<K, u16, PackedCells12>;

/// The mutable side of an Othello: key-value list, adjacency, and build
/// machinery.
///
/// Keys hash to one cell in table A (length `ma`) and one in table B
/// (length `mb`, offset by `ma`); each key is an undirected edge between
/// its two cells. The build draws hash seed pairs until the edge graph is
/// acyclic, then assigns cells so that `mem[a] ^ mem[b]` yields the key's
/// value and `ind_mem[a] ^ ind_mem[b]` yields its position in the key list.
///
/// Construct through [`OthelloBuilder`](crate::othello::OthelloBuilder).
/// After a successful build the structure supports O(1) queries,
/// amortized-O(1) insertion, and deletion; all mutation is single-threaded.
/// For a shareable read-only view take a [`snapshot`](Self::snapshot).
#[derive(Debug, Clone)]
pub struct ControlPlaneOthello<K, V: Value, C: CellStore<V> = FlatCells<V>> {
    pub(super) mem: C,
    pub(super) ind_mem: Vec<u32>,
    pub(super) ma: usize,
    pub(super) mb: usize,
    pub(super) hash_a: HashFamily,
    pub(super) hash_b: HashFamily,

    kvs: Vec<(K, V)>,
    /// First key index on each node's list, or −1.
    head: Vec<i32>,
    /// Next key sharing this key's A endpoint, or −1.
    next_a: Vec<i32>,
    /// Next key sharing this key's B endpoint, or −1.
    next_b: Vec<i32>,
    /// Cycle detection during edge placement; reset after every build.
    disj: DisjointSet,
    /// Nodes assigned by the build fill.
    filled: Vec<bool>,

    rng: XorShift64,
    max_rehash: u32,
    try_count: u32,
}

impl<K: Hash, V: Value, C: CellStore<V>> ControlPlaneOthello<K, V, C> {
    pub(super) fn with_kvs(
        kvs: Vec<(K, V)>,
        rng_seed: u64,
        max_rehash: u32,
    ) -> Result<Self, Error> {
        let key_count = kvs.len();
        let (ma, mb) = Self::table_sizes(key_count);
        let nodes = ma + mb;

        let mut othello = Self {
            mem: C::with_len(nodes),
            ind_mem: vec![0; nodes],
            ma,
            mb,
            hash_a: HashFamily::new(),
            hash_b: HashFamily::new(),
            kvs,
            head: vec![NO_KEY; nodes],
            next_a: vec![NO_KEY; key_count],
            next_b: vec![NO_KEY; key_count],
            disj: DisjointSet::new(nodes),
            filled: vec![false; nodes],
            rng: XorShift64::seeded(rng_seed),
            max_rehash,
            try_count: 0,
        };
        let reserve = 256usize.max(key_count * 2) - key_count;
        othello.kvs.reserve(reserve);
        othello.next_a.reserve(reserve);
        othello.next_b.reserve(reserve);
        othello.build()?;
        Ok(othello)
    }

    /// Table sizes for `key_count` keys: the smallest powers of two with
    /// `ma >= 1.333 * n` (floor 128) and `mb >= n` (floor 256).
    fn table_sizes(key_count: usize) -> (usize, usize) {
        let mut hl1 = 7u32;
        let mut hl2 = 8u32;
        while ((1u64 << hl1) as f64) < key_count as f64 * 1.333334 {
            hl1 += 1;
        }
        while (1u64 << hl2) < key_count as u64 {
            hl2 += 1;
        }
        (1usize << hl1, 1usize << hl2)
    }

    fn node_count(&self) -> usize {
        self.ma + self.mb
    }

    fn index_a(&self, key: &K) -> usize {
        (self.hash_a.hash(key) as usize) & (self.ma - 1)
    }

    fn index_b(&self, key: &K) -> usize {
        self.ma + ((self.hash_b.hash(key) as usize) & (self.mb - 1))
    }

    fn endpoints(&self, key: &K) -> (usize, usize) {
        (self.index_a(key), self.index_b(key))
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Rebuilds from scratch, redrawing seed pairs until the edge graph is
    /// acyclic or the rehash budget is exhausted.
    fn build(&mut self) -> Result<(), Error> {
        self.try_count = 0;
        loop {
            self.new_seeds();
            if self.try_build() {
                return Ok(());
            }
            if self.try_count >= self.max_rehash {
                return Err(Error::new(
                    ErrorKind::BuildExhausted,
                    "no acyclic hash seed pair found; enlarge the tables or raise max_rehash",
                )
                .with_context("attempts", self.try_count)
                .with_context("keys", self.kvs.len())
                .with_context("ma", self.ma)
                .with_context("mb", self.mb));
            }
        }
    }

    fn new_seeds(&mut self) {
        let seed_a = self.rng.next_u32();
        let seed_b = self.rng.next_u32();
        self.hash_a.set_seed(seed_a);
        self.hash_b.set_seed(seed_b);
        self.try_count += 1;
    }

    /// One build attempt under the current seeds.
    fn try_build(&mut self) -> bool {
        self.reset_build_state();

        if self.kvs.is_empty() {
            return true;
        }

        if !self.place_edges() {
            return false;
        }
        self.fill_all();

        // not maintained across insert/erase
        self.disj.reset();
        true
    }

    /// Discards everything derived from the previous seed pair. Unused
    /// cells keep random garbage so unknown-key queries return noise.
    fn reset_build_state(&mut self) {
        self.mem.randomize(&mut self.rng);
        for slot in &mut self.ind_mem {
            *slot = self.rng.next_u32();
        }
        self.filled.fill(false);
        self.head.fill(NO_KEY);
        self.next_a.fill(NO_KEY);
        self.next_b.fill(NO_KEY);
        self.disj.reset();
    }

    /// Places every key's edge, failing as soon as one would close a cycle.
    fn place_edges(&mut self) -> bool {
        for kid in 0..self.kvs.len() {
            let (a, b) = self.endpoints(&self.kvs[kid].0);
            if self.disj.same_set(a, b) {
                return false;
            }
            self.add_edge(kid, a, b);
        }
        true
    }

    /// Prepends `kid` to both endpoint lists and unions the endpoints.
    fn add_edge(&mut self, kid: usize, a: usize, b: usize) {
        self.next_a[kid] = self.head[a];
        self.head[a] = kid as i32;
        self.next_b[kid] = self.head[b];
        self.head[b] = kid as i32;
        self.disj.merge(a, b);
    }

    /// Assigns cells component by component: fix each root to a random
    /// value, then propagate through the tree.
    fn fill_all(&mut self) {
        for node in 0..self.node_count() {
            if self.disj.is_root(node) {
                let value = V::from_random(self.rng.next_u64());
                self.mem.set(node, value);
                self.fill_tree_from::<true, true, true>(node);
            }
        }
    }

    /// BFS over the component containing `root`, deriving each newly
    /// reached cell from the one across the connecting key.
    ///
    /// The same key sits on both endpoint lists, so nodes must be visited
    /// exactly once; the local visited set enforces that.
    fn fill_tree_from<const MARK: bool, const VALUES: bool, const INDICES: bool>(
        &mut self,
        root: usize,
    ) {
        if MARK {
            self.filled[root] = true;
        }

        let mut queue = VecDeque::new();
        queue.push_back(root);
        let mut visited = HashSet::new();
        visited.insert(root);

        while let Some(node) = queue.pop_front() {
            let at_part_a = node < self.ma;

            let mut cursor = self.head[node];
            while cursor != NO_KEY {
                let kid = cursor as usize;
                let (a, b) = self.endpoints(&self.kvs[kid].0);

                // one endpoint is already visited; derive the other
                let (from, to) = if visited.contains(&a) { (a, b) } else { (b, a) };
                if !visited.contains(&to) {
                    if VALUES {
                        let value = self.kvs[kid].1 ^ self.mem.get(from);
                        self.mem.set(to, value);
                    }
                    if INDICES {
                        self.ind_mem[to] = kid as u32 ^ self.ind_mem[from];
                    }
                    if MARK {
                        self.filled[to] = true;
                    }
                    visited.insert(to);
                    queue.push_back(to);
                }

                cursor = if at_part_a {
                    self.next_a[kid]
                } else {
                    self.next_b[kid]
                };
            }
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Returns the value stored for `key`.
    ///
    /// Defined only for keys that were inserted; for unknown keys the
    /// result is arbitrary but deterministic.
    pub fn query(&self, key: &K) -> V {
        let (a, b) = self.endpoints(key);
        self.mem.get(a) ^ self.mem.get(b)
    }

    /// Returns the position of `key` in the key-value list.
    ///
    /// Arbitrary for unknown keys; combine with [`pairs`](Self::pairs) or
    /// [`is_member`](Self::is_member) to validate.
    pub fn query_index(&self, key: &K) -> u32 {
        let (a, b) = self.endpoints(key);
        self.ind_mem[a] ^ self.ind_mem[b]
    }

    /// Exact membership over the inserted key set: one XOR and one key
    /// comparison.
    pub fn is_member(&self, key: &K) -> bool
    where
        K: PartialEq,
    {
        let index = self.query_index(key) as usize;
        index < self.kvs.len() && self.kvs[index].0 == *key
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.kvs.len()
    }

    /// Returns true if no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.kvs.is_empty()
    }

    /// Returns the stored key-value pairs in index order.
    pub fn pairs(&self) -> &[(K, V)] {
        &self.kvs
    }

    /// Returns the length of table A.
    pub fn ma(&self) -> usize {
        self.ma
    }

    /// Returns the length of table B.
    pub fn mb(&self) -> usize {
        self.mb
    }

    /// Returns the hash function for table A.
    pub fn hash_a(&self) -> HashFamily {
        self.hash_a
    }

    /// Returns the hash function for table B.
    pub fn hash_b(&self) -> HashFamily {
        self.hash_b
    }

    /// Returns the size of the value tables in bytes.
    pub fn byte_size(&self) -> usize {
        self.mem.byte_size()
    }

    /// Returns the number of rehashes the most recent build needed.
    pub fn rehash_count(&self) -> u32 {
        self.try_count
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Inserts a key-value pair.
    ///
    /// Usually O(component size): the new edge is added and only the
    /// affected component is re-derived. If the edge would close a cycle
    /// under the current seeds, or the tables must grow, the whole
    /// structure is rebuilt.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::BuildExhausted`](crate::error::ErrorKind) if a
    /// triggered rebuild runs out of rehash attempts; the new pair is not
    /// stored and the structure is left reset.
    pub fn insert(&mut self, kv: (K, V)) -> Result<(), Error>
    where
        K: PartialEq,
    {
        debug_assert!(!self.is_member(&kv.0), "duplicate keys are unsupported");

        self.grow_tables(self.kvs.len() + 1)?;

        let (a, b) = self.endpoints(&kv.0);
        let kid = self.kvs.len();
        self.kvs.push(kv);
        self.next_a.push(NO_KEY);
        self.next_b.push(NO_KEY);

        if self.connects(a, b) {
            // the new edge closes a cycle; rebuild everything together
            if let Err(err) = self.build() {
                self.kvs.pop();
                self.next_a.pop();
                self.next_b.pop();
                return Err(err);
            }
        } else {
            self.add_edge(kid, a, b);
            self.fill_tree_from::<false, true, true>(a);
        }
        Ok(())
    }

    /// Grows the tables when the sizing invariant demands, rebuilding the
    /// existing keys on the larger tables first.
    fn grow_tables(&mut self, key_count: usize) -> Result<(), Error> {
        let (next_ma, next_mb) = Self::table_sizes(key_count);
        if next_ma <= self.ma && next_mb <= self.mb {
            return Ok(());
        }

        self.ma = next_ma;
        self.mb = next_mb;
        let nodes = next_ma + next_mb;
        self.mem = C::with_len(nodes);
        self.ind_mem = vec![0; nodes];
        self.head = vec![NO_KEY; nodes];
        self.filled = vec![false; nodes];
        self.disj.resize(nodes);
        self.build()
    }

    /// Searches the adjacency for a path from `a0` to `b0`.
    ///
    /// Keys are enqueued as `+kid` when traversed A→B and `−kid−1` when
    /// traversed B→A; the arriving edge is never walked back. Sound
    /// because the pre-insert graph is a forest.
    fn connects(&self, a0: usize, b0: usize) -> bool {
        let mut queue = VecDeque::new();

        let mut cursor = self.head[a0];
        while cursor != NO_KEY {
            queue.push_back(cursor);
            cursor = self.next_a[cursor as usize];
        }

        while let Some(tagged) = queue.pop_front() {
            let a_to_b = tagged >= 0;
            let kid = if a_to_b {
                tagged as usize
            } else {
                (-tagged - 1) as usize
            };
            let (a, b) = self.endpoints(&self.kvs[kid].0);
            if b == b0 {
                return true;
            }

            if a_to_b {
                let mut cursor = self.head[b];
                while cursor != NO_KEY {
                    if cursor as usize != kid {
                        queue.push_back(-cursor - 1);
                    }
                    cursor = self.next_b[cursor as usize];
                }
            } else {
                let mut cursor = self.head[a];
                while cursor != NO_KEY {
                    if cursor as usize != kid {
                        queue.push_back(cursor);
                    }
                    cursor = self.next_a[cursor as usize];
                }
            }
        }
        false
    }

    /// Removes the key at index `kid`.
    ///
    /// The tail pair moves into the hole; its list links are repaired and
    /// the index table of its component re-derived. Values are untouched.
    ///
    /// # Panics
    ///
    /// Panics if `kid >= len()`.
    pub fn erase_at(&mut self, kid: usize) {
        assert!(
            kid < self.kvs.len(),
            "erase index {kid} out of range for {} keys",
            self.kvs.len()
        );

        let (a, b) = self.endpoints(&self.kvs[kid].0);
        Self::unlink(&mut self.head, &mut self.next_a, a, kid);
        Self::unlink(&mut self.head, &mut self.next_b, b, kid);

        let tail = self.kvs.len() - 1;
        self.kvs.swap_remove(kid);
        self.next_a.swap_remove(kid);
        self.next_b.swap_remove(kid);
        if kid == tail {
            return;
        }

        // the tail key now lives at kid; its two lists still name `tail`
        let (a, b) = self.endpoints(&self.kvs[kid].0);
        Self::relink(&mut self.head, &mut self.next_a, a, tail, kid);
        Self::relink(&mut self.head, &mut self.next_b, b, tail, kid);
        self.fill_tree_from::<false, false, true>(a);
    }

    /// Removes `key` if present; returns whether anything was removed.
    pub fn erase(&mut self, key: &K) -> bool
    where
        K: PartialEq,
    {
        if !self.is_member(key) {
            return false;
        }
        let index = self.query_index(key) as usize;
        self.erase_at(index);
        true
    }

    /// Removes `kid` from the list rooted at `node`.
    fn unlink(head: &mut [i32], next: &mut [i32], node: usize, kid: usize) {
        let kid = kid as i32;
        if head[node] == kid {
            head[node] = next[kid as usize];
        } else {
            let mut cursor = head[node] as usize;
            while next[cursor] != kid {
                cursor = next[cursor] as usize;
            }
            next[cursor] = next[kid as usize];
        }
    }

    /// Rewrites the link to `old` in the list rooted at `node` to `new`.
    fn relink(head: &mut [i32], next: &mut [i32], node: usize, old: usize, new: usize) {
        if head[node] == old as i32 {
            head[node] = new as i32;
        } else {
            let mut cursor = head[node] as usize;
            while next[cursor] != old as i32 {
                cursor = next[cursor] as usize;
            }
            next[cursor] = new as i32;
        }
    }

    /// Replaces the value at index `index` and re-derives the affected
    /// component so queries reflect it immediately.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::OutOfRange`](crate::error::ErrorKind) if
    /// `index >= len()`.
    pub fn update_value_at(&mut self, index: usize, value: V) -> Result<(), Error> {
        if index >= self.kvs.len() {
            return Err(Error::new(ErrorKind::OutOfRange, "update beyond stored keys")
                .with_context("index", index)
                .with_context("keys", self.kvs.len()));
        }

        self.kvs[index].1 = value;
        let a = self.index_a(&self.kvs[index].0);
        self.fill_tree_from::<false, true, false>(a);
        Ok(())
    }

    /// Replaces the value mapped to `key`.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::OutOfRange`](crate::error::ErrorKind) if `key` was
    /// never inserted.
    pub fn update(&mut self, key: &K, value: V) -> Result<(), Error>
    where
        K: PartialEq,
    {
        if !self.is_member(key) {
            return Err(Error::new(ErrorKind::OutOfRange, "update of an unknown key"));
        }
        let index = self.query_index(key) as usize;
        self.update_value_at(index, value)
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Verifies the structure: every stored pair round-trips through
    /// `query` and `query_index`, and the edge graph is still a forest.
    pub fn check_integrity(&self) -> bool
    where
        K: PartialEq,
    {
        let mut disj = DisjointSet::new(self.node_count());
        for (index, (key, value)) in self.kvs.iter().enumerate() {
            if self.query(key) != *value || self.query_index(key) != index as u32 {
                return false;
            }
            let (a, b) = self.endpoints(key);
            if disj.same_set(a, b) {
                return false;
            }
            disj.merge(a, b);
        }
        true
    }

    /// Takes a read-only snapshot of the tables and seeds for the data
    /// plane.
    pub fn snapshot(&self) -> DataPlaneOthello<K, V, C> {
        DataPlaneOthello::from_control_plane(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::othello::OthelloBuilder;

    fn build_u64(n: u64) -> ControlPlaneOthello<u64, u32> {
        let keys: Vec<u64> = (0..n).map(|i| i.wrapping_mul(0x9E37_79B9_7F4A_7C15)).collect();
        let values: Vec<u32> = (0..n as u32).map(|v| v ^ 0xA5A5_A5A5).collect();
        OthelloBuilder::default().build(keys, values).unwrap()
    }

    #[test]
    fn test_table_sizes_honor_floors() {
        let (ma, mb) = ControlPlaneOthello::<u64, u32>::table_sizes(0);
        assert_eq!((ma, mb), (128, 256));
    }

    #[test]
    fn test_table_sizes_scale_with_keys() {
        let (ma, mb) = ControlPlaneOthello::<u64, u32>::table_sizes(1000);
        assert!(ma >= 1334 && ma.is_power_of_two());
        assert!(mb >= 1000 && mb.is_power_of_two());
        assert!(ma < 4 * 1334 && mb < 4 * 1000);
    }

    #[test]
    fn test_adjacency_lists_cover_all_keys() {
        let othello = build_u64(500);
        let mut seen = vec![0u8; 500];
        for node in 0..othello.node_count() {
            let mut cursor = othello.head[node];
            while cursor != NO_KEY {
                let kid = cursor as usize;
                seen[kid] += 1;
                cursor = if node < othello.ma {
                    othello.next_a[kid]
                } else {
                    othello.next_b[kid]
                };
            }
        }
        // each key appears once per endpoint
        assert!(seen.iter().all(|&count| count == 2));
    }

    #[test]
    fn test_connects_is_false_across_components() {
        let othello = build_u64(10);
        // a fresh node pair with no adjacency cannot be connected
        let lonely = (0..othello.ma)
            .find(|&node| othello.head[node] == NO_KEY)
            .unwrap();
        assert!(!othello.connects(lonely, othello.ma));
    }

    #[test]
    fn test_filled_matches_touched_nodes() {
        let othello = build_u64(100);
        for node in 0..othello.node_count() {
            if othello.head[node] != NO_KEY {
                assert!(othello.filled[node], "node {node} has keys but no fill");
            }
        }
    }

    #[test]
    fn test_rehash_count_is_small_for_sane_sizes() {
        let othello = build_u64(1000);
        assert!(othello.rehash_count() < 100);
    }
}

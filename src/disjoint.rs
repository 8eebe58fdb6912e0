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

//! Union-find over node indices, used to detect cycles while edges are
//! placed during an Othello build.

/// Parent value of a node that has never been touched.
const UNSET: i32 = -1;

/// Path-compressed disjoint-set forest.
///
/// Nodes start untouched (parent −1); the first call naming a node makes it
/// its own root. [`is_root`](Self::is_root) is true only for touched
/// self-parent nodes, so nodes no edge ever reached are skipped when the
/// build picks component representatives.
///
/// Path compression alone is sufficient at the table sizes involved;
/// union-by-rank is omitted.
#[derive(Debug, Clone, Default)]
pub struct DisjointSet {
    parent: Vec<i32>,
}

impl DisjointSet {
    /// Creates a forest of `len` untouched nodes.
    pub fn new(len: usize) -> Self {
        Self {
            parent: vec![UNSET; len],
        }
    }

    /// Returns the representative of `node`, compressing the path to it.
    pub fn representative(&mut self, node: usize) -> usize {
        if self.parent[node] < 0 {
            self.parent[node] = node as i32;
            return node;
        }

        let mut root = node;
        while self.parent[root] as usize != root {
            root = self.parent[root] as usize;
        }

        let mut cursor = node;
        while cursor != root {
            let next = self.parent[cursor] as usize;
            self.parent[cursor] = root as i32;
            cursor = next;
        }
        root
    }

    /// Merges the sets containing `a` and `b`.
    pub fn merge(&mut self, a: usize, b: usize) {
        let root_a = self.representative(a);
        let root_b = self.representative(b);
        self.parent[root_b] = root_a as i32;
    }

    /// Returns true if `a` and `b` are in the same set.
    pub fn same_set(&mut self, a: usize, b: usize) -> bool {
        self.representative(a) == self.representative(b)
    }

    /// Returns true if `node` has been touched and is its own parent.
    pub fn is_root(&self, node: usize) -> bool {
        self.parent[node] == node as i32
    }

    /// Marks every node untouched again.
    pub fn reset(&mut self) {
        self.parent.fill(UNSET);
    }

    /// Grows the forest to `len` nodes, new nodes untouched.
    pub fn resize(&mut self, len: usize) {
        self.parent.resize(len, UNSET);
    }

    /// Returns the number of nodes.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Returns true if the forest holds zero nodes.
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_and_same_set() {
        let mut disj = DisjointSet::new(8);
        assert!(!disj.same_set(0, 1));

        disj.merge(0, 1);
        disj.merge(2, 3);
        assert!(disj.same_set(0, 1));
        assert!(disj.same_set(1, 0));
        assert!(!disj.same_set(1, 2));

        disj.merge(1, 3);
        assert!(disj.same_set(0, 2));
    }

    #[test]
    fn test_untouched_nodes_are_not_roots() {
        let mut disj = DisjointSet::new(4);
        assert!(!disj.is_root(0));

        disj.merge(0, 1);
        assert!(disj.is_root(0));
        assert!(!disj.is_root(1));
        assert!(!disj.is_root(2));
    }

    #[test]
    fn test_reset_forgets_everything() {
        let mut disj = DisjointSet::new(4);
        disj.merge(0, 1);
        disj.reset();
        assert!(!disj.is_root(0));
        assert!(!disj.same_set(0, 1));
    }

    #[test]
    fn test_resize_keeps_existing_sets() {
        let mut disj = DisjointSet::new(2);
        disj.merge(0, 1);
        disj.resize(4);
        assert!(disj.same_set(0, 1));
        assert!(!disj.same_set(0, 3));
        assert_eq!(disj.len(), 4);
    }

    #[test]
    fn test_path_compression_flattens_chains() {
        let mut disj = DisjointSet::new(16);
        for i in 1..16 {
            disj.merge(i, i - 1);
        }
        let root = disj.representative(0);
        for i in 0..16 {
            assert_eq!(disj.representative(i), root);
        }
    }
}

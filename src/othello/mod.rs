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

//! Othello hashing: a two-table XOR mapping from keys to values.
//!
//! Each key hashes to one cell in table A and one in table B; the stored
//! value is the XOR of the two cells. Such an assignment exists whenever
//! the bipartite graph whose edges are the keys' endpoint pairs is acyclic,
//! which the build guarantees by redrawing hash seeds until cycle-free.
//!
//! [`ControlPlaneOthello`] owns the key-value list and all the build-time
//! bookkeeping, and supports incremental insertion and deletion.
//! [`DataPlaneOthello`] is a read-only snapshot of just the tables and
//! seeds, safe to share across reader threads.
//!
//! # Usage
//!
//! ```rust
//! use keyclass::othello::OthelloBuilder;
//!
//! let keys: Vec<u64> = (0..1_000).collect();
//! let values: Vec<u32> = (0..1_000).map(|v| v * 7).collect();
//! let othello = OthelloBuilder::default().build(keys, values).unwrap();
//!
//! assert_eq!(othello.query(&10), 70);
//! assert!(othello.is_member(&10));
//! ```
//!
//! # Notes
//!
//! - The input keys must be distinct. Duplicate keys are unsupported and
//!   queries over them are meaningless.
//! - Queries for keys never inserted return arbitrary but deterministic
//!   values; use [`ControlPlaneOthello::is_member`] to screen them.

mod builder;
mod cells;
mod control;
mod data;

pub use self::builder::DEFAULT_BUILD_SEED;
pub use self::builder::OthelloBuilder;
pub use self::cells::CellStore;
pub use self::cells::FlatCells;
pub use self::cells::PackedCells12;
pub use self::cells::Value;
pub use self::control::ControlPlaneOthello;
pub use self::control::DEFAULT_MAX_REHASH;
pub use self::control::PackedOthello;
pub use self::data::DataPlaneOthello;

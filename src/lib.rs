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

//! Compact structures that classify a key into one of two disjoint sets.
//!
//! Given two disjoint key sets R ("revoked") and S ("stay") known at build
//! time, this crate offers two ways to answer *"is key k in R or in S?"*
//! with very different space and time trade-offs:
//!
//! - [`mlbf::MlbfCascade`]: a cascade of Bloom filters whose alternating
//!   levels absorb the false positives of the previous level, giving exact
//!   classification over R ∪ S in O(levels) lookups.
//! - [`othello::ControlPlaneOthello`]: an Othello hash built from two
//!   power-of-two tables and two seeded hash functions such that
//!   `mem[h_a(k)] ^ mem[h_b(k)]` recovers the value stored for `k` in a
//!   single pair of probes. A read-only [`othello::DataPlaneOthello`]
//!   snapshot serves queries without the build-time bookkeeping.
//!
//! Both structures are exact on the keys they were built from; behavior on
//! unknown keys is probabilistic (Bloom) or arbitrary (Othello).
//!
//! # Examples
//!
//! ```
//! use keyclass::mlbf::MlbfCascade;
//! use keyclass::othello::OthelloBuilder;
//!
//! let revoked = ["alpha", "bravo"];
//! let stay = ["charlie", "delta"];
//!
//! let cascade = MlbfCascade::builder()
//!     .base_fpp(0.5)
//!     .build(&revoked, &stay);
//! assert!(cascade.contains("alpha"));
//! assert!(!cascade.contains("delta"));
//!
//! let keys = vec!["alpha", "bravo", "charlie", "delta"];
//! let values = vec![true, true, false, false];
//! let othello = OthelloBuilder::default().build(keys, values).unwrap();
//! assert!(othello.query(&"bravo"));
//! assert!(!othello.query(&"charlie"));
//! ```

pub mod bits;
pub mod bloom;
pub mod common;
pub mod disjoint;
pub mod error;
pub mod hash;
pub mod mlbf;
pub mod othello;

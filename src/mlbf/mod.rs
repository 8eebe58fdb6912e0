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

//! Multi-level Bloom filter cascade.
//!
//! A cascade classifies every key of two disjoint sets R and S exactly:
//! level 1 holds R and is probed with S; whatever false positives survive
//! are pushed down to level 2 with the roles swapped, and so on until a
//! level produces no false positives. Queries walk the levels and resolve
//! by the first negative lookup (or by level-count parity after the last).
//!
//! # Usage
//!
//! ```rust
//! use keyclass::mlbf::MlbfCascade;
//!
//! let revoked = ["r1", "r2", "r3"];
//! let stay = ["s1", "s2", "s3"];
//! let cascade = MlbfCascade::builder()
//!     .base_fpp(0.5)
//!     .build(&revoked, &stay);
//!
//! assert!(cascade.contains("r2"));
//! assert!(!cascade.contains("s2"));
//! ```

mod cascade;

pub use self::cascade::MlbfBuilder;
pub use self::cascade::MlbfCascade;

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

use std::fmt;
use std::ops::BitXor;

use crate::common::random::RandomSource;

/// A value an Othello can map keys to.
///
/// The XOR of two cells must again be a value, so the trait is essentially
/// "a fixed-width group under XOR with a way to draw random elements".
pub trait Value:
    Copy + Default + Eq + BitXor<Output = Self> + fmt::Debug + Send + Sync + 'static
{
    /// Derives a value from 64 random bits.
    fn from_random(bits: u64) -> Self;
}

impl Value for bool {
    fn from_random(bits: u64) -> Self {
        (bits & 1) != 0
    }
}

impl Value for u8 {
    fn from_random(bits: u64) -> Self {
        bits as u8
    }
}

impl Value for u16 {
    fn from_random(bits: u64) -> Self {
        bits as u16
    }
}

impl Value for u32 {
    fn from_random(bits: u64) -> Self {
        bits as u32
    }
}

impl Value for u64 {
    fn from_random(bits: u64) -> Self {
        bits
    }
}

/// Storage for the concatenated A and B tables.
///
/// The control plane writes cells during the build fill and the data plane
/// reads them back; both address the same logical index space 0..len.
pub trait CellStore<V: Value>: Clone + fmt::Debug {
    /// Allocates a zeroed store of `len` cells.
    fn with_len(len: usize) -> Self;

    /// Returns the number of cells.
    fn len(&self) -> usize;

    /// Returns true if the store holds zero cells.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the cell at `index`.
    fn get(&self, index: usize) -> V;

    /// Writes the cell at `index`.
    fn set(&mut self, index: usize, value: V);

    /// Overwrites every cell with random bits.
    fn randomize<R: RandomSource>(&mut self, rng: &mut R);

    /// Returns the backing storage size in bytes.
    fn byte_size(&self) -> usize;
}

/// One value per cell; works for any [`Value`] type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatCells<V> {
    cells: Vec<V>,
}

impl<V: Value> CellStore<V> for FlatCells<V> {
    fn with_len(len: usize) -> Self {
        Self {
            cells: vec![V::default(); len],
        }
    }

    fn len(&self) -> usize {
        self.cells.len()
    }

    fn get(&self, index: usize) -> V {
        self.cells[index]
    }

    fn set(&mut self, index: usize, value: V) {
        self.cells[index] = value;
    }

    fn randomize<R: RandomSource>(&mut self, rng: &mut R) {
        for cell in &mut self.cells {
            *cell = V::from_random(rng.next_u64());
        }
    }

    fn byte_size(&self) -> usize {
        self.cells.len() * size_of::<V>()
    }
}

/// 12-bit cells packed two-per-three-bytes, addressed as `u16` values.
///
/// Cell 2i lives in the low 12 bits of the little-endian 16-bit word at
/// byte offset 3i; cell 2i+1 lives in the high 12 bits of the word at byte
/// offset 3i+1. Values are masked to 12 bits on write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedCells12 {
    bytes: Vec<u8>,
    len: usize,
}

const CELL_MASK: u16 = 0x0FFF;

impl PackedCells12 {
    fn load(&self, offset: usize) -> u16 {
        u16::from_le_bytes([self.bytes[offset], self.bytes[offset + 1]])
    }

    fn store(&mut self, offset: usize, word: u16) {
        let [lo, hi] = word.to_le_bytes();
        self.bytes[offset] = lo;
        self.bytes[offset + 1] = hi;
    }
}

impl CellStore<u16> for PackedCells12 {
    fn with_len(len: usize) -> Self {
        // one spare word so the 16-bit load of the last odd cell stays
        // in bounds
        Self {
            bytes: vec![0u8; len * 3 / 2 + 2],
            len,
        }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn get(&self, index: usize) -> u16 {
        assert!(index < self.len, "cell index {index} out of range");
        let word = self.load(index * 3 / 2);
        if index & 1 == 1 {
            word >> 4
        } else {
            word & CELL_MASK
        }
    }

    fn set(&mut self, index: usize, value: u16) {
        assert!(index < self.len, "cell index {index} out of range");
        let value = value & CELL_MASK;
        let offset = index * 3 / 2;
        let word = self.load(offset);
        let word = if index & 1 == 1 {
            (word & 0x000F) | (value << 4)
        } else {
            (word & 0xF000) | value
        };
        self.store(offset, word);
    }

    fn randomize<R: RandomSource>(&mut self, rng: &mut R) {
        for index in 0..self.len {
            self.set(index, u16::from_random(rng.next_u64()));
        }
    }

    fn byte_size(&self) -> usize {
        self.bytes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::random::XorShift64;

    #[test]
    fn test_flat_cells_round_trip() {
        let mut cells: FlatCells<u32> = FlatCells::with_len(16);
        cells.set(3, 0xDEAD_BEEF);
        cells.set(15, 7);
        assert_eq!(cells.get(3), 0xDEAD_BEEF);
        assert_eq!(cells.get(15), 7);
        assert_eq!(cells.get(0), 0);
        assert_eq!(cells.byte_size(), 64);
    }

    #[test]
    fn test_packed_cells_round_trip() {
        let mut cells = PackedCells12::with_len(64);
        for index in 0..64 {
            cells.set(index, (index as u16) * 53);
        }
        for index in 0..64 {
            assert_eq!(cells.get(index), ((index as u16) * 53) & 0x0FFF);
        }
    }

    #[test]
    fn test_packed_neighbors_do_not_clobber() {
        let mut cells = PackedCells12::with_len(4);
        cells.set(0, 0xABC);
        cells.set(1, 0xDEF);
        cells.set(2, 0x123);
        assert_eq!(cells.get(0), 0xABC);
        assert_eq!(cells.get(1), 0xDEF);
        assert_eq!(cells.get(2), 0x123);

        cells.set(1, 0x001);
        assert_eq!(cells.get(0), 0xABC);
        assert_eq!(cells.get(1), 0x001);
        assert_eq!(cells.get(2), 0x123);
    }

    #[test]
    fn test_packed_masks_to_twelve_bits() {
        let mut cells = PackedCells12::with_len(2);
        cells.set(0, 0xFFFF);
        assert_eq!(cells.get(0), 0x0FFF);
    }

    #[test]
    fn test_packed_is_three_quarters_of_flat() {
        let flat: FlatCells<u16> = FlatCells::with_len(1024);
        let packed = PackedCells12::with_len(1024);
        assert!(packed.byte_size() < flat.byte_size() * 3 / 4 + 8);
    }

    #[test]
    fn test_randomize_touches_cells() {
        let mut rng = XorShift64::seeded(1);
        let mut cells: FlatCells<u64> = FlatCells::with_len(32);
        cells.randomize(&mut rng);
        assert!((0..32).any(|i| cells.get(i) != 0));

        let mut packed = PackedCells12::with_len(32);
        packed.randomize(&mut rng);
        assert!((0..32).any(|i| packed.get(i) != 0));
    }
}

//! Lazily allocated memory section.
//!
//! A section covers a contiguous address range and stores its bytes in
//! fixed-size cells. Cells are allocated on the first write that touches
//! them; reading an untouched cell yields zeros without allocating.

use std::collections::{BTreeMap, BTreeSet};

use crate::common::error::MemoryError;

/// A named, contiguous region of the address space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemorySection {
    name: String,
    first: u32,
    length: u32,
    cell_size: u32,
    cells: BTreeMap<u32, Box<[u8]>>,
}

impl MemorySection {
    /// Creates an empty section.
    ///
    /// # Arguments
    ///
    /// * `name` - Section name used in diagnostics.
    /// * `first` - First address covered.
    /// * `length` - Number of bytes covered.
    /// * `cell_size` - Allocation granule; a power of two of at least 4 bytes.
    ///
    /// # Returns
    ///
    /// The section, or `MemoryError::InvalidSection` if the descriptor is malformed.
    pub fn new(name: impl Into<String>, first: u32, length: u32, cell_size: u32) -> Result<Self, MemoryError> {
        let name = name.into();
        let invalid = |reason: &str| MemoryError::InvalidSection {
            name: name.clone(),
            reason: reason.to_owned(),
        };
        if length == 0 {
            return Err(invalid("length must be non-zero"));
        }
        if first.checked_add(length - 1).is_none() {
            return Err(invalid("range wraps past the end of the address space"));
        }
        if cell_size < 4 || !cell_size.is_power_of_two() {
            return Err(invalid("cell size must be a power of two of at least 4 bytes"));
        }
        Ok(Self {
            name,
            first,
            length,
            cell_size,
            cells: BTreeMap::new(),
        })
    }

    /// Section name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First address covered.
    pub const fn first(&self) -> u32 {
        self.first
    }

    /// Last address covered.
    pub const fn last(&self) -> u32 {
        self.first + (self.length - 1)
    }

    /// Number of bytes covered.
    pub const fn length(&self) -> u32 {
        self.length
    }

    /// Allocation granule in bytes.
    pub const fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Whether `address` lies inside the section.
    pub const fn contains(&self, address: u32) -> bool {
        address.wrapping_sub(self.first) < self.length
    }

    /// Whether the two sections share at least one address.
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.first <= other.last() && other.first <= self.last()
    }

    /// Number of cells allocated so far.
    pub fn allocated_cells(&self) -> usize {
        self.cells.len()
    }

    const fn locate(&self, address: u32) -> (u32, usize) {
        let offset = address - self.first;
        (offset / self.cell_size, (offset % self.cell_size) as usize)
    }

    /// Reads a byte. The caller guarantees `contains(address)`.
    pub fn read_byte(&self, address: u32) -> u8 {
        let (cell, offset) = self.locate(address);
        self.cells.get(&cell).map_or(0, |bytes| bytes[offset])
    }

    /// Writes a byte, allocating its cell if needed. The caller guarantees `contains(address)`.
    pub fn write_byte(&mut self, address: u32, value: u8) {
        let (cell, offset) = self.locate(address);
        let size = self.cell_size as usize;
        let bytes = self
            .cells
            .entry(cell)
            .or_insert_with(|| vec![0; size].into_boxed_slice());
        bytes[offset] = value;
    }

    /// Whether both sections cover the same addresses with the same granule.
    pub const fn same_range(&self, other: &Self) -> bool {
        self.first == other.first && self.length == other.length && self.cell_size == other.cell_size
    }

    /// Start addresses of the 4-byte groups whose contents differ from `other`.
    ///
    /// Groups are counted from the section base. Both sections must satisfy `same_range`.
    pub fn changed_words(&self, other: &Self) -> Vec<u32> {
        let cells: BTreeSet<u32> = self.cells.keys().chain(other.cells.keys()).copied().collect();
        let mut words = Vec::new();
        for cell in cells {
            let mine = self.cells.get(&cell).map(AsRef::as_ref);
            let theirs = other.cells.get(&cell).map(AsRef::as_ref);
            let byte = |bytes: Option<&[u8]>, at: usize| bytes.map_or(0, |b| b[at]);
            let base = self.first + cell * self.cell_size;
            for offset in (0..self.cell_size).step_by(4) {
                let Some(address) = base.checked_add(offset).filter(|&a| self.contains(a)) else {
                    break;
                };
                let at = offset as usize;
                if (at..at + 4).any(|i| byte(mine, i) != byte(theirs, i)) {
                    words.push(address);
                }
            }
        }
        words
    }

    /// Drops every allocated cell.
    pub fn wipe(&mut self) {
        self.cells.clear();
    }
}

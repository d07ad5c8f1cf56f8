//! Sectioned Guest Memory.
//!
//! This module implements the guest address space. It provides:
//! 1. **Sections:** Disjoint named regions with lazily allocated cells.
//! 2. **Access:** Byte, halfword and word reads and writes with alignment checks
//!    and a runtime-selectable byte order.
//! 3. **Hooks:** Write guards that may veto guest writes and listeners notified
//!    after each change.
//! 4. **Snapshots:** Deep copies and in-place restoration that keeps hooks.
//! 5. **Caches:** An optional tag-only cache hierarchy that counts hits and misses.

/// Set-associative cache model.
pub mod cache;

/// Write guards and change listeners.
pub mod hooks;

/// Lazily allocated memory section.
pub mod section;

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use self::hooks::{HookDecision, MemoryChange, MemoryListener, MemoryWrite, WriteGuard};
use self::section::MemorySection;
use crate::common::error::MemoryError;
use crate::config::MemoryConfig;

#[derive(Clone, Default)]
struct Hooks {
    guards: Vec<Arc<dyn WriteGuard>>,
    listeners: Vec<Arc<dyn MemoryListener>>,
}

/// The guest address space.
#[derive(Clone)]
pub struct Memory {
    sections: Vec<MemorySection>,
    big_endian: bool,
    hooks: Hooks,
}

impl Memory {
    /// Creates an address space from a set of sections.
    ///
    /// # Returns
    ///
    /// The memory, or `MemoryError::Overlap` if two sections share an address.
    pub fn new(sections: Vec<MemorySection>, big_endian: bool) -> Result<Self, MemoryError> {
        let mut memory = Self {
            sections: Vec::with_capacity(sections.len()),
            big_endian,
            hooks: Hooks::default(),
        };
        for section in sections {
            memory.add_section(section)?;
        }
        Ok(memory)
    }

    /// Builds the address space described by a memory configuration.
    pub fn from_config(config: &MemoryConfig) -> Result<Self, MemoryError> {
        let sections = config
            .sections
            .iter()
            .map(|s| MemorySection::new(s.name.clone(), s.first, s.length, config.cell_size))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(sections, config.big_endian)
    }

    /// Maps an additional section.
    pub fn add_section(&mut self, section: MemorySection) -> Result<(), MemoryError> {
        if let Some(other) = self.sections.iter().find(|s| s.overlaps(&section)) {
            return Err(MemoryError::Overlap {
                name: section.name().to_owned(),
                other: other.name().to_owned(),
            });
        }
        let at = self.sections.partition_point(|s| s.first() < section.first());
        self.sections.insert(at, section);
        Ok(())
    }

    /// All sections, sorted by base address.
    pub fn sections(&self) -> &[MemorySection] {
        &self.sections
    }

    /// Finds the section containing `address`.
    pub fn section(&self, address: u32) -> Option<&MemorySection> {
        let idx = self.section_index(address)?;
        Some(&self.sections[idx])
    }

    /// Finds a section by name.
    pub fn section_named(&self, name: &str) -> Option<&MemorySection> {
        self.sections.iter().find(|s| s.name() == name)
    }

    fn section_index(&self, address: u32) -> Option<usize> {
        let idx = self.sections.partition_point(|s| s.first() <= address).checked_sub(1)?;
        self.sections[idx].contains(address).then_some(idx)
    }

    /// Whether multi-byte values are stored big-endian.
    pub const fn is_big_endian(&self) -> bool {
        self.big_endian
    }

    /// Switches the byte order.
    pub const fn set_big_endian(&mut self, big_endian: bool) {
        self.big_endian = big_endian;
    }

    /// Total number of allocated cells over all sections.
    pub fn allocated_cells(&self) -> usize {
        self.sections.iter().map(MemorySection::allocated_cells).sum()
    }

    /// Checks alignment and bounds of a `width`-byte access.
    ///
    /// # Returns
    ///
    /// The index of the section holding every byte of the access.
    fn check(&self, address: u32, width: u32) -> Result<usize, MemoryError> {
        if address % width != 0 {
            return Err(MemoryError::Alignment { address, width });
        }
        let idx = self
            .section_index(address)
            .ok_or(MemoryError::OutOfBounds { address })?;
        let last = address.wrapping_add(width - 1);
        if !self.sections[idx].contains(last) {
            return Err(MemoryError::OutOfBounds { address: last });
        }
        Ok(idx)
    }

    fn read_raw(&self, idx: usize, address: u32, width: u32) -> u32 {
        assemble(&self.sections[idx], address, width, self.big_endian)
    }

    fn write_raw(&mut self, idx: usize, address: u32, width: u32, value: u32) {
        let big_endian = self.big_endian;
        let section = &mut self.sections[idx];
        for i in 0..width {
            let shift = if big_endian { 8 * (width - 1 - i) } else { 8 * i };
            section.write_byte(address + i, (value >> shift) as u8);
        }
    }

    fn read(&self, address: u32, width: u32) -> Result<u32, MemoryError> {
        let idx = self.check(address, width)?;
        Ok(self.read_raw(idx, address, width))
    }

    fn write(&mut self, address: u32, width: u32, value: u32) -> Result<(), MemoryError> {
        let idx = self.check(address, width)?;
        let write = MemoryWrite {
            address,
            width,
            value,
        };
        if self
            .hooks
            .guards
            .iter()
            .any(|guard| guard.check(&write) == HookDecision::Deny)
        {
            warn!(address = format_args!("{address:#010x}"), width, "write denied by guard");
            return Ok(());
        }
        let old = self.read_raw(idx, address, width);
        self.write_raw(idx, address, width, value);
        if !self.hooks.listeners.is_empty() {
            let change = MemoryChange {
                address,
                width,
                old,
                new: self.read_raw(idx, address, width),
            };
            for listener in &self.hooks.listeners {
                listener.on_change(&change);
            }
        }
        Ok(())
    }

    /// Reads a byte. No alignment constraint.
    pub fn read_byte(&self, address: u32) -> Result<u8, MemoryError> {
        self.read(address, 1).map(|v| v as u8)
    }

    /// Reads a halfword; the address must be 2-byte aligned.
    pub fn read_half(&self, address: u32) -> Result<u16, MemoryError> {
        self.read(address, 2).map(|v| v as u16)
    }

    /// Reads a word; the address must be 4-byte aligned.
    pub fn read_word(&self, address: u32) -> Result<u32, MemoryError> {
        self.read(address, 4)
    }

    /// Writes a byte. No alignment constraint.
    pub fn write_byte(&mut self, address: u32, value: u8) -> Result<(), MemoryError> {
        self.write(address, 1, u32::from(value))
    }

    /// Writes a halfword; the address must be 2-byte aligned.
    pub fn write_half(&mut self, address: u32, value: u16) -> Result<(), MemoryError> {
        self.write(address, 2, u32::from(value))
    }

    /// Writes a word; the address must be 4-byte aligned.
    pub fn write_word(&mut self, address: u32, value: u32) -> Result<(), MemoryError> {
        self.write(address, 4, value)
    }

    /// Stores a word without consulting guards or listeners. Used when loading a program.
    pub fn load_word(&mut self, address: u32, value: u32) -> Result<(), MemoryError> {
        let idx = self.check(address, 4)?;
        self.write_raw(idx, address, 4, value);
        Ok(())
    }

    /// Stores raw bytes without consulting guards or listeners. Used when loading a program.
    pub fn load_bytes(&mut self, address: u32, bytes: &[u8]) -> Result<(), MemoryError> {
        for (offset, byte) in bytes.iter().enumerate() {
            let target = address.wrapping_add(offset as u32);
            let idx = self.check(target, 1)?;
            self.sections[idx].write_byte(target, *byte);
        }
        Ok(())
    }

    /// Installs a write guard.
    pub fn add_guard(&mut self, guard: Arc<dyn WriteGuard>) {
        self.hooks.guards.push(guard);
    }

    /// Installs a change listener.
    pub fn add_listener(&mut self, listener: Arc<dyn MemoryListener>) {
        self.hooks.listeners.push(listener);
    }

    /// Removes every guard and listener.
    pub fn clear_hooks(&mut self) {
        self.hooks = Hooks::default();
    }

    /// Copies layout, byte order and contents from `other`, keeping this memory's hooks.
    ///
    /// Listeners hear about every word whose contents differ, as seen in `other`'s byte order.
    pub fn restore_from(&mut self, other: &Self) {
        let changes = if self.hooks.listeners.is_empty() {
            Vec::new()
        } else {
            self.differences(other)
        };
        self.sections.clone_from(&other.sections);
        self.big_endian = other.big_endian;
        for change in &changes {
            for listener in &self.hooks.listeners {
                listener.on_change(change);
            }
        }
    }

    fn differences(&self, other: &Self) -> Vec<MemoryChange> {
        let mut changes = Vec::new();
        for mine in &self.sections {
            let Some(theirs) = other.sections.iter().find(|s| s.same_range(mine)) else {
                continue;
            };
            for address in mine.changed_words(theirs) {
                let width = WORD.min(mine.last() - address + 1);
                changes.push(MemoryChange {
                    address,
                    width,
                    old: assemble(mine, address, width, other.big_endian),
                    new: assemble(theirs, address, width, other.big_endian),
                });
            }
        }
        changes
    }
}

const WORD: u32 = 4;

fn assemble(section: &MemorySection, address: u32, width: u32, big_endian: bool) -> u32 {
    (0..width).fold(0, |acc, i| {
        let byte = u32::from(section.read_byte(address + i));
        if big_endian {
            (acc << 8) | byte
        } else {
            acc | (byte << (8 * i))
        }
    })
}

impl PartialEq for Memory {
    fn eq(&self, other: &Self) -> bool {
        self.big_endian == other.big_endian && self.sections == other.sections
    }
}

impl Eq for Memory {}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memory")
            .field("big_endian", &self.big_endian)
            .field("sections", &self.sections.len())
            .field("allocated_cells", &self.allocated_cells())
            .field("guards", &self.hooks.guards.len())
            .field("listeners", &self.hooks.listeners.len())
            .finish()
    }
}

//! Pipeline Latch Interface.
//!
//! This module defines the common trait for inter-stage buffers. It provides
//! flushing (whole or by program order) and status checks, shared by the
//! single-entry latches and the bank of functional units.

/// Represents a pipeline latch (inter-stage buffer).
///
/// Latches hold the state of instructions as they move between stages. They support
/// flushing and status checks.
pub trait PipelineLatch {
    /// Clears all entries in the latch.
    ///
    /// # Returns
    ///
    /// The number of discarded entries.
    fn flush(&mut self) -> usize;

    /// Discards the entries younger than sequence number `id`.
    ///
    /// Called when a control transfer resolves or a serializing instruction commits.
    ///
    /// # Returns
    ///
    /// The number of discarded entries.
    fn flush_younger(&mut self, id: u64) -> usize;

    /// Checks if the latch is empty.
    fn is_empty(&self) -> bool;

    /// Checks if the latch contains any instruction that has recorded a fault.
    fn has_trap(&self) -> bool;
}

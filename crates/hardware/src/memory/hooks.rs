//! Memory write guards and change listeners.
//!
//! Guards run before a guest write and may veto it; listeners run after a
//! write changed memory. Both receive plain value payloads and have no access
//! to memory, so they cannot reenter it.

/// A write about to be performed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryWrite {
    /// Target address.
    pub address: u32,
    /// Width in bytes.
    pub width: u32,
    /// Value to store, right-aligned.
    pub value: u32,
}

/// A write that was performed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryChange {
    /// Target address.
    pub address: u32,
    /// Width in bytes.
    pub width: u32,
    /// Value before the write.
    pub old: u32,
    /// Value after the write.
    pub new: u32,
}

/// Verdict of a write guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookDecision {
    /// Let the write through.
    Allow,
    /// Skip the write silently.
    Deny,
}

/// Pre-mutation check on guest writes.
pub trait WriteGuard: Send + Sync {
    /// Decides whether the write may proceed.
    fn check(&self, write: &MemoryWrite) -> HookDecision;
}

/// Post-mutation observer of guest writes.
pub trait MemoryListener: Send + Sync {
    /// Called synchronously after memory changed.
    fn on_change(&self, change: &MemoryChange);
}

impl<F> WriteGuard for F
where
    F: Fn(&MemoryWrite) -> HookDecision + Send + Sync,
{
    fn check(&self, write: &MemoryWrite) -> HookDecision {
        self(write)
    }
}

impl<F> MemoryListener for F
where
    F: Fn(&MemoryChange) + Send + Sync,
{
    fn on_change(&self, change: &MemoryChange) {
        self(change);
    }
}

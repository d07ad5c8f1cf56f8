//! Simulation event notifications.
//!
//! Observers implement [`EventSink`] and are called synchronously from the
//! simulation thread. A sink installed with `Simulator::subscribe` also
//! receives register and memory changes through forwarding adapters.

use std::sync::Arc;
use std::sync::mpsc::Sender;

use crate::common::reg::{RegisterChange, RegisterListener};
use crate::core::arch::trap::ExceptionCause;
use crate::memory::cache::CacheAccess;
use crate::memory::hooks::{MemoryChange, MemoryListener};

/// Observable simulation events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimEvent {
    /// An instruction committed.
    InstructionRetired {
        /// Address of the instruction.
        pc: u32,
        /// Instruction word.
        word: u32,
    },
    /// An exception was taken.
    ExceptionRaised {
        /// Cause code.
        cause: ExceptionCause,
        /// Address of the faulting instruction.
        epc: u32,
        /// Exception vector control was sent to.
        pc: u32,
    },
    /// A register changed.
    RegisterChanged(RegisterChange),
    /// Memory changed.
    MemoryChanged(MemoryChange),
    /// A cache level was looked up.
    CacheAccessed(CacheAccess),
    /// A breakpoint stopped a run.
    BreakpointHit {
        /// Breakpoint address.
        pc: u32,
    },
    /// Undo or reset brought back an earlier state. Preceded by the register
    /// and memory changes it caused.
    Restored {
        /// Clock count of the restored state.
        cycles: u64,
        /// Program counter of the restored state.
        pc: u32,
    },
    /// The program finished.
    Finished {
        /// Exit code.
        exit_code: i32,
    },
}

/// Receiver of simulation events.
pub trait EventSink: Send + Sync {
    /// Called synchronously for every event.
    fn notify(&self, event: &SimEvent);
}

impl<F> EventSink for F
where
    F: Fn(&SimEvent) + Send + Sync,
{
    fn notify(&self, event: &SimEvent) {
        self(event);
    }
}

/// Sink that forwards every event into an mpsc channel.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: Sender<SimEvent>,
}

impl ChannelSink {
    /// Wraps a sender.
    pub const fn new(tx: Sender<SimEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn notify(&self, event: &SimEvent) {
        // A dropped receiver only means nobody is listening anymore.
        let _ = self.tx.send(event.clone());
    }
}

/// Fan-out of simulation events to the installed sinks.
#[derive(Clone, Default)]
pub struct EventBus {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl EventBus {
    /// Adds a sink.
    pub fn add(&mut self, sink: Arc<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Whether no sink is installed.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Delivers `event` to every sink.
    pub fn emit(&self, event: &SimEvent) {
        for sink in &self.sinks {
            sink.notify(event);
        }
    }

    /// Builds and delivers an event only when someone listens.
    pub fn emit_with(&self, event: impl FnOnce() -> SimEvent) {
        if !self.is_empty() {
            self.emit(&event());
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus").field("sinks", &self.sinks.len()).finish()
    }
}

/// Adapter turning register and memory notifications into events.
pub(crate) struct ForwardToSink(pub(crate) Arc<dyn EventSink>);

impl RegisterListener for ForwardToSink {
    fn on_change(&self, change: &RegisterChange) {
        self.0.notify(&SimEvent::RegisterChanged(*change));
    }
}

impl MemoryListener for ForwardToSink {
    fn on_change(&self, change: &MemoryChange) {
        self.0.notify(&SimEvent::MemoryChanged(*change));
    }
}

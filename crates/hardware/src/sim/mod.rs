//! Simulation driver and external interfaces.
//!
//! Provides the simulator with its control operations, the thread-safe
//! handle, program images, syscall dispatch and event subscriptions.

/// Simulation events and sinks.
pub mod events;

/// Thread-safe simulation handle.
pub mod handle;

/// Assembled program images.
pub mod program;

/// Simulator control operations.
pub mod simulator;

/// Syscall services.
pub mod syscall;

pub use events::{ChannelSink, EventSink, SimEvent};
pub use handle::SimulationHandle;
pub use program::Program;
pub use simulator::{RunOutcome, Simulator, StepOutcome, StopToken};
pub use syscall::{SyscallAction, SyscallContext, SyscallHandler, SyscallTable};

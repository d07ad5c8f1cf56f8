//! System call dispatch.
//!
//! When a `syscall` instruction commits, the service number is read from
//! `$v0` and looked up in the [`SyscallTable`] supplied at construction.
//! Handlers get mutable access to registers and memory and decide whether the
//! program continues or exits.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::common::error::SyscallError;
use crate::common::reg::RegisterFile;
use crate::isa::abi::REG_A0;
use crate::memory::Memory;

/// Service number of `exit`.
pub const SERVICE_EXIT: u32 = 10;

/// Service number of `exit2` (exit code in `$a0`).
pub const SERVICE_EXIT2: u32 = 17;

/// State visible to a syscall handler.
pub struct SyscallContext<'a> {
    /// Architectural registers.
    pub regs: &'a mut RegisterFile,
    /// Guest memory.
    pub memory: &'a mut Memory,
    /// Address of the `syscall` instruction.
    pub pc: u32,
}

/// What the simulation does after a syscall.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyscallAction {
    /// Resume with the next instruction.
    Continue,
    /// Finish the simulation with an exit code.
    Exit(i32),
}

/// Implementation of one syscall service.
pub trait SyscallHandler: Send + Sync {
    /// Runs the service.
    fn handle(&self, ctx: &mut SyscallContext<'_>) -> Result<SyscallAction, SyscallError>;
}

impl<F> SyscallHandler for F
where
    F: Fn(&mut SyscallContext<'_>) -> Result<SyscallAction, SyscallError> + Send + Sync,
{
    fn handle(&self, ctx: &mut SyscallContext<'_>) -> Result<SyscallAction, SyscallError> {
        self(ctx)
    }
}

/// Service-number to handler map.
#[derive(Clone, Default)]
pub struct SyscallTable {
    handlers: BTreeMap<u32, Arc<dyn SyscallHandler>>,
}

impl SyscallTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table with the built-in `exit` and `exit2` services.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.register(SERVICE_EXIT, |_: &mut SyscallContext<'_>| Ok(SyscallAction::Exit(0)));
        table.register(SERVICE_EXIT2, |ctx: &mut SyscallContext<'_>| {
            Ok(SyscallAction::Exit(ctx.regs.gpr(REG_A0) as i32))
        });
        table
    }

    /// Installs or replaces the handler for `service`.
    pub fn register(&mut self, service: u32, handler: impl SyscallHandler + 'static) {
        let _ = self.handlers.insert(service, Arc::new(handler));
    }

    /// Finds the handler for `service`.
    pub fn get(&self, service: u32) -> Option<Arc<dyn SyscallHandler>> {
        self.handlers.get(&service).cloned()
    }

    /// Registered service numbers.
    pub fn services(&self) -> impl Iterator<Item = u32> + '_ {
        self.handlers.keys().copied()
    }
}

impl fmt::Debug for SyscallTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

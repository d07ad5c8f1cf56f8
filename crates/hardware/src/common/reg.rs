//! Unified Register File.
//!
//! This module provides the `RegisterFile` struct, which acts as a single interface for
//! every architectural register. It provides:
//! 1. **Unified Storage:** The GPR, COP0 and FPU banks plus the program counter.
//! 2. **Abstraction:** Reads and writes addressed by [`RegRef`].
//! 3. **Observability:** Listeners notified after every effective register change.

use std::fmt;
use std::sync::Arc;

use crate::core::arch::cop0::{self, Cop0};
use crate::core::arch::fpr::Fpr;
use crate::core::arch::gpr::Gpr;

/// Reference to one architectural register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegRef {
    /// General-purpose register.
    Gpr(u8),
    /// Floating-point register.
    Fpr(u8),
    /// Coprocessor 0 register.
    Cop0 {
        /// Register number.
        register: u8,
        /// Selection index.
        selection: u8,
    },
}

impl RegRef {
    /// Whether this is the hardwired `$zero`.
    pub const fn is_zero(self) -> bool {
        matches!(self, Self::Gpr(0))
    }
}

/// Register bank touched by a change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegisterBank {
    /// General-purpose registers.
    Gpr,
    /// Floating-point registers.
    Fpr,
    /// Coprocessor 0, with the selection index.
    Cop0 {
        /// Selection index.
        selection: u8,
    },
}

/// Notification payload for a register change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterChange {
    /// Bank of the changed register.
    pub bank: RegisterBank,
    /// Register number within the bank.
    pub index: u8,
    /// Value before the change.
    pub old: u32,
    /// Value after the change.
    pub new: u32,
}

/// Observer of register changes.
pub trait RegisterListener: Send + Sync {
    /// Called synchronously after a register value changed.
    fn on_change(&self, change: &RegisterChange);
}

/// Unified register file containing the GPR, COP0 and FPU banks.
#[derive(Clone, Default)]
pub struct RegisterFile {
    pc: u32,
    gpr: Gpr,
    cop0: Cop0,
    fpr: Fpr,
    listeners: Vec<Arc<dyn RegisterListener>>,
}

impl RegisterFile {
    /// Creates a register file with every register at its reset value and pc at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Program counter.
    pub const fn pc(&self) -> u32 {
        self.pc
    }

    /// Sets the program counter.
    pub const fn set_pc(&mut self, pc: u32) {
        self.pc = pc;
    }

    /// Reads a general-purpose register. `$zero` always returns 0.
    pub fn gpr(&self, idx: usize) -> u32 {
        self.gpr.read(idx)
    }

    /// Writes a general-purpose register. Writes to `$zero` are ignored.
    pub fn set_gpr(&mut self, idx: usize, val: u32) {
        if let Some(old) = self.gpr.write(idx, val) {
            self.notify(RegisterBank::Gpr, idx as u8, old, val);
        }
    }

    /// Reads a floating-point register as raw bits.
    pub fn fpr_bits(&self, idx: usize) -> u32 {
        self.fpr.read(idx)
    }

    /// Writes raw bits to a floating-point register.
    pub fn set_fpr_bits(&mut self, idx: usize, bits: u32) {
        if let Some(old) = self.fpr.write(idx, bits) {
            self.notify(RegisterBank::Fpr, idx as u8, old, bits);
        }
    }

    /// The COP0 bank.
    pub const fn cop0(&self) -> &Cop0 {
        &self.cop0
    }

    /// The GPR bank.
    pub const fn gprs(&self) -> &Gpr {
        &self.gpr
    }

    /// The FPU bank.
    pub const fn fprs(&self) -> &Fpr {
        &self.fpr
    }

    /// Whether the processor currently runs in kernel mode.
    pub const fn kernel_mode(&self) -> bool {
        self.cop0.kernel_mode()
    }

    /// Software write to a COP0 register through its mask.
    ///
    /// Writing Compare acknowledges the timer interrupt.
    pub fn write_cop0(&mut self, addr: (u8, u8), value: u32) {
        let change = self.cop0.write_masked(addr, value);
        self.notify_cop0(addr, change);
        if addr == cop0::COMPARE {
            self.set_timer_pending(false);
        }
    }

    /// Hardware write to a COP0 register.
    pub fn write_cop0_hardware(&mut self, addr: (u8, u8), value: u32) {
        let change = self.cop0.write_hardware(addr, value);
        self.notify_cop0(addr, change);
    }

    /// Hardware update of a COP0 bit field.
    pub fn modify_cop0_bits(&mut self, addr: (u8, u8), value: u32, from: u32, len: u32) {
        let change = self.cop0.modify_bits(addr, value, from, len);
        self.notify_cop0(addr, change);
    }

    /// Advances Count by one unless Cause.DC is set. Not reported to listeners.
    ///
    /// Count reaching Compare raises the timer interrupt.
    pub fn tick_count(&mut self) {
        if (self.cop0.read_at(cop0::CAUSE) >> cop0::CAUSE_DC) & 1 == 0 {
            let count = self.cop0.read_at(cop0::COUNT).wrapping_add(1);
            let _ = self.cop0.write_hardware(cop0::COUNT, count);
            if count == self.cop0.read_at(cop0::COMPARE) {
                self.set_timer_pending(true);
            }
        }
    }

    /// Sets or clears a hardware interrupt request in Cause.IP.
    ///
    /// # Returns
    ///
    /// `false` if `line` is not a hardware interrupt line.
    pub fn set_interrupt_line(&mut self, line: u8, raised: bool) -> bool {
        if line >= cop0::HARDWARE_INTERRUPT_LINES {
            return false;
        }
        self.modify_cop0_bits(cop0::CAUSE, u32::from(raised), cop0::hardware_ip_bit(line), 1);
        true
    }

    /// Whether the processor would take an interrupt at the next instruction boundary.
    pub fn interrupt_pending(&self) -> bool {
        self.cop0.interrupt_pending()
    }

    fn set_timer_pending(&mut self, raised: bool) {
        self.modify_cop0_bits(cop0::CAUSE, u32::from(raised), cop0::CAUSE_TI, 1);
        let _ = self.set_interrupt_line(cop0::TIMER_INTERRUPT_LINE, raised);
    }

    /// Reads the referenced register.
    pub fn read(&self, reg: RegRef) -> u32 {
        match reg {
            RegRef::Gpr(idx) => self.gpr(usize::from(idx)),
            RegRef::Fpr(idx) => self.fpr_bits(usize::from(idx)),
            RegRef::Cop0 { register, selection } => self.cop0.read(register, selection),
        }
    }

    /// Writes the referenced register with software semantics.
    pub fn write(&mut self, reg: RegRef, value: u32) {
        match reg {
            RegRef::Gpr(idx) => self.set_gpr(usize::from(idx), value),
            RegRef::Fpr(idx) => self.set_fpr_bits(usize::from(idx), value),
            RegRef::Cop0 { register, selection } => self.write_cop0((register, selection), value),
        }
    }

    /// Looks up a GPR or FPR by name.
    pub fn lookup(&self, name: &str) -> Option<RegRef> {
        self.gpr
            .index_of(name)
            .map(|idx| RegRef::Gpr(idx as u8))
            .or_else(|| self.fpr.index_of(name).map(|idx| RegRef::Fpr(idx as u8)))
            .or_else(|| {
                self.cop0
                    .address_of(name)
                    .map(|(register, selection)| RegRef::Cop0 { register, selection })
            })
    }

    /// Installs a listener.
    pub fn add_listener(&mut self, listener: Arc<dyn RegisterListener>) {
        self.listeners.push(listener);
    }

    /// Removes every listener.
    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    /// Copies every value from `other` and keeps this file's listeners.
    ///
    /// Listeners hear about every register whose value differs, except Count.
    pub fn restore_from(&mut self, other: &Self) {
        let changes = if self.listeners.is_empty() {
            Vec::new()
        } else {
            self.differences(other)
        };
        self.pc = other.pc;
        self.gpr.clone_from(&other.gpr);
        self.cop0.clone_from(&other.cop0);
        self.fpr.clone_from(&other.fpr);
        for change in &changes {
            self.notify(change.bank, change.index, change.old, change.new);
        }
    }

    fn differences(&self, other: &Self) -> Vec<RegisterChange> {
        let mut changes = Vec::new();
        for idx in 0..32 {
            let (old, new) = (self.gpr.read(idx), other.gpr.read(idx));
            if old != new {
                changes.push(RegisterChange {
                    bank: RegisterBank::Gpr,
                    index: idx as u8,
                    old,
                    new,
                });
            }
            let (old, new) = (self.fpr.read(idx), other.fpr.read(idx));
            if old != new {
                changes.push(RegisterChange {
                    bank: RegisterBank::Fpr,
                    index: idx as u8,
                    old,
                    new,
                });
            }
        }
        for reg in self.cop0.registers() {
            let addr = (reg.register(), reg.selection());
            let new = other.cop0.read_at(addr);
            if addr != cop0::COUNT && reg.value() != new {
                changes.push(RegisterChange {
                    bank: RegisterBank::Cop0 {
                        selection: reg.selection(),
                    },
                    index: reg.register(),
                    old: reg.value(),
                    new,
                });
            }
        }
        changes
    }

    /// Restores every register to its reset value.
    pub fn reset(&mut self) {
        self.pc = 0;
        self.gpr.reset();
        self.cop0.reset();
        self.fpr.reset();
    }

    fn notify_cop0(&self, addr: (u8, u8), change: Option<(u32, u32)>) {
        match change {
            Some((old, new)) if old != new => {
                self.notify(RegisterBank::Cop0 { selection: addr.1 }, addr.0, old, new);
            }
            _ => {}
        }
    }

    fn notify(&self, bank: RegisterBank, index: u8, old: u32, new: u32) {
        if self.listeners.is_empty() {
            return;
        }
        let change = RegisterChange {
            bank,
            index,
            old,
            new,
        };
        for listener in &self.listeners {
            listener.on_change(&change);
        }
    }

    /// Dumps the register state to stdout.
    pub fn dump(&self) {
        println!("pc   ={:#010x}", self.pc);
        self.gpr.dump();
    }
}

impl PartialEq for RegisterFile {
    fn eq(&self, other: &Self) -> bool {
        self.pc == other.pc && self.gpr == other.gpr && self.cop0 == other.cop0 && self.fpr == other.fpr
    }
}

impl Eq for RegisterFile {}

impl fmt::Debug for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterFile")
            .field("pc", &self.pc)
            .field("gpr", &self.gpr)
            .field("cop0", &self.cop0)
            .field("fpr", &self.fpr)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

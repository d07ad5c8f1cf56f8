//! Coprocessor 0 (system control) registers.
//!
//! This module defines the COP0 register bank. It provides:
//! 1. **Addresses:** `(register, selection)` pairs of every implemented register.
//! 2. **Bit Fields:** Positions of the Status and Cause fields used by exception handling.
//! 3. **Masked Writes:** Software writes (`mtc0`) only touch the bits of the
//!    register's write mask; hardware updates bypass it.
//! 4. **Privilege:** The kernel-mode bit is derived from Status after every change.

use super::register::low_mask;

/// BadVAddr: most recent faulting address.
pub const BAD_VADDR: (u8, u8) = (8, 0);
/// Count: cycle counter.
pub const COUNT: (u8, u8) = (9, 0);
/// Compare: timer compare value.
pub const COMPARE: (u8, u8) = (11, 0);
/// Status: processor status and control.
pub const STATUS: (u8, u8) = (12, 0);
/// IntCtl: interrupt system control.
pub const INT_CTL: (u8, u8) = (12, 1);
/// Cause: cause of the last exception.
pub const CAUSE: (u8, u8) = (13, 0);
/// EPC: exception program counter.
pub const EPC: (u8, u8) = (14, 0);
/// PRId: processor identification.
pub const PRID: (u8, u8) = (15, 0);
/// EBase: exception vector base.
pub const EBASE: (u8, u8) = (15, 1);
/// ErrorEPC: program counter at the last error exception.
pub const ERROR_EPC: (u8, u8) = (30, 0);

/// Status.IE: global interrupt enable.
pub const STATUS_IE: u32 = 0;
/// Status.EXL: exception level.
pub const STATUS_EXL: u32 = 1;
/// Status.ERL: error level.
pub const STATUS_ERL: u32 = 2;
/// Status.IM: eight-bit interrupt mask.
pub const STATUS_IM: u32 = 8;
/// Status.KSU: two-bit operating mode field.
pub const STATUS_KSU: u32 = 3;
/// KSU value selecting user mode.
pub const KSU_USER: u32 = 0b10;

/// Cause.ExcCode: five-bit exception code field.
pub const CAUSE_EXC_CODE: u32 = 2;
/// Cause.IP: eight pending-interrupt bits; IP0 and IP1 are software interrupts.
pub const CAUSE_IP: u32 = 8;
/// Cause.TI: the timer interrupt is pending.
pub const CAUSE_TI: u32 = 30;
/// Cause.DC: disables the Count register.
pub const CAUSE_DC: u32 = 27;
/// Cause.BD: last exception was taken in a branch delay slot.
pub const CAUSE_BD: u32 = 31;

/// Hardware interrupt lines, wired to Cause.IP2 through IP7.
pub const HARDWARE_INTERRUPT_LINES: u8 = 6;
/// Hardware line shared with the Count/Compare timer.
pub const TIMER_INTERRUPT_LINE: u8 = 5;

/// Cause.IP bit of a hardware interrupt line.
pub fn hardware_ip_bit(line: u8) -> u32 {
    CAUSE_IP + 2 + u32::from(line)
}

/// A COP0 register with its selection index and software write mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cop0Register {
    register: u8,
    selection: u8,
    name: &'static str,
    value: u32,
    default: u32,
    software_mask: u32,
}

impl Cop0Register {
    const fn new(addr: (u8, u8), name: &'static str, default: u32, software_mask: u32) -> Self {
        Self {
            register: addr.0,
            selection: addr.1,
            name,
            value: default,
            default,
            software_mask,
        }
    }

    /// Register number.
    pub const fn register(&self) -> u8 {
        self.register
    }

    /// Selection index.
    pub const fn selection(&self) -> u8 {
        self.selection
    }

    /// Register name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Current value.
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Bits software may change.
    pub const fn software_mask(&self) -> u32 {
        self.software_mask
    }

    /// Returns whether bit `pos` is set.
    pub const fn bit(&self, pos: u32) -> bool {
        (self.value >> pos) & 1 == 1
    }

    /// Extracts `len` bits starting at `from`.
    pub const fn section(&self, from: u32, len: u32) -> u32 {
        (self.value >> from) & low_mask(len)
    }

    /// Software write: only bits in the write mask change.
    ///
    /// # Returns
    ///
    /// The previous value.
    pub const fn write_masked(&mut self, value: u32) -> u32 {
        let old = self.value;
        self.value = (value & self.software_mask) | (old & !self.software_mask);
        old
    }

    /// Hardware write: replaces the whole value.
    pub const fn write_hardware(&mut self, value: u32) -> u32 {
        let old = self.value;
        self.value = value;
        old
    }

    /// Hardware update of the `len`-bit field starting at `from`.
    pub const fn modify_bits(&mut self, value: u32, from: u32, len: u32) -> u32 {
        let mask = low_mask(len) << from;
        let old = self.value;
        self.value = (old & !mask) | ((value << from) & mask);
        old
    }
}

/// The COP0 register bank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cop0 {
    regs: Vec<Cop0Register>,
    kernel_mode: bool,
}

impl Cop0 {
    /// Creates the bank with every register at its reset value.
    pub fn new() -> Self {
        let mut regs = vec![
            Cop0Register::new(BAD_VADDR, "BadVAddr", 0, 0xFFFF_FFFF),
            Cop0Register::new(COUNT, "Count", 0, 0xFFFF_FFFF),
            Cop0Register::new(COMPARE, "Compare", 0, 0xFFFF_FFFF),
            Cop0Register::new(STATUS, "Status", 0x0000_0311, 0xF85B_FF17),
            Cop0Register::new(INT_CTL, "IntCtl", 0x20, 0xFFFF_FFFF),
            Cop0Register::new(CAUSE, "Cause", 0x0080_0000, 0xFFFF_FFFF),
            Cop0Register::new(EPC, "EPC", 0, 0xFFFF_FFFF),
            Cop0Register::new(PRID, "PRId", 0, 0xFFFF_FFFF),
            Cop0Register::new(EBASE, "EBase", 0x8000_0000, 0x3FFF_F000),
        ];
        const CONFIG_NAMES: [&str; 6] = ["Config", "Config1", "Config2", "Config3", "Config4", "Config5"];
        for (sel, name) in CONFIG_NAMES.iter().enumerate() {
            let reg = if sel == 3 {
                Cop0Register::new((16, 3), name, 0x8000_0020, 0)
            } else {
                Cop0Register::new((16, sel as u8), name, 0x8000_0000, 0x7FFF_FFFF)
            };
            regs.push(reg);
        }
        regs.push(Cop0Register::new(ERROR_EPC, "ErrorEPC", 0, 0xFFFF_FFFF));

        let mut bank = Self {
            regs,
            kernel_mode: false,
        };
        bank.refresh_privilege();
        bank
    }

    fn position(&self, register: u8, selection: u8) -> Option<usize> {
        self.regs
            .iter()
            .position(|reg| reg.register == register && reg.selection == selection)
    }

    /// Returns the register at `(register, selection)`.
    pub fn get(&self, register: u8, selection: u8) -> Option<&Cop0Register> {
        self.position(register, selection).map(|idx| &self.regs[idx])
    }

    /// Reads `(register, selection)`; unimplemented registers read as zero.
    pub fn read(&self, register: u8, selection: u8) -> u32 {
        self.get(register, selection).map_or(0, Cop0Register::value)
    }

    /// Reads a register by its address tuple.
    pub fn read_at(&self, addr: (u8, u8)) -> u32 {
        self.read(addr.0, addr.1)
    }

    /// Looks up a register address by name.
    pub fn address_of(&self, name: &str) -> Option<(u8, u8)> {
        self.regs
            .iter()
            .find(|reg| reg.name.eq_ignore_ascii_case(name))
            .map(|reg| (reg.register, reg.selection))
    }

    /// All implemented registers.
    pub fn registers(&self) -> &[Cop0Register] {
        &self.regs
    }

    /// Applies `op` to the addressed register and recomputes the privilege bit.
    ///
    /// # Returns
    ///
    /// `(old, new)` values, or `None` for unimplemented registers.
    fn update(&mut self, addr: (u8, u8), op: impl FnOnce(&mut Cop0Register) -> u32) -> Option<(u32, u32)> {
        let idx = self.position(addr.0, addr.1)?;
        let reg = &mut self.regs[idx];
        let old = op(reg);
        let new = reg.value;
        if addr == STATUS {
            self.refresh_privilege();
        }
        Some((old, new))
    }

    /// Software write through the register's mask.
    pub fn write_masked(&mut self, addr: (u8, u8), value: u32) -> Option<(u32, u32)> {
        self.update(addr, |reg| reg.write_masked(value))
    }

    /// Hardware write of the whole register.
    pub fn write_hardware(&mut self, addr: (u8, u8), value: u32) -> Option<(u32, u32)> {
        self.update(addr, |reg| reg.write_hardware(value))
    }

    /// Hardware update of a bit field.
    pub fn modify_bits(&mut self, addr: (u8, u8), value: u32, from: u32, len: u32) -> Option<(u32, u32)> {
        self.update(addr, |reg| reg.modify_bits(value, from, len))
    }

    /// Whether the processor currently runs in kernel mode.
    pub const fn kernel_mode(&self) -> bool {
        self.kernel_mode
    }

    /// Current Status value.
    pub fn status(&self) -> u32 {
        self.read_at(STATUS)
    }

    /// Whether an unmasked interrupt is pending and interrupts are enabled.
    ///
    /// Requires Status.IE set with EXL and ERL clear, and a Cause.IP bit whose
    /// Status.IM bit is set.
    pub fn interrupt_pending(&self) -> bool {
        let status = self.status();
        let enabled = (status >> STATUS_IE) & 1 == 1
            && (status >> STATUS_EXL) & 1 == 0
            && (status >> STATUS_ERL) & 1 == 0;
        let pending = (self.read_at(CAUSE) >> CAUSE_IP) & (status >> STATUS_IM) & 0xFF;
        enabled && pending != 0
    }

    fn refresh_privilege(&mut self) {
        let status = self.status();
        let exl = (status >> STATUS_EXL) & 1 == 1;
        let erl = (status >> STATUS_ERL) & 1 == 1;
        let ksu = (status >> STATUS_KSU) & 0b11;
        self.kernel_mode = exl || erl || ksu != KSU_USER;
    }

    /// Restores every register to its reset value.
    pub fn reset(&mut self) {
        for reg in &mut self.regs {
            reg.value = reg.default;
        }
        self.refresh_privilege();
    }
}

impl Default for Cop0 {
    fn default() -> Self {
        Self::new()
    }
}

//! Primary opcodes and function codes of the MIPS32 encoding.

/// SPECIAL opcode (register format, selected by `funct`).
pub const SPECIAL: u32 = 0x00;
/// REGIMM opcode (selected by the `rt` field).
pub const REGIMM: u32 = 0x01;
/// Jump.
pub const J: u32 = 0x02;
/// Jump and link.
pub const JAL: u32 = 0x03;
/// Branch on equal.
pub const BEQ: u32 = 0x04;
/// Branch on not equal.
pub const BNE: u32 = 0x05;
/// Branch on less than or equal to zero.
pub const BLEZ: u32 = 0x06;
/// Branch on greater than zero.
pub const BGTZ: u32 = 0x07;
/// Add immediate with overflow trap.
pub const ADDI: u32 = 0x08;
/// Add immediate unsigned.
pub const ADDIU: u32 = 0x09;
/// Set on less than immediate.
pub const SLTI: u32 = 0x0A;
/// Set on less than immediate unsigned.
pub const SLTIU: u32 = 0x0B;
/// And immediate.
pub const ANDI: u32 = 0x0C;
/// Or immediate.
pub const ORI: u32 = 0x0D;
/// Xor immediate.
pub const XORI: u32 = 0x0E;
/// Load upper immediate (`aui` with `rs = 0`).
pub const LUI: u32 = 0x0F;
/// Coprocessor 0.
pub const COP0: u32 = 0x10;
/// Coprocessor 1 (FPU).
pub const COP1: u32 = 0x11;
/// Coprocessor 2.
pub const COP2: u32 = 0x12;
/// Load byte.
pub const LB: u32 = 0x20;
/// Load halfword.
pub const LH: u32 = 0x21;
/// Load word.
pub const LW: u32 = 0x23;
/// Load byte unsigned.
pub const LBU: u32 = 0x24;
/// Load halfword unsigned.
pub const LHU: u32 = 0x25;
/// Store byte.
pub const SB: u32 = 0x28;
/// Store halfword.
pub const SH: u32 = 0x29;
/// Store word.
pub const SW: u32 = 0x2B;
/// Load word to FPU.
pub const LWC1: u32 = 0x31;
/// Compact branch.
pub const BC: u32 = 0x32;
/// Store word from FPU.
pub const SWC1: u32 = 0x39;
/// Compact branch and link.
pub const BALC: u32 = 0x3A;

/// SPECIAL: shift left logical.
pub const FUNCT_SLL: u32 = 0x00;
/// SPECIAL: shift right logical.
pub const FUNCT_SRL: u32 = 0x02;
/// SPECIAL: shift right arithmetic.
pub const FUNCT_SRA: u32 = 0x03;
/// SPECIAL: shift left logical variable.
pub const FUNCT_SLLV: u32 = 0x04;
/// SPECIAL: shift right logical variable.
pub const FUNCT_SRLV: u32 = 0x06;
/// SPECIAL: shift right arithmetic variable.
pub const FUNCT_SRAV: u32 = 0x07;
/// SPECIAL: jump register.
pub const FUNCT_JR: u32 = 0x08;
/// SPECIAL: jump and link register.
pub const FUNCT_JALR: u32 = 0x09;
/// SPECIAL: system call.
pub const FUNCT_SYSCALL: u32 = 0x0C;
/// SPECIAL: breakpoint.
pub const FUNCT_BREAK: u32 = 0x0D;
/// SPECIAL: `mul`/`muh`.
pub const FUNCT_SOP30: u32 = 0x18;
/// SPECIAL: `mulu`/`muhu`.
pub const FUNCT_SOP31: u32 = 0x19;
/// SPECIAL: `div`/`mod`.
pub const FUNCT_SOP32: u32 = 0x1A;
/// SPECIAL: `divu`/`modu`.
pub const FUNCT_SOP33: u32 = 0x1B;
/// SPECIAL: add with overflow trap.
pub const FUNCT_ADD: u32 = 0x20;
/// SPECIAL: add unsigned.
pub const FUNCT_ADDU: u32 = 0x21;
/// SPECIAL: subtract with overflow trap.
pub const FUNCT_SUB: u32 = 0x22;
/// SPECIAL: subtract unsigned.
pub const FUNCT_SUBU: u32 = 0x23;
/// SPECIAL: and.
pub const FUNCT_AND: u32 = 0x24;
/// SPECIAL: or.
pub const FUNCT_OR: u32 = 0x25;
/// SPECIAL: xor.
pub const FUNCT_XOR: u32 = 0x26;
/// SPECIAL: nor.
pub const FUNCT_NOR: u32 = 0x27;
/// SPECIAL: set on less than.
pub const FUNCT_SLT: u32 = 0x2A;
/// SPECIAL: set on less than unsigned.
pub const FUNCT_SLTU: u32 = 0x2B;
/// SPECIAL: trap if equal.
pub const FUNCT_TEQ: u32 = 0x34;

/// `sop` selecting the low result (`mul`, `div`).
pub const SOP_LOW: u32 = 0b00010;
/// `sop` selecting the high result (`muh`, `mod`).
pub const SOP_HIGH: u32 = 0b00011;

/// REGIMM: branch on less than zero.
pub const RI_BLTZ: u32 = 0x00;
/// REGIMM: branch on greater than or equal to zero.
pub const RI_BGEZ: u32 = 0x01;

/// COP0/COP1 `rs`: move from coprocessor.
pub const RS_MF: u32 = 0x00;
/// COP0/COP1 `rs`: move to coprocessor.
pub const RS_MT: u32 = 0x04;
/// COP0 `rs`: coprocessor operation (`eret`).
pub const RS_CO: u32 = 0x10;
/// COP0 CO function: exception return.
pub const FUNCT_ERET: u32 = 0x18;

/// COP1 `fmt`: single precision.
pub const FMT_S: u32 = 0x10;
/// COP1 `fmt`: double precision.
pub const FMT_D: u32 = 0x11;
/// COP1 `fmt`: 32-bit fixed point.
pub const FMT_W: u32 = 0x14;
/// COP1 `fmt`: 64-bit fixed point.
pub const FMT_L: u32 = 0x15;

/// COP1: floating-point add.
pub const FUNCT_FADD: u32 = 0x00;
/// COP1: floating-point subtract.
pub const FUNCT_FSUB: u32 = 0x01;
/// COP1: floating-point multiply.
pub const FUNCT_FMUL: u32 = 0x02;
/// COP1: floating-point divide.
pub const FUNCT_FDIV: u32 = 0x03;

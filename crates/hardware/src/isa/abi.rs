//! MIPS o32 register name constants.
//!
//! Defines the conventional register numbers used by system calls and the
//! calling convention, plus the assembler aliases of every GPR and FPR.

/// `$zero`, hardwired to zero.
pub const REG_ZERO: usize = 0;
/// `$at`, assembler temporary.
pub const REG_AT: usize = 1;
/// `$v0`, first return value and syscall service number.
pub const REG_V0: usize = 2;
/// `$v1`, second return value.
pub const REG_V1: usize = 3;
/// `$a0`, first argument.
pub const REG_A0: usize = 4;
/// `$a1`, second argument.
pub const REG_A1: usize = 5;
/// `$a2`, third argument.
pub const REG_A2: usize = 6;
/// `$a3`, fourth argument.
pub const REG_A3: usize = 7;
/// `$t0`, first temporary.
pub const REG_T0: usize = 8;
/// `$s0`, first saved register.
pub const REG_S0: usize = 16;
/// `$k0`, reserved for the kernel.
pub const REG_K0: usize = 26;
/// `$gp`, global pointer.
pub const REG_GP: usize = 28;
/// `$sp`, stack pointer.
pub const REG_SP: usize = 29;
/// `$fp`, frame pointer.
pub const REG_FP: usize = 30;
/// `$ra`, return address.
pub const REG_RA: usize = 31;

/// Aliases of each general-purpose register, canonical name first.
pub const GPR_NAMES: [&[&str]; 32] = [
    &["$zero", "$0"],
    &["$at", "$1"],
    &["$v0", "$2"],
    &["$v1", "$3"],
    &["$a0", "$4"],
    &["$a1", "$5"],
    &["$a2", "$6"],
    &["$a3", "$7"],
    &["$t0", "$8"],
    &["$t1", "$9"],
    &["$t2", "$10"],
    &["$t3", "$11"],
    &["$t4", "$12"],
    &["$t5", "$13"],
    &["$t6", "$14"],
    &["$t7", "$15"],
    &["$s0", "$16"],
    &["$s1", "$17"],
    &["$s2", "$18"],
    &["$s3", "$19"],
    &["$s4", "$20"],
    &["$s5", "$21"],
    &["$s6", "$22"],
    &["$s7", "$23"],
    &["$t8", "$24"],
    &["$t9", "$25"],
    &["$k0", "$26"],
    &["$k1", "$27"],
    &["$gp", "$28"],
    &["$sp", "$29"],
    &["$fp", "$s8", "$30"],
    &["$ra", "$31"],
];

/// Names of the floating-point registers.
pub const FPR_NAMES: [&[&str]; 32] = [
    &["$f0"],
    &["$f1"],
    &["$f2"],
    &["$f3"],
    &["$f4"],
    &["$f5"],
    &["$f6"],
    &["$f7"],
    &["$f8"],
    &["$f9"],
    &["$f10"],
    &["$f11"],
    &["$f12"],
    &["$f13"],
    &["$f14"],
    &["$f15"],
    &["$f16"],
    &["$f17"],
    &["$f18"],
    &["$f19"],
    &["$f20"],
    &["$f21"],
    &["$f22"],
    &["$f23"],
    &["$f24"],
    &["$f25"],
    &["$f26"],
    &["$f27"],
    &["$f28"],
    &["$f29"],
    &["$f30"],
    &["$f31"],
];

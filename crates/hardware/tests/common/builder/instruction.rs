//! Encoders for the instructions test programs are written in.
//!
//! Every helper goes through `codec::encode`, so programs are built with the
//! same field layout the decoder reads back.

use mipsim_core::isa::codec::{Fields, encode};
use mipsim_core::isa::opcodes::*;

pub const ZERO: usize = 0;
pub const V0: usize = 2;
pub const A0: usize = 4;
pub const T0: usize = 8;
pub const T1: usize = 9;
pub const T2: usize = 10;
pub const T3: usize = 11;
pub const S0: usize = 16;
pub const S1: usize = 17;
pub const S2: usize = 18;
pub const K0: usize = 26;

/// COP0 EPC as `(register, selection)`.
pub const EPC: (u8, u8) = (14, 0);

fn special(funct: u32, rd: usize, rs: usize, rt: usize, shamt: u8) -> u32 {
    encode(&Fields::R {
        opcode: SPECIAL as u8,
        rs: rs as u8,
        rt: rt as u8,
        rd: rd as u8,
        shamt,
        funct: funct as u8,
    })
}

fn immediate(opcode: u32, rt: usize, rs: usize, imm: i16) -> u32 {
    encode(&Fields::I {
        opcode: opcode as u8,
        rs: rs as u8,
        rt: rt as u8,
        imm,
    })
}

fn cop0(rs: u32, rt: usize, reg: (u8, u8), funct: u8) -> u32 {
    encode(&Fields::R {
        opcode: COP0 as u8,
        rs: rs as u8,
        rt: rt as u8,
        rd: reg.0,
        shamt: 0,
        funct: funct | reg.1,
    })
}

/// `sll $zero, $zero, 0`.
pub fn nop() -> u32 {
    0
}

pub fn add(rd: usize, rs: usize, rt: usize) -> u32 {
    special(FUNCT_ADD, rd, rs, rt, 0)
}

pub fn addu(rd: usize, rs: usize, rt: usize) -> u32 {
    special(FUNCT_ADDU, rd, rs, rt, 0)
}

pub fn sub(rd: usize, rs: usize, rt: usize) -> u32 {
    special(FUNCT_SUB, rd, rs, rt, 0)
}

pub fn sll(rd: usize, rt: usize, shamt: u8) -> u32 {
    special(FUNCT_SLL, rd, 0, rt, shamt)
}

pub fn srl(rd: usize, rt: usize, shamt: u8) -> u32 {
    special(FUNCT_SRL, rd, 0, rt, shamt)
}

pub fn jr(rs: usize) -> u32 {
    special(FUNCT_JR, 0, rs, 0, 0)
}

pub fn syscall() -> u32 {
    special(FUNCT_SYSCALL, 0, 0, 0, 0)
}

pub fn brk() -> u32 {
    special(FUNCT_BREAK, 0, 0, 0, 0)
}

pub fn teq(rs: usize, rt: usize) -> u32 {
    special(FUNCT_TEQ, 0, rs, rt, 0)
}

pub fn addi(rt: usize, rs: usize, imm: i16) -> u32 {
    immediate(ADDI, rt, rs, imm)
}

pub fn addiu(rt: usize, rs: usize, imm: i16) -> u32 {
    immediate(ADDIU, rt, rs, imm)
}

/// `li` for values that fit in 16 signed bits.
pub fn li(rt: usize, imm: i16) -> u32 {
    addiu(rt, ZERO, imm)
}

pub fn andi(rt: usize, rs: usize, imm: u16) -> u32 {
    immediate(ANDI, rt, rs, imm as i16)
}

pub fn ori(rt: usize, rs: usize, imm: u16) -> u32 {
    immediate(ORI, rt, rs, imm as i16)
}

pub fn lui(rt: usize, imm: u16) -> u32 {
    immediate(LUI, rt, ZERO, imm as i16)
}

pub fn lw(rt: usize, offset: i16, base: usize) -> u32 {
    immediate(LW, rt, base, offset)
}

pub fn lb(rt: usize, offset: i16, base: usize) -> u32 {
    immediate(LB, rt, base, offset)
}

pub fn sw(rt: usize, offset: i16, base: usize) -> u32 {
    immediate(SW, rt, base, offset)
}

pub fn sb(rt: usize, offset: i16, base: usize) -> u32 {
    immediate(SB, rt, base, offset)
}

/// `beq` with an offset in instructions relative to the next instruction.
pub fn beq(rs: usize, rt: usize, offset: i16) -> u32 {
    immediate(BEQ, rt, rs, offset)
}

pub fn bne(rs: usize, rt: usize, offset: i16) -> u32 {
    immediate(BNE, rt, rs, offset)
}

/// `j` to an absolute address in the current 256 MB region.
pub fn j(target: u32) -> u32 {
    encode(&Fields::J {
        opcode: J as u8,
        target: target >> 2,
    })
}

pub fn mfc0(rt: usize, reg: (u8, u8)) -> u32 {
    cop0(RS_MF, rt, reg, 0)
}

pub fn mtc0(rt: usize, reg: (u8, u8)) -> u32 {
    cop0(RS_MT, rt, reg, 0)
}

pub fn eret() -> u32 {
    encode(&Fields::R {
        opcode: COP0 as u8,
        rs: RS_CO as u8,
        rt: 0,
        rd: 0,
        shamt: 0,
        funct: FUNCT_ERET as u8,
    })
}

/// `li $v0, service; syscall`.
pub fn call(service: i16) -> [u32; 2] {
    [li(V0, service), syscall()]
}

/// `li $v0, 10; syscall`.
pub fn exit() -> [u32; 2] {
    call(10)
}

//! Reference MIPS32 instruction catalog.
//!
//! A table-driven set of basic instructions covering integer arithmetic,
//! shifts, multiply/divide, loads and stores, branches and jumps (including
//! the compact `bc`/`balc`), COP0 moves, `eret`, `syscall`, `break`, `teq`
//! and single-precision FPU arithmetic. Each entry pairs a matcher with a
//! control-signal builder and a pure execute function.

use std::sync::Arc;

use super::codec::{Fields, Format};
use super::instruction::InstructionBits;
use super::opcodes::*;
use super::set::{ExecInput, ExecOutput, HandlerTable, InstructionHandler};
use crate::common::error::Fault;
use crate::core::pipeline::signals::{ControlSignals, MemOp, MemWidth, OpClass, RegRef, SystemOp};
use crate::isa::abi::REG_RA;

type SignalFn = fn(&Fields) -> ControlSignals;
type ExecFn = fn(&ExecInput) -> Result<ExecOutput, Fault>;

/// Sub-field test applied after the primary opcode matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Selector {
    Any,
    Funct(u32),
    Rs(u32),
    Rt(u32),
    RsFunct(u32, u32),
    SopFunct(u32, u32),
}

impl Selector {
    fn accepts(self, word: u32) -> bool {
        match self {
            Self::Any => true,
            Self::Funct(funct) => word.funct() == funct,
            Self::Rs(rs) => word.rs() as u32 == rs,
            Self::Rt(rt) => word.rt() as u32 == rt,
            Self::RsFunct(rs, funct) => word.rs() as u32 == rs && word.funct() == funct,
            Self::SopFunct(sop, funct) => word.shamt() == sop && word.funct() == funct,
        }
    }
}

/// One catalog entry.
#[derive(Clone, Copy, Debug)]
pub struct BasicInstruction {
    mnemonic: &'static str,
    format: Format,
    opcode: u32,
    selector: Selector,
    signals: SignalFn,
    exec: ExecFn,
}

impl InstructionHandler for BasicInstruction {
    fn mnemonic(&self) -> &str {
        self.mnemonic
    }

    fn format(&self) -> Format {
        self.format
    }

    fn matches(&self, word: u32) -> bool {
        word.opcode() == self.opcode && self.selector.accepts(word)
    }

    fn signals(&self, fields: &Fields) -> ControlSignals {
        (self.signals)(fields)
    }

    fn execute(&self, input: &ExecInput) -> Result<ExecOutput, Fault> {
        (self.exec)(input)
    }
}

const fn gpr(idx: u8) -> RegRef {
    RegRef::Gpr(idx)
}

const fn cop0_of(fields: &Fields) -> RegRef {
    RegRef::Cop0 {
        register: fields.rd(),
        selection: fields.funct() & 0x7,
    }
}

fn three_reg(f: &Fields) -> ControlSignals {
    ControlSignals::alu(gpr(f.rd()), Some(gpr(f.rs())), Some(gpr(f.rt())))
}

fn shift_imm(f: &Fields) -> ControlSignals {
    ControlSignals::alu(gpr(f.rd()), Some(gpr(f.rt())), None)
}

fn shift_var(f: &Fields) -> ControlSignals {
    ControlSignals::alu(gpr(f.rd()), Some(gpr(f.rt())), Some(gpr(f.rs())))
}

fn reg_imm(f: &Fields) -> ControlSignals {
    ControlSignals::alu(gpr(f.rt()), Some(gpr(f.rs())), None)
}

fn load<const WIDTH: u32, const SIGNED: bool, const FPU: bool>(f: &Fields) -> ControlSignals {
    let dest = if FPU { RegRef::Fpr(f.rt()) } else { gpr(f.rt()) };
    ControlSignals {
        sources: [Some(gpr(f.rs())), None],
        dest: Some(dest),
        mem: MemOp::Load {
            width: width_of(WIDTH),
            signed: SIGNED,
        },
        ..ControlSignals::default()
    }
}

fn store<const WIDTH: u32, const FPU: bool>(f: &Fields) -> ControlSignals {
    let data = if FPU { RegRef::Fpr(f.rt()) } else { gpr(f.rt()) };
    ControlSignals {
        sources: [Some(gpr(f.rs())), Some(data)],
        mem: MemOp::Store {
            width: width_of(WIDTH),
        },
        ..ControlSignals::default()
    }
}

const fn width_of(bytes: u32) -> MemWidth {
    match bytes {
        1 => MemWidth::Byte,
        2 => MemWidth::Half,
        _ => MemWidth::Word,
    }
}

fn system<const OP: u8>(_: &Fields) -> ControlSignals {
    let system = match OP {
        0 => SystemOp::Syscall,
        1 => SystemOp::Break,
        _ => SystemOp::Eret,
    };
    ControlSignals {
        system,
        ..ControlSignals::default()
    }
}

fn fpu_arith(f: &Fields) -> ControlSignals {
    match *f {
        Fields::RFpu { ft, fs, fd, .. } => {
            ControlSignals::alu(RegRef::Fpr(fd), Some(RegRef::Fpr(fs)), Some(RegRef::Fpr(ft)))
                .with_class(OpClass::FloatingPoint)
        }
        _ => ControlSignals::default(),
    }
}

fn value(v: u32) -> Result<ExecOutput, Fault> {
    Ok(ExecOutput::value(v))
}

fn nothing(_: &ExecInput) -> Result<ExecOutput, Fault> {
    Ok(ExecOutput::default())
}

fn pass_through(i: &ExecInput) -> Result<ExecOutput, Fault> {
    value(i.operands[0])
}

const fn imm(i: &ExecInput) -> u32 {
    i.fields.imm() as u32
}

const fn zero_imm(i: &ExecInput) -> u32 {
    i.fields.imm() as u32 & 0xFFFF
}

const fn branch_target(i: &ExecInput) -> u32 {
    i.pc.wrapping_add(4).wrapping_add((i.fields.imm() as u32) << 2)
}

fn branch_if(i: &ExecInput, cond: bool) -> Result<ExecOutput, Fault> {
    Ok(ExecOutput {
        branch: cond.then(|| branch_target(i)),
        ..ExecOutput::default()
    })
}

fn address(i: &ExecInput) -> Result<ExecOutput, Fault> {
    Ok(ExecOutput {
        value: i.operands[0].wrapping_add(imm(i)),
        store: i.operands[1],
        branch: None,
    })
}

fn float(i: &ExecInput, op: fn(f32, f32) -> f32) -> Result<ExecOutput, Fault> {
    let [a, b] = i.operands.map(f32::from_bits);
    value(op(a, b).to_bits())
}

fn checked(result: Option<i32>) -> Result<ExecOutput, Fault> {
    result.map_or(Err(Fault::Arithmetic), |v| value(v as u32))
}

fn division<T>(divisor: u32, op: impl FnOnce() -> T) -> Result<T, Fault> {
    if divisor == 0 {
        Err(Fault::RuntimeInstruction("division by zero".to_owned()))
    } else {
        Ok(op())
    }
}

const fn entry(
    mnemonic: &'static str,
    format: Format,
    opcode: u32,
    selector: Selector,
    signals: SignalFn,
    exec: ExecFn,
) -> BasicInstruction {
    BasicInstruction {
        mnemonic,
        format,
        opcode,
        selector,
        signals,
        exec,
    }
}

fn special(mnemonic: &'static str, funct: u32, signals: SignalFn, exec: ExecFn) -> BasicInstruction {
    entry(mnemonic, Format::R, SPECIAL, Selector::Funct(funct), signals, exec)
}

fn sop(mnemonic: &'static str, funct: u32, sop: u32, exec: ExecFn) -> BasicInstruction {
    entry(mnemonic, Format::RSop, SPECIAL, Selector::SopFunct(sop, funct), three_reg, exec)
}

fn immediate(mnemonic: &'static str, opcode: u32, signals: SignalFn, exec: ExecFn) -> BasicInstruction {
    entry(mnemonic, Format::I, opcode, Selector::Any, signals, exec)
}

fn fpu(mnemonic: &'static str, funct: u32, exec: ExecFn) -> BasicInstruction {
    entry(mnemonic, Format::RFpu, COP1, Selector::RsFunct(FMT_S, funct), fpu_arith, exec)
}

/// Every instruction of the reference catalog.
pub fn basic_instructions() -> Vec<BasicInstruction> {
    vec![
        special("sll", FUNCT_SLL, shift_imm, |i| value(i.operands[0] << i.fields.shamt())),
        special("srl", FUNCT_SRL, shift_imm, |i| value(i.operands[0] >> i.fields.shamt())),
        special("sra", FUNCT_SRA, shift_imm, |i| {
            value(((i.operands[0] as i32) >> i.fields.shamt()) as u32)
        }),
        special("sllv", FUNCT_SLLV, shift_var, |i| value(i.operands[0] << (i.operands[1] & 31))),
        special("srlv", FUNCT_SRLV, shift_var, |i| value(i.operands[0] >> (i.operands[1] & 31))),
        special("srav", FUNCT_SRAV, shift_var, |i| {
            value(((i.operands[0] as i32) >> (i.operands[1] & 31)) as u32)
        }),
        special(
            "jr",
            FUNCT_JR,
            |f| ControlSignals::branch(Some(gpr(f.rs())), None, None),
            |i| {
                Ok(ExecOutput {
                    branch: Some(i.operands[0]),
                    ..ExecOutput::default()
                })
            },
        ),
        special(
            "jalr",
            FUNCT_JALR,
            |f| ControlSignals::branch(Some(gpr(f.rs())), None, Some(gpr(f.rd()))),
            |i| {
                Ok(ExecOutput {
                    value: i.link,
                    store: 0,
                    branch: Some(i.operands[0]),
                })
            },
        ),
        special("syscall", FUNCT_SYSCALL, system::<0>, nothing),
        special("break", FUNCT_BREAK, system::<1>, |_| Err(Fault::Break)),
        special(
            "teq",
            FUNCT_TEQ,
            |f| ControlSignals {
                sources: [Some(gpr(f.rs())), Some(gpr(f.rt()))],
                ..ControlSignals::default()
            },
            |i| {
                if i.operands[0] == i.operands[1] {
                    Err(Fault::Trap)
                } else {
                    Ok(ExecOutput::default())
                }
            },
        ),
        special("add", FUNCT_ADD, three_reg, |i| {
            checked((i.operands[0] as i32).checked_add(i.operands[1] as i32))
        }),
        special("addu", FUNCT_ADDU, three_reg, |i| value(i.operands[0].wrapping_add(i.operands[1]))),
        special("sub", FUNCT_SUB, three_reg, |i| {
            checked((i.operands[0] as i32).checked_sub(i.operands[1] as i32))
        }),
        special("subu", FUNCT_SUBU, three_reg, |i| value(i.operands[0].wrapping_sub(i.operands[1]))),
        special("and", FUNCT_AND, three_reg, |i| value(i.operands[0] & i.operands[1])),
        special("or", FUNCT_OR, three_reg, |i| value(i.operands[0] | i.operands[1])),
        special("xor", FUNCT_XOR, three_reg, |i| value(i.operands[0] ^ i.operands[1])),
        special("nor", FUNCT_NOR, three_reg, |i| value(!(i.operands[0] | i.operands[1]))),
        special("slt", FUNCT_SLT, three_reg, |i| {
            value(u32::from((i.operands[0] as i32) < (i.operands[1] as i32)))
        }),
        special("sltu", FUNCT_SLTU, three_reg, |i| value(u32::from(i.operands[0] < i.operands[1]))),
        sop("mul", FUNCT_SOP30, SOP_LOW, |i| {
            value((i.operands[0] as i32).wrapping_mul(i.operands[1] as i32) as u32)
        }),
        sop("muh", FUNCT_SOP30, SOP_HIGH, |i| {
            let product = i64::from(i.operands[0] as i32) * i64::from(i.operands[1] as i32);
            value((product >> 32) as u32)
        }),
        sop("mulu", FUNCT_SOP31, SOP_LOW, |i| value(i.operands[0].wrapping_mul(i.operands[1]))),
        sop("muhu", FUNCT_SOP31, SOP_HIGH, |i| {
            value(((u64::from(i.operands[0]) * u64::from(i.operands[1])) >> 32) as u32)
        }),
        sop("div", FUNCT_SOP32, SOP_LOW, |i| {
            let [a, b] = i.operands;
            division(b, || ExecOutput::value((a as i32).wrapping_div(b as i32) as u32))
        }),
        sop("mod", FUNCT_SOP32, SOP_HIGH, |i| {
            let [a, b] = i.operands;
            division(b, || ExecOutput::value((a as i32).wrapping_rem(b as i32) as u32))
        }),
        sop("divu", FUNCT_SOP33, SOP_LOW, |i| {
            let [a, b] = i.operands;
            division(b, || ExecOutput::value(a / b))
        }),
        sop("modu", FUNCT_SOP33, SOP_HIGH, |i| {
            let [a, b] = i.operands;
            division(b, || ExecOutput::value(a % b))
        }),
        immediate("addi", ADDI, reg_imm, |i| {
            checked((i.operands[0] as i32).checked_add(imm(i) as i32))
        }),
        immediate("addiu", ADDIU, reg_imm, |i| value(i.operands[0].wrapping_add(imm(i)))),
        immediate("slti", SLTI, reg_imm, |i| {
            value(u32::from((i.operands[0] as i32) < (imm(i) as i32)))
        }),
        immediate("sltiu", SLTIU, reg_imm, |i| value(u32::from(i.operands[0] < imm(i)))),
        immediate("andi", ANDI, reg_imm, |i| value(i.operands[0] & zero_imm(i))),
        immediate("ori", ORI, reg_imm, |i| value(i.operands[0] | zero_imm(i))),
        immediate("xori", XORI, reg_imm, |i| value(i.operands[0] ^ zero_imm(i))),
        immediate("lui", LUI, reg_imm, |i| value(i.operands[0].wrapping_add(imm(i) << 16))),
        immediate(
            "beq",
            BEQ,
            |f| ControlSignals::branch(Some(gpr(f.rs())), Some(gpr(f.rt())), None),
            |i| branch_if(i, i.operands[0] == i.operands[1]),
        ),
        immediate(
            "bne",
            BNE,
            |f| ControlSignals::branch(Some(gpr(f.rs())), Some(gpr(f.rt())), None),
            |i| branch_if(i, i.operands[0] != i.operands[1]),
        ),
        entry(
            "blez",
            Format::I,
            BLEZ,
            Selector::Rt(0),
            |f| ControlSignals::branch(Some(gpr(f.rs())), None, None),
            |i| branch_if(i, (i.operands[0] as i32) <= 0),
        ),
        entry(
            "bgtz",
            Format::I,
            BGTZ,
            Selector::Rt(0),
            |f| ControlSignals::branch(Some(gpr(f.rs())), None, None),
            |i| branch_if(i, (i.operands[0] as i32) > 0),
        ),
        entry(
            "bltz",
            Format::Ri,
            REGIMM,
            Selector::Rt(RI_BLTZ),
            |f| ControlSignals::branch(Some(gpr(f.rs())), None, None),
            |i| branch_if(i, (i.operands[0] as i32) < 0),
        ),
        entry(
            "bgez",
            Format::Ri,
            REGIMM,
            Selector::Rt(RI_BGEZ),
            |f| ControlSignals::branch(Some(gpr(f.rs())), None, None),
            |i| branch_if(i, (i.operands[0] as i32) >= 0),
        ),
        immediate("lb", LB, load::<1, true, false>, address),
        immediate("lh", LH, load::<2, true, false>, address),
        immediate("lw", LW, load::<4, true, false>, address),
        immediate("lbu", LBU, load::<1, false, false>, address),
        immediate("lhu", LHU, load::<2, false, false>, address),
        immediate("sb", SB, store::<1, false>, address),
        immediate("sh", SH, store::<2, false>, address),
        immediate("sw", SW, store::<4, false>, address),
        immediate("lwc1", LWC1, load::<4, false, true>, address),
        immediate("swc1", SWC1, store::<4, true>, address),
        entry(
            "j",
            Format::J,
            J,
            Selector::Any,
            |_| ControlSignals::branch(None, None, None),
            |i| {
                Ok(ExecOutput {
                    branch: Some(jump_target(i)),
                    ..ExecOutput::default()
                })
            },
        ),
        entry(
            "jal",
            Format::J,
            JAL,
            Selector::Any,
            |_| ControlSignals::branch(None, None, Some(gpr(REG_RA as u8))),
            |i| {
                Ok(ExecOutput {
                    value: i.link,
                    store: 0,
                    branch: Some(jump_target(i)),
                })
            },
        ),
        entry(
            "bc",
            Format::I26,
            BC,
            Selector::Any,
            |_| ControlSignals::branch(None, None, None).compact(),
            |i| branch_if(i, true),
        ),
        entry(
            "balc",
            Format::I26,
            BALC,
            Selector::Any,
            |_| ControlSignals::branch(None, None, Some(gpr(REG_RA as u8))).compact(),
            |i| {
                Ok(ExecOutput {
                    value: i.link,
                    store: 0,
                    branch: Some(branch_target(i)),
                })
            },
        ),
        entry(
            "mfc0",
            Format::R,
            COP0,
            Selector::Rs(RS_MF),
            |f| ControlSignals::alu(gpr(f.rt()), Some(cop0_of(f)), None),
            pass_through,
        ),
        entry(
            "mtc0",
            Format::R,
            COP0,
            Selector::Rs(RS_MT),
            |f| ControlSignals::alu(cop0_of(f), Some(gpr(f.rt())), None),
            pass_through,
        ),
        entry(
            "eret",
            Format::R,
            COP0,
            Selector::RsFunct(RS_CO, FUNCT_ERET),
            system::<2>,
            nothing,
        ),
        entry(
            "mfc1",
            Format::R,
            COP1,
            Selector::Rs(RS_MF),
            |f| ControlSignals::alu(gpr(f.rt()), Some(RegRef::Fpr(f.rd())), None),
            pass_through,
        ),
        entry(
            "mtc1",
            Format::R,
            COP1,
            Selector::Rs(RS_MT),
            |f| ControlSignals::alu(RegRef::Fpr(f.rd()), Some(gpr(f.rt())), None),
            pass_through,
        ),
        fpu("add.s", FUNCT_FADD, |i| float(i, |a, b| a + b)),
        fpu("sub.s", FUNCT_FSUB, |i| float(i, |a, b| a - b)),
        fpu("mul.s", FUNCT_FMUL, |i| float(i, |a, b| a * b)),
        fpu("div.s", FUNCT_FDIV, |i| float(i, |a, b| a / b)),
    ]
}

const fn jump_target(i: &ExecInput) -> u32 {
    (i.pc.wrapping_add(4) & 0xF000_0000) | ((i.fields.imm() as u32) << 2)
}

/// Builds the reference MIPS32 instruction set.
pub fn mips32() -> HandlerTable {
    let mut table = HandlerTable::new("mips32");
    for instruction in basic_instructions() {
        let opcode = instruction.opcode;
        table.register(opcode, Arc::new(instruction));
    }
    table
}

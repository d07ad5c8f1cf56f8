use mipsim_core::config::{Config, TopologyKind, UnitConfig, UnitKind};
use mipsim_core::isa::codec::{Fields, encode};
use mipsim_core::isa::opcodes::{COP1, FMT_S, FUNCT_FADD};
use mipsim_core::sim::Program;
use pretty_assertions::assert_eq;

use crate::common::TestContext;
use crate::common::asm::{self, T0, T1};

fn add_s(fd: u8, fs: u8, ft: u8) -> u32 {
    encode(&Fields::RFpu {
        opcode: COP1 as u8,
        fmt: FMT_S as u8,
        ft,
        fs,
        fd,
        funct: FUNCT_FADD as u8,
    })
}

fn multi_alu(words: &[u32], units: Vec<UnitConfig>) -> TestContext {
    let mut config = Config::default().with_topology(TopologyKind::MultiAluPipelined);
    config.pipeline.units = units;
    let mut ctx = TestContext::with_program(&config, &Program::from_words(words));
    ctx.sim.cpu.regs.set_fpr_bits(0, 1.5f32.to_bits());
    ctx
}

fn unit(kind: UnitKind, latency: u32) -> UnitConfig {
    UnitConfig { kind, latency }
}

#[test]
fn floating_point_runs_on_its_own_unit() {
    let words = [add_s(2, 0, 0), asm::li(T0, 1)];
    let mut ctx = multi_alu(&words, vec![unit(UnitKind::Integer, 1), unit(UnitKind::FloatingPoint, 4)]);
    let cycles = ctx.step_to_exit();

    assert_eq!(ctx.sim.registers().fpr_bits(2), 3.0f32.to_bits());
    assert_eq!(ctx.reg(T0), 1);
    assert_eq!(ctx.sim.stats().inst_fp_arith, 1);
    // Two instructions need six clocks without stalls; the FP unit holds three more.
    assert!(cycles >= 9, "took {cycles} clocks");
}

#[test]
fn a_busy_unit_is_a_structural_hazard() {
    let words = [add_s(2, 0, 0), add_s(4, 0, 0)];
    let mut ctx = multi_alu(&words, vec![unit(UnitKind::Integer, 1), unit(UnitKind::FloatingPoint, 3)]);
    let _ = ctx.step_to_exit();

    assert!(ctx.sim.stats().stalls_structural > 0);
    assert_eq!(ctx.sim.registers().fpr_bits(4), 3.0f32.to_bits());
}

#[test]
fn unit_latency_delays_integer_results_not_their_value() {
    let words = [asm::li(T0, 2), asm::addu(T1, T0, T0)];
    let mut slow = multi_alu(&words, vec![unit(UnitKind::Any, 3)]);
    let mut fast = multi_alu(&words, vec![unit(UnitKind::Any, 1)]);

    let slow_cycles = slow.step_to_exit();
    let fast_cycles = fast.step_to_exit();

    assert_eq!(slow.reg(T1), 4);
    assert_eq!(fast.reg(T1), 4);
    assert!(slow_cycles > fast_cycles);
}

use mipsim_core::config::{Config, TopologyKind};
use mipsim_core::sim::Program;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::TestContext;
use crate::common::asm::{self, S0, T0, T1, T2, T3, ZERO};

const TEXT: u32 = 0x0040_0000;

fn config(topology: TopologyKind, branch_on_decode: bool, delay_slots: bool) -> Config {
    let mut config = Config::default().with_topology(topology);
    config.pipeline.branch_on_decode = branch_on_decode;
    config.pipeline.delay_slots = delay_slots;
    config
}

#[rstest]
fn taken_branch_discards_the_wrong_path(
    #[values(
        TopologyKind::SingleCycle,
        TopologyKind::MultiCycle,
        TopologyKind::Pipelined,
        TopologyKind::MultiAluPipelined
    )]
    topology: TopologyKind,
    #[values(false, true)] branch_on_decode: bool,
) {
    let words = [
        asm::li(T0, 1),
        asm::beq(ZERO, ZERO, 2),
        asm::li(T1, 99),
        asm::sw(T0, 0, S0),
        asm::li(T3, 7),
    ];
    let program = Program::from_words(&words);
    let mut ctx = TestContext::with_program(&config(topology, branch_on_decode, false), &program);
    ctx.set_reg(S0, 0x1001_0000);

    assert_eq!(ctx.run_to_exit(), 0);
    assert_eq!(ctx.reg(T1), 0);
    assert_eq!(ctx.reg(T3), 7);
    assert_eq!(ctx.sim.memory().read_word(0x1001_0000).unwrap(), 0);
    assert_eq!(ctx.sim.stats().branches_taken, 1);
    assert_eq!(ctx.sim.stats().instructions_retired, 3);
}

#[test]
fn resolving_in_decode_flushes_less() {
    let words = [asm::beq(ZERO, ZERO, 2), asm::li(T1, 99), asm::li(T2, 99), asm::li(T3, 7)];
    let program = Program::from_words(&words);

    let mut late = TestContext::with_program(&config(TopologyKind::Pipelined, false, false), &program);
    let late_cycles = late.step_to_exit();
    let mut early = TestContext::with_program(&config(TopologyKind::Pipelined, true, false), &program);
    let early_cycles = early.step_to_exit();

    assert!(late.sim.stats().flushed_slots > early.sim.stats().flushed_slots);
    assert!(early_cycles < late_cycles);
    assert_eq!(late.sim.registers().gprs(), early.sim.registers().gprs());
}

#[test]
fn untaken_branch_flushes_nothing() {
    let words = [asm::bne(ZERO, ZERO, 2), asm::li(T1, 1), asm::li(T2, 2), asm::li(T3, 3)];
    let mut ctx = TestContext::new(TopologyKind::Pipelined, &words);
    assert_eq!(ctx.step_to_exit(), 8);
    assert_eq!(ctx.sim.stats().flushed_slots, 0);
    assert_eq!((ctx.reg(T1), ctx.reg(T2), ctx.reg(T3)), (1, 2, 3));
}

#[rstest]
fn countdown_loop_runs_to_completion(
    #[values(
        TopologyKind::SingleCycle,
        TopologyKind::MultiCycle,
        TopologyKind::Pipelined,
        TopologyKind::MultiAluPipelined
    )]
    topology: TopologyKind,
) {
    let words = [
        asm::li(T0, 3),
        asm::addiu(T0, T0, -1),
        asm::addiu(T2, T2, 1),
        asm::bne(T0, ZERO, -3),
        asm::li(T1, 1),
    ];
    let mut ctx = TestContext::new(topology, &words);
    assert_eq!(ctx.run_to_exit(), 0);
    assert_eq!(ctx.reg(T0), 0);
    assert_eq!(ctx.reg(T1), 1);
    assert_eq!(ctx.reg(T2), 3);
    assert_eq!(ctx.sim.stats().branches_taken, 2);
}

#[rstest]
fn delay_slot_instruction_always_executes(
    #[values(
        TopologyKind::SingleCycle,
        TopologyKind::MultiCycle,
        TopologyKind::Pipelined,
        TopologyKind::MultiAluPipelined
    )]
    topology: TopologyKind,
    #[values(false, true)] branch_on_decode: bool,
) {
    let words = [asm::beq(ZERO, ZERO, 2), asm::li(T1, 5), asm::li(T2, 99), asm::li(T3, 7)];
    let program = Program::from_words(&words);
    let mut ctx = TestContext::with_program(&config(topology, branch_on_decode, true), &program);

    assert_eq!(ctx.run_to_exit(), 0);
    assert_eq!((ctx.reg(T1), ctx.reg(T2), ctx.reg(T3)), (5, 0, 7));
}

#[test]
fn jump_and_register_jump() {
    let words = [
        asm::j(TEXT + 12),
        asm::li(T1, 99),
        asm::li(T2, 99),
        asm::lui(T0, 0x0040),
        asm::ori(T0, T0, 0x1C),
        asm::jr(T0),
        asm::li(T1, 98),
        asm::li(T3, 3),
    ];
    let mut ctx = TestContext::new(TopologyKind::Pipelined, &words);
    assert_eq!(ctx.run_to_exit(), 0);
    assert_eq!((ctx.reg(T1), ctx.reg(T2), ctx.reg(T3)), (0, 0, 3));
}

#[test]
fn control_transfer_in_a_delay_slot_is_reserved() {
    let words = [asm::beq(ZERO, ZERO, 2), asm::j(TEXT), asm::nop(), asm::nop()];
    let program = Program::from_words(&words);
    let mut ctx = TestContext::with_program(&config(TopologyKind::SingleCycle, false, true), &program);
    assert_eq!(ctx.run_to_exit(), 0x100A);
}

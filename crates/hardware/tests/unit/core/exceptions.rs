use mipsim_core::config::{Config, TopologyKind};
use mipsim_core::core::arch::cop0;
use mipsim_core::sim::Program;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::TestContext;
use crate::common::asm::{self, K0, S0, S1, T0, T1, V0};

const TEXT: u32 = 0x0040_0000;

fn skip_faulting_instruction() -> Vec<u32> {
    vec![
        asm::mfc0(K0, asm::EPC),
        asm::addiu(K0, K0, 4),
        asm::mtc0(K0, asm::EPC),
        asm::eret(),
    ]
}

fn cause_code(ctx: &TestContext) -> u32 {
    (ctx.sim.registers().cop0().read_at(cop0::CAUSE) >> cop0::CAUSE_EXC_CODE) & 0x1F
}

#[rstest]
fn unhandled_syscall_without_kernel_handler_exits_with_0x1008(
    #[values(
        TopologyKind::SingleCycle,
        TopologyKind::MultiCycle,
        TopologyKind::Pipelined,
        TopologyKind::MultiAluPipelined
    )]
    topology: TopologyKind,
) {
    let mut ctx = TestContext::new(topology, &[asm::li(V0, 99), asm::syscall(), asm::li(T0, 1)]);
    assert_eq!(ctx.run_to_exit(), 0x1008);
    assert_eq!(cause_code(&ctx), 8);
    assert_eq!(ctx.sim.registers().cop0().read_at(cop0::EPC), TEXT + 4);
    assert_eq!(ctx.reg(T0), 0);
    assert!(ctx.sim.registers().kernel_mode());
}

#[rstest]
fn handler_can_resume_after_the_faulting_instruction(
    #[values(
        TopologyKind::SingleCycle,
        TopologyKind::MultiCycle,
        TopologyKind::Pipelined,
        TopologyKind::MultiAluPipelined
    )]
    topology: TopologyKind,
) {
    let mut words = vec![asm::li(V0, 99), asm::syscall(), asm::li(T0, 1)];
    words.extend(asm::exit());
    let program = Program::from_words(&words).with_exception_handler(&skip_faulting_instruction());
    let mut ctx = TestContext::with_program(&Config::default().with_topology(topology), &program);

    assert_eq!(ctx.run_to_exit(), 0);
    assert_eq!(ctx.reg(T0), 1);
    assert_eq!(ctx.sim.stats().traps_taken, 1);
    assert!(!ctx.sim.registers().kernel_mode());
}

#[rstest]
fn overflow_is_precise(#[values(TopologyKind::SingleCycle, TopologyKind::Pipelined)] topology: TopologyKind) {
    let mut ctx = TestContext::new(topology, &[asm::add(T0, S0, S1), asm::li(T1, 5), asm::li(T1, 6)]);
    ctx.set_reg(S0, 0x7FFF_FFFF);
    ctx.set_reg(S1, 1);
    assert_eq!(ctx.run_to_exit(), 0x100C);
    assert_eq!(ctx.reg(T0), 0);
    assert_eq!(ctx.reg(T1), 0);
    assert_eq!(ctx.sim.registers().cop0().read_at(cop0::EPC), TEXT);
}

#[test]
fn unaligned_load_latches_the_bad_address() {
    let mut ctx = TestContext::new(TopologyKind::Pipelined, &[asm::lui(T0, 0x1001), asm::lw(T1, 2, T0)]);
    assert_eq!(ctx.run_to_exit(), 0x1004);
    assert_eq!(ctx.sim.registers().cop0().read_at(cop0::BAD_VADDR), 0x1001_0002);
    assert_eq!(ctx.sim.registers().cop0().read_at(cop0::EPC), TEXT + 4);
}

#[test]
fn unaligned_store_is_an_address_error_on_store() {
    let mut ctx = TestContext::new(TopologyKind::SingleCycle, &[asm::lui(T0, 0x1001), asm::sw(T1, 1, T0)]);
    assert_eq!(ctx.run_to_exit(), 0x1005);
    assert_eq!(ctx.sim.memory().read_word(0x1001_0000).unwrap(), 0);
}

#[test]
fn break_and_trap_raise_their_own_causes() {
    let mut ctx = TestContext::new(TopologyKind::SingleCycle, &[asm::brk()]);
    assert_eq!(ctx.run_to_exit(), 0x1009);

    let mut ctx = TestContext::new(TopologyKind::SingleCycle, &[asm::teq(T0, T1)]);
    assert_eq!(ctx.run_to_exit(), 0x100D);
}

#[test]
fn reserved_encodings_raise_reserved_instruction() {
    let mut ctx = TestContext::new(TopologyKind::MultiCycle, &[0xFC00_0000]);
    assert_eq!(ctx.run_to_exit(), 0x100A);
}

#[test]
fn fault_in_a_delay_slot_points_epc_at_the_branch() {
    let mut config = Config::default();
    config.pipeline.delay_slots = true;
    let program = Program::from_words(&[asm::beq(0, 0, 2), asm::add(T0, S0, S1), asm::nop(), asm::nop()]);
    let mut ctx = TestContext::with_program(&config, &program);
    ctx.set_reg(S0, 0x7FFF_FFFF);
    ctx.set_reg(S1, 1);

    assert_eq!(ctx.run_to_exit(), 0x100C);
    let cause = ctx.sim.registers().cop0().read_at(cop0::CAUSE);
    assert_eq!(cause >> cop0::CAUSE_BD, 1);
    assert_eq!(ctx.sim.registers().cop0().read_at(cop0::EPC), TEXT);
}

#[test]
fn nested_exceptions_keep_the_first_epc() {
    // The handler itself faults with EXL set: EPC must not move.
    let program = Program::from_words(&[asm::li(V0, 99), asm::syscall()]).with_exception_handler(&[asm::brk()]);
    let mut ctx = TestContext::with_program(&Config::default(), &program);
    let _ = ctx.sim.step().unwrap();
    let _ = ctx.sim.step().unwrap();
    assert_eq!(ctx.sim.registers().cop0().read_at(cop0::EPC), TEXT + 4);
    let _ = ctx.sim.step().unwrap();
    assert_eq!(ctx.sim.registers().cop0().read_at(cop0::EPC), TEXT + 4);
    assert_eq!(cause_code(&ctx), 9);
}

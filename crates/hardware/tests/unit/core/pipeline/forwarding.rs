//! Data hazards on the five-stage pipeline.
//!
//! A pipeline of depth five needs `n + 4` clocks for `n` instructions with no
//! stalls. Every stall cycle adds one.

use mipsim_core::config::TopologyKind;
use mipsim_core::core::pipeline::Stage;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::TestContext;
use crate::common::asm::{self, S0, S1, S2, T0, T1, T2, T3, ZERO};

fn dependent_adds(forwarding: bool) -> TestContext {
    let mut ctx = TestContext::pipelined(&[asm::add(T0, S0, S1), asm::add(T1, T0, S2), asm::nop()], forwarding);
    ctx.set_reg(S0, 1);
    ctx.set_reg(S1, 2);
    ctx.set_reg(S2, 3);
    ctx
}

#[test]
fn forwarding_hides_back_to_back_dependencies() {
    let mut ctx = dependent_adds(true);
    assert_eq!(ctx.step_to_exit(), 7);
    assert_eq!(ctx.reg(T0), 3);
    assert_eq!(ctx.reg(T1), 6);
    assert_eq!(ctx.sim.stats().stalls_data, 0);
    assert_eq!(ctx.sim.stats().instructions_retired, 3);
}

#[test]
fn without_forwarding_the_consumer_waits_two_cycles() {
    let mut ctx = dependent_adds(false);
    assert_eq!(ctx.step_to_exit(), 9);
    assert_eq!(ctx.reg(T1), 6);
    assert_eq!(ctx.sim.stats().stalls_data, 2);
}

#[rstest]
#[case(true, 1)]
#[case(false, 2)]
fn load_use_always_stalls(#[case] forwarding: bool, #[case] stalls: u64) {
    let words = [
        asm::lui(T0, 0x1001),
        asm::sw(S0, 0, T0),
        asm::lw(T1, 0, T0),
        asm::addu(T2, T1, T1),
    ];
    let mut ctx = TestContext::pipelined(&words, forwarding);
    ctx.set_reg(S0, 21);
    let _ = ctx.step_to_exit();
    assert_eq!(ctx.reg(T2), 42);
    assert!(ctx.sim.stats().stalls_data >= stalls);
}

#[test]
fn youngest_producer_wins() {
    let words = [asm::li(T0, 1), asm::li(T0, 2), asm::addu(T3, T0, T0)];
    let mut ctx = TestContext::pipelined(&words, true);
    let _ = ctx.step_to_exit();
    assert_eq!(ctx.reg(T3), 4);
}

#[test]
fn independent_instructions_never_stall() {
    let words = [asm::li(T0, 1), asm::li(T1, 2), asm::li(T2, 3), asm::li(T3, 4)];
    let mut ctx = TestContext::pipelined(&words, false);
    assert_eq!(ctx.step_to_exit(), 8);
    assert_eq!(ctx.sim.stats().stalls_data, 0);
}

#[test]
fn pipeline_view_tracks_every_stage() {
    let words = [asm::li(T0, 1), asm::li(T1, 2), asm::li(T2, 3), asm::li(T3, 4), asm::nop()];
    let mut ctx = TestContext::new(TopologyKind::Pipelined, &words);
    for _ in 0..5 {
        let _ = ctx.sim.step().unwrap();
    }
    let stages: Vec<Stage> = ctx.sim.pipeline_view().into_iter().map(|(stage, _)| stage).collect();
    assert_eq!(stages.len(), 4);
    assert!(stages.contains(&Stage::Decode));
    assert!(stages.contains(&Stage::Memory));
    assert_eq!(ctx.sim.current_stage(), None);
}

#[test]
fn stalls_on_the_wrong_path_are_not_counted() {
    let words = [
        asm::li(T0, 1),
        asm::beq(ZERO, ZERO, 2),
        asm::addu(T1, T0, T0),
        asm::nop(),
        asm::nop(),
    ];
    let mut ctx = TestContext::pipelined(&words, false);
    let _ = ctx.step_to_exit();

    assert_eq!(ctx.reg(T1), 0);
    assert!(ctx.sim.stats().flushed_slots > 0);
    assert_eq!(ctx.sim.stats().stalls_data, 0);
    assert_eq!(ctx.sim.stats().instructions_retired, 3);
}

use std::sync::Arc;

use mipsim_core::config::TopologyKind;
use mipsim_core::sim::{RunOutcome, SimEvent, StepOutcome};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::TestContext;
use crate::common::asm::{self, T0, T1, T2, T3};

const TEXT: u32 = 0x0040_0000;

fn three_loads() -> [u32; 4] {
    [asm::li(T0, 1), asm::li(T1, 2), asm::li(T2, 3), asm::li(T3, 4)]
}

#[rstest]
fn run_stops_before_the_breakpoint_executes(
    #[values(
        TopologyKind::SingleCycle,
        TopologyKind::MultiCycle,
        TopologyKind::Pipelined,
        TopologyKind::MultiAluPipelined
    )]
    topology: TopologyKind,
) {
    let mut ctx = TestContext::new(topology, &three_loads());
    assert!(ctx.sim.add_breakpoint(TEXT + 8));

    assert_eq!(ctx.sim.run().unwrap(), RunOutcome::Breakpoint(TEXT + 8));
    assert_eq!(ctx.reg(T2), 0);

    assert_eq!(ctx.sim.run().unwrap(), RunOutcome::Finished(0));
    assert_eq!((ctx.reg(T0), ctx.reg(T1), ctx.reg(T2), ctx.reg(T3)), (1, 2, 3, 4));
}

#[test]
fn single_cycle_stops_with_everything_before_retired() {
    let mut ctx = TestContext::new(TopologyKind::SingleCycle, &three_loads());
    let _ = ctx.sim.add_breakpoint(TEXT + 8);
    assert_eq!(ctx.sim.run().unwrap(), RunOutcome::Breakpoint(TEXT + 8));
    assert_eq!(ctx.reg(T1), 2);
    assert_eq!(ctx.sim.registers().pc(), TEXT + 8);
}

#[test]
fn stepping_ignores_breakpoints() {
    let mut ctx = TestContext::new(TopologyKind::SingleCycle, &three_loads());
    let _ = ctx.sim.add_breakpoint(TEXT);
    let _ = ctx.sim.add_breakpoint(TEXT + 4);
    assert_eq!(ctx.sim.step().unwrap(), StepOutcome::Running);
    assert_eq!(ctx.sim.step().unwrap(), StepOutcome::Running);
    assert_eq!(ctx.reg(T1), 2);
}

#[test]
fn breakpoint_set_operations() {
    let mut ctx = TestContext::new(TopologyKind::SingleCycle, &three_loads());
    assert!(ctx.sim.add_breakpoint(TEXT));
    assert!(!ctx.sim.add_breakpoint(TEXT));
    assert!(!ctx.sim.toggle_breakpoint(TEXT));
    assert!(ctx.sim.toggle_breakpoint(TEXT + 4));
    assert!(ctx.sim.remove_breakpoint(TEXT + 4));
    assert!(!ctx.sim.remove_breakpoint(TEXT + 4));
    assert!(ctx.sim.breakpoints().is_empty());
}

#[test]
fn breakpoint_hits_are_published() {
    let mut ctx = TestContext::new(TopologyKind::Pipelined, &three_loads());
    let (tx, rx) = std::sync::mpsc::channel();
    ctx.sim.subscribe(Arc::new(mipsim_core::sim::ChannelSink::new(tx)));
    let _ = ctx.sim.add_breakpoint(TEXT + 4);

    let _ = ctx.sim.run().unwrap();
    let hits: Vec<_> = rx
        .try_iter()
        .filter(|event| matches!(event, SimEvent::BreakpointHit { .. }))
        .collect();
    assert_eq!(hits, vec![SimEvent::BreakpointHit { pc: TEXT + 4 }]);
}

#[test]
fn stop_request_ends_the_run_between_clocks() {
    let mut ctx = TestContext::new(TopologyKind::SingleCycle, &three_loads());
    let token = ctx.sim.stop_token();
    ctx.sim.subscribe(Arc::new(move |event: &SimEvent| {
        if matches!(event, SimEvent::InstructionRetired { pc, .. } if *pc == TEXT + 4) {
            token.stop();
        }
    }));

    assert_eq!(ctx.sim.run().unwrap(), RunOutcome::Stopped);
    assert_eq!(ctx.reg(T1), 2);
    assert_eq!(ctx.reg(T2), 0);

    assert_eq!(ctx.sim.run().unwrap(), RunOutcome::Finished(0));
}

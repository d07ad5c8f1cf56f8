use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};

use mipsim_core::common::reg::{RegisterBank, RegisterChange};
use mipsim_core::config::TopologyKind;
use mipsim_core::core::arch::trap::ExceptionCause;
use mipsim_core::memory::hooks::{HookDecision, MemoryChange, MemoryWrite};
use mipsim_core::sim::{ChannelSink, SimEvent};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::TestContext;
use crate::common::asm::{self, S0, T0};

const TEXT: u32 = 0x0040_0000;
const DATA: u32 = 0x1001_0000;

fn listen(ctx: &mut TestContext) -> Receiver<SimEvent> {
    let (tx, rx) = mpsc::channel();
    ctx.sim.subscribe(Arc::new(ChannelSink::new(tx)));
    rx
}

fn store_program() -> [u32; 3] {
    [asm::lui(S0, 0x1001), asm::li(T0, 9), asm::sw(T0, 0, S0)]
}

#[rstest]
fn retirements_arrive_in_program_order(
    #[values(
        TopologyKind::SingleCycle,
        TopologyKind::MultiCycle,
        TopologyKind::Pipelined,
        TopologyKind::MultiAluPipelined
    )]
    topology: TopologyKind,
) {
    let words = store_program();
    let mut ctx = TestContext::new(topology, &words);
    let rx = listen(&mut ctx);
    assert_eq!(ctx.run_to_exit(), 0);

    let retired: Vec<_> = rx
        .try_iter()
        .filter_map(|event| match event {
            SimEvent::InstructionRetired { pc, word } => Some((pc, word)),
            _ => None,
        })
        .collect();
    assert_eq!(retired, vec![(TEXT, words[0]), (TEXT + 4, words[1]), (TEXT + 8, words[2])]);
}

#[test]
fn register_and_memory_changes_are_forwarded() {
    let mut ctx = TestContext::new(TopologyKind::SingleCycle, &store_program());
    let rx = listen(&mut ctx);
    assert_eq!(ctx.run_to_exit(), 0);
    let events: Vec<_> = rx.try_iter().collect();

    assert!(events.contains(&SimEvent::RegisterChanged(RegisterChange {
        bank: RegisterBank::Gpr,
        index: T0 as u8,
        old: 0,
        new: 9,
    })));
    assert!(events.contains(&SimEvent::MemoryChanged(MemoryChange {
        address: DATA,
        width: 4,
        old: 0,
        new: 9,
    })));
    assert_eq!(events.last(), Some(&SimEvent::Finished { exit_code: 0 }));
}

#[test]
fn exceptions_are_published_with_their_vector() {
    let mut ctx = TestContext::new(TopologyKind::Pipelined, &[asm::nop(), asm::brk()]);
    let rx = listen(&mut ctx);
    assert_eq!(ctx.run_to_exit(), 0x1009);

    let raised: Vec<_> = rx
        .try_iter()
        .filter(|event| matches!(event, SimEvent::ExceptionRaised { .. }))
        .collect();
    assert_eq!(
        raised,
        vec![SimEvent::ExceptionRaised {
            cause: ExceptionCause::Breakpoint,
            epc: TEXT + 4,
            pc: 0x8000_0180,
        }]
    );
}

#[test]
fn denied_writes_leave_memory_untouched() {
    let mut ctx = TestContext::new(TopologyKind::Pipelined, &store_program());
    let rx = listen(&mut ctx);
    ctx.sim.memory_mut().add_guard(Arc::new(|write: &MemoryWrite| {
        if write.address == DATA {
            HookDecision::Deny
        } else {
            HookDecision::Allow
        }
    }));

    assert_eq!(ctx.run_to_exit(), 0);
    assert_eq!(ctx.sim.memory().read_word(DATA).unwrap(), 0);
    assert!(!rx.try_iter().any(|event| matches!(event, SimEvent::MemoryChanged(_))));
    assert_eq!(ctx.reg(T0), 9);
}

#[test]
fn closures_can_subscribe() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let mut ctx = TestContext::new(TopologyKind::SingleCycle, &store_program());
    let retired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&retired);
    ctx.sim.subscribe(Arc::new(move |event: &SimEvent| {
        if matches!(event, SimEvent::InstructionRetired { .. }) {
            let _ = counter.fetch_add(1, Ordering::Relaxed);
        }
    }));

    assert_eq!(ctx.run_to_exit(), 0);
    assert_eq!(retired.load(Ordering::Relaxed), 3);
}

#[test]
fn undo_and_reset_report_what_they_revert() {
    let mut ctx = TestContext::new(TopologyKind::SingleCycle, &store_program());
    let rx = listen(&mut ctx);
    for _ in 0..3 {
        let _ = ctx.sim.step().unwrap();
    }
    let _ = rx.try_iter().count();

    assert!(ctx.sim.undo_step());
    assert_eq!(
        rx.try_iter().collect::<Vec<_>>(),
        vec![
            SimEvent::MemoryChanged(MemoryChange {
                address: DATA,
                width: 4,
                old: 9,
                new: 0,
            }),
            SimEvent::Restored { cycles: 2, pc: TEXT + 8 },
        ]
    );

    assert!(ctx.sim.undo_step());
    assert_eq!(
        rx.try_iter().collect::<Vec<_>>(),
        vec![
            SimEvent::RegisterChanged(RegisterChange {
                bank: RegisterBank::Gpr,
                index: T0 as u8,
                old: 9,
                new: 0,
            }),
            SimEvent::Restored { cycles: 1, pc: TEXT + 4 },
        ]
    );

    ctx.sim.reset();
    assert_eq!(
        rx.try_iter().collect::<Vec<_>>(),
        vec![
            SimEvent::RegisterChanged(RegisterChange {
                bank: RegisterBank::Gpr,
                index: S0 as u8,
                old: DATA,
                new: 0,
            }),
            SimEvent::Restored { cycles: 0, pc: TEXT },
        ]
    );
}

use mipsim_core::common::reg::{RegRef, RegisterFile};
use mipsim_core::config::TopologyKind;
use mipsim_core::core::arch::cop0;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use crate::common::TestContext;
use crate::common::asm::{self, T0, ZERO};

proptest! {
    #[test]
    fn zero_register_ignores_writes(value in any::<u32>()) {
        let mut regs = RegisterFile::new();
        regs.set_gpr(0, value);
        regs.write(RegRef::Gpr(0), value);
        prop_assert_eq!(regs.gpr(0), 0);
    }

    #[test]
    fn cop0_writes_change_only_masked_bits(value in any::<u32>()) {
        for addr in [cop0::STATUS, cop0::EBASE, cop0::CAUSE] {
            let mut regs = RegisterFile::new();
            let reg = regs.cop0().get(addr.0, addr.1).unwrap();
            let (old, mask) = (reg.value(), reg.software_mask());
            regs.write_cop0(addr, value);
            prop_assert_eq!(regs.cop0().read_at(addr), (old & !mask) | (value & mask));
        }
    }
}

#[test]
fn read_only_config_register_keeps_its_value() {
    let mut regs = RegisterFile::new();
    let before = regs.cop0().read(16, 3);
    regs.write_cop0((16, 3), 0);
    assert_eq!(regs.cop0().read(16, 3), before);
}

#[test]
fn kernel_mode_follows_status() {
    let mut regs = RegisterFile::new();
    assert!(!regs.kernel_mode());

    let status = regs.cop0().read_at(cop0::STATUS);
    regs.write_cop0(cop0::STATUS, status | (1 << cop0::STATUS_EXL));
    assert!(regs.kernel_mode());

    regs.write_cop0(cop0::STATUS, status);
    assert!(!regs.kernel_mode());

    regs.write_cop0(cop0::STATUS, status & !(0b11 << cop0::STATUS_KSU));
    assert!(regs.kernel_mode());
}

#[test]
fn names_resolve_across_banks() {
    let regs = RegisterFile::new();
    assert_eq!(regs.lookup("$t0"), Some(RegRef::Gpr(8)));
    assert_eq!(regs.lookup("$8"), Some(RegRef::Gpr(8)));
    assert_eq!(regs.lookup("$f2"), Some(RegRef::Fpr(2)));
    assert_eq!(
        regs.lookup("EPC"),
        Some(RegRef::Cop0 {
            register: 14,
            selection: 0,
        })
    );
    assert_eq!(regs.lookup("$nope"), None);
}

#[test]
fn stack_and_global_pointers_start_at_their_conventional_values() {
    let regs = RegisterFile::new();
    assert_eq!(regs.gpr(28), 0x1000_8000);
    assert_eq!(regs.gpr(29), 0x7FFF_EFFC);
}

#[rstest]
fn guest_writes_to_zero_are_dropped(
    #[values(
        TopologyKind::SingleCycle,
        TopologyKind::MultiCycle,
        TopologyKind::Pipelined,
        TopologyKind::MultiAluPipelined
    )]
    topology: TopologyKind,
) {
    let mut ctx = TestContext::new(topology, &[asm::li(ZERO, 5), asm::add(T0, ZERO, ZERO), asm::nop()]);
    assert_eq!(ctx.run_to_exit(), 0);
    assert_eq!(ctx.reg(ZERO), 0);
    assert_eq!(ctx.reg(T0), 0);
}

#[test]
fn count_advances_once_per_clock() {
    let mut ctx = TestContext::new(TopologyKind::MultiCycle, &[asm::nop()]);
    let _ = ctx.step_to_exit();
    assert_eq!(ctx.sim.registers().cop0().read_at(cop0::COUNT), ctx.sim.cycles() as u32);
}

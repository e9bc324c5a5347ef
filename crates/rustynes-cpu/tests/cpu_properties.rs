//! Property-based invariants that should hold for every operand, not just the
//! hand-picked cases in `cpu_scenarios.rs`.

use proptest::prelude::*;
use rustynes_cpu::{Bus, Cpu, StatusFlags};

/// Flat 64 KiB RAM bus that also records every address written to, in order.
struct RecordingBus {
    memory: [u8; 0x10000],
    writes: Vec<(u16, u8)>,
}

impl RecordingBus {
    fn new() -> Self {
        Self {
            memory: [0; 0x10000],
            writes: Vec::new(),
        }
    }

    fn with_reset_vector() -> Self {
        let mut bus = Self::new();
        bus.memory[0xFFFC] = 0x00;
        bus.memory[0xFFFD] = 0x80;
        bus
    }

    fn load(&mut self, addr: u16, program: &[u8]) {
        for (i, &byte) in program.iter().enumerate() {
            self.memory[addr as usize + i] = byte;
        }
    }
}

impl Bus for RecordingBus {
    fn read(&mut self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize] = value;
        self.writes.push((addr, value));
    }
}

/// Runs `ADC #imm` against a freshly reset CPU with the given starting
/// accumulator and carry, returning `(result, carry_out, overflow, zero, negative)`.
fn run_adc(a: u8, imm: u8, carry_in: bool) -> (u8, bool, bool, bool, bool) {
    let mut bus = RecordingBus::with_reset_vector();
    bus.load(0x8000, &[0x69, imm]); // ADC #imm
    let mut cpu = Cpu::new();
    cpu.reset(&mut bus);
    cpu.a = a;
    cpu.status.set(StatusFlags::CARRY, carry_in);

    cpu.step(&mut bus);

    (
        cpu.a,
        cpu.status.contains(StatusFlags::CARRY),
        cpu.status.contains(StatusFlags::OVERFLOW),
        cpu.status.contains(StatusFlags::ZERO),
        cpu.status.contains(StatusFlags::NEGATIVE),
    )
}

/// Runs `SBC #imm` the same way ADC is run above.
fn run_sbc(a: u8, imm: u8, carry_in: bool) -> (u8, bool, bool, bool, bool) {
    let mut bus = RecordingBus::with_reset_vector();
    bus.load(0x8000, &[0xE9, imm]); // SBC #imm
    let mut cpu = Cpu::new();
    cpu.reset(&mut bus);
    cpu.a = a;
    cpu.status.set(StatusFlags::CARRY, carry_in);

    cpu.step(&mut bus);

    (
        cpu.a,
        cpu.status.contains(StatusFlags::CARRY),
        cpu.status.contains(StatusFlags::OVERFLOW),
        cpu.status.contains(StatusFlags::ZERO),
        cpu.status.contains(StatusFlags::NEGATIVE),
    )
}

proptest! {
    /// SBC is wired on real 6502 hardware as ADC of the bitwise-complemented
    /// operand with the same carry in. Every flag and the result must agree.
    #[test]
    fn sbc_is_adc_of_complement(a: u8, m: u8, carry_in: bool) {
        let sbc = run_sbc(a, m, carry_in);
        let adc = run_adc(a, !m, carry_in);
        prop_assert_eq!(sbc, adc);
    }

    /// Overflow is only ever set when both operands share a sign and the
    /// result's sign differs from theirs, for every accumulator/operand pair.
    #[test]
    fn adc_overflow_matches_signed_arithmetic(a: u8, m: u8, carry_in: bool) {
        let (result, _carry_out, overflow, _zero, _negative) = run_adc(a, m, carry_in);
        let expected_overflow = (a ^ result) & (m ^ result) & 0x80 != 0;
        prop_assert_eq!(overflow, expected_overflow);
    }

    /// Carry out of ADC is exactly the carry out of the 9-bit addition,
    /// independent of the sign interpretation tested above.
    #[test]
    fn adc_carry_matches_unsigned_addition(a: u8, m: u8, carry_in: bool) {
        let (result, carry_out, _overflow, _zero, _negative) = run_adc(a, m, carry_in);
        let sum = u16::from(a) + u16::from(m) + u16::from(carry_in);
        prop_assert_eq!(result, sum as u8);
        prop_assert_eq!(carry_out, sum > 0xFF);
    }

    /// `ASL $addr` is a read-modify-write instruction: it must perform exactly
    /// two writes to the operand address, the first restoring the original
    /// value it just read and the second storing the shifted result, for
    /// every possible operand byte.
    #[test]
    fn rmw_instruction_writes_original_then_modified(operand: u8) {
        let mut bus = RecordingBus::with_reset_vector();
        bus.load(0x8000, &[0x06, 0x10]); // ASL $10
        bus.memory[0x10] = operand;
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);

        cpu.step(&mut bus);

        let writes: Vec<_> = bus.writes.iter().filter(|(addr, _)| *addr == 0x10).collect();
        prop_assert_eq!(writes.len(), 2);
        prop_assert_eq!(writes[0].1, operand);
        prop_assert_eq!(writes[1].1, operand.wrapping_shl(1));
    }

    /// PHA followed by PLA returns the stack pointer to exactly where it
    /// started and leaves the accumulator unchanged, for every starting SP
    /// and every pushed value.
    #[test]
    fn push_pull_round_trip_is_symmetric(sp: u8, value: u8) {
        let mut bus = RecordingBus::with_reset_vector();
        bus.load(0x8000, &[0x48, 0xA9, 0x00, 0x68]); // PHA ; LDA #$00 ; PLA
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        cpu.sp = sp;
        cpu.a = value;

        cpu.step(&mut bus); // PHA
        prop_assert_eq!(cpu.sp, sp.wrapping_sub(1));

        cpu.step(&mut bus); // LDA #$00
        prop_assert_eq!(cpu.a, 0x00);

        cpu.step(&mut bus); // PLA
        prop_assert_eq!(cpu.sp, sp);
        prop_assert_eq!(cpu.a, value);
    }
}

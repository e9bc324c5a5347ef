//! CPU Status Register (P register) flags.
//!
//! The 6502 status register is an 8-bit register that contains various flags
//! reflecting the state of the processor:
//!
//! ```text
//! 7  6  5  4  3  2  1  0
//! N  V  U  B  D  I  Z  C
//! │  │  │  │  │  │  │  └─ Carry
//! │  │  │  │  │  │  └──── Zero
//! │  │  │  │  │  └─────── Interrupt Disable
//! │  │  │  │  └────────── Decimal Mode (not used in NES but still functional)
//! │  │  │  └───────────── Break (1 when pushed from PHP/BRK, 0 from IRQ/NMI)
//! │  │  └──────────────── Unused (always 1 when pushed to stack)
//! │  └─────────────────── Overflow
//! └────────────────────── Negative
//! ```
//!
//! `B` and `U` are not physical flip-flops on real hardware: they exist only
//! in the byte that gets pushed to the stack. Popping (PLP/RTI) discards both
//! from the incoming byte and forces `U` back to 1 in the live register.

use bitflags::bitflags;

bitflags! {
    /// CPU Status Register flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StatusFlags: u8 {
        /// Carry flag - set if the last operation caused an overflow from bit 7
        /// or an underflow from bit 0.
        const CARRY = 1 << 0;

        /// Zero flag - set if the result of the last operation was zero.
        const ZERO = 1 << 1;

        /// Interrupt Disable flag - when set, IRQ interrupts are blocked.
        /// NMI is not affected.
        const INTERRUPT_DISABLE = 1 << 2;

        /// Decimal Mode flag. The NES 6502 variant ignores it in ADC/SBC, but
        /// the bit itself still exists and is settable.
        const DECIMAL = 1 << 3;

        /// Break flag - distinguishes hardware interrupts from BRK/PHP.
        /// Only meaningful in the byte pushed to the stack.
        const BREAK = 1 << 4;

        /// Unused flag - always reads as 1 when pushed to the stack.
        const UNUSED = 1 << 5;

        /// Overflow flag - set if the last operation caused a signed overflow.
        const OVERFLOW = 1 << 6;

        /// Negative flag - set if bit 7 of the result is set.
        const NEGATIVE = 1 << 7;
    }
}

impl StatusFlags {
    /// Initial status after power-on: I and U set ($24).
    pub const POWER_ON: Self = Self::INTERRUPT_DISABLE.union(Self::UNUSED);

    /// Bits PLP/RTI actually restore from a popped byte. B and U are not
    /// restored from the stack; U is forced to 1 separately.
    const POP_MASK: u8 = !(Self::BREAK.bits() | Self::UNUSED.bits());

    /// Creates a new status register with power-on flags (I and U set).
    #[must_use]
    pub const fn new() -> Self {
        Self::POWER_ON
    }

    /// Sets or clears the Zero and Negative flags based on a value.
    #[inline]
    pub fn set_zn(&mut self, value: u8) {
        self.set(Self::ZERO, value == 0);
        self.set(Self::NEGATIVE, value & 0x80 != 0);
    }

    /// Converts the status register to a byte for pushing to the stack.
    /// `brk` selects whether B is set (true for BRK/PHP, false for a
    /// hardware NMI/IRQ dispatch). U is always set.
    #[inline]
    #[must_use]
    pub const fn to_stack_byte(self, brk: bool) -> u8 {
        let mut value = self.bits() | Self::UNUSED.bits();
        if brk {
            value |= Self::BREAK.bits();
        }
        value
    }

    /// Reconstructs status from a byte popped off the stack (PLP/RTI). B is
    /// discarded and U is forced to 1, matching real 6502 behavior.
    #[inline]
    #[must_use]
    pub fn from_stack_byte(value: u8) -> Self {
        Self::from_bits_truncate((value & Self::POP_MASK) | Self::UNUSED.bits())
    }
}

//! AVR core support: the status register and the global interrupt flag.

#[cfg(target_arch = "avr")]
use core::arch::asm;
use core::sync::atomic::{compiler_fence, Ordering};

use bitflags::bitflags;

use crate::reg::Reg;

#[cfg(target_arch = "avr")]
pub mod startup;

/// Data-space address of SREG (I/O address 0x3F).
pub const SREG_ADDRESS: usize = 0x5f;

bitflags! {
    /// Contents of the AVR status register.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Sreg: u8 {
        /// Carry.
        const C = 1 << 0;
        /// Zero.
        const Z = 1 << 1;
        /// Negative.
        const N = 1 << 2;
        /// Two's complement overflow.
        const V = 1 << 3;
        /// Sign, `N ^ V`.
        const S = 1 << 4;
        /// Half carry.
        const H = 1 << 5;
        /// Bit copy storage.
        const T = 1 << 6;
        /// Global interrupt enable.
        const I = 1 << 7;
    }
}

/// Returns the processor's status register.
#[cfg(target_arch = "avr")]
#[inline]
pub fn sreg() -> &'static Reg<u8> {
    unsafe { Reg::at(SREG_ADDRESS) }
}

/// Sets the global interrupt flag in `sreg`, returning the previous contents.
#[inline]
pub fn unmask(sreg: &Reg<u8>) -> Sreg {
    let saved = Sreg::from_bits_retain(sreg.get());
    compiler_fence(Ordering::SeqCst);
    sreg.set((saved | Sreg::I).bits());
    compiler_fence(Ordering::SeqCst);
    saved
}

/// Writes `saved` back into `sreg`, undoing an earlier `unmask`.
#[inline]
pub fn restore(sreg: &Reg<u8>, saved: Sreg) {
    compiler_fence(Ordering::SeqCst);
    sreg.set(saved.bits());
    compiler_fence(Ordering::SeqCst);
}

/// Globally enables interrupts (`sei`).
#[cfg(target_arch = "avr")]
#[inline]
pub fn enable_interrupts() {
    unsafe {
        asm!("sei", options(nostack))
    }
}

/// Globally disables interrupts (`cli`).
#[cfg(target_arch = "avr")]
#[inline]
pub fn disable_interrupts() {
    unsafe {
        asm!("cli", options(nostack))
    }
}

/// Every table slot without a bound handler jumps here.  There is nothing
/// sensible to do with an interrupt nobody asked for, so mask everything and
/// stop where a debugger can find us.
#[cfg(target_arch = "avr")]
#[no_mangle]
pub extern "C" fn __avrs_default_trap() -> ! {
    disable_interrupts();
    loop {}
}

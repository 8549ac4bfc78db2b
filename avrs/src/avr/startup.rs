//! Rust runtime startup support for AVR bare metal targets.
//!
//! The generated vector table sends reset to `__avrs_reset`, a short
//! assembly stub that establishes the register conventions compiled code
//! relies on (`r1` is zero, SREG is clear) and jumps to `__avrs_start`
//! below.  The hardware has already loaded the stack pointer with RAMEND.
//!
//! Define your application entry point like so:
//!
//! ```ignore
//! #[no_mangle]
//! pub extern "C" fn avrs_main() -> ! {
//!     // code here
//!     loop {}
//! }
//! ```
//!
//! The firmware must be linked with avr-gcc's default linker script (which
//! places `.vectors` at address zero and defines the symbols used here) and
//! without the C runtime startup files.

use core::arch::asm;
use core::ptr::{addr_of, addr_of_mut};

use crate::boot::{Image, ProgramMemory};

/// Program memory, read with `lpm`.  Only the low 64 KiB are reachable.
#[derive(Clone, Copy, Debug, Default)]
pub struct Flash;

impl ProgramMemory for Flash {
    #[inline(always)]
    unsafe fn load(&self, addr: *const u8) -> u8 {
        let byte: u8;
        asm!("lpm {0}, Z",
             out(reg) byte,
             in("Z") addr,
             options(pure, readonly, nostack, preserves_flags));
        byte
    }
}

extern "C" {
    static __data_load_start: u8;
    static mut __data_start: u8;
    static mut __data_end: u8;
    static mut __bss_start: u8;
    static mut __bss_end: u8;

    fn avrs_main() -> !;
}

/// Second half of the reset vector.  Initializes RAM and calls `avrs_main`.
///
/// Entered once, from `__avrs_reset`, with interrupts masked.
#[no_mangle]
pub unsafe extern "C" fn __avrs_start() -> ! {
    let image = Image {
        memory: Flash,
        data_load: addr_of!(__data_load_start),
        data: addr_of_mut!(__data_start),
        data_end: addr_of_mut!(__data_end),
        bss: addr_of_mut!(__bss_start),
        bss_end: addr_of_mut!(__bss_end),
    };
    image.boot(avrs_main)
}

//! Support for memory-mapped registers.
//!
//! On AVR every I/O register, SREG included, is also visible in the data
//! address space, so a register is just a cell at a fixed address that must
//! only be touched with volatile operations.

use core::cell::UnsafeCell;
use core::ptr;

/// A register whose contents can be represented as `T`.  The contents are
/// accessed using `volatile` operations only, ensuring that apparently dead
/// loads and stores are not optimized away.
///
/// Memory-mapped registers are the ultimate ambient authority, and are
/// inherently shared.  Thus, registers (like cells) can be mutated through a
/// shared reference `&`, and a unique reference `&mut` to a register is not
/// particularly meaningful.
#[repr(transparent)]
pub struct Reg<T> {
    value: UnsafeCell<T>,
}

impl<T: Copy> Reg<T> {
    /// Creates a register cell holding `value`.  Real registers are obtained
    /// with `at`; this is for stand-ins that live in ordinary memory.
    pub const fn new(value: T) -> Self {
        Reg { value: UnsafeCell::new(value) }
    }

    /// Returns the register at data-space address `address`.
    ///
    /// # Safety
    ///
    /// `address` must be the address of a register of type `T` on the chip
    /// the program is running on.
    pub unsafe fn at(address: usize) -> &'static Self {
        &*(address as *const Self)
    }

    /// Reads the contents of the register using a volatile load.
    pub fn get(&self) -> T {
        unsafe { ptr::read_volatile(self.value.get()) }
    }

    /// Replaces the contents of the register using a volatile store.
    pub fn set(&self, value: T) {
        unsafe { ptr::write_volatile(self.value.get(), value) }
    }

    pub fn update<F: FnOnce(T) -> T>(&self, f: F) {
        self.set(f(self.get()))
    }
}

//! The reset-time sequence that establishes the Rust environment.
//!
//! Before `main` can run, `.data` has to be copied from its load image in
//! program memory into RAM, and `.bss` has to be zeroed.  Nothing here may
//! touch a `static`, since by definition none of them hold their values yet.
//!
//! The steps operate on raw cursors rather than slices: the regions are
//! described by linker symbols, and constructing a slice over memory that
//! holds no valid values is exactly what we are trying to fix.

use core::ptr;

/// A readable view of the address space that holds the `.data` load image.
///
/// AVR keeps program memory in a separate address space from RAM, reachable
/// only through `lpm`, so a load image cannot be read with an ordinary
/// pointer dereference.
pub trait ProgramMemory {
    /// Reads the byte at `addr`.
    ///
    /// # Safety
    ///
    /// `addr` must be a readable address in this address space.
    unsafe fn load(&self, addr: *const u8) -> u8;
}

/// Program memory that shares the data address space.
#[derive(Clone, Copy, Debug, Default)]
pub struct DataSpace;

impl ProgramMemory for DataSpace {
    #[inline(always)]
    unsafe fn load(&self, addr: *const u8) -> u8 {
        ptr::read_volatile(addr)
    }
}

/// Copies the `.data` load image at `src` into RAM, starting at `dst` and
/// stopping when the destination cursor reaches `dst_end`.
///
/// The source region is implied to be `dst_end - dst` bytes long.  An empty
/// destination performs no access at all.
///
/// # Safety
///
/// `dst..dst_end` must be writable RAM, `src` must be readable in `mem` for
/// the same length, and the two must not overlap.
#[inline(never)]
pub unsafe fn copy_initialized_data<M: ProgramMemory>(mem: &M,
                                                      mut src: *const u8,
                                                      mut dst: *mut u8,
                                                      dst_end: *mut u8) {
    while dst < dst_end {
        ptr::write_volatile(dst, mem.load(src));
        src = src.add(1);
        dst = dst.add(1);
    }
}

/// Writes zero to every byte in `start..end`.  An empty region performs no
/// access at all.
///
/// # Safety
///
/// `start..end` must be writable RAM.
#[inline(never)]
pub unsafe fn clear_uninitialized(mut start: *mut u8, end: *mut u8) {
    while start < end {
        ptr::write_volatile(start, 0);
        start = start.add(1);
    }
}

/// Application entry point.  It is not expected to return; if it does, the
/// processor is on its own.
pub type Entry = unsafe extern "C" fn() -> !;

/// Boundaries of the memory image, as published by the linker script.
pub struct Image<M> {
    /// Address space holding the `.data` load image.
    pub memory: M,
    /// Start of the `.data` load image.
    pub data_load: *const u8,
    /// Start of `.data` in RAM.
    pub data: *mut u8,
    /// End of `.data` in RAM.
    pub data_end: *mut u8,
    /// Start of `.bss`.
    pub bss: *mut u8,
    /// End of `.bss`.
    pub bss_end: *mut u8,
}

impl<M: ProgramMemory> Image<M> {
    /// Initializes RAM and hands control to `entry`.  The steps run once, in
    /// order: copy `.data`, clear `.bss`, call `entry`.
    ///
    /// # Safety
    ///
    /// Must run exactly once, from reset, with interrupts masked.  The
    /// boundaries must be well-ordered and must not overlap each other or the
    /// stack; see `layout::MemoryLayout::validate`.
    pub unsafe fn boot(&self, entry: Entry) -> ! {
        self.init();
        entry()
    }

    /// The RAM-initializing part of `boot`, without the transfer.
    ///
    /// # Safety
    ///
    /// As for `boot`.
    pub unsafe fn init(&self) {
        copy_initialized_data(&self.memory, self.data_load, self.data,
                              self.data_end);
        clear_uninitialized(self.bss, self.bss_end);
    }
}

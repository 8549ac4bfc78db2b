//! Checks on the linker's placement of `.data` and `.bss`.
//!
//! The bootstrap sequence trusts its boundary symbols blindly: it copies
//! until the destination cursor reaches `__data_end` and clears until
//! `__bss_end`.  Wrong boundaries would have it scribble over the stack or
//! walk off the end of RAM, and there is nothing it could do about that at
//! run time.  So the boundaries are checked here instead, against the chip's
//! memory sizes, before the image is accepted.

use crate::chip::Chip;
use crate::error::{Area, LayoutError};

pub const DATA_LOAD_START: &str = "__data_load_start";
pub const DATA_START: &str = "__data_start";
pub const DATA_END: &str = "__data_end";
pub const BSS_START: &str = "__bss_start";
pub const BSS_END: &str = "__bss_end";

/// Stack space kept free above `.data` and `.bss` when nothing else is
/// asked for.
pub const DEFAULT_STACK_RESERVE: u32 = 64;

/// The AVR toolchain places the data address space at this offset in ELF
/// files, so data symbols read from a symbol table carry it.
pub const DATA_SPACE_OFFSET: u32 = 0x80_0000;

/// A half-open address range, `start..end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub start: u32,
    pub end: u32,
}

impl Region {
    pub const fn new(start: u32, end: u32) -> Self {
        Region { start, end }
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True if the two regions share at least one byte.
    pub fn overlaps(&self, other: &Region) -> bool {
        !self.is_empty() && !other.is_empty()
            && self.start < other.end && other.start < self.end
    }
}

/// Where the linker put the initialized and zeroed data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryLayout {
    /// Start of the `.data` load image in program memory.
    pub data_load: u32,
    /// `.data` in RAM.
    pub data: Region,
    /// `.bss` in RAM.
    pub bss: Region,
    /// Bytes at the top of RAM that must stay free for the stack.  Never
    /// zero in a valid layout.
    pub stack_reserve: u32,
}

impl MemoryLayout {
    /// Reads the boundary symbols through `lookup`, which maps a symbol name
    /// to its value.  RAM symbols may carry `DATA_SPACE_OFFSET`.
    /// `stack_reserve` bytes below the end of RAM are kept for the stack.
    pub fn from_symbols<F>(mut lookup: F, stack_reserve: u32)
                           -> Result<Self, LayoutError>
        where F: FnMut(&str) -> Option<u32>
    {
        let mut get = |symbol: &'static str| {
            lookup(symbol).ok_or(LayoutError::MissingSymbol { symbol })
        };
        let data_load = get(DATA_LOAD_START)?;
        let data = Region::new(ram(get(DATA_START)?), ram(get(DATA_END)?));
        let bss = Region::new(ram(get(BSS_START)?), ram(get(BSS_END)?));
        Ok(MemoryLayout { data_load, data, bss, stack_reserve })
    }

    /// Builder-style setter for `stack_reserve`.
    pub fn with_stack_reserve(self, bytes: u32) -> Self {
        MemoryLayout { stack_reserve: bytes, ..self }
    }

    /// The `.data` load image in program memory; as long as `.data`.
    pub fn load_image(&self) -> Region {
        Region::new(self.data_load, self.data_load.saturating_add(self.data.len()))
    }

    /// Checks that the regions are well-ordered, lie where they must, do not
    /// overlap each other, and leave room for the stack.
    pub fn validate(&self, chip: &Chip) -> Result<(), LayoutError> {
        if self.stack_reserve == 0 {
            return Err(LayoutError::NoStackReserve);
        }
        let regions = [(Area::Data, self.data), (Area::Bss, self.bss)];

        for &(area, r) in &regions {
            if r.end < r.start {
                return Err(LayoutError::Inverted { area, start: r.start, end: r.end });
            }
        }
        for &(area, r) in &regions {
            if r.start < chip.ram_start || r.end > chip.ram_end {
                return Err(LayoutError::OutsideRam { area });
            }
        }
        if self.data.overlaps(&self.bss) {
            return Err(LayoutError::Overlap { a: Area::Data, b: Area::Bss });
        }
        let limit = chip.ram_end.saturating_sub(self.stack_reserve);
        for &(area, r) in &regions {
            if !r.is_empty() && r.end > limit {
                return Err(LayoutError::StackCollision { area, end: r.end, limit });
            }
        }

        let load = self.load_image();
        if !load.is_empty() && (load.end > chip.flash_bytes
                                || load.start < chip.table_bytes()) {
            return Err(LayoutError::OutsideFlash { area: Area::DataLoad });
        }
        Ok(())
    }
}

/// Strips the ELF data space offset from a RAM address.
fn ram(address: u32) -> u32 {
    if address >= DATA_SPACE_OFFSET {
        address - DATA_SPACE_OFFSET
    } else {
        address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::{atmega328p, attiny85};

    fn layout() -> MemoryLayout {
        MemoryLayout {
            data_load: 0x0400,
            data: Region::new(0x0100, 0x0110),
            bss: Region::new(0x0110, 0x0180),
            stack_reserve: 0x0100,
        }
    }

    #[test]
    fn typical_layout_is_accepted() {
        assert_eq!(layout().validate(&atmega328p::CHIP), Ok(()));
    }

    #[test]
    fn empty_regions_are_accepted() {
        let empty = MemoryLayout {
            data_load: 0x0068,
            data: Region::new(0x0100, 0x0100),
            bss: Region::new(0x0100, 0x0100),
            stack_reserve: DEFAULT_STACK_RESERVE,
        };
        assert_eq!(empty.validate(&atmega328p::CHIP), Ok(()));
    }

    #[test]
    fn stack_reserve_is_required() {
        assert_eq!(layout().with_stack_reserve(0).validate(&atmega328p::CHIP),
                   Err(LayoutError::NoStackReserve));
    }

    #[test]
    fn inverted_region_is_named() {
        let l = MemoryLayout { bss: Region::new(0x0180, 0x0110), ..layout() };
        assert_eq!(l.validate(&atmega328p::CHIP),
                   Err(LayoutError::Inverted { area: Area::Bss, start: 0x0180, end: 0x0110 }));
    }

    #[test]
    fn overlapping_regions_are_rejected() {
        let l = MemoryLayout { bss: Region::new(0x010f, 0x0180), ..layout() };
        assert_eq!(l.validate(&atmega328p::CHIP),
                   Err(LayoutError::Overlap { a: Area::Data, b: Area::Bss }));
    }

    #[test]
    fn regions_must_be_in_ram() {
        let l = MemoryLayout { data: Region::new(0x00f0, 0x0100), ..layout() };
        assert_eq!(l.validate(&atmega328p::CHIP),
                   Err(LayoutError::OutsideRam { area: Area::Data }));
        let l = MemoryLayout { bss: Region::new(0x0110, 0x0a00), ..layout() };
        assert_eq!(l.validate(&atmega328p::CHIP),
                   Err(LayoutError::OutsideRam { area: Area::Bss }));
    }

    #[test]
    fn smaller_ram_moves_the_stack_limit() {
        // Fits on the 328P; on the tiny, .bss runs into the stack.
        assert_eq!(layout().validate(&attiny85::CHIP),
                   Err(LayoutError::StackCollision { area: Area::Bss, end: 0x0180, limit: 0x0160 }));
    }

    #[test]
    fn stack_reserve_is_kept_free() {
        let l = MemoryLayout { bss: Region::new(0x0110, 0x0850), ..layout() };
        assert_eq!(l.validate(&atmega328p::CHIP),
                   Err(LayoutError::StackCollision { area: Area::Bss, end: 0x0850, limit: 0x0800 }));
        assert_eq!(l.with_stack_reserve(0x80).validate(&atmega328p::CHIP), Ok(()));
    }

    #[test]
    fn load_image_must_follow_the_vectors_in_flash() {
        let l = MemoryLayout { data_load: 0x7ff8, ..layout() };
        assert_eq!(l.validate(&atmega328p::CHIP),
                   Err(LayoutError::OutsideFlash { area: Area::DataLoad }));
        let l = MemoryLayout { data_load: 0x0010, ..layout() };
        assert_eq!(l.validate(&atmega328p::CHIP),
                   Err(LayoutError::OutsideFlash { area: Area::DataLoad }));
    }

    #[test]
    fn symbols_are_read_and_offset_stripped() {
        let symbols = [
            (DATA_LOAD_START, 0x0400),
            (DATA_START, 0x80_0100),
            (DATA_END, 0x80_0110),
            (BSS_START, 0x80_0110),
            (BSS_END, 0x80_0180),
        ];
        let lookup = |name: &str| {
            symbols.iter().find(|s| s.0 == name).map(|s| s.1)
        };
        let l = MemoryLayout::from_symbols(lookup, 0x0100).unwrap();
        assert_eq!(l, layout());
        assert_eq!(l.load_image(), Region::new(0x0400, 0x0410));

        let missing = MemoryLayout::from_symbols(|name| {
            if name == BSS_END { None } else { lookup(name) }
        }, 0x0100);
        assert_eq!(missing, Err(LayoutError::MissingSymbol { symbol: BSS_END }));
    }

    #[test]
    fn bss_up_to_ramend_collides_with_the_stack() {
        let symbols = [
            (DATA_LOAD_START, 0x0400),
            (DATA_START, 0x80_0100),
            (DATA_END, 0x80_0110),
            (BSS_START, 0x80_0110),
            (BSS_END, 0x80_0900),
        ];
        let lookup = |name: &str| {
            symbols.iter().find(|s| s.0 == name).map(|s| s.1)
        };
        let l = MemoryLayout::from_symbols(lookup, DEFAULT_STACK_RESERVE).unwrap();
        assert_eq!(l.validate(&atmega328p::CHIP), Err(LayoutError::StackCollision {
            area: Area::Bss,
            end: 0x0900,
            limit: 0x08c0,
        }));
    }
}

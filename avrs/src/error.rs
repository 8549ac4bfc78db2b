//! Errors reported while generating an image.
//!
//! Everything that can be wrong with a vector table or memory layout is
//! caught here, on the host, before any firmware is produced.  Each error
//! names the slot or region at fault.

use core::fmt;

use crate::isr::NestingMode;
use crate::vector::Target;

/// A chip description or handler binding set that cannot be turned into a
/// vector table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error<'a> {
    /// The chip name cannot be pasted into generated source.
    BadChipName { chip: &'static str },
    /// The family name cannot be pasted into generated source.
    BadFamilyName { chip: &'static str, family: &'static str },
    /// The chip's first slot is not a single `RESET` entry.
    MissingReset { chip: &'static str },
    /// A chip slot covers zero table entries.
    EmptySlot { chip: &'static str, slot: &'a str },
    /// A slot that is not reserved covers more than one table entry.
    RepeatedSlot { chip: &'static str, slot: &'a str, repeat: u8 },
    /// Program memory is smaller than the vector table.
    FlashTooSmall { chip: &'static str, flash_bytes: u32, table_bytes: u32 },
    /// A chip slot name cannot be used in a symbol.
    BadSlotName { chip: &'static str, slot: &'a str },
    /// Two chip slots share a name.
    DuplicateSlot { chip: &'static str, slot: &'a str },
    /// A binding names a slot the chip does not have.
    UnknownSlot { chip: &'static str, slot: &'a str },
    /// A binding tries to replace the reset vector.
    ResetOverride { slot: &'a str },
    /// A binding names a reserved slot.
    ReservedSlot { slot: &'a str, repeat: u8 },
    /// The same slot is bound twice.
    DuplicateBinding { slot: &'a str },
    /// The chip family cannot express the binding's nesting mode.
    UnsupportedNesting { family: &'static str, slot: &'a str, mode: NestingMode },
    /// A binding's nesting mode is not one of the known modes.
    InvalidNesting { slot: &'a str, value: &'a str },
    /// A binding's handler is not a Rust path.
    InvalidHandler { slot: &'a str, handler: &'a str },
}

impl<'a> fmt::Display for Error<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::BadChipName { chip } =>
                write!(f, "chip name {:?} is not usable in generated source", chip),
            Error::BadFamilyName { chip, family } =>
                write!(f, "{}: family name {:?} is not usable in generated source",
                       chip, family),
            Error::MissingReset { chip } =>
                write!(f, "{}: first slot must be a single RESET entry", chip),
            Error::EmptySlot { chip, slot } =>
                write!(f, "{}: slot {} covers no table entries", chip, slot),
            Error::RepeatedSlot { chip, slot, repeat } =>
                write!(f, "{}: slot {} covers {} entries but is not reserved",
                       chip, slot, repeat),
            Error::FlashTooSmall { chip, flash_bytes, table_bytes } =>
                write!(f, "{}: {} bytes of flash cannot hold a {} byte vector table",
                       chip, flash_bytes, table_bytes),
            Error::BadSlotName { chip, slot } =>
                write!(f, "{}: slot name `{}` is not usable as a symbol", chip, slot),
            Error::DuplicateSlot { chip, slot } =>
                write!(f, "{}: slot {} appears more than once", chip, slot),
            Error::UnknownSlot { chip, slot } =>
                write!(f, "{} has no interrupt slot named {}", chip, slot),
            Error::ResetOverride { slot } =>
                write!(f, "slot {} is the reset vector and cannot be bound", slot),
            Error::ReservedSlot { slot, repeat } =>
                write!(f, "slot {} is reserved ({} entries) and cannot be bound",
                       slot, repeat),
            Error::DuplicateBinding { slot } =>
                write!(f, "slot {} is bound more than once", slot),
            Error::UnsupportedNesting { family, slot, mode } =>
                write!(f, "slot {}: {} handlers are not supported on {}",
                       slot, mode, family),
            Error::InvalidNesting { slot, value } =>
                write!(f, "slot {}: unknown nesting mode `{}` (expected unspecified, \
                           nested-enabled or nested-disabled)", slot, value),
            Error::InvalidHandler { slot, handler } =>
                write!(f, "slot {}: handler `{}` is not a path to a function",
                       slot, handler),
        }
    }
}

impl<'a> core::error::Error for Error<'a> {}

/// A vector table that cannot be encoded into machine code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssembleError<'a> {
    /// No address was supplied for an entry's target.
    Unresolved { index: usize, target: Target<'a> },
    /// A jump target is not on an instruction (word) boundary.
    Misaligned { target: Target<'a>, address: u32 },
    /// A jump target lies outside program memory.
    OutsideFlash { target: Target<'a>, address: u32 },
    /// A relative jump cannot reach its target.
    OutOfReach { index: usize, target: Target<'a>, offset: i32 },
}

impl<'a> fmt::Display for AssembleError<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            AssembleError::Unresolved { index, target } =>
                write!(f, "entry {}: no address for {}", index, target),
            AssembleError::Misaligned { target, address } =>
                write!(f, "{} at {:#06x} is not word aligned", target, address),
            AssembleError::OutsideFlash { target, address } =>
                write!(f, "{} at {:#06x} is outside program memory", target, address),
            AssembleError::OutOfReach { index, target, offset } =>
                write!(f, "entry {}: {} is {} words away, out of rjmp range",
                       index, target, offset),
        }
    }
}

impl<'a> core::error::Error for AssembleError<'a> {}

/// One of the regions described by linker boundary symbols.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Area {
    /// `.data` in RAM.
    Data,
    /// The `.data` load image in program memory.
    DataLoad,
    /// `.bss`.
    Bss,
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Area::Data => ".data",
            Area::DataLoad => ".data load image",
            Area::Bss => ".bss",
        })
    }
}

/// Boundary markers that break the bootstrap sequence's assumptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// A boundary symbol was not found.
    MissingSymbol { symbol: &'static str },
    /// No room was set aside for the stack.
    NoStackReserve,
    /// A region ends before it starts.
    Inverted { area: Area, start: u32, end: u32 },
    /// A RAM region lies outside SRAM.
    OutsideRam { area: Area },
    /// The load image lies outside program memory.
    OutsideFlash { area: Area },
    /// Two regions share bytes.
    Overlap { a: Area, b: Area },
    /// A region reaches into the space reserved for the stack.
    StackCollision { area: Area, end: u32, limit: u32 },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            LayoutError::MissingSymbol { symbol } =>
                write!(f, "boundary symbol {} is not defined", symbol),
            LayoutError::NoStackReserve =>
                f.write_str("stack reserve must be at least one byte"),
            LayoutError::Inverted { area, start, end } =>
                write!(f, "{} ends at {:#06x} before it starts at {:#06x}",
                       area, end, start),
            LayoutError::OutsideRam { area } =>
                write!(f, "{} lies outside SRAM", area),
            LayoutError::OutsideFlash { area } =>
                write!(f, "{} lies outside program memory", area),
            LayoutError::Overlap { a, b } =>
                write!(f, "{} overlaps {}", a, b),
            LayoutError::StackCollision { area, end, limit } =>
                write!(f, "{} ends at {:#06x}, past the stack limit {:#06x}",
                       area, end, limit),
        }
    }
}

impl core::error::Error for LayoutError {}

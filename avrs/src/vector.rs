//! Vector table construction.
//!
//! A table is built from two plain data sets: the chip's ordered slot list
//! and the application's handler bindings.  The bindings are checked against
//! the slot list, then every slot is resolved to a jump target: the reset
//! entry for slot 0, a trampoline for a bound slot, the default trap for
//! everything else.  Nothing here depends on run-time state, so building the
//! same inputs twice always gives the same table.

use alloc::vec::Vec;
use core::fmt;

use log::{debug, trace};

use crate::chip::{self, Chip, Jump};
use crate::error::{AssembleError, Error};
use crate::isr::NestingMode;

/// Symbol of the reset stub emitted with the table.
pub const RESET_SYMBOL: &str = "__avrs_reset";
/// Symbol of the shared trap for unbound slots.
pub const DEFAULT_TRAP_SYMBOL: &str = "__avrs_default_trap";
/// Symbol of the bootstrap sequence the reset stub jumps to.
pub const START_SYMBOL: &str = "__avrs_start";
/// Prefix of generated trampoline symbols; the slot name follows.
pub const ISR_PREFIX: &str = "__avrs_isr_";

/// Association of one slot with the function that handles it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Binding<'a> {
    /// Slot name, as spelled in the chip description.
    pub slot: &'a str,
    /// Path to the handler function, e.g. `crate::app::tick`.
    pub handler: &'a str,
    pub mode: NestingMode,
}

impl<'a> Binding<'a> {
    pub const fn new(slot: &'a str, handler: &'a str, mode: NestingMode) -> Self {
        Binding { slot, handler, mode }
    }

    /// Builds a binding whose nesting mode is given as text, as it is in
    /// configuration files.
    pub fn parse(slot: &'a str, handler: &'a str, mode: &'a str)
                 -> Result<Self, Error<'a>> {
        let mode = mode.parse()
            .map_err(|_| Error::InvalidNesting { slot, value: mode })?;
        Ok(Binding { slot, handler, mode })
    }
}

/// Where a table entry jumps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target<'a> {
    /// The reset stub, which starts the bootstrap sequence.
    Reset,
    /// The shared trap for slots nobody handles.
    DefaultTrap,
    /// The generated trampoline for a bound slot.
    Handler { slot: &'a str, handler: &'a str, mode: NestingMode },
}

/// Formats as the target's symbol name.
impl<'a> fmt::Display for Target<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Target::Reset => f.write_str(RESET_SYMBOL),
            Target::DefaultTrap => f.write_str(DEFAULT_TRAP_SYMBOL),
            Target::Handler { slot, .. } => write!(f, "{}{}", ISR_PREFIX, slot),
        }
    }
}

/// One position in the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry<'a> {
    /// The chip slot this position belongs to.
    pub slot: &'static str,
    pub target: Target<'a>,
}

/// The complete, ordered list of jump targets for one program image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VectorTable<'a> {
    chip: &'a Chip,
    entries: Vec<Entry<'a>>,
}

/// Checks `bindings` against `chip` and resolves every table position.
pub fn build<'a>(chip: &'a Chip, bindings: &[Binding<'a>])
                 -> Result<VectorTable<'a>, Error<'a>> {
    chip.validate()?;

    for (i, binding) in bindings.iter().enumerate() {
        check(chip, binding, &bindings[..i])?;
        debug!("{}: {} -> {} ({})", chip.name, binding.slot, binding.handler,
               binding.mode);
    }

    let mut entries = Vec::with_capacity(chip.table_len());
    for (n, slot) in chip.slots.iter().enumerate() {
        let target = if n == 0 {
            Target::Reset
        } else {
            match bindings.iter().find(|b| b.slot == slot.name) {
                Some(b) => Target::Handler {
                    slot: b.slot,
                    handler: b.handler,
                    mode: b.mode,
                },
                None => Target::DefaultTrap,
            }
        };
        for _ in 0..slot.repeat {
            trace!("{}: entry {} ({}) -> {}", chip.name, entries.len(),
                   slot.name, target);
            entries.push(Entry { slot: slot.name, target });
        }
    }

    debug!("{}: {} entries, {} bound", chip.name, entries.len(),
           bindings.len());
    Ok(VectorTable { chip, entries })
}

fn check<'a>(chip: &Chip, binding: &Binding<'a>, earlier: &[Binding<'a>])
             -> Result<(), Error<'a>> {
    let name = binding.slot;
    if name == chip::RESET {
        return Err(Error::ResetOverride { slot: name });
    }
    let slot = chip.slot(name)
        .ok_or(Error::UnknownSlot { chip: chip.name, slot: name })?;
    if slot.reserved {
        return Err(Error::ReservedSlot { slot: name, repeat: slot.repeat });
    }
    if earlier.iter().any(|b| b.slot == name) {
        return Err(Error::DuplicateBinding { slot: name });
    }
    if !chip.family.supports(binding.mode) {
        return Err(Error::UnsupportedNesting {
            family: chip.family.name,
            slot: name,
            mode: binding.mode,
        });
    }
    if !is_path(binding.handler) {
        return Err(Error::InvalidHandler { slot: name, handler: binding.handler });
    }
    Ok(())
}

/// True if `s` looks like a Rust path: `::`-separated identifiers, with an
/// optional leading `::`.
fn is_path(s: &str) -> bool {
    let s = s.strip_prefix("::").unwrap_or(s);
    !s.is_empty() && s.split("::").all(|seg| {
        let mut bytes = seg.bytes();
        match bytes.next() {
            Some(b) if b.is_ascii_alphabetic() => (),
            Some(b'_') if seg.len() > 1 => (),
            _ => return false,
        }
        bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
    })
}

impl<'a> VectorTable<'a> {
    pub fn chip(&self) -> &'a Chip {
        self.chip
    }

    /// Number of entries; the sum of the chip's repeat counts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry<'a>] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Entry<'a>> {
        self.entries.get(index)
    }

    /// Entries that jump to a trampoline, in table order.
    pub fn handlers(&self) -> impl Iterator<Item = &Entry<'a>> + '_ {
        self.entries.iter()
            .filter(|e| matches!(e.target, Target::Handler { .. }))
    }

    /// Byte address of entry `index` in program memory.
    pub fn address_of(&self, index: usize) -> u32 {
        index as u32 * self.chip.family.jump.width()
    }

    /// Encodes the table as machine code, as it will appear at address zero.
    ///
    /// `resolve` supplies the byte address of each target, typically read
    /// from the symbol table of the linked image.
    pub fn assemble<F>(&self, mut resolve: F) -> Result<Vec<u8>, AssembleError<'a>>
        where F: FnMut(&Target<'a>) -> Option<u32>
    {
        let mut image = Vec::with_capacity(self.chip.table_bytes() as usize);
        for (index, entry) in self.entries.iter().enumerate() {
            let target = entry.target;
            let address = resolve(&target)
                .ok_or(AssembleError::Unresolved { index, target })?;
            if address % 2 != 0 {
                return Err(AssembleError::Misaligned { target, address });
            }
            if address >= self.chip.flash_bytes {
                return Err(AssembleError::OutsideFlash { target, address });
            }
            let k = address / 2;
            match self.chip.family.jump {
                Jump::Jmp => {
                    // 1001 010k kkkk 110k, then the low 16 bits of k.
                    let op = 0x940c
                        | ((k >> 17) & 0x1f) << 4
                        | ((k >> 16) & 0x01);
                    image.extend_from_slice(&(op as u16).to_le_bytes());
                    image.extend_from_slice(&(k as u16).to_le_bytes());
                }
                Jump::Rjmp => {
                    let offset = self.rjmp_offset(index, k);
                    if !(-2048..=2047).contains(&offset) {
                        return Err(AssembleError::OutOfReach { index, target, offset });
                    }
                    // 1100 kkkk kkkk kkkk
                    let op = 0xc000 | (offset as u16 & 0x0fff);
                    image.extend_from_slice(&op.to_le_bytes());
                }
            }
        }
        Ok(image)
    }

    /// Word offset from the `rjmp` at `index` to word address `k`.  On parts
    /// with at most 8 KiB of flash the program counter wraps, so every
    /// target is reachable one way or the other.
    fn rjmp_offset(&self, index: usize, k: u32) -> i32 {
        let offset = k as i32 - (index as i32 + 1);
        let words = (self.chip.flash_bytes / 2) as i32;
        if words <= 4096 {
            let wrapped = offset.rem_euclid(words);
            if wrapped >= words / 2 { wrapped - words } else { wrapped }
        } else {
            offset
        }
    }
}

/// Formats as a listing: index, address, slot, instruction.
impl<'a> fmt::Display for VectorTable<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let jump = self.chip.family.jump;
        writeln!(f, "{} vector table: {} entries, {} bytes",
                 self.chip.name, self.len(), self.chip.table_bytes())?;
        for (i, e) in self.entries.iter().enumerate() {
            write!(f, "{:>4}  {:#06x}  {:<16} {} {}",
                   i, self.address_of(i), e.slot, jump.mnemonic(), e.target)?;
            if let Target::Handler { handler, mode, .. } = e.target {
                write!(f, "  ; {} ({})", handler, mode)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

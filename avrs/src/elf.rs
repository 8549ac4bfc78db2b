//! Post-link checks on a firmware ELF image.
//!
//! The boundary symbols the bootstrap sequence trusts are only known once the
//! image is linked.  This reads them back out of the symbol table so the
//! layout can be validated before the image is flashed.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

use goblin::elf::Elf;
use log::debug;

use crate::chip::Chip;
use crate::error::LayoutError;
use crate::layout::MemoryLayout;

/// Named symbol values from a linked image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Symbols {
    values: BTreeMap<String, u32>,
}

impl Symbols {
    /// Reads the symbol table of the ELF image in `bytes`.  Unnamed symbols
    /// and values that do not fit the AVR address spaces are skipped.
    pub fn parse(bytes: &[u8]) -> Result<Self, goblin::error::Error> {
        let elf = Elf::parse(bytes)?;
        let mut values = BTreeMap::new();
        for sym in elf.syms.iter() {
            let name = match elf.strtab.get_at(sym.st_name) {
                Some(name) if !name.is_empty() => name,
                _ => continue,
            };
            if let Ok(value) = u32::try_from(sym.st_value) {
                let _ = values.insert(name.to_string(), value);
            }
        }
        debug!("read {} symbols", values.len());
        Ok(Symbols { values })
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, u32)> for Symbols {
    fn from_iter<I: IntoIterator<Item = (&'a str, u32)>>(iter: I) -> Self {
        Symbols {
            values: iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }
}

/// Reads the boundary markers from `symbols` and checks them against `chip`,
/// keeping `stack_reserve` bytes free for the stack.
pub fn check_layout(symbols: &Symbols, chip: &Chip, stack_reserve: u32)
                    -> Result<MemoryLayout, LayoutError> {
    let layout = MemoryLayout::from_symbols(|name| symbols.get(name), stack_reserve)?;
    layout.validate(chip)?;
    debug!("{}: .data {:#06x}..{:#06x}, .bss {:#06x}..{:#06x}, {} bytes of stack",
           chip.name, layout.data.start, layout.data.end, layout.bss.start,
           layout.bss.end, stack_reserve);
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::atmega328p;
    use crate::error::Area;
    use crate::layout::{self, Region, DEFAULT_STACK_RESERVE};

    fn linked(bss_end: u32) -> Symbols {
        [
            (layout::DATA_LOAD_START, 0x0400),
            (layout::DATA_START, 0x80_0100),
            (layout::DATA_END, 0x80_0110),
            (layout::BSS_START, 0x80_0110),
            (layout::BSS_END, bss_end),
            ("avrs_main", 0x0200),
        ].into_iter().collect()
    }

    #[test]
    fn well_placed_image_passes() {
        let l = check_layout(&linked(0x80_0180), &atmega328p::CHIP,
                             DEFAULT_STACK_RESERVE).unwrap();
        assert_eq!(l.bss, Region::new(0x0110, 0x0180));
    }

    #[test]
    fn bss_into_the_stack_fails() {
        assert_eq!(check_layout(&linked(0x80_08f0), &atmega328p::CHIP,
                                DEFAULT_STACK_RESERVE),
                   Err(LayoutError::StackCollision {
                       area: Area::Bss,
                       end: 0x08f0,
                       limit: 0x08c0,
                   }));
    }

    #[test]
    fn missing_marker_is_named() {
        let symbols: Symbols = [("avrs_main", 0x0200)].into_iter().collect();
        assert_eq!(symbols.len(), 1);
        assert_eq!(check_layout(&symbols, &atmega328p::CHIP, DEFAULT_STACK_RESERVE),
                   Err(LayoutError::MissingSymbol { symbol: layout::DATA_LOAD_START }));
    }

    #[test]
    fn non_elf_input_is_rejected() {
        assert!(Symbols::parse(b"not an image").is_err());
    }
}

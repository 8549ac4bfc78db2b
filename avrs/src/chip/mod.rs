//! Chip descriptions: the ordered interrupt slot list, jump instruction and
//! memory sizes of each supported part.
//!
//! This is transcribed data.  The order of `slots` is the hardware's, and is
//! preserved exactly in the generated table.

use crate::isr::{self, NestingMode};

pub mod atmega328p;
pub mod atmega32u4;
pub mod attiny85;

/// Name of the first slot of every chip.
pub const RESET: &str = "RESET";

/// One named position (or run of positions) in a vector table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot {
    pub name: &'static str,
    /// Number of consecutive table entries.  Greater than one only for
    /// reserved gaps.
    pub repeat: u8,
    /// Set for vectors the hardware never raises.  They can never be bound.
    pub reserved: bool,
}

impl Slot {
    pub const fn new(name: &'static str) -> Self {
        Slot { name, repeat: 1, reserved: false }
    }

    /// A reserved gap of `repeat` entries.
    pub const fn reserved(name: &'static str, repeat: u8) -> Self {
        Slot { name, repeat, reserved: true }
    }

    /// True if this slot can carry a handler binding.
    pub fn is_bindable(&self) -> bool {
        !self.reserved && self.name != RESET
    }
}

/// Instruction used for every entry of the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Jump {
    /// Relative jump, one word, reaches +/- 2K words.
    Rjmp,
    /// Absolute jump, two words, reaches all of program memory.
    Jmp,
}

impl Jump {
    /// Size of one table entry in bytes.
    pub fn width(self) -> u32 {
        match self {
            Jump::Rjmp => 2,
            Jump::Jmp => 4,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Jump::Rjmp => "rjmp",
            Jump::Jmp => "jmp",
        }
    }
}

/// Properties shared by every chip of a core family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Family {
    pub name: &'static str,
    pub jump: Jump,
    /// Nesting modes the family's toolchain can express.
    pub nesting: &'static [NestingMode],
}

impl Family {
    pub fn supports(&self, mode: NestingMode) -> bool {
        self.nesting.contains(&mode)
    }
}

/// Classic cores with at most 8 KiB of flash (no `jmp`).
pub const AVR25: Family = Family {
    name: "avr25",
    jump: Jump::Rjmp,
    nesting: isr::ALL_MODES,
};

/// Enhanced cores with 16-64 KiB of flash.
pub const AVR5: Family = Family {
    name: "avr5",
    jump: Jump::Jmp,
    nesting: isr::ALL_MODES,
};

/// A specific part.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chip {
    pub name: &'static str,
    pub family: Family,
    pub flash_bytes: u32,
    /// First byte of internal SRAM in the data address space.
    pub ram_start: u32,
    /// One past the last byte of SRAM.  The stack starts just below this.
    pub ram_end: u32,
    pub slots: &'static [Slot],
}

impl Chip {
    /// Number of entries in the vector table.
    pub fn table_len(&self) -> usize {
        self.slots.iter().map(|s| usize::from(s.repeat)).sum()
    }

    /// Size of the vector table in bytes.
    pub fn table_bytes(&self) -> u32 {
        self.table_len() as u32 * self.family.jump.width()
    }

    /// Looks up a slot by name.
    pub fn slot(&self, name: &str) -> Option<&'static Slot> {
        self.slots.iter().find(|s| s.name == name)
    }

    /// Checks the description itself: names usable in generated source, a
    /// leading `RESET` slot of width one, no empty runs, runs only where
    /// reserved, unique slot names usable as symbol suffixes, and a flash
    /// large enough for the table.
    #[cfg(feature = "build")]
    pub fn validate(&self) -> Result<(), crate::error::Error<'static>> {
        use crate::error::Error;

        if !is_symbol_suffix(self.name) {
            return Err(Error::BadChipName { chip: self.name });
        }
        if !is_symbol_suffix(self.family.name) {
            return Err(Error::BadFamilyName { chip: self.name, family: self.family.name });
        }
        match self.slots.first() {
            Some(s) if s.name == RESET && s.repeat == 1 => (),
            _ => return Err(Error::MissingReset { chip: self.name }),
        }
        for (i, slot) in self.slots.iter().enumerate() {
            if slot.repeat == 0 {
                return Err(Error::EmptySlot { chip: self.name, slot: slot.name });
            }
            if slot.repeat > 1 && !slot.reserved {
                return Err(Error::RepeatedSlot {
                    chip: self.name,
                    slot: slot.name,
                    repeat: slot.repeat,
                });
            }
            if !is_symbol_suffix(slot.name) {
                return Err(Error::BadSlotName { chip: self.name, slot: slot.name });
            }
            if self.slots[..i].iter().any(|s| s.name == slot.name) {
                return Err(Error::DuplicateSlot { chip: self.name, slot: slot.name });
            }
        }
        if self.flash_bytes < self.table_bytes() {
            return Err(Error::FlashTooSmall {
                chip: self.name,
                flash_bytes: self.flash_bytes,
                table_bytes: self.table_bytes(),
            });
        }
        Ok(())
    }
}

/// Every chip description shipped with the crate.
pub const ALL: &[&Chip] = &[&atmega328p::CHIP, &atmega32u4::CHIP, &attiny85::CHIP];

/// Looks up a shipped chip by name.
pub fn by_name(name: &str) -> Option<&'static Chip> {
    ALL.iter().copied().find(|c| c.name == name)
}

/// True if `s` can be pasted onto a symbol name.
pub fn is_symbol_suffix(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// The chip selected with a `chip-*` feature.
#[cfg(feature = "chip-atmega328p")]
pub const SELECTED: &Chip = &atmega328p::CHIP;
/// The chip selected with a `chip-*` feature.
#[cfg(feature = "chip-atmega32u4")]
pub const SELECTED: &Chip = &atmega32u4::CHIP;
/// The chip selected with a `chip-*` feature.
#[cfg(feature = "chip-attiny85")]
pub const SELECTED: &Chip = &attiny85::CHIP;

#[cfg(all(test, feature = "build"))]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn shipped_chips_are_well_formed() {
        for chip in &[atmega328p::CHIP, atmega32u4::CHIP, attiny85::CHIP] {
            assert_eq!(chip.validate(), Ok(()), "{}", chip.name);
        }
    }

    #[test]
    fn table_sizes_match_datasheets() {
        assert_eq!(atmega328p::CHIP.table_len(), 26);
        assert_eq!(atmega328p::CHIP.table_bytes(), 104);
        assert_eq!(atmega32u4::CHIP.table_len(), 43);
        assert_eq!(attiny85::CHIP.table_len(), 15);
        assert_eq!(attiny85::CHIP.table_bytes(), 30);
    }

    #[test]
    fn reserved_slots_are_not_bindable() {
        let gap = atmega32u4::CHIP.slot("RESERVED14").unwrap();
        assert_eq!(gap.repeat, 3);
        assert!(!gap.is_bindable());
        let single = atmega32u4::CHIP.slot("RESERVED9").unwrap();
        assert_eq!(single.repeat, 1);
        assert!(single.reserved);
        assert!(!single.is_bindable());
        assert!(!atmega32u4::CHIP.slot(RESET).unwrap().is_bindable());
        assert!(atmega32u4::CHIP.slot("USB_GEN").unwrap().is_bindable());
    }

    static NO_RESET: [Slot; 2] = [Slot::new("INT0"), Slot::new(RESET)];
    static TWICE: [Slot; 3] = [Slot::new(RESET), Slot::new("INT0"), Slot::new("INT0")];
    static EMPTY_RUN: [Slot; 2] = [Slot::new(RESET), Slot::reserved("GAP", 0)];
    static BAD_NAME: [Slot; 2] = [Slot::new(RESET), Slot::new("PCINT-0")];
    static UNRESERVED_RUN: [Slot; 2] = [
        Slot::new(RESET),
        Slot { name: "INT0", repeat: 2, reserved: false },
    ];

    fn chip(slots: &'static [Slot]) -> Chip {
        Chip { name: "test", slots, ..attiny85::CHIP }
    }

    #[test]
    fn malformed_descriptions_are_rejected() {
        assert_eq!(chip(&NO_RESET).validate(),
                   Err(Error::MissingReset { chip: "test" }));
        assert_eq!(chip(&[]).validate(),
                   Err(Error::MissingReset { chip: "test" }));
        assert_eq!(chip(&TWICE).validate(),
                   Err(Error::DuplicateSlot { chip: "test", slot: "INT0" }));
        assert_eq!(chip(&EMPTY_RUN).validate(),
                   Err(Error::EmptySlot { chip: "test", slot: "GAP" }));
        assert_eq!(chip(&BAD_NAME).validate(),
                   Err(Error::BadSlotName { chip: "test", slot: "PCINT-0" }));
        assert_eq!(chip(&UNRESERVED_RUN).validate(),
                   Err(Error::RepeatedSlot { chip: "test", slot: "INT0", repeat: 2 }));
    }

    #[test]
    fn flash_must_hold_the_table() {
        let tiny = Chip { flash_bytes: 0, ..attiny85::CHIP };
        assert_eq!(tiny.validate(), Err(Error::FlashTooSmall {
            chip: "attiny85",
            flash_bytes: 0,
            table_bytes: 30,
        }));
        let exact = Chip { flash_bytes: 30, ..attiny85::CHIP };
        assert_eq!(exact.validate(), Ok(()));
    }

    #[test]
    fn names_pasted_into_source_are_checked() {
        let chip = Chip { name: "evil\n#[no_mangle]", ..attiny85::CHIP };
        assert_eq!(chip.validate(), Err(Error::BadChipName { chip: "evil\n#[no_mangle]" }));
        let family = Family { name: "avr 25", ..AVR25 };
        let chip = Chip { family, ..attiny85::CHIP };
        assert_eq!(chip.validate(),
                   Err(Error::BadFamilyName { chip: "attiny85", family: "avr 25" }));
    }

    #[cfg(feature = "chip-atmega328p")]
    #[test]
    fn feature_selects_the_chip() {
        assert_eq!(SELECTED.name, "atmega328p");
    }

    #[test]
    fn shipped_chips_are_found_by_name() {
        assert_eq!(by_name("atmega32u4").map(|c| c.table_len()), Some(43));
        assert_eq!(by_name("atmega8"), None);
    }
}

//! ATtiny85.  Small enough that every vector is a single-word `rjmp`.

use super::{Chip, Slot, AVR25};

/// Interrupt slots, in table order.
pub const SLOTS: &[Slot] = &[
    Slot::new("RESET"),
    Slot::new("INT0"),
    Slot::new("PCINT0"),
    Slot::new("TIMER1_COMPA"),
    Slot::new("TIMER1_OVF"),
    Slot::new("TIMER0_OVF"),
    Slot::new("EE_RDY"),
    Slot::new("ANA_COMP"),
    Slot::new("ADC"),
    Slot::new("TIMER1_COMPB"),
    Slot::new("TIMER0_COMPA"),
    Slot::new("TIMER0_COMPB"),
    Slot::new("WDT"),
    Slot::new("USI_START"),
    Slot::new("USI_OVF"),
];

pub const CHIP: Chip = Chip {
    name: "attiny85",
    family: AVR25,
    flash_bytes: 8 * 1024,
    ram_start: 0x0060,
    ram_end: 0x0260,
    slots: SLOTS,
};

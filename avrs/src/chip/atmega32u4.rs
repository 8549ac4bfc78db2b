//! ATmega32U4.
//!
//! This part leaves holes in its vector table; they are modeled as reserved
//! slots named after the first vector number they cover.

use super::{Chip, Slot, AVR5};

/// Interrupt slots, in table order.
pub const SLOTS: &[Slot] = &[
    Slot::new("RESET"),
    Slot::new("INT0"),
    Slot::new("INT1"),
    Slot::new("INT2"),
    Slot::new("INT3"),
    Slot::reserved("RESERVED6", 2),
    Slot::new("INT6"),
    Slot::reserved("RESERVED9", 1),
    Slot::new("PCINT0"),
    Slot::new("USB_GEN"),
    Slot::new("USB_COM"),
    Slot::new("WDT"),
    Slot::reserved("RESERVED14", 3),
    Slot::new("TIMER1_CAPT"),
    Slot::new("TIMER1_COMPA"),
    Slot::new("TIMER1_COMPB"),
    Slot::new("TIMER1_COMPC"),
    Slot::new("TIMER1_OVF"),
    Slot::new("TIMER0_COMPA"),
    Slot::new("TIMER0_COMPB"),
    Slot::new("TIMER0_OVF"),
    Slot::new("SPI_STC"),
    Slot::new("USART1_RX"),
    Slot::new("USART1_UDRE"),
    Slot::new("USART1_TX"),
    Slot::new("ANALOG_COMP"),
    Slot::new("ADC"),
    Slot::new("EE_READY"),
    Slot::new("TIMER3_CAPT"),
    Slot::new("TIMER3_COMPA"),
    Slot::new("TIMER3_COMPB"),
    Slot::new("TIMER3_COMPC"),
    Slot::new("TIMER3_OVF"),
    Slot::new("TWI"),
    Slot::new("SPM_READY"),
    Slot::new("TIMER4_COMPA"),
    Slot::new("TIMER4_COMPB"),
    Slot::new("TIMER4_COMPD"),
    Slot::new("TIMER4_OVF"),
    Slot::new("TIMER4_FPF"),
];

pub const CHIP: Chip = Chip {
    name: "atmega32u4",
    family: AVR5,
    flash_bytes: 32 * 1024,
    ram_start: 0x0100,
    ram_end: 0x0b00,
    slots: SLOTS,
};

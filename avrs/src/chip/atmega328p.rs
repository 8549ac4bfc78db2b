//! ATmega328P (and ATmega328).

use super::{Chip, Slot, AVR5};

/// Interrupt slots, in table order.
pub const SLOTS: &[Slot] = &[
    Slot::new("RESET"),
    Slot::new("INT0"),
    Slot::new("INT1"),
    Slot::new("PCINT0"),
    Slot::new("PCINT1"),
    Slot::new("PCINT2"),
    Slot::new("WDT"),
    Slot::new("TIMER2_COMPA"),
    Slot::new("TIMER2_COMPB"),
    Slot::new("TIMER2_OVF"),
    Slot::new("TIMER1_CAPT"),
    Slot::new("TIMER1_COMPA"),
    Slot::new("TIMER1_COMPB"),
    Slot::new("TIMER1_OVF"),
    Slot::new("TIMER0_COMPA"),
    Slot::new("TIMER0_COMPB"),
    Slot::new("TIMER0_OVF"),
    Slot::new("SPI_STC"),
    Slot::new("USART_RX"),
    Slot::new("USART_UDRE"),
    Slot::new("USART_TX"),
    Slot::new("ADC"),
    Slot::new("EE_READY"),
    Slot::new("ANALOG_COMP"),
    Slot::new("TWI"),
    Slot::new("SPM_READY"),
];

pub const CHIP: Chip = Chip {
    name: "atmega328p",
    family: AVR5,
    flash_bytes: 32 * 1024,
    ram_start: 0x0100,
    ram_end: 0x0900,
    slots: SLOTS,
};

//! Blinks the LED on PB5 of an ATmega328P (Arduino Uno pin 13) from the
//! Timer0 overflow interrupt, echoes USART bytes, and prints a heartbeat from
//! a nested Timer1 handler that the other two can preempt.
//!
//! Built for the host, this prints the vector table `build.rs` generated.
//!
//! After linking, check the image's memory layout with
//!
//! ```text
//! cargo run -p avrs --features check --bin avrs-check -- \
//!     --chip atmega328p target/avr-atmega328p/release/blink.elf
//! ```

#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]
#![cfg_attr(target_arch = "avr", feature(asm_experimental_arch, abi_avr_interrupt))]

/******************************************************************************/

// Vector table and trampolines generated by build.rs.

#[cfg(target_arch = "avr")]
include!(concat!(env!("OUT_DIR"), "/vectors.rs"));

/******************************************************************************/

// Application.

#[cfg(target_arch = "avr")]
mod app {
    use avrs::avr;
    use avrs::reg::Reg;

    // Data-space addresses of the registers we touch.
    const PINB: usize = 0x23;
    const DDRB: usize = 0x24;
    const TCCR0B: usize = 0x45;
    const TIMSK0: usize = 0x6e;
    const TIMSK1: usize = 0x6f;
    const TCCR1B: usize = 0x81;
    const OCR1AL: usize = 0x88;
    const OCR1AH: usize = 0x89;
    const UCSR0A: usize = 0xc0;
    const UCSR0B: usize = 0xc1;
    const UBRR0L: usize = 0xc4;
    const UDR0: usize = 0xc6;

    const LED: u8 = 1 << 5;
    const UDRE0: u8 = 1 << 5;

    fn reg(address: usize) -> &'static Reg<u8> {
        unsafe { Reg::at(address) }
    }

    /// Timer0 overflow: toggle the LED.  Writing a one to PINx toggles the
    /// pin.
    pub fn tick() {
        reg(PINB).set(LED);
    }

    fn send(byte: u8) {
        while reg(UCSR0A).get() & UDRE0 == 0 {}
        reg(UDR0).set(byte);
    }

    /// USART receive complete: send the byte back.  Runs masked: the
    /// interrupt stays pending until UDR0 is read.
    pub fn receive() {
        send(reg(UDR0).get());
    }

    /// Timer1 compare match A, once a second.  The hardware clears the flag
    /// when the vector is taken, so this can run with interrupts enabled
    /// while it waits on the transmitter.
    pub fn heartbeat() {
        for &b in b"tick\r\n" {
            send(b);
        }
    }

    /// The application entry point.  Called by the runtime once RAM is set
    /// up, with interrupts still masked.
    #[no_mangle]
    pub extern "C" fn avrs_main() -> ! {
        reg(DDRB).update(|v| v | LED);

        // clk/1024, overflow interrupt on.
        reg(TCCR0B).set(0b101);
        reg(TIMSK0).set(1);

        // CTC at 15625 counts of clk/1024: one compare match per second.
        // High byte first.
        reg(OCR1AH).set(0x3d);
        reg(OCR1AL).set(0x08);
        reg(TCCR1B).set((1 << 3) | 0b101);
        reg(TIMSK1).set(1 << 1);

        // 9600 baud at 16 MHz; receiver, transmitter, RX complete interrupt.
        reg(UBRR0L).set(103);
        reg(UCSR0B).set((1 << 7) | (1 << 4) | (1 << 3));

        avr::enable_interrupts();
        loop {}
    }
}

/******************************************************************************/

// Host dry run.

#[cfg(not(target_arch = "avr"))]
fn main() {
    print!("{}", include_str!(concat!(env!("OUT_DIR"), "/vectors.txt")));
}

//! Post-link check of a firmware image.
//!
//! Reads the `.data`/`.bss` boundary symbols from a linked ELF file and
//! validates them against the chip, so an image whose startup code would
//! clobber the stack is rejected before it is flashed:
//!
//! ```text
//! cargo run -p avrs --features check --bin avrs-check -- \
//!     --chip atmega328p target/avr-atmega328p/release/blink.elf
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use avrs::chip;
use avrs::elf::{self, Symbols};
use avrs::layout::DEFAULT_STACK_RESERVE;

/// Validate the memory layout of a linked AVR firmware image
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Chip the image was built for (atmega328p, atmega32u4, attiny85)
    #[arg(short, long)]
    chip: String,

    /// Bytes at the top of RAM that must stay free for the stack
    #[arg(short, long, default_value_t = DEFAULT_STACK_RESERVE)]
    stack_reserve: u32,

    /// Linked firmware image
    image: PathBuf,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let chip = chip::by_name(&args.chip)
        .with_context(|| format!("unknown chip {}", args.chip))?;
    let bytes = fs::read(&args.image)
        .with_context(|| format!("failed to read {}", args.image.display()))?;
    let symbols = Symbols::parse(&bytes)
        .with_context(|| format!("{} is not an ELF image", args.image.display()))?;
    let layout = elf::check_layout(&symbols, chip, args.stack_reserve)
        .with_context(|| format!("{}: bad memory layout", args.image.display()))?;

    println!("{}: ok for {}", args.image.display(), chip.name);
    println!("  .data  {:#06x}..{:#06x} ({} bytes, loaded from {:#06x})",
             layout.data.start, layout.data.end, layout.data.len(), layout.data_load);
    println!("  .bss   {:#06x}..{:#06x} ({} bytes)",
             layout.bss.start, layout.bss.end, layout.bss.len());
    println!("  stack  {} bytes reserved below {:#06x}", args.stack_reserve, chip.ram_end);
    Ok(())
}

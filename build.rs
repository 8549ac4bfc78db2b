//! Generates the vector table for the blink firmware.
//!
//! The handler bindings live here rather than in the firmware source so that
//! a bad binding fails the build, with the slot named, before anything is
//! compiled for the target.
//!
//! Set `AVRS_LOG` to a level (`debug`, `trace`) to see what the generator
//! decides; records are passed on as cargo warnings.

use std::env;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use avrs::codegen::{self, Options};
use avrs::{chip, Binding, NestingMode};
use log::{LevelFilter, Log, Metadata, Record};

/// Slot, handler, nesting mode.
///
/// Only sources whose flag the hardware clears on vector entry may nest:
/// USART_RX stays pending until UDR0 is read, so it runs masked.
const BINDINGS: &[Binding<'static>] = &[
    Binding::new("TIMER0_OVF", "crate::app::tick", NestingMode::Disabled),
    Binding::new("USART_RX", "crate::app::receive", NestingMode::Disabled),
    Binding::new("TIMER1_COMPA", "crate::app::heartbeat", NestingMode::Enabled),
];

/// Forwards log records to cargo, which shows them as warnings.
struct CargoLogger;

impl Log for CargoLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!("cargo:warning={} {}: {}", record.level(), record.target(),
                     record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: CargoLogger = CargoLogger;

fn init_logger() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-env-changed=AVRS_LOG");
    let level = match env::var("AVRS_LOG") {
        Ok(level) => level.parse::<LevelFilter>()?,
        Err(_) => LevelFilter::Off,
    };
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=build.rs");
    init_logger()?;

    let table = avrs::build(chip::SELECTED, BINDINGS)?;

    let out = PathBuf::from(env::var_os("OUT_DIR").ok_or("OUT_DIR not set")?);
    fs::write(out.join("vectors.rs"),
              codegen::generate(&table, Options::default()).to_string())?;
    fs::write(out.join("vectors.txt"), table.to_string())?;
    Ok(())
}

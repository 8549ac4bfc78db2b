//! Emits a vector table and its trampolines as Rust source.
//!
//! The output is meant to be written to `OUT_DIR` by a build script and
//! `include!`d into the firmware crate root.  It contains:
//!
//! - the `.vectors` section: one `jmp` or `rjmp` per table entry;
//! - `__avrs_reset`, the stub that reset jumps to, which establishes the
//!   register conventions and continues in `__avrs_start`;
//! - one `__avrs_isr_<SLOT>` trampoline per bound slot.
//!
//! The including crate needs `#![feature(asm_experimental_arch,
//! abi_avr_interrupt)]`.
//!
//! Output depends only on the table and the options, so regenerating an
//! unchanged table gives byte-identical source.

use core::fmt;

use log::debug;

use crate::vector::{Target, VectorTable, START_SYMBOL};

/// How trampolines get their interrupt calling convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbiStrategy {
    /// Every trampoline uses `extern "avr-interrupt"` (interrupts stay
    /// masked) and nested handlers unmask explicitly through
    /// `isr::dispatch`, saving and restoring SREG around the body.
    Portable,
    /// Nested handlers use `extern "avr-non-blocking-interrupt"`, which has
    /// the compiler emit `sei` in the prologue; the rest use
    /// `extern "avr-interrupt"`.  Handlers are called directly.
    Native,
}

/// Generator settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Options {
    pub strategy: AbiStrategy,
    /// Path by which generated code refers to this crate.
    pub runtime: &'static str,
    /// Section the table is placed in; the linker script puts it at zero.
    pub section: &'static str,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            strategy: AbiStrategy::Portable,
            runtime: "::avrs",
            section: ".vectors",
        }
    }
}

/// Generated source for one table.  Render it with `Display`.
pub struct Generated<'t, 'a> {
    table: &'t VectorTable<'a>,
    options: Options,
}

/// Prepares the source for `table`.
pub fn generate<'t, 'a>(table: &'t VectorTable<'a>, options: Options)
                        -> Generated<'t, 'a> {
    debug!("{}: generating {} entries, {} trampolines, {:?} ABI",
           table.chip().name, table.len(), table.handlers().count(),
           options.strategy);
    Generated { table, options }
}

impl<'t, 'a> Generated<'t, 'a> {
    fn vectors(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let jump = self.table.chip().family.jump.mnemonic();

        writeln!(f, "core::arch::global_asm!(")?;
        writeln!(f, "    \".section {}, \\\"ax\\\", @progbits\",", self.options.section)?;
        writeln!(f, "    \".global __vectors\",")?;
        writeln!(f, "    \"__vectors:\",")?;
        for (i, e) in self.table.entries().iter().enumerate() {
            writeln!(f, "    \"    {} {}\", // {} {}", jump, e.target, i, e.slot)?;
        }
        writeln!(f, ");")
    }

    fn reset(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let reset = Target::Reset;
        let jump = self.table.chip().family.jump.mnemonic();
        // r1 is the compiler's zero register; SREG = 0 keeps interrupts
        // masked until the application enables them.
        writeln!(f, "core::arch::global_asm!(")?;
        writeln!(f, "    \".section .text.{}, \\\"ax\\\", @progbits\",", reset)?;
        writeln!(f, "    \".global {}\",", reset)?;
        writeln!(f, "    \"{}:\",", reset)?;
        writeln!(f, "    \"    clr r1\",")?;
        writeln!(f, "    \"    out 0x3f, r1\",")?;
        // rjmp parts are small enough for a relative jump to reach anywhere.
        writeln!(f, "    \"    {} {}\",", jump, START_SYMBOL)?;
        writeln!(f, ");")
    }

    fn trampoline(&self, f: &mut fmt::Formatter, target: &Target<'a>) -> fmt::Result {
        let (handler, mode) = match *target {
            Target::Handler { handler, mode, .. } => (handler, mode),
            _ => return Ok(()),
        };
        let rt = self.options.runtime;
        let abi = match self.options.strategy {
            AbiStrategy::Native if mode.is_nested() => "avr-non-blocking-interrupt",
            _ => "avr-interrupt",
        };

        writeln!(f)?;
        writeln!(f, "#[no_mangle]")?;
        writeln!(f, "#[allow(non_snake_case)]")?;
        writeln!(f, "pub extern \"{}\" fn {}() {{", abi, target)?;
        writeln!(f, "    let handler: {}::Handler = {};", rt, handler)?;
        match self.options.strategy {
            AbiStrategy::Portable => writeln!(
                f, "    {}::isr::dispatch({}::NestingMode::{}, handler);",
                rt, rt, mode.variant_name())?,
            AbiStrategy::Native => writeln!(f, "    handler();")?,
        }
        writeln!(f, "}}")
    }
}

impl<'t, 'a> fmt::Display for Generated<'t, 'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let chip = self.table.chip();
        writeln!(f, "// @generated by avrs for {} ({}, {} entries). Do not edit.",
                 chip.name, chip.family.name, self.table.len())?;
        writeln!(f)?;
        self.vectors(f)?;
        writeln!(f)?;
        self.reset(f)?;
        for e in self.table.handlers() {
            self.trampoline(f, &e.target)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::{atmega328p, attiny85};
    use crate::isr::NestingMode;
    use crate::vector::{build, Binding};

    fn bindings() -> [Binding<'static>; 2] {
        [
            Binding::new("TIMER0_OVF", "crate::app::tick", NestingMode::Disabled),
            Binding::new("TIMER1_COMPA", "crate::app::heartbeat", NestingMode::Enabled),
        ]
    }

    #[test]
    fn one_jump_per_entry() {
        let table = build(&atmega328p::CHIP, &bindings()).unwrap();
        let src = generate(&table, Options::default()).to_string();
        let jumps: Vec<_> = src.lines()
            .filter(|l| l.trim_start().starts_with("\"    jmp"))
            .collect();
        // 26 table entries plus the reset stub.
        assert_eq!(jumps.len(), 27);
        assert_eq!(jumps[0], "    \"    jmp __avrs_reset\", // 0 RESET");
        assert_eq!(jumps[1], "    \"    jmp __avrs_default_trap\", // 1 INT0");
        assert_eq!(jumps[16], "    \"    jmp __avrs_isr_TIMER0_OVF\", // 16 TIMER0_OVF");
        assert!(src.contains("\".section .vectors, \\\"ax\\\", @progbits\","));
    }

    #[test]
    fn small_parts_use_rjmp() {
        let table = build(&attiny85::CHIP, &[]).unwrap();
        let src = generate(&table, Options::default()).to_string();
        assert_eq!(src.matches("\"    rjmp ").count(), 16);
        assert!(!src.contains(" jmp "));
        assert!(src.contains("\"    rjmp __avrs_start\","));
        assert!(!src.contains("fn __avrs_isr_"));
    }

    #[test]
    fn portable_trampolines_dispatch_by_mode() {
        let table = build(&atmega328p::CHIP, &bindings()).unwrap();
        let src = generate(&table, Options::default()).to_string();
        assert!(src.contains("\
#[no_mangle]
#[allow(non_snake_case)]
pub extern \"avr-interrupt\" fn __avrs_isr_TIMER0_OVF() {
    let handler: ::avrs::Handler = crate::app::tick;
    ::avrs::isr::dispatch(::avrs::NestingMode::Disabled, handler);
}
"));
        assert!(src.contains("\
pub extern \"avr-interrupt\" fn __avrs_isr_TIMER1_COMPA() {
    let handler: ::avrs::Handler = crate::app::heartbeat;
    ::avrs::isr::dispatch(::avrs::NestingMode::Enabled, handler);
}
"));
        assert!(!src.contains("non-blocking"));
    }

    #[test]
    fn native_trampolines_pick_the_abi() {
        let table = build(&atmega328p::CHIP, &bindings()).unwrap();
        let options = Options {
            strategy: AbiStrategy::Native,
            runtime: "avrs",
            ..Options::default()
        };
        let src = generate(&table, options).to_string();
        assert!(src.contains("\
pub extern \"avr-interrupt\" fn __avrs_isr_TIMER0_OVF() {
    let handler: avrs::Handler = crate::app::tick;
    handler();
}
"));
        assert!(src.contains(
            "pub extern \"avr-non-blocking-interrupt\" fn __avrs_isr_TIMER1_COMPA() {"));
        assert!(!src.contains("dispatch"));
    }

    #[test]
    fn unspecified_mode_never_nests() {
        let b = [Binding::new("ADC", "crate::adc", NestingMode::Unspecified)];
        let table = build(&atmega328p::CHIP, &b).unwrap();
        let options = Options { strategy: AbiStrategy::Native, ..Options::default() };
        let src = generate(&table, options).to_string();
        assert!(src.contains("pub extern \"avr-interrupt\" fn __avrs_isr_ADC() {"));
    }

    #[test]
    fn output_is_deterministic() {
        let a = build(&atmega328p::CHIP, &bindings()).unwrap();
        let b = build(&atmega328p::CHIP, &bindings()).unwrap();
        assert_eq!(generate(&a, Options::default()).to_string(),
                   generate(&b, Options::default()).to_string());
    }
}

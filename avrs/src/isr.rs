//! Interrupt service routine adapters.
//!
//! Application handlers are plain `fn()`s.  The vector table never points at
//! them directly: each bound slot gets a generated trampoline (see
//! `codegen`) with the interrupt calling convention, and the trampoline runs
//! the handler through `dispatch` according to the binding's `NestingMode`.

use core::fmt;
use core::str::FromStr;

use crate::avr;
use crate::reg::Reg;

/// Interrupt handlers take nothing and return nothing.  Anything else is
/// rejected when the generated trampoline is compiled.
pub type Handler = fn();

/// Whether other interrupts may preempt a handler while it runs.
///
/// AVR hardware clears the global interrupt flag on interrupt entry and
/// `reti` sets it again, so a handler runs to completion unless it opts in to
/// nesting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NestingMode {
    /// No preference given.  Treated as `Disabled`.
    #[default]
    Unspecified,
    /// Interrupts are re-enabled for the body of the handler.  Anything the
    /// handler shares with other handlers must tolerate re-entry.  Only for
    /// sources whose flag is cleared when the vector is taken: a source that
    /// stays pending until the handler services it re-enters immediately.
    Enabled,
    /// Interrupts stay masked for the whole handler.
    Disabled,
}

/// Every mode, in declaration order.
pub const ALL_MODES: &[NestingMode] = &[
    NestingMode::Unspecified,
    NestingMode::Enabled,
    NestingMode::Disabled,
];

impl NestingMode {
    /// True if the handler body runs with interrupts enabled.
    pub fn is_nested(self) -> bool {
        self == NestingMode::Enabled
    }

    /// The name used in configuration and diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            NestingMode::Unspecified => "unspecified",
            NestingMode::Enabled => "nested-enabled",
            NestingMode::Disabled => "nested-disabled",
        }
    }

    /// Path of this variant, for use in generated code.
    pub fn variant_name(self) -> &'static str {
        match self {
            NestingMode::Unspecified => "Unspecified",
            NestingMode::Enabled => "Enabled",
            NestingMode::Disabled => "Disabled",
        }
    }
}

impl fmt::Display for NestingMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a `NestingMode`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownMode;

impl FromStr for NestingMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_MODES.iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or(UnknownMode)
    }
}

/// Runs `body` as the handler of an interrupt that is currently being
/// serviced, with `sreg` standing for the status register.
///
/// Must be called with interrupts masked, i.e. straight out of a trampoline.
/// For `Enabled` the interrupt flag is set for the duration of `body` and
/// the saved status register is written back afterwards, which masks
/// interrupts again before the trampoline restores its registers and
/// executes `reti`.  The other modes leave the status register alone.
#[inline(always)]
pub fn dispatch_with<F: FnOnce()>(sreg: &Reg<u8>, mode: NestingMode, body: F) {
    if mode.is_nested() {
        let saved = avr::unmask(sreg);
        body();
        avr::restore(sreg, saved);
    } else {
        body()
    }
}

/// Runs `handler` under `mode` using the processor's status register.  This
/// is what generated trampolines call.
#[cfg(target_arch = "avr")]
#[inline(always)]
pub fn dispatch(mode: NestingMode, handler: Handler) {
    dispatch_with(avr::sreg(), mode, handler)
}

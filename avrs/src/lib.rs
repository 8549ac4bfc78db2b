//! AVR vector table and reset-to-main runtime.
//!
//! The crate has two halves.  The runtime half is `no_std`, needs no
//! allocator, and is what ends up in the firmware image: the bootstrap
//! sequence that runs out of the reset vector, the interrupt adapters that
//! generated trampolines call into, and the default trap.  The build half
//! (the `build` feature) runs on the host, normally from a `build.rs`: it
//! checks a set of handler bindings against a chip's slot list and emits the
//! vector table and trampolines as Rust source.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_arch = "avr", feature(asm_experimental_arch))]

#![deny(
    unused_import_braces,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_qualifications,
    unused_results,
    )]

#[cfg(feature = "build")]
extern crate alloc;

pub mod avr;
pub mod boot;
pub mod chip;
pub mod isr;
pub mod reg;

#[cfg(feature = "build")]
pub mod codegen;
#[cfg(feature = "elf")]
pub mod elf;
#[cfg(feature = "build")]
pub mod error;
#[cfg(feature = "build")]
pub mod layout;
#[cfg(feature = "build")]
pub mod vector;

mod lang;

pub use isr::{Handler, NestingMode};

#[cfg(feature = "build")]
pub use error::{AssembleError, Error, LayoutError};
#[cfg(feature = "build")]
pub use vector::{build, Binding, Target, VectorTable};

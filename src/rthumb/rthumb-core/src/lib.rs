#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod bus;
pub mod constants;
pub mod cpsr;
pub mod cpu;
pub mod decoder;
pub mod error;
pub mod instructions;
pub mod utils;

pub use bus::{Bus, LowRegisters};
pub use cpsr::{Cpsr, Mode};
pub use cpu::{Outcome, Thumb};
pub use decoder::decoder;
pub use error::Exception;
pub use instructions::Instruction;

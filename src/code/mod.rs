//! # Code
//!
//! Decoded instruction streams as seen by transpilers

pub mod il;

pub use il::{Instruction, OpCode, Operand};

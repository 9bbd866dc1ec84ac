//! # Transpiler
//!
//! Transpilers are pure transforms over a decoded method body. The host hands a transpiler the
//! original instructions of a method when a hook is installed and executes whatever it returns.

pub mod date;

use crate::code::Instruction;

/// A rewriting transform that can be installed on a method
///
/// Implementations run inline on the host's main thread, so they must be side-effect free and
/// must preserve the number and order of instructions.
pub trait Transpiler {
    /// Stable identity of the transform, recorded alongside each patch
    fn id(&self) -> &str;
    /// Rewrites the given body
    fn transpile(&self, instructions: Vec<Instruction>) -> Vec<Instruction>;
}

impl<T: Transpiler + ?Sized> Transpiler for &T {
    fn id(&self) -> &str {
        (**self).id()
    }
    fn transpile(&self, instructions: Vec<Instruction>) -> Vec<Instruction> {
        (**self).transpile(instructions)
    }
}

//! Intermediate-language instruction model
//!
//! Only the operand shapes a transpiler can inspect are modelled. Branch targets are kept as
//! instruction indices so that rewriting operands never disturbs control flow.

use std::fmt;

/// Operation codes recognised in decoded method bodies
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    Nop,
    Ldarg,
    Ldloc,
    Stloc,
    Ldfld,
    Stfld,
    LdcI4,
    Ldstr,
    Call,
    Callvirt,
    Newobj,
    Box,
    Pop,
    Br,
    Brtrue,
    Brfalse,
    Ret,
}
impl OpCode {
    /// Whether this operation pushes a constant string literal
    pub fn is_string_load(self) -> bool {
        matches!(self, Self::Ldstr)
    }
    /// Textual mnemonic, as a disassembler would print it
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Nop => "nop",
            Self::Ldarg => "ldarg",
            Self::Ldloc => "ldloc",
            Self::Stloc => "stloc",
            Self::Ldfld => "ldfld",
            Self::Stfld => "stfld",
            Self::LdcI4 => "ldc.i4",
            Self::Ldstr => "ldstr",
            Self::Call => "call",
            Self::Callvirt => "callvirt",
            Self::Newobj => "newobj",
            Self::Box => "box",
            Self::Pop => "pop",
            Self::Br => "br",
            Self::Brtrue => "brtrue",
            Self::Brfalse => "brfalse",
            Self::Ret => "ret",
        }
    }
}

/// Instruction operand
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    /// String literal
    Str(String),
    /// Integer literal or local/argument index
    Int(i64),
    /// Member or type reference, e.g. `System.DateTime::ToString`
    Member(String),
    /// Branch target (index into the owning body)
    Target(usize),
}

/// One decoded operation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instruction {
    /// Operation code
    pub opcode: OpCode,
    /// Operand, if the operation carries one
    pub operand: Option<Operand>,
}
impl Instruction {
    /// Creates an instruction without an operand
    pub fn new(opcode: OpCode) -> Self {
        Self {
            opcode,
            operand: None,
        }
    }
    /// Creates an instruction with an operand
    pub fn with_operand(opcode: OpCode, operand: Operand) -> Self {
        Self {
            opcode,
            operand: Some(operand),
        }
    }
    /// `ldstr "<value>"`
    pub fn ldstr(value: impl Into<String>) -> Self {
        Self::with_operand(OpCode::Ldstr, Operand::Str(value.into()))
    }
    /// `call <member>`
    pub fn call(member: impl Into<String>) -> Self {
        Self::with_operand(OpCode::Call, Operand::Member(member.into()))
    }
    /// `callvirt <member>`
    pub fn callvirt(member: impl Into<String>) -> Self {
        Self::with_operand(OpCode::Callvirt, Operand::Member(member.into()))
    }
    /// `ret`
    pub fn ret() -> Self {
        Self::new(OpCode::Ret)
    }

    /// Returns the string literal this instruction loads, if it is a constant string load
    pub fn string_literal(&self) -> Option<&str> {
        if !self.opcode.is_string_load() {
            return None;
        }
        match &self.operand {
            Some(Operand::Str(s)) => Some(s),
            _ => None,
        }
    }
}
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.opcode.mnemonic())?;
        match &self.operand {
            None => Ok(()),
            Some(Operand::Str(s)) => write!(f, " {:?}", s),
            Some(Operand::Int(i)) => write!(f, " {}", i),
            Some(Operand::Member(m)) => write!(f, " {}", m),
            Some(Operand::Target(t)) => write!(f, " IL_{:04}", t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Instruction, OpCode, Operand};

    #[test]
    /// Only `ldstr` with a string operand yields a literal
    fn test_string_literal() {
        assert_eq!(Instruction::ldstr("dd/MM/yyyy").string_literal(), Some("dd/MM/yyyy"));
        assert_eq!(Instruction::call("System.DateTime::ToString").string_literal(), None);

        // a malformed load with a non-string operand is not a literal
        let odd = Instruction::with_operand(OpCode::Ldstr, Operand::Int(3));
        assert_eq!(odd.string_literal(), None);
        assert_eq!(Instruction::new(OpCode::Ldstr).string_literal(), None);
    }

    #[test]
    /// Disassembly text
    fn test_display() {
        assert_eq!(Instruction::ldstr("yyyy-MM-dd").to_string(), "ldstr \"yyyy-MM-dd\"");
        assert_eq!(Instruction::ret().to_string(), "ret");
        assert_eq!(
            Instruction::with_operand(OpCode::Brtrue, Operand::Target(7)).to_string(),
            "brtrue IL_0007"
        );
    }
}

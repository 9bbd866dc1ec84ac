//! Date-format literal replacement
//!
//! Finds constant string loads whose literal is one of the hard-coded date formats shipped by the
//! host and its companions, and swaps the literal for the configured format.

use crate::code::{Instruction, Operand};
use crate::config::FormatSource;

use super::Transpiler;

/// Hard-coded date formats known to appear in target methods.
///
/// Matching is exact. A host version that ships a third format will not be rewritten until it is
/// added here.
pub const LEGACY_DATE_FORMATS: [&str; 2] = ["dd/MM/yyyy", "yyyy-MM-dd"];

/// Identity recorded for patches made with [`DateFormatTranspiler`]
pub const DATE_FORMAT_TRANSPILER_ID: &str = "ReplaceDateFormatString";

/// Whether `literal` is exactly one of [`LEGACY_DATE_FORMATS`]
pub fn is_legacy_date_format(literal: &str) -> bool {
    LEGACY_DATE_FORMATS.contains(&literal)
}

/// Returns the positions of every constant string load carrying a legacy date format
pub fn find_date_formats(code: &[Instruction]) -> Vec<usize> {
    code.iter()
        .enumerate()
        .filter(|(_, i)| i.string_literal().map_or(false, is_legacy_date_format))
        .map(|(idx, _)| idx)
        .collect()
}

/// Replaces the operand of every matched load with `format`. Never fails, never adds or removes
/// instructions.
pub fn replace_date_formats(mut code: Vec<Instruction>, format: &str) -> Vec<Instruction> {
    for idx in find_date_formats(&code) {
        code[idx].operand = Some(Operand::Str(format.to_owned()));
    }
    code
}

/// Transpiler that replaces legacy date formats with the currently configured one.
///
/// The format is read from the source each time the transpiler runs, not when it is built, so a
/// patch installed after a configuration change picks up the new value.
pub struct DateFormatTranspiler<'a, F: FormatSource + ?Sized> {
    /// Where the replacement format comes from
    source: &'a F,
}
impl<'a, F: FormatSource + ?Sized> DateFormatTranspiler<'a, F> {
    /// Creates a transpiler backed by `source`
    pub fn new(source: &'a F) -> Self {
        Self { source }
    }
}
impl<F: FormatSource + ?Sized> Transpiler for DateFormatTranspiler<'_, F> {
    fn id(&self) -> &str {
        DATE_FORMAT_TRANSPILER_ID
    }

    fn transpile(&self, instructions: Vec<Instruction>) -> Vec<Instruction> {
        let format = self.source.date_format();
        replace_date_formats(instructions, &format)
    }
}

//! Error types for the X bytecode loader.

use thiserror::Error;

/// Errors produced while decoding one line of bytecode text.
///
/// None of these stop a load: the offending line is skipped and the error
/// is kept as a diagnostic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The first token is not an opcode keyword.
    #[error("line {line}: unknown opcode '{token}'")]
    UnknownOpcode { line: usize, token: String },

    /// An opcode did not have enough operands.
    #[error("line {line}: {opcode} expects {expected} operand(s)")]
    MissingOperand {
        line: usize,
        opcode: &'static str,
        expected: usize,
    },

    /// A numeric operand is not an integer or is out of range.
    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },

    /// BOP with an operator outside the operator table.
    #[error("line {line}: unknown operator '{token}'")]
    UnknownOperator { line: usize, token: String },

    /// DUMP with an argument other than ON or OFF.
    #[error("line {line}: DUMP expects ON or OFF, found '{token}'")]
    InvalidDumpMode { line: usize, token: String },
}

impl LoadError {
    /// 1-based line number of the offending line.
    pub fn line(&self) -> usize {
        match self {
            LoadError::UnknownOpcode { line, .. }
            | LoadError::MissingOperand { line, .. }
            | LoadError::InvalidNumber { line, .. }
            | LoadError::UnknownOperator { line, .. }
            | LoadError::InvalidDumpMode { line, .. } => *line,
        }
    }
}

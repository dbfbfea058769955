//! Runtime errors for the X VM.
//!
//! Every error that can be tied to an instruction carries its index
//! (`at`). All of them are fatal: the run loop stops before executing
//! anything else.

use crate::stack::StackError;
use thiserror::Error;

/// Errors that occur during program execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// A run-time stack operation failed.
    #[error("{source} at instruction {at}")]
    Stack { at: usize, source: StackError },

    /// BOP / with a zero right operand.
    #[error("division by zero at instruction {at}")]
    DivisionByZero { at: usize },

    /// The stack grew past `MAX_STACK_DEPTH` slots.
    #[error("stack overflow at instruction {at}")]
    StackOverflow { at: usize },

    /// A jump whose label was never resolved was taken.
    #[error("jump to unresolved label '{label}' at instruction {at}")]
    UnresolvedJump { at: usize, label: String },

    /// RETURN with no saved return address.
    #[error("return without a matching call at instruction {at}")]
    NoReturnAddress { at: usize },

    /// Execution ran past the last instruction without a HALT.
    #[error("program counter {at} is outside the program")]
    ProgramCounterOutOfRange { at: usize },

    /// READ received a line that is not an integer.
    #[error("invalid integer input '{input}' at instruction {at}")]
    InvalidInput { at: usize, input: String },

    /// READ found no more input.
    #[error("end of input at instruction {at}")]
    EndOfInput { at: usize },

    /// Reading input or writing output failed.
    #[error("i/o error at instruction {at}: {message}")]
    Io { at: usize, message: String },
}

impl RuntimeError {
    /// Index of the instruction that failed.
    pub fn at(&self) -> usize {
        match self {
            RuntimeError::Stack { at, .. }
            | RuntimeError::DivisionByZero { at }
            | RuntimeError::StackOverflow { at }
            | RuntimeError::UnresolvedJump { at, .. }
            | RuntimeError::NoReturnAddress { at }
            | RuntimeError::ProgramCounterOutOfRange { at }
            | RuntimeError::InvalidInput { at, .. }
            | RuntimeError::EndOfInput { at }
            | RuntimeError::Io { at, .. } => *at,
        }
    }
}

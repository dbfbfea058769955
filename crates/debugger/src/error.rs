//! Error types for the X debugger.

use thiserror::Error;
use xlang_vm::RuntimeError;

/// Errors from the scoped symbol table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// Lookup of a name with no live binding.
    #[error("'{name}' is not bound in this scope")]
    NotFound { name: String },

    /// More bindings undone than are live.
    #[error("cannot undo {requested} binding(s) with only {available} live")]
    UndoUnderflow { requested: usize, available: usize },
}

/// Errors from the debug engine and its commands.
///
/// `Runtime` and `Scope` end the session; the rest are reported to the
/// user and the session continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DebugError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// Debug bookkeeping for the instruction at `at` failed.
    #[error("{source} at instruction {at}")]
    Scope { at: usize, source: ScopeError },

    #[error("line {line} is outside the source (1 to {count})")]
    LineOutOfRange { line: usize, count: usize },

    /// The line has none of the keywords that mark an executable line.
    #[error("line {line} cannot hold a breakpoint")]
    NotBreakable { line: usize },

    #[error("unknown variable '{name}'")]
    UnknownVariable { name: String },
}

impl DebugError {
    /// True for errors that leave the program unable to continue.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DebugError::Runtime(_) | DebugError::Scope { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_error_display() {
        assert_eq!(
            ScopeError::NotFound { name: "x".into() }.to_string(),
            "'x' is not bound in this scope"
        );
        assert_eq!(
            ScopeError::UndoUnderflow {
                requested: 3,
                available: 1
            }
            .to_string(),
            "cannot undo 3 binding(s) with only 1 live"
        );
    }

    #[test]
    fn debug_error_display() {
        assert_eq!(
            DebugError::LineOutOfRange { line: 40, count: 12 }.to_string(),
            "line 40 is outside the source (1 to 12)"
        );
        assert_eq!(
            DebugError::NotBreakable { line: 5 }.to_string(),
            "line 5 cannot hold a breakpoint"
        );
        assert_eq!(
            DebugError::from(RuntimeError::DivisionByZero { at: 4 }).to_string(),
            "division by zero at instruction 4"
        );
    }

    #[test]
    fn fatality() {
        assert!(DebugError::Runtime(RuntimeError::EndOfInput { at: 0 }).is_fatal());
        assert!(DebugError::Scope {
            at: 2,
            source: ScopeError::UndoUnderflow {
                requested: 1,
                available: 0
            }
        }
        .is_fatal());
        assert!(!DebugError::NotBreakable { line: 1 }.is_fatal());
        assert!(!DebugError::UnknownVariable { name: "q".into() }.is_fatal());
    }
}

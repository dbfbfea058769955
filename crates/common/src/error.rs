//! Address resolution errors for X programs.

use thiserror::Error;

/// Problems found while resolving symbolic jump targets.
///
/// Resolution is best-effort: these are reported alongside the finalized
/// program rather than aborting it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// GOTO, FALSEBRANCH or CALL names a label that is never defined.
    #[error("undefined label '{label}' referenced at instruction {at}")]
    UndefinedLabel { at: usize, label: String },

    /// A label is defined more than once; the first definition is kept.
    #[error("duplicate label '{label}' at instruction {at} (first defined at {first})")]
    DuplicateLabel {
        at: usize,
        label: String,
        first: usize,
    },
}

//! X symbolic debugger.
//!
//! [`DebugVM`] runs a program one instruction at a time on top of the core
//! [`xlang_vm::VM`] and keeps, alongside it:
//! - an environment record per active function (name, line range,
//!   current line, local variables in a [`SymbolTable`])
//! - breakpoints over the companion [`SourceFile`]
//! - a trace log of function entries and exits
//!
//! Step commands ([`StepMode`]) run until their pause condition holds.
//!
//! # Usage
//!
//! ```
//! use xlang_debugger::{DebugVM, SourceFile, StepMode, StepOutcome};
//! use xlang_loader::load;
//! use xlang_vm::Io;
//!
//! let loaded = load("LINE 1\nFUNCTION main 1 2\nLINE 2\nLIT 3 x\nHALT\n");
//! let source = SourceFile::from_text("program {\nint x\n}\n");
//! let mut dvm = DebugVM::new(&loaded.program, source, Io::new(std::io::empty(), std::io::sink()));
//!
//! dvm.set_breakpoint(2).unwrap();
//! assert_eq!(dvm.run_step(StepMode::Continue).unwrap(), StepOutcome::Paused);
//! assert_eq!(dvm.current_line(), 2);
//! assert_eq!(dvm.run_step(StepMode::Continue).unwrap(), StepOutcome::Finished);
//! assert_eq!(dvm.value_of("x").unwrap(), 3);
//! ```

pub mod environment;
pub mod error;
pub mod machine;
pub mod scope;
pub mod source;
pub mod stepping;

pub use environment::EnvironmentRecord;
pub use error::{DebugError, ScopeError};
pub use machine::DebugVM;
pub use scope::SymbolTable;
pub use source::SourceFile;
pub use stepping::{StepMode, StepOutcome};

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_name() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["a", "b", "c", "i", "n"]).prop_map(str::to_string)
    }

    proptest! {
        /// Undoing the last `k` bindings leaves the table answering exactly
        /// as if only the first `len - k` had been entered.
        #[test]
        fn undo_matches_replay(
            names in prop::collection::vec(arb_name(), 0..20),
            k in 0usize..25,
        ) {
            let mut table = SymbolTable::new();
            for (offset, name) in names.iter().enumerate() {
                table.enter(name.as_str(), offset);
            }

            if k > names.len() {
                prop_assert!(table.undo(k).is_err());
                prop_assert_eq!(table.len(), names.len());
                return Ok(());
            }

            table.undo(k).unwrap();
            let kept = &names[..names.len() - k];
            prop_assert_eq!(table.len(), kept.len());

            for name in ["a", "b", "c", "i", "n"] {
                let expected = kept.iter().rposition(|n| n == name);
                prop_assert_eq!(table.lookup(name).ok(), expected);
            }
        }
    }
}

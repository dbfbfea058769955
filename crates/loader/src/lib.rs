//! X bytecode loader: text → resolved [`Program`].
//!
//! Loading is best-effort. Lines that do not decode are skipped and kept
//! as [`LoadError`] diagnostics; undefined or duplicate labels are kept as
//! [`ResolveError`]s. A program is always produced.
//!
//! # Usage
//!
//! ```
//! use xlang_loader::load;
//!
//! let loaded = load("LIT 3\nLIT 4\nBOP +\nWRITE\nHALT\n");
//! assert!(loaded.is_clean());
//! assert_eq!(loaded.program.len(), 5);
//! ```

pub mod error;

mod lexer;
mod listing;
mod parser;

pub use error::LoadError;
pub use listing::listing;

use lexer::tokenize_line;
use parser::parse_line;
use tracing::debug;
use xlang_common::{Program, ProgramBuilder, ResolveError};

/// A loaded program plus everything that went wrong loading it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Loaded {
    pub program: Program,
    /// Lines that were skipped, in file order.
    pub diagnostics: Vec<LoadError>,
    /// Label problems found during address resolution.
    pub resolve_errors: Vec<ResolveError>,
}

impl Loaded {
    /// True when every line decoded and every label resolved.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty() && self.resolve_errors.is_empty()
    }
}

/// Decode bytecode text and resolve its jump targets.
pub fn load(text: &str) -> Loaded {
    let mut builder = ProgramBuilder::new();
    let mut diagnostics = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        match parse_line(&tokenize_line(line), line_num) {
            Ok(Some(instr)) => builder.push(instr),
            Ok(None) => {}
            Err(e) => {
                debug!(line = line_num, "skipping line: {e}");
                diagnostics.push(e);
            }
        }
    }

    let (program, resolve_errors) = builder.finalize();
    debug!(
        instructions = program.len(),
        skipped = diagnostics.len(),
        unresolved = resolve_errors.len(),
        "loaded program"
    );
    Loaded {
        program,
        diagnostics,
        resolve_errors,
    }
}

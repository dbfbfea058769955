//! Per-activation debugger state.

use crate::scope::SymbolTable;
use xlang_common::display_name;

/// Name used for the record that stands for the whole program.
pub const MAIN: &str = "main";

/// One active function activation: name, source range, current line and
/// local variable bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentRecord {
    name: String,
    start: i32,
    end: i32,
    current_line: i32,
    pub(crate) symbols: SymbolTable,
}

impl EnvironmentRecord {
    /// A record for `name` covering lines `start..=end`, positioned at
    /// `current_line`.
    pub fn new(name: impl Into<String>, start: i32, end: i32, current_line: i32) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            current_line,
            symbols: SymbolTable::new(),
        }
    }

    /// The program-wide record: every source line, starting at line 1.
    pub fn main(line_count: usize) -> Self {
        let end = i32::try_from(line_count).unwrap_or(i32::MAX);
        Self::new(MAIN, 1, end, 1)
    }

    /// Name as written in the bytecode.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without the compiler's `<<n>>` suffix.
    pub fn display_name(&self) -> &str {
        display_name(&self.name)
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    pub fn current_line(&self) -> i32 {
        self.current_line
    }

    pub(crate) fn set_current_line(&mut self, line: i32) {
        self.current_line = line;
    }

    /// Built-in functions such as Read and Write have no source lines.
    pub fn is_intrinsic(&self) -> bool {
        self.start <= 0
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }
}

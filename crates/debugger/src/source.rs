//! Companion source text and its breakpoints.
//!
//! Lines are numbered from 1 to match the LINE markers in the bytecode.

use crate::error::DebugError;
use std::collections::BTreeSet;

/// A line may hold a breakpoint only if its text contains one of these.
pub const BREAKABLE_KEYWORDS: [&str; 7] = ["int", "boolean", "if", "while", "=", "{", "return"];

/// Source lines plus the set of lines marked as breakpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFile {
    lines: Vec<String>,
    breakpoints: BTreeSet<usize>,
}

impl SourceFile {
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
            breakpoints: BTreeSet::new(),
        }
    }

    /// Number of source lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Text of 1-based line `n`.
    pub fn line(&self, n: usize) -> Option<&str> {
        n.checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(String::as_str)
    }

    /// Whether `text` looks like an executable line.
    pub fn is_breakable(text: &str) -> bool {
        BREAKABLE_KEYWORDS.iter().any(|kw| text.contains(kw))
    }

    /// Mark line `n` as a breakpoint.
    pub fn set_breakpoint(&mut self, n: usize) -> Result<(), DebugError> {
        let text = self.checked_line(n)?;
        if !Self::is_breakable(text) {
            return Err(DebugError::NotBreakable { line: n });
        }
        self.breakpoints.insert(n);
        Ok(())
    }

    /// Unmark line `n`. Clearing a line that is not a breakpoint is fine.
    pub fn clear_breakpoint(&mut self, n: usize) -> Result<(), DebugError> {
        self.checked_line(n)?;
        self.breakpoints.remove(&n);
        Ok(())
    }

    /// Whether the line a LINE marker reported is a breakpoint.
    pub fn is_breakpoint(&self, line: i32) -> bool {
        usize::try_from(line).is_ok_and(|n| self.breakpoints.contains(&n))
    }

    /// Breakpoint lines in ascending order.
    pub fn breakpoints(&self) -> impl Iterator<Item = usize> + '_ {
        self.breakpoints.iter().copied()
    }

    fn checked_line(&self, n: usize) -> Result<&str, DebugError> {
        self.line(n).ok_or(DebugError::LineOutOfRange {
            line: n,
            count: self.len(),
        })
    }
}

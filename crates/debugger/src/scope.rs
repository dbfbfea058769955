//! Reversible, shadowing map from variable names to stack offsets.
//!
//! Each name maps to its most recent binding. A binding remembers the
//! binding it shadowed and the name that was on top before it, so the
//! last `n` insertions can be undone exactly, in reverse order, without
//! scanning the table.

use crate::error::ScopeError;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Binder {
    offset: usize,
    /// Name that was topmost before this binding was entered.
    prev_top: Option<String>,
    /// Earlier binding of the same name.
    shadowed: Option<Box<Binder>>,
}

/// Variable bindings of one function activation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: HashMap<String, Binder>,
    top: Option<String>,
    /// Live bindings, shadowed ones included.
    live: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `offset`, shadowing any current binding.
    pub fn enter(&mut self, name: impl Into<String>, offset: usize) {
        let name = name.into();
        let shadowed = self.symbols.remove(&name).map(Box::new);
        let prev_top = self.top.replace(name.clone());
        self.symbols.insert(
            name,
            Binder {
                offset,
                prev_top,
                shadowed,
            },
        );
        self.live += 1;
    }

    /// Undo the `n` most recent bindings, restoring what they shadowed.
    ///
    /// Fails without changing anything when fewer than `n` are live.
    pub fn undo(&mut self, n: usize) -> Result<(), ScopeError> {
        if n > self.live {
            return Err(ScopeError::UndoUnderflow {
                requested: n,
                available: self.live,
            });
        }
        for _ in 0..n {
            let Some(name) = self.top.take() else {
                break;
            };
            let Some(binder) = self.symbols.remove(&name) else {
                break;
            };
            if let Some(prev) = binder.shadowed {
                self.symbols.insert(name, *prev);
            }
            self.top = binder.prev_top;
            self.live -= 1;
        }
        Ok(())
    }

    /// Offset of the current binding of `name`.
    pub fn lookup(&self, name: &str) -> Result<usize, ScopeError> {
        self.symbols
            .get(name)
            .map(|binder| binder.offset)
            .ok_or_else(|| ScopeError::NotFound {
                name: name.to_string(),
            })
    }

    /// Visible names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.symbols.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of live bindings, shadowed ones included.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

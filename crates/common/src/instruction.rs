//! Decoded X instructions.
//!
//! Every instruction is one variant of [`Instruction`], holding its decoded
//! operands. Control-transfer instructions carry a [`Jump`] whose `target`
//! is filled in when a [`ProgramBuilder`](crate::ProgramBuilder) is
//! finalized; after that the instruction is never modified.

use crate::opcode::{BinaryOp, Opcode};
use std::fmt;

/// Symbolic branch or call target plus its resolved address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Jump {
    /// Label or function name as written in the bytecode.
    pub label: String,
    /// Absolute instruction index, `None` until resolved.
    pub target: Option<usize>,
}

impl Jump {
    /// An unresolved jump to `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: None,
        }
    }

    /// A jump already resolved to `target`.
    pub fn resolved(label: impl Into<String>, target: usize) -> Self {
        Self {
            label: label.into(),
            target: Some(target),
        }
    }

    /// `name<<target>>` when resolved, the bare label otherwise.
    pub fn describe(&self) -> String {
        match self.target {
            Some(target) => format!("{}<<{target}>>", display_name(&self.label)),
            None => self.label.clone(),
        }
    }
}

/// Strip the compiler's `<<n>>` disambiguation suffix from a name.
///
/// The X compiler names labels and functions like `fib<<3>>`; users only
/// want to see `fib`.
pub fn display_name(name: &str) -> &str {
    match name.find("<<") {
        Some(pos) => &name[..pos],
        None => name,
    }
}

/// A single decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Instruction {
    Args { count: usize },
    Bop(BinaryOp),
    Call(Jump),
    FalseBranch(Jump),
    Goto(Jump),
    Halt,
    Label { name: String },
    Lit { value: i32, name: Option<String> },
    Load { offset: usize, name: String },
    Pop { count: usize },
    Read,
    Return { name: Option<String> },
    Store { offset: usize, name: String },
    Write,
    Dump { enabled: bool },
    Formal { name: String, offset: usize },
    Function { name: String, start: i32, end: i32 },
    Line { line: i32 },
}

impl Instruction {
    /// The opcode this instruction was decoded from.
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Args { .. } => Opcode::Args,
            Instruction::Bop(_) => Opcode::Bop,
            Instruction::Call(_) => Opcode::Call,
            Instruction::FalseBranch(_) => Opcode::FalseBranch,
            Instruction::Goto(_) => Opcode::Goto,
            Instruction::Halt => Opcode::Halt,
            Instruction::Label { .. } => Opcode::Label,
            Instruction::Lit { .. } => Opcode::Lit,
            Instruction::Load { .. } => Opcode::Load,
            Instruction::Pop { .. } => Opcode::Pop,
            Instruction::Read => Opcode::Read,
            Instruction::Return { .. } => Opcode::Return,
            Instruction::Store { .. } => Opcode::Store,
            Instruction::Write => Opcode::Write,
            Instruction::Dump { .. } => Opcode::Dump,
            Instruction::Formal { .. } => Opcode::Formal,
            Instruction::Function { .. } => Opcode::Function,
            Instruction::Line { .. } => Opcode::Line,
        }
    }

    /// The jump carried by GOTO, FALSEBRANCH and CALL.
    pub fn jump(&self) -> Option<&Jump> {
        match self {
            Instruction::Call(jump) | Instruction::FalseBranch(jump) | Instruction::Goto(jump) => {
                Some(jump)
            }
            _ => None,
        }
    }

    /// The name this instruction defines as a branch or call target.
    ///
    /// LABEL defines its name; FUNCTION defines the function name so calls
    /// can land directly on the entry marker.
    pub fn defined_name(&self) -> Option<&str> {
        match self {
            Instruction::Label { name } | Instruction::Function { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Replace this instruction's jump target, consuming it.
    pub(crate) fn with_target(self, target: Option<usize>) -> Self {
        match self {
            Instruction::Call(jump) => Instruction::Call(Jump { target, ..jump }),
            Instruction::FalseBranch(jump) => Instruction::FalseBranch(Jump { target, ..jump }),
            Instruction::Goto(jump) => Instruction::Goto(Jump { target, ..jump }),
            other => other,
        }
    }
}

impl fmt::Display for Instruction {
    /// Canonical bytecode text for the instruction.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.opcode();
        match self {
            Instruction::Args { count } | Instruction::Pop { count } => write!(f, "{op} {count}"),
            Instruction::Bop(bop) => write!(f, "{op} {bop}"),
            Instruction::Call(jump) | Instruction::FalseBranch(jump) | Instruction::Goto(jump) => {
                write!(f, "{op} {}", jump.label)
            }
            Instruction::Label { name } => write!(f, "{op} {name}"),
            Instruction::Lit { value, name } => match name {
                Some(name) => write!(f, "{op} {value} {name}"),
                None => write!(f, "{op} {value}"),
            },
            Instruction::Load { offset, name } | Instruction::Store { offset, name } => {
                write!(f, "{op} {offset} {name}")
            }
            Instruction::Return { name } => match name {
                Some(name) => write!(f, "{op} {name}"),
                None => write!(f, "{op}"),
            },
            Instruction::Dump { enabled } => {
                write!(f, "{op} {}", if *enabled { "ON" } else { "OFF" })
            }
            Instruction::Formal { name, offset } => write!(f, "{op} {name} {offset}"),
            Instruction::Function { name, start, end } => write!(f, "{op} {name} {start} {end}"),
            Instruction::Line { line } => write!(f, "{op} {line}"),
            Instruction::Halt | Instruction::Read | Instruction::Write => write!(f, "{op}"),
        }
    }
}

//! X bytecode common types and address resolution.
//!
//! This crate provides the foundational data structures shared by the
//! loader, the virtual machine and the debugger:
//!
//! - [`Opcode`] and [`BinaryOp`]: the fixed keyword and operator tables
//! - [`Instruction`]: one decoded instruction, a closed sum type
//! - [`ProgramBuilder`] and [`Program`]: two-pass construction, then an
//!   immutable resolved instruction sequence
//! - [`ResolveError`]: problems found while resolving jump targets

pub mod error;
pub mod instruction;
pub mod opcode;
pub mod program;

// Re-export commonly used types at the crate root.
pub use error::ResolveError;
pub use instruction::{display_name, Instruction, Jump};
pub use opcode::{BinaryOp, Opcode};
pub use program::{Program, ProgramBuilder};

//! X virtual machine: executes resolved X bytecode.
//!
//! The VM is a stack machine with:
//! - A frame-structured run-time stack of `i32` slots
//! - A return-address stack for CALL and RETURN
//! - A DUMP diagnostic that prints each instruction and the stack layout
//!
//! Debug markers (FORMAL, FUNCTION, LINE) and LABEL do nothing here; the
//! debugger layers its bookkeeping on top of [`VM::step`].
//!
//! # Usage
//!
//! ```
//! use xlang_common::{BinaryOp, Instruction, Program};
//! use xlang_vm::{run, Io};
//!
//! let program = Program::resolve(vec![
//!     Instruction::Lit { value: 3, name: None },
//!     Instruction::Lit { value: 4, name: None },
//!     Instruction::Bop(BinaryOp::Add),
//!     Instruction::Write,
//!     Instruction::Halt,
//! ])
//! .unwrap();
//!
//! let mut out = Vec::new();
//! run(&program, Io::new(std::io::empty(), &mut out)).unwrap();
//! assert_eq!(String::from_utf8(out).unwrap(), "7\n");
//! ```

pub mod error;
pub mod execute;
pub mod machine;
pub mod stack;

pub use error::RuntimeError;
pub use machine::{Io, MAX_STACK_DEPTH, VM};
pub use stack::{RunTimeStack, StackError};

use tracing::debug;
use xlang_common::Program;

/// Execute a program until HALT.
///
/// READ consumes lines from `io`'s input; WRITE and DUMP output go to
/// its output.
///
/// # Errors
///
/// Returns [`RuntimeError`] if execution fails (division by zero, stack
/// underflow, bad input, running off the end of the program, etc.).
pub fn run(program: &Program, io: Io<'_>) -> Result<(), RuntimeError> {
    debug!(instructions = program.len(), "run");
    let mut vm = VM::new(program, io);
    vm.execute()
}

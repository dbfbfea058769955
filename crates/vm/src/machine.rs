//! VM state management: program counter, run-time stack, return
//! addresses, dump flags and I/O.

use crate::error::RuntimeError;
use crate::stack::{RunTimeStack, StackError};
use std::io::{self, BufRead, Write};
use xlang_common::{Instruction, Program};

/// Maximum number of slots the run-time stack may hold.
pub const MAX_STACK_DEPTH: usize = 65_536;

/// Input and output handles owned by a running VM.
///
/// READ consumes lines from `input`; WRITE and the dump diagnostic write
/// to `output`. The debugger console reads its commands through the same
/// handles via [`VM::io_mut`].
pub struct Io<'a> {
    input: Box<dyn BufRead + 'a>,
    output: Box<dyn Write + 'a>,
}

impl<'a> Io<'a> {
    pub fn new(input: impl BufRead + 'a, output: impl Write + 'a) -> Self {
        Self {
            input: Box::new(input),
            output: Box::new(output),
        }
    }

    /// Read one line without its line terminator. `None` at end of input.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    pub fn output(&mut self) -> &mut (dyn Write + 'a) {
        &mut *self.output
    }
}

impl Io<'static> {
    /// Process stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

/// The X virtual machine.
pub struct VM<'a> {
    /// The program being executed.
    pub(crate) program: &'a Program,
    /// Value slots and frame bases.
    pub(crate) stack: RunTimeStack,
    /// Saved program counters, one per active call.
    pub(crate) return_addrs: Vec<usize>,
    /// Program counter (instruction index).
    pub(crate) pc: usize,
    /// Cleared by HALT.
    pub(crate) running: bool,
    /// Set by DUMP ON, cleared by DUMP OFF.
    pub(crate) dumping: bool,
    /// Keeps the DUMP OFF instruction itself in the dump output.
    pub(crate) was_dumping: bool,
    /// Makes DUMP a no-op.
    pub(crate) dump_suppressed: bool,
    pub(crate) io: Io<'a>,
}

impl<'a> VM<'a> {
    /// Create a VM positioned at the first instruction of `program`.
    pub fn new(program: &'a Program, io: Io<'a>) -> Self {
        Self {
            program,
            stack: RunTimeStack::new(),
            return_addrs: Vec::new(),
            pc: 0,
            running: true,
            dumping: false,
            was_dumping: false,
            dump_suppressed: false,
            io,
        }
    }

    pub fn program(&self) -> &'a Program {
        self.program
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    /// False once HALT has executed.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop the run loop before the next instruction.
    pub fn halt(&mut self) {
        self.running = false;
    }

    pub fn stack(&self) -> &RunTimeStack {
        &self.stack
    }

    /// Number of calls that have not yet returned.
    pub fn call_depth(&self) -> usize {
        self.return_addrs.len()
    }

    pub fn is_dumping(&self) -> bool {
        self.dumping
    }

    /// Turn the dump diagnostic on or off.
    pub fn set_dump_mode(&mut self, enabled: bool) {
        self.dumping = enabled;
        if enabled {
            self.was_dumping = true;
        }
    }

    /// Ignore DUMP instructions from now on. Dumping already in progress
    /// stops.
    pub fn suppress_dump(&mut self) {
        self.dump_suppressed = true;
        self.dumping = false;
        self.was_dumping = false;
    }

    pub fn io_mut(&mut self) -> &mut Io<'a> {
        &mut self.io
    }

    /// The instruction at the current pc.
    pub fn current(&self) -> Option<&'a Instruction> {
        self.program.get(self.pc)
    }

    /// Fetch the instruction at the current pc.
    pub(crate) fn fetch(&self) -> Result<&'a Instruction, RuntimeError> {
        self.current()
            .ok_or(RuntimeError::ProgramCounterOutOfRange { at: self.pc })
    }

    /// Push a value, checking for overflow.
    pub(crate) fn push(&mut self, value: i32) -> Result<(), RuntimeError> {
        if self.stack.size() >= MAX_STACK_DEPTH {
            return Err(RuntimeError::StackOverflow { at: self.pc });
        }
        self.stack.push(value);
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Result<i32, RuntimeError> {
        let at = self.pc;
        self.stack
            .pop()
            .map_err(|source| RuntimeError::Stack { at, source })
    }

    pub(crate) fn peek(&self) -> Result<i32, RuntimeError> {
        self.stack
            .peek()
            .map_err(|source| RuntimeError::Stack { at: self.pc, source })
    }

    /// Tag a stack error with the current pc.
    pub(crate) fn stack_error(&self, source: StackError) -> RuntimeError {
        RuntimeError::Stack {
            at: self.pc,
            source,
        }
    }

    pub(crate) fn io_error(&self, e: io::Error) -> RuntimeError {
        RuntimeError::Io {
            at: self.pc,
            message: e.to_string(),
        }
    }
}

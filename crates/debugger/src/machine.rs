//! The debug engine: the core VM plus environment records, breakpoints and
//! a trace log.
//!
//! Every instruction runs through [`VM::step`] first. The debug engine then
//! applies that instruction's bookkeeping, so the core never needs to know
//! it is being debugged.

use crate::environment::EnvironmentRecord;
use crate::error::DebugError;
use crate::source::SourceFile;
use tracing::{debug, trace};
use xlang_common::{display_name, Instruction, Program};
use xlang_vm::{Io, VM};

/// The X debug engine.
pub struct DebugVM<'a> {
    pub(crate) vm: VM<'a>,
    source: SourceFile,
    /// Base record for the whole program first; never empty.
    env: Vec<EnvironmentRecord>,
    /// Set by an accepted line change, consumed by the step loop.
    pub(crate) line_changed: bool,
    tracing: bool,
    trace: String,
    /// The most recently executed instruction.
    pub(crate) last: Option<&'a Instruction>,
}

impl<'a> DebugVM<'a> {
    pub fn new(program: &'a Program, source: SourceFile, io: Io<'a>) -> Self {
        let main = EnvironmentRecord::main(source.len());
        // The console owns the output while debugging.
        let mut vm = VM::new(program, io);
        vm.suppress_dump();
        Self {
            vm,
            source,
            env: vec![main],
            line_changed: false,
            tracing: false,
            trace: String::new(),
            last: None,
        }
    }

    pub fn vm(&self) -> &VM<'a> {
        &self.vm
    }

    pub fn io_mut(&mut self) -> &mut Io<'a> {
        self.vm.io_mut()
    }

    pub fn is_running(&self) -> bool {
        self.vm.is_running()
    }

    /// Stop the program; no further instruction runs.
    pub fn halt(&mut self) {
        self.vm.halt();
    }

    /// Execute one instruction and its debug bookkeeping.
    pub fn step_instruction(&mut self) -> Result<&'a Instruction, DebugError> {
        let at = self.vm.pc();
        let instr = self.vm.step()?;
        self.last = Some(instr);

        match instr {
            Instruction::Lit {
                name: Some(name), ..
            } => {
                let offset = self.vm.stack().size().saturating_sub(1);
                self.top_mut().symbols.enter(name.as_str(), offset);
            }
            Instruction::Pop { count } => {
                self.top_mut()
                    .symbols
                    .undo(*count)
                    .map_err(|source| DebugError::Scope { at, source })?;
            }
            Instruction::Formal { name, offset } => {
                let offset = self.vm.stack().frame_base() + offset;
                self.top_mut().symbols.enter(name.as_str(), offset);
            }
            Instruction::Function { name, start, end } => {
                self.enter_function(name, *start, *end);
            }
            Instruction::Line { line } => self.set_current_line(*line),
            Instruction::Return { .. } => self.exit_function(),
            _ => {}
        }
        Ok(instr)
    }

    /// Push a record for a function that was just entered.
    fn enter_function(&mut self, name: &str, start: i32, end: i32) {
        let caller_line = self.current_line();
        self.env
            .push(EnvironmentRecord::new(name, start, end, caller_line));
        debug!(function = name, depth = self.env.len(), "enter function");
        self.set_current_line(start);

        if self.tracing {
            let args: Vec<String> = self
                .vm
                .stack()
                .frame_values()
                .iter()
                .map(i32::to_string)
                .collect();
            self.log_trace(&format!("{}({})", display_name(name), args.join(",")));
        }
    }

    /// Pop the record of a function that just returned.
    fn exit_function(&mut self) {
        if self.tracing {
            let value = self
                .vm
                .stack()
                .peek()
                .map_or_else(|_| "?".to_string(), |v| v.to_string());
            let line = format!("exit: {}: {value}", self.current_function().display_name());
            self.log_trace(&line);
        }
        // The base record outlives every return.
        if self.env.len() > 1 {
            self.env.pop();
        }
        debug!(depth = self.env.len(), "exit function");
    }

    fn log_trace(&mut self, line: &str) {
        for _ in 0..self.env.len() {
            self.trace.push(' ');
        }
        self.trace.push_str(line);
        self.trace.push('\n');
    }

    /// Move the current record to `line`.
    ///
    /// Ignored for negative lines, and while the record stack and the
    /// run-time frames are out of step (a callee's markers that run before
    /// its FUNCTION marker).
    pub(crate) fn set_current_line(&mut self, line: i32) {
        let in_step = self.env.len() == self.vm.stack().frame_count() + 1;
        if line < 0 || !in_step {
            trace!(line, in_step, "line change ignored");
            return;
        }
        self.top_mut().set_current_line(line);
        self.line_changed = true;
    }

    fn top_mut(&mut self) -> &mut EnvironmentRecord {
        let last = self.env.len() - 1;
        &mut self.env[last]
    }

    // ---- Introspection ----

    /// Number of environment records, the base record included.
    pub fn depth(&self) -> usize {
        self.env.len()
    }

    /// The innermost active record.
    pub fn current_function(&self) -> &EnvironmentRecord {
        &self.env[self.env.len() - 1]
    }

    pub fn current_line(&self) -> i32 {
        self.current_function().current_line()
    }

    /// Active function records, innermost first, without the base record.
    pub fn call_stack(&self) -> impl Iterator<Item = &EnvironmentRecord> + '_ {
        self.env.iter().skip(1).rev()
    }

    /// Variables visible in the current function, sorted by name, with the
    /// value each one currently holds on the run-time stack.
    pub fn variables(&self) -> Vec<(&str, Option<i32>)> {
        let symbols = &self.current_function().symbols;
        symbols
            .names()
            .into_iter()
            .map(|name| {
                let value = symbols
                    .lookup(name)
                    .ok()
                    .and_then(|offset| self.vm.stack().slot(offset));
                (name, value)
            })
            .collect()
    }

    /// Current value of variable `name` in the current function.
    pub fn value_of(&self, name: &str) -> Result<i32, DebugError> {
        let unknown = || DebugError::UnknownVariable {
            name: name.to_string(),
        };
        let offset = self
            .current_function()
            .symbols
            .lookup(name)
            .map_err(|_| unknown())?;
        self.vm.stack().slot(offset).ok_or_else(unknown)
    }

    pub fn source(&self) -> &SourceFile {
        &self.source
    }

    pub fn set_breakpoint(&mut self, line: usize) -> Result<(), DebugError> {
        self.source.set_breakpoint(line)
    }

    pub fn clear_breakpoint(&mut self, line: usize) -> Result<(), DebugError> {
        self.source.clear_breakpoint(line)
    }

    pub fn is_breakpoint(&self, line: i32) -> bool {
        self.source.is_breakpoint(line)
    }

    // ---- Tracing ----

    /// Turn function entry/exit tracing on or off. Turning it on starts a
    /// fresh log.
    pub fn set_tracing(&mut self, enabled: bool) {
        self.tracing = enabled;
        if enabled {
            self.trace.clear();
        }
    }

    pub fn is_tracing(&self) -> bool {
        self.tracing
    }

    /// Everything traced since tracing was turned on or last drained.
    pub fn trace_log(&self) -> &str {
        &self.trace
    }

    /// Drain the trace log.
    pub fn take_trace(&mut self) -> String {
        std::mem::take(&mut self.trace)
    }
}

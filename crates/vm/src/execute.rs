//! Main execution loop and instruction dispatch for the X VM.

use crate::error::RuntimeError;
use crate::machine::VM;
use tracing::{debug, trace};
use xlang_common::{display_name, BinaryOp, Instruction, Jump};

const READ_PROMPT: &str = "Input an integer: ";

impl<'a> VM<'a> {
    /// Execute the program until HALT or error.
    pub fn execute(&mut self) -> Result<(), RuntimeError> {
        while self.running {
            self.step()?;
        }
        Ok(())
    }

    /// Fetch, execute and retire one instruction.
    ///
    /// Returns the instruction that ran. The pc advances by one afterwards
    /// unless the instruction was a CALL, which has already moved the pc
    /// to the callee.
    pub fn step(&mut self) -> Result<&'a Instruction, RuntimeError> {
        let instr = self.fetch()?;
        trace!(pc = self.pc, %instr, "execute");

        let advance = self.dispatch(instr)?;

        if self.dumping || self.was_dumping {
            self.dump(instr)?;
            if !self.dumping {
                self.was_dumping = false;
            }
        }

        if advance {
            self.pc += 1;
        }
        Ok(instr)
    }

    /// Execute one instruction. Returns false when the pc must not advance.
    fn dispatch(&mut self, instr: &'a Instruction) -> Result<bool, RuntimeError> {
        match instr {
            Instruction::Args { count } => {
                let count = *count;
                self.stack
                    .new_frame_at(count)
                    .map_err(|e| self.stack_error(e))?;
            }
            Instruction::Bop(op) => self.exec_bop(*op)?,
            Instruction::Call(jump) => {
                self.exec_call(jump)?;
                return Ok(false);
            }
            Instruction::FalseBranch(jump) => {
                if self.pop()? == 0 {
                    self.pc = self.target(jump)?;
                }
            }
            Instruction::Goto(jump) => self.pc = self.target(jump)?,
            Instruction::Halt => {
                debug!(pc = self.pc, "halt");
                self.running = false;
            }
            Instruction::Lit { value, .. } => self.push(*value)?,
            Instruction::Load { offset, .. } => {
                if self.stack.size() >= crate::MAX_STACK_DEPTH {
                    return Err(RuntimeError::StackOverflow { at: self.pc });
                }
                let offset = *offset;
                self.stack.load(offset).map_err(|e| self.stack_error(e))?;
            }
            Instruction::Pop { count } => {
                self.stack.pop_n(*count);
            }
            Instruction::Read => self.exec_read()?,
            Instruction::Return { .. } => self.exec_return()?,
            Instruction::Store { offset, .. } => {
                let offset = *offset;
                self.stack.store(offset).map_err(|e| self.stack_error(e))?;
            }
            Instruction::Write => {
                let value = self.peek()?;
                writeln!(self.io.output(), "{value}").map_err(|e| self.io_error(e))?;
            }
            Instruction::Dump { enabled } => {
                if !self.dump_suppressed {
                    self.set_dump_mode(*enabled);
                }
            }
            // Markers: the debugger gives these meaning.
            Instruction::Label { .. }
            | Instruction::Formal { .. }
            | Instruction::Function { .. }
            | Instruction::Line { .. } => {}
        }
        Ok(true)
    }

    fn target(&self, jump: &Jump) -> Result<usize, RuntimeError> {
        jump.target.ok_or_else(|| RuntimeError::UnresolvedJump {
            at: self.pc,
            label: jump.label.clone(),
        })
    }

    /// Pop the right operand, then the left, push `left op right`.
    fn exec_bop(&mut self, op: BinaryOp) -> Result<(), RuntimeError> {
        let right = self.pop()?;
        let left = self.pop()?;
        let result = op
            .apply(left, right)
            .ok_or(RuntimeError::DivisionByZero { at: self.pc })?;
        self.push(result)
    }

    fn exec_call(&mut self, jump: &Jump) -> Result<(), RuntimeError> {
        let target = self.target(jump)?;
        self.return_addrs.push(self.pc);
        debug!(
            from = self.pc,
            to = target,
            depth = self.return_addrs.len(),
            "call {}",
            display_name(&jump.label)
        );
        self.pc = target;
        Ok(())
    }

    /// Reset the frame to its return value and resume after the CALL.
    fn exec_return(&mut self) -> Result<(), RuntimeError> {
        if self.return_addrs.is_empty() {
            return Err(RuntimeError::NoReturnAddress { at: self.pc });
        }
        let value = self.stack.reset().map_err(|e| self.stack_error(e))?;
        let return_pc = self
            .return_addrs
            .pop()
            .ok_or(RuntimeError::NoReturnAddress { at: self.pc })?;
        debug!(
            from = self.pc,
            to = return_pc,
            value,
            depth = self.return_addrs.len(),
            "return"
        );
        self.pc = return_pc;
        Ok(())
    }

    fn exec_read(&mut self) -> Result<(), RuntimeError> {
        write!(self.io.output(), "{READ_PROMPT}").map_err(|e| self.io_error(e))?;
        self.io.output().flush().map_err(|e| self.io_error(e))?;

        let line = self
            .io
            .read_line()
            .map_err(|e| self.io_error(e))?
            .ok_or(RuntimeError::EndOfInput { at: self.pc })?;
        let value = line
            .trim()
            .parse::<i32>()
            .map_err(|_| RuntimeError::InvalidInput {
                at: self.pc,
                input: line.clone(),
            })?;
        self.push(value)
    }

    /// Print the dump line for `instr` and the stack layout.
    fn dump(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let line = self.dump_line(instr);
        let layout = self.stack.to_string();
        writeln!(self.io.output(), "{line}\n{layout}").map_err(|e| self.io_error(e))
    }

    /// Text shown for `instr` in the dump, annotated with the state it
    /// just produced. Called before the pc advances.
    pub fn dump_line(&self, instr: &Instruction) -> String {
        match instr {
            Instruction::Lit {
                value,
                name: Some(name),
            } => format!("LIT {value} {name}\tint {name}"),
            Instruction::Load { offset, name } => format!("LOAD {offset} {name}\t<load {name}>"),
            Instruction::Store { offset, name } => {
                let stored = self
                    .stack
                    .slot(self.stack.frame_base() + offset)
                    .map_or_else(|| "?".to_string(), |v| v.to_string());
                format!("STORE {offset} {name}\t{name} = {stored}")
            }
            Instruction::Call(jump) => {
                let args: Vec<String> = self
                    .stack
                    .frame_values()
                    .iter()
                    .map(i32::to_string)
                    .collect();
                format!(
                    "CALL {}\t{}({})",
                    jump.describe(),
                    display_name(&jump.label),
                    args.join(",")
                )
            }
            Instruction::Return { name: Some(name) } => {
                // The pc has moved back to the CALL that is being returned from.
                let callee = self
                    .program
                    .get(self.pc)
                    .and_then(Instruction::jump)
                    .map_or_else(|| name.clone(), Jump::describe);
                let value = self
                    .stack
                    .peek()
                    .map_or_else(|_| "?".to_string(), |v| v.to_string());
                format!("RETURN {callee}\texit: {value}")
            }
            Instruction::Goto(jump) | Instruction::FalseBranch(jump) => {
                format!("{} {}", instr.opcode(), jump.describe())
            }
            other => other.to_string(),
        }
    }
}

//! The stepping state machine.

use crate::error::DebugError;
use crate::machine::DebugVM;
use std::fmt;
use tracing::debug;
use xlang_common::Instruction;

/// How far a step command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepMode {
    /// Until a breakpoint line is reached.
    Continue,
    /// Until a function is entered.
    Into,
    /// Until the source line changes.
    Over,
    /// Until the current function returns.
    Out,
}

impl fmt::Display for StepMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StepMode::Continue => "continue",
            StepMode::Into => "into",
            StepMode::Over => "over",
            StepMode::Out => "out",
        })
    }
}

/// Why a step command returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The pause condition was met; the program can keep going.
    Paused,
    /// The program executed HALT.
    Finished,
}

impl<'a> DebugVM<'a> {
    /// Run instructions until `mode`'s pause condition holds or the
    /// program halts.
    ///
    /// The condition is checked before every instruction, and each check
    /// consumes the line-changed flag, so a pause fires at most once per
    /// arrival on a line.
    pub fn run_step(&mut self, mode: StepMode) -> Result<StepOutcome, DebugError> {
        let start_depth = self.depth();
        debug!(%mode, depth = start_depth, line = self.current_line(), "step");

        while self.is_running() && self.keep_going(mode, start_depth) {
            self.step_instruction()?;
        }

        let outcome = if self.is_running() {
            StepOutcome::Paused
        } else {
            StepOutcome::Finished
        };
        debug!(?outcome, depth = self.depth(), line = self.current_line(), "step done");
        Ok(outcome)
    }

    fn keep_going(&mut self, mode: StepMode, start_depth: usize) -> bool {
        let changed = std::mem::take(&mut self.line_changed);
        let arrived = changed && self.is_breakpoint(self.current_line());
        let depth = self.depth();

        match mode {
            StepMode::Continue => !arrived,
            StepMode::Out => depth >= start_depth && !arrived,
            StepMode::Into => {
                if depth > start_depth {
                    // Land on the callee's first line, not its entry marker,
                    // even when that marker arrives on a breakpoint.
                    self.just_entered_function()
                } else {
                    !arrived
                }
            }
            StepMode::Over => !changed,
        }
    }

    fn just_entered_function(&self) -> bool {
        matches!(self.last, Some(Instruction::Function { .. }))
            && !self.current_function().is_intrinsic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceFile;
    use std::io;
    use xlang_common::{Jump, Program};
    use xlang_vm::Io;

    const SOURCE: &str = "program {\nint f(int n) {\nreturn n }\nint x = f(1)\n}\n";

    /// main at lines 1..5 calling f (lines 2..3) from line 4.
    fn program() -> Program {
        Program::resolve(vec![
            Instruction::Goto(Jump::new("start")),
            Instruction::Label { name: "f".into() },
            Instruction::Line { line: 2 },
            Instruction::Function {
                name: "f".into(),
                start: 2,
                end: 3,
            },
            Instruction::Formal {
                name: "n".into(),
                offset: 0,
            },
            Instruction::Line { line: 3 },
            Instruction::Load {
                offset: 0,
                name: "n".into(),
            },
            Instruction::Return {
                name: Some("f".into()),
            },
            Instruction::Label {
                name: "start".into(),
            },
            Instruction::Line { line: 1 },
            Instruction::Function {
                name: "main".into(),
                start: 1,
                end: 5,
            },
            Instruction::Line { line: 4 },
            Instruction::Lit { value: 1, name: None },
            Instruction::Args { count: 1 },
            Instruction::Call(Jump::new("f")),
            Instruction::Lit {
                value: 0,
                name: Some("x".into()),
            },
            Instruction::Line { line: 5 },
            Instruction::Halt,
        ])
        .unwrap()
    }

    fn session(program: &Program) -> DebugVM<'_> {
        DebugVM::new(
            program,
            SourceFile::from_text(SOURCE),
            Io::new(io::empty(), io::sink()),
        )
    }

    #[test]
    fn continue_without_breakpoints_finishes() {
        let program = program();
        let mut dvm = session(&program);
        assert_eq!(dvm.run_step(StepMode::Continue), Ok(StepOutcome::Finished));
        assert!(!dvm.is_running());
    }

    #[test]
    fn continue_stops_on_breakpoint_arrival_once() {
        let program = program();
        let mut dvm = session(&program);
        dvm.set_breakpoint(3).unwrap();

        assert_eq!(dvm.run_step(StepMode::Continue), Ok(StepOutcome::Paused));
        assert_eq!(dvm.current_line(), 3);
        assert_eq!(dvm.current_function().display_name(), "f");

        // Still on line 3, but the arrival was already reported.
        assert_eq!(dvm.run_step(StepMode::Continue), Ok(StepOutcome::Finished));
    }

    #[test]
    fn over_stops_at_each_line_change() {
        let program = program();
        let mut dvm = session(&program);
        let mut lines = Vec::new();
        while dvm.run_step(StepMode::Over) == Ok(StepOutcome::Paused) {
            lines.push(dvm.current_line());
        }
        // Over does not skip the callee.
        assert_eq!(lines, vec![1, 4, 2, 3, 5]);
    }

    #[test]
    fn into_lands_after_function_marker() {
        let program = program();
        let mut dvm = session(&program);

        // From the base record into main.
        assert_eq!(dvm.run_step(StepMode::Into), Ok(StepOutcome::Paused));
        assert_eq!(dvm.depth(), 2);
        assert_eq!(dvm.current_function().name(), "main");
        assert_eq!(dvm.current_line(), 4);
        assert!(matches!(dvm.vm().current(), Some(Instruction::Lit { value: 1, .. })));

        // From main into f.
        assert_eq!(dvm.run_step(StepMode::Into), Ok(StepOutcome::Paused));
        assert_eq!(dvm.depth(), 3);
        assert_eq!(dvm.current_function().name(), "f");
        assert!(matches!(dvm.vm().current(), Some(Instruction::Line { line: 3 })));
    }

    #[test]
    fn out_returns_to_caller() {
        let program = program();
        let mut dvm = session(&program);
        dvm.set_breakpoint(3).unwrap();
        dvm.run_step(StepMode::Continue).unwrap();
        assert_eq!(dvm.depth(), 3);

        assert_eq!(dvm.run_step(StepMode::Out), Ok(StepOutcome::Paused));
        assert_eq!(dvm.depth(), 2);
        assert_eq!(dvm.current_function().name(), "main");
        assert_eq!(dvm.current_line(), 4);
    }

    #[test]
    fn out_is_interrupted_by_breakpoint() {
        let program = program();
        let mut dvm = session(&program);
        dvm.set_breakpoint(4).unwrap();
        dvm.set_breakpoint(3).unwrap();

        // Out of the base record runs until a breakpoint arrives.
        assert_eq!(dvm.run_step(StepMode::Out), Ok(StepOutcome::Paused));
        assert_eq!(dvm.current_line(), 4);
        assert_eq!(dvm.run_step(StepMode::Out), Ok(StepOutcome::Paused));
        assert_eq!(dvm.current_line(), 3);
        assert_eq!(dvm.depth(), 3);
    }

    #[test]
    fn step_mode_display() {
        assert_eq!(StepMode::Continue.to_string(), "continue");
        assert_eq!(StepMode::Out.to_string(), "out");
    }
}

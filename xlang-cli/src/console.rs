//! Interactive debug console.
//!
//! Commands are read one line at a time from the same input the program's
//! READ instructions consume, and everything the console prints goes to the
//! program's output.

use std::fmt;
use std::io::{self, Write};
use thiserror::Error;
use tracing::debug;
use xlang_debugger::{DebugError, DebugVM, StepMode};

const PROMPT: &str = ">> ";
const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J";

const HELP: [(&str, &str); 14] = [
    ("?", "Show a list of available debugging commands."),
    ("b", "Show a list of current breakpoints."),
    ("b <n ...>", "Set a breakpoint at each line n."),
    ("bc <n ...>", "Clear the breakpoint at each line n."),
    ("c", "Continue execution until the next breakpoint."),
    ("f", "Show the source of the current function."),
    ("i", "Step into the next function call; otherwise step over."),
    ("o", "Step out of the current function."),
    ("n", "Step over the current line."),
    ("p", "Print the call stack with the current line of each function."),
    ("t <on|off>", "Turn function call tracing on or off."),
    ("v", "Show the variables of the current function."),
    ("q", "Quit the debugger."),
    ("z", "Clear the screen."),
];

/// One parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    ListBreakpoints,
    SetBreakpoints(Vec<usize>),
    ClearBreakpoints(Vec<usize>),
    Step(StepMode),
    Function,
    CallStack,
    Trace(bool),
    Variables,
    Quit,
    ClearScreen,
}

/// A line that is not a console command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a valid command")]
pub struct InvalidCommand(pub String);

impl Command {
    /// Parse a console line. Commands are case-insensitive.
    pub fn parse(line: &str) -> Result<Command, InvalidCommand> {
        let lower = line.trim().to_lowercase();
        let mut words = lower.split_whitespace();
        let invalid = || InvalidCommand(line.trim().to_string());
        let word = words.next().ok_or_else(invalid)?;
        let args: Vec<&str> = words.collect();

        let command = match (word, args.as_slice()) {
            ("?" | "h" | "help", []) => Command::Help,
            ("b", []) => Command::ListBreakpoints,
            ("b", lines) => Command::SetBreakpoints(parse_lines(lines).ok_or_else(invalid)?),
            ("bc", lines) if !lines.is_empty() => {
                Command::ClearBreakpoints(parse_lines(lines).ok_or_else(invalid)?)
            }
            ("c", []) => Command::Step(StepMode::Continue),
            ("i", []) => Command::Step(StepMode::Into),
            ("o", []) => Command::Step(StepMode::Out),
            ("n", []) => Command::Step(StepMode::Over),
            ("f", []) => Command::Function,
            ("p", []) => Command::CallStack,
            ("t", ["on"]) => Command::Trace(true),
            ("t", ["off"]) => Command::Trace(false),
            ("v", []) => Command::Variables,
            ("q" | "quit", []) => Command::Quit,
            ("z" | "clear", []) => Command::ClearScreen,
            _ => return Err(invalid()),
        };
        Ok(command)
    }
}

fn parse_lines(words: &[&str]) -> Option<Vec<usize>> {
    words.iter().map(|w| w.parse().ok()).collect()
}

/// How a debug session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The program executed HALT.
    Finished,
    /// The user quit, or command input ran out.
    Halted,
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionEnd::Finished => "******Execution Finished******",
            SessionEnd::Halted => "******Execution Halted*******",
        })
    }
}

/// Errors that end a console session early.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("console i/o failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Debug(#[from] DebugError),
}

/// The interactive console, owning the debugger it drives.
pub struct DebugConsole<'a> {
    dvm: DebugVM<'a>,
    quit: bool,
}

impl<'a> DebugConsole<'a> {
    pub fn new(dvm: DebugVM<'a>) -> Self {
        Self { dvm, quit: false }
    }

    /// Prompt for commands until the program halts or the user quits.
    pub fn run(mut self) -> Result<SessionEnd, ConsoleError> {
        self.show_function()?;

        while !self.quit && self.dvm.is_running() {
            self.print(&format!("Type ? for help\n{PROMPT}"))?;
            let Some(line) = self.dvm.io_mut().read_line()? else {
                debug!("command input closed");
                self.halt();
                break;
            };
            match Command::parse(&line) {
                Ok(command) => self.execute(command)?,
                Err(e) => self.print(&format!("error: {e}\n\n"))?,
            }
        }

        let end = if self.quit {
            SessionEnd::Halted
        } else {
            SessionEnd::Finished
        };
        self.print(&format!("{end}\n"))?;
        Ok(end)
    }

    /// Run one command. Only fatal debugger errors are returned; the rest
    /// are reported and the session continues.
    pub fn execute(&mut self, command: Command) -> Result<(), ConsoleError> {
        debug!(?command, "console command");
        match command {
            Command::Help => self.show_help()?,
            Command::ListBreakpoints => self.show_breakpoints()?,
            Command::SetBreakpoints(lines) => self.set_breakpoints(&lines)?,
            Command::ClearBreakpoints(lines) => self.clear_breakpoints(&lines)?,
            Command::Step(mode) => self.step(mode)?,
            Command::Function => self.show_function()?,
            Command::CallStack => self.show_call_stack()?,
            Command::Trace(enabled) => {
                self.dvm.set_tracing(enabled);
                let state = if enabled { "on" } else { "off" };
                self.print(&format!("Tracing {state}\n\n"))?;
            }
            Command::Variables => self.show_variables()?,
            Command::Quit => self.halt(),
            Command::ClearScreen => self.print(CLEAR_SCREEN)?,
        }
        Ok(())
    }

    fn halt(&mut self) {
        self.dvm.halt();
        self.quit = true;
    }

    fn step(&mut self, mode: StepMode) -> Result<(), ConsoleError> {
        let outcome = self.dvm.run_step(mode)?;
        debug!(?outcome, "step finished");
        if self.dvm.is_tracing() {
            let trace = self.dvm.take_trace();
            if !trace.is_empty() {
                self.print(&format!("{trace}\n"))?;
            }
        }
        self.show_function()?;
        Ok(())
    }

    fn set_breakpoints(&mut self, lines: &[usize]) -> io::Result<()> {
        let mut set = Vec::new();
        for &line in lines {
            match self.dvm.set_breakpoint(line) {
                Ok(()) => set.push(line.to_string()),
                Err(e) => self.print(&format!("error: {e}\n"))?,
            }
        }
        if !set.is_empty() {
            self.print(&format!("Breakpoint set: {}\n\n", set.join(" ")))?;
        }
        Ok(())
    }

    fn clear_breakpoints(&mut self, lines: &[usize]) -> io::Result<()> {
        let mut cleared = Vec::new();
        for &line in lines {
            match self.dvm.clear_breakpoint(line) {
                Ok(()) => cleared.push(line.to_string()),
                Err(e) => self.print(&format!("error: {e}\n"))?,
            }
        }
        if !cleared.is_empty() {
            self.print(&format!("Breakpoint cleared: {}\n\n", cleared.join(" ")))?;
        }
        Ok(())
    }

    fn show_help(&mut self) -> io::Result<()> {
        let mut text = format!("{:<20} Description:\n", "Debugger commands:");
        for (command, description) in HELP {
            text.push_str(&format!("{command:<20} -- {description}\n"));
        }
        text.push('\n');
        self.print(&text)
    }

    fn show_breakpoints(&mut self) -> io::Result<()> {
        let lines: Vec<String> = self
            .dvm
            .source()
            .breakpoints()
            .map(|n| n.to_string())
            .collect();
        if lines.is_empty() {
            self.print("No breakpoints currently set.\n\n")
        } else {
            self.print(&format!("Current breakpoints: {}\n\n", lines.join(" ")))
        }
    }

    fn show_function(&mut self) -> io::Result<()> {
        let text = function_window(&self.dvm);
        self.print(&format!("{text}\n"))
    }

    fn show_call_stack(&mut self) -> io::Result<()> {
        let mut text = String::new();
        for record in self.dvm.call_stack() {
            text.push_str(&format!(
                "{}: {}\n",
                record.display_name(),
                record.current_line()
            ));
        }
        text.push('\n');
        self.print(&text)
    }

    fn show_variables(&mut self) -> io::Result<()> {
        let mut text = String::new();
        for (name, value) in self.dvm.variables() {
            match value {
                Some(v) => text.push_str(&format!(" {name}: {v}\n")),
                None => text.push_str(&format!(" {name}: ?\n")),
            }
        }
        if text.is_empty() {
            text.push_str("No variables currently set.\n");
        }
        text.push('\n');
        self.print(&text)
    }

    fn print(&mut self, text: &str) -> io::Result<()> {
        let out = self.dvm.io_mut().output();
        out.write_all(text.as_bytes())?;
        out.flush()
    }
}

/// Source lines of the current function with breakpoint and current-line
/// markers. Intrinsic functions have no source and show their name.
pub fn function_window(dvm: &DebugVM<'_>) -> String {
    let record = dvm.current_function();
    if record.is_intrinsic() {
        return format!("****{}****\n", record.display_name().to_uppercase());
    }

    let mut text = String::new();
    for line in record.start()..=record.end() {
        let Ok(n) = usize::try_from(line) else {
            continue;
        };
        let Some(source) = dvm.source().line(n) else {
            continue;
        };
        let mark = if dvm.is_breakpoint(line) { '*' } else { ' ' };
        text.push_str(&format!("{mark}{:>4} {source}", format!("{line}.")));
        if line == record.current_line() {
            text.push_str(" <-----");
        }
        text.push('\n');
    }
    text
}

//! CLI command implementations.

use crate::console::{ConsoleError, DebugConsole};
use std::fs;
use tracing::info;
use xlang_common::Program;
use xlang_debugger::{DebugVM, SourceFile};
use xlang_vm::Io;

/// Execute a .x.cod program, or debug one with `-d <basename>`.
pub fn run(args: &[String]) -> Result<(), i32> {
    if args.first().map(String::as_str) == Some("-d") {
        return debug(&args[1..]);
    }
    let Some(input) = args.first() else {
        eprintln!("error: run requires an input file");
        eprintln!("Usage: xlang run <file.x.cod> | xlang run -d <basename>");
        return Err(1);
    };

    let program = load_program(input)?;
    xlang_vm::run(&program, Io::stdio()).map_err(|e| {
        eprintln!("runtime error: {e}");
        3
    })
}

/// Debug `<basename>.x.cod` against its source `<basename>.x`.
pub fn debug(args: &[String]) -> Result<(), i32> {
    let Some(base) = args.first() else {
        eprintln!("error: run -d requires a program basename");
        eprintln!("Usage: xlang run -d <basename>");
        return Err(1);
    };

    let source_file = format!("{base}.x");
    let code_file = format!("{base}.x.cod");
    let source = fs::read_to_string(&source_file).map_err(|e| {
        eprintln!("error: cannot read '{source_file}': {e}");
        eprintln!("make sure both '{source_file}' and '{code_file}' exist");
        1
    })?;
    let program = load_program(&code_file)?;

    println!("****Debugging {source_file}****");
    println!();

    let dvm = DebugVM::new(&program, SourceFile::from_text(&source), Io::stdio());
    match DebugConsole::new(dvm).run() {
        Ok(end) => {
            info!(?end, "debug session over");
            Ok(())
        }
        Err(ConsoleError::Debug(e)) => {
            eprintln!("runtime error: {e}");
            Err(3)
        }
        Err(e @ ConsoleError::Io(_)) => {
            eprintln!("error: {e}");
            Err(1)
        }
    }
}

/// Print the resolved program listing.
pub fn list(args: &[String]) -> Result<(), i32> {
    let Some(input) = args.first() else {
        eprintln!("error: list requires an input file");
        eprintln!("Usage: xlang list <file.x.cod>");
        return Err(1);
    };

    let program = load_program(input)?;
    print!("{}", xlang_loader::listing(&program));
    Ok(())
}

/// Read and load a bytecode file. Skipped lines and unresolved labels are
/// reported as warnings; only an unreadable file is an error.
fn load_program(path: &str) -> Result<Program, i32> {
    let text = fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{path}': {e}");
        1
    })?;

    let loaded = xlang_loader::load(&text);
    for e in &loaded.diagnostics {
        eprintln!("warning: {e}");
    }
    for e in &loaded.resolve_errors {
        eprintln!("warning: {e}");
    }
    Ok(loaded.program)
}

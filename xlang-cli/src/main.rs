//! X CLI: execute, debug and list bytecode programs.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Usage or input error
//! - 3: Runtime error

use std::process;
use tracing_subscriber::{fmt, EnvFilter};
use xlang_cli::commands;

fn main() {
    init_logging();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "run" => commands::run(&args[2..]),
        "list" => commands::list(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

/// Log to stderr so stdout carries only program output. `RUST_LOG`
/// overrides the default `warn` filter.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_usage() {
    eprintln!("Usage: xlang <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run <file.x.cod>       Execute a bytecode program");
    eprintln!("  run -d <basename>      Debug <basename>.x.cod against <basename>.x");
    eprintln!("  list <file.x.cod>      Print the resolved program listing");
}

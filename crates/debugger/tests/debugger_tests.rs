//! Debug sessions over compiler-shaped X programs.
//!
//! Each program is a `.x` source file with its `.x.cod` bytecode compiled
//! with debug markers.

use xlang_common::{Instruction, Program};
use xlang_debugger::{DebugError, DebugVM, SourceFile, StepMode, StepOutcome};
use xlang_loader::load;
use xlang_vm::Io;

const FACTORIAL_X: &str = include_str!("programs/factorial.x");
const FACTORIAL_COD: &str = include_str!("programs/factorial.x.cod");
const COUNTDOWN_X: &str = include_str!("programs/countdown.x");
const COUNTDOWN_COD: &str = include_str!("programs/countdown.x.cod");

// ============================================================
// Helpers
// ============================================================

fn program(cod: &str) -> Program {
    let loaded = load(cod);
    assert!(loaded.is_clean(), "{:?} {:?}", loaded.diagnostics, loaded.resolve_errors);
    loaded.program
}

fn session<'a>(program: &'a Program, source: &str, input: &'a str, out: &'a mut Vec<u8>) -> DebugVM<'a> {
    DebugVM::new(
        program,
        SourceFile::from_text(source),
        Io::new(input.as_bytes(), out),
    )
}

fn call_stack(dvm: &DebugVM<'_>) -> Vec<String> {
    dvm.call_stack()
        .map(|r| format!("{}: {}", r.display_name(), r.current_line()))
        .collect()
}

// ============================================================
// Whole runs
// ============================================================

#[test]
fn continue_runs_factorial_to_completion() {
    let program = program(FACTORIAL_COD);
    let mut out = Vec::new();
    {
        let mut dvm = session(&program, FACTORIAL_X, "4\n", &mut out);
        assert_eq!(dvm.run_step(StepMode::Continue), Ok(StepOutcome::Finished));
    }
    assert_eq!(String::from_utf8(out).unwrap(), "Input an integer: 24\n");
}

#[test]
fn trace_records_every_call_and_return() {
    let program = program(FACTORIAL_COD);
    let mut out = Vec::new();
    let mut dvm = session(&program, FACTORIAL_X, "3\n", &mut out);
    dvm.set_tracing(true);
    dvm.run_step(StepMode::Continue).unwrap();
    assert_eq!(
        dvm.trace_log(),
        "  main()
   Read()
   exit: Read: 3
   factorial(3)
    factorial(2)
     factorial(1)
     exit: factorial: 1
    exit: factorial: 2
   exit: factorial: 6
   Write(6)
   exit: Write: 6
"
    );
}

#[test]
fn countdown_writes_each_value() {
    let program = program(COUNTDOWN_COD);
    let mut out = Vec::new();
    {
        let mut dvm = session(&program, COUNTDOWN_X, "", &mut out);
        assert_eq!(dvm.run_step(StepMode::Continue), Ok(StepOutcome::Finished));
        assert!(dvm.variables().is_empty());
    }
    assert_eq!(out, b"3\n2\n1\n");
}

// ============================================================
// Breakpoints
// ============================================================

#[test]
fn breakpoint_in_loop_fires_each_iteration() {
    let program = program(COUNTDOWN_COD);
    let mut out = Vec::new();
    let mut dvm = session(&program, COUNTDOWN_X, "", &mut out);
    dvm.set_breakpoint(6).unwrap();

    let mut seen = Vec::new();
    while dvm.run_step(StepMode::Continue) == Ok(StepOutcome::Paused) {
        assert_eq!(dvm.current_line(), 6);
        seen.push(dvm.value_of("i").unwrap());
    }
    assert_eq!(seen, vec![3, 2, 1]);
}

#[test]
fn breakpoint_inside_recursion_shows_call_stack() {
    let program = program(FACTORIAL_COD);
    let mut out = Vec::new();
    let mut dvm = session(&program, FACTORIAL_X, "3\n", &mut out);
    dvm.set_breakpoint(3).unwrap();

    assert_eq!(dvm.run_step(StepMode::Continue), Ok(StepOutcome::Paused));
    assert_eq!(dvm.value_of("n"), Ok(3));
    assert_eq!(call_stack(&dvm), vec!["factorial: 3", "main: 6"]);

    assert_eq!(dvm.run_step(StepMode::Continue), Ok(StepOutcome::Paused));
    assert_eq!(dvm.value_of("n"), Ok(2));
    assert_eq!(
        call_stack(&dvm),
        vec!["factorial: 3", "factorial: 4", "main: 6"]
    );
    assert_eq!(dvm.variables(), vec![("n", Some(2))]);
}

#[test]
fn breakpoint_policy() {
    let program = program(FACTORIAL_COD);
    let mut out = Vec::new();
    let mut dvm = session(&program, FACTORIAL_X, "", &mut out);

    assert_eq!(dvm.set_breakpoint(5), Err(DebugError::NotBreakable { line: 5 }));
    assert_eq!(
        dvm.set_breakpoint(8),
        Err(DebugError::LineOutOfRange { line: 8, count: 7 })
    );
    // write(factorial(read())) has no breakable keyword.
    assert_eq!(dvm.set_breakpoint(6), Err(DebugError::NotBreakable { line: 6 }));
    dvm.set_breakpoint(2).unwrap();
    dvm.set_breakpoint(4).unwrap();
    dvm.clear_breakpoint(2).unwrap();
    assert_eq!(dvm.source().breakpoints().collect::<Vec<_>>(), vec![4]);
}

// ============================================================
// Stepping
// ============================================================

#[test]
fn step_over_visits_every_line() {
    let program = program(COUNTDOWN_COD);
    let mut out = Vec::new();
    let mut dvm = session(&program, COUNTDOWN_X, "", &mut out);

    let mut lines = Vec::new();
    while dvm.run_step(StepMode::Over) == Ok(StepOutcome::Paused) {
        lines.push(dvm.current_line());
    }
    assert_eq!(lines, vec![1, 2, 3, 4, 5, 6, 4, 5, 6, 4, 5, 6, 4]);
}

#[test]
fn step_into_skips_intrinsic_entry_marker_only_for_real_functions() {
    let program = program(FACTORIAL_COD);
    let mut out = Vec::new();
    let mut dvm = session(&program, FACTORIAL_X, "2\n", &mut out);

    dvm.run_step(StepMode::Into).unwrap();
    assert_eq!(dvm.current_function().display_name(), "main");

    // Read is intrinsic: the pause lands right on entry.
    dvm.run_step(StepMode::Into).unwrap();
    assert_eq!(dvm.current_function().display_name(), "Read");
    assert!(dvm.current_function().is_intrinsic());
    assert_eq!(dvm.current_line(), 6);

    dvm.run_step(StepMode::Out).unwrap();
    assert_eq!(dvm.current_function().display_name(), "main");

    dvm.run_step(StepMode::Into).unwrap();
    assert_eq!(dvm.current_function().display_name(), "factorial");
    assert_eq!(dvm.current_line(), 2);
    assert_eq!(dvm.value_of("n"), Ok(2));
}

#[test]
fn step_into_runs_past_entry_marker_on_a_breakpoint_line() {
    let program = program(FACTORIAL_COD);
    let mut out = Vec::new();
    let mut dvm = session(&program, FACTORIAL_X, "2\n", &mut out);
    // The function header line is where FUNCTION factorial lands.
    dvm.set_breakpoint(2).unwrap();

    dvm.run_step(StepMode::Into).unwrap();
    dvm.run_step(StepMode::Into).unwrap();
    dvm.run_step(StepMode::Out).unwrap();
    assert_eq!(dvm.run_step(StepMode::Into), Ok(StepOutcome::Paused));

    assert_eq!(dvm.current_function().display_name(), "factorial");
    assert_eq!(dvm.current_line(), 2);
    assert!(!matches!(dvm.vm().current(), Some(Instruction::Formal { .. })));
    assert_eq!(dvm.value_of("n"), Ok(2));
}

#[test]
fn step_out_returns_to_recursive_caller() {
    let program = program(FACTORIAL_COD);
    let mut out = Vec::new();
    let mut dvm = session(&program, FACTORIAL_X, "3\n", &mut out);
    dvm.set_breakpoint(3).unwrap();

    dvm.run_step(StepMode::Continue).unwrap();
    dvm.run_step(StepMode::Continue).unwrap();
    assert_eq!(dvm.depth(), 4);
    dvm.clear_breakpoint(3).unwrap();

    assert_eq!(dvm.run_step(StepMode::Out), Ok(StepOutcome::Paused));
    assert_eq!(dvm.depth(), 3);
    assert_eq!(dvm.current_line(), 4);
    assert_eq!(dvm.value_of("n"), Ok(3));
}

#[test]
fn trace_drains_per_step() {
    let program = program(FACTORIAL_COD);
    let mut out = Vec::new();
    let mut dvm = session(&program, FACTORIAL_X, "1\n", &mut out);
    dvm.set_tracing(true);

    dvm.run_step(StepMode::Into).unwrap();
    assert_eq!(dvm.take_trace(), "  main()\n");
    dvm.run_step(StepMode::Into).unwrap();
    assert_eq!(dvm.take_trace(), "   Read()\n");
    assert_eq!(dvm.trace_log(), "");
}

// ============================================================
// Failures
// ============================================================

#[test]
fn runtime_error_surfaces_through_step() {
    let program = program(FACTORIAL_COD);
    let mut out = Vec::new();
    let mut dvm = session(&program, FACTORIAL_X, "many\n", &mut out);
    let err = dvm.run_step(StepMode::Continue).unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, DebugError::Runtime(_)));
}

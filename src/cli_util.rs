use std::io::{self, Write};

use crate::error::EngineError;
use crate::matcher::UnmatchedBracket;
use crate::program::Program;

/// Show this many instructions either side of an error position.
const WINDOW: usize = 32;

/// Pretty-print an unmatched-bracket record with caret positioning.
/// If `program_name` is `Some("bf")`, prefix messages with "bf: ...".
pub fn print_fault(program_name: Option<&str>, program: &Program, fault: &UnmatchedBracket) {
    let msg = format!("Runtime error: unmatched bracket {}", fault.kind);
    let msg = match program_name {
        Some(p) => format!("{p}: {msg}"),
        None => msg,
    };
    print_error_with_context(&msg, program, fault.ip);
}

/// Print an abort caused by limits or cancellation.
pub fn print_engine_error(program_name: &str, err: &EngineError) {
    eprintln!("{program_name}: {err}");
    let _ = io::stderr().flush();
}

/// Print a concise error with instruction index and a caret context window.
pub fn print_error_with_context(prefix: &str, program: &Program, pos: usize) {
    eprintln!("{prefix} at instruction {pos}");
    let (slice, underline) = error_context(program, pos);
    eprintln!("  {slice}");
    eprintln!("  {underline}");
    let _ = io::stderr().flush();
}

/// The instructions around `pos` and a caret line pointing at it.
pub fn error_context(program: &Program, pos: usize) -> (String, String) {
    let tokens = program.tokens();
    let start = pos.saturating_sub(WINDOW).min(tokens.len());
    let end = (pos + WINDOW + 1).min(tokens.len());
    let slice: String = tokens[start..end].iter().map(|t| t.as_char()).collect();

    let mut underline = " ".repeat(pos.saturating_sub(start));
    underline.push('^');
    (slice, underline)
}

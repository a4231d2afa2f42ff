//! The step engine: applies exactly one instruction to an [`ExecutionState`].

use std::fmt;

use tracing::{trace, warn};

use crate::matcher::{find_match, BracketKind, UnmatchedBracket};
use crate::program::{Program, Token};
use crate::state::{ExecutionState, OutputEvent};

/// What an applied instruction did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// `>` / `<`: the tape pointer now sits at `to` (after clamping).
    Moved { to: usize },
    /// `+` / `-` on `cell`.
    Cell { cell: usize, from: u8, to: u8 },
    /// `.` appended this value to the output log.
    Emitted(u8),
    /// `,` does nothing.
    Ignored,
    /// A bracket guard fired; execution continues after the match at `matched`.
    Jumped { matched: usize },
    /// A bracket guard did not fire.
    FellThrough,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Moved { to } => write!(f, "Moved pointer head to index {to}"),
            Effect::Cell { cell, from, to } => write!(f, "Set cell[{cell}] from {from} to {to}"),
            Effect::Emitted(v) => write!(f, "Output value {v}"),
            Effect::Ignored => write!(f, "Input is not supported; nothing happens"),
            Effect::Jumped { matched } => write!(f, "Jump to matching bracket at IP {matched}"),
            Effect::FellThrough => write!(f, "Guard not taken; continue"),
        }
    }
}

/// Result of a single call to [`ExecutionState::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The state was already done; nothing changed.
    Frozen,
    /// `token` at `ip` was applied. `halted` is set when this step ran off
    /// the end of the program.
    Applied {
        ip: usize,
        token: Token,
        effect: Effect,
        halted: bool,
    },
    /// A bracket scan failed. The error record was appended and the state
    /// is now done.
    Faulted(UnmatchedBracket),
}

impl StepOutcome {
    /// True if this call changed the state.
    pub fn made_progress(&self) -> bool {
        !matches!(self, StepOutcome::Frozen)
    }
}

impl ExecutionState {
    /// Apply the instruction under the instruction pointer.
    ///
    /// # Panics
    ///
    /// If the instruction pointer ends up past the end of `program`. Jump
    /// targets are always valid program positions, so reaching this is an
    /// engine bug rather than a malformed program.
    pub fn step(&mut self, program: &Program) -> StepOutcome {
        if self.done {
            return StepOutcome::Frozen;
        }

        let ip = self.instruction_pointer;
        let len = program.len();
        let Some(token) = program.get(ip) else {
            panic!("instruction pointer {ip} outside program of length {len}");
        };
        let capacity = self.tape.capacity();
        let ptr = self.tape_pointer;
        let cell = self.current_cell();

        let (next_ip, effect) = match token {
            Token::Right => {
                self.tape_pointer = (ptr + 1).min(capacity - 1);
                (ip + 1, Effect::Moved { to: self.tape_pointer })
            }
            Token::Left => {
                self.tape_pointer = ptr.saturating_sub(1);
                (ip + 1, Effect::Moved { to: self.tape_pointer })
            }
            Token::Inc => {
                let (from, to) = self.tape.increment(ptr);
                (ip + 1, Effect::Cell { cell: ptr, from, to })
            }
            Token::Dec => {
                let (from, to) = self.tape.decrement(ptr);
                (ip + 1, Effect::Cell { cell: ptr, from, to })
            }
            Token::Output => {
                self.output.push(OutputEvent::Value(cell));
                (ip + 1, Effect::Emitted(cell))
            }
            Token::Input => (ip + 1, Effect::Ignored),
            Token::Open | Token::Close => {
                let kind = if token == Token::Open { BracketKind::Open } else { BracketKind::Close };
                let guard = match kind {
                    BracketKind::Open => cell == 0,
                    BracketKind::Close => cell != 0,
                };
                if !guard {
                    (ip + 1, Effect::FellThrough)
                } else {
                    match find_match(program.tokens(), ip, kind.scan_direction()) {
                        Ok(matched) => (matched + 1, Effect::Jumped { matched }),
                        Err(unmatched) => return self.record_fault(unmatched),
                    }
                }
            }
        };

        assert!(
            next_ip <= len,
            "instruction pointer {next_ip} escaped program of length {len}"
        );
        let halted = next_ip == len;
        if halted {
            self.instruction_pointer = len - 1;
            self.done = true;
        } else {
            self.instruction_pointer = next_ip;
        }

        self.visited_max = self.visited_max.max(self.tape_pointer);
        self.visited_min = self.visited_min.min(self.tape_pointer);

        trace!(target: "engine", ip, op = %token, ptr = self.tape_pointer, %effect, halted, "step");
        StepOutcome::Applied { ip, token, effect, halted }
    }

    fn record_fault(&mut self, unmatched: UnmatchedBracket) -> StepOutcome {
        warn!(target: "engine", ip = unmatched.ip, kind = %unmatched.kind, "unmatched_bracket");
        self.output.push(OutputEvent::Error(unmatched));
        self.instruction_pointer = unmatched.ip;
        self.done = true;
        StepOutcome::Faulted(unmatched)
    }
}

/// Value-style transition: consume a state and return its successor.
pub fn step(mut state: ExecutionState, program: &Program) -> ExecutionState {
    state.step(program);
    state
}

//! A step-by-step Brainfuck execution engine.
//!
//! The engine runs one instruction per call so that a front end can show
//! every intermediate state:
//!
//! - Source text is tokenized into a [`Program`]; characters outside
//!   `><+-.,[]` are ignored.
//! - The tape is fixed-size (4096 cells by default) and the pointer is
//!   clamped to it rather than erroring.
//! - Cells wrap modulo 128 by default.
//! - `,` is accepted but does nothing.
//! - Brackets are matched by scanning when the jump is taken. An unmatched
//!   bracket becomes an error record in the output log and freezes the state.
//!
//! A [`Session`] owns the program, its [`ExecutionState`] and a
//! [`RunScheduler`] that steps it at a normal or fast-forward cadence.
//!
//! Quick start:
//!
//! ```
//! use bf::{MachineConfig, OutputEvent, Session, StepControl, Cadences};
//!
//! let mut session = Session::load("++++[>++<-]>.", MachineConfig::default(), Cadences::default());
//! session.run_to_end(&StepControl::default()).unwrap();
//! assert_eq!(session.snapshot().output(), &[OutputEvent::Value(8)]);
//! ```

pub mod cli_util;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod matcher;
pub mod program;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod theme;
pub mod tui;

pub use config::Settings;
pub use engine::{step, Effect, StepOutcome};
pub use error::EngineError;
pub use matcher::{find_match, BracketKind, ScanDirection, UnmatchedBracket};
pub use program::{tokenize, Program, Token};
pub use scheduler::{Cadence, Cadences, RunScheduler};
pub use session::{Session, StepControl};
pub use state::{ExecutionState, MachineConfig, OutputEvent, Tape};

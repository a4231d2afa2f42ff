//! The engine boundary: one program, its current state, and the scheduler
//! that may be driving it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::engine::StepOutcome;
use crate::error::EngineError;
use crate::program::Program;
use crate::scheduler::{Cadence, Cadences, RunScheduler};
use crate::state::{ExecutionState, MachineConfig};

/// Controls for cooperative cancellation and step limiting.
#[derive(Clone, Default)]
pub struct StepControl {
    pub max_steps: Option<usize>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<usize>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }
}

/// Owns the program, the latest [`ExecutionState`] and the [`RunScheduler`].
///
/// The view holds a `Session`, reads [`Session::snapshot`] to render, and
/// calls the control operations in response to user input.
pub struct Session {
    program: Program,
    machine: MachineConfig,
    cadences: Cadences,
    state: ExecutionState,
    scheduler: RunScheduler,
    steps: usize,
}

impl Session {
    /// Tokenize `source` and build a fresh, paused session.
    pub fn load(source: &str, machine: MachineConfig, cadences: Cadences) -> Self {
        let program = Program::tokenize(source);
        info!(
            target: "engine",
            tokens = program.len(),
            capacity = machine.capacity(),
            modulus = machine.modulus(),
            "program_loaded"
        );
        let state = ExecutionState::new(&program, machine);
        Self {
            program,
            machine,
            cadences,
            state,
            scheduler: RunScheduler::new(),
            steps: 0,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn machine(&self) -> MachineConfig {
        self.machine
    }

    pub fn cadences(&self) -> Cadences {
        self.cadences
    }

    /// Read-only view of the current state.
    pub fn snapshot(&self) -> &ExecutionState {
        &self.state
    }

    /// Steps applied since the last load or reset.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn running_cadence(&self) -> Option<Cadence> {
        self.scheduler.cadence()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Apply one instruction.
    pub fn step(&mut self) -> StepOutcome {
        let outcome = self.state.step(&self.program);
        if outcome.made_progress() {
            self.steps += 1;
        }
        outcome
    }

    /// Start (or restart at a new cadence) periodic stepping. Does nothing
    /// once the program is done.
    pub fn start(&mut self, cadence: Cadence, now: Instant) {
        if self.state.is_done() {
            self.scheduler.pause();
            return;
        }
        self.scheduler.start(cadence, self.cadences.delay(cadence), now);
    }

    pub fn pause(&mut self) {
        self.scheduler.pause();
    }

    /// Pause, then rebuild the state from the held program.
    pub fn reset(&mut self) {
        self.scheduler.pause();
        self.state = ExecutionState::new(&self.program, self.machine);
        self.steps = 0;
        debug!(target: "engine", "reset");
    }

    /// Swap in new source text and reset.
    pub fn replace_program(&mut self, source: &str) {
        self.scheduler.pause();
        self.program = Program::tokenize(source);
        info!(target: "engine", tokens = self.program.len(), "program_replaced");
        self.reset();
    }

    /// Fire every tick due at `now`. Returns the number of steps applied.
    /// The run pauses itself once the program is done.
    pub fn tick(&mut self, now: Instant) -> usize {
        let due = self.scheduler.due_ticks(now);
        let mut applied = 0;
        for _ in 0..due {
            if !self.step().made_progress() {
                break;
            }
            applied += 1;
            if self.state.is_done() {
                break;
            }
        }
        if self.state.is_done() {
            self.scheduler.pause();
        }
        applied
    }

    /// Step until done, honoring `control`. Returns the number of steps taken
    /// by this call.
    pub fn run_to_end(&mut self, control: &StepControl) -> Result<usize, EngineError> {
        self.run_observed(control, |_, _| {})
    }

    /// Like [`Session::run_to_end`], calling `observer` after every step with
    /// the new state and what the step did.
    pub fn run_observed<F>(&mut self, control: &StepControl, mut observer: F) -> Result<usize, EngineError>
    where
        F: FnMut(&ExecutionState, &StepOutcome),
    {
        self.scheduler.pause();
        let mut taken = 0usize;
        while !self.state.is_done() {
            if control.cancel_flag.load(Ordering::Relaxed) {
                return Err(EngineError::Canceled);
            }
            if let Some(limit) = control.max_steps {
                if taken >= limit {
                    return Err(EngineError::StepLimitExceeded { limit });
                }
            }
            let outcome = self.step();
            observer(&self.state, &outcome);
            taken += 1;
        }
        Ok(taken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::OutputEvent;
    use std::time::Duration;

    const MS: Duration = Duration::from_millis(1);

    fn session(code: &str) -> Session {
        Session::load(code, MachineConfig::default(), Cadences::default())
    }

    #[test]
    fn load_starts_paused_at_origin() {
        let s = session("+[>+<-]");
        assert!(!s.is_running());
        assert_eq!(s.snapshot().instruction_pointer(), 0);
        assert_eq!(s.snapshot().tape_pointer(), 0);
        assert_eq!(s.steps(), 0);
    }

    #[test]
    fn reset_restores_fresh_state_and_keeps_program() {
        let mut s = session("+++.");
        s.run_to_end(&StepControl::default()).unwrap();
        assert!(s.snapshot().is_done());
        s.reset();
        assert!(!s.snapshot().is_done());
        assert!(s.snapshot().output().is_empty());
        assert_eq!(s.program().to_string(), "+++.");
        assert_eq!(s.steps(), 0);
    }

    #[test]
    fn reset_pauses_an_active_run() {
        let t0 = Instant::now();
        let mut s = session("+[]");
        s.start(Cadence::Normal, t0);
        assert!(s.is_running());
        s.reset();
        assert!(!s.is_running());
        assert_eq!(s.tick(t0 + 100 * MS), 0);
    }

    #[test]
    fn ticks_step_at_the_cadence() {
        let t0 = Instant::now();
        let mut s = session("++++++++");
        s.start(Cadence::Normal, t0);
        assert_eq!(s.tick(t0 + 10 * MS), 0);
        assert_eq!(s.tick(t0 + 25 * MS), 1);
        assert_eq!(s.tick(t0 + 75 * MS), 2);
        assert_eq!(s.snapshot().current_cell(), 3);
    }

    #[test]
    fn run_pauses_itself_when_done() {
        let t0 = Instant::now();
        let mut s = session("++.");
        s.start(Cadence::FastForward, t0);
        assert_eq!(s.tick(t0 + 50 * MS), 3);
        assert!(s.snapshot().is_done());
        assert!(!s.is_running());
        assert_eq!(s.snapshot().output(), &[OutputEvent::Value(2)]);
    }

    #[test]
    fn fast_forward_replaces_normal_run() {
        let t0 = Instant::now();
        let mut s = session(&"+".repeat(100));
        s.start(Cadence::Normal, t0);
        s.start(Cadence::FastForward, t0);
        assert_eq!(s.running_cadence(), Some(Cadence::FastForward));
        assert_eq!(s.tick(t0 + 10 * MS), 10);
    }

    #[test]
    fn start_on_finished_program_stays_paused() {
        let mut s = session("");
        s.start(Cadence::Normal, Instant::now());
        assert!(!s.is_running());
    }

    #[test]
    fn pause_is_always_safe() {
        let mut s = session("+");
        s.pause();
        s.pause();
        assert!(!s.is_running());
    }

    #[test]
    fn manual_step_counts_only_progress() {
        let mut s = session("+");
        s.step();
        s.step();
        s.step();
        assert_eq!(s.steps(), 1);
    }

    #[test]
    fn run_to_end_honors_step_limit() {
        let mut s = session("+[]");
        let err = s
            .run_to_end(&StepControl::new(Some(50), Arc::new(AtomicBool::new(false))))
            .unwrap_err();
        assert!(matches!(err, EngineError::StepLimitExceeded { limit: 50 }));
        assert_eq!(s.steps(), 50);
    }

    #[test]
    fn run_to_end_honors_cancel_flag() {
        let mut s = session("+[]");
        let cancel = Arc::new(AtomicBool::new(true));
        let err = s.run_to_end(&StepControl::new(None, cancel)).unwrap_err();
        assert!(matches!(err, EngineError::Canceled));
        assert_eq!(s.steps(), 0);
    }

    #[test]
    fn run_observed_sees_every_step() {
        let mut s = session("+>+.");
        let mut seen = Vec::new();
        let taken = s
            .run_observed(&StepControl::default(), |state, outcome| {
                seen.push((state.instruction_pointer(), outcome.made_progress()));
            })
            .unwrap();
        assert_eq!(taken, 4);
        assert_eq!(seen, vec![(1, true), (2, true), (3, true), (3, true)]);
        assert!(s.snapshot().is_done());
    }

    #[test]
    fn replace_program_resets_state() {
        let mut s = session("+++");
        s.step();
        s.replace_program("--");
        assert_eq!(s.program().len(), 2);
        assert_eq!(s.snapshot().current_cell(), 0);
        assert_eq!(s.steps(), 0);
    }
}

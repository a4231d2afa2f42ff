//! The interpreter's mutable snapshot: tape, pointers, output log.

use std::fmt;

use crate::error::EngineError;
use crate::matcher::UnmatchedBracket;
use crate::program::Program;

/// Default number of tape cells.
pub const DEFAULT_CAPACITY: usize = 4096;

/// Default cell modulus. The visualizer wraps cells at 128, not the usual
/// 256; see `MachineConfig::with_modulus`.
pub const DEFAULT_MODULUS: u16 = 128;

/// Shape of the machine a program runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineConfig {
    capacity: usize,
    modulus: u16,
}

impl MachineConfig {
    pub fn new(capacity: usize, modulus: u16) -> Result<Self, EngineError> {
        if capacity == 0 {
            return Err(EngineError::ZeroCapacity);
        }
        if !(2..=256).contains(&modulus) {
            return Err(EngineError::InvalidModulus(modulus));
        }
        Ok(Self { capacity, modulus })
    }

    /// A machine with `capacity` cells and the default modulus.
    pub fn with_capacity(capacity: usize) -> Result<Self, EngineError> {
        Self::new(capacity, DEFAULT_MODULUS)
    }

    /// Same capacity, different wraparound. 256 gives conventional
    /// unsigned-byte semantics, which changes the output of programs that
    /// rely on overflow.
    pub fn with_modulus(self, modulus: u16) -> Result<Self, EngineError> {
        Self::new(self.capacity, modulus)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn modulus(&self) -> u16 {
        self.modulus
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            modulus: DEFAULT_MODULUS,
        }
    }
}

/// Fixed-capacity cell array. Every stored value is in `[0, modulus)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<u8>,
    modulus: u16,
}

impl Tape {
    pub fn new(machine: MachineConfig) -> Self {
        Self {
            cells: vec![0; machine.capacity()],
            modulus: machine.modulus(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    pub fn modulus(&self) -> u16 {
        self.modulus
    }

    pub fn get(&self, index: usize) -> Option<u8> {
        self.cells.get(index).copied()
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Returns `(before, after)`.
    pub(crate) fn increment(&mut self, index: usize) -> (u8, u8) {
        let before = self.cells[index];
        let after = ((u16::from(before) + 1) % self.modulus) as u8;
        self.cells[index] = after;
        (before, after)
    }

    /// Returns `(before, after)`.
    pub(crate) fn decrement(&mut self, index: usize) -> (u8, u8) {
        let before = self.cells[index];
        let after = ((u16::from(before) + self.modulus - 1) % self.modulus) as u8;
        self.cells[index] = after;
        (before, after)
    }
}

/// One entry of the append-only output log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEvent {
    /// A cell value emitted by `.`.
    Value(u8),
    /// A bracket that could not be resolved; execution stopped here.
    Error(UnmatchedBracket),
}

impl fmt::Display for OutputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputEvent::Value(v) => write!(f, ": {v}"),
            OutputEvent::Error(e) => write!(f, "! {e}"),
        }
    }
}

/// The atomic unit of interpreter progress.
///
/// Built fresh from a [`Program`] on load or reset and advanced by
/// [`ExecutionState::step`]. Once `done` is set the state is frozen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionState {
    pub(crate) tape: Tape,
    pub(crate) tape_pointer: usize,
    pub(crate) instruction_pointer: usize,
    pub(crate) visited_min: usize,
    pub(crate) visited_max: usize,
    pub(crate) output: Vec<OutputEvent>,
    pub(crate) done: bool,
}

impl ExecutionState {
    /// Fresh state for `program`. An empty program starts out done.
    pub fn new(program: &Program, machine: MachineConfig) -> Self {
        Self {
            tape: Tape::new(machine),
            tape_pointer: 0,
            instruction_pointer: 0,
            visited_min: 0,
            visited_max: 0,
            output: Vec::new(),
            done: program.is_empty(),
        }
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn tape_pointer(&self) -> usize {
        self.tape_pointer
    }

    pub fn instruction_pointer(&self) -> usize {
        self.instruction_pointer
    }

    /// Lowest tape index the pointer has reached. Display only.
    pub fn visited_min(&self) -> usize {
        self.visited_min
    }

    /// Highest tape index the pointer has reached. Display only.
    pub fn visited_max(&self) -> usize {
        self.visited_max
    }

    pub fn output(&self) -> &[OutputEvent] {
        &self.output
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn current_cell(&self) -> u8 {
        self.tape.cells[self.tape_pointer]
    }

    /// Values emitted so far, skipping error records.
    pub fn emitted_values(&self) -> impl Iterator<Item = u8> + '_ {
        self.output.iter().filter_map(|event| match event {
            OutputEvent::Value(v) => Some(*v),
            OutputEvent::Error(_) => None,
        })
    }

    /// The error record that stopped execution, if any.
    pub fn fault(&self) -> Option<UnmatchedBracket> {
        self.output.iter().rev().find_map(|event| match event {
            OutputEvent::Error(e) => Some(*e),
            OutputEvent::Value(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::BracketKind;
    use crate::program::tokenize;

    #[test]
    fn fresh_state_is_zeroed() {
        let state = ExecutionState::new(&tokenize("+>"), MachineConfig::default());
        assert_eq!(state.tape().capacity(), DEFAULT_CAPACITY);
        assert!(state.tape().cells().iter().all(|&c| c == 0));
        assert_eq!(state.tape_pointer(), 0);
        assert_eq!(state.instruction_pointer(), 0);
        assert!(state.output().is_empty());
        assert!(!state.is_done());
    }

    #[test]
    fn empty_program_starts_done() {
        let state = ExecutionState::new(&tokenize("just words"), MachineConfig::default());
        assert!(state.is_done());
    }

    #[test]
    fn machine_config_rejects_bad_shapes() {
        assert!(matches!(MachineConfig::new(0, 128), Err(EngineError::ZeroCapacity)));
        assert!(matches!(MachineConfig::new(8, 1), Err(EngineError::InvalidModulus(1))));
        assert!(matches!(MachineConfig::new(8, 257), Err(EngineError::InvalidModulus(257))));
        assert!(MachineConfig::new(1, 256).is_ok());
    }

    #[test]
    fn increment_wraps_at_modulus() {
        let machine = MachineConfig::with_capacity(1).unwrap();
        let mut tape = Tape::new(machine);
        for _ in 0..127 {
            tape.increment(0);
        }
        assert_eq!(tape.get(0), Some(127));
        assert_eq!(tape.increment(0), (127, 0));
    }

    #[test]
    fn decrement_wraps_into_range() {
        let machine = MachineConfig::with_capacity(1).unwrap();
        let mut tape = Tape::new(machine);
        assert_eq!(tape.decrement(0), (0, 127));

        let wide = machine.with_modulus(256).unwrap();
        let mut tape = Tape::new(wide);
        assert_eq!(tape.decrement(0), (0, 255));
        assert_eq!(tape.increment(0), (255, 0));
    }

    #[test]
    fn output_events_render_like_the_log() {
        assert_eq!(OutputEvent::Value(8).to_string(), ": 8");
        let err = OutputEvent::Error(UnmatchedBracket { ip: 0, kind: BracketKind::Open });
        assert_eq!(err.to_string(), "! Unmatched bracket '[' at instruction 0");
    }
}

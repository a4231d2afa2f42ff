use std::time::{Duration, Instant};

use bf::{
    tokenize, BracketKind, Cadence, Cadences, ExecutionState, MachineConfig, OutputEvent, Session, StepControl,
    StepOutcome, UnmatchedBracket,
};

fn fresh(code: &str) -> (bf::Program, ExecutionState) {
    let program = tokenize(code);
    let state = ExecutionState::new(&program, MachineConfig::default());
    (program, state)
}

#[test]
fn multiply_loop_emits_eight() {
    let (program, mut state) = fresh("++++[>++<-]>.");
    let mut steps = 0;
    while !state.is_done() {
        state.step(&program);
        steps += 1;
        assert!(steps < 1_000, "program did not finish");
    }
    assert_eq!(state.output(), &[OutputEvent::Value(8)]);
    assert_eq!(state.tape().get(0), Some(0));
    assert_eq!(state.tape().get(1), Some(8));
    assert_eq!(state.instruction_pointer(), program.len() - 1);
}

#[test]
fn lone_close_on_zero_cell_just_advances() {
    let (program, mut state) = fresh("]");
    let outcome = state.step(&program);
    assert!(matches!(outcome, StepOutcome::Applied { halted: true, .. }));
    assert!(state.output().is_empty());
    assert!(state.is_done());
}

#[test]
fn lone_open_on_zero_cell_faults() {
    let (program, mut state) = fresh("[");
    let outcome = state.step(&program);
    let fault = UnmatchedBracket { ip: 0, kind: BracketKind::Open };
    assert_eq!(outcome, StepOutcome::Faulted(fault));
    assert_eq!(state.output(), &[OutputEvent::Error(fault)]);
    assert_eq!(state.instruction_pointer(), 0);
    assert!(state.is_done());
}

#[test]
fn single_cell_tape_clamps_left() {
    let program = tokenize("<");
    let mut state = ExecutionState::new(&program, MachineConfig::with_capacity(1).unwrap());
    state.step(&program);
    assert_eq!(state.tape_pointer(), 0);
    assert!(state.is_done());
}

#[test]
fn filtered_out_source_is_done_on_load() {
    let (program, mut state) = fresh("no instructions here");
    assert!(program.is_empty());
    assert!(state.is_done());
    assert_eq!(state.step(&program), StepOutcome::Frozen);
}

#[test]
fn value_style_step_matches_in_place_step() {
    let (program, state) = fresh("+>+");
    let next = bf::step(state.clone(), &program);
    let mut in_place = state;
    in_place.step(&program);
    assert_eq!(next.current_cell(), in_place.current_cell());
    assert_eq!(next.instruction_pointer(), in_place.instruction_pointer());
}

#[test]
fn session_drives_a_full_run_with_the_scheduler() {
    let mut session = Session::load("++++[>++<-]>.", MachineConfig::default(), Cadences::from_millis(25, 1));
    let t0 = Instant::now();
    session.start(Cadence::FastForward, t0);

    let mut now = t0;
    while session.is_running() {
        now += Duration::from_millis(5);
        session.tick(now);
    }
    assert!(session.snapshot().is_done());
    assert_eq!(session.snapshot().output(), &[OutputEvent::Value(8)]);
}

#[test]
fn session_run_to_end_then_reset_reruns_identically() {
    let mut session = Session::load(">+++.<-.", MachineConfig::default(), Cadences::default());
    let first = session.run_to_end(&StepControl::default()).unwrap();
    let output: Vec<OutputEvent> = session.snapshot().output().to_vec();

    session.reset();
    let second = session.run_to_end(&StepControl::default()).unwrap();
    assert_eq!(first, second);
    assert_eq!(session.snapshot().output(), output.as_slice());
    assert_eq!(output, vec![OutputEvent::Value(3), OutputEvent::Value(127)]);
}

use bf::{tokenize, ExecutionState, MachineConfig, OutputEvent, Program, StepOutcome};
use proptest::prelude::*;

const STEP_LIMIT: usize = 2_000;

fn instruction() -> impl Strategy<Value = char> {
    prop::sample::select(vec!['>', '<', '+', '-', '.', ',', '[', ']'])
}

/// Any mix of instructions, brackets not necessarily balanced.
fn any_source() -> impl Strategy<Value = String> {
    prop::collection::vec(instruction(), 0..64).prop_map(|chars| chars.into_iter().collect())
}

/// Bracket-balanced programs built from nested blocks.
fn balanced_source() -> impl Strategy<Value = String> {
    let leaf = prop::collection::vec(prop::sample::select(vec!['>', '<', '+', '-', '.']), 0..6)
        .prop_map(|chars| chars.into_iter().collect::<String>());
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop::collection::vec(
            prop_oneof![inner.clone(), inner.prop_map(|body| format!("[{body}]"))],
            1..4,
        )
        .prop_map(|parts| parts.concat())
    })
}

fn machine() -> impl Strategy<Value = MachineConfig> {
    (1usize..16, 2u16..=256).prop_map(|(capacity, modulus)| MachineConfig::new(capacity, modulus).unwrap())
}

fn run_bounded(program: &Program, state: &mut ExecutionState, mut each: impl FnMut(&ExecutionState)) {
    for _ in 0..STEP_LIMIT {
        if state.is_done() {
            break;
        }
        state.step(program);
        each(state);
    }
}

proptest! {
    #[test]
    fn load_starts_at_origin(source in any_source(), machine in machine()) {
        let program = tokenize(&source);
        let state = ExecutionState::new(&program, machine);
        prop_assert_eq!(state.tape_pointer(), 0);
        prop_assert_eq!(state.instruction_pointer(), 0);
        prop_assert_eq!(state.is_done(), program.is_empty());
        prop_assert!(state.tape().cells().iter().all(|&c| c == 0));
    }

    #[test]
    fn cells_and_pointer_stay_in_range(source in any_source(), machine in machine()) {
        let program = tokenize(&source);
        let mut state = ExecutionState::new(&program, machine);
        let modulus = machine.modulus();
        let mut violation = None;
        run_bounded(&program, &mut state, |s| {
            if violation.is_some() {
                return;
            }
            if s.tape_pointer() >= machine.capacity() {
                violation = Some(format!("pointer {} outside tape", s.tape_pointer()));
            } else if let Some(c) = s.tape().cells().iter().find(|&&c| u16::from(c) >= modulus) {
                violation = Some(format!("cell value {c} not below modulus {modulus}"));
            } else if s.visited_min() > s.tape_pointer() || s.tape_pointer() > s.visited_max() {
                violation = Some(format!("pointer {} outside visited bounds", s.tape_pointer()));
            } else if !s.is_done() && s.instruction_pointer() >= program.len() {
                violation = Some(format!("ip {} outside program", s.instruction_pointer()));
            }
        });
        prop_assert_eq!(violation, None);
    }

    #[test]
    fn done_state_is_frozen(source in any_source()) {
        let program = tokenize(&source);
        let mut state = ExecutionState::new(&program, MachineConfig::default());
        run_bounded(&program, &mut state, |_| {});
        if state.is_done() {
            let before = state.clone();
            prop_assert_eq!(state.step(&program), StepOutcome::Frozen);
            prop_assert_eq!(&state, &before);
        }
    }

    #[test]
    fn balanced_programs_never_fault(source in balanced_source(), machine in machine()) {
        let program = tokenize(&source);
        let mut state = ExecutionState::new(&program, machine);
        let mut faulted = false;
        run_bounded(&program, &mut state, |s| faulted |= s.fault().is_some());
        prop_assert!(!faulted);
        prop_assert!(state.output().iter().all(|e| matches!(e, OutputEvent::Value(_))));
    }

    #[test]
    fn at_most_one_error_and_it_is_last(source in any_source()) {
        let program = tokenize(&source);
        let mut state = ExecutionState::new(&program, MachineConfig::default());
        run_bounded(&program, &mut state, |_| {});
        let errors = state.output().iter().filter(|e| matches!(e, OutputEvent::Error(_))).count();
        prop_assert!(errors <= 1);
        if errors == 1 {
            prop_assert!(state.is_done());
            prop_assert!(matches!(state.output().last(), Some(OutputEvent::Error(_))));
        }
    }
}

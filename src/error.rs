/// Errors surfaced by the engine boundary.
///
/// An unmatched bracket is *not* one of these: it is ordinary program
/// behavior and lands in the output log (see [`crate::OutputEvent::Error`]).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The tape must hold at least one cell.
    #[error("Invalid capacity: the tape needs at least one cell")]
    ZeroCapacity,

    /// Cells wrap modulo M; M must fit the 8-bit cell storage.
    #[error("Invalid cell modulus {0}: expected a value in 2..=256")]
    InvalidModulus(u16),

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },

    /// Execution aborted due to cooperative cancellation (e.g., timeout or Ctrl+C).
    #[error("Execution aborted: cancelled")]
    Canceled,
}

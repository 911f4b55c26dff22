use thiserror::Error;

/// Errors raised at the engine's persistence and orchestration boundaries.
///
/// Round-level operations never fail; only restoring a snapshot or misusing
/// the duel round protocol does.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{field} out of range: {value} not in [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("correct attempts {correct} exceed total attempts {total}")]
    InconsistentCounters { correct: u64, total: u64 },

    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("no round in progress")]
    NoPendingRound,
}

pub type EngineResult<T> = Result<T, EngineError>;

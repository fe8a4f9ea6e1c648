use thiserror::Error;

/// Fatal errors the engine can report. Only configuration and invariant
/// violations ever reach the caller — every other anomaly is absorbed into a
/// valid state transition inside the tick loop (see `engine::events_detect`
/// and `engine::scheduler` for the soft-anomaly handling).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid configuration in field `{field}`: {reason}")]
    ConfigurationInvalid { field: &'static str, reason: String },

    #[error("invariant `{invariant}` violated at tick {tick}: {detail}")]
    InvariantViolated {
        invariant: &'static str,
        tick: u64,
        detail: String,
    },
}

pub type EngineResult<T> = Result<T, EngineError>;

use chrono::{NaiveDateTime, TimeDelta};
use thiserror::Error;

use crate::market::Market;

/// Missing or invalid battery parameter, or invalid model settings.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),

    #[error("parameter `{name}` is not a finite number ({value})")]
    NotFinite { name: String, value: f64 },

    #[error("parameter `{name}` must be non-negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("loss fraction `{name}` must lie in [0, 1), got {value}")]
    LossOutOfRange { name: &'static str, value: f64 },

    #[error("initial stored energy {value} MWh must lie within [0, {max_storage_volume}] MWh")]
    InitialStoredEnergyOutOfRange { value: f64, max_storage_volume: f64 },

    #[error("the timestep must be 30 minutes to pair the half-hours of each hour, got {0}")]
    UnsupportedTimestep(TimeDelta),

    #[error("at least one market must be enabled")]
    NoMarketsEnabled,
}

/// Market data that cannot be paired into hourly settlement periods.
#[derive(Debug, Error, PartialEq)]
pub enum InputShapeError {
    #[error("the time index is empty")]
    Empty,

    #[error("the time index must have an even number of rows, got {0}")]
    OddLength(usize),

    #[error("the requested row limit must be even, got {0}")]
    OddRowLimit(usize),

    #[error("expected a step of {expected} at {at}, got {actual}")]
    UnevenStep { at: NaiveDateTime, expected: TimeDelta, actual: TimeDelta },

    #[error("the market data step {actual} differs from the model timestep {expected}")]
    StepMismatch { expected: TimeDelta, actual: TimeDelta },

    #[error("the first timestep {0} is not aligned to an hourly settlement period")]
    MisalignedStart(NaiveDateTime),

    #[error("no {market} price at {at}")]
    MissingPrice { market: Market, at: NaiveDateTime },
}

/// Failure classification returned by a solver backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SolveError {
    #[error("the problem is infeasible")]
    Infeasible,

    #[error("the problem is unbounded")]
    Unbounded,

    #[error("solver error: {0}")]
    Solver(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("input shape error: {0}")]
    InputShape(#[from] InputShapeError),

    #[error("solve failed: {0}")]
    Solve(#[from] SolveError),

    /// The solution was requested before a successful solve.
    #[error("the solution is only available after a successful solve")]
    PrematureExtraction,
}

use thiserror::Error;

/// Failure modes of a single integration call.
///
/// Every variant aborts the call; no partial trajectory is returned.
#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("Time grid is empty; at least one time point is required.")]
    EmptyGrid,

    #[error(
        "Time grid must be strictly increasing (t[{index}] = {current} does not exceed {previous})."
    )]
    NonIncreasingGrid {
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("Initial state must have positive dimension.")]
    EmptyState,

    #[error(
        "State dimension mismatch at step {step} (t = {time}): expected {expected} components, \
         got {actual}."
    )]
    DimensionMismatch {
        step: usize,
        time: f64,
        expected: usize,
        actual: usize,
    },

    #[error("Implicit solve did not converge at step {step} (t = {time})")]
    NonConvergence {
        step: usize,
        time: f64,
        #[source]
        source: RootSolveError,
    },

    #[error("Invalid solver settings: {0}")]
    InvalidSettings(String),
}

/// Failure modes reported by a [`RootSolver`](crate::roots::RootSolver).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RootSolveError {
    #[error("failed to converge in {iterations} iterations (‖R(z)‖ = {residual_norm})")]
    MaxIterations { iterations: usize, residual_norm: f64 },

    #[error("Jacobian is singular at iteration {iteration}")]
    SingularJacobian { iteration: usize },

    #[error("residual became non-finite at iteration {iteration}")]
    NonFinite { iteration: usize },

    #[error("residual has {actual} components, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("{0}")]
    InvalidSettings(String),
}

//! Shared outer loop for all steppers.
//!
//! Every entry point takes a vector field, an initial state `y0` of
//! dimension `n` and a strictly increasing grid of `m` times, and returns an
//! `m × n` [`Trajectory`] whose first row is `y0`. A single-point grid
//! returns immediately without evaluating the field.

use crate::error::IntegrationError;
use crate::evaluator::Evaluator;
use crate::grid;
use crate::roots::{NewtonSolver, RootSolver};
use crate::solvers::{ExplicitEuler, Heun, ImplicitEuler, RK4};
use crate::trajectory::Trajectory;
use crate::traits::{Stepper, VectorField};
use log::debug;

/// Integrates `field` over `times` with the given stepper.
///
/// # Errors
///
/// Fails before the first step on an empty or non-increasing grid, an empty
/// initial state, a field whose declared dimension differs from `y0`, or
/// invalid stepper settings. Fails during integration if the field returns
/// the wrong dimension or an implicit solve does not converge.
pub fn integrate<S, F>(
    stepper: &mut S,
    field: &F,
    y0: &[f64],
    times: &[f64],
) -> Result<Trajectory, IntegrationError>
where
    S: Stepper,
    F: VectorField + ?Sized,
{
    grid::validate(times)?;
    if y0.is_empty() {
        return Err(IntegrationError::EmptyState);
    }
    let dim = y0.len();
    if let Some(expected) = field.dimension() {
        if expected != dim {
            return Err(IntegrationError::DimensionMismatch {
                step: 0,
                time: times[0],
                expected,
                actual: dim,
            });
        }
    }
    stepper.prepare(dim)?;

    debug!(
        "{}: integrating {} points of dimension {} over [{}, {}]",
        stepper.name(),
        times.len(),
        dim,
        times[0],
        times[times.len() - 1]
    );

    let mut evaluator = Evaluator::new(field, dim);
    let mut states = Vec::with_capacity(times.len() * dim);
    states.extend_from_slice(y0);
    let mut next = vec![0.0; dim];

    for (i, pair) in times.windows(2).enumerate() {
        evaluator.begin_step(i);
        let current = &states[i * dim..(i + 1) * dim];
        stepper.step(&mut evaluator, pair[0], pair[1], current, &mut next)?;
        states.extend_from_slice(&next);
    }

    debug!(
        "{}: finished with {} field evaluations",
        stepper.name(),
        evaluator.evaluations()
    );

    Ok(Trajectory::new(
        times.to_vec(),
        dim,
        states,
        evaluator.evaluations(),
    ))
}

/// Forward Euler over `times`.
pub fn explicit_euler<F: VectorField + ?Sized>(
    field: &F,
    y0: &[f64],
    times: &[f64],
) -> Result<Trajectory, IntegrationError> {
    integrate(&mut ExplicitEuler, field, y0, times)
}

/// Backward Euler over `times`, solving each step with the default Newton solver.
pub fn implicit_euler<F: VectorField + ?Sized>(
    field: &F,
    y0: &[f64],
    times: &[f64],
) -> Result<Trajectory, IntegrationError> {
    implicit_euler_with(field, y0, times, NewtonSolver::default())
}

/// Backward Euler over `times` with a caller-supplied root solver.
pub fn implicit_euler_with<F, R>(
    field: &F,
    y0: &[f64],
    times: &[f64],
    solver: R,
) -> Result<Trajectory, IntegrationError>
where
    F: VectorField + ?Sized,
    R: RootSolver,
{
    integrate(&mut ImplicitEuler::new(solver), field, y0, times)
}

/// Heun's method over `times`.
pub fn heun<F: VectorField + ?Sized>(
    field: &F,
    y0: &[f64],
    times: &[f64],
) -> Result<Trajectory, IntegrationError> {
    integrate(&mut Heun::new(), field, y0, times)
}

/// Classical fourth-order Runge-Kutta over `times`.
pub fn runge_kutta<F: VectorField + ?Sized>(
    field: &F,
    y0: &[f64],
    times: &[f64],
) -> Result<Trajectory, IntegrationError> {
    integrate(&mut RK4::new(), field, y0, times)
}

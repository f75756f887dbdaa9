//! Root-finding strategies for implicit steppers.
//!
//! A [`RootSolver`] drives a residual `R(z)` to zero from an initial guess.
//! The residual closure may itself fail (for example when the vector field
//! returns the wrong dimension); such failures pass through untouched, while
//! the solver's own failures are converted into the caller's error type.

use crate::error::RootSolveError;
use log::trace;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Converged root and solve statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Root {
    pub point: Vec<f64>,
    pub residual_norm: f64,
    pub iterations: usize,
}

/// Strategy for solving `R(z) = 0`.
pub trait RootSolver {
    /// Rejects unusable settings before any residual is evaluated.
    fn validate(&self) -> Result<(), RootSolveError> {
        Ok(())
    }

    fn solve<R, E>(&self, residual: R, guess: &[f64]) -> Result<Root, E>
    where
        R: FnMut(&[f64]) -> Result<Vec<f64>, E>,
        E: From<RootSolveError>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NewtonSettings {
    pub max_steps: usize,
    pub damping: f64,
    /// Absolute bound on ‖R(z)‖.
    pub tolerance: f64,
    /// Relative bound on the Newton update, scaled by ‖z‖.
    pub step_tolerance: f64,
}

impl Default for NewtonSettings {
    fn default() -> Self {
        Self {
            max_steps: 50,
            damping: 1.0,
            tolerance: 1e-10,
            step_tolerance: 1.49012e-8,
        }
    }
}

/// Newton's method with a forward-difference Jacobian and an LU solve.
///
/// The guess is returned untouched only when its residual is exactly zero;
/// otherwise at least one update is taken before the tolerances are checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewtonSolver {
    pub settings: NewtonSettings,
}

impl NewtonSolver {
    pub fn new(settings: NewtonSettings) -> Self {
        Self { settings }
    }
}

impl RootSolver for NewtonSolver {
    fn validate(&self) -> Result<(), RootSolveError> {
        let settings = &self.settings;
        if settings.max_steps == 0 {
            return Err(RootSolveError::InvalidSettings(
                "max_steps must be greater than zero.".into(),
            ));
        }
        if !(settings.damping > 0.0) {
            return Err(RootSolveError::InvalidSettings(
                "damping must be positive.".into(),
            ));
        }
        if !(settings.tolerance > 0.0) || !(settings.step_tolerance > 0.0) {
            return Err(RootSolveError::InvalidSettings(
                "tolerance must be positive.".into(),
            ));
        }
        Ok(())
    }

    fn solve<R, E>(&self, mut residual: R, guess: &[f64]) -> Result<Root, E>
    where
        R: FnMut(&[f64]) -> Result<Vec<f64>, E>,
        E: From<RootSolveError>,
    {
        self.validate()?;
        let settings = self.settings;
        let dim = guess.len();

        let mut point = guess.to_vec();
        let mut value = residual(&point)?;
        check_residual(&value, dim, 0)?;
        let mut residual_norm = l2_norm(&value);
        let mut iterations = 0usize;

        while residual_norm > 0.0 {
            if iterations >= settings.max_steps {
                return Err(RootSolveError::MaxIterations {
                    iterations,
                    residual_norm,
                }
                .into());
            }

            let jacobian = forward_difference_jacobian(&mut residual, &point, &value, iterations)?;
            let delta = solve_linear_system(dim, &jacobian, &value)
                .ok_or(RootSolveError::SingularJacobian {
                    iteration: iterations,
                })?;

            for i in 0..dim {
                point[i] -= settings.damping * delta[i];
            }
            iterations += 1;

            value = residual(&point)?;
            check_residual(&value, dim, iterations)?;
            residual_norm = l2_norm(&value);

            let step_norm = settings.damping * l2_norm(&delta);
            trace!(
                "newton iteration {iterations}: ‖R(z)‖ = {residual_norm:e}, ‖Δz‖ = {step_norm:e}"
            );

            if residual_norm <= settings.tolerance
                || step_norm <= settings.step_tolerance * (settings.step_tolerance + l2_norm(&point))
            {
                break;
            }
        }

        Ok(Root {
            point,
            residual_norm,
            iterations,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FixedPointSettings {
    pub max_iterations: usize,
    /// Relative bound on ‖R(z)‖, scaled by `1 + ‖z‖`.
    pub tolerance: f64,
}

impl Default for FixedPointSettings {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-12,
        }
    }
}

/// Derivative-free functional iteration `z ← z + R(z)`.
///
/// For the implicit Euler residual this is `z ← y + dt·f(z)`, which only
/// contracts while `dt` times the field's Lipschitz constant stays below one.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPointSolver {
    pub settings: FixedPointSettings,
}

impl FixedPointSolver {
    pub fn new(settings: FixedPointSettings) -> Self {
        Self { settings }
    }
}

impl RootSolver for FixedPointSolver {
    fn validate(&self) -> Result<(), RootSolveError> {
        if self.settings.max_iterations == 0 {
            return Err(RootSolveError::InvalidSettings(
                "max_iterations must be greater than zero.".into(),
            ));
        }
        if !(self.settings.tolerance > 0.0) {
            return Err(RootSolveError::InvalidSettings(
                "tolerance must be positive.".into(),
            ));
        }
        Ok(())
    }

    fn solve<R, E>(&self, mut residual: R, guess: &[f64]) -> Result<Root, E>
    where
        R: FnMut(&[f64]) -> Result<Vec<f64>, E>,
        E: From<RootSolveError>,
    {
        self.validate()?;
        let settings = self.settings;
        let dim = guess.len();
        let mut point = guess.to_vec();

        let mut iteration = 0usize;
        loop {
            let value = residual(&point)?;
            check_residual(&value, dim, iteration)?;
            let residual_norm = l2_norm(&value);
            trace!("fixed-point iteration {iteration}: ‖R(z)‖ = {residual_norm:e}");

            if residual_norm <= settings.tolerance * (1.0 + l2_norm(&point)) {
                return Ok(Root {
                    point,
                    residual_norm,
                    iterations: iteration,
                });
            }
            if iteration == settings.max_iterations {
                return Err(RootSolveError::MaxIterations {
                    iterations: iteration,
                    residual_norm,
                }
                .into());
            }

            for (z, r) in point.iter_mut().zip(&value) {
                *z += r;
            }
            iteration += 1;
        }
    }
}

fn check_residual(value: &[f64], dim: usize, iteration: usize) -> Result<(), RootSolveError> {
    if value.len() != dim {
        return Err(RootSolveError::DimensionMismatch {
            expected: dim,
            actual: value.len(),
        });
    }
    if value.iter().any(|v| !v.is_finite()) {
        return Err(RootSolveError::NonFinite { iteration });
    }
    Ok(())
}

/// Row-major Jacobian of `residual` at `point`, one extra residual call per column.
fn forward_difference_jacobian<R, E>(
    residual: &mut R,
    point: &[f64],
    value: &[f64],
    iteration: usize,
) -> Result<Vec<f64>, E>
where
    R: FnMut(&[f64]) -> Result<Vec<f64>, E>,
    E: From<RootSolveError>,
{
    let dim = point.len();
    let sqrt_eps = f64::EPSILON.sqrt();
    let mut jacobian = vec![0.0; dim * dim];
    let mut shifted = point.to_vec();

    for j in 0..dim {
        let original = point[j];
        let trial = original + sqrt_eps * original.abs().max(1.0);
        let h = trial - original;
        shifted[j] = trial;

        let perturbed = residual(&shifted)?;
        check_residual(&perturbed, dim, iteration)?;
        for i in 0..dim {
            jacobian[i * dim + j] = (perturbed[i] - value[i]) / h;
        }

        shifted[j] = original;
    }

    Ok(jacobian)
}

fn solve_linear_system(dim: usize, jacobian: &[f64], residual: &[f64]) -> Option<Vec<f64>> {
    let j_matrix = DMatrix::from_row_slice(dim, dim, jacobian);
    let rhs = DVector::from_column_slice(residual);
    j_matrix
        .lu()
        .solve(&rhs)
        .filter(|v| v.iter().all(|x| x.is_finite()))
        .map(|v| v.iter().cloned().collect())
}

fn l2_norm(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}

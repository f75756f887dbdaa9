use crate::error::IntegrationError;
use crate::evaluator::Evaluator;

/// Right-hand side of an ODE system `dy/dt = f(y, t)`.
///
/// Implementations must accept any `(state, time)` pair a stepper presents,
/// including times off the integration grid and trial states produced by an
/// implicit solve. Closures of the form `Fn(&[f64], f64) -> Vec<f64>`
/// implement this trait automatically.
pub trait VectorField {
    /// Evaluates the derivative at state `y` and time `t`.
    /// The result must have the same length as `y`.
    fn eval(&self, y: &[f64], t: f64) -> Vec<f64>;

    /// Fixed state dimension, when the field has one.
    fn dimension(&self) -> Option<usize> {
        None
    }
}

impl<F> VectorField for F
where
    F: Fn(&[f64], f64) -> Vec<f64> + ?Sized,
{
    fn eval(&self, y: &[f64], t: f64) -> Vec<f64> {
        self(y, t)
    }
}

/// A fixed-step scheme that advances a state from one grid point to the next.
pub trait Stepper {
    /// Human-readable scheme name.
    fn name(&self) -> &'static str;

    /// Called once per integration before the first step.
    /// Sizes scratch buffers and rejects invalid configuration.
    fn prepare(&mut self, _dimension: usize) -> Result<(), IntegrationError> {
        Ok(())
    }

    /// Advances `state` (at `t0`) to `t1`, writing the result into `next`.
    fn step<F: VectorField + ?Sized>(
        &mut self,
        field: &mut Evaluator<'_, F>,
        t0: f64,
        t1: f64,
        state: &[f64],
        next: &mut [f64],
    ) -> Result<(), IntegrationError>;
}

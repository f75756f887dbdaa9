use crate::error::IntegrationError;
use crate::traits::VectorField;

/// Per-call view of a vector field.
///
/// Counts evaluations and checks the returned dimension, so the field itself
/// stays free of bookkeeping. One evaluator is created per integration call
/// and its count is handed back with the trajectory.
pub struct Evaluator<'a, F: ?Sized> {
    field: &'a F,
    dimension: usize,
    step: usize,
    evaluations: usize,
}

impl<'a, F: VectorField + ?Sized> Evaluator<'a, F> {
    pub fn new(field: &'a F, dimension: usize) -> Self {
        Self {
            field,
            dimension,
            step: 0,
            evaluations: 0,
        }
    }

    pub(crate) fn begin_step(&mut self, step: usize) {
        self.step = step;
    }

    /// Evaluates the field, failing if the derivative has the wrong length.
    pub fn eval(&mut self, y: &[f64], t: f64) -> Result<Vec<f64>, IntegrationError> {
        self.evaluations += 1;
        let derivative = self.field.eval(y, t);
        if derivative.len() != self.dimension {
            return Err(IntegrationError::DimensionMismatch {
                step: self.step,
                time: t,
                expected: self.dimension,
                actual: derivative.len(),
            });
        }
        Ok(derivative)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Index of the step currently being taken.
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }
}

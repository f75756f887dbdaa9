use nalgebra::DMatrix;
use serde::Serialize;

/// Solution of one integration call.
///
/// States are stored row-major: row `i` is the solution at `times[i]` and
/// row 0 is the initial condition exactly as supplied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    times: Vec<f64>,
    dimension: usize,
    states: Vec<f64>,
    evaluations: usize,
}

impl Trajectory {
    pub(crate) fn new(times: Vec<f64>, dimension: usize, states: Vec<f64>, evaluations: usize) -> Self {
        debug_assert_eq!(times.len() * dimension, states.len());
        Self {
            times,
            dimension,
            states,
            evaluations,
        }
    }

    /// Number of rows (time points).
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Number of state components per row.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// State at `times[index]`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn row(&self, index: usize) -> &[f64] {
        let start = index * self.dimension;
        &self.states[start..start + self.dimension]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.states.chunks_exact(self.dimension)
    }

    /// Time series of a single state component.
    pub fn component(&self, index: usize) -> Vec<f64> {
        self.rows().map(|row| row[index]).collect()
    }

    pub fn initial_state(&self) -> &[f64] {
        self.row(0)
    }

    pub fn final_state(&self) -> &[f64] {
        self.row(self.len() - 1)
    }

    /// Total vector field evaluations performed while building this trajectory.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Copies the states into an `m × n` matrix.
    pub fn to_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_row_slice(self.len(), self.dimension, &self.states)
    }
}

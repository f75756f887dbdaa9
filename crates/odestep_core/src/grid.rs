use crate::error::IntegrationError;
use serde::{Deserialize, Serialize};

/// A validated time grid: non-empty and strictly increasing.
///
/// Spacing does not need to be uniform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct TimeGrid(Vec<f64>);

impl TimeGrid {
    pub fn new(points: Vec<f64>) -> Result<Self, IntegrationError> {
        validate(&points)?;
        Ok(Self(points))
    }

    /// `count` evenly spaced points from `start` to `end` inclusive.
    pub fn uniform(start: f64, end: f64, count: usize) -> Result<Self, IntegrationError> {
        Self::new(linspace(start, end, count))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a validated grid.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn start(&self) -> f64 {
        self.0[0]
    }

    pub fn end(&self) -> f64 {
        self.0[self.0.len() - 1]
    }
}

impl TryFrom<Vec<f64>> for TimeGrid {
    type Error = IntegrationError;

    fn try_from(points: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<TimeGrid> for Vec<f64> {
    fn from(grid: TimeGrid) -> Self {
        grid.0
    }
}

impl AsRef<[f64]> for TimeGrid {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// Evenly spaced samples over `[start, end]`.
///
/// Returns an empty vector for `count == 0` and `[start]` for `count == 1`.
/// The last sample is exactly `end`.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            let mut points: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
            points[count - 1] = end;
            points
        }
    }
}

/// Rejects empty grids and grids that are not strictly increasing.
/// NaN entries fail the ordering check.
pub(crate) fn validate(times: &[f64]) -> Result<(), IntegrationError> {
    if times.is_empty() {
        return Err(IntegrationError::EmptyGrid);
    }
    for (index, pair) in times.windows(2).enumerate() {
        let (previous, current) = (pair[0], pair[1]);
        if !(current > previous) {
            return Err(IntegrationError::NonIncreasingGrid {
                index: index + 1,
                previous,
                current,
            });
        }
    }
    Ok(())
}

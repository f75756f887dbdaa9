//! Textbook problems used to compare the steppers.

use crate::traits::VectorField;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const GRAVITATIONAL_CONSTANT: f64 = 6.674e-11;
pub const SOLAR_MASS: f64 = 1.99e30;
pub const ASTRONOMICAL_UNIT: f64 = 149.6e9;
pub const SECONDS_PER_YEAR: f64 = 60.0 * 60.0 * 24.0 * 365.0;

/// Lorenz attractor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lorenz {
    pub sigma: f64,
    pub rho: f64,
    pub beta: f64,
}

impl Default for Lorenz {
    fn default() -> Self {
        Self {
            sigma: 10.0,
            rho: 28.0,
            beta: 8.0 / 3.0,
        }
    }
}

impl VectorField for Lorenz {
    fn eval(&self, y: &[f64], _t: f64) -> Vec<f64> {
        let (x, y, z) = (y[0], y[1], y[2]);
        vec![
            self.sigma * (y - x),
            x * (self.rho - z) - y,
            x * y - self.beta * z,
        ]
    }

    fn dimension(&self) -> Option<usize> {
        Some(3)
    }
}

/// Three well-mixed rooms (kitchen, bar, seating) exchanging a pollutant.
///
/// `dy/dt = ((Q + E)·y + G) / V`, with `Q` the through-flow, `E` the
/// exchange between neighbouring rooms, `G` the sources and `V` the volumes.
#[derive(Debug, Clone, PartialEq)]
pub struct Transport {
    pub flow: Matrix3<f64>,
    pub exchange: Matrix3<f64>,
    pub source: Vector3<f64>,
    pub volume: Vector3<f64>,
}

impl Default for Transport {
    fn default() -> Self {
        Self {
            flow: Matrix3::new(
                -200.0, 0.0, 0.0, //
                200.0, -200.0, 0.0, //
                0.0, 200.0, -200.0,
            ),
            exchange: Matrix3::new(
                -25.0, 25.0, 0.0, //
                25.0, -75.0, 50.0, //
                0.0, 50.0, -50.0,
            ),
            source: Vector3::new(2000.0 + 200.0 * 2.0, 1000.0, 2000.0),
            volume: Vector3::new(150.0, 150.0, 300.0),
        }
    }
}

impl Transport {
    pub const ROOMS: [&'static str; 3] = ["Kitchen", "Bar", "Seating"];

    /// Combined transfer matrix `Q + E`.
    pub fn transfer(&self) -> Matrix3<f64> {
        self.flow + self.exchange
    }
}

impl VectorField for Transport {
    fn eval(&self, y: &[f64], _t: f64) -> Vec<f64> {
        let state = Vector3::from_column_slice(y);
        let rate = (self.transfer() * state + self.source).component_div(&self.volume);
        rate.iter().copied().collect()
    }

    fn dimension(&self) -> Option<usize> {
        Some(3)
    }
}

/// Planar two-body orbit around a fixed central mass.
///
/// State is `[x, y, u, v]`: position then velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orbit {
    /// Gravitational parameter `G·M`.
    pub gm: f64,
}

impl Default for Orbit {
    fn default() -> Self {
        Self {
            gm: GRAVITATIONAL_CONSTANT * SOLAR_MASS,
        }
    }
}

impl Orbit {
    /// Circular orbit of radius `radius` starting on the positive x axis.
    pub fn circular_state(&self, radius: f64) -> Vec<f64> {
        vec![radius, 0.0, 0.0, (self.gm / radius).sqrt()]
    }
}

impl VectorField for Orbit {
    fn eval(&self, y: &[f64], _t: f64) -> Vec<f64> {
        let (px, py) = (y[0], y[1]);
        let r = (px * px + py * py).sqrt();
        let scale = -self.gm / (r * r * r);
        vec![y[2], y[3], scale * px, scale * py]
    }

    fn dimension(&self) -> Option<usize> {
        Some(4)
    }
}

/// Linear decay `dy/dt = -rate·y`, applied componentwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExponentialDecay {
    pub rate: f64,
}

impl ExponentialDecay {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }

    /// Closed-form solution `y0·exp(-rate·t)`.
    pub fn exact(&self, y0: &[f64], t: f64) -> Vec<f64> {
        let factor = (-self.rate * t).exp();
        y0.iter().map(|v| v * factor).collect()
    }
}

impl VectorField for ExponentialDecay {
    fn eval(&self, y: &[f64], _t: f64) -> Vec<f64> {
        y.iter().map(|v| -self.rate * v).collect()
    }
}

/// The built-in comparison problems, selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Problem {
    Lorenz,
    Transport,
    Orbit,
}

impl Problem {
    pub const ALL: [Problem; 3] = [Problem::Lorenz, Problem::Transport, Problem::Orbit];

    /// Vector field with default parameters.
    pub fn field(self) -> Box<dyn VectorField> {
        match self {
            Problem::Lorenz => Box::new(Lorenz::default()),
            Problem::Transport => Box::new(Transport::default()),
            Problem::Orbit => Box::new(Orbit::default()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Problem::Lorenz => "lorenz",
            Problem::Transport => "transport",
            Problem::Orbit => "orbit",
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Problem {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Problem::ALL
            .into_iter()
            .find(|problem| problem.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("Unknown problem \"{s}\" (expected lorenz, transport or orbit)."))
    }
}

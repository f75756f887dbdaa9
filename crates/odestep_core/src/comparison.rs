//! Side-by-side runs of all four steppers on one problem.

use crate::error::IntegrationError;
use crate::grid::{self, TimeGrid};
use crate::integrate::{explicit_euler, heun, implicit_euler_with, runge_kutta};
use crate::models::{Orbit, Problem, ASTRONOMICAL_UNIT, SECONDS_PER_YEAR};
use crate::roots::{NewtonSettings, NewtonSolver};
use crate::trajectory::Trajectory;
use crate::traits::VectorField;
use anyhow::{anyhow, bail, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest orbit preset, in years. Each year adds 365 daily samples.
pub const MAX_ORBIT_YEARS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    ExplicitEuler,
    ImplicitEuler,
    Heun,
    RungeKutta4,
}

impl Method {
    pub const ALL: [Method; 4] = [
        Method::ExplicitEuler,
        Method::ImplicitEuler,
        Method::Heun,
        Method::RungeKutta4,
    ];

    /// Legend label for plots.
    pub fn label(self) -> &'static str {
        match self {
            Method::ExplicitEuler => "Explicit Euler",
            Method::ImplicitEuler => "Implicit Euler",
            Method::Heun => "Heun",
            Method::RungeKutta4 => "Runge Kutta",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Method::ExplicitEuler => "explicit_euler",
            Method::ImplicitEuler => "implicit_euler",
            Method::Heun => "heun",
            Method::RungeKutta4 => "rk4",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Method {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim();
        Method::ALL
            .into_iter()
            .find(|method| method.short_name().eq_ignore_ascii_case(key))
            .ok_or_else(|| {
                anyhow!(
                    "Unknown method \"{s}\" (expected explicit_euler, implicit_euler, heun or rk4)."
                )
            })
    }
}

/// Tunables shared by every comparison run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverSettings {
    #[serde(default)]
    pub newton: NewtonSettings,
}

/// Integrates with the stepper selected by `method`.
pub fn integrate_with<F: VectorField + ?Sized>(
    method: Method,
    field: &F,
    y0: &[f64],
    times: &[f64],
    settings: &SolverSettings,
) -> Result<Trajectory, IntegrationError> {
    match method {
        Method::ExplicitEuler => explicit_euler(field, y0, times),
        Method::ImplicitEuler => {
            implicit_euler_with(field, y0, times, NewtonSolver::new(settings.newton))
        }
        Method::Heun => heun(field, y0, times),
        Method::RungeKutta4 => runge_kutta(field, y0, times),
    }
}

/// Outcome of one method in a comparison.
///
/// Exactly one of `trajectory` and `failure` is set.
#[derive(Debug, Clone, Serialize)]
pub struct MethodRun {
    pub method: Method,
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trajectory: Option<Trajectory>,
    /// Full error chain when the method aborted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl MethodRun {
    fn new(method: Method, outcome: Result<Trajectory, IntegrationError>) -> Self {
        let (trajectory, failure) = match outcome {
            Ok(trajectory) => (Some(trajectory), None),
            Err(err) => {
                let err = anyhow::Error::new(err)
                    .context(format!("{} integration failed", method.label()));
                warn!("{err:#}");
                (None, Some(format!("{err:#}")))
            }
        };
        Self {
            method,
            label: method.label(),
            trajectory,
            failure,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.trajectory.is_some()
    }
}

/// Runs all four methods on the same inputs, in [`Method::ALL`] order.
///
/// A malformed grid or empty initial state fails the whole comparison.
/// A method that aborts mid-run is recorded in its [`MethodRun`] and the
/// other methods still run.
pub fn compare_methods<F: VectorField + ?Sized>(
    field: &F,
    y0: &[f64],
    times: &[f64],
    settings: &SolverSettings,
) -> Result<Vec<MethodRun>> {
    grid::validate(times).context("Invalid comparison inputs")?;
    if y0.is_empty() {
        return Err(IntegrationError::EmptyState).context("Invalid comparison inputs");
    }

    Ok(Method::ALL
        .into_iter()
        .map(|method| MethodRun::new(method, integrate_with(method, field, y0, times, settings)))
        .collect())
}

/// A problem together with the initial state and grid it is plotted over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub problem: Problem,
    pub initial_state: Vec<f64>,
    pub times: TimeGrid,
}

impl Scenario {
    /// Lorenz attractor from (5, 5, 5) over ten time units.
    pub fn lorenz() -> Result<Self> {
        Ok(Self {
            problem: Problem::Lorenz,
            initial_state: vec![5.0, 5.0, 5.0],
            times: TimeGrid::uniform(0.0, 10.0, 500)?,
        })
    }

    /// Clean rooms over twelve hours.
    pub fn transport() -> Result<Self> {
        Ok(Self {
            problem: Problem::Transport,
            initial_state: vec![0.0, 0.0, 0.0],
            times: TimeGrid::uniform(0.0, 12.0, 20)?,
        })
    }

    /// Earth-like circular orbit, sampled daily for `years` years.
    pub fn orbit(years: u32) -> Result<Self> {
        if years == 0 || years > MAX_ORBIT_YEARS {
            bail!("Orbit length must be between 1 and {MAX_ORBIT_YEARS} years (got {years}).");
        }
        let days = 365 * years as usize;
        Ok(Self {
            problem: Problem::Orbit,
            initial_state: Orbit::default().circular_state(ASTRONOMICAL_UNIT),
            times: TimeGrid::uniform(0.0, f64::from(years) * SECONDS_PER_YEAR, days)?,
        })
    }

    /// Preset for `problem`; `years` only affects the orbit.
    pub fn for_problem(problem: Problem, years: u32) -> Result<Self> {
        match problem {
            Problem::Lorenz => Self::lorenz(),
            Problem::Transport => Self::transport(),
            Problem::Orbit => Self::orbit(years),
        }
    }

    pub fn run(&self, settings: &SolverSettings) -> Result<Vec<MethodRun>> {
        let field = self.problem.field();
        compare_methods(
            field.as_ref(),
            &self.initial_state,
            self.times.as_slice(),
            settings,
        )
        .with_context(|| format!("{} comparison failed", self.problem))
    }
}

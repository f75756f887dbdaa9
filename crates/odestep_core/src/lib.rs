//! Fixed-step integrators for ordinary differential equations.
//!
//! Key components:
//! - **Traits**: `VectorField` (the right-hand side `f(y, t)`) and `Stepper`
//!   (one step of a time-marching scheme).
//! - **Solvers**: explicit Euler, implicit Euler, Heun and classical RK4,
//!   all sharing the `integrate` loop and its `Trajectory` output.
//! - **Roots**: pluggable nonlinear solvers for the implicit step
//!   (Newton with a finite-difference Jacobian, fixed-point iteration).
//! - **Models** and **Comparison**: the Lorenz, transport and orbit problems
//!   and helpers that run every scheme on them side by side.
pub mod comparison;
pub mod error;
pub mod evaluator;
pub mod grid;
pub mod integrate;
pub mod models;
pub mod roots;
pub mod solvers;
pub mod trajectory;
pub mod traits;

pub use comparison::{
    compare_methods, integrate_with, Method, MethodRun, Scenario, SolverSettings, MAX_ORBIT_YEARS,
};
pub use error::{IntegrationError, RootSolveError};
pub use grid::{linspace, TimeGrid};
pub use integrate::{
    explicit_euler, heun, implicit_euler, implicit_euler_with, integrate, runge_kutta,
};
pub use trajectory::Trajectory;
pub use traits::{Stepper, VectorField};

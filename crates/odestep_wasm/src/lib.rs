//! WASM bridge for `odestep_core`.
//!
//! Exposes a stepping integrator for the built-in problems plus one-shot
//! runners that return serialized trajectories for plotting in JavaScript.

mod comparison;
mod system;

pub use comparison::{compare_problem, compare_scenario, integrate_problem, problem_scenario};
pub use system::WasmIntegrator;

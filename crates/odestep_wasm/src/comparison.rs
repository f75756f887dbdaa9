//! Whole-trajectory runners returning serialized results.

use anyhow::{Context, Result};
use odestep_core::models::Problem;
use odestep_core::{integrate_with, Method, MethodRun, Scenario, SolverSettings, Trajectory};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

fn to_js_error(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{err:#}"))
}

pub(crate) fn run_problem(
    problem_name: &str,
    method_name: &str,
    initial_state: &[f64],
    times: &[f64],
) -> Result<Trajectory> {
    let problem: Problem = problem_name.parse()?;
    let method: Method = method_name.parse()?;
    let field = problem.field();
    integrate_with(
        method,
        field.as_ref(),
        initial_state,
        times,
        &SolverSettings::default(),
    )
    .with_context(|| format!("{} on {problem} failed", method.label()))
}

pub(crate) fn preset(problem_name: &str, years: u32) -> Result<Scenario> {
    let problem: Problem = problem_name.parse()?;
    Scenario::for_problem(problem, years)
}

pub(crate) fn run_comparison(problem_name: &str, years: u32) -> Result<Vec<MethodRun>> {
    preset(problem_name, years)?.run(&SolverSettings::default())
}

/// Integrates a built-in problem with one method over an explicit grid.
#[wasm_bindgen]
pub fn integrate_problem(
    problem: &str,
    method: &str,
    initial_state: Vec<f64>,
    times: Vec<f64>,
) -> Result<JsValue, JsValue> {
    let trajectory = run_problem(problem, method, &initial_state, &times).map_err(to_js_error)?;
    to_value(&trajectory)
        .map_err(|err| JsValue::from_str(&format!("Failed to serialize trajectory: {err}")))
}

/// Runs all four methods on the problem's preset scenario.
///
/// A method that aborts carries a `failure` message instead of a trajectory.
#[wasm_bindgen]
pub fn compare_problem(problem: &str, years: u32) -> Result<JsValue, JsValue> {
    let runs = run_comparison(problem, years).map_err(to_js_error)?;
    to_value(&runs).map_err(|err| JsValue::from_str(&format!("Serialization error: {err}")))
}

/// Runs all four methods on a scenario built in JavaScript.
///
/// The time grid is validated while the scenario is deserialized.
#[wasm_bindgen]
pub fn compare_scenario(scenario: JsValue) -> Result<JsValue, JsValue> {
    let scenario: Scenario = from_value(scenario)
        .map_err(|err| JsValue::from_str(&format!("Invalid scenario: {err}")))?;
    let runs = scenario
        .run(&SolverSettings::default())
        .map_err(to_js_error)?;
    to_value(&runs).map_err(|err| JsValue::from_str(&format!("Serialization error: {err}")))
}

/// Preset initial state and time grid for a problem.
#[wasm_bindgen]
pub fn problem_scenario(problem: &str, years: u32) -> Result<JsValue, JsValue> {
    let scenario = preset(problem, years).map_err(to_js_error)?;
    to_value(&scenario).map_err(|err| JsValue::from_str(&format!("Serialization error: {err}")))
}

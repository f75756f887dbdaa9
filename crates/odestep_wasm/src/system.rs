//! Step-by-step integration of a built-in problem, for animated front-ends.

use odestep_core::models::Problem;
use odestep_core::{integrate_with, Method, SolverSettings, VectorField};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmIntegrator {
    pub(crate) problem: Problem,
    field: Box<dyn VectorField>,
    pub(crate) method: Method,
    settings: SolverSettings,
    state: Vec<f64>,
    t: f64,
    evaluations: usize,
}

#[wasm_bindgen]
impl WasmIntegrator {
    #[wasm_bindgen(constructor)]
    pub fn new(problem_name: &str, method_name: &str) -> Result<WasmIntegrator, JsValue> {
        console_error_panic_hook::set_once();

        let problem: Problem = problem_name
            .parse()
            .map_err(|err: anyhow::Error| JsValue::from_str(&err.to_string()))?;
        let method: Method = method_name
            .parse()
            .map_err(|err: anyhow::Error| JsValue::from_str(&err.to_string()))?;
        let field = problem.field();
        let dim = field.dimension().unwrap_or(0);

        Ok(WasmIntegrator {
            problem,
            field,
            method,
            settings: SolverSettings::default(),
            state: vec![0.0; dim],
            t: 0.0,
            evaluations: 0,
        })
    }

    pub fn set_state(&mut self, state: &[f64]) {
        self.state = state.to_vec();
    }

    pub fn get_state(&self) -> Vec<f64> {
        self.state.clone()
    }

    pub fn set_t(&mut self, t: f64) {
        self.t = t;
    }

    pub fn get_t(&self) -> f64 {
        self.t
    }

    /// Replaces the solver settings from a plain object such as
    /// `{ newton: { max_steps: 20, damping: 1.0, tolerance: 1e-8, step_tolerance: 1e-8 } }`.
    pub fn set_settings(&mut self, settings: JsValue) -> Result<(), JsValue> {
        self.settings = serde_wasm_bindgen::from_value(settings)
            .map_err(|err| JsValue::from_str(&format!("Invalid solver settings: {err}")))?;
        Ok(())
    }

    /// Total field evaluations across all steps taken so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn step(&mut self, dt: f64) -> Result<(), JsValue> {
        let times = [self.t, self.t + dt];
        let trajectory = integrate_with(
            self.method,
            self.field.as_ref(),
            &self.state,
            &times,
            &self.settings,
        )
        .map_err(|err| JsValue::from_str(&format!("{:#}", anyhow::Error::new(err))))?;

        self.state = trajectory.final_state().to_vec();
        self.t = times[1];
        self.evaluations += trajectory.evaluations();
        Ok(())
    }
}

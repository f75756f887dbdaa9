use crate::error::{IntegrationError, RootSolveError};
use crate::evaluator::Evaluator;
use crate::roots::{NewtonSolver, RootSolver};
use crate::traits::{Stepper, VectorField};
use log::warn;

/// Forward Euler: `y_next = y + dt * f(y, t0)`.
///
/// First order, one field evaluation per step. Diverges once `dt` leaves the
/// stability region of the local Jacobian.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitEuler;

impl Stepper for ExplicitEuler {
    fn name(&self) -> &'static str {
        "Explicit Euler"
    }

    fn step<F: VectorField + ?Sized>(
        &mut self,
        field: &mut Evaluator<'_, F>,
        t0: f64,
        t1: f64,
        state: &[f64],
        next: &mut [f64],
    ) -> Result<(), IntegrationError> {
        let dt = t1 - t0;
        let k1 = field.eval(state, t0)?;
        for i in 0..state.len() {
            next[i] = state[i] + k1[i] * dt;
        }
        Ok(())
    }
}

/// Backward Euler: solves `z = y + dt * f(z, t1)` for the next state.
///
/// The solve is seeded with `y + dt * f(y, t1)` and delegated to the
/// configured [`RootSolver`]. A solver failure aborts the integration with
/// [`IntegrationError::NonConvergence`].
#[derive(Debug, Clone)]
pub struct ImplicitEuler<S = NewtonSolver> {
    solver: S,
    guess: Vec<f64>,
}

impl Default for ImplicitEuler {
    fn default() -> Self {
        Self::new(NewtonSolver::default())
    }
}

impl<S: RootSolver> ImplicitEuler<S> {
    pub fn new(solver: S) -> Self {
        Self {
            solver,
            guess: Vec::new(),
        }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }
}

/// Residual evaluation failed, or the root solver gave up.
enum ImplicitFailure {
    Field(IntegrationError),
    Solve(RootSolveError),
}

impl From<RootSolveError> for ImplicitFailure {
    fn from(err: RootSolveError) -> Self {
        ImplicitFailure::Solve(err)
    }
}

impl<S: RootSolver> Stepper for ImplicitEuler<S> {
    fn name(&self) -> &'static str {
        "Implicit Euler"
    }

    fn prepare(&mut self, dimension: usize) -> Result<(), IntegrationError> {
        self.solver
            .validate()
            .map_err(|err| IntegrationError::InvalidSettings(err.to_string()))?;
        self.guess.resize(dimension, 0.0);
        Ok(())
    }

    fn step<F: VectorField + ?Sized>(
        &mut self,
        field: &mut Evaluator<'_, F>,
        t0: f64,
        t1: f64,
        state: &[f64],
        next: &mut [f64],
    ) -> Result<(), IntegrationError> {
        let dt = t1 - t0;
        let step = field.step();

        // Predictor uses the slope at the target time.
        let slope = field.eval(state, t1)?;
        self.guess.resize(state.len(), 0.0);
        for i in 0..state.len() {
            self.guess[i] = state[i] + slope[i] * dt;
        }

        // R(z) = y + dt * f(z, t1) - z
        let residual = |z: &[f64]| -> Result<Vec<f64>, ImplicitFailure> {
            let dz = field.eval(z, t1).map_err(ImplicitFailure::Field)?;
            Ok((0..z.len()).map(|i| state[i] + dz[i] * dt - z[i]).collect())
        };

        match self.solver.solve(residual, &self.guess) {
            Ok(root) => {
                next.copy_from_slice(&root.point);
                Ok(())
            }
            Err(ImplicitFailure::Field(err)) => Err(err),
            Err(ImplicitFailure::Solve(RootSolveError::InvalidSettings(message))) => {
                Err(IntegrationError::InvalidSettings(message))
            }
            Err(ImplicitFailure::Solve(source)) => {
                warn!("implicit Euler step {step} (t = {t1}) failed: {source}");
                Err(IntegrationError::NonConvergence {
                    step,
                    time: t1,
                    source,
                })
            }
        }
    }
}

/// Heun's predictor-corrector (explicit trapezoid), second order.
#[derive(Debug, Clone, Default)]
pub struct Heun {
    tmp: Vec<f64>,
}

impl Heun {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stepper for Heun {
    fn name(&self) -> &'static str {
        "Heun"
    }

    fn prepare(&mut self, dimension: usize) -> Result<(), IntegrationError> {
        self.tmp.resize(dimension, 0.0);
        Ok(())
    }

    fn step<F: VectorField + ?Sized>(
        &mut self,
        field: &mut Evaluator<'_, F>,
        t0: f64,
        t1: f64,
        state: &[f64],
        next: &mut [f64],
    ) -> Result<(), IntegrationError> {
        let dt = t1 - t0;
        let n = state.len();
        self.tmp.resize(n, 0.0);

        // k1 = f(y, t0)
        let k1 = field.eval(state, t0)?;

        // k2 = f(y + dt*k1, t1)
        for i in 0..n {
            self.tmp[i] = state[i] + k1[i] * dt;
        }
        let k2 = field.eval(&self.tmp, t1)?;

        for i in 0..n {
            next[i] = state[i] + dt / 2.0 * (k1[i] + k2[i]);
        }
        Ok(())
    }
}

/// Classic Runge-Kutta 4th order.
#[derive(Debug, Clone, Default)]
pub struct RK4 {
    tmp: Vec<f64>,
}

impl RK4 {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stepper for RK4 {
    fn name(&self) -> &'static str {
        "Runge Kutta"
    }

    fn prepare(&mut self, dimension: usize) -> Result<(), IntegrationError> {
        self.tmp.resize(dimension, 0.0);
        Ok(())
    }

    fn step<F: VectorField + ?Sized>(
        &mut self,
        field: &mut Evaluator<'_, F>,
        t0: f64,
        t1: f64,
        state: &[f64],
        next: &mut [f64],
    ) -> Result<(), IntegrationError> {
        let dt = t1 - t0;
        let half = dt / 2.0;
        let t_mid = t0 + half;
        let n = state.len();
        self.tmp.resize(n, 0.0);

        // k1 = f(y, t0)
        let k1 = field.eval(state, t0)?;

        // k2 = f(y + dt/2*k1, t0 + dt/2)
        for i in 0..n {
            self.tmp[i] = state[i] + half * k1[i];
        }
        let k2 = field.eval(&self.tmp, t_mid)?;

        // k3 = f(y + dt/2*k2, t0 + dt/2)
        for i in 0..n {
            self.tmp[i] = state[i] + half * k2[i];
        }
        let k3 = field.eval(&self.tmp, t_mid)?;

        // k4 = f(y + dt*k3, t1)
        for i in 0..n {
            self.tmp[i] = state[i] + dt * k3[i];
        }
        let k4 = field.eval(&self.tmp, t1)?;

        // y_next = y + dt/6 * (k1 + 2k2 + 2k3 + k4)
        for i in 0..n {
            next[i] = state[i] + dt / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roots::{FixedPointSettings, FixedPointSolver, NewtonSettings};
    use std::cell::RefCell;

    fn single_step<S: Stepper, F: VectorField>(
        stepper: &mut S,
        field: &F,
        state: &[f64],
        t0: f64,
        t1: f64,
    ) -> (Vec<f64>, usize) {
        let mut evaluator = Evaluator::new(field, state.len());
        let mut next = vec![0.0; state.len()];
        stepper.prepare(state.len()).expect("prepare");
        stepper
            .step(&mut evaluator, t0, t1, state, &mut next)
            .expect("step");
        (next, evaluator.evaluations())
    }

    #[test]
    fn explicit_euler_uses_slope_at_start() {
        let field = |y: &[f64], t: f64| vec![y[0] + t];
        let (next, evals) = single_step(&mut ExplicitEuler, &field, &[1.0], 2.0, 2.5);
        assert_eq!(next, vec![1.0 + 0.5 * 3.0]);
        assert_eq!(evals, 1);
    }

    #[test]
    fn heun_is_exact_for_linear_time_forcing() {
        // y' = t integrates to t^2/2 under the trapezoid rule.
        let field = |_y: &[f64], t: f64| vec![t];
        let (next, evals) = single_step(&mut Heun::new(), &field, &[0.0], 0.0, 2.0);
        assert!((next[0] - 2.0).abs() < 1e-14);
        assert_eq!(evals, 2);
    }

    #[test]
    fn rk4_is_exact_for_cubic_time_forcing() {
        // y' = t^3 reduces RK4 to Simpson's rule, exact for cubics.
        let field = |_y: &[f64], t: f64| vec![t * t * t];
        let (next, evals) = single_step(&mut RK4::new(), &field, &[0.0], 0.0, 1.0);
        assert!((next[0] - 0.25).abs() < 1e-15);
        assert_eq!(evals, 4);
    }

    #[test]
    fn rk4_evaluates_stages_at_expected_times() {
        let times = RefCell::new(Vec::new());
        let field = |y: &[f64], t: f64| {
            times.borrow_mut().push(t);
            vec![0.0; y.len()]
        };
        single_step(&mut RK4::new(), &field, &[1.0], 1.0, 1.5);
        assert_eq!(*times.borrow(), vec![1.0, 1.25, 1.25, 1.5]);
    }

    #[test]
    fn implicit_euler_solves_linear_step_exactly() {
        // z = y + dt*(-2z)  →  z = y / (1 + 2dt)
        let field = |y: &[f64], _t: f64| vec![-2.0 * y[0]];
        let mut stepper = ImplicitEuler::new(NewtonSolver::default());
        let (next, evals) = single_step(&mut stepper, &field, &[3.0], 0.0, 0.5);
        assert!((next[0] - 1.5).abs() < 1e-12);
        assert!(evals >= 2);
    }

    #[test]
    fn implicit_euler_seeds_guess_at_target_time() {
        let times = RefCell::new(Vec::new());
        let field = |y: &[f64], t: f64| {
            times.borrow_mut().push(t);
            vec![0.0; y.len()]
        };
        let mut stepper = ImplicitEuler::new(NewtonSolver::default());
        single_step(&mut stepper, &field, &[1.0], 0.0, 0.75);
        let times = times.borrow();
        assert!(times.len() >= 2);
        assert!(times.iter().all(|&t| t == 0.75));
    }

    #[test]
    fn implicit_euler_accepts_fixed_point_strategy() {
        let field = |y: &[f64], _t: f64| vec![-y[0]];
        let mut stepper = ImplicitEuler::new(FixedPointSolver::default());
        let (next, _) = single_step(&mut stepper, &field, &[1.0], 0.0, 0.1);
        assert!((next[0] - 1.0 / 1.1).abs() < 1e-10);
    }

    #[test]
    fn implicit_euler_reports_non_convergence_with_context() {
        let field = |y: &[f64], _t: f64| vec![-10.0 * y[0]];
        let mut stepper = ImplicitEuler::new(FixedPointSolver::new(FixedPointSettings {
            max_iterations: 10,
            ..FixedPointSettings::default()
        }));
        let mut evaluator = Evaluator::new(&field, 1);
        evaluator.begin_step(3);
        let mut next = [0.0];
        stepper.prepare(1).expect("prepare");

        let err = stepper
            .step(&mut evaluator, 0.9, 1.2, &[1.0], &mut next)
            .expect_err("fixed point should diverge for dt*L = 3");
        match err {
            IntegrationError::NonConvergence { step, time, source } => {
                assert_eq!(step, 3);
                assert_eq!(time, 1.2);
                assert!(matches!(source, RootSolveError::MaxIterations { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn implicit_euler_rejects_invalid_solver_settings() {
        let mut stepper = ImplicitEuler::new(NewtonSolver::new(NewtonSettings {
            tolerance: 0.0,
            ..NewtonSettings::default()
        }));
        assert!(matches!(
            stepper.prepare(2),
            Err(IntegrationError::InvalidSettings(_))
        ));
    }

    #[test]
    fn implicit_euler_propagates_field_dimension_errors() {
        let calls = RefCell::new(0usize);
        // Correct on the predictor call, wrong once the solve starts.
        let field = |y: &[f64], _t: f64| {
            *calls.borrow_mut() += 1;
            if *calls.borrow() == 1 {
                vec![0.0; y.len()]
            } else {
                vec![0.0; y.len() + 1]
            }
        };
        let mut stepper = ImplicitEuler::new(NewtonSolver::default());
        let mut evaluator = Evaluator::new(&field, 2);
        let mut next = [0.0; 2];
        stepper.prepare(2).expect("prepare");

        let err = stepper
            .step(&mut evaluator, 0.0, 1.0, &[1.0, 1.0], &mut next)
            .expect_err("dimension mismatch");
        assert!(matches!(
            err,
            IntegrationError::DimensionMismatch {
                expected: 2,
                actual: 3,
                ..
            }
        ));
    }
}

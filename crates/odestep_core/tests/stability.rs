//! Linear stability on y' = -λy with dt beyond the explicit limit 2/λ.

use odestep_core::models::ExponentialDecay;
use odestep_core::roots::{FixedPointSolver, NewtonSettings, NewtonSolver};
use odestep_core::{explicit_euler, implicit_euler, implicit_euler_with, linspace, IntegrationError};

const RATE: f64 = 10.0;

fn stiff_grid() -> Vec<f64> {
    // dt = 0.3 > 2 / RATE
    linspace(0.0, 6.0, 21)
}

#[test]
fn explicit_euler_diverges_beyond_stability_limit() {
    let decay = ExponentialDecay::new(RATE);
    let trajectory = explicit_euler(&decay, &[1.0], &stiff_grid()).expect("integration");

    let magnitudes: Vec<f64> = trajectory.component(0).iter().map(|v| v.abs()).collect();
    for pair in magnitudes.windows(2) {
        assert!(pair[1] > pair[0], "magnitude did not grow: {pair:?}");
    }
    assert!(magnitudes[magnitudes.len() - 1] > 1e5);
}

#[test]
fn implicit_euler_decays_for_the_same_step() {
    let decay = ExponentialDecay::new(RATE);
    let trajectory = implicit_euler(&decay, &[1.0], &stiff_grid()).expect("integration");

    let values = trajectory.component(0);
    for pair in values.windows(2) {
        assert!(pair[1].abs() < pair[0].abs());
        assert!(pair[1] > 0.0);
    }
    // Each step divides by 1 + λ·dt = 4.
    assert!((values[1] - 0.25).abs() < 1e-12);
}

#[test]
fn implicit_euler_is_stable_for_very_large_steps() {
    let decay = ExponentialDecay::new(1.0e4);
    let times = linspace(0.0, 100.0, 11);
    let trajectory = implicit_euler(&decay, &[1.0, -2.0], &times).expect("integration");
    for row in trajectory.rows() {
        assert!(row.iter().all(|v| v.abs() <= 2.0));
    }
    assert!(trajectory.final_state().iter().all(|v| v.abs() < 1e-30));
}

#[test]
fn fixed_point_strategy_reports_non_convergence_on_stiff_steps() {
    let decay = ExponentialDecay::new(RATE);
    let err = implicit_euler_with(&decay, &[1.0], &stiff_grid(), FixedPointSolver::default())
        .expect_err("fixed-point iteration cannot contract when dt*λ > 1");
    match err {
        IntegrationError::NonConvergence { step, time, .. } => {
            assert_eq!(step, 0);
            assert!((time - 0.3).abs() < 1e-12);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn newton_iteration_budget_failure_stops_integration() {
    // A nonlinear field Newton cannot settle in one step.
    let field = |y: &[f64], _t: f64| vec![-y[0] * y[0] * y[0]];
    let solver = NewtonSolver::new(NewtonSettings {
        max_steps: 1,
        tolerance: 1e-300,
        step_tolerance: 1e-300,
        ..NewtonSettings::default()
    });
    let err = implicit_euler_with(&field, &[10.0], &[0.0, 1.0, 2.0], solver)
        .expect_err("one Newton iteration is not enough");
    assert!(matches!(err, IntegrationError::NonConvergence { step: 0, .. }));

    // The root-solver failure appears once in the error chain.
    let chain = format!("{:#}", anyhow::Error::new(err));
    assert!(chain.starts_with("Implicit solve did not converge at step 0"), "{chain}");
    assert_eq!(chain.matches("failed to converge in 1").count(), 1, "{chain}");
}

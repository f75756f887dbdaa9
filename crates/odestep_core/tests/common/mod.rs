use odestep_core::{linspace, IntegrationError, Trajectory};

pub type Field<'a> = &'a dyn Fn(&[f64], f64) -> Vec<f64>;
pub type Integrator = fn(Field<'_>, &[f64], &[f64]) -> Result<Trajectory, IntegrationError>;

fn explicit_euler(f: Field<'_>, y0: &[f64], t: &[f64]) -> Result<Trajectory, IntegrationError> {
    odestep_core::explicit_euler(f, y0, t)
}

fn implicit_euler(f: Field<'_>, y0: &[f64], t: &[f64]) -> Result<Trajectory, IntegrationError> {
    odestep_core::implicit_euler(f, y0, t)
}

fn heun(f: Field<'_>, y0: &[f64], t: &[f64]) -> Result<Trajectory, IntegrationError> {
    odestep_core::heun(f, y0, t)
}

fn runge_kutta(f: Field<'_>, y0: &[f64], t: &[f64]) -> Result<Trajectory, IntegrationError> {
    odestep_core::runge_kutta(f, y0, t)
}

/// The four one-call entry points, labelled for assertion messages.
pub fn all_integrators() -> Vec<(&'static str, Integrator)> {
    vec![
        ("explicit euler", explicit_euler as Integrator),
        ("implicit euler", implicit_euler as Integrator),
        ("heun", heun as Integrator),
        ("runge kutta", runge_kutta as Integrator),
    ]
}

/// Absolute error at t = 1 for y' = -rate*y, y(0) = 1, using `steps` uniform steps.
#[allow(dead_code)]
pub fn decay_error(integrator: Integrator, rate: f64, steps: usize) -> f64 {
    let decay = move |y: &[f64], _t: f64| vec![-rate * y[0]];
    let times = linspace(0.0, 1.0, steps + 1);
    let trajectory = integrator(&decay, &[1.0], &times).expect("decay integration");
    (trajectory.final_state()[0] - (-rate).exp()).abs()
}

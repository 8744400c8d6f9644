use crate::fields::Fields;
use crate::grid::GridDims;
use crate::real::Real;

#[derive(Clone, Copy, Debug)]
pub struct TimestepParams {
    pub re: Real,
    pub pr: Real,
    pub tau: Real,
    pub use_temperature: bool,
}

/// CFL + diffusive + thermal step-size bound, scaled by the user safety
/// factor τ. `τ ≤ 0` disables adaptivity and keeps `dt_initial` fixed —
/// useful for reproducing a reference trace exactly across backends.
pub fn calculate_dt(dims: &GridDims, params: &TimestepParams, dt_initial: Real, fields: &Fields) -> Real {
    if params.tau <= 0.0 {
        return dt_initial;
    }

    let u_max = fields.u.iter().fold(0.0 as Real, |acc, &v| acc.max(v.abs()));
    let v_max = fields.v.iter().fold(0.0 as Real, |acc, &v| acc.max(v.abs()));
    let w_max = fields.w.iter().fold(0.0 as Real, |acc, &v| acc.max(v.abs()));

    let mut dt_cfl = Real::MAX;
    if u_max > 0.0 {
        dt_cfl = dt_cfl.min(dims.dx / u_max);
    }
    if v_max > 0.0 {
        dt_cfl = dt_cfl.min(dims.dy / v_max);
    }
    if w_max > 0.0 {
        dt_cfl = dt_cfl.min(dims.dz / w_max);
    }

    let dt_visc = 0.5 * params.re / (1.0 / (dims.dx * dims.dx) + 1.0 / (dims.dy * dims.dy) + 1.0 / (dims.dz * dims.dz));

    let mut dt = dt_cfl.min(dt_visc);
    if params.use_temperature {
        let dt_therm = dt_visc * params.pr;
        dt = dt.min(dt_therm);
    }
    params.tau * dt
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn fixed_mode_keeps_initial_dt_when_tau_non_positive() {
        let dims = GridDims::new(4, 4, 4, 1.0, 1.0, 1.0);
        let fields = Fields::new(dims);
        let params = TimestepParams { re: 100.0, pr: 0.7, tau: 0.0, use_temperature: false };
        assert_abs_diff_eq!(calculate_dt(&dims, &params, 0.05, &fields), 0.05);
    }

    #[test]
    fn adaptive_dt_is_bounded_by_viscous_limit_when_velocity_is_zero() {
        let dims = GridDims::new(4, 4, 4, 1.0, 1.0, 1.0);
        let fields = Fields::new(dims);
        let params = TimestepParams { re: 100.0, pr: 0.7, tau: 0.5, use_temperature: false };
        let dt_visc = 0.5 * 100.0 / 3.0;
        assert_abs_diff_eq!(calculate_dt(&dims, &params, 0.05, &fields), 0.5 * dt_visc, epsilon = 1e-9);
    }
}

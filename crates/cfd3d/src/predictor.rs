use crate::fields::Fields;
use crate::flag::FlagField;
use crate::grid::GridDims;
use crate::real::Real;

/// Physical constants shared by the predictor, time-step controller and
/// SOR solver. Grouped into one struct rather than threaded as a dozen
/// loose parameters through every call.
#[derive(Clone, Copy, Debug)]
pub struct PhysicalParams {
    pub re: Real,
    pub pr: Real,
    pub alpha: Real,
    pub beta: Real,
    pub gx: Real,
    pub gy: Real,
    pub gz: Real,
    pub use_temperature: bool,
}

/// Donor-cell / central-difference convection term for a scalar transported
/// with velocity `vel` across a face spaced `h` apart: `minus`/`plus` are the
/// neighbor values straddling the stencil, `center` is the transported
/// quantity's own value at the point the derivative is taken. The central
/// difference is blended with an upwind correction biased toward `center`,
/// weighted by `alpha`.
#[inline]
fn donor_cell_1d(vel: Real, minus: Real, plus: Real, center: Real, h: Real, alpha: Real) -> Real {
    let central = vel * (plus - minus) / (2.0 * h);
    let upwind_correction = alpha * vel.abs() * (plus - 2.0 * center + minus) / (2.0 * h);
    central - upwind_correction
}

/// F, G, H tentative momenta and the (optional) temperature predictor.
/// Computed only at fluid cells whose relevant neighbor is also fluid;
/// elsewhere F/G/H pass the adjacent velocity through unchanged so the
/// projection step leaves that face alone.
pub fn calculate_fgh(dims: &GridDims, flag: &FlagField, params: &PhysicalParams, dt: Real, fields: &mut Fields) {
    let (u, v, w) = (&fields.u, &fields.v, &fields.w);
    let t = fields.t.current();

    // The two faces at the domain's own ghost boundary (i=0, i=imax for F;
    // j=0, j=jmax for G; k=0, k=kmax for H) have no far-side neighbor to
    // difference against and are always pass-through: those velocities are
    // already pinned by `set_boundary_values`.
    for i in 0..=dims.imax {
        for j in 1..=dims.jmax {
            for k in 1..=dims.kmax {
                let here = flag.get(i, j, k);
                let east = flag.get(i + 1, j, k);
                let idx = dims.idx_flux(i, j, k);
                if i >= 1 && i < dims.imax && here.is_fluid() && east.is_fluid() {
                    fields.f[idx] = f_component(dims, params, dt, u, v, w, t, i, j, k);
                } else {
                    fields.f[idx] = u[dims.idx_u(i, j, k)];
                }
            }
        }
    }

    for i in 1..=dims.imax {
        for j in 0..=dims.jmax {
            for k in 1..=dims.kmax {
                let here = flag.get(i, j, k);
                let north = flag.get(i, j + 1, k);
                let idx = dims.idx_flux(i, j, k);
                if j >= 1 && j < dims.jmax && here.is_fluid() && north.is_fluid() {
                    fields.g[idx] = g_component(dims, params, dt, u, v, w, t, i, j, k);
                } else {
                    fields.g[idx] = v[dims.idx_v(i, j, k)];
                }
            }
        }
    }

    for i in 1..=dims.imax {
        for j in 1..=dims.jmax {
            for k in 0..=dims.kmax {
                let here = flag.get(i, j, k);
                let front = flag.get(i, j, k + 1);
                let idx = dims.idx_flux(i, j, k);
                if k >= 1 && k < dims.kmax && here.is_fluid() && front.is_fluid() {
                    fields.h[idx] = h_component(dims, params, dt, u, v, w, t, i, j, k);
                } else {
                    fields.h[idx] = w[dims.idx_w(i, j, k)];
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn f_component(dims: &GridDims, p: &PhysicalParams, dt: Real, u: &[Real], v: &[Real], w: &[Real], t: &[Real], i: usize, j: usize, k: usize) -> Real {
    let (dx, dy, dz) = (dims.dx, dims.dy, dims.dz);
    let u_c = u[dims.idx_u(i, j, k)];
    let u_w = u[dims.idx_u(i - 1, j, k)];
    let u_e = u[dims.idx_u(i + 1, j, k)];
    let d2udx2 = (u_e - 2.0 * u_c + u_w) / (dx * dx);

    let v_here = 0.5 * (v[dims.idx_v(i, j, k)] + v[dims.idx_v(i + 1, j, k)]);
    let v_below = 0.5 * (v[dims.idx_v(i, j - 1, k)] + v[dims.idx_v(i + 1, j - 1, k)]);
    let du_dy_conv = donor_cell_1d(
        0.5 * (v_here + v_below),
        u[dims.idx_u(i, j - 1, k)],
        u[dims.idx_u(i, j + 1, k)],
        u_c,
        dy,
        p.alpha,
    );
    let d2udy2 = (u[dims.idx_u(i, j + 1, k)] - 2.0 * u_c + u[dims.idx_u(i, j - 1, k)]) / (dy * dy);

    let w_here = 0.5 * (w[dims.idx_w(i, j, k)] + w[dims.idx_w(i + 1, j, k)]);
    let w_below = 0.5 * (w[dims.idx_w(i, j, k - 1)] + w[dims.idx_w(i + 1, j, k - 1)]);
    let du_dz_conv = donor_cell_1d(
        0.5 * (w_here + w_below),
        u[dims.idx_u(i, j, k - 1)],
        u[dims.idx_u(i, j, k + 1)],
        u_c,
        dz,
        p.alpha,
    );
    let d2udz2 = (u[dims.idx_u(i, j, k + 1)] - 2.0 * u_c + u[dims.idx_u(i, j, k - 1)]) / (dz * dz);

    let du_dx_conv = donor_cell_1d(u_c, u_w, u_e, u_c, dx, p.alpha);

    let diffusion = (d2udx2 + d2udy2 + d2udz2) / p.re;
    let mut value = u_c + dt * (diffusion - du_dx_conv - du_dy_conv - du_dz_conv + p.gx);

    if p.use_temperature {
        let t_face = 0.5 * (t[dims.idx_centered(i, j, k)] + t[dims.idx_centered(i + 1, j, k)]);
        value -= dt * p.beta * t_face * p.gx;
    }
    value
}

#[allow(clippy::too_many_arguments)]
fn g_component(dims: &GridDims, p: &PhysicalParams, dt: Real, u: &[Real], v: &[Real], w: &[Real], t: &[Real], i: usize, j: usize, k: usize) -> Real {
    let (dx, dy, dz) = (dims.dx, dims.dy, dims.dz);
    let v_c = v[dims.idx_v(i, j, k)];
    let v_n = v[dims.idx_v(i, j + 1, k)];
    let v_s = v[dims.idx_v(i, j.saturating_sub(1), k)];
    let d2vdy2 = (v_n - 2.0 * v_c + v_s) / (dy * dy);

    let u_here = 0.5 * (u[dims.idx_u(i, j, k)] + u[dims.idx_u(i, j + 1, k)]);
    let u_west = 0.5 * (u[dims.idx_u(i.saturating_sub(1), j, k)] + u[dims.idx_u(i.saturating_sub(1), j + 1, k)]);
    let dv_dx_conv = donor_cell_1d(
        0.5 * (u_here + u_west),
        v[dims.idx_v(i - 1, j, k)],
        v[dims.idx_v(i + 1, j, k)],
        v_c,
        dx,
        p.alpha,
    );
    let d2vdx2 = (v[dims.idx_v(i + 1, j, k)] - 2.0 * v_c + v[dims.idx_v(i - 1, j, k)]) / (dx * dx);

    let w_here = 0.5 * (w[dims.idx_w(i, j, k)] + w[dims.idx_w(i, j + 1, k)]);
    let w_back = 0.5 * (w[dims.idx_w(i, j, k.saturating_sub(1))] + w[dims.idx_w(i, j + 1, k.saturating_sub(1))]);
    let dv_dz_conv = donor_cell_1d(
        0.5 * (w_here + w_back),
        v[dims.idx_v(i, j, k - 1)],
        v[dims.idx_v(i, j, k + 1)],
        v_c,
        dz,
        p.alpha,
    );
    let d2vdz2 = (v[dims.idx_v(i, j, k + 1)] - 2.0 * v_c + v[dims.idx_v(i, j, k - 1)]) / (dz * dz);

    let dv_dy_conv = donor_cell_1d(v_c, v_s, v_n, v_c, dy, p.alpha);

    let diffusion = (d2vdx2 + d2vdy2 + d2vdz2) / p.re;
    let mut value = v_c + dt * (diffusion - dv_dx_conv - dv_dy_conv - dv_dz_conv + p.gy);

    if p.use_temperature {
        let t_face = 0.5 * (t[dims.idx_centered(i, j, k)] + t[dims.idx_centered(i, j + 1, k)]);
        value -= dt * p.beta * t_face * p.gy;
    }
    value
}

#[allow(clippy::too_many_arguments)]
fn h_component(dims: &GridDims, p: &PhysicalParams, dt: Real, u: &[Real], v: &[Real], w: &[Real], t: &[Real], i: usize, j: usize, k: usize) -> Real {
    let (dx, dy, dz) = (dims.dx, dims.dy, dims.dz);
    let w_c = w[dims.idx_w(i, j, k)];
    let w_f = w[dims.idx_w(i, j, k + 1)];
    let w_bk = w[dims.idx_w(i, j, k.saturating_sub(1))];
    let d2wdz2 = (w_f - 2.0 * w_c + w_bk) / (dz * dz);

    let u_here = 0.5 * (u[dims.idx_u(i, j, k)] + u[dims.idx_u(i, j, k + 1)]);
    let u_west = 0.5 * (u[dims.idx_u(i.saturating_sub(1), j, k)] + u[dims.idx_u(i.saturating_sub(1), j, k + 1)]);
    let dw_dx_conv = donor_cell_1d(
        0.5 * (u_here + u_west),
        w[dims.idx_w(i - 1, j, k)],
        w[dims.idx_w(i + 1, j, k)],
        w_c,
        dx,
        p.alpha,
    );
    let d2wdx2 = (w[dims.idx_w(i + 1, j, k)] - 2.0 * w_c + w[dims.idx_w(i - 1, j, k)]) / (dx * dx);

    let v_here = 0.5 * (v[dims.idx_v(i, j, k)] + v[dims.idx_v(i, j, k + 1)]);
    let v_south = 0.5 * (v[dims.idx_v(i, j.saturating_sub(1), k)] + v[dims.idx_v(i, j.saturating_sub(1), k + 1)]);
    let dw_dy_conv = donor_cell_1d(
        0.5 * (v_here + v_south),
        w[dims.idx_w(i, j - 1, k)],
        w[dims.idx_w(i, j + 1, k)],
        w_c,
        dy,
        p.alpha,
    );
    let d2wdy2 = (w[dims.idx_w(i, j + 1, k)] - 2.0 * w_c + w[dims.idx_w(i, j - 1, k)]) / (dy * dy);

    let dw_dz_conv = donor_cell_1d(w_c, w_bk, w_f, w_c, dz, p.alpha);

    let diffusion = (d2wdx2 + d2wdy2 + d2wdz2) / p.re;
    let mut value = w_c + dt * (diffusion - dw_dx_conv - dw_dy_conv - dw_dz_conv + p.gz);

    if p.use_temperature {
        let t_face = 0.5 * (t[dims.idx_centered(i, j, k)] + t[dims.idx_centered(i, j, k + 1)]);
        value -= dt * p.beta * t_face * p.gz;
    }
    value
}

/// Advances the temperature field at fluid cells: convection (donor-cell,
/// weight α) plus diffusion scaled by `1/(Re·Pr)`. Writes into the back
/// buffer; the caller swaps it into place afterward.
pub fn calculate_temperature(dims: &GridDims, flag: &FlagField, params: &PhysicalParams, dt: Real, fields: &mut Fields) {
    let (dx, dy, dz) = (dims.dx, dims.dy, dims.dz);
    let (u, v, w) = (fields.u.as_slice(), fields.v.as_slice(), fields.w.as_slice());
    let t_old = fields.t.current().to_vec();
    let t_new = fields.t.next_mut();

    for i in 1..=dims.imax {
        for j in 1..=dims.jmax {
            for k in 1..=dims.kmax {
                if !flag.get(i, j, k).is_fluid() {
                    continue;
                }
                let idx = dims.idx_centered(i, j, k);
                let t_c = t_old[idx];
                let t_e = t_old[dims.idx_centered(i + 1, j, k)];
                let t_w = t_old[dims.idx_centered(i - 1, j, k)];
                let t_n = t_old[dims.idx_centered(i, j + 1, k)];
                let t_s = t_old[dims.idx_centered(i, j - 1, k)];
                let t_f = t_old[dims.idx_centered(i, j, k + 1)];
                let t_b = t_old[dims.idx_centered(i, j, k - 1)];

                let u_w = u[dims.idx_u(i - 1, j, k)];
                let u_e = u[dims.idx_u(i, j, k)];
                let v_s = v[dims.idx_v(i, j - 1, k)];
                let v_n = v[dims.idx_v(i, j, k)];
                let w_b = w[dims.idx_w(i, j, k - 1)];
                let w_f = w[dims.idx_w(i, j, k)];

                let conv_x = donor_cell_1d(0.5 * (u_w + u_e), t_w, t_e, t_c, dx, params.alpha);
                let conv_y = donor_cell_1d(0.5 * (v_s + v_n), t_s, t_n, t_c, dy, params.alpha);
                let conv_z = donor_cell_1d(0.5 * (w_b + w_f), t_b, t_f, t_c, dz, params.alpha);

                let diffusion = ((t_e - 2.0 * t_c + t_w) / (dx * dx)
                    + (t_n - 2.0 * t_c + t_s) / (dy * dy)
                    + (t_f - 2.0 * t_c + t_b) / (dz * dz))
                    / (params.re * params.pr);

                t_new[idx] = t_c + dt * (diffusion - conv_x - conv_y - conv_z);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn uniform_flow_params() -> PhysicalParams {
        PhysicalParams { re: 100.0, pr: 0.7, alpha: 0.9, beta: 0.0, gx: 0.0, gy: 0.0, gz: 0.0, use_temperature: false }
    }

    #[test]
    fn fgh_pass_through_on_non_fluid_neighbor() {
        let dims = GridDims::new(3, 3, 3, 1.0, 1.0, 1.0);
        let mut flag = FlagField::new_all_fluid(dims);
        flag.get_mut(2, 1, 1).set_no_slip();
        let mut fields = Fields::new(dims);
        fields.u[dims.idx_u(1, 1, 1)] = 2.0;
        calculate_fgh(&dims, &flag, &uniform_flow_params(), 0.01, &mut fields);
        assert_abs_diff_eq!(fields.f[dims.idx_flux(1, 1, 1)], 2.0);
    }
}

use crate::fields::Fields;
use crate::flag::FlagField;
use crate::grid::GridDims;
use crate::real::Real;

/// Projects F, G, H onto a divergence-free field using the freshly solved
/// pressure. Faces where either neighbor is non-fluid are left untouched —
/// the boundary engine owns those values.
pub fn calculate_uvw(dims: &GridDims, flag: &FlagField, dt: Real, fields: &mut Fields) {
    let p = &fields.p;

    for i in 1..dims.imax {
        for j in 1..=dims.jmax {
            for k in 1..=dims.kmax {
                if flag.get(i, j, k).is_fluid() && flag.get(i + 1, j, k).is_fluid() {
                    let idx = dims.idx_u(i, j, k);
                    fields.u[idx] = fields.f[dims.idx_flux(i, j, k)]
                        - dt * (p[dims.idx_centered(i + 1, j, k)] - p[dims.idx_centered(i, j, k)]) / dims.dx;
                }
            }
        }
    }

    for i in 1..=dims.imax {
        for j in 1..dims.jmax {
            for k in 1..=dims.kmax {
                if flag.get(i, j, k).is_fluid() && flag.get(i, j + 1, k).is_fluid() {
                    let idx = dims.idx_v(i, j, k);
                    fields.v[idx] = fields.g[dims.idx_flux(i, j, k)]
                        - dt * (p[dims.idx_centered(i, j + 1, k)] - p[dims.idx_centered(i, j, k)]) / dims.dy;
                }
            }
        }
    }

    for i in 1..=dims.imax {
        for j in 1..=dims.jmax {
            for k in 1..dims.kmax {
                if flag.get(i, j, k).is_fluid() && flag.get(i, j, k + 1).is_fluid() {
                    let idx = dims.idx_w(i, j, k);
                    fields.w[idx] = fields.h[dims.idx_flux(i, j, k)]
                        - dt * (p[dims.idx_centered(i, j, k + 1)] - p[dims.idx_centered(i, j, k)]) / dims.dz;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn zero_pressure_gradient_leaves_velocity_at_f() {
        let dims = GridDims::new(3, 3, 3, 1.0, 1.0, 1.0);
        let flag = FlagField::new_all_fluid(dims);
        let mut fields = Fields::new(dims);
        fields.f[dims.idx_flux(1, 1, 1)] = 3.0;
        calculate_uvw(&dims, &flag, 0.01, &mut fields);
        assert_abs_diff_eq!(fields.u[dims.idx_u(1, 1, 1)], 3.0);
    }
}

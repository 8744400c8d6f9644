use crate::fields::Fields;
use crate::flag::FlagField;
use crate::grid::GridDims;
use crate::real::Real;

/// `RS = ((F_i - F_{i-1})/dx + (G_j - G_{j-1})/dy + (H_k - H_{k-1})/dz) / dt`,
/// computed at every fluid cell. Non-fluid cells are left at whatever the
/// SOR solver's own boundary treatment will overwrite each sweep.
pub fn calculate_rs(dims: &GridDims, flag: &FlagField, dt: Real, fields: &mut Fields) {
    let (dx, dy, dz) = (dims.dx, dims.dy, dims.dz);
    for i in 1..=dims.imax {
        for j in 1..=dims.jmax {
            for k in 1..=dims.kmax {
                if !flag.get(i, j, k).is_fluid() {
                    continue;
                }
                let df_dx = (fields.f[dims.idx_flux(i, j, k)] - fields.f[dims.idx_flux(i - 1, j, k)]) / dx;
                let dg_dy = (fields.g[dims.idx_flux(i, j, k)] - fields.g[dims.idx_flux(i, j - 1, k)]) / dy;
                let dh_dz = (fields.h[dims.idx_flux(i, j, k)] - fields.h[dims.idx_flux(i, j, k - 1)]) / dz;
                fields.rs[dims.idx_flux(i, j, k)] = (df_dx + dg_dy + dh_dz) / dt;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn uniform_flux_field_gives_zero_divergence() {
        let dims = GridDims::new(3, 3, 3, 1.0, 1.0, 1.0);
        let flag = FlagField::new_all_fluid(dims);
        let mut fields = Fields::new(dims);
        fields.f.iter_mut().for_each(|v| *v = 1.0);
        fields.g.iter_mut().for_each(|v| *v = 1.0);
        fields.h.iter_mut().for_each(|v| *v = 1.0);
        calculate_rs(&dims, &flag, 0.01, &mut fields);
        assert_abs_diff_eq!(fields.rs[dims.idx_flux(2, 2, 2)], 0.0);
    }
}

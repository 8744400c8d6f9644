use super::BoxBounds;
use crate::flag::FlagField;
use crate::grid::GridDims;
use crate::real::Real;

/// No-penetration / reflection conditions on obstacle faces for the
/// u-component. A face already pinned by a direct (R/L) obstacle bit is
/// never overwritten by a later (U/D/B/F) reflection rule — the
/// `r_check`/`l_check`/`l1_check`/`r1_check` flags preserve that
/// precedence exactly as the reference solver orders it. Concave corners
/// where three obstacle faces meet are not disambiguated beyond this
/// ordering; that case is out of scope.
pub fn set_internal_u_boundaries(dims: &GridDims, flag: &FlagField, b: BoxBounds, u: &mut [Real]) {
    if b.iu == 0 || b.il > b.iu - 1 {
        return;
    }
    for i in b.il..=(b.iu - 1) {
        for j in b.jl..=b.ju {
            for k in b.kl..=b.ku {
                let f = flag.get(i, j, k);
                if f.is_fluid() {
                    continue;
                }
                let mut r_check = false;
                let mut l_check = false;
                let mut l1_check = false;
                let mut r1_check = false;

                if f.b_r() {
                    u[dims.idx_u(i, j, k)] = 0.0;
                    r_check = true;
                }
                if f.b_l() {
                    u[dims.idx_u(i - 1, j, k)] = 0.0;
                    l_check = true;
                }
                if f.b_u() {
                    if !l_check {
                        u[dims.idx_u(i - 1, j, k)] = -u[dims.idx_u(i - 1, j + 1, k)];
                        l1_check = true;
                    }
                    if !r_check {
                        u[dims.idx_u(i, j, k)] = -u[dims.idx_u(i, j + 1, k)];
                        r1_check = true;
                    }
                }
                if f.b_d() {
                    if !l_check {
                        u[dims.idx_u(i - 1, j, k)] = -u[dims.idx_u(i - 1, j - 1, k)];
                        l1_check = true;
                    }
                    if !r_check {
                        u[dims.idx_u(i, j, k)] = -u[dims.idx_u(i, j - 1, k)];
                        r1_check = true;
                    }
                }
                if f.b_b() {
                    if !l_check && !l1_check {
                        u[dims.idx_u(i - 1, j, k)] = -u[dims.idx_u(i - 1, j, k - 1)];
                    }
                    if !r_check && !r1_check {
                        u[dims.idx_u(i, j, k)] = -u[dims.idx_u(i, j, k - 1)];
                    }
                }
                if f.b_f() {
                    if !l_check && !l1_check {
                        u[dims.idx_u(i - 1, j, k)] = -u[dims.idx_u(i - 1, j, k + 1)];
                    }
                    if !r_check && !r1_check {
                        u[dims.idx_u(i, j, k)] = -u[dims.idx_u(i, j, k + 1)];
                    }
                }
            }
        }
    }
}

/// Same rule set as [`set_internal_u_boundaries`], mirrored onto the
/// v-component's up/down axis.
pub fn set_internal_v_boundaries(dims: &GridDims, flag: &FlagField, b: BoxBounds, v: &mut [Real]) {
    if b.ju == 0 || b.jl > b.ju - 1 {
        return;
    }
    for i in b.il..=b.iu {
        for j in b.jl..=(b.ju - 1) {
            for k in b.kl..=b.ku {
                let f = flag.get(i, j, k);
                if f.is_fluid() {
                    continue;
                }
                let mut u_check = false;
                let mut d_check = false;
                let mut u1_check = false;
                let mut d1_check = false;

                if f.b_u() {
                    v[dims.idx_v(i, j, k)] = 0.0;
                    u_check = true;
                }
                if f.b_d() {
                    v[dims.idx_v(i, j - 1, k)] = 0.0;
                    d_check = true;
                }
                if f.b_r() {
                    if !d_check {
                        v[dims.idx_v(i, j - 1, k)] = -v[dims.idx_v(i + 1, j - 1, k)];
                        d1_check = true;
                    }
                    if !u_check {
                        v[dims.idx_v(i, j, k)] = -v[dims.idx_v(i + 1, j, k)];
                        u1_check = true;
                    }
                }
                if f.b_l() {
                    if !d_check {
                        v[dims.idx_v(i, j - 1, k)] = -v[dims.idx_v(i - 1, j - 1, k)];
                        d1_check = true;
                    }
                    if !u_check {
                        v[dims.idx_v(i, j, k)] = -v[dims.idx_v(i - 1, j, k)];
                        u1_check = true;
                    }
                }
                if f.b_b() {
                    if !d_check && !d1_check {
                        v[dims.idx_v(i, j - 1, k)] = -v[dims.idx_v(i, j - 1, k - 1)];
                    }
                    if !u_check && !u1_check {
                        v[dims.idx_v(i, j, k)] = -v[dims.idx_v(i, j, k - 1)];
                    }
                }
                if f.b_f() {
                    if !d_check && !d1_check {
                        v[dims.idx_v(i, j - 1, k)] = -v[dims.idx_v(i, j - 1, k + 1)];
                    }
                    if !u_check && !u1_check {
                        v[dims.idx_v(i, j, k)] = -v[dims.idx_v(i, j, k + 1)];
                    }
                }
            }
        }
    }
}

/// Same rule set as [`set_internal_u_boundaries`], mirrored onto the
/// w-component's front/back axis.
pub fn set_internal_w_boundaries(dims: &GridDims, flag: &FlagField, b: BoxBounds, w: &mut [Real]) {
    if b.ku == 0 || b.kl > b.ku - 1 {
        return;
    }
    for i in b.il..=b.iu {
        for j in b.jl..=b.ju {
            for k in b.kl..=(b.ku - 1) {
                let f = flag.get(i, j, k);
                if f.is_fluid() {
                    continue;
                }
                let mut f_check = false;
                let mut bk_check = false;
                let mut f1_check = false;
                let mut b1_check = false;

                if f.b_b() {
                    w[dims.idx_w(i, j, k - 1)] = 0.0;
                    bk_check = true;
                }
                if f.b_f() {
                    w[dims.idx_w(i, j, k)] = 0.0;
                    f_check = true;
                }
                if f.b_r() {
                    if !bk_check {
                        w[dims.idx_w(i, j, k - 1)] = -w[dims.idx_w(i + 1, j, k - 1)];
                        b1_check = true;
                    }
                    if !f_check {
                        w[dims.idx_w(i, j, k)] = -w[dims.idx_w(i + 1, j, k)];
                        f1_check = true;
                    }
                }
                if f.b_l() {
                    if !bk_check {
                        w[dims.idx_w(i, j, k - 1)] = -w[dims.idx_w(i - 1, j, k - 1)];
                        b1_check = true;
                    }
                    if !f_check {
                        w[dims.idx_w(i, j, k)] = -w[dims.idx_w(i - 1, j, k)];
                        f1_check = true;
                    }
                }
                if f.b_u() {
                    if !bk_check && !b1_check {
                        w[dims.idx_w(i, j, k - 1)] = -w[dims.idx_w(i, j + 1, k - 1)];
                    }
                    if !f_check && !f1_check {
                        w[dims.idx_w(i, j, k)] = -w[dims.idx_w(i, j + 1, k)];
                    }
                }
                if f.b_d() {
                    if !bk_check && !b1_check {
                        w[dims.idx_w(i, j, k - 1)] = -w[dims.idx_w(i, j - 1, k - 1)];
                    }
                    if !f_check && !f1_check {
                        w[dims.idx_w(i, j, k)] = -w[dims.idx_w(i, j - 1, k)];
                    }
                }
            }
        }
    }
}

/// Obstacle-cell temperature is the mean of its direct fluid-side
/// neighbors (one read per set obstacle face bit); an obstacle cell with
/// no face bit set at all (fully interior to a solid block) reads zero.
pub fn set_internal_t_boundaries(dims: &GridDims, flag: &FlagField, b: BoxBounds, t: &mut [Real]) {
    for i in b.il..=b.iu {
        for j in b.jl..=b.ju {
            for k in b.kl..=b.ku {
                let f = flag.get(i, j, k);
                if f.is_fluid() {
                    continue;
                }
                let mut sum = 0.0;
                let mut count = 0u32;
                if f.b_r() {
                    sum += t[dims.idx_centered(i + 1, j, k)];
                    count += 1;
                }
                if f.b_l() {
                    sum += t[dims.idx_centered(i - 1, j, k)];
                    count += 1;
                }
                if f.b_u() {
                    sum += t[dims.idx_centered(i, j + 1, k)];
                    count += 1;
                }
                if f.b_d() {
                    sum += t[dims.idx_centered(i, j - 1, k)];
                    count += 1;
                }
                if f.b_b() {
                    sum += t[dims.idx_centered(i, j, k - 1)];
                    count += 1;
                }
                if f.b_f() {
                    sum += t[dims.idx_centered(i, j, k + 1)];
                    count += 1;
                }
                t[dims.idx_centered(i, j, k)] = if count == 0 { 0.0 } else { sum / count as Real };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolated_obstacle_cell_temperature_is_zero() {
        let dims = GridDims::new(3, 3, 3, 1.0, 1.0, 1.0);
        let mut flag = FlagField::new_all_fluid(dims);
        flag.get_mut(1, 1, 1).set_no_slip();
        let mut t = vec![7.0; dims.len_centered()];
        let b = BoxBounds::whole_domain(dims.imax, dims.jmax, dims.kmax);
        set_internal_t_boundaries(&dims, &flag, b, &mut t);
        assert_eq!(t[dims.idx_centered(1, 1, 1)], 0.0);
    }

    #[test]
    fn obstacle_cell_temperature_averages_flagged_neighbors() {
        let dims = GridDims::new(3, 3, 3, 1.0, 1.0, 1.0);
        let mut flag = FlagField::new_all_fluid(dims);
        flag.get_mut(1, 1, 1).set_no_slip();
        flag.get_mut(1, 1, 1).set_b_r(true);
        flag.get_mut(1, 1, 1).set_b_l(true);
        let mut t = vec![0.0; dims.len_centered()];
        t[dims.idx_centered(2, 1, 1)] = 4.0;
        t[dims.idx_centered(0, 1, 1)] = 2.0;
        let b = BoxBounds::whole_domain(dims.imax, dims.jmax, dims.kmax);
        set_internal_t_boundaries(&dims, &flag, b, &mut t);
        assert_eq!(t[dims.idx_centered(1, 1, 1)], 3.0);
    }

    #[test]
    fn direct_face_bit_takes_precedence_over_reflection() {
        let dims = GridDims::new(3, 3, 3, 1.0, 1.0, 1.0);
        let mut flag = FlagField::new_all_fluid(dims);
        flag.get_mut(1, 1, 1).set_no_slip();
        flag.get_mut(1, 1, 1).set_b_r(true);
        flag.get_mut(1, 1, 1).set_b_u(true);
        let mut u = vec![9.0; dims.len_staggered(0)];
        let b = BoxBounds::whole_domain(dims.imax, dims.jmax, dims.kmax);
        set_internal_u_boundaries(&dims, &flag, b, &mut u);
        assert_eq!(u[dims.idx_u(1, 1, 1)], 0.0);
    }
}

use crate::grid::GridDims;
use crate::real::Real;
use nalgebra::Vector3;

/// Maps a world-space position into staggered-grid coordinates:
/// `g = (p - origin) / size * (imax, jmax, kmax) + (1, 1, 1)`.
pub fn world_to_staggered_grid(
    position: Vector3<Real>,
    origin: Vector3<Real>,
    size: Vector3<Real>,
    dims: &GridDims,
) -> Vector3<Real> {
    let imax = dims.imax as Real;
    let jmax = dims.jmax as Real;
    let kmax = dims.kmax as Real;
    Vector3::new(
        (position.x - origin.x) / size.x * imax + 1.0,
        (position.y - origin.y) / size.y * jmax + 1.0,
        (position.z - origin.z) / size.z * kmax + 1.0,
    )
}

/// Bounds-checked corner read of a staggered velocity component. Returns 0
/// outside the buffer's true extent rather than panicking — the same
/// defensive behavior as the reference kernel's out-of-range reads, but
/// checked against this field's actual shape (see the note on
/// [`crate::particle`] about the reference's swapped jmax/kmax arguments).
#[inline]
fn read_or_zero(buf: &[Real], shape: (usize, usize, usize), i: i64, j: i64, k: i64) -> Real {
    if i < 0 || j < 0 || k < 0 {
        return 0.0;
    }
    let (ni, nj, nk) = shape;
    let (i, j, k) = (i as usize, j as usize, k as usize);
    if i >= ni || j >= nj || k >= nk {
        return 0.0;
    }
    buf[(i * nj + j) * nk + k]
}

fn frac_floor(v: Real) -> (i64, Real) {
    let floor = v.floor();
    (floor as i64, v - floor)
}

/// Eight-corner trilinear blend shared by the velocity-component and
/// derivative-stencil interpolators; `sample` maps an integer corner
/// offset to its underlying field value (already bounds-checked internally
/// via [`read_or_zero`]).
fn trilinear_blend(anchor: Vector3<Real>, sample: impl Fn(i64, i64, i64) -> Real) -> Real {
    let (ix, fx) = frac_floor(anchor.x);
    let (iy, fy) = frac_floor(anchor.y);
    let (iz, fz) = frac_floor(anchor.z);
    let gx = 1.0 - fx;
    let gy = 1.0 - fy;
    let gz = 1.0 - fz;

    gx * gy * gz * sample(ix, iy, iz)
        + fx * gy * gz * sample(ix + 1, iy, iz)
        + gx * fy * gz * sample(ix, iy + 1, iz)
        + fx * fy * gz * sample(ix + 1, iy + 1, iz)
        + gx * gy * fz * sample(ix, iy, iz + 1)
        + fx * gy * fz * sample(ix + 1, iy, iz + 1)
        + gx * fy * fz * sample(ix, iy + 1, iz + 1)
        + fx * fy * fz * sample(ix + 1, iy + 1, iz + 1)
}

pub fn interpolate_u(grid_pos: Vector3<Real>, dims: &GridDims, u: &[Real]) -> Real {
    let anchor = grid_pos - Vector3::new(1.0, 0.5, 0.5);
    let shape = dims.shape_staggered(0);
    trilinear_blend(anchor, |i, j, k| read_or_zero(u, shape, i, j, k))
}

pub fn interpolate_v(grid_pos: Vector3<Real>, dims: &GridDims, v: &[Real]) -> Real {
    let anchor = grid_pos - Vector3::new(0.5, 1.0, 0.5);
    let shape = dims.shape_staggered(1);
    trilinear_blend(anchor, |i, j, k| read_or_zero(v, shape, i, j, k))
}

pub fn interpolate_w(grid_pos: Vector3<Real>, dims: &GridDims, w: &[Real]) -> Real {
    let anchor = grid_pos - Vector3::new(0.5, 0.5, 1.0);
    let shape = dims.shape_staggered(2);
    trilinear_blend(anchor, |i, j, k| read_or_zero(w, shape, i, j, k))
}

pub fn velocity_at(position: Vector3<Real>, origin: Vector3<Real>, size: Vector3<Real>, dims: &GridDims, u: &[Real], v: &[Real], w: &[Real]) -> Vector3<Real> {
    let grid_pos = world_to_staggered_grid(position, origin, size, dims);
    Vector3::new(
        interpolate_u(grid_pos, dims, u),
        interpolate_v(grid_pos, dims, v),
        interpolate_w(grid_pos, dims, w),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn interpolation_is_exact_at_a_grid_node() {
        let dims = GridDims::new(4, 4, 4, 1.0, 1.0, 1.0);
        let mut u = vec![0.0; dims.len_staggered(0)];
        u[dims.idx_u(2, 2, 2)] = 3.0;
        let grid_pos = Vector3::new(3.0, 2.5, 2.5);
        assert_abs_diff_eq!(interpolate_u(grid_pos, &dims, &u), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn interpolation_at_the_midpoint_of_two_equal_nodes_is_their_mean() {
        let dims = GridDims::new(4, 4, 4, 1.0, 1.0, 1.0);
        let mut u = vec![0.0; dims.len_staggered(0)];
        u[dims.idx_u(2, 2, 2)] = 2.0;
        u[dims.idx_u(3, 2, 2)] = 4.0;
        let grid_pos = Vector3::new(3.5, 2.5, 2.5);
        assert_abs_diff_eq!(interpolate_u(grid_pos, &dims, &u), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn out_of_range_corner_reads_contribute_zero() {
        let dims = GridDims::new(2, 2, 2, 1.0, 1.0, 1.0);
        let u = vec![5.0; dims.len_staggered(0)];
        let grid_pos = Vector3::new(-10.0, -10.0, -10.0);
        assert_abs_diff_eq!(interpolate_u(grid_pos, &dims, &u), 0.0);
    }
}

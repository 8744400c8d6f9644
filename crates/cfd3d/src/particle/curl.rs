use crate::grid::GridDims;
use crate::real::Real;
use nalgebra::Vector3;

use super::trilinear::world_to_staggered_grid;

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

fn d_udy_at(u: &[Real], shape: (usize, usize, usize), dy: Real, i: i64, j: i64, k: i64) -> Real {
    (read_or_zero(u, shape, i, j, k) - read_or_zero(u, shape, i, j + 1, k)) / dy
}
fn d_udz_at(u: &[Real], shape: (usize, usize, usize), dz: Real, i: i64, j: i64, k: i64) -> Real {
    (read_or_zero(u, shape, i, j, k) - read_or_zero(u, shape, i, j, k + 1)) / dz
}
fn d_vdx_at(v: &[Real], shape: (usize, usize, usize), dx: Real, i: i64, j: i64, k: i64) -> Real {
    (read_or_zero(v, shape, i, j, k) - read_or_zero(v, shape, i + 1, j, k)) / dx
}
fn d_vdz_at(v: &[Real], shape: (usize, usize, usize), dz: Real, i: i64, j: i64, k: i64) -> Real {
    (read_or_zero(v, shape, i, j, k) - read_or_zero(v, shape, i, j, k + 1)) / dz
}
fn d_wdx_at(w: &[Real], shape: (usize, usize, usize), dx: Real, i: i64, j: i64, k: i64) -> Real {
    (read_or_zero(w, shape, i, j, k) - read_or_zero(w, shape, i + 1, j, k)) / dx
}
fn d_wdy_at(w: &[Real], shape: (usize, usize, usize), dy: Real, i: i64, j: i64, k: i64) -> Real {
    (read_or_zero(w, shape, i, j, k) - read_or_zero(w, shape, i, j + 1, k)) / dy
}

/// Curl of the velocity field at a particle position, assembled from the
/// six staggered derivative taps named in the field layout: `(dW/dy -
/// dV/dz, dU/dz - dW/dx, dV/dx - dU/dy)`.
#[allow(clippy::too_many_arguments)]
pub fn curl_at(position: Vector3<Real>, origin: Vector3<Real>, size: Vector3<Real>, dims: &GridDims, u: &[Real], v: &[Real], w: &[Real]) -> Vector3<Real> {
    let grid_pos = world_to_staggered_grid(position, origin, size, dims);
    let u_shape = dims.shape_staggered(0);
    let v_shape = dims.shape_staggered(1);
    let w_shape = dims.shape_staggered(2);

    let d_udy = trilinear_blend(grid_pos - Vector3::new(1.0, 1.0, 0.5), |i, j, k| d_udy_at(u, u_shape, dims.dy, i, j, k));
    let d_udz = trilinear_blend(grid_pos - Vector3::new(1.0, 0.5, 1.0), |i, j, k| d_udz_at(u, u_shape, dims.dz, i, j, k));
    let d_vdx = trilinear_blend(grid_pos - Vector3::new(1.0, 1.0, 0.5), |i, j, k| d_vdx_at(v, v_shape, dims.dx, i, j, k));
    let d_vdz = trilinear_blend(grid_pos - Vector3::new(0.5, 1.0, 1.0), |i, j, k| d_vdz_at(v, v_shape, dims.dz, i, j, k));
    let d_wdx = trilinear_blend(grid_pos - Vector3::new(1.0, 0.5, 1.0), |i, j, k| d_wdx_at(w, w_shape, dims.dx, i, j, k));
    let d_wdy = trilinear_blend(grid_pos - Vector3::new(0.5, 1.0, 1.0), |i, j, k| d_wdy_at(w, w_shape, dims.dy, i, j, k));

    Vector3::new(d_wdy - d_vdz, d_udz - d_wdx, d_vdx - d_udy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn uniform_flow_has_zero_curl() {
        let dims = GridDims::new(6, 6, 6, 1.0, 1.0, 1.0);
        let u = vec![1.0; dims.len_staggered(0)];
        let v = vec![0.0; dims.len_staggered(1)];
        let w = vec![0.0; dims.len_staggered(2)];
        let origin = Vector3::new(0.0, 0.0, 0.0);
        let size = Vector3::new(6.0, 6.0, 6.0);
        let position = Vector3::new(3.0, 3.0, 3.0);
        let curl = curl_at(position, origin, size, &dims, &u, &v, &w);
        assert_abs_diff_eq!(curl.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(curl.y, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(curl.z, 0.0, epsilon = 1e-9);
    }
}

//! Single-process backend. The predictor, RHS, corrector and boundary
//! kernels are cheap enough per cell that the reference driver runs them
//! sequentially; the pressure solve dominates the per-step cost, so that
//! is where this backend spends its rayon budget — a red-black sweep
//! whose two colors are, by construction, two disjoint read/write sets.

use rayon::prelude::*;

use super::{OutputSnapshot, SolverBackend};
use crate::boundary::{self, scenario, BoxBounds};
use crate::corrector;
use crate::fields::Fields;
use crate::flag::FlagField;
use crate::predictor::{self, PhysicalParams};
use crate::real::Real;
use crate::rhs;
use crate::sor::{self, SorParams, SorResult};
use crate::timestep::{self, TimestepParams};

/// A red or black color pass of SOR, parallelized over the outer (i)
/// plane. Neighbor reads come from a snapshot taken at the start of the
/// pass rather than the live buffer — correct, not just convenient: every
/// neighbor of a cell in one color belongs to the other color, so it is
/// never written during this pass, and the snapshot holds exactly the
/// value a sequential sweep would have read.
fn sor_sweep_color_parallel(dims: &crate::grid::GridDims, flag: &FlagField, omega: Real, rs: &[Real], p: &mut [Real], color: u8) {
    let (_, nj, nk) = dims.shape_centered();
    let stride = nj * nk;
    let snapshot = p.to_vec();

    p.par_chunks_mut(stride).enumerate().for_each(|(i, chunk)| {
        if i < 1 || i > dims.imax {
            return;
        }
        for j in 1..=dims.jmax {
            for k in 1..=dims.kmax {
                if ((i + j + k) % 2) as u8 != color {
                    continue;
                }
                if !flag.get(i, j, k).is_fluid() {
                    continue;
                }
                let (sum, d) = sor::neighbor_sum(dims, &snapshot, i, j, k);
                let p_old = snapshot[dims.idx_centered(i, j, k)];
                chunk[j * nk + k] = (1.0 - omega) * p_old + (omega / d) * (sum - rs[dims.idx_flux(i, j, k)]);
            }
        }
    });
}

/// Shared-memory scheduling model: plain sequential kernels everywhere
/// except the pressure solve, and a thread count retained only so the
/// driver can report what it was configured with (rayon sizes its own
/// pool from the global thread count unless a scoped pool is installed).
pub struct SharedMemoryBackend {
    pub thread_count: usize,
}

impl SharedMemoryBackend {
    pub fn new(thread_count: usize) -> Self {
        SharedMemoryBackend { thread_count }
    }
}

impl SolverBackend for SharedMemoryBackend {
    fn set_boundary_values(&mut self, fields: &mut Fields, flag: &FlagField, t_h: Real, t_c: Real) {
        let bounds = BoxBounds::whole_domain(fields.dims.imax, fields.dims.jmax, fields.dims.kmax);
        boundary::set_boundary_values(fields, flag, t_h, t_c, bounds);
    }

    fn set_boundary_values_scenario_specific(&mut self, name: &str, fields: &mut Fields, flag: &FlagField) {
        let bounds = BoxBounds::whole_domain(fields.dims.imax, fields.dims.jmax, fields.dims.kmax);
        scenario::apply_scenario_boundaries(name, fields, flag, bounds);
    }

    fn calculate_dt(&mut self, params: &TimestepParams, dt_initial: Real, fields: &Fields) -> Real {
        timestep::calculate_dt(&fields.dims, params, dt_initial, fields)
    }

    fn calculate_temperature(&mut self, flag: &FlagField, params: &PhysicalParams, dt: Real, fields: &mut Fields) {
        let dims = fields.dims;
        predictor::calculate_temperature(&dims, flag, params, dt, fields);
    }

    fn calculate_fgh(&mut self, flag: &FlagField, params: &PhysicalParams, dt: Real, fields: &mut Fields) {
        let dims = fields.dims;
        predictor::calculate_fgh(&dims, flag, params, dt, fields);
    }

    fn calculate_rs(&mut self, flag: &FlagField, dt: Real, fields: &mut Fields) {
        let dims = fields.dims;
        rhs::calculate_rs(&dims, flag, dt, fields);
    }

    fn execute_pressure_solver(&mut self, flag: &FlagField, params: &SorParams, fields: &mut Fields) -> SorResult {
        let dims = fields.dims;
        let mut residual = sor::pressure_residual(&dims, flag, &fields.p, &fields.rs);
        let mut iterations = 0;
        while iterations < params.itermax && residual >= params.eps {
            sor::refresh_pressure_boundary(&dims, flag, &mut fields.p);
            sor_sweep_color_parallel(&dims, flag, params.omega, &fields.rs, &mut fields.p, 0);
            sor::refresh_pressure_boundary(&dims, flag, &mut fields.p);
            sor_sweep_color_parallel(&dims, flag, params.omega, &fields.rs, &mut fields.p, 1);
            iterations += 1;
            residual = sor::pressure_residual(&dims, flag, &fields.p, &fields.rs);
        }
        SorResult { iterations, residual, converged: residual < params.eps }
    }

    fn calculate_uvw(&mut self, flag: &FlagField, dt: Real, fields: &mut Fields) {
        let dims = fields.dims;
        corrector::calculate_uvw(&dims, flag, dt, fields);
    }

    fn data_for_output<'a>(&self, fields: &'a Fields, flag: &'a FlagField) -> OutputSnapshot<'a> {
        OutputSnapshot { u: &fields.u, v: &fields.v, w: &fields.w, p: &fields.p, t: fields.t.current(), flag }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::FlagField;
    use crate::grid::GridDims;

    #[test]
    fn parallel_sweep_agrees_with_the_sequential_sweep_on_a_zero_source() {
        let dims = GridDims::new(6, 6, 6, 1.0, 1.0, 1.0);
        let flag = FlagField::new_all_fluid(dims);
        let rs = vec![0.0; dims.len_flux()];
        let mut p_seq = vec![1.0; dims.len_centered()];
        let mut p_par = p_seq.clone();

        sor::refresh_pressure_boundary(&dims, &flag, &mut p_seq);
        sor::sor_sweep_color(&dims, &flag, 1.7, &rs, &mut p_seq, 0);
        sor::refresh_pressure_boundary(&dims, &flag, &mut p_par);
        sor_sweep_color_parallel(&dims, &flag, 1.7, &rs, &mut p_par, 0);

        for (a, b) in p_seq.iter().zip(p_par.iter()) {
            assert!((a - b).abs() < 1e-9, "{a} vs {b}");
        }
    }

    #[test]
    fn backend_solves_a_small_pressure_problem() {
        let dims = GridDims::new(6, 6, 6, 1.0, 1.0, 1.0);
        let flag = FlagField::new_all_fluid(dims);
        let mut fields = Fields::new(dims);
        // A closed (all-Neumann) domain's discrete Laplacian only reaches
        // zero-mean right-hand sides, so the source needs a matching sink.
        fields.rs[dims.idx_flux(2, 2, 2)] = -1.0;
        fields.rs[dims.idx_flux(4, 4, 4)] = 1.0;
        let mut backend = SharedMemoryBackend::new(4);
        let result = backend.execute_pressure_solver(&flag, &SorParams { omega: 1.7, eps: 1e-4, itermax: 500 }, &mut fields);
        assert!(result.converged);
    }
}

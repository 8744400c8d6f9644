//! Backend polymorphism: the numerical kernels in [`crate::predictor`],
//! [`crate::rhs`], [`crate::sor`], [`crate::corrector`] and
//! [`crate::boundary`] are pure functions over plain buffers, reusable by
//! every scheduling model. A [`SolverBackend`] just decides *how* those
//! functions get driven — sequentially, rank-tiled with halo exchange, or
//! Jacobi-iterated in place of SOR — not *what* they compute.

pub mod device;
pub mod distributed;
pub mod shared_memory;

pub use device::DeviceBackend;
pub use distributed::{DistributedBackend, ExecutionContext, HaloChannel};
pub use shared_memory::SharedMemoryBackend;

use crate::fields::Fields;
use crate::flag::FlagField;
use crate::predictor::PhysicalParams;
use crate::real::Real;
use crate::sor::{SorParams, SorResult};
use crate::timestep::TimestepParams;

/// A read-only view of the fields an output writer needs; borrowed rather
/// than cloned since a distributed backend's per-rank slice is still a
/// borrow of its own local buffers, never a copy into a shared struct.
pub struct OutputSnapshot<'a> {
    pub u: &'a [Real],
    pub v: &'a [Real],
    pub w: &'a [Real],
    pub p: &'a [Real],
    pub t: &'a [Real],
    pub flag: &'a FlagField,
}

/// Capability trait every scheduling model implements: the eight
/// operations the driver loop calls each step, independent of whether
/// they run on one thread, across ranks, or on a device.
pub trait SolverBackend {
    fn set_boundary_values(&mut self, fields: &mut Fields, flag: &FlagField, t_h: Real, t_c: Real);

    fn set_boundary_values_scenario_specific(&mut self, scenario: &str, fields: &mut Fields, flag: &FlagField);

    fn calculate_dt(&mut self, params: &TimestepParams, dt_initial: Real, fields: &Fields) -> Real;

    fn calculate_temperature(&mut self, flag: &FlagField, params: &PhysicalParams, dt: Real, fields: &mut Fields);

    fn calculate_fgh(&mut self, flag: &FlagField, params: &PhysicalParams, dt: Real, fields: &mut Fields);

    fn calculate_rs(&mut self, flag: &FlagField, dt: Real, fields: &mut Fields);

    fn execute_pressure_solver(&mut self, flag: &FlagField, sor: &SorParams, fields: &mut Fields) -> SorResult;

    fn calculate_uvw(&mut self, flag: &FlagField, dt: Real, fields: &mut Fields);

    fn data_for_output<'a>(&self, fields: &'a Fields, flag: &'a FlagField) -> OutputSnapshot<'a> {
        OutputSnapshot {
            u: &fields.u,
            v: &fields.v,
            w: &fields.w,
            p: &fields.p,
            t: fields.t.current(),
            flag,
        }
    }
}

/// Lets a `Box<dyn SolverBackend>` stand in for a concrete backend —
/// `cfd3d-cli` picks the concrete type at runtime from `--solver` and
/// needs a single `Driver<_>` instantiation to hold whichever it picked.
impl SolverBackend for Box<dyn SolverBackend> {
    fn set_boundary_values(&mut self, fields: &mut Fields, flag: &FlagField, t_h: Real, t_c: Real) {
        (**self).set_boundary_values(fields, flag, t_h, t_c);
    }

    fn set_boundary_values_scenario_specific(&mut self, scenario: &str, fields: &mut Fields, flag: &FlagField) {
        (**self).set_boundary_values_scenario_specific(scenario, fields, flag);
    }

    fn calculate_dt(&mut self, params: &TimestepParams, dt_initial: Real, fields: &Fields) -> Real {
        (**self).calculate_dt(params, dt_initial, fields)
    }

    fn calculate_temperature(&mut self, flag: &FlagField, params: &PhysicalParams, dt: Real, fields: &mut Fields) {
        (**self).calculate_temperature(flag, params, dt, fields);
    }

    fn calculate_fgh(&mut self, flag: &FlagField, params: &PhysicalParams, dt: Real, fields: &mut Fields) {
        (**self).calculate_fgh(flag, params, dt, fields);
    }

    fn calculate_rs(&mut self, flag: &FlagField, dt: Real, fields: &mut Fields) {
        (**self).calculate_rs(flag, dt, fields);
    }

    fn execute_pressure_solver(&mut self, flag: &FlagField, sor: &SorParams, fields: &mut Fields) -> SorResult {
        (**self).execute_pressure_solver(flag, sor, fields)
    }

    fn calculate_uvw(&mut self, flag: &FlagField, dt: Real, fields: &mut Fields) {
        (**self).calculate_uvw(flag, dt, fields);
    }

    fn data_for_output<'a>(&self, fields: &'a Fields, flag: &'a FlagField) -> OutputSnapshot<'a> {
        (**self).data_for_output(fields, flag)
    }
}

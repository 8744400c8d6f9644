//! Outer-wall and interior-obstacle boundary conditions plus the
//! scenario-specific overlay. Every function here takes an explicit
//! [`BoxBounds`] describing the local sub-box (the whole domain for the
//! shared-memory backend, one rank's tile for the distributed backend) so
//! the same code drives both.

mod obstacle;
mod outer;
pub mod scenario;

pub use obstacle::{
    set_internal_t_boundaries, set_internal_u_boundaries, set_internal_v_boundaries,
    set_internal_w_boundaries,
};
pub use outer::{set_down_up_boundaries, set_front_back_boundaries, set_left_right_boundaries};

use crate::fields::Fields;
use crate::flag::FlagField;
use crate::real::Real;

/// Inclusive interior-cell index range this call is responsible for.
/// `il == 1` / `iu == imax` (etc.) mean this box owns the corresponding
/// global outer wall — exactly the predicate the original MPI code uses
/// to decide whether a rank touches a given face.
#[derive(Clone, Copy, Debug)]
pub struct BoxBounds {
    pub il: usize,
    pub iu: usize,
    pub jl: usize,
    pub ju: usize,
    pub kl: usize,
    pub ku: usize,
}

impl BoxBounds {
    pub fn whole_domain(imax: usize, jmax: usize, kmax: usize) -> Self {
        BoxBounds { il: 1, iu: imax, jl: 1, ju: jmax, kl: 1, ku: kmax }
    }
}

/// Runs the fixed-order boundary pass: outer walls (L/R, D/U, B/F), then
/// interior obstacles (U, V, W, T) — matching `setBoundaryValuesMpi`'s call
/// order exactly. Scenario-specific overlays run separately afterward via
/// [`scenario::apply_scenario_boundaries`].
pub fn set_boundary_values(
    fields: &mut Fields,
    flag: &FlagField,
    t_h: Real,
    t_c: Real,
    bounds: BoxBounds,
) {
    let dims = fields.dims;
    set_left_right_boundaries(&dims, flag, t_h, t_c, bounds, &mut fields.u, &mut fields.v, &mut fields.w, fields.t.current_mut());
    set_down_up_boundaries(&dims, flag, t_h, t_c, bounds, &mut fields.u, &mut fields.v, &mut fields.w, fields.t.current_mut());
    set_front_back_boundaries(&dims, flag, t_h, t_c, bounds, &mut fields.u, &mut fields.v, &mut fields.w, fields.t.current_mut());
    set_internal_u_boundaries(&dims, flag, bounds, &mut fields.u);
    set_internal_v_boundaries(&dims, flag, bounds, &mut fields.v);
    set_internal_w_boundaries(&dims, flag, bounds, &mut fields.w);
    set_internal_t_boundaries(&dims, flag, bounds, fields.t.current_mut());
}

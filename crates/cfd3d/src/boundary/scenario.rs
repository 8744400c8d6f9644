use super::BoxBounds;
use crate::fields::Fields;
use crate::flag::FlagField;
use crate::real::Real;

/// Boundary overlays that depend on which canonical scenario is running,
/// applied after the generic [`super::set_boundary_values`] pass. Kept as
/// a plain match on four scenario families — a declarative dispatch table
/// would be overkill for this few arms.
pub fn apply_scenario_boundaries(scenario: &str, fields: &mut Fields, flag: &FlagField, b: BoxBounds) {
    let dims = fields.dims;
    match scenario {
        "driven_cavity" => {
            if b.ju == dims.jmax {
                let jmax = dims.jmax;
                let il = b.il.saturating_sub(2).max(0);
                let iu = b.iu + 1;
                let kl = b.kl.saturating_sub(1).max(0);
                let ku = b.ku + 1;
                for i in il..=iu.min(dims.imax) {
                    for k in kl..=ku.min(dims.kmax + 1) {
                        fields.u[dims.idx_u(i, jmax + 1, k)] = 2.0 - fields.u[dims.idx_u(i, jmax, k)];
                    }
                }
            }
        }
        "flow_over_step" => {
            if b.il == 1 {
                for j in (dims.jmax / 2 + 1)..=dims.jmax {
                    for k in b.kl..=b.ku {
                        set_lid_inflow(fields, dims.idx_u(0, j, k), dims.idx_v(0, j, k), dims.idx_w(0, j, k));
                    }
                }
            }
        }
        "single_tower" => {
            if b.il == 1 {
                for j in b.jl..=b.ju {
                    for k in b.kl..=b.ku {
                        set_lid_inflow(fields, dims.idx_u(0, j, k), dims.idx_v(0, j, k), dims.idx_w(0, j, k));
                    }
                }
            }
        }
        "terrain_1" | "fuji_san" | "zugspitze" => {
            if b.il == 1 {
                for j in b.jl..=b.ju {
                    for k in b.kl..=b.ku {
                        if flag.get(0, j, k).is_inflow() {
                            set_lid_inflow(fields, dims.idx_u(0, j, k), dims.idx_v(0, j, k), dims.idx_w(0, j, k));
                        }
                    }
                }
            }
        }
        _ => {}
    }
}

#[inline]
fn set_lid_inflow(fields: &mut Fields, iu: usize, iv: usize, iw: usize) {
    fields.u[iu] = 1.0;
    fields.v[iv] = 0.0;
    fields.w[iw] = 0.0;
}

/// Streamline-trace time-step multiplier: `dt * 5`, doubled again for the
/// buoyancy-driven Rayleigh-Bénard case where convection alone advects too
/// slowly to produce a legible trace in a reasonable particle count.
pub fn trace_dt(scenario: &str, dt: Real) -> Real {
    let base = dt * 5.0;
    if scenario == "rayleigh_benard" {
        base * 1000.0
    } else {
        base
    }
}

//! Trilinear interpolation and curl reconstruction for streamline/pathline
//! tracing. The reference implementation this is grounded on passes
//! `(imax, kmax, jmax, ...)` — jmax and kmax swapped — into several of its
//! corner-read bounds checks. That is treated here as a defect, not a
//! contract: every bounds check in this module is against the field's true
//! shape as allocated in [`crate::grid::GridDims`], never a transposed one.

pub mod curl;
pub mod tracer;
pub mod trilinear;

pub use curl::curl_at;
pub use tracer::{advect_trajectories, seed_particles, Trajectory};
pub use trilinear::{interpolate_u, interpolate_v, interpolate_w, velocity_at, world_to_staggered_grid};

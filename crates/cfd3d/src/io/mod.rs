//! Snapshot and trajectory output. The driver treats all of this as an
//! opaque external collaborator (spec §6) — [`crate::driver::OutputWriter`]
//! is the only seam the core depends on; everything here is a concrete
//! implementation a binary can plug in.

mod geometry;
mod trajectory;
mod vtk;

pub use geometry::{GeometryLoader, NoObstacles};
pub use trajectory::{write_trajectories_binlines, write_trajectories_obj};
pub use vtk::VtkAsciiWriter;

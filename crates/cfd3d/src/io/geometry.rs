use crate::error::CfdResult;
use crate::flag::FlagField;
use crate::grid::GridDims;

/// Builds a flag field from an external geometry representation
/// (voxelized obstacle/inflow/outflow map). The core treats the result as
/// opaque input; only [`NoObstacles`] is implemented here, since a real
/// voxel/image loader is out of scope for the core (spec §1).
pub trait GeometryLoader {
    fn load(&self, dims: GridDims) -> CfdResult<FlagField>;
}

/// Default geometry when no file is supplied: an empty fluid-filled box
/// walled on all six sides with no-slip, matching the reference's
/// fallback when `geometryName` names no obstacle file.
pub struct NoObstacles;

impl GeometryLoader for NoObstacles {
    fn load(&self, dims: GridDims) -> CfdResult<FlagField> {
        let mut field = FlagField::new_all_fluid(dims);
        let (ni, nj, nk) = dims.shape_centered();

        for j in 0..nj {
            for k in 0..nk {
                field.get_mut(0, j, k).set_no_slip();
                field.get_mut(ni - 1, j, k).set_no_slip();
            }
        }
        for i in 0..ni {
            for k in 0..nk {
                field.get_mut(i, 0, k).set_no_slip();
                field.get_mut(i, nj - 1, k).set_no_slip();
            }
        }
        for i in 0..ni {
            for j in 0..nj {
                field.get_mut(i, j, 0).set_no_slip();
                field.get_mut(i, j, nk - 1).set_no_slip();
            }
        }

        field.validate()?;
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_obstacles_walls_every_outer_face_and_keeps_the_interior_fluid() {
        let dims = GridDims::new(4, 4, 4, 1.0, 1.0, 1.0);
        let field = NoObstacles.load(dims).unwrap();
        assert!(field.get(0, 2, 2).is_no_slip());
        assert!(field.get(2, 2, 2).is_fluid());
    }
}

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::backend::OutputSnapshot;
use crate::driver::OutputWriter;
use crate::error::{CfdError, CfdResult};
use crate::real::Real;

/// Legacy VTK STRUCTURED_POINTS ASCII writer. One file per snapshot,
/// named `<directory>/<base_name>.<step>.vtk`; velocity is averaged from
/// the staggered faces onto cell centers so it lines up with P and T.
pub struct VtkAsciiWriter {
    directory: PathBuf,
    base_name: String,
}

impl VtkAsciiWriter {
    /// Creates `directory` (and parents) if it does not already exist.
    pub fn new(directory: impl Into<PathBuf>, base_name: impl Into<String>) -> CfdResult<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory).map_err(|e| CfdError::Config(format!("creating output directory: {e}")))?;
        Ok(VtkAsciiWriter { directory, base_name: base_name.into() })
    }
}

impl OutputWriter for VtkAsciiWriter {
    fn write_timestep(&mut self, snapshot: &OutputSnapshot<'_>, time: Real, step: usize) -> CfdResult<()> {
        let dims = snapshot.flag.dims;
        let path = self.directory.join(format!("{}.{:05}.vtk", self.base_name, step));
        let file = File::create(&path).map_err(|e| CfdError::Config(format!("creating {}: {e}", path.display())))?;
        let mut w = BufWriter::new(file);

        let mut write = || -> std::io::Result<()> {
            writeln!(w, "# vtk DataFile Version 3.0")?;
            writeln!(w, "cfd3d snapshot step={step} t={time}")?;
            writeln!(w, "ASCII")?;
            writeln!(w, "DATASET STRUCTURED_POINTS")?;
            writeln!(w, "DIMENSIONS {} {} {}", dims.imax, dims.jmax, dims.kmax)?;
            writeln!(w, "ORIGIN 0 0 0")?;
            writeln!(w, "SPACING {} {} {}", dims.dx, dims.dy, dims.dz)?;
            writeln!(w, "POINT_DATA {}", dims.imax * dims.jmax * dims.kmax)?;

            writeln!(w, "SCALARS pressure double 1")?;
            writeln!(w, "LOOKUP_TABLE default")?;
            for i in 1..=dims.imax {
                for j in 1..=dims.jmax {
                    for k in 1..=dims.kmax {
                        writeln!(w, "{:.6}", snapshot.p[dims.idx_centered(i, j, k)])?;
                    }
                }
            }

            writeln!(w, "SCALARS temperature double 1")?;
            writeln!(w, "LOOKUP_TABLE default")?;
            for i in 1..=dims.imax {
                for j in 1..=dims.jmax {
                    for k in 1..=dims.kmax {
                        writeln!(w, "{:.6}", snapshot.t[dims.idx_centered(i, j, k)])?;
                    }
                }
            }

            writeln!(w, "VECTORS velocity double")?;
            for i in 1..=dims.imax {
                for j in 1..=dims.jmax {
                    for k in 1..=dims.kmax {
                        let u = 0.5 * (snapshot.u[dims.idx_u(i - 1, j, k)] + snapshot.u[dims.idx_u(i, j, k)]);
                        let v = 0.5 * (snapshot.v[dims.idx_v(i, j - 1, k)] + snapshot.v[dims.idx_v(i, j, k)]);
                        let wv = 0.5 * (snapshot.w[dims.idx_w(i, j, k - 1)] + snapshot.w[dims.idx_w(i, j, k)]);
                        writeln!(w, "{u:.6} {v:.6} {wv:.6}")?;
                    }
                }
            }
            Ok(())
        };
        write().map_err(|e| CfdError::Config(format!("writing {}: {e}", path.display())))?;
        w.flush().map_err(|e| CfdError::Config(format!("flushing {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Fields;
    use crate::flag::FlagField;
    use crate::grid::GridDims;

    #[test]
    fn writes_a_well_formed_header_and_one_file_per_step() {
        let dims = GridDims::new(3, 3, 3, 1.0, 1.0, 1.0);
        let flag = FlagField::new_all_fluid(dims);
        let fields = Fields::new(dims);
        let snapshot = OutputSnapshot { u: &fields.u, v: &fields.v, w: &fields.w, p: &fields.p, t: fields.t.current(), flag: &flag };

        let tmp = std::env::temp_dir().join(format!("cfd3d-vtk-test-{}", std::process::id()));
        let mut writer = VtkAsciiWriter::new(&tmp, "cavity").unwrap();
        writer.write_timestep(&snapshot, 0.1, 1).unwrap();

        let contents = std::fs::read_to_string(tmp.join("cavity.00001.vtk")).unwrap();
        assert!(contents.starts_with("# vtk DataFile Version 3.0"));
        assert!(contents.contains("DATASET STRUCTURED_POINTS"));
        assert!(contents.contains("DIMENSIONS 3 3 3"));

        std::fs::remove_dir_all(&tmp).ok();
    }
}

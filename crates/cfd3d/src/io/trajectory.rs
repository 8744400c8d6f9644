use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{CfdError, CfdResult};
use crate::particle::Trajectory;

/// Writes every trajectory as a polyline: one `v` per recorded position,
/// one `l` per trajectory referencing its own run of vertices. Written
/// once, at the end of a run, never per time step (spec §6).
pub fn write_trajectories_obj(trajectories: &[Trajectory], path: impl AsRef<Path>) -> CfdResult<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| CfdError::Config(format!("creating {}: {e}", path.display())))?;
    let mut w = BufWriter::new(file);

    let mut write = || -> std::io::Result<()> {
        writeln!(w, "# cfd3d streamline trace, {} trajectories", trajectories.len())?;
        let mut next_index = 1usize;
        for traj in trajectories {
            for p in &traj.positions {
                writeln!(w, "v {:.6} {:.6} {:.6}", p.x, p.y, p.z)?;
            }
            if traj.positions.len() >= 2 {
                write!(w, "l")?;
                for i in 0..traj.positions.len() {
                    write!(w, " {}", next_index + i)?;
                }
                writeln!(w)?;
            }
            next_index += traj.positions.len();
        }
        Ok(())
    };
    write().map_err(|e| CfdError::Config(format!("writing {}: {e}", path.display())))?;
    w.flush().map_err(|e| CfdError::Config(format!("flushing {}: {e}", path.display())))
}

/// Binary side-channel carrying the curl-length and velocity-magnitude
/// attributes alongside each position, for consumers that don't want to
/// parse OBJ vertex order back into per-trajectory attribute arrays.
/// Format: `u32` trajectory count, then per trajectory `u32` point count
/// followed by that many `(x, y, z, curl_length, velocity_magnitude)`
/// little-endian `f64` quintuples (the first position has no attributes
/// yet recorded, so it is written with zeros for both).
pub fn write_trajectories_binlines(trajectories: &[Trajectory], path: impl AsRef<Path>) -> CfdResult<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| CfdError::Config(format!("creating {}: {e}", path.display())))?;
    let mut w = BufWriter::new(file);

    let mut write = || -> std::io::Result<()> {
        w.write_all(&(trajectories.len() as u32).to_le_bytes())?;
        for traj in trajectories {
            w.write_all(&(traj.positions.len() as u32).to_le_bytes())?;
            for (i, p) in traj.positions.iter().enumerate() {
                let (curl, vmag) = if i == 0 {
                    (0.0, 0.0)
                } else {
                    (traj.curl_lengths[i - 1] as f64, traj.velocity_magnitudes[i - 1] as f64)
                };
                w.write_all(&(p.x as f64).to_le_bytes())?;
                w.write_all(&(p.y as f64).to_le_bytes())?;
                w.write_all(&(p.z as f64).to_le_bytes())?;
                w.write_all(&curl.to_le_bytes())?;
                w.write_all(&vmag.to_le_bytes())?;
            }
        }
        Ok(())
    };
    write().map_err(|e| CfdError::Config(format!("writing {}: {e}", path.display())))?;
    w.flush().map_err(|e| CfdError::Config(format!("flushing {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn sample_trajectories() -> Vec<Trajectory> {
        crate::particle::seed_particles(3, Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn obj_writer_emits_one_vertex_line_per_position() {
        let trajectories = sample_trajectories();
        let path = std::env::temp_dir().join(format!("cfd3d-trace-test-{}.obj", std::process::id()));
        write_trajectories_obj(&trajectories, &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().filter(|l| l.starts_with('v')).count(), 3);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn binlines_writer_round_trips_the_trajectory_count() {
        let trajectories = sample_trajectories();
        let path = std::env::temp_dir().join(format!("cfd3d-trace-test-{}.binlines", std::process::id()));
        write_trajectories_binlines(&trajectories, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        let count = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        assert_eq!(count, 3);
        std::fs::remove_file(&path).ok();
    }
}

use crate::fields::Fields;
use crate::grid::GridDims;
use crate::real::Real;
use nalgebra::Vector3;
use rand::RngExt;

/// A single traced particle: its current position plus the growing
/// trajectory of positions and derived attributes (curl length, velocity
/// magnitude) recorded once per advection step.
#[derive(Clone, Debug)]
pub struct Trajectory {
    pub positions: Vec<Vector3<Real>>,
    pub curl_lengths: Vec<Real>,
    pub velocity_magnitudes: Vec<Real>,
}

impl Trajectory {
    fn seeded_at(position: Vector3<Real>) -> Self {
        Trajectory { positions: vec![position], curl_lengths: Vec::new(), velocity_magnitudes: Vec::new() }
    }

    pub fn current_position(&self) -> Vector3<Real> {
        *self.positions.last().expect("a trajectory always has a seed position")
    }
}

/// Seeds `num_particles` trajectories jittered uniformly inside
/// `[seed_min, seed_max]`. No reproducibility contract is implied — each
/// call draws fresh randomness, matching the reference tool's behavior of
/// reseeding particles whenever a run starts.
pub fn seed_particles(num_particles: usize, seed_min: Vector3<Real>, seed_max: Vector3<Real>) -> Vec<Trajectory> {
    let mut rng = rand::rng();
    (0..num_particles)
        .map(|_| {
            let position = Vector3::new(
                rng.random_range(seed_min.x..=seed_max.x),
                rng.random_range(seed_min.y..=seed_max.y),
                rng.random_range(seed_min.z..=seed_max.z),
            );
            Trajectory::seeded_at(position)
        })
        .collect()
}

/// Advances every trajectory one explicit-Euler step using the
/// interpolated velocity field, then records the curl-length and
/// velocity-magnitude attributes at the new position.
pub fn advect_trajectories(
    trajectories: &mut [Trajectory],
    dims: &GridDims,
    origin: Vector3<Real>,
    size: Vector3<Real>,
    fields: &Fields,
    trace_dt: Real,
) {
    for traj in trajectories.iter_mut() {
        let pos = traj.current_position();
        let velocity = super::trilinear::velocity_at(pos, origin, size, dims, &fields.u, &fields.v, &fields.w);
        let next = pos + velocity * trace_dt;
        let curl = super::curl::curl_at(next, origin, size, dims, &fields.u, &fields.v, &fields.w);
        let velocity_at_next = super::trilinear::velocity_at(next, origin, size, dims, &fields.u, &fields.v, &fields.w);

        traj.positions.push(next);
        traj.curl_lengths.push(curl.norm());
        traj.velocity_magnitudes.push(velocity_at_next.norm());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeding_places_every_particle_within_bounds() {
        let seed_min = Vector3::new(0.0, 0.0, 0.0);
        let seed_max = Vector3::new(1.0, 1.0, 1.0);
        let trajectories = seed_particles(50, seed_min, seed_max);
        assert_eq!(trajectories.len(), 50);
        for t in &trajectories {
            let p = t.current_position();
            assert!(p.x >= 0.0 && p.x <= 1.0);
            assert!(p.y >= 0.0 && p.y <= 1.0);
            assert!(p.z >= 0.0 && p.z <= 1.0);
        }
    }

    #[test]
    fn advecting_in_a_uniform_field_moves_particle_by_velocity_times_dt() {
        let dims = GridDims::new(6, 6, 6, 1.0, 1.0, 1.0);
        let mut fields = Fields::new(dims);
        fields.u.iter_mut().for_each(|v| *v = 1.0);
        let origin = Vector3::new(0.0, 0.0, 0.0);
        let size = Vector3::new(6.0, 6.0, 6.0);
        let mut trajectories = vec![Trajectory::seeded_at(Vector3::new(3.0, 3.0, 3.0))];
        advect_trajectories(&mut trajectories, &dims, origin, size, &fields, 0.1);
        let moved = trajectories[0].current_position();
        assert!((moved.x - 3.1).abs() < 1e-6);
    }
}

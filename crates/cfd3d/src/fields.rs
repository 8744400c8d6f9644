use crate::grid::GridDims;
use crate::real::Real;

/// Double-buffered temperature: `calculate_temperature` writes into the
/// back buffer and swaps, so no cell ever reads a value another cell in
/// the same sweep already overwrote.
pub struct TempBuffer {
    front: Vec<Real>,
    back: Vec<Real>,
}

impl TempBuffer {
    fn new(len: usize) -> Self {
        TempBuffer {
            front: vec![0.0; len],
            back: vec![0.0; len],
        }
    }

    #[inline]
    pub fn current(&self) -> &[Real] {
        &self.front
    }
    #[inline]
    pub fn current_mut(&mut self) -> &mut [Real] {
        &mut self.front
    }
    #[inline]
    pub fn next(&self) -> &[Real] {
        &self.back
    }
    #[inline]
    pub fn next_mut(&mut self) -> &mut [Real] {
        &mut self.back
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.front, &mut self.back);
    }
}

/// Owns every field buffer of the simulation, allocated once at
/// construction and zero-initialized. Scenario setup then writes the
/// initial conditions into these buffers in place.
pub struct Fields {
    pub dims: GridDims,
    pub u: Vec<Real>,
    pub v: Vec<Real>,
    pub w: Vec<Real>,
    pub p: Vec<Real>,
    pub p_temp: Vec<Real>,
    pub t: TempBuffer,
    pub f: Vec<Real>,
    pub g: Vec<Real>,
    pub h: Vec<Real>,
    pub rs: Vec<Real>,
}

impl Fields {
    pub fn new(dims: GridDims) -> Self {
        Fields {
            u: vec![0.0; dims.len_staggered(0)],
            v: vec![0.0; dims.len_staggered(1)],
            w: vec![0.0; dims.len_staggered(2)],
            p: vec![0.0; dims.len_centered()],
            p_temp: vec![0.0; dims.len_centered()],
            t: TempBuffer::new(dims.len_centered()),
            f: vec![0.0; dims.len_flux()],
            g: vec![0.0; dims.len_flux()],
            h: vec![0.0; dims.len_flux()],
            rs: vec![0.0; dims.len_flux()],
            dims,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_allocate_to_the_shapes_grid_dims_predicts() {
        let dims = GridDims::new(4, 5, 6, 1.0, 1.0, 1.0);
        let fields = Fields::new(dims);
        assert_eq!(fields.u.len(), dims.len_staggered(0));
        assert_eq!(fields.v.len(), dims.len_staggered(1));
        assert_eq!(fields.w.len(), dims.len_staggered(2));
        assert_eq!(fields.p.len(), dims.len_centered());
        assert_eq!(fields.rs.len(), dims.len_flux());
    }

    #[test]
    fn temp_buffer_swap_exchanges_front_and_back() {
        let mut t = TempBuffer::new(4);
        t.current_mut()[0] = 1.0;
        t.next_mut()[0] = 2.0;
        t.swap();
        assert_eq!(t.current()[0], 2.0);
        assert_eq!(t.next()[0], 1.0);
    }
}

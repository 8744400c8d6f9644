use crate::error::CfdError;
use crate::grid::GridDims;

const KIND_MASK: u16 = 0b0000_0000_0000_0111;
const FLUID: u16 = 0;
const NO_SLIP: u16 = 1;
const FREE_SLIP: u16 = 2;
const OUTFLOW: u16 = 3;
const INFLOW: u16 = 4;
const COUPLING: u16 = 5;

const HOT_BIT: u16 = 1 << 3;
const COLD_BIT: u16 = 1 << 4;

const B_L: u16 = 1 << 5;
const B_R: u16 = 1 << 6;
const B_D: u16 = 1 << 7;
const B_U: u16 = 1 << 8;
const B_B: u16 = 1 << 9;
const B_F: u16 = 1 << 10;

/// A single cell's kind, thermal tag and obstacle-adjacency bits, packed
/// into one `u16`. Kept as a typed wrapper rather than a bare integer with
/// mask constants scattered through the boundary engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flag(u16);

impl Flag {
    pub const fn fluid() -> Self {
        Flag(FLUID)
    }

    pub fn set_no_slip(&mut self) {
        self.0 = (self.0 & !KIND_MASK) | NO_SLIP;
    }
    pub fn set_free_slip(&mut self) {
        self.0 = (self.0 & !KIND_MASK) | FREE_SLIP;
    }
    pub fn set_outflow(&mut self) {
        self.0 = (self.0 & !KIND_MASK) | OUTFLOW;
    }
    pub fn set_inflow(&mut self) {
        self.0 = (self.0 & !KIND_MASK) | INFLOW;
    }
    pub fn set_coupling(&mut self) {
        self.0 = (self.0 & !KIND_MASK) | COUPLING;
    }

    #[inline]
    pub fn is_fluid(self) -> bool {
        self.0 & KIND_MASK == FLUID
    }
    #[inline]
    pub fn is_no_slip(self) -> bool {
        self.0 & KIND_MASK == NO_SLIP
    }
    #[inline]
    pub fn is_free_slip(self) -> bool {
        self.0 & KIND_MASK == FREE_SLIP
    }
    #[inline]
    pub fn is_outflow(self) -> bool {
        self.0 & KIND_MASK == OUTFLOW
    }
    #[inline]
    pub fn is_inflow(self) -> bool {
        self.0 & KIND_MASK == INFLOW
    }
    #[inline]
    pub fn is_coupling(self) -> bool {
        self.0 & KIND_MASK == COUPLING
    }
    #[inline]
    pub fn is_obstacle(self) -> bool {
        !self.is_fluid()
    }

    pub fn set_hot(&mut self) {
        self.0 = (self.0 & !COLD_BIT) | HOT_BIT;
    }
    pub fn set_cold(&mut self) {
        self.0 = (self.0 & !HOT_BIT) | COLD_BIT;
    }
    #[inline]
    pub fn is_hot(self) -> bool {
        self.0 & HOT_BIT != 0
    }
    #[inline]
    pub fn is_cold(self) -> bool {
        self.0 & COLD_BIT != 0
    }

    pub fn set_b_l(&mut self, v: bool) {
        self.set_bit(B_L, v);
    }
    pub fn set_b_r(&mut self, v: bool) {
        self.set_bit(B_R, v);
    }
    pub fn set_b_d(&mut self, v: bool) {
        self.set_bit(B_D, v);
    }
    pub fn set_b_u(&mut self, v: bool) {
        self.set_bit(B_U, v);
    }
    pub fn set_b_b(&mut self, v: bool) {
        self.set_bit(B_B, v);
    }
    pub fn set_b_f(&mut self, v: bool) {
        self.set_bit(B_F, v);
    }

    #[inline]
    pub fn b_l(self) -> bool {
        self.0 & B_L != 0
    }
    #[inline]
    pub fn b_r(self) -> bool {
        self.0 & B_R != 0
    }
    #[inline]
    pub fn b_d(self) -> bool {
        self.0 & B_D != 0
    }
    #[inline]
    pub fn b_u(self) -> bool {
        self.0 & B_U != 0
    }
    #[inline]
    pub fn b_b(self) -> bool {
        self.0 & B_B != 0
    }
    #[inline]
    pub fn b_f(self) -> bool {
        self.0 & B_F != 0
    }

    #[inline]
    fn set_bit(&mut self, bit: u16, v: bool) {
        if v {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }

    /// The thin-wall rule: a cell may not carry both face bits of an
    /// opposing pair (a wall can't be adjacent to an obstacle on both
    /// sides of the same axis with zero thickness between them).
    fn violates_thin_wall(self) -> bool {
        (self.b_l() && self.b_r()) || (self.b_d() && self.b_u()) || (self.b_b() && self.b_f())
    }
}

/// Owns the flag buffer for the whole domain and enforces the structural
/// invariants at construction time (thin-wall rule, ghost cells never
/// bordering interior fluid on the outside).
pub struct FlagField {
    pub dims: GridDims,
    pub cells: Vec<Flag>,
}

impl FlagField {
    pub fn new_all_fluid(dims: GridDims) -> Self {
        FlagField {
            cells: vec![Flag::fluid(); dims.len_centered()],
            dims,
        }
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> Flag {
        self.cells[self.dims.idx_centered(i, j, k)]
    }

    #[inline]
    pub fn get_mut(&mut self, i: usize, j: usize, k: usize) -> &mut Flag {
        let idx = self.dims.idx_centered(i, j, k);
        &mut self.cells[idx]
    }

    /// Validate the thin-wall rule over every cell. Called once after
    /// scenario/geometry initialization, never per step.
    pub fn validate(&self) -> Result<(), CfdError> {
        let (ni, nj, nk) = self.dims.shape_centered();
        for i in 0..ni {
            for j in 0..nj {
                for k in 0..nk {
                    let flag = self.get(i, j, k);
                    if flag.violates_thin_wall() {
                        return Err(CfdError::Domain(format!(
                            "cell ({i}, {j}, {k}) violates the thin-wall rule: opposing obstacle face bits are both set"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_flag_is_fluid_with_no_bits_set() {
        let f = Flag::fluid();
        assert!(f.is_fluid());
        assert!(!f.is_hot());
        assert!(!f.b_l());
    }

    #[test]
    fn kind_setters_are_mutually_exclusive() {
        let mut f = Flag::fluid();
        f.set_no_slip();
        assert!(f.is_no_slip());
        f.set_outflow();
        assert!(f.is_outflow());
        assert!(!f.is_no_slip());
    }

    #[test]
    fn thin_wall_violation_is_detected() {
        let mut f = Flag::fluid();
        f.set_b_l(true);
        f.set_b_r(true);
        assert!(f.violates_thin_wall());
    }

    #[test]
    fn flag_field_validate_rejects_thin_wall_violation() {
        let dims = GridDims::new(2, 2, 2, 1.0, 1.0, 1.0);
        let mut field = FlagField::new_all_fluid(dims);
        field.get_mut(1, 1, 1).set_b_l(true);
        field.get_mut(1, 1, 1).set_b_r(true);
        assert!(field.validate().is_err());
    }

    #[test]
    fn flag_field_validate_accepts_clean_geometry() {
        let dims = GridDims::new(2, 2, 2, 1.0, 1.0, 1.0);
        let field = FlagField::new_all_fluid(dims);
        assert!(field.validate().is_ok());
    }
}

use super::BoxBounds;
use crate::flag::FlagField;
use crate::grid::GridDims;
use crate::real::Real;

/// Left (i=0) and right (i=imax+1) outer walls. Only touches the domain
/// when this box's range actually reaches the corresponding global face.
pub fn set_left_right_boundaries(
    dims: &GridDims,
    flag: &FlagField,
    t_h: Real,
    t_c: Real,
    b: BoxBounds,
    u: &mut [Real],
    v: &mut [Real],
    w: &mut [Real],
    t: &mut [Real],
) {
    if b.il == 1 {
        for j in b.jl..=b.ju {
            for k in b.kl..=b.ku {
                let f = flag.get(0, j, k);
                if f.is_no_slip() || f.is_free_slip() {
                    u[dims.idx_u(0, j, k)] = 0.0;
                } else if f.is_outflow() {
                    u[dims.idx_u(0, j, k)] = u[dims.idx_u(1, j, k)];
                }
                t[dims.idx_centered(0, j, k)] = if f.is_hot() {
                    2.0 * t_h - t[dims.idx_centered(1, j, k)]
                } else if f.is_cold() {
                    2.0 * t_c - t[dims.idx_centered(1, j, k)]
                } else {
                    t[dims.idx_centered(1, j, k)]
                };
            }
        }
        for j in (b.jl - 1)..=b.ju {
            for k in (b.kl - 1)..=b.ku {
                let f = flag.get(0, j, k);
                if f.is_no_slip() {
                    v[dims.idx_v(0, j, k)] = -v[dims.idx_v(1, j, k)];
                    w[dims.idx_w(0, j, k)] = -w[dims.idx_w(1, j, k)];
                } else if f.is_free_slip() || f.is_outflow() {
                    v[dims.idx_v(0, j, k)] = v[dims.idx_v(1, j, k)];
                    w[dims.idx_w(0, j, k)] = w[dims.idx_w(1, j, k)];
                }
            }
        }
    }

    if b.iu == dims.imax {
        let imax = dims.imax;
        for j in b.jl..=b.ju {
            for k in b.kl..=b.ku {
                let f = flag.get(imax + 1, j, k);
                if f.is_no_slip() || f.is_free_slip() {
                    u[dims.idx_u(imax, j, k)] = 0.0;
                } else if f.is_outflow() {
                    u[dims.idx_u(imax, j, k)] = u[dims.idx_u(imax - 1, j, k)];
                }
                t[dims.idx_centered(imax + 1, j, k)] = if f.is_hot() {
                    2.0 * t_h - t[dims.idx_centered(imax, j, k)]
                } else if f.is_cold() {
                    2.0 * t_c - t[dims.idx_centered(imax, j, k)]
                } else {
                    t[dims.idx_centered(imax, j, k)]
                };
            }
        }
        for j in (b.jl - 1)..=b.ju {
            for k in (b.kl - 1)..=b.ku {
                let f = flag.get(imax + 1, j, k);
                if f.is_no_slip() {
                    v[dims.idx_v(imax + 1, j, k)] = -v[dims.idx_v(imax, j, k)];
                    w[dims.idx_w(imax + 1, j, k)] = -w[dims.idx_w(imax, j, k)];
                } else if f.is_free_slip() || f.is_outflow() {
                    v[dims.idx_v(imax + 1, j, k)] = v[dims.idx_v(imax, j, k)];
                    w[dims.idx_w(imax + 1, j, k)] = w[dims.idx_w(imax, j, k)];
                }
            }
        }
    }
}

/// Down (j=0) and up (j=jmax+1) outer walls.
pub fn set_down_up_boundaries(
    dims: &GridDims,
    flag: &FlagField,
    t_h: Real,
    t_c: Real,
    b: BoxBounds,
    u: &mut [Real],
    v: &mut [Real],
    w: &mut [Real],
    t: &mut [Real],
) {
    if b.jl == 1 {
        for i in b.il..=b.iu {
            for k in b.kl..=b.ku {
                let f = flag.get(i, 0, k);
                if f.is_no_slip() || f.is_free_slip() {
                    v[dims.idx_v(i, 0, k)] = 0.0;
                } else if f.is_outflow() {
                    v[dims.idx_v(i, 0, k)] = v[dims.idx_v(i, 1, k)];
                }
                t[dims.idx_centered(i, 0, k)] = if f.is_hot() {
                    2.0 * t_h - t[dims.idx_centered(i, 1, k)]
                } else if f.is_cold() {
                    2.0 * t_c - t[dims.idx_centered(i, 1, k)]
                } else {
                    t[dims.idx_centered(i, 1, k)]
                };
            }
        }
        for i in (b.il - 1)..=b.iu {
            for k in (b.kl - 1)..=b.ku {
                let f = flag.get(i, 0, k);
                if f.is_no_slip() {
                    u[dims.idx_u(i, 0, k)] = -u[dims.idx_u(i, 1, k)];
                    w[dims.idx_w(i, 0, k)] = -w[dims.idx_w(i, 1, k)];
                } else if f.is_free_slip() || f.is_outflow() {
                    u[dims.idx_u(i, 0, k)] = u[dims.idx_u(i, 1, k)];
                    w[dims.idx_w(i, 0, k)] = w[dims.idx_w(i, 1, k)];
                }
            }
        }
    }

    if b.ju == dims.jmax {
        let jmax = dims.jmax;
        for i in b.il..=b.iu {
            for k in b.kl..=b.ku {
                let f = flag.get(i, jmax + 1, k);
                if f.is_no_slip() || f.is_free_slip() {
                    v[dims.idx_v(i, jmax, k)] = 0.0;
                } else if f.is_outflow() {
                    v[dims.idx_v(i, jmax, k)] = v[dims.idx_v(i, jmax - 1, k)];
                }
                t[dims.idx_centered(i, jmax + 1, k)] = if f.is_hot() {
                    2.0 * t_h - t[dims.idx_centered(i, jmax, k)]
                } else if f.is_cold() {
                    2.0 * t_c - t[dims.idx_centered(i, jmax, k)]
                } else {
                    t[dims.idx_centered(i, jmax, k)]
                };
            }
        }
        for i in (b.il - 1)..=b.iu {
            for k in (b.kl - 1)..=b.ku {
                let f = flag.get(i, jmax + 1, k);
                if f.is_no_slip() {
                    u[dims.idx_u(i, jmax + 1, k)] = -u[dims.idx_u(i, jmax, k)];
                    w[dims.idx_w(i, jmax + 1, k)] = -w[dims.idx_w(i, jmax, k)];
                } else if f.is_free_slip() {
                    u[dims.idx_u(i, jmax + 1, k)] = u[dims.idx_u(i, jmax, k)];
                    w[dims.idx_w(i, jmax + 1, k)] = w[dims.idx_w(i, jmax, k)];
                } else if f.is_outflow() {
                    u[dims.idx_u(i, jmax + 1, k)] = u[dims.idx_u(i, jmax, k)];
                    v[dims.idx_v(i, jmax, k)] = v[dims.idx_v(i, jmax - 1, k)];
                    w[dims.idx_w(i, jmax + 1, k)] = w[dims.idx_w(i, jmax, k)];
                }
            }
        }
    }
}

/// Back (k=0) and front (k=kmax+1) outer walls.
pub fn set_front_back_boundaries(
    dims: &GridDims,
    flag: &FlagField,
    t_h: Real,
    t_c: Real,
    b: BoxBounds,
    u: &mut [Real],
    v: &mut [Real],
    w: &mut [Real],
    t: &mut [Real],
) {
    if b.kl == 1 {
        for i in b.il..=b.iu {
            for j in b.jl..=b.ju {
                let f = flag.get(i, j, 0);
                if f.is_no_slip() || f.is_free_slip() {
                    w[dims.idx_w(i, j, 0)] = 0.0;
                } else if f.is_outflow() {
                    w[dims.idx_w(i, j, 0)] = w[dims.idx_w(i, j, 1)];
                }
                t[dims.idx_centered(i, j, 0)] = if f.is_hot() {
                    2.0 * t_h - t[dims.idx_centered(i, j, 1)]
                } else if f.is_cold() {
                    2.0 * t_c - t[dims.idx_centered(i, j, 1)]
                } else {
                    t[dims.idx_centered(i, j, 1)]
                };
            }
        }
        for i in (b.il - 1)..=b.iu {
            for j in (b.jl - 1)..=b.ju {
                let f = flag.get(i, j, 0);
                if f.is_no_slip() {
                    u[dims.idx_u(i, j, 0)] = -u[dims.idx_u(i, j, 1)];
                    v[dims.idx_v(i, j, 0)] = -v[dims.idx_v(i, j, 1)];
                } else if f.is_free_slip() || f.is_outflow() {
                    u[dims.idx_u(i, j, 0)] = u[dims.idx_u(i, j, 1)];
                    v[dims.idx_v(i, j, 0)] = v[dims.idx_v(i, j, 1)];
                }
            }
        }
    }

    if b.ku == dims.kmax {
        let kmax = dims.kmax;
        for i in b.il..=b.iu {
            for j in b.jl..=b.ju {
                let f = flag.get(i, j, kmax + 1);
                if f.is_no_slip() || f.is_free_slip() {
                    w[dims.idx_w(i, j, kmax)] = 0.0;
                } else if f.is_outflow() {
                    w[dims.idx_w(i, j, kmax)] = w[dims.idx_w(i, j, kmax - 1)];
                }
                t[dims.idx_centered(i, j, kmax + 1)] = if f.is_hot() {
                    2.0 * t_h - t[dims.idx_centered(i, j, kmax)]
                } else if f.is_cold() {
                    2.0 * t_c - t[dims.idx_centered(i, j, kmax)]
                } else {
                    t[dims.idx_centered(i, j, kmax)]
                };
            }
        }
        for i in (b.il - 1)..=b.iu {
            for j in (b.jl - 1)..=b.ju {
                let f = flag.get(i, j, kmax + 1);
                if f.is_no_slip() {
                    u[dims.idx_u(i, j, kmax + 1)] = -u[dims.idx_u(i, j, kmax)];
                    v[dims.idx_v(i, j, kmax + 1)] = -v[dims.idx_v(i, j, kmax)];
                } else if f.is_free_slip() || f.is_outflow() {
                    u[dims.idx_u(i, j, kmax + 1)] = u[dims.idx_u(i, j, kmax)];
                    v[dims.idx_v(i, j, kmax + 1)] = v[dims.idx_v(i, j, kmax)];
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::FlagField;

    #[test]
    fn no_slip_left_wall_zeros_normal_velocity() {
        let dims = GridDims::new(3, 3, 3, 1.0, 1.0, 1.0);
        let mut flag = FlagField::new_all_fluid(dims);
        for j in 0..5 {
            for k in 0..5 {
                flag.get_mut(0, j, k).set_no_slip();
            }
        }
        let mut u = vec![1.0; dims.len_staggered(0)];
        let mut v = vec![2.0; dims.len_staggered(1)];
        let mut w = vec![2.0; dims.len_staggered(2)];
        let mut t = vec![5.0; dims.len_centered()];
        let b = BoxBounds::whole_domain(dims.imax, dims.jmax, dims.kmax);
        set_left_right_boundaries(&dims, &flag, 1.0, 0.0, b, &mut u, &mut v, &mut w, &mut t);
        assert_eq!(u[dims.idx_u(0, 1, 1)], 0.0);
        assert_eq!(v[dims.idx_v(0, 1, 1)], -v[dims.idx_v(1, 1, 1)]);
    }
}

//! Multi-point constraint elimination by transformation
//!
//! With `n` the independent DOFs (g-order complement of the dependents) and
//! `T` the `g × n` transformation, `u_g = T u_n`. Each dependent row of `T`
//! holds `-cᵢ / c_m` for the independent terms of its equation.

use log::debug;

use crate::constraints::MpcTerm;
use crate::dof::DofSubset;
use crate::error::{FEAError, FEAResult};
use crate::math::{complement, Mat, SystemMatrix, Vector};

#[derive(Debug, Clone)]
pub struct MpcReduction {
    /// g index of each n column
    independent: Vec<usize>,
    /// n position of each g index, `None` for dependents
    position: Vec<Option<usize>>,
    t: Mat,
}

impl MpcReduction {
    /// Build `T` from the dependent set `mp` and the equation terms
    pub fn new(n_g: usize, mp: &DofSubset, terms: &[MpcTerm]) -> FEAResult<Self> {
        let independent = complement(n_g, &mp.indices);
        let mut position = vec![None; n_g];
        for (col, &g) in independent.iter().enumerate() {
            position[g] = Some(col);
        }

        let mut t = Mat::zeros(n_g, independent.len());
        for (col, &g) in independent.iter().enumerate() {
            t[(g, col)] = 1.0;
        }

        for (equation, (dependent, c_m)) in mp.iter().enumerate() {
            let mut first = true;
            for term in terms.iter().filter(|t| t.equation == equation) {
                if first {
                    first = false;
                    continue;
                }
                let col = position.get(term.dof).copied().flatten().ok_or_else(|| {
                    FEAError::Configuration(format!(
                        "MPC equation {} uses dependent DOF index {} as an independent term",
                        equation, term.dof
                    ))
                })?;
                t[(dependent, col)] += -term.coefficient / c_m;
            }
        }

        debug!(
            "MPC transformation: {} equations, g = {}, n = {}",
            mp.len(),
            n_g,
            independent.len()
        );
        Ok(Self {
            independent,
            position,
            t,
        })
    }

    /// The transformation matrix `T (g × n)`
    pub fn transformation(&self) -> &Mat {
        &self.t
    }

    /// g index of every n-space DOF, in n order
    pub fn independent(&self) -> &[usize] {
        &self.independent
    }

    /// `Tᵀ K T`
    pub fn reduce_matrix(&self, k: &SystemMatrix) -> SystemMatrix {
        let kt = match k {
            SystemMatrix::Dense(m) => m * &self.t,
            SystemMatrix::Sparse(_) => k.to_dense() * &self.t,
        };
        SystemMatrix::Dense(self.t.transpose() * kt)
    }

    /// `Tᵀ f`
    pub fn reduce_vector(&self, f: &Vector) -> Vector {
        self.t.tr_mul(f)
    }

    /// `u_g = T u_n`
    pub fn expand(&self, un: &Vector) -> Vector {
        &self.t * un
    }

    /// Expand each column of an n-space matrix
    pub fn expand_columns(&self, xn: &Mat) -> Mat {
        &self.t * xn
    }

    /// Map a g-space subset into n-space, keeping its values
    pub fn to_local(&self, subset: &DofSubset) -> FEAResult<DofSubset> {
        let mut local = if subset.values.is_some() {
            DofSubset::valued()
        } else {
            DofSubset::new()
        };
        for (k, &g) in subset.indices.iter().enumerate() {
            let n = self.position.get(g).copied().flatten().ok_or_else(|| {
                FEAError::Configuration(format!(
                    "DOF index {} is both constrained and MPC-dependent",
                    g
                ))
            })?;
            if subset.values.is_some() {
                local.push_value(n, subset.value_at(k));
            } else {
                local.push(n);
            }
        }
        Ok(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn term(equation: usize, dof: usize, coefficient: f64) -> MpcTerm {
        MpcTerm {
            equation,
            dof,
            coefficient,
        }
    }

    #[test]
    fn test_transformation_rows() {
        // 2 u1 - 4 u3 + u0 = 0  ->  u1 = 2 u3 - 0.5 u0
        let mut mp = DofSubset::valued();
        mp.push_value(1, 2.0);
        let terms = vec![term(0, 1, 2.0), term(0, 3, -4.0), term(0, 0, 1.0)];
        let mpc = MpcReduction::new(4, &mp, &terms).unwrap();

        assert_eq!(mpc.independent(), &[0, 2, 3]);
        let t = mpc.transformation();
        assert_eq!(t.shape(), (4, 3));
        assert_relative_eq!(t[(1, 2)], 2.0);
        assert_relative_eq!(t[(1, 0)], -0.5);

        let ug = mpc.expand(&Vector::from_vec(vec![2.0, 5.0, 1.0]));
        assert_relative_eq!(ug[1], 1.0);
        assert_relative_eq!(ug[2], 5.0);
    }

    #[test]
    fn test_reduction_preserves_symmetry() {
        let mut mp = DofSubset::valued();
        mp.push_value(2, 1.0);
        let terms = vec![term(0, 2, 1.0), term(0, 0, -1.0)];
        let mpc = MpcReduction::new(3, &mp, &terms).unwrap();

        let k = SystemMatrix::Dense(Mat::from_row_slice(
            3,
            3,
            &[2.0, -1.0, 0.0, -1.0, 2.0, -1.0, 0.0, -1.0, 1.0],
        ));
        let knn = mpc.reduce_matrix(&k);
        assert_eq!(knn.size(), 2);
        assert_relative_eq!(knn.asymmetry(), 0.0);
        // tied DOFs 0 and 2 share stiffness: 2 + 1 + 0 + 0
        assert_relative_eq!(knn.get(0, 0), 3.0);
        assert_relative_eq!(knn.get(0, 1), -2.0);

        let fn_ = mpc.reduce_vector(&Vector::from_vec(vec![1.0, 0.0, 2.0]));
        assert_relative_eq!(fn_[0], 3.0);
    }

    #[test]
    fn test_dependent_as_independent_term() {
        let mut mp = DofSubset::valued();
        mp.push_value(0, 1.0);
        mp.push_value(1, 1.0);
        let terms = vec![
            term(0, 0, 1.0),
            term(0, 2, -1.0),
            term(1, 1, 1.0),
            term(1, 0, -1.0),
        ];
        assert!(matches!(
            MpcReduction::new(3, &mp, &terms),
            Err(FEAError::Configuration(_))
        ));
    }

    #[test]
    fn test_subset_mapping() {
        let mut mp = DofSubset::valued();
        mp.push_value(1, 1.0);
        let terms = vec![term(0, 1, 1.0), term(0, 0, -1.0)];
        let mpc = MpcReduction::new(4, &mp, &terms).unwrap();

        let mut s = DofSubset::valued();
        s.push_value(3, 0.5);
        let local = mpc.to_local(&s).unwrap();
        assert_eq!(local.indices, vec![2]);
        assert_eq!(local.values, Some(vec![0.5]));

        let mut bad = DofSubset::new();
        bad.push(1);
        assert!(mpc.to_local(&bad).is_err());
    }
}

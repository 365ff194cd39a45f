//! Partitioned linear solver
//!
//! The system is split into the constrained set `s` and its free complement.
//! Free DOFs are solved from
//!
//! ```text
//! Ka · Ua = Fa,   Ka = K[free, free],   Fa = F[free] - K[free, s] · Us
//! ```
//!
//! and the full vector is reconstructed from `Ua` and the enforced `Us`.
//! Rows with an exactly zero diagonal can be constrained automatically
//! (AUTOSPC) and the reduced system solved once more.

mod modal;
mod mpc;

pub use modal::ModalSolve;
pub use mpc::MpcReduction;

use log::{debug, info, warn};

use crate::analysis::AnalysisOptions;
use crate::dof::{DofIndex, DofKey, DofSubset};
use crate::error::{FEAError, FEAResult};
use crate::math::{complement, scatter, solve_linear_system, subvector, Mat, SystemMatrix, Vector};

/// Result of a static solve in the solver's index space
#[derive(Debug, Clone)]
pub struct StaticSolve {
    pub u: Vector,
    /// DOFs constrained by automatic SPC
    pub recovered: Vec<DofKey>,
}

/// Free-set partition after optional zero-pivot recovery
struct Partition {
    /// Solved DOFs
    free: Vec<usize>,
    /// Free DOFs constrained to zero by automatic SPC
    recovered: Vec<usize>,
}

pub struct PartitionedSolver<'a> {
    index: &'a DofIndex,
    options: &'a AnalysisOptions,
    /// g index of each local matrix row; identity without MPCs
    dof_map: Option<&'a [usize]>,
}

impl<'a> PartitionedSolver<'a> {
    pub fn new(index: &'a DofIndex, options: &'a AnalysisOptions) -> Self {
        Self {
            index,
            options,
            dof_map: None,
        }
    }

    /// Solve in a reduced space whose row `i` is g index `dof_map[i]`
    pub fn with_dof_map(mut self, dof_map: &'a [usize]) -> Self {
        self.dof_map = Some(dof_map);
        self
    }

    fn keys(&self, local: &[usize]) -> Vec<DofKey> {
        match self.dof_map {
            Some(map) => {
                let g: Vec<usize> = local.iter().filter_map(|&i| map.get(i).copied()).collect();
                self.index.keys_of(&g)
            }
            None => self.index.keys_of(local),
        }
    }

    fn check_shapes(&self, k: &SystemMatrix, s: &DofSubset) -> FEAResult<usize> {
        let n = k.size();
        if let Some(&bad) = s.indices.iter().find(|&&i| i >= n) {
            return Err(FEAError::Configuration(format!(
                "constrained DOF index {} outside the {}-DOF system",
                bad, n
            )));
        }
        Ok(n)
    }

    /// Split the complement of `s` and apply automatic SPC to exact zero
    /// diagonals of `Ka`.
    fn partition(&self, k: &SystemMatrix, s: &DofSubset) -> FEAResult<Partition> {
        let candidates = complement(k.size(), &s.indices);
        let diagonal = k.diagonal();
        let (zero, free): (Vec<usize>, Vec<usize>) =
            candidates.into_iter().partition(|&i| diagonal[i] == 0.0);

        if zero.is_empty() {
            return Ok(Partition {
                free,
                recovered: Vec::new(),
            });
        }

        let keys = self.keys(&zero);
        if !self.options.auto_spc {
            return Err(FEAError::SingularMatrix { dofs: keys });
        }
        warn!(
            "automatic SPC: constraining {} DOF(s) with zero stiffness: {}",
            keys.len(),
            keys.iter()
                .map(|k| k.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(Partition {
            free,
            recovered: zero,
        })
    }

    /// Solve `K u = F` with `u[s]` fixed to the values carried by `s`
    pub fn solve_static(
        &self,
        kgg: &SystemMatrix,
        fg: &Vector,
        s: &DofSubset,
    ) -> FEAResult<StaticSolve> {
        let n = self.check_shapes(kgg, s)?;
        if fg.len() != n {
            return Err(FEAError::Configuration(format!(
                "load vector has {} entries for a {}-DOF system",
                fg.len(),
                n
            )));
        }

        let part = self.partition(kgg, s)?;
        let us = Vector::from_iterator(s.len(), (0..s.len()).map(|k| s.value_at(k)));

        let ka = kgg.block(&part.free, &part.free);
        let mut fa = subvector(fg, &part.free);
        if us.iter().any(|v| *v != 0.0) {
            fa -= kgg.block(&part.free, &s.indices) * &us;
        }
        debug!(
            "static partition: {} free, {} constrained, {} recovered",
            part.free.len(),
            s.len(),
            part.recovered.len()
        );

        let ua = self.factor_solve(&ka, &fa, &part.free)?;
        let zeros = Vector::zeros(part.recovered.len());
        let u = scatter(
            n,
            &[
                (part.free.as_slice(), &ua),
                (s.indices.as_slice(), &us),
                (part.recovered.as_slice(), &zeros),
            ],
        )?;

        info!(
            "static solve complete: {} DOFs, max |u| = {:.6e}",
            n,
            u.amax()
        );
        Ok(StaticSolve {
            u,
            recovered: self.keys(&part.recovered),
        })
    }

    /// Cholesky, falling back to LU; singular systems name their DOFs
    fn factor_solve(&self, ka: &Mat, fa: &Vector, free: &[usize]) -> FEAResult<Vector> {
        if ka.nrows() == 0 {
            return Ok(Vector::zeros(0));
        }
        let max_diag = ka.diagonal().amax();
        let threshold = self.options.pivot_tolerance * max_diag;

        if let Some(chol) = ka.clone().cholesky() {
            let l = chol.l_dirty();
            let small: Vec<usize> = (0..ka.nrows())
                .filter(|&i| l[(i, i)] * l[(i, i)] <= threshold)
                .map(|i| free[i])
                .collect();
            if !small.is_empty() {
                warn!(
                    "ill-conditioned stiffness: {} pivot(s) below {:.3e} at {}",
                    small.len(),
                    threshold,
                    self.keys(&small)
                        .iter()
                        .map(|k| k.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
            let ua = chol.solve(fa);
            if ua.iter().all(|v| v.is_finite()) {
                return Ok(ua);
            }
        }

        debug!("Cholesky failed, falling back to LU");
        if let Some(ua) = solve_linear_system(ka, fa) {
            if ua.iter().all(|v| v.is_finite()) {
                return Ok(ua);
            }
        }

        let local: Vec<usize> = small_pivots(ka, threshold)
            .into_iter()
            .map(|i| free[i])
            .collect();
        Err(FEAError::SingularMatrix {
            dofs: self.keys(&local),
        })
    }
}

/// Positions whose Gaussian elimination pivot falls below `threshold`.
///
/// Elimination runs without row exchanges; a small pivot is skipped so that
/// later pivots are still examined. If nothing falls below the threshold the
/// smallest pivot is reported.
fn small_pivots(a: &Mat, threshold: f64) -> Vec<usize> {
    let n = a.nrows();
    let mut w = a.clone();
    let mut small = Vec::new();
    let mut smallest = (0, f64::INFINITY);

    for k in 0..n {
        let pivot = w[(k, k)];
        if pivot.abs() < smallest.1 {
            smallest = (k, pivot.abs());
        }
        if pivot.abs() <= threshold {
            small.push(k);
            continue;
        }
        for i in (k + 1)..n {
            let factor = w[(i, k)] / pivot;
            if factor == 0.0 {
                continue;
            }
            for j in k..n {
                w[(i, j)] -= factor * w[(k, j)];
            }
        }
    }

    if small.is_empty() && n > 0 {
        small.push(smallest.0);
    }
    small
}

/// `(K u - F)[rows]`: constraint forces at the listed DOFs
pub fn constraint_forces(k: &SystemMatrix, u: &Vector, f: &Vector, rows: &[usize]) -> Vector {
    let residual = k.mul_vector(u) - f;
    subvector(&residual, rows)
}

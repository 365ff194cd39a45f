//! Real eigenvalue solve on the free partition

use log::info;

use super::{small_pivots, PartitionedSolver};
use crate::dof::{DofKey, DofSubset};
use crate::error::{FEAError, FEAResult};
use crate::math::{generalized_symmetric_eigen, Mat, SystemMatrix, Vector};

/// Eigenpairs in the solver's index space
#[derive(Debug, Clone)]
pub struct ModalSolve {
    /// Ascending eigenvalues `λ = ω²`
    pub eigenvalues: Vec<f64>,
    /// Mass-normalised mode shapes, one column per eigenvalue, zero at
    /// constrained DOFs
    pub modes: Mat,
    pub recovered: Vec<DofKey>,
}

impl<'a> PartitionedSolver<'a> {
    /// Solve `Ka x = λ Ma x` on the complement of `s`.
    ///
    /// Enforced values in `s` do not apply to an eigenproblem; constrained
    /// DOFs are simply held at zero.
    pub fn solve_modal(
        &self,
        kgg: &SystemMatrix,
        mgg: &SystemMatrix,
        s: &DofSubset,
        num_modes: Option<usize>,
    ) -> FEAResult<ModalSolve> {
        let n = self.check_shapes(kgg, s)?;
        if mgg.size() != n {
            return Err(FEAError::Configuration(format!(
                "mass matrix is {}x{} for a {}-DOF system",
                mgg.size(),
                mgg.size(),
                n
            )));
        }

        let part = self.partition(kgg, s)?;
        if part.free.is_empty() {
            info!("modal solve: no free DOFs, no modes extracted");
            return Ok(ModalSolve {
                eigenvalues: Vec::new(),
                modes: Mat::zeros(n, 0),
                recovered: self.keys(&part.recovered),
            });
        }
        let ka = kgg.block(&part.free, &part.free);
        let ma = mgg.block(&part.free, &part.free);

        let (values, vectors) = match generalized_symmetric_eigen(&ka, &ma) {
            Some(pairs) => pairs,
            None => return Err(self.mass_singularity(&ma, &part.free)),
        };

        let keep = num_modes.unwrap_or(values.len()).min(values.len());
        let mut modes = Mat::zeros(n, keep);
        for mode in 0..keep {
            for (row, &dof) in part.free.iter().enumerate() {
                modes[(dof, mode)] = vectors[(row, mode)];
            }
        }
        let eigenvalues: Vec<f64> = values.iter().take(keep).copied().collect();

        info!(
            "modal solve complete: {} of {} modes kept, lowest λ = {:.6e}",
            keep,
            values.len(),
            eigenvalues.first().copied().unwrap_or(0.0)
        );
        Ok(ModalSolve {
            eigenvalues,
            modes,
            recovered: self.keys(&part.recovered),
        })
    }

    /// `SingularMatrix` naming DOFs with non-positive mass, or the weakest
    /// elimination pivots when every diagonal is positive
    fn mass_singularity(&self, ma: &Mat, free: &[usize]) -> FEAError {
        let diagonal: Vector = ma.diagonal();
        let mut local: Vec<usize> = (0..diagonal.len())
            .filter(|&i| diagonal[i] <= 0.0)
            .collect();
        if local.is_empty() {
            let threshold = self.options.pivot_tolerance * diagonal.amax();
            local = small_pivots(ma, threshold);
        }
        let g: Vec<usize> = local.into_iter().map(|i| free[i]).collect();
        FEAError::SingularMatrix {
            dofs: self.keys(&g),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisOptions;
    use crate::dof::DofIndex;
    use crate::elements::ScalarPoint;
    use approx::assert_relative_eq;

    fn index(n: u32) -> DofIndex {
        let points: Vec<ScalarPoint> = (1..=n).map(ScalarPoint::new).collect();
        DofIndex::build(&[], &points).unwrap().0
    }

    #[test]
    fn test_single_spring_mass() {
        let index = index(1);
        let options = AnalysisOptions::modal(1);
        let k = SystemMatrix::Dense(Mat::from_element(1, 1, 400.0));
        let m = SystemMatrix::Dense(Mat::from_element(1, 1, 4.0));

        let modal = PartitionedSolver::new(&index, &options)
            .solve_modal(&k, &m, &DofSubset::valued(), Some(1))
            .unwrap();
        assert_relative_eq!(modal.eigenvalues[0], 100.0, epsilon = 1e-10);
        assert_relative_eq!(modal.modes[(0, 0)], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_constrained_dofs_are_zero_in_modes() {
        let index = index(3);
        let options = AnalysisOptions::modal(2);
        let k = SystemMatrix::Dense(Mat::from_row_slice(
            3,
            3,
            &[2.0, -1.0, 0.0, -1.0, 2.0, -1.0, 0.0, -1.0, 1.0],
        ));
        let m = SystemMatrix::Dense(Mat::identity(3, 3));
        let mut s = DofSubset::valued();
        s.push_value(0, 0.0);

        let modal = PartitionedSolver::new(&index, &options)
            .solve_modal(&k, &m, &s, Some(5))
            .unwrap();
        assert_eq!(modal.eigenvalues.len(), 2);
        assert!(modal.eigenvalues[0] < modal.eigenvalues[1]);
        assert_eq!(modal.modes.row(0).amax(), 0.0);
        // [[2, -1], [-1, 1]] on the free part
        assert_relative_eq!(
            modal.eigenvalues[0],
            (3.0 - 5f64.sqrt()) / 2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_fully_constrained_system_has_no_modes() {
        let index = index(2);
        let options = AnalysisOptions::modal(3);
        let k = SystemMatrix::Dense(Mat::identity(2, 2));
        let m = SystemMatrix::Dense(Mat::identity(2, 2));
        let mut s = DofSubset::valued();
        s.push_value(0, 0.0);
        s.push_value(1, 0.0);

        let modal = PartitionedSolver::new(&index, &options)
            .solve_modal(&k, &m, &s, Some(3))
            .unwrap();
        assert!(modal.eigenvalues.is_empty());
        assert_eq!(modal.modes.shape(), (2, 0));
        assert!(modal.recovered.is_empty());

        // mass only: automatic SPC takes every DOF
        let k = SystemMatrix::Dense(Mat::zeros(2, 2));
        let modal = PartitionedSolver::new(&index, &options)
            .solve_modal(&k, &m, &DofSubset::valued(), None)
            .unwrap();
        assert!(modal.eigenvalues.is_empty());
        assert_eq!(modal.recovered, vec![DofKey::new(1, 1), DofKey::new(2, 1)]);
    }

    #[test]
    fn test_massless_dof_is_reported() {
        let index = index(2);
        let options = AnalysisOptions::modal(2);
        let k = SystemMatrix::Dense(Mat::identity(2, 2));
        let m = SystemMatrix::Dense(Mat::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 0.0]));

        match PartitionedSolver::new(&index, &options).solve_modal(&k, &m, &DofSubset::valued(), None) {
            Err(FEAError::SingularMatrix { dofs }) => assert_eq!(dofs, vec![DofKey::new(2, 1)]),
            other => panic!("expected singular mass, got {:?}", other),
        }
    }
}

//! Resolve constraint records against the DOF index for one analysis case

use log::{debug, warn};
use serde::Serialize;
use std::collections::HashSet;

use super::{MpcRecord, SpcRecord};
use crate::dof::{DofIndex, DofSubset};
use crate::error::{FEAError, FEAResult};

/// One coefficient of one MPC equation, dereferenced to a matrix index
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MpcTerm {
    /// Equation number in resolution order
    pub equation: usize,
    pub dof: usize,
    pub coefficient: f64,
}

/// Indexed constraint sets for one case
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolvedConstraints {
    /// SPC indices with their enforced values
    pub sb: DofSubset,
    /// Dependent MPC indices with their coefficients
    pub mp: DofSubset,
    /// Every term of every accepted MPC equation
    pub mpc_terms: Vec<MpcTerm>,
}

impl ResolvedConstraints {
    pub fn equation_count(&self) -> usize {
        self.mp.len()
    }
}

/// Turns SPC/MPC records into indexed constraint sets
pub struct ConstraintResolver<'a> {
    index: &'a DofIndex,
}

impl<'a> ConstraintResolver<'a> {
    pub fn new(index: &'a DofIndex) -> Self {
        Self { index }
    }

    /// Resolve the records selected by `active_spc` / `active_mpc`.
    ///
    /// SPC records flagged `always_active` apply even when no SPC set is
    /// selected.
    pub fn resolve(
        &self,
        spcs: &[SpcRecord],
        mpcs: &[MpcRecord],
        active_spc: &[u32],
        active_mpc: &[u32],
    ) -> FEAResult<ResolvedConstraints> {
        let mut resolved = ResolvedConstraints {
            sb: self.resolve_spcs(spcs, active_spc)?,
            ..Default::default()
        };
        self.resolve_mpcs(mpcs, active_mpc, &mut resolved)?;

        debug!(
            "resolved {} SPC DOFs and {} MPC equations",
            resolved.sb.len(),
            resolved.equation_count()
        );
        Ok(resolved)
    }

    fn resolve_spcs(&self, spcs: &[SpcRecord], active: &[u32]) -> FEAResult<DofSubset> {
        let mut sb = DofSubset::valued();
        let mut seen = HashSet::new();

        for spc in spcs
            .iter()
            .filter(|spc| spc.always_active || active.contains(&spc.set_id))
        {
            for key in &spc.dofs {
                let i = self.index.dof_of(*key)?;
                if !seen.insert(i) {
                    warn!(
                        "SPC set {}: DOF {} is already constrained; duplicate ignored",
                        spc.set_id, key
                    );
                    continue;
                }
                sb.push_value(i, spc.value);
            }
        }
        Ok(sb)
    }

    fn resolve_mpcs(
        &self,
        mpcs: &[MpcRecord],
        active: &[u32],
        resolved: &mut ResolvedConstraints,
    ) -> FEAResult<()> {
        let mut dependents = HashSet::new();

        for mpc in mpcs.iter().filter(|mpc| active.contains(&mpc.set_id)) {
            if mpc.terms.len() < 2 {
                return Err(FEAError::Configuration(format!(
                    "MPC set {} has an equation with {} term(s); at least two are required",
                    mpc.set_id,
                    mpc.terms.len()
                )));
            }
            let (dep_key, dep_coeff) = mpc.terms[0];
            if dep_coeff == 0.0 {
                return Err(FEAError::Configuration(format!(
                    "MPC set {}: dependent DOF {} has a zero coefficient",
                    mpc.set_id, dep_key
                )));
            }

            let terms = mpc
                .terms
                .iter()
                .map(|(key, c)| Ok((self.index.dof_of(*key)?, *c)))
                .collect::<FEAResult<Vec<_>>>()?;

            let dependent = terms[0].0;
            if !dependents.insert(dependent) {
                warn!(
                    "MPC set {}: DOF {} is already dependent in another equation; equation ignored",
                    mpc.set_id, dep_key
                );
                continue;
            }

            let equation = resolved.mp.len();
            resolved.mp.push_value(dependent, dep_coeff);
            resolved
                .mpc_terms
                .extend(terms.into_iter().map(|(dof, coefficient)| MpcTerm {
                    equation,
                    dof,
                    coefficient,
                }));
        }

        // dependents may not drive other equations
        let mut first = HashSet::new();
        for term in &resolved.mpc_terms {
            if first.insert(term.equation) {
                continue;
            }
            if dependents.contains(&term.dof) {
                let key = self.index.key(term.dof).unwrap_or_default();
                return Err(FEAError::Configuration(format!(
                    "DOF {} is dependent in one MPC equation and independent in equation {}",
                    key, term.equation
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::GridPoint;

    fn index() -> DofIndex {
        let grids = vec![
            GridPoint::new(1, 0.0, 0.0, 0.0),
            GridPoint::new(2, 1.0, 0.0, 0.0),
        ];
        DofIndex::build(&grids, &[]).unwrap().0
    }

    #[test]
    fn test_selected_spcs_resolve_with_values() {
        let index = index();
        let spcs = vec![
            SpcRecord::spc1(1, 123456, &[1]).unwrap(),
            SpcRecord::single(1, 2, 2, 0.5),
            SpcRecord::single(9, 2, 3, 0.0),
        ];
        let resolved = ConstraintResolver::new(&index)
            .resolve(&spcs, &[], &[1], &[])
            .unwrap();

        assert_eq!(resolved.sb.indices, vec![0, 1, 2, 3, 4, 5, 7]);
        assert_eq!(resolved.sb.value_at(6), 0.5);
    }

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let index = index();
        let spcs = vec![SpcRecord::single(1, 2, 1, 0.1), SpcRecord::single(1, 2, 1, 0.9)];
        let resolved = ConstraintResolver::new(&index)
            .resolve(&spcs, &[], &[1], &[])
            .unwrap();

        assert_eq!(resolved.sb.indices, vec![6]);
        assert_eq!(resolved.sb.values, Some(vec![0.1]));
    }

    #[test]
    fn test_always_active_applies_without_selection() {
        let index = index();
        let spcs = vec![
            SpcRecord::single(4, 1, 1, 0.0).always_active(),
            SpcRecord::single(5, 1, 2, 0.0),
        ];
        let resolved = ConstraintResolver::new(&index)
            .resolve(&spcs, &[], &[], &[])
            .unwrap();
        assert_eq!(resolved.sb.indices, vec![0]);
    }

    #[test]
    fn test_unresolved_spc_dof() {
        let index = index();
        let spcs = vec![SpcRecord::single(1, 3, 1, 0.0)];
        assert!(matches!(
            ConstraintResolver::new(&index).resolve(&spcs, &[], &[1], &[]),
            Err(FEAError::UnresolvedDof { id: 3, component: 1 })
        ));
    }

    #[test]
    fn test_mpc_terms_are_indexed() {
        let index = index();
        let mpcs = vec![
            MpcRecord::new(7).with_term(2, 1, 2.0).with_term(1, 1, -2.0),
            MpcRecord::new(8).with_term(2, 2, 1.0).with_term(1, 2, -1.0),
        ];
        let resolved = ConstraintResolver::new(&index)
            .resolve(&[], &mpcs, &[], &[7])
            .unwrap();

        assert_eq!(resolved.mp.indices, vec![6]);
        assert_eq!(resolved.mp.values, Some(vec![2.0]));
        assert_eq!(
            resolved.mpc_terms,
            vec![
                MpcTerm { equation: 0, dof: 6, coefficient: 2.0 },
                MpcTerm { equation: 0, dof: 0, coefficient: -2.0 },
            ]
        );
    }

    #[test]
    fn test_bad_mpc_equations() {
        let index = index();
        let short = vec![MpcRecord::new(1).with_term(2, 1, 1.0)];
        assert!(ConstraintResolver::new(&index)
            .resolve(&[], &short, &[], &[1])
            .is_err());

        let zero = vec![MpcRecord::new(1).with_term(2, 1, 0.0).with_term(1, 1, 1.0)];
        assert!(ConstraintResolver::new(&index)
            .resolve(&[], &zero, &[], &[1])
            .is_err());

        let missing = vec![MpcRecord::new(1).with_term(2, 1, 1.0).with_term(9, 1, 1.0)];
        assert!(matches!(
            ConstraintResolver::new(&index).resolve(&[], &missing, &[], &[1]),
            Err(FEAError::UnresolvedDof { .. })
        ));

        let chained = vec![
            MpcRecord::new(1).with_term(2, 1, 1.0).with_term(1, 1, -1.0),
            MpcRecord::new(1).with_term(2, 2, 1.0).with_term(2, 1, -1.0),
        ];
        assert!(matches!(
            ConstraintResolver::new(&index).resolve(&[], &chained, &[], &[1]),
            Err(FEAError::Configuration(_))
        ));
    }
}

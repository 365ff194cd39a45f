//! Per-subcase analysis context
//!
//! Builds the DOF index, resolves the selected constraints, derives the set
//! hierarchy and runs assembly and solution for one subcase.

use log::{debug, info, warn};
use nalgebra::Vector3;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{AnalysisOptions, Subcase};
use crate::assembly::MatrixAssembler;
use crate::constraints::{ConstraintResolver, ResolvedConstraints};
use crate::dof::{DofIndex, DofSets, DofSubset, SetName};
use crate::error::{FEAError, FEAResult};
use crate::loads::{LoadAssembler, LoadResultant};
use crate::math::{complement, Mat, SystemMatrix};
use crate::model::Model;
use crate::results::{ConstraintForce, ModalSolution, StaticSolution};
use crate::solver::{constraint_forces, MpcReduction, PartitionedSolver};
use crate::weight::{grid_point_weight, GridPointWeight};

/// Everything that is fixed for one subcase before any matrix is built
#[derive(Debug, Clone)]
pub struct AnalysisCase {
    subcase: Subcase,
    index: Arc<DofIndex>,
    constraints: ResolvedConstraints,
    sets: DofSets,
}

impl AnalysisCase {
    pub fn prepare(model: &Model, subcase: &Subcase) -> FEAResult<Self> {
        let (index, sg) = DofIndex::build(model.grids(), model.scalar_points())?;
        let constraints = ConstraintResolver::new(&index).resolve(
            model.spcs(),
            model.mpcs(),
            &subcase.spc,
            &subcase.mpc,
        )?;
        let sb = without_permanent(&index, &constraints.sb, &sg)?;

        let mut taken: Vec<usize> = Vec::with_capacity(sb.len() + sg.len() + constraints.mp.len());
        taken.extend(&sb.indices);
        taken.extend(&sg.indices);
        taken.extend(&constraints.mp.indices);
        let lm = DofSubset::from_indices(complement(index.len(), &taken));

        let mut base = BTreeMap::new();
        base.insert(SetName::Sb, sb);
        base.insert(SetName::Sg, sg);
        base.insert(SetName::Mp, constraints.mp.clone());
        base.insert(SetName::Lm, lm);
        let sets = DofSets::build(base)?;

        let g = sets.indices(SetName::G).len();
        if g != index.len() {
            return Err(FEAError::Configuration(format!(
                "set g holds {} DOFs, the index holds {}",
                g,
                index.len()
            )));
        }

        debug!(
            "subcase {}: g = {}, s = {}, m = {}, a = {}",
            subcase.id,
            g,
            sets.indices(SetName::S).len(),
            sets.indices(SetName::M).len(),
            sets.indices(SetName::A).len()
        );
        Ok(Self {
            subcase: subcase.clone(),
            index: Arc::new(index),
            constraints,
            sets,
        })
    }

    pub fn subcase(&self) -> &Subcase {
        &self.subcase
    }

    pub fn index(&self) -> &Arc<DofIndex> {
        &self.index
    }

    pub fn constraints(&self) -> &ResolvedConstraints {
        &self.constraints
    }

    pub fn sets(&self) -> &DofSets {
        &self.sets
    }

    fn mpc_reduction(&self) -> FEAResult<Option<MpcReduction>> {
        if self.constraints.equation_count() == 0 {
            return Ok(None);
        }
        MpcReduction::new(
            self.index.len(),
            &self.constraints.mp,
            &self.constraints.mpc_terms,
        )
        .map(Some)
    }

    fn weight(
        &self,
        assembler: &MatrixAssembler<'_>,
        mgg: &SystemMatrix,
        options: &AnalysisOptions,
    ) -> FEAResult<Option<GridPointWeight>> {
        match options.grid_point_weight {
            Some(reference) => {
                grid_point_weight(&self.index, assembler.positions(), mgg, reference).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Linear static solution of the subcase
    pub fn run_static(&self, model: &Model, options: &AnalysisOptions) -> FEAResult<StaticSolution> {
        let load_id = self.subcase.load.ok_or_else(|| {
            FEAError::Configuration(format!(
                "static subcase {} does not select a load set",
                self.subcase.id
            ))
        })?;
        let index = self.index.as_ref();

        let assembler = MatrixAssembler::new(index, options.storage).with_wtmass(options.wtmass);
        let kgg = assembler.assemble_stiffness(model.elements())?;
        let loads = LoadAssembler::new(index);
        let fg = loads.assemble(&loads.resolve(load_id, model.loads(), model.combinations())?)?;

        let s = self.sets.get(SetName::S);
        let (ug, recovered) = match self.mpc_reduction()? {
            Some(mpc) => {
                let knn = mpc.reduce_matrix(&kgg);
                let fn_ = mpc.reduce_vector(&fg);
                let sn = mpc.to_local(s)?;
                let solve = PartitionedSolver::new(index, options)
                    .with_dof_map(mpc.independent())
                    .solve_static(&knn, &fn_, &sn)?;
                (mpc.expand(&solve.u), solve.recovered)
            }
            None => {
                let solve = PartitionedSolver::new(index, options).solve_static(&kgg, &fg, s)?;
                (solve.u, solve.recovered)
            }
        };

        let mut spc_rows = s.indices.clone();
        for key in &recovered {
            spc_rows.push(index.dof_of(*key)?);
        }
        let m_rows = self.sets.indices(SetName::M);
        let resultant = LoadResultant::from_vector(&fg, index, Vector3::zeros());

        let mut solution =
            StaticSolution::new(self.index.clone(), self.subcase.id, &ug, recovered, resultant);
        solution.spc_forces = ConstraintForce::collect(
            index,
            &spc_rows,
            &constraint_forces(&kgg, &ug, &fg, &spc_rows),
        );
        solution.mpc_forces = ConstraintForce::collect(
            index,
            m_rows,
            &constraint_forces(&kgg, &ug, &fg, m_rows),
        );
        if options.grid_point_weight.is_some() {
            let mgg = assembler.assemble_mass(model.elements())?;
            solution.grid_point_weight = self.weight(&assembler, &mgg, options)?;
        }

        info!(
            "subcase {} static: {} DOFs, {} SPC forces, {} MPC forces",
            self.subcase.id,
            index.len(),
            solution.spc_forces.len(),
            solution.mpc_forces.len()
        );
        Ok(solution)
    }

    /// Normal modes of the subcase
    pub fn run_modal(&self, model: &Model, options: &AnalysisOptions) -> FEAResult<ModalSolution> {
        let index = self.index.as_ref();
        let assembler = MatrixAssembler::new(index, options.storage).with_wtmass(options.wtmass);
        let kgg = assembler.assemble_stiffness(model.elements())?;
        let mgg = assembler.assemble_mass(model.elements())?;

        let s = self.sets.get(SetName::S);
        let (modes, eigenvalues, recovered) = match self.mpc_reduction()? {
            Some(mpc) => {
                let knn = mpc.reduce_matrix(&kgg);
                let mnn = mpc.reduce_matrix(&mgg);
                let sn = mpc.to_local(s)?;
                let modal = PartitionedSolver::new(index, options)
                    .with_dof_map(mpc.independent())
                    .solve_modal(&knn, &mnn, &sn, options.num_modes)?;
                (
                    mpc.expand_columns(&modal.modes),
                    modal.eigenvalues,
                    modal.recovered,
                )
            }
            None => {
                let modal = PartitionedSolver::new(index, options).solve_modal(
                    &kgg,
                    &mgg,
                    s,
                    options.num_modes,
                )?;
                (modal.modes, modal.eigenvalues, modal.recovered)
            }
        };

        let mut solution = ModalSolution::new(
            self.index.clone(),
            self.subcase.id,
            eigenvalues,
            columns(&modes),
            recovered,
        );
        solution.grid_point_weight = self.weight(&assembler, &mgg, options)?;

        info!(
            "subcase {} modal: {} modes, f1 = {:.6e} Hz",
            self.subcase.id,
            solution.num_modes(),
            solution.frequencies.first().copied().unwrap_or(0.0)
        );
        Ok(solution)
    }
}

/// Drop SPC entries already held by a grid's PS field. A non-zero enforced
/// value on such a DOF conflicts with the permanent constraint.
fn without_permanent(index: &DofIndex, sb: &DofSubset, sg: &DofSubset) -> FEAResult<DofSubset> {
    let mut kept = DofSubset::valued();
    for (i, value) in sb.iter() {
        if !sg.contains(i) {
            kept.push_value(i, value);
            continue;
        }
        if value != 0.0 {
            return Err(FEAError::DuplicateDof {
                set: SetName::S.to_string(),
                index: i,
            });
        }
        if let Some(key) = index.key(i) {
            warn!("SPC on {} ignored: already constrained by the grid PS field", key);
        }
    }
    Ok(kept)
}

fn columns(modes: &Mat) -> Vec<Vec<f64>> {
    modes
        .column_iter()
        .map(|c| c.iter().copied().collect())
        .collect()
}

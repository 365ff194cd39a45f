//! FE Model - container for points, elements, constraints and loads

use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::analysis::{AnalysisCase, AnalysisOptions, AnalysisType, Subcase, WeightReference};
use crate::assembly::MatrixAssembler;
use crate::constraints::{MpcRecord, SpcRecord};
use crate::dof::DofIndex;
use crate::elements::{ElementProvider, ElementRecord, GridPoint, ScalarPoint};
use crate::error::{FEAError, FEAResult};
use crate::loads::{LoadCombination, LoadRecord};
use crate::results::{ModalSolution, StaticSolution};
use crate::weight::{self, GridPointWeight};

/// The finite element model: validated records consumed by the solver core
#[derive(Debug, Default)]
pub struct Model {
    grids: Vec<GridPoint>,
    scalar_points: Vec<ScalarPoint>,
    elements: Vec<Box<dyn ElementProvider>>,
    spcs: Vec<SpcRecord>,
    mpcs: Vec<MpcRecord>,
    loads: Vec<LoadRecord>,
    combinations: Vec<LoadCombination>,
    /// Grid and scalar point ids share one namespace
    point_ids: HashSet<u32>,
    element_ids: HashSet<u32>,
}

impl Model {
    /// Create a new empty model
    pub fn new() -> Self {
        Self::default()
    }

    // ========================
    // Model Building Methods
    // ========================

    /// Add a grid point to the model
    pub fn add_grid(&mut self, grid: GridPoint) -> FEAResult<()> {
        if !self.point_ids.insert(grid.id) {
            return Err(FEAError::Configuration(format!(
                "point id {} is already defined",
                grid.id
            )));
        }
        self.grids.push(grid);
        Ok(())
    }

    /// Add a scalar point to the model
    pub fn add_scalar_point(&mut self, point: ScalarPoint) -> FEAResult<()> {
        if !self.point_ids.insert(point.id) {
            return Err(FEAError::Configuration(format!(
                "point id {} is already defined",
                point.id
            )));
        }
        self.scalar_points.push(point);
        Ok(())
    }

    /// Add an element provider
    pub fn add_element(&mut self, element: Box<dyn ElementProvider>) -> FEAResult<()> {
        if !self.element_ids.insert(element.id()) {
            return Err(FEAError::Configuration(format!(
                "element id {} ({}) is already defined",
                element.id(),
                element.kind()
            )));
        }
        self.elements.push(element);
        Ok(())
    }

    /// Add a single-point constraint record
    pub fn add_spc(&mut self, spc: SpcRecord) -> FEAResult<()> {
        if spc.dofs.is_empty() {
            return Err(FEAError::Configuration(format!(
                "SPC record in set {} lists no DOFs",
                spc.set_id
            )));
        }
        self.spcs.push(spc);
        Ok(())
    }

    /// Add a multi-point constraint equation
    pub fn add_mpc(&mut self, mpc: MpcRecord) -> FEAResult<()> {
        self.mpcs.push(mpc);
        Ok(())
    }

    /// Add a load record; its set id may not name a combination
    pub fn add_load(&mut self, load: LoadRecord) -> FEAResult<()> {
        if self.combinations.iter().any(|c| c.set_id == load.set_id()) {
            return Err(FEAError::Configuration(format!(
                "load set {} is already used by a load combination",
                load.set_id()
            )));
        }
        self.loads.push(load);
        Ok(())
    }

    /// Add a load combination
    pub fn add_load_combination(&mut self, combination: LoadCombination) -> FEAResult<()> {
        let id = combination.set_id;
        if self.combinations.iter().any(|c| c.set_id == id)
            || self.loads.iter().any(|l| l.set_id() == id)
        {
            return Err(FEAError::Configuration(format!(
                "load combination id {} is already defined",
                id
            )));
        }
        self.combinations.push(combination);
        Ok(())
    }

    // ========================
    // Accessors
    // ========================

    pub fn grids(&self) -> &[GridPoint] {
        &self.grids
    }

    pub fn scalar_points(&self) -> &[ScalarPoint] {
        &self.scalar_points
    }

    pub fn elements(&self) -> &[Box<dyn ElementProvider>] {
        &self.elements
    }

    pub fn spcs(&self) -> &[SpcRecord] {
        &self.spcs
    }

    pub fn mpcs(&self) -> &[MpcRecord] {
        &self.mpcs
    }

    pub fn loads(&self) -> &[LoadRecord] {
        &self.loads
    }

    pub fn combinations(&self) -> &[LoadCombination] {
        &self.combinations
    }

    // ========================
    // Analysis Methods
    // ========================

    /// Prepare the DOF index and set hierarchy for a subcase
    pub fn prepare(&self, subcase: &Subcase) -> FEAResult<AnalysisCase> {
        AnalysisCase::prepare(self, subcase)
    }

    /// Run a linear static analysis (SOL 101) of one subcase
    pub fn analyze_static(
        &self,
        subcase: &Subcase,
        options: &AnalysisOptions,
    ) -> FEAResult<StaticSolution> {
        info!(
            "static analysis: subcase {}, {} grids, {} elements",
            subcase.id,
            self.grids.len(),
            self.elements.len()
        );
        self.prepare(subcase)?.run_static(self, options)
    }

    /// Run a real eigenvalue analysis (SOL 103) of one subcase
    pub fn analyze_modal(
        &self,
        subcase: &Subcase,
        options: &AnalysisOptions,
    ) -> FEAResult<ModalSolution> {
        info!(
            "modal analysis: subcase {}, {} grids, {} elements",
            subcase.id,
            self.grids.len(),
            self.elements.len()
        );
        self.prepare(subcase)?.run_modal(self, options)
    }

    /// Grid point weight of the whole model, independent of any subcase
    pub fn grid_point_weight(
        &self,
        reference: WeightReference,
        options: &AnalysisOptions,
    ) -> FEAResult<GridPointWeight> {
        let (index, _) = DofIndex::build(&self.grids, &self.scalar_points)?;
        let assembler = MatrixAssembler::new(&index, options.storage).with_wtmass(options.wtmass);
        let mgg = assembler.assemble_mass(&self.elements)?;
        weight::grid_point_weight(&index, assembler.positions(), &mgg, reference)
    }
}

/// Serializable model records plus the case control that drives them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelDeck {
    pub grids: Vec<GridPoint>,
    pub scalar_points: Vec<ScalarPoint>,
    pub elements: Vec<ElementRecord>,
    pub spcs: Vec<SpcRecord>,
    pub mpcs: Vec<MpcRecord>,
    pub loads: Vec<LoadRecord>,
    pub combinations: Vec<LoadCombination>,
    pub subcases: Vec<Subcase>,
    pub options: AnalysisOptions,
}

/// Solution of one deck subcase
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum SubcaseSolution {
    Static(StaticSolution),
    Modal(ModalSolution),
}

impl ModelDeck {
    pub fn from_json(json: &str) -> FEAResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> FEAResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build a model, validating ids as records are added
    pub fn to_model(&self) -> FEAResult<Model> {
        let mut model = Model::new();
        for grid in &self.grids {
            model.add_grid(grid.clone())?;
        }
        for point in &self.scalar_points {
            model.add_scalar_point(*point)?;
        }
        for element in &self.elements {
            model.add_element(element.clone().into_provider())?;
        }
        for spc in &self.spcs {
            model.add_spc(spc.clone())?;
        }
        for mpc in &self.mpcs {
            model.add_mpc(mpc.clone())?;
        }
        for combination in &self.combinations {
            model.add_load_combination(combination.clone())?;
        }
        for load in &self.loads {
            model.add_load(load.clone())?;
        }
        Ok(model)
    }

    /// Run every subcase with the deck options
    pub fn run(&self) -> FEAResult<Vec<SubcaseSolution>> {
        let model = self.to_model()?;
        self.subcases
            .iter()
            .map(|subcase| match self.options.analysis_type {
                AnalysisType::Static => model
                    .analyze_static(subcase, &self.options)
                    .map(SubcaseSolution::Static),
                AnalysisType::Modal => model
                    .analyze_modal(subcase, &self.options)
                    .map(SubcaseSolution::Modal),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Material, Rod, ScalarSpring, Section};
    use crate::dof::DofKey;
    use approx::assert_relative_eq;

    fn rod_model() -> Model {
        let mut model = Model::new();
        model.add_grid(GridPoint::new(1, 0.0, 0.0, 0.0)).unwrap();
        model
            .add_grid(GridPoint::new(2, 2.0, 0.0, 0.0).with_ps(23456))
            .unwrap();
        let rod = Rod::new(10, 1, 2, Material::new(100.0, 40.0, 0.3, 1.0), Section::new(0.5, 0.0));
        model.add_element(Box::new(rod)).unwrap();
        model
            .add_spc(SpcRecord::spc1(1, 123456, &[1]).unwrap())
            .unwrap();
        model
            .add_load(LoadRecord::force(5, 2, 50.0, [1.0, 0.0, 0.0]))
            .unwrap();
        model
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let mut model = rod_model();
        assert!(model.add_grid(GridPoint::new(2, 0.0, 1.0, 0.0)).is_err());
        assert!(model.add_scalar_point(ScalarPoint::new(1)).is_err());
        assert!(model
            .add_element(Box::new(ScalarSpring::grounded(10, 1.0, DofKey::new(2, 1))))
            .is_err());
        assert!(model.add_load_combination(LoadCombination::new(5, 1.0)).is_err());
        model
            .add_load_combination(LoadCombination::new(6, 1.0).with_set(5, 2.0))
            .unwrap();
        assert!(model.add_load(LoadRecord::scalar(6, 2, 1.0)).is_err());
    }

    #[test]
    fn test_static_rod() {
        let model = rod_model();
        let subcase = Subcase::new(1).with_spc(1).with_load(5);
        let solution = model
            .analyze_static(&subcase, &AnalysisOptions::linear())
            .unwrap();

        // k = EA/L = 100 * 0.5 / 2
        assert_relative_eq!(solution.value(2, 1).unwrap(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(solution.spc_force(1, 1).unwrap(), -50.0, epsilon = 1e-10);
        assert_eq!(solution.load_resultant.force, [50.0, 0.0, 0.0]);
    }

    #[test]
    fn test_static_requires_load() {
        let model = rod_model();
        let subcase = Subcase::new(1).with_spc(1);
        assert!(matches!(
            model.analyze_static(&subcase, &AnalysisOptions::linear()),
            Err(FEAError::Configuration(_))
        ));
    }

    #[test]
    fn test_deck_round_trip_through_json() {
        let json = r#"{
            "grids": [
                {"id": 1, "x": 0.0, "y": 0.0, "z": 0.0, "ps": 123456},
                {"id": 2, "x": 0.0, "y": 0.0, "z": 4.0, "ps": 12456}
            ],
            "elements": [
                {"type": "Rod", "id": 1, "ga": 1, "gb": 2,
                 "material": {"e": 200.0, "g": 80.0, "nu": 0.25, "rho": 0.0},
                 "section": {"a": 1.0, "j": 0.0, "nsm": 0.0}}
            ],
            "loads": [
                {"type": "Force", "set_id": 3, "grid": 2, "scale": -10.0, "direction": [0.0, 0.0, 1.0]}
            ],
            "subcases": [{"id": 1, "load": 3}]
        }"#;
        let deck = ModelDeck::from_json(json).unwrap();
        let solutions = deck.run().unwrap();
        match &solutions[0] {
            SubcaseSolution::Static(s) => {
                assert_relative_eq!(s.value(2, 3).unwrap(), -0.2, epsilon = 1e-12)
            }
            other => panic!("expected a static solution, got {:?}", other),
        }

        assert!(matches!(
            ModelDeck::from_json("{\"grids\": 4}"),
            Err(FEAError::SerializationError(_))
        ));
    }
}

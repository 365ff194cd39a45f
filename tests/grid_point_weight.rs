use approx::assert_relative_eq;
use fea_core::prelude::*;
use nalgebra::{Matrix3, Vector3};

/// Rod along X from the origin: density 3, area 0.5, length 2 (mass 3)
fn rod_model() -> Model {
    let mut model = Model::new();
    model.add_grid(GridPoint::new(1, 0.0, 0.0, 0.0)).unwrap();
    model.add_grid(GridPoint::new(2, 2.0, 0.0, 0.0)).unwrap();
    let rod = Rod::new(1, 1, 2, Material::new(100.0, 40.0, 0.25, 3.0), Section::new(0.5, 0.0));
    model.add_element(Box::new(rod)).unwrap();
    model
}

#[test]
fn test_rod_mass_properties() {
    let model = rod_model();
    let gpwg = model
        .grid_point_weight(WeightReference::Origin, &AnalysisOptions::default())
        .unwrap();

    assert_relative_eq!(gpwg.mass, Vector3::new(3.0, 3.0, 3.0), epsilon = 1e-12);
    // CG at x = 1 for the Y and Z masses; the X mass has no X lever arm
    assert_relative_eq!(gpwg.cg[(1, 0)], 1.0, epsilon = 1e-12);
    assert_relative_eq!(gpwg.cg[(2, 0)], 1.0, epsilon = 1e-12);
    // two 1.5 lumps 1 from the CG
    assert_relative_eq!(gpwg.inertia_s[(0, 0)], 0.0, epsilon = 1e-12);
    assert_relative_eq!(gpwg.inertia_s[(1, 1)], 3.0, epsilon = 1e-12);
    assert_relative_eq!(gpwg.inertia_s[(2, 2)], 3.0, epsilon = 1e-12);

    let about_end = model
        .grid_point_weight(WeightReference::Grid(2), &AnalysisOptions::default())
        .unwrap();
    assert_relative_eq!(about_end.cg[(1, 0)], -1.0, epsilon = 1e-12);
    assert_relative_eq!(about_end.inertia_s, gpwg.inertia_s, epsilon = 1e-12);
}

#[test]
fn test_offset_point_mass_matches_mass_at_offset() {
    let mut offset = Model::new();
    offset.add_grid(GridPoint::new(1, 0.0, 0.0, 0.0)).unwrap();
    offset
        .add_element(Box::new(PointMass::new(1, 1, 2.0).with_offset([1.0, 0.0, 0.0])))
        .unwrap();

    let mut placed = Model::new();
    placed.add_grid(GridPoint::new(1, 1.0, 0.0, 0.0)).unwrap();
    placed
        .add_element(Box::new(PointMass::new(1, 1, 2.0)))
        .unwrap();

    let options = AnalysisOptions::default();
    let a = offset
        .grid_point_weight(WeightReference::Origin, &options)
        .unwrap();
    let b = placed
        .grid_point_weight(WeightReference::Origin, &options)
        .unwrap();
    assert_relative_eq!(a.mo, b.mo, epsilon = 1e-12);
    let expected_cg = Matrix3::new(0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    assert_relative_eq!(a.cg, expected_cg, epsilon = 1e-12);
    assert_relative_eq!(a.inertia_q, Vector3::zeros(), epsilon = 1e-12);
}

#[test]
fn test_weight_reported_with_solutions() {
    let mut model = rod_model();
    model
        .add_spc(SpcRecord::spc1(1, 123456, &[1]).unwrap())
        .unwrap();
    model
        .add_spc(SpcRecord::spc1(1, 23456, &[2]).unwrap())
        .unwrap();
    model
        .add_load(LoadRecord::force(1, 2, 5.0, [1.0, 0.0, 0.0]))
        .unwrap();
    let subcase = Subcase::new(1).with_spc(1).with_load(1);

    let options = AnalysisOptions::linear()
        .with_grid_point_weight(WeightReference::from_grdpnt(0))
        .with_wtmass(0.5);
    let solution = model.analyze_static(&subcase, &options).unwrap();
    let gpwg = solution.grid_point_weight.as_ref().unwrap();
    assert_relative_eq!(gpwg.total_mass(), 1.5, epsilon = 1e-12);

    let modal_options = AnalysisOptions::modal(1).with_grid_point_weight(WeightReference::Grid(1));
    let modal = model.analyze_modal(&subcase, &modal_options).unwrap();
    assert!(modal.grid_point_weight.is_some());

    let plain = model
        .analyze_static(&subcase, &AnalysisOptions::linear())
        .unwrap();
    assert!(plain.grid_point_weight.is_none());
}

#[test]
fn test_unknown_reference_grid() {
    let model = rod_model();
    assert!(matches!(
        model.grid_point_weight(WeightReference::Grid(42), &AnalysisOptions::default()),
        Err(FEAError::Configuration(_))
    ));
}

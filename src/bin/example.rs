//! FEA Core Example - Planar Pratt Truss
//!
//! Without arguments, builds a small truss, runs a static load combination
//! and a normal-modes analysis. With a path argument, runs the JSON model
//! deck found there and prints the solutions as JSON.

use anyhow::{Context, Result};
use fea_core::prelude::*;

//     5 ------- 6
//    /|       / | \
//   / |     /   |  \
//  1--2-------3-----4
//  ^                o
// pinned          roller
fn build_truss() -> Result<Model> {
    let mut model = Model::new();

    // in-plane truss: out-of-plane translation and all rotations are permanent SPCs
    let points = [
        (1, 0.0, 0.0),
        (2, 4.0, 0.0),
        (3, 8.0, 0.0),
        (4, 12.0, 0.0),
        (5, 4.0, 3.0),
        (6, 8.0, 3.0),
    ];
    for (id, x, y) in points {
        model.add_grid(GridPoint::new(id, x, y, 0.0).with_ps(3456))?;
    }

    let steel = Material::steel();
    let chord = Section::tube(0.06, 0.004);
    let web = Section::circular(0.025);
    let members = [
        (1, 1, 2, &chord),
        (2, 2, 3, &chord),
        (3, 3, 4, &chord),
        (4, 5, 6, &chord),
        (5, 1, 5, &web),
        (6, 6, 4, &web),
        (7, 2, 5, &web),
        (8, 3, 6, &web),
        (9, 2, 6, &web),
    ];
    for (id, ga, gb, section) in members {
        let rod = Rod::new(id, ga, gb, steel.clone(), section.clone());
        model.add_element(Box::new(rod))?;
    }

    model.add_spc(SpcRecord::spc1(1, 12, &[1])?)?;
    model.add_spc(SpcRecord::spc1(1, 2, &[4])?)?;

    // dead load at the bottom chord, wind at the top
    for grid in [2, 3] {
        model.add_load(LoadRecord::force(10, grid, 20_000.0, [0.0, -1.0, 0.0]))?;
    }
    model.add_load(LoadRecord::force(20, 5, 5_000.0, [1.0, 0.0, 0.0]))?;
    model.add_load_combination(
        LoadCombination::new(100, 1.0)
            .with_set(10, 1.2)
            .with_set(20, 1.0),
    )?;

    Ok(model)
}

fn run_truss() -> Result<()> {
    println!("=== FEA Core Example: Pratt Truss ===\n");
    let model = build_truss()?;

    let subcase = Subcase::new(1).with_spc(1).with_load(100);
    let options = AnalysisOptions::linear().with_grid_point_weight(WeightReference::Origin);
    let solution = model
        .analyze_static(&subcase, &options)
        .context("static analysis failed")?;

    println!("Grid Displacements:");
    for grid in model.grids() {
        let disp = solution.grid_displacement(grid.id)?;
        println!(
            "  {}: DX={:.4}mm, DY={:.4}mm",
            grid.id,
            disp.dx * 1000.0,
            disp.dy * 1000.0
        );
    }

    println!("\nSupport Reactions:");
    for id in [1, 4] {
        let rxn = solution.reactions(id)?;
        println!(
            "  {}: FX={:.2}kN, FY={:.2}kN",
            id,
            rxn.fx / 1000.0,
            rxn.fy / 1000.0
        );
    }

    let resultant = &solution.load_resultant;
    println!(
        "\nApplied load resultant: F=({:.2}, {:.2}, {:.2})kN, MZ={:.2}kN·m",
        resultant.force[0] / 1000.0,
        resultant.force[1] / 1000.0,
        resultant.force[2] / 1000.0,
        resultant.moment[2] / 1000.0
    );
    if let Some((dof, value)) = solution.max_displacement() {
        println!("Max displacement: {:.4}mm at {}", value * 1000.0, dof);
    }
    if let Some(gpwg) = &solution.grid_point_weight {
        println!(
            "Total mass: {:.2}kg, CG x = {:.3}m",
            gpwg.total_mass(),
            gpwg.cg[(1, 0)]
        );
    }

    println!("\n=== Normal Modes ===\n");
    let modal = model
        .analyze_modal(&Subcase::new(2).with_spc(1), &AnalysisOptions::modal(4))
        .context("modal analysis failed")?;
    for (i, f) in modal.frequencies.iter().enumerate() {
        println!("  Mode {}: {:.3} Hz", i + 1, f);
    }

    println!("\n=== Analysis Complete ===");
    Ok(())
}

fn run_deck(path: &str) -> Result<()> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    let deck = ModelDeck::from_json(&json).with_context(|| format!("parsing {}", path))?;
    let solutions = deck.run()?;
    println!("{}", serde_json::to_string_pretty(&solutions)?);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    match std::env::args().nth(1) {
        Some(path) => run_deck(&path),
        None => run_truss(),
    }
}

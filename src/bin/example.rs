//! Flexure Solver Example - point load on a clamped plate

use flexure_solver::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("=== Flexure Solver Example: Point Load ===\n");

    let youngs_modulus: f64 = 1e11;
    let poissons_ratio: f64 = 0.25;

    // Elastic thickness giving D = 1e22 N·m
    let rigidity: f64 = 1e22;
    let te = (12.0 * (1.0 - poissons_ratio * poissons_ratio) * rigidity / youngs_modulus).cbrt();

    // 11 cells, 1 km apart, unit load in the middle
    let nx = 11;
    let config = FlexureConfig::default()
        .with_load(LoadField::point(nx, nx / 2, 1.0))
        .with_elastic_thickness(ElasticThickness::Uniform(te))
        .with_elastic_moduli(youngs_modulus, poissons_ratio)
        .with_buoyancy(3300.0, 9.8)
        .with_boundaries(BoundaryCondition::Dirichlet0, BoundaryCondition::Dirichlet0)
        .with_verbose();

    println!("Te = {:.1} m, D = {:.3e} N·m\n", te, flexural_rigidity(youngs_modulus, poissons_ratio, te));

    let mut flexure = Flexure1D::initialize(config)?;
    flexure.run()?;
    let deflection = flexure.finalize()?;

    println!("Deflection:");
    for (x, w) in deflection.x.iter().zip(&deflection.w) {
        println!("  x = {:>7.0} m: w = {:.6e} m", x, w);
    }

    if let Some(i) = deflection.argmin() {
        println!("\nMax deflection: {:.6e} m at x = {:.0} m", deflection.w[i], deflection.x[i]);
    }

    println!("\n{}", deflection.to_json()?);
    Ok(())
}

use approx::assert_relative_eq;
use flexure_solver::prelude::*;

const YOUNGS_MODULUS: f64 = 1e11;
const POISSONS_RATIO: f64 = 0.25;

/// Elastic thickness for a given flexural rigidity
fn te_for_rigidity(d: f64) -> f64 {
    (12.0 * (1.0 - POISSONS_RATIO * POISSONS_RATIO) * d / YOUNGS_MODULUS).cbrt()
}

fn point_load(nx: usize, i0: usize, magnitude: f64) -> Vec<f64> {
    let mut q = vec![0.0; nx];
    q[i0] = magnitude;
    q
}

fn solve(config: FlexureConfig) -> Deflection {
    let mut flexure = Flexure1D::initialize(config).unwrap();
    flexure.run().unwrap();
    flexure.finalize().unwrap()
}

fn fd_config(dx: f64, q: Vec<f64>, west: BoundaryCondition, east: BoundaryCondition) -> FlexureConfig {
    FlexureConfig::new(dx, q)
        .with_elastic_thickness(ElasticThickness::Uniform(te_for_rigidity(1e22)))
        .with_boundaries(west, east)
}

#[test]
fn point_load_on_clamped_plate_makes_a_symmetric_bowl() {
    let w = solve(fd_config(
        1000.0,
        point_load(11, 5, 1.0),
        BoundaryCondition::Dirichlet0,
        BoundaryCondition::Dirichlet0,
    ))
    .w;

    assert_eq!(w.len(), 11);
    assert!(w.iter().all(|&v| v < 0.0));
    for k in 1..=5 {
        assert_relative_eq!(w[5 - k], w[5 + k], max_relative = 1e-8);
    }
    for i in 0..5 {
        assert!(w[i].abs() < w[i + 1].abs());
    }
}

#[test]
fn zero_load_gives_exactly_zero_deflection() {
    for (west, east) in [
        (BoundaryCondition::Dirichlet0, BoundaryCondition::Dirichlet0),
        (BoundaryCondition::ZeroMomentZeroShear, BoundaryCondition::Mirror),
        (BoundaryCondition::Periodic, BoundaryCondition::Periodic),
    ] {
        let w = solve(fd_config(1000.0, vec![0.0; 16], west, east)).w;
        assert!(w.iter().all(|&v| v == 0.0), "{west}/{east}: {w:?}");
    }
}

#[test]
fn periodic_plate_is_translation_invariant() {
    let nx = 40;
    let shift = 13;
    let q: Vec<f64> = (0..nx)
        .map(|i| if (8..14).contains(&i) { 1e6 } else { 0.0 })
        .collect();
    let rolled: Vec<f64> = (0..nx).map(|i| q[(i + nx - shift) % nx]).collect();

    let w = solve(fd_config(5000.0, q, BoundaryCondition::Periodic, BoundaryCondition::Periodic)).w;
    let w_rolled = solve(fd_config(
        5000.0,
        rolled,
        BoundaryCondition::Periodic,
        BoundaryCondition::Periodic,
    ))
    .w;

    let scale = w.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    for i in 0..nx {
        assert_relative_eq!(
            w_rolled[(i + shift) % nx],
            w[i],
            epsilon = 1e-8 * scale,
            max_relative = 1e-8
        );
    }
}

#[test]
fn periodic_operator_has_nine_diagonals_and_balanced_rows() {
    let nx = 11;
    let dx: f64 = 1000.0;
    let mut flexure = Flexure1D::initialize(fd_config(
        dx,
        point_load(nx, 5, 1.0),
        BoundaryCondition::Periodic,
        BoundaryCondition::Periodic,
    ))
    .unwrap();
    flexure.run().unwrap();

    let matrix = flexure.coefficient_matrix().unwrap();
    assert!(matrix.is_periodic());
    assert_eq!(matrix.nonzero_offsets().len(), 9);

    let buoyancy = 3300.0 * 9.8;
    let stiffness = 1e22 / dx.powi(4);
    let dense = matrix.to_dense();
    for i in 0..nx {
        let row_sum: f64 = dense.row(i).iter().sum();
        assert!((row_sum - buoyancy).abs() < 1e-9 * stiffness);
    }
}

#[test]
fn variable_rigidity_with_constant_values_matches_constant_path() {
    let nx = 41;
    let dx: f64 = 5000.0;
    let te = te_for_rigidity(1e22);
    let q: Vec<f64> = (0..nx).map(|i| 1e6 * (i as f64 * 0.3).cos().max(0.0)).collect();

    for (west, east) in [
        (BoundaryCondition::Dirichlet0, BoundaryCondition::Dirichlet0),
        (BoundaryCondition::ZeroMomentZeroShear, BoundaryCondition::ZeroSlopeZeroShear),
        (BoundaryCondition::ZeroSlopeZeroShear, BoundaryCondition::ZeroMomentZeroShear),
        (BoundaryCondition::Mirror, BoundaryCondition::Mirror),
        (BoundaryCondition::Periodic, BoundaryCondition::Periodic),
    ] {
        let constant = solve(
            FlexureConfig::new(dx, q.clone())
                .with_elastic_thickness(ElasticThickness::Uniform(te))
                .with_boundaries(west, east),
        )
        .w;
        let variable = solve(
            FlexureConfig::new(dx, q.clone())
                .with_elastic_thickness(ElasticThickness::Variable(vec![te; nx]))
                .with_boundaries(west, east),
        )
        .w;

        let scale = constant.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        for (a, b) in constant.iter().zip(&variable) {
            assert!((a - b).abs() <= 1e-8 * scale, "{west}/{east}: {a} vs {b}");
        }
    }
}

#[test]
fn repeated_runs_are_bit_identical() {
    let te: Vec<f64> = (0..30).map(|i| 15_000.0 + 500.0 * i as f64).collect();
    let config = FlexureConfig::new(2000.0, point_load(30, 11, 2e6))
        .with_elastic_thickness(ElasticThickness::Variable(te))
        .with_boundaries(BoundaryCondition::Mirror, BoundaryCondition::ZeroMomentZeroShear);

    let a = solve(config.clone());
    let b = solve(config);
    assert_eq!(a, b);
}

#[test]
fn superposition_single_load_is_symmetric() {
    let w = solve(
        FlexureConfig::new(2000.0, point_load(51, 25, 1e7)).with_method(SolutionMethod::Superposition),
    )
    .w;
    assert!(w[25] < 0.0);
    for k in 1..=25 {
        assert_relative_eq!(w[25 - k], w[25 + k], max_relative = 1e-12);
    }
}

#[test]
fn finite_differences_approach_the_analytical_solution() {
    let nx = 401;
    let dx: f64 = 1000.0;
    let q = point_load(nx, 200, 1e6);

    let fd = solve(fd_config(dx, q.clone(), BoundaryCondition::Periodic, BoundaryCondition::Periodic)).w;
    let spa = solve(
        FlexureConfig::new(dx, q)
            .with_elastic_thickness(ElasticThickness::Uniform(te_for_rigidity(1e22)))
            .with_method(SolutionMethod::Superposition),
    )
    .w;

    assert_relative_eq!(fd[200], spa[200], max_relative = 0.02);
}

#[test]
fn fft_method_reports_not_implemented() {
    let mut flexure = Flexure1D::initialize(
        FlexureConfig::new(1000.0, point_load(11, 5, 1.0)).with_method(SolutionMethod::Fft),
    )
    .unwrap();
    assert!(matches!(flexure.run(), Err(FlexureError::NotImplemented(_))));
    assert!(matches!(flexure.finalize(), Err(FlexureError::NotAnalyzed)));
}

#[test]
fn boundary_configuration_errors() {
    let base = || FlexureConfig::new(1000.0, point_load(11, 5, 1.0));

    let one_sided = base().with_boundaries(BoundaryCondition::Dirichlet0, BoundaryCondition::Periodic);
    assert!(matches!(
        Flexure1D::initialize(one_sided),
        Err(FlexureError::OneSidedPeriodic(_))
    ));

    let neumann = base().with_boundaries(BoundaryCondition::Mirror, BoundaryCondition::Neumann);
    assert!(matches!(
        Flexure1D::initialize(neumann),
        Err(FlexureError::UnsupportedBoundaryCondition(_))
    ));

    assert!(matches!(
        base().with_boundary_labels("Sandbox", "Dirichlet0"),
        Err(FlexureError::UnsupportedBoundaryCondition(_))
    ));
    assert!(matches!(
        base().with_boundary_labels("0Moment0Shear", "Clamped"),
        Err(FlexureError::UnknownBoundaryCondition(_))
    ));
}

#[test]
fn large_periodic_plate_under_uniform_load_sinks_evenly() {
    // Rows of the periodic operator sum to the buoyancy term alone
    let nx = 20_000;
    let q0 = 2.5e6;
    let config = fd_config(
        1000.0,
        vec![q0; nx],
        BoundaryCondition::Periodic,
        BoundaryCondition::Periodic,
    );
    let mut flexure = Flexure1D::initialize(config).unwrap();
    flexure.run().unwrap();
    assert_eq!(flexure.coefficient_matrix().unwrap().nonzero_offsets().len(), 9);

    let w = flexure.finalize().unwrap().w;
    let expected = -q0 / (3300.0 * 9.8);
    for v in &w {
        assert_relative_eq!(*v, expected, max_relative = 1e-6);
    }
}

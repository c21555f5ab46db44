//! Flexure1D - the run lifecycle: initialize, run, finalize

use std::time::Instant;

use crate::assembly::{assemble_operator, CoefficientMatrix};
use crate::boundary::{check_periodic_pairing, BoundaryCondition};
use crate::config::{ElasticThickness, FlexureConfig, SolutionMethod};
use crate::diagnostics::Diagnostics;
use crate::error::{FlexureError, FlexureResult};
use crate::grid::{Grid, LoadField};
use crate::results::{Deflection, RunTimings};
use crate::rigidity::{max_flexural_wavelength, RigidityBoundary, RigidityField};
use crate::solver::solve_deflection;
use crate::stencil::PlateConstants;
use crate::superposition::{superpose_gridded, superpose_scattered, SuperpositionParams};

/// Smallest grid the finite-difference stencil and its wraparound can address
pub const MIN_FD_CELLS: usize = 5;

/// One-dimensional flexure of an elastic plate
#[derive(Debug, Clone)]
pub struct Flexure1D {
    config: FlexureConfig,
    diagnostics: Diagnostics,
    /// Cached operator; rebuilt from scratch whenever rigidity or boundaries change
    coefficient_matrix: Option<CoefficientMatrix>,
    deflection: Option<Deflection>,
    timings: RunTimings,
}

impl Flexure1D {
    /// Check the configuration and prepare a run
    pub fn initialize(config: FlexureConfig) -> FlexureResult<Self> {
        validate(&config)?;
        let diagnostics = Diagnostics::new(config.verbose, config.debug);
        diagnostics.info(format_args!(
            "Flexure1D initialized: method {}, {} load samples",
            config.method,
            config.load.len()
        ));
        Ok(Self {
            config,
            diagnostics,
            coefficient_matrix: None,
            deflection: None,
            timings: RunTimings::default(),
        })
    }

    /// Use a prebuilt coefficient matrix instead of assembling one
    pub fn with_coefficient_matrix(mut self, matrix: CoefficientMatrix) -> Self {
        self.coefficient_matrix = Some(matrix);
        self
    }

    pub fn config(&self) -> &FlexureConfig {
        &self.config
    }

    /// Deflection of the last successful run
    pub fn deflection(&self) -> Option<&Deflection> {
        self.deflection.as_ref()
    }

    pub fn coefficient_matrix(&self) -> Option<&CoefficientMatrix> {
        self.coefficient_matrix.as_ref()
    }

    pub fn timings(&self) -> RunTimings {
        self.timings
    }

    /// Flexural rigidity derived from the configured elastic thickness
    pub fn rigidity(&self) -> RigidityField {
        RigidityField::from_elastic_thickness(
            &self.config.elastic_thickness,
            self.config.youngs_modulus,
            self.config.poissons_ratio,
        )
    }

    /// Change the elastic thickness; the operator will be rebuilt on the next run
    pub fn set_elastic_thickness(&mut self, te: ElasticThickness) -> FlexureResult<()> {
        let config = self.config.clone().with_elastic_thickness(te);
        validate(&config)?;
        self.config = config;
        self.invalidate();
        Ok(())
    }

    /// Change the boundary conditions; the operator will be rebuilt on the next run
    pub fn set_boundaries(
        &mut self,
        west: BoundaryCondition,
        east: BoundaryCondition,
    ) -> FlexureResult<()> {
        let config = self.config.clone().with_boundaries(west, east);
        validate(&config)?;
        self.config = config;
        self.invalidate();
        Ok(())
    }

    /// Replace the load; the operator is kept while the cell count is unchanged
    pub fn set_load(&mut self, load: LoadField) -> FlexureResult<()> {
        let resized = load.len() != self.config.load.len();
        let config = self.config.clone().with_load(load);
        validate(&config)?;
        self.config = config;
        if resized {
            self.invalidate();
        } else {
            self.deflection = None;
        }
        Ok(())
    }

    fn invalidate(&mut self) {
        self.coefficient_matrix = None;
        self.deflection = None;
    }

    /// Compute the deflection with the configured method
    pub fn run(&mut self) -> FlexureResult<()> {
        self.deflection = None;
        self.timings = RunTimings::default();
        self.diagnostics
            .info(format_args!("Flexure1D run: {}", self.config.method));

        match self.config.method {
            SolutionMethod::FiniteDifference => self.run_finite_difference(),
            SolutionMethod::Fft => Err(FlexureError::NotImplemented(
                "fast Fourier transform".to_string(),
            )),
            SolutionMethod::Superposition => self.run_superposition(),
            SolutionMethod::SuperpositionNoGrid => self.run_superposition_no_grid(),
        }
    }

    /// End the run and hand over the deflection
    pub fn finalize(self) -> FlexureResult<Deflection> {
        self.diagnostics.info(format_args!("Flexure1D finalized"));
        self.deflection.ok_or(FlexureError::NotAnalyzed)
    }

    fn plate_constants(&self) -> PlateConstants {
        PlateConstants::new(
            self.config.dx,
            self.config.density_contrast,
            self.config.gravity,
        )
    }

    fn superposition_params(&self) -> FlexureResult<SuperpositionParams> {
        match self.config.elastic_thickness {
            ElasticThickness::Uniform(te) => Ok(SuperpositionParams::from_elastic_thickness(
                te,
                self.config.youngs_modulus,
                self.config.poissons_ratio,
                self.config.density_contrast,
                self.config.gravity,
            )),
            ElasticThickness::Variable(_) => Err(FlexureError::InvalidRigidityShape(
                "analytical superposition needs a uniform elastic thickness".to_string(),
            )),
        }
    }

    fn run_finite_difference(&mut self) -> FlexureResult<()> {
        let diagnostics = self.diagnostics;
        let rigidity = self.rigidity();
        let constants = self.plate_constants();

        let LoadField::Gridded(load) = &self.config.load else {
            return Err(FlexureError::LoadMismatch(
                "finite differences need a gridded load".to_string(),
            ));
        };
        let grid = Grid::new(self.config.dx, load.len());

        if self.coefficient_matrix.is_none() {
            let start = Instant::now();
            let matrix = assemble_operator(
                &rigidity,
                &constants,
                grid.nx,
                self.config.bc_west,
                self.config.bc_east,
                &diagnostics,
            )?;
            let elapsed = start.elapsed();
            diagnostics.timing("Time to construct coefficient (operator) array", elapsed);
            self.timings.matrix_construction = Some(elapsed);
            self.coefficient_matrix = Some(matrix);
        } else {
            diagnostics.info(format_args!("Reusing cached coefficient matrix"));
        }
        let matrix = self
            .coefficient_matrix
            .as_ref()
            .ok_or(FlexureError::NotAnalyzed)?;

        if diagnostics.is_debug() {
            let wavelength =
                max_flexural_wavelength(&rigidity, constants.density_contrast, constants.gravity);
            diagnostics.debug(format_args!("q0 cells: {}", grid.nx));
            diagnostics.debug(format_args!(
                "Max flexural wavelength: {:.1} m ({} cells)",
                wavelength,
                (wavelength / grid.dx).ceil() as usize
            ));
        }

        let start = Instant::now();
        let w = solve_deflection(matrix, load)?;
        let elapsed = start.elapsed();
        diagnostics.timing("Time to solve", elapsed);
        self.timings.solve = Some(elapsed);

        diagnostics.debug(format_args!("w: {:?}", w));
        self.deflection = Some(Deflection::new(grid.positions(), w));
        Ok(())
    }

    fn run_superposition(&mut self) -> FlexureResult<()> {
        let params = self.superposition_params()?;
        let LoadField::Gridded(load) = &self.config.load else {
            return Err(FlexureError::LoadMismatch(
                "gridded superposition needs a gridded load".to_string(),
            ));
        };
        let grid = Grid::new(self.config.dx, load.len());

        let start = Instant::now();
        let w = superpose_gridded(load, &grid, &params);
        let elapsed = start.elapsed();
        self.diagnostics
            .timing("Time to superpose analytical solutions", elapsed);
        self.timings.solve = Some(elapsed);

        self.deflection = Some(Deflection::new(grid.positions(), w));
        Ok(())
    }

    fn run_superposition_no_grid(&mut self) -> FlexureResult<()> {
        let params = self.superposition_params()?;
        let LoadField::Scattered(points) = &self.config.load else {
            return Err(FlexureError::LoadMismatch(
                "non-gridded superposition needs (position, load) pairs".to_string(),
            ));
        };

        let start = Instant::now();
        let (x, w) = superpose_scattered(points, self.config.dx, &params);
        let elapsed = start.elapsed();
        self.diagnostics
            .timing("Time to superpose analytical solutions", elapsed);
        self.timings.solve = Some(elapsed);

        self.diagnostics
            .debug(format_args!("w: {} scattered points", w.len()));
        self.deflection = Some(Deflection::new(x, w));
        Ok(())
    }
}

/// Every configuration error is raised here, before any matrix work
fn validate(config: &FlexureConfig) -> FlexureResult<()> {
    if !(config.dx.is_finite() && config.dx > 0.0) {
        return Err(FlexureError::InvalidInput(format!(
            "dx must be positive, got {}",
            config.dx
        )));
    }
    let buoyancy = config.density_contrast * config.gravity;
    if !(buoyancy.is_finite() && buoyancy > 0.0) {
        return Err(FlexureError::InvalidInput(format!(
            "density contrast times gravity must be positive, got {buoyancy}"
        )));
    }
    if config.load.is_empty() {
        return Err(FlexureError::InvalidInput("load is empty".to_string()));
    }
    if config.method.is_gridded() != config.load.is_gridded() {
        return Err(FlexureError::LoadMismatch(format!(
            "method {} cannot use this load",
            config.method
        )));
    }

    let nx = config.load.len();
    let rigidity = RigidityField::from_elastic_thickness(
        &config.elastic_thickness,
        config.youngs_modulus,
        config.poissons_ratio,
    );

    match config.method {
        SolutionMethod::FiniteDifference => {
            if nx < MIN_FD_CELLS {
                return Err(FlexureError::InvalidInput(format!(
                    "finite differences need at least {MIN_FD_CELLS} cells, got {nx}"
                )));
            }
            check_periodic_pairing(config.bc_west, config.bc_east)?;
            for bc in [config.bc_west, config.bc_east] {
                if bc == BoundaryCondition::Neumann {
                    return Err(FlexureError::UnsupportedBoundaryCondition(bc.to_string()));
                }
            }
            rigidity.validate(nx)?;
            if !rigidity.is_constant() {
                RigidityBoundary::for_plate(config.bc_west)?;
                RigidityBoundary::for_plate(config.bc_east)?;
            }
        }
        SolutionMethod::Superposition | SolutionMethod::SuperpositionNoGrid => {
            if !config.elastic_thickness.is_uniform() {
                return Err(FlexureError::InvalidRigidityShape(
                    "analytical superposition needs a uniform elastic thickness".to_string(),
                ));
            }
            rigidity.validate(nx)?;
        }
        // Reported when run
        SolutionMethod::Fft => {}
    }

    Ok(())
}

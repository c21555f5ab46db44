//! Run configuration and solution-method selection

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::boundary::BoundaryCondition;
use crate::error::FlexureError;
use crate::grid::LoadField;

/// Solution strategy for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolutionMethod {
    /// Finite-difference operator matrix and direct sparse solve
    #[serde(rename = "FD")]
    FiniteDifference,
    /// Fast Fourier transform (not implemented)
    #[serde(rename = "FFT")]
    Fft,
    /// Superposition of analytical point-load solutions on a regular grid
    #[serde(rename = "SPA")]
    Superposition,
    /// Superposition of analytical solutions at scattered load positions
    #[serde(rename = "SPA_NG")]
    SuperpositionNoGrid,
}

impl Default for SolutionMethod {
    fn default() -> Self {
        Self::FiniteDifference
    }
}

impl SolutionMethod {
    /// External label of the method
    pub fn label(&self) -> &'static str {
        match self {
            Self::FiniteDifference => "FD",
            Self::Fft => "FFT",
            Self::Superposition => "SPA",
            Self::SuperpositionNoGrid => "SPA_NG",
        }
    }

    /// Whether the method reads a dense, gridded load
    pub fn is_gridded(&self) -> bool {
        !matches!(self, Self::SuperpositionNoGrid)
    }
}

impl fmt::Display for SolutionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SolutionMethod {
    type Err = FlexureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FD" => Ok(Self::FiniteDifference),
            "FFT" => Ok(Self::Fft),
            "SPA" => Ok(Self::Superposition),
            "SPA_NG" => Ok(Self::SuperpositionNoGrid),
            other => Err(FlexureError::UnknownMethod(other.to_string())),
        }
    }
}

/// Elastic thickness of the plate (m), uniform or one value per cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElasticThickness {
    Uniform(f64),
    Variable(Vec<f64>),
}

impl ElasticThickness {
    pub fn is_uniform(&self) -> bool {
        matches!(self, Self::Uniform(_))
    }
}

impl Default for ElasticThickness {
    fn default() -> Self {
        Self::Uniform(35_000.0)
    }
}

/// Everything a flexure run consumes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlexureConfig {
    /// Cell spacing (m)
    pub dx: f64,
    /// Elastic thickness Te (m)
    pub elastic_thickness: ElasticThickness,
    /// Young's modulus E (Pa)
    pub youngs_modulus: f64,
    /// Poisson's ratio
    pub poissons_ratio: f64,
    /// Density contrast between mantle and infill (kg/m³)
    pub density_contrast: f64,
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
    /// Plate boundary condition at the index-0 end
    pub bc_west: BoundaryCondition,
    /// Plate boundary condition at the last index
    pub bc_east: BoundaryCondition,
    /// Solution method
    pub method: SolutionMethod,
    /// Applied load
    pub load: LoadField,
    /// Narrate the run through the logger
    pub verbose: bool,
    /// Dump intermediate quantities through the logger
    pub debug: bool,
}

impl Default for FlexureConfig {
    fn default() -> Self {
        Self {
            dx: 1000.0,
            elastic_thickness: ElasticThickness::default(),
            youngs_modulus: 1e11,
            poissons_ratio: 0.25,
            density_contrast: 3300.0,
            gravity: 9.8,
            bc_west: BoundaryCondition::Dirichlet0,
            bc_east: BoundaryCondition::Dirichlet0,
            method: SolutionMethod::FiniteDifference,
            load: LoadField::Gridded(Vec::new()),
            verbose: false,
            debug: false,
        }
    }
}

impl FlexureConfig {
    /// Create a finite-difference configuration for a gridded load
    pub fn new(dx: f64, load: Vec<f64>) -> Self {
        Self {
            dx,
            load: LoadField::Gridded(load),
            ..Self::default()
        }
    }

    /// Set the solution method
    pub fn with_method(mut self, method: SolutionMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the West and East plate boundary conditions
    pub fn with_boundaries(mut self, west: BoundaryCondition, east: BoundaryCondition) -> Self {
        self.bc_west = west;
        self.bc_east = east;
        self
    }

    /// Set boundary conditions from their external labels
    pub fn with_boundary_labels(self, west: &str, east: &str) -> Result<Self, FlexureError> {
        let west = west.parse()?;
        let east = east.parse()?;
        Ok(self.with_boundaries(west, east))
    }

    /// Set the elastic thickness
    pub fn with_elastic_thickness(mut self, te: ElasticThickness) -> Self {
        self.elastic_thickness = te;
        self
    }

    /// Set Young's modulus and Poisson's ratio
    pub fn with_elastic_moduli(mut self, youngs_modulus: f64, poissons_ratio: f64) -> Self {
        self.youngs_modulus = youngs_modulus;
        self.poissons_ratio = poissons_ratio;
        self
    }

    /// Set density contrast and gravity
    pub fn with_buoyancy(mut self, density_contrast: f64, gravity: f64) -> Self {
        self.density_contrast = density_contrast;
        self.gravity = gravity;
        self
    }

    /// Replace the load
    pub fn with_load(mut self, load: LoadField) -> Self {
        self.load = load;
        self
    }

    /// Enable narration
    pub fn with_verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Enable debug dumps
    pub fn with_debug(mut self) -> Self {
        self.debug = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_labels_round_trip() {
        for method in [
            SolutionMethod::FiniteDifference,
            SolutionMethod::Fft,
            SolutionMethod::Superposition,
            SolutionMethod::SuperpositionNoGrid,
        ] {
            assert_eq!(method.label().parse::<SolutionMethod>().unwrap(), method);
        }
    }

    #[test]
    fn test_unknown_method_rejected() {
        let err = "Spectral".parse::<SolutionMethod>().unwrap_err();
        assert!(matches!(err, FlexureError::UnknownMethod(name) if name == "Spectral"));
    }

    #[test]
    fn test_thickness_accepts_scalar_or_array() {
        let scalar: ElasticThickness = serde_json::from_str("25000.0").unwrap();
        assert_eq!(scalar, ElasticThickness::Uniform(25_000.0));

        let array: ElasticThickness = serde_json::from_str("[1.0, 2.0, 3.0]").unwrap();
        assert_eq!(array, ElasticThickness::Variable(vec![1.0, 2.0, 3.0]));

        assert!(serde_json::from_str::<ElasticThickness>("\"thick\"").is_err());
    }

    #[test]
    fn test_boundary_labels() {
        let config = FlexureConfig::default()
            .with_boundary_labels("Mirror", "0Moment0Shear")
            .unwrap();
        assert_eq!(config.bc_west, BoundaryCondition::Mirror);
        assert_eq!(config.bc_east, BoundaryCondition::ZeroMomentZeroShear);

        assert!(FlexureConfig::default()
            .with_boundary_labels("Dirichlet", "Mirror")
            .is_err());
    }
}

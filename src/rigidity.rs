//! Flexural rigidity: material relations, the per-cell field and its ghost extension
//!
//! A variable rigidity field is padded with one ghost value at each end before
//! any stencil is derived. The ghost values follow a rigidity boundary rule
//! that is chosen from the plate boundary condition on that side:
//!
//! | Plate boundary                                  | Rigidity rule         |
//! |-------------------------------------------------|-----------------------|
//! | `Periodic`                                      | wrap to opposite end  |
//! | `Dirichlet0`, `0Moment0Shear`, `0Slope0Shear`   | zero curvature        |
//! | `Mirror`                                        | mirror about the edge |

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::boundary::BoundaryCondition;
use crate::config::ElasticThickness;
use crate::error::{FlexureError, FlexureResult};

/// Flexural rigidity D = E·Te³ / (12·(1 − ν²))
pub fn flexural_rigidity(youngs_modulus: f64, poissons_ratio: f64, te: f64) -> f64 {
    youngs_modulus * te.powi(3) / (12.0 * (1.0 - poissons_ratio * poissons_ratio))
}

/// 1D flexural parameter α = (4D / (Δρ·g))^(1/4)
pub fn flexural_parameter(rigidity: f64, density_contrast: f64, gravity: f64) -> f64 {
    (4.0 * rigidity / (density_contrast * gravity)).powf(0.25)
}

/// Approximate maximum flexural wavelength 2πα for the stiffest part of the plate
pub fn max_flexural_wavelength(rigidity: &RigidityField, density_contrast: f64, gravity: f64) -> f64 {
    2.0 * PI * flexural_parameter(rigidity.max(), density_contrast, gravity)
}

/// Flexural rigidity D (N·m), constant or one value per cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RigidityField {
    Constant(f64),
    Variable(Vec<f64>),
}

impl RigidityField {
    /// Derive rigidity from elastic thickness
    pub fn from_elastic_thickness(
        te: &ElasticThickness,
        youngs_modulus: f64,
        poissons_ratio: f64,
    ) -> Self {
        match te {
            ElasticThickness::Uniform(te) => {
                Self::Constant(flexural_rigidity(youngs_modulus, poissons_ratio, *te))
            }
            ElasticThickness::Variable(te) => Self::Variable(
                te.iter()
                    .map(|&t| flexural_rigidity(youngs_modulus, poissons_ratio, t))
                    .collect(),
            ),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }

    /// Largest rigidity in the field
    pub fn max(&self) -> f64 {
        match self {
            Self::Constant(d) => *d,
            Self::Variable(d) => d.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }

    /// Check that the field is usable on a grid of `nx` cells
    pub fn validate(&self, nx: usize) -> FlexureResult<()> {
        match self {
            Self::Constant(d) => {
                if !d.is_finite() || *d <= 0.0 {
                    return Err(FlexureError::InvalidRigidityShape(format!(
                        "rigidity must be positive and finite, got {d}"
                    )));
                }
            }
            Self::Variable(d) => {
                if d.len() != nx {
                    return Err(FlexureError::InvalidRigidityShape(format!(
                        "expected {nx} values to match the load, got {}",
                        d.len()
                    )));
                }
                if let Some(i) = d.iter().position(|v| !v.is_finite() || *v <= 0.0) {
                    return Err(FlexureError::InvalidRigidityShape(format!(
                        "rigidity must be positive and finite, got {} at cell {i}",
                        d[i]
                    )));
                }
            }
        }
        Ok(())
    }
}

/// How the rigidity ghost value beyond one edge is filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RigidityBoundary {
    /// Take the value from the opposite end of the domain
    Periodic,
    /// Linear extrapolation, so d²D/dx² = 0 across the edge
    ZeroCurvature,
    /// Reflect the first interior value about the edge cell
    Mirror,
}

impl RigidityBoundary {
    /// Rigidity rule implied by a plate boundary condition
    pub fn for_plate(bc: BoundaryCondition) -> FlexureResult<Self> {
        match bc {
            BoundaryCondition::Periodic => Ok(Self::Periodic),
            BoundaryCondition::Dirichlet0
            | BoundaryCondition::ZeroMomentZeroShear
            | BoundaryCondition::ZeroSlopeZeroShear => Ok(Self::ZeroCurvature),
            BoundaryCondition::Mirror => Ok(Self::Mirror),
            BoundaryCondition::Neumann => {
                Err(FlexureError::InvalidRigidityBoundary(bc.to_string()))
            }
        }
    }
}

/// Variable rigidity extended by one ghost value at each end (length nx + 2)
#[derive(Debug, Clone, PartialEq)]
pub struct PaddedRigidity {
    values: Vec<f64>,
}

impl PaddedRigidity {
    pub fn new(d: &[f64], west: RigidityBoundary, east: RigidityBoundary) -> FlexureResult<Self> {
        let n = d.len();
        if n < 3 {
            return Err(FlexureError::InvalidRigidityShape(format!(
                "at least 3 rigidity values are needed to fill ghost cells, got {n}"
            )));
        }

        let ghost_west = match west {
            RigidityBoundary::Periodic => d[n - 1],
            RigidityBoundary::ZeroCurvature => 2.0 * d[0] - d[1],
            RigidityBoundary::Mirror => d[1],
        };
        let ghost_east = match east {
            RigidityBoundary::Periodic => d[0],
            RigidityBoundary::ZeroCurvature => 2.0 * d[n - 1] - d[n - 2],
            RigidityBoundary::Mirror => d[n - 2],
        };

        let mut values = Vec::with_capacity(n + 2);
        values.push(ghost_west);
        values.extend_from_slice(d);
        values.push(ghost_east);
        Ok(Self { values })
    }

    /// Number of real cells
    pub fn nx(&self) -> usize {
        self.values.len() - 2
    }

    /// All values including both ghosts
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// D at cell i − 1, for every cell i
    pub fn previous(&self) -> &[f64] {
        &self.values[..self.values.len() - 2]
    }

    /// D at cell i
    pub fn center(&self) -> &[f64] {
        &self.values[1..self.values.len() - 1]
    }

    /// D at cell i + 1
    pub fn next(&self) -> &[f64] {
        &self.values[2..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flexural_rigidity() {
        // 1e11 * 10^3 / (12 * 0.9375)
        let d = flexural_rigidity(1e11, 0.25, 10.0);
        assert_relative_eq!(d, 1e14 / 11.25, max_relative = 1e-12);
    }

    #[test]
    fn test_flexural_parameter_grows_with_rigidity() {
        let a1 = flexural_parameter(1e22, 3300.0, 9.8);
        let a2 = flexural_parameter(1e23, 3300.0, 9.8);
        assert!(a2 > a1);
        assert_relative_eq!(a1.powi(4), 4e22 / (3300.0 * 9.8), max_relative = 1e-10);
    }

    #[test]
    fn test_ghost_rules() {
        let d = [4.0, 5.0, 7.0, 8.0];

        let zc = PaddedRigidity::new(
            &d,
            RigidityBoundary::ZeroCurvature,
            RigidityBoundary::ZeroCurvature,
        )
        .unwrap();
        assert_eq!(zc.values(), &[3.0, 4.0, 5.0, 7.0, 8.0, 9.0]);

        let mirror =
            PaddedRigidity::new(&d, RigidityBoundary::Mirror, RigidityBoundary::Mirror).unwrap();
        assert_eq!(mirror.values(), &[5.0, 4.0, 5.0, 7.0, 8.0, 7.0]);

        let periodic =
            PaddedRigidity::new(&d, RigidityBoundary::Periodic, RigidityBoundary::Periodic)
                .unwrap();
        assert_eq!(periodic.values(), &[8.0, 4.0, 5.0, 7.0, 8.0, 4.0]);
    }

    #[test]
    fn test_shifted_views() {
        let padded =
            PaddedRigidity::new(&[1.0, 2.0, 3.0], RigidityBoundary::Mirror, RigidityBoundary::Mirror)
                .unwrap();
        assert_eq!(padded.nx(), 3);
        assert_eq!(padded.previous(), &[2.0, 1.0, 2.0]);
        assert_eq!(padded.center(), &[1.0, 2.0, 3.0]);
        assert_eq!(padded.next(), &[2.0, 3.0, 2.0]);
    }

    #[test]
    fn test_rigidity_rule_for_neumann_rejected() {
        assert!(RigidityBoundary::for_plate(BoundaryCondition::Neumann).is_err());
        assert_eq!(
            RigidityBoundary::for_plate(BoundaryCondition::ZeroSlopeZeroShear).unwrap(),
            RigidityBoundary::ZeroCurvature
        );
    }

    #[test]
    fn test_variable_shape_checked() {
        let field = RigidityField::Variable(vec![1.0; 4]);
        assert!(field.validate(4).is_ok());
        assert!(matches!(
            field.validate(5),
            Err(FlexureError::InvalidRigidityShape(_))
        ));
        assert!(RigidityField::Constant(-1.0).validate(5).is_err());
    }
}

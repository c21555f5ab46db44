//! Flexure Solver - one-dimensional flexure of an elastic lithospheric plate
//!
//! Computes the vertical deflection `w` of a thin elastic plate floating on a
//! fluid mantle under a vertical load `q`:
//!
//! ```text
//! d²/dx² ( D(x) d²w/dx² ) + Δρ g w = −q
//! ```
//!
//! Supported solution methods:
//! - Finite differences (`FD`) with constant or variable rigidity and
//!   per-side boundary conditions
//! - Superposition of analytical point-load solutions on a grid (`SPA`)
//! - Superposition at scattered load positions (`SPA_NG`)
//!
//! ## Example
//! ```rust
//! use flexure_solver::prelude::*;
//!
//! let mut q = vec![0.0; 11];
//! q[5] = 1e6;
//!
//! let config = FlexureConfig::new(1000.0, q)
//!     .with_boundaries(BoundaryCondition::Dirichlet0, BoundaryCondition::Dirichlet0);
//!
//! let mut flexure = Flexure1D::initialize(config).unwrap();
//! flexure.run().unwrap();
//! let deflection = flexure.finalize().unwrap();
//! assert!(deflection.w[5] < 0.0);
//! ```

pub mod assembly;
pub mod boundary;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod grid;
pub mod math;
pub mod model;
pub mod results;
pub mod rigidity;
pub mod solver;
pub mod stencil;
pub mod superposition;

// Re-export common types
pub mod prelude {
    pub use crate::assembly::{assemble_operator, CoefficientMatrix};
    pub use crate::boundary::{BoundaryCondition, Side};
    pub use crate::config::{ElasticThickness, FlexureConfig, SolutionMethod};
    pub use crate::diagnostics::Diagnostics;
    pub use crate::error::{FlexureError, FlexureResult};
    pub use crate::grid::{Grid, LoadField, PointLoad};
    pub use crate::model::Flexure1D;
    pub use crate::results::{Deflection, RunTimings};
    pub use crate::rigidity::{flexural_rigidity, RigidityField};
    pub use crate::stencil::PlateConstants;
    pub use crate::superposition::SuperpositionParams;
}

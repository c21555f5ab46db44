//! Error types for the flexure solver

use thiserror::Error;

/// Main error type for flexure operations
#[derive(Error, Debug)]
pub enum FlexureError {
    #[error("Unknown solution method '{0}': expected \"FD\", \"FFT\", \"SPA\" or \"SPA_NG\"")]
    UnknownMethod(String),

    #[error("Unknown boundary condition '{0}'")]
    UnknownBoundaryCondition(String),

    #[error("Boundary condition '{0}' is not yet supported")]
    UnsupportedBoundaryCondition(String),

    #[error(
        "Periodic boundary on the {0} side only: the opposite side must also be periodic"
    )]
    OneSidedPeriodic(String),

    #[error("Invalid rigidity: {0}")]
    InvalidRigidityShape(String),

    #[error("No rigidity boundary rule for the '{0}' plate boundary condition")]
    InvalidRigidityBoundary(String),

    #[error("Load does not match the selected method: {0}")]
    LoadMismatch(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("The {0} solution method is not yet implemented")]
    NotImplemented(String),

    #[error("Singular coefficient matrix - check boundary conditions and buoyancy term")]
    SingularMatrix,

    #[error("Linear solve failed: {0}")]
    SolveFailed(String),

    #[error("Off-grid coefficient reached the assembled matrix at row {row}, column {col}")]
    OffGridCoefficient { row: usize, col: usize },

    #[error("Model not analyzed - call run() first")]
    NotAnalyzed,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for flexure operations
pub type FlexureResult<T> = Result<T, FlexureError>;

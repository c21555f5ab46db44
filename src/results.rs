//! Result types for flexure runs

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::FlexureResult;

/// Plate deflection, one value per output position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deflection {
    /// Output positions (m)
    pub x: Vec<f64>,
    /// Vertical deflection (m), negative downward
    pub w: Vec<f64>,
}

impl Deflection {
    pub fn new(x: Vec<f64>, w: Vec<f64>) -> Self {
        Self { x, w }
    }

    pub fn len(&self) -> usize {
        self.w.len()
    }

    pub fn is_empty(&self) -> bool {
        self.w.is_empty()
    }

    /// Largest deflection magnitude
    pub fn max_abs(&self) -> f64 {
        self.w.iter().fold(0.0, |acc, v| acc.max(v.abs()))
    }

    /// Index of the deepest (most negative) point
    pub fn argmin(&self) -> Option<usize> {
        self.w
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
    }

    pub fn to_json(&self) -> FlexureResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Wall-clock time spent in each stage of the last run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunTimings {
    /// Coefficient matrix construction (None when a cached matrix was reused)
    pub matrix_construction: Option<Duration>,
    /// Linear solve or analytical summation
    pub solve: Option<Duration>,
}

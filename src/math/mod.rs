//! Linear-algebra utilities for the finite-difference path

pub mod sparse;

pub use sparse::{sparse_matvec, BandedLuSolver, CyclicBandedSolver, SparseMatrixBuilder};

/// Shift a sequence cyclically: a positive `shift` moves entries toward higher indices
pub fn roll<T: Clone>(values: &[T], shift: isize) -> Vec<T> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let s = shift.rem_euclid(n as isize) as usize;
    (0..n).map(|i| values[(i + n - s) % n].clone()).collect()
}

//! Sparse storage and the direct solver for the flexure operator
//!
//! The operator is pentadiagonal, plus four far corner diagonals when the
//! boundaries are periodic. It is assembled in COO form, stored as CSR and
//! factorized as a band matrix by LU with partial pivoting. The boundary rows
//! make the operator non-symmetric, so Cholesky is not an option. Periodic
//! corners are kept out of the band and handled by a low-rank correction.

use nalgebra::{DMatrix, DVector, Dyn, LU};
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::error::{FlexureError, FlexureResult};

/// Sparse matrix builder using COO format
pub struct SparseMatrixBuilder {
    size: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrixBuilder {
    /// Create a builder for a square matrix with about `per_row` entries per row
    pub fn new(size: usize, per_row: usize) -> Self {
        Self {
            size,
            entries: Vec::with_capacity(size * per_row),
        }
    }

    /// Add a value to the matrix (accumulates if already exists)
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.entries.push((row, col, value));
        }
    }

    /// Convert to CSR format for efficient solves
    pub fn to_csr(&self) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(self.size, self.size);

        for &(row, col, val) in &self.entries {
            coo.push(row, col, val);
        }

        CsrMatrix::from(&coo)
    }

    /// Convert to dense matrix (for comparison/debugging)
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut mat = DMatrix::zeros(self.size, self.size);

        for &(row, col, val) in &self.entries {
            mat[(row, col)] += val;
        }

        mat
    }

    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }
}

/// Banded LU solver with partial pivoting
///
/// Row `i` stores columns `i - lower ..= i + upper + lower`; the extra `lower`
/// columns absorb the fill-in caused by row exchanges. After [`factorize`]
/// the band holds U and the row multipliers, so any number of right-hand
/// sides can be solved against one factorization.
///
/// [`factorize`]: BandedLuSolver::factorize
#[derive(Debug, Clone)]
pub struct BandedLuSolver {
    size: usize,
    lower: usize,
    upper: usize,
    width: usize,
    band: Vec<f64>,
    // Largest stored magnitude, for the pivot threshold
    scale: f64,
    pivots: Vec<usize>,
    factorized: bool,
}

impl BandedLuSolver {
    /// Copy a CSR matrix into band storage
    pub fn new(csr: &CsrMatrix<f64>) -> Self {
        let size = csr.nrows();

        let mut lower = 0usize;
        let mut upper = 0usize;
        for (row, col, _val) in csr.triplet_iter() {
            if col < row {
                lower = lower.max(row - col);
            } else {
                upper = upper.max(col - row);
            }
        }

        let width = 2 * lower + upper + 1;
        let mut solver = Self {
            size,
            lower,
            upper,
            width,
            band: vec![0.0; size * width],
            scale: 0.0,
            pivots: (0..size).collect(),
            factorized: false,
        };

        for (row, col, &val) in csr.triplet_iter() {
            let idx = solver.index(row, col);
            solver.band[idx] += val;
            solver.scale = solver.scale.max(val.abs());
        }

        solver
    }

    /// Lower and upper bandwidth of the original matrix
    pub fn bandwidth(&self) -> (usize, usize) {
        (self.lower, self.upper)
    }

    /// Number of stored band values
    pub fn storage_len(&self) -> usize {
        self.band.len()
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        row * self.width + (col + self.lower - row)
    }

    #[inline]
    fn last_row(&self, k: usize) -> usize {
        (k + self.lower).min(self.size - 1)
    }

    #[inline]
    fn reach(&self, k: usize) -> usize {
        (k + self.upper + self.lower).min(self.size - 1)
    }

    /// Factorize in place: PA = LU
    pub fn factorize(&mut self) -> FlexureResult<()> {
        let n = self.size;
        let tol = self.scale * f64::EPSILON * n as f64;

        for k in 0..n {
            let last = self.last_row(k);
            let reach = self.reach(k);

            let mut pivot_row = k;
            let mut best = self.band[self.index(k, k)].abs();
            for i in k + 1..=last {
                let v = self.band[self.index(i, k)].abs();
                if v > best {
                    best = v;
                    pivot_row = i;
                }
            }
            if !best.is_finite() || best <= tol {
                return Err(FlexureError::SingularMatrix);
            }

            self.pivots[k] = pivot_row;
            if pivot_row != k {
                for j in k..=reach {
                    let a = self.index(k, j);
                    let b = self.index(pivot_row, j);
                    self.band.swap(a, b);
                }
            }

            let pivot = self.band[self.index(k, k)];
            for i in k + 1..=last {
                let ik = self.index(i, k);
                let factor = self.band[ik] / pivot;
                // Multiplier stays in the L slot for the forward pass
                self.band[ik] = factor;
                if factor == 0.0 {
                    continue;
                }
                for j in k + 1..=reach {
                    let ij = self.index(i, j);
                    let kj = self.index(k, j);
                    self.band[ij] -= factor * self.band[kj];
                }
            }
        }

        self.factorized = true;
        Ok(())
    }

    /// Solve `A x = rhs` with the stored factors
    pub fn solve(&self, rhs: &DVector<f64>) -> FlexureResult<DVector<f64>> {
        let n = self.size;
        if !self.factorized {
            return Err(FlexureError::SolveFailed(
                "matrix has not been factorized".to_string(),
            ));
        }
        if rhs.len() != n {
            return Err(FlexureError::SolveFailed(format!(
                "right-hand side has {} rows, matrix has {n}",
                rhs.len()
            )));
        }

        let mut x = rhs.clone();

        // Row exchanges and multipliers, in elimination order
        for k in 0..n {
            let p = self.pivots[k];
            if p != k {
                x.swap_rows(k, p);
            }
            let xk = x[k];
            for i in k + 1..=self.last_row(k) {
                x[i] -= self.band[self.index(i, k)] * xk;
            }
        }

        // Back substitution on the upper factor
        for i in (0..n).rev() {
            let mut sum = x[i];
            for j in i + 1..=self.reach(i) {
                sum -= self.band[self.index(i, j)] * x[j];
            }
            x[i] = sum / self.band[self.index(i, i)];
        }

        Ok(x)
    }
}

/// Solver for a banded matrix plus a few entries far outside the band
///
/// Periodic operators are banded except for the wraparound terms in the
/// matrix corners. Writing `A = B + E·C·Eᵀ`, where `B` is the band and `C`
/// holds the outlying entries on the border indices selected by `E`, the
/// solution follows from the Woodbury identity:
///
/// ```text
/// x = y − Z·(I + C·EᵀZ)⁻¹·C·Eᵀy,   y = B⁻¹b,   Z = B⁻¹E
/// ```
///
/// Only `B` is factorized, so storage stays linear in the matrix size.
#[derive(Debug, Clone)]
pub struct CyclicBandedSolver {
    core: BandedLuSolver,
    border: Vec<usize>,
    corners: DMatrix<f64>,
    z: DMatrix<f64>,
    capacitance: LU<f64, Dyn, Dyn>,
}

impl CyclicBandedSolver {
    /// Split `csr` into the band `|col − row| ≤ half_band` and the outlying corners, then factorize
    pub fn new(csr: &CsrMatrix<f64>, half_band: usize) -> FlexureResult<Self> {
        let n = csr.nrows();
        let mut core_builder = SparseMatrixBuilder::new(n, 2 * half_band + 1);
        let mut outliers = Vec::new();

        for (row, col, &val) in csr.triplet_iter() {
            if row.abs_diff(col) <= half_band {
                core_builder.add(row, col, val);
            } else {
                outliers.push((row, col, val));
            }
        }

        let mut border: Vec<usize> = outliers
            .iter()
            .flat_map(|&(row, col, _)| [row, col])
            .collect();
        border.sort_unstable();
        border.dedup();
        let m = border.len();
        let slot = |i: usize| border.binary_search(&i).ok();

        let mut corners = DMatrix::<f64>::zeros(m, m);
        for &(row, col, val) in &outliers {
            if let (Some(a), Some(b)) = (slot(row), slot(col)) {
                corners[(a, b)] += val;
            }
        }

        let mut core = BandedLuSolver::new(&core_builder.to_csr());
        core.factorize()?;

        let mut z = DMatrix::zeros(n, m);
        for (c, &i) in border.iter().enumerate() {
            let mut e = DVector::zeros(n);
            e[i] = 1.0;
            z.set_column(c, &core.solve(&e)?);
        }

        let z_border = DMatrix::from_fn(m, m, |a, b| z[(border[a], b)]);
        let capacitance = (DMatrix::identity(m, m) + &corners * z_border).lu();
        if !capacitance.is_invertible() {
            return Err(FlexureError::SingularMatrix);
        }

        Ok(Self {
            core,
            border,
            corners,
            z,
            capacitance,
        })
    }

    /// Bandwidth of the factorized core
    pub fn core_bandwidth(&self) -> (usize, usize) {
        self.core.bandwidth()
    }

    /// Stored values: band factors plus the n × border correction columns
    pub fn storage_len(&self) -> usize {
        self.core.storage_len() + self.z.len()
    }

    pub fn solve(&self, rhs: &DVector<f64>) -> FlexureResult<DVector<f64>> {
        let y = self.core.solve(rhs)?;
        if self.border.is_empty() {
            return Ok(y);
        }

        let y_border = DVector::from_iterator(self.border.len(), self.border.iter().map(|&i| y[i]));
        let u = self
            .capacitance
            .solve(&(&self.corners * y_border))
            .ok_or(FlexureError::SingularMatrix)?;

        Ok(y - &self.z * u)
    }
}

/// Sparse matrix-vector multiplication
#[inline]
pub fn sparse_matvec(csr: &CsrMatrix<f64>, x: &DVector<f64>) -> DVector<f64> {
    let n = csr.nrows();
    let mut y = DVector::zeros(n);

    let row_offsets = csr.row_offsets();
    let col_indices = csr.col_indices();
    let values = csr.values();

    for row in 0..n {
        let start = row_offsets[row];
        let end = row_offsets[row + 1];

        let mut sum = 0.0;
        for idx in start..end {
            sum += values[idx] * x[col_indices[idx]];
        }
        y[row] = sum;
    }

    y
}

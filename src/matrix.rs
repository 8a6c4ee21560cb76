//! Dense row-major matrix of `f64`.
//!
//! Every arithmetic or transform operation leaves its operands untouched and returns a
//! freshly owned `Matrix`. Shape violations are reported as [`Error::ShapeMismatch`]
//! instead of producing a result.
//!
//! Storage is released when a `Matrix` is dropped; there is no explicit free.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::matmul::gemm_f64;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    /// Row-major, `rows * cols` entries.
    data: Vec<f64>,
}

impl Matrix {
    /// Allocate a zero-filled `rows x cols` matrix.
    ///
    /// Fails with [`Error::InvalidConstruction`] if either dimension is zero and with
    /// [`Error::Allocation`] if the storage cannot be reserved.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidConstruction(format!(
                "matrix dims must be > 0, got {rows}x{cols}"
            )));
        }
        let len = rows
            .checked_mul(cols)
            .ok_or(Error::Allocation { rows, cols })?;

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| Error::Allocation { rows, cols })?;
        data.resize(len, 0.0);

        Ok(Self { rows, cols, data })
    }

    /// Wrap a row-major buffer of length `rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidConstruction(format!(
                "matrix dims must be > 0, got {rows}x{cols}"
            )));
        }
        let expected = rows
            .checked_mul(cols)
            .ok_or(Error::Allocation { rows, cols })?;
        if data.len() != expected {
            return Err(Error::InvalidConstruction(format!(
                "buffer length {} does not match {rows}x{cols}",
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Build a matrix from per-row slices. All rows must have the same length.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let cols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut m = Self::new(rows.len(), cols)?;
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(Error::InvalidConstruction(format!(
                    "row {i} has len {}, expected {cols}",
                    row.len()
                )));
            }
            m.data[i * cols..(i + 1) * cols].copy_from_slice(row);
        }
        Ok(m)
    }

    /// Build a `values.len() x 1` column vector.
    pub fn column(values: &[f64]) -> Result<Self> {
        Self::from_vec(values.len(), 1, values.to_vec())
    }

    pub fn identity(n: usize) -> Result<Self> {
        let mut m = Self::new(n, n)?;
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        Ok(m)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false for a constructed matrix; present for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn is_column(&self) -> bool {
        self.cols == 1
    }

    /// Entry at `(row, col)`, or `None` when out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    /// Overwrite the entry at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(Error::ShapeMismatch {
                op: "set",
                expected: format!("an index within {}x{}", self.rows, self.cols),
                got: format!("({row}, {col})"),
            });
        }
        self.data[row * self.cols + col] = value;
        Ok(())
    }

    /// Row `idx` as a slice. Panics if `idx >= rows`.
    #[inline]
    pub fn row(&self, idx: usize) -> &[f64] {
        &self.data[idx * self.cols..(idx + 1) * self.cols]
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Overwrite every entry, in row-major order, with successive values of `f`.
    pub fn fill_with<F: FnMut() -> f64>(&mut self, mut f: F) {
        for v in &mut self.data {
            *v = f();
        }
    }

    /// Fill every entry with a value drawn uniformly from `[-1, 1)`.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let dist = Uniform::new(-1.0_f64, 1.0_f64);
        self.fill_with(|| dist.sample(rng));
    }

    /// Reproducible variant of [`Matrix::randomize`]: the same seed gives the same values.
    pub fn randomize_seeded(&mut self, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        self.randomize(&mut rng);
    }

    /// Non-reproducible variant: `seed` is mixed with the current wall-clock time.
    ///
    /// Distinct seeds give distinct sequences even within the same clock tick.
    pub fn randomize_with_time(&mut self, seed: u64) {
        self.randomize_seeded(time_mixed_seed(seed));
    }

    /// Deep copy into a newly owned matrix.
    #[inline]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// `(cols x rows)` matrix with `result[j][i] = self[i][j]`.
    pub fn transpose(&self) -> Result<Self> {
        let mut t = Self::new(self.cols, self.rows)?;
        for i in 0..self.rows {
            for j in 0..self.cols {
                t.data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        Ok(t)
    }

    /// Standard matrix product. Requires `self.cols == other.rows`.
    pub fn multiply(&self, other: &Matrix) -> Result<Self> {
        if self.cols != other.rows {
            return Err(Error::ShapeMismatch {
                op: "multiply",
                expected: format!("{} rows on the right operand", self.cols),
                got: format!("{}x{} * {}x{}", self.rows, self.cols, other.rows, other.cols),
            });
        }
        let mut c = Self::new(self.rows, other.cols)?;
        gemm_f64(
            self.rows,
            other.cols,
            self.cols,
            &self.data,
            &other.data,
            &mut c.data,
        );
        Ok(c)
    }

    pub fn add(&self, other: &Matrix) -> Result<Self> {
        self.zip_with(other, "add", |a, b| a + b)
    }

    pub fn subtract(&self, other: &Matrix) -> Result<Self> {
        self.zip_with(other, "subtract", |a, b| a - b)
    }

    /// Hadamard (entrywise) product.
    pub fn elementwise_multiply(&self, other: &Matrix) -> Result<Self> {
        self.zip_with(other, "elementwise_multiply", |a, b| a * b)
    }

    pub fn scale(&self, scalar: f64) -> Result<Self> {
        self.apply(|v| v * scalar)
    }

    pub fn add_scalar(&self, scalar: f64) -> Result<Self> {
        self.apply(|v| v + scalar)
    }

    /// Entrywise application of a unary function.
    pub fn apply<F: Fn(f64) -> f64>(&self, f: F) -> Result<Self> {
        let mut out = Self::new(self.rows, self.cols)?;
        for (o, &v) in out.data.iter_mut().zip(&self.data) {
            *o = f(v);
        }
        Ok(out)
    }

    /// Add the `rows x 1` column `col` to every column of `self`.
    pub fn add_column(&self, col: &Matrix) -> Result<Self> {
        if col.rows != self.rows || col.cols != 1 {
            return Err(Error::shape("add_column", (self.rows, 1), col.shape()));
        }
        let mut out = Self::new(self.rows, self.cols)?;
        for i in 0..self.rows {
            let b = col.data[i];
            let start = i * self.cols;
            for j in 0..self.cols {
                out.data[start + j] = self.data[start + j] + b;
            }
        }
        Ok(out)
    }

    /// Row sums as a `rows x 1` column.
    pub fn sum_columns(&self) -> Result<Self> {
        let mut out = Self::new(self.rows, 1)?;
        for i in 0..self.rows {
            out.data[i] = self.row(i).iter().sum();
        }
        Ok(out)
    }

    fn zip_with<F: Fn(f64, f64) -> f64>(
        &self,
        other: &Matrix,
        op: &'static str,
        f: F,
    ) -> Result<Self> {
        if self.shape() != other.shape() {
            return Err(Error::shape(op, self.shape(), other.shape()));
        }
        let mut out = Self::new(self.rows, self.cols)?;
        for ((o, &a), &b) in out.data.iter_mut().zip(&self.data).zip(&other.data) {
            *o = f(a, b);
        }
        Ok(out)
    }
}

/// `seed` offset by the current wall-clock nanoseconds.
pub(crate) fn time_mixed_seed(seed: u64) -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    nanos.wrapping_add(seed)
}

/// Fixed-precision grid, one row per line.
impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for i in 0..self.rows {
            for v in self.row(i) {
                write!(f, "{v:.2}\t")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

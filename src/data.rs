//! Supervised examples as column-vector pairs.
//!
//! Each example is an `(input_dim x 1)` input and a `(target_dim x 1)` target, ready to
//! hand to [`crate::Mlp::train`].

use crate::{Error, Matrix, Result};

#[derive(Debug, Clone)]
pub struct Dataset {
    inputs: Vec<Matrix>,
    targets: Vec<Matrix>,
    input_dim: usize,
    target_dim: usize,
}

impl Dataset {
    /// Start an empty dataset with fixed per-example widths.
    pub fn new(input_dim: usize, target_dim: usize) -> Result<Self> {
        if input_dim == 0 || target_dim == 0 {
            return Err(Error::InvalidData(format!(
                "input_dim and target_dim must be > 0, got {input_dim} and {target_dim}"
            )));
        }
        Ok(Self {
            inputs: Vec::new(),
            targets: Vec::new(),
            input_dim,
            target_dim,
        })
    }

    /// Build a dataset from per-sample rows.
    ///
    /// Every input row must share one length, and every target row another.
    pub fn from_rows(inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> Result<Self> {
        if inputs.len() != targets.len() {
            return Err(Error::InvalidData(format!(
                "inputs/targets length mismatch: {} vs {}",
                inputs.len(),
                targets.len()
            )));
        }
        let input_dim = inputs.first().map(Vec::len).unwrap_or(0);
        let target_dim = targets.first().map(Vec::len).unwrap_or(0);

        let mut data = Self::new(input_dim, target_dim)?;
        for (x, t) in inputs.iter().zip(targets) {
            data.push(Matrix::column(x)?, Matrix::column(t)?)?;
        }
        Ok(data)
    }

    /// Append one example. Both matrices must be columns of the dataset's widths.
    pub fn push(&mut self, input: Matrix, target: Matrix) -> Result<()> {
        if input.shape() != (self.input_dim, 1) {
            return Err(Error::InvalidData(format!(
                "example {} input is {}x{}, expected {}x1",
                self.len(),
                input.rows(),
                input.cols(),
                self.input_dim
            )));
        }
        if target.shape() != (self.target_dim, 1) {
            return Err(Error::InvalidData(format!(
                "example {} target is {}x{}, expected {}x1",
                self.len(),
                target.rows(),
                target.cols(),
                self.target_dim
            )));
        }
        self.inputs.push(input);
        self.targets.push(target);
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    #[inline]
    pub fn target_dim(&self) -> usize {
        self.target_dim
    }

    /// The `idx`-th `(input, target)` pair. Panics if `idx >= len`.
    #[inline]
    pub fn example(&self, idx: usize) -> (&Matrix, &Matrix) {
        (&self.inputs[idx], &self.targets[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Matrix, &Matrix)> {
        self.inputs.iter().zip(&self.targets)
    }
}

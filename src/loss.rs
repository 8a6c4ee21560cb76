//! Squared-error losses.
//!
//! The training rule in [`crate::Mlp`] is gradient descent on
//! [`sum_squared_error`]; these helpers are for reporting and evaluation.

use crate::{Error, Matrix, Result};

/// `0.5 * sum((target - pred)^2)`.
pub fn sum_squared_error(pred: &Matrix, target: &Matrix) -> Result<f64> {
    check_shapes("sum_squared_error", pred, target)?;

    let mut sum_sq = 0.0_f64;
    for (&y, &t) in pred.as_slice().iter().zip(target.as_slice()) {
        let diff = t - y;
        sum_sq += diff * diff;
    }
    Ok(0.5 * sum_sq)
}

/// Mean of `(target - pred)^2` over all entries.
pub fn mse(pred: &Matrix, target: &Matrix) -> Result<f64> {
    let half_sum = sum_squared_error(pred, target)?;
    Ok(2.0 * half_sum / pred.len() as f64)
}

fn check_shapes(op: &'static str, pred: &Matrix, target: &Matrix) -> Result<()> {
    if pred.shape() != target.shape() {
        return Err(Error::shape(op, pred.shape(), target.shape()));
    }
    Ok(())
}

//! Activation functions.
//!
//! A layer computes a pre-activation value `z = W x + b` and then applies an
//! activation function element-wise: `y = activation(z)`.
//!
//! Layers cache the *post-activation* outputs `y`, so derivatives are expressed in
//! terms of `y` (e.g. sigmoid: `y * (1 - y)`). New nonlinearities plug in by
//! implementing [`Activation`]; layers and networks only see the trait.

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use crate::{Error, Result};

/// Element-wise activation: a scalar function paired with its derivative.
pub trait Activation: Any + Debug + Send + Sync {
    /// Stable name, used by model serialization.
    fn name(&self) -> &'static str;

    fn apply(&self, x: f64) -> f64;

    /// Derivative with respect to the input, expressed in terms of the output `y = apply(x)`.
    fn derivative(&self, y: f64) -> f64;

    /// Optional scalar parameter (e.g. leaky ReLU slope).
    fn param(&self) -> Option<f64> {
        None
    }

    /// Validate activation parameters.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sigmoid;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tanh;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Relu;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeakyRelu {
    pub alpha: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Identity;

impl Activation for Sigmoid {
    fn name(&self) -> &'static str {
        "sigmoid"
    }

    #[inline]
    fn apply(&self, x: f64) -> f64 {
        sigmoid(x)
    }

    #[inline]
    fn derivative(&self, y: f64) -> f64 {
        y * (1.0 - y)
    }
}

impl Activation for Tanh {
    fn name(&self) -> &'static str {
        "tanh"
    }

    #[inline]
    fn apply(&self, x: f64) -> f64 {
        x.tanh()
    }

    #[inline]
    fn derivative(&self, y: f64) -> f64 {
        1.0 - y * y
    }
}

impl Activation for Relu {
    fn name(&self) -> &'static str {
        "relu"
    }

    #[inline]
    fn apply(&self, x: f64) -> f64 {
        x.max(0.0)
    }

    #[inline]
    fn derivative(&self, y: f64) -> f64 {
        if y > 0.0 { 1.0 } else { 0.0 }
    }
}

impl Activation for LeakyRelu {
    fn name(&self) -> &'static str {
        "leaky_relu"
    }

    #[inline]
    fn apply(&self, x: f64) -> f64 {
        if x > 0.0 { x } else { self.alpha * x }
    }

    #[inline]
    fn derivative(&self, y: f64) -> f64 {
        if y > 0.0 { 1.0 } else { self.alpha }
    }

    fn param(&self) -> Option<f64> {
        Some(self.alpha)
    }

    fn validate(&self) -> Result<()> {
        if !(self.alpha.is_finite() && self.alpha >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "leaky ReLU alpha must be finite and >= 0, got {}",
                self.alpha
            )));
        }
        Ok(())
    }
}

impl Activation for Identity {
    fn name(&self) -> &'static str {
        "identity"
    }

    #[inline]
    fn apply(&self, x: f64) -> f64 {
        x
    }

    #[inline]
    fn derivative(&self, _y: f64) -> f64 {
        1.0
    }
}

/// Logistic sigmoid `1 / (1 + e^-x)`, numerically stable for large `|x|`.
///
/// The result lies strictly inside `(0, 1)` while `e^-|x|` is representable next to 1.0
/// (roughly `|x| < 36`). Beyond that it rounds to exactly `1.0` for positive `x` and
/// decays towards `0.0` for negative `x`, so the output is always in `[0, 1]` and never NaN.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

/// Sigmoid derivative with respect to its input: `sigmoid(x) * (1 - sigmoid(x))`.
#[inline]
pub fn sigmoid_derivative(x: f64) -> f64 {
    let s = sigmoid(x);
    s * (1.0 - s)
}

/// Shared handle to the default activation.
pub fn default_activation() -> Arc<dyn Activation> {
    Arc::new(Sigmoid)
}

/// Resolve a built-in activation by name (as written by [`Activation::name`]).
pub fn from_name(name: &str, param: Option<f64>) -> Result<Arc<dyn Activation>> {
    let act: Arc<dyn Activation> = match name {
        "sigmoid" => Arc::new(Sigmoid),
        "tanh" => Arc::new(Tanh),
        "relu" => Arc::new(Relu),
        "identity" => Arc::new(Identity),
        "leaky_relu" => {
            let alpha = param.ok_or_else(|| {
                Error::InvalidConfig("leaky_relu requires an alpha parameter".to_owned())
            })?;
            Arc::new(LeakyRelu { alpha })
        }
        other => {
            return Err(Error::InvalidConfig(format!(
                "unknown activation {other:?}"
            )));
        }
    };
    act.validate()?;
    Ok(act)
}

/// Resolve `act` to the built-in it stands for, if any.
///
/// Only succeeds when `act` *is* a built-in (same concrete type and parameter); a
/// user-defined activation that merely reuses a built-in name is rejected.
pub fn builtin_for(act: &dyn Activation) -> Result<Arc<dyn Activation>> {
    let resolved = from_name(act.name(), act.param())?;
    if act.type_id() != (*resolved).type_id() {
        return Err(Error::InvalidConfig(format!(
            "activation {:?} is not the built-in {:?}",
            act,
            act.name()
        )));
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn sigmoid_stays_in_open_unit_interval() {
        for &x in &[-700.0, -36.0, -30.0, -5.0, -0.1, 0.0, 0.1, 5.0, 30.0, 36.0] {
            let y = sigmoid(x);
            assert!(y > 0.0 && y < 1.0, "sigmoid({x}) = {y}");
        }
        assert_abs_diff_eq!(sigmoid(0.0), 0.5);
    }

    #[test]
    fn sigmoid_saturates_to_closed_unit_interval() {
        for &x in &[-1e308, -800.0, 40.0, 800.0, 1e308, f64::MAX, f64::MIN] {
            let y = sigmoid(x);
            assert!((0.0..=1.0).contains(&y), "sigmoid({x}) = {y}");
        }
        assert_eq!(sigmoid(40.0), 1.0);
        assert_eq!(sigmoid(-800.0), 0.0);
    }

    #[test]
    fn sigmoid_derivative_matches_closed_form() {
        for &x in &[-3.0, -0.5, 0.0, 0.7, 2.0] {
            let s = sigmoid(x);
            assert_abs_diff_eq!(sigmoid_derivative(x), s * (1.0 - s), epsilon = 1e-12);
            assert_abs_diff_eq!(Sigmoid.derivative(s), sigmoid_derivative(x), epsilon = 1e-12);
        }
        assert_abs_diff_eq!(sigmoid_derivative(0.0), 0.25);
    }

    #[test]
    fn derivatives_match_finite_differences() {
        let acts: [Arc<dyn Activation>; 3] =
            [Arc::new(Sigmoid), Arc::new(Tanh), Arc::new(Identity)];
        let eps = 1e-6;
        for act in &acts {
            for &x in &[-1.3, -0.2, 0.4, 1.1] {
                let numeric = (act.apply(x + eps) - act.apply(x - eps)) / (2.0 * eps);
                let analytic = act.derivative(act.apply(x));
                assert_abs_diff_eq!(analytic, numeric, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn relu_and_leaky_relu_shapes() {
        assert_eq!(Relu.apply(-2.0), 0.0);
        assert_eq!(Relu.apply(3.0), 3.0);
        assert_eq!(Relu.derivative(0.0), 0.0);
        assert_eq!(Relu.derivative(1.0), 1.0);

        let act = LeakyRelu { alpha: 0.1 };
        assert_abs_diff_eq!(act.apply(-2.0), -0.2);
        assert_eq!(act.apply(3.0), 3.0);
        assert_eq!(act.derivative(-0.2), 0.1);
        assert_eq!(act.derivative(3.0), 1.0);
    }

    #[test]
    fn leaky_relu_alpha_must_be_finite_and_non_negative() {
        assert!(LeakyRelu { alpha: f64::NAN }.validate().is_err());
        assert!(LeakyRelu { alpha: -0.1 }.validate().is_err());
        assert!(LeakyRelu { alpha: 0.1 }.validate().is_ok());
    }

    #[test]
    fn from_name_resolves_builtins() {
        for name in ["sigmoid", "tanh", "relu", "identity"] {
            assert_eq!(from_name(name, None).unwrap().name(), name);
        }
        let leaky = from_name("leaky_relu", Some(0.2)).unwrap();
        assert_eq!(leaky.param(), Some(0.2));
        assert!(from_name("leaky_relu", None).is_err());
        assert!(from_name("softsign", None).is_err());
    }

    #[derive(Debug)]
    struct Shifted;

    impl Activation for Shifted {
        fn name(&self) -> &'static str {
            "sigmoid"
        }

        fn apply(&self, x: f64) -> f64 {
            x + 10.0
        }

        fn derivative(&self, _y: f64) -> f64 {
            1.0
        }
    }

    #[test]
    fn builtin_for_rejects_impostors() {
        assert_eq!(builtin_for(&Sigmoid).unwrap().name(), "sigmoid");
        assert_eq!(builtin_for(&LeakyRelu { alpha: 0.3 }).unwrap().param(), Some(0.3));

        let shared: Arc<dyn Activation> = Arc::new(Tanh);
        assert_eq!(builtin_for(shared.as_ref()).unwrap().name(), "tanh");

        assert!(builtin_for(&Shifted).is_err());
    }
}

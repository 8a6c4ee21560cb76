//! Model builder.
//!
//! `MlpBuilder` makes the model structure explicit (layer widths + activations) and
//! picks a weight initializer per activation unless one is set:
//!
//! - `relu` / `leaky_relu`: He/Kaiming
//! - everything else: uniform `[-1, 1)`
//!
//! `Mlp::new_with_seed` remains the shortcut for an all-sigmoid network.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::matrix::time_mixed_seed;
use crate::{Activation, Error, Init, Layer, Mlp, Result};

#[derive(Debug, Clone)]
struct LayerSpec {
    out_dim: usize,
    activation: Arc<dyn Activation>,
    init: Option<Init>,
}

/// Builder for an `Mlp`.
///
/// Example:
///
/// ```rust
/// use dense_mlp::MlpBuilder;
/// use dense_mlp::activation::{Relu, Sigmoid};
///
/// # fn main() -> dense_mlp::Result<()> {
/// let mlp = MlpBuilder::new(2)?
///     .add_layer(8, Relu)?
///     .add_layer(1, Sigmoid)?
///     .build_with_seed(0)?;
/// assert_eq!(mlp.layer_sizes(), &[2, 8, 1]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MlpBuilder {
    input_dim: usize,
    layers: Vec<LayerSpec>,
}

impl MlpBuilder {
    /// Start building an MLP that accepts inputs with `input_dim` rows.
    pub fn new(input_dim: usize) -> Result<Self> {
        if input_dim == 0 {
            return Err(Error::InvalidConstruction(
                "input_dim must be > 0".to_owned(),
            ));
        }
        Ok(Self {
            input_dim,
            layers: Vec::new(),
        })
    }

    /// Convenience constructor from a sizes list + activations.
    ///
    /// `sizes` includes input and output widths, so its length must be at least 2.
    /// `activations` must have length `sizes.len() - 1`.
    pub fn from_sizes(sizes: &[usize], activations: &[Arc<dyn Activation>]) -> Result<Self> {
        crate::mlp::validate_sizes(sizes)?;
        if activations.len() != sizes.len() - 1 {
            return Err(Error::InvalidConstruction(format!(
                "activations length {} does not match sizes.len() - 1 ({})",
                activations.len(),
                sizes.len() - 1
            )));
        }

        let mut b = Self::new(sizes[0])?;
        for (&out_dim, act) in sizes[1..].iter().zip(activations) {
            b = b.add_shared_layer(out_dim, Arc::clone(act), None)?;
        }
        Ok(b)
    }

    /// Add a dense layer with `out_dim` outputs.
    pub fn add_layer<A: Activation + 'static>(self, out_dim: usize, activation: A) -> Result<Self> {
        self.add_shared_layer(out_dim, Arc::new(activation), None)
    }

    /// Add a dense layer with an explicit initializer.
    pub fn add_layer_with_init<A: Activation + 'static>(
        self,
        out_dim: usize,
        activation: A,
        init: Init,
    ) -> Result<Self> {
        self.add_shared_layer(out_dim, Arc::new(activation), Some(init))
    }

    /// Add a dense layer that shares an existing activation handle.
    pub fn add_shared_layer(
        mut self,
        out_dim: usize,
        activation: Arc<dyn Activation>,
        init: Option<Init>,
    ) -> Result<Self> {
        if out_dim == 0 {
            return Err(Error::InvalidConstruction(
                "layer out_dim must be > 0".to_owned(),
            ));
        }
        activation.validate()?;

        self.layers.push(LayerSpec {
            out_dim,
            activation,
            init,
        });
        Ok(self)
    }

    /// Build using a deterministic seed.
    pub fn build_with_seed(self, seed: u64) -> Result<Mlp> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.build_with_rng(&mut rng)
    }

    /// Build from `seed` mixed with the wall-clock time (not reproducible).
    pub fn build_with_time_seed(self, seed: u64) -> Result<Mlp> {
        self.build_with_seed(time_mixed_seed(seed))
    }

    /// Build using the provided RNG.
    pub fn build_with_rng<R: Rng + ?Sized>(self, rng: &mut R) -> Result<Mlp> {
        if self.layers.is_empty() {
            return Err(Error::InvalidConstruction(
                "mlp must have at least one layer".to_owned(),
            ));
        }

        let mut layers = Vec::with_capacity(self.layers.len());
        let mut in_dim = self.input_dim;
        for spec in self.layers {
            let init = spec
                .init
                .unwrap_or_else(|| default_init_for_activation(spec.activation.as_ref()));
            let layer = Layer::new_with_rng(in_dim, spec.out_dim, init, spec.activation, rng)?;
            layers.push(layer);
            in_dim = spec.out_dim;
        }

        Mlp::from_layers(layers)
    }
}

#[inline]
fn default_init_for_activation(act: &dyn Activation) -> Init {
    match act.name() {
        "relu" | "leaky_relu" => Init::He,
        _ => Init::Uniform,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::{LeakyRelu, Relu, Sigmoid, Tanh};

    #[test]
    fn builds_chained_layers_with_chosen_activations() {
        let mlp = MlpBuilder::new(3)
            .unwrap()
            .add_layer(5, Tanh)
            .unwrap()
            .add_layer(2, Sigmoid)
            .unwrap()
            .build_with_seed(0)
            .unwrap();
        assert_eq!(mlp.layer_sizes(), &[3, 5, 2]);
        assert_eq!(mlp.layers()[0].activation().name(), "tanh");
        assert_eq!(mlp.layers()[1].activation().name(), "sigmoid");
    }

    #[test]
    fn rejects_empty_and_degenerate_models() {
        assert!(MlpBuilder::new(0).is_err());
        assert!(MlpBuilder::new(2).unwrap().build_with_seed(0).is_err());
        assert!(MlpBuilder::new(2).unwrap().add_layer(0, Sigmoid).is_err());
        assert!(
            MlpBuilder::new(2)
                .unwrap()
                .add_layer(1, LeakyRelu { alpha: -1.0 })
                .is_err()
        );
    }

    #[test]
    fn from_sizes_checks_activation_count() {
        let sig: Arc<dyn Activation> = Arc::new(Sigmoid);
        assert!(MlpBuilder::from_sizes(&[2, 3, 1], &[Arc::clone(&sig)]).is_err());
        assert!(MlpBuilder::from_sizes(&[2], &[]).is_err());

        let mlp = MlpBuilder::from_sizes(&[2, 3, 1], &[Arc::clone(&sig), sig])
            .unwrap()
            .build_with_seed(1)
            .unwrap();
        assert_eq!(mlp.layers().len(), 2);
    }

    #[test]
    fn relu_layers_default_to_he_init() {
        let mlp = MlpBuilder::new(50)
            .unwrap()
            .add_layer(10, Relu)
            .unwrap()
            .build_with_seed(0)
            .unwrap();
        let limit = (6.0_f64 / 50.0).sqrt();
        let layer = &mlp.layers()[0];
        assert!(layer.weights().as_slice().iter().all(|w| w.abs() <= limit));
        assert!(layer.biases().as_slice().iter().all(|&b| b == 0.0));
    }
}

use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::activation::default_activation;
use crate::matrix::time_mixed_seed;
use crate::{Activation, Error, Init, Layer, Matrix, Result, loss};

/// Where a network stands in the feedforward -> backpropagate -> update cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No usable forward pass (fresh network, or the last pass failed).
    Constructed,
    FedForward,
    Backpropagated,
    Updated,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Constructed => "constructed",
            Phase::FedForward => "fed-forward",
            Phase::Backpropagated => "backpropagated",
            Phase::Updated => "updated",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully-connected feedforward network.
///
/// The input "layer" is implicit: `layer_sizes[0]` is the input width and each of the
/// `layer_sizes.len() - 1` [`Layer`]s maps `layer_sizes[i]` to `layer_sizes[i + 1]`.
///
/// Training is the explicit sequence [`Mlp::feedforward`] -> [`Mlp::backpropagate`] ->
/// [`Mlp::update_weights`] (or [`Mlp::train`], which runs all three). Calls out of
/// order fail with [`Error::InvalidPhase`].
#[derive(Debug, Clone)]
pub struct Mlp {
    layer_sizes: Vec<usize>,
    layers: Vec<Layer>,
    phase: Phase,
    /// Shape of the inputs of the last successful feedforward.
    input_shape: Option<(usize, usize)>,
}

impl Mlp {
    /// Sigmoid network with uniform `[-1, 1)` parameters from a deterministic seed.
    pub fn new_with_seed(layer_sizes: &[usize], seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new_with_rng(layer_sizes, &mut rng)
    }

    /// Like [`Mlp::new_with_seed`], but `seed` is mixed with the wall-clock time, so
    /// two networks built from the same seed differ.
    pub fn new_with_time_seed(layer_sizes: &[usize], seed: u64) -> Result<Self> {
        Self::new_with_seed(layer_sizes, time_mixed_seed(seed))
    }

    pub fn new_with_rng<R: Rng + ?Sized>(layer_sizes: &[usize], rng: &mut R) -> Result<Self> {
        validate_sizes(layer_sizes)?;

        let activation: Arc<dyn Activation> = default_activation();
        let mut layers = Vec::with_capacity(layer_sizes.len() - 1);
        for w in layer_sizes.windows(2) {
            layers.push(Layer::new_with_rng(
                w[0],
                w[1],
                Init::Uniform,
                Arc::clone(&activation),
                rng,
            )?);
        }

        log::debug!("constructed mlp with layer sizes {layer_sizes:?}");
        Ok(Self {
            layer_sizes: layer_sizes.to_vec(),
            layers,
            phase: Phase::Constructed,
            input_shape: None,
        })
    }

    /// Assemble a network from pre-built layers.
    ///
    /// Adjacent layers must chain: `layers[i].num_outputs() == layers[i + 1].num_inputs()`.
    pub fn from_layers(layers: Vec<Layer>) -> Result<Self> {
        let first = layers.first().ok_or_else(|| {
            Error::InvalidConstruction("mlp must have at least one layer".to_owned())
        })?;

        let mut layer_sizes = Vec::with_capacity(layers.len() + 1);
        layer_sizes.push(first.num_inputs());
        for (i, layer) in layers.iter().enumerate() {
            if layer.num_inputs() != layer_sizes[i] {
                return Err(Error::InvalidConstruction(format!(
                    "layer {i} num_inputs {} does not match previous num_outputs {}",
                    layer.num_inputs(),
                    layer_sizes[i]
                )));
            }
            layer_sizes.push(layer.num_outputs());
        }

        log::debug!("assembled mlp with layer sizes {layer_sizes:?}");
        Ok(Self {
            layer_sizes,
            layers,
            phase: Phase::Constructed,
            input_shape: None,
        })
    }

    /// Layer widths, input width first.
    #[inline]
    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    /// Number of entries in `layer_sizes` (one more than the number of layers).
    #[inline]
    pub fn num_layers(&self) -> usize {
        self.layer_sizes.len()
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.layer_sizes[0]
    }

    #[inline]
    pub fn output_dim(&self) -> usize {
        self.layer_sizes[self.layer_sizes.len() - 1]
    }

    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[inline]
    pub fn layer(&self, idx: usize) -> Option<&Layer> {
        self.layers.get(idx)
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Forward pass, left to right.
    ///
    /// `inputs` is `(input_dim, batch)`, usually a single column. Every layer's
    /// `net_inputs`/`outputs` are replaced. Returns an owned copy of the final outputs.
    pub fn feedforward(&mut self, inputs: &Matrix) -> Result<Matrix> {
        if inputs.rows() != self.input_dim() {
            return Err(Error::shape(
                "feedforward",
                (self.input_dim(), inputs.cols()),
                inputs.shape(),
            ));
        }

        self.phase = Phase::Constructed;
        self.input_shape = None;

        for idx in 0..self.layers.len() {
            // The previous layer's outputs feed the current (mutably borrowed) layer.
            let (done, rest) = self.layers.split_at_mut(idx);
            let input = layer_input(done, inputs, "feedforward")?;
            rest[0].forward(input)?;
        }

        let output = self
            .layers
            .last()
            .and_then(Layer::outputs)
            .cloned()
            .ok_or(Error::InvalidPhase {
                op: "feedforward",
                phase: Phase::Constructed.as_str(),
            })?;

        self.phase = Phase::FedForward;
        self.input_shape = Some(inputs.shape());
        Ok(output)
    }

    /// Compute every layer's `delta`, right to left.
    ///
    /// The output layer uses `targets - outputs`; each hidden layer uses
    /// `transpose(next.weights) · next.delta`. Must follow [`Mlp::feedforward`], and
    /// `targets` must have the shape of its result.
    pub fn backpropagate(&mut self, targets: &Matrix) -> Result<()> {
        self.expect_phase("backpropagate", Phase::FedForward)?;

        let result = self.backpropagate_inner(targets);
        self.phase = match &result {
            Ok(()) => Phase::Backpropagated,
            // A shape error leaves the forward pass intact.
            Err(Error::ShapeMismatch { .. }) => Phase::FedForward,
            Err(_) => Phase::Constructed,
        };
        result
    }

    fn backpropagate_inner(&mut self, targets: &Matrix) -> Result<()> {
        let last = self.layers.len() - 1;
        let outputs = self.layers[last].outputs().ok_or(Error::InvalidPhase {
            op: "backpropagate",
            phase: Phase::Constructed.as_str(),
        })?;
        if targets.shape() != outputs.shape() {
            return Err(Error::shape("backpropagate", outputs.shape(), targets.shape()));
        }

        let output_error = targets.subtract(outputs)?;
        self.layers[last].backward(&output_error)?;

        for idx in (0..last).rev() {
            let error = self.layers[idx + 1].propagated_error()?;
            self.layers[idx].backward(&error)?;
        }
        Ok(())
    }

    /// Apply the gradient step to every layer, left to right.
    ///
    /// `inputs` must be the matrix given to the preceding [`Mlp::feedforward`]; each
    /// later layer is fed the outputs cached for its predecessor during that pass.
    pub fn update_weights(&mut self, inputs: &Matrix, learning_rate: f64) -> Result<()> {
        self.expect_phase("update_weights", Phase::Backpropagated)?;
        validate_learning_rate(learning_rate)?;

        if self.input_shape != Some(inputs.shape()) {
            let expected = self.input_shape.unwrap_or((self.input_dim(), 1));
            return Err(Error::shape("update_weights", expected, inputs.shape()));
        }

        let mut result = Ok(());
        for idx in 0..self.layers.len() {
            let (done, rest) = self.layers.split_at_mut(idx);
            result = layer_input(done, inputs, "update_weights")
                .and_then(|input| rest[0].update(input, learning_rate));
            if result.is_err() {
                break;
            }
        }

        self.phase = if result.is_ok() {
            Phase::Updated
        } else {
            Phase::Constructed
        };
        result
    }

    /// One gradient step on one example (or one batch of columns).
    ///
    /// Runs feedforward, backpropagate and update_weights, and returns the squared
    /// error `0.5 * sum((targets - prediction)^2)` of the prediction it trained on.
    pub fn train(
        &mut self,
        inputs: &Matrix,
        targets: &Matrix,
        learning_rate: f64,
    ) -> Result<f64> {
        validate_learning_rate(learning_rate)?;
        if targets.shape() != (self.output_dim(), inputs.cols()) {
            return Err(Error::shape(
                "train",
                (self.output_dim(), inputs.cols()),
                targets.shape(),
            ));
        }

        let prediction = self.feedforward(inputs)?;
        self.backpropagate(targets)?;
        self.update_weights(inputs, learning_rate)?;

        let loss = loss::sum_squared_error(&prediction, targets)?;
        log::trace!("train step: loss={loss}");
        Ok(loss)
    }

    /// Inference without touching any layer buffer or the phase.
    pub fn predict(&self, inputs: &Matrix) -> Result<Matrix> {
        if inputs.rows() != self.input_dim() {
            return Err(Error::shape(
                "predict",
                (self.input_dim(), inputs.cols()),
                inputs.shape(),
            ));
        }

        let mut current = inputs.copy();
        for layer in &self.layers {
            current = layer.infer(&current)?;
        }
        Ok(current)
    }

    /// Drop every layer's pass buffers and return to [`Phase::Constructed`].
    pub fn clear_buffers(&mut self) {
        for layer in &mut self.layers {
            layer.clear_buffers();
        }
        self.phase = Phase::Constructed;
        self.input_shape = None;
    }

    fn expect_phase(&self, op: &'static str, expected: Phase) -> Result<()> {
        if self.phase != expected {
            return Err(Error::InvalidPhase {
                op,
                phase: self.phase.as_str(),
            });
        }
        Ok(())
    }
}

/// Input of the layer that follows `done`: the network inputs, or the last cached outputs.
fn layer_input<'a>(
    done: &'a [Layer],
    inputs: &'a Matrix,
    op: &'static str,
) -> Result<&'a Matrix> {
    match done.last() {
        None => Ok(inputs),
        Some(prev) => prev.outputs().ok_or(Error::InvalidPhase {
            op,
            phase: Phase::Constructed.as_str(),
        }),
    }
}

pub(crate) fn validate_sizes(layer_sizes: &[usize]) -> Result<()> {
    if layer_sizes.len() < 2 {
        return Err(Error::InvalidConstruction(format!(
            "an mlp needs at least 2 layer sizes (input and output), got {}",
            layer_sizes.len()
        )));
    }
    if layer_sizes.contains(&0) {
        return Err(Error::InvalidConstruction(
            "all layer sizes must be > 0".to_owned(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_learning_rate(learning_rate: f64) -> Result<()> {
    if !(learning_rate.is_finite() && learning_rate > 0.0) {
        return Err(Error::InvalidConfig(format!(
            "learning rate must be finite and > 0, got {learning_rate}"
        )));
    }
    Ok(())
}

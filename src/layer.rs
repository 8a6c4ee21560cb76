use std::sync::Arc;

use rand::Rng;
use rand::distributions::{Distribution, Uniform};

use crate::{Activation, Error, Matrix, Result};

/// Weight initialization policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Init {
    /// Weights and biases uniform in `[-1, 1)`.
    #[default]
    Uniform,
    /// Xavier/Glorot uniform weights: U(-a, a), a = sqrt(6 / (in + out)); zero biases.
    Xavier,
    /// He/Kaiming uniform weights: U(-a, a), a = sqrt(6 / in); zero biases.
    He,
}

/// One fully-connected layer: `outputs = activation(weights · x + biases)`.
///
/// Besides its parameters, a layer keeps the buffers of the most recent pass:
/// `net_inputs` and `outputs` (written by [`Layer::forward`]) and `delta`
/// (written by [`Layer::backward`]). Each pass replaces the previous contents.
#[derive(Debug, Clone)]
pub struct Layer {
    num_inputs: usize,
    num_outputs: usize,
    /// Shape `(num_outputs, num_inputs)`.
    weights: Matrix,
    /// Shape `(num_outputs, 1)`.
    biases: Matrix,
    activation: Arc<dyn Activation>,

    net_inputs: Option<Matrix>,
    outputs: Option<Matrix>,
    delta: Option<Matrix>,
}

impl Layer {
    /// Allocate and initialize a layer.
    ///
    /// Weights are drawn before biases from the same generator, so the two never
    /// share a sequence.
    pub fn new_with_rng<R: Rng + ?Sized>(
        num_inputs: usize,
        num_outputs: usize,
        init: Init,
        activation: Arc<dyn Activation>,
        rng: &mut R,
    ) -> Result<Self> {
        activation.validate()?;

        let mut weights = Matrix::new(num_outputs, num_inputs)?;
        let mut biases = Matrix::new(num_outputs, 1)?;

        match init {
            Init::Uniform => {
                weights.randomize(rng);
                biases.randomize(rng);
            }
            Init::Xavier | Init::He => {
                let fan = if init == Init::Xavier {
                    (num_inputs + num_outputs) as f64
                } else {
                    num_inputs as f64
                };
                let limit = (6.0 / fan).sqrt();
                let dist = Uniform::new(-limit, limit);
                weights.fill_with(|| dist.sample(rng));
            }
        }

        Ok(Self::assemble(num_inputs, num_outputs, weights, biases, activation))
    }

    /// Build a layer from explicit parameters.
    ///
    /// `weights` must be `(num_outputs, num_inputs)` and `biases` `(num_outputs, 1)`,
    /// with finite entries.
    pub fn from_parts(
        num_inputs: usize,
        num_outputs: usize,
        activation: Arc<dyn Activation>,
        weights: Matrix,
        biases: Matrix,
    ) -> Result<Self> {
        activation.validate()?;

        if weights.shape() != (num_outputs, num_inputs) {
            return Err(Error::shape(
                "layer weights",
                (num_outputs, num_inputs),
                weights.shape(),
            ));
        }
        if biases.shape() != (num_outputs, 1) {
            return Err(Error::shape("layer biases", (num_outputs, 1), biases.shape()));
        }
        if weights.as_slice().iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidData(
                "weights must contain only finite values".to_owned(),
            ));
        }
        if biases.as_slice().iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidData(
                "biases must contain only finite values".to_owned(),
            ));
        }

        Ok(Self::assemble(num_inputs, num_outputs, weights, biases, activation))
    }

    fn assemble(
        num_inputs: usize,
        num_outputs: usize,
        weights: Matrix,
        biases: Matrix,
        activation: Arc<dyn Activation>,
    ) -> Self {
        Self {
            num_inputs,
            num_outputs,
            weights,
            biases,
            activation,
            net_inputs: None,
            outputs: None,
            delta: None,
        }
    }

    #[inline]
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    #[inline]
    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    #[inline]
    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    #[inline]
    pub fn biases(&self) -> &Matrix {
        &self.biases
    }

    #[inline]
    pub fn activation(&self) -> &Arc<dyn Activation> {
        &self.activation
    }

    /// Pre-activation values of the last forward pass.
    #[inline]
    pub fn net_inputs(&self) -> Option<&Matrix> {
        self.net_inputs.as_ref()
    }

    /// Post-activation values of the last forward pass.
    #[inline]
    pub fn outputs(&self) -> Option<&Matrix> {
        self.outputs.as_ref()
    }

    /// Error signal of the last backward pass.
    #[inline]
    pub fn delta(&self) -> Option<&Matrix> {
        self.delta.as_ref()
    }

    /// Forward pass.
    ///
    /// Computes:
    /// - `net_inputs = weights · input + biases`
    /// - `outputs = activation(net_inputs)`
    ///
    /// `input` is `(num_inputs, batch)`; biases are broadcast over the batch columns.
    /// Any `delta` from an earlier pass is discarded.
    pub fn forward(&mut self, input: &Matrix) -> Result<&Matrix> {
        let net = self.affine(input)?;
        let outputs = self.activate(&net)?;

        self.net_inputs = Some(net);
        self.delta = None;
        Ok(&*self.outputs.insert(outputs))
    }

    /// Same computation as [`Layer::forward`] without touching the pass buffers.
    pub fn infer(&self, input: &Matrix) -> Result<Matrix> {
        self.activate(&self.affine(input)?)
    }

    fn affine(&self, input: &Matrix) -> Result<Matrix> {
        if input.rows() != self.num_inputs {
            return Err(Error::shape(
                "layer forward",
                (self.num_inputs, input.cols()),
                input.shape(),
            ));
        }
        self.weights.multiply(input)?.add_column(&self.biases)
    }

    fn activate(&self, net: &Matrix) -> Result<Matrix> {
        let act = &self.activation;
        net.apply(|z| act.apply(z))
    }

    /// Backward pass: `delta = error ∘ activation'(outputs)`.
    ///
    /// `error` is `target - outputs` for the output layer, or
    /// [`Layer::propagated_error`] of the next layer for a hidden one.
    pub fn backward(&mut self, error: &Matrix) -> Result<()> {
        let outputs = self.outputs.as_ref().ok_or(Error::InvalidPhase {
            op: "layer backward",
            phase: "no forward pass",
        })?;
        if error.shape() != outputs.shape() {
            return Err(Error::shape("layer backward", outputs.shape(), error.shape()));
        }

        let act = &self.activation;
        let grads = outputs.apply(|y| act.derivative(y))?;
        self.delta = Some(error.elementwise_multiply(&grads)?);
        Ok(())
    }

    /// Error handed to the previous layer: `transpose(weights) · delta`.
    pub fn propagated_error(&self) -> Result<Matrix> {
        let delta = self.delta.as_ref().ok_or(Error::InvalidPhase {
            op: "propagated_error",
            phase: "no backward pass",
        })?;
        self.weights.transpose()?.multiply(delta)
    }

    /// Gradient step using the cached `delta`:
    /// - `weights += lr * (delta · transpose(input))`
    /// - `biases += lr * delta` (summed over batch columns)
    ///
    /// `input` must be the matrix this layer consumed in the last forward pass.
    pub fn update(&mut self, input: &Matrix, learning_rate: f64) -> Result<()> {
        let delta = self.delta.as_ref().ok_or(Error::InvalidPhase {
            op: "layer update",
            phase: "no backward pass",
        })?;
        if input.rows() != self.num_inputs || input.cols() != delta.cols() {
            return Err(Error::shape(
                "layer update",
                (self.num_inputs, delta.cols()),
                input.shape(),
            ));
        }

        let weight_deltas = delta.multiply(&input.transpose()?)?.scale(learning_rate)?;
        let bias_deltas = delta.sum_columns()?.scale(learning_rate)?;

        self.weights = self.weights.add(&weight_deltas)?;
        self.biases = self.biases.add(&bias_deltas)?;
        Ok(())
    }

    /// Drop the per-pass buffers.
    pub fn clear_buffers(&mut self) {
        self.net_inputs = None;
        self.outputs = None;
        self.delta = None;
    }
}

//! Model serialization/deserialization (feature: `serde`).
//!
//! This module defines a versioned, stable on-disk format for `Mlp`.
//!
//! - Internal `Mlp`/`Layer` structs are not serialized directly; the format only
//!   carries parameters, never the per-pass buffers.
//! - Deserialization validates dimensions, parameter lengths, layer chaining and
//!   that all parameters are finite.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Error, Layer, Matrix, Mlp, Result, activation};

pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedMlp {
    pub format_version: u32,
    pub layers: Vec<SerializedLayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedLayer {
    pub in_dim: usize,
    pub out_dim: usize,
    pub activation: SerializedActivation,
    /// Row-major (out_dim, in_dim).
    pub weights: Vec<f64>,
    pub biases: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedActivation {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
}

impl SerializedMlp {
    pub fn validate(&self) -> Result<()> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(Error::InvalidData(format!(
                "unsupported model format_version {}; expected {}",
                self.format_version, MODEL_FORMAT_VERSION
            )));
        }
        if self.layers.is_empty() {
            return Err(Error::InvalidData(
                "serialized model must have at least one layer".to_owned(),
            ));
        }

        for (i, layer) in self.layers.iter().enumerate() {
            layer.validate()?;

            if i > 0 {
                let prev_out = self.layers[i - 1].out_dim;
                if layer.in_dim != prev_out {
                    return Err(Error::InvalidData(format!(
                        "layer {i} in_dim {} does not match previous out_dim {}",
                        layer.in_dim, prev_out
                    )));
                }
            }
        }

        Ok(())
    }
}

impl SerializedLayer {
    fn validate(&self) -> Result<()> {
        if self.in_dim == 0 || self.out_dim == 0 {
            return Err(Error::InvalidData(format!(
                "layer dims must be > 0, got in_dim={} out_dim={}",
                self.in_dim, self.out_dim
            )));
        }

        let expected_w = self
            .in_dim
            .checked_mul(self.out_dim)
            .ok_or_else(|| Error::InvalidData("layer weight shape overflow".to_owned()))?;
        if self.weights.len() != expected_w {
            return Err(Error::InvalidData(format!(
                "weights length {} does not match out_dim * in_dim ({} * {})",
                self.weights.len(),
                self.out_dim,
                self.in_dim
            )));
        }
        if self.biases.len() != self.out_dim {
            return Err(Error::InvalidData(format!(
                "biases length {} does not match out_dim {}",
                self.biases.len(),
                self.out_dim
            )));
        }

        activation::from_name(&self.activation.kind, self.activation.alpha)
            .map_err(|e| Error::InvalidData(format!("invalid activation: {e}")))?;

        Ok(())
    }
}

impl TryFrom<&Mlp> for SerializedMlp {
    type Error = Error;

    fn try_from(model: &Mlp) -> std::result::Result<Self, Self::Error> {
        let layers = model
            .layers()
            .iter()
            .enumerate()
            .map(|(i, layer)| {
                SerializedLayer::try_from(layer)
                    .map_err(|e| Error::InvalidData(format!("layer {i} not serializable: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            format_version: MODEL_FORMAT_VERSION,
            layers,
        })
    }
}

/// Only built-in activations are stored, since loading resolves them by name.
impl TryFrom<&Layer> for SerializedLayer {
    type Error = Error;

    fn try_from(layer: &Layer) -> std::result::Result<Self, Self::Error> {
        let act = activation::builtin_for(layer.activation().as_ref())
            .map_err(|e| Error::InvalidData(format!("invalid activation: {e}")))?;
        Ok(Self {
            in_dim: layer.num_inputs(),
            out_dim: layer.num_outputs(),
            activation: SerializedActivation {
                kind: act.name().to_owned(),
                alpha: act.param(),
            },
            weights: layer.weights().as_slice().to_vec(),
            biases: layer.biases().as_slice().to_vec(),
        })
    }
}

impl TryFrom<SerializedMlp> for Mlp {
    type Error = Error;

    fn try_from(value: SerializedMlp) -> std::result::Result<Self, Self::Error> {
        value.validate()?;

        let mut layers = Vec::with_capacity(value.layers.len());
        for (i, layer) in value.layers.into_iter().enumerate() {
            let act = activation::from_name(&layer.activation.kind, layer.activation.alpha)?;
            let weights = Matrix::from_vec(layer.out_dim, layer.in_dim, layer.weights)?;
            let biases = Matrix::from_vec(layer.out_dim, 1, layer.biases)?;

            // Layer::from_parts performs shape validation and finiteness checks.
            let l = Layer::from_parts(layer.in_dim, layer.out_dim, act, weights, biases)
                .map_err(|e| Error::InvalidData(format!("layer {i} invalid: {e}")))?;
            layers.push(l);
        }

        Mlp::from_layers(layers)
    }
}

impl Mlp {
    /// Serialize the model to a pretty-printed JSON string.
    pub fn to_json_string_pretty(&self) -> Result<String> {
        let ser = SerializedMlp::try_from(self)?;
        serde_json::to_string_pretty(&ser)
            .map_err(|e| Error::InvalidData(format!("failed to serialize model: {e}")))
    }

    /// Serialize the model to a compact JSON string.
    pub fn to_json_string(&self) -> Result<String> {
        let ser = SerializedMlp::try_from(self)?;
        serde_json::to_string(&ser)
            .map_err(|e| Error::InvalidData(format!("failed to serialize model: {e}")))
    }

    /// Parse a model from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let ser: SerializedMlp = serde_json::from_str(s)
            .map_err(|e| Error::InvalidData(format!("failed to parse model json: {e}")))?;
        ser.try_into()
    }

    /// Save the model to a JSON file (pretty-printed).
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let s = self.to_json_string_pretty()?;
        let p = path.as_ref();
        std::fs::write(p, s)
            .map_err(|e| Error::InvalidData(format!("failed to write {}: {e}", p.display())))?;
        log::debug!("saved model to {}", p.display());
        Ok(())
    }

    /// Load a model from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let s = std::fs::read_to_string(p)
            .map_err(|e| Error::InvalidData(format!("failed to read {}: {e}", p.display())))?;
        Self::from_json_str(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Activation;
    use crate::activation::{Identity, LeakyRelu, Tanh};
    use std::sync::Arc;

    fn small_model() -> Mlp {
        let l1 = Layer::from_parts(
            2,
            3,
            Arc::new(Tanh),
            Matrix::from_vec(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap(),
            Matrix::column(&[0.1, 0.2, 0.3]).unwrap(),
        )
        .unwrap();
        let l2 = Layer::from_parts(
            3,
            1,
            Arc::new(LeakyRelu { alpha: 0.25 }),
            Matrix::from_vec(1, 3, vec![7.0, 8.0, 9.0]).unwrap(),
            Matrix::column(&[0.4]).unwrap(),
        )
        .unwrap();
        Mlp::from_layers(vec![l1, l2]).unwrap()
    }

    #[test]
    fn json_roundtrip_preserves_parameters_and_activations() {
        let mlp = small_model();
        let json = mlp.to_json_string_pretty().unwrap();
        assert!(json.contains("\"format_version\": 1"));
        assert!(json.contains("\"kind\": \"leaky_relu\""));

        let loaded = Mlp::from_json_str(&json).unwrap();
        assert_eq!(loaded.layer_sizes(), mlp.layer_sizes());
        for (a, b) in loaded.layers().iter().zip(mlp.layers()) {
            assert_eq!(a.weights(), b.weights());
            assert_eq!(a.biases(), b.biases());
            assert_eq!(a.activation().name(), b.activation().name());
            assert_eq!(a.activation().param(), b.activation().param());
        }
        assert_eq!(loaded.to_json_string().unwrap(), mlp.to_json_string().unwrap());
    }

    #[test]
    fn rejects_unknown_version() {
        let bad = r#"{"format_version":999,"layers":[]}"#;
        let err = Mlp::from_json_str(bad).unwrap_err();
        assert!(format!("{err}").contains("format_version"));
    }

    #[test]
    fn rejects_bad_shapes_and_activations() {
        let mut ser = SerializedMlp::try_from(&small_model()).unwrap();
        ser.layers[1].in_dim = 2;
        ser.layers[1].weights.pop();
        assert!(Mlp::try_from(ser).is_err());

        let mut ser = SerializedMlp::try_from(&small_model()).unwrap();
        ser.layers[0].activation.kind = "swish".to_owned();
        assert!(Mlp::try_from(ser).is_err());

        let mut ser = SerializedMlp::try_from(&small_model()).unwrap();
        ser.layers[0].biases.push(1.0);
        assert!(Mlp::try_from(ser).is_err());
    }

    #[derive(Debug)]
    struct Softsign;

    impl Activation for Softsign {
        fn name(&self) -> &'static str {
            "softsign"
        }

        fn apply(&self, x: f64) -> f64 {
            x / (1.0 + x.abs())
        }

        fn derivative(&self, y: f64) -> f64 {
            (1.0 - y.abs()).powi(2)
        }
    }

    /// Claims a built-in name but computes something else.
    #[derive(Debug)]
    struct OffsetSigmoid;

    impl Activation for OffsetSigmoid {
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

    fn single_layer(act: Arc<dyn Activation>) -> Mlp {
        let layer = Layer::from_parts(
            1,
            1,
            act,
            Matrix::column(&[0.0]).unwrap(),
            Matrix::column(&[0.0]).unwrap(),
        )
        .unwrap();
        Mlp::from_layers(vec![layer]).unwrap()
    }

    #[test]
    fn custom_activations_are_rejected_at_save_time() {
        let acts: [Arc<dyn Activation>; 2] = [Arc::new(Softsign), Arc::new(OffsetSigmoid)];
        for act in acts {
            let mlp = single_layer(act);
            assert!(matches!(mlp.to_json_string(), Err(Error::InvalidData(_))));
            assert!(matches!(mlp.to_json_string_pretty(), Err(Error::InvalidData(_))));
            assert!(SerializedMlp::try_from(&mlp).is_err());

            let path = std::env::temp_dir().join(format!(
                "dense_mlp_custom_{}_{}.json",
                mlp.layers()[0].activation().name(),
                std::process::id()
            ));
            assert!(mlp.save_json(&path).is_err());
            assert!(!path.exists());
        }
    }

    #[test]
    fn identity_activation_omits_alpha() {
        let layer = Layer::from_parts(
            1,
            1,
            Arc::new(Identity),
            Matrix::column(&[2.0]).unwrap(),
            Matrix::column(&[0.0]).unwrap(),
        )
        .unwrap();
        let json = Mlp::from_layers(vec![layer]).unwrap().to_json_string().unwrap();
        assert!(json.contains(r#""activation":{"kind":"identity"}"#));
    }
}

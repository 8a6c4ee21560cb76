//! A dense-matrix kernel and a multilayer perceptron trained by backpropagation.
//!
//! `dense-mlp` has two layers:
//!
//! - [`Matrix`]: a row-major `f64` matrix. Every operation returns a freshly owned
//!   result and reports shape violations as [`Error::ShapeMismatch`].
//! - [`Mlp`]: an ordered stack of fully-connected [`Layer`]s, each with its own
//!   [`Activation`], trained one gradient step at a time.
//!
//! # Training cycle
//!
//! A training step is `feedforward -> backpropagate -> update_weights`. The network
//! tracks where it is in that cycle ([`Phase`]) and rejects calls made out of order
//! with [`Error::InvalidPhase`]. [`Mlp::train`] runs the three in sequence.
//!
//! The update rule is `weights += lr * delta · inputᵀ`, `biases += lr * delta`, with
//! `delta` built from `target - output`: plain gradient descent on
//! `0.5 * sum((target - output)^2)` for a positive learning rate.
//!
//! # Shapes
//!
//! - Inputs and targets are column vectors (`width x 1`). A matrix with `B` columns is
//!   treated as a batch of `B` examples; biases broadcast across columns.
//! - Layer weights have shape `(num_outputs, num_inputs)`, biases `(num_outputs, 1)`.
//!
//! # Randomness
//!
//! Initialization draws uniform values from `[-1, 1)`. Seeded constructors
//! (`new_with_seed`, `build_with_seed`) are reproducible; the `*_time_seed`
//! variants mix the seed with the wall clock and are not.
//!
//! # Quick start
//!
//! ```rust
//! use dense_mlp::{Matrix, Mlp};
//!
//! # fn main() -> dense_mlp::Result<()> {
//! let mut mlp = Mlp::new_with_seed(&[2, 3, 1], 0)?;
//! let x = Matrix::column(&[1.0, 0.0])?;
//! let t = Matrix::column(&[1.0])?;
//!
//! for _ in 0..500 {
//!     mlp.train(&x, &t, 0.5)?;
//! }
//! let y = mlp.feedforward(&x)?;
//! assert!(y.as_slice()[0] > 0.8);
//! # Ok(())
//! # }
//! ```
//!
//! # Driving the cycle by hand
//!
//! ```rust
//! use dense_mlp::{Matrix, MlpBuilder, Phase};
//! use dense_mlp::activation::{Sigmoid, Tanh};
//!
//! # fn main() -> dense_mlp::Result<()> {
//! let mut mlp = MlpBuilder::new(3)?
//!     .add_layer(4, Tanh)?
//!     .add_layer(2, Sigmoid)?
//!     .build_with_seed(0)?;
//!
//! let x = Matrix::column(&[0.1, -0.2, 0.3])?;
//! let t = Matrix::column(&[0.0, 1.0])?;
//!
//! let _prediction = mlp.feedforward(&x)?;
//! mlp.backpropagate(&t)?;
//! mlp.update_weights(&x, 1e-2)?;
//! assert_eq!(mlp.phase(), Phase::Updated);
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod builder;
pub mod data;
pub mod error;
pub mod layer;
pub mod loss;
pub(crate) mod matmul;
pub mod matrix;
pub mod mlp;
pub mod train;

#[cfg(feature = "serde")]
pub mod serde_model;

pub use activation::Activation;
pub use builder::MlpBuilder;
pub use data::Dataset;
pub use error::{Error, Result};
pub use layer::{Init, Layer};
pub use matrix::Matrix;
pub use mlp::{Mlp, Phase};
pub use train::{FitConfig, FitReport, Shuffle};

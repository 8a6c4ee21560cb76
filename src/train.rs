use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::mlp::validate_learning_rate;
use crate::{Dataset, Error, Matrix, Mlp, Result, loss};

/// Example order within each epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shuffle {
    /// Dataset order.
    #[default]
    None,
    /// Reshuffled every epoch from a deterministic seed.
    Seeded(u64),
}

#[derive(Debug, Clone, Copy)]
pub struct FitConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    pub shuffle: Shuffle,
    /// Log the epoch loss every `log_every` epochs (0 disables).
    pub log_every: usize,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            epochs: 1_000,
            learning_rate: 0.5,
            shuffle: Shuffle::None,
            log_every: 0,
        }
    }
}

impl FitConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be > 0".to_owned()));
        }
        validate_learning_rate(self.learning_rate)
    }
}

#[derive(Debug, Clone)]
pub struct FitReport {
    /// Mean per-example `0.5 * sum((target - output)^2)` over the last epoch, each
    /// measured before that example's update (see [`loss::sum_squared_error`]).
    pub final_loss: f64,
    pub epochs: usize,
}

impl Mlp {
    /// Train with one [`Mlp::train`] step per example for `cfg.epochs` epochs.
    pub fn fit(&mut self, train: &Dataset, cfg: FitConfig) -> Result<FitReport> {
        cfg.validate()?;
        self.check_dataset(train)?;

        let mut order: Vec<usize> = (0..train.len()).collect();
        let mut rng = match cfg.shuffle {
            Shuffle::None => None,
            Shuffle::Seeded(seed) => Some(StdRng::seed_from_u64(seed)),
        };

        let mut epoch_loss = 0.0_f64;
        for epoch in 0..cfg.epochs {
            if let Some(rng) = rng.as_mut() {
                order.shuffle(rng);
            }

            epoch_loss = 0.0;
            for &idx in &order {
                let (input, target) = train.example(idx);
                epoch_loss += self.train(input, target, cfg.learning_rate)?;
            }
            epoch_loss /= train.len() as f64;

            if !epoch_loss.is_finite() {
                log::warn!("epoch {epoch}: training loss is not finite ({epoch_loss})");
            }
            if cfg.log_every > 0 && (epoch + 1) % cfg.log_every == 0 {
                log::info!("epoch {}/{}: loss={epoch_loss:.6}", epoch + 1, cfg.epochs);
            }
        }

        Ok(FitReport {
            final_loss: epoch_loss,
            epochs: cfg.epochs,
        })
    }

    /// Mean squared error over a dataset (inference only).
    pub fn evaluate_mse(&self, data: &Dataset) -> Result<f64> {
        self.check_dataset(data)?;

        let mut total = 0.0_f64;
        for (input, target) in data.iter() {
            let y = self.predict(input)?;
            total += loss::mse(&y, target)?;
        }
        Ok(total / data.len() as f64)
    }

    /// Predictions for every example, in dataset order.
    pub fn predict_all(&self, data: &Dataset) -> Result<Vec<Matrix>> {
        self.check_dataset(data)?;
        data.iter().map(|(input, _)| self.predict(input)).collect()
    }

    fn check_dataset(&self, data: &Dataset) -> Result<()> {
        if data.is_empty() {
            return Err(Error::InvalidData("dataset must not be empty".to_owned()));
        }
        if data.input_dim() != self.input_dim() {
            return Err(Error::InvalidData(format!(
                "dataset input_dim {} does not match model input_dim {}",
                data.input_dim(),
                self.input_dim()
            )));
        }
        if data.target_dim() != self.output_dim() {
            return Err(Error::InvalidData(format!(
                "dataset target_dim {} does not match model output_dim {}",
                data.target_dim(),
                self.output_dim()
            )));
        }
        Ok(())
    }
}

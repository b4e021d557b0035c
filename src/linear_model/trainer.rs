use super::{Adam, AdamConfig, LinearRegression};
use crate::error::{Error, Result};
use crate::{Matrix, Vector};
use log::{debug, info};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Starting point for the weights. The bias always starts at zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightInit {
    #[default]
    Zeros,
    /// Uniform in `±sqrt(6 / (n_features + 1))`, seeded.
    GlorotUniform { seed: u64 },
}

impl WeightInit {
    pub fn init(&self, n_features: usize) -> LinearRegression {
        match *self {
            WeightInit::Zeros => LinearRegression::zeros(n_features),
            WeightInit::GlorotUniform { seed } => {
                let limit = (6.0 / (n_features + 1) as f64).sqrt();
                let mut rng = StdRng::seed_from_u64(seed);
                let weights = Vector::random_using(n_features, Uniform::new(-limit, limit), &mut rng);
                LinearRegression::new(weights, 0.0)
            }
        }
    }
}

/// Result of a training run. The model is frozen from here on.
#[derive(Clone, Debug)]
pub struct TrainedModel {
    pub model: LinearRegression,
    /// Full-batch MSE measured before each epoch's update.
    pub loss_history: Vec<f64>,
}

impl TrainedModel {
    pub fn final_loss(&self) -> Option<f64> {
        self.loss_history.last().copied()
    }
}

/// Full-batch Adam descent on mean squared error for a fixed number of
/// epochs. There is no early stopping.
#[derive(Clone, Debug)]
pub struct GradientDescentTrainer {
    adam: AdamConfig,
    epochs: usize,
    init: WeightInit,
    log_every: usize,
}

impl GradientDescentTrainer {
    pub fn new() -> Self {
        Self {
            adam: AdamConfig::default(),
            epochs: 100,
            init: WeightInit::default(),
            log_every: 10,
        }
    }

    pub fn adam(mut self, adam: AdamConfig) -> Self {
        self.adam = adam;
        self
    }

    pub fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn init(mut self, init: WeightInit) -> Self {
        self.init = init;
        self
    }

    pub fn log_every(mut self, log_every: usize) -> Self {
        self.log_every = log_every;
        self
    }

    /// Trains from the configured initializer. Weights of columns that are
    /// constant in `x` start at zero: their gradient is always zero, so a
    /// random start would survive training and respond to any test-time
    /// deviation in that column.
    pub fn train(&self, x: &Matrix, y: &Vector) -> Result<TrainedModel> {
        let mut initial = self.init.init(x.ncols());
        for (j, column) in x.columns().into_iter().enumerate() {
            let mut values = column.iter();
            if let Some(&first) = values.next() {
                if values.all(|&v| v == first) {
                    initial.weights[j] = 0.0;
                }
            }
        }
        self.train_from(initial, x, y)
    }

    /// Continues from `initial` instead of the configured initializer.
    pub fn train_from(
        &self,
        initial: LinearRegression,
        x: &Matrix,
        y: &Vector,
    ) -> Result<TrainedModel> {
        self.validate(&initial, x, y)?;

        let n_samples = x.nrows() as f64;
        let mut model = initial;
        let mut adam = Adam::new(self.adam, x.ncols());
        let mut loss_history = Vec::with_capacity(self.epochs);

        for epoch in 0..self.epochs {
            let predictions = x.dot(&model.weights) + model.bias;
            let error = &predictions - y;
            let loss = error.mapv(|e| e * e).sum() / n_samples;

            if !loss.is_finite() {
                return Err(Error::TrainingDiverged { epoch: Some(epoch) });
            }
            loss_history.push(loss);

            if self.log_every > 0 && epoch % self.log_every == 0 {
                debug!("epoch {:>4}: loss={:.6}", epoch, loss);
            }

            // d/dw mean(e²) = 2/n · Xᵀe
            let grad_weights = x.t().dot(&error) * (2.0 / n_samples);
            let grad_bias = error.sum() * (2.0 / n_samples);
            adam.step(&mut model, &grad_weights, grad_bias);
        }

        if !model.is_finite() {
            return Err(Error::TrainingDiverged {
                epoch: Some(self.epochs),
            });
        }

        if let Some(loss) = loss_history.last() {
            info!(
                "trained {} epochs ({} Adam steps), final loss={:.6}",
                self.epochs,
                adam.steps(),
                loss
            );
        }

        Ok(TrainedModel {
            model,
            loss_history,
        })
    }

    fn validate(&self, initial: &LinearRegression, x: &Matrix, y: &Vector) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::InvalidParameter("epochs must be at least 1".to_string()));
        }
        self.adam.validate()?;

        if x.nrows() != y.len() {
            return Err(Error::shape(
                format!("{} targets", x.nrows()),
                format!("{} targets", y.len()),
            ));
        }
        if x.nrows() == 0 {
            return Err(Error::EmptyDataset("no training rows".to_string()));
        }
        if x.ncols() == 0 {
            return Err(Error::shape("at least 1 feature", "0 features"));
        }
        if initial.n_features() != x.ncols() {
            return Err(Error::shape(
                format!("{} features", initial.n_features()),
                format!("{} features", x.ncols()),
            ));
        }
        Ok(())
    }
}

impl Default for GradientDescentTrainer {
    fn default() -> Self {
        Self::new()
    }
}

//! End-to-end regression run: clean, split, scale, train, evaluate.
//!
//! Each stage consumes the previous stage's output and produces a new value;
//! nothing is mutated once its stage completes. The scalers are fit on the
//! training partition only, and the test target is never scaled.

use crate::dataset::{DataPreparer, Dataset, RawTable, Splitter};
use crate::error::{Error, Result};
use crate::evaluation::{Evaluation, Evaluator, PlotSeries};
use crate::linear_model::{AdamConfig, GradientDescentTrainer, TrainedModel, WeightInit};
use crate::metrics::Metrics;
use crate::preprocessing::{ScalerState, StandardScaler, TargetScalerState, ZeroVariance};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub target: String,
    /// Feature columns in model order. `None` uses every non-target column.
    pub features: Option<Vec<String>>,
    pub test_fraction: f64,
    pub seed: u64,
    pub epochs: usize,
    pub adam: AdamConfig,
    pub zero_variance: ZeroVariance,
    pub init: WeightInit,
    /// Epoch interval for debug loss logging; 0 disables it.
    pub log_every: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target: "MEDV".to_string(),
            features: None,
            test_fraction: 0.2,
            seed: 42,
            epochs: 100,
            adam: AdamConfig::default(),
            zero_variance: ZeroVariance::default(),
            init: WeightInit::default(),
            log_every: 10,
        }
    }
}

impl PipelineConfig {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    pub fn features(mut self, features: Vec<String>) -> Self {
        self.features = Some(features);
        self
    }

    pub fn test_fraction(mut self, test_fraction: f64) -> Self {
        self.test_fraction = test_fraction;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn adam(mut self, adam: AdamConfig) -> Self {
        self.adam = adam;
        self
    }

    pub fn zero_variance(mut self, policy: ZeroVariance) -> Self {
        self.zero_variance = policy;
        self
    }

    pub fn init(mut self, init: WeightInit) -> Self {
        self.init = init;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.target.is_empty() {
            return Err(Error::InvalidParameter("target column name is empty".to_string()));
        }
        Splitter::new(self.test_fraction, self.seed)?;
        if self.epochs == 0 {
            return Err(Error::InvalidParameter("epochs must be at least 1".to_string()));
        }
        self.adam.validate()?;
        if let ZeroVariance::Epsilon(eps) = self.zero_variance {
            if !(eps > 0.0 && eps.is_finite()) {
                return Err(Error::InvalidParameter(format!(
                    "zero-variance epsilon must be positive, got {eps}"
                )));
            }
        }
        Ok(())
    }
}

/// Everything a run produces, for textual reporting and plotting.
#[derive(Clone, Debug)]
pub struct PipelineReport {
    pub feature_names: Vec<String>,
    pub n_train: usize,
    pub n_test: usize,
    pub feature_scaler: ScalerState,
    pub target_scaler: TargetScalerState,
    pub trained: TrainedModel,
    pub evaluation: Evaluation,
}

impl PipelineReport {
    pub fn metrics(&self) -> Metrics {
        self.evaluation.metrics
    }

    pub fn plot_series(&self) -> PlotSeries {
        self.evaluation.plot_series()
    }
}

#[derive(Clone, Debug)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(&self, raw: &RawTable) -> Result<PipelineReport> {
        let table = DataPreparer::new(self.config.target.as_str()).prepare(raw)?;
        let dataset = table.into_dataset(&self.config.target, self.config.features.as_deref())?;
        self.run_dataset(&dataset)
    }

    pub fn run_dataset(&self, dataset: &Dataset) -> Result<PipelineReport> {
        let split = Splitter::new(self.config.test_fraction, self.config.seed)?
            .split(dataset.n_samples())?;
        let (train, test) = dataset.partition(&split);
        info!(
            "{} rows, {} features: {} train / {} test",
            dataset.n_samples(),
            dataset.n_features(),
            train.n_samples(),
            test.n_samples()
        );

        let scaler = StandardScaler::new().zero_variance(self.config.zero_variance);
        let feature_scaler = scaler
            .clone()
            .column_names(dataset.feature_names.clone())
            .fit(&train.features)?;
        let target_scaler = scaler.fit_target(&train.labels)?;

        let x_train = feature_scaler.transform(&train.features)?;
        let y_train = target_scaler.transform(&train.labels);
        let x_test = feature_scaler.transform(&test.features)?;

        let trained = GradientDescentTrainer::new()
            .adam(self.config.adam)
            .epochs(self.config.epochs)
            .init(self.config.init)
            .log_every(self.config.log_every)
            .train(&x_train, &y_train)?;

        let evaluation = Evaluator::evaluate(&trained.model, &x_test, &test.labels, &target_scaler)?;

        Ok(PipelineReport {
            feature_names: dataset.feature_names.clone(),
            n_train: train.n_samples(),
            n_test: test.n_samples(),
            feature_scaler,
            target_scaler,
            trained,
            evaluation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Matrix, Vector};

    fn linear_dataset(n: usize) -> Dataset {
        let features = Matrix::from_shape_fn((n, 2), |(i, j)| ((i * 7 + j * 3) % 11) as f64);
        let labels = Vector::from_shape_fn(n, |i| {
            3.0 * features[(i, 0)] - 2.0 * features[(i, 1)] + 5.0
        });
        Dataset::new(features, labels).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.seed, 42);
        assert_eq!(config.epochs, 100);
        assert_eq!(config.adam, AdamConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(Pipeline::new(PipelineConfig::new("y").test_fraction(1.0)).is_err());
        assert!(Pipeline::new(PipelineConfig::new("y").epochs(0)).is_err());
        assert!(Pipeline::new(
            PipelineConfig::new("y").zero_variance(ZeroVariance::Epsilon(0.0))
        )
        .is_err());
        assert!(Pipeline::new(PipelineConfig::new("")).is_err());
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"target": "price", "epochs": 250, "adam": {"learning_rate": 0.01}}"#)
                .unwrap();
        assert_eq!(config.target, "price");
        assert_eq!(config.epochs, 250);
        assert_eq!(config.adam.learning_rate, 0.01);
        assert_eq!(config.adam.beta2, 0.999);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_run_dataset_learns_linear_target() {
        let pipeline = Pipeline::new(
            PipelineConfig::new("y")
                .epochs(1500)
                .adam(AdamConfig::default().learning_rate(0.05)),
        )
        .unwrap();

        let report = pipeline.run_dataset(&linear_dataset(60)).unwrap();
        assert_eq!(report.n_train + report.n_test, 60);
        assert_eq!(report.n_test, 12);
        assert!(report.metrics().r2 > 0.99, "r2 = {}", report.metrics().r2);
    }

    #[test]
    fn test_scalers_ignore_test_rows() {
        let dataset = linear_dataset(40);
        let pipeline = Pipeline::new(PipelineConfig::new("y").epochs(5)).unwrap();
        let split = Splitter::new(0.2, 42).unwrap().split(40).unwrap();

        let mut perturbed = dataset.clone();
        for &i in &split.test {
            perturbed.features.row_mut(i).mapv_inplace(|v| v * 100.0 + 1.0);
            perturbed.labels[i] += 1000.0;
        }

        let a = pipeline.run_dataset(&dataset).unwrap();
        let b = pipeline.run_dataset(&perturbed).unwrap();
        assert_eq!(a.feature_scaler, b.feature_scaler);
        assert_eq!(a.target_scaler, b.target_scaler);
        assert_eq!(a.trained.model, b.trained.model);
    }
}

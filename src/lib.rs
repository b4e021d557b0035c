pub use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

pub mod error;
pub mod dataset;
pub mod preprocessing;
pub mod linear_model;
pub mod metrics;
pub mod evaluation;
pub mod pipeline;
pub mod io;

pub use error::{Error, Result};
pub use dataset::{DataPreparer, Dataset, RawTable, Split, Splitter, Table};
pub use preprocessing::{ScalerState, StandardScaler, TargetScalerState, ZeroVariance};
pub use linear_model::{
    Adam, AdamConfig, GradientDescentTrainer, LinearRegression, TrainedModel, WeightInit,
};
pub use metrics::Metrics;
pub use evaluation::{Evaluation, Evaluator, PlotSeries};
pub use pipeline::{Pipeline, PipelineConfig, PipelineReport};

pub type Vector = Array1<f64>;
pub type Matrix = Array2<f64>;

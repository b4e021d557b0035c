//! Affine regression trained by gradient descent.
//!
//! This module provides:
//! - `LinearRegression`: weight vector and bias, with the affine prediction
//! - `Adam`: per-parameter first/second moment state for adaptive updates
//! - `GradientDescentTrainer`: fixed-epoch, full-batch MSE minimisation
//!
//! # Examples
//!
//! ```rust
//! use tabreg::{AdamConfig, GradientDescentTrainer};
//! use ndarray::array;
//!
//! let x = array![[-1.0], [0.0], [1.0]];
//! let y = array![-2.0, 0.0, 2.0];
//!
//! let trained = GradientDescentTrainer::new()
//!     .adam(AdamConfig::default().learning_rate(0.1))
//!     .epochs(500)
//!     .train(&x, &y)
//!     .unwrap();
//!
//! let predictions = trained.model.predict(&x).unwrap();
//! assert_eq!(predictions.len(), 3);
//! ```

mod adam;
mod linear_regression;
mod trainer;

pub use adam::{Adam, AdamConfig};
pub use linear_regression::LinearRegression;
pub use trainer::{GradientDescentTrainer, TrainedModel, WeightInit};

use crate::error::{Error, Result};
use crate::{Matrix, Vector};

/// Parameters of an affine model: `prediction = x · weights + bias`.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearRegression {
    pub weights: Vector,
    pub bias: f64,
}

impl LinearRegression {
    pub fn new(weights: Vector, bias: f64) -> Self {
        Self { weights, bias }
    }

    pub fn zeros(n_features: usize) -> Self {
        Self::new(Vector::zeros(n_features), 0.0)
    }

    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    pub fn predict(&self, x: &Matrix) -> Result<Vector> {
        if x.ncols() != self.n_features() {
            return Err(Error::shape(
                format!("{} features", self.n_features()),
                format!("{} features", x.ncols()),
            ));
        }

        Ok(x.dot(&self.weights) + self.bias)
    }

    pub fn is_finite(&self) -> bool {
        self.bias.is_finite() && self.weights.iter().all(|w| w.is_finite())
    }
}

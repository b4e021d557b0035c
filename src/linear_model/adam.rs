use super::LinearRegression;
use crate::error::{Error, Result};
use crate::Vector;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdamConfig {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

impl AdamConfig {
    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        for (name, beta) in [("beta1", self.beta1), ("beta2", self.beta2)] {
            if !(0.0..1.0).contains(&beta) {
                return Err(Error::InvalidParameter(format!(
                    "{name} must be in [0, 1), got {beta}"
                )));
            }
        }
        if !(self.epsilon > 0.0 && self.epsilon.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// Adam moment estimates for one [`LinearRegression`].
///
/// Lives only for the duration of a training call.
#[derive(Clone, Debug)]
pub struct Adam {
    config: AdamConfig,
    t: u64,
    m_weights: Vector,
    v_weights: Vector,
    m_bias: f64,
    v_bias: f64,
}

impl Adam {
    pub fn new(config: AdamConfig, n_features: usize) -> Self {
        Self {
            config,
            t: 0,
            m_weights: Vector::zeros(n_features),
            v_weights: Vector::zeros(n_features),
            m_bias: 0.0,
            v_bias: 0.0,
        }
    }

    pub fn steps(&self) -> u64 {
        self.t
    }

    /// Applies one bias-corrected update:
    /// `param -= lr * m_hat / (sqrt(v_hat) + eps)`.
    pub fn step(&mut self, params: &mut LinearRegression, grad_weights: &Vector, grad_bias: f64) {
        let AdamConfig {
            learning_rate: lr,
            beta1,
            beta2,
            epsilon,
        } = self.config;

        self.t += 1;
        // β^t has long underflowed to zero by i32::MAX.
        let t = i32::try_from(self.t).unwrap_or(i32::MAX);
        let correction1 = 1.0 - beta1.powi(t);
        let correction2 = 1.0 - beta2.powi(t);

        // m_t = β1 * m_{t-1} + (1 - β1) * g
        self.m_weights = &self.m_weights * beta1 + grad_weights * (1.0 - beta1);
        // v_t = β2 * v_{t-1} + (1 - β2) * g²
        self.v_weights = &self.v_weights * beta2 + &grad_weights.mapv(|g| g * g) * (1.0 - beta2);

        let m_hat = &self.m_weights / correction1;
        let v_hat = &self.v_weights / correction2;
        params.weights -= &(m_hat / (v_hat.mapv(f64::sqrt) + epsilon) * lr);

        self.m_bias = beta1 * self.m_bias + (1.0 - beta1) * grad_bias;
        self.v_bias = beta2 * self.v_bias + (1.0 - beta2) * grad_bias * grad_bias;
        let m_hat = self.m_bias / correction1;
        let v_hat = self.v_bias / correction2;
        params.bias -= lr * m_hat / (v_hat.sqrt() + epsilon);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_default_hyperparameters() {
        let config = AdamConfig::default();
        assert_eq!(config.learning_rate, 0.001);
        assert_eq!(config.beta1, 0.9);
        assert_eq!(config.beta2, 0.999);
        assert_eq!(config.epsilon, 1e-8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_hyperparameters() {
        let bad = [
            AdamConfig::default().learning_rate(0.0),
            AdamConfig::default().learning_rate(f64::NAN),
            AdamConfig { beta1: 1.0, ..Default::default() },
            AdamConfig { beta2: -0.1, ..Default::default() },
            AdamConfig { epsilon: 0.0, ..Default::default() },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(Error::InvalidParameter(_))));
        }
    }

    #[test]
    fn test_first_step_moves_by_learning_rate() {
        // With bias correction the first step is lr * g / (|g| + eps).
        let mut params = LinearRegression::new(array![1.0, -1.0], 0.0);
        let mut adam = Adam::new(AdamConfig::default().learning_rate(0.1), 2);

        adam.step(&mut params, &array![4.0, -0.5], 2.0);

        assert_eq!(adam.steps(), 1);
        assert_abs_diff_eq!(params.weights[0], 0.9, epsilon = 1e-6);
        assert_abs_diff_eq!(params.weights[1], -0.9, epsilon = 1e-6);
        assert_abs_diff_eq!(params.bias, -0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_step_count_past_i32_range() {
        let mut params = LinearRegression::new(array![1.0], 1.0);
        let mut adam = Adam::new(AdamConfig::default(), 1);
        adam.t = i32::MAX as u64;

        adam.step(&mut params, &array![0.5], 0.5);
        adam.step(&mut params, &array![0.5], 0.5);

        assert_eq!(adam.steps(), i32::MAX as u64 + 2);
        assert!(params.is_finite());
        assert!(params.weights[0] < 1.0);
    }

    #[test]
    fn test_quadratic_convergence() {
        // f(w) = w², ∇f = 2w
        let mut params = LinearRegression::new(array![5.0, -3.0, 2.0], 4.0);
        let mut adam = Adam::new(AdamConfig::default().learning_rate(0.1), 3);

        for _ in 0..500 {
            let grad = params.weights.mapv(|w| 2.0 * w);
            let grad_bias = 2.0 * params.bias;
            adam.step(&mut params, &grad, grad_bias);
        }

        for &w in params.weights.iter() {
            assert!(w.abs() < 0.1, "weight {} did not converge", w);
        }
        assert!(params.bias.abs() < 0.1);
    }
}

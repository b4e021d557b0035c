//! Z-score standardization.
//!
//! [`StandardScaler`] only fits: it turns training data into an immutable
//! [`ScalerState`] (features) or [`TargetScalerState`] (target). The states
//! only transform and inverse-transform, so data handed to them can never
//! change the fitted statistics.
//!
//! ```rust
//! use tabreg::StandardScaler;
//! use ndarray::array;
//!
//! let train = array![[1.0, 10.0], [3.0, 30.0]];
//! let test = array![[2.0, 20.0]];
//!
//! let state = StandardScaler::new().fit(&train).unwrap();
//! let scaled = state.transform(&test).unwrap();
//! assert_eq!(scaled, array![[0.0, 0.0]]);
//! ```

use crate::error::{Error, Result};
use crate::{Matrix, Vector};
use log::{debug, warn};
use ndarray::Axis;
use serde::{Deserialize, Serialize};

/// What to divide by when a fitted column has zero standard deviation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroVariance {
    /// Divide by the measured std, but never by less than the given epsilon.
    /// A column that was constant in the fit set maps to all zeros for those
    /// same values instead of failing.
    Epsilon(f64),
    /// Divide by one, leaving the column centred but unscaled.
    Unit,
    /// Fail the fit with [`Error::ZeroVariance`].
    Reject,
}

impl Default for ZeroVariance {
    fn default() -> Self {
        ZeroVariance::Epsilon(1e-8)
    }
}

#[derive(Clone, Debug, Default)]
pub struct StandardScaler {
    zero_variance: ZeroVariance,
    column_names: Option<Vec<String>>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zero_variance(mut self, policy: ZeroVariance) -> Self {
        self.zero_variance = policy;
        self
    }

    /// Names used when reporting a zero-variance column.
    pub fn column_names(mut self, names: Vec<String>) -> Self {
        self.column_names = Some(names);
        self
    }

    pub fn fit(&self, data: &Matrix) -> Result<ScalerState> {
        let mean = data
            .mean_axis(Axis(0))
            .ok_or_else(|| Error::EmptyDataset("cannot fit scaler on zero rows".to_string()))?;
        let std = data.std_axis(Axis(0), 0.0);

        let scale = std
            .iter()
            .zip(mean.iter())
            .enumerate()
            .map(|(i, (&s, &m))| self.divisor(s, m, || self.column_name(i)))
            .collect::<Result<Vector>>()?;

        debug!("fitted scaler over {} rows x {} columns", data.nrows(), data.ncols());
        Ok(ScalerState { mean, std, scale })
    }

    pub fn fit_target(&self, target: &Vector) -> Result<TargetScalerState> {
        let mean = target
            .mean()
            .ok_or_else(|| Error::EmptyDataset("cannot fit scaler on zero rows".to_string()))?;
        let std = target.std(0.0);
        let scale = self.divisor(std, mean, || "target".to_string())?;

        debug!("fitted target scaler: mean={:.4}, std={:.4}", mean, std);
        Ok(TargetScalerState { mean, std, scale })
    }

    fn column_name(&self, i: usize) -> String {
        self.column_names
            .as_ref()
            .and_then(|names| names.get(i).cloned())
            .unwrap_or_else(|| format!("column {i}"))
    }

    // Standard deviations within rounding noise of the mean count as zero.
    fn divisor(&self, std: f64, mean: f64, name: impl FnOnce() -> String) -> Result<f64> {
        if std > 1e-12 * mean.abs().max(1.0) {
            return Ok(std);
        }
        match self.zero_variance {
            ZeroVariance::Epsilon(eps) => {
                let divisor = std.max(eps);
                warn!("'{}' is constant; dividing by {:e}", name(), divisor);
                Ok(divisor)
            }
            ZeroVariance::Unit => {
                warn!("'{}' is constant; leaving it unscaled", name());
                Ok(1.0)
            }
            ZeroVariance::Reject => Err(Error::ZeroVariance { column: name() }),
        }
    }
}

/// Per-column statistics of a fitted feature scaler.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalerState {
    mean: Vector,
    std: Vector,
    scale: Vector,
}

impl ScalerState {
    pub fn mean(&self) -> &Vector {
        &self.mean
    }

    /// Population standard deviation as measured, before any zero guard.
    pub fn std(&self) -> &Vector {
        &self.std
    }

    /// The divisor actually applied per column.
    pub fn scale(&self) -> &Vector {
        &self.scale
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, data: &Matrix) -> Result<Matrix> {
        self.check_width(data)?;
        Ok((data - &self.mean) / &self.scale)
    }

    pub fn inverse_transform(&self, data: &Matrix) -> Result<Matrix> {
        self.check_width(data)?;
        Ok(data * &self.scale + &self.mean)
    }

    fn check_width(&self, data: &Matrix) -> Result<()> {
        if data.ncols() != self.n_features() {
            return Err(Error::shape(
                format!("{} features", self.n_features()),
                format!("{} features", data.ncols()),
            ));
        }
        Ok(())
    }
}

/// Statistics of a fitted single-column target scaler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetScalerState {
    mean: f64,
    std: f64,
    scale: f64,
}

impl TargetScalerState {
    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std(&self) -> f64 {
        self.std
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn transform(&self, target: &Vector) -> Vector {
        target.mapv(|y| (y - self.mean) / self.scale)
    }

    pub fn inverse_transform(&self, scaled: &Vector) -> Vector {
        scaled.mapv(|y| y * self.scale + self.mean)
    }
}

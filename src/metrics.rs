use crate::error::{Error, Result};
use crate::Vector;
use serde::{Deserialize, Serialize};

fn check_lengths(y_true: &Vector, y_pred: &Vector) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(Error::shape(
            format!("{} predictions", y_true.len()),
            format!("{} predictions", y_pred.len()),
        ));
    }
    if y_true.is_empty() {
        return Err(Error::EmptyDataset("no samples to score".to_string()));
    }
    Ok(())
}

pub fn mean_squared_error(y_true: &Vector, y_pred: &Vector) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let diff = y_true - y_pred;
    Ok(diff.mapv(|x| x * x).sum() / diff.len() as f64)
}

pub fn mean_absolute_error(y_true: &Vector, y_pred: &Vector) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let diff = y_true - y_pred;
    Ok(diff.mapv(f64::abs).sum() / diff.len() as f64)
}

/// Coefficient of determination. Fails with [`Error::DegenerateMetric`]
/// when `y_true` is constant, since R² has no value there. A spread within
/// rounding noise of the mean counts as constant.
pub fn r2_score(y_true: &Vector, y_pred: &Vector) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let y_mean = y_true.sum() / y_true.len() as f64;
    let ss_res = (y_true - y_pred).mapv(|x| x * x).sum();
    let ss_tot = y_true.mapv(|x| (x - y_mean) * (x - y_mean)).sum();

    let std = (ss_tot / y_true.len() as f64).sqrt();
    if std <= 1e-12 * y_mean.abs().max(1.0) {
        return Err(Error::DegenerateMetric(
            "R² is undefined for a constant target".to_string(),
        ));
    }

    Ok(1.0 - ss_res / ss_tot)
}

/// Accuracy of a prediction set in the target's original units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub mse: f64,
    pub mae: f64,
    pub r2: f64,
}

impl Metrics {
    pub fn compute(y_true: &Vector, y_pred: &Vector) -> Result<Self> {
        Ok(Self {
            mse: mean_squared_error(y_true, y_pred)?,
            mae: mean_absolute_error(y_true, y_pred)?,
            r2: r2_score(y_true, y_pred)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_mse_and_mae_weigh_outliers_differently() {
        let y_true = array![10.0, 20.0, 30.0, 40.0];
        let y_pred = array![11.0, 19.0, 30.0, 44.0];

        // errors: -1, 1, 0, -4
        let metrics = Metrics::compute(&y_true, &y_pred).unwrap();
        assert_abs_diff_eq!(metrics.mse, 18.0 / 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(metrics.mae, 6.0 / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_r2_below_zero_for_worse_than_mean() {
        let y_true = array![1.0, 2.0, 3.0];
        let y_pred = array![3.0, 2.0, 1.0];

        // ss_res = 8, ss_tot = 2
        let r2 = r2_score(&y_true, &y_pred).unwrap();
        assert_abs_diff_eq!(r2, -3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reference_values() {
        let y_true = array![3.0, 5.0, 7.0];
        let y_pred = array![4.0, 5.0, 6.0];

        let metrics = Metrics::compute(&y_true, &y_pred).unwrap();
        assert_abs_diff_eq!(metrics.mse, 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(metrics.mae, 2.0 / 3.0, epsilon = 1e-12);
        // ss_res = 2, ss_tot = 8
        assert_abs_diff_eq!(metrics.r2, 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_target_is_degenerate() {
        let y_true = array![5.0, 5.0, 5.0];
        let y_pred = array![4.0, 5.0, 6.0];

        assert!(matches!(
            r2_score(&y_true, &y_pred),
            Err(Error::DegenerateMetric(_))
        ));
        assert!(matches!(
            Metrics::compute(&y_true, &y_pred),
            Err(Error::DegenerateMetric(_))
        ));
    }

    #[test]
    fn test_constant_inexact_target_is_degenerate() {
        // 0.1 has no exact binary form, so the computed mean is off by an ulp.
        let y_true = array![0.1, 0.1, 0.1];
        let y_pred = array![0.2, 0.1, 0.0];

        assert!(matches!(
            r2_score(&y_true, &y_pred),
            Err(Error::DegenerateMetric(_))
        ));
    }

    #[test]
    fn test_small_real_spread_is_not_degenerate() {
        let y_true = array![1000.0, 1000.000001, 1000.000002];
        let y_pred = y_true.clone();

        let r2 = r2_score(&y_true, &y_pred).unwrap();
        assert_abs_diff_eq!(r2, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_length_mismatch() {
        let y_true = array![1.0, 2.0];
        let y_pred = array![1.0];

        assert!(matches!(
            mean_absolute_error(&y_true, &y_pred),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        let empty = Vector::zeros(0);
        assert!(mean_squared_error(&empty, &empty).is_err());
    }
}

use crate::error::{Error, Result};
use crate::linear_model::LinearRegression;
use crate::metrics::Metrics;
use crate::preprocessing::TargetScalerState;
use crate::{Matrix, Vector};
use log::info;

/// True and predicted values in original units, paired by test row.
#[derive(Clone, Debug)]
pub struct Evaluation {
    pub y_true: Vector,
    pub y_pred: Vector,
    pub metrics: Metrics,
}

impl Evaluation {
    /// Pairs sorted by ascending true value, for line plots. Metrics are
    /// always computed on the unsorted pairing.
    pub fn plot_series(&self) -> PlotSeries {
        PlotSeries::sorted_by_truth(&self.y_true, &self.y_pred)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlotSeries {
    pub y_true: Vec<f64>,
    pub y_pred: Vec<f64>,
}

impl PlotSeries {
    pub fn sorted_by_truth(y_true: &Vector, y_pred: &Vector) -> Self {
        let mut order: Vec<usize> = (0..y_true.len()).collect();
        order.sort_by(|&a, &b| y_true[a].total_cmp(&y_true[b]));

        Self {
            y_true: order.iter().map(|&i| y_true[i]).collect(),
            y_pred: order.iter().map(|&i| y_pred[i]).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.y_true.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y_true.is_empty()
    }
}

pub struct Evaluator;

impl Evaluator {
    /// Predicts on scaled test features, maps the predictions back through
    /// the target scaler and scores them against the unscaled test target.
    pub fn evaluate(
        model: &LinearRegression,
        x_test: &Matrix,
        y_test: &Vector,
        target_state: &TargetScalerState,
    ) -> Result<Evaluation> {
        if x_test.nrows() != y_test.len() {
            return Err(Error::shape(
                format!("{} targets", x_test.nrows()),
                format!("{} targets", y_test.len()),
            ));
        }

        let scaled = model.predict(x_test)?;
        let y_pred = target_state.inverse_transform(&scaled);
        if y_pred.iter().any(|v| !v.is_finite()) {
            return Err(Error::TrainingDiverged { epoch: None });
        }

        let metrics = Metrics::compute(y_test, &y_pred)?;
        info!(
            "test metrics: mse={:.4}, mae={:.4}, r2={:.4}",
            metrics.mse, metrics.mae, metrics.r2
        );

        Ok(Evaluation {
            y_true: y_test.clone(),
            y_pred,
            metrics,
        })
    }
}

use crate::error::{Error, Result};
use crate::{Matrix, Vector};
use log::{debug, warn};
use ndarray::{ArrayView1, Axis};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// Untyped table as it arrives from the data source: a header and rows of
/// text cells.
#[derive(Clone, Debug, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }
}

/// Cleaned numeric table. Every cell is finite.
#[derive(Clone, Debug)]
pub struct Table {
    pub columns: Vec<String>,
    pub data: Matrix,
    /// Position of each kept row in the raw table it was cleaned from.
    pub source_rows: Vec<usize>,
}

impl Table {
    pub fn n_rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.column_index(name).map(|i| self.data.column(i))
    }

    /// Separates the target column from the features. With `features` set to
    /// `None` every non-target column becomes a feature, in header order.
    pub fn into_dataset(self, target: &str, features: Option<&[String]>) -> Result<Dataset> {
        let target_idx = self
            .column_index(target)
            .ok_or_else(|| Error::Schema(format!("target column '{target}' not found")))?;

        let feature_idx: Vec<usize> = match features {
            Some(names) => {
                let mut seen = HashSet::new();
                names
                    .iter()
                    .map(|name| {
                        if name == target {
                            return Err(Error::Schema(format!(
                                "column '{name}' cannot be both feature and target"
                            )));
                        }
                        if !seen.insert(name.as_str()) {
                            return Err(Error::Schema(format!("duplicate feature column '{name}'")));
                        }
                        self.column_index(name).ok_or_else(|| {
                            Error::Schema(format!("feature column '{name}' not found"))
                        })
                    })
                    .collect::<Result<_>>()?
            }
            None => (0..self.columns.len()).filter(|&i| i != target_idx).collect(),
        };

        if feature_idx.is_empty() {
            return Err(Error::Schema("no feature columns selected".to_string()));
        }

        let feature_names = feature_idx.iter().map(|&i| self.columns[i].clone()).collect();
        let features = self.data.select(Axis(1), &feature_idx);
        let labels = self.data.column(target_idx).to_owned();

        Dataset::new(features, labels).map(|d| d.with_feature_names(feature_names))
    }
}

/// Turns a [`RawTable`] into a [`Table`] of finite numbers.
///
/// Cells are parsed as `f64` after trimming whitespace. A cell that does not
/// parse, or parses to NaN or an infinity, is missing. Rows with a missing
/// cell, or with a cell count different from the header, are dropped whole.
/// The input table is never modified.
#[derive(Clone, Debug)]
pub struct DataPreparer {
    target: String,
}

impl DataPreparer {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn prepare(&self, raw: &RawTable) -> Result<Table> {
        let mut seen = HashSet::new();
        for name in &raw.columns {
            if !seen.insert(name.as_str()) {
                return Err(Error::Schema(format!("duplicate column '{name}'")));
            }
        }
        if !seen.contains(self.target.as_str()) {
            return Err(Error::Schema(format!(
                "target column '{}' not found",
                self.target
            )));
        }

        let n_cols = raw.columns.len();
        let mut values = Vec::with_capacity(raw.n_rows() * n_cols);
        let mut source_rows = Vec::with_capacity(raw.n_rows());

        for (i, row) in raw.rows.iter().enumerate() {
            if let Some(parsed) = Self::parse_row(row, n_cols) {
                values.extend(parsed);
                source_rows.push(i);
            }
        }

        let dropped = raw.n_rows() - source_rows.len();
        if dropped > 0 {
            warn!("dropped {} of {} rows with missing values", dropped, raw.n_rows());
        }

        if source_rows.is_empty() {
            return Err(Error::EmptyDataset(format!(
                "no rows left after cleaning {} raw rows",
                raw.n_rows()
            )));
        }

        let data = Matrix::from_shape_vec((source_rows.len(), n_cols), values)
            .map_err(|e| Error::shape(format!("{} columns per row", n_cols), e))?;
        debug!("cleaned table: {} rows x {} columns", data.nrows(), data.ncols());

        Ok(Table {
            columns: raw.columns.clone(),
            data,
            source_rows,
        })
    }

    fn parse_row(row: &[String], n_cols: usize) -> Option<Vec<f64>> {
        if row.len() != n_cols {
            return None;
        }
        row.iter()
            .map(|cell| cell.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct Dataset {
    pub features: Matrix,
    pub labels: Vector,
    pub feature_names: Vec<String>,
}

impl Dataset {
    pub fn new(features: Matrix, labels: Vector) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(Error::shape(
                format!("{} targets", features.nrows()),
                format!("{} targets", labels.len()),
            ));
        }

        let feature_names = (0..features.ncols()).map(|i| format!("x{i}")).collect();
        Ok(Self {
            features,
            labels,
            feature_names,
        })
    }

    fn with_feature_names(mut self, feature_names: Vec<String>) -> Self {
        self.feature_names = feature_names;
        self
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Copies out the given rows, in the given order.
    pub fn select(&self, rows: &[usize]) -> Self {
        Self {
            features: self.features.select(Axis(0), rows),
            labels: self.labels.select(Axis(0), rows),
            feature_names: self.feature_names.clone(),
        }
    }

    pub fn partition(&self, split: &Split) -> (Self, Self) {
        (self.select(&split.train), self.select(&split.test))
    }

    pub fn train_test_split(&self, test_size: f64, seed: u64) -> Result<(Self, Self)> {
        let split = Splitter::new(test_size, seed)?.split(self.n_samples())?;
        Ok(self.partition(&split))
    }
}

/// Disjoint train/test row indices that together cover every row once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Seeded random train/test partitioner.
///
/// Row indices are shuffled with a `StdRng` seeded from `seed`; the last
/// `ceil(n * test_fraction)` shuffled indices form the test set. For `n >= 2`
/// the test size is clamped into `[1, n - 1]` so neither side is empty.
#[derive(Clone, Copy, Debug)]
pub struct Splitter {
    test_fraction: f64,
    seed: u64,
}

impl Splitter {
    pub fn new(test_fraction: f64, seed: u64) -> Result<Self> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(Error::InvalidParameter(format!(
                "test_fraction must be in (0, 1), got {test_fraction}"
            )));
        }
        Ok(Self {
            test_fraction,
            seed,
        })
    }

    pub fn n_test(&self, n_samples: usize) -> usize {
        // 1e-9 keeps exact products such as 0.2 * 100 from rounding up.
        let n_test = (n_samples as f64 * self.test_fraction - 1e-9).ceil() as usize;
        n_test.clamp(1, n_samples.saturating_sub(1).max(1))
    }

    pub fn split(&self, n_samples: usize) -> Result<Split> {
        if n_samples < 2 {
            return Err(Error::InvalidParameter(format!(
                "at least 2 rows are needed to split, got {n_samples}"
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);

        let n_test = self.n_test(n_samples);
        let test = indices.split_off(n_samples - n_test);
        debug!(
            "split {} rows into {} train / {} test (seed {})",
            n_samples,
            indices.len(),
            test.len(),
            self.seed
        );

        Ok(Split {
            train: indices,
            test,
        })
    }

    pub fn split_table(&self, table: &Table) -> Result<Split> {
        self.split(table.n_rows())
    }
}

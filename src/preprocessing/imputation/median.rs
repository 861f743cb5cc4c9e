//! Median (or mean) imputation of numeric columns.
//!
//! Fit stores one statistic per target column, computed over the non-missing
//! training rows. Transform fills absent cells with the stored statistic; it
//! never looks at the statistics of the data it is given.
//!
//! # Example
//! ```rust
//! use feature_pipe::dataset::{Column, Dataset};
//! use feature_pipe::preprocessing::{FittedTransformer, MedianImputer, Transformer};
//!
//! let train = Dataset::new(vec![
//!     Column::numeric("LotFrontage", vec![Some(60.0), None, Some(80.0), Some(70.0)]),
//! ])?;
//! let fitted = MedianImputer::new(["LotFrontage"]).fit(&train, None)?;
//! assert_eq!(fitted.statistic("LotFrontage"), Some(70.0));
//! # Ok::<(), feature_pipe::PipelineError>(())
//! ```

use crate::dataset::{Column, ColumnKind, Dataset};
use crate::error::{PipelineError, Result};
use crate::preprocessing::traits::{column_list, ensure_rows, FittedTransformer, Transformer};
use serde::{Deserialize, Serialize};

const KIND: &str = "median_imputer";

/// Statistic used to fill absent numeric values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Median of the observed training values.
    #[default]
    Median,
    /// Arithmetic mean of the observed training values.
    Mean,
}

/// Imputer for numeric columns (unfitted).
#[derive(Clone, Debug)]
pub struct MedianImputer {
    columns: Vec<String>,
    strategy: ImputeStrategy,
}

impl MedianImputer {
    /// Create a median imputer for the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: column_list(columns),
            strategy: ImputeStrategy::default(),
        }
    }

    /// Use a different statistic.
    pub fn with_strategy(mut self, strategy: ImputeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> ImputeStrategy {
        self.strategy
    }
}

/// Serializable parameters for a fitted MedianImputer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MedianImputerParams {
    pub strategy: ImputeStrategy,
    pub columns: Vec<String>,
    /// Fill value for each column, aligned with `columns`.
    pub statistics: Vec<f64>,
}

/// Fitted MedianImputer ready for inference.
#[derive(Clone, Debug)]
pub struct FittedMedianImputer {
    params: MedianImputerParams,
}

impl FittedMedianImputer {
    /// Fill values aligned with [`columns`](FittedTransformer::columns).
    pub fn statistics(&self) -> &[f64] {
        &self.params.statistics
    }

    /// Fill value for a single column.
    pub fn statistic(&self, column: &str) -> Option<f64> {
        self.params
            .columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.params.statistics[i])
    }
}

pub(crate) fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len();
    if n % 2 == 0 {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    } else {
        values[n / 2]
    }
}

impl Transformer for MedianImputer {
    type Params = MedianImputerParams;
    type Fitted = FittedMedianImputer;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn fit(&self, data: &Dataset, _target: Option<&[f64]>) -> Result<Self::Fitted> {
        ensure_rows(KIND, data)?;
        let mut statistics = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            let col = data.require(KIND, name, Some(ColumnKind::Numeric))?;
            let mut observed: Vec<f64> = col
                .as_numeric()
                .unwrap_or(&[])
                .iter()
                .flatten()
                .copied()
                .collect();
            if observed.is_empty() {
                return Err(PipelineError::fit(
                    KIND,
                    name,
                    "every training value is missing",
                ));
            }
            let stat = match self.strategy {
                ImputeStrategy::Median => median(&mut observed),
                ImputeStrategy::Mean => observed.iter().sum::<f64>() / observed.len() as f64,
            };
            statistics.push(stat);
        }
        Ok(FittedMedianImputer {
            params: MedianImputerParams {
                strategy: self.strategy,
                columns: self.columns.clone(),
                statistics,
            },
        })
    }
}

impl FittedTransformer for FittedMedianImputer {
    type Params = MedianImputerParams;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.params.columns
    }

    fn transform(&self, data: &Dataset) -> Result<Dataset> {
        let mut replaced = Vec::with_capacity(self.params.columns.len());
        for (name, &fill) in self.params.columns.iter().zip(&self.params.statistics) {
            let col = data.require(KIND, name, Some(ColumnKind::Numeric))?;
            let values = col
                .as_numeric()
                .unwrap_or(&[])
                .iter()
                .map(|v| Some(v.unwrap_or(fill)))
                .collect();
            replaced.push(Column::numeric(name.as_str(), values));
        }
        data.with_replaced(replaced)
    }

    fn extract_params(&self) -> Self::Params {
        self.params.clone()
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        if params.columns.len() != params.statistics.len() {
            return Err(PipelineError::Serialization(format!(
                "{} columns but {} statistics",
                params.columns.len(),
                params.statistics.len()
            )));
        }
        Ok(Self { params })
    }
}

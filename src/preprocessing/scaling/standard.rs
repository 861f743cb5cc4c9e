//! Standard Scaler (Z-score normalization).
//!
//! Transforms numeric columns by removing the mean and scaling to unit
//! variance:
//! ```text
//! z = (x - u) / s
//! ```
//! where `u` is the training mean and `s` the population standard deviation.
//! A constant column (`s == 0`) is mapped to zero.
//!
//! # Example
//! ```rust
//! use feature_pipe::dataset::{Column, Dataset};
//! use feature_pipe::preprocessing::{FittedTransformer, StandardScaler, Transformer};
//!
//! let train = Dataset::new(vec![Column::numeric_dense("GrLivArea", vec![1.0, 2.0, 3.0])])?;
//! let fitted = StandardScaler::new(["GrLivArea"]).fit(&train, None)?;
//! assert_eq!(fitted.mean("GrLivArea"), Some(2.0));
//! # Ok::<(), feature_pipe::PipelineError>(())
//! ```

use crate::dataset::{Column, ColumnKind, Dataset};
use crate::error::{PipelineError, Result};
use crate::preprocessing::traits::{column_list, ensure_rows, FittedTransformer, Transformer};
use serde::{Deserialize, Serialize};

const KIND: &str = "standard_scaler";

/// Configuration for StandardScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScalerConfig {
    /// If true, center the data before scaling.
    pub with_mean: bool,
    /// If true, scale the data to unit variance.
    pub with_std: bool,
}

impl Default for StandardScalerConfig {
    fn default() -> Self {
        Self {
            with_mean: true,
            with_std: true,
        }
    }
}

/// Serializable parameters for a fitted StandardScaler.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StandardScalerParams {
    pub config: StandardScalerConfig,
    pub columns: Vec<String>,
    /// Mean of each column (zeros if `with_mean` is false).
    pub mean: Vec<f64>,
    /// Population standard deviation of each column (ones if `with_std` is false).
    pub std: Vec<f64>,
}

/// StandardScaler transformer (unfitted).
#[derive(Clone, Debug)]
pub struct StandardScaler {
    columns: Vec<String>,
    config: StandardScalerConfig,
}

impl StandardScaler {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: column_list(columns),
            config: StandardScalerConfig::default(),
        }
    }

    /// Set whether to center data by mean.
    pub fn with_mean(mut self, with_mean: bool) -> Self {
        self.config.with_mean = with_mean;
        self
    }

    /// Set whether to scale data to unit variance.
    pub fn with_std(mut self, with_std: bool) -> Self {
        self.config.with_std = with_std;
        self
    }
}

/// Fitted StandardScaler ready for inference.
#[derive(Clone, Debug)]
pub struct FittedStandardScaler {
    params: StandardScalerParams,
}

impl FittedStandardScaler {
    fn position(&self, column: &str) -> Option<usize> {
        self.params.columns.iter().position(|c| c == column)
    }

    /// Training mean of a column.
    pub fn mean(&self, column: &str) -> Option<f64> {
        self.position(column).map(|i| self.params.mean[i])
    }

    /// Training standard deviation of a column.
    pub fn std(&self, column: &str) -> Option<f64> {
        self.position(column).map(|i| self.params.std[i])
    }

    fn scale(&self, i: usize, x: f64) -> f64 {
        let (mean, std) = (self.params.mean[i], self.params.std[i]);
        if std == 0.0 {
            return 0.0;
        }
        (x - mean) / std
    }

    /// Map scaled values back to the original units.
    pub fn inverse_transform(&self, data: &Dataset) -> Result<Dataset> {
        let mut replaced = Vec::with_capacity(self.params.columns.len());
        for (i, name) in self.params.columns.iter().enumerate() {
            let col = data.require(KIND, name, Some(ColumnKind::Numeric))?;
            let (mean, std) = (self.params.mean[i], self.params.std[i]);
            let values = col
                .as_numeric()
                .unwrap_or(&[])
                .iter()
                .map(|v| v.map(|z| z * std + mean))
                .collect();
            replaced.push(Column::numeric(name.as_str(), values));
        }
        data.with_replaced(replaced)
    }
}

/// Mean and population standard deviation.
fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

impl Transformer for StandardScaler {
    type Params = StandardScalerParams;
    type Fitted = FittedStandardScaler;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn fit(&self, data: &Dataset, _target: Option<&[f64]>) -> Result<Self::Fitted> {
        ensure_rows(KIND, data)?;
        let mut means = Vec::with_capacity(self.columns.len());
        let mut stds = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            let col = data.require_complete(KIND, name, Some(ColumnKind::Numeric))?;
            let values: Vec<f64> = col
                .as_numeric()
                .unwrap_or(&[])
                .iter()
                .flatten()
                .copied()
                .collect();
            let (mean, std) = mean_std(&values);
            if std == 0.0 {
                tracing::debug!(stage = KIND, column = %name, "constant column scales to zero");
            }
            means.push(if self.config.with_mean { mean } else { 0.0 });
            stds.push(if self.config.with_std { std } else { 1.0 });
        }
        Ok(FittedStandardScaler {
            params: StandardScalerParams {
                config: self.config.clone(),
                columns: self.columns.clone(),
                mean: means,
                std: stds,
            },
        })
    }
}

impl FittedTransformer for FittedStandardScaler {
    type Params = StandardScalerParams;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.params.columns
    }

    fn transform(&self, data: &Dataset) -> Result<Dataset> {
        let mut replaced = Vec::with_capacity(self.params.columns.len());
        for (i, name) in self.params.columns.iter().enumerate() {
            let col = data.require(KIND, name, Some(ColumnKind::Numeric))?;
            let values = col
                .as_numeric()
                .unwrap_or(&[])
                .iter()
                .map(|v| v.map(|x| self.scale(i, x)))
                .collect();
            replaced.push(Column::numeric(name.as_str(), values));
        }
        data.with_replaced(replaced)
    }

    fn extract_params(&self) -> Self::Params {
        self.params.clone()
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        let n = params.columns.len();
        if params.mean.len() != n || params.std.len() != n {
            return Err(PipelineError::Serialization(format!(
                "scaler statistics do not match {} columns",
                n
            )));
        }
        Ok(Self { params })
    }
}

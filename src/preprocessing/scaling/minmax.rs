//! Min-Max Scaler.
//!
//! Scales each numeric column to a target range (default `[0, 1]`):
//! ```text
//! x_scaled = (x - col_min) / (col_max - col_min) * (max - min) + min
//! ```
//! A constant column maps to the lower bound of the range. Values outside the
//! training range are not clipped.

use crate::dataset::{Column, ColumnKind, Dataset};
use crate::error::{PipelineError, Result};
use crate::preprocessing::traits::{column_list, ensure_rows, FittedTransformer, Transformer};
use serde::{Deserialize, Serialize};

const KIND: &str = "minmax_scaler";

/// Configuration for MinMaxScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScalerConfig {
    /// Lower bound of the target range.
    pub min: f64,
    /// Upper bound of the target range.
    pub max: f64,
}

impl Default for MinMaxScalerConfig {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

/// Serializable parameters for a fitted MinMaxScaler.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MinMaxScalerParams {
    pub config: MinMaxScalerConfig,
    pub columns: Vec<String>,
    /// Training minimum of each column.
    pub data_min: Vec<f64>,
    /// Training maximum of each column.
    pub data_max: Vec<f64>,
}

/// MinMaxScaler transformer (unfitted).
#[derive(Clone, Debug)]
pub struct MinMaxScaler {
    columns: Vec<String>,
    config: MinMaxScalerConfig,
}

impl MinMaxScaler {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: column_list(columns),
            config: MinMaxScalerConfig::default(),
        }
    }

    /// Set the target range for scaling.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.config.min = min;
        self.config.max = max;
        self
    }
}

/// Fitted MinMaxScaler ready for inference.
#[derive(Clone, Debug)]
pub struct FittedMinMaxScaler {
    params: MinMaxScalerParams,
}

impl FittedMinMaxScaler {
    /// Training (min, max) of a column.
    pub fn data_range(&self, column: &str) -> Option<(f64, f64)> {
        let i = self.params.columns.iter().position(|c| c == column)?;
        Some((self.params.data_min[i], self.params.data_max[i]))
    }

    fn scale(&self, i: usize, x: f64) -> f64 {
        let (lo, hi) = (self.params.data_min[i], self.params.data_max[i]);
        let target = &self.params.config;
        if hi == lo {
            return target.min;
        }
        (x - lo) / (hi - lo) * (target.max - target.min) + target.min
    }
}

impl Transformer for MinMaxScaler {
    type Params = MinMaxScalerParams;
    type Fitted = FittedMinMaxScaler;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn fit(&self, data: &Dataset, _target: Option<&[f64]>) -> Result<Self::Fitted> {
        if self.config.max <= self.config.min {
            return Err(PipelineError::InvalidParameter(format!(
                "range max ({}) must be greater than min ({})",
                self.config.max, self.config.min
            )));
        }
        ensure_rows(KIND, data)?;
        let mut data_min = Vec::with_capacity(self.columns.len());
        let mut data_max = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            let col = data.require_complete(KIND, name, Some(ColumnKind::Numeric))?;
            let (lo, hi) = col
                .as_numeric()
                .unwrap_or(&[])
                .iter()
                .flatten()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
                    (lo.min(x), hi.max(x))
                });
            data_min.push(lo);
            data_max.push(hi);
        }
        Ok(FittedMinMaxScaler {
            params: MinMaxScalerParams {
                config: self.config.clone(),
                columns: self.columns.clone(),
                data_min,
                data_max,
            },
        })
    }
}

impl FittedTransformer for FittedMinMaxScaler {
    type Params = MinMaxScalerParams;

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
        if params.data_min.len() != n || params.data_max.len() != n {
            return Err(PipelineError::Serialization(format!(
                "scaler ranges do not match {} columns",
                n
            )));
        }
        Ok(Self { params })
    }
}

//! Missing-value indicator columns.
//!
//! For each target column `c`, appends a numeric column `c_na` holding `1.0`
//! where `c` is absent and `0.0` otherwise. Indicators are appended after all
//! existing columns, in target order. The target columns themselves are left
//! untouched, so the indicator must run before any imputer of the same columns.

use crate::dataset::{Column, Dataset};
use crate::error::{PipelineError, Result};
use crate::preprocessing::traits::{column_list, ensure_rows, FittedTransformer, Transformer};
use serde::{Deserialize, Serialize};

/// Suffix of generated indicator columns.
pub const MISSING_SUFFIX: &str = "_na";

const KIND: &str = "missing_indicator";

/// Name of the indicator column for `column`.
pub fn indicator_name(column: &str) -> String {
    format!("{}{}", column, MISSING_SUFFIX)
}

/// Appends a `<col>_na` indicator per target column.
#[derive(Clone, Debug)]
pub struct MissingIndicator {
    columns: Vec<String>,
}

impl MissingIndicator {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: column_list(columns),
        }
    }
}

/// Serializable parameters for a fitted MissingIndicator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MissingIndicatorParams {
    pub columns: Vec<String>,
}

/// Fitted MissingIndicator. Holds only the column list.
#[derive(Clone, Debug)]
pub struct FittedMissingIndicator {
    columns: Vec<String>,
}

impl FittedMissingIndicator {
    /// Names of the columns this stage appends.
    pub fn indicator_columns(&self) -> Vec<String> {
        self.columns.iter().map(|c| indicator_name(c)).collect()
    }
}

impl Transformer for MissingIndicator {
    type Params = MissingIndicatorParams;
    type Fitted = FittedMissingIndicator;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn fit(&self, data: &Dataset, _target: Option<&[f64]>) -> Result<Self::Fitted> {
        ensure_rows(KIND, data)?;
        for col in &self.columns {
            data.require(KIND, col, None)?;
            let indicator = indicator_name(col);
            if data.contains(&indicator) {
                return Err(PipelineError::configuration(
                    KIND,
                    format!("indicator column '{}' already exists", indicator),
                ));
            }
        }
        Ok(FittedMissingIndicator {
            columns: self.columns.clone(),
        })
    }
}

impl FittedTransformer for FittedMissingIndicator {
    type Params = MissingIndicatorParams;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn transform(&self, data: &Dataset) -> Result<Dataset> {
        let mut indicators = Vec::with_capacity(self.columns.len());
        for col in &self.columns {
            let source = data.require(KIND, col, None)?;
            let flags = (0..source.len())
                .map(|row| Some(if source.data().is_missing(row) { 1.0 } else { 0.0 }))
                .collect();
            indicators.push(Column::numeric(indicator_name(col), flags));
        }
        data.with_appended(indicators)
    }

    fn extract_params(&self) -> Self::Params {
        MissingIndicatorParams {
            columns: self.columns.clone(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        Ok(Self {
            columns: params.columns,
        })
    }
}

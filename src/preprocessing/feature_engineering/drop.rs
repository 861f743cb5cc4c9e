//! Removal of columns that should not reach the estimator.

use crate::dataset::Dataset;
use crate::error::Result;
use crate::preprocessing::traits::{column_list, FittedTransformer, Transformer};
use serde::{Deserialize, Serialize};

const KIND: &str = "drop_columns";

/// Drops the listed columns (unfitted).
#[derive(Clone, Debug)]
pub struct DropColumns {
    columns: Vec<String>,
}

impl DropColumns {
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

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DropColumnsParams {
    pub columns: Vec<String>,
}

/// Fitted DropColumns.
#[derive(Clone, Debug)]
pub struct FittedDropColumns {
    columns: Vec<String>,
}

impl Transformer for DropColumns {
    type Params = DropColumnsParams;
    type Fitted = FittedDropColumns;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn fit(&self, data: &Dataset, _target: Option<&[f64]>) -> Result<Self::Fitted> {
        for name in &self.columns {
            data.require(KIND, name, None)?;
        }
        Ok(FittedDropColumns {
            columns: self.columns.clone(),
        })
    }
}

impl FittedTransformer for FittedDropColumns {
    type Params = DropColumnsParams;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn transform(&self, data: &Dataset) -> Result<Dataset> {
        for name in &self.columns {
            data.require(KIND, name, None)?;
        }
        Ok(data.without(&self.columns))
    }

    fn extract_params(&self) -> Self::Params {
        DropColumnsParams {
            columns: self.columns.clone(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        Ok(Self {
            columns: params.columns,
        })
    }
}

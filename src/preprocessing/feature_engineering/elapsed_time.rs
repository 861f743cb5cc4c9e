//! Elapsed-time features.
//!
//! Replaces each year column with the years elapsed until a reference column,
//! e.g. `YearBuilt <- YrSold - YearBuilt`. The reference column is kept as is
//! but is part of the stage's column scope, since transform reads it.

use crate::dataset::{Column, ColumnKind, Dataset};
use crate::error::{PipelineError, Result};
use crate::preprocessing::traits::{column_list, ensure_rows, FittedTransformer, Transformer};
use serde::{Deserialize, Serialize};

const KIND: &str = "elapsed_time";

/// Elapsed-time transformer (unfitted).
#[derive(Clone, Debug)]
pub struct ElapsedTime {
    columns: Vec<String>,
    reference: String,
    scope: Vec<String>,
}

impl ElapsedTime {
    pub fn new<I, S>(columns: I, reference: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = column_list(columns);
        let reference = reference.into();
        let scope = scope(&columns, &reference);
        Self {
            columns,
            reference,
            scope,
        }
    }
}

/// Targets followed by the reference column.
fn scope(columns: &[String], reference: &str) -> Vec<String> {
    let mut scope = columns.to_vec();
    scope.push(reference.to_string());
    scope
}

/// Serializable parameters for a fitted ElapsedTime.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElapsedTimeParams {
    pub columns: Vec<String>,
    pub reference: String,
}

/// Fitted ElapsedTime. Stateless apart from the column names.
#[derive(Clone, Debug)]
pub struct FittedElapsedTime {
    params: ElapsedTimeParams,
    scope: Vec<String>,
}

impl FittedElapsedTime {
    fn build(params: ElapsedTimeParams) -> Self {
        let scope = scope(&params.columns, &params.reference);
        Self { params, scope }
    }

    pub fn reference(&self) -> &str {
        &self.params.reference
    }
}

fn check(columns: &[String], reference: &str) -> Result<()> {
    if columns.iter().any(|c| c == reference) {
        return Err(PipelineError::configuration(
            KIND,
            format!("reference column '{}' cannot also be a target", reference),
        ));
    }
    Ok(())
}

impl Transformer for ElapsedTime {
    type Params = ElapsedTimeParams;
    type Fitted = FittedElapsedTime;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.scope
    }

    fn fit(&self, data: &Dataset, _target: Option<&[f64]>) -> Result<Self::Fitted> {
        ensure_rows(KIND, data)?;
        check(&self.columns, &self.reference)?;
        data.require(KIND, &self.reference, Some(ColumnKind::Numeric))?;
        for name in &self.columns {
            data.require(KIND, name, Some(ColumnKind::Numeric))?;
        }
        Ok(FittedElapsedTime::build(ElapsedTimeParams {
            columns: self.columns.clone(),
            reference: self.reference.clone(),
        }))
    }
}

impl FittedTransformer for FittedElapsedTime {
    type Params = ElapsedTimeParams;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.scope
    }

    fn transform(&self, data: &Dataset) -> Result<Dataset> {
        let reference = data
            .require(KIND, &self.params.reference, Some(ColumnKind::Numeric))?
            .as_numeric()
            .unwrap_or(&[]);
        let mut replaced = Vec::with_capacity(self.params.columns.len());
        for name in &self.params.columns {
            let col = data.require(KIND, name, Some(ColumnKind::Numeric))?;
            let values = col
                .as_numeric()
                .unwrap_or(&[])
                .iter()
                .zip(reference)
                .map(|(v, r)| match (v, r) {
                    (Some(v), Some(r)) => Some(r - v),
                    _ => None,
                })
                .collect();
            replaced.push(Column::numeric(name.as_str(), values));
        }
        data.with_replaced(replaced)
    }

    fn extract_params(&self) -> Self::Params {
        self.params.clone()
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        check(&params.columns, &params.reference)?;
        Ok(Self::build(params))
    }
}

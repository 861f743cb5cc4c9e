//! Honorific extraction from passenger names.
//!
//! Names such as `"Cumings, Mrs. John Bradley"` carry a title that is a
//! strong proxy for age and sex. Titles are matched in the order
//! `Mrs`, `Mr`, `Miss`, `Master`; anything else becomes `Other`.

use crate::dataset::{Column, ColumnKind, Dataset};
use crate::error::{PipelineError, Result};
use crate::preprocessing::traits::{ensure_rows, FittedTransformer, Transformer};
use serde::{Deserialize, Serialize};

const KIND: &str = "extract_title";

/// Default name of the output column.
pub const TITLE_COLUMN: &str = "title";

/// Recognised titles, in match order.
const TITLES: [&str; 4] = ["Mrs", "Mr", "Miss", "Master"];
const OTHER_TITLE: &str = "Other";

/// Title extractor (unfitted).
#[derive(Clone, Debug)]
pub struct ExtractTitle {
    columns: Vec<String>,
    output: String,
}

impl ExtractTitle {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            columns: vec![column.into()],
            output: TITLE_COLUMN.to_string(),
        }
    }

    /// Name of the appended title column.
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }
}

/// Serializable parameters for a fitted ExtractTitle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExtractTitleParams {
    pub column: String,
    pub output: String,
}

/// Fitted ExtractTitle.
#[derive(Clone, Debug)]
pub struct FittedExtractTitle {
    columns: Vec<String>,
    output: String,
}

impl FittedExtractTitle {
    pub fn output_column(&self) -> &str {
        &self.output
    }
}

/// Title of a passenger name.
pub fn title_of(name: &str) -> &'static str {
    TITLES
        .iter()
        .find(|t| name.contains(&format!("{}.", t)))
        .or_else(|| TITLES.iter().find(|t| name.contains(*t)))
        .copied()
        .unwrap_or(OTHER_TITLE)
}

impl Transformer for ExtractTitle {
    type Params = ExtractTitleParams;
    type Fitted = FittedExtractTitle;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn fit(&self, data: &Dataset, _target: Option<&[f64]>) -> Result<Self::Fitted> {
        ensure_rows(KIND, data)?;
        data.require(KIND, &self.columns[0], Some(ColumnKind::Categorical))?;
        if data.contains(&self.output) {
            return Err(PipelineError::configuration(
                KIND,
                format!("output column '{}' already exists", self.output),
            ));
        }
        Ok(FittedExtractTitle {
            columns: self.columns.clone(),
            output: self.output.clone(),
        })
    }
}

impl FittedTransformer for FittedExtractTitle {
    type Params = ExtractTitleParams;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn transform(&self, data: &Dataset) -> Result<Dataset> {
        let names = data
            .require(KIND, &self.columns[0], Some(ColumnKind::Categorical))?
            .as_categorical()
            .unwrap_or(&[]);
        let titles: Vec<Option<&str>> = names
            .iter()
            .map(|n| n.as_deref().map(title_of))
            .collect();
        data.with_appended(vec![Column::categorical(self.output.as_str(), titles)])
    }

    fn extract_params(&self) -> Self::Params {
        ExtractTitleParams {
            column: self.columns[0].clone(),
            output: self.output.clone(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        Ok(Self {
            columns: vec![params.column],
            output: params.output,
        })
    }
}

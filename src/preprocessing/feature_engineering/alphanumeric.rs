//! Splitting of mixed alphanumeric codes.
//!
//! A code such as a cabin `"C85"` carries a deck letter and a room number.
//! This stage appends `<col>_num` (the first run of digits, as a number) and
//! `<col>_cat` (the first character) and can drop the source column.

use crate::dataset::{Column, ColumnKind, Dataset};
use crate::error::{PipelineError, Result};
use crate::preprocessing::traits::{ensure_rows, FittedTransformer, Transformer};
use serde::{Deserialize, Serialize};

const KIND: &str = "split_alphanumeric";

/// Splits a categorical code column into numeric and categorical parts.
#[derive(Clone, Debug)]
pub struct SplitAlphanumeric {
    columns: Vec<String>,
    drop_original: bool,
}

impl SplitAlphanumeric {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            columns: vec![column.into()],
            drop_original: false,
        }
    }

    /// Remove the source column after splitting.
    pub fn with_drop_original(mut self, drop_original: bool) -> Self {
        self.drop_original = drop_original;
        self
    }

    fn column(&self) -> &str {
        &self.columns[0]
    }
}

/// Serializable parameters for a fitted SplitAlphanumeric.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SplitAlphanumericParams {
    pub column: String,
    pub drop_original: bool,
}

/// Fitted SplitAlphanumeric.
#[derive(Clone, Debug)]
pub struct FittedSplitAlphanumeric {
    columns: Vec<String>,
    drop_original: bool,
}

impl FittedSplitAlphanumeric {
    /// Names of the (numeric, categorical) output columns.
    pub fn output_columns(&self) -> (String, String) {
        output_names(&self.columns[0])
    }
}

fn output_names(column: &str) -> (String, String) {
    (format!("{}_num", column), format!("{}_cat", column))
}

/// First run of ASCII digits, parsed.
fn leading_number(code: &str) -> Option<f64> {
    let start = code.find(|c: char| c.is_ascii_digit())?;
    let digits: String = code[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn first_char(code: &str) -> Option<String> {
    code.chars().next().map(String::from)
}

impl Transformer for SplitAlphanumeric {
    type Params = SplitAlphanumericParams;
    type Fitted = FittedSplitAlphanumeric;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn fit(&self, data: &Dataset, _target: Option<&[f64]>) -> Result<Self::Fitted> {
        ensure_rows(KIND, data)?;
        data.require(KIND, self.column(), Some(ColumnKind::Categorical))?;
        let (num, cat) = output_names(self.column());
        for out in [&num, &cat] {
            if data.contains(out) {
                return Err(PipelineError::configuration(
                    KIND,
                    format!("output column '{}' already exists", out),
                ));
            }
        }
        Ok(FittedSplitAlphanumeric {
            columns: self.columns.clone(),
            drop_original: self.drop_original,
        })
    }
}

impl FittedTransformer for FittedSplitAlphanumeric {
    type Params = SplitAlphanumericParams;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn transform(&self, data: &Dataset) -> Result<Dataset> {
        let source = &self.columns[0];
        let codes = data
            .require(KIND, source, Some(ColumnKind::Categorical))?
            .as_categorical()
            .unwrap_or(&[]);
        let numbers = codes
            .iter()
            .map(|c| c.as_deref().and_then(leading_number))
            .collect();
        let letters: Vec<Option<String>> = codes
            .iter()
            .map(|c| c.as_deref().and_then(first_char))
            .collect();
        let (num, cat) = self.output_columns();
        let out = data.with_appended(vec![
            Column::numeric(num, numbers),
            Column::categorical(cat, letters),
        ])?;
        if self.drop_original {
            Ok(out.without(&self.columns))
        } else {
            Ok(out)
        }
    }

    fn extract_params(&self) -> Self::Params {
        SplitAlphanumericParams {
            column: self.columns[0].clone(),
            drop_original: self.drop_original,
        }
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        Ok(Self {
            columns: vec![params.column],
            drop_original: params.drop_original,
        })
    }
}

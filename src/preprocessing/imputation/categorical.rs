//! Imputation of categorical columns.
//!
//! The default fill is the literal label `"Missing"`, which keeps absence as
//! its own category so downstream encoders can learn from it. The `Frequent`
//! fill uses the most common training value instead.

use crate::dataset::{Column, ColumnKind, Dataset};
use crate::error::{PipelineError, Result};
use crate::preprocessing::traits::{column_list, ensure_rows, FittedTransformer, Transformer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const KIND: &str = "categorical_imputer";

/// Default label written into absent categorical cells.
pub const MISSING_LABEL: &str = "Missing";

/// How absent categorical cells are filled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoricalFill {
    /// Constant label (default `"Missing"`).
    #[default]
    Missing,
    /// Most frequent training value. Ties go to the value seen first.
    Frequent,
}

/// Imputer for categorical columns (unfitted).
#[derive(Clone, Debug)]
pub struct CategoricalImputer {
    columns: Vec<String>,
    fill: CategoricalFill,
    fill_label: String,
}

impl CategoricalImputer {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: column_list(columns),
            fill: CategoricalFill::default(),
            fill_label: MISSING_LABEL.to_string(),
        }
    }

    pub fn with_fill(mut self, fill: CategoricalFill) -> Self {
        self.fill = fill;
        self
    }

    /// Label used by [`CategoricalFill::Missing`].
    pub fn with_fill_label(mut self, label: impl Into<String>) -> Self {
        self.fill_label = label.into();
        self
    }
}

/// Serializable parameters for a fitted CategoricalImputer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CategoricalImputerParams {
    pub fill: CategoricalFill,
    pub columns: Vec<String>,
    /// Fill label per column, aligned with `columns`.
    pub fill_values: Vec<String>,
}

/// Fitted CategoricalImputer.
#[derive(Clone, Debug)]
pub struct FittedCategoricalImputer {
    params: CategoricalImputerParams,
}

impl FittedCategoricalImputer {
    /// Fill label for a single column.
    pub fn fill_value(&self, column: &str) -> Option<&str> {
        self.params
            .columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.params.fill_values[i].as_str())
    }
}

/// Most frequent value, first-encountered on ties.
fn mode(values: &[Option<String>]) -> Option<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (pos, v) in values.iter().flatten().enumerate() {
        let entry = counts.entry(v.as_str()).or_insert((0, pos));
        entry.0 += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)))
        .map(|(v, _)| v.to_string())
}

impl Transformer for CategoricalImputer {
    type Params = CategoricalImputerParams;
    type Fitted = FittedCategoricalImputer;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn fit(&self, data: &Dataset, _target: Option<&[f64]>) -> Result<Self::Fitted> {
        ensure_rows(KIND, data)?;
        let mut fill_values = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            let col = data.require(KIND, name, Some(ColumnKind::Categorical))?;
            let value = match self.fill {
                CategoricalFill::Missing => self.fill_label.clone(),
                CategoricalFill::Frequent => mode(col.as_categorical().unwrap_or(&[]))
                    .ok_or_else(|| {
                        PipelineError::fit(KIND, name, "every training value is missing")
                    })?,
            };
            fill_values.push(value);
        }
        Ok(FittedCategoricalImputer {
            params: CategoricalImputerParams {
                fill: self.fill,
                columns: self.columns.clone(),
                fill_values,
            },
        })
    }
}

impl FittedTransformer for FittedCategoricalImputer {
    type Params = CategoricalImputerParams;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.params.columns
    }

    fn transform(&self, data: &Dataset) -> Result<Dataset> {
        let mut replaced = Vec::with_capacity(self.params.columns.len());
        for (name, fill) in self.params.columns.iter().zip(&self.params.fill_values) {
            let col = data.require(KIND, name, Some(ColumnKind::Categorical))?;
            let values: Vec<Option<String>> = col
                .as_categorical()
                .unwrap_or(&[])
                .iter()
                .map(|v| Some(v.clone().unwrap_or_else(|| fill.clone())))
                .collect();
            replaced.push(Column::categorical(name.as_str(), values));
        }
        data.with_replaced(replaced)
    }

    fn extract_params(&self) -> Self::Params {
        self.params.clone()
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        if params.columns.len() != params.fill_values.len() {
            return Err(PipelineError::Serialization(format!(
                "{} columns but {} fill values",
                params.columns.len(),
                params.fill_values.len()
            )));
        }
        Ok(Self { params })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn train() -> Dataset {
        Dataset::new(vec![
            Column::categorical("Cabin", vec![None, Some("C85"), None, Some("C123")]),
            Column::categorical(
                "Embarked",
                vec![Some("S"), Some("C"), Some("S"), None],
            ),
            Column::numeric_dense("Fare", vec![7.25, 71.28, 7.92, 53.1]),
        ])
        .unwrap()
    }

    #[test]
    fn test_missing_label_fill() {
        let data = train();
        let fitted = CategoricalImputer::new(["Cabin"]).fit(&data, None).unwrap();
        let out = fitted.transform(&data).unwrap();
        let cabin = out.column("Cabin").unwrap().as_categorical().unwrap();
        assert_eq!(cabin[0].as_deref(), Some("Missing"));
        assert_eq!(cabin[1].as_deref(), Some("C85"));
        assert_eq!(out.column("Cabin").unwrap().n_missing(), 0);
        // Other columns untouched
        assert_eq!(out.column("Embarked").unwrap().n_missing(), 1);
    }

    #[test]
    fn test_custom_label() {
        let fitted = CategoricalImputer::new(["Cabin"])
            .with_fill_label("NoCabin")
            .fit(&train(), None)
            .unwrap();
        assert_eq!(fitted.fill_value("Cabin"), Some("NoCabin"));
    }

    #[test]
    fn test_frequent_fill() {
        let data = train();
        let fitted = CategoricalImputer::new(["Embarked"])
            .with_fill(CategoricalFill::Frequent)
            .fit(&data, None)
            .unwrap();
        assert_eq!(fitted.fill_value("Embarked"), Some("S"));
        let out = fitted.transform(&data).unwrap();
        assert_eq!(
            out.column("Embarked").unwrap().as_categorical().unwrap()[3].as_deref(),
            Some("S")
        );
    }

    #[test]
    fn test_frequent_tie_goes_to_first_seen() {
        let data = Dataset::new(vec![Column::categorical(
            "x",
            vec![Some("b"), Some("a"), Some("a"), Some("b")],
        )])
        .unwrap();
        let fitted = CategoricalImputer::new(["x"])
            .with_fill(CategoricalFill::Frequent)
            .fit(&data, None)
            .unwrap();
        assert_eq!(fitted.fill_value("x"), Some("b"));
    }

    #[test]
    fn test_frequent_all_missing_is_fit_error() {
        let data = Dataset::new(vec![Column::categorical::<String>("x", vec![None, None])]).unwrap();
        let result = CategoricalImputer::new(["x"])
            .with_fill(CategoricalFill::Frequent)
            .fit(&data, None);
        assert!(matches!(result, Err(PipelineError::Fit { .. })));
    }

    #[test]
    fn test_numeric_column_rejected() {
        let result = CategoricalImputer::new(["Fare"]).fit(&train(), None);
        assert!(matches!(result, Err(PipelineError::Configuration { .. })));
    }

    #[test]
    fn test_params_round_trip() {
        let fitted = CategoricalImputer::new(["Cabin", "Embarked"])
            .fit(&train(), None)
            .unwrap();
        let restored = FittedCategoricalImputer::from_params(fitted.extract_params()).unwrap();
        assert_eq!(
            restored.transform(&train()).unwrap(),
            fitted.transform(&train()).unwrap()
        );
    }
}

//! Natural-log transform of skewed, strictly positive numeric columns.

use crate::dataset::{Column, ColumnKind, Dataset};
use crate::error::{PipelineError, Result};
use crate::preprocessing::traits::{
    column_list, ensure_rows, log_unseen, FittedTransformer, Transformer, UnseenValues,
};
use serde::{Deserialize, Serialize};

const KIND: &str = "log_transform";

/// Log transformer (unfitted).
///
/// Fit rejects columns holding zero or negative values. At transform time a
/// non-positive value is clamped to the smallest training value before the
/// log is taken and reported as out of range.
#[derive(Clone, Debug)]
pub struct LogTransform {
    columns: Vec<String>,
}

impl LogTransform {
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

/// Serializable parameters for a fitted LogTransform.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogTransformParams {
    pub columns: Vec<String>,
    /// Smallest training value of each column.
    pub minimums: Vec<f64>,
}

/// Fitted LogTransform.
#[derive(Clone, Debug)]
pub struct FittedLogTransform {
    params: LogTransformParams,
}

impl FittedLogTransform {
    pub fn minimum(&self, column: &str) -> Option<f64> {
        let i = self.params.columns.iter().position(|c| c == column)?;
        Some(self.params.minimums[i])
    }
}

impl Transformer for LogTransform {
    type Params = LogTransformParams;
    type Fitted = FittedLogTransform;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn fit(&self, data: &Dataset, _target: Option<&[f64]>) -> Result<Self::Fitted> {
        ensure_rows(KIND, data)?;
        let mut minimums = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            let col = data.require_complete(KIND, name, Some(ColumnKind::Numeric))?;
            let min = col
                .as_numeric()
                .unwrap_or(&[])
                .iter()
                .flatten()
                .copied()
                .fold(f64::INFINITY, f64::min);
            if min <= 0.0 {
                return Err(PipelineError::fit(
                    KIND,
                    name,
                    format!("log needs strictly positive values, found {}", min),
                ));
            }
            minimums.push(min);
        }
        Ok(FittedLogTransform {
            params: LogTransformParams {
                columns: self.columns.clone(),
                minimums,
            },
        })
    }
}

impl FittedTransformer for FittedLogTransform {
    type Params = LogTransformParams;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.params.columns
    }

    fn transform(&self, data: &Dataset) -> Result<Dataset> {
        let mut replaced = Vec::with_capacity(self.params.columns.len());
        for (name, &min) in self.params.columns.iter().zip(&self.params.minimums) {
            let col = data.require(KIND, name, Some(ColumnKind::Numeric))?;
            let values = col
                .as_numeric()
                .unwrap_or(&[])
                .iter()
                .map(|v| v.map(|x| (if x > 0.0 { x } else { min }).ln()))
                .collect();
            replaced.push(Column::numeric(name.as_str(), values));
        }
        log_unseen(KIND, &self.unseen(data));
        data.with_replaced(replaced)
    }

    /// Counts non-positive values, which the log cannot take.
    fn unseen(&self, data: &Dataset) -> Vec<UnseenValues> {
        self.params
            .columns
            .iter()
            .filter_map(|name| {
                let values = data.column(name)?.as_numeric()?;
                let count = values.iter().flatten().filter(|&&x| x <= 0.0).count();
                Some(UnseenValues {
                    column: name.clone(),
                    count,
                })
            })
            .collect()
    }

    fn extract_params(&self) -> Self::Params {
        self.params.clone()
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        if params.columns.len() != params.minimums.len() {
            return Err(PipelineError::Serialization(format!(
                "{} columns but {} minimums",
                params.columns.len(),
                params.minimums.len()
            )));
        }
        Ok(Self { params })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> Dataset {
        Dataset::new(vec![
            Column::numeric_dense("LotArea", vec![1.0, std::f64::consts::E, 100.0]),
            Column::numeric_dense("BsmtUnfSF", vec![0.0, 10.0, 20.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_log_values() {
        let fitted = LogTransform::new(["LotArea"]).fit(&data(), None).unwrap();
        let out = fitted.transform(&data()).unwrap();
        let v = out.column("LotArea").unwrap().as_numeric().unwrap();
        assert_eq!(v[0], Some(0.0));
        assert!((v[1].unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(fitted.minimum("LotArea"), Some(1.0));
    }

    #[test]
    fn test_non_positive_at_fit_is_fit_error() {
        let result = LogTransform::new(["BsmtUnfSF"]).fit(&data(), None);
        assert!(matches!(result, Err(PipelineError::Fit { .. })));
    }

    #[test]
    fn test_non_positive_at_transform_clamps() {
        let train = Dataset::new(vec![Column::numeric_dense("x", vec![2.0, 4.0])]).unwrap();
        let fitted = LogTransform::new(["x"]).fit(&train, None).unwrap();
        let test = Dataset::new(vec![Column::numeric_dense("x", vec![-3.0, 0.0, 4.0])]).unwrap();
        let out = fitted.transform(&test).unwrap();
        assert_eq!(
            out.column("x").unwrap().as_numeric().unwrap(),
            &[Some(2f64.ln()), Some(2f64.ln()), Some(4f64.ln())]
        );
        assert_eq!(fitted.unseen(&test)[0].count, 2);
    }
}

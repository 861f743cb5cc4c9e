//! Ordinal encoding of categorical columns.
//!
//! Maps each category to an integer rank, producing a numeric column in place
//! of the categorical one. With [`OrdinalMethod::Ordered`] (the default) ranks
//! follow the ascending mean training target of each category, so the encoded
//! column is monotone in the target. [`OrdinalMethod::Arbitrary`] ranks by
//! first appearance and needs no target.
//!
//! Categories not observed during fit, and absent cells, are encoded as
//! [`UNSEEN_RANK`]. The `"Unseen"` bucket of an upstream rare-label encoder is
//! encoded the same way but is not counted again by
//! [`FittedTransformer::unseen`]; the rare-label stage already reported it.

use super::rare_label::UNSEEN_LABEL;
use crate::dataset::{Column, ColumnKind, Dataset};
use crate::error::{PipelineError, Result};
use crate::preprocessing::traits::{
    column_list, ensure_rows, log_unseen, FittedTransformer, Transformer, UnseenValues,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const KIND: &str = "ordinal_encoder";

/// Rank assigned to categories the encoder never saw. Outside `0..n_categories`.
pub const UNSEEN_RANK: f64 = -1.0;

/// How ranks are assigned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrdinalMethod {
    /// Ascending mean target; ties keep encounter order.
    #[default]
    Ordered,
    /// Encounter order.
    Arbitrary,
}

/// Ordinal encoder (unfitted).
///
/// # Example
/// ```rust
/// use feature_pipe::dataset::{Column, Dataset};
/// use feature_pipe::preprocessing::{FittedTransformer, OrdinalEncoder, Transformer};
///
/// let train = Dataset::new(vec![Column::categorical(
///     "sex",
///     vec![Some("male"), Some("female"), Some("male"), Some("female")],
/// )])?;
/// let survived = [0.0, 1.0, 0.0, 1.0];
///
/// let fitted = OrdinalEncoder::new(["sex"]).fit(&train, Some(&survived))?;
/// assert_eq!(fitted.rank("sex", "male"), Some(0));
/// assert_eq!(fitted.rank("sex", "female"), Some(1));
/// # Ok::<(), feature_pipe::PipelineError>(())
/// ```
#[derive(Clone, Debug)]
pub struct OrdinalEncoder {
    columns: Vec<String>,
    method: OrdinalMethod,
}

impl OrdinalEncoder {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: column_list(columns),
            method: OrdinalMethod::default(),
        }
    }

    pub fn with_method(mut self, method: OrdinalMethod) -> Self {
        self.method = method;
        self
    }
}

/// Serializable parameters for a fitted OrdinalEncoder.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrdinalEncoderParams {
    pub method: OrdinalMethod,
    pub columns: Vec<String>,
    /// Categories per column; a category's position is its rank.
    pub categories: Vec<Vec<String>>,
}

/// Fitted OrdinalEncoder.
#[derive(Clone, Debug)]
pub struct FittedOrdinalEncoder {
    params: OrdinalEncoderParams,
    mappings: Vec<HashMap<String, usize>>,
}

impl FittedOrdinalEncoder {
    fn build(params: OrdinalEncoderParams) -> Self {
        let mappings = params
            .categories
            .iter()
            .map(|cats| {
                cats.iter()
                    .enumerate()
                    .map(|(rank, c)| (c.clone(), rank))
                    .collect()
            })
            .collect();
        Self { params, mappings }
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.params.columns.iter().position(|c| c == column)
    }

    /// Categories of a column in rank order.
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.position(column)
            .map(|i| self.params.categories[i].as_slice())
    }

    /// Category-to-rank mapping of a column.
    pub fn mapping(&self, column: &str) -> Option<&HashMap<String, usize>> {
        self.position(column).map(|i| &self.mappings[i])
    }

    /// Rank of a single category, `None` if it was not seen at fit.
    pub fn rank(&self, column: &str, category: &str) -> Option<usize> {
        self.mapping(column)?.get(category).copied()
    }
}

/// Categories in encounter order with their mean target.
fn category_means(values: &[Option<String>], target: &[f64]) -> Vec<(String, f64)> {
    let mut sums: Vec<(String, f64, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (v, &y) in values.iter().zip(target) {
        let Some(v) = v else { continue };
        match index.get(v.as_str()) {
            Some(&i) => {
                sums[i].1 += y;
                sums[i].2 += 1;
            }
            None => {
                index.insert(v.as_str(), sums.len());
                sums.push((v.clone(), y, 1));
            }
        }
    }
    sums.into_iter()
        .map(|(c, sum, n)| (c, sum / n as f64))
        .collect()
}

impl Transformer for OrdinalEncoder {
    type Params = OrdinalEncoderParams;
    type Fitted = FittedOrdinalEncoder;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn fit(&self, data: &Dataset, target: Option<&[f64]>) -> Result<Self::Fitted> {
        ensure_rows(KIND, data)?;
        let target = match (self.method, target) {
            (OrdinalMethod::Ordered, None) => {
                return Err(PipelineError::configuration(
                    KIND,
                    "target-ordered encoding needs training labels",
                ))
            }
            (_, Some(t)) if t.len() != data.n_rows() => {
                return Err(PipelineError::configuration(
                    KIND,
                    format!("{} labels for {} rows", t.len(), data.n_rows()),
                ))
            }
            (_, t) => t,
        };

        let mut categories = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            let col = data.require_complete(KIND, name, Some(ColumnKind::Categorical))?;
            let values = col.as_categorical().unwrap_or(&[]);
            let ordered: Vec<String> = match (self.method, target) {
                (OrdinalMethod::Ordered, Some(target)) => {
                    let mut means = category_means(values, target);
                    means.sort_by(|a, b| a.1.total_cmp(&b.1));
                    means.into_iter().map(|(c, _)| c).collect()
                }
                _ => {
                    let zeros = vec![0.0; values.len()];
                    category_means(values, &zeros)
                        .into_iter()
                        .map(|(c, _)| c)
                        .collect()
                }
            };
            tracing::debug!(stage = KIND, column = %name, categories = ordered.len(), "ranked categories");
            categories.push(ordered);
        }

        Ok(FittedOrdinalEncoder::build(OrdinalEncoderParams {
            method: self.method,
            columns: self.columns.clone(),
            categories,
        }))
    }
}

impl FittedTransformer for FittedOrdinalEncoder {
    type Params = OrdinalEncoderParams;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.params.columns
    }

    fn transform(&self, data: &Dataset) -> Result<Dataset> {
        let mut replaced = Vec::with_capacity(self.params.columns.len());
        for (name, mapping) in self.params.columns.iter().zip(&self.mappings) {
            let col = data.require(KIND, name, Some(ColumnKind::Categorical))?;
            let values = col
                .as_categorical()
                .unwrap_or(&[])
                .iter()
                .map(|v| {
                    Some(
                        v.as_ref()
                            .and_then(|c| mapping.get(c))
                            .map_or(UNSEEN_RANK, |&rank| rank as f64),
                    )
                })
                .collect();
            replaced.push(Column::numeric(name.as_str(), values));
        }
        log_unseen(KIND, &self.unseen(data));
        data.with_replaced(replaced)
    }

    fn unseen(&self, data: &Dataset) -> Vec<UnseenValues> {
        self.params
            .columns
            .iter()
            .zip(&self.mappings)
            .filter_map(|(name, mapping)| {
                let values = data.column(name)?.as_categorical()?;
                let count = values
                    .iter()
                    .flatten()
                    .filter(|v| v.as_str() != UNSEEN_LABEL && !mapping.contains_key(v.as_str()))
                    .count();
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
        if params.categories.len() != params.columns.len() {
            return Err(PipelineError::Serialization(format!(
                "{} columns but {} category lists",
                params.columns.len(),
                params.categories.len()
            )));
        }
        Ok(Self::build(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn train() -> (Dataset, Vec<f64>) {
        let data = Dataset::new(vec![
            Column::categorical(
                "embarked",
                vec![
                    Some("S"),
                    Some("C"),
                    Some("Q"),
                    Some("S"),
                    Some("C"),
                    Some("S"),
                ],
            ),
            Column::numeric_dense("fare", vec![7.0, 70.0, 8.0, 9.0, 80.0, 10.0]),
        ])
        .unwrap();
        // Mean survival: S = 1/3, C = 1.0, Q = 0.0
        let survived = vec![0.0, 1.0, 0.0, 1.0, 1.0, 0.0];
        (data, survived)
    }

    #[test]
    fn test_ranks_follow_mean_target() {
        let (data, y) = train();
        let fitted = OrdinalEncoder::new(["embarked"])
            .fit(&data, Some(&y))
            .unwrap();
        assert_eq!(
            fitted.categories("embarked").unwrap(),
            &["Q".to_string(), "S".to_string(), "C".to_string()]
        );
        let out = fitted.transform(&data).unwrap();
        let encoded = out.column("embarked").unwrap().as_numeric().unwrap();
        assert_eq!(
            encoded,
            &[Some(1.0), Some(2.0), Some(0.0), Some(1.0), Some(2.0), Some(1.0)]
        );
        // Column kept its position
        assert_eq!(out.column_names(), vec!["embarked", "fare"]);
    }

    #[test]
    fn test_rank_monotone_in_mean_target() {
        let (data, y) = train();
        let fitted = OrdinalEncoder::new(["embarked"])
            .fit(&data, Some(&y))
            .unwrap();
        let values = data.column("embarked").unwrap().as_categorical().unwrap();
        let means = category_means(values, &y);
        for (a, mean_a) in &means {
            for (b, mean_b) in &means {
                if mean_a < mean_b {
                    assert!(fitted.rank("embarked", a) <= fitted.rank("embarked", b));
                }
            }
        }
    }

    #[test]
    fn test_unseen_and_missing_get_sentinel() {
        let (data, y) = train();
        let fitted = OrdinalEncoder::new(["embarked"])
            .fit(&data, Some(&y))
            .unwrap();
        let test = Dataset::new(vec![Column::categorical(
            "embarked",
            vec![Some("X"), None, Some("C")],
        )])
        .unwrap();
        let out = fitted.transform(&test).unwrap();
        assert_eq!(
            out.column("embarked").unwrap().as_numeric().unwrap(),
            &[Some(UNSEEN_RANK), Some(UNSEEN_RANK), Some(2.0)]
        );
        assert_eq!(fitted.unseen(&test)[0].count, 1);
    }

    #[test]
    fn test_upstream_unseen_bucket_not_counted_twice() {
        let (data, y) = train();
        let fitted = OrdinalEncoder::new(["embarked"])
            .fit(&data, Some(&y))
            .unwrap();
        let test = Dataset::new(vec![Column::categorical(
            "embarked",
            vec![Some(UNSEEN_LABEL), Some("X")],
        )])
        .unwrap();
        let out = fitted.transform(&test).unwrap();
        assert_eq!(
            out.column("embarked").unwrap().as_numeric().unwrap(),
            &[Some(UNSEEN_RANK), Some(UNSEEN_RANK)]
        );
        assert_eq!(fitted.unseen(&test)[0].count, 1);
    }

    #[test]
    fn test_arbitrary_is_encounter_order() {
        let (data, _) = train();
        let fitted = OrdinalEncoder::new(["embarked"])
            .with_method(OrdinalMethod::Arbitrary)
            .fit(&data, None)
            .unwrap();
        assert_eq!(fitted.rank("embarked", "S"), Some(0));
        assert_eq!(fitted.rank("embarked", "C"), Some(1));
        assert_eq!(fitted.rank("embarked", "Q"), Some(2));
    }

    #[test]
    fn test_ordered_needs_labels() {
        let (data, _) = train();
        let result = OrdinalEncoder::new(["embarked"]).fit(&data, None);
        assert!(matches!(result, Err(PipelineError::Configuration { .. })));
        let result = OrdinalEncoder::new(["embarked"]).fit(&data, Some(&[1.0]));
        assert!(matches!(result, Err(PipelineError::Configuration { .. })));
    }

    #[test]
    fn test_missing_values_at_fit_rejected() {
        let data = Dataset::new(vec![Column::categorical("c", vec![Some("a"), None])]).unwrap();
        let result = OrdinalEncoder::new(["c"]).fit(&data, Some(&[0.0, 1.0]));
        assert!(matches!(result, Err(PipelineError::Configuration { .. })));
    }

    #[test]
    fn test_params_round_trip() {
        let (data, y) = train();
        let fitted = OrdinalEncoder::new(["embarked"])
            .fit(&data, Some(&y))
            .unwrap();
        let restored = FittedOrdinalEncoder::from_params(fitted.extract_params()).unwrap();
        assert_eq!(restored.mapping("embarked"), fitted.mapping("embarked"));
        assert_eq!(
            restored.transform(&data).unwrap(),
            fitted.transform(&data).unwrap()
        );
    }
}

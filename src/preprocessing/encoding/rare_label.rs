//! Rare-label grouping for categorical columns.
//!
//! Fit builds a frequency table per column. Every category whose share of
//! training rows is below `tol` is rare, and so is every category beyond the
//! `max_n_categories` most frequent. Rare categories are collapsed into a
//! shared `"Rare"` label at transform time.
//!
//! [`RareLabelEncoder::with_n_categories`] opts into skipping columns with few
//! distinct values; by default every column is grouped.
//!
//! The two bucket labels are reserved: a training column that already holds
//! `"Rare"` or `"Unseen"` is rejected at fit.
//!
//! Categories never observed during fit go to a separate `"Unseen"` label by
//! default, so a downstream ordinal encoder gives them its sentinel rank.
//! [`UnseenLabels::AsRare`] folds them into the rare bucket instead.
//!
//! # Example
//! ```rust
//! use feature_pipe::dataset::{Column, Dataset};
//! use feature_pipe::preprocessing::{FittedTransformer, RareLabelEncoder, Transformer};
//!
//! let mut cabins = vec![Some("B"); 60];
//! cabins.extend(vec![Some("C"); 39]);
//! cabins.push(Some("T"));
//! let train = Dataset::new(vec![Column::categorical("cabin_cat", cabins)])?;
//!
//! let fitted = RareLabelEncoder::new(["cabin_cat"])
//!     .with_tol(0.05)
//!     .with_n_categories(1)
//!     .fit(&train, None)?;
//! assert_eq!(fitted.rare_labels("cabin_cat").unwrap(), &["T".to_string()]);
//! # Ok::<(), feature_pipe::PipelineError>(())
//! ```

use crate::dataset::{Column, ColumnKind, Dataset};
use crate::error::{PipelineError, Result};
use crate::preprocessing::traits::{
    column_list, ensure_rows, log_unseen, FittedTransformer, Transformer, UnseenValues,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const KIND: &str = "rare_label_encoder";

/// Label shared by every rare category.
pub const RARE_LABEL: &str = "Rare";
/// Label for categories not observed during fit.
pub const UNSEEN_LABEL: &str = "Unseen";

/// Where categories never observed during fit are sent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnseenLabels {
    /// Separate `"Unseen"` bucket.
    #[default]
    Separate,
    /// Same bucket as rare categories.
    AsRare,
}

/// Hyperparameters for [`RareLabelEncoder`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RareLabelConfig {
    /// Minimum share of training rows for a category to be frequent.
    pub tol: f64,
    /// Grouping only applies to columns with more distinct values than this.
    /// The default of 1 groups every column.
    pub n_categories: usize,
    /// Keep at most this many frequent categories.
    pub max_n_categories: Option<usize>,
    pub unseen: UnseenLabels,
}

impl Default for RareLabelConfig {
    fn default() -> Self {
        Self {
            tol: 0.05,
            n_categories: 1,
            max_n_categories: None,
            unseen: UnseenLabels::default(),
        }
    }
}

/// Rare-label encoder (unfitted).
#[derive(Clone, Debug)]
pub struct RareLabelEncoder {
    columns: Vec<String>,
    config: RareLabelConfig,
}

impl RareLabelEncoder {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: column_list(columns),
            config: RareLabelConfig::default(),
        }
    }

    /// Frequency share below which a category is rare.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.config.tol = tol;
        self
    }

    /// Skip grouping for columns with at most this many distinct values.
    pub fn with_n_categories(mut self, n_categories: usize) -> Self {
        self.config.n_categories = n_categories;
        self
    }

    /// Cap on the number of frequent categories kept.
    pub fn with_max_n_categories(mut self, max_n_categories: usize) -> Self {
        self.config.max_n_categories = Some(max_n_categories);
        self
    }

    pub fn with_unseen(mut self, unseen: UnseenLabels) -> Self {
        self.config.unseen = unseen;
        self
    }

    pub fn config(&self) -> &RareLabelConfig {
        &self.config
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.config.tol) {
            return Err(PipelineError::InvalidParameter(format!(
                "tol must be within [0, 1], got {}",
                self.config.tol
            )));
        }
        if self.config.max_n_categories == Some(0) {
            return Err(PipelineError::InvalidParameter(
                "max_n_categories must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Serializable parameters for a fitted RareLabelEncoder.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RareLabelEncoderParams {
    pub config: RareLabelConfig,
    pub columns: Vec<String>,
    /// Frequent categories per column, most frequent first.
    pub frequent: Vec<Vec<String>>,
    /// Rare categories per column, in encounter order.
    pub rare: Vec<Vec<String>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Bucket {
    Frequent,
    Rare,
}

/// Fitted RareLabelEncoder.
#[derive(Clone, Debug)]
pub struct FittedRareLabelEncoder {
    params: RareLabelEncoderParams,
    lookups: Vec<HashMap<String, Bucket>>,
}

impl FittedRareLabelEncoder {
    fn build(params: RareLabelEncoderParams) -> Self {
        let lookups = params
            .frequent
            .iter()
            .zip(&params.rare)
            .map(|(frequent, rare)| {
                frequent
                    .iter()
                    .map(|c| (c.clone(), Bucket::Frequent))
                    .chain(rare.iter().map(|c| (c.clone(), Bucket::Rare)))
                    .collect()
            })
            .collect();
        Self { params, lookups }
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.params.columns.iter().position(|c| c == column)
    }

    /// Categories that pass through unchanged.
    pub fn frequent_labels(&self, column: &str) -> Option<&[String]> {
        self.position(column).map(|i| self.params.frequent[i].as_slice())
    }

    /// Categories collapsed into [`RARE_LABEL`].
    pub fn rare_labels(&self, column: &str) -> Option<&[String]> {
        self.position(column).map(|i| self.params.rare[i].as_slice())
    }

    fn unseen_label(&self) -> &'static str {
        match self.params.config.unseen {
            UnseenLabels::Separate => UNSEEN_LABEL,
            UnseenLabels::AsRare => RARE_LABEL,
        }
    }
}

/// Split a column's categories into (frequent, rare).
fn partition(values: &[Option<String>], config: &RareLabelConfig) -> (Vec<String>, Vec<String>) {
    // (category, count) in encounter order
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for v in values.iter().flatten() {
        match index.get(v.as_str()) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(v.as_str(), counts.len());
                counts.push((v.clone(), 1));
            }
        }
    }

    if counts.len() <= config.n_categories {
        tracing::debug!(
            stage = KIND,
            distinct = counts.len(),
            n_categories = config.n_categories,
            "too few categories, no grouping applied"
        );
        let frequent = counts.into_iter().map(|(c, _)| c).collect();
        return (frequent, Vec::new());
    }

    let total = values.iter().flatten().count() as f64;
    let mut ranked: Vec<usize> = (0..counts.len()).collect();
    // Stable: equal counts keep encounter order
    ranked.sort_by(|&a, &b| counts[b].1.cmp(&counts[a].1));

    let mut is_frequent = vec![false; counts.len()];
    let mut kept = 0;
    for i in ranked {
        let share = counts[i].1 as f64 / total;
        let under_cap = config.max_n_categories.map_or(true, |max| kept < max);
        if share >= config.tol && under_cap {
            is_frequent[i] = true;
            kept += 1;
        }
    }

    let mut frequent: Vec<(String, usize)> = Vec::new();
    let mut rare = Vec::new();
    for ((category, count), keep) in counts.into_iter().zip(is_frequent) {
        if keep {
            frequent.push((category, count));
        } else {
            rare.push(category);
        }
    }
    frequent.sort_by(|a, b| b.1.cmp(&a.1));
    (frequent.into_iter().map(|(c, _)| c).collect(), rare)
}

impl Transformer for RareLabelEncoder {
    type Params = RareLabelEncoderParams;
    type Fitted = FittedRareLabelEncoder;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn fit(&self, data: &Dataset, _target: Option<&[f64]>) -> Result<Self::Fitted> {
        self.validate()?;
        ensure_rows(KIND, data)?;
        let mut frequent = Vec::with_capacity(self.columns.len());
        let mut rare = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            let col = data.require_complete(KIND, name, Some(ColumnKind::Categorical))?;
            let values = col.as_categorical().unwrap_or(&[]);
            if let Some(reserved) = values
                .iter()
                .flatten()
                .find(|v| v.as_str() == RARE_LABEL || v.as_str() == UNSEEN_LABEL)
            {
                return Err(PipelineError::configuration(
                    KIND,
                    format!(
                        "column '{}' already contains the reserved label '{}'",
                        name, reserved
                    ),
                ));
            }
            let (f, r) = partition(values, &self.config);
            tracing::debug!(
                stage = KIND,
                column = %name,
                frequent = f.len(),
                rare = r.len(),
                "grouped categories"
            );
            frequent.push(f);
            rare.push(r);
        }
        Ok(FittedRareLabelEncoder::build(RareLabelEncoderParams {
            config: self.config.clone(),
            columns: self.columns.clone(),
            frequent,
            rare,
        }))
    }
}

impl FittedTransformer for FittedRareLabelEncoder {
    type Params = RareLabelEncoderParams;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.params.columns
    }

    fn transform(&self, data: &Dataset) -> Result<Dataset> {
        let unseen_label = self.unseen_label();
        let mut replaced = Vec::with_capacity(self.params.columns.len());
        for (name, lookup) in self.params.columns.iter().zip(&self.lookups) {
            let col = data.require(KIND, name, Some(ColumnKind::Categorical))?;
            let values: Vec<Option<String>> = col
                .as_categorical()
                .unwrap_or(&[])
                .iter()
                .map(|v| {
                    v.as_ref().map(|category| match lookup.get(category) {
                        Some(Bucket::Frequent) => category.clone(),
                        Some(Bucket::Rare) => RARE_LABEL.to_string(),
                        None => unseen_label.to_string(),
                    })
                })
                .collect();
            replaced.push(Column::categorical(name.as_str(), values));
        }
        log_unseen(KIND, &self.unseen(data));
        data.with_replaced(replaced)
    }

    fn unseen(&self, data: &Dataset) -> Vec<UnseenValues> {
        self.params
            .columns
            .iter()
            .zip(&self.lookups)
            .filter_map(|(name, lookup)| {
                let values = data.column(name)?.as_categorical()?;
                let count = values
                    .iter()
                    .flatten()
                    .filter(|v| !lookup.contains_key(v.as_str()))
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
        let n = params.columns.len();
        if params.frequent.len() != n || params.rare.len() != n {
            return Err(PipelineError::Serialization(format!(
                "rare label tables do not match {} columns",
                n
            )));
        }
        Ok(Self::build(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 100 rows: A x50, B x30, C x15, D x4, E x1.
    fn train() -> Dataset {
        let mut values = Vec::new();
        for (label, n) in [("A", 50), ("B", 30), ("C", 15), ("D", 4), ("E", 1)] {
            values.extend(std::iter::repeat(Some(label)).take(n));
        }
        Dataset::new(vec![Column::categorical("MSZoning", values)]).unwrap()
    }

    fn encoder() -> RareLabelEncoder {
        RareLabelEncoder::new(["MSZoning"])
            .with_tol(0.05)
            .with_n_categories(1)
    }

    fn labels(data: &Dataset) -> Vec<Option<String>> {
        data.column("MSZoning")
            .unwrap()
            .as_categorical()
            .unwrap()
            .to_vec()
    }

    #[test]
    fn test_below_tol_is_rare() {
        let fitted = encoder().fit(&train(), None).unwrap();
        assert_eq!(
            fitted.frequent_labels("MSZoning").unwrap(),
            &["A".to_string(), "B".to_string(), "C".to_string()]
        );
        assert_eq!(
            fitted.rare_labels("MSZoning").unwrap(),
            &["D".to_string(), "E".to_string()]
        );
    }

    #[test]
    fn test_rare_categories_map_to_rare_on_train_and_held_out() {
        let fitted = encoder().fit(&train(), None).unwrap();
        let out = labels(&fitted.transform(&train()).unwrap());
        assert_eq!(out[0].as_deref(), Some("A"));
        assert_eq!(out[96].as_deref(), Some("Rare"));
        assert_eq!(out[99].as_deref(), Some("Rare"));

        let held_out = Dataset::new(vec![Column::categorical(
            "MSZoning",
            vec![Some("E"), Some("D"), Some("B")],
        )])
        .unwrap();
        let out = labels(&fitted.transform(&held_out).unwrap());
        assert_eq!(
            out,
            vec![
                Some("Rare".to_string()),
                Some("Rare".to_string()),
                Some("B".to_string())
            ]
        );
    }

    #[test]
    fn test_unseen_goes_to_separate_bucket() {
        let fitted = encoder().fit(&train(), None).unwrap();
        let test = Dataset::new(vec![Column::categorical(
            "MSZoning",
            vec![Some("Z"), Some("A"), None],
        )])
        .unwrap();
        let out = labels(&fitted.transform(&test).unwrap());
        assert_eq!(out[0].as_deref(), Some("Unseen"));
        assert_eq!(out[1].as_deref(), Some("A"));
        assert_eq!(out[2], None);
        assert_eq!(
            fitted.unseen(&test),
            vec![UnseenValues {
                column: "MSZoning".to_string(),
                count: 1
            }]
        );
    }

    #[test]
    fn test_unseen_as_rare() {
        let fitted = encoder()
            .with_unseen(UnseenLabels::AsRare)
            .fit(&train(), None)
            .unwrap();
        let test = Dataset::new(vec![Column::categorical("MSZoning", vec![Some("Z")])]).unwrap();
        assert_eq!(
            labels(&fitted.transform(&test).unwrap())[0].as_deref(),
            Some("Rare")
        );
    }

    #[test]
    fn test_max_n_categories_ties_keep_encounter_order() {
        // x and y tie on count; x appears first
        let values = vec![Some("x"), Some("y"), Some("x"), Some("y"), Some("z")];
        let data = Dataset::new(vec![Column::categorical("c", values)]).unwrap();
        let fitted = RareLabelEncoder::new(["c"])
            .with_tol(0.0)
            .with_n_categories(1)
            .with_max_n_categories(1)
            .fit(&data, None)
            .unwrap();
        assert_eq!(fitted.frequent_labels("c").unwrap(), &["x".to_string()]);
        assert_eq!(
            fitted.rare_labels("c").unwrap(),
            &["y".to_string(), "z".to_string()]
        );
    }

    #[test]
    fn test_default_config_groups_below_tol() {
        let mut values = vec![Some("A"); 60];
        values.extend(vec![Some("B"); 39]);
        values.push(Some("C"));
        let data = Dataset::new(vec![Column::categorical("x", values)]).unwrap();

        let fitted = RareLabelEncoder::new(["x"]).fit(&data, None).unwrap();
        assert_eq!(fitted.rare_labels("x").unwrap(), &["C".to_string()]);
        let out = fitted.transform(&data).unwrap();
        let out = out.column("x").unwrap().as_categorical().unwrap();
        assert_eq!(out[99].as_deref(), Some("Rare"));
        assert_eq!(out[0].as_deref(), Some("A"));
    }

    #[test]
    fn test_n_categories_gate_is_opt_in() {
        let fitted = RareLabelEncoder::new(["MSZoning"])
            .with_tol(0.05)
            .with_n_categories(10)
            .fit(&train(), None)
            .unwrap();
        assert!(fitted.rare_labels("MSZoning").unwrap().is_empty());
        assert_eq!(fitted.frequent_labels("MSZoning").unwrap().len(), 5);
    }

    #[test]
    fn test_reserved_labels_in_training_data_rejected() {
        for reserved in [UNSEEN_LABEL, RARE_LABEL] {
            let data = Dataset::new(vec![Column::categorical(
                "x",
                vec![Some("A"), Some(reserved), Some("A"), Some(reserved)],
            )])
            .unwrap();
            let result = RareLabelEncoder::new(["x"]).fit(&data, None);
            assert!(
                matches!(result, Err(PipelineError::Configuration { .. })),
                "'{}' accepted",
                reserved
            );
        }
    }

    #[test]
    fn test_missing_values_at_fit_is_configuration_error() {
        let data = Dataset::new(vec![Column::categorical(
            "MSZoning",
            vec![Some("A"), None],
        )])
        .unwrap();
        let result = encoder().fit(&data, None);
        assert!(matches!(result, Err(PipelineError::Configuration { .. })));
    }

    #[test]
    fn test_invalid_tol() {
        let result = encoder().with_tol(1.5).fit(&train(), None);
        assert!(matches!(result, Err(PipelineError::InvalidParameter(_))));
    }

    #[test]
    fn test_transform_twice_and_reload() {
        let fitted = encoder().fit(&train(), None).unwrap();
        let a = fitted.transform(&train()).unwrap();
        let b = fitted.transform(&train()).unwrap();
        assert_eq!(a, b);

        let file = tempfile::NamedTempFile::new().unwrap();
        fitted.save_to_file(file.path()).unwrap();
        let loaded = FittedRareLabelEncoder::load_from_file(file.path()).unwrap();
        assert_eq!(loaded.transform(&train()).unwrap(), a);
    }
}

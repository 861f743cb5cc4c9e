//! Named, typed tabular data.
//!
//! A [`Dataset`] is an ordered collection of uniquely named [`Column`]s sharing a
//! fixed row count. Each column is either numeric or categorical, and every cell
//! may be absent (`None`). The column kind is explicit, never inferred: a
//! [`Schema`] describes it up front and the CSV loader parses against it.
//!
//! Columns are held behind [`Arc`], so a transform that rewrites one column
//! produces a new `Dataset` sharing every other column with its input. Inputs are
//! never mutated in place.
//!
//! # Example
//!
//! ```rust
//! use feature_pipe::dataset::{Column, Dataset};
//!
//! let data = Dataset::new(vec![
//!     Column::numeric("LotFrontage", vec![Some(65.0), None, Some(80.0)]),
//!     Column::categorical("MSZoning", vec![Some("RL"), Some("RM"), None]),
//! ])
//! .unwrap();
//!
//! assert_eq!(data.n_rows(), 3);
//! assert_eq!(data.column("LotFrontage").unwrap().n_missing(), 1);
//! ```

use crate::error::{PipelineError, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

mod loader;

/// Kind of values a column holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Continuous or discrete numbers stored as `f64`.
    Numeric,
    /// Free-form labels stored as `String`.
    Categorical,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

/// Cell storage for a single column. `None` marks an absent value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

impl ColumnData {
    /// Kind of the stored values.
    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Numeric(_) => ColumnKind::Numeric,
            ColumnData::Categorical(_) => ColumnKind::Categorical,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Categorical(v) => v.len(),
        }
    }

    /// Whether the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of absent cells.
    pub fn n_missing(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnData::Categorical(v) => v.iter().filter(|x| x.is_none()).count(),
        }
    }

    /// Whether the cell at `row` is absent.
    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            ColumnData::Numeric(v) => v[row].is_none(),
            ColumnData::Categorical(v) => v[row].is_none(),
        }
    }
}

/// A named column of data.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    /// Numeric column. NaN values are stored as absent.
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    /// Numeric column from dense values, treating NaN as absent.
    pub fn numeric_dense(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::numeric(name, values.into_iter().map(Some).collect())
    }

    /// Categorical column.
    pub fn categorical<S: Into<String>>(name: impl Into<String>, values: Vec<Option<S>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Categorical(values.into_iter().map(|v| v.map(Into::into)).collect()),
        }
    }

    /// Build a column directly from its storage.
    pub fn from_data(name: impl Into<String>, data: ColumnData) -> Self {
        match data {
            ColumnData::Numeric(values) => Self::numeric(name, values),
            data => Self {
                name: name.into(),
                data,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn kind(&self) -> ColumnKind {
        self.data.kind()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn n_missing(&self) -> usize {
        self.data.n_missing()
    }

    /// Numeric values, or `None` when the column is categorical.
    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            ColumnData::Categorical(_) => None,
        }
    }

    /// Categorical values, or `None` when the column is numeric.
    pub fn as_categorical(&self) -> Option<&[Option<String>]> {
        match &self.data {
            ColumnData::Categorical(v) => Some(v),
            ColumnData::Numeric(_) => None,
        }
    }
}

/// Explicit mapping of column names to kinds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<(String, ColumnKind)>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a numeric field.
    pub fn with_numeric(mut self, name: impl Into<String>) -> Self {
        self.fields.push((name.into(), ColumnKind::Numeric));
        self
    }

    /// Append a categorical field.
    pub fn with_categorical(mut self, name: impl Into<String>) -> Self {
        self.fields.push((name.into(), ColumnKind::Categorical));
        self
    }

    /// Append a field of the given kind.
    pub fn push(&mut self, name: impl Into<String>, kind: ColumnKind) {
        self.fields.push((name.into(), kind));
    }

    /// Kind of the named field, if declared.
    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, k)| *k)
    }

    pub fn fields(&self) -> &[(String, ColumnKind)] {
        &self.fields
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Ordered collection of named columns with a common row count.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    columns: Vec<Arc<Column>>,
    n_rows: usize,
}

impl Dataset {
    /// Build a dataset from columns.
    ///
    /// # Errors
    /// Returns [`PipelineError::Configuration`] when two columns share a name
    /// or the columns differ in length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        Self::from_shared(columns.into_iter().map(Arc::new).collect())
    }

    fn from_shared(columns: Vec<Arc<Column>>) -> Result<Self> {
        let n_rows = columns.first().map(|c| c.len()).unwrap_or(0);
        let mut seen = HashSet::with_capacity(columns.len());
        for col in &columns {
            if !seen.insert(col.name()) {
                return Err(PipelineError::configuration(
                    "dataset",
                    format!("duplicate column name '{}'", col.name()),
                ));
            }
            if col.len() != n_rows {
                return Err(PipelineError::configuration(
                    "dataset",
                    format!(
                        "column '{}' has {} rows, expected {}",
                        col.name(),
                        col.len(),
                        n_rows
                    ),
                ));
            }
        }
        Ok(Self { columns, n_rows })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    /// Schema describing the current columns.
    pub fn schema(&self) -> Schema {
        let mut schema = Schema::new();
        for col in &self.columns {
            schema.push(col.name(), col.kind());
        }
        schema
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Iterate over columns in order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().map(|c| c.as_ref())
    }

    /// Look up a column a stage depends on.
    ///
    /// Absent columns and kind mismatches are configuration errors attributed
    /// to `stage`.
    pub(crate) fn require(
        &self,
        stage: &str,
        name: &str,
        kind: Option<ColumnKind>,
    ) -> Result<&Column> {
        let col = self.column(name).ok_or_else(|| {
            PipelineError::configuration(
                stage,
                format!("column '{}' not found in dataset", name),
            )
        })?;
        if let Some(expected) = kind {
            if col.kind() != expected {
                return Err(PipelineError::configuration(
                    stage,
                    format!(
                        "column '{}' is {}, expected {}",
                        name,
                        col.kind(),
                        expected
                    ),
                ));
            }
        }
        Ok(col)
    }

    /// Like [`require`](Self::require), and additionally rejects columns that
    /// still contain absent values.
    pub(crate) fn require_complete(
        &self,
        stage: &str,
        name: &str,
        kind: Option<ColumnKind>,
    ) -> Result<&Column> {
        let col = self.require(stage, name, kind)?;
        let missing = col.n_missing();
        if missing > 0 {
            return Err(PipelineError::configuration(
                stage,
                format!(
                    "column '{}' has {} missing values; impute it in an earlier stage",
                    name, missing
                ),
            ));
        }
        Ok(col)
    }

    /// New dataset where the same-named column is replaced in place.
    pub(crate) fn with_replaced(&self, replacements: Vec<Column>) -> Result<Self> {
        let mut columns = self.columns.clone();
        for col in replacements {
            let idx = self.column_index(col.name()).ok_or_else(|| {
                PipelineError::configuration(
                    "dataset",
                    format!("cannot replace missing column '{}'", col.name()),
                )
            })?;
            columns[idx] = Arc::new(col);
        }
        Self::from_shared(columns)
    }

    /// New dataset with `extra` columns appended after the existing ones.
    pub(crate) fn with_appended(&self, extra: Vec<Column>) -> Result<Self> {
        let mut columns = self.columns.clone();
        columns.extend(extra.into_iter().map(Arc::new));
        Self::from_shared(columns)
    }

    /// New dataset without the named columns.
    pub(crate) fn without(&self, names: &[String]) -> Self {
        let columns: Vec<Arc<Column>> = self
            .columns
            .iter()
            .filter(|c| !names.iter().any(|n| n == c.name()))
            .cloned()
            .collect();
        Self {
            columns,
            n_rows: self.n_rows,
        }
    }

    /// Dataset containing only the rows at `indices`, in that order.
    pub fn select_rows(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.n_rows) {
            return Err(PipelineError::InvalidParameter(format!(
                "row index {} out of bounds for {} rows",
                bad, self.n_rows
            )));
        }
        let columns = self
            .columns
            .iter()
            .map(|c| {
                let data = match c.data() {
                    ColumnData::Numeric(v) => {
                        ColumnData::Numeric(indices.iter().map(|&i| v[i]).collect())
                    }
                    ColumnData::Categorical(v) => {
                        ColumnData::Categorical(indices.iter().map(|&i| v[i].clone()).collect())
                    }
                };
                Column::from_data(c.name(), data)
            })
            .collect();
        Self::new(columns)
    }

    /// Dense `(rows, columns)` matrix for an estimator.
    ///
    /// # Errors
    /// Returns [`PipelineError::Configuration`] when a categorical column is
    /// still present or a numeric column still has missing values.
    pub fn to_matrix(&self) -> Result<Array2<f64>> {
        let rows = self.n_rows;
        let cols = self.columns.len();
        let mut out = Array2::<f64>::zeros((rows, cols));
        for (j, col) in self.columns.iter().enumerate() {
            let values = col.as_numeric().ok_or_else(|| {
                PipelineError::configuration(
                    "estimator",
                    format!(
                        "column '{}' is categorical; encode it before the estimator",
                        col.name()
                    ),
                )
            })?;
            for (i, v) in values.iter().enumerate() {
                out[[i, j]] = v.ok_or_else(|| {
                    PipelineError::configuration(
                        "estimator",
                        format!("column '{}' has a missing value at row {}", col.name(), i),
                    )
                })?;
            }
        }
        Ok(out)
    }
}

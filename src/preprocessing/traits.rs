//! Core traits for pipeline stages.
//!
//! This module defines the two central traits:
//! - [`Transformer`]: an unfitted stage holding its column scope and
//!   hyperparameters; it can learn from data.
//! - [`FittedTransformer`]: the learned state of a stage; it transforms data and
//!   can be serialized.
//!
//! Keeping the two apart makes the `Unfit -> Fit` lifecycle a compile-time
//! property: only a fitted value has `transform`. Re-fitting calls
//! [`Transformer::fit`] again and yields a new, independent fitted value.

use crate::dataset::Dataset;
use crate::error::{PipelineError, Result};
use crate::serialization::{read_params, write_params, SerializableParams};

/// Count of transform-time values a stage did not observe during fit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnseenValues {
    /// Column the values were found in.
    pub column: String,
    /// Number of affected rows.
    pub count: usize,
}

/// Trait for unfitted stages with a column scope and hyperparameters.
///
/// # Example
/// ```rust
/// use feature_pipe::dataset::{Column, Dataset};
/// use feature_pipe::preprocessing::{FittedTransformer, MedianImputer, Transformer};
///
/// let train = Dataset::new(vec![Column::numeric("age", vec![Some(20.0), None, Some(40.0)])])?;
/// let fitted = MedianImputer::new(["age"]).fit(&train, None)?;
/// let imputed = fitted.transform(&train)?;
/// assert_eq!(imputed.column("age").unwrap().n_missing(), 0);
/// # Ok::<(), feature_pipe::PipelineError>(())
/// ```
pub trait Transformer: Clone {
    /// Serializable representation of learned parameters.
    type Params: SerializableParams;
    /// The fitted stage type ready for inference.
    type Fitted: FittedTransformer<Params = Self::Params>;

    /// Short stable identifier of the stage kind (e.g. `"median_imputer"`).
    fn kind(&self) -> &'static str;

    /// Columns this stage reads.
    fn columns(&self) -> &[String];

    /// Learn the stage's state from `data`.
    ///
    /// `target` carries the training labels, row-aligned with `data`; only
    /// supervised stages use it.
    ///
    /// # Errors
    /// - [`PipelineError::Configuration`] if a declared column is absent, of
    ///   the wrong kind, or still holds values an earlier stage should have
    ///   resolved.
    /// - [`PipelineError::Fit`] if the statistics cannot be computed.
    /// - [`PipelineError::EmptyData`] if `data` has no rows.
    fn fit(&self, data: &Dataset, target: Option<&[f64]>) -> Result<Self::Fitted>;

    /// Fit on `data`, then transform the same data.
    fn fit_transform(&self, data: &Dataset, target: Option<&[f64]>) -> Result<Dataset> {
        let fitted = self.fit(data, target)?;
        fitted.transform(data)
    }
}

/// Trait for fitted stages ready for inference.
///
/// # Guarantees
/// - `transform` reads the stored state only; it never recomputes statistics
///   from its argument and never mutates `self`, so repeated calls on equal
///   input give equal output.
/// - `extract_params()` + `from_params()` is a round-trip.
pub trait FittedTransformer: Clone {
    /// Serializable representation of learned parameters.
    type Params: SerializableParams;

    /// Short stable identifier of the stage kind.
    fn kind(&self) -> &'static str;

    /// Columns this stage reads.
    fn columns(&self) -> &[String];

    /// Transform data using the learned state.
    ///
    /// # Errors
    /// Returns [`PipelineError::Configuration`] if a column the stage needs is
    /// absent or of the wrong kind. Values unseen at fit time never fail.
    fn transform(&self, data: &Dataset) -> Result<Dataset>;

    /// Per-column counts of values in `data` this stage did not observe
    /// during fit. Stages without an unseen-value policy report nothing.
    fn unseen(&self, _data: &Dataset) -> Vec<UnseenValues> {
        Vec::new()
    }

    /// Extract learned parameters as a serializable representation.
    fn extract_params(&self) -> Self::Params;

    /// Reconstruct a fitted stage from parameters.
    fn from_params(params: Self::Params) -> Result<Self>
    where
        Self: Sized;

    /// Save the fitted stage to a file.
    fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> std::io::Result<()> {
        write_params(&self.extract_params(), path)
    }

    /// Load a fitted stage from a file.
    fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self>
    where
        Self: Sized,
    {
        let params = read_params::<Self::Params, _>(path)?;
        Self::from_params(params)
    }
}

/// Reject fitting on zero rows.
pub(crate) fn ensure_rows(kind: &str, data: &Dataset) -> Result<()> {
    if data.n_rows() == 0 {
        return Err(PipelineError::EmptyData(format!(
            "cannot fit {} on empty data",
            kind
        )));
    }
    Ok(())
}

/// Emit a warning for every non-zero unseen count.
pub(crate) fn log_unseen(kind: &str, unseen: &[UnseenValues]) {
    for u in unseen.iter().filter(|u| u.count > 0) {
        tracing::warn!(
            stage = kind,
            column = %u.column,
            count = u.count,
            "values not observed during fit"
        );
    }
}

/// Owned column names from any iterable of string-likes.
pub(crate) fn column_list<I, S>(columns: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    columns.into_iter().map(Into::into).collect()
}

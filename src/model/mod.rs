//! Estimators consumed at the end of a pipeline.
//!
//! A pipeline only needs three capabilities from its estimator, split into
//! traits so the training-time and inference-time types stay distinct:
//! - [`Estimator`]: hyperparameters that can be fit into a predictor.
//! - [`Predictor`]: a fitted model producing one value per row.
//! - [`ProbabilisticClassifier`]: a fitted classifier that also produces
//!   per-class probabilities.
//!
//! A fitted model holds only inference parameters, never training
//! hyperparameters such as a learning rate.

pub mod linear;

pub use linear::{FittedLasso, FittedLogisticRegression, LassoRegression, LogisticRegression};

use crate::error::Result;
use ndarray::Array2;

/// Unfitted estimator configuration.
pub trait Estimator {
    /// Fitted model produced by [`Estimator::fit`].
    type Fitted: Predictor;

    /// Fit on a dense `(rows, features)` matrix and row-aligned labels.
    fn fit(&self, x: &Array2<f64>, y: &[f64]) -> Result<Self::Fitted>;
}

/// Fitted model that maps rows to predictions.
pub trait Predictor {
    /// One prediction per row of `x`.
    ///
    /// # Errors
    /// Returns [`PipelineError::FeatureMismatch`](crate::PipelineError::FeatureMismatch)
    /// when `x` has a different number of columns than the fit matrix.
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>>;

    /// Number of features seen during fit.
    fn n_features_in(&self) -> usize;
}

/// Fitted classifier with class probabilities.
pub trait ProbabilisticClassifier: Predictor {
    /// `(rows, classes)` matrix of probabilities; each row sums to one.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>>;
}

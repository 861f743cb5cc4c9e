//! # feature-pipe
//!
//! Declarative, column-scoped feature-engineering pipelines for tabular
//! machine learning, fit once on training data and replayed deterministically
//! on any later batch.
//!
//! ## Core Design Principles
//!
//! - **Fit/transform separation**: every stage has an unfitted type holding
//!   its columns and hyperparameters and a fitted type holding the learned
//!   state. Only the fitted type can transform, so transforming before fitting
//!   does not compile.
//! - **Column scoping**: a stage reads and writes only the columns it was
//!   given. Every other column passes through unchanged and in place.
//! - **Unseen values are not errors**: categories never seen during fit go to
//!   reserved buckets and are reported through `tracing` warnings and
//!   [`FittedColumnScopedPipeline::drift_report`](pipeline::FittedColumnScopedPipeline::drift_report).
//! - **Persistence**: fitted stages, pipelines and estimators round-trip
//!   through bincode files.
//!
//! ## Quick Start
//!
//! ```rust
//! use feature_pipe::dataset::{Column, Dataset};
//! use feature_pipe::model::LassoRegression;
//! use feature_pipe::pipeline::ColumnScopedPipeline;
//! use feature_pipe::preprocessing::{
//!     CategoricalImputer, MedianImputer, MissingIndicator, OrdinalEncoder, RareLabelEncoder,
//!     StandardScaler,
//! };
//!
//! let train = Dataset::new(vec![
//!     Column::numeric("LotFrontage", vec![Some(65.0), None, Some(68.0), Some(60.0)]),
//!     Column::categorical("MSZoning", vec![Some("RL"), Some("RM"), None, Some("RL")]),
//! ])?;
//! let price = [208500.0, 181500.0, 223500.0, 140000.0];
//!
//! let model = ColumnScopedPipeline::new()
//!     .add_stage("flags", MissingIndicator::new(["LotFrontage"]))
//!     .add_stage("impute_num", MedianImputer::new(["LotFrontage"]))
//!     .add_stage("impute_cat", CategoricalImputer::new(["MSZoning"]))
//!     .add_stage("rare", RareLabelEncoder::new(["MSZoning"]).with_tol(0.3).with_n_categories(1))
//!     .add_stage("ordinal", OrdinalEncoder::new(["MSZoning"]))
//!     .add_stage("scale", StandardScaler::new(["LotFrontage"]))
//!     .with_estimator(LassoRegression::new())
//!     .fit(&train, &price)?;
//!
//! let predictions = model.predict(&train)?;
//! assert_eq!(predictions.len(), 4);
//! # Ok::<(), feature_pipe::PipelineError>(())
//! ```
//!
//! ## Module Structure
//!
//! - `dataset`: named, typed columns with missing-value markers; CSV loading
//! - `preprocessing`: the stage traits and every stage kind
//! - `pipeline`: ordered stage pipelines, predictive pipelines, JSON config
//! - `model`: estimator traits and linear reference estimators
//! - `serialization`: persistence of fitted state
//! - `error`: the crate's error type

/// Named-column datasets and CSV loading.
pub mod dataset;

/// Error type shared by every fallible operation.
pub mod error;

/// Estimators consumed at the end of a pipeline.
pub mod model;

/// Ordered pipelines of column-scoped stages.
pub mod pipeline;

/// Column-scoped preprocessing stages.
pub mod preprocessing;

/// Persistence of fitted state.
pub mod serialization;

pub use error::PipelineError;

//! Stages that deal with missing values.
//!
//! # Available Transformers
//!
//! | Transformer | Description |
//! |-------------|-------------|
//! | [`MissingIndicator`] | Append a `<col>_na` 0/1 flag per column |
//! | [`MedianImputer`] | Fill numeric gaps with the training median (or mean) |
//! | [`CategoricalImputer`] | Fill categorical gaps with `"Missing"` (or the mode) |
//!
//! A missing indicator has to come before the imputer of the same column,
//! otherwise every flag is zero.

pub mod categorical;
pub mod median;
pub mod missing_indicator;

pub use categorical::{
    CategoricalFill, CategoricalImputer, CategoricalImputerParams, FittedCategoricalImputer,
    MISSING_LABEL,
};
pub use median::{FittedMedianImputer, ImputeStrategy, MedianImputer, MedianImputerParams};
pub use missing_indicator::{
    indicator_name, FittedMissingIndicator, MissingIndicator, MissingIndicatorParams,
    MISSING_SUFFIX,
};

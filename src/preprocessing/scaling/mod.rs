//! Scaling transformers for numeric columns.
//!
//! | Transformer | Formula | Constant column |
//! |-------------|---------|-----------------|
//! | [`StandardScaler`] | `(x - mean) / std` | `0` |
//! | [`MinMaxScaler`] | `(x - min) / (max - min)` | lower bound of the range |
//!
//! Both require complete columns at fit; impute first.

mod minmax;
mod standard;

pub use minmax::{FittedMinMaxScaler, MinMaxScaler, MinMaxScalerConfig, MinMaxScalerParams};
pub use standard::{
    FittedStandardScaler, StandardScaler, StandardScalerConfig, StandardScalerParams,
};

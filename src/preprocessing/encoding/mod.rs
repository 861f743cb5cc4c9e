//! Categorical encoding stages.
//!
//! ## RareLabelEncoder
//! Collapses infrequent categories into a shared `"Rare"` label.
//!
//! ## OrdinalEncoder
//! Replaces categories by integer ranks, ordered by mean training target.
//!
//! ## ValueMapper
//! Replaces categories by user-supplied numbers.
//!
//! # Unseen categories
//!
//! None of the encoders fail on a category they did not see during fit:
//!
//! | Encoder | Unseen category becomes |
//! |---------|-------------------------|
//! | [`RareLabelEncoder`] | `"Unseen"` (or `"Rare"` with [`UnseenLabels::AsRare`]) |
//! | [`OrdinalEncoder`] | [`UNSEEN_RANK`] (`-1`) |
//! | [`ValueMapper`] | its configured default |
//!
//! Each occurrence is counted by `FittedTransformer::unseen` and logged as a
//! warning.

mod ordinal;
mod rare_label;
mod value_mapper;

pub use ordinal::{
    FittedOrdinalEncoder, OrdinalEncoder, OrdinalEncoderParams, OrdinalMethod, UNSEEN_RANK,
};
pub use rare_label::{
    FittedRareLabelEncoder, RareLabelConfig, RareLabelEncoder, RareLabelEncoderParams,
    UnseenLabels, RARE_LABEL, UNSEEN_LABEL,
};
pub use value_mapper::{FittedValueMapper, ValueMapper, ValueMapperParams};

//! Column-scoped preprocessing stages.
//!
//! Every stage follows the same type-state pattern: an unfitted value holds
//! the target columns and hyperparameters, and `fit` returns a separate fitted
//! value holding the learned state.
//!
//! # Design Philosophy
//!
//! - **Column scoping**: a stage reads and writes only the columns it was
//!   given; every other column passes through unchanged and in place.
//! - **No leakage**: statistics come from the data passed to `fit`; `transform`
//!   only applies them.
//! - **Serializable**: fitted stages can be saved and loaded.
//!
//! # Core Traits
//!
//! - [`Transformer`]: unfitted stage with hyperparameters
//! - [`FittedTransformer`]: fitted stage ready for inference
//!
//! # Available Transformers
//!
//! ## Imputation
//! - [`MissingIndicator`]: `<col>_na` flags for absent values
//! - [`MedianImputer`]: fill numeric gaps with the median (or mean)
//! - [`CategoricalImputer`]: fill categorical gaps with `"Missing"` (or the mode)
//!
//! ## Encoding
//! - [`RareLabelEncoder`]: group infrequent categories under `"Rare"`
//! - [`OrdinalEncoder`]: categories to ranks ordered by mean target
//! - [`ValueMapper`]: categories to fixed numbers
//!
//! ## Discretisation
//! - [`EqualFrequencyDiscretiser`]: quantile bins
//!
//! ## Scaling
//! - [`StandardScaler`]: Z-score normalization
//! - [`MinMaxScaler`]: scale to `[0, 1]` or a custom range
//!
//! ## Feature engineering
//! - [`ElapsedTime`], [`SplitAlphanumeric`], [`ExtractTitle`],
//!   [`LogTransform`], [`DropColumns`]
//!
//! # Example
//!
//! ```rust
//! use feature_pipe::dataset::{Column, Dataset};
//! use feature_pipe::preprocessing::{FittedTransformer, StandardScaler, Transformer};
//!
//! let train = Dataset::new(vec![Column::numeric_dense("Fare", vec![7.25, 71.28, 8.05])])?;
//! let fitted = StandardScaler::new(["Fare"]).fit(&train, None)?;
//! let scaled = fitted.transform(&train)?;
//! assert_eq!(scaled.column_names(), vec!["Fare"]);
//! # Ok::<(), feature_pipe::PipelineError>(())
//! ```

pub mod discretisation;
pub mod encoding;
pub mod feature_engineering;
pub mod imputation;
pub mod scaling;
pub mod traits;

pub use discretisation::{
    EqualFrequencyDiscretiser, EqualFrequencyDiscretiserParams, FittedEqualFrequencyDiscretiser,
};
pub use encoding::{
    FittedOrdinalEncoder, FittedRareLabelEncoder, FittedValueMapper, OrdinalEncoder,
    OrdinalEncoderParams, OrdinalMethod, RareLabelConfig, RareLabelEncoder,
    RareLabelEncoderParams, UnseenLabels, ValueMapper, ValueMapperParams, RARE_LABEL,
    UNSEEN_LABEL, UNSEEN_RANK,
};
pub use feature_engineering::{
    DropColumns, DropColumnsParams, ElapsedTime, ElapsedTimeParams, ExtractTitle,
    ExtractTitleParams, FittedDropColumns, FittedElapsedTime, FittedExtractTitle,
    FittedLogTransform, FittedSplitAlphanumeric, LogTransform, LogTransformParams,
    SplitAlphanumeric, SplitAlphanumericParams,
};
pub use imputation::{
    CategoricalFill, CategoricalImputer, CategoricalImputerParams, FittedCategoricalImputer,
    FittedMedianImputer, FittedMissingIndicator, ImputeStrategy, MedianImputer,
    MedianImputerParams, MissingIndicator, MissingIndicatorParams,
};
pub use scaling::{
    FittedMinMaxScaler, FittedStandardScaler, MinMaxScaler, MinMaxScalerConfig,
    MinMaxScalerParams, StandardScaler, StandardScalerConfig, StandardScalerParams,
};
pub use traits::{FittedTransformer, Transformer, UnseenValues};

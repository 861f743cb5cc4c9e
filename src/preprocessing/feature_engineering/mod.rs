//! Feature engineering transformers.
//!
//! Stages that derive new columns from existing ones or reshape the column
//! set: elapsed-time features, code splitting, title extraction, log
//! transform and column removal.

mod alphanumeric;
mod drop;
mod elapsed_time;
mod log_transform;
mod title;

pub use alphanumeric::{FittedSplitAlphanumeric, SplitAlphanumeric, SplitAlphanumericParams};
pub use drop::{DropColumns, DropColumnsParams, FittedDropColumns};
pub use elapsed_time::{ElapsedTime, ElapsedTimeParams, FittedElapsedTime};
pub use log_transform::{FittedLogTransform, LogTransform, LogTransformParams};
pub use title::{title_of, ExtractTitle, ExtractTitleParams, FittedExtractTitle, TITLE_COLUMN};

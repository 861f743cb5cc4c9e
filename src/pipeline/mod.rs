//! Pipelines of column-scoped stages.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ColumnScopedPipeline`] | Ordered, named stages; fit once, replay on any batch |
//! | [`PredictivePipeline`] | Fitted stages terminated in a fitted estimator |
//! | [`PipelineConfig`] | JSON definition of a pipeline |
//! | [`DriftReport`] | Per-stage counts of values unseen during fit |

pub mod config;
#[allow(clippy::module_inception)]
pub mod pipeline;
pub mod predictive;
pub mod stage;

pub use config::{PipelineConfig, StageConfig, StageSpec};
pub use pipeline::{
    ColumnScopedPipeline, DriftReport, FittedColumnScopedPipeline, PipelineParams, StageDrift,
};
pub use predictive::{PredictivePipeline, PredictivePipelineBuilder, PredictivePipelineParams};
pub use stage::{FittedStage, Stage, StageParams};

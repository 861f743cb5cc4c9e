//! Ordered, column-scoped stage pipeline.
//!
//! Fitting walks the stages in declared order: each stage is fit on the
//! output of the previous stage's transform, then transforms that data for
//! the next one. The fitted pipeline replays only the transforms.
//!
//! # Example
//! ```rust
//! use feature_pipe::dataset::{Column, Dataset};
//! use feature_pipe::pipeline::ColumnScopedPipeline;
//! use feature_pipe::preprocessing::{
//!     FittedTransformer, MedianImputer, MissingIndicator, Transformer,
//! };
//!
//! let train = Dataset::new(vec![Column::numeric(
//!     "LotFrontage",
//!     vec![Some(60.0), None, Some(80.0)],
//! )])?;
//! let pipeline = ColumnScopedPipeline::new()
//!     .add_stage("missing_flags", MissingIndicator::new(["LotFrontage"]))
//!     .add_stage("impute", MedianImputer::new(["LotFrontage"]));
//!
//! let fitted = pipeline.fit(&train, None)?;
//! let out = fitted.transform(&train)?;
//! assert_eq!(out.column_names(), vec!["LotFrontage", "LotFrontage_na"]);
//! # Ok::<(), feature_pipe::PipelineError>(())
//! ```

use crate::dataset::Dataset;
use crate::error::{PipelineError, Result};
use crate::pipeline::stage::{FittedStage, Stage, StageParams};
use crate::preprocessing::traits::{FittedTransformer, Transformer, UnseenValues};
use serde::{Deserialize, Serialize};

const KIND: &str = "pipeline";

/// Serializable representation of a fitted pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineParams {
    /// Stage names and fitted parameters, in execution order.
    pub stages: Vec<(String, StageParams)>,
}

/// Unseen-value counts of one stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageDrift {
    pub stage: String,
    pub unseen: Vec<UnseenValues>,
}

/// Per-stage, per-column counts of values the fitted pipeline never saw.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DriftReport {
    stages: Vec<StageDrift>,
}

impl DriftReport {
    /// Stages with at least one non-zero count, in execution order.
    pub fn stages(&self) -> &[StageDrift] {
        &self.stages
    }

    /// Counts reported by the stage named `stage`.
    pub fn for_stage(&self, stage: &str) -> Option<&[UnseenValues]> {
        self.stages
            .iter()
            .find(|s| s.stage == stage)
            .map(|s| s.unseen.as_slice())
    }

    /// Sum of every count in the report.
    pub fn total(&self) -> usize {
        self.stages
            .iter()
            .flat_map(|s| s.unseen.iter())
            .map(|u| u.count)
            .sum()
    }

    pub fn is_clean(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Ordered sequence of named stages (unfitted).
#[derive(Clone, Debug, Default)]
pub struct ColumnScopedPipeline {
    stages: Vec<(String, Stage)>,
    columns: Vec<String>,
}

impl ColumnScopedPipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage under `name`.
    pub fn add_stage(mut self, name: impl Into<String>, stage: impl Into<Stage>) -> Self {
        let stage = stage.into();
        for col in stage.columns() {
            if !self.columns.contains(col) {
                self.columns.push(col.clone());
            }
        }
        self.stages.push((name.into(), stage));
        self
    }

    /// Append a stage named after its kind.
    pub fn add(self, stage: impl Into<Stage>) -> Self {
        let stage = stage.into();
        let name = stage.kind();
        self.add_stage(name, stage)
    }

    /// Get the number of stages in the pipeline.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Check if the pipeline is empty.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Names of all stages, in execution order.
    pub fn step_names(&self) -> Vec<&str> {
        self.stages.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Stages in execution order.
    pub fn stages(&self) -> impl Iterator<Item = (&str, &Stage)> {
        self.stages.iter().map(|(name, stage)| (name.as_str(), stage))
    }

    /// Fit every stage and return the fitted pipeline together with the
    /// transformed training data.
    pub(crate) fn fit_with_output(
        &self,
        data: &Dataset,
        target: Option<&[f64]>,
    ) -> Result<(FittedColumnScopedPipeline, Dataset)> {
        if self.stages.is_empty() {
            return Err(PipelineError::InvalidParameter(
                "Cannot fit an empty pipeline".to_string(),
            ));
        }
        if data.n_rows() == 0 {
            return Err(PipelineError::EmptyData(
                "Cannot fit pipeline on empty data".to_string(),
            ));
        }
        if let Some(labels) = target {
            if labels.len() != data.n_rows() {
                return Err(PipelineError::configuration(
                    KIND,
                    format!(
                        "{} training rows but {} labels",
                        data.n_rows(),
                        labels.len()
                    ),
                ));
            }
        }
        for (i, (name, _)) in self.stages.iter().enumerate() {
            if self.stages[..i].iter().any(|(other, _)| other == name) {
                return Err(PipelineError::InvalidParameter(format!(
                    "duplicate stage name '{}'",
                    name
                )));
            }
        }

        let mut fitted_stages = Vec::with_capacity(self.stages.len());
        let mut current_data = data.clone();

        for (name, stage) in &self.stages {
            let fitted = stage.fit(&current_data, target)?;
            current_data = fitted.transform(&current_data)?;
            tracing::debug!(
                stage = %name,
                kind = stage.kind(),
                rows = current_data.n_rows(),
                columns = current_data.n_columns(),
                "stage fitted"
            );
            fitted_stages.push((name.clone(), fitted));
        }

        tracing::info!(
            stages = fitted_stages.len(),
            rows = data.n_rows(),
            output_columns = current_data.n_columns(),
            "pipeline fitted"
        );

        let fitted = FittedColumnScopedPipeline::from_stages(fitted_stages);
        Ok((fitted, current_data))
    }
}

impl Transformer for ColumnScopedPipeline {
    type Params = PipelineParams;
    type Fitted = FittedColumnScopedPipeline;

    fn kind(&self) -> &'static str {
        KIND
    }

    /// Every column some stage declares, in first-use order.
    fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Fit every stage in order on the output of the previous one.
    ///
    /// `target` is forwarded to every stage; supervised stages fail with
    /// [`PipelineError::Configuration`] without it.
    fn fit(&self, data: &Dataset, target: Option<&[f64]>) -> Result<Self::Fitted> {
        self.fit_with_output(data, target).map(|(fitted, _)| fitted)
    }

    fn fit_transform(&self, data: &Dataset, target: Option<&[f64]>) -> Result<Dataset> {
        self.fit_with_output(data, target).map(|(_, out)| out)
    }
}

/// Fitted pipeline ready for inference.
#[derive(Clone, Debug)]
pub struct FittedColumnScopedPipeline {
    stages: Vec<(String, FittedStage)>,
    columns: Vec<String>,
}

impl FittedColumnScopedPipeline {
    fn from_stages(stages: Vec<(String, FittedStage)>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for (_, stage) in &stages {
            for col in stage.columns() {
                if !columns.contains(col) {
                    columns.push(col.clone());
                }
            }
        }
        Self { stages, columns }
    }

    /// Get the number of stages in the pipeline.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Check if the pipeline is empty.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Names of all stages, in execution order.
    pub fn step_names(&self) -> Vec<&str> {
        self.stages.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Fitted state of the stage named `name`.
    pub fn stage(&self, name: &str) -> Option<&FittedStage> {
        self.stages
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, stage)| stage)
    }

    /// Replay the transforms on `data` and collect, per stage, the columns
    /// holding values the stage did not observe during fit.
    ///
    /// Each stage is asked about the data it would receive in a real
    /// transform, so counts reflect earlier stages' remapping.
    pub fn drift_report(&self, data: &Dataset) -> Result<DriftReport> {
        let mut report = DriftReport::default();
        let mut current_data = data.clone();
        for (name, stage) in &self.stages {
            let unseen: Vec<UnseenValues> = stage
                .unseen(&current_data)
                .into_iter()
                .filter(|u| u.count > 0)
                .collect();
            if !unseen.is_empty() {
                report.stages.push(StageDrift {
                    stage: name.clone(),
                    unseen,
                });
            }
            current_data = stage.transform(&current_data)?;
        }
        Ok(report)
    }
}

impl FittedTransformer for FittedColumnScopedPipeline {
    type Params = PipelineParams;

    fn kind(&self) -> &'static str {
        KIND
    }

    /// Every column some stage declares, in first-use order.
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn transform(&self, data: &Dataset) -> Result<Dataset> {
        let mut result = data.clone();
        for (name, stage) in &self.stages {
            result = stage.transform(&result)?;
            tracing::debug!(stage = %name, kind = stage.kind(), "stage applied");
        }
        Ok(result)
    }

    fn unseen(&self, data: &Dataset) -> Vec<UnseenValues> {
        self.drift_report(data)
            .map(|report| {
                report
                    .stages
                    .into_iter()
                    .flat_map(|s| s.unseen)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn extract_params(&self) -> Self::Params {
        PipelineParams {
            stages: self
                .stages
                .iter()
                .map(|(name, stage)| (name.clone(), stage.extract_params()))
                .collect(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        if params.stages.is_empty() {
            return Err(PipelineError::Serialization(
                "pipeline parameters contain no stages".to_string(),
            ));
        }
        let stages = params
            .stages
            .into_iter()
            .map(|(name, p)| FittedStage::from_params(p).map(|stage| (name, stage)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_stages(stages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;
    use crate::preprocessing::{
        CategoricalImputer, MedianImputer, MissingIndicator, OrdinalEncoder, RareLabelEncoder,
        StandardScaler, UNSEEN_RANK,
    };

    fn train_data() -> Dataset {
        Dataset::new(vec![
            Column::numeric("age", vec![Some(22.0), None, Some(26.0), Some(35.0)]),
            Column::categorical(
                "embarked",
                vec![Some("S"), Some("C"), None, Some("S")],
            ),
            Column::numeric_dense("fare", vec![7.25, 71.28, 7.92, 53.1]),
        ])
        .unwrap()
    }

    fn labels() -> &'static [f64] {
        &[0.0, 1.0, 1.0, 1.0]
    }

    fn pipeline() -> ColumnScopedPipeline {
        ColumnScopedPipeline::new()
            .add_stage("flags", MissingIndicator::new(["age"]))
            .add_stage("impute_num", MedianImputer::new(["age"]))
            .add_stage("impute_cat", CategoricalImputer::new(["embarked"]))
            .add_stage(
                "rare",
                RareLabelEncoder::new(["embarked"])
                    .with_tol(0.3)
                    .with_n_categories(1),
            )
            .add_stage("ordinal", OrdinalEncoder::new(["embarked"]))
            .add_stage("scale", StandardScaler::new(["fare"]))
    }

    #[test]
    fn test_pipeline_fit_transform() {
        let data = train_data();
        let fitted = pipeline().fit(&data, Some(labels())).unwrap();
        assert_eq!(fitted.len(), 6);
        assert_eq!(
            fitted.step_names(),
            vec!["flags", "impute_num", "impute_cat", "rare", "ordinal", "scale"]
        );

        let out = fitted.transform(&data).unwrap();
        assert_eq!(
            out.column_names(),
            vec!["age", "embarked", "fare", "age_na"]
        );
        assert!(out.to_matrix().is_ok());
        // input untouched
        assert_eq!(data.column("age").unwrap().n_missing(), 1);
    }

    #[test]
    fn test_fit_transform_matches_transform() {
        let data = train_data();
        let p = pipeline();
        let direct = p.fit_transform(&data, Some(labels())).unwrap();
        let replayed = p
            .fit(&data, Some(labels()))
            .unwrap()
            .transform(&data)
            .unwrap();
        assert_eq!(direct.to_matrix().unwrap(), replayed.to_matrix().unwrap());
    }

    #[test]
    fn test_transform_is_idempotent() {
        let data = train_data();
        let fitted = pipeline().fit(&data, Some(labels())).unwrap();
        let first = fitted.transform(&data).unwrap().to_matrix().unwrap();
        let second = fitted.transform(&data).unwrap().to_matrix().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_pipeline_rejected() {
        let result = ColumnScopedPipeline::new().fit(&train_data(), None);
        assert!(matches!(result, Err(PipelineError::InvalidParameter(_))));
    }

    #[test]
    fn test_empty_data_rejected() {
        let empty = train_data().select_rows(&[]).unwrap();
        let no_labels: &[f64] = &[];
        let result = pipeline().fit(&empty, Some(no_labels));
        assert!(matches!(result, Err(PipelineError::EmptyData(_))));
    }

    #[test]
    fn test_label_length_mismatch() {
        let result = pipeline().fit(&train_data(), Some(&[1.0, 0.0][..]));
        assert!(matches!(result, Err(PipelineError::Configuration { .. })));
    }

    #[test]
    fn test_duplicate_stage_names_rejected() {
        let p = ColumnScopedPipeline::new()
            .add_stage("impute", MedianImputer::new(["age"]))
            .add_stage("impute", StandardScaler::new(["fare"]));
        assert!(matches!(
            p.fit(&train_data(), None),
            Err(PipelineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_encoding_before_imputation_is_configuration_error() {
        let p = ColumnScopedPipeline::new()
            .add_stage("rare", RareLabelEncoder::new(["embarked"]))
            .add_stage("impute_cat", CategoricalImputer::new(["embarked"]));
        let result = p.fit(&train_data(), Some(labels()));
        assert!(matches!(result, Err(PipelineError::Configuration { .. })));
    }

    #[test]
    fn test_missing_column_at_transform() {
        let fitted = pipeline().fit(&train_data(), Some(labels())).unwrap();
        let narrow = Dataset::new(vec![Column::numeric_dense("fare", vec![1.0])]).unwrap();
        assert!(matches!(
            fitted.transform(&narrow),
            Err(PipelineError::Configuration { .. })
        ));
    }

    #[test]
    fn test_add_names_stage_after_kind() {
        let p = ColumnScopedPipeline::new().add(MedianImputer::new(["age"]));
        assert_eq!(p.step_names(), vec!["median_imputer"]);
    }

    #[test]
    fn test_drift_report_counts_unseen_categories() {
        let fitted = pipeline().fit(&train_data(), Some(labels())).unwrap();
        let test = Dataset::new(vec![
            Column::numeric("age", vec![Some(30.0), Some(40.0)]),
            Column::categorical("embarked", vec![Some("Q"), Some("S")]),
            Column::numeric_dense("fare", vec![8.0, 9.0]),
        ])
        .unwrap();

        let report = fitted.drift_report(&test).unwrap();
        let rare = report.for_stage("rare").unwrap();
        assert_eq!(
            rare,
            &[UnseenValues {
                column: "embarked".to_string(),
                count: 1
            }]
        );
        // "Q" reaches the ordinal stage as the rare stage's unseen bucket and
        // is counted once
        assert!(report.for_stage("ordinal").is_none());
        assert_eq!(report.total(), 1);
        assert!(!report.is_clean());

        let clean = fitted.drift_report(&train_data()).unwrap();
        assert!(clean.is_clean());

        let out = fitted.transform(&test).unwrap();
        let rank = out.column("embarked").unwrap().as_numeric().unwrap()[0];
        assert_eq!(rank, Some(UNSEEN_RANK));
    }

    #[test]
    fn test_save_load_round_trip() {
        let data = train_data();
        let fitted = pipeline().fit(&data, Some(labels())).unwrap();
        let file = tempfile::NamedTempFile::new().unwrap();
        fitted.save_to_file(file.path()).unwrap();

        let loaded = FittedColumnScopedPipeline::load_from_file(file.path()).unwrap();
        assert_eq!(loaded.step_names(), fitted.step_names());
        assert_eq!(
            loaded.transform(&data).unwrap().to_matrix().unwrap(),
            fitted.transform(&data).unwrap().to_matrix().unwrap()
        );
    }
}

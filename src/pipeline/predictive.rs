//! Predictive pipeline combining preprocessing and model inference.
//!
//! [`PredictivePipeline`] bundles a fitted [`FittedColumnScopedPipeline`]
//! with a fitted estimator and the feature names the estimator was trained
//! on. The whole bundle can be saved and loaded for deployment.

use crate::dataset::Dataset;
use crate::error::{PipelineError, Result};
use crate::model::{Estimator, Predictor, ProbabilisticClassifier};
use crate::pipeline::pipeline::{ColumnScopedPipeline, FittedColumnScopedPipeline, PipelineParams};
use crate::preprocessing::traits::FittedTransformer;
use crate::serialization::{read_params, write_params};
use ndarray::Array2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serializable parameters for the predictive pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PredictivePipelineParams<M> {
    pub preprocessor: PipelineParams,
    pub model: M,
    /// Estimator input columns, in matrix order.
    pub feature_names: Vec<String>,
}

/// Unfitted stages plus an unfitted estimator.
#[derive(Clone, Debug)]
pub struct PredictivePipelineBuilder<E> {
    pipeline: ColumnScopedPipeline,
    estimator: E,
}

impl ColumnScopedPipeline {
    /// Terminate the pipeline in `estimator`.
    pub fn with_estimator<E: Estimator>(self, estimator: E) -> PredictivePipelineBuilder<E> {
        PredictivePipelineBuilder {
            pipeline: self,
            estimator,
        }
    }
}

impl<E: Estimator> PredictivePipelineBuilder<E> {
    pub fn pipeline(&self) -> &ColumnScopedPipeline {
        &self.pipeline
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    /// Fit the stages in order, then the estimator on the final data.
    ///
    /// # Errors
    /// Everything [`ColumnScopedPipeline`] fitting can return, plus
    /// [`PipelineError::Configuration`] when the transformed data still holds
    /// a categorical column or a missing value.
    pub fn fit(&self, data: &Dataset, labels: &[f64]) -> Result<PredictivePipeline<E::Fitted>> {
        let (preprocessor, transformed) = self.pipeline.fit_with_output(data, Some(labels))?;
        let matrix = transformed.to_matrix()?;
        let model = self.estimator.fit(&matrix, labels)?;
        let feature_names: Vec<String> = transformed
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        tracing::info!(
            rows = matrix.nrows(),
            features = feature_names.len(),
            "predictive pipeline fitted"
        );

        Ok(PredictivePipeline {
            preprocessor,
            model,
            feature_names,
        })
    }
}

/// Fitted stages plus a fitted estimator.
///
/// Provides a unified interface for:
/// 1. Replaying the fitted stages on new data
/// 2. Checking the result against the estimator's feature names
/// 3. Making predictions with the trained model
#[derive(Clone, Debug)]
pub struct PredictivePipeline<M> {
    preprocessor: FittedColumnScopedPipeline,
    model: M,
    feature_names: Vec<String>,
}

impl<M: Predictor> PredictivePipeline<M> {
    /// Assemble a predictive pipeline from already fitted parts.
    pub fn new(
        preprocessor: FittedColumnScopedPipeline,
        model: M,
        feature_names: Vec<String>,
    ) -> Result<Self> {
        if feature_names.len() != model.n_features_in() {
            return Err(PipelineError::FeatureMismatch {
                expected: model.n_features_in(),
                got: feature_names.len(),
            });
        }
        Ok(Self {
            preprocessor,
            model,
            feature_names,
        })
    }

    pub fn preprocessor(&self) -> &FittedColumnScopedPipeline {
        &self.preprocessor
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Columns the estimator consumes, in matrix order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Get the number of features the estimator expects.
    pub fn n_features_in(&self) -> usize {
        self.feature_names.len()
    }

    /// Replay the fitted stages on `data`.
    pub fn transform(&self, data: &Dataset) -> Result<Dataset> {
        self.preprocessor.transform(data)
    }

    /// Replay the stages and convert to the estimator's input matrix.
    fn features(&self, data: &Dataset) -> Result<Array2<f64>> {
        let transformed = self.transform(data)?;
        let names = transformed.column_names();
        if names.len() != self.feature_names.len()
            || names.iter().zip(&self.feature_names).any(|(a, b)| *a != b.as_str())
        {
            tracing::warn!(
                expected = ?self.feature_names,
                got = ?names,
                "transformed columns differ from fitted features"
            );
            return Err(PipelineError::FeatureMismatch {
                expected: self.feature_names.len(),
                got: names.len(),
            });
        }
        transformed.to_matrix()
    }

    /// Make predictions on new data; one value per row.
    pub fn predict(&self, data: &Dataset) -> Result<Vec<f64>> {
        let matrix = self.features(data)?;
        self.model.predict(&matrix)
    }
}

impl<M: ProbabilisticClassifier> PredictivePipeline<M> {
    /// Class probabilities, one row per input row.
    pub fn predict_proba(&self, data: &Dataset) -> Result<Array2<f64>> {
        let matrix = self.features(data)?;
        self.model.predict_proba(&matrix)
    }
}

impl<M: Predictor + Clone + Serialize + DeserializeOwned> PredictivePipeline<M> {
    /// Extract parameters for serialization.
    pub fn extract_params(&self) -> PredictivePipelineParams<M> {
        PredictivePipelineParams {
            preprocessor: self.preprocessor.extract_params(),
            model: self.model.clone(),
            feature_names: self.feature_names.clone(),
        }
    }

    /// Reconstruct from parameters.
    pub fn from_params(params: PredictivePipelineParams<M>) -> Result<Self> {
        let preprocessor = FittedColumnScopedPipeline::from_params(params.preprocessor)?;
        Self::new(preprocessor, params.model, params.feature_names)
    }

    /// Save the entire pipeline to a file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        write_params(&self.extract_params(), path)
    }

    /// Load a pipeline from a file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let params = read_params::<PredictivePipelineParams<M>, _>(path)?;
        Self::from_params(params)
    }
}

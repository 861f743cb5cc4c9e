//! Declarative pipeline definitions.
//!
//! A [`PipelineConfig`] is a JSON document listing the stages in execution
//! order. Each entry carries a `kind`, an optional `name` (defaults to the
//! kind) and the stage's columns and hyperparameters:
//!
//! ```json
//! {
//!   "stages": [
//!     {"kind": "missing_indicator", "columns": ["LotFrontage"]},
//!     {"kind": "median_imputer", "name": "impute_num", "columns": ["LotFrontage"]},
//!     {"kind": "rare_label_encoder", "columns": ["MSZoning"], "tol": 0.01, "n_categories": 4}
//!   ]
//! }
//! ```
//!
//! Omitted hyperparameters take the same defaults as the stage builders.

use crate::error::Result;
use crate::pipeline::pipeline::ColumnScopedPipeline;
use crate::pipeline::stage::Stage;
use crate::preprocessing::{
    CategoricalFill, CategoricalImputer, DropColumns, ElapsedTime, EqualFrequencyDiscretiser,
    ExtractTitle, ImputeStrategy, LogTransform, MedianImputer, MinMaxScaler, MissingIndicator,
    OrdinalEncoder, OrdinalMethod, RareLabelConfig, RareLabelEncoder, SplitAlphanumeric,
    StandardScaler, UnseenLabels, ValueMapper,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

fn default_tol() -> f64 {
    RareLabelConfig::default().tol
}

fn default_n_categories() -> usize {
    RareLabelConfig::default().n_categories
}

fn default_q() -> usize {
    10
}

fn enabled() -> bool {
    true
}

fn unit_range() -> (f64, f64) {
    (0.0, 1.0)
}

/// Columns and hyperparameters of one stage, tagged by kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageSpec {
    MissingIndicator {
        columns: Vec<String>,
    },
    MedianImputer {
        columns: Vec<String>,
        #[serde(default)]
        strategy: ImputeStrategy,
    },
    CategoricalImputer {
        columns: Vec<String>,
        #[serde(default)]
        fill: CategoricalFill,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fill_label: Option<String>,
    },
    RareLabelEncoder {
        columns: Vec<String>,
        #[serde(default = "default_tol")]
        tol: f64,
        #[serde(default = "default_n_categories")]
        n_categories: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_n_categories: Option<usize>,
        #[serde(default)]
        unseen: UnseenLabels,
    },
    OrdinalEncoder {
        columns: Vec<String>,
        #[serde(default)]
        method: OrdinalMethod,
    },
    ValueMapper {
        columns: Vec<String>,
        mapping: BTreeMap<String, f64>,
        #[serde(default)]
        default: f64,
    },
    EqualFrequencyDiscretiser {
        columns: Vec<String>,
        #[serde(default = "default_q")]
        q: usize,
    },
    StandardScaler {
        columns: Vec<String>,
        #[serde(default = "enabled")]
        with_mean: bool,
        #[serde(default = "enabled")]
        with_std: bool,
    },
    #[serde(rename = "minmax_scaler")]
    MinMaxScaler {
        columns: Vec<String>,
        #[serde(default = "unit_range")]
        feature_range: (f64, f64),
    },
    ElapsedTime {
        columns: Vec<String>,
        reference: String,
    },
    SplitAlphanumeric {
        column: String,
        #[serde(default)]
        drop_original: bool,
    },
    ExtractTitle {
        column: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<String>,
    },
    LogTransform {
        columns: Vec<String>,
    },
    DropColumns {
        columns: Vec<String>,
    },
}

impl StageSpec {
    /// Build the unfitted stage this entry describes.
    pub fn build(&self) -> Stage {
        match self {
            StageSpec::MissingIndicator { columns } => MissingIndicator::new(columns).into(),
            StageSpec::MedianImputer { columns, strategy } => MedianImputer::new(columns)
                .with_strategy(*strategy)
                .into(),
            StageSpec::CategoricalImputer {
                columns,
                fill,
                fill_label,
            } => {
                let mut imputer = CategoricalImputer::new(columns).with_fill(*fill);
                if let Some(label) = fill_label {
                    imputer = imputer.with_fill_label(label.as_str());
                }
                imputer.into()
            }
            StageSpec::RareLabelEncoder {
                columns,
                tol,
                n_categories,
                max_n_categories,
                unseen,
            } => {
                let mut encoder = RareLabelEncoder::new(columns)
                    .with_tol(*tol)
                    .with_n_categories(*n_categories)
                    .with_unseen(*unseen);
                if let Some(max) = max_n_categories {
                    encoder = encoder.with_max_n_categories(*max);
                }
                encoder.into()
            }
            StageSpec::OrdinalEncoder { columns, method } => {
                OrdinalEncoder::new(columns).with_method(*method).into()
            }
            StageSpec::ValueMapper {
                columns,
                mapping,
                default,
            } => ValueMapper::new(columns, mapping.iter().map(|(k, v)| (k.as_str(), *v)))
                .with_default(*default)
                .into(),
            StageSpec::EqualFrequencyDiscretiser { columns, q } => {
                EqualFrequencyDiscretiser::new(columns).with_q(*q).into()
            }
            StageSpec::StandardScaler {
                columns,
                with_mean,
                with_std,
            } => StandardScaler::new(columns)
                .with_mean(*with_mean)
                .with_std(*with_std)
                .into(),
            StageSpec::MinMaxScaler {
                columns,
                feature_range,
            } => MinMaxScaler::new(columns)
                .with_range(feature_range.0, feature_range.1)
                .into(),
            StageSpec::ElapsedTime { columns, reference } => {
                ElapsedTime::new(columns, reference.as_str()).into()
            }
            StageSpec::SplitAlphanumeric {
                column,
                drop_original,
            } => SplitAlphanumeric::new(column.as_str())
                .with_drop_original(*drop_original)
                .into(),
            StageSpec::ExtractTitle { column, output } => {
                let mut stage = ExtractTitle::new(column.as_str());
                if let Some(output) = output {
                    stage = stage.with_output(output.as_str());
                }
                stage.into()
            }
            StageSpec::LogTransform { columns } => LogTransform::new(columns).into(),
            StageSpec::DropColumns { columns } => DropColumns::new(columns).into(),
        }
    }
}

/// One named entry of a [`PipelineConfig`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub spec: StageSpec,
}

/// Declarative definition of a [`ColumnScopedPipeline`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub stages: Vec<StageConfig>,
}

impl PipelineConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON configuration file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build the unfitted pipeline. Unnamed stages are named after their kind.
    pub fn build(&self) -> ColumnScopedPipeline {
        self.stages
            .iter()
            .fold(ColumnScopedPipeline::new(), |pipeline, entry| {
                let stage = entry.spec.build();
                let name = entry
                    .name
                    .clone()
                    .unwrap_or_else(|| stage.kind().to_string());
                pipeline.add_stage(name, stage)
            })
    }
}

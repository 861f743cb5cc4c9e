//! Enums over every stage kind a pipeline can hold.
//!
//! [`Stage`] wraps the unfitted stages, [`FittedStage`] their fitted states
//! and [`StageParams`] the serializable parameters. All three share variant
//! names so a stage keeps its identity through fit, save and load.

use crate::dataset::Dataset;
use crate::error::Result;
use crate::preprocessing::traits::{FittedTransformer, Transformer, UnseenValues};
use crate::preprocessing::{
    CategoricalImputer, CategoricalImputerParams, DropColumns, DropColumnsParams, ElapsedTime,
    ElapsedTimeParams, EqualFrequencyDiscretiser, EqualFrequencyDiscretiserParams, ExtractTitle,
    ExtractTitleParams, FittedCategoricalImputer, FittedDropColumns, FittedElapsedTime,
    FittedEqualFrequencyDiscretiser, FittedExtractTitle, FittedLogTransform, FittedMedianImputer,
    FittedMinMaxScaler, FittedMissingIndicator, FittedOrdinalEncoder, FittedRareLabelEncoder,
    FittedSplitAlphanumeric, FittedStandardScaler, FittedValueMapper, LogTransform,
    LogTransformParams, MedianImputer, MedianImputerParams, MinMaxScaler, MinMaxScalerParams,
    MissingIndicator, MissingIndicatorParams, OrdinalEncoder, OrdinalEncoderParams,
    RareLabelEncoder, RareLabelEncoderParams, SplitAlphanumeric, SplitAlphanumericParams,
    StandardScaler, StandardScalerParams, ValueMapper, ValueMapperParams,
};
use serde::{Deserialize, Serialize};

macro_rules! stage_enums {
    ($($variant:ident($unfitted:ty, $fitted:ty, $params:ty)),+ $(,)?) => {
        /// An unfitted pipeline stage.
        #[derive(Clone, Debug)]
        pub enum Stage {
            $($variant($unfitted),)+
        }

        /// The fitted state of a pipeline stage.
        #[derive(Clone, Debug)]
        pub enum FittedStage {
            $($variant($fitted),)+
        }

        /// Serializable parameters of a fitted stage.
        #[derive(Clone, Debug, Serialize, Deserialize)]
        pub enum StageParams {
            $($variant($params),)+
        }

        $(
            impl From<$unfitted> for Stage {
                fn from(stage: $unfitted) -> Self {
                    Stage::$variant(stage)
                }
            }

            impl From<$fitted> for FittedStage {
                fn from(stage: $fitted) -> Self {
                    FittedStage::$variant(stage)
                }
            }
        )+

        impl Stage {
            /// Stable identifier of the stage kind.
            pub fn kind(&self) -> &'static str {
                match self {
                    $(Stage::$variant(s) => s.kind(),)+
                }
            }

            /// Columns the stage declares.
            pub fn columns(&self) -> &[String] {
                match self {
                    $(Stage::$variant(s) => s.columns(),)+
                }
            }

            pub(crate) fn fit(&self, data: &Dataset, target: Option<&[f64]>) -> Result<FittedStage> {
                match self {
                    $(Stage::$variant(s) => s.fit(data, target).map(FittedStage::$variant),)+
                }
            }
        }

        impl FittedStage {
            pub fn kind(&self) -> &'static str {
                match self {
                    $(FittedStage::$variant(s) => s.kind(),)+
                }
            }

            pub fn columns(&self) -> &[String] {
                match self {
                    $(FittedStage::$variant(s) => s.columns(),)+
                }
            }

            pub fn transform(&self, data: &Dataset) -> Result<Dataset> {
                match self {
                    $(FittedStage::$variant(s) => s.transform(data),)+
                }
            }

            pub fn unseen(&self, data: &Dataset) -> Vec<UnseenValues> {
                match self {
                    $(FittedStage::$variant(s) => s.unseen(data),)+
                }
            }

            pub fn extract_params(&self) -> StageParams {
                match self {
                    $(FittedStage::$variant(s) => StageParams::$variant(s.extract_params()),)+
                }
            }

            pub fn from_params(params: StageParams) -> Result<Self> {
                match params {
                    $(StageParams::$variant(p) => <$fitted>::from_params(p).map(FittedStage::$variant),)+
                }
            }
        }
    };
}

stage_enums! {
    MissingIndicator(MissingIndicator, FittedMissingIndicator, MissingIndicatorParams),
    MedianImputer(MedianImputer, FittedMedianImputer, MedianImputerParams),
    CategoricalImputer(CategoricalImputer, FittedCategoricalImputer, CategoricalImputerParams),
    RareLabelEncoder(RareLabelEncoder, FittedRareLabelEncoder, RareLabelEncoderParams),
    OrdinalEncoder(OrdinalEncoder, FittedOrdinalEncoder, OrdinalEncoderParams),
    ValueMapper(ValueMapper, FittedValueMapper, ValueMapperParams),
    EqualFrequencyDiscretiser(
        EqualFrequencyDiscretiser,
        FittedEqualFrequencyDiscretiser,
        EqualFrequencyDiscretiserParams
    ),
    StandardScaler(StandardScaler, FittedStandardScaler, StandardScalerParams),
    MinMaxScaler(MinMaxScaler, FittedMinMaxScaler, MinMaxScalerParams),
    ElapsedTime(ElapsedTime, FittedElapsedTime, ElapsedTimeParams),
    SplitAlphanumeric(SplitAlphanumeric, FittedSplitAlphanumeric, SplitAlphanumericParams),
    ExtractTitle(ExtractTitle, FittedExtractTitle, ExtractTitleParams),
    LogTransform(LogTransform, FittedLogTransform, LogTransformParams),
    DropColumns(DropColumns, FittedDropColumns, DropColumnsParams),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;

    fn houses() -> Dataset {
        Dataset::new(vec![
            Column::numeric("LotFrontage", vec![Some(65.0), None, Some(80.0), Some(60.0)]),
            Column::categorical("MSZoning", vec![Some("RL"), Some("RM"), None, Some("RL")]),
            Column::categorical(
                "Neighborhood",
                vec![Some("NAmes"), Some("OldTown"), Some("NAmes"), Some("Edwards")],
            ),
            Column::categorical("ExterQual", vec![Some("Gd"), Some("TA"), Some("Ex"), Some("Po")]),
            Column::numeric_dense("GrLivArea", vec![1710.0, 1262.0, 1786.0, 1717.0]),
            Column::numeric_dense("YearBuilt", vec![2003.0, 1976.0, 2001.0, 1915.0]),
            Column::numeric_dense("YrSold", vec![2008.0, 2007.0, 2008.0, 2006.0]),
            Column::categorical(
                "Name",
                vec![
                    Some("Braund, Mr. Owen"),
                    Some("Heikkinen, Miss. Laina"),
                    None,
                    Some("Rice, Master. Eugene"),
                ],
            ),
            Column::categorical("Cabin", vec![Some("C85"), None, Some("E46"), Some("B")]),
        ])
        .unwrap()
    }

    fn every_stage() -> Vec<Stage> {
        vec![
            MissingIndicator::new(["LotFrontage"]).into(),
            MedianImputer::new(["LotFrontage"]).into(),
            CategoricalImputer::new(["MSZoning"]).into(),
            RareLabelEncoder::new(["Neighborhood"]).with_tol(0.3).into(),
            OrdinalEncoder::new(["Neighborhood"]).into(),
            ValueMapper::new(["ExterQual"], [("Po", 1.0), ("TA", 3.0), ("Gd", 4.0)]).into(),
            EqualFrequencyDiscretiser::new(["GrLivArea"]).with_q(2).into(),
            StandardScaler::new(["GrLivArea", "YearBuilt"]).into(),
            MinMaxScaler::new(["GrLivArea"]).into(),
            ElapsedTime::new(["YearBuilt"], "YrSold").into(),
            SplitAlphanumeric::new("Cabin").into(),
            ExtractTitle::new("Name").into(),
            LogTransform::new(["GrLivArea"]).into(),
            DropColumns::new(["YrSold"]).into(),
        ]
    }

    #[test]
    fn test_every_stage_is_idempotent_and_round_trips() {
        let data = houses();
        let original = data.clone();
        let prices = [208500.0, 181500.0, 223500.0, 140000.0];

        let stages = every_stage();
        let mut kinds: Vec<&str> = stages.iter().map(|s| s.kind()).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), 14);

        for stage in &stages {
            let fitted = stage.fit(&data, Some(&prices[..])).unwrap();
            let first = fitted.transform(&data).unwrap();
            let second = fitted.transform(&data).unwrap();
            assert_eq!(first, second, "{} is not idempotent", stage.kind());
            assert_eq!(data, original, "{} mutated its input", stage.kind());

            let bytes = bincode::serialize(&fitted.extract_params()).unwrap();
            let params: StageParams = bincode::deserialize(&bytes).unwrap();
            let restored = FittedStage::from_params(params).unwrap();
            assert_eq!(restored.kind(), stage.kind());
            assert_eq!(
                bincode::serialize(&restored.extract_params()).unwrap(),
                bytes,
                "{} params changed on reload",
                stage.kind()
            );
            assert_eq!(restored.transform(&data).unwrap(), first);
        }
    }

    #[test]
    fn test_stage_dispatch_keeps_variant() {
        let data = Dataset::new(vec![Column::numeric(
            "LotFrontage",
            vec![Some(60.0), None, Some(80.0)],
        )])
        .unwrap();
        let stage: Stage = MedianImputer::new(["LotFrontage"]).into();
        assert_eq!(stage.kind(), "median_imputer");
        assert_eq!(stage.columns(), &["LotFrontage".to_string()]);

        let fitted = stage.fit(&data, None).unwrap();
        assert!(matches!(fitted, FittedStage::MedianImputer(_)));
        let out = fitted.transform(&data).unwrap();
        assert_eq!(out.column("LotFrontage").unwrap().n_missing(), 0);

        let bytes = bincode::serialize(&fitted.extract_params()).unwrap();
        let params: StageParams = bincode::deserialize(&bytes).unwrap();
        let restored = FittedStage::from_params(params).unwrap();
        assert_eq!(restored.kind(), "median_imputer");
        assert_eq!(
            restored.transform(&data).unwrap().column("LotFrontage").unwrap().as_numeric(),
            out.column("LotFrontage").unwrap().as_numeric()
        );
    }
}

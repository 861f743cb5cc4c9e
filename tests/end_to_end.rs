use feature_pipe::dataset::{Column, Dataset, Schema};
use feature_pipe::model::{FittedLogisticRegression, LassoRegression, LogisticRegression};
use feature_pipe::pipeline::{ColumnScopedPipeline, FittedStage, PipelineConfig, PredictivePipeline};
use feature_pipe::preprocessing::{
    CategoricalImputer, DropColumns, ElapsedTime, EqualFrequencyDiscretiser, FittedTransformer, MedianImputer,
    MissingIndicator, OrdinalEncoder, RareLabelEncoder, SplitAlphanumeric, StandardScaler,
    Transformer, RARE_LABEL, UNSEEN_RANK,
};
use feature_pipe::PipelineError;

fn houses() -> Dataset {
    Dataset::new(vec![
        Column::numeric_dense("YearBuilt", vec![2000.0, 1990.0, 1975.0, 2003.0]),
        Column::numeric_dense("YrSold", vec![2005.0, 2007.0, 2006.0, 2008.0]),
        Column::numeric("LotFrontage", vec![None, Some(60.0), Some(80.0), Some(70.0)]),
    ])
    .unwrap()
}

#[test]
fn regression_scenario_elapsed_years_and_imputation() {
    let pipeline = ColumnScopedPipeline::new()
        .add_stage("elapsed_time", ElapsedTime::new(["YearBuilt"], "YrSold"))
        .add_stage("missing_indicator", MissingIndicator::new(["LotFrontage"]))
        .add_stage("median_imputer", MedianImputer::new(["LotFrontage"]));

    let data = houses();
    let fitted = pipeline.fit(&data, None).unwrap();
    let out = fitted.transform(&data).unwrap();

    assert_eq!(
        out.column_names(),
        vec!["YearBuilt", "YrSold", "LotFrontage", "LotFrontage_na"]
    );
    let year = out.column("YearBuilt").unwrap().as_numeric().unwrap();
    assert_eq!(year[0], Some(5.0));
    let flag = out.column("LotFrontage_na").unwrap().as_numeric().unwrap();
    assert_eq!(flag, &[Some(1.0), Some(0.0), Some(0.0), Some(0.0)]);
    let lot = out.column("LotFrontage").unwrap().as_numeric().unwrap();
    assert_eq!(lot[0], Some(70.0));
    assert_eq!(out.column("LotFrontage").unwrap().n_missing(), 0);

    match fitted.stage("median_imputer") {
        Some(FittedStage::MedianImputer(imputer)) => {
            assert_eq!(imputer.statistic("LotFrontage"), Some(70.0))
        }
        other => panic!("unexpected stage {:?}", other),
    }
}

fn passengers(n: usize) -> (Dataset, Vec<f64>) {
    let cabins: Vec<Option<String>> = (0..n)
        .map(|i| match i {
            0 => Some("C85".to_string()),
            i if i % 4 == 0 => None,
            i => Some(format!("B{}", i)),
        })
        .collect();
    let fare: Vec<f64> = (0..n).map(|i| 7.0 + (i % 13) as f64).collect();
    let survived = (0..n).map(|i| (i % 2) as f64).collect();
    let data = Dataset::new(vec![
        Column::categorical("cabin", cabins),
        Column::numeric_dense("fare", fare),
    ])
    .unwrap();
    (data, survived)
}

fn passenger_pipeline() -> ColumnScopedPipeline {
    ColumnScopedPipeline::new()
        .add_stage("split_cabin", SplitAlphanumeric::new("cabin"))
        .add_stage("impute_cat", CategoricalImputer::new(["cabin_cat"]))
        .add_stage(
            "rare",
            RareLabelEncoder::new(["cabin_cat"])
                .with_tol(0.01)
                .with_n_categories(1),
        )
        .add_stage("ordinal", OrdinalEncoder::new(["cabin_cat"]))
}

#[test]
fn classification_scenario_cabin_split_and_rare_grouping() {
    let (data, survived) = passengers(120);

    let split = SplitAlphanumeric::new("cabin").fit(&data, None).unwrap();
    let split_out = split.transform(&data).unwrap();
    assert_eq!(
        split_out.column("cabin_num").unwrap().as_numeric().unwrap()[0],
        Some(85.0)
    );
    assert_eq!(
        split_out.column("cabin_cat").unwrap().as_categorical().unwrap()[0].as_deref(),
        Some("C")
    );

    let fitted = passenger_pipeline().fit(&data, Some(&survived[..])).unwrap();
    match fitted.stage("rare") {
        Some(FittedStage::RareLabelEncoder(rare)) => {
            assert_eq!(rare.rare_labels("cabin_cat").unwrap(), &["C".to_string()]);
        }
        other => panic!("unexpected stage {:?}", other),
    }
    match fitted.stage("ordinal") {
        Some(FittedStage::OrdinalEncoder(ordinal)) => {
            let categories = ordinal.categories("cabin_cat").unwrap();
            assert!(categories.iter().any(|c| c == RARE_LABEL));
            assert!(!categories.iter().any(|c| c == "C"));
        }
        other => panic!("unexpected stage {:?}", other),
    }

    let out = fitted.transform(&data).unwrap();
    let encoded = out.column("cabin_cat").unwrap().as_numeric().unwrap();
    assert!(encoded.iter().all(|v| matches!(v, Some(r) if *r >= 0.0)));
}

#[test]
fn unseen_category_resolves_to_sentinel_rank() {
    let (data, survived) = passengers(120);
    let fitted = passenger_pipeline().fit(&data, Some(&survived[..])).unwrap();

    let test = Dataset::new(vec![
        Column::categorical("cabin", vec![Some("T5"), Some("B7")]),
        Column::numeric_dense("fare", vec![10.0, 8.0]),
    ])
    .unwrap();
    let out = fitted.transform(&test).unwrap();
    let encoded = out.column("cabin_cat").unwrap().as_numeric().unwrap();
    assert_eq!(encoded[0], Some(UNSEEN_RANK));
    assert!(encoded[1].unwrap() >= 0.0);

    let report = fitted.drift_report(&test).unwrap();
    assert_eq!(report.for_stage("rare").unwrap()[0].count, 1);
}

#[test]
fn transform_is_idempotent_and_leaves_input_untouched() {
    let (data, survived) = passengers(60);
    let pipeline = passenger_pipeline()
        .add_stage("impute_num", MedianImputer::new(["cabin_num"]))
        .add_stage("scale", StandardScaler::new(["fare", "cabin_num"]));
    let fitted = pipeline.fit(&data, Some(&survived[..])).unwrap();

    let first = fitted.transform(&data).unwrap();
    let second = fitted.transform(&data).unwrap();
    assert_eq!(first, second);
    assert_eq!(data.column_names(), vec!["cabin", "fare"]);
    assert_eq!(
        data.column("cabin").unwrap().as_categorical().unwrap()[0].as_deref(),
        Some("C85")
    );
}

#[test]
fn equal_frequency_bins_are_balanced() {
    let values: Vec<f64> = (0..103).map(|i| ((i * 37) % 103) as f64).collect();
    let data = Dataset::new(vec![Column::numeric_dense("x", values)]).unwrap();
    let fitted = EqualFrequencyDiscretiser::new(["x"])
        .with_q(4)
        .fit(&data, None)
        .unwrap();
    let out = fitted.transform(&data).unwrap();

    let mut counts = vec![0usize; fitted.n_bins("x").unwrap()];
    for bin in out.column("x").unwrap().as_numeric().unwrap().iter().flatten() {
        counts[*bin as usize] += 1;
    }
    let max = counts.iter().max().unwrap();
    let min = counts.iter().min().unwrap();
    assert_eq!(counts.len(), 4);
    assert!(max - min <= 1, "unbalanced bins {:?}", counts);
}

#[test]
fn encoding_before_imputation_fails_at_fit() {
    let (data, survived) = passengers(40);
    let pipeline = ColumnScopedPipeline::new()
        .add_stage("split_cabin", SplitAlphanumeric::new("cabin"))
        .add_stage("rare", RareLabelEncoder::new(["cabin_cat"]))
        .add_stage("impute_cat", CategoricalImputer::new(["cabin_cat"]));
    let result = pipeline.fit(&data, Some(&survived[..]));
    assert!(matches!(result, Err(PipelineError::Configuration { .. })));
}

#[test]
fn predictive_pipeline_from_csv_and_config() {
    let csv = "\
LotFrontage,MSZoning,SalePrice
65,RL,208500
80,RL,181500
,RM,223500
60,RL,140000
84,RM,250000
NA,RL,143000
75,FV,307000
70,RL,200000
";
    let schema = Schema::new()
        .with_numeric("LotFrontage")
        .with_categorical("MSZoning")
        .with_numeric("SalePrice");
    let table = Dataset::from_csv_reader(csv.as_bytes(), &schema).unwrap();
    let price: Vec<f64> = table
        .column("SalePrice")
        .unwrap()
        .as_numeric()
        .unwrap()
        .iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();

    let config = PipelineConfig::from_json_str(
        r#"{"stages": [
            {"kind": "drop_columns", "name": "drop_target", "columns": ["SalePrice"]},
            {"kind": "missing_indicator", "columns": ["LotFrontage"]},
            {"kind": "median_imputer", "columns": ["LotFrontage"]},
            {"kind": "rare_label_encoder", "columns": ["MSZoning"], "tol": 0.2, "n_categories": 2},
            {"kind": "ordinal_encoder", "columns": ["MSZoning"]},
            {"kind": "standard_scaler", "columns": ["LotFrontage", "MSZoning"]}
        ]}"#,
    )
    .unwrap();

    let model = config
        .build()
        .with_estimator(LassoRegression::new().with_alpha(0.0))
        .fit(&table, &price)
        .unwrap();
    assert_eq!(
        model.feature_names(),
        &["LotFrontage", "MSZoning", "LotFrontage_na"]
    );
    let predictions = model.predict(&table).unwrap();
    assert_eq!(predictions.len(), 8);
    assert!(predictions.iter().all(|p| p.is_finite()));
}

#[test]
fn classifier_save_load_gives_identical_probabilities() {
    let (data, survived) = passengers(80);
    let model = passenger_pipeline()
        .add_stage("impute_num", MedianImputer::new(["cabin_num"]))
        .add_stage("drop_cabin", DropColumns::new(["cabin"]))
        .add_stage("scale", StandardScaler::new(["fare", "cabin_num", "cabin_cat"]))
        .with_estimator(LogisticRegression::new().with_max_iter(300))
        .fit(&data, &survived)
        .unwrap();

    let file = tempfile::NamedTempFile::new().unwrap();
    model.save_to_file(file.path()).unwrap();
    let loaded = PredictivePipeline::<FittedLogisticRegression>::load_from_file(file.path()).unwrap();

    let before = model.predict_proba(&data).unwrap();
    let after = loaded.predict_proba(&data).unwrap();
    assert_eq!(before, after);
    assert_eq!(before.ncols(), 2);
}

#[test]
fn estimators_learn_through_pipeline() {
    let x: Vec<Option<f64>> = (0..50)
        .map(|i| if i % 10 == 3 { None } else { Some(i as f64) })
        .collect();
    let y: Vec<f64> = (0..50).map(|i| 3.0 * i as f64 + 2.0).collect();
    let data = Dataset::new(vec![Column::numeric("x", x)]).unwrap();

    let model = ColumnScopedPipeline::new()
        .add_stage("impute", MedianImputer::new(["x"]))
        .with_estimator(LassoRegression::new().with_alpha(0.0))
        .fit(&data, &y)
        .unwrap();

    let clean = Dataset::new(vec![Column::numeric_dense("x", vec![10.0, 20.0])]).unwrap();
    let predictions = model.predict(&clean).unwrap();
    // imputed rows bend the fit slightly; the slope stays close to 3
    let slope = (predictions[1] - predictions[0]) / 10.0;
    assert!((slope - 3.0).abs() < 0.5, "slope {}", slope);
}

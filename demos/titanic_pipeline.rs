//! End-to-end Titanic survival classification with a pipeline loaded from JSON.
//!
//! Demonstrates:
//! - a pipeline declared as a JSON document
//! - title extraction from passenger names
//! - splitting cabin codes such as `C85` into a deck letter and a number
//! - imputation with missing indicators
//! - rare-label grouping and ordinal encoding of categorical columns
//! - logistic regression with class probabilities
//! - predicting for a new passenger whose deck was never seen in training
//!
//! Run with: cargo run --example titanic_pipeline

use feature_pipe::dataset::{Column, Dataset};
use feature_pipe::model::{FittedLogisticRegression, LogisticRegression};
use feature_pipe::pipeline::{PipelineConfig, PredictivePipeline};
use feature_pipe::PipelineError;
use std::error::Error;
use tracing_subscriber::EnvFilter;

const PIPELINE_JSON: &str = r#"{
  "stages": [
    {"kind": "extract_title", "column": "name"},
    {"kind": "drop_columns", "name": "drop_name", "columns": ["name"]},
    {"kind": "split_alphanumeric", "column": "cabin", "drop_original": true},
    {"kind": "missing_indicator", "columns": ["age", "fare"]},
    {"kind": "median_imputer", "columns": ["age", "fare", "cabin_num"]},
    {"kind": "categorical_imputer", "columns": ["sex", "cabin_cat", "embarked", "title"]},
    {"kind": "rare_label_encoder", "columns": ["cabin_cat", "embarked", "title"],
     "tol": 0.05, "n_categories": 1},
    {"kind": "ordinal_encoder", "columns": ["sex", "cabin_cat", "embarked", "title"]},
    {"kind": "standard_scaler",
     "columns": ["pclass", "age", "sibsp", "parch", "fare", "cabin_num",
                 "sex", "cabin_cat", "embarked", "title"]}
  ]
}"#;

type Passenger = (
    &'static str,
    f64,
    &'static str,
    Option<f64>,
    f64,
    f64,
    Option<f64>,
    Option<&'static str>,
    Option<&'static str>,
    f64,
);

/// name, pclass, sex, age, sibsp, parch, fare, cabin, embarked, survived
#[rustfmt::skip]
const PASSENGERS: [Passenger; 32] = [
    ("Allen, Miss. Elisabeth Walton", 1.0, "female", Some(29.0), 0.0, 0.0, Some(211.34), Some("B5"), Some("S"), 1.0),
    ("Allison, Master. Hudson Trevor", 1.0, "male", Some(0.92), 1.0, 2.0, Some(151.55), Some("C22"), Some("S"), 1.0),
    ("Allison, Mrs. Hudson J C", 1.0, "female", Some(25.0), 1.0, 2.0, Some(151.55), Some("C22"), Some("S"), 0.0),
    ("Anderson, Mr. Harry", 1.0, "male", Some(48.0), 0.0, 0.0, Some(26.55), Some("E12"), Some("S"), 1.0),
    ("Andrews, Mr. Thomas Jr", 1.0, "male", Some(39.0), 0.0, 0.0, Some(0.0), Some("A36"), Some("S"), 0.0),
    ("Appleton, Mrs. Edward Dale", 1.0, "female", Some(53.0), 2.0, 0.0, Some(51.48), Some("C101"), Some("S"), 1.0),
    ("Artagaveytia, Mr. Ramon", 1.0, "male", Some(71.0), 0.0, 0.0, Some(49.5), None, Some("C"), 0.0),
    ("Astor, Mrs. John Jacob", 1.0, "female", Some(18.0), 1.0, 0.0, Some(227.53), Some("C62"), Some("C"), 1.0),
    ("Aubart, Mme. Leontine Pauline", 1.0, "female", Some(24.0), 0.0, 0.0, Some(69.3), Some("B35"), Some("C"), 1.0),
    ("Barber, Miss. Ellen Nellie", 1.0, "female", Some(26.0), 0.0, 0.0, Some(78.85), None, Some("S"), 1.0),
    ("Baxter, Mr. Quigg Edmond", 1.0, "male", Some(24.0), 0.0, 1.0, Some(247.52), Some("B58"), Some("C"), 0.0),
    ("Bishop, Mrs. Dickinson H", 1.0, "female", Some(19.0), 1.0, 0.0, Some(91.08), Some("B49"), Some("C"), 1.0),
    ("Abelson, Mr. Samuel", 2.0, "male", Some(30.0), 1.0, 0.0, Some(24.0), None, Some("C"), 0.0),
    ("Abelson, Mrs. Samuel", 2.0, "female", Some(28.0), 1.0, 0.0, Some(24.0), None, Some("C"), 1.0),
    ("Aldworth, Mr. Charles Augustus", 2.0, "male", Some(30.0), 0.0, 0.0, Some(13.0), None, Some("S"), 0.0),
    ("Andrew, Miss. Edgardo Samuel", 2.0, "female", Some(18.0), 0.0, 0.0, Some(11.5), None, Some("S"), 1.0),
    ("Angle, Mrs. William A", 2.0, "female", Some(36.0), 1.0, 0.0, Some(26.0), None, Some("S"), 1.0),
    ("Ashby, Mr. John", 2.0, "male", Some(57.0), 0.0, 0.0, Some(13.0), None, Some("S"), 0.0),
    ("Bailey, Mr. Percy Andrew", 2.0, "male", Some(18.0), 0.0, 0.0, Some(11.5), None, Some("S"), 0.0),
    ("Becker, Master. Richard F", 2.0, "male", Some(1.0), 2.0, 1.0, Some(39.0), Some("F4"), Some("S"), 1.0),
    ("Beesley, Mr. Lawrence", 2.0, "male", Some(34.0), 0.0, 0.0, Some(13.0), Some("D56"), Some("S"), 1.0),
    ("Byles, Rev. Thomas Roussel Davids", 2.0, "male", Some(42.0), 0.0, 0.0, Some(13.0), None, Some("S"), 0.0),
    ("Abbing, Mr. Anthony", 3.0, "male", Some(42.0), 0.0, 0.0, Some(7.55), None, Some("S"), 0.0),
    ("Abbott, Mrs. Stanton", 3.0, "female", Some(35.0), 1.0, 1.0, Some(20.25), None, Some("S"), 1.0),
    ("Abbott, Master. Eugene Joseph", 3.0, "male", Some(13.0), 0.0, 2.0, Some(20.25), None, Some("S"), 0.0),
    ("Abelseth, Miss. Karen Marie", 3.0, "female", Some(16.0), 0.0, 0.0, Some(7.65), None, Some("S"), 1.0),
    ("Abrahamsson, Mr. Abraham August", 3.0, "male", None, 0.0, 0.0, Some(7.92), None, Some("S"), 1.0),
    ("Adahl, Mr. Mauritz Nils Martin", 3.0, "male", Some(30.0), 0.0, 0.0, Some(7.25), None, Some("S"), 0.0),
    ("Aks, Mrs. Sam", 3.0, "female", None, 0.0, 1.0, Some(9.35), None, Some("S"), 1.0),
    ("Alexander, Mr. William", 3.0, "male", Some(26.0), 0.0, 0.0, Some(7.88), None, Some("S"), 0.0),
    ("Barry, Miss. Julia", 3.0, "female", None, 0.0, 0.0, Some(7.88), None, Some("Q"), 0.0),
    ("Storey, Mr. Thomas", 3.0, "male", Some(60.5), 0.0, 0.0, None, None, None, 0.0),
];

fn to_dataset(rows: &[Passenger]) -> Result<(Dataset, Vec<f64>), PipelineError> {
    let data = Dataset::new(vec![
        Column::categorical("name", rows.iter().map(|r| Some(r.0)).collect()),
        Column::numeric_dense("pclass", rows.iter().map(|r| r.1).collect()),
        Column::categorical("sex", rows.iter().map(|r| Some(r.2)).collect()),
        Column::numeric("age", rows.iter().map(|r| r.3).collect()),
        Column::numeric_dense("sibsp", rows.iter().map(|r| r.4).collect()),
        Column::numeric_dense("parch", rows.iter().map(|r| r.5).collect()),
        Column::numeric("fare", rows.iter().map(|r| r.6).collect()),
        Column::categorical("cabin", rows.iter().map(|r| r.7).collect()),
        Column::categorical("embarked", rows.iter().map(|r| r.8).collect()),
    ])?;
    let survived = rows.iter().map(|r| r.9).collect();
    Ok((data, survived))
}

fn accuracy(predictions: &[f64], targets: &[f64]) -> f64 {
    let correct = predictions
        .iter()
        .zip(targets)
        .filter(|(p, t)| p == t)
        .count();
    correct as f64 / targets.len() as f64
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    println!("=== Titanic Survival Prediction Pipeline ===\n");

    let (train, survived) = to_dataset(&PASSENGERS)?;
    println!("  {} passengers loaded", train.n_rows());

    let config = PipelineConfig::from_json_str(PIPELINE_JSON)?;
    let pipeline = config.build();
    println!("\nStages: {:?}", pipeline.step_names());

    println!("\nTraining logistic regression model...");
    let model = pipeline
        .with_estimator(
            LogisticRegression::new()
                .with_learning_rate(0.3)
                .with_max_iter(2000)
                .with_l2(0.01),
        )
        .fit(&train, &survived)?;
    println!("  Features: {:?}", model.feature_names());

    let predictions = model.predict(&train)?;
    println!("\nTraining accuracy: {:.1}%", accuracy(&predictions, &survived) * 100.0);

    println!("\n=== Saving Pipeline ===");
    let path = std::env::temp_dir().join("titanic_pipeline.bin");
    model.save_to_file(&path)?;
    let loaded = PredictivePipeline::<FittedLogisticRegression>::load_from_file(&path)?;
    std::fs::remove_file(&path).ok();
    println!("Pipeline reloaded from {:?}", path);

    println!("\n=== Demo: Predict for New Passengers ===");
    // deck "T" never appears in the training cabins
    #[rustfmt::skip]
    let new_passengers: [Passenger; 2] = [
        ("Smith, Mrs. Lucian", 1.0, "female", Some(25.0), 1.0, 0.0, Some(100.0), Some("T12"), Some("S"), 0.0),
        ("Sage, Mr. Frederick", 3.0, "male", Some(30.0), 0.0, 0.0, Some(10.0), None, Some("S"), 0.0),
    ];
    let (batch, _) = to_dataset(&new_passengers)?;

    let report = loaded.preprocessor().drift_report(&batch)?;
    for stage in report.stages() {
        for unseen in &stage.unseen {
            println!(
                "  drift: stage '{}' column '{}' has {} unseen value(s)",
                stage.stage, unseen.column, unseen.count
            );
        }
    }

    let proba = loaded.predict_proba(&batch)?;
    for (passenger, row) in new_passengers.iter().zip(proba.rows()) {
        println!("{:<24} survival probability: {:.1}%", passenger.0, row[1] * 100.0);
    }

    println!("\n=== Pipeline Complete ===");
    Ok(())
}

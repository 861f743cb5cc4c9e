//! End-to-end house-price regression with a column-scoped pipeline.
//!
//! Demonstrates:
//! - elapsed-time features relative to the sale year
//! - missing indicators and median / "Missing" imputation
//! - log transform of skewed areas
//! - quality labels mapped to numbers
//! - rare-label grouping followed by target-ordered ordinal encoding
//! - equal-frequency discretisation and standard scaling
//! - lasso regression on the log sale price
//! - drift report, save and load
//!
//! The data is synthetic but shaped like the Ames housing columns.
//!
//! Run with: cargo run --example house_price_pipeline

use feature_pipe::dataset::{Column, Dataset};
use feature_pipe::model::{FittedLasso, LassoRegression};
use feature_pipe::pipeline::{ColumnScopedPipeline, PredictivePipeline};
use feature_pipe::preprocessing::{
    CategoricalImputer, DropColumns, ElapsedTime, EqualFrequencyDiscretiser, LogTransform,
    MedianImputer, MissingIndicator, OrdinalEncoder, RareLabelEncoder, StandardScaler,
    ValueMapper,
};
use feature_pipe::PipelineError;
use std::error::Error;
use tracing_subscriber::EnvFilter;

const NEIGHBORHOODS: [&str; 6] = ["NAmes", "CollgCr", "OldTown", "Edwards", "Somerst", "Blueste"];
const ZONING: [&str; 3] = ["RL", "RM", "FV"];
const QUALITY: [&str; 5] = ["Po", "Fa", "TA", "Gd", "Ex"];

/// Synthetic houses; `offset` shifts the generator so test rows differ.
fn houses(n: usize, offset: usize) -> Result<(Dataset, Vec<f64>), PipelineError> {
    let mut year_built = Vec::with_capacity(n);
    let mut yr_sold = Vec::with_capacity(n);
    let mut lot_frontage = Vec::with_capacity(n);
    let mut lot_area = Vec::with_capacity(n);
    let mut gr_liv_area = Vec::with_capacity(n);
    let mut bsmt = Vec::with_capacity(n);
    let mut zoning = Vec::with_capacity(n);
    let mut neighborhood = Vec::with_capacity(n);
    let mut exter_qual = Vec::with_capacity(n);
    let mut fireplace_qu = Vec::with_capacity(n);
    let mut log_price = Vec::with_capacity(n);

    for row in 0..n {
        let i = row + offset;
        let built = 1900.0 + ((i * 37) % 108) as f64;
        let sold = 2006.0 + (i % 5) as f64;
        let area = 1000.0 + ((i * 53) % 1800) as f64;
        let lot = 5000.0 + ((i * 91) % 9000) as f64;
        let quality = (i * 7) % 5;
        // the last neighborhood only shows up in the test batch
        let hood = if offset == 0 && i % 40 != 0 {
            i % 5
        } else {
            (i * 3) % 6
        };

        year_built.push(built);
        yr_sold.push(sold);
        lot_frontage.push(if i % 6 == 0 { None } else { Some(50.0 + (i % 40) as f64) });
        lot_area.push(lot);
        gr_liv_area.push(area);
        bsmt.push(((i * 29) % 1500) as f64);
        zoning.push(if i % 9 == 0 { None } else { Some(ZONING[i % 3]) });
        neighborhood.push(Some(NEIGHBORHOODS[hood]));
        exter_qual.push(Some(QUALITY[quality]));
        fireplace_qu.push(if i % 3 == 0 { None } else { Some(QUALITY[(i + 2) % 5]) });

        let price = 11.0
            + 0.0004 * area
            + 0.00002 * lot
            + 0.08 * quality as f64
            - 0.004 * (sold - built)
            + 0.05 * hood as f64;
        log_price.push(price);
    }

    let data = Dataset::new(vec![
        Column::numeric_dense("YearBuilt", year_built),
        Column::numeric_dense("YrSold", yr_sold),
        Column::numeric("LotFrontage", lot_frontage),
        Column::numeric_dense("LotArea", lot_area),
        Column::numeric_dense("GrLivArea", gr_liv_area),
        Column::numeric_dense("TotalBsmtSF", bsmt),
        Column::categorical("MSZoning", zoning),
        Column::categorical("Neighborhood", neighborhood),
        Column::categorical("ExterQual", exter_qual),
        Column::categorical("FireplaceQu", fireplace_qu),
    ])?;
    Ok((data, log_price))
}

fn rmse(predictions: &[f64], targets: &[f64]) -> f64 {
    let sum: f64 = predictions
        .iter()
        .zip(targets)
        .map(|(p, t)| (p - t).powi(2))
        .sum();
    (sum / targets.len() as f64).sqrt()
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    println!("=== House Price Prediction Pipeline ===\n");

    let (train, y_train) = houses(400, 0)?;
    let (test, y_test) = houses(100, 400)?;
    println!(
        "Training data: {} houses, {} columns",
        train.n_rows(),
        train.n_columns()
    );

    let quality_map = [
        ("Missing", 0.0),
        ("Po", 1.0),
        ("Fa", 2.0),
        ("TA", 3.0),
        ("Gd", 4.0),
        ("Ex", 5.0),
    ];

    let pipeline = ColumnScopedPipeline::new()
        .add_stage("elapsed_time", ElapsedTime::new(["YearBuilt"], "YrSold"))
        .add_stage("drop_sale_year", DropColumns::new(["YrSold"]))
        .add_stage("missing_indicator", MissingIndicator::new(["LotFrontage"]))
        .add_stage("median_imputation", MedianImputer::new(["LotFrontage"]))
        .add_stage(
            "categorical_imputation",
            CategoricalImputer::new(["MSZoning", "Neighborhood", "FireplaceQu"]),
        )
        .add_stage("log", LogTransform::new(["LotArea", "GrLivArea"]))
        .add_stage(
            "quality_mapper",
            ValueMapper::new(["ExterQual", "FireplaceQu"], quality_map),
        )
        .add_stage(
            "rare_label_encoder",
            RareLabelEncoder::new(["MSZoning", "Neighborhood"])
                .with_tol(0.01)
                .with_n_categories(4),
        )
        .add_stage(
            "categorical_encoder",
            OrdinalEncoder::new(["MSZoning", "Neighborhood"]),
        )
        .add_stage(
            "discretiser",
            EqualFrequencyDiscretiser::new(["TotalBsmtSF"]).with_q(5),
        )
        .add_stage(
            "scaler",
            StandardScaler::new([
                "YearBuilt",
                "LotFrontage",
                "LotArea",
                "GrLivArea",
                "TotalBsmtSF",
                "MSZoning",
                "Neighborhood",
                "ExterQual",
                "FireplaceQu",
            ]),
        );

    println!("\nStages: {:?}", pipeline.step_names());

    let model = pipeline
        .with_estimator(LassoRegression::new().with_alpha(0.001))
        .fit(&train, &y_train)?;
    println!("Estimator features: {:?}", model.feature_names());
    println!("Lasso coefficients: {:?}", model.model().coef());

    let train_rmse = rmse(&model.predict(&train)?, &y_train);
    let test_rmse = rmse(&model.predict(&test)?, &y_test);
    println!("\nTrain RMSE (log price): {:.4}", train_rmse);
    println!("Test RMSE (log price):  {:.4}", test_rmse);

    println!("\n=== Drift Report (test batch) ===");
    let report = model.preprocessor().drift_report(&test)?;
    if report.is_clean() {
        println!("No unseen values");
    }
    for stage in report.stages() {
        for unseen in &stage.unseen {
            println!(
                "{:<24} {:<14} {} unseen",
                stage.stage, unseen.column, unseen.count
            );
        }
    }

    println!("\n=== Saving Pipeline ===");
    let path = std::env::temp_dir().join("house_price_pipeline.bin");
    model.save_to_file(&path)?;
    println!("Pipeline saved to: {:?}", path);

    let loaded = PredictivePipeline::<FittedLasso>::load_from_file(&path)?;
    let reloaded_rmse = rmse(&loaded.predict(&test)?, &y_test);
    println!("Reloaded test RMSE:     {:.4}", reloaded_rmse);
    std::fs::remove_file(&path).ok();

    println!("\n=== Pipeline Complete ===");
    Ok(())
}

//! Linear reference estimators.
//!
//! - [`LassoRegression`]: L1-penalised least squares by cyclic coordinate
//!   descent, minimising `1/(2n) * ||y - Xw - b||^2 + alpha * ||w||_1`. The
//!   intercept is not penalised.
//! - [`LogisticRegression`]: binary classifier trained by full-batch gradient
//!   descent on the mean log-loss with an optional L2 penalty.
//!
//! Both fitted models serialize to plain vectors and reject inputs whose
//! width differs from the fit matrix.

use crate::error::{PipelineError, Result};
use crate::model::{Estimator, Predictor, ProbabilisticClassifier};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

const STAGE: &str = "estimator";

fn check_training_input(x: &Array2<f64>, y: &[f64]) -> Result<()> {
    if x.nrows() == 0 {
        return Err(PipelineError::EmptyData(
            "cannot fit an estimator on zero rows".to_string(),
        ));
    }
    if x.nrows() != y.len() {
        return Err(PipelineError::configuration(
            STAGE,
            format!("{} rows but {} labels", x.nrows(), y.len()),
        ));
    }
    Ok(())
}

fn check_width(expected: usize, x: &Array2<f64>) -> Result<()> {
    if x.ncols() != expected {
        return Err(PipelineError::FeatureMismatch {
            expected,
            got: x.ncols(),
        });
    }
    Ok(())
}

fn linear_predictor(x: &Array2<f64>, coef: &[f64], intercept: f64) -> Array1<f64> {
    x.dot(&ArrayView1::from(coef)) + intercept
}

fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Lasso regression (unfitted).
///
/// # Example
/// ```rust
/// use feature_pipe::model::{Estimator, LassoRegression, Predictor};
/// use ndarray::array;
///
/// let x = array![[1.0], [2.0], [3.0], [4.0]];
/// let y = [3.0, 5.0, 7.0, 9.0];
/// let fitted = LassoRegression::new().with_alpha(0.0).fit(&x, &y)?;
/// let pred = fitted.predict(&array![[5.0]])?;
/// assert!((pred[0] - 11.0).abs() < 1e-3);
/// # Ok::<(), feature_pipe::PipelineError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LassoRegression {
    /// L1 penalty strength.
    pub alpha: f64,
    /// Maximum number of full coordinate sweeps.
    pub max_iter: usize,
    /// Stop once no coefficient moves by more than this in a sweep.
    pub tol: f64,
}

impl Default for LassoRegression {
    fn default() -> Self {
        Self {
            alpha: 0.005,
            max_iter: 1000,
            tol: 1e-6,
        }
    }
}

impl LassoRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }
}

/// Fitted lasso model: `y = x . coef + intercept`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedLasso {
    coef: Vec<f64>,
    intercept: f64,
}

impl FittedLasso {
    /// Build a fitted model from known parameters.
    pub fn new(coef: Vec<f64>, intercept: f64) -> Self {
        Self { coef, intercept }
    }

    pub fn coef(&self) -> &[f64] {
        &self.coef
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Estimator for LassoRegression {
    type Fitted = FittedLasso;

    fn fit(&self, x: &Array2<f64>, y: &[f64]) -> Result<FittedLasso> {
        if self.alpha.is_nan() || self.alpha < 0.0 {
            return Err(PipelineError::InvalidParameter(format!(
                "alpha must be non-negative, got {}",
                self.alpha
            )));
        }
        check_training_input(x, y)?;

        let n = x.nrows() as f64;
        let n_features = x.ncols();
        let x_mean = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(n_features));
        let y_mean = y.iter().sum::<f64>() / n;

        let xc = x - &x_mean;
        let mut residual: Array1<f64> = y.iter().map(|v| v - y_mean).collect();
        let col_norm: Vec<f64> = xc
            .columns()
            .into_iter()
            .map(|c| c.dot(&c) / n)
            .collect();

        let mut coef = vec![0.0; n_features];
        let mut sweeps = 0;
        for _ in 0..self.max_iter {
            sweeps += 1;
            let mut max_delta = 0.0_f64;
            for j in 0..n_features {
                if col_norm[j] == 0.0 {
                    continue;
                }
                let column = xc.column(j);
                let rho = column.dot(&residual) / n + col_norm[j] * coef[j];
                let updated = soft_threshold(rho, self.alpha) / col_norm[j];
                let delta = updated - coef[j];
                if delta != 0.0 {
                    residual.scaled_add(-delta, &column);
                    coef[j] = updated;
                }
                max_delta = max_delta.max(delta.abs());
            }
            if max_delta <= self.tol {
                break;
            }
        }

        let intercept = y_mean - x_mean.dot(&ArrayView1::from(&coef[..]));
        tracing::debug!(
            sweeps,
            n_features,
            non_zero = coef.iter().filter(|c| **c != 0.0).count(),
            "lasso fitted"
        );
        Ok(FittedLasso { coef, intercept })
    }
}

impl Predictor for FittedLasso {
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        check_width(self.coef.len(), x)?;
        Ok(linear_predictor(x, &self.coef, self.intercept).to_vec())
    }

    fn n_features_in(&self) -> usize {
        self.coef.len()
    }
}

/// Binary logistic regression (unfitted). Labels must be `0` or `1`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub learning_rate: f64,
    pub max_iter: usize,
    /// L2 penalty on the weights (not the intercept).
    pub l2: f64,
    /// Probability at or above which `predict` returns class `1`.
    pub threshold: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_iter: 1000,
            l2: 0.0,
            threshold: 0.5,
        }
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_l2(mut self, l2: f64) -> Self {
        self.l2 = l2;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}

/// Fitted logistic regression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedLogisticRegression {
    coef: Vec<f64>,
    intercept: f64,
    threshold: f64,
}

impl FittedLogisticRegression {
    pub fn coef(&self) -> &[f64] {
        &self.coef
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Probability of class `1` for each row.
    fn positive_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        check_width(self.coef.len(), x)?;
        Ok(linear_predictor(x, &self.coef, self.intercept).mapv(sigmoid))
    }
}

impl Estimator for LogisticRegression {
    type Fitted = FittedLogisticRegression;

    fn fit(&self, x: &Array2<f64>, y: &[f64]) -> Result<FittedLogisticRegression> {
        if self.learning_rate.is_nan() || self.learning_rate <= 0.0 {
            return Err(PipelineError::InvalidParameter(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(PipelineError::InvalidParameter(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        check_training_input(x, y)?;
        if let Some(bad) = y.iter().find(|v| **v != 0.0 && **v != 1.0) {
            return Err(PipelineError::InvalidParameter(format!(
                "classification labels must be 0 or 1, got {}",
                bad
            )));
        }

        let n = x.nrows() as f64;
        let labels = ArrayView1::from(y);
        let mut w = Array1::<f64>::zeros(x.ncols());
        let mut b = 0.0;
        for _ in 0..self.max_iter {
            let p = (x.dot(&w) + b).mapv(sigmoid);
            let err = &p - &labels;
            let grad_w = x.t().dot(&err) / n + &w * self.l2;
            let grad_b = err.sum() / n;
            w.scaled_add(-self.learning_rate, &grad_w);
            b -= self.learning_rate * grad_b;
        }

        tracing::debug!(
            iterations = self.max_iter,
            n_features = x.ncols(),
            "logistic regression fitted"
        );
        Ok(FittedLogisticRegression {
            coef: w.to_vec(),
            intercept: b,
            threshold: self.threshold,
        })
    }
}

impl Predictor for FittedLogisticRegression {
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        let proba = self.positive_proba(x)?;
        Ok(proba
            .iter()
            .map(|p| if *p >= self.threshold { 1.0 } else { 0.0 })
            .collect())
    }

    fn n_features_in(&self) -> usize {
        self.coef.len()
    }
}

impl ProbabilisticClassifier for FittedLogisticRegression {
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let positive = self.positive_proba(x)?;
        let mut out = Array2::<f64>::zeros((positive.len(), 2));
        for (i, p) in positive.iter().enumerate() {
            out[[i, 0]] = 1.0 - p;
            out[[i, 1]] = *p;
        }
        Ok(out)
    }
}

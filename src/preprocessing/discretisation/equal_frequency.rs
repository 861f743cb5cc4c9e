//! Equal-frequency (quantile) discretisation.
//!
//! Fit sorts each training column and places `q - 1` interior edges at the
//! rank quantiles `sorted[floor(i * n / q)]`, so every bin holds `n / q` rows
//! (give or take one) when values are distinct. Duplicate edges, which come
//! from heavy ties, are dropped and the column ends up with fewer bins.
//!
//! Transform replaces each value with its bin index, the number of interior
//! edges `<= x`. Values below the training minimum land in the first bin and
//! values above the training maximum in the last one; both are counted as
//! out-of-range by [`FittedTransformer::unseen`].

use crate::dataset::{Column, ColumnKind, Dataset};
use crate::error::{PipelineError, Result};
use crate::preprocessing::traits::{
    column_list, ensure_rows, log_unseen, FittedTransformer, Transformer, UnseenValues,
};
use serde::{Deserialize, Serialize};

const KIND: &str = "equal_frequency_discretiser";

/// Equal-frequency discretiser (unfitted).
///
/// # Example
/// ```rust
/// use feature_pipe::dataset::{Column, Dataset};
/// use feature_pipe::preprocessing::{EqualFrequencyDiscretiser, FittedTransformer, Transformer};
///
/// let train = Dataset::new(vec![Column::numeric_dense(
///     "Fare",
///     (0..8).map(f64::from).collect(),
/// )])?;
/// let fitted = EqualFrequencyDiscretiser::new(["Fare"]).with_q(4).fit(&train, None)?;
/// assert_eq!(fitted.edges("Fare").unwrap(), &[2.0, 4.0, 6.0]);
/// # Ok::<(), feature_pipe::PipelineError>(())
/// ```
#[derive(Clone, Debug)]
pub struct EqualFrequencyDiscretiser {
    columns: Vec<String>,
    q: usize,
}

impl EqualFrequencyDiscretiser {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: column_list(columns),
            q: 10,
        }
    }

    /// Number of quantile bins (at least 2).
    pub fn with_q(mut self, q: usize) -> Self {
        self.q = q;
        self
    }
}

/// Serializable parameters for a fitted EqualFrequencyDiscretiser.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EqualFrequencyDiscretiserParams {
    pub q: usize,
    pub columns: Vec<String>,
    /// Interior edges per column, strictly increasing.
    pub edges: Vec<Vec<f64>>,
    /// Training (min, max) per column.
    pub bounds: Vec<(f64, f64)>,
}

/// Fitted EqualFrequencyDiscretiser.
#[derive(Clone, Debug)]
pub struct FittedEqualFrequencyDiscretiser {
    params: EqualFrequencyDiscretiserParams,
}

impl FittedEqualFrequencyDiscretiser {
    fn position(&self, column: &str) -> Option<usize> {
        self.params.columns.iter().position(|c| c == column)
    }

    /// Interior bin edges of a column.
    pub fn edges(&self, column: &str) -> Option<&[f64]> {
        self.position(column).map(|i| self.params.edges[i].as_slice())
    }

    /// Number of bins of a column.
    pub fn n_bins(&self, column: &str) -> Option<usize> {
        self.edges(column).map(|e| e.len() + 1)
    }

    /// Training (min, max) of a column.
    pub fn bounds(&self, column: &str) -> Option<(f64, f64)> {
        self.position(column).map(|i| self.params.bounds[i])
    }
}

fn quantile_edges(sorted: &[f64], q: usize) -> Vec<f64> {
    let n = sorted.len();
    let min = sorted[0];
    let mut edges: Vec<f64> = Vec::with_capacity(q - 1);
    for i in 1..q {
        let edge = sorted[(i * n / q).min(n - 1)];
        // An edge at the minimum would leave the first bin empty
        if edge > min && edges.last().map_or(true, |&last| edge > last) {
            edges.push(edge);
        }
    }
    edges
}

fn bin_index(edges: &[f64], x: f64) -> usize {
    edges.partition_point(|&e| e <= x)
}

impl Transformer for EqualFrequencyDiscretiser {
    type Params = EqualFrequencyDiscretiserParams;
    type Fitted = FittedEqualFrequencyDiscretiser;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn fit(&self, data: &Dataset, _target: Option<&[f64]>) -> Result<Self::Fitted> {
        if self.q < 2 {
            return Err(PipelineError::InvalidParameter(format!(
                "q must be at least 2, got {}",
                self.q
            )));
        }
        ensure_rows(KIND, data)?;
        let mut edges = Vec::with_capacity(self.columns.len());
        let mut bounds = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            let col = data.require_complete(KIND, name, Some(ColumnKind::Numeric))?;
            let mut sorted: Vec<f64> = col
                .as_numeric()
                .unwrap_or(&[])
                .iter()
                .flatten()
                .copied()
                .collect();
            sorted.sort_by(|a, b| a.total_cmp(b));
            let column_edges = quantile_edges(&sorted, self.q);
            if column_edges.len() + 1 < self.q {
                tracing::debug!(
                    stage = KIND,
                    column = %name,
                    bins = column_edges.len() + 1,
                    q = self.q,
                    "duplicate quantiles dropped"
                );
            }
            bounds.push((sorted[0], sorted[sorted.len() - 1]));
            edges.push(column_edges);
        }
        Ok(FittedEqualFrequencyDiscretiser {
            params: EqualFrequencyDiscretiserParams {
                q: self.q,
                columns: self.columns.clone(),
                edges,
                bounds,
            },
        })
    }
}

impl FittedTransformer for FittedEqualFrequencyDiscretiser {
    type Params = EqualFrequencyDiscretiserParams;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.params.columns
    }

    fn transform(&self, data: &Dataset) -> Result<Dataset> {
        let mut replaced = Vec::with_capacity(self.params.columns.len());
        for (name, edges) in self.params.columns.iter().zip(&self.params.edges) {
            let col = data.require(KIND, name, Some(ColumnKind::Numeric))?;
            let values = col
                .as_numeric()
                .unwrap_or(&[])
                .iter()
                .map(|v| v.map(|x| bin_index(edges, x) as f64))
                .collect();
            replaced.push(Column::numeric(name.as_str(), values));
        }
        log_unseen(KIND, &self.unseen(data));
        data.with_replaced(replaced)
    }

    /// Counts values outside the training `[min, max]`.
    fn unseen(&self, data: &Dataset) -> Vec<UnseenValues> {
        self.params
            .columns
            .iter()
            .zip(&self.params.bounds)
            .filter_map(|(name, &(lo, hi))| {
                let values = data.column(name)?.as_numeric()?;
                let count = values
                    .iter()
                    .flatten()
                    .filter(|&&x| x < lo || x > hi)
                    .count();
                Some(UnseenValues {
                    column: name.clone(),
                    count,
                })
            })
            .collect()
    }

    fn extract_params(&self) -> Self::Params {
        self.params.clone()
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        let n = params.columns.len();
        if params.edges.len() != n || params.bounds.len() != n {
            return Err(PipelineError::Serialization(format!(
                "bin edges do not match {} columns",
                n
            )));
        }
        Ok(Self { params })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn ramp(n: usize) -> Dataset {
        Dataset::new(vec![Column::numeric_dense(
            "LotArea",
            (0..n).map(|i| (i * 7 % n) as f64 * 1.5).collect(),
        )])
        .unwrap()
    }

    fn bins(data: &Dataset) -> Vec<f64> {
        data.column("LotArea")
            .unwrap()
            .as_numeric()
            .unwrap()
            .iter()
            .flatten()
            .copied()
            .collect()
    }

    #[test]
    fn test_bin_counts_differ_by_at_most_one() {
        for (n, q) in [(100, 10), (101, 10), (37, 4), (10, 3), (5, 5)] {
            let data = ramp(n);
            let fitted = EqualFrequencyDiscretiser::new(["LotArea"])
                .with_q(q)
                .fit(&data, None)
                .unwrap();
            assert_eq!(fitted.n_bins("LotArea"), Some(q), "n={} q={}", n, q);
            let mut counts: BTreeMap<u64, usize> = BTreeMap::new();
            for b in bins(&fitted.transform(&data).unwrap()) {
                *counts.entry(b as u64).or_default() += 1;
            }
            assert_eq!(counts.len(), q);
            let max = counts.values().max().unwrap();
            let min = counts.values().min().unwrap();
            assert!(max - min <= 1, "n={} q={} counts={:?}", n, q, counts);
        }
    }

    #[test]
    fn test_out_of_range_clamps_and_is_counted() {
        let data = Dataset::new(vec![Column::numeric_dense(
            "LotArea",
            (0..8).map(f64::from).collect(),
        )])
        .unwrap();
        let fitted = EqualFrequencyDiscretiser::new(["LotArea"])
            .with_q(4)
            .fit(&data, None)
            .unwrap();
        let test = Dataset::new(vec![Column::numeric(
            "LotArea",
            vec![Some(-100.0), Some(3.0), Some(1e9), None],
        )])
        .unwrap();
        let out = fitted.transform(&test).unwrap();
        assert_eq!(
            out.column("LotArea").unwrap().as_numeric().unwrap(),
            &[Some(0.0), Some(1.0), Some(3.0), None]
        );
        assert_eq!(fitted.unseen(&test)[0].count, 2);
    }

    #[test]
    fn test_heavy_ties_drop_duplicate_edges() {
        let mut values = vec![0.0; 8];
        values.extend([1.0, 2.0]);
        let data = Dataset::new(vec![Column::numeric_dense("LotArea", values)]).unwrap();
        let fitted = EqualFrequencyDiscretiser::new(["LotArea"])
            .with_q(5)
            .fit(&data, None)
            .unwrap();
        let edges = fitted.edges("LotArea").unwrap();
        assert!(edges.windows(2).all(|w| w[0] < w[1]));
        assert!(edges.iter().all(|&e| e > 0.0));
        assert!(fitted.n_bins("LotArea").unwrap() < 5);
    }

    #[test]
    fn test_q_below_two_rejected() {
        let result = EqualFrequencyDiscretiser::new(["LotArea"])
            .with_q(1)
            .fit(&ramp(10), None);
        assert!(matches!(result, Err(PipelineError::InvalidParameter(_))));
    }

    #[test]
    fn test_transform_twice_and_reload() {
        let data = ramp(50);
        let fitted = EqualFrequencyDiscretiser::new(["LotArea"])
            .with_q(5)
            .fit(&data, None)
            .unwrap();
        let a = fitted.transform(&data).unwrap();
        assert_eq!(a, fitted.transform(&data).unwrap());
        let restored =
            FittedEqualFrequencyDiscretiser::from_params(fitted.extract_params()).unwrap();
        assert_eq!(restored.transform(&data).unwrap(), a);
    }
}

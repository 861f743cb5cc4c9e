//! Fixed category-to-number mapping.
//!
//! Used for ordered quality scales such as `Po < Fa < TA < Gd < Ex`, where the
//! ranks are domain knowledge rather than something to learn. All target
//! columns share the same mapping. Values outside the mapping, and absent
//! cells, become `default` (0.0 unless configured).

use crate::dataset::{Column, ColumnKind, Dataset};
use crate::error::{PipelineError, Result};
use crate::preprocessing::traits::{
    column_list, ensure_rows, log_unseen, FittedTransformer, Transformer, UnseenValues,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const KIND: &str = "value_mapper";

/// Categorical to numeric mapper (unfitted).
#[derive(Clone, Debug)]
pub struct ValueMapper {
    columns: Vec<String>,
    mapping: Vec<(String, f64)>,
    default: f64,
}

impl ValueMapper {
    pub fn new<I, S, M, K>(columns: I, mapping: M) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        M: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            columns: column_list(columns),
            mapping: mapping.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            default: 0.0,
        }
    }

    /// Value for categories outside the mapping.
    pub fn with_default(mut self, default: f64) -> Self {
        self.default = default;
        self
    }
}

/// Serializable parameters for a fitted ValueMapper.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValueMapperParams {
    pub columns: Vec<String>,
    pub mapping: Vec<(String, f64)>,
    pub default: f64,
}

/// Fitted ValueMapper.
#[derive(Clone, Debug)]
pub struct FittedValueMapper {
    params: ValueMapperParams,
    lookup: HashMap<String, f64>,
}

impl FittedValueMapper {
    fn build(params: ValueMapperParams) -> Self {
        let lookup = params.mapping.iter().cloned().collect();
        Self { params, lookup }
    }

    pub fn mapping(&self) -> &HashMap<String, f64> {
        &self.lookup
    }

    pub fn default_value(&self) -> f64 {
        self.params.default
    }
}

impl Transformer for ValueMapper {
    type Params = ValueMapperParams;
    type Fitted = FittedValueMapper;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn fit(&self, data: &Dataset, _target: Option<&[f64]>) -> Result<Self::Fitted> {
        if self.mapping.is_empty() {
            return Err(PipelineError::InvalidParameter(
                "value mapping is empty".to_string(),
            ));
        }
        if self.mapping.iter().any(|(_, v)| !v.is_finite()) || !self.default.is_finite() {
            return Err(PipelineError::InvalidParameter(
                "mapped values must be finite".to_string(),
            ));
        }
        ensure_rows(KIND, data)?;
        for name in &self.columns {
            data.require_complete(KIND, name, Some(ColumnKind::Categorical))?;
        }
        Ok(FittedValueMapper::build(ValueMapperParams {
            columns: self.columns.clone(),
            mapping: self.mapping.clone(),
            default: self.default,
        }))
    }
}

impl FittedTransformer for FittedValueMapper {
    type Params = ValueMapperParams;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn columns(&self) -> &[String] {
        &self.params.columns
    }

    fn transform(&self, data: &Dataset) -> Result<Dataset> {
        let mut replaced = Vec::with_capacity(self.params.columns.len());
        for name in &self.params.columns {
            let col = data.require(KIND, name, Some(ColumnKind::Categorical))?;
            let values = col
                .as_categorical()
                .unwrap_or(&[])
                .iter()
                .map(|v| {
                    Some(
                        v.as_ref()
                            .and_then(|c| self.lookup.get(c))
                            .copied()
                            .unwrap_or(self.params.default),
                    )
                })
                .collect();
            replaced.push(Column::numeric(name.as_str(), values));
        }
        log_unseen(KIND, &self.unseen(data));
        data.with_replaced(replaced)
    }

    fn unseen(&self, data: &Dataset) -> Vec<UnseenValues> {
        self.params
            .columns
            .iter()
            .filter_map(|name| {
                let values = data.column(name)?.as_categorical()?;
                let count = values
                    .iter()
                    .flatten()
                    .filter(|v| !self.lookup.contains_key(v.as_str()))
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
        Ok(Self::build(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUALITY: [(&str, f64); 6] = [
        ("Missing", 0.0),
        ("Po", 1.0),
        ("Fa", 2.0),
        ("TA", 3.0),
        ("Gd", 4.0),
        ("Ex", 5.0),
    ];

    fn data() -> Dataset {
        Dataset::new(vec![
            Column::categorical("ExterQual", vec![Some("TA"), Some("Gd"), Some("Ex")]),
            Column::categorical("KitchenQual", vec![Some("Fa"), Some("Missing"), Some("TA")]),
        ])
        .unwrap()
    }

    #[test]
    fn test_maps_all_columns() {
        let fitted = ValueMapper::new(["ExterQual", "KitchenQual"], QUALITY)
            .fit(&data(), None)
            .unwrap();
        let out = fitted.transform(&data()).unwrap();
        assert_eq!(
            out.column("ExterQual").unwrap().as_numeric().unwrap(),
            &[Some(3.0), Some(4.0), Some(5.0)]
        );
        assert_eq!(
            out.column("KitchenQual").unwrap().as_numeric().unwrap(),
            &[Some(2.0), Some(0.0), Some(3.0)]
        );
    }

    #[test]
    fn test_unmapped_uses_default_and_is_counted() {
        let fitted = ValueMapper::new(["ExterQual"], QUALITY)
            .with_default(-1.0)
            .fit(&data(), None)
            .unwrap();
        let test = Dataset::new(vec![Column::categorical(
            "ExterQual",
            vec![Some("Excellent"), Some("Gd")],
        )])
        .unwrap();
        let out = fitted.transform(&test).unwrap();
        assert_eq!(
            out.column("ExterQual").unwrap().as_numeric().unwrap(),
            &[Some(-1.0), Some(4.0)]
        );
        assert_eq!(fitted.unseen(&test)[0].count, 1);
    }

    #[test]
    fn test_empty_mapping_rejected() {
        let empty: Vec<(String, f64)> = Vec::new();
        let result = ValueMapper::new(["ExterQual"], empty).fit(&data(), None);
        assert!(matches!(result, Err(PipelineError::InvalidParameter(_))));
    }

    #[test]
    fn test_transform_twice_identical() {
        let fitted = ValueMapper::new(["ExterQual"], QUALITY)
            .fit(&data(), None)
            .unwrap();
        assert_eq!(
            fitted.transform(&data()).unwrap(),
            fitted.transform(&data()).unwrap()
        );
    }
}

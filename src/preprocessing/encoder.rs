//! Feature and label encoding for tabular frames

use crate::autopipeline::ValueKind;
use crate::error::{MivError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Encoded value for missing or unseen categories
pub const UNKNOWN_CATEGORY: f64 = -1.0;

/// How one feature column becomes a numeric column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ColumnEncoding {
    /// Cast to f64, nulls replaced by the training mean
    Numeric { fill: f64 },
    /// Category index in order of first appearance
    Ordinal { mapping: HashMap<String, usize> },
}

/// A fitted feature column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodedColumn {
    pub name: String,
    pub encoding: ColumnEncoding,
}

/// Turns every non-target column into a dense f64 matrix
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureEncoder {
    columns: Vec<EncodedColumn>,
}

impl FeatureEncoder {
    /// Fit on every column of `df` except `target`
    pub fn fit(df: &DataFrame, target: &str) -> Result<Self> {
        let mut columns = Vec::new();

        for column in df.get_columns() {
            if column.name().as_str() == target {
                continue;
            }
            let series = column.as_materialized_series();

            let encoding = match ValueKind::of(series.dtype()) {
                ValueKind::Numeric => {
                    let values = series.cast(&DataType::Float64)?;
                    let fill = values.f64()?.mean().unwrap_or(0.0);
                    ColumnEncoding::Numeric { fill }
                }
                ValueKind::Text | ValueKind::Other => ColumnEncoding::Ordinal {
                    mapping: build_mapping(series)?,
                },
            };

            columns.push(EncodedColumn {
                name: column.name().to_string(),
                encoding,
            });
        }

        Ok(Self { columns })
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    /// Encode `df` into a row-major matrix using the fitted columns
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let n_rows = df.height();

        let col_data: Vec<Vec<f64>> = self
            .columns
            .iter()
            .map(|encoded| {
                let series = df
                    .column(&encoded.name)
                    .map_err(|_| MivError::ColumnNotFound(encoded.name.clone()))?
                    .as_materialized_series();
                encode_series(series, &encoded.encoding)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Array2::from_shape_fn((n_rows, col_data.len()), |(r, c)| col_data[c][r]))
    }
}

fn build_mapping(series: &Series) -> Result<HashMap<String, usize>> {
    let as_text = series.cast(&DataType::String)?;
    let mut mapping = HashMap::new();
    for val in as_text.str()?.into_iter().flatten() {
        let next = mapping.len();
        mapping.entry(val.to_string()).or_insert(next);
    }
    Ok(mapping)
}

fn encode_series(series: &Series, encoding: &ColumnEncoding) -> Result<Vec<f64>> {
    match encoding {
        ColumnEncoding::Numeric { fill } => {
            let values = series.cast(&DataType::Float64)?;
            Ok(values
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| x.is_finite()).unwrap_or(*fill))
                .collect())
        }
        ColumnEncoding::Ordinal { mapping } => {
            let as_text = series.cast(&DataType::String)?;
            Ok(as_text
                .str()?
                .into_iter()
                .map(|v| {
                    v.and_then(|s| mapping.get(s))
                        .map(|&idx| idx as f64)
                        .unwrap_or(UNKNOWN_CATEGORY)
                })
                .collect())
        }
    }
}

/// Maps class labels to `0..n_classes` and back
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit on the string form of a target column; nulls must be dropped first
    pub fn fit(series: &Series) -> Result<Self> {
        let as_text = series.cast(&DataType::String)?;
        let mut classes: Vec<String> = as_text
            .str()?
            .into_iter()
            .flatten()
            .map(|s| s.to_string())
            .collect();
        classes.sort();
        classes.dedup();

        if classes.is_empty() {
            return Err(MivError::ValidationError(
                "target column has no labelled rows".to_string(),
            ));
        }

        Ok(Self { classes })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn transform(&self, series: &Series) -> Result<Array1<f64>> {
        let as_text = series.cast(&DataType::String)?;
        as_text
            .str()?
            .into_iter()
            .map(|v| {
                let label = v.ok_or_else(|| {
                    MivError::ValidationError("null label in target".to_string())
                })?;
                self.classes
                    .binary_search_by(|c| c.as_str().cmp(label))
                    .map(|idx| idx as f64)
                    .map_err(|_| MivError::ValidationError(format!("unseen label '{}'", label)))
            })
            .collect()
    }

    pub fn inverse(&self, code: f64) -> &str {
        let idx = (code.round().max(0.0) as usize).min(self.classes.len().saturating_sub(1));
        self.classes.get(idx).map(|s| s.as_str()).unwrap_or_default()
    }
}

/// Cast a regression target to f64 values
pub fn numeric_target(series: &Series) -> Result<Array1<f64>> {
    let values = series.cast(&DataType::Float64)?;
    values
        .f64()?
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| MivError::ValidationError("null value in target".to_string()))
        })
        .collect()
}

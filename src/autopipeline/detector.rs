//! Problem type detection from the target column

use crate::error::{MivError, Result};
use crate::training::TaskKind;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric targets with at most this many distinct values are treated as classes
pub const CLASSIFICATION_CARDINALITY_THRESHOLD: usize = 12;

/// Learning task implied by a target column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProblemType {
    Classification,
    Regression,
    Unknown,
}

impl fmt::Display for ProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProblemType::Classification => "Classification",
            ProblemType::Regression => "Regression",
            ProblemType::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

impl ProblemType {
    /// Search task for this problem type; `None` for `Unknown`
    pub fn task(&self) -> Option<TaskKind> {
        match self {
            ProblemType::Classification => Some(TaskKind::Classification),
            ProblemType::Regression => Some(TaskKind::Regression),
            ProblemType::Unknown => None,
        }
    }
}

impl From<TaskKind> for ProblemType {
    fn from(task: TaskKind) -> Self {
        match task {
            TaskKind::Classification => ProblemType::Classification,
            TaskKind::Regression => ProblemType::Regression,
        }
    }
}

/// Storage class of a column as far as detection is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    Text,
    Numeric,
    Other,
}

impl ValueKind {
    pub fn of(dtype: &DataType) -> Self {
        if matches!(dtype, DataType::String) || dtype.is_categorical() || dtype.is_enum() {
            ValueKind::Text
        } else if dtype.is_integer() || dtype.is_float() || matches!(dtype, DataType::Boolean) {
            ValueKind::Numeric
        } else {
            ValueKind::Other
        }
    }
}

/// What the detector saw in the target column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetProfile {
    pub name: String,
    pub kind: ValueKind,
    /// Distinct non-null values
    pub n_unique: usize,
    pub n_missing: usize,
}

/// Classifies a target column as classification or regression
#[derive(Debug, Clone)]
pub struct ProblemTypeDetector {
    max_class_cardinality: usize,
}

impl Default for ProblemTypeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProblemTypeDetector {
    pub fn new() -> Self {
        Self {
            max_class_cardinality: CLASSIFICATION_CARDINALITY_THRESHOLD,
        }
    }

    /// Inspect the target column without deciding anything
    pub fn profile(&self, df: &DataFrame, target: &str) -> Result<TargetProfile> {
        let column = df
            .column(target)
            .map_err(|_| MivError::ColumnNotFound(target.to_string()))?;
        let series = column.as_materialized_series();

        Ok(TargetProfile {
            name: target.to_string(),
            kind: ValueKind::of(series.dtype()),
            n_unique: series.drop_nulls().n_unique()?,
            n_missing: series.null_count(),
        })
    }

    /// Decide the problem type.
    ///
    /// Text targets are always classification. Numeric targets are
    /// classification when they hold at most 12 distinct values (inclusive),
    /// regression otherwise. Anything else is unknown.
    pub fn infer(&self, df: &DataFrame, target: &str) -> Result<ProblemType> {
        let profile = self.profile(df, target)?;
        Ok(self.decide(&profile))
    }

    pub fn decide(&self, profile: &TargetProfile) -> ProblemType {
        match profile.kind {
            ValueKind::Text => ProblemType::Classification,
            ValueKind::Numeric if profile.n_unique <= self.max_class_cardinality => {
                ProblemType::Classification
            }
            ValueKind::Numeric => ProblemType::Regression,
            ValueKind::Other => ProblemType::Unknown,
        }
    }
}

//! Data preprocessing module
//!
//! Turns a parsed frame into model-ready arrays:
//! - Ordinal encoding of text and categorical features
//! - Mean imputation of missing numeric values
//! - Label encoding of classification targets
//! - Z-score scaling for estimators that need it

mod encoder;
mod scaler;

pub use encoder::{
    numeric_target, ColumnEncoding, EncodedColumn, FeatureEncoder, LabelEncoder, UNKNOWN_CATEGORY,
};
pub use scaler::StandardScaler;

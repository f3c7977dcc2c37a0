//! Data ingestion utilities

pub mod data_loader;
pub mod separator;

pub use data_loader::{Dataset, DatasetLoader, Upload, ALLOWED_EXTENSIONS};
pub use separator::{detect_separator, Separator, LOOKAHEAD_ROWS};

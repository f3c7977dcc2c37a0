//! Dataset loading from uploaded bytes

use crate::error::{MivError, Result};
use super::separator::{detect_separator, parse_table, Separator};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// File extensions accepted by the upload widget
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["csv", "data"];

/// A user-supplied file: its name and raw content
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read an upload from disk, keeping only the file name
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(Self { name, bytes })
    }

    /// Lower-cased extension of the file name, if any
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }

    /// Reject names outside [`ALLOWED_EXTENSIONS`]
    pub fn check_extension(&self) -> Result<()> {
        let ext = self.extension().unwrap_or_default();
        if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            Ok(())
        } else {
            Err(MivError::UnsupportedExtension {
                found: ext,
                expected: ALLOWED_EXTENSIONS.join(", "),
            })
        }
    }
}

/// A parsed table plus how it was parsed
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    separator: Separator,
    has_header: bool,
}

impl Dataset {
    pub fn new(frame: DataFrame, separator: Separator, has_header: bool) -> Self {
        Self {
            frame,
            separator,
            has_header,
        }
    }

    /// Wrap an in-memory frame (comma separated, with header)
    pub fn from_frame(frame: DataFrame) -> Self {
        Self::new(frame, Separator::Comma, true)
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn separator(&self) -> Separator {
        self.separator
    }

    pub fn has_header(&self) -> bool {
        self.has_header
    }

    pub fn n_rows(&self) -> usize {
        self.frame.height()
    }

    pub fn n_cols(&self) -> usize {
        self.frame.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    /// First column name, used as the default target
    pub fn first_column(&self) -> Option<String> {
        self.frame
            .get_column_names()
            .first()
            .map(|s| s.to_string())
    }

    /// Leading rows shown right after a successful load
    pub fn preview(&self, n_rows: usize) -> DataFrame {
        self.frame.head(Some(n_rows))
    }
}

/// Parses uploaded bytes into a [`Dataset`]
#[derive(Debug, Clone, Default)]
pub struct DatasetLoader;

impl DatasetLoader {
    pub fn new() -> Self {
        Self
    }

    /// Detect the delimiter, then parse the whole content with it.
    ///
    /// Any parse error is reported as [`MivError::ParseFailure`].
    pub fn load(&self, bytes: &[u8], has_header: bool) -> Result<Dataset> {
        let start = Instant::now();
        let mut stream = Cursor::new(bytes);
        let separator = detect_separator(&mut stream, has_header);

        let frame = parse_table(stream.get_ref(), separator, has_header, None)
            .map_err(|e| MivError::ParseFailure(e.to_string()))?;

        if frame.width() == 0 {
            return Err(MivError::ParseFailure("no columns found".to_string()));
        }

        info!(
            separator = %separator,
            rows = frame.height(),
            cols = frame.width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "dataset parsed"
        );

        Ok(Dataset::new(frame, separator, has_header))
    }

    /// Check the extension, then [`load`](Self::load) the content
    pub fn load_upload(&self, upload: &Upload, has_header: bool) -> Result<Dataset> {
        upload.check_extension()?;
        self.load(&upload.bytes, has_header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_semicolon_with_header() {
        let loader = DatasetLoader::new();
        let ds = loader.load(b"a;b;c\n1;2;3\n4;5;6\n7;8;9\n", true).unwrap();

        assert_eq!(ds.separator(), Separator::Semicolon);
        assert_eq!(ds.n_rows(), 3);
        assert_eq!(ds.n_cols(), 3);
        assert_eq!(ds.column_names(), vec!["a", "b", "c"]);
        assert_eq!(ds.first_column().as_deref(), Some("a"));
    }

    #[test]
    fn test_load_without_header_keeps_first_row() {
        let loader = DatasetLoader::new();
        let ds = loader.load(b"1,2\n3,4\n", false).unwrap();

        assert_eq!(ds.n_rows(), 2);
        assert_eq!(ds.n_cols(), 2);
        assert!(!ds.has_header());
    }

    #[test]
    fn test_load_empty_is_parse_failure() {
        let loader = DatasetLoader::new();
        let err = loader.load(b"", true).unwrap_err();
        assert!(matches!(err, MivError::ParseFailure(_)));
    }

    #[test]
    fn test_preview_is_bounded() {
        let mut text = String::from("x,y\n");
        for i in 0..20 {
            text.push_str(&format!("{},{}\n", i, i * 2));
        }
        let ds = DatasetLoader::new().load(text.as_bytes(), true).unwrap();
        assert_eq!(ds.preview(5).height(), 5);
    }

    #[test]
    fn test_extension_gate() {
        assert!(Upload::new("iris.CSV", b"a\n1\n".to_vec()).check_extension().is_ok());
        assert!(Upload::new("adult.data", b"a\n1\n".to_vec()).check_extension().is_ok());

        let err = Upload::new("table.xlsx", b"a\n1\n".to_vec())
            .check_extension()
            .unwrap_err();
        assert!(matches!(err, MivError::UnsupportedExtension { .. }));
        assert!(Upload::new("noext", Vec::new()).check_extension().is_err());
    }
}

//! Field delimiter detection
//!
//! Tries every candidate delimiter on a short prefix of the input and keeps
//! the one that yields the most columns. Earlier candidates win ties, so a
//! file whose real delimiter is not a candidate falls back to a comma.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{BufRead, BufReader, Cursor, Read, Seek};
use tracing::{debug, warn};

/// Rows parsed per candidate when probing a delimiter
pub const LOOKAHEAD_ROWS: usize = 6;

/// Candidate field delimiters, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Separator {
    #[default]
    Comma,
    Semicolon,
    Tab,
    Pipe,
}

impl Separator {
    /// All candidates in the order they are tried
    pub const CANDIDATES: [Separator; 4] = [
        Separator::Comma,
        Separator::Semicolon,
        Separator::Tab,
        Separator::Pipe,
    ];

    pub fn as_byte(self) -> u8 {
        match self {
            Separator::Comma => b',',
            Separator::Semicolon => b';',
            Separator::Tab => b'\t',
            Separator::Pipe => b'|',
        }
    }

    /// Printable form used in user messages
    pub fn display_char(self) -> &'static str {
        match self {
            Separator::Comma => ",",
            Separator::Semicolon => ";",
            Separator::Tab => "\\t",
            Separator::Pipe => "|",
        }
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.display_char())
    }
}

/// Parse `bytes` with the given delimiter and header mode.
///
/// `n_rows` limits how many data rows are read; `None` reads everything.
pub(crate) fn parse_table(
    bytes: &[u8],
    separator: Separator,
    has_header: bool,
    n_rows: Option<usize>,
) -> PolarsResult<DataFrame> {
    let parse_opts = CsvParseOptions::default().with_separator(separator.as_byte());

    CsvReadOptions::default()
        .with_has_header(has_header)
        .with_n_rows(n_rows)
        .with_infer_schema_length(Some(100))
        .with_parse_options(parse_opts)
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
}

/// Guess the field delimiter of a delimited text stream.
///
/// Never fails: unreadable input or a parse error for every candidate yields
/// [`Separator::Comma`]. Only the header and the first [`LOOKAHEAD_ROWS`]
/// lines are read. The stream is rewound before returning, so callers can
/// read the full content afterwards.
pub fn detect_separator<R: Read + Seek>(reader: &mut R, has_header: bool) -> Separator {
    let sample = match sample_lines(reader, has_header) {
        Ok(sample) => sample,
        Err(e) => {
            warn!(error = %e, "could not read upload while probing separators");
            Vec::new()
        }
    };

    let mut best = Separator::Comma;
    let mut max_cols = 0usize;

    for candidate in Separator::CANDIDATES {
        let n_cols = parse_table(&sample, candidate, has_header, Some(LOOKAHEAD_ROWS))
            .map(|df| df.width())
            .unwrap_or(0);

        debug!(separator = %candidate, n_cols, "separator candidate parsed");

        if n_cols > max_cols {
            max_cols = n_cols;
            best = candidate;
        }
    }

    if let Err(e) = reader.rewind() {
        warn!(error = %e, "could not rewind upload after separator detection");
    }

    best
}

/// The header line (if any) plus the first [`LOOKAHEAD_ROWS`] data lines
fn sample_lines<R: Read + Seek>(reader: &mut R, has_header: bool) -> std::io::Result<Vec<u8>> {
    reader.rewind()?;
    let wanted = LOOKAHEAD_ROWS + usize::from(has_header);
    let mut lines = BufReader::new(reader);
    let mut buf = Vec::new();

    for _ in 0..wanted {
        if lines.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::SeekFrom;

    fn detect(text: &str, has_header: bool) -> Separator {
        let mut cursor = Cursor::new(text.as_bytes().to_vec());
        detect_separator(&mut cursor, has_header)
    }

    #[test]
    fn test_detects_each_candidate() {
        assert_eq!(detect("a,b,c\n1,2,3\n", true), Separator::Comma);
        assert_eq!(detect("a;b;c\n1;2;3\n", true), Separator::Semicolon);
        assert_eq!(detect("a\tb\tc\n1\t2\t3\n", true), Separator::Tab);
        assert_eq!(detect("a|b|c\n1|2|3\n", true), Separator::Pipe);
    }

    #[test]
    fn test_highest_column_count_wins() {
        // Two pipe fields but three semicolon fields
        let text = "a;b|x;c\n1;2|y;3\n";
        assert_eq!(detect(text, true), Separator::Semicolon);
    }

    #[test]
    fn test_ties_go_to_earliest_candidate() {
        // Every candidate yields one column
        assert_eq!(detect("alpha\nbeta\ngamma\n", true), Separator::Comma);
        // Unknown delimiter also degenerates to one column everywhere
        assert_eq!(detect("a:b:c\n1:2:3\n", true), Separator::Comma);
        // Comma and semicolon both give two columns
        assert_eq!(detect("a,b;c\n1,2;3\n", true), Separator::Comma);
    }

    #[test]
    fn test_never_fails_on_garbage() {
        assert_eq!(detect("", true), Separator::Comma);
    }

    #[test]
    fn test_headerless_mode() {
        assert_eq!(detect("1;2;3;4\n5;6;7;8\n", false), Separator::Semicolon);
    }

    #[test]
    fn test_rows_past_lookahead_are_ignored() {
        let mut text = String::from("a,b,c\n");
        for i in 0..8 {
            text.push_str(&format!("{i},{i},{i}\n"));
        }
        text.push_str("9,9,9,9\n");
        assert_eq!(detect(&text, true), Separator::Comma);
    }

    #[test]
    fn test_headerless_lookahead_excludes_extra_line() {
        // Seventh line is ragged; only six are sampled without a header
        let mut text = String::new();
        for i in 0..6 {
            text.push_str(&format!("{i};{i};{i}\n"));
        }
        text.push_str("1;2;3;4;5\n");
        assert_eq!(detect(&text, false), Separator::Semicolon);
    }

    #[test]
    fn test_stream_rewound_after_detection() {
        let mut cursor = Cursor::new(b"a;b\n1;2\n".to_vec());
        cursor.seek(SeekFrom::Start(3)).unwrap();

        let sep = detect_separator(&mut cursor, true);

        assert_eq!(sep, Separator::Semicolon);
        assert_eq!(cursor.position(), 0);
    }
}

//! Delimited-text parsing.
//!
//! Turns decoded text into a header plus row-major string cells, with missing
//! markers already mapped to `None`. Typing the columns happens afterwards.

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use super::IngestionError;

/// Tokens read as a missing value, in addition to the empty string.
pub const DEFAULT_NA_VALUES: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>", "#N/A",
    "#NA", "#N/A N/A", "1.#IND", "-1.#IND", "1.#QNAN", "-1.#QNAN",
];

const SNIFF_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];
const SNIFF_LINES: usize = 10;

/// Options for parsing delimited text.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter. `None` sniffs among `,` `;` tab and `|`.
    pub delimiter: Option<u8>,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Cell values treated as missing
    pub na_values: HashSet<String>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: Some(b','),
            quote: b'"',
            na_values: DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl CsvOptions {
    /// Options that sniff the delimiter from the content.
    pub fn sniffing() -> Self {
        Self {
            delimiter: None,
            ..Self::default()
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    fn is_missing(&self, cell: &str) -> bool {
        cell.is_empty() || self.na_values.contains(cell)
    }
}

/// Header and cells of a parsed file.
#[derive(Debug, Clone)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    /// One entry per column, each holding every row's cell.
    pub columns: Vec<Vec<Option<String>>>,
    pub delimiter: u8,
    pub row_count: usize,
}

/// Parses `text` as delimited data with a required header row.
///
/// Records shorter than the header are padded with missing cells. A record
/// with more fields than the header is a parse error.
pub fn parse_delimited(
    text: &str,
    options: &CsvOptions,
    path: &Path,
) -> Result<ParsedCsv, IngestionError> {
    let delimiter = options.delimiter.unwrap_or_else(|| detect_delimiter(text));

    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .quote(options.quote)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let header_record = reader
        .headers()
        .map_err(|e| IngestionError::parse(path, e.to_string()))?
        .clone();
    if header_record.is_empty() {
        return Err(IngestionError::Empty {
            path: path.to_path_buf(),
        });
    }
    let headers = normalize_headers(header_record.iter());

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    let mut row_count = 0;
    for record in reader.records() {
        let record = record.map_err(|e| IngestionError::parse(path, e.to_string()))?;
        if record.len() > headers.len() {
            return Err(IngestionError::parse(
                path,
                format!(
                    "record {} has {} fields, but the header has {}",
                    row_count + 1,
                    record.len(),
                    headers.len()
                ),
            ));
        }
        for (index, column) in columns.iter_mut().enumerate() {
            let cell = record.get(index).filter(|cell| !options.is_missing(cell));
            column.push(cell.map(str::to_string));
        }
        row_count += 1;
    }

    debug!(
        columns = headers.len(),
        rows = row_count,
        delimiter = %char::from(delimiter).escape_default(),
        "Parsed delimited text"
    );

    Ok(ParsedCsv {
        headers,
        columns,
        delimiter,
        row_count,
    })
}

/// Picks the delimiter whose per-line count is highest and most consistent
/// over the first lines. Defaults to a comma.
pub fn detect_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();
    if sample.is_empty() {
        return b',';
    }

    let mut best = (b',', 0.0f64);
    for delimiter in SNIFF_CANDIDATES {
        let counts: Vec<f64> = sample
            .iter()
            .map(|line| line.bytes().filter(|&b| b == delimiter).count() as f64)
            .collect();
        let mean = counts.iter().sum::<f64>() / counts.len() as f64;
        let variance = counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / counts.len() as f64;
        let score = mean / (1.0 + variance.sqrt());
        if score > best.1 {
            best = (delimiter, score);
        }
    }
    best.0
}

/// Names blank headers `Unnamed: <index>` and suffixes repeats with `.1`, `.2`, ...
fn normalize_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut headers = Vec::new();
    for (index, name) in raw.enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {index}")
        } else {
            name.to_string()
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        seen.insert(candidate.clone());
        headers.push(candidate);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<ParsedCsv, IngestionError> {
        parse_delimited(text, &CsvOptions::default(), Path::new("test.csv"))
    }

    #[test]
    fn test_parse_simple() {
        let parsed = parse("a,b\n1,x\n2,y\n").unwrap();
        assert_eq!(parsed.headers, vec!["a", "b"]);
        assert_eq!(parsed.row_count, 2);
        assert_eq!(
            parsed.columns[1],
            vec![Some("x".to_string()), Some("y".to_string())]
        );
    }

    #[test]
    fn test_missing_markers() {
        let parsed = parse("a,b\nNA,\n1,null\n").unwrap();
        assert_eq!(parsed.columns[0], vec![None, Some("1".to_string())]);
        assert_eq!(parsed.columns[1], vec![None, None]);
    }

    #[test]
    fn test_quoted_fields() {
        let parsed = parse("name,note\n\"Doe, Jane\",\"said \"\"hi\"\"\"\n").unwrap();
        assert_eq!(parsed.columns[0][0].as_deref(), Some("Doe, Jane"));
        assert_eq!(parsed.columns[1][0].as_deref(), Some("said \"hi\""));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let parsed = parse("a,b,c\n1,2,3\n4,5\n7,8,9\n").unwrap();
        assert_eq!(parsed.row_count, 3);
        assert_eq!(
            parsed.columns[2],
            vec![Some("3".to_string()), None, Some("9".to_string())]
        );
        assert_eq!(parsed.columns[1][1].as_deref(), Some("5"));
    }

    #[test]
    fn test_long_row_is_rejected() {
        let err = parse("a,b\n1,2\n3,4,5\n").unwrap_err();
        match err {
            IngestionError::Parse { message, .. } => {
                assert!(message.contains("3 fields"), "unexpected message: {message}")
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_input_has_no_header() {
        let err = parse("").unwrap_err();
        assert!(matches!(err, IngestionError::Empty { .. }));
    }

    #[test]
    fn test_header_only_yields_zero_rows() {
        let parsed = parse("a,b\n").unwrap();
        assert_eq!(parsed.row_count, 0);
        assert!(parsed.columns.iter().all(|c| c.is_empty()));
    }

    #[test]
    fn test_header_normalization() {
        let parsed = parse("x,,x,x\n1,2,3,4\n").unwrap();
        assert_eq!(parsed.headers, vec!["x", "Unnamed: 1", "x.1", "x.2"]);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\nd,e,f"), b',');
        assert_eq!(detect_delimiter("a;b;c\nd;e;f"), b';');
        assert_eq!(detect_delimiter("a\tb\tc\nd\te\tf"), b'\t');
        assert_eq!(detect_delimiter("a|b\nc|d"), b'|');
        assert_eq!(detect_delimiter("single"), b',');
    }

    #[test]
    fn test_sniffing_options() {
        let parsed =
            parse_delimited("a;b\n1;2\n", &CsvOptions::sniffing(), Path::new("t.csv")).unwrap();
        assert_eq!(parsed.delimiter, b';');
        assert_eq!(parsed.headers, vec!["a", "b"]);
    }
}

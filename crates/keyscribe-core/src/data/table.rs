//! Forgiving CSV table reader shared by the caption and dictionary loaders.
//!
//! A table needs a readable header row. Data rows whose column count differs
//! from the header, which the CSV parser rejects, or which are not valid
//! UTF-8 are logged and skipped.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{PipelineError, PipelineResult};

/// A parsed data row with its source line number.
#[derive(Debug, Clone)]
pub struct Row {
    /// 1-based line in the source file
    pub line: u64,
    fields: Vec<String>,
}

impl Row {
    /// Field at `column`, or an empty string if the row is short.
    pub fn field(&self, column: usize) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }
}

/// An in-memory CSV table.
#[derive(Debug)]
pub struct Table {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<Row>,
    skipped: usize,
}

impl Table {
    /// Read and parse a table, bounded by `timeout_ms`.
    pub async fn load(path: &Path, timeout_ms: u64) -> PipelineResult<Self> {
        let bytes = read_bounded(path, timeout_ms, "table load").await?;
        Self::parse(path, &bytes)
    }

    /// Parse table bytes. `path` is used for error context only.
    pub fn parse(path: &Path, bytes: &[u8]) -> PipelineResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .byte_headers()
            .map_err(|e| PipelineError::Table {
                path: path.to_path_buf(),
                message: format!("unreadable header: {e}"),
            })?
            .iter()
            .map(|h| {
                String::from_utf8_lossy(h)
                    .trim_start_matches('\u{feff}')
                    .trim()
                    .to_string()
            })
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(PipelineError::Table {
                path: path.to_path_buf(),
                message: "no header row".to_string(),
            });
        }

        let mut rows = Vec::new();
        let mut skipped = 0usize;

        for result in reader.byte_records() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    skipped += 1;
                    tracing::warn!("Skipping malformed row in {:?}: {}", path, e);
                    continue;
                }
            };
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            if record.len() != headers.len() {
                skipped += 1;
                tracing::warn!(
                    "Skipping line {} of {:?}: expected {} fields, found {}",
                    line,
                    path,
                    headers.len(),
                    record.len()
                );
                continue;
            }

            let fields: Result<Vec<String>, _> = record
                .iter()
                .map(|field| std::str::from_utf8(field).map(str::to_string))
                .collect();
            match fields {
                Ok(fields) => rows.push(Row { line, fields }),
                Err(e) => {
                    skipped += 1;
                    tracing::warn!("Skipping line {} of {:?}: invalid UTF-8 ({})", line, path, e);
                }
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
            skipped,
        })
    }

    /// Index of a required header column.
    pub fn column(&self, name: &str) -> PipelineResult<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PipelineError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })
    }

    /// Rows that survived parsing, in file order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows dropped as malformed.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Read a whole file with a timeout, mapping failures to pipeline errors.
pub(crate) async fn read_bounded(
    path: &Path,
    timeout_ms: u64,
    stage: &str,
) -> PipelineResult<Vec<u8>> {
    if !path.exists() {
        return Err(PipelineError::FileNotFound(path.to_path_buf()));
    }
    bounded(path, tokio::fs::read(path), timeout_ms, stage).await
}

async fn bounded<F>(path: &Path, read: F, timeout_ms: u64, stage: &str) -> PipelineResult<Vec<u8>>
where
    F: Future<Output = std::io::Result<Vec<u8>>>,
{
    match tokio::time::timeout(Duration::from_millis(timeout_ms), read).await {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => Err(PipelineError::Table {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
        Err(_) => Err(PipelineError::Timeout {
            stage: stage.to_string(),
            timeout_ms,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &[u8]) -> PipelineResult<Table> {
        Table::parse(Path::new("test.csv"), content)
    }

    #[test]
    fn test_parse_basic_table() {
        let table = parse(b"val,tk\na dog runs,dog run\na cat sits,cat\n").unwrap();
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.skipped(), 0);

        let val = table.column("val").unwrap();
        let tk = table.column("tk").unwrap();
        assert_eq!(table.rows()[0].field(val), "a dog runs");
        assert_eq!(table.rows()[1].field(tk), "cat");
    }

    #[test]
    fn test_skips_rows_with_wrong_column_count() {
        let table = parse(b"val,tk\ngood row,dog\nbad,row,extra\nalso good,cat\nlonely\n").unwrap();
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.skipped(), 2);
        assert_eq!(table.rows()[1].line, 4);
    }

    #[test]
    fn test_invalid_utf8_row_is_skipped_and_counted() {
        let table = parse(b"val,tk\ncaf\xe9 au lait,cat\na cat,c\xe9t\na dog,dog\n").unwrap();
        assert_eq!(table.rows().len(), 1);
        assert_eq!(table.skipped(), 2);
        assert_eq!(table.rows()[0].field(0), "a dog");
        assert_eq!(table.rows()[0].line, 4);
    }

    #[test]
    fn test_header_bom_is_stripped() {
        let table = parse(b"\xef\xbb\xbfkeys\ndog\n").unwrap();
        assert_eq!(table.column("keys").unwrap(), 0);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let table = parse(b"caption,keywords\na,b\n").unwrap();
        let err = table.column("val").unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn { ref column, .. } if column == "val"));
    }

    #[test]
    fn test_empty_file_has_no_header() {
        assert!(matches!(parse(b""), Err(PipelineError::Table { .. })));
    }

    #[tokio::test]
    async fn test_stalled_read_times_out() {
        let stalled = std::future::pending::<std::io::Result<Vec<u8>>>();
        let err = bounded(Path::new("vocab.json"), stalled, 20, "vocabulary load")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Timeout { ref stage, timeout_ms: 20 } if stage == "vocabulary load"
        ));
    }

    #[tokio::test]
    async fn test_read_error_names_the_file() {
        let failing = async { Err::<Vec<u8>, _>(std::io::Error::other("device gone")) };
        let err = bounded(Path::new("captions.csv"), failing, 1000, "table load")
            .await
            .unwrap_err();
        assert!(
            matches!(err, PipelineError::Table { ref message, .. } if message == "device gone")
        );
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = Table::load(Path::new("/nonexistent/captions.csv"), 1000)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound(_)));
    }
}

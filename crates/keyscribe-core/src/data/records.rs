//! Caption table loading.

use std::path::Path;

use serde::Serialize;

use super::table::Table;
use crate::error::PipelineResult;

/// Caption text column.
pub const CAPTION_COLUMN: &str = "val";
/// Space-separated keyword column.
pub const KEYWORDS_COLUMN: &str = "tk";

/// One raw (caption, keyword string) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionRecord {
    pub caption: String,
    pub keywords: String,
    /// 1-based source line, 0 for records built in memory
    pub line: u64,
}

impl CaptionRecord {
    pub fn new(caption: impl Into<String>, keywords: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            keywords: keywords.into(),
            line: 0,
        }
    }

    pub fn with_line(mut self, line: u64) -> Self {
        self.line = line;
        self
    }
}

/// Row counts from a caption table load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
}

/// All usable caption records, in file order.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<CaptionRecord>,
    report: LoadReport,
}

impl RecordStore {
    /// Load the caption table. Malformed rows are skipped, not fatal.
    pub async fn load(path: &Path, timeout_ms: u64) -> PipelineResult<Self> {
        let table = Table::load(path, timeout_ms).await?;
        let store = Self::from_table(&table)?;
        tracing::info!(
            "Loaded {} caption records from {:?} ({} malformed rows skipped)",
            store.report.loaded,
            path,
            store.report.skipped
        );
        Ok(store)
    }

    /// Build from an already-parsed table. Requires `val` and `tk` columns.
    pub fn from_table(table: &Table) -> PipelineResult<Self> {
        let caption = table.column(CAPTION_COLUMN)?;
        let keywords = table.column(KEYWORDS_COLUMN)?;

        let records: Vec<CaptionRecord> = table
            .rows()
            .iter()
            .map(|row| {
                CaptionRecord::new(row.field(caption), row.field(keywords)).with_line(row.line)
            })
            .collect();

        Ok(Self {
            report: LoadReport {
                loaded: records.len(),
                skipped: table.skipped(),
            },
            records,
        })
    }

    pub fn from_records(records: Vec<CaptionRecord>) -> Self {
        Self {
            report: LoadReport {
                loaded: records.len(),
                skipped: 0,
            },
            records,
        }
    }

    pub fn records(&self) -> &[CaptionRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&CaptionRecord> {
        self.records.get(index)
    }

    pub fn report(&self) -> LoadReport {
        self.report
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

//! Output formatting for generated documents.
//!
//! Documents can be written as a human-readable text block, a JSON array,
//! or JSON Lines.

use std::io::{self, Write};

use crate::types::GeneratedDocument;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// "Topic Keywords / Output Virtual Document" blocks
    Text,
    /// Single JSON object or array
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Writes generated documents in the selected format.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects the JSON format.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Write a single document.
    ///
    /// JSON writes one object per call; use `write_all` for an array.
    pub fn write(&mut self, doc: &GeneratedDocument) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.writer, "Topic Keywords: {}", doc.keywords)?;
                writeln!(self.writer, "Output Virtual Document: {}", doc.text)?;
                if let Some(reference) = &doc.reference {
                    writeln!(self.writer, "Reference: {}", reference)?;
                }
                writeln!(self.writer)?;
            }
            OutputFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, doc)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, doc).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
            }
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, doc).map_err(io::Error::other)?;
                writeln!(self.writer)?;
            }
        }
        self.items_written += 1;
        Ok(())
    }

    /// Write many documents. JSON becomes a single array.
    pub fn write_all(&mut self, docs: &[GeneratedDocument]) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, docs)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, docs).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
                self.items_written += docs.len();
            }
            OutputFormat::Text | OutputFormat::JsonLines => {
                for doc in docs {
                    self.write(doc)?;
                }
            }
        }
        Ok(())
    }

    /// Whether documents must be collected and written once with `write_all`.
    pub fn needs_collection(&self) -> bool {
        self.format == OutputFormat::Json
    }

    pub fn items_written(&self) -> usize {
        self.items_written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

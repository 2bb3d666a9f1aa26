//! Downstream sinks for finished documents.
//!
//! A sink receives an immutable, fully-built [`CanonicalDocument`] and owns
//! its serialization. [`JsonFileSink`] keeps one SuperJSON file per document;
//! [`StoredRecord`] is the flat row shape for tabular stores.

mod chunk;
mod json;

pub use chunk::{BlockChunker, TextChunk};
pub use json::{from_json, to_json, JsonFormat};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::CanonicalDocument;

/// Receives finished documents.
pub trait DocumentSink {
    /// Persist one document.
    fn write(&mut self, doc: &CanonicalDocument) -> Result<()>;
}

/// Writes each document to `{dir}/{doc_id}.json`.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
    format: JsonFormat,
}

impl JsonFileSink {
    /// Create a sink writing into `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            format: JsonFormat::Pretty,
        })
    }

    /// Set the output format.
    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file for a document identifier.
    pub fn path_for(&self, doc_id: &str) -> Result<PathBuf> {
        let unusable = doc_id.is_empty()
            || doc_id.contains(['/', '\\'])
            || doc_id == "."
            || doc_id == "..";
        if unusable {
            return Err(Error::Sink(format!(
                "unusable document id for a file name: {:?}",
                doc_id
            )));
        }
        Ok(self.dir.join(format!("{}.json", doc_id)))
    }

    /// Read a previously written document.
    pub fn read(&self, doc_id: &str) -> Result<CanonicalDocument> {
        let data = fs::read_to_string(self.path_for(doc_id)?)?;
        from_json(&data)
    }
}

impl DocumentSink for JsonFileSink {
    fn write(&mut self, doc: &CanonicalDocument) -> Result<()> {
        let path = self.path_for(doc.doc_id())?;
        fs::write(&path, to_json(doc, self.format)?)?;
        log::info!("wrote {}", path.display());
        Ok(())
    }
}

/// Flat row for tabular stores: identifying columns plus the full document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Document identifier
    pub doc_id: String,

    /// Source locator
    pub source_uri: String,

    /// Original file name
    pub filename: Option<String>,

    /// Schema version of `super_json`
    pub version: String,

    /// Contributing tools in priority order
    pub tools_used: Vec<String>,

    /// Document page count
    pub page_count: u32,

    /// Compact SuperJSON encoding of the document
    pub super_json: String,
}

impl StoredRecord {
    /// Flatten a document into a row.
    pub fn from_document(doc: &CanonicalDocument) -> Result<Self> {
        Ok(Self {
            doc_id: doc.metadata.doc_id.clone(),
            source_uri: doc.metadata.source_uri.clone(),
            filename: doc.metadata.filename.clone(),
            version: doc.version.clone(),
            tools_used: doc.tools_used.clone(),
            page_count: doc.metadata.page_count,
            super_json: to_json(doc, JsonFormat::Compact)?,
        })
    }

    /// Decode the stored document.
    pub fn document(&self) -> Result<CanonicalDocument> {
        from_json(&self.super_json)
    }
}

/// Keeps rows in memory, e.g. to batch them for a tabular store.
#[derive(Debug, Clone, Default)]
pub struct RecordBuffer {
    records: Vec<StoredRecord>,
}

impl RecordBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffered rows in write order.
    pub fn records(&self) -> &[StoredRecord] {
        &self.records
    }

    /// Take the buffered rows, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<StoredRecord> {
        std::mem::take(&mut self.records)
    }
}

impl DocumentSink for RecordBuffer {
    fn write(&mut self, doc: &CanonicalDocument) -> Result<()> {
        self.records.push(StoredRecord::from_document(doc)?);
        Ok(())
    }
}

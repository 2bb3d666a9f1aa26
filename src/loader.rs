//! Loading source documents.
//!
//! The merge core never fetches bytes itself; a [`DocumentLoader`] turns a
//! locator into the raw bytes plus loader context that ends up verbatim in
//! the document's metadata extras.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::Extras;

/// Raw document bytes with their origin.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    /// Raw document content
    pub bytes: Vec<u8>,

    /// Local path or remote URI the bytes came from
    pub source_uri: String,

    /// Loader-supplied context
    pub metadata: Extras,
}

impl LoadedDocument {
    /// Wrap bytes that were obtained elsewhere.
    pub fn from_bytes(bytes: Vec<u8>, source_uri: impl Into<String>) -> Self {
        Self {
            bytes,
            source_uri: source_uri.into(),
            metadata: Extras::new(),
        }
    }

    /// Add a metadata entry and return self.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// File name recorded by the loader, if any.
    pub fn filename(&self) -> Option<&str> {
        self.metadata.get("filename").and_then(Value::as_str)
    }
}

/// Source of document bytes.
pub trait DocumentLoader {
    /// Load the document identified by `locator`.
    fn load(&self, locator: &str) -> Result<LoadedDocument>;
}

/// Loads documents from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct LocalFileLoader {
    root: Option<PathBuf>,
}

impl LocalFileLoader {
    /// Create a loader resolving paths as given.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative locators against `root`.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    fn resolve(&self, locator: &str) -> PathBuf {
        let path = Path::new(locator);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Load a file by path.
    pub fn load_path(&self, path: &Path) -> Result<LoadedDocument> {
        let bytes = fs::read(path)?;
        let meta = fs::metadata(path)?;
        let source_uri = path.canonicalize()?.to_string_lossy().into_owned();

        log::debug!("loaded {} ({} bytes)", source_uri, bytes.len());
        Ok(LoadedDocument {
            metadata: file_metadata(path, meta.len(), meta.modified().ok()),
            bytes,
            source_uri,
        })
    }
}

impl DocumentLoader for LocalFileLoader {
    fn load(&self, locator: &str) -> Result<LoadedDocument> {
        if ObjectLocator::is_object_uri(locator) {
            return Err(Error::InvalidLocator(format!(
                "{} is an object store URI, not a local path",
                locator
            )));
        }
        self.load_path(&self.resolve(locator))
    }
}

fn file_metadata(path: &Path, size: u64, modified: Option<std::time::SystemTime>) -> Extras {
    let mut extras = Extras::new();
    extras.insert("source".to_string(), Value::from("local"));
    if let Some(name) = path.file_name() {
        extras.insert(
            "filename".to_string(),
            Value::from(name.to_string_lossy().into_owned()),
        );
    }
    extras.insert("size_bytes".to_string(), Value::from(size));
    if let Some(modified) = modified {
        let modified: DateTime<Utc> = modified.into();
        extras.insert(
            "modified".to_string(),
            Value::from(modified.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
    }
    extras
}

/// Load a local file asynchronously.
#[cfg(feature = "async")]
pub async fn load_async(path: impl AsRef<Path>) -> Result<LoadedDocument> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await?;
    let meta = tokio::fs::metadata(path).await?;
    let source_uri = tokio::fs::canonicalize(path)
        .await?
        .to_string_lossy()
        .into_owned();

    Ok(LoadedDocument {
        metadata: file_metadata(path, meta.len(), meta.modified().ok()),
        bytes,
        source_uri,
    })
}

/// List the PDF files directly inside `dir`, sorted by path.
pub fn list_pdfs(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut pdfs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if path.is_file() && is_pdf {
            pdfs.push(path);
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

/// A `gs://bucket/blob` object store location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocator {
    /// Bucket name
    pub bucket: String,
    /// Object name within the bucket
    pub blob: String,
}

impl ObjectLocator {
    fn pattern() -> &'static Regex {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        PATTERN.get_or_init(|| {
            Regex::new(r"^gs://([^/]+)/(.+)$").expect("locator pattern is valid")
        })
    }

    /// Check whether a locator uses the object store scheme.
    pub fn is_object_uri(locator: &str) -> bool {
        locator.starts_with("gs://")
    }

    /// Parse a `gs://bucket/blob` URI.
    pub fn parse(uri: &str) -> Result<Self> {
        let caps = Self::pattern()
            .captures(uri)
            .ok_or_else(|| Error::InvalidLocator(uri.to_string()))?;
        Ok(Self {
            bucket: caps[1].to_string(),
            blob: caps[2].to_string(),
        })
    }

    /// URI form of the locator.
    pub fn uri(&self) -> String {
        format!("gs://{}/{}", self.bucket, self.blob)
    }

    /// Last path segment of the object name.
    pub fn filename(&self) -> &str {
        self.blob.rsplit('/').next().unwrap_or(&self.blob)
    }

    /// Loader metadata for bytes fetched from this location.
    pub fn metadata(&self) -> Extras {
        let mut extras = Extras::new();
        extras.insert("source".to_string(), Value::from("gcs"));
        extras.insert("bucket".to_string(), Value::from(self.bucket.as_str()));
        extras.insert("blob".to_string(), Value::from(self.blob.as_str()));
        extras.insert("filename".to_string(), Value::from(self.filename()));
        extras
    }

    /// Wrap bytes fetched from this location.
    pub fn into_document(self, bytes: Vec<u8>) -> LoadedDocument {
        LoadedDocument {
            bytes,
            source_uri: self.uri(),
            metadata: self.metadata(),
        }
    }
}

impl std::str::FromStr for ObjectLocator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

//! Extractor adapter boundary.
//!
//! Adapters wrap one concrete extraction tool each. They are external
//! collaborators: this crate only fixes their output shape ([`RawPayload`])
//! and the rule that an adapter never fails. A tool that cannot run returns a
//! payload tagged `skipped` with a reason instead.

mod payload;

pub use payload::{
    CloudOcrCell, CloudOcrContent, CloudOcrPage, CloudOcrParagraph, CloudOcrRow, CloudOcrTable,
    LayoutBlock, LayoutContent, LayoutPage, LayoutTable, NativeContent, NativeFragment,
    PayloadMeta, RawPayload, TextAnchor, TextLayerBlock, TextLayerContent, TextLayerPage,
    TextSegment, ToolKind, Vertex,
};

use crate::error::Result;
use std::path::Path;

/// An extraction tool wrapped to emit [`RawPayload`]s.
///
/// Implementations read the shared input bytes only, so adapters for
/// different tools may run concurrently on the same document.
pub trait ExtractorAdapter: Send + Sync {
    /// Tool name used for provenance tags.
    fn name(&self) -> &str;

    /// Kind of tool, which selects the normalizer.
    fn kind(&self) -> ToolKind;

    /// Extract the document. Failures degrade to [`RawPayload::skipped`].
    fn extract(&self, bytes: &[u8]) -> RawPayload;
}

/// Adapter that replays a previously captured payload.
///
/// Useful when extraction already ran out of process and its JSON output was
/// stored, and for exercising the merge pipeline without the real tools.
#[derive(Debug, Clone)]
pub struct RecordedAdapter {
    name: String,
    payload: RawPayload,
}

impl RecordedAdapter {
    /// Wrap a payload. The adapter takes its name from the payload.
    pub fn new(payload: RawPayload) -> Self {
        Self {
            name: payload.tool_name().to_string(),
            payload,
        }
    }

    /// Parse a captured payload from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let payload: RawPayload = serde_json::from_str(json)?;
        Ok(Self::new(payload))
    }

    /// Load a captured payload from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// The recorded payload.
    pub fn payload(&self) -> &RawPayload {
        &self.payload
    }
}

impl ExtractorAdapter for RecordedAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ToolKind {
        self.payload.kind()
    }

    fn extract(&self, _bytes: &[u8]) -> RawPayload {
        self.payload.clone()
    }
}

/// Adapter for a tool that is configured off. Always reports `skipped`.
#[derive(Debug, Clone)]
pub struct UnconfiguredAdapter {
    name: String,
    kind: ToolKind,
    reason: String,
}

impl UnconfiguredAdapter {
    /// Create an adapter that skips with the given reason.
    pub fn new(name: impl Into<String>, kind: ToolKind, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            reason: reason.into(),
        }
    }

    /// Why the tool is skipped.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl ExtractorAdapter for UnconfiguredAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ToolKind {
        self.kind
    }

    fn extract(&self, _bytes: &[u8]) -> RawPayload {
        log::info!("{} skipped: {}", self.name, self.reason);
        RawPayload::skipped(self.name.clone(), self.kind, self.reason.clone())
    }
}

/// Connection settings for the cloud OCR tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudOcrConfig {
    /// Cloud project
    pub project_id: Option<String>,

    /// Processor region
    pub location: String,

    /// Processor identifier
    pub processor_id: Option<String>,
}

impl CloudOcrConfig {
    /// Create an empty (unconfigured) config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the project.
    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Set the region.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Set the processor.
    pub fn with_processor(mut self, processor_id: impl Into<String>) -> Self {
        self.processor_id = Some(processor_id.into());
        self
    }

    /// Why the config cannot be used, or `None` if it is complete.
    pub fn missing_reason(&self) -> Option<String> {
        let missing: Vec<&str> = [
            ("project_id", &self.project_id),
            ("processor_id", &self.processor_id),
        ]
        .iter()
        .filter(|(_, v)| v.as_deref().map_or(true, |s| s.trim().is_empty()))
        .map(|(k, _)| *k)
        .collect();

        if missing.is_empty() {
            None
        } else {
            Some(format!("cloud OCR not configured (missing {})", missing.join(", ")))
        }
    }

    /// Check if every required setting is present.
    pub fn is_configured(&self) -> bool {
        self.missing_reason().is_none()
    }

    /// Fully-qualified processor resource path.
    pub fn processor_path(&self) -> Option<String> {
        match (&self.project_id, &self.processor_id) {
            (Some(project), Some(processor)) if self.is_configured() => Some(format!(
                "projects/{}/locations/{}/processors/{}",
                project, self.location, processor
            )),
            _ => None,
        }
    }

    /// Placeholder adapter used when the config is incomplete.
    pub fn unconfigured_adapter(&self, name: impl Into<String>) -> Option<UnconfiguredAdapter> {
        self.missing_reason()
            .map(|reason| UnconfiguredAdapter::new(name, ToolKind::CloudOcr, reason))
    }
}

impl Default for CloudOcrConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            location: "us".to_string(),
            processor_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorded_adapter_from_json() {
        let adapter = RecordedAdapter::from_json(
            r#"{"tool":"fast","content":{"kind":"text_layer","pages":[{"page_index":0,"text":"A"}]}}"#,
        )
        .unwrap();
        assert_eq!(adapter.name(), "fast");
        assert_eq!(adapter.kind(), ToolKind::TextLayer);
        assert_eq!(adapter.extract(b"%PDF-1.7").page_record_count(), 1);
    }

    #[test]
    fn test_recorded_adapter_invalid_json() {
        assert!(RecordedAdapter::from_json("{not json").is_err());
    }

    #[test]
    fn test_unconfigured_adapter() {
        let adapter = UnconfiguredAdapter::new("cloud_ocr", ToolKind::CloudOcr, "no credentials");
        let payload = adapter.extract(b"");
        assert!(payload.is_skipped());
        assert_eq!(payload.tool, "cloud_ocr");
        assert_eq!(payload.meta.reason.as_deref(), Some("no credentials"));
    }

    #[test]
    fn test_cloud_ocr_config() {
        let config = CloudOcrConfig::new();
        assert!(!config.is_configured());
        assert!(config.missing_reason().unwrap().contains("project_id"));
        assert!(config.unconfigured_adapter("cloud_ocr").is_some());
        assert!(config.processor_path().is_none());

        let config = config.with_project("acme").with_processor("p123").with_location("eu");
        assert!(config.is_configured());
        assert!(config.unconfigured_adapter("cloud_ocr").is_none());
        assert_eq!(
            config.processor_path().as_deref(),
            Some("projects/acme/locations/eu/processors/p123")
        );
    }

    #[test]
    fn test_cloud_ocr_config_blank_values() {
        let config = CloudOcrConfig::new().with_project(" ").with_processor("p1");
        assert!(!config.is_configured());
    }
}

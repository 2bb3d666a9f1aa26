//! End-to-end ingestion: extract, normalize, merge, build.

use rayon::prelude::*;

use crate::builder::generate_doc_id;
use crate::error::Result;
use crate::extract::{ExtractorAdapter, RawPayload};
use crate::loader::LoadedDocument;
use crate::merge::{MergeEngine, MergeOptions, ToolPriority};
use crate::model::{CanonicalDocument, Extras};
use crate::normalize::{normalize_payload, NormalizeOptions, NormalizedOutput};

/// Options for a full pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Normalization options
    pub normalize: NormalizeOptions,

    /// Merge options
    pub merge: MergeOptions,

    /// Whether adapters run in parallel
    pub parallel: bool,
}

impl PipelineOptions {
    /// Create new pipeline options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set normalization options.
    pub fn with_normalize_options(mut self, options: NormalizeOptions) -> Self {
        self.normalize = options;
        self
    }

    /// Set merge options.
    pub fn with_merge_options(mut self, options: MergeOptions) -> Self {
        self.merge = options;
        self
    }

    /// Enable or disable parallel extraction.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel extraction.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            normalize: NormalizeOptions::default(),
            merge: MergeOptions::default(),
            parallel: true,
        }
    }
}

/// Builder that wires extractor adapters to the merge engine.
///
/// # Example
///
/// ```no_run
/// use superjson::extract::{CloudOcrConfig, RecordedAdapter};
/// use superjson::loader::{DocumentLoader, LocalFileLoader};
/// use superjson::Pipeline;
///
/// let loaded = LocalFileLoader::new().load("contract.pdf")?;
/// let mut pipeline = Pipeline::new()
///     .deterministic_ids()
///     .with_adapter(RecordedAdapter::from_file("contract.text_layer.json")?);
/// if let Some(ocr) = CloudOcrConfig::new().unconfigured_adapter("cloud_ocr") {
///     pipeline = pipeline.with_adapter(ocr);
/// }
/// let doc = pipeline.run(&loaded, None)?;
/// println!("{} pages from {:?}", doc.pages.len(), doc.tools_used);
/// # Ok::<(), superjson::Error>(())
/// ```
pub struct Pipeline {
    adapters: Vec<Box<dyn ExtractorAdapter>>,
    options: PipelineOptions,
}

impl Pipeline {
    /// Create a pipeline with no adapters.
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
            options: PipelineOptions::default(),
        }
    }

    /// Register an extractor adapter.
    pub fn with_adapter(mut self, adapter: impl ExtractorAdapter + 'static) -> Self {
        self.adapters.push(Box::new(adapter));
        self
    }

    /// Register a boxed extractor adapter.
    pub fn with_boxed_adapter(mut self, adapter: Box<dyn ExtractorAdapter>) -> Self {
        self.adapters.push(adapter);
        self
    }

    /// Replace all options.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Fail on malformed fragments instead of dropping them.
    pub fn strict(mut self) -> Self {
        self.options.normalize = self.options.normalize.strict();
        self
    }

    /// Use deterministic block identifiers.
    pub fn deterministic_ids(mut self) -> Self {
        self.options.normalize = self.options.normalize.deterministic_ids();
        self
    }

    /// Set the tool priority order.
    pub fn with_priority(mut self, priority: ToolPriority) -> Self {
        self.options.merge = self.options.merge.with_priority(priority);
        self
    }

    /// Run adapters one at a time.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Registered adapter names, in registration order.
    pub fn adapter_names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Options in effect.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Run every adapter against the bytes and normalize the payloads.
    ///
    /// The returned contributions follow registration order regardless of
    /// which adapter finished first.
    pub fn extract(&self, bytes: &[u8]) -> Result<Vec<NormalizedOutput>> {
        let normalize = &self.options.normalize;
        let run = |adapter: &dyn ExtractorAdapter| -> Result<NormalizedOutput> {
            let payload = adapter.extract(bytes);
            if payload.kind() != adapter.kind() {
                log::warn!(
                    "{}: adapter declared {} but returned {} content",
                    adapter.name(),
                    adapter.kind(),
                    payload.kind()
                );
            }
            normalize_payload(&payload, normalize)
        };

        if self.options.parallel {
            self.adapters.par_iter().map(|a| run(a.as_ref())).collect()
        } else {
            self.adapters.iter().map(|a| run(a.as_ref())).collect()
        }
    }

    /// Run the full pipeline on a loaded document.
    ///
    /// Without a `doc_id`, one is generated from the loader's file name.
    pub fn run(
        &self,
        document: &LoadedDocument,
        doc_id: Option<&str>,
    ) -> Result<CanonicalDocument> {
        let doc_id = match doc_id {
            Some(id) => id.to_string(),
            None => generate_doc_id(document.filename().unwrap_or(&document.source_uri)),
        };

        log::info!(
            "ingesting {} as {} with {} tool(s)",
            document.source_uri,
            doc_id,
            self.adapters.len()
        );
        let contributions = self.extract(&document.bytes)?;
        MergeEngine::new(self.options.merge.clone()).merge(
            &doc_id,
            &document.source_uri,
            &document.metadata,
            &contributions,
        )
    }

    /// Normalize and merge payloads captured elsewhere.
    pub fn run_payloads(
        &self,
        doc_id: &str,
        source_uri: &str,
        base_metadata: &Extras,
        payloads: &[RawPayload],
    ) -> Result<CanonicalDocument> {
        let contributions = payloads
            .iter()
            .map(|p| normalize_payload(p, &self.options.normalize))
            .collect::<Result<Vec<_>>>()?;
        MergeEngine::new(self.options.merge.clone()).merge(
            doc_id,
            source_uri,
            base_metadata,
            &contributions,
        )
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

//! Error types for the superjson library.

use std::io;
use thiserror::Error;

/// Result type alias for superjson operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while normalizing, merging, or persisting documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No tool contributed any page; there is nothing to build a document from.
    #[error("No extraction tool contributed any pages")]
    EmptyContributionSet,

    /// Two fragments share one identifier. This is an internal invariant violation.
    #[error("Identifier collision: {id}")]
    IdentifierCollision {
        /// The duplicated identifier
        id: String,
    },

    /// A native fragment record lacks required fields (strict mode only).
    #[error("Malformed fragment from {tool} on page {page_index}: {reason}")]
    MalformedFragment {
        /// Tool that emitted the fragment
        tool: String,
        /// Page the fragment belongs to
        page_index: u32,
        /// What is missing
        reason: String,
    },

    /// An extraction tool is unconfigured or its call failed.
    #[error("Extraction tool {tool} unavailable: {reason}")]
    AdapterUnavailable {
        /// Tool name
        tool: String,
        /// Why the tool did not run
        reason: String,
    },

    /// A canonical document breaks a structural invariant.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// A source locator could not be interpreted.
    #[error("Invalid source locator: {0}")]
    InvalidLocator(String),

    /// A downstream sink rejected the document.
    #[error("Sink error: {0}")]
    Sink(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error is a per-tool degradation rather than a pipeline failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::AdapterUnavailable { .. } | Error::MalformedFragment { .. }
        )
    }
}

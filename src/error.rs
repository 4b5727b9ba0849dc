//! Error types for the FAC normalizer
//!
//! Only infrastructure failures are errors here. A fact that maps to no
//! concept, or a fact field that cannot be parsed, is an ordinary outcome
//! and never surfaces as one of these types.

use thiserror::Error;

/// Problems with the rule catalog. All of them are fatal at start-up.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog YAML: {0}")]
    Parse(String),

    #[error("Invalid pattern '{pattern}' for concept '{concept}': {source}")]
    InvalidPattern {
        concept: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Concept '{0}' is declared more than once")]
    DuplicateConcept(String),

    #[error("Catalog entry #{index} has an empty concept name")]
    EmptyConceptName { index: usize },

    #[error("Catalog declares no namespace markers")]
    NoNamespaceMarkers,
}

/// Failures obtaining the raw fact sequence for a filing
#[derive(Error, Debug)]
pub enum FactSourceError {
    /// The extraction engine could not load the filing (bad URL, missing document, ...)
    #[error("Failed to load filing {filing_url}: {reason}")]
    Rejected { filing_url: String, reason: String },

    #[error("Extraction engine returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Extraction engine request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid extraction engine URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl FactSourceError {
    /// True when the filing itself was at fault rather than the engine
    pub fn is_rejection(&self) -> bool {
        matches!(self, FactSourceError::Rejected { .. })
    }
}

/// Bad service configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

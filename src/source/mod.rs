//! Fact sources
//!
//! Parsing filing documents into facts is done by an external extraction
//! engine. [`FactSource`] is the seam to that engine: give it a filing URL,
//! get back the best-effort list of fact records it produced.

mod http;

pub use http::HttpFactSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::FactSourceError;
use crate::facts::{lenient_records, RawFactRecord};

/// Output of the extraction engine for one filing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFiling {
    pub filing_url: String,
    #[serde(default, deserialize_with = "lenient_records")]
    pub facts: Vec<RawFactRecord>,
    /// Non-fatal problems the engine reported while loading the document
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ExtractedFiling {
    pub fn new(filing_url: impl Into<String>, facts: Vec<RawFactRecord>) -> Self {
        Self {
            filing_url: filing_url.into(),
            facts,
            errors: Vec::new(),
        }
    }
}

/// Provider of raw facts for a filing
#[async_trait]
pub trait FactSource: Send + Sync {
    /// Short identifier used in logs and health output
    fn source_id(&self) -> &'static str;

    /// Load a filing and extract its facts.
    ///
    /// Failing here is a batch-level failure: nothing about the filing can be
    /// normalized.
    async fn extract(&self, filing_url: &str) -> Result<ExtractedFiling, FactSourceError>;
}

/// Fact source backed by pre-extracted filings held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryFactSource {
    filings: HashMap<String, ExtractedFiling>,
}

impl InMemoryFactSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a filing under its own URL
    pub fn with_filing(mut self, filing: ExtractedFiling) -> Self {
        self.filings.insert(filing.filing_url.clone(), filing);
        self
    }

    pub fn len(&self) -> usize {
        self.filings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filings.is_empty()
    }
}

#[async_trait]
impl FactSource for InMemoryFactSource {
    fn source_id(&self) -> &'static str {
        "in-memory"
    }

    async fn extract(&self, filing_url: &str) -> Result<ExtractedFiling, FactSourceError> {
        self.filings
            .get(filing_url)
            .cloned()
            .ok_or_else(|| FactSourceError::Rejected {
                filing_url: filing_url.to_string(),
                reason: "filing not available".to_string(),
            })
    }
}

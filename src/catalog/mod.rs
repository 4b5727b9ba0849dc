//! FAC Rule Catalog
//!
//! The catalog is the only configuration input of the normalizer: an ordered
//! table of canonical concepts, each with an ordered list of tag patterns, plus
//! the namespace markers that decide which facts are eligible at all.
//!
//! It is compiled once at start-up and is immutable afterwards. Any problem in
//! the table (bad regex, duplicate concept, ...) fails compilation, so a
//! broken catalog never reaches request handling.

mod config;
mod rules;

pub use config::{CatalogConfig, ConceptDefinition};
pub use rules::{
    Anchoring, CompiledPattern, ConceptRule, CONTAINS_CONFIDENCE, EXACT_CONFIDENCE,
    PARTIAL_CONFIDENCE,
};

use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{CatalogError, CatalogResult};

/// Compiled, read-only concept catalog
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    version: String,
    /// Lower-cased namespace markers
    namespace_markers: Vec<String>,
    rules: Vec<ConceptRule>,
}

impl RuleCatalog {
    /// Validate and compile a catalog configuration
    pub fn compile(config: &CatalogConfig) -> CatalogResult<Self> {
        let namespace_markers: Vec<String> = config
            .namespace_markers
            .iter()
            .map(|m| m.trim().to_lowercase())
            .filter(|m| !m.is_empty())
            .collect();
        if namespace_markers.is_empty() {
            return Err(CatalogError::NoNamespaceMarkers);
        }

        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(config.concepts.len());
        for (index, definition) in config.concepts.iter().enumerate() {
            if definition.concept.trim().is_empty() {
                return Err(CatalogError::EmptyConceptName { index });
            }
            if !seen.insert(definition.concept.as_str()) {
                return Err(CatalogError::DuplicateConcept(definition.concept.clone()));
            }
            if definition.patterns.is_empty() {
                warn!(
                    concept = %definition.concept,
                    "Catalog concept has no patterns and will never match"
                );
            }
            rules.push(ConceptRule::compile(definition)?);
        }

        info!(
            version = %config.version,
            concepts = rules.len(),
            patterns = rules.iter().map(|r| r.patterns.len()).sum::<usize>(),
            "FAC catalog compiled"
        );

        Ok(Self {
            version: config.version.clone(),
            namespace_markers,
            rules,
        })
    }

    /// Compile the catalog shipped with the crate
    pub fn builtin() -> CatalogResult<Self> {
        Self::compile(&CatalogConfig::builtin()?)
    }

    /// Load and compile a catalog file
    pub fn from_file(path: &Path) -> CatalogResult<Self> {
        Self::compile(&CatalogConfig::load_from_file(path)?)
    }

    /// Load from `path` when given, else the built-in catalog
    pub fn load(path: Option<&Path>) -> CatalogResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::builtin(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn namespace_markers(&self) -> &[String] {
        &self.namespace_markers
    }

    /// Rules in priority order
    pub fn rules(&self) -> &[ConceptRule] {
        &self.rules
    }

    /// Look up one concept's rule by exact name
    pub fn rule(&self, concept: &str) -> Option<&ConceptRule> {
        self.rules.iter().find(|r| r.concept == concept)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether a fact from `namespace` is eligible for classification.
    ///
    /// An absent or empty namespace is always eligible; any other must
    /// contain a marker.
    pub fn accepts_namespace(&self, namespace: Option<&str>) -> bool {
        match namespace {
            None | Some("") => true,
            Some(ns) => {
                let ns = ns.to_lowercase();
                self.namespace_markers
                    .iter()
                    .any(|marker| ns.contains(marker.as_str()))
            }
        }
    }
}

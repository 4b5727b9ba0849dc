//! Catalog Configuration
//!
//! Loads the declarative concept catalog from YAML. The `concepts` list is a
//! YAML sequence, not a mapping, so declaration order (which is classification
//! priority) survives deserialization untouched.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::{CatalogError, CatalogResult};

/// Catalog shipped with the crate
const BUILTIN_CATALOG: &str = include_str!("../../config/fac_catalog.yaml");

/// Root configuration for the concept catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub version: String,
    #[serde(default)]
    pub description: String,
    /// Substrings identifying accepted taxonomy namespaces (case-insensitive)
    #[serde(default)]
    pub namespace_markers: Vec<String>,
    /// Concepts in priority order
    #[serde(default)]
    pub concepts: Vec<ConceptDefinition>,
}

/// Definition of a single canonical concept
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptDefinition {
    pub concept: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Regex patterns over the tag's local name, in priority order
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl CatalogConfig {
    /// Load from a YAML file
    pub fn load_from_file(path: &Path) -> CatalogResult<Self> {
        info!("Loading FAC catalog from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::load_from_str(&content)
    }

    /// Load from a YAML string
    pub fn load_from_str(yaml: &str) -> CatalogResult<Self> {
        serde_yaml::from_str(yaml).map_err(|e| CatalogError::Parse(e.to_string()))
    }

    /// The catalog compiled into the binary
    pub fn builtin() -> CatalogResult<Self> {
        Self::load_from_str(BUILTIN_CATALOG)
    }

    /// Concept names in declaration order
    pub fn concept_names(&self) -> Vec<&str> {
        self.concepts.iter().map(|c| c.concept.as_str()).collect()
    }
}

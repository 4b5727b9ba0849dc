//! Compiled concept rules
//!
//! Each catalog pattern is compiled once into a case-insensitive [`Regex`] and
//! tagged with its anchoring shape, which is what the confidence score is
//! derived from.

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use super::config::ConceptDefinition;
use crate::error::{CatalogError, CatalogResult};

/// Score for a pattern anchored at both ends
pub const EXACT_CONFIDENCE: f64 = 1.0;
/// Score for a pattern anchored at one end only
pub const PARTIAL_CONFIDENCE: f64 = 0.95;
/// Score for an unanchored pattern
pub const CONTAINS_CONFIDENCE: f64 = 0.85;

/// How a pattern is pinned to the tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchoring {
    /// `^...$`
    Exact,
    /// `^...`
    Prefix,
    /// `...$`
    Suffix,
    /// neither end pinned
    Contains,
}

impl Anchoring {
    /// Read the anchoring shape off the raw pattern text
    pub fn of(pattern: &str) -> Self {
        match (pattern.starts_with('^'), pattern.ends_with('$')) {
            (true, true) => Anchoring::Exact,
            (true, false) => Anchoring::Prefix,
            (false, true) => Anchoring::Suffix,
            (false, false) => Anchoring::Contains,
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            Anchoring::Exact => EXACT_CONFIDENCE,
            Anchoring::Prefix | Anchoring::Suffix => PARTIAL_CONFIDENCE,
            Anchoring::Contains => CONTAINS_CONFIDENCE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Anchoring::Exact => "exact",
            Anchoring::Prefix => "prefix",
            Anchoring::Suffix => "suffix",
            Anchoring::Contains => "contains",
        }
    }
}

/// A compiled catalog pattern
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Pattern text exactly as declared
    pub source: String,
    regex: Regex,
    pub anchoring: Anchoring,
}

impl CompiledPattern {
    /// Compile one pattern for `concept`
    pub fn compile(concept: &str, pattern: &str) -> CatalogResult<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| CatalogError::InvalidPattern {
                concept: concept.to_string(),
                pattern: pattern.to_string(),
                source: e,
            })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
            anchoring: Anchoring::of(pattern),
        })
    }

    pub fn is_match(&self, tag: &str) -> bool {
        self.regex.is_match(tag)
    }
}

/// A canonical concept with its ordered, compiled patterns
#[derive(Debug, Clone)]
pub struct ConceptRule {
    pub concept: String,
    pub description: Option<String>,
    pub patterns: Vec<CompiledPattern>,
}

impl ConceptRule {
    pub fn compile(definition: &ConceptDefinition) -> CatalogResult<Self> {
        let patterns = definition
            .patterns
            .iter()
            .map(|p| CompiledPattern::compile(&definition.concept, p))
            .collect::<CatalogResult<Vec<_>>>()?;

        Ok(Self {
            concept: definition.concept.clone(),
            description: definition.description.clone(),
            patterns,
        })
    }

    /// First pattern, in declaration order, that matches the tag
    pub fn first_match(&self, tag: &str) -> Option<&CompiledPattern> {
        self.patterns.iter().find(|p| p.is_match(tag))
    }

    /// Pattern texts in declaration order
    pub fn pattern_sources(&self) -> Vec<&str> {
        self.patterns.iter().map(|p| p.source.as_str()).collect()
    }
}

//! Concept Classifier
//!
//! Maps a raw taxonomy tag (plus its namespace) to at most one canonical FAC
//! concept, and scores how structurally certain that mapping is.
//!
//! Classification is first-match-wins: concepts are tried in catalog order,
//! patterns in declaration order, and the first pattern that matches decides.
//! No scoring happens across candidates, so reordering the catalog is how
//! priority is tuned.

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::catalog::{Anchoring, RuleCatalog};

/// Confidence returned when a concept has no pattern matching the tag
pub const MISMATCH_CONFIDENCE: f64 = 0.5;

/// Detailed outcome of a successful classification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConceptMatch<'a> {
    pub concept: &'a str,
    /// Pattern text that decided the match
    pub pattern: &'a str,
    pub anchoring: Anchoring,
    pub confidence: f64,
}

/// Stateless classifier over a shared, immutable catalog.
///
/// Cloning is cheap; every clone reads the same compiled catalog.
#[derive(Debug, Clone)]
pub struct ConceptClassifier {
    catalog: Arc<RuleCatalog>,
}

impl ConceptClassifier {
    pub fn new(catalog: Arc<RuleCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Map a tag to its canonical concept, or `None` when nothing matches
    /// or the namespace is not an accepted accounting taxonomy.
    pub fn classify(&self, tag: &str, namespace: Option<&str>) -> Option<&str> {
        self.explain(tag, namespace).map(|m| m.concept)
    }

    /// Like [`classify`](Self::classify), but also reports which pattern won
    pub fn explain(&self, tag: &str, namespace: Option<&str>) -> Option<ConceptMatch<'_>> {
        if tag.is_empty() {
            return None;
        }

        if !self.catalog.accepts_namespace(namespace) {
            debug!(tag, namespace, "Skipping tag outside accepted taxonomies");
            return None;
        }

        for rule in self.catalog.rules() {
            if let Some(pattern) = rule.first_match(tag) {
                debug!(
                    tag,
                    concept = %rule.concept,
                    pattern = %pattern.source,
                    "Mapped tag to FAC concept"
                );
                return Some(ConceptMatch {
                    concept: &rule.concept,
                    pattern: &pattern.source,
                    anchoring: pattern.anchoring,
                    confidence: pattern.anchoring.confidence(),
                });
            }
        }

        debug!(tag, "No FAC mapping found");
        None
    }

    /// Structural confidence that `tag` belongs to `concept`.
    ///
    /// Only the given concept's patterns are scanned. An empty argument scores
    /// 0.0; a concept with no pattern matching the tag (including an unknown
    /// concept) scores [`MISMATCH_CONFIDENCE`].
    pub fn confidence(&self, tag: &str, concept: &str) -> f64 {
        if tag.is_empty() || concept.is_empty() {
            return 0.0;
        }

        self.catalog
            .rule(concept)
            .and_then(|rule| rule.first_match(tag))
            .map(|pattern| pattern.anchoring.confidence())
            .unwrap_or(MISMATCH_CONFIDENCE)
    }

    /// Supported concept names in catalog order
    pub fn list_concepts(&self) -> Vec<&str> {
        self.catalog
            .rules()
            .iter()
            .map(|r| r.concept.as_str())
            .collect()
    }

    /// Raw pattern list for a concept; `None` when the concept is unknown
    pub fn rules_for(&self, concept: &str) -> Option<Vec<&str>> {
        self.catalog.rule(concept).map(|r| r.pattern_sources())
    }
}

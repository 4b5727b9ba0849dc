//! Normalization Orchestrator
//!
//! Turns one batch of raw facts into a [`NormalizationReport`]: classify each
//! fact, score the mapping, keep the mapped ones in input order, and count
//! occurrences per concept.
//!
//! The pass is infallible. An unmapped fact is simply left out, and field
//! decoding problems were already absorbed when the fact was built.

use fac_types::{NormalizationReport, NormalizedConcept, RawFact, ReportMetadata};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::classifier::ConceptClassifier;
use crate::facts::RawFactRecord;

/// Batch normalizer over an injected classifier
#[derive(Debug, Clone)]
pub struct Normalizer {
    classifier: ConceptClassifier,
}

impl Normalizer {
    pub fn new(classifier: ConceptClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &ConceptClassifier {
        &self.classifier
    }

    /// Normalize a batch of decoded facts
    pub fn normalize(&self, facts: &[RawFact]) -> NormalizationReport {
        let mut concepts = Vec::new();
        let mut breakdown: BTreeMap<String, usize> = BTreeMap::new();

        for (index, fact) in facts.iter().enumerate() {
            let Some(concept) = self
                .classifier
                .classify(&fact.tag, fact.namespace.as_deref())
            else {
                debug!(index, tag = %fact.tag, "Fact not mapped to a FAC concept");
                continue;
            };

            let confidence = self.classifier.confidence(&fact.tag, concept);
            concepts.push(NormalizedConcept::from_fact(concept, fact, confidence));
            *breakdown.entry(concept.to_string()).or_insert(0) += 1;
        }

        let metadata = ReportMetadata {
            total_facts: facts.len(),
            normalized_concepts: concepts.len(),
            unique_concepts: breakdown.len(),
            concept_breakdown: breakdown,
        };

        info!(
            total = metadata.total_facts,
            mapped = metadata.normalized_concepts,
            distinct = metadata.unique_concepts,
            "Normalized fact batch"
        );

        NormalizationReport { concepts, metadata }
    }

    /// Decode upstream records field by field, then normalize them
    pub fn normalize_records(&self, records: Vec<RawFactRecord>) -> NormalizationReport {
        let facts: Vec<RawFact> = records.into_iter().map(RawFact::from).collect();
        self.normalize(&facts)
    }
}

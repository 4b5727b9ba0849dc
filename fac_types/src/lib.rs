//! FAC Types - Level 1 Foundation Types
//!
//! Pure data structures shared by the FAC normalization pipeline: the fact
//! records consumed from the extraction engine, the normalized concept records
//! produced by the pipeline, and the report envelopes that carry them.
//!
//! ## Architecture Level: LEVEL 1 (Foundation)
//!
//! This crate sits at the bottom of the workspace. `fac-normalizer` depends on
//! it; it depends on nothing in the workspace.
//!
//! ## Rules
//!
//! 1. **NO BUSINESS LOGIC** - classification and parsing live in `fac-normalizer`
//! 2. **CONSTRUCTORS AND ACCESSORS ONLY**
//! 3. **SERIALIZABLE** - every type supports serde
//! 4. **THREAD SAFE** - every type is `Send + Sync`

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Provenance tag stamped on every [`NormalizedConcept`] produced by the pipeline
pub const NORMALIZATION_SOURCE: &str = "fac-pattern-mapper";

// ============================================================================
// PERIODS
// ============================================================================

/// Period shape of a reported fact
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    /// Point-in-time value (balance sheet items)
    Instant,
    /// Value over a start/end range (income and cash-flow items)
    Duration,
    /// Context could not be resolved
    #[default]
    Unknown,
}

impl PeriodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Instant => "instant",
            PeriodKind::Duration => "duration",
            PeriodKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// INPUT: RAW FACTS
// ============================================================================

/// A fact as extracted from a filing, after per-field decoding.
///
/// Every optional field is independently absent: a value that could not be
/// parsed is `None`, it never invalidates the rest of the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFact {
    /// Local name of the taxonomy concept (e.g. `AssetsCurrent`). Empty means unclassifiable.
    #[serde(default)]
    pub tag: String,
    /// Taxonomy namespace URI the tag belongs to
    #[serde(default)]
    pub namespace: Option<String>,
    /// Numeric value, when the fact is numeric and parsable
    #[serde(default)]
    pub value: Option<f64>,
    /// Unit label (USD, shares, ...)
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub period_kind: PeriodKind,
    #[serde(default)]
    pub period_start: Option<NaiveDate>,
    #[serde(default)]
    pub period_end: Option<NaiveDate>,
    /// Originating context id, carried for traceability only
    #[serde(default)]
    pub context_id: Option<String>,
}

impl RawFact {
    /// Create a fact with just a tag and namespace
    pub fn new(tag: impl Into<String>, namespace: Option<&str>) -> Self {
        Self {
            tag: tag.into(),
            namespace: namespace.map(str::to_string),
            ..Default::default()
        }
    }

    /// Builder-style value setter
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    /// Builder-style unit setter
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Builder-style instant period setter
    pub fn at_instant(mut self, date: NaiveDate) -> Self {
        self.period_kind = PeriodKind::Instant;
        self.period_start = None;
        self.period_end = Some(date);
        self
    }

    /// Builder-style duration period setter
    pub fn over(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.period_kind = PeriodKind::Duration;
        self.period_start = Some(start);
        self.period_end = Some(end);
        self
    }

    /// Builder-style context setter
    pub fn with_context(mut self, context_id: impl Into<String>) -> Self {
        self.context_id = Some(context_id.into());
        self
    }

    /// True when the fact carries a tag at all; an empty tag is never classified
    pub fn has_tag(&self) -> bool {
        !self.tag.is_empty()
    }
}

// ============================================================================
// OUTPUT: NORMALIZED CONCEPTS
// ============================================================================

/// One fact mapped onto a canonical FAC concept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedConcept {
    /// Canonical concept name (e.g. `Revenue`)
    pub concept: String,
    pub value: Option<f64>,
    #[serde(rename = "period_type")]
    pub period_kind: PeriodKind,
    /// Context reference of the source fact, passed through untouched
    pub context_ref: Option<String>,
    pub unit: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Structural confidence of the mapping in [0.0, 1.0]
    pub quality_score: f64,
    /// Always [`NORMALIZATION_SOURCE`] for records built by the pipeline
    pub source: String,
}

impl NormalizedConcept {
    /// Build a normalized record from its source fact, copying the fact's fields verbatim
    pub fn from_fact(concept: impl Into<String>, fact: &RawFact, quality_score: f64) -> Self {
        Self {
            concept: concept.into(),
            value: fact.value,
            period_kind: fact.period_kind,
            context_ref: fact.context_id.clone(),
            unit: fact.unit.clone(),
            start_date: fact.period_start,
            end_date: fact.period_end,
            quality_score,
            source: NORMALIZATION_SOURCE.to_string(),
        }
    }
}

/// Aggregate statistics for one normalized batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Number of facts in the input batch
    pub total_facts: usize,
    /// Number of facts that mapped onto a concept
    pub normalized_concepts: usize,
    /// Number of distinct concepts hit
    pub unique_concepts: usize,
    /// Concept name -> occurrence count (sorted by name for stable output)
    pub concept_breakdown: BTreeMap<String, usize>,
}

/// Normalized output for one batch of facts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationReport {
    /// Mapped records, in the order of their source facts
    pub concepts: Vec<NormalizedConcept>,
    pub metadata: ReportMetadata,
}

impl NormalizationReport {
    pub fn total_facts(&self) -> usize {
        self.metadata.total_facts
    }

    pub fn mapped_count(&self) -> usize {
        self.metadata.normalized_concepts
    }

    pub fn distinct_concepts(&self) -> usize {
        self.metadata.unique_concepts
    }

    /// Occurrence count for one concept (0 when never hit)
    pub fn count_for(&self, concept: &str) -> usize {
        self.metadata
            .concept_breakdown
            .get(concept)
            .copied()
            .unwrap_or(0)
    }

    /// True when nothing in the batch mapped
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}

// ============================================================================
// FILING VALIDATION
// ============================================================================

/// Severity of a filing validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Info,
    Warning,
    Error,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationSeverity::Info => "info",
            ValidationSeverity::Warning => "warning",
            ValidationSeverity::Error => "error",
        }
    }
}

impl std::fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single filing-level validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Rule identifier (e.g. `DQC_CUSTOM_001`)
    pub rule_id: String,
    pub severity: ValidationSeverity,
    pub message: String,
    /// Concept the issue is about, if any
    pub affected_concept: Option<String>,
    /// Line in the source document, when the extractor reports one
    pub line_number: Option<u32>,
}

impl ValidationIssue {
    pub fn new(
        rule_id: impl Into<String>,
        severity: ValidationSeverity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            message: message.into(),
            affected_concept: None,
            line_number: None,
        }
    }

    pub fn with_concept(mut self, concept: impl Into<String>) -> Self {
        self.affected_concept = Some(concept.into());
        self
    }
}

/// Validation findings for one filing, bucketed by severity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub filing_url: String,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub info: Vec<ValidationIssue>,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
}

impl ValidationReport {
    pub fn new(filing_url: impl Into<String>) -> Self {
        Self {
            filing_url: filing_url.into(),
            ..Default::default()
        }
    }

    /// Add an issue to the bucket matching its severity
    pub fn push(&mut self, issue: ValidationIssue) {
        match issue.severity {
            ValidationSeverity::Error => {
                self.errors.push(issue);
                self.error_count = self.errors.len();
            }
            ValidationSeverity::Warning => {
                self.warnings.push(issue);
                self.warning_count = self.warnings.len();
            }
            ValidationSeverity::Info => {
                self.info.push(issue);
                self.info_count = self.info.len();
            }
        }
    }

    /// True when no errors were recorded (warnings are allowed)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_issues(&self) -> bool {
        !self.errors.is_empty() || !self.warnings.is_empty() || !self.info.is_empty()
    }
}

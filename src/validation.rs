//! Filing checks
//!
//! A few cheap sanity checks over a filing's extracted facts. This is separate
//! from classification and never influences it.

use fac_types::{ValidationIssue, ValidationReport, ValidationSeverity};
use tracing::info;

use crate::source::ExtractedFiling;

pub const RULE_EXTRACTION_ERROR: &str = "EXTRACTION_ERROR";
pub const RULE_NO_FACTS: &str = "DQC_CUSTOM_001";
pub const RULE_ASSETS_WITHOUT_LIABILITIES: &str = "DQC_CUSTOM_002";

#[derive(Debug, Clone, Copy, Default)]
pub struct FilingValidator;

impl FilingValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, filing: &ExtractedFiling) -> ValidationReport {
        let mut report = ValidationReport::new(filing.filing_url.clone());

        for error in &filing.errors {
            report.push(ValidationIssue::new(
                RULE_EXTRACTION_ERROR,
                ValidationSeverity::Error,
                error.clone(),
            ));
        }

        if filing.facts.is_empty() {
            report.push(ValidationIssue::new(
                RULE_NO_FACTS,
                ValidationSeverity::Warning,
                "No facts found in filing",
            ));
        }

        let tag_contains = |needle: &str| {
            filing
                .facts
                .iter()
                .filter_map(|f| f.concept.as_deref())
                .any(|tag| tag.contains(needle))
        };
        if tag_contains("Assets") && !tag_contains("Liabilities") {
            report.push(
                ValidationIssue::new(
                    RULE_ASSETS_WITHOUT_LIABILITIES,
                    ValidationSeverity::Warning,
                    "Assets reported but Liabilities missing",
                )
                .with_concept("Assets/Liabilities"),
            );
        }

        info!(
            filing_url = %filing.filing_url,
            errors = report.error_count,
            warnings = report.warning_count,
            "Filing validation complete"
        );
        report
    }
}

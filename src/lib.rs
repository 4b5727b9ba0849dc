//! FAC Normalizer - XBRL facts to Fundamental Accounting Concepts
//!
//! Maps raw taxonomy tags from an extracted filing (e.g. `AssetsCurrent`,
//! `RevenueFromContractWithCustomerExcludingAssessedTax`) onto a small fixed
//! set of canonical concepts (`CurrentAssets`, `Revenue`, ...) and aggregates
//! the mapped facts into a [`NormalizationReport`].
//!
//! ## Pipeline
//!
//! ```text
//! FactSource -> RawFactRecord -> RawFact -> ConceptClassifier -> Normalizer -> NormalizationReport
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use fac_normalizer::{ConceptClassifier, Normalizer, RawFact, RuleCatalog};
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(RuleCatalog::builtin().unwrap());
//! let normalizer = Normalizer::new(ConceptClassifier::new(catalog));
//!
//! let report = normalizer.normalize(&[
//!     RawFact::new("Assets", Some("http://fasb.org/us-gaap/2023")).with_value(352_583e6),
//!     RawFact::new("DocumentType", Some("http://xbrl.sec.gov/dei/2023")),
//! ]);
//! assert_eq!(report.mapped_count(), 1);
//! assert_eq!(report.concepts[0].concept, "Assets");
//! ```

// Errors
pub mod error;

// Rule catalog and classification
pub mod catalog;
pub mod classifier;

// Fact intake and batch normalization
pub mod facts;
pub mod normalizer;
pub mod source;
pub mod validation;

// Service plumbing
pub mod config;
pub mod telemetry;

#[cfg(feature = "server")]
pub mod api;

pub use catalog::{Anchoring, CatalogConfig, RuleCatalog};
pub use classifier::{ConceptClassifier, ConceptMatch};
pub use config::ServiceConfig;
pub use error::{CatalogError, ConfigError, FactSourceError};
pub use facts::RawFactRecord;
pub use normalizer::Normalizer;
pub use source::{ExtractedFiling, FactSource, HttpFactSource, InMemoryFactSource};
pub use validation::FilingValidator;

pub use fac_types;
pub use fac_types::{
    NormalizationReport, NormalizedConcept, PeriodKind, RawFact, ReportMetadata,
    ValidationIssue, ValidationReport, ValidationSeverity, NORMALIZATION_SOURCE,
};

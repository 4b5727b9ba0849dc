//! Integration tests: rule catalog loading and tag classification
//!
//! Run:
//! ```bash
//! cargo test --test catalog_rules
//! ```

use fac_normalizer::catalog::{CONTAINS_CONFIDENCE, EXACT_CONFIDENCE, PARTIAL_CONFIDENCE};
use fac_normalizer::classifier::MISMATCH_CONFIDENCE;
use fac_normalizer::{CatalogConfig, CatalogError, ConceptClassifier, RuleCatalog};
use proptest::prelude::*;
use std::io::Write;
use std::sync::Arc;

const US_GAAP: &str = "http://fasb.org/us-gaap/2023";

fn builtin_classifier() -> ConceptClassifier {
    ConceptClassifier::new(Arc::new(RuleCatalog::builtin().unwrap()))
}

fn classifier_from_yaml(yaml: &str) -> ConceptClassifier {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    let catalog = RuleCatalog::load(Some(file.path())).unwrap();
    ConceptClassifier::new(Arc::new(catalog))
}

// ============================================================================
// Catalog loading
// ============================================================================

#[test]
fn builtin_catalog_has_23_concepts_in_priority_order() {
    let catalog = RuleCatalog::builtin().unwrap();
    assert_eq!(catalog.len(), 23);
    assert_eq!(catalog.rules()[0].concept, "Revenue");
    assert_eq!(catalog.rules()[22].concept, "EPSDiluted");
    assert_eq!(catalog.namespace_markers(), &["us-gaap", "fasb"]);
}

#[test]
fn custom_catalog_order_sets_priority() {
    let yaml = r#"
version: "test"
namespace_markers: ["us-gaap"]
concepts:
  - concept: CapitalExpenditures
    patterns: ['^PaymentsToAcquirePropertyPlantAndEquipment']
  - concept: PropertyPlantEquipment
    patterns: ['.*PropertyPlantAndEquipment.*']
"#;
    let c = classifier_from_yaml(yaml);
    assert_eq!(c.catalog().version(), "test");
    assert_eq!(
        c.classify("PaymentsToAcquirePropertyPlantAndEquipment", None),
        Some("CapitalExpenditures")
    );

    // The built-in order puts PropertyPlantEquipment first
    assert_eq!(
        builtin_classifier().classify("PaymentsToAcquirePropertyPlantAndEquipment", None),
        Some("PropertyPlantEquipment")
    );
}

#[test]
fn custom_catalog_namespace_markers() {
    let yaml = r#"
version: "ifrs"
namespace_markers: ["ifrs-full"]
concepts:
  - concept: Revenue
    patterns: ['^Revenue$']
"#;
    let c = classifier_from_yaml(yaml);
    assert_eq!(
        c.classify("Revenue", Some("http://xbrl.ifrs.org/taxonomy/2023-03-23/ifrs-full")),
        Some("Revenue")
    );
    assert_eq!(c.classify("Revenue", Some(US_GAAP)), None);
}

#[test]
fn empty_pattern_list_is_not_not_found() {
    let yaml = r#"
version: "1"
namespace_markers: ["us-gaap"]
concepts:
  - concept: Placeholder
  - concept: Assets
    patterns: ['^Assets$']
"#;
    let c = classifier_from_yaml(yaml);
    assert_eq!(c.rules_for("Placeholder"), Some(vec![]));
    assert_eq!(c.rules_for("Missing"), None);
    assert_eq!(c.list_concepts(), vec!["Placeholder", "Assets"]);
    assert_eq!(c.classify("Assets", None), Some("Assets"));
}

#[test]
fn broken_catalogs_fail_to_load() {
    let bad_regex = r#"
version: "1"
namespace_markers: ["us-gaap"]
concepts:
  - concept: Revenue
    patterns: ['^Revenue(']
"#;
    let config = CatalogConfig::load_from_str(bad_regex).unwrap();
    let err = RuleCatalog::compile(&config).unwrap_err();
    assert!(matches!(err, CatalogError::InvalidPattern { .. }));

    let duplicate = r#"
version: "1"
namespace_markers: ["us-gaap"]
concepts:
  - concept: Revenue
    patterns: ['^Revenue']
  - concept: Revenue
    patterns: ['^Sales']
"#;
    let config = CatalogConfig::load_from_str(duplicate).unwrap();
    let err = RuleCatalog::compile(&config).unwrap_err();
    assert!(matches!(err, CatalogError::DuplicateConcept(ref name) if name == "Revenue"));

    let missing = RuleCatalog::load(Some(std::path::Path::new("/nonexistent/catalog.yaml")));
    assert!(matches!(missing, Err(CatalogError::Io { .. })));
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn classification_is_case_insensitive() {
    let c = builtin_classifier();
    assert_eq!(c.classify("assets", Some(US_GAAP)), Some("Assets"));
    assert_eq!(c.classify("REVENUES", Some(US_GAAP)), Some("Revenue"));
    assert_eq!(c.confidence("assets", "Assets"), EXACT_CONFIDENCE);
}

#[test]
fn namespace_match_is_case_insensitive_substring() {
    let c = builtin_classifier();
    assert_eq!(c.classify("Assets", Some("HTTP://FASB.ORG/US-GAAP/2024")), Some("Assets"));
    assert_eq!(c.classify("Assets", Some("http://xbrl.sec.gov/dei/2023")), None);
}

#[test]
fn empty_namespace_is_treated_as_absent() {
    let c = builtin_classifier();
    assert_eq!(c.classify("Assets", Some("")), Some("Assets"));
    assert_eq!(c.classify("Assets", Some("")), c.classify("Assets", None));
    assert_eq!(c.classify("DocumentType", Some("")), None);
}

#[test]
fn exact_patterns_do_not_match_longer_tags() {
    let c = builtin_classifier();
    // ^Assets$ must not swallow AssetsHeldForSale
    assert_eq!(c.classify("AssetsHeldForSale", None), None);
    assert_eq!(c.classify("AssetsNoncurrent", None), Some("NoncurrentAssets"));
}

#[test]
fn equity_catch_all() {
    let c = builtin_classifier();
    assert_eq!(
        c.classify("StockholdersEquityIncludingPortionAttributableToNoncontrollingInterest", None),
        Some("Equity")
    );
    assert_eq!(c.classify("LiabilitiesAndStockholdersEquity", None), Some("Equity"));
    assert_eq!(c.confidence("LiabilitiesAndStockholdersEquity", "Equity"), PARTIAL_CONFIDENCE);
}

#[test]
fn debt_contains_pattern() {
    let c = builtin_classifier();
    assert_eq!(c.classify("ConvertibleDebtNoncurrent", None), Some("Debt"));
    assert_eq!(c.confidence("ConvertibleDebtNoncurrent", "Debt"), CONTAINS_CONFIDENCE);
}

// ============================================================================
// Properties
// ============================================================================

fn arb_tag() -> impl Strategy<Value = String> {
    let fragments = prop::sample::select(vec![
        "Assets", "Liabilities", "Current", "Noncurrent", "Revenue", "Revenues", "Net",
        "Income", "Loss", "Cash", "And", "Equivalents", "Debt", "Equity", "Stockholders",
        "Goodwill", "Inventory", "Payments", "To", "Acquire", "Property", "Plant",
        "Equipment", "Sales", "Cost", "Of", "Earnings", "Per", "Share", "Basic", "Diluted",
    ]);
    prop::collection::vec(fragments, 1..5).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn classified_tags_score_an_anchoring_tier(tag in arb_tag()) {
        let c = builtin_classifier();
        if let Some(concept) = c.classify(&tag, Some(US_GAAP)) {
            let score = c.confidence(&tag, concept);
            prop_assert!(
                score == EXACT_CONFIDENCE
                    || score == PARTIAL_CONFIDENCE
                    || score == CONTAINS_CONFIDENCE,
                "tag {} -> {} scored {}", tag, concept, score
            );
            prop_assert_eq!(c.explain(&tag, Some(US_GAAP)).unwrap().confidence, score);
        }
    }

    #[test]
    fn confidence_is_bounded(tag in "\\PC{0,40}", concept_index in 0usize..23) {
        let c = builtin_classifier();
        let concept = c.list_concepts()[concept_index];
        let score = c.confidence(&tag, concept);
        prop_assert!((0.0..=1.0).contains(&score));
        if tag.is_empty() {
            prop_assert_eq!(score, 0.0);
        } else {
            prop_assert!(score >= MISMATCH_CONFIDENCE);
        }
    }

    #[test]
    fn foreign_namespaces_never_classify(tag in arb_tag(), host in "[a-z]{3,12}") {
        let c = builtin_classifier();
        let namespace = format!("http://{}.example.com/2023", host);
        prop_assume!(!namespace.contains("fasb") && !namespace.contains("us-gaap"));
        prop_assert_eq!(c.classify(&tag, Some(&namespace)), None);
    }

    #[test]
    fn arbitrary_tags_never_panic(tag in "\\PC{0,64}") {
        let c = builtin_classifier();
        let _ = c.classify(&tag, None);
        let _ = c.classify(&tag, Some(US_GAAP));
    }
}

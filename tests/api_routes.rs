//! Integration tests: REST API routes
//!
//! Run:
//! ```bash
//! cargo test --test api_routes
//! ```

#![cfg(feature = "server")]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use fac_normalizer::api::{create_router, AppState};
use fac_normalizer::{
    ConceptClassifier, ExtractedFiling, FactSource, FactSourceError, InMemoryFactSource,
    Normalizer, RuleCatalog,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const FILING_URL: &str = "https://www.sec.gov/Archives/edgar/data/320193/aapl-20230930_htm.xml";

fn base_state() -> AppState {
    AppState::new(Normalizer::new(ConceptClassifier::new(Arc::new(
        RuleCatalog::builtin().unwrap(),
    ))))
}

fn sample_filing() -> ExtractedFiling {
    serde_json::from_str(include_str!("fixtures/sample_facts.json")).unwrap()
}

fn app_with_source(source: Arc<dyn FactSource>) -> Router {
    create_router(base_state().with_source(source))
}

/// Parse response body as JSON.
async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), 1_000_000)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Failed to parse JSON")
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    (status, body_json(resp).await)
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    (status, body_json(resp).await)
}

/// Fact source whose engine is always down
struct FailingSource;

#[async_trait]
impl FactSource for FailingSource {
    fn source_id(&self) -> &'static str {
        "failing"
    }

    async fn extract(&self, _filing_url: &str) -> Result<ExtractedFiling, FactSourceError> {
        Err(FactSourceError::Upstream {
            status: 500,
            body: "engine crashed".to_string(),
        })
    }
}

// ============================================================================
// Health and catalog introspection
// ============================================================================

#[tokio::test]
async fn health_reports_degraded_without_source() {
    let (status, body) = get(create_router(base_state()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["catalog_version"], "1.0");
    assert_eq!(body["concept_count"], 23);
    assert!(body["fact_source"].is_null());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn health_reports_healthy_with_source() {
    let app = app_with_source(Arc::new(InMemoryFactSource::new()));
    let (_, body) = get(app, "/health").await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["fact_source"], "in-memory");
}

#[tokio::test]
async fn concepts_listed_in_catalog_order() {
    let (status, body) = get(create_router(base_state()), "/concepts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 23);
    assert_eq!(body["concepts"][0], "Revenue");
    assert_eq!(body["concepts"][22], "EPSDiluted");
    assert!(body["description"].as_str().unwrap().contains("FAC"));
}

#[tokio::test]
async fn concept_patterns_found_and_missing() {
    let (status, body) = get(create_router(base_state()), "/concepts/Assets/patterns").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["concept"], "Assets");
    assert_eq!(body["patterns"], json!(["^Assets$", "^TotalAssets$"]));
    assert_eq!(body["pattern_count"], 2);

    let (status, body) = get(create_router(base_state()), "/concepts/Goodwill/patterns").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Concept 'Goodwill' not found");
}

// ============================================================================
// Normalization
// ============================================================================

#[tokio::test]
async fn normalize_inline_facts() {
    let filing = sample_filing();
    let (status, body) = post_json(
        create_router(base_state()),
        "/normalize",
        json!({
            "filing_url": filing.filing_url,
            "cik": "0000320193",
            "accession_no": "0000320193-23-000106",
            "facts": filing.facts,
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cik"], "0000320193");
    assert_eq!(body["accession_no"], "0000320193-23-000106");
    assert_eq!(body["concept_count"], 7);
    assert_eq!(body["metadata"]["total_facts"], 10);
    assert_eq!(body["metadata"]["unique_concepts"], 6);
    assert_eq!(body["metadata"]["concept_breakdown"]["Assets"], 2);
    assert_eq!(body["concepts"][0]["concept"], "Revenue");
    assert_eq!(body["concepts"][0]["source"], "fac-pattern-mapper");
    assert!(body["request_id"].is_string());
    assert!(body["processing_time_ms"].is_u64());
}

#[tokio::test]
async fn normalize_through_fact_source() {
    let filing = sample_filing();
    let url = filing.filing_url.clone();
    let app = app_with_source(Arc::new(InMemoryFactSource::new().with_filing(filing)));

    let (status, body) =
        post_json(app, "/normalize", json!({ "filing_url": url, "cik": "320193" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["concept_count"], 7);
    assert!(body["accession_no"].is_null());
}

#[tokio::test]
async fn normalize_error_statuses() {
    // Unparsable URL
    let (status, body) = post_json(
        create_router(base_state()),
        "/normalize",
        json!({ "filing_url": "not a url", "cik": "1", "facts": [] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("filing_url"));

    // No facts and no source
    let (status, _) = post_json(
        create_router(base_state()),
        "/normalize",
        json!({ "filing_url": FILING_URL, "cik": "1" }),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    // Source cannot load the filing
    let (status, body) = post_json(
        app_with_source(Arc::new(InMemoryFactSource::new())),
        "/normalize",
        json!({ "filing_url": FILING_URL, "cik": "1" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["detail"],
        format!("Failed to load XBRL instance from {}", FILING_URL)
    );

    // Engine failure
    let (status, body) = post_json(
        app_with_source(Arc::new(FailingSource)),
        "/normalize",
        json!({ "filing_url": FILING_URL, "cik": "1" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["detail"].as_str().unwrap().contains("engine crashed"));
}

#[tokio::test]
async fn normalize_tolerates_wrongly_typed_fields() {
    let (status, body) = post_json(
        create_router(base_state()),
        "/normalize",
        json!({
            "filing_url": FILING_URL,
            "cik": "1",
            "facts": [
                { "concept": "Assets", "value": 1 },
                { "concept": "Liabilities", "context_ref": 42 },
                { "concept": "Revenues", "start_date": 20230101 }
            ],
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["concept_count"], 3);
    assert_eq!(body["metadata"]["total_facts"], 3);
    assert!(body["concepts"][1]["context_ref"].is_null());
    assert!(body["concepts"][2]["start_date"].is_null());
}

#[tokio::test]
async fn normalize_empty_batch() {
    let (status, body) = post_json(
        create_router(base_state()),
        "/normalize",
        json!({ "filing_url": FILING_URL, "cik": "1", "facts": [] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["concept_count"], 0);
    assert_eq!(body["concepts"], json!([]));
    assert_eq!(body["metadata"]["concept_breakdown"], json!({}));
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn validate_flags_missing_liabilities() {
    let (status, body) = post_json(
        create_router(base_state()),
        "/validate",
        json!({
            "filing_url": FILING_URL,
            "facts": [{ "concept": "Assets", "value": 10 }],
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filing_url"], FILING_URL);
    assert_eq!(body["warning_count"], 1);
    assert_eq!(body["warnings"][0]["rule_id"], "DQC_CUSTOM_002");
    assert_eq!(body["warnings"][0]["severity"], "warning");
    assert_eq!(body["warnings"][0]["affected_concept"], "Assets/Liabilities");
    assert_eq!(body["error_count"], 0);
    assert!(body["processing_time_ms"].is_u64());
}

#[tokio::test]
async fn validate_empty_filing() {
    let (status, body) = post_json(
        create_router(base_state()),
        "/validate",
        json!({ "filing_url": FILING_URL, "facts": [] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["warnings"][0]["rule_id"], "DQC_CUSTOM_001");
}

//! Route handlers for the normalizer API

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use fac_types::{NormalizedConcept, ReportMetadata, ValidationReport};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use super::AppState;
use crate::facts::{lenient_optional_records, RawFactRecord};
use crate::source::ExtractedFiling;

const CONCEPTS_DESCRIPTION: &str =
    "Fundamental Accounting Concepts (FAC) supported by this service";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            detail: detail.into(),
        }),
    )
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub catalog_version: String,
    pub concept_count: usize,
    /// Identifier of the configured fact source, if any
    pub fact_source: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NormalizeRequest {
    pub filing_url: String,
    pub cik: String,
    #[serde(default)]
    pub accession_no: Option<String>,
    /// Pre-extracted facts; when absent the configured fact source is asked
    #[serde(default, deserialize_with = "lenient_optional_records")]
    pub facts: Option<Vec<RawFactRecord>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NormalizeResponse {
    pub request_id: Uuid,
    pub filing_url: String,
    pub cik: String,
    pub accession_no: Option<String>,
    pub concepts: Vec<NormalizedConcept>,
    pub metadata: ReportMetadata,
    pub processing_time_ms: u64,
    pub concept_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub filing_url: String,
    #[serde(default, deserialize_with = "lenient_optional_records")]
    pub facts: Option<Vec<RawFactRecord>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateResponse {
    #[serde(flatten)]
    pub report: ValidationReport,
    pub processing_time_ms: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConceptListResponse {
    pub concepts: Vec<String>,
    pub count: usize,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConceptPatternsResponse {
    pub concept: String,
    pub patterns: Vec<String>,
    pub pattern_count: usize,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /health
pub(super) async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let catalog = state.normalizer.classifier().catalog();
    let fact_source = state.source.as_ref().map(|s| s.source_id().to_string());
    let status = if fact_source.is_some() {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        catalog_version: catalog.version().to_string(),
        concept_count: catalog.len(),
        fact_source,
        timestamp: Utc::now(),
    })
}

/// POST /normalize
/// Map a filing's facts onto FAC concepts
pub(super) async fn normalize_filing(
    State(state): State<AppState>,
    Json(req): Json<NormalizeRequest>,
) -> Result<Json<NormalizeResponse>, ApiError> {
    let started = Instant::now();
    let request_id = Uuid::new_v4();

    let filing = acquire_filing(&state, &req.filing_url, req.facts).await?;
    let report = state.normalizer.normalize_records(filing.facts);

    info!(
        %request_id,
        filing_url = %req.filing_url,
        cik = %req.cik,
        mapped = report.mapped_count(),
        "Normalization request complete"
    );

    Ok(Json(NormalizeResponse {
        request_id,
        filing_url: req.filing_url,
        cik: req.cik,
        accession_no: req.accession_no,
        concept_count: report.concepts.len(),
        concepts: report.concepts,
        metadata: report.metadata,
        processing_time_ms: elapsed_ms(started),
    }))
}

/// POST /validate
/// Run the filing-level sanity checks
pub(super) async fn validate_filing(
    State(state): State<AppState>,
    Json(req): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let started = Instant::now();

    let filing = acquire_filing(&state, &req.filing_url, req.facts).await?;
    let report = state.validator.validate(&filing);

    Ok(Json(ValidateResponse {
        report,
        processing_time_ms: elapsed_ms(started),
    }))
}

/// GET /concepts
pub(super) async fn list_concepts(State(state): State<AppState>) -> Json<ConceptListResponse> {
    let concepts: Vec<String> = state
        .normalizer
        .classifier()
        .list_concepts()
        .into_iter()
        .map(String::from)
        .collect();

    Json(ConceptListResponse {
        count: concepts.len(),
        concepts,
        description: CONCEPTS_DESCRIPTION.to_string(),
    })
}

/// GET /concepts/:concept/patterns
pub(super) async fn concept_patterns(
    State(state): State<AppState>,
    Path(concept): Path<String>,
) -> Result<Json<ConceptPatternsResponse>, ApiError> {
    let patterns: Vec<String> = state
        .normalizer
        .classifier()
        .rules_for(&concept)
        .ok_or_else(|| {
            api_error(
                StatusCode::NOT_FOUND,
                format!("Concept '{}' not found", concept),
            )
        })?
        .into_iter()
        .map(String::from)
        .collect();

    Ok(Json(ConceptPatternsResponse {
        pattern_count: patterns.len(),
        patterns,
        concept,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

/// Facts for a request: inline when supplied, otherwise from the fact source
async fn acquire_filing(
    state: &AppState,
    filing_url: &str,
    inline_facts: Option<Vec<RawFactRecord>>,
) -> Result<ExtractedFiling, ApiError> {
    Url::parse(filing_url).map_err(|e| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("Invalid filing_url '{}': {}", filing_url, e),
        )
    })?;

    if let Some(facts) = inline_facts {
        return Ok(ExtractedFiling::new(filing_url, facts));
    }

    let source = state.source.as_ref().ok_or_else(|| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "No fact source configured; supply facts inline",
        )
    })?;

    source.extract(filing_url).await.map_err(|e| {
        warn!(filing_url, source = source.source_id(), error = %e, "Fact extraction failed");
        if e.is_rejection() {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("Failed to load XBRL instance from {}", filing_url),
            )
        } else {
            api_error(StatusCode::BAD_GATEWAY, e.to_string())
        }
    })
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

//! REST API for the normalizer
//!
//! Thin axum transport over [`Normalizer`] and [`FilingValidator`]. Request
//! ids and timings are added to the response envelopes here and never leak
//! into the normalization report itself.

mod routes;

pub use routes::{
    ConceptListResponse, ConceptPatternsResponse, ErrorBody, HealthResponse, NormalizeRequest,
    NormalizeResponse, ValidateRequest, ValidateResponse,
};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::normalizer::Normalizer;
use crate::source::FactSource;
use crate::validation::FilingValidator;

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub normalizer: Arc<Normalizer>,
    pub validator: FilingValidator,
    /// Extraction engine; `None` means requests must carry their facts inline
    pub source: Option<Arc<dyn FactSource>>,
}

impl AppState {
    pub fn new(normalizer: Normalizer) -> Self {
        Self {
            normalizer: Arc::new(normalizer),
            validator: FilingValidator::new(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: Arc<dyn FactSource>) -> Self {
        self.source = Some(source);
        self
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health_check))
        .route("/normalize", post(routes::normalize_filing))
        .route("/validate", post(routes::validate_filing))
        .route("/concepts", get(routes::list_concepts))
        .route("/concepts/:concept/patterns", get(routes::concept_patterns))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

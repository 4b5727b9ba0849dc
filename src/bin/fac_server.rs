//! FAC normalization HTTP server
//!
//! ```bash
//! FAC_EXTRACTOR_URL=http://localhost:8000 cargo run --bin fac_server
//! ```

use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};

use fac_normalizer::{
    api::{create_router, AppState},
    telemetry, ConceptClassifier, HttpFactSource, Normalizer, RuleCatalog, ServiceConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    telemetry::init_tracing(telemetry::DEFAULT_DIRECTIVES);

    let config = ServiceConfig::from_env().context("Invalid service configuration")?;

    // A broken catalog is fatal before anything is served
    let catalog = RuleCatalog::load(config.catalog_path.as_deref())
        .context("Failed to load FAC rule catalog")?;
    info!(
        version = catalog.version(),
        concepts = catalog.len(),
        "Rule catalog loaded"
    );

    let normalizer = Normalizer::new(ConceptClassifier::new(Arc::new(catalog)));
    let mut state = AppState::new(normalizer);

    match &config.extractor_url {
        Some(url) => {
            let source = HttpFactSource::new(url, config.extractor_timeout)
                .context("Failed to create extraction engine client")?;
            state = state.with_source(Arc::new(source));
        }
        None => warn!("FAC_EXTRACTOR_URL not set; only requests with inline facts will succeed"),
    }

    let app = create_router(state);

    let addr = config.bind_addr();
    info!("Starting FAC normalization server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

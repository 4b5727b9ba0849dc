//! Extraction engine HTTP client
//!
//! Posts `{ "filing_url": ... }` to `<base>/extract` and decodes the returned
//! [`ExtractedFiling`]. Loading a large filing can take minutes, so the
//! timeout is configurable.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::{ExtractedFiling, FactSource};
use crate::error::FactSourceError;

const USER_AGENT: &str = concat!("fac-normalizer/", env!("CARGO_PKG_VERSION"));

#[derive(Serialize)]
struct ExtractRequest<'a> {
    filing_url: &'a str,
}

/// Fact source calling a remote extraction engine
pub struct HttpFactSource {
    http: Client,
    extract_url: Url,
}

impl HttpFactSource {
    /// Create a client for the engine rooted at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FactSourceError> {
        let extract_url = extract_endpoint(base_url)?;

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        info!(endpoint = %extract_url, ?timeout, "Extraction engine client ready");
        Ok(Self { http, extract_url })
    }

    pub fn endpoint(&self) -> &Url {
        &self.extract_url
    }
}

#[async_trait]
impl FactSource for HttpFactSource {
    fn source_id(&self) -> &'static str {
        "extraction-engine"
    }

    async fn extract(&self, filing_url: &str) -> Result<ExtractedFiling, FactSourceError> {
        debug!(filing_url, endpoint = %self.extract_url, "Requesting fact extraction");

        let response = self
            .http
            .post(self.extract_url.clone())
            .json(&ExtractRequest { filing_url })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(200)
                .collect();

            return Err(match status {
                StatusCode::BAD_REQUEST
                | StatusCode::NOT_FOUND
                | StatusCode::UNPROCESSABLE_ENTITY => FactSourceError::Rejected {
                    filing_url: filing_url.to_string(),
                    reason: body,
                },
                _ => FactSourceError::Upstream {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        let filing: ExtractedFiling = response.json().await?;
        debug!(
            filing_url,
            facts = filing.facts.len(),
            errors = filing.errors.len(),
            "Extraction complete"
        );
        Ok(filing)
    }
}

/// `<base>/extract`, tolerating a base with or without a trailing slash
fn extract_endpoint(base_url: &str) -> Result<Url, FactSourceError> {
    let invalid = |source| FactSourceError::InvalidUrl {
        url: base_url.to_string(),
        source,
    };

    let mut base = Url::parse(base_url).map_err(invalid)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("extract").map_err(invalid)
}

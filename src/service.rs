//! HTTP client for the external analysis service.
//!
//! The projection math lives in a separate local service; this module only
//! speaks its JSON protocol:
//!
//! - `GET /health` — availability probe before a run
//! - `POST /process` — note payloads + settings in, projection result out
//! - `POST /generate_connection` — connection context in, description out
//!
//! Capability traits (`ProjectionService`, `DescriptionGenerator`) decouple
//! the session and review workflow from the concrete HTTP client so tests
//! can inject mocks.

use crate::models::{AnalysisSettings, NoteInput, ProjectionResult};
use serde_json::{json, Value};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Default base URL of the local analysis service.
pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:1234";

/// Timeout for the health probe and description generation.
const SHORT_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for a full t-SNE run over up to 200 notes.
const PROCESS_TIMEOUT: Duration = Duration::from_secs(120);

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone)]
pub enum ServiceError {
    /// Connection refused or the health probe failed; the run aborts with
    /// remediation instructions.
    Unavailable(String),
    /// Non-OK HTTP status or an `{error}` payload from the service.
    Server(String),
    /// Response body did not match the expected shape.
    InvalidResponse(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Unavailable(msg) => write!(f, "Analysis service unavailable: {}", msg),
            ServiceError::Server(msg) => write!(f, "Analysis service error: {}", msg),
            ServiceError::InvalidResponse(msg) => {
                write!(f, "Unexpected response from analysis service: {}", msg)
            }
        }
    }
}

impl std::error::Error for ServiceError {}

// ============================================================================
// Capability Traits
// ============================================================================

/// Runs the projection/analysis pipeline for a set of notes.
pub trait ProjectionService {
    fn health_check(&self) -> impl Future<Output = Result<(), ServiceError>> + Send;

    fn process(
        &self,
        notes: &[NoteInput],
        settings: &AnalysisSettings,
    ) -> impl Future<Output = Result<ProjectionResult, ServiceError>> + Send;
}

/// Context for one generated connection description.
#[derive(Debug, Clone, Default)]
pub struct DescriptionRequest {
    pub source_title: String,
    pub source_content: String,
    pub source_terms: Vec<String>,
    pub target_title: String,
    pub target_content: String,
    pub target_terms: Vec<String>,
    pub common_terms: Vec<String>,
    pub cluster_terms: Vec<String>,
}

/// Produces a short textual description of why two notes relate. Failures
/// are expected and degrade to a local template in the review workflow.
pub trait DescriptionGenerator {
    fn generate(
        &self,
        request: &DescriptionRequest,
    ) -> impl Future<Output = Result<String, ServiceError>> + Send;
}

// ============================================================================
// HTTP Implementation
// ============================================================================

/// Client for the local analysis service.
#[derive(Debug, Clone)]
pub struct HttpAnalysisService {
    base_url: Url,
}

impl HttpAnalysisService {
    /// Validates and stores the base URL. Trailing slashes are tolerated.
    pub fn new(base_url: &str) -> Result<Self, ServiceError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ServiceError::InvalidResponse(format!("Invalid service URL: {}", e)))?;
        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    fn client(timeout: Duration) -> Result<reqwest::Client, ServiceError> {
        reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Unavailable(e.to_string()))
    }
}

impl Default for HttpAnalysisService {
    fn default() -> Self {
        // The default URL is a compile-time constant and always parses.
        Self::new(DEFAULT_SERVICE_URL).expect("default service URL is valid")
    }
}

impl ProjectionService for HttpAnalysisService {
    async fn health_check(&self) -> Result<(), ServiceError> {
        let client = Self::client(SHORT_TIMEOUT)?;
        let response = client
            .get(self.endpoint("/health"))
            .send()
            .await
            .map_err(|e| ServiceError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ServiceError::Unavailable(format!(
                "health check returned status {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn process(
        &self,
        notes: &[NoteInput],
        settings: &AnalysisSettings,
    ) -> Result<ProjectionResult, ServiceError> {
        let client = Self::client(PROCESS_TIMEOUT)?;
        let body = build_process_body(notes, settings);

        let response = client
            .post(self.endpoint("/process"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ServiceError::Server(format!(
                "server responded with status {}",
                response.status()
            )));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;

        // The service reports its own failures as an error payload.
        if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
            return Err(ServiceError::Server(message.to_string()));
        }

        serde_json::from_value(value).map_err(|e| ServiceError::InvalidResponse(e.to_string()))
    }
}

impl DescriptionGenerator for HttpAnalysisService {
    async fn generate(&self, request: &DescriptionRequest) -> Result<String, ServiceError> {
        let client = Self::client(SHORT_TIMEOUT)?;
        let body = build_generation_body(request);

        let response = client
            .post(self.endpoint("/generate_connection"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ServiceError::Server(format!(
                "server responded with status {}",
                response.status()
            )));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;

        value
            .get("description")
            .and_then(|d| d.as_str())
            .map(|d| d.to_string())
            .ok_or_else(|| {
                ServiceError::InvalidResponse("missing description field".to_string())
            })
    }
}

// ============================================================================
// Request Bodies
// ============================================================================

fn build_process_body(notes: &[NoteInput], settings: &AnalysisSettings) -> Value {
    json!({
        "notes": notes,
        "settings": {
            "perplexity": settings.perplexity,
            "iterations": settings.iterations,
            "learning_rate": settings.epsilon,
        },
    })
}

fn build_generation_body(request: &DescriptionRequest) -> Value {
    json!({
        "source_note": {
            "title": request.source_title,
            "content": request.source_content,
            "terms": request.source_terms,
        },
        "target_note": {
            "title": request.target_title,
            "content": request.target_content,
            "terms": request.target_terms,
        },
        "common_terms": request.common_terms,
        "cluster_terms": request.cluster_terms,
    })
}

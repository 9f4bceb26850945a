//! notemap: interactive 2D map of a note collection.
//!
//! Notes are projected into 2D by an external t-SNE analysis service and
//! rendered as an interactive point cloud with cluster halos, hover
//! tooltips, and pan/zoom. A discovery engine mines the projection for
//! likely connections between notes, and a review workflow lets the user
//! accept a connection and write it back into the source note as a
//! markdown link.
//!
//! Module map:
//!
//! - `models` — shared data types (projection results, connections, settings)
//! - `geometry` — projection-space to screen-space view transform
//! - `proximity` — seed-relative proximity grouping for the overlay
//! - `surface` / `renderer` — drawing abstraction and the point-cloud view
//! - `discovery` — connection candidate generation and ranking
//! - `workflow` — browse / generate-description / commit-link review loop
//! - `service` — HTTP client for the analysis service
//! - `vault` — note storage capability and ingestion rules

pub mod discovery;
pub mod geometry;
pub mod models;
pub mod proximity;
pub mod renderer;
pub mod service;
pub mod surface;
pub mod vault;
pub mod workflow;

use models::{AnalysisSettings, NoteConnection, ProjectionResult};
use service::{ProjectionService, ServiceError};
use std::fmt;
use vault::NoteRepository;

/// Upper bound on notes per analysis run.
pub const MAX_NOTES: usize = 200;

/// Shown alongside connection failures to tell the user how to recover.
const SERVICE_HINT: &str =
    "Make sure the analysis service is running (see the service README) and try again";

// ============================================================================
// Status Notices
// ============================================================================

/// Transient status notices shown to the user during long operations.
pub trait Notifier {
    fn notice(&self, message: &str);
}

/// Notifier that prints to stdout, for headless runs.
#[derive(Debug, Default)]
pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notice(&self, message: &str) {
        println!("{}", message);
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone)]
pub enum AnalysisError {
    /// Note enumeration or read failed before the service was contacted.
    Vault(String),
    Service(ServiceError),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::Vault(msg) => write!(f, "Vault error: {}", msg),
            AnalysisError::Service(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AnalysisError {}

impl From<ServiceError> for AnalysisError {
    fn from(e: ServiceError) -> Self {
        AnalysisError::Service(e)
    }
}

// ============================================================================
// Session
// ============================================================================

/// One analysis session: settings plus the latest projection result. The
/// result is replaced wholesale by each run; the renderer and discovery
/// engine read from it but never mutate it.
pub struct Session<P: ProjectionService> {
    service: P,
    settings: AnalysisSettings,
    result: Option<ProjectionResult>,
}

impl<P: ProjectionService> Session<P> {
    pub fn new(service: P, settings: AnalysisSettings) -> Self {
        Self {
            service,
            settings: settings.clamped(),
            result: None,
        }
    }

    pub fn settings(&self) -> AnalysisSettings {
        self.settings
    }

    pub fn update_settings(&mut self, settings: AnalysisSettings) {
        self.settings = settings.clamped();
    }

    pub fn result(&self) -> Option<&ProjectionResult> {
        self.result.as_ref()
    }

    /// Run the full analysis pipeline: gather notes, probe the service,
    /// send the payload, and store the projection result.
    pub async fn run_analysis<R, N>(
        &mut self,
        repo: &R,
        notifier: &N,
    ) -> Result<&ProjectionResult, AnalysisError>
    where
        R: NoteRepository,
        N: Notifier,
    {
        notifier.notice("Gathering notes...");
        let notes = repo.collect_notes(MAX_NOTES).map_err(AnalysisError::Vault)?;
        if notes.is_empty() {
            return Err(AnalysisError::Vault("No notes found to analyze".to_string()));
        }

        // Probe before shipping the payload so connection failures surface
        // with remediation instead of a mid-run timeout.
        if let Err(e) = self.service.health_check().await {
            return Err(AnalysisError::Service(ServiceError::Unavailable(format!(
                "{}. {}",
                e, SERVICE_HINT
            ))));
        }

        notifier.notice(&format!(
            "Running t-SNE analysis on {} notes (perplexity={}, iterations={})...",
            notes.len(),
            self.settings.perplexity,
            self.settings.iterations
        ));

        let result = self.service.process(&notes, &self.settings).await?;
        notifier.notice(&format!(
            "Analysis complete: {} points in {} clusters",
            result.points.len(),
            result.clusters
        ));

        Ok(self.result.insert(result))
    }

    /// Ranked connection suggestions for the current result; empty when no
    /// analysis has run yet.
    pub fn suggest_connections(&self) -> Vec<NoteConnection> {
        self.result
            .as_ref()
            .map(discovery::suggest_connections)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{NoteInput, ProjectedPoint};
    use std::sync::Mutex;

    struct MockService {
        healthy: bool,
        result: ProjectionResult,
        seen_notes: Mutex<usize>,
    }

    impl MockService {
        fn healthy(result: ProjectionResult) -> Self {
            Self {
                healthy: true,
                result,
                seen_notes: Mutex::new(0),
            }
        }

        fn down() -> Self {
            Self {
                healthy: false,
                result: ProjectionResult::default(),
                seen_notes: Mutex::new(0),
            }
        }
    }

    impl ProjectionService for MockService {
        async fn health_check(&self) -> Result<(), ServiceError> {
            if self.healthy {
                Ok(())
            } else {
                Err(ServiceError::Unavailable("connection refused".to_string()))
            }
        }

        async fn process(
            &self,
            notes: &[NoteInput],
            _settings: &AnalysisSettings,
        ) -> Result<ProjectionResult, ServiceError> {
            *self.seen_notes.lock().unwrap() = notes.len();
            Ok(self.result.clone())
        }
    }

    struct MockRepo {
        count: usize,
    }

    impl NoteRepository for MockRepo {
        fn collect_notes(&self, limit: usize) -> Result<Vec<NoteInput>, String> {
            Ok((0..self.count.min(limit))
                .map(|i| {
                    vault::note_input_from_content(
                        &format!("note-{}.md", i),
                        &format!("Note {}", i),
                        "content",
                        0,
                        0,
                    )
                })
                .collect())
        }

        fn read_note(&self, path: &str) -> Result<String, String> {
            Err(format!("{} not found", path))
        }

        fn write_note(&self, _path: &str, _content: &str) -> Result<(), String> {
            Ok(())
        }

        fn open_note(&self, _path: &str, _split: bool) -> Result<(), String> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockNotifier {
        notices: Mutex<Vec<String>>,
    }

    impl Notifier for MockNotifier {
        fn notice(&self, message: &str) {
            self.notices.lock().unwrap().push(message.to_string());
        }
    }

    fn mock_result() -> ProjectionResult {
        ProjectionResult {
            points: vec![ProjectedPoint {
                x: 0.0,
                y: 0.0,
                title: "A".to_string(),
                path: "a.md".to_string(),
                top_terms: Vec::new(),
                cluster: 0,
                mtime: None,
                ctime: None,
                word_count: None,
                reading_time: None,
                tags: None,
                content_preview: None,
                distance_to_center: None,
            }],
            feature_names: Vec::new(),
            clusters: 1,
            cluster_terms: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_run_analysis_stores_result() {
        let mut session =
            Session::new(MockService::healthy(mock_result()), AnalysisSettings::default());
        let notifier = MockNotifier::default();

        let result = session
            .run_analysis(&MockRepo { count: 3 }, &notifier)
            .await
            .unwrap();
        assert_eq!(result.points.len(), 1);
        assert!(session.result().is_some());

        let notices = notifier.notices.lock().unwrap();
        assert!(notices.iter().any(|n| n.contains("perplexity=30")));
    }

    #[tokio::test]
    async fn test_run_analysis_caps_note_count() {
        let service = MockService::healthy(mock_result());
        let mut session = Session::new(service, AnalysisSettings::default());
        let notifier = MockNotifier::default();

        session
            .run_analysis(&MockRepo { count: 500 }, &notifier)
            .await
            .unwrap();
        assert_eq!(*session.service.seen_notes.lock().unwrap(), MAX_NOTES);
    }

    #[tokio::test]
    async fn test_run_analysis_aborts_when_service_down() {
        let mut session = Session::new(MockService::down(), AnalysisSettings::default());
        let notifier = MockNotifier::default();

        let err = session
            .run_analysis(&MockRepo { count: 3 }, &notifier)
            .await
            .unwrap_err();
        match err {
            AnalysisError::Service(ServiceError::Unavailable(msg)) => {
                assert!(msg.contains("try again"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(session.result().is_none());
    }

    #[tokio::test]
    async fn test_run_analysis_rejects_empty_vault() {
        let mut session =
            Session::new(MockService::healthy(mock_result()), AnalysisSettings::default());
        let notifier = MockNotifier::default();

        let err = session
            .run_analysis(&MockRepo { count: 0 }, &notifier)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Vault(_)));
    }

    #[test]
    fn test_session_clamps_settings() {
        let session = Session::new(
            MockService::down(),
            AnalysisSettings {
                perplexity: 500,
                iterations: 1,
                epsilon: 0,
            },
        );
        let s = session.settings();
        assert_eq!((s.perplexity, s.iterations, s.epsilon), (100, 250, 1));
    }
}

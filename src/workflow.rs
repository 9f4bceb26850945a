//! Connection review workflow.
//!
//! Steps through the discovery engine's ranked candidates one at a time:
//! browse the list, request a generated description for the selected
//! connection, then commit an accepted link into the source note. The flow
//! is strictly sequential; the `processing` flag enforces a single in-flight
//! description generation, and the UI is expected to disable the trigger
//! while it is set.

use crate::models::NoteConnection;
use crate::service::{DescriptionGenerator, DescriptionRequest};
use crate::vault::NoteRepository;
use crate::Notifier;
use std::fmt;

/// Characters of note content sent as context for description generation.
const GENERATION_CONTEXT_CHARS: usize = 1000;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone)]
pub enum WorkflowError {
    /// Commit was attempted with an empty (after trimming) description.
    EmptyDescription,
    /// No connection is selected.
    NothingSelected,
    NoteRead(String),
    NoteWrite(String),
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowError::EmptyDescription => write!(f, "Description cannot be empty"),
            WorkflowError::NothingSelected => write!(f, "No connection selected"),
            WorkflowError::NoteRead(msg) => write!(f, "Could not read note: {}", msg),
            WorkflowError::NoteWrite(msg) => write!(f, "Could not write note: {}", msg),
        }
    }
}

impl std::error::Error for WorkflowError {}

// ============================================================================
// Workflow
// ============================================================================

pub struct ReviewWorkflow {
    connections: Vec<NoteConnection>,
    selected: usize,
    processing: bool,
}

impl ReviewWorkflow {
    pub fn new(connections: Vec<NoteConnection>) -> Self {
        Self {
            connections,
            selected: 0,
            processing: false,
        }
    }

    pub fn connections(&self) -> &[NoteConnection] {
        &self.connections
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_connection(&self) -> Option<&NoteConnection> {
        self.connections.get(self.selected)
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// Select a connection by index. Out-of-range selections are ignored;
    /// returns whether the selection changed state.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.connections.len() {
            self.selected = index;
            true
        } else {
            false
        }
    }

    /// Generate a description for the selected connection and store it on
    /// the connection. Reads both notes' opening content as context. A
    /// failing generator degrades silently to the local template; a failing
    /// note read surfaces a notice and leaves the connection untouched.
    ///
    /// No-op while a generation is already in flight.
    pub async fn generate_description<R, G, N>(
        &mut self,
        repo: &R,
        generator: &G,
        notifier: &N,
    ) -> Option<String>
    where
        R: NoteRepository,
        G: DescriptionGenerator,
        N: Notifier,
    {
        if self.processing {
            return None;
        }
        let connection = self.connections.get(self.selected)?.clone();
        self.processing = true;

        let result = Self::run_generation(&connection, repo, generator).await;
        self.processing = false;

        match result {
            Ok(description) => {
                if let Some(c) = self.connections.get_mut(self.selected) {
                    c.llm_description = Some(description.clone());
                }
                Some(description)
            }
            Err(e) => {
                notifier.notice(&e.to_string());
                None
            }
        }
    }

    async fn run_generation<R, G>(
        connection: &NoteConnection,
        repo: &R,
        generator: &G,
    ) -> Result<String, WorkflowError>
    where
        R: NoteRepository,
        G: DescriptionGenerator,
    {
        let source_content = repo
            .read_note(&connection.source_note.path)
            .map_err(WorkflowError::NoteRead)?;
        let target_content = repo
            .read_note(&connection.target_note.path)
            .map_err(WorkflowError::NoteRead)?;

        let request = DescriptionRequest {
            source_title: connection.source_note.title.clone(),
            source_content: truncate_chars(&source_content, GENERATION_CONTEXT_CHARS),
            source_terms: connection.source_note.top_terms.clone(),
            target_title: connection.target_note.title.clone(),
            target_content: truncate_chars(&target_content, GENERATION_CONTEXT_CHARS),
            target_terms: connection.target_note.top_terms.clone(),
            common_terms: connection.common_terms.clone(),
            cluster_terms: connection.cluster_terms.clone(),
        };

        // Generation failures degrade silently to the deterministic
        // template; only note I/O failures surface to the user.
        Ok(match generator.generate(&request).await {
            Ok(description) => description,
            Err(_) => fallback_description(
                &connection.source_note.title,
                &connection.target_note.title,
                &connection.common_terms,
                &connection.cluster_terms,
            ),
        })
    }

    /// Commit a link for the selected connection: append a markdown link
    /// section to the source note, persist it, and open the source note.
    /// `open_target` additionally opens the target in a split pane.
    ///
    /// Empty descriptions are rejected with a notice and no state change.
    pub fn commit_link<R, N>(
        &self,
        repo: &R,
        notifier: &N,
        description: &str,
        open_target: bool,
    ) -> Result<(), WorkflowError>
    where
        R: NoteRepository,
        N: Notifier,
    {
        let description = description.trim();
        if description.is_empty() {
            notifier.notice("Description cannot be empty");
            return Err(WorkflowError::EmptyDescription);
        }

        let connection = self
            .selected_connection()
            .ok_or(WorkflowError::NothingSelected)?;
        let source_path = &connection.source_note.path;

        let content = match repo.read_note(source_path) {
            Ok(c) => c,
            Err(e) => {
                notifier.notice(&format!("Could not read note: {}", e));
                return Err(WorkflowError::NoteRead(e));
            }
        };

        let updated = format!(
            "{}{}",
            content,
            link_section(&connection.target_note.title, description)
        );
        if let Err(e) = repo.write_note(source_path, &updated) {
            notifier.notice(&format!("Could not write note: {}", e));
            return Err(WorkflowError::NoteWrite(e));
        }

        let _ = repo.open_note(source_path, false);
        if open_target {
            let _ = repo.open_note(&connection.target_note.path, true);
        }

        notifier.notice(&format!(
            "Linked \"{}\" to \"{}\"",
            connection.source_note.title, connection.target_note.title
        ));
        Ok(())
    }
}

// ============================================================================
// Link Formatting
// ============================================================================

/// Markdown section appended to the source note for an accepted link.
pub fn link_section(target_title: &str, description: &str) -> String {
    format!(
        "\n\n## Related Notes\n\n- [[{}]] - {}\n",
        target_title, description
    )
}

/// Deterministic local template used when the description service is
/// unreachable or responds with an error.
pub fn fallback_description(
    source_title: &str,
    target_title: &str,
    common_terms: &[String],
    cluster_terms: &[String],
) -> String {
    let mut description = format!(
        "\"{}\" and \"{}\" appear to be related",
        source_title, target_title
    );
    if !common_terms.is_empty() {
        description.push_str(&format!(", sharing the terms: {}", common_terms.join(", ")));
    }
    if !cluster_terms.is_empty() {
        description.push_str(&format!(
            ", in a cluster about: {}",
            cluster_terms.join(", ")
        ));
    }
    description.push('.');
    description
}

fn truncate_chars(content: &str, limit: usize) -> String {
    content.chars().take(limit).collect()
}

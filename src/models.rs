//! Data models for the note map engine.
//!
//! This module contains the core data structures shared across the crate:
//! projection results received from the analysis service, per-note input
//! payloads sent to it, candidate connections produced by the discovery
//! engine, and the persisted analysis settings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Projection Results
// ============================================================================

/// A single note placed in 2D projection space by the analysis service.
///
/// Identity within one `ProjectionResult` is positional: the renderer and
/// discovery engine refer to points by index into `ProjectionResult::points`.
/// Cluster id -1 means noise / not clustered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
    pub title: String,
    /// Stable note identifier (vault-relative path).
    pub path: String,
    #[serde(default)]
    pub top_terms: Vec<String>,
    #[serde(default = "default_cluster")]
    pub cluster: i32,

    // Optional metadata echoed back by the service; surfaced in the tooltip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtime: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctime: Option<i64>,
    #[serde(rename = "wordCount", default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u64>,
    #[serde(rename = "readingTime", default, skip_serializing_if = "Option::is_none")]
    pub reading_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(rename = "contentPreview", default, skip_serializing_if = "Option::is_none")]
    pub content_preview: Option<String>,
    #[serde(rename = "distanceToCenter", default, skip_serializing_if = "Option::is_none")]
    pub distance_to_center: Option<f64>,
}

fn default_cluster() -> i32 {
    -1
}

impl ProjectedPoint {
    /// Euclidean distance to another point in projection space.
    pub fn distance_to(&self, other: &ProjectedPoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// One weighted term describing a cluster, ordered descending by relevance
/// in `ProjectionResult::cluster_terms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterTermEntry {
    pub term: String,
    pub score: f64,
}

/// Full output of one analysis run. Replaced wholesale on each new run,
/// never mutated in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectionResult {
    #[serde(default)]
    pub points: Vec<ProjectedPoint>,
    #[serde(default)]
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub clusters: i32,
    /// Keyed by cluster id rendered as a decimal string (JSON object keys).
    #[serde(default)]
    pub cluster_terms: HashMap<String, Vec<ClusterTermEntry>>,
}

impl ProjectionResult {
    /// Top-`n` term strings for a cluster, or empty if the cluster has no
    /// term entry.
    pub fn terms_for_cluster(&self, cluster: i32, n: usize) -> Vec<String> {
        self.cluster_terms
            .get(&cluster.to_string())
            .map(|entries| entries.iter().take(n).map(|e| e.term.clone()).collect())
            .unwrap_or_default()
    }

    /// Comma-joined top-3 terms used for halo labels and tooltip text.
    pub fn cluster_label_terms(&self, cluster: i32) -> String {
        self.terms_for_cluster(cluster, 3).join(", ")
    }
}

// ============================================================================
// Note Input
// ============================================================================

/// Per-note payload sent to the analysis service's `/process` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteInput {
    pub path: String,
    pub title: String,
    pub content: String,
    pub mtime: i64,
    pub ctime: i64,
    #[serde(rename = "wordCount")]
    pub word_count: u64,
    #[serde(rename = "readingTime")]
    pub reading_time: u64,
    pub tags: Vec<String>,
    #[serde(rename = "contentPreview")]
    pub content_preview: String,
}

// ============================================================================
// Candidate Connections
// ============================================================================

/// A proposed link between two notes, produced by the discovery engine and
/// carried through the review workflow. `llm_description` is filled in when
/// the user requests a generated description.
#[derive(Debug, Clone)]
pub struct NoteConnection {
    pub source_note: ProjectedPoint,
    pub target_note: ProjectedPoint,
    /// 0-100, higher is more similar.
    pub similarity: f64,
    /// Terms shared by both notes, in the source note's term order.
    pub common_terms: Vec<String>,
    /// Top terms of the shared cluster (central-pair candidates only).
    pub cluster_terms: Vec<String>,
    pub reason: String,
    pub llm_description: Option<String>,
}

// ============================================================================
// Analysis Settings
// ============================================================================

/// Persisted t-SNE settings. `epsilon` is the learning rate and is sent to
/// the service under the `learning_rate` key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AnalysisSettings {
    pub perplexity: u32,
    pub iterations: u32,
    pub epsilon: u32,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            perplexity: 30,
            iterations: 1000,
            epsilon: 10,
        }
    }
}

impl AnalysisSettings {
    /// Clamp each field into its valid range. Applied when settings are
    /// loaded from an untrusted blob.
    pub fn clamped(self) -> Self {
        Self {
            perplexity: self.perplexity.clamp(5, 100),
            iterations: self.iterations.clamp(250, 2000),
            epsilon: self.epsilon.clamp(1, 100),
        }
    }
}

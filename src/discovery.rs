//! Connection discovery engine.
//!
//! Given a full projection result, proposes a ranked list of note pairs
//! worth linking. Two independent candidate passes feed the ranking:
//!
//! - Central pairing: the most central members of each semantic cluster,
//!   paired when close enough in projection space.
//! - Cross-cluster pairing: points near each other despite belonging to
//!   different clusters, required to share at least one keyword.
//!
//! Candidates from both passes are concatenated, sorted descending by
//! similarity, and truncated to the top 10. The passes are not deduplicated
//! against each other by default; `DiscoveryOptions::dedupe` opts in to
//! collapsing repeated pairs.

use crate::models::{NoteConnection, ProjectedPoint, ProjectionResult};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

/// Maximum number of connections returned to the UI.
pub const MAX_CONNECTIONS: usize = 10;

/// Central members considered per cluster.
pub const CENTRAL_MEMBERS_PER_CLUSTER: usize = 3;

/// Maximum projection-space distance for a central pair.
pub const CENTRAL_PAIR_MAX_DISTANCE: f64 = 0.5;

/// Maximum projection-space distance for a cross-cluster pair.
pub const CROSS_CLUSTER_MAX_DISTANCE: f64 = 0.2;

#[derive(Debug, Clone, Copy, Default)]
pub struct DiscoveryOptions {
    /// Collapse repeated unordered pairs after ranking, keeping the
    /// highest-similarity entry. Off by default: both passes contribute
    /// independently.
    pub dedupe: bool,
}

/// Propose up to 10 connections, ranked descending by similarity.
pub fn suggest_connections(result: &ProjectionResult) -> Vec<NoteConnection> {
    suggest_connections_with(result, DiscoveryOptions::default())
}

pub fn suggest_connections_with(
    result: &ProjectionResult,
    options: DiscoveryOptions,
) -> Vec<NoteConnection> {
    let mut candidates = central_pair_candidates(result);
    candidates.extend(cross_cluster_candidates(result));

    // Stable sort keeps concatenation order among equal similarities.
    candidates.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });

    if options.dedupe {
        candidates = dedupe_pairs(candidates);
    }

    candidates.truncate(MAX_CONNECTIONS);
    candidates
}

// ============================================================================
// Pass A: Central Pairing
// ============================================================================

fn central_pair_candidates(result: &ProjectionResult) -> Vec<NoteConnection> {
    // Group point indices by semantic cluster id, excluding noise.
    let mut by_cluster: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (i, point) in result.points.iter().enumerate() {
        if point.cluster != -1 {
            by_cluster.entry(point.cluster).or_default().push(i);
        }
    }

    let mut connections = Vec::new();

    for (cluster_id, mut members) in by_cluster {
        if members.len() < 2 {
            continue;
        }

        // Most central first; missing distance sorts last.
        members.sort_by(|&a, &b| {
            let da = result.points[a].distance_to_center.unwrap_or(f64::INFINITY);
            let db = result.points[b].distance_to_center.unwrap_or(f64::INFINITY);
            da.partial_cmp(&db).unwrap_or(Ordering::Equal)
        });
        members.truncate(CENTRAL_MEMBERS_PER_CLUSTER);

        let cluster_terms = result.terms_for_cluster(cluster_id, 5);

        for i in 0..members.len() {
            for j in (i + 1)..members.len() {
                let source = &result.points[members[i]];
                let target = &result.points[members[j]];
                let distance = source.distance_to(target);
                if distance > CENTRAL_PAIR_MAX_DISTANCE {
                    continue;
                }

                connections.push(NoteConnection {
                    source_note: source.clone(),
                    target_note: target.clone(),
                    similarity: 100.0 - (distance * 100.0).min(100.0),
                    common_terms: common_terms(source, target),
                    cluster_terms: cluster_terms.clone(),
                    reason: format!("Both notes are central in cluster {}", cluster_id),
                    llm_description: None,
                });
            }
        }
    }

    connections
}

// ============================================================================
// Pass B: Cross-Cluster Pairing
// ============================================================================

fn cross_cluster_candidates(result: &ProjectionResult) -> Vec<NoteConnection> {
    let points = &result.points;
    let mut connections = Vec::new();

    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            let source = &points[i];
            let target = &points[j];

            // Same-cluster pairs are the central pass's territory; two
            // noise points may still pair here.
            if source.cluster == target.cluster && source.cluster != -1 {
                continue;
            }

            let distance = source.distance_to(target);
            if distance > CROSS_CLUSTER_MAX_DISTANCE {
                continue;
            }

            // This pass requires lexical evidence.
            let shared = common_terms(source, target);
            if shared.is_empty() {
                continue;
            }

            connections.push(NoteConnection {
                source_note: source.clone(),
                target_note: target.clone(),
                similarity: 100.0 - (distance * 200.0).min(100.0),
                common_terms: shared,
                cluster_terms: Vec::new(),
                reason: "Notes are very close in the visualization and share common terms"
                    .to_string(),
                llm_description: None,
            });
        }
    }

    connections
}

// ============================================================================
// Helpers
// ============================================================================

/// Terms present in both notes, preserving the source note's order.
fn common_terms(source: &ProjectedPoint, target: &ProjectedPoint) -> Vec<String> {
    source
        .top_terms
        .iter()
        .filter(|t| target.top_terms.contains(t))
        .cloned()
        .collect()
}

/// Drop later entries for an unordered pair already seen. Input must be
/// sorted by rank so the kept entry is the best one.
fn dedupe_pairs(connections: Vec<NoteConnection>) -> Vec<NoteConnection> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    connections
        .into_iter()
        .filter(|c| {
            let mut key = (c.source_note.path.clone(), c.target_note.path.clone());
            if key.1 < key.0 {
                key = (key.1, key.0);
            }
            seen.insert(key)
        })
        .collect()
}

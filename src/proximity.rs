//! Proximity grouping over projected points.
//!
//! A single-pass grouping that collects points geometrically close in the
//! current projection, independent of the semantic cluster ids assigned by
//! the analysis service. Each unvisited point seeds a group and pulls in
//! every other unvisited point within the distance threshold of the seed
//! (not chained transitively through intermediates). Groups of size 1 are
//! discarded.
//!
//! The halo draw path in `renderer` groups by the service's cluster field,
//! not by this output; this computation is retained as an informational
//! overlay input (see `PointCloudRenderer::proximity_groups`).

use crate::models::ProjectedPoint;

/// Projection-space distance under which two points join the same group.
pub const GROUP_DISTANCE_THRESHOLD: f64 = 0.2;

/// Group nearby points, returning groups of indices into `points`.
/// O(n²) by design; input is capped at 200 notes per session.
pub fn proximity_groups(points: &[ProjectedPoint]) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut visited = vec![false; points.len()];

    for i in 0..points.len() {
        if visited[i] {
            continue;
        }

        let mut group = vec![i];
        visited[i] = true;

        for j in 0..points.len() {
            if i == j || visited[j] {
                continue;
            }
            if points[i].distance_to(&points[j]) < GROUP_DISTANCE_THRESHOLD {
                group.push(j);
                visited[j] = true;
            }
        }

        if group.len() > 1 {
            groups.push(group);
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_point(x: f64, y: f64) -> ProjectedPoint {
        ProjectedPoint {
            x,
            y,
            title: "T".to_string(),
            path: "t.md".to_string(),
            top_terms: Vec::new(),
            cluster: -1,
            mtime: None,
            ctime: None,
            word_count: None,
            reading_time: None,
            tags: None,
            content_preview: None,
            distance_to_center: None,
        }
    }

    #[test]
    fn test_close_points_form_one_group() {
        let points = vec![
            mock_point(0.0, 0.0),
            mock_point(0.1, 0.0),
            mock_point(0.0, 0.1),
        ];
        let groups = proximity_groups(&points);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0], vec![0, 1, 2]);
    }

    #[test]
    fn test_singletons_are_dropped() {
        let points = vec![mock_point(0.0, 0.0), mock_point(10.0, 10.0)];
        assert!(proximity_groups(&points).is_empty());
    }

    #[test]
    fn test_grouping_is_seed_relative_not_transitive() {
        // 0 and 1 are within the threshold of each other; 2 is within the
        // threshold of 1 but not of the seed 0, so it stays outside.
        let points = vec![
            mock_point(0.0, 0.0),
            mock_point(0.15, 0.0),
            mock_point(0.3, 0.0),
        ];
        let groups = proximity_groups(&points);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0], vec![0, 1]);
    }

    #[test]
    fn test_threshold_is_strict() {
        let points = vec![mock_point(0.0, 0.0), mock_point(0.2, 0.0)];
        assert!(proximity_groups(&points).is_empty());
    }

    #[test]
    fn test_two_separate_groups() {
        let points = vec![
            mock_point(0.0, 0.0),
            mock_point(0.1, 0.0),
            mock_point(5.0, 5.0),
            mock_point(5.1, 5.0),
        ];
        let groups = proximity_groups(&points);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], vec![0, 1]);
        assert_eq!(groups[1], vec![2, 3]);
    }
}

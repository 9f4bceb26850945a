//! Interactive point-cloud renderer.
//!
//! Draws one projection result under the current camera state and owns the
//! interaction loop: pointer move/drag, wheel zoom, hover tracking, and
//! click-to-open. Rendering goes through the `DrawSurface` trait so the
//! same layout logic runs headlessly in tests.
//!
//! Render pass order matters for occlusion and must stay: background grid,
//! cluster halos with labels, points, then the tooltip for the hovered
//! point.

use crate::geometry::ViewTransform;
use crate::models::{ProjectedPoint, ProjectionResult};
use crate::proximity::proximity_groups;
use crate::surface::{CursorStyle, DrawSurface, TextAlign};

// ============================================================================
// Constants
// ============================================================================

pub const CANVAS_WIDTH: f64 = 800.0;
pub const CANVAS_HEIGHT: f64 = 600.0;
pub const POINT_RADIUS: f64 = 10.0;

const GRID_BASE_SPACING: f64 = 50.0;
const HALO_PADDING: f64 = 20.0;
const HALO_CORNER_RADIUS: f64 = 10.0;
const TOOLTIP_CORNER_RADIUS: f64 = 5.0;
const TOOLTIP_LINE_HEIGHT: f64 = 18.0;
const TOOLTIP_EDGE_MARGIN: f64 = 10.0;
/// Tooltip width never exceeds this fraction of the canvas width.
const TOOLTIP_MAX_WIDTH_FRACTION: f64 = 0.8;

/// Point fill colors, cycled by `cluster % len`.
const POINT_PALETTE: [&str; 7] = [
    "rgba(255, 99, 132, 1)",
    "rgba(54, 162, 235, 1)",
    "rgba(255, 206, 86, 1)",
    "rgba(75, 192, 192, 1)",
    "rgba(153, 102, 255, 1)",
    "rgba(255, 159, 64, 1)",
    "rgba(199, 199, 199, 1)",
];

/// Halo (fill, stroke) pairs, cycled the same way as the point palette.
const HALO_PALETTE: [(&str, &str); 7] = [
    ("rgba(255, 99, 132, 0.1)", "rgba(255, 99, 132, 0.5)"),
    ("rgba(54, 162, 235, 0.1)", "rgba(54, 162, 235, 0.5)"),
    ("rgba(255, 206, 86, 0.1)", "rgba(255, 206, 86, 0.5)"),
    ("rgba(75, 192, 192, 0.1)", "rgba(75, 192, 192, 0.5)"),
    ("rgba(153, 102, 255, 0.1)", "rgba(153, 102, 255, 0.5)"),
    ("rgba(255, 159, 64, 0.1)", "rgba(255, 159, 64, 0.5)"),
    ("rgba(199, 199, 199, 0.1)", "rgba(199, 199, 199, 0.5)"),
];

/// Theme color tokens, interpreted by the surface backend.
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: &'static str,
    pub muted: &'static str,
    pub background: &'static str,
    pub text: &'static str,
    pub grid: &'static str,
    pub tooltip_fill: &'static str,
    pub tooltip_stroke: &'static str,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: "var(--interactive-accent)",
            muted: "var(--text-muted)",
            background: "var(--background-primary)",
            text: "var(--text-normal)",
            grid: "rgba(var(--background-modifier-border-rgb), 0.3)",
            tooltip_fill: "rgba(255, 255, 255, 0.95)",
            tooltip_stroke: "rgba(150, 150, 160, 0.8)",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RendererOptions {
    /// Pick the nearest hit instead of the first in point order. The
    /// first-match behavior is order-dependent for overlapping points and
    /// is kept as the default for compatibility.
    pub nearest_match_hit_testing: bool,
}

// ============================================================================
// Renderer
// ============================================================================

pub struct PointCloudRenderer<S: DrawSurface> {
    surface: S,
    width: f64,
    height: f64,
    result: Option<ProjectionResult>,
    view: ViewTransform,
    mouse_x: f64,
    mouse_y: f64,
    dragging: bool,
    last_x: f64,
    last_y: f64,
    hovered: Option<usize>,
    /// Proximity overlay groups from the last draw. Computed every frame
    /// but not consumed by the halo pass, which groups by the service's
    /// cluster id instead; kept available for inspection.
    last_proximity_groups: Vec<Vec<usize>>,
    theme: Theme,
    options: RendererOptions,
    on_open: Box<dyn Fn(&str)>,
}

impl<S: DrawSurface> PointCloudRenderer<S> {
    pub fn new(surface: S, on_open: Box<dyn Fn(&str)>) -> Self {
        Self::with_size(surface, on_open, CANVAS_WIDTH, CANVAS_HEIGHT)
    }

    pub fn with_size(surface: S, on_open: Box<dyn Fn(&str)>, width: f64, height: f64) -> Self {
        Self {
            surface,
            width,
            height,
            result: None,
            view: ViewTransform::default(),
            mouse_x: 0.0,
            mouse_y: 0.0,
            dragging: false,
            last_x: 0.0,
            last_y: 0.0,
            hovered: None,
            last_proximity_groups: Vec::new(),
            theme: Theme::default(),
            options: RendererOptions::default(),
            on_open,
        }
    }

    pub fn set_options(&mut self, options: RendererOptions) {
        self.options = options;
    }

    /// Replace the projection result, reset the camera, and redraw.
    pub fn set_data(&mut self, result: ProjectionResult) {
        self.result = Some(result);
        self.hovered = None;
        self.view.reset();
        self.draw();
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    pub fn hovered_index(&self) -> Option<usize> {
        self.hovered
    }

    pub fn hovered_path(&self) -> Option<&str> {
        let idx = self.hovered?;
        let result = self.result.as_ref()?;
        result.points.get(idx).map(|p| p.path.as_str())
    }

    /// Groups from the proximity overlay computed during the last draw.
    pub fn proximity_groups(&self) -> &[Vec<usize>] {
        &self.last_proximity_groups
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    // ------------------------------------------------------------------
    // Event handling
    // ------------------------------------------------------------------

    pub fn handle_mouse_move(&mut self, x: f64, y: f64) {
        self.mouse_x = x;
        self.mouse_y = y;

        if self.dragging {
            let dx = self.mouse_x - self.last_x;
            let dy = self.mouse_y - self.last_y;
            self.view.pan(dx, dy);
            self.last_x = self.mouse_x;
            self.last_y = self.mouse_y;
            self.draw();
        } else {
            self.update_hovered_point();
            self.draw();
        }
    }

    pub fn handle_mouse_down(&mut self) {
        self.dragging = true;
        self.last_x = self.mouse_x;
        self.last_y = self.mouse_y;
        self.surface.set_cursor(CursorStyle::Grabbing);
    }

    /// Also used for mouse-leave: ends any drag and restores the cursor
    /// from the current hover state.
    pub fn handle_mouse_up(&mut self) {
        self.dragging = false;
        let cursor = if self.hovered.is_some() {
            CursorStyle::Pointer
        } else {
            CursorStyle::Default
        };
        self.surface.set_cursor(cursor);
    }

    /// Wheel zoom: scroll down (positive delta) zooms out by 0.9, scroll
    /// up zooms in by 1.1, clamped in the view transform. The host is
    /// responsible for suppressing default page scrolling.
    pub fn handle_wheel(&mut self, delta_y: f64) {
        let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
        self.view.zoom(factor);
        self.draw();
    }

    /// Open the hovered note, if any.
    pub fn handle_click(&mut self) {
        if let Some(path) = self.hovered_path().map(|p| p.to_string()) {
            (self.on_open)(&path);
        }
    }

    /// Forward-transform every point and pick the one under the cursor.
    /// Default is first match in point order, not nearest.
    fn update_hovered_point(&mut self) {
        let result = match &self.result {
            Some(r) => r,
            None => return,
        };

        self.hovered = None;
        let mut best: Option<(usize, f64)> = None;

        for (i, point) in result.points.iter().enumerate() {
            let (sx, sy) = self.view.to_screen(point.x, point.y, self.width, self.height);
            let distance = ((sx - self.mouse_x).powi(2) + (sy - self.mouse_y).powi(2)).sqrt();
            if distance <= POINT_RADIUS {
                if self.options.nearest_match_hit_testing {
                    if best.map_or(true, |(_, d)| distance < d) {
                        best = Some((i, distance));
                    }
                } else {
                    best = Some((i, distance));
                    break;
                }
            }
        }

        if let Some((i, _)) = best {
            self.hovered = Some(i);
            self.surface.set_cursor(CursorStyle::Pointer);
            return;
        }

        let cursor = if self.dragging {
            CursorStyle::Grabbing
        } else {
            CursorStyle::Default
        };
        self.surface.set_cursor(cursor);
    }

    // ------------------------------------------------------------------
    // Render pass
    // ------------------------------------------------------------------

    pub fn draw(&mut self) {
        let result = match &self.result {
            Some(r) => r,
            None => return,
        };
        let surface = &mut self.surface;

        surface.clear(self.width, self.height);

        draw_grid(surface, &self.view, self.width, self.height, &self.theme);

        // Proximity overlay: computed per frame, informational only; halos
        // below group by the semantic cluster ids.
        self.last_proximity_groups = proximity_groups(&result.points);

        draw_cluster_halos(surface, result, &self.view, self.width, self.height, &self.theme);

        for (i, point) in result.points.iter().enumerate() {
            draw_point(
                surface,
                point,
                self.hovered == Some(i),
                &self.view,
                self.width,
                self.height,
                &self.theme,
            );
        }

        if let Some(idx) = self.hovered {
            if let Some(point) = result.points.get(idx) {
                draw_tooltip(
                    surface,
                    point,
                    result,
                    &self.view,
                    self.width,
                    self.height,
                    &self.theme,
                );
            }
        }
    }
}

// ============================================================================
// Grid
// ============================================================================

fn draw_grid<S: DrawSurface>(
    surface: &mut S,
    view: &ViewTransform,
    width: f64,
    height: f64,
    theme: &Theme,
) {
    let grid_size = GRID_BASE_SPACING * view.scale;

    let mut x = view.offset_x % grid_size;
    while x < width {
        surface.stroke_line(x, 0.0, x, height, theme.grid, 1.0);
        x += grid_size;
    }

    let mut y = view.offset_y % grid_size;
    while y < height {
        surface.stroke_line(0.0, y, width, y, theme.grid, 1.0);
        y += grid_size;
    }
}

// ============================================================================
// Cluster Halos
// ============================================================================

fn draw_cluster_halos<S: DrawSurface>(
    surface: &mut S,
    result: &ProjectionResult,
    view: &ViewTransform,
    width: f64,
    height: f64,
    theme: &Theme,
) {
    // Group by the service-assigned cluster id, skipping noise. BTreeMap
    // keeps the draw order stable across frames.
    let mut groups: std::collections::BTreeMap<i32, Vec<&ProjectedPoint>> =
        std::collections::BTreeMap::new();
    for point in &result.points {
        if point.cluster == -1 {
            continue;
        }
        groups.entry(point.cluster).or_default().push(point);
    }

    for (cluster_id, members) in groups {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        let mut sum_x = 0.0;

        for point in &members {
            let (sx, sy) = view.to_screen(point.x, point.y, width, height);
            min_x = min_x.min(sx);
            min_y = min_y.min(sy);
            max_x = max_x.max(sx);
            max_y = max_y.max(sy);
            sum_x += sx;
        }

        let center_x = sum_x / members.len() as f64;

        min_x -= HALO_PADDING;
        min_y -= HALO_PADDING;
        max_x += HALO_PADDING;
        max_y += HALO_PADDING;

        let (fill, stroke) = HALO_PALETTE[cluster_id as usize % HALO_PALETTE.len()];
        surface.round_rect(
            min_x,
            min_y,
            max_x - min_x,
            max_y - min_y,
            HALO_CORNER_RADIUS,
            fill,
            stroke,
            1.0,
        );

        let terms = result.cluster_label_terms(cluster_id);
        if !terms.is_empty() {
            surface.fill_text(
                &format!("Cluster {}: {}", cluster_id, terms),
                center_x,
                min_y - 5.0,
                "bold 12px sans-serif",
                theme.text,
                TextAlign::Center,
            );
        }
    }
}

// ============================================================================
// Points
// ============================================================================

fn draw_point<S: DrawSurface>(
    surface: &mut S,
    point: &ProjectedPoint,
    hovered: bool,
    view: &ViewTransform,
    width: f64,
    height: f64,
    theme: &Theme,
) {
    let (x, y) = view.to_screen(point.x, point.y, width, height);

    let fill = if hovered {
        theme.accent
    } else if point.cluster == -1 {
        theme.muted
    } else {
        POINT_PALETTE[point.cluster as usize % POINT_PALETTE.len()]
    };

    surface.fill_circle(x, y, POINT_RADIUS, fill, theme.background, 1.0);

    // The hovered point's title moves into the tooltip.
    if !hovered {
        surface.fill_text(
            &point.title,
            x,
            y - POINT_RADIUS - 5.0,
            "12px sans-serif",
            theme.text,
            TextAlign::Center,
        );
    }
}

// ============================================================================
// Tooltip
// ============================================================================

struct TooltipLine {
    text: String,
    font: &'static str,
    color: &'static str,
}

/// Assemble the tooltip's visible lines for one point. The title is always
/// present; every other section appears only when it has content.
fn tooltip_lines(point: &ProjectedPoint, result: &ProjectionResult) -> Vec<TooltipLine> {
    let mut lines = Vec::new();

    lines.push(TooltipLine {
        text: point.title.clone(),
        font: "bold 14px sans-serif",
        color: "#333333",
    });

    if !point.path.is_empty() {
        lines.push(TooltipLine {
            text: point.path.clone(),
            font: "italic 11px sans-serif",
            color: "#444444",
        });
    }

    if !point.top_terms.is_empty() {
        lines.push(TooltipLine {
            text: format!("Keywords: {}", point.top_terms.join(", ")),
            font: "12px sans-serif",
            color: "#444444",
        });
    }

    let cluster_info = if point.cluster == -1 {
        "Not clustered".to_string()
    } else {
        format!(
            "Cluster {}: {}",
            point.cluster,
            result.cluster_label_terms(point.cluster)
        )
    };
    lines.push(TooltipLine {
        text: format!("Cluster: {}", cluster_info),
        font: "12px sans-serif",
        color: "#444444",
    });

    // Tags and word-count stats share one info line.
    let tags = point
        .tags
        .as_ref()
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.iter()
                .map(|tag| format!("#{}", tag))
                .collect::<Vec<_>>()
                .join(" ")
        });
    let word_count = point.word_count.map(|w| format!("{} words", w));
    let stats = match (&word_count, point.reading_time) {
        (Some(w), Some(r)) => Some(format!("{} (~{} min read)", w, r)),
        (Some(w), None) => Some(w.clone()),
        _ => None,
    };
    let info = [tags, stats]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" \u{2022} ");
    if !info.is_empty() {
        lines.push(TooltipLine {
            text: format!("Info: {}", info),
            font: "12px sans-serif",
            color: "#444444",
        });
    }

    if let Some(mtime) = point.mtime {
        let mut dates = format!("Modified: {}", format_timestamp(mtime));
        if let Some(ctime) = point.ctime {
            dates.push_str(&format!(" \u{2022} Created: {}", format_timestamp(ctime)));
        }
        lines.push(TooltipLine {
            text: dates,
            font: "11px sans-serif",
            color: "#444444",
        });
    }

    if let Some(preview) = point.content_preview.as_ref().filter(|p| p.len() >= 5) {
        lines.push(TooltipLine {
            text: format!("Preview: {}", preview),
            font: "italic 11px sans-serif",
            color: "#666666",
        });
    }

    if let (Some(distance), true) = (point.distance_to_center, point.cluster != -1) {
        lines.push(TooltipLine {
            text: format!("Distance to center: {:.2}", distance),
            font: "10px sans-serif",
            color: "#999999",
        });
    }

    lines
}

fn format_timestamp(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn draw_tooltip<S: DrawSurface>(
    surface: &mut S,
    point: &ProjectedPoint,
    result: &ProjectionResult,
    view: &ViewTransform,
    width: f64,
    height: f64,
    theme: &Theme,
) {
    let (x, y) = view.to_screen(point.x, point.y, width, height);
    let lines = tooltip_lines(point, result);

    // Width from the widest line, capped at 80% of the canvas.
    let mut tooltip_width: f64 = 0.0;
    for line in &lines {
        tooltip_width = tooltip_width.max(surface.measure_text(&line.text, line.font) + 20.0);
    }
    tooltip_width = tooltip_width.min(width * TOOLTIP_MAX_WIDTH_FRACTION);

    let tooltip_height = lines.len() as f64 * TOOLTIP_LINE_HEIGHT + 12.0;

    // Right of the point by default, flipped left when it would overflow;
    // centered on the point as a last resort, then clamped on both axes.
    let mut tooltip_x = x + 10.0;
    if tooltip_x + tooltip_width > width - TOOLTIP_EDGE_MARGIN {
        tooltip_x = x - tooltip_width - 10.0;
    }
    if tooltip_x < TOOLTIP_EDGE_MARGIN {
        tooltip_x = TOOLTIP_EDGE_MARGIN
            .max((width - tooltip_width - TOOLTIP_EDGE_MARGIN).min(x - tooltip_width / 2.0));
    }

    let mut tooltip_y = y + 10.0;
    if tooltip_y + tooltip_height > height - TOOLTIP_EDGE_MARGIN {
        tooltip_y = y - tooltip_height - 10.0;
    }
    if tooltip_y < TOOLTIP_EDGE_MARGIN {
        tooltip_y = TOOLTIP_EDGE_MARGIN;
    }

    tooltip_x = tooltip_x.clamp(
        TOOLTIP_EDGE_MARGIN,
        (width - tooltip_width - TOOLTIP_EDGE_MARGIN).max(TOOLTIP_EDGE_MARGIN),
    );
    tooltip_y = tooltip_y.clamp(
        TOOLTIP_EDGE_MARGIN,
        (height - tooltip_height - TOOLTIP_EDGE_MARGIN).max(TOOLTIP_EDGE_MARGIN),
    );

    surface.round_rect(
        tooltip_x,
        tooltip_y,
        tooltip_width,
        tooltip_height,
        TOOLTIP_CORNER_RADIUS,
        theme.tooltip_fill,
        theme.tooltip_stroke,
        1.0,
    );

    let mut current_y = tooltip_y + 14.0;
    for line in &lines {
        if surface.measure_text(&line.text, line.font) > tooltip_width - 20.0 {
            // Word-by-word wrapping; continuation lines use tighter spacing.
            let words: Vec<&str> = line.text.split(' ').collect();
            let mut acc = String::new();
            for (i, word) in words.iter().enumerate() {
                let candidate = format!("{}{} ", acc, word);
                if surface.measure_text(&candidate, line.font) > tooltip_width - 20.0 && i > 0 {
                    surface.fill_text(
                        &acc,
                        tooltip_x + 10.0,
                        current_y,
                        line.font,
                        line.color,
                        TextAlign::Left,
                    );
                    acc = format!("{} ", word);
                    current_y += TOOLTIP_LINE_HEIGHT * 0.8;
                } else {
                    acc = candidate;
                }
            }
            surface.fill_text(
                &acc,
                tooltip_x + 10.0,
                current_y,
                line.font,
                line.color,
                TextAlign::Left,
            );
        } else {
            surface.fill_text(
                &line.text,
                tooltip_x + 10.0,
                current_y,
                line.font,
                line.color,
                TextAlign::Left,
            );
        }
        current_y += TOOLTIP_LINE_HEIGHT;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawOp, RecordingSurface};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn mock_point(path: &str, x: f64, y: f64, cluster: i32) -> ProjectedPoint {
        ProjectedPoint {
            x,
            y,
            title: path.trim_end_matches(".md").to_string(),
            path: path.to_string(),
            top_terms: vec!["alpha".to_string(), "beta".to_string()],
            cluster,
            mtime: None,
            ctime: None,
            word_count: None,
            reading_time: None,
            tags: None,
            content_preview: None,
            distance_to_center: None,
        }
    }

    fn result_with(points: Vec<ProjectedPoint>) -> ProjectionResult {
        ProjectionResult {
            points,
            ..Default::default()
        }
    }

    fn renderer() -> PointCloudRenderer<RecordingSurface> {
        PointCloudRenderer::new(RecordingSurface::new(), Box::new(|_| {}))
    }

    #[test]
    fn test_halos_group_by_server_cluster_excluding_noise() {
        let mut r = renderer();
        r.set_data(result_with(vec![
            mock_point("a.md", 0.0, 0.0, 0),
            mock_point("b.md", 0.5, 0.0, 0),
            mock_point("c.md", 1.0, 0.0, -1),
            mock_point("d.md", 2.0, 0.0, 1),
        ]));

        // No hover, so every rounded rect is a halo.
        assert_eq!(r.surface().round_rects().len(), 2);
    }

    #[test]
    fn test_hover_selects_point_at_its_screen_position() {
        let mut r = renderer();
        let result = result_with(vec![
            mock_point("a.md", 0.0, 0.0, -1),
            mock_point("b.md", 1.0, 1.0, -1),
        ]);
        let (sx, sy) = ViewTransform::default().to_screen(1.0, 1.0, CANVAS_WIDTH, CANVAS_HEIGHT);
        r.set_data(result);

        r.handle_mouse_move(sx, sy);
        assert_eq!(r.hovered_path(), Some("b.md"));
        assert_eq!(r.surface().cursor(), CursorStyle::Pointer);

        // Move far away: hover clears and the cursor resets.
        r.handle_mouse_move(0.0, 0.0);
        assert_eq!(r.hovered_path(), None);
        assert_eq!(r.surface().cursor(), CursorStyle::Default);
    }

    #[test]
    fn test_first_match_wins_for_overlapping_points() {
        let mut r = renderer();
        // Both points are within the hit radius of the cursor; the cursor
        // sits exactly on the second one.
        r.set_data(result_with(vec![
            mock_point("first.md", 0.0, 0.0, -1),
            mock_point("second.md", 0.05, 0.0, -1),
        ]));
        let (sx, sy) = ViewTransform::default().to_screen(0.05, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT);

        r.handle_mouse_move(sx, sy);
        assert_eq!(r.hovered_path(), Some("first.md"));
    }

    #[test]
    fn test_nearest_match_option_prefers_closer_point() {
        let mut r = renderer();
        r.set_options(RendererOptions {
            nearest_match_hit_testing: true,
        });
        r.set_data(result_with(vec![
            mock_point("first.md", 0.0, 0.0, -1),
            mock_point("second.md", 0.05, 0.0, -1),
        ]));
        let (sx, sy) = ViewTransform::default().to_screen(0.05, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT);

        r.handle_mouse_move(sx, sy);
        assert_eq!(r.hovered_path(), Some("second.md"));
    }

    #[test]
    fn test_drag_pans_view_by_cursor_delta() {
        let mut r = renderer();
        r.set_data(result_with(vec![mock_point("a.md", 0.0, 0.0, -1)]));

        r.handle_mouse_move(100.0, 100.0);
        r.handle_mouse_down();
        assert_eq!(r.surface().cursor(), CursorStyle::Grabbing);
        r.handle_mouse_move(130.0, 80.0);

        let view = r.view();
        assert_eq!(view.offset_x, 30.0);
        assert_eq!(view.offset_y, -20.0);

        r.handle_mouse_up();
        assert_eq!(r.surface().cursor(), CursorStyle::Default);
    }

    #[test]
    fn test_wheel_zoom_direction_and_clamp() {
        let mut r = renderer();
        r.set_data(result_with(vec![mock_point("a.md", 0.0, 0.0, -1)]));

        r.handle_wheel(1.0);
        assert!((r.view().scale - 0.9).abs() < 1e-12);
        r.handle_wheel(-1.0);
        assert!((r.view().scale - 0.99).abs() < 1e-12);

        for _ in 0..100 {
            r.handle_wheel(-1.0);
        }
        assert_eq!(r.view().scale, crate::geometry::MAX_SCALE);
        for _ in 0..100 {
            r.handle_wheel(1.0);
        }
        assert_eq!(r.view().scale, crate::geometry::MIN_SCALE);
    }

    #[test]
    fn test_click_opens_hovered_note_only() {
        let opened: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = opened.clone();
        let mut r = PointCloudRenderer::new(
            RecordingSurface::new(),
            Box::new(move |path| sink.borrow_mut().push(path.to_string())),
        );
        r.set_data(result_with(vec![mock_point("a.md", 0.0, 0.0, -1)]));

        // Click with nothing hovered: no-op.
        r.handle_click();
        assert!(opened.borrow().is_empty());

        let (sx, sy) = ViewTransform::default().to_screen(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT);
        r.handle_mouse_move(sx, sy);
        r.handle_click();
        assert_eq!(opened.borrow().as_slice(), ["a.md".to_string()]);
    }

    #[test]
    fn test_set_data_resets_camera() {
        let mut r = renderer();
        r.set_data(result_with(vec![mock_point("a.md", 0.0, 0.0, -1)]));
        r.handle_wheel(-1.0);
        r.handle_mouse_move(10.0, 10.0);
        r.handle_mouse_down();
        r.handle_mouse_move(60.0, 60.0);
        assert_ne!(r.view(), ViewTransform::default());

        r.set_data(result_with(vec![mock_point("b.md", 0.0, 0.0, -1)]));
        assert_eq!(r.view(), ViewTransform::default());
    }

    #[test]
    fn test_hovered_point_title_moves_into_tooltip() {
        let mut r = renderer();
        r.set_data(result_with(vec![
            mock_point("a.md", 0.0, 0.0, -1),
            mock_point("b.md", 2.0, 2.0, -1),
        ]));
        let (sx, sy) = ViewTransform::default().to_screen(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT);
        r.handle_mouse_move(sx, sy);

        let texts = r.surface().texts();
        // "a" appears once as the tooltip title, not as a point label; "b"
        // keeps its point label.
        assert_eq!(texts.iter().filter(|t| **t == "a").count(), 1);
        assert!(texts.contains(&"b"));
        assert!(texts.iter().any(|t| t.starts_with("Keywords: alpha")));
        assert!(texts.contains(&"Cluster: Not clustered"));
    }

    #[test]
    fn test_tooltip_stays_inside_canvas() {
        let mut r = renderer();
        // Point near the right edge: x = 3.9 -> screen 790.
        r.set_data(result_with(vec![mock_point("edge.md", 3.9, 0.0, -1)]));
        let (sx, sy) = ViewTransform::default().to_screen(3.9, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT);
        r.handle_mouse_move(sx, sy);

        let rects = r.surface().round_rects();
        assert_eq!(rects.len(), 1);
        if let DrawOp::RoundRect {
            x,
            y,
            width,
            height,
            ..
        } = rects[0]
        {
            assert!(*x >= 10.0);
            assert!(*y >= 10.0);
            assert!(x + width <= CANVAS_WIDTH - 10.0);
            assert!(y + height <= CANVAS_HEIGHT - 10.0);
        } else {
            unreachable!();
        }
    }

    #[test]
    fn test_conditional_tooltip_sections() {
        let mut point = mock_point("a.md", 0.0, 0.0, 0);
        point.mtime = Some(1_700_000_000_000);
        point.word_count = Some(400);
        point.reading_time = Some(2);
        point.tags = Some(vec!["rust".to_string()]);
        point.content_preview = Some("A longer preview".to_string());
        point.distance_to_center = Some(0.127);
        let lines = tooltip_lines(&point, &result_with(vec![]));
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();

        assert_eq!(texts[0], "a");
        assert!(texts.contains(&"Info: #rust \u{2022} 400 words (~2 min read)"));
        assert!(texts.iter().any(|t| t.starts_with("Modified: ")));
        assert!(texts.contains(&"Preview: A longer preview"));
        assert!(texts.contains(&"Distance to center: 0.13"));

        // Sparse point: only title, path, keywords, and cluster remain.
        let sparse = mock_point("b.md", 0.0, 0.0, -1);
        let sparse_lines = tooltip_lines(&sparse, &result_with(vec![]));
        assert_eq!(sparse_lines.len(), 4);
        // Distance is suppressed for unclustered points even if present.
        let mut noise = mock_point("c.md", 0.0, 0.0, -1);
        noise.distance_to_center = Some(0.5);
        assert_eq!(tooltip_lines(&noise, &result_with(vec![])).len(), 4);
    }

    #[test]
    fn test_proximity_overlay_is_computed_each_draw() {
        let mut r = renderer();
        r.set_data(result_with(vec![
            mock_point("a.md", 0.0, 0.0, 0),
            mock_point("b.md", 0.1, 0.0, 1),
            mock_point("c.md", 9.0, 9.0, 2),
        ]));
        // a and b are within the overlay threshold despite having
        // different semantic clusters; c stays out.
        assert_eq!(r.proximity_groups(), &[vec![0, 1]]);
    }

    #[test]
    fn test_grid_covers_canvas() {
        let mut r = renderer();
        r.set_data(result_with(vec![mock_point("a.md", 0.0, 0.0, -1)]));
        let lines = r
            .surface()
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::Line { .. }))
            .count();
        // 50px spacing at scale 1: 16 vertical + 12 horizontal.
        assert_eq!(lines, 28);
    }
}

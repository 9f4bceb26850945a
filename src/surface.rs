//! Drawing-surface abstraction for the point-cloud renderer.
//!
//! The renderer draws through this trait instead of a concrete canvas so the
//! same layout logic runs against a real 2D context in production and a
//! headless recording backend in tests. Colors and fonts are passed as CSS
//! token strings ("rgba(...)", "var(--text-muted)", "bold 14px sans-serif")
//! and interpreted by the backend.

use std::fmt;

// ============================================================================
// Errors
// ============================================================================

/// Fatal backend construction failure. Acquiring a 2D context can fail in
/// unsupported environments; the component cannot function at all without
/// one, so backends propagate this from their constructors rather than
/// degrading.
#[derive(Debug, Clone)]
pub enum SurfaceError {
    ContextUnavailable(String),
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::ContextUnavailable(msg) => {
                write!(f, "Could not create drawing context: {}", msg)
            }
        }
    }
}

impl std::error::Error for SurfaceError {}

// ============================================================================
// Draw Primitives
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// Cursor shown over the canvas, driven by hover/drag state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorStyle {
    #[default]
    Default,
    Pointer,
    Grabbing,
}

/// Minimal 2D drawing interface: exactly the operations the renderer needs.
pub trait DrawSurface {
    fn clear(&mut self, width: f64, height: f64);

    fn stroke_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: &str, line_width: f64);

    /// Filled circle with a stroked border.
    fn fill_circle(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        fill: &str,
        stroke: &str,
        stroke_width: f64,
    );

    /// Filled and stroked rounded rectangle.
    fn round_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        fill: &str,
        stroke: &str,
        stroke_width: f64,
    );

    fn fill_text(&mut self, text: &str, x: f64, y: f64, font: &str, color: &str, align: TextAlign);

    /// Rendered width of `text` in the given font, in pixels.
    fn measure_text(&self, text: &str, font: &str) -> f64;

    fn set_cursor(&mut self, cursor: CursorStyle);
}

// ============================================================================
// Recording Backend
// ============================================================================

/// One recorded drawing operation, for headless assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear {
        width: f64,
        height: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: String,
    },
    Circle {
        x: f64,
        y: f64,
        radius: f64,
        fill: String,
    },
    RoundRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        fill: String,
    },
    Text {
        text: String,
        x: f64,
        y: f64,
        font: String,
        align: TextAlign,
    },
}

/// Headless surface that records every operation and measures text with a
/// fixed per-character advance. Deterministic, so layout tests can assert on
/// exact tooltip geometry.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    ops: Vec<DrawOp>,
    cursor: CursorStyle,
}

/// Fixed glyph advance used by `RecordingSurface::measure_text`.
pub const RECORDING_CHAR_WIDTH: f64 = 7.0;

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn cursor(&self) -> CursorStyle {
        self.cursor
    }

    /// Texts drawn so far, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn circles(&self) -> Vec<&DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Circle { .. }))
            .collect()
    }

    pub fn round_rects(&self) -> Vec<&DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::RoundRect { .. }))
            .collect()
    }
}

impl DrawSurface for RecordingSurface {
    /// Starts a fresh frame: recorded operations from previous frames are
    /// dropped so assertions see only the latest draw.
    fn clear(&mut self, width: f64, height: f64) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear { width, height });
    }

    fn stroke_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: &str, _line_width: f64) {
        self.ops.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            color: color.to_string(),
        });
    }

    fn fill_circle(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        fill: &str,
        _stroke: &str,
        _stroke_width: f64,
    ) {
        self.ops.push(DrawOp::Circle {
            x,
            y,
            radius,
            fill: fill.to_string(),
        });
    }

    fn round_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        fill: &str,
        _stroke: &str,
        _stroke_width: f64,
    ) {
        self.ops.push(DrawOp::RoundRect {
            x,
            y,
            width,
            height,
            radius,
            fill: fill.to_string(),
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, font: &str, _color: &str, align: TextAlign) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            font: font.to_string(),
            align,
        });
    }

    fn measure_text(&self, text: &str, _font: &str) -> f64 {
        text.chars().count() as f64 * RECORDING_CHAR_WIDTH
    }

    fn set_cursor(&mut self, cursor: CursorStyle) {
        self.cursor = cursor;
    }
}

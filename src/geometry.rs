//! Projection-space to screen-space mapping.
//!
//! The camera state for one visualization session: a uniform zoom scale and
//! a pixel pan offset. Projection coordinates from the analysis service are
//! O(1)-O(10), so a fixed magnification constant spreads them to pixel scale
//! before scale and offset are applied.

/// Fixed magnification applied to projection-space units before zoom.
pub const PROJECTION_MAGNIFICATION: f64 = 100.0;

/// Minimum and maximum zoom scale.
pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 5.0;

/// Session-local camera state. Reset whenever a new projection result
/// arrives; mutated only by user pan/zoom gestures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl ViewTransform {
    /// Map projection-space coordinates to screen coordinates for a canvas
    /// of the given size. Pure function of the current camera state; there
    /// is no analytic inverse — hit-testing forward-transforms every point.
    pub fn to_screen(&self, x: f64, y: f64, width: f64, height: f64) -> (f64, f64) {
        let screen_x = x * self.scale * PROJECTION_MAGNIFICATION + width / 2.0 + self.offset_x;
        let screen_y = y * self.scale * PROJECTION_MAGNIFICATION + height / 2.0 + self.offset_y;
        (screen_x, screen_y)
    }

    /// Translate the view by a cursor delta in pixels.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Multiply the scale by `factor` and clamp into [0.1, 5].
    pub fn zoom(&mut self, factor: f64) {
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

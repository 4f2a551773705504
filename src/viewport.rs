use glam::Mat4;

/// Cached viewport dimensions in physical pixels
///
/// Zero dimensions are legal and describe a degenerate, empty-output viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Create a viewport with the given dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero (nothing can be drawn)
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height; 1.0 for a degenerate viewport
    pub fn aspect_ratio(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Total number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Orthographic projection spanning the viewport, aspect-corrected
    /// so a unit quad keeps its shape under resize
    pub fn projection(&self) -> Mat4 {
        let aspect = self.aspect_ratio();
        Mat4::orthographic_rh(-aspect, aspect, -1.0, 1.0, -1.0, 1.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

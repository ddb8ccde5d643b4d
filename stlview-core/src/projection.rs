/// Viewport and the model-space to screen-space mapping
///
/// The projection is orthographic: rotated model coordinates are already in
/// pixels (the loader scales the model to a fixed size), so x and y only
/// need recentering and a y flip for a top-left screen origin.
use crate::geometry::Rgba;
use crate::math::Vec3;

/// Size of the drawing surface in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }

    pub fn half_height(&self) -> f32 {
        self.height / 2.0
    }

    /// Screen position of a model-space point. Depth is passed through.
    pub fn to_screen(&self, p: &Vec3, color: Rgba) -> ScreenVertex {
        ScreenVertex {
            x: p.x + self.half_width(),
            y: -p.y + self.half_height(),
            depth: p.z,
            color,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// A shaded vertex ready for rasterization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
    pub color: Rgba,
}

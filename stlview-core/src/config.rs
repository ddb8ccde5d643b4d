/// Tunable parameters of the loader, controller, lighting and viewport,
/// with the defaults the viewer ships with
use crate::geometry::Rgba;
use crate::math::{normalize, Vec3};
use crate::projection::Viewport;
use crate::shading::Lighting;

/// Below this, extents and ranges are treated as zero.
pub const EPSILON: f32 = 1e-6;

/// Size of the largest bounding-box side after normalization.
pub const MODEL_VIEW_SIZE: f32 = 150.0;

/// Radians of rotation per pixel of pointer drag.
pub const MOUSE_SENSITIVITY: f32 = 0.005;

pub const DEFAULT_FPS: f64 = 60.0;

/// Consulted when no model path is given on the command line.
pub const DEFAULT_STL_PATH: &str = "model.stl";

pub const LOG_FILE: &str = "stlview.log";

pub const AMBIENT_INTENSITY: f32 = 0.3;
pub const DIFFUSE_INTENSITY: f32 = 0.7;

/// Gradient endpoints: blue at the bottom of the model, green at the top.
pub const BOTTOM_COLOR: Rgba = Rgba::rgb(0.0, 0.0, 1.0);
pub const TOP_COLOR: Rgba = Rgba::rgb(0.0, 1.0, 0.0);

pub fn default_light_direction() -> Vec3 {
    normalize(&Vec3::new(0.5, 0.5, -1.0))
}

/// Coordinate axis selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    X,
    #[default]
    Y,
    Z,
}

impl Axis {
    pub fn component(&self, v: &Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }
}

/// Loader parameters
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderConfig {
    pub target_size: f32,
    /// Axis the color gradient runs along
    pub up_axis: Axis,
    pub bottom_color: Rgba,
    pub top_color: Rgba,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            target_size: MODEL_VIEW_SIZE,
            up_axis: Axis::Y,
            bottom_color: BOTTOM_COLOR,
            top_color: TOP_COLOR,
        }
    }
}

/// Everything the viewer needs besides the mesh itself
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub loader: LoaderConfig,
    pub sensitivity: f32,
    pub lighting: Lighting,
    pub viewport: Viewport,
    pub fps: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            loader: LoaderConfig::default(),
            sensitivity: MOUSE_SENSITIVITY,
            lighting: Lighting::default(),
            viewport: Viewport::default(),
            fps: DEFAULT_FPS,
        }
    }
}

impl ViewerConfig {
    pub fn with_target_size(mut self, target_size: f32) -> Self {
        self.loader.target_size = target_size;
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_lighting(mut self, lighting: Lighting) -> Self {
        self.lighting = lighting;
        self
    }

    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.loader.target_size, 150.0);
        assert_eq!(config.loader.up_axis, Axis::Y);
        assert_eq!(config.sensitivity, 0.005);
        assert_eq!(config.viewport, Viewport::new(800.0, 600.0));
    }

    #[test]
    fn test_light_direction_is_unit() {
        assert_relative_eq!(default_light_direction().norm(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_builders() {
        let config = ViewerConfig::default()
            .with_target_size(10.0)
            .with_sensitivity(0.01)
            .with_fps(30.0);
        assert_eq!(config.loader.target_size, 10.0);
        assert_eq!(config.sensitivity, 0.01);
        assert_eq!(config.fps, 30.0);
    }

    #[test]
    fn test_axis_component() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Axis::X.component(&v), 1.0);
        assert_eq!(Axis::Y.component(&v), 2.0);
        assert_eq!(Axis::Z.component(&v), 3.0);
    }
}

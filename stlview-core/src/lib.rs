/// stlview core library - ASCII STL loading and the software shading pipeline
///
/// This library has no terminal or windowing dependencies. It loads a model
/// once, tracks its orientation from pointer drags, and turns each redraw
/// into an ordered list of lit screen-space triangles for a render sink.

pub mod config;
pub mod error;
pub mod geometry;
pub mod math;
pub mod projection;
pub mod shading;
pub mod stl;
pub mod transform;
pub mod viewer;

// Re-export commonly used types
pub use config::{LoaderConfig, ViewerConfig};
pub use error::{LoadError, LoadWarning};
pub use geometry::{Face, Mesh, Rgba, Vertex};
pub use projection::{ScreenVertex, Viewport};
pub use shading::{Frame, Lighting, ScreenTriangle};
pub use stl::{load_stl, parse_stl_str, LoadReport, LoadedModel};
pub use transform::OrientationController;
pub use viewer::{InputEvent, ModelStats, Viewer};

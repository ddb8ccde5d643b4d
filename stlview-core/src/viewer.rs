/// Viewer context: the loaded model plus everything needed to draw it
use log::{debug, warn};

use crate::config::ViewerConfig;
use crate::geometry::Mesh;
use crate::projection::Viewport;
use crate::shading::{Frame, Lighting, ShadingPipeline};
use crate::transform::OrientationController;

/// Logical input events, independent of where they come from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown,
    PointerUp,
    /// Pointer motion in screen pixels since the previous event
    PointerMove { dx: f32, dy: f32 },
    /// Frame clock
    Tick,
    Resize { width: f32, height: f32 },
}

/// Counts shown in the info overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelStats {
    pub faces: usize,
    pub vertices: usize,
}

pub struct Viewer {
    mesh: Mesh,
    controller: OrientationController,
    lighting: Lighting,
    viewport: Viewport,
    pipeline: ShadingPipeline,
    redraw: bool,
}

impl Viewer {
    pub fn new(mesh: Mesh, config: &ViewerConfig) -> Self {
        if let Some(face) = mesh.validate() {
            warn!(
                "Face {} references a missing vertex; invalid faces are not drawn",
                face
            );
        }
        let pipeline = ShadingPipeline::for_mesh(&mesh);
        Self {
            mesh,
            controller: OrientationController::new(config.sensitivity),
            lighting: config.lighting,
            viewport: config.viewport,
            pipeline,
            redraw: true,
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn controller(&self) -> &OrientationController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut OrientationController {
        &mut self.controller
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    pub fn stats(&self) -> ModelStats {
        ModelStats {
            faces: self.mesh.face_count(),
            vertices: self.mesh.vertex_count(),
        }
    }

    /// Feed one input event. Returns whether a redraw is pending.
    pub fn handle_event(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::PointerDown => self.controller.begin_drag(),
            InputEvent::PointerUp => self.controller.end_drag(),
            InputEvent::PointerMove { dx, dy } => {
                if self.controller.apply_drag_delta(dx, dy) {
                    self.redraw = true;
                }
            }
            InputEvent::Tick => self.redraw = true,
            InputEvent::Resize { width, height } => {
                debug!("Viewport resized to {}x{}", width, height);
                self.viewport = Viewport::new(width, height);
                self.redraw = true;
            }
        }
        self.redraw
    }

    /// Reset the orientation to identity and schedule a redraw
    pub fn reset_orientation(&mut self) {
        self.controller.reset();
        self.redraw = true;
    }

    /// Consumes the pending redraw flag
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    pub fn render_frame(&mut self) -> Frame {
        let rotation = self.controller.current_rotation_matrix();
        self.pipeline
            .render(&self.mesh, &rotation, &self.lighting, &self.viewport)
    }
}

/// Per-frame shading and depth sort
///
/// Each frame rotates the original mesh into a scratch buffer, derives a
/// normal and average depth per face, sorts faces back to front (larger z is
/// farther from the viewer) and emits flat-lit screen triangles in draw
/// order. Interpenetrating faces are not split; the sort is approximate.
use log::debug;
use std::cmp::Ordering;

use crate::config::{default_light_direction, AMBIENT_INTENSITY, DIFFUSE_INTENSITY};
use crate::geometry::{Face, Mesh, Vertex};
use crate::math::{cross, dot, normalize, rotate, subtract, Mat3, Vec3};
use crate::projection::{ScreenVertex, Viewport};

/// A single directional light plus a constant ambient term
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    /// Unit vector
    pub direction: Vec3,
    pub ambient: f32,
    pub diffuse: f32,
}

impl Lighting {
    /// The direction is normalized on construction.
    pub fn new(direction: Vec3, ambient: f32, diffuse: f32) -> Self {
        Self {
            direction: normalize(&direction),
            ambient,
            diffuse,
        }
    }

    /// Flat light intensity for a face normal, clamped to `[0, 1]`.
    /// A zero normal (degenerate face) gets the ambient term only.
    pub fn intensity(&self, normal: &Vec3) -> f32 {
        let lambert = dot(normal, &self.direction).max(0.0);
        (self.ambient + self.diffuse * lambert).clamp(0.0, 1.0)
    }
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            direction: default_light_direction(),
            ambient: AMBIENT_INTENSITY,
            diffuse: DIFFUSE_INTENSITY,
        }
    }
}

/// Derived per-frame state of one face
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FaceState {
    Visible {
        face: Face,
        normal: Vec3,
        avg_depth: f32,
    },
    /// References a vertex that does not exist; sorted last, never drawn
    Invalid { face: Face },
}

impl FaceState {
    pub fn face(&self) -> Face {
        match self {
            Self::Visible { face, .. } | Self::Invalid { face } => *face,
        }
    }

    pub fn avg_depth(&self) -> Option<f32> {
        match self {
            Self::Visible { avg_depth, .. } => Some(*avg_depth),
            Self::Invalid { .. } => None,
        }
    }

    /// Back-to-front draw order
    fn draw_order(&self, other: &Self) -> Ordering {
        match (self.avg_depth(), other.avg_depth()) {
            (Some(a), Some(b)) => b.total_cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// A lit triangle in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTriangle {
    pub vertices: [ScreenVertex; 3],
    /// Average depth the triangle was sorted by
    pub depth: f32,
    /// Light intensity applied to the vertex colors
    pub intensity: f32,
}

/// Output of one redraw
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// The model has nothing to draw
    Empty,
    /// Triangles in draw order, farthest first
    Triangles(Vec<ScreenTriangle>),
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        matches!(self, Frame::Empty)
    }

    pub fn triangles(&self) -> &[ScreenTriangle] {
        match self {
            Frame::Empty => &[],
            Frame::Triangles(triangles) => triangles,
        }
    }
}

/// Scratch buffers for the per-frame pipeline, sized once from the mesh
#[derive(Debug, Clone, Default)]
pub struct ShadingPipeline {
    transformed: Vec<Vertex>,
    faces: Vec<FaceState>,
    degenerate: usize,
}

impl ShadingPipeline {
    pub fn for_mesh(mesh: &Mesh) -> Self {
        Self {
            transformed: Vec::with_capacity(mesh.vertex_count()),
            faces: Vec::with_capacity(mesh.face_count()),
            degenerate: 0,
        }
    }

    /// Vertices rotated by the last render
    pub fn transformed(&self) -> &[Vertex] {
        &self.transformed
    }

    /// Face states of the last render, in draw order
    pub fn face_states(&self) -> &[FaceState] {
        &self.faces
    }

    pub fn render(
        &mut self,
        mesh: &Mesh,
        rotation: &Mat3,
        lighting: &Lighting,
        viewport: &Viewport,
    ) -> Frame {
        if mesh.is_empty() {
            self.transformed.clear();
            self.faces.clear();
            return Frame::Empty;
        }

        self.transform(mesh, rotation);
        self.derive_faces(mesh);
        self.faces.sort_unstable_by(FaceState::draw_order);
        Frame::Triangles(self.emit(lighting, viewport))
    }

    fn transform(&mut self, mesh: &Mesh, rotation: &Mat3) {
        self.transformed.clear();
        self.transformed.extend(mesh.vertices.iter().map(|v| Vertex {
            position: rotate(rotation, &v.position),
            color: v.color,
        }));
    }

    fn derive_faces(&mut self, mesh: &Mesh) {
        let transformed = &self.transformed;
        let mut degenerate = 0;

        self.faces.clear();
        self.faces.extend(mesh.faces.iter().map(|&face| {
            if !face.is_within(transformed.len()) {
                return FaceState::Invalid { face };
            }

            let [p0, p1, p2] = face.indices.map(|i| transformed[i].position);
            let edge1 = subtract(&p1, &p0);
            let edge2 = subtract(&p2, &p0);
            let normal = normalize(&cross(&edge1, &edge2));
            if normal == Vec3::zeros() {
                degenerate += 1;
            }

            FaceState::Visible {
                face,
                normal,
                avg_depth: (p0.z + p1.z + p2.z) / 3.0,
            }
        }));

        if degenerate != self.degenerate {
            debug!("{} degenerate faces are lit by ambient light only", degenerate);
            self.degenerate = degenerate;
        }
    }

    fn emit(&self, lighting: &Lighting, viewport: &Viewport) -> Vec<ScreenTriangle> {
        self.faces
            .iter()
            .filter_map(|state| match *state {
                FaceState::Visible {
                    face,
                    normal,
                    avg_depth,
                } => {
                    let intensity = lighting.intensity(&normal);
                    let vertices = face.indices.map(|i| {
                        let v = &self.transformed[i];
                        viewport.to_screen(&v.position, v.color.scaled_rgb(intensity))
                    });
                    Some(ScreenTriangle {
                        vertices,
                        depth: avg_depth,
                        intensity,
                    })
                }
                FaceState::Invalid { .. } => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rgba;
    use approx::assert_relative_eq;

    const WHITE: Rgba = Rgba::rgb(1.0, 1.0, 1.0);

    fn triangle_at(z: f32) -> [Vertex; 3] {
        [
            Vertex::new(0.0, 0.0, z, WHITE),
            Vertex::new(1.0, 0.0, z, WHITE),
            Vertex::new(0.0, 1.0, z, WHITE),
        ]
    }

    #[test]
    fn test_lighting_clamps_and_keeps_ambient() {
        let lighting = Lighting::new(Vec3::new(0.0, 0.0, -1.0), 0.3, 0.7);
        assert_relative_eq!(lighting.intensity(&Vec3::new(0.0, 0.0, -1.0)), 1.0, epsilon = 1e-6);
        assert_relative_eq!(lighting.intensity(&Vec3::new(0.0, 0.0, 1.0)), 0.3);
        assert_relative_eq!(lighting.intensity(&Vec3::zeros()), 0.3);

        let bright = Lighting::new(Vec3::new(0.0, 0.0, -1.0), 0.8, 0.7);
        assert_eq!(bright.intensity(&Vec3::new(0.0, 0.0, -1.0)), 1.0);
    }

    #[test]
    fn test_empty_mesh_renders_empty_frame() {
        let mesh = Mesh::new();
        let mut pipeline = ShadingPipeline::for_mesh(&mesh);
        let frame = pipeline.render(
            &mesh,
            &Mat3::identity(),
            &Lighting::default(),
            &Viewport::default(),
        );
        assert!(frame.is_empty());
        assert!(frame.triangles().is_empty());
    }

    #[test]
    fn test_faces_sorted_back_to_front() {
        let mut mesh = Mesh::new();
        for z in [5.0, -20.0, 40.0, 0.0] {
            mesh.push_triangle(triangle_at(z));
        }
        let mut pipeline = ShadingPipeline::for_mesh(&mesh);
        let frame = pipeline.render(
            &mesh,
            &Mat3::identity(),
            &Lighting::default(),
            &Viewport::default(),
        );

        let depths: Vec<f32> = frame.triangles().iter().map(|t| t.depth).collect();
        assert_eq!(depths, vec![40.0, 5.0, 0.0, -20.0]);
    }

    #[test]
    fn test_invalid_face_sorted_last_and_skipped() {
        let mut mesh = Mesh::new();
        mesh.push_triangle(triangle_at(1.0));
        mesh.faces.insert(0, Face::new(0, 1, 7));
        mesh.push_triangle(triangle_at(2.0));

        let mut pipeline = ShadingPipeline::for_mesh(&mesh);
        let frame = pipeline.render(
            &mesh,
            &Mat3::identity(),
            &Lighting::default(),
            &Viewport::default(),
        );

        assert_eq!(frame.triangles().len(), 2);
        let states = pipeline.face_states();
        assert_eq!(states.len(), 3);
        assert!(matches!(states[2], FaceState::Invalid { .. }));
        assert_eq!(states[0].avg_depth(), Some(2.0));
    }

    #[test]
    fn test_degenerate_face_is_ambient_only() {
        let mut mesh = Mesh::new();
        mesh.push_triangle([
            Vertex::new(0.0, 0.0, 0.0, WHITE),
            Vertex::new(1.0, 1.0, 1.0, WHITE),
            Vertex::new(2.0, 2.0, 2.0, WHITE),
        ]);
        let lighting = Lighting::default();
        let mut pipeline = ShadingPipeline::for_mesh(&mesh);
        let frame = pipeline.render(&mesh, &Mat3::identity(), &lighting, &Viewport::default());

        let triangle = &frame.triangles()[0];
        assert_relative_eq!(triangle.intensity, lighting.ambient);
        assert_relative_eq!(triangle.vertices[0].color.r, lighting.ambient);
        assert_eq!(triangle.vertices[0].color.a, 1.0);
    }

    #[test]
    fn test_vertex_colors_tinted_individually() {
        let red = Rgba::rgb(1.0, 0.0, 0.0);
        let blue = Rgba::rgb(0.0, 0.0, 1.0);
        let mut mesh = Mesh::new();
        mesh.push_triangle([
            Vertex::new(0.0, 0.0, 0.0, red),
            Vertex::new(0.0, 1.0, 0.0, blue),
            Vertex::new(1.0, 0.0, 0.0, blue),
        ]);
        // Normal is -z, facing the light head on
        let lighting = Lighting::new(Vec3::new(0.0, 0.0, -1.0), 0.2, 0.6);
        let mut pipeline = ShadingPipeline::for_mesh(&mesh);
        let frame = pipeline.render(&mesh, &Mat3::identity(), &lighting, &Viewport::default());

        let [a, b, _] = frame.triangles()[0].vertices;
        assert_relative_eq!(a.color.r, 0.8, epsilon = 1e-6);
        assert_relative_eq!(b.color.b, 0.8, epsilon = 1e-6);
        assert_eq!(b.color.r, 0.0);
    }

    #[test]
    fn test_emits_screen_coordinates() {
        let mut mesh = Mesh::new();
        mesh.push_triangle(triangle_at(3.0));
        let mut pipeline = ShadingPipeline::for_mesh(&mesh);
        let frame = pipeline.render(
            &mesh,
            &Mat3::identity(),
            &Lighting::default(),
            &Viewport::new(100.0, 50.0),
        );

        let vertices = frame.triangles()[0].vertices;
        assert_eq!((vertices[0].x, vertices[0].y), (50.0, 25.0));
        assert_eq!((vertices[2].x, vertices[2].y), (50.0, 24.0));
        assert_eq!(vertices[1].depth, 3.0);
    }

    #[test]
    fn test_cube_front_faces_drawn_last() {
        let mesh = Mesh::cube(2.0, WHITE);
        let mut pipeline = ShadingPipeline::for_mesh(&mesh);
        let frame = pipeline.render(
            &mesh,
            &Mat3::identity(),
            &Lighting::default(),
            &Viewport::default(),
        );

        let triangles = frame.triangles();
        assert_eq!(triangles.len(), 12);
        // The two -z triangles face the viewer and are nearest
        for t in &triangles[10..] {
            assert_relative_eq!(t.depth, -1.0);
        }
        assert_relative_eq!(triangles[0].depth, 1.0);
    }
}

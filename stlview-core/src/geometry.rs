/// Geometry primitives for the viewer: colored vertices and indexed faces
use crate::math::Vec3;

/// Linear RGBA color with channels in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Per-channel linear interpolation, `t = 0` gives `self`
    pub fn lerp(&self, other: &Rgba, t: f32) -> Rgba {
        let mix = |a: f32, b: f32| a + t * (b - a);
        Rgba::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    /// Scale the color channels by a light intensity; alpha is kept.
    pub fn scaled_rgb(&self, intensity: f32) -> Rgba {
        Rgba::new(self.r * intensity, self.g * intensity, self.b * intensity, self.a)
    }

    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (channel(self.r), channel(self.g), channel(self.b))
    }
}

/// A model vertex: position plus the display color assigned at load time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub color: Rgba,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, color: Rgba) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            color,
        }
    }
}

/// A triangle referencing three vertices of its mesh by position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub indices: [usize; 3],
}

impl Face {
    pub fn new(a: usize, b: usize, c: usize) -> Self {
        Self { indices: [a, b, c] }
    }

    /// True when every index is below `vertex_count`
    pub fn is_within(&self, vertex_count: usize) -> bool {
        self.indices.iter().all(|&i| i < vertex_count)
    }
}

/// An indexed triangle mesh. Vertex order is significant: faces refer to
/// vertices by their position in `vertices`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub faces: Vec<Face>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(vertices: Vec<Vertex>, faces: Vec<Face>) -> Self {
        Self { vertices, faces }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Nothing to draw: no faces or no vertices
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty() || self.vertices.is_empty()
    }

    /// Appends a triangle as three fresh vertices and returns the face index
    pub fn push_triangle(&mut self, vertices: [Vertex; 3]) -> usize {
        let base = self.vertices.len();
        self.vertices.extend_from_slice(&vertices);
        self.faces.push(Face::new(base, base + 1, base + 2));
        self.faces.len() - 1
    }

    /// Index of the first face referencing a vertex that does not exist
    pub fn validate(&self) -> Option<usize> {
        let count = self.vertices.len();
        self.faces.iter().position(|face| !face.is_within(count))
    }

    /// Axis-aligned cube centered at the origin, two triangles per side,
    /// counter-clockwise when seen from outside.
    #[cfg(test)]
    pub fn cube(size: f32, color: Rgba) -> Self {
        let h = size / 2.0;
        let v = |x: f32, y: f32, z: f32| Vertex::new(x * h, y * h, z * h, color);
        let mut mesh = Self::new();

        let quads = [
            // Front (+z)
            [v(-1., -1., 1.), v(1., -1., 1.), v(1., 1., 1.), v(-1., 1., 1.)],
            // Back (-z)
            [v(1., -1., -1.), v(-1., -1., -1.), v(-1., 1., -1.), v(1., 1., -1.)],
            // Top (+y)
            [v(-1., 1., 1.), v(1., 1., 1.), v(1., 1., -1.), v(-1., 1., -1.)],
            // Bottom (-y)
            [v(-1., -1., -1.), v(1., -1., -1.), v(1., -1., 1.), v(-1., -1., 1.)],
            // Right (+x)
            [v(1., -1., 1.), v(1., -1., -1.), v(1., 1., -1.), v(1., 1., 1.)],
            // Left (-x)
            [v(-1., -1., -1.), v(-1., -1., 1.), v(-1., 1., 1.), v(-1., 1., -1.)],
        ];

        for [a, b, c, d] in quads {
            mesh.push_triangle([a, b, c]);
            mesh.push_triangle([a, c, d]);
        }

        mesh
    }
}

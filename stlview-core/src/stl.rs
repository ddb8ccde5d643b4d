/// ASCII STL loader
///
/// Loading is two-pass: the first pass counts `facet normal` lines so the
/// vertex and face buffers can be reserved once, the second pass fills them.
/// Facet normals stored in the file are ignored; the shading pipeline
/// recomputes them from the vertices every frame.
use log::{debug, error, info, warn};
use nom::{
    bytes::complete::tag,
    character::complete::space1,
    combinator::map,
    number::complete::float,
    sequence::{preceded, tuple},
    IResult,
};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{LoaderConfig, EPSILON};
use crate::error::{LoadError, LoadWarning};
use crate::geometry::{Face, Mesh, Vertex};
use crate::math::Vec3;

const FACET_START: &str = "facet normal";
const VERTEX: &str = "vertex";
const FACET_END: &str = "endfacet";

/// Axis-aligned bounds of the raw (pre-normalization) vertex positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// Bounds of `points`, or `None` when there are none, they are not finite,
    /// or their extent overflows `f32`
    pub fn of<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Option<Self> {
        let mut min = Vec3::repeat(f32::MAX);
        let mut max = Vec3::repeat(-f32::MAX);
        let mut any = false;

        for p in points {
            min = min.inf(p);
            max = max.sup(p);
            any = true;
        }

        let extent = max - min;
        let finite = min.iter().chain(max.iter()).chain(extent.iter()).all(|c| c.is_finite());
        (any && finite).then_some(Self { min, max })
    }

    pub fn center(&self) -> Vec3 {
        self.min + self.extent() / 2.0
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn max_extent(&self) -> f32 {
        self.extent().max()
    }
}

/// Center and scale baked into the vertex positions during load
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub center: Vec3,
    pub scale: f32,
}

impl Default for Normalization {
    fn default() -> Self {
        Self {
            center: Vec3::zeros(),
            scale: 1.0,
        }
    }
}

impl Normalization {
    /// Normalization mapping `bounds` to a box whose largest side is `target_size`
    pub fn fit(bounds: &Bounds, target_size: f32) -> Self {
        let max_extent = bounds.max_extent();
        let scale = if max_extent > EPSILON {
            target_size / max_extent
        } else {
            1.0
        };
        Self {
            center: bounds.center(),
            scale,
        }
    }

    pub fn apply(&self, p: &Vec3) -> Vec3 {
        (p - self.center) * self.scale
    }
}

/// Diagnostics collected while loading
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub source: PathBuf,
    /// Facets found by the count pass
    pub counted_facets: usize,
    pub warnings: Vec<LoadWarning>,
    /// Raw bounds, `None` if no finite bounds were found
    pub bounds: Option<Bounds>,
    pub normalization: Normalization,
    /// Range of the up axis after normalization
    pub up_range: Option<(f32, f32)>,
}

impl LoadReport {
    pub fn vertex_parse_warnings(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, LoadWarning::VertexParse { .. }))
            .count()
    }
}

/// A successfully loaded model
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub mesh: Mesh,
    pub report: LoadReport,
}

/// Load an ASCII STL file from disk
pub fn load_stl(path: impl AsRef<Path>, config: &LoaderConfig) -> Result<LoadedModel, LoadError> {
    let path = path.as_ref();
    info!("Attempting to load STL file: {}", path.display());

    let data = fs::read(path).map_err(|e| {
        error!(
            "Could not open STL file '{}': {}. Check path and permissions.",
            path.display(),
            e
        );
        LoadError::file_open(path, e)
    })?;

    let text = match std::str::from_utf8(&data) {
        Ok(text) if !text.contains('\0') => text,
        _ => {
            error!("'{}' is not an ASCII STL file", path.display());
            return Err(LoadError::NotAscii {
                path: path.to_path_buf(),
            });
        }
    };

    parse_stl_source(path, text, config)
}

/// Parse ASCII STL text already in memory
pub fn parse_stl_str(text: &str, config: &LoaderConfig) -> Result<LoadedModel, LoadError> {
    parse_stl_source(Path::new("<memory>"), text, config)
}

fn parse_stl_source(
    source: &Path,
    text: &str,
    config: &LoaderConfig,
) -> Result<LoadedModel, LoadError> {
    let counted = count_facets(text);
    if counted == 0 {
        error!("No facets found in STL file '{}'.", source.display());
        return Err(LoadError::NoFacets {
            path: source.to_path_buf(),
        });
    }
    debug!("Found {} facets (first pass).", counted);

    let (vertices, faces) = reserve_buffers(counted)?;
    debug!(
        "Memory allocated for {} vertices and {} faces.",
        counted * 3,
        counted
    );

    let mut builder = MeshBuilder::new(vertices, faces, counted, config);
    for (index, line) in text.lines().enumerate() {
        builder.feed_line(index + 1, line);
    }
    let (mut mesh, mut warnings) = builder.finish();

    if mesh.faces.is_empty() {
        warn!("STL parsing resulted in zero valid faces.");
    }

    let bounds = Bounds::of(mesh.vertices.iter().map(|v| &v.position));
    let normalization = match bounds {
        Some(bounds) => Normalization::fit(&bounds, config.target_size),
        None => {
            if !mesh.vertices.is_empty() {
                record(&mut warnings, LoadWarning::UnboundedModel);
            }
            Normalization::default()
        }
    };
    for vertex in &mut mesh.vertices {
        vertex.position = normalization.apply(&vertex.position);
    }

    let up_range = assign_gradient(&mut mesh.vertices, config);
    if let Some((min, max)) = up_range {
        debug!("Vertex colors calculated based on up range [{:.2}, {:.2}]", min, max);
    }

    info!(
        "Successfully processed STL: {}, Faces: {}, Vertices: {}",
        source.display(),
        mesh.face_count(),
        mesh.vertex_count()
    );

    Ok(LoadedModel {
        mesh,
        report: LoadReport {
            source: source.to_path_buf(),
            counted_facets: counted,
            warnings,
            bounds,
            normalization,
            up_range,
        },
    })
}

/// Number of lines that open a facet
pub fn count_facets(text: &str) -> usize {
    text.lines()
        .filter(|line| line.trim_start().starts_with(FACET_START))
        .count()
}

fn reserve_buffers(face_count: usize) -> Result<(Vec<Vertex>, Vec<Face>), LoadError> {
    let vertex_count = face_count.saturating_mul(3);
    let allocation_error = |source| {
        error!("Memory allocation failed for model data.");
        LoadError::Allocation {
            faces: face_count,
            vertices: vertex_count,
            source,
        }
    };

    let mut vertices = Vec::new();
    vertices
        .try_reserve_exact(vertex_count)
        .map_err(allocation_error)?;
    let mut faces = Vec::new();
    faces.try_reserve_exact(face_count).map_err(allocation_error)?;

    Ok((vertices, faces))
}

/// Second-pass state: fills the reserved buffers line by line
struct MeshBuilder<'a> {
    mesh: Mesh,
    capacity: usize,
    /// Vertices read since the last face was closed, most recent three
    pending: Vec<Vec3>,
    warnings: Vec<LoadWarning>,
    config: &'a LoaderConfig,
}

impl<'a> MeshBuilder<'a> {
    fn new(
        vertices: Vec<Vertex>,
        faces: Vec<Face>,
        capacity: usize,
        config: &'a LoaderConfig,
    ) -> Self {
        Self {
            mesh: Mesh::from_parts(vertices, faces),
            capacity,
            pending: Vec::with_capacity(3),
            warnings: Vec::new(),
            config,
        }
    }

    fn is_full(&self) -> bool {
        self.mesh.faces.len() >= self.capacity
    }

    fn feed_line(&mut self, line_num: usize, line: &str) {
        let trimmed = line.trim();
        if trimmed.starts_with(FACET_END) {
            self.close_facet(line_num);
        } else if trimmed.starts_with(VERTEX) {
            self.read_vertex(line_num, trimmed);
        } else if trimmed.starts_with("facet") {
            self.pending.clear();
        }
    }

    fn read_vertex(&mut self, line_num: usize, trimmed: &str) {
        if self.is_full() {
            record(
                &mut self.warnings,
                LoadWarning::ExcessVertex {
                    line: line_num,
                    capacity: self.capacity * 3,
                },
            );
            return;
        }

        match vertex_line(trimmed) {
            Ok((_, position)) => {
                if self.pending.len() == 3 {
                    self.pending.remove(0);
                }
                self.pending.push(position);
            }
            Err(_) => record(
                &mut self.warnings,
                LoadWarning::VertexParse {
                    line: line_num,
                    text: trimmed.to_string(),
                },
            ),
        }
    }

    fn close_facet(&mut self, line_num: usize) {
        if self.is_full() {
            record(&mut self.warnings, LoadWarning::ExcessFacet { line: line_num });
            self.pending.clear();
            return;
        }

        if let &[a, b, c] = self.pending.as_slice() {
            let color = self.config.bottom_color;
            self.mesh.push_triangle([
                Vertex { position: a, color },
                Vertex { position: b, color },
                Vertex { position: c, color },
            ]);
        } else {
            record(
                &mut self.warnings,
                LoadWarning::IncompleteFace {
                    line: line_num,
                    available: self.pending.len(),
                    face: self.mesh.faces.len(),
                },
            );
        }
        self.pending.clear();
    }

    fn finish(mut self) -> (Mesh, Vec<LoadWarning>) {
        let actual = self.mesh.faces.len();
        if actual != self.capacity {
            record(
                &mut self.warnings,
                LoadWarning::FaceCountMismatch {
                    expected: self.capacity,
                    actual,
                },
            );
        }
        (self.mesh, self.warnings)
    }
}

fn record(warnings: &mut Vec<LoadWarning>, warning: LoadWarning) {
    warn!("{}", warning);
    warnings.push(warning);
}

/// `vertex x y z`. Anything after the third number is left unparsed.
fn vertex_line(input: &str) -> IResult<&str, Vec3> {
    preceded(
        tag(VERTEX),
        map(
            tuple((
                preceded(space1, float),
                preceded(space1, float),
                preceded(space1, float),
            )),
            |(x, y, z)| Vec3::new(x, y, z),
        ),
    )(input)
}

/// Color each vertex along the up axis. Returns the up range used, or
/// `None` when there are no vertices.
pub fn assign_gradient(vertices: &mut [Vertex], config: &LoaderConfig) -> Option<(f32, f32)> {
    let axis = config.up_axis;
    let (min, max) = vertices
        .iter()
        .map(|v| axis.component(&v.position))
        .fold(None, |range: Option<(f32, f32)>, up| match range {
            Some((lo, hi)) => Some((lo.min(up), hi.max(up))),
            None => Some((up, up)),
        })?;

    let span = max - min;
    for vertex in vertices.iter_mut() {
        let t = if span > EPSILON {
            (axis.component(&vertex.position) - min) / span
        } else {
            0.5
        };
        let t = t.clamp(0.0, 1.0);
        vertex.color = config.bottom_color.lerp(&config.top_color, t);
    }

    Some((min, max))
}

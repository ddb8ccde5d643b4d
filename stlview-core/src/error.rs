/// Terminal failures of the mesh loader and the recoverable anomalies it
/// reports while parsing
use std::collections::TryReserveError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a model load. No mesh is produced.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The input file could not be opened or read
    #[error("could not open STL file '{}': {}", path.display(), source)]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The content is not text (binary STL is unsupported)
    #[error("'{}' is not an ASCII STL file (binary STL is not supported)", path.display())]
    NotAscii { path: PathBuf },

    /// The count pass found no `facet normal` lines
    #[error("no facets found in STL file '{}'", path.display())]
    NoFacets { path: PathBuf },

    /// Reserving the vertex or face buffers failed
    #[error("memory allocation failed for {faces} faces ({vertices} vertices)")]
    Allocation {
        faces: usize,
        vertices: usize,
        #[source]
        source: TryReserveError,
    },
}

impl LoadError {
    pub fn file_open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileOpen {
            path: path.into(),
            source,
        }
    }

    /// True for the variants produced by malformed content rather than I/O
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::NotAscii { .. } | Self::NoFacets { .. })
    }
}

/// Anomalies the loader recovers from. Each one is logged and recorded in
/// the load report; none of them aborts the load.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadWarning {
    /// A `vertex` line did not yield three numbers; the line was skipped
    #[error("line {line}: failed to parse 3 floats for vertex from '{text}'")]
    VertexParse { line: usize, text: String },

    /// An `endfacet` arrived with fewer than three vertices since the last face
    #[error("line {line}: not enough vertices ({available}) to form face {face}, STL might be corrupt")]
    IncompleteFace {
        line: usize,
        available: usize,
        face: usize,
    },

    /// A vertex was read after every counted face slot was filled
    #[error("line {line}: read more vertices than allocated ({capacity}), ignoring")]
    ExcessVertex { line: usize, capacity: usize },

    /// An `endfacet` was read after every counted face slot was filled
    #[error("line {line}: read more 'endfacet' than counted, ignoring")]
    ExcessFacet { line: usize },

    /// Fewer faces were closed than the count pass found
    #[error("final face count mismatch, expected {expected}, processed {actual}")]
    FaceCountMismatch { expected: usize, actual: usize },

    /// Vertices were loaded but their bounds are not finite
    #[error("could not determine model bounds accurately")]
    UnboundedModel,
}

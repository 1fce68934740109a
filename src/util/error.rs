//! Error types for glTF operations.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Broad error category, used to decide whether a failure is recoverable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed container framing, base64 payload or JSON syntax.
    Format,
    /// Required field missing, bad index reference, inconsistent layout.
    Schema,
    /// External file or embedded resource could not be resolved.
    Resource,
    /// Malformed node hierarchy.
    Graph,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Format => "format",
            Self::Schema => "schema",
            Self::Resource => "resource",
            Self::Graph => "graph",
        };
        f.write_str(name)
    }
}

/// Main error type for glTF operations.
#[derive(Error, Debug)]
pub enum Error {
    /// First four bytes of a binary container are not `glTF`
    #[error("Invalid binary glTF: expected 'glTF' magic bytes")]
    InvalidMagic,

    /// Binary container version other than 2
    #[error("Unsupported binary glTF version: {0}")]
    UnsupportedVersion(u32),

    /// Header total length disagrees with the actual byte count
    #[error("Binary glTF length mismatch: header says {declared} bytes, got {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    /// A chunk would read past the end of the container
    #[error("Chunk {index} at offset {offset} with length {length} exceeds container size {size}")]
    ChunkOutOfBounds { index: usize, offset: usize, length: usize, size: usize },

    /// First chunk is not a JSON chunk
    #[error("Binary glTF must start with a JSON chunk")]
    MissingJsonChunk,

    /// More than one BIN chunk
    #[error("Binary glTF contains more than one BIN chunk")]
    DuplicateBinChunk,

    /// Embedded payload is not valid base64
    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(String),

    /// JSON document is not well formed
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// Invalid data structure
    #[error("Invalid file structure: {0}")]
    InvalidStructure(String),

    /// Required field missing or wrong type
    #[error("Schema violation: {0}")]
    Schema(String),

    /// Index reference outside its target array
    #[error("{kind} index {index} out of range (count: {count})")]
    IndexOutOfRange { kind: &'static str, index: usize, count: usize },

    /// Component type not allowed in this position
    #[error("Invalid component type {value} for {context}")]
    InvalidComponentType { value: u32, context: &'static str },

    /// Accessor reads outside its buffer view
    #[error("Accessor {accessor} needs {needed} bytes but its view provides {available}")]
    AccessorOutOfBounds { accessor: usize, needed: usize, available: usize },

    /// External file does not exist
    #[error("Resource not found: {0}")]
    ResourceNotFound(PathBuf),

    /// Resource could not be resolved for another reason
    #[error("Cannot resolve resource '{uri}': {reason}")]
    Resource { uri: String, reason: String },

    /// Buffer data was never loaded (or was skipped as missing)
    #[error("Buffer {0} has no data loaded")]
    BufferNotLoaded(usize),

    /// Image codec failure
    #[error("Image error: {0}")]
    Image(String),

    /// Malformed node hierarchy
    #[error("Invalid node hierarchy: {0}")]
    Graph(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Create a schema error.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Create a graph error.
    pub fn graph(msg: impl Into<String>) -> Self {
        Self::Graph(msg.into())
    }

    /// Create a resource error for a URI.
    pub fn resource(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resource { uri: uri.into(), reason: reason.into() }
    }

    /// Check that `index` addresses one of `count` entries.
    pub fn check_index(kind: &'static str, index: usize, count: usize) -> Result<usize> {
        if index < count {
            Ok(index)
        } else {
            Err(Self::IndexOutOfRange { kind, index, count })
        }
    }

    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMagic
            | Self::UnsupportedVersion(_)
            | Self::LengthMismatch { .. }
            | Self::ChunkOutOfBounds { .. }
            | Self::MissingJsonChunk
            | Self::DuplicateBinChunk
            | Self::InvalidBase64(_)
            | Self::InvalidJson(_)
            | Self::InvalidStructure(_) => ErrorKind::Format,
            Self::Schema(_)
            | Self::IndexOutOfRange { .. }
            | Self::InvalidComponentType { .. }
            | Self::AccessorOutOfBounds { .. } => ErrorKind::Schema,
            Self::ResourceNotFound(_)
            | Self::Resource { .. }
            | Self::BufferNotLoaded(_)
            | Self::Image(_)
            | Self::Io(_) => ErrorKind::Resource,
            Self::Graph(_) => ErrorKind::Graph,
        }
    }

    /// True when `skip_missing` may substitute a placeholder for this failure.
    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::Resource
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        use serde_json::error::Category;
        match e.classify() {
            Category::Syntax | Category::Eof => Self::InvalidJson(e.to_string()),
            Category::Data => Self::Schema(e.to_string()),
            Category::Io => Self::Io(e.into()),
        }
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Self::InvalidBase64(e.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Self::Image(e.to_string())
    }
}

/// Result type alias for glTF operations.
pub type Result<T> = std::result::Result<T, Error>;

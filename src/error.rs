//! Error types for sketch construction and graph updates.

use thiserror::Error;

/// Result type for connectivity operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building sketches or mutating the graph.
///
/// Sketch recovery misses are not errors; they show up as `None` samples.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An intermediate value does not fit in 64 bits. The vertex count or
    /// sketch domain is too large for this implementation.
    #[error("Integer overflow while computing {context}")]
    Overflow {
        /// What was being computed
        context: &'static str,
    },

    /// A sketch parameter is outside its valid range.
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// Error message
        message: String,
    },

    /// A vertex index is not below the vertex count.
    #[error("Vertex {vertex} out of range for a graph with {vertex_count} vertices")]
    VertexOutOfRange {
        /// Offending vertex
        vertex: usize,
        /// Number of vertices in the graph
        vertex_count: usize,
    },

    /// Both endpoints of an edge are the same vertex.
    #[error("Self-loop on vertex {vertex}")]
    SelfLoop {
        /// Offending vertex
        vertex: usize,
    },
}

impl Error {
    pub(crate) fn overflow(context: &'static str) -> Self {
        Error::Overflow { context }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidParameter {
            message: message.into(),
        }
    }
}

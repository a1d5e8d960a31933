//! Mesh interchange model
//!
//! Bit-faithful transcoding between a [`NativeMesh`] and the flat
//! [`MeshData`] arrays the suppression transform works on.

mod decode;
mod encode;
mod native;
mod types;
mod validate;

pub use native::{FrameDeltas, IndexFormat, NativeMesh, UvChannel};
pub use types::{
    BoneWeight, MAX_PRIMITIVE_SIZE, MeshData, MeshTopology, MorphChannel, MorphDelta, MorphFrame,
    Primitive, SubMesh, Topology, UV_CHANNEL_COUNT, Vertex, VertexLayout,
};

/// Errors raised while decoding, encoding or validating a mesh
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    /// Submesh topology other than points/lines/triangles/quads
    #[error("submesh {submesh} has unsupported topology {topology:?}")]
    UnsupportedTopology {
        submesh: usize,
        topology: MeshTopology,
    },

    /// UV channel dimension outside 2..=4
    #[error("uv channel {channel} has unsupported dimension {dimension} (must be 2-4)")]
    UnsupportedUvDimension { channel: usize, dimension: u8 },

    /// Attribute stream length differs from the vertex count
    #[error("{attribute} has {actual} entries, expected {expected}")]
    AttributeLength {
        attribute: String,
        expected: usize,
        actual: usize,
    },

    /// Per-vertex influence counts do not add up to the influence list
    #[error("bone weight counts sum to {expected} but {actual} bone weights are present")]
    BoneWeightCountMismatch { expected: usize, actual: usize },

    /// Index buffer references a vertex past the end
    #[error("submesh {submesh} index {position} references vertex {index} of {vertex_count}")]
    IndexOutOfRange {
        submesh: usize,
        position: usize,
        index: u32,
        vertex_count: usize,
    },

    /// Native meshes store at most 255 influences per vertex
    #[error("vertex {vertex} has {count} bone weights (maximum 255)")]
    TooManyBoneWeights { vertex: usize, count: usize },

    /// Blend shape frame weights must be strictly increasing
    #[error("blend shape '{name}' frame weight {weight} does not exceed previous weight {previous}")]
    FrameOrder {
        name: String,
        weight: f32,
        previous: f32,
    },

    /// Blend shape names identify channels and must be unique
    #[error("blend shape name '{0}' is used more than once")]
    DuplicateChannelName(String),

    /// A cross-reference range or index is inconsistent
    #[error("mesh integrity violated: {0}")]
    Integrity(String),
}

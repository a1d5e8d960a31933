//! Flat array types of the interchange model
//!
//! Every container relationship (submesh -> primitives, channel -> frames,
//! frame -> deltas, vertex -> bone weights) is an `(index, count)` range into
//! a separate flat array owned by [`MeshData`].

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Number of UV channels a vertex can carry
pub const UV_CHANNEL_COUNT: usize = 8;

/// Maximum number of vertex indices in a primitive (quads)
pub const MAX_PRIMITIVE_SIZE: usize = 4;

/// One vertex with every attribute the native mesh can declare
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tangent: Vec4,
    /// RGBA8 color
    pub color: [u8; 4],
    /// UVs are always stored as 4 components; see [`VertexLayout::uv_dimensions`]
    pub uvs: [Vec4; UV_CHANNEL_COUNT],
    pub bone_weight_index: usize,
    pub bone_weight_count: usize,
}

impl Vertex {
    /// Range of this vertex's influences in [`MeshData::bone_weights`]
    #[inline]
    pub fn bone_weight_range(&self) -> Range<usize> {
        self.bone_weight_index..self.bone_weight_index + self.bone_weight_count
    }
}

/// A single bone influence
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoneWeight {
    pub bone_index: u32,
    pub weight: f32,
}

impl BoneWeight {
    pub fn new(bone_index: u32, weight: f32) -> Self {
        Self { bone_index, weight }
    }
}

/// Topology as declared by the native mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshTopology {
    Points,
    Lines,
    LineStrip,
    Triangles,
    Quads,
}

/// Topology kinds the interchange model can represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    Points,
    Lines,
    Triangles,
    Quads,
}

impl Topology {
    /// Vertex indices per primitive
    #[inline]
    pub const fn size(self) -> usize {
        match self {
            Topology::Points => 1,
            Topology::Lines => 2,
            Topology::Triangles => 3,
            Topology::Quads => 4,
        }
    }

    /// Map a native topology, `None` for strip topologies
    pub fn from_native(topology: MeshTopology) -> Option<Self> {
        match topology {
            MeshTopology::Points => Some(Topology::Points),
            MeshTopology::Lines => Some(Topology::Lines),
            MeshTopology::Triangles => Some(Topology::Triangles),
            MeshTopology::Quads => Some(Topology::Quads),
            MeshTopology::LineStrip => None,
        }
    }

    pub fn to_native(self) -> MeshTopology {
        match self {
            Topology::Points => MeshTopology::Points,
            Topology::Lines => MeshTopology::Lines,
            Topology::Triangles => MeshTopology::Triangles,
            Topology::Quads => MeshTopology::Quads,
        }
    }
}

/// A draw-call worth of primitives sharing one topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubMesh {
    pub topology: Topology,
    pub primitive_index: usize,
    pub primitive_count: usize,
}

impl SubMesh {
    #[inline]
    pub fn primitive_range(&self) -> Range<usize> {
        self.primitive_index..self.primitive_index + self.primitive_count
    }
}

/// One point/line/triangle/quad
///
/// Only the first `topology.size()` indices are meaningful; the rest stay 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Primitive {
    pub indices: [u32; MAX_PRIMITIVE_SIZE],
}

impl Primitive {
    /// Build a primitive from up to four indices
    pub fn from_slice(indices: &[u32]) -> Self {
        let mut primitive = Self::default();
        primitive.indices[..indices.len()].copy_from_slice(indices);
        primitive
    }

    /// The meaningful indices for a topology
    #[inline]
    pub fn vertices(&self, topology: Topology) -> &[u32] {
        &self.indices[..topology.size()]
    }
}

/// A named morph channel ("blend shape")
#[derive(Debug, Clone, PartialEq)]
pub struct MorphChannel {
    pub name: String,
    pub frame_index: usize,
    pub frame_count: usize,
}

impl MorphChannel {
    #[inline]
    pub fn frame_range(&self) -> Range<usize> {
        self.frame_index..self.frame_index + self.frame_count
    }
}

/// One weighted frame of a morph channel
///
/// `delta_count` always equals the vertex count: one delta per vertex, in
/// vertex order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MorphFrame {
    /// Frame weight on the 0-100 scale
    pub weight: f32,
    pub delta_index: usize,
    pub delta_count: usize,
}

impl MorphFrame {
    #[inline]
    pub fn delta_range(&self) -> Range<usize> {
        self.delta_index..self.delta_index + self.delta_count
    }
}

/// Per-vertex offsets applied by a morph frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MorphDelta {
    pub position: Vec3,
    pub normal: Vec3,
    pub tangent: Vec3,
}

impl MorphDelta {
    pub const ZERO: Self = Self {
        position: Vec3::ZERO,
        normal: Vec3::ZERO,
        tangent: Vec3::ZERO,
    };

    /// A delta that only moves the position
    pub const fn from_position(position: Vec3) -> Self {
        Self {
            position,
            normal: Vec3::ZERO,
            tangent: Vec3::ZERO,
        }
    }
}

/// Which optional vertex attributes the source mesh declared
///
/// Positions are always present. Encoding writes exactly what is recorded here
/// so attribute presence round-trips along with the values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VertexLayout {
    pub normal: bool,
    pub tangent: bool,
    pub color: bool,
    pub skinned: bool,
    /// Native dimension (2, 3 or 4) of each UV channel, `None` when absent
    pub uv_dimensions: [Option<u8>; UV_CHANNEL_COUNT],
}

/// Flat, channel-indexed intermediate representation of a mesh
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub layout: VertexLayout,
    pub vertices: Vec<Vertex>,
    pub bone_weights: Vec<BoneWeight>,
    pub submeshes: Vec<SubMesh>,
    pub primitives: Vec<Primitive>,
    pub channels: Vec<MorphChannel>,
    pub frames: Vec<MorphFrame>,
    pub deltas: Vec<MorphDelta>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Frames belonging to a channel
    pub fn channel_frames(&self, channel: &MorphChannel) -> &[MorphFrame] {
        &self.frames[channel.frame_range()]
    }

    /// Deltas belonging to a frame, one per vertex
    pub fn frame_deltas(&self, frame: &MorphFrame) -> &[MorphDelta] {
        &self.deltas[frame.delta_range()]
    }

    /// Primitives belonging to a submesh
    pub fn submesh_primitives(&self, submesh: &SubMesh) -> &[Primitive] {
        &self.primitives[submesh.primitive_range()]
    }

    /// Bone influences of a vertex
    pub fn vertex_bone_weights(&self, vertex: &Vertex) -> &[BoneWeight] {
        &self.bone_weights[vertex.bone_weight_range()]
    }

    /// Look up a channel index by name
    pub fn channel_index(&self, name: &str) -> Option<usize> {
        self.channels.iter().position(|c| c.name == name)
    }
}

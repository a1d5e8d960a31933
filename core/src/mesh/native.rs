//! Boundary to the engine-native mesh object
//!
//! [`NativeMesh`] mirrors the accessor/mutator surface of an engine mesh:
//! optional per-vertex attribute streams, per-submesh index buffers, a
//! flattened bone weight list with per-vertex counts and a list of blend
//! shapes built up frame by frame. The interchange model only talks to the
//! engine through this trait.

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use super::MeshError;
use super::types::{BoneWeight, MeshTopology};

/// Width of the native index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexFormat {
    #[default]
    U16,
    U32,
}

impl IndexFormat {
    /// Narrow indices while every vertex index fits below `u16::MAX`
    pub fn for_vertex_count(vertex_count: usize) -> Self {
        if vertex_count < u16::MAX as usize {
            IndexFormat::U16
        } else {
            IndexFormat::U32
        }
    }
}

/// A UV stream together with its declared dimension
#[derive(Debug, Clone, Copy)]
pub struct UvChannel<'a> {
    /// 2, 3 or 4
    pub dimension: u8,
    /// Values widened to 4 components; unused components are zero
    pub values: &'a [Vec4],
}

/// Delta streams of one blend shape frame
#[derive(Debug, Clone, Copy)]
pub struct FrameDeltas<'a> {
    pub positions: &'a [Vec3],
    pub normals: &'a [Vec3],
    pub tangents: &'a [Vec3],
}

/// Engine-native mesh accessors and mutators
pub trait NativeMesh {
    fn vertex_count(&self) -> usize;

    fn positions(&self) -> &[Vec3];
    fn normals(&self) -> Option<&[Vec3]>;
    fn tangents(&self) -> Option<&[Vec4]>;
    fn colors(&self) -> Option<&[[u8; 4]]>;
    fn uv(&self, channel: usize) -> Option<UvChannel<'_>>;

    /// Influence count per vertex, `None` for meshes without skin weights
    fn bones_per_vertex(&self) -> Option<&[u8]>;
    /// All influences, flattened in vertex order
    fn bone_weights(&self) -> &[BoneWeight];

    fn submesh_count(&self) -> usize;
    fn topology(&self, submesh: usize) -> MeshTopology;
    fn indices(&self, submesh: usize) -> &[u32];
    fn index_format(&self) -> IndexFormat;

    fn blend_shape_count(&self) -> usize;
    fn blend_shape_name(&self, shape: usize) -> &str;
    fn blend_shape_frame_count(&self, shape: usize) -> usize;
    fn blend_shape_frame_weight(&self, shape: usize, frame: usize) -> f32;
    fn blend_shape_frame_deltas(&self, shape: usize, frame: usize) -> FrameDeltas<'_>;

    /// Index of the blend shape called `name`
    fn blend_shape_index(&self, name: &str) -> Option<usize> {
        (0..self.blend_shape_count()).find(|&shape| self.blend_shape_name(shape) == name)
    }

    /// Drop all vertex, index and blend shape data
    fn clear(&mut self);

    fn set_positions(&mut self, positions: Vec<Vec3>);
    fn set_normals(&mut self, normals: Vec<Vec3>);
    fn set_tangents(&mut self, tangents: Vec<Vec4>);
    fn set_colors(&mut self, colors: Vec<[u8; 4]>);
    fn set_uv(&mut self, channel: usize, dimension: u8, values: Vec<Vec4>);
    fn set_bone_weights(&mut self, bones_per_vertex: Vec<u8>, weights: Vec<BoneWeight>);

    fn set_index_format(&mut self, format: IndexFormat);
    fn set_submesh_count(&mut self, count: usize);
    fn set_indices(&mut self, submesh: usize, topology: MeshTopology, indices: Vec<u32>);

    /// Append a frame to the blend shape called `name`, creating the shape
    /// when it is not the most recently added one.
    ///
    /// Frame weights of one shape must be strictly increasing.
    fn add_blend_shape_frame(
        &mut self,
        name: &str,
        weight: f32,
        deltas: FrameDeltas<'_>,
    ) -> Result<(), MeshError>;
}

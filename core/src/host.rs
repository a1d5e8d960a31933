//! In-memory native mesh
//!
//! [`HostMesh`] stores attribute streams the way an engine mesh object does:
//! each optional attribute is either absent or has one entry per vertex, UV
//! channels carry their declared dimension, and blend shapes own their frames
//! directly. It is serde-serializable so meshes can travel as JSON documents.

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::mesh::{
    BoneWeight, FrameDeltas, IndexFormat, MeshError, MeshTopology, NativeMesh, UV_CHANNEL_COUNT,
    UvChannel,
};

/// One UV stream with its declared dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostUv {
    /// 2, 3 or 4 components
    pub dimension: u8,
    pub values: Vec<Vec4>,
}

/// One submesh index buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSubMesh {
    pub topology: MeshTopology,
    pub indices: Vec<u32>,
}

impl Default for HostSubMesh {
    fn default() -> Self {
        Self {
            topology: MeshTopology::Triangles,
            indices: Vec::new(),
        }
    }
}

/// One blend shape frame with a delta per vertex
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HostBlendShapeFrame {
    pub weight: f32,
    #[serde(with = "vec3_stream")]
    pub delta_positions: Vec<Vec3>,
    #[serde(with = "vec3_stream")]
    pub delta_normals: Vec<Vec3>,
    #[serde(with = "vec3_stream")]
    pub delta_tangents: Vec<Vec3>,
}

impl HostBlendShapeFrame {
    /// A frame that only moves positions
    pub fn from_positions(weight: f32, delta_positions: Vec<Vec3>) -> Self {
        let count = delta_positions.len();
        Self {
            weight,
            delta_positions,
            delta_normals: vec![Vec3::ZERO; count],
            delta_tangents: vec![Vec3::ZERO; count],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HostBlendShape {
    pub name: String,
    pub frames: Vec<HostBlendShapeFrame>,
}

/// Engine-style mesh object held in memory
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normals: Option<Vec<Vec3>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tangents: Option<Vec<Vec4>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<[u8; 4]>>,
    pub uvs: [Option<HostUv>; UV_CHANNEL_COUNT],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bones_per_vertex: Option<Vec<u8>>,
    pub bone_weights: Vec<BoneWeight>,
    pub index_format: IndexFormat,
    pub submeshes: Vec<HostSubMesh>,
    pub blend_shapes: Vec<HostBlendShape>,
}

impl NativeMesh for HostMesh {
    fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    fn normals(&self) -> Option<&[Vec3]> {
        self.normals.as_deref()
    }

    fn tangents(&self) -> Option<&[Vec4]> {
        self.tangents.as_deref()
    }

    fn colors(&self) -> Option<&[[u8; 4]]> {
        self.colors.as_deref()
    }

    fn uv(&self, channel: usize) -> Option<UvChannel<'_>> {
        self.uvs.get(channel)?.as_ref().map(|uv| UvChannel {
            dimension: uv.dimension,
            values: &uv.values,
        })
    }

    fn bones_per_vertex(&self) -> Option<&[u8]> {
        self.bones_per_vertex.as_deref()
    }

    fn bone_weights(&self) -> &[BoneWeight] {
        &self.bone_weights
    }

    fn submesh_count(&self) -> usize {
        self.submeshes.len()
    }

    fn topology(&self, submesh: usize) -> MeshTopology {
        self.submeshes[submesh].topology
    }

    fn indices(&self, submesh: usize) -> &[u32] {
        &self.submeshes[submesh].indices
    }

    fn index_format(&self) -> IndexFormat {
        self.index_format
    }

    fn blend_shape_count(&self) -> usize {
        self.blend_shapes.len()
    }

    fn blend_shape_name(&self, shape: usize) -> &str {
        &self.blend_shapes[shape].name
    }

    fn blend_shape_frame_count(&self, shape: usize) -> usize {
        self.blend_shapes[shape].frames.len()
    }

    fn blend_shape_frame_weight(&self, shape: usize, frame: usize) -> f32 {
        self.blend_shapes[shape].frames[frame].weight
    }

    fn blend_shape_frame_deltas(&self, shape: usize, frame: usize) -> FrameDeltas<'_> {
        let frame = &self.blend_shapes[shape].frames[frame];
        FrameDeltas {
            positions: &frame.delta_positions,
            normals: &frame.delta_normals,
            tangents: &frame.delta_tangents,
        }
    }

    fn clear(&mut self) {
        *self = HostMesh {
            name: std::mem::take(&mut self.name),
            ..HostMesh::default()
        };
    }

    fn set_positions(&mut self, positions: Vec<Vec3>) {
        self.positions = positions;
    }

    fn set_normals(&mut self, normals: Vec<Vec3>) {
        self.normals = Some(normals);
    }

    fn set_tangents(&mut self, tangents: Vec<Vec4>) {
        self.tangents = Some(tangents);
    }

    fn set_colors(&mut self, colors: Vec<[u8; 4]>) {
        self.colors = Some(colors);
    }

    fn set_uv(&mut self, channel: usize, dimension: u8, values: Vec<Vec4>) {
        if let Some(slot) = self.uvs.get_mut(channel) {
            *slot = Some(HostUv { dimension, values });
        }
    }

    fn set_bone_weights(&mut self, bones_per_vertex: Vec<u8>, weights: Vec<BoneWeight>) {
        self.bones_per_vertex = Some(bones_per_vertex);
        self.bone_weights = weights;
    }

    fn set_index_format(&mut self, format: IndexFormat) {
        self.index_format = format;
    }

    fn set_submesh_count(&mut self, count: usize) {
        self.submeshes.resize_with(count, HostSubMesh::default);
    }

    fn set_indices(&mut self, submesh: usize, topology: MeshTopology, indices: Vec<u32>) {
        if submesh >= self.submeshes.len() {
            self.set_submesh_count(submesh + 1);
        }
        self.submeshes[submesh] = HostSubMesh { topology, indices };
    }

    fn add_blend_shape_frame(
        &mut self,
        name: &str,
        weight: f32,
        deltas: FrameDeltas<'_>,
    ) -> Result<(), MeshError> {
        let frame = HostBlendShapeFrame {
            weight,
            delta_positions: deltas.positions.to_vec(),
            delta_normals: deltas.normals.to_vec(),
            delta_tangents: deltas.tangents.to_vec(),
        };

        match self.blend_shapes.last_mut() {
            Some(shape) if shape.name == name => {
                if let Some(previous) = shape.frames.last() {
                    if weight <= previous.weight {
                        return Err(MeshError::FrameOrder {
                            name: name.to_owned(),
                            weight,
                            previous: previous.weight,
                        });
                    }
                }
                shape.frames.push(frame);
            }
            _ => self.blend_shapes.push(HostBlendShape {
                name: name.to_owned(),
                frames: vec![frame],
            }),
        }

        Ok(())
    }
}

/// Serde adapter for delta streams
///
/// Toggle channels park vertices at +inf, which JSON numbers cannot express.
/// Non-finite components are written as the strings `"inf"`, `"-inf"` and
/// `"nan"`.
mod vec3_stream {
    use glam::Vec3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Component {
        Number(f32),
        Special(String),
    }

    impl From<f32> for Component {
        fn from(value: f32) -> Self {
            if value.is_finite() {
                Component::Number(value)
            } else if value.is_nan() {
                Component::Special("nan".to_owned())
            } else if value > 0.0 {
                Component::Special("inf".to_owned())
            } else {
                Component::Special("-inf".to_owned())
            }
        }
    }

    impl Component {
        fn into_f32<E: serde::de::Error>(self) -> Result<f32, E> {
            match self {
                Component::Number(value) => Ok(value),
                Component::Special(text) => match text.as_str() {
                    "inf" => Ok(f32::INFINITY),
                    "-inf" => Ok(f32::NEG_INFINITY),
                    "nan" => Ok(f32::NAN),
                    other => Err(E::custom(format!("invalid float component '{other}'"))),
                },
            }
        }
    }

    pub fn serialize<S: Serializer>(values: &[Vec3], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            values
                .iter()
                .map(|v| v.to_array().map(Component::from)),
        )
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec3>, D::Error> {
        let raw: Vec<[Component; 3]> = Vec::deserialize(deserializer)?;
        raw.into_iter()
            .map(|[x, y, z]| {
                Ok(Vec3::new(
                    x.into_f32::<D::Error>()?,
                    y.into_f32::<D::Error>()?,
                    z.into_f32::<D::Error>()?,
                ))
            })
            .collect()
    }
}

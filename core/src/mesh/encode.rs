//! [`MeshData`] -> native mesh

use glam::Vec3;

use super::MeshError;
use super::native::{FrameDeltas, IndexFormat, NativeMesh};
use super::types::{MeshData, UV_CHANNEL_COUNT};

impl MeshData {
    /// Write the flat arrays back into a native mesh
    ///
    /// The target is cleared first, so no stale attribute, submesh or blend
    /// shape survives. Only attributes recorded in [`MeshData::layout`] are
    /// written. The index format is recomputed from the final vertex count.
    ///
    /// The data is validated before the target is touched; on error the
    /// native mesh is left unchanged.
    pub fn apply_to<M: NativeMesh + ?Sized>(&self, mesh: &mut M) -> Result<(), MeshError> {
        self.validate()?;

        let bones_per_vertex = if self.layout.skinned {
            let counts = self
                .vertices
                .iter()
                .enumerate()
                .map(|(vertex, v)| {
                    u8::try_from(v.bone_weight_count).map_err(|_| MeshError::TooManyBoneWeights {
                        vertex,
                        count: v.bone_weight_count,
                    })
                })
                .collect::<Result<Vec<u8>, _>>()?;
            Some(counts)
        } else {
            None
        };

        mesh.clear();
        self.write_vertices(mesh, bones_per_vertex);
        self.write_submeshes(mesh);
        self.write_channels(mesh)?;

        tracing::debug!(
            "Encoded mesh: {} vertices, {} primitives, {} channels",
            self.vertices.len(),
            self.primitives.len(),
            self.channels.len()
        );

        Ok(())
    }

    fn write_vertices<M: NativeMesh + ?Sized>(
        &self,
        mesh: &mut M,
        bones_per_vertex: Option<Vec<u8>>,
    ) {
        let layout = &self.layout;

        mesh.set_positions(self.vertices.iter().map(|v| v.position).collect());
        if layout.normal {
            mesh.set_normals(self.vertices.iter().map(|v| v.normal).collect());
        }
        if layout.tangent {
            mesh.set_tangents(self.vertices.iter().map(|v| v.tangent).collect());
        }
        if layout.color {
            mesh.set_colors(self.vertices.iter().map(|v| v.color).collect());
        }

        for channel in 0..UV_CHANNEL_COUNT {
            if let Some(dimension) = layout.uv_dimensions[channel] {
                mesh.set_uv(
                    channel,
                    dimension,
                    self.vertices.iter().map(|v| v.uvs[channel]).collect(),
                );
            }
        }

        if let Some(counts) = bones_per_vertex {
            mesh.set_bone_weights(counts, self.bone_weights.clone());
        }
    }

    fn write_submeshes<M: NativeMesh + ?Sized>(&self, mesh: &mut M) {
        mesh.set_index_format(IndexFormat::for_vertex_count(self.vertices.len()));
        mesh.set_submesh_count(self.submeshes.len());

        for (index, submesh) in self.submeshes.iter().enumerate() {
            let indices = self
                .submesh_primitives(submesh)
                .iter()
                .flat_map(|p| p.vertices(submesh.topology))
                .copied()
                .collect();
            mesh.set_indices(index, submesh.topology.to_native(), indices);
        }
    }

    fn write_channels<M: NativeMesh + ?Sized>(&self, mesh: &mut M) -> Result<(), MeshError> {
        let vertex_count = self.vertices.len();
        let mut positions = vec![Vec3::ZERO; vertex_count];
        let mut normals = vec![Vec3::ZERO; vertex_count];
        let mut tangents = vec![Vec3::ZERO; vertex_count];

        // A channel without frames has no native representation and is dropped
        for channel in &self.channels {
            for frame in self.channel_frames(channel) {
                for (k, delta) in self.frame_deltas(frame).iter().enumerate() {
                    positions[k] = delta.position;
                    normals[k] = delta.normal;
                    tangents[k] = delta.tangent;
                }
                mesh.add_blend_shape_frame(
                    &channel.name,
                    frame.weight,
                    FrameDeltas {
                        positions: &positions,
                        normals: &normals,
                        tangents: &tangents,
                    },
                )?;
            }
        }

        Ok(())
    }
}

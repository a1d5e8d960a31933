//! Native mesh -> [`MeshData`]

use super::MeshError;
use super::native::NativeMesh;
use super::types::{
    MeshData, MorphChannel, MorphDelta, MorphFrame, Primitive, SubMesh, Topology, UV_CHANNEL_COUNT,
    Vertex,
};

impl MeshData {
    /// Decode a native mesh into flat arrays
    ///
    /// Only attributes the native mesh declares are read; the rest stay at
    /// their zero default and are recorded as absent in the layout.
    ///
    /// # Errors
    /// Fails without a partial result on unsupported topology, mismatched
    /// attribute lengths, inconsistent bone weight counts or out-of-range
    /// indices, or a blend shape name used twice.
    pub fn from_native<M: NativeMesh + ?Sized>(mesh: &M) -> Result<Self, MeshError> {
        let mut data = MeshData::default();
        data.read_vertices(mesh)?;
        data.read_submeshes(mesh)?;
        data.read_channels(mesh)?;

        tracing::debug!(
            "Decoded mesh: {} vertices, {} bone weights, {} submeshes, {} primitives, {} channels, {} frames",
            data.vertices.len(),
            data.bone_weights.len(),
            data.submeshes.len(),
            data.primitives.len(),
            data.channels.len(),
            data.frames.len()
        );

        Ok(data)
    }

    fn read_vertices<M: NativeMesh + ?Sized>(&mut self, mesh: &M) -> Result<(), MeshError> {
        let vertex_count = mesh.vertex_count();
        self.vertices = vec![Vertex::default(); vertex_count];

        read_attribute(&mut self.vertices, mesh.positions(), "positions", |v, p| {
            v.position = p
        })?;

        if let Some(normals) = mesh.normals() {
            read_attribute(&mut self.vertices, normals, "normals", |v, n| v.normal = n)?;
            self.layout.normal = true;
        }
        if let Some(tangents) = mesh.tangents() {
            read_attribute(&mut self.vertices, tangents, "tangents", |v, t| v.tangent = t)?;
            self.layout.tangent = true;
        }
        if let Some(colors) = mesh.colors() {
            read_attribute(&mut self.vertices, colors, "colors", |v, c| v.color = c)?;
            self.layout.color = true;
        }

        for channel in 0..UV_CHANNEL_COUNT {
            let Some(uv) = mesh.uv(channel) else {
                continue;
            };
            if !(2..=4).contains(&uv.dimension) {
                return Err(MeshError::UnsupportedUvDimension {
                    channel,
                    dimension: uv.dimension,
                });
            }
            read_attribute(&mut self.vertices, uv.values, &format!("uv{channel}"), |v, value| {
                v.uvs[channel] = value
            })?;
            self.layout.uv_dimensions[channel] = Some(uv.dimension);
        }

        if let Some(counts) = mesh.bones_per_vertex() {
            check_length("bones per vertex", vertex_count, counts.len())?;

            let mut bone_weight_index = 0;
            for (vertex, &count) in self.vertices.iter_mut().zip(counts) {
                vertex.bone_weight_index = bone_weight_index;
                vertex.bone_weight_count = count as usize;
                bone_weight_index += count as usize;
            }

            let weights = mesh.bone_weights();
            if bone_weight_index != weights.len() {
                return Err(MeshError::BoneWeightCountMismatch {
                    expected: bone_weight_index,
                    actual: weights.len(),
                });
            }
            self.bone_weights = weights.to_vec();
            self.layout.skinned = true;
        }

        Ok(())
    }

    fn read_submeshes<M: NativeMesh + ?Sized>(&mut self, mesh: &M) -> Result<(), MeshError> {
        let vertex_count = self.vertices.len();

        for submesh in 0..mesh.submesh_count() {
            let native = mesh.topology(submesh);
            let topology = Topology::from_native(native).ok_or(MeshError::UnsupportedTopology {
                submesh,
                topology: native,
            })?;
            let size = topology.size();

            let indices = mesh.indices(submesh);
            if indices.len() % size != 0 {
                tracing::warn!(
                    "Submesh {} has {} indices, not a multiple of {}; dropping trailing {}",
                    submesh,
                    indices.len(),
                    size,
                    indices.len() % size
                );
            }

            let primitive_index = self.primitives.len();
            for (primitive, chunk) in indices.chunks_exact(size).enumerate() {
                if let Some((offset, &index)) = chunk
                    .iter()
                    .enumerate()
                    .find(|&(_, &index)| index as usize >= vertex_count)
                {
                    return Err(MeshError::IndexOutOfRange {
                        submesh,
                        position: primitive * size + offset,
                        index,
                        vertex_count,
                    });
                }
                self.primitives.push(Primitive::from_slice(chunk));
            }

            self.submeshes.push(SubMesh {
                topology,
                primitive_index,
                primitive_count: self.primitives.len() - primitive_index,
            });
        }

        Ok(())
    }

    fn read_channels<M: NativeMesh + ?Sized>(&mut self, mesh: &M) -> Result<(), MeshError> {
        let vertex_count = self.vertices.len();

        for shape in 0..mesh.blend_shape_count() {
            let name = mesh.blend_shape_name(shape);
            if self.channel_index(name).is_some() {
                return Err(MeshError::DuplicateChannelName(name.to_owned()));
            }
            let frame_count = mesh.blend_shape_frame_count(shape);
            self.channels.push(MorphChannel {
                name: name.to_owned(),
                frame_index: self.frames.len(),
                frame_count,
            });

            for frame in 0..frame_count {
                let deltas = mesh.blend_shape_frame_deltas(shape, frame);
                for (stream, len) in [
                    ("positions", deltas.positions.len()),
                    ("normals", deltas.normals.len()),
                    ("tangents", deltas.tangents.len()),
                ] {
                    if len != vertex_count {
                        return Err(MeshError::AttributeLength {
                            attribute: format!("blend shape '{name}' frame {frame} {stream}"),
                            expected: vertex_count,
                            actual: len,
                        });
                    }
                }

                self.frames.push(MorphFrame {
                    weight: mesh.blend_shape_frame_weight(shape, frame),
                    delta_index: self.deltas.len(),
                    delta_count: vertex_count,
                });
                self.deltas.extend(
                    deltas
                        .positions
                        .iter()
                        .zip(deltas.normals)
                        .zip(deltas.tangents)
                        .map(|((&position, &normal), &tangent)| MorphDelta {
                            position,
                            normal,
                            tangent,
                        }),
                );
            }
        }

        Ok(())
    }
}

fn check_length(attribute: &str, expected: usize, actual: usize) -> Result<(), MeshError> {
    if expected != actual {
        return Err(MeshError::AttributeLength {
            attribute: attribute.to_owned(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// Copy one attribute stream into the matching field of every vertex
fn read_attribute<T: Copy>(
    vertices: &mut [Vertex],
    values: &[T],
    attribute: &str,
    mut assign: impl FnMut(&mut Vertex, T),
) -> Result<(), MeshError> {
    check_length(attribute, vertices.len(), values.len())?;
    for (vertex, &value) in vertices.iter_mut().zip(values) {
        assign(vertex, value);
    }
    Ok(())
}

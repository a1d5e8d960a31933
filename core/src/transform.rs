//! Suppression transform
//!
//! Given a decoded mesh, a target morph channel and a displacement threshold,
//! builds a new mesh where every vertex the target channel moves is followed by
//! a twin, every primitive touching such a vertex is followed by a duplicate
//! wired to the twins, and a 3-frame toggle channel decides which copy is
//! rendered.
//!
//! # Toggle channel
//!
//! | frame weight  | original copy | twin   |
//! |---------------|---------------|--------|
//! | 50            | 0             | +inf   |
//! | next_up(50)   | +inf          | 0      |
//! | 100           | +inf          | 0      |
//!
//! Unaffected vertices get a zero delta on every frame. At weight 50 the
//! original copy renders with its authored animation and the twin is parked
//! at infinity; any weight above 50 swaps them, showing the twin, which
//! carries every channel except the target. The two bit-adjacent frames leave
//! no representable weight in between, so the switch is a hard step.
//!
//! The input is never mutated; every array is rebuilt from scratch.

use glam::Vec3;
use hashbrown::HashSet;

use crate::mesh::{
    MeshData, MeshError, MorphChannel, MorphDelta, MorphFrame, NativeMesh, Primitive, SubMesh,
    Vertex,
};

/// Number of frames in the synthesized toggle channel
pub const TOGGLE_FRAME_COUNT: usize = 3;

/// Toggle weight that shows the original geometry
pub const TOGGLE_SHOWN_WEIGHT: f32 = 50.0;

/// Smallest representable weight above [`TOGGLE_SHOWN_WEIGHT`]
pub const TOGGLE_STEP_WEIGHT: f32 = f32::from_bits(TOGGLE_SHOWN_WEIGHT.to_bits() + 1);

/// Toggle weight that shows the suppressed twins
pub const TOGGLE_SUPPRESSED_WEIGHT: f32 = 100.0;

/// Frame weight and (original, twin) position deltas for affected vertices
const TOGGLE_FRAMES: [(f32, Vec3, Vec3); TOGGLE_FRAME_COUNT] = [
    (TOGGLE_SHOWN_WEIGHT, Vec3::ZERO, Vec3::INFINITY),
    (TOGGLE_STEP_WEIGHT, Vec3::INFINITY, Vec3::ZERO),
    (TOGGLE_SUPPRESSED_WEIGHT, Vec3::INFINITY, Vec3::ZERO),
];

/// Prefix of generated toggle channel names
pub const TOGGLE_NAME_PREFIX: &str = "BlinkSuppressor_";

/// Generate a random toggle channel name (`BlinkSuppressor_<32 hex digits>`)
pub fn generate_toggle_name() -> String {
    format!("{TOGGLE_NAME_PREFIX}{:032x}", rand::random::<u128>())
}

/// Generate a toggle channel name no channel of `mesh` uses yet
pub fn unique_toggle_name(mesh: &MeshData) -> String {
    let taken: HashSet<&str> = mesh.channels.iter().map(|c| c.name.as_str()).collect();
    loop {
        let name = generate_toggle_name();
        if !taken.contains(name.as_str()) {
            return name;
        }
    }
}

/// Inputs of one suppression run
#[derive(Debug, Clone, PartialEq)]
pub struct SuppressionParams {
    /// Index of the morph channel to suppress
    pub channel: usize,
    /// Minimum displacement (euclidean) for a vertex to count as affected
    pub threshold: f32,
    /// Name of the synthesized toggle channel
    pub toggle_name: String,
    /// Use the plain `>= threshold²` test, so a zero threshold also marks
    /// vertices the channel never moves. Off by default: a vertex needs a
    /// nonzero displacement to be affected.
    pub include_stationary: bool,
}

impl SuppressionParams {
    pub fn new(channel: usize, threshold: f32, toggle_name: impl Into<String>) -> Self {
        Self {
            channel,
            threshold,
            toggle_name: toggle_name.into(),
            include_stationary: false,
        }
    }
}

/// The toggle channel appended by the transform
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleChannel {
    pub name: String,
    /// Channel index, always the last channel
    ///
    /// Counts channels of [`Suppression::mesh`] until [`Suppression::apply_to`]
    /// rebases it onto the native blend shape list, which has no entry for
    /// frameless channels.
    pub index: usize,
    pub frame_weights: [f32; TOGGLE_FRAME_COUNT],
}

/// Result of a suppression run
#[derive(Debug, Clone, PartialEq)]
pub struct Suppression {
    pub mesh: MeshData,
    pub toggle: ToggleChannel,
    /// Vertices that received a twin
    pub affected_vertices: usize,
    /// Primitives that received a duplicate
    pub affected_primitives: usize,
}

impl Suppression {
    /// Encode the suppressed mesh into `native` and point the toggle at its
    /// native blend shape
    pub fn apply_to<M: NativeMesh + ?Sized>(&mut self, native: &mut M) -> Result<(), MeshError> {
        self.mesh.apply_to(native)?;
        self.toggle.index = native.blend_shape_index(&self.toggle.name).ok_or_else(|| {
            MeshError::Integrity(format!(
                "toggle channel '{}' missing from the encoded mesh",
                self.toggle.name
            ))
        })?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SuppressError {
    #[error("morph channel {channel} out of range ({count} channels)")]
    ChannelOutOfRange { channel: usize, count: usize },

    #[error("morph channel {channel} ('{name}') has no frames")]
    EmptyChannel { channel: usize, name: String },

    #[error("displacement threshold {0} must be finite or +inf and non-negative")]
    InvalidThreshold(f32),

    #[error("toggle channel name '{0}' is already used by the mesh")]
    DuplicateToggleName(String),

    #[error("duplicated mesh would have {0} vertices, more than 32-bit indices can address")]
    TooManyVertices(usize),

    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// Duplicate the geometry moved by a morph channel behind a toggle channel
///
/// # Errors
/// Rejects an invalid input mesh, an out-of-range or frameless channel, a
/// negative or NaN threshold and a toggle name that already exists.
pub fn suppress(mesh: &MeshData, params: &SuppressionParams) -> Result<Suppression, SuppressError> {
    mesh.validate()?;

    let target = mesh
        .channels
        .get(params.channel)
        .ok_or(SuppressError::ChannelOutOfRange {
            channel: params.channel,
            count: mesh.channels.len(),
        })?;
    if target.frame_count == 0 {
        return Err(SuppressError::EmptyChannel {
            channel: params.channel,
            name: target.name.clone(),
        });
    }
    if params.threshold.is_nan() || params.threshold < 0.0 {
        return Err(SuppressError::InvalidThreshold(params.threshold));
    }
    if mesh.channel_index(&params.toggle_name).is_some() {
        return Err(SuppressError::DuplicateToggleName(params.toggle_name.clone()));
    }

    let affected_vertices = find_affected_vertices(mesh, target, params);
    let affected_primitives = find_affected_primitives(mesh, &affected_vertices);
    let affected_vertex_count = affected_vertices.iter().filter(|&&a| a).count();
    let affected_primitive_count = affected_primitives.iter().filter(|&&a| a).count();

    let new_vertex_count = mesh.vertices.len() + affected_vertex_count;
    if u32::try_from(new_vertex_count).is_err() {
        return Err(SuppressError::TooManyVertices(new_vertex_count));
    }

    let (vertices, remap) = duplicate_vertices(mesh, &affected_vertices);
    let bone_weights = mesh
        .vertices
        .iter()
        .zip(&affected_vertices)
        .flat_map(|(vertex, &affected)| {
            let span = mesh.vertex_bone_weights(vertex);
            let twin: &[_] = if affected { span } else { &[] };
            span.iter().chain(twin).copied()
        })
        .collect();
    let (submeshes, primitives) =
        duplicate_primitives(mesh, &affected_vertices, &affected_primitives, &remap);
    let (channels, frames, deltas) =
        rebuild_channels(mesh, params, &affected_vertices, vertices.len());

    let toggle = ToggleChannel {
        name: params.toggle_name.clone(),
        index: channels.len() - 1,
        frame_weights: TOGGLE_FRAMES.map(|(weight, _, _)| weight),
    };

    let output = MeshData {
        layout: mesh.layout,
        vertices,
        bone_weights,
        submeshes,
        primitives,
        channels,
        frames,
        deltas,
    };
    debug_assert!(output.validate().is_ok());

    tracing::debug!(
        "Suppressed channel '{}': {} of {} vertices and {} of {} primitives duplicated, toggle '{}'",
        target.name,
        affected_vertex_count,
        mesh.vertices.len(),
        affected_primitive_count,
        mesh.primitives.len(),
        toggle.name
    );

    Ok(Suppression {
        mesh: output,
        toggle,
        affected_vertices: affected_vertex_count,
        affected_primitives: affected_primitive_count,
    })
}

/// Flag vertices whose position the target channel moves by at least the
/// threshold in any frame
fn find_affected_vertices(
    mesh: &MeshData,
    target: &MorphChannel,
    params: &SuppressionParams,
) -> Vec<bool> {
    let threshold_sq = params.threshold * params.threshold;
    let mut affected = vec![false; mesh.vertices.len()];

    for frame in mesh.channel_frames(target) {
        for (flag, delta) in affected.iter_mut().zip(mesh.frame_deltas(frame)) {
            let distance_sq = delta.position.length_squared();
            *flag |=
                distance_sq >= threshold_sq && (params.include_stationary || distance_sq > 0.0);
        }
    }

    affected
}

/// Flag primitives referencing at least one affected vertex
fn find_affected_primitives(mesh: &MeshData, affected_vertices: &[bool]) -> Vec<bool> {
    let mut affected = vec![false; mesh.primitives.len()];

    for submesh in &mesh.submeshes {
        for index in submesh.primitive_range() {
            affected[index] = mesh.primitives[index]
                .vertices(submesh.topology)
                .iter()
                .any(|&v| affected_vertices[v as usize]);
        }
    }

    affected
}

/// Emit each vertex, followed by its twin when affected
///
/// Returns the new vertices and, per old vertex, the new index of its first
/// copy. A twin always sits at `remap[v] + 1`.
fn duplicate_vertices(mesh: &MeshData, affected: &[bool]) -> (Vec<Vertex>, Vec<u32>) {
    let twin_count = affected.iter().filter(|&&a| a).count();
    let mut vertices = Vec::with_capacity(mesh.vertices.len() + twin_count);
    let mut remap = Vec::with_capacity(mesh.vertices.len());
    let mut bone_weight_index = 0;

    for (vertex, &is_affected) in mesh.vertices.iter().zip(affected) {
        remap.push(vertices.len() as u32);

        let copies = if is_affected { 2 } else { 1 };
        for _ in 0..copies {
            vertices.push(Vertex {
                bone_weight_index,
                ..*vertex
            });
            bone_weight_index += vertex.bone_weight_count;
        }
    }

    (vertices, remap)
}

/// Emit each primitive with remapped indices, followed by a duplicate wired to
/// the twins when affected
///
/// In the duplicate, only indices of affected vertices move to the twin; the
/// rest keep pointing at the shared original so the unaffected side stays
/// welded to the untouched mesh.
fn duplicate_primitives(
    mesh: &MeshData,
    affected_vertices: &[bool],
    affected_primitives: &[bool],
    remap: &[u32],
) -> (Vec<SubMesh>, Vec<Primitive>) {
    let duplicate_count = affected_primitives.iter().filter(|&&a| a).count();
    let mut submeshes = Vec::with_capacity(mesh.submeshes.len());
    let mut primitives = Vec::with_capacity(mesh.primitives.len() + duplicate_count);

    for submesh in &mesh.submeshes {
        let primitive_index = primitives.len();

        for index in submesh.primitive_range() {
            let source = mesh.primitives[index].vertices(submesh.topology);

            let mut original = Primitive::default();
            for (slot, &v) in source.iter().enumerate() {
                original.indices[slot] = remap[v as usize];
            }
            primitives.push(original);

            if affected_primitives[index] {
                let mut twin = original;
                for (slot, &v) in source.iter().enumerate() {
                    if affected_vertices[v as usize] {
                        twin.indices[slot] += 1;
                    }
                }
                primitives.push(twin);
            }
        }

        submeshes.push(SubMesh {
            primitive_index,
            primitive_count: primitives.len() - primitive_index,
            ..*submesh
        });
    }

    (submeshes, primitives)
}

/// Re-expand every channel to the new vertex count and append the toggle
///
/// Twins copy the original's delta on every channel except the target, where
/// they stay at zero.
fn rebuild_channels(
    mesh: &MeshData,
    params: &SuppressionParams,
    affected: &[bool],
    vertex_count: usize,
) -> (Vec<MorphChannel>, Vec<MorphFrame>, Vec<MorphDelta>) {
    let frame_count = mesh.frames.len() + TOGGLE_FRAME_COUNT;

    // Existing channels keep their frame ranges: frames are re-emitted in order
    let mut channels = mesh.channels.clone();
    channels.push(MorphChannel {
        name: params.toggle_name.clone(),
        frame_index: mesh.frames.len(),
        frame_count: TOGGLE_FRAME_COUNT,
    });

    let mut frames = Vec::with_capacity(frame_count);
    let mut deltas = Vec::with_capacity(frame_count * vertex_count);

    for (c, channel) in mesh.channels.iter().enumerate() {
        let is_target = c == params.channel;

        for frame in mesh.channel_frames(channel) {
            frames.push(MorphFrame {
                weight: frame.weight,
                delta_index: deltas.len(),
                delta_count: vertex_count,
            });

            for (delta, &is_affected) in mesh.frame_deltas(frame).iter().zip(affected) {
                deltas.push(*delta);
                if is_affected {
                    deltas.push(if is_target { MorphDelta::ZERO } else { *delta });
                }
            }
        }
    }

    for (weight, original, twin) in TOGGLE_FRAMES {
        frames.push(MorphFrame {
            weight,
            delta_index: deltas.len(),
            delta_count: vertex_count,
        });

        for &is_affected in affected {
            if is_affected {
                deltas.push(MorphDelta::from_position(original));
                deltas.push(MorphDelta::from_position(twin));
            } else {
                deltas.push(MorphDelta::ZERO);
            }
        }
    }

    (channels, frames, deltas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostBlendShapeFrame, HostSubMesh};
    use crate::mesh::{BoneWeight, MeshTopology, Topology};
    use crate::test_utils::quad_mesh;

    fn decode(mesh: &crate::host::HostMesh) -> MeshData {
        MeshData::from_native(mesh).unwrap()
    }

    fn params(channel: usize, threshold: f32) -> SuppressionParams {
        SuppressionParams::new(channel, threshold, "toggle")
    }

    // ========================================================================
    // Scenario Tests
    // ========================================================================

    #[test]
    fn test_single_vertex_scenario() {
        // Vertex 2 is only referenced by the first triangle
        let mut host = quad_mesh();
        host.submeshes[0].indices = vec![0, 1, 2, 0, 3, 1];
        let mesh = decode(&host);

        let result = suppress(&mesh, &params(0, 0.01)).unwrap();
        let out = &result.mesh;

        assert_eq!(result.affected_vertices, 1);
        assert_eq!(result.affected_primitives, 1);
        assert_eq!(out.vertices.len(), 5);
        assert_eq!(out.primitives.len(), 3);
        assert_eq!(out.channels.len(), 3);
        assert_eq!(out.channels[2].frame_count, TOGGLE_FRAME_COUNT);

        // Original channel frame: vertex 2 keeps its delta, the twin (index 3) is frozen
        let blink = out.frame_deltas(&out.frames[0]);
        assert_eq!(blink[2].position, Vec3::new(0.0, -0.2, 0.0));
        assert_eq!(blink[3], MorphDelta::ZERO);

        // Primitive order: original, duplicate, untouched
        assert_eq!(out.primitives[0].indices, [0, 1, 2, 0]);
        assert_eq!(out.primitives[1].indices, [0, 1, 3, 0]);
        assert_eq!(out.primitives[2].indices, [0, 4, 1, 0]);
    }

    #[test]
    fn test_shared_vertex_duplicates_every_touching_primitive() {
        let mesh = decode(&quad_mesh());
        let result = suppress(&mesh, &params(0, 0.01)).unwrap();

        assert_eq!(result.mesh.vertices.len(), 5);
        assert_eq!(result.mesh.primitives.len(), 4);
        let indices: Vec<_> = result.mesh.primitives.iter().map(|p| p.indices).collect();
        assert_eq!(
            indices,
            vec![[0, 1, 2, 0], [0, 1, 3, 0], [0, 2, 4, 0], [0, 3, 4, 0]]
        );
    }

    // ========================================================================
    // Conservation Tests
    // ========================================================================

    #[test]
    fn test_counts_are_conserved() {
        let mesh = decode(&quad_mesh());
        // smile moves vertices 0 and 1
        let result = suppress(&mesh, &params(1, 0.005)).unwrap();
        let out = &result.mesh;

        assert_eq!(out.vertices.len(), mesh.vertices.len() + result.affected_vertices);
        assert_eq!(
            out.primitives.len(),
            mesh.primitives.len() + result.affected_primitives
        );
        assert_eq!(result.affected_vertices, 2);
        assert_eq!(result.affected_primitives, 2);
        out.validate().unwrap();
    }

    #[test]
    fn test_bone_weights_follow_twins() {
        let mesh = decode(&quad_mesh());
        let result = suppress(&mesh, &params(1, 0.005)).unwrap();
        let out = &result.mesh;

        // Vertices 0 and 1 are twinned: [v0, v0', v1, v1', v2, v3]
        let spans: Vec<_> = out
            .vertices
            .iter()
            .map(|v| (v.bone_weight_index, v.bone_weight_count))
            .collect();
        assert_eq!(spans, vec![(0, 1), (1, 1), (2, 2), (4, 2), (6, 1), (7, 2)]);
        assert_eq!(out.bone_weights.len(), 9);
        assert_eq!(
            out.vertex_bone_weights(&out.vertices[3]),
            &[BoneWeight::new(0, 0.5), BoneWeight::new(1, 0.5)]
        );
    }

    #[test]
    fn test_twin_copies_vertex_attributes() {
        let mesh = decode(&quad_mesh());
        let out = suppress(&mesh, &params(0, 0.01)).unwrap().mesh;

        let (original, twin) = (out.vertices[2], out.vertices[3]);
        assert_eq!(original.position, twin.position);
        assert_eq!(original.color, twin.color);
        assert_eq!(original.uvs, twin.uvs);
        assert_eq!(twin.bone_weight_index, original.bone_weight_index + 1);
    }

    // ========================================================================
    // Channel Tests
    // ========================================================================

    #[test]
    fn test_other_channels_copy_delta_to_twin() {
        let mut host = quad_mesh();
        // smile also moves vertex 2
        host.blend_shapes[1].frames[1].delta_positions[2] = Vec3::new(0.0, 0.0, 0.3);
        let mesh = decode(&host);

        let out = suppress(&mesh, &params(0, 0.01)).unwrap().mesh;
        let smile_100 = out.frame_deltas(&out.frames[2]);
        assert_eq!(smile_100[2].position, Vec3::new(0.0, 0.0, 0.3));
        assert_eq!(smile_100[3].position, Vec3::new(0.0, 0.0, 0.3));
        assert_eq!(smile_100[0].position, Vec3::new(0.02, 0.0, 0.0));
    }

    #[test]
    fn test_target_frames_keep_weights() {
        let mesh = decode(&quad_mesh());
        let out = suppress(&mesh, &params(1, 0.005)).unwrap().mesh;

        assert_eq!(out.channels[1].frame_range(), 1..3);
        assert_eq!(out.frames[1].weight, 50.0);
        assert_eq!(out.frames[2].weight, 100.0);
        let smile_50 = out.frame_deltas(&out.frames[1]);
        assert_eq!(smile_50[0].position, Vec3::new(0.01, 0.0, 0.0));
        assert_eq!(smile_50[1], MorphDelta::ZERO);
    }

    #[test]
    fn test_toggle_frames() {
        let mesh = decode(&quad_mesh());
        let result = suppress(&mesh, &params(0, 0.01)).unwrap();
        let out = &result.mesh;

        assert_eq!(result.toggle.index, 2);
        assert_eq!(result.toggle.name, "toggle");
        assert_eq!(out.channels[2].name, "toggle");
        assert_eq!(
            result.toggle.frame_weights,
            [50.0, TOGGLE_STEP_WEIGHT, 100.0]
        );
        assert!(TOGGLE_STEP_WEIGHT > 50.0);
        assert_eq!(TOGGLE_STEP_WEIGHT.to_bits(), 50.0f32.to_bits() + 1);

        let toggle_frames = out.channel_frames(&out.channels[2]);
        let expected = [
            (Vec3::ZERO, Vec3::INFINITY),
            (Vec3::INFINITY, Vec3::ZERO),
            (Vec3::INFINITY, Vec3::ZERO),
        ];
        for (frame, (original, twin)) in toggle_frames.iter().zip(expected) {
            let deltas = out.frame_deltas(frame);
            assert_eq!(deltas.len(), 5);
            assert_eq!(deltas[2].position, original);
            assert_eq!(deltas[3].position, twin);
            for unaffected in [0, 1, 4] {
                assert_eq!(deltas[unaffected], MorphDelta::ZERO);
            }
        }
    }

    // ========================================================================
    // Threshold Tests
    // ========================================================================

    #[test]
    fn test_infinite_threshold_adds_inert_toggle() {
        let mesh = decode(&quad_mesh());
        let result = suppress(&mesh, &params(0, f32::INFINITY)).unwrap();
        let out = &result.mesh;

        assert_eq!(result.affected_vertices, 0);
        assert_eq!(out.vertices, mesh.vertices);
        assert_eq!(out.bone_weights, mesh.bone_weights);
        assert_eq!(out.submeshes, mesh.submeshes);
        assert_eq!(out.primitives, mesh.primitives);
        assert_eq!(&out.channels[..2], &mesh.channels[..]);
        assert_eq!(&out.frames[..3], &mesh.frames[..]);
        assert_eq!(&out.deltas[..mesh.deltas.len()], &mesh.deltas[..]);
        assert!(out.deltas[mesh.deltas.len()..]
            .iter()
            .all(|d| *d == MorphDelta::ZERO));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // blink moves vertex 2 by exactly 0.25
        let mut host = quad_mesh();
        host.blend_shapes[0].frames[0].delta_positions[2] = Vec3::new(0.0, -0.25, 0.0);
        let mesh = decode(&host);

        assert_eq!(suppress(&mesh, &params(0, 0.25)).unwrap().affected_vertices, 1);
        assert_eq!(suppress(&mesh, &params(0, 0.2501)).unwrap().affected_vertices, 0);
    }

    #[test]
    fn test_any_frame_marks_vertex() {
        // smile moves vertex 1 by 0.02 at 50 and 0.04 at 100
        let mesh = decode(&quad_mesh());
        let result = suppress(&mesh, &params(1, 0.03)).unwrap();
        assert_eq!(result.affected_vertices, 1);
        assert_eq!(result.mesh.vertices.len(), 5);
        // Twin of vertex 1 sits at index 2
        assert_eq!(result.mesh.vertices[2].position, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_zero_threshold_ignores_stationary_vertices() {
        let mut host = quad_mesh();
        host.blend_shapes[0].frames[0].delta_positions = vec![Vec3::ZERO; 4];
        let mesh = decode(&host);

        let result = suppress(&mesh, &params(0, 0.0)).unwrap();
        assert_eq!(result.affected_vertices, 0);
        assert_eq!(result.mesh.vertices.len(), 4);
    }

    #[test]
    fn test_zero_threshold_inclusive_marks_every_vertex() {
        let mut host = quad_mesh();
        host.blend_shapes[0].frames[0].delta_positions = vec![Vec3::ZERO; 4];
        let mesh = decode(&host);

        let mut inclusive = params(0, 0.0);
        inclusive.include_stationary = true;
        let result = suppress(&mesh, &inclusive).unwrap();
        assert_eq!(result.affected_vertices, 4);
        assert_eq!(result.affected_primitives, 2);
        assert_eq!(result.mesh.vertices.len(), 8);
        assert_eq!(result.mesh.primitives.len(), 4);
    }

    #[test]
    fn test_zero_threshold_catches_tiny_motion() {
        let mut host = quad_mesh();
        host.blend_shapes[0].frames[0].delta_positions[2] = Vec3::new(0.0, 1e-7, 0.0);
        let mesh = decode(&host);

        assert_eq!(suppress(&mesh, &params(0, 0.0)).unwrap().affected_vertices, 1);
        // The default near-zero threshold treats it as noise
        assert_eq!(suppress(&mesh, &params(0, 1e-5)).unwrap().affected_vertices, 0);
    }

    // ========================================================================
    // Topology Tests
    // ========================================================================

    #[test]
    fn test_mixed_topologies() {
        let mut host = quad_mesh();
        host.submeshes = vec![
            HostSubMesh {
                topology: MeshTopology::Points,
                indices: vec![2, 3],
            },
            HostSubMesh {
                topology: MeshTopology::Lines,
                indices: vec![0, 1, 1, 2],
            },
            HostSubMesh {
                topology: MeshTopology::Quads,
                indices: vec![0, 1, 2, 3],
            },
        ];
        let mesh = decode(&host);

        let out = suppress(&mesh, &params(0, 0.01)).unwrap().mesh;
        assert_eq!(out.submeshes[0].topology, Topology::Points);
        assert_eq!(out.submeshes[0].primitive_range(), 0..3);
        assert_eq!(out.submeshes[1].primitive_range(), 3..6);
        assert_eq!(out.submeshes[2].primitive_range(), 6..8);

        let indices: Vec<_> = out.primitives.iter().map(|p| p.indices).collect();
        assert_eq!(
            indices,
            vec![
                [2, 0, 0, 0],
                [3, 0, 0, 0],
                [4, 0, 0, 0],
                [0, 1, 0, 0],
                [1, 2, 0, 0],
                [1, 3, 0, 0],
                [0, 1, 2, 4],
                [0, 1, 3, 4],
            ]
        );
        out.validate().unwrap();
    }

    #[test]
    fn test_empty_submesh_survives() {
        let mut host = quad_mesh();
        host.submeshes.insert(0, HostSubMesh::default());
        let mesh = decode(&host);

        let out = suppress(&mesh, &params(0, 0.01)).unwrap().mesh;
        assert_eq!(out.submeshes.len(), 2);
        assert_eq!(out.submeshes[0].primitive_count, 0);
        assert_eq!(out.submeshes[1].primitive_range(), 0..4);
    }

    // ========================================================================
    // Error Tests
    // ========================================================================

    #[test]
    fn test_channel_out_of_range() {
        let mesh = decode(&quad_mesh());
        let err = suppress(&mesh, &params(5, 0.01)).unwrap_err();
        assert_eq!(
            err,
            SuppressError::ChannelOutOfRange {
                channel: 5,
                count: 2
            }
        );
    }

    #[test]
    fn test_invalid_threshold() {
        let mesh = decode(&quad_mesh());
        assert!(matches!(
            suppress(&mesh, &params(0, -1.0)),
            Err(SuppressError::InvalidThreshold(_))
        ));
        assert!(matches!(
            suppress(&mesh, &params(0, f32::NAN)),
            Err(SuppressError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn test_empty_channel() {
        let mut mesh = decode(&quad_mesh());
        mesh.channels.push(MorphChannel {
            name: "empty".to_owned(),
            frame_index: mesh.frames.len(),
            frame_count: 0,
        });

        let err = suppress(&mesh, &params(2, 0.01)).unwrap_err();
        assert!(matches!(err, SuppressError::EmptyChannel { channel: 2, .. }));
    }

    #[test]
    fn test_duplicate_toggle_name() {
        let mesh = decode(&quad_mesh());
        let err = suppress(&mesh, &SuppressionParams::new(0, 0.01, "smile")).unwrap_err();
        assert_eq!(err, SuppressError::DuplicateToggleName("smile".to_owned()));
    }

    #[test]
    fn test_invalid_input_mesh() {
        let mut mesh = decode(&quad_mesh());
        mesh.primitives[0].indices[0] = 40;
        assert!(matches!(
            suppress(&mesh, &params(0, 0.01)),
            Err(SuppressError::Mesh(MeshError::Integrity(_)))
        ));
    }

    #[test]
    fn test_multi_frame_target_with_added_frame() {
        let mut host = quad_mesh();
        host.blend_shapes[0]
            .frames
            .insert(0, HostBlendShapeFrame::from_positions(25.0, vec![Vec3::ZERO; 4]));
        host.blend_shapes[0].frames[0].delta_positions[0] = Vec3::new(0.5, 0.0, 0.0);
        let mesh = decode(&host);

        let result = suppress(&mesh, &params(0, 0.01)).unwrap();
        // vertex 0 from the 25 frame, vertex 2 from the 100 frame
        assert_eq!(result.affected_vertices, 2);
        assert_eq!(result.mesh.vertices.len(), 6);
        result.mesh.validate().unwrap();
    }

    #[test]
    fn test_unique_name_avoids_existing_channels() {
        let mesh = decode(&quad_mesh());
        let name = unique_toggle_name(&mesh);
        assert!(mesh.channel_index(&name).is_none());
        suppress(&mesh, &SuppressionParams::new(0, 0.01, name)).unwrap();
    }

    #[test]
    fn test_generated_names_are_unique() {
        let a = generate_toggle_name();
        let b = generate_toggle_name();
        assert!(a.starts_with(TOGGLE_NAME_PREFIX));
        assert_eq!(a.len(), TOGGLE_NAME_PREFIX.len() + 32);
        assert_ne!(a, b);
    }
}

//! Referential integrity checks
//!
//! Every `(index, count)` range must lie inside its target array and sibling
//! ranges must partition that array in order, with no gaps or overlaps.

use super::MeshError;
use super::types::MeshData;

/// Walk a sequence of ranges and check that they tile `0..total` in order
fn check_partition(
    what: &str,
    ranges: impl Iterator<Item = (usize, usize)>,
    total: usize,
) -> Result<(), MeshError> {
    let mut next = 0;
    for (owner, (index, count)) in ranges.enumerate() {
        if index != next {
            return Err(MeshError::Integrity(format!(
                "{what} {owner} starts at {index}, expected {next}"
            )));
        }
        next = index + count;
    }
    if next != total {
        return Err(MeshError::Integrity(format!(
            "{what} ranges cover {next} of {total} entries"
        )));
    }
    Ok(())
}

impl MeshData {
    /// Check every cross-reference in the mesh
    ///
    /// Returns [`MeshError::Integrity`] describing the first violation.
    pub fn validate(&self) -> Result<(), MeshError> {
        let vertex_count = self.vertices.len();

        if !self.layout.skinned && !self.bone_weights.is_empty() {
            return Err(MeshError::Integrity(format!(
                "unskinned mesh carries {} bone weights",
                self.bone_weights.len()
            )));
        }
        check_partition(
            "vertex bone weights",
            self.vertices
                .iter()
                .map(|v| (v.bone_weight_index, v.bone_weight_count)),
            self.bone_weights.len(),
        )?;

        check_partition(
            "submesh",
            self.submeshes
                .iter()
                .map(|s| (s.primitive_index, s.primitive_count)),
            self.primitives.len(),
        )?;

        for (s, submesh) in self.submeshes.iter().enumerate() {
            for (p, primitive) in self.submesh_primitives(submesh).iter().enumerate() {
                if let Some(&index) = primitive
                    .vertices(submesh.topology)
                    .iter()
                    .find(|&&index| index as usize >= vertex_count)
                {
                    return Err(MeshError::Integrity(format!(
                        "submesh {s} primitive {p} references vertex {index} of {vertex_count}"
                    )));
                }
            }
        }

        check_partition(
            "channel",
            self.channels.iter().map(|c| (c.frame_index, c.frame_count)),
            self.frames.len(),
        )?;

        if let Some((f, frame)) = self
            .frames
            .iter()
            .enumerate()
            .find(|(_, frame)| frame.delta_count != vertex_count)
        {
            return Err(MeshError::Integrity(format!(
                "frame {f} has {} deltas for {vertex_count} vertices",
                frame.delta_count
            )));
        }
        check_partition(
            "frame",
            self.frames.iter().map(|f| (f.delta_index, f.delta_count)),
            self.deltas.len(),
        )?;

        for (c, channel) in self.channels.iter().enumerate() {
            if self.channels[..c].iter().any(|other| other.name == channel.name) {
                return Err(MeshError::Integrity(format!(
                    "channel {c} repeats the name '{}'",
                    channel.name
                )));
            }

            let frames = self.channel_frames(channel);
            if let Some(pair) = frames.windows(2).find(|pair| pair[1].weight <= pair[0].weight) {
                return Err(MeshError::Integrity(format!(
                    "channel '{}' frame weight {} does not exceed {}",
                    channel.name, pair[1].weight, pair[0].weight
                )));
            }
        }

        Ok(())
    }
}

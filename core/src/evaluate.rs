//! Morph evaluation
//!
//! Computes rendered vertex positions for a set of channel weights, the way a
//! skinned renderer blends blend shape frames: zero at weight 0, linear up to
//! the first frame, linear between the two frames bracketing the weight and
//! clamped past the last frame.
//!
//! Toggle channels carry infinite deltas. Blending is done per component so an
//! infinite endpoint wins any strictly interior blend instead of turning into
//! NaN, and identical endpoints are returned unchanged.

use glam::Vec3;

use crate::mesh::MeshData;
use crate::transform::{TOGGLE_SHOWN_WEIGHT, TOGGLE_SUPPRESSED_WEIGHT};

/// The two states of a toggle channel
///
/// The toggle's frames leave no representable weight between 50 and the
/// next frame, so any weight is one of these two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleState {
    /// Original geometry with the target channel animating normally
    #[default]
    Shown,
    /// Twins shown, the target channel has no visible effect
    Suppressed,
}

impl ToggleState {
    pub fn weight(self) -> f32 {
        match self {
            Self::Shown => TOGGLE_SHOWN_WEIGHT,
            Self::Suppressed => TOGGLE_SUPPRESSED_WEIGHT,
        }
    }

    /// Classify a toggle weight at or above the resting weight
    pub fn from_weight(weight: f32) -> Self {
        if weight > TOGGLE_SHOWN_WEIGHT {
            Self::Suppressed
        } else {
            Self::Shown
        }
    }

    pub fn from_suppressed(suppressed: bool) -> Self {
        if suppressed {
            Self::Suppressed
        } else {
            Self::Shown
        }
    }
}

/// Blend two scalars without producing NaN from infinities
#[inline]
fn blend(a: f32, b: f32, t: f32) -> f32 {
    if t <= 0.0 {
        a
    } else if t >= 1.0 {
        b
    } else if a == b {
        a
    } else {
        a * (1.0 - t) + b * t
    }
}

#[inline]
fn blend_vec3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    Vec3::new(blend(a.x, b.x, t), blend(a.y, b.y, t), blend(a.z, b.z, t))
}

/// Position delta of one vertex for a channel at a weight
///
/// Returns zero for an out-of-range channel or vertex. Frame weights are
/// expected to increase as [`MeshData::validate`] requires. Frames out of
/// order never divide by a zero or negative span.
pub fn channel_delta(mesh: &MeshData, channel: usize, weight: f32, vertex: usize) -> Vec3 {
    let Some(channel) = mesh.channels.get(channel) else {
        return Vec3::ZERO;
    };
    let frames = mesh.channel_frames(channel);
    if weight <= 0.0 || frames.is_empty() || vertex >= mesh.vertices.len() {
        return Vec3::ZERO;
    }

    let position = |f: usize| mesh.frame_deltas(&frames[f])[vertex].position;

    // First frame at or above the weight
    let upper = frames.partition_point(|frame| frame.weight < weight);
    match upper {
        0 => blend_vec3(Vec3::ZERO, position(0), weight / frames[0].weight),
        u if u == frames.len() => position(u - 1),
        u => {
            let (low, high) = (&frames[u - 1], &frames[u]);
            let span = high.weight - low.weight;
            if span <= 0.0 {
                return position(u);
            }
            blend_vec3(position(u - 1), position(u), (weight - low.weight) / span)
        }
    }
}

/// Rendered positions for a set of channel weights
///
/// `weights[c]` drives channel `c`; missing weights count as 0. A vertex
/// with a non-finite component is not rendered.
pub fn evaluate_positions(mesh: &MeshData, weights: &[f32]) -> Vec<Vec3> {
    mesh.vertices
        .iter()
        .enumerate()
        .map(|(v, vertex)| {
            (0..mesh.channels.len()).fold(vertex.position, |position, c| {
                let weight = weights.get(c).copied().unwrap_or(0.0);
                position + channel_delta(mesh, c, weight, v)
            })
        })
        .collect()
}

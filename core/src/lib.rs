//! Blink Suppressor Core - mesh surgery for hard morph toggles
//!
//! This crate restructures a skinned mesh so that one morph channel (typically
//! an eyelid blink) can be switched off at render time without touching any
//! other channel, the skin weights or the topology.
//!
//! # Architecture
//!
//! - [`mesh`] - Flat interchange model and the [`NativeMesh`] boundary
//! - [`transform`] - Vertex/primitive duplication and toggle channel synthesis
//! - [`pass`] - Build-time driver for one subject
//! - [`curves`] - Keyframe curve retargeting onto the toggle channel
//! - [`evaluate`] - Morph evaluation used to check rendered positions
//! - [`host`] - In-memory native mesh implementation
//! - [`settings`] - Operator-facing configuration

pub mod curves;
pub mod evaluate;
pub mod host;
pub mod mesh;
pub mod pass;
pub mod settings;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod transform;

// Re-export the interchange model
pub use mesh::{
    BoneWeight, IndexFormat, MeshData, MeshError, MeshTopology, MorphChannel, MorphDelta,
    MorphFrame, NativeMesh, Primitive, SubMesh, Topology, UV_CHANNEL_COUNT, UvChannel, Vertex,
    VertexLayout,
};

// Re-export the transform entry point
pub use transform::{
    SuppressError, Suppression, SuppressionParams, TOGGLE_FRAME_COUNT, ToggleChannel,
    generate_toggle_name, suppress, unique_toggle_name,
};

// Re-export pass types
pub use pass::{
    EyelidMapping, PassError, PassOutcome, PassReport, SkinnedRenderer, SkipReason, Subject,
    SuppressorComponent, run_pass,
};

pub use curves::{AnimationClip, CurveBinding, FloatCurve, Keyframe, retarget_clips};
pub use evaluate::{ToggleState, channel_delta, evaluate_positions};
pub use host::{HostBlendShape, HostBlendShapeFrame, HostMesh, HostSubMesh, HostUv};
pub use settings::{SettingsError, SuppressorSettings};

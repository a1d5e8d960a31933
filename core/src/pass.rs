//! Build pass
//!
//! Finds the suppressor component on a subject, runs the suppression
//! transform on a private copy of the eyelid renderer's mesh, installs the
//! result and retargets animation curves. The component is consumed by the
//! pass.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::curves::{AnimationClip, CurveBinding, retarget_clips};
use crate::mesh::{MeshData, MeshError, NativeMesh};
use crate::settings::{SettingsError, SuppressorSettings};
use crate::transform::{
    SuppressError, SuppressionParams, ToggleChannel, suppress, unique_toggle_name,
};

/// A suppressor component attached somewhere in the subject's hierarchy
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SuppressorComponent {
    /// Object path of the component, used to find its animation curves
    pub path: String,
    #[serde(default)]
    pub settings: SuppressorSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinnedRenderer<M> {
    pub path: String,
    pub mesh: M,
    /// Current weight per blend shape
    #[serde(default)]
    pub blend_shape_weights: Vec<f32>,
}

impl<M> SkinnedRenderer<M> {
    pub fn new(path: impl Into<String>, mesh: M) -> Self {
        Self {
            path: path.into(),
            mesh,
            blend_shape_weights: Vec::new(),
        }
    }
}

/// Which renderer and blend shapes drive the eyelids
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EyelidMapping {
    /// Path of the eyelid renderer
    #[serde(default)]
    pub renderer: Option<String>,
    /// Blend shape indices; the first one is the blink
    #[serde(default)]
    pub blend_shapes: Vec<usize>,
}

/// One avatar being built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject<M> {
    pub name: String,
    #[serde(default)]
    pub components: Vec<SuppressorComponent>,
    #[serde(default)]
    pub renderers: Vec<SkinnedRenderer<M>>,
    #[serde(default)]
    pub eyelids: EyelidMapping,
    #[serde(default)]
    pub clips: Vec<AnimationClip>,
}

impl<M> Subject<M> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
            renderers: Vec::new(),
            eyelids: EyelidMapping::default(),
            clips: Vec::new(),
        }
    }

    pub fn renderer(&self, path: &str) -> Option<&SkinnedRenderer<M>> {
        self.renderers.iter().find(|r| r.path == path)
    }

    fn eyelid_target(&self) -> Option<(usize, usize)> {
        let path = self.eyelids.renderer.as_deref()?;
        let renderer = self.renderers.iter().position(|r| r.path == path)?;
        let channel = *self.eyelids.blend_shapes.first()?;
        Some((renderer, channel))
    }
}

/// Why a pass left the subject's geometry alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No suppressor component on the subject
    NoComponent,
    /// No eyelid renderer, or no eyelid blend shapes
    NoEyelidMapping,
    /// The blink blend shape has no frames
    EmptyChannel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PassReport {
    pub toggle: ToggleChannel,
    pub affected_vertices: usize,
    pub affected_primitives: usize,
    pub clips_rewritten: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PassOutcome {
    Applied(PassReport),
    Skipped(SkipReason),
}

#[derive(Debug, thiserror::Error)]
pub enum PassError {
    #[error("subject '{subject}' has {count} BlinkSuppressor components, at most one is allowed")]
    MultipleComponents { subject: String, count: usize },

    #[error("subject '{subject}': invalid suppressor settings")]
    Settings {
        subject: String,
        source: SettingsError,
    },

    #[error("subject '{subject}': eyelid mesh")]
    Mesh { subject: String, source: MeshError },

    #[error("subject '{subject}': suppression failed")]
    Suppress {
        subject: String,
        source: SuppressError,
    },
}

/// Run the suppressor build pass on a subject
///
/// # Errors
/// Multiple components, invalid settings, an undecodable eyelid mesh or an
/// out-of-range blink blend shape. The subject is unmodified on error.
pub fn run_pass<M: NativeMesh + Clone>(subject: &mut Subject<M>) -> Result<PassOutcome, PassError> {
    match subject.components.len() {
        0 => {
            tracing::debug!("Subject '{}' has no BlinkSuppressor, skipping", subject.name);
            return Ok(PassOutcome::Skipped(SkipReason::NoComponent));
        }
        1 => {}
        count => {
            return Err(PassError::MultipleComponents {
                subject: subject.name.clone(),
                count,
            });
        }
    }

    let Some((renderer_index, channel)) = subject.eyelid_target() else {
        tracing::warn!(
            "Subject '{}' has no eyelid renderer or blend shapes, removing BlinkSuppressor",
            subject.name
        );
        subject.components.clear();
        return Ok(PassOutcome::Skipped(SkipReason::NoEyelidMapping));
    };

    let settings = subject.components[0].settings;
    settings.validate().map_err(|source| PassError::Settings {
        subject: subject.name.clone(),
        source,
    })?;

    let mut mesh = subject.renderers[renderer_index].mesh.clone();
    let data = MeshData::from_native(&mesh).map_err(|source| PassError::Mesh {
        subject: subject.name.clone(),
        source,
    })?;

    let params = SuppressionParams::new(
        channel,
        settings.blend_shape_threshold,
        unique_toggle_name(&data),
    );
    let mut suppression = match suppress(&data, &params) {
        Ok(suppression) => suppression,
        Err(SuppressError::EmptyChannel { name, .. }) => {
            tracing::warn!(
                "Blink blend shape '{}' on subject '{}' has no frames, removing BlinkSuppressor",
                name,
                subject.name
            );
            subject.components.clear();
            return Ok(PassOutcome::Skipped(SkipReason::EmptyChannel));
        }
        Err(source) => {
            return Err(PassError::Suppress {
                subject: subject.name.clone(),
                source,
            });
        }
    };

    suppression
        .apply_to(&mut mesh)
        .map_err(|source| PassError::Mesh {
            subject: subject.name.clone(),
            source,
        })?;

    // Nothing below can fail
    let toggle = suppression.toggle;
    let component = subject.components.remove(0);
    let renderer = &mut subject.renderers[renderer_index];
    let weights = remap_weights(&renderer.mesh, &renderer.blend_shape_weights, &mesh);
    renderer.mesh = mesh;
    renderer.blend_shape_weights = weights;
    renderer.blend_shape_weights[toggle.index] = settings.rest_weight();

    let source = CurveBinding::suppress_blink(component.path.as_str());
    let clips_rewritten = retarget_clips(&mut subject.clips, &source, &renderer.path, &toggle);

    tracing::info!(
        "Suppressed blink on '{}' ({}): {} vertices, {} primitives duplicated, {} clips retargeted",
        subject.name,
        renderer.path,
        suppression.affected_vertices,
        suppression.affected_primitives,
        clips_rewritten
    );

    Ok(PassOutcome::Applied(PassReport {
        toggle,
        affected_vertices: suppression.affected_vertices,
        affected_primitives: suppression.affected_primitives,
        clips_rewritten,
    }))
}

/// Carry renderer weights over to a new blend shape list by name
///
/// Shapes the new mesh no longer has lose their weight; new shapes start at 0.
fn remap_weights<M: NativeMesh>(old: &M, weights: &[f32], new: &M) -> Vec<f32> {
    let by_name: HashMap<&str, f32> = (0..old.blend_shape_count())
        .map(|shape| {
            let weight = weights.get(shape).copied().unwrap_or(0.0);
            (old.blend_shape_name(shape), weight)
        })
        .collect();

    (0..new.blend_shape_count())
        .map(|shape| {
            by_name
                .get(new.blend_shape_name(shape))
                .copied()
                .unwrap_or(0.0)
        })
        .collect()
}

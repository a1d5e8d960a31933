//! Animation curve retargeting
//!
//! Clips that animate the suppressor component's boolean property are
//! rewritten to drive the toggle channel on the eyelid renderer instead.

use serde::{Deserialize, Serialize};

use crate::evaluate::ToggleState;
use crate::transform::ToggleChannel;

/// Component type name of the suppressor
pub const SUPPRESSOR_COMPONENT_TYPE: &str = "BlinkSuppressor";

/// Animatable boolean property on the suppressor
pub const SUPPRESS_BLINK_PROPERTY: &str = "SuppressBlink";

/// Component type name of skinned mesh renderers
pub const RENDERER_COMPONENT_TYPE: &str = "SkinnedMeshRenderer";

/// Renderer property that keeps bounds updated while off screen
pub const UPDATE_WHEN_OFFSCREEN_PROPERTY: &str = "m_UpdateWhenOffscreen";

/// Prefix of renderer properties addressing a blend shape weight
pub const BLEND_SHAPE_PROPERTY_PREFIX: &str = "blendShape.";

/// Curve values below this count as `false`
const BOOL_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
    #[serde(default)]
    pub in_tangent: f32,
    #[serde(default)]
    pub out_tangent: f32,
}

impl Keyframe {
    pub fn new(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            ..Self::default()
        }
    }
}

/// Object path, component type and property animated by a curve
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurveBinding {
    pub path: String,
    pub component_type: String,
    pub property: String,
}

impl CurveBinding {
    pub fn new(
        path: impl Into<String>,
        component_type: impl Into<String>,
        property: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            component_type: component_type.into(),
            property: property.into(),
        }
    }

    /// Binding of a suppressor's `SuppressBlink` property
    pub fn suppress_blink(path: impl Into<String>) -> Self {
        Self::new(path, SUPPRESSOR_COMPONENT_TYPE, SUPPRESS_BLINK_PROPERTY)
    }

    /// Binding of a blend shape weight on a skinned renderer
    pub fn blend_shape(path: impl Into<String>, name: &str) -> Self {
        Self::new(
            path,
            RENDERER_COMPONENT_TYPE,
            format!("{BLEND_SHAPE_PROPERTY_PREFIX}{name}"),
        )
    }

    pub fn update_when_offscreen(path: impl Into<String>) -> Self {
        Self::new(path, RENDERER_COMPONENT_TYPE, UPDATE_WHEN_OFFSCREEN_PROPERTY)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatCurve {
    pub binding: CurveBinding,
    pub keys: Vec<Keyframe>,
}

impl FloatCurve {
    /// Same key times and tangents with every value mapped
    fn map_values(&self, binding: CurveBinding, f: impl Fn(f32) -> f32) -> Self {
        Self {
            binding,
            keys: self
                .keys
                .iter()
                .map(|key| Keyframe {
                    value: f(key.value),
                    ..*key
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    #[serde(default)]
    pub curves: Vec<FloatCurve>,
}

impl AnimationClip {
    pub fn curve(&self, binding: &CurveBinding) -> Option<&FloatCurve> {
        self.curves.iter().find(|c| &c.binding == binding)
    }

    /// Remove and return the curve at a binding
    pub fn take_curve(&mut self, binding: &CurveBinding) -> Option<FloatCurve> {
        let index = self.curves.iter().position(|c| &c.binding == binding)?;
        Some(self.curves.remove(index))
    }

    /// Insert a curve, replacing any curve already at its binding
    pub fn set_curve(&mut self, curve: FloatCurve) {
        match self.curves.iter_mut().find(|c| c.binding == curve.binding) {
            Some(existing) => *existing = curve,
            None => self.curves.push(curve),
        }
    }
}

/// Move curves on `source` onto the toggle channel of the renderer at
/// `renderer_path`
///
/// Each matching clip loses its source curve and gains two curves with the
/// same key times and tangents:
/// - the toggle's blend shape weight, resting below 0.5 and suppressed
///   otherwise
/// - `m_UpdateWhenOffscreen`, held at 0
///
/// Returns the number of clips rewritten.
pub fn retarget_clips(
    clips: &mut [AnimationClip],
    source: &CurveBinding,
    renderer_path: &str,
    toggle: &ToggleChannel,
) -> usize {
    let toggle_binding = CurveBinding::blend_shape(renderer_path, &toggle.name);
    let offscreen_binding = CurveBinding::update_when_offscreen(renderer_path);

    let mut rewritten = 0;
    for clip in clips.iter_mut() {
        let Some(curve) = clip.take_curve(source) else {
            continue;
        };

        clip.set_curve(curve.map_values(toggle_binding.clone(), |value| {
            let suppressed = value >= BOOL_THRESHOLD || value.is_nan();
            ToggleState::from_suppressed(suppressed).weight()
        }));
        clip.set_curve(curve.map_values(offscreen_binding.clone(), |_| 0.0));

        tracing::debug!(
            "Retargeted clip '{}': {} keys onto '{}'",
            clip.name,
            curve.keys.len(),
            toggle_binding.property
        );
        rewritten += 1;
    }

    rewritten
}

//! Command implementations
//!
//! Each command reads a JSON document, runs one stage of the core and writes
//! the result back as JSON.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blink_suppressor_core::{
    HostMesh, MeshData, PassOutcome, Subject, Suppression, SuppressionParams, SuppressorSettings,
    Topology, run_pass, suppress, unique_toggle_name,
};

use crate::io::{load_json, save_json};

/// `<input>.suppressed.json` next to the input
pub fn default_output(input: &Path) -> PathBuf {
    input.with_extension("suppressed.json")
}

/// Suppress one blend shape of a mesh document
///
/// Settings come from `config` when given, with `threshold` overriding the
/// file's `blend_shape_threshold`.
pub fn suppress_mesh(
    input: &Path,
    output: &Path,
    channel: usize,
    threshold: Option<f32>,
    config: Option<&Path>,
) -> Result<Suppression> {
    let mut settings = match config {
        Some(path) => SuppressorSettings::load(path)
            .with_context(|| format!("Failed to load settings: {:?}", path))?,
        None => SuppressorSettings::default(),
    };
    if let Some(threshold) = threshold {
        settings.blend_shape_threshold = threshold;
    }
    settings.validate()?;

    let mut mesh: HostMesh = load_json(input)?;
    let data = MeshData::from_native(&mesh)
        .with_context(|| format!("Failed to decode mesh '{}'", mesh.name))?;

    let params = SuppressionParams::new(
        channel,
        settings.blend_shape_threshold,
        unique_toggle_name(&data),
    );
    let mut suppression = suppress(&data, &params)
        .with_context(|| format!("Failed to suppress channel {} of '{}'", channel, mesh.name))?;
    suppression.apply_to(&mut mesh)?;

    save_json(output, &mesh)?;
    Ok(suppression)
}

/// Run the build pass on a subject document
///
/// The document is written back even when the pass is skipped, since a skip
/// may still consume the suppressor component.
pub fn suppress_subject(input: &Path, output: &Path) -> Result<PassOutcome> {
    let mut subject: Subject<HostMesh> = load_json(input)?;
    let outcome = run_pass(&mut subject)?;
    save_json(output, &subject)?;
    Ok(outcome)
}

/// Summary of a mesh document
#[derive(Debug, Clone, PartialEq)]
pub struct MeshStats {
    pub name: String,
    pub vertices: usize,
    pub bone_weights: usize,
    /// Topology and primitive count per submesh
    pub submeshes: Vec<(Topology, usize)>,
    /// Name and frame count per blend shape
    pub channels: Vec<(String, usize)>,
}

impl MeshStats {
    pub fn primitives(&self) -> usize {
        self.submeshes.iter().map(|(_, count)| count).sum()
    }
}

impl fmt::Display for MeshStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mesh '{}'", self.name)?;
        writeln!(f, "  vertices: {}", self.vertices)?;
        writeln!(f, "  bone weights: {}", self.bone_weights)?;
        writeln!(f, "  primitives: {}", self.primitives())?;
        for (i, (topology, count)) in self.submeshes.iter().enumerate() {
            writeln!(f, "    [{}] {:?} x{}", i, topology, count)?;
        }
        writeln!(f, "  blend shapes: {}", self.channels.len())?;
        for (i, (name, frames)) in self.channels.iter().enumerate() {
            writeln!(f, "    [{}] {} ({} frames)", i, name, frames)?;
        }
        Ok(())
    }
}

/// Decode a mesh document and summarize it
pub fn inspect_mesh(input: &Path) -> Result<MeshStats> {
    let mesh: HostMesh = load_json(input)?;
    let data = MeshData::from_native(&mesh)
        .with_context(|| format!("Failed to decode mesh '{}'", mesh.name))?;

    Ok(MeshStats {
        name: mesh.name,
        vertices: data.vertices.len(),
        bone_weights: data.bone_weights.len(),
        submeshes: data
            .submeshes
            .iter()
            .map(|s| (s.topology, s.primitive_count))
            .collect(),
        channels: data
            .channels
            .iter()
            .map(|c| (c.name.clone(), c.frame_count))
            .collect(),
    })
}

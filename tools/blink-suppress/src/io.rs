//! JSON document loading and saving

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Load a JSON document
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open input: {:?}", path))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse JSON: {:?}", path))
}

/// Write a JSON document, pretty-printed
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create output: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to write JSON: {:?}", path))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blink_suppressor_core::HostMesh;
    use tempfile::tempdir;

    #[test]
    fn test_json_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mesh.json");
        let mesh = HostMesh {
            name: "empty".to_owned(),
            ..HostMesh::default()
        };

        save_json(&path, &mesh).unwrap();
        let loaded: HostMesh = load_json(&path).unwrap();
        assert_eq!(loaded, mesh);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_json::<HostMesh>(&dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to open input"));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_json::<HostMesh>(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}

//! Manifest discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConvoyError, Result};

use super::schema::Manifest;

/// Default manifest file name, looked up in the project root.
pub const DEFAULT_MANIFEST_NAME: &str = "convoy.yml";

/// Resolve the manifest path: an explicit `--manifest` path wins,
/// otherwise `convoy.yml` in the project root.
pub fn find_manifest(project_root: &Path, explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => project_root.join(DEFAULT_MANIFEST_NAME),
    }
}

/// Load and validate a manifest file.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    if !path.exists() {
        return Err(ConvoyError::ManifestNotFound {
            path: path.to_path_buf(),
        });
    }

    debug!(path = %path.display(), "loading manifest");
    let content = fs::read_to_string(path)?;

    let manifest: Manifest =
        serde_yaml::from_str(&content).map_err(|e| ConvoyError::ManifestParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    manifest.validate()?;
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn find_manifest_prefers_explicit_path() {
        let explicit = PathBuf::from("/elsewhere/deploy.yml");
        let found = find_manifest(Path::new("/work"), Some(&explicit));
        assert_eq!(found, explicit);
    }

    #[test]
    fn find_manifest_defaults_to_project_root() {
        let found = find_manifest(Path::new("/work"), None);
        assert_eq!(found, PathBuf::from("/work/convoy.yml"));
    }

    #[test]
    fn load_manifest_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = load_manifest(&temp.path().join("convoy.yml")).unwrap_err();
        assert!(matches!(err, ConvoyError::ManifestNotFound { .. }));
    }

    #[test]
    fn load_manifest_bad_yaml_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("convoy.yml");
        fs::write(&path, "steps: [not closed").unwrap();

        let err = load_manifest(&path).unwrap_err();
        match err {
            ConvoyError::ManifestParse { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected ManifestParse, got {:?}", other),
        }
    }

    #[test]
    fn load_manifest_valid_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("convoy.yml");
        fs::write(
            &path,
            r#"
version: 1
targets:
  local: {}
steps:
  - { index: 0, label: migrations, run: "./deploy.sh migrations" }
"#,
        )
        .unwrap();

        let manifest = load_manifest(&path).unwrap();
        assert_eq!(manifest.steps.len(), 1);
        assert!(manifest.targets.contains_key("local"));
    }

    #[test]
    fn load_manifest_invalid_manifest_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("convoy.yml");
        fs::write(
            &path,
            r#"
steps:
  - { index: 1, label: b, run: "true" }
  - { index: 0, label: a, run: "true" }
"#,
        )
        .unwrap();

        let err = load_manifest(&path).unwrap_err();
        assert!(matches!(err, ConvoyError::UnorderedIndex { .. }));
    }
}

//! Artifact writing for generated documents and error reports.
//!
//! Each write replaces the whole artifact: the old file is removed, the new
//! content lands in a temp file next to it and is renamed into place.
use crate::paths::{ArtifactExtension, WorkspacePaths};
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write `content` to `<outputs>/<name>.<ext>` and return the resolved path.
pub fn write_artifact(
    paths: &WorkspacePaths,
    name: &str,
    extension: ArtifactExtension,
    content: &str,
) -> Result<PathBuf> {
    let dir = paths.outputs_dir();
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = paths.artifact_path(name, extension);
    remove_if_exists(&path)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp file in {}", dir.display()))?;
    tmp.write_all(content.as_bytes())
        .with_context(|| format!("write {}", path.display()))?;
    tmp.persist(&path)
        .with_context(|| format!("publish {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "artifact written");
    Ok(path)
}

/// Remove an artifact left by an earlier run; returns the path when something was removed.
pub fn remove_artifact(
    paths: &WorkspacePaths,
    name: &str,
    extension: ArtifactExtension,
) -> Result<Option<PathBuf>> {
    let path = paths.artifact_path(name, extension);
    if remove_if_exists(&path)? {
        return Ok(Some(path));
    }
    Ok(None)
}

fn remove_if_exists(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path).with_context(|| format!("remove {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths_in(root: &Path) -> WorkspacePaths {
        WorkspacePaths::new(root.join("Inputs"), root.join("out/nested"))
    }

    #[test]
    fn creates_missing_output_directory() {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let paths = paths_in(temp_dir.path());
        let path = write_artifact(&paths, "Enumerations", ArtifactExtension::Vb, "a\n")
            .expect("write artifact");
        assert_eq!(path, temp_dir.path().join("out/nested/Enumerations.vb"));
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "a\n");
    }

    #[test]
    fn overwrites_previous_content_entirely() {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let paths = paths_in(temp_dir.path());
        write_artifact(&paths, "Enumerations", ArtifactExtension::Vb, "a much longer first run\n")
            .expect("first write");
        let path = write_artifact(&paths, "Enumerations", ArtifactExtension::Vb, "short\n")
            .expect("second write");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "short\n");

        let leftovers: Vec<_> = std::fs::read_dir(paths.outputs_dir())
            .expect("list outputs")
            .collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn remove_artifact_reports_only_existing_files() {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let paths = paths_in(temp_dir.path());
        let removed = remove_artifact(&paths, "ErrorsInLookupTables", ArtifactExtension::Txt)
            .expect("remove missing");
        assert_eq!(removed, None);

        let written = write_artifact(&paths, "ErrorsInLookupTables", ArtifactExtension::Txt, "x")
            .expect("write");
        let removed = remove_artifact(&paths, "ErrorsInLookupTables", ArtifactExtension::Txt)
            .expect("remove existing");
        assert_eq!(removed, Some(written.clone()));
        assert!(!written.exists());
    }
}

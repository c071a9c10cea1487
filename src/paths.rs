//! Typed paths into the generator's input and output layout.
use crate::config::GeneratorConfig;
use std::path::{Path, PathBuf};

/// Extension of an artifact written to the outputs directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactExtension {
    Vb,
    Txt,
}

impl ArtifactExtension {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactExtension::Vb => "vb",
            ArtifactExtension::Txt => "txt",
        }
    }
}

/// Name of the generated enumerations document.
pub const ENUMERATIONS_ARTIFACT: &str = "Enumerations";

#[derive(Debug, Clone)]
pub struct WorkspacePaths {
    inputs_dir: PathBuf,
    outputs_dir: PathBuf,
}

impl WorkspacePaths {
    pub fn new(inputs_dir: PathBuf, outputs_dir: PathBuf) -> Self {
        Self {
            inputs_dir,
            outputs_dir,
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.inputs_dir.clone(), config.outputs_dir.clone())
    }

    /// Return the directory manifests are read from.
    pub fn inputs_dir(&self) -> &Path {
        &self.inputs_dir
    }

    /// Return the directory artifacts are written to.
    pub fn outputs_dir(&self) -> &Path {
        &self.outputs_dir
    }

    /// Return `<outputs>/<name>.<ext>`.
    pub fn artifact_path(&self, name: &str, extension: ArtifactExtension) -> PathBuf {
        self.outputs_dir
            .join(format!("{name}.{}", extension.as_str()))
    }
}

//! Generator configuration.
//!
//! The config file is optional; every field has a default so a bare working
//! directory with `Inputs/` manifests is enough to run.
use crate::emit::{DuplicatePolicy, EmitOptions};
use crate::manifest::ManifestKind;
use crate::sanitize::{Sanitizer, DEFAULT_RESERVED_WORDS};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Config file looked up in the working root when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "enumgen.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub schema_version: u32,
    pub inputs_dir: PathBuf,
    pub outputs_dir: PathBuf,
    pub lookup_tables: String,
    pub lookup_tables_with_parents: String,
    pub database: Option<PathBuf>,
    pub attach: BTreeMap<String, PathBuf>,
    pub default_schema: String,
    pub reserved_words: Vec<String>,
    pub duplicate_policy: DuplicatePolicy,
    pub query_timeout_ms: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        default_config()
    }
}

impl GeneratorConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            sanitizer: Sanitizer::new(self.reserved_words.iter().cloned()),
            default_schema: self.default_schema.clone(),
            duplicate_policy: self.duplicate_policy,
        }
    }

    /// Resolve relative paths against `root` so the run never depends on the
    /// process working directory.
    pub fn resolve_paths(&mut self, root: &Path) {
        self.inputs_dir = root.join(&self.inputs_dir);
        self.outputs_dir = root.join(&self.outputs_dir);
        if let Some(database) = self.database.take() {
            self.database = Some(root.join(database));
        }
        for path in self.attach.values_mut() {
            *path = root.join(&*path);
        }
    }
}

/// Built-in defaults matching the conventional `Inputs/` and `Outputs/` layout.
pub fn default_config() -> GeneratorConfig {
    GeneratorConfig {
        schema_version: CONFIG_SCHEMA_VERSION,
        inputs_dir: PathBuf::from("Inputs"),
        outputs_dir: PathBuf::from("Outputs"),
        lookup_tables: ManifestKind::LookupTables.default_file_name(),
        lookup_tables_with_parents: ManifestKind::LookupTablesWithParents.default_file_name(),
        database: None,
        attach: BTreeMap::new(),
        default_schema: "dbo".to_string(),
        reserved_words: DEFAULT_RESERVED_WORDS
            .iter()
            .map(|word| word.to_string())
            .collect(),
        duplicate_policy: DuplicatePolicy::Keep,
        query_timeout_ms: 5_000,
    }
}

/// Render a pretty JSON config stub.
pub fn config_stub() -> String {
    serde_json::to_string_pretty(&default_config()).expect("serialize config stub")
}

/// Load a config from `path`.
pub fn load_config(path: &Path) -> Result<GeneratorConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: GeneratorConfig =
        serde_json::from_slice(&bytes).context("parse generator config JSON")?;
    Ok(config)
}

/// Load the explicit config, else `<root>/enumgen.json` when present, else defaults.
pub fn load_config_for_root(root: &Path, explicit: Option<&Path>) -> Result<GeneratorConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    let path = root.join(DEFAULT_CONFIG_FILE);
    if path.is_file() {
        return load_config(&path);
    }
    Ok(default_config())
}

/// Validate schema version and fields the pipeline cannot run without.
pub fn validate_config(config: &GeneratorConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported generator config schema_version {}",
            config.schema_version
        ));
    }
    if config.lookup_tables.trim().is_empty() || config.lookup_tables_with_parents.trim().is_empty()
    {
        return Err(anyhow!("manifest file names must not be empty"));
    }
    if config.default_schema.trim().is_empty() {
        return Err(anyhow!("default_schema must not be empty"));
    }
    for schema in config.attach.keys() {
        if schema.trim().is_empty() {
            return Err(anyhow!("attach entries need a schema name"));
        }
    }
    if config.query_timeout_ms == 0 {
        return Err(anyhow!("query_timeout_ms must be greater than zero"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

//! Diagnostics collected during a generation run and their rendering.
//!
//! Components return diagnostics next to their primary result instead of
//! printing them; the orchestrator aggregates and this module renders.
use crate::manifest::ManifestKind;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// One operator-facing finding from a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    MissingManifest {
        manifest: ManifestKind,
        path: String,
        reason: String,
    },
    UnreadableManifest {
        manifest: ManifestKind,
        path: String,
        reason: String,
    },
    ManifestFormat {
        manifest: ManifestKind,
        message: String,
    },
    /// An error artifact could not be written or cleared.
    ArtifactWrite {
        path: String,
        reason: String,
    },
    RowFetch {
        table: String,
        query: String,
        reason: String,
    },
    MalformedRow {
        table: String,
        reason: String,
    },
    DuplicateDescription {
        table: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        scope: Option<String>,
        description: String,
        ids: Vec<i64>,
    },
    IdentifierCollision {
        table: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        scope: Option<String>,
        identifier: String,
        descriptions: Vec<String>,
    },
    EmptyIdentifier {
        table: String,
        source: String,
        fallback: String,
    },
    EmptyTable {
        table: String,
    },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::MissingManifest { .. }
            | Diagnostic::EmptyIdentifier { .. }
            | Diagnostic::EmptyTable { .. } => Severity::Warning,
            Diagnostic::UnreadableManifest { .. }
            | Diagnostic::ManifestFormat { .. }
            | Diagnostic::ArtifactWrite { .. }
            | Diagnostic::RowFetch { .. }
            | Diagnostic::MalformedRow { .. }
            | Diagnostic::DuplicateDescription { .. }
            | Diagnostic::IdentifierCollision { .. } => Severity::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }
}

fn scope_suffix(scope: Option<&str>) -> String {
    match scope {
        Some(scope) => format!(" (parent {scope})"),
        None => String::new(),
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingManifest {
                manifest,
                path,
                reason,
            } => write!(f, "{manifest} manifest unavailable: {reason}: {path}"),
            Diagnostic::UnreadableManifest {
                manifest,
                path,
                reason,
            } => write!(f, "{manifest} manifest could not be read: {reason}: {path}"),
            Diagnostic::ManifestFormat { manifest, message } => {
                write!(f, "{manifest}: {message}")
            }
            Diagnostic::ArtifactWrite { path, reason } => {
                write!(f, "could not update {path}: {reason}")
            }
            Diagnostic::RowFetch { table, reason, .. } => {
                write!(f, "query for {table} failed: {reason}")
            }
            Diagnostic::MalformedRow { table, reason } => {
                write!(f, "skipped {table}: {reason}")
            }
            Diagnostic::DuplicateDescription {
                table,
                scope,
                description,
                ids,
            } => {
                let ids: Vec<String> = ids.iter().map(i64::to_string).collect();
                write!(
                    f,
                    "duplicate description in {table}{}: {description:?} (ids {})",
                    scope_suffix(scope.as_deref()),
                    ids.join(", ")
                )
            }
            Diagnostic::IdentifierCollision {
                table,
                scope,
                identifier,
                descriptions,
            } => write!(
                f,
                "identifier {identifier} in {table}{} is produced by {descriptions:?}",
                scope_suffix(scope.as_deref())
            ),
            Diagnostic::EmptyIdentifier {
                table,
                source,
                fallback,
            } => write!(
                f,
                "{source:?} in {table} has no identifier characters; using {fallback}"
            ),
            Diagnostic::EmptyTable { table } => {
                write!(f, "{table} returned no rows")
            }
        }
    }
}

/// Machine-readable summary of one run.
#[derive(Debug, Default, Serialize)]
pub struct GenerationReport {
    pub written: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

impl GenerationReport {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|diag| diag.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

/// Emit every diagnostic through tracing at its severity.
pub fn log_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.severity() {
            Severity::Warning => tracing::warn!("{diagnostic}"),
            Severity::Error => tracing::error!("{diagnostic}"),
        }
    }
}

/// Persist the report as pretty JSON.
pub fn write_report(path: &Path, report: &GenerationReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(report).context("serialize generation report")?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

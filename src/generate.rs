//! Generation orchestration: manifests in, enumerations document out.
//!
//! One pass, one table at a time. Per-table failures become diagnostics and
//! the run continues; only writing the enumerations document can fail the
//! whole run, and diagnostics are logged before that write is attempted.
use crate::emit::{EmitOptions, Emitter, FlatTable, GeneratedDocument, HierarchicalTable};
use crate::lookup::{group_by_parent, values_from_rows, values_with_parent_from_rows};
use crate::manifest::{
    parse_manifest, read_manifest, HierarchicalTableDescriptor, ManifestKind,
    ManifestParseResult, ManifestRecord, ManifestSource, TableDescriptor,
};
use crate::output::{remove_artifact, write_artifact};
use crate::paths::{ArtifactExtension, WorkspacePaths, ENUMERATIONS_ARTIFACT};
use crate::report::{log_diagnostics, Diagnostic, GenerationReport};
use crate::rows::{fetch_rows, RawRow, RowQuery, RowSource};
use anyhow::Result;

/// Manifest file names, relative to the inputs directory.
#[derive(Debug, Clone)]
pub struct ManifestFiles {
    pub lookup_tables: String,
    pub lookup_tables_with_parents: String,
}

impl Default for ManifestFiles {
    fn default() -> Self {
        Self {
            lookup_tables: ManifestKind::LookupTables.default_file_name(),
            lookup_tables_with_parents: ManifestKind::LookupTablesWithParents.default_file_name(),
        }
    }
}

pub struct Generator<'a, S: RowSource + ?Sized> {
    paths: WorkspacePaths,
    emitter: Emitter,
    source: &'a S,
}

impl<'a, S: RowSource + ?Sized> Generator<'a, S> {
    pub fn new(paths: WorkspacePaths, options: EmitOptions, source: &'a S) -> Self {
        Self {
            paths,
            emitter: Emitter::new(options),
            source,
        }
    }

    /// Run the whole pipeline and write every artifact.
    pub fn run(&self, files: &ManifestFiles) -> Result<GenerationReport> {
        let mut report = GenerationReport::default();

        let flat = self.load_manifest::<TableDescriptor>(&files.lookup_tables, &mut report);
        let flat_tables = self.fetch_flat(&flat.descriptors, &mut report.diagnostics);
        let flat_section = self.emitter.flat_regions(&flat_tables);
        report.diagnostics.extend(flat_section.diagnostics);

        let hierarchical = self.load_manifest::<HierarchicalTableDescriptor>(
            &files.lookup_tables_with_parents,
            &mut report,
        );
        let hierarchical_lines = if hierarchical.descriptors.is_empty() {
            Vec::new()
        } else {
            let tables =
                self.fetch_hierarchical(&hierarchical.descriptors, &mut report.diagnostics);
            let section = self.emitter.hierarchical_classes(&tables);
            report.diagnostics.extend(section.diagnostics);
            section.lines
        };

        let document = GeneratedDocument::assemble(flat_section.lines, hierarchical_lines);
        log_diagnostics(&report.diagnostics);
        let path = write_artifact(
            &self.paths,
            ENUMERATIONS_ARTIFACT,
            ArtifactExtension::Vb,
            &document.render(),
        )?;
        report.written.push(path);
        Ok(report)
    }

    /// Read and parse one manifest, writing or clearing its error artifact.
    fn load_manifest<T: ManifestRecord>(
        &self,
        file_name: &str,
        report: &mut GenerationReport,
    ) -> ManifestParseResult<T> {
        let kind = T::KIND;
        let parsed = match read_manifest(self.paths.inputs_dir(), file_name) {
            ManifestSource::Text(content) => parse_manifest::<T>(&content),
            ManifestSource::Missing { path, reason } => {
                report.diagnostics.push(Diagnostic::MissingManifest {
                    manifest: kind,
                    path: path.display().to_string(),
                    reason,
                });
                ManifestParseResult::default()
            }
            ManifestSource::Unreadable { path, reason } => {
                report.diagnostics.push(Diagnostic::UnreadableManifest {
                    manifest: kind,
                    path: path.display().to_string(),
                    reason,
                });
                ManifestParseResult::default()
            }
        };
        tracing::info!(
            manifest = %kind,
            tables = parsed.descriptors.len(),
            errors = parsed.errors.len(),
            "manifest loaded"
        );

        self.update_error_artifact(kind, &parsed.errors, report);
        parsed
    }

    /// Write this kind's format errors, or clear a stale file when there are none.
    ///
    /// Failures here are diagnostics; the enumerations document is still written.
    fn update_error_artifact(
        &self,
        kind: ManifestKind,
        errors: &[String],
        report: &mut GenerationReport,
    ) {
        let artifact = kind.error_artifact_name();
        if errors.is_empty() {
            match remove_artifact(&self.paths, &artifact, ArtifactExtension::Txt) {
                Ok(Some(path)) => report.removed.push(path),
                Ok(None) => {}
                Err(err) => report.diagnostics.push(self.artifact_failure(&artifact, &err)),
            }
            return;
        }

        let mut content = String::new();
        for error in errors {
            content.push_str(error);
            content.push('\n');
            report.diagnostics.push(Diagnostic::ManifestFormat {
                manifest: kind,
                message: error.clone(),
            });
        }
        match write_artifact(&self.paths, &artifact, ArtifactExtension::Txt, &content) {
            Ok(path) => report.written.push(path),
            Err(err) => report.diagnostics.push(self.artifact_failure(&artifact, &err)),
        }
    }

    fn artifact_failure(&self, artifact: &str, err: &anyhow::Error) -> Diagnostic {
        Diagnostic::ArtifactWrite {
            path: self
                .paths
                .artifact_path(artifact, ArtifactExtension::Txt)
                .display()
                .to_string(),
            reason: format!("{err:#}"),
        }
    }

    fn fetch(&self, query: &RowQuery, diagnostics: &mut Vec<Diagnostic>) -> Vec<RawRow> {
        match fetch_rows(self.source, query) {
            Ok(rows) => rows,
            Err(err) => {
                diagnostics.push(Diagnostic::RowFetch {
                    table: query.label.clone(),
                    query: query.sql.clone(),
                    reason: err.to_string(),
                });
                Vec::new()
            }
        }
    }

    fn fetch_flat(
        &self,
        descriptors: &[TableDescriptor],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<FlatTable> {
        let mut tables = Vec::new();
        for descriptor in descriptors {
            let query = RowQuery::flat(descriptor);
            let rows = self.fetch(&query, diagnostics);
            match values_from_rows(&rows) {
                Ok(values) => tables.push(FlatTable {
                    descriptor: descriptor.clone(),
                    values,
                }),
                Err(err) => diagnostics.push(Diagnostic::MalformedRow {
                    table: query.label,
                    reason: err.to_string(),
                }),
            }
        }
        tables
    }

    fn fetch_hierarchical(
        &self,
        descriptors: &[HierarchicalTableDescriptor],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<HierarchicalTable> {
        let mut tables = Vec::new();
        for descriptor in descriptors {
            let query = RowQuery::hierarchical(descriptor);
            let rows = self.fetch(&query, diagnostics);
            match values_with_parent_from_rows(&rows) {
                Ok(values) => tables.push(HierarchicalTable {
                    descriptor: descriptor.clone(),
                    groups: group_by_parent(values),
                }),
                Err(err) => diagnostics.push(Diagnostic::MalformedRow {
                    table: query.label,
                    reason: err.to_string(),
                }),
            }
        }
        tables
    }
}

//! Manifest parsing for flat and hierarchical lookup tables.
//!
//! A manifest is a plain-text list of tables, one delimited record per line.
//! Malformed lines never fail the parse; they come back as error strings so a
//! single typo cannot stop the rest of the run. A line is malformed when its
//! field count is wrong or when any field is empty after trimming, so
//! `dbo..Name` is rejected rather than queried.
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const COMMENT_MARKERS: &[&str] = &["--", "//", "'"];

/// Which manifest a record or diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestKind {
    LookupTables,
    LookupTablesWithParents,
}

impl ManifestKind {
    pub fn separator(self) -> char {
        match self {
            ManifestKind::LookupTables => '.',
            ManifestKind::LookupTablesWithParents => ',',
        }
    }

    pub fn field_count(self) -> usize {
        match self {
            ManifestKind::LookupTables => 3,
            ManifestKind::LookupTablesWithParents => 5,
        }
    }

    /// Base name shared by the default manifest file and its error artifact.
    pub fn name(self) -> &'static str {
        match self {
            ManifestKind::LookupTables => "LookupTables",
            ManifestKind::LookupTablesWithParents => "LookupTablesWithParents",
        }
    }

    pub fn default_file_name(self) -> String {
        format!("{}.supersecret", self.name())
    }

    pub fn error_artifact_name(self) -> String {
        format!("ErrorsIn{}", self.name())
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A flat lookup table: `schema.table.descriptionColumn`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    pub schema: String,
    pub table: String,
    pub description_column: String,
}

/// A lookup table grouped by parent: `schema,table,view,descriptionColumn,parentColumn`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchicalTableDescriptor {
    pub schema: String,
    pub table: String,
    pub view: String,
    pub description_column: String,
    pub parent_column: String,
}

impl TableDescriptor {
    /// `schema.table`, as the table is named in queries and diagnostics.
    pub fn label(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }
}

impl HierarchicalTableDescriptor {
    /// `schema.view`; rows are read from the view, not the base table.
    pub fn label(&self) -> String {
        format!("{}.{}", self.schema, self.view)
    }
}

/// A typed manifest record built from exactly `KIND.field_count()` trimmed fields.
pub trait ManifestRecord: Sized {
    const KIND: ManifestKind;

    fn from_fields(fields: &[&str]) -> Self;
}

impl ManifestRecord for TableDescriptor {
    const KIND: ManifestKind = ManifestKind::LookupTables;

    fn from_fields(fields: &[&str]) -> Self {
        Self {
            schema: fields[0].to_string(),
            table: fields[1].to_string(),
            description_column: fields[2].to_string(),
        }
    }
}

impl ManifestRecord for HierarchicalTableDescriptor {
    const KIND: ManifestKind = ManifestKind::LookupTablesWithParents;

    fn from_fields(fields: &[&str]) -> Self {
        Self {
            schema: fields[0].to_string(),
            table: fields[1].to_string(),
            view: fields[2].to_string(),
            description_column: fields[3].to_string(),
            parent_column: fields[4].to_string(),
        }
    }
}

/// Descriptors and format errors from one manifest, both in line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestParseResult<T> {
    pub descriptors: Vec<T>,
    pub errors: Vec<String>,
}

impl<T> Default for ManifestParseResult<T> {
    fn default() -> Self {
        Self {
            descriptors: Vec::new(),
            errors: Vec::new(),
        }
    }
}

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Outcome of locating and reading a manifest file.
#[derive(Debug)]
pub enum ManifestSource {
    Text(String),
    /// The inputs directory or the file itself does not exist.
    Missing { path: PathBuf, reason: String },
    /// The file exists but could not be read as UTF-8 text.
    Unreadable { path: PathBuf, reason: String },
}

fn is_ignored(line: &str) -> bool {
    line.trim().is_empty() || COMMENT_MARKERS.iter().any(|marker| line.starts_with(marker))
}

/// Parse raw manifest lines, building each record with `factory`.
///
/// Blank and comment lines are dropped first; every other line yields exactly
/// one descriptor or one `Invalid format: <line>` error.
pub fn parse_lines<T, I, S, F>(
    lines: I,
    separator: char,
    expected_field_count: usize,
    factory: F,
) -> ManifestParseResult<T>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: Fn(&[&str]) -> T,
{
    let mut result = ManifestParseResult::default();
    for line in lines {
        let line = line.as_ref();
        if is_ignored(line) {
            continue;
        }
        let fields: Vec<&str> = line.split(separator).map(str::trim).collect();
        if fields.len() != expected_field_count || fields.iter().any(|field| field.is_empty()) {
            result.errors.push(format!("Invalid format: {line}"));
            continue;
        }
        result.descriptors.push(factory(&fields));
    }
    result
}

/// Parse manifest text into typed records for `T`, ignoring a leading byte order mark.
pub fn parse_manifest<T: ManifestRecord>(content: &str) -> ManifestParseResult<T> {
    let content = content.strip_prefix(BYTE_ORDER_MARK).unwrap_or(content);
    parse_lines(
        content.lines(),
        T::KIND.separator(),
        T::KIND.field_count(),
        T::from_fields,
    )
}

/// Read a manifest file, distinguishing a missing inputs directory or file
/// from one that exists but cannot be read.
pub fn read_manifest(inputs_dir: &Path, file_name: &str) -> ManifestSource {
    if !inputs_dir.is_dir() {
        return ManifestSource::Missing {
            path: inputs_dir.to_path_buf(),
            reason: "directory does not exist".to_string(),
        };
    }
    let path = inputs_dir.join(file_name);
    match fs::read_to_string(&path) {
        Ok(content) => ManifestSource::Text(content),
        Err(err) if err.kind() == io::ErrorKind::NotFound => ManifestSource::Missing {
            path,
            reason: "file does not exist".to_string(),
        },
        Err(err) => ManifestSource::Unreadable {
            path,
            reason: err.to_string(),
        },
    }
}

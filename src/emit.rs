//! Enumeration text emission.
//!
//! Output is built line by line from already-ordered inputs; nothing here
//! sorts, so identical rows and manifests always render identical text.
use crate::lookup::{duplicate_descriptions, LookupValue, ParentGroup};
use crate::manifest::{HierarchicalTableDescriptor, TableDescriptor};
use crate::report::Diagnostic;
use crate::sanitize::Sanitizer;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const INDENT: &str = "    ";

/// Emitted in place of members when a flat table has no rows.
pub const EMPTY_TABLE_PLACEHOLDER: &str =
    "'TODO: This will not compile because the table is empty.  Fix it!";

/// Nested enumeration name used when a parent value has no identifier characters.
pub const UNASSIGNED_PARENT: &str = "_Unassigned";

/// What to do when two members in one enumeration end up with the same name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Emit every member as-is and leave the clash to the operator.
    #[default]
    Keep,
    /// Suffix later clashing members with `_<id>`.
    SuffixId,
}

#[derive(Debug, Clone)]
pub struct EmitOptions {
    pub sanitizer: Sanitizer,
    pub default_schema: String,
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            sanitizer: Sanitizer::default(),
            default_schema: "dbo".to_string(),
            duplicate_policy: DuplicatePolicy::Keep,
        }
    }
}

/// A flat table with its fetched values.
#[derive(Debug, Clone)]
pub struct FlatTable {
    pub descriptor: TableDescriptor,
    pub values: Vec<LookupValue>,
}

/// A hierarchical table with its values grouped by parent.
#[derive(Debug, Clone)]
pub struct HierarchicalTable {
    pub descriptor: HierarchicalTableDescriptor,
    pub groups: Vec<ParentGroup>,
}

/// Lines plus the diagnostics raised while producing them.
#[derive(Debug, Default)]
pub struct Emitted {
    pub lines: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

fn indent(depth: usize) -> String {
    INDENT.repeat(depth)
}

fn description_attribute(description: &str) -> String {
    format!("<Description(\"{}\")>", description.replace('"', ""))
}

pub struct Emitter {
    options: EmitOptions,
}

impl Emitter {
    pub fn new(options: EmitOptions) -> Self {
        Self { options }
    }

    /// Enumeration name for a flat table; the default schema gets no prefix.
    pub fn flat_enum_name(&self, descriptor: &TableDescriptor) -> String {
        if descriptor.schema == self.options.default_schema {
            descriptor.table.clone()
        } else {
            format!("{}_{}", descriptor.schema, descriptor.table)
        }
    }

    /// Emit flat enumerations grouped into one region per schema.
    ///
    /// Regions follow the order in which schemas first appear in `tables`.
    pub fn flat_regions(&self, tables: &[FlatTable]) -> Emitted {
        let mut out = Emitted::default();
        let mut schemas: Vec<&str> = Vec::new();
        for table in tables {
            if !schemas.contains(&table.descriptor.schema.as_str()) {
                schemas.push(&table.descriptor.schema);
            }
        }

        for schema in schemas {
            out.lines.push(format!("#Region \"{schema}\""));
            out.lines.push(String::new());
            for table in tables
                .iter()
                .filter(|table| table.descriptor.schema == schema)
            {
                self.flat_enum(table, &mut out);
            }
            out.lines.push("#End Region".to_string());
            out.lines.push(String::new());
        }
        out
    }

    fn flat_enum(&self, table: &FlatTable, out: &mut Emitted) {
        let label = table.descriptor.label();
        out.lines.push(format!(
            "{}Public Enum {}",
            indent(1),
            self.flat_enum_name(&table.descriptor)
        ));
        if table.values.is_empty() {
            out.lines
                .push(format!("{}{EMPTY_TABLE_PLACEHOLDER}", indent(2)));
            out.diagnostics.push(Diagnostic::EmptyTable { table: label });
        } else {
            self.members(&label, None, &table.values, 2, out);
        }
        out.lines.push(format!("{}End Enum", indent(1)));
        out.lines.push(String::new());
    }

    /// Emit one class per hierarchical table holding one enumeration per parent.
    pub fn hierarchical_classes(&self, tables: &[HierarchicalTable]) -> Emitted {
        let mut out = Emitted::default();
        for table in tables {
            let descriptor = &table.descriptor;
            let label = descriptor.label();
            out.lines.push(format!(
                "{}Public Class {}_{}",
                indent(1),
                descriptor.schema,
                descriptor.table
            ));
            out.lines.push(String::new());
            if table.groups.is_empty() {
                out.diagnostics.push(Diagnostic::EmptyTable {
                    table: label.clone(),
                });
            }
            for group in &table.groups {
                let name = match self.options.sanitizer.try_sanitize(&group.parent) {
                    Some(name) => name,
                    None => {
                        out.diagnostics.push(Diagnostic::EmptyIdentifier {
                            table: label.clone(),
                            source: group.parent.clone(),
                            fallback: UNASSIGNED_PARENT.to_string(),
                        });
                        UNASSIGNED_PARENT.to_string()
                    }
                };
                out.lines
                    .push(format!("{}Public Enum {name}", indent(2)));
                self.members(&label, Some(group.parent.as_str()), &group.values, 3, &mut out);
                out.lines.push(format!("{}End Enum", indent(2)));
                out.lines.push(String::new());
            }
            out.lines.push(format!("{}End Class", indent(1)));
            out.lines.push(String::new());
        }
        out
    }

    fn members(
        &self,
        label: &str,
        scope: Option<&str>,
        values: &[LookupValue],
        depth: usize,
        out: &mut Emitted,
    ) {
        for duplicate in duplicate_descriptions(values) {
            out.diagnostics.push(Diagnostic::DuplicateDescription {
                table: label.to_string(),
                scope: scope.map(str::to_string),
                description: duplicate.description,
                ids: duplicate.ids,
            });
        }

        let identifiers: Vec<String> = values
            .iter()
            .map(|value| self.identifier_for(label, value, out))
            .collect();
        self.report_collisions(label, scope, values, &identifiers, out);

        // Identifiers in the generated language are case-insensitive.
        let mut used: HashSet<String> = HashSet::new();
        for (value, identifier) in values.iter().zip(identifiers) {
            let mut name = identifier;
            if self.options.duplicate_policy == DuplicatePolicy::SuffixId {
                while used.contains(&name.to_ascii_lowercase()) {
                    name = format!("{name}_{}", value.id);
                }
            }
            used.insert(name.to_ascii_lowercase());
            out.lines.push(format!(
                "{}{}",
                indent(depth),
                description_attribute(&value.description)
            ));
            out.lines
                .push(format!("{}{name} = {}", indent(depth), value.id));
        }
    }

    fn identifier_for(&self, label: &str, value: &LookupValue, out: &mut Emitted) -> String {
        if let Some(identifier) = self.options.sanitizer.try_sanitize(&value.description) {
            return identifier;
        }
        let fallback = format!("_{}", value.id);
        out.diagnostics.push(Diagnostic::EmptyIdentifier {
            table: label.to_string(),
            source: value.description.clone(),
            fallback: fallback.clone(),
        });
        fallback
    }

    /// Flag distinct descriptions that sanitize to the same identifier.
    fn report_collisions(
        &self,
        label: &str,
        scope: Option<&str>,
        values: &[LookupValue],
        identifiers: &[String],
        out: &mut Emitted,
    ) {
        let mut groups: Vec<(String, String, Vec<String>)> = Vec::new();
        for (value, identifier) in values.iter().zip(identifiers) {
            let key = identifier.to_ascii_lowercase();
            match groups.iter_mut().find(|(existing, _, _)| *existing == key) {
                Some((_, _, descriptions)) => {
                    if !descriptions.contains(&value.description) {
                        descriptions.push(value.description.clone());
                    }
                }
                None => groups.push((key, identifier.clone(), vec![value.description.clone()])),
            }
        }
        for (_, identifier, descriptions) in groups {
            if descriptions.len() > 1 {
                out.diagnostics.push(Diagnostic::IdentifierCollision {
                    table: label.to_string(),
                    scope: scope.map(str::to_string),
                    identifier,
                    descriptions,
                });
            }
        }
    }
}

/// The final generated source file, built append-only and rendered once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedDocument {
    lines: Vec<String>,
}

impl GeneratedDocument {
    /// Wrap flat and hierarchical sections in the enclosing `Enumerations` class.
    pub fn assemble(flat: Vec<String>, hierarchical: Vec<String>) -> Self {
        let mut document = Self::default();
        document.push("Imports System.ComponentModel");
        document.push("");
        document.push("Public Class Enumerations");
        document.push("");
        document.lines.extend(flat);
        document.lines.extend(hierarchical);
        document.push("End Class");
        document
    }

    pub fn push(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

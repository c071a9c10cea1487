//! CLI argument parsing for the enumeration generator.
//!
//! The CLI stays thin: everything it accepts is folded into the config and
//! manifest names before the pipeline starts.
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "enumgen",
    version,
    about = "Generate enumerations from database lookup tables",
    after_help = "Layout:\n  <root>/Inputs/LookupTables.supersecret             schema.table.descriptionColumn\n  <root>/Inputs/LookupTablesWithParents.supersecret  schema,table,view,descriptionColumn,parentColumn\n  <root>/Outputs/Enumerations.vb                    generated enumerations\n\nExamples:\n  enumgen --database lookups.db\n  enumgen MyTables.txt MyParents.txt --root ./gen --strict\n  enumgen --print-config > enumgen.json"
)]
pub struct RootArgs {
    /// Flat manifest file name, relative to the inputs directory
    #[arg(value_name = "LOOKUP_TABLES")]
    pub lookup_tables: Option<String>,

    /// Hierarchical manifest file name, relative to the inputs directory
    #[arg(value_name = "LOOKUP_TABLES_WITH_PARENTS")]
    pub lookup_tables_with_parents: Option<String>,

    /// Working root holding the inputs and outputs directories (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Config file (default: <root>/enumgen.json when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// SQLite database to query, overriding the config
    #[arg(long, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Write a JSON report of artifacts and diagnostics
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Exit with status 2 when any error diagnostic was recorded
    #[arg(long)]
    pub strict: bool,

    /// Emit debug logging, including every issued query
    #[arg(long)]
    pub verbose: bool,

    /// Print the default config as JSON and exit
    #[arg(long, exclusive = true)]
    pub print_config: bool,
}

/// Treat a blank positional argument the same as an absent one.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        RootArgs::command().debug_assert();
    }

    #[test]
    fn positional_manifest_names_are_optional() {
        let args = RootArgs::parse_from(["enumgen"]);
        assert!(args.lookup_tables.is_none());
        assert!(args.lookup_tables_with_parents.is_none());

        let args = RootArgs::parse_from(["enumgen", "A.txt", "B.txt", "--strict"]);
        assert_eq!(args.lookup_tables.as_deref(), Some("A.txt"));
        assert_eq!(args.lookup_tables_with_parents.as_deref(), Some("B.txt"));
        assert!(args.strict);
    }

    #[test]
    fn blank_names_fall_back() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some("x")), Some("x"));
        assert_eq!(non_blank(None), None);
    }
}

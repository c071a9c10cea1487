//! Shared fixture for end-to-end runs of the `enumgen` binary.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A throwaway working root with `Inputs/`, SQLite databases, and `Outputs/`.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(dir.path().join("Inputs")).expect("create inputs");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_input(&self, name: &str, contents: &str) {
        std::fs::write(self.root().join("Inputs").join(name), contents).expect("write input");
    }

    pub fn write_root_file(&self, name: &str, contents: &str) {
        std::fs::write(self.root().join(name), contents).expect("write root file");
    }

    /// Create `<root>/<name>` and run `statements` against it.
    pub fn database(&self, name: &str, statements: &str) -> PathBuf {
        let path = self.root().join(name);
        let conn = Connection::open(&path).expect("open database");
        conn.execute_batch(statements).expect("seed database");
        path
    }

    pub fn output(&self, name: &str) -> Option<String> {
        std::fs::read_to_string(self.root().join("Outputs").join(name)).ok()
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_enumgen"))
            .arg("--root")
            .arg(self.root())
            .args(args)
            .env("RUST_LOG", "warn")
            .output()
            .expect("run enumgen")
    }
}

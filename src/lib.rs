//! Lookup-table enumeration generator.
//!
//! Reads table manifests, queries each lookup table, and renders one
//! enumeration per table into a generated source document.
pub mod config;
pub mod emit;
pub mod generate;
pub mod lookup;
pub mod manifest;
pub mod output;
pub mod paths;
pub mod report;
pub mod rows;
pub mod sanitize;

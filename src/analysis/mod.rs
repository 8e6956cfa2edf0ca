//! Static export-surface analysis.
//!
//! The [`exports`] module holds the resolution engine, [`helpers`] the pure
//! tree-shape predicates it is built from, and [`naming`] the path-based
//! fallback used to name anonymous default exports.

pub mod exports;
pub mod helpers;
pub mod naming;

pub use exports::{
    analyze_file, find_exports, AnalysisError, AnalysisResult, ExportAnalyzer, ModuleExports,
};
pub use naming::guess_default_export_name;

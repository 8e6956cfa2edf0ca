//! ExportScope - static export surface analyzer for JavaScript and TypeScript
//!
//! This crate determines which names a module exports, whether it has a
//! default export, and what that default export is called, from source text
//! alone - no code is ever executed. It understands both native ES module
//! syntax and the CommonJS `module.exports` mutation conventions.

pub mod analysis;
pub mod parser;
pub mod report;
pub mod resolve;

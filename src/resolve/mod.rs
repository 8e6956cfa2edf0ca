//! Module resolution: mapping an import specifier to a file on disk.
//!
//! Implements the subset of the Node.js resolution algorithm the analyzer
//! needs: relative and absolute specifiers are tried against a fixed
//! extension search order, directories resolve through their `package.json`
//! `"main"` entry and then `index.*`, and bare specifiers walk ancestor
//! `node_modules` directories. Resolution is a lookup, not a validation:
//! failure is `None`, never an error.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Extension search order, tried in sequence when a specifier does not name
/// an existing file outright.
pub const EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "json", "node"];

/// The slice of package.json the resolver cares about.
#[derive(Debug, Deserialize)]
struct PackageManifest {
    main: Option<String>,
}

/// Resolve an import/require specifier against the directory of the
/// importing file. Returns the absolute path of the resolved file, or `None`
/// if nothing on disk matches.
pub fn resolve_import(specifier: &str, base_dir: &Path) -> Option<PathBuf> {
    if specifier.starts_with('.') || Path::new(specifier).is_absolute() {
        // join() replaces the base entirely for absolute specifiers
        resolve_path(&base_dir.join(specifier))
    } else {
        resolve_package(specifier, base_dir)
    }
}

/// Resolve a concrete path candidate: exact file, then the extension search
/// order, then directory resolution.
fn resolve_path(candidate: &Path) -> Option<PathBuf> {
    if candidate.is_file() {
        return Some(candidate.to_path_buf());
    }
    for ext in EXTENSIONS {
        let with_ext = append_extension(candidate, ext);
        if with_ext.is_file() {
            return Some(with_ext);
        }
    }
    if candidate.is_dir() {
        resolve_directory(candidate)
    } else {
        None
    }
}

/// Resolve a directory: package.json "main" first, then index files.
fn resolve_directory(dir: &Path) -> Option<PathBuf> {
    if let Some(main) = read_manifest_main(dir) {
        if let Some(resolved) = resolve_path(&dir.join(main)) {
            return Some(resolved);
        }
    }
    for ext in EXTENSIONS {
        let index = dir.join(format!("index.{ext}"));
        if index.is_file() {
            return Some(index);
        }
    }
    None
}

/// Resolve a bare specifier by walking ancestor node_modules directories.
fn resolve_package(specifier: &str, base_dir: &Path) -> Option<PathBuf> {
    let mut dir = Some(base_dir);
    while let Some(current) = dir {
        let candidate = current.join("node_modules").join(specifier);
        if let Some(resolved) = resolve_path(&candidate) {
            return Some(resolved);
        }
        dir = current.parent();
    }
    None
}

fn read_manifest_main(dir: &Path) -> Option<String> {
    let content = fs::read_to_string(dir.join("package.json")).ok()?;
    let manifest: PackageManifest = serde_json::from_str(&content).ok()?;
    manifest.main
}

/// Append an extension without replacing an existing one ("./config.prod"
/// must try "config.prod.js", not "config.js").
fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut os: OsString = path.as_os_str().to_os_string();
    os.push(format!(".{ext}"));
    PathBuf::from(os)
}

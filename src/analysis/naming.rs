//! Path-based default export naming.
//!
//! When a module clearly has a default export but analysis could not find a
//! name for it (anonymous function, object literal, computed expression),
//! the file path itself is the best remaining hint.

use std::path::Path;

/// File stems too generic to serve as an export name; the parent directory
/// is a better hint for these.
const GENERIC_NAMES: &[&str] = &["dist", "bin", "lib", "src", "index"];

/// Derive a fallback default-export name from a module's file path.
///
/// Takes the file stem, climbs past generic segments (`widgets/index.js`
/// names itself after `widgets`, not `index`), and camel-cases the result
/// into an identifier-safe form.
pub fn guess_default_export_name(path: &Path) -> String {
    let mut name = stem_of(path);
    let mut dir = path.parent();
    while GENERIC_NAMES.contains(&name.as_str()) {
        let Some(current) = dir else {
            name.clear();
            break;
        };
        name = stem_of(current);
        dir = current.parent();
    }
    camel_case(&name)
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Convert an arbitrary name to identifier-safe camel case: alphanumeric
/// runs become segments, the first segment is lowercased at its head, later
/// segments are capitalized, and leading digits are dropped.
pub fn camel_case(input: &str) -> String {
    let mut out = String::new();
    let mut capitalize_next = false;
    for ch in input.chars() {
        if ch.is_alphanumeric() {
            if out.is_empty() {
                if ch.is_ascii_digit() {
                    continue;
                }
                out.extend(ch.to_lowercase());
            } else if capitalize_next {
                out.extend(ch.to_uppercase());
            } else {
                out.push(ch);
            }
            capitalize_next = false;
        } else {
            capitalize_next = !out.is_empty();
        }
    }
    out
}

//! Export surface analysis for JavaScript/TypeScript modules.
//!
//! This is the resolution engine: given a module's source text it infers the
//! module's named exports, whether a default export exists, and what that
//! default export is called, without executing anything. Both native ES
//! module syntax and the CommonJS `module.exports` mutation conventions are
//! recognized, including aliased exports objects, indirect assignment
//! through locally bound objects, conditional right-hand sides, wrapper
//! IIFEs and re-export-by-require.
//!
//! The engine is a permissive matcher, not a validator: statements that fit
//! no rule are silently skipped. Missed exports are an accepted trade-off;
//! false positives are avoided by requiring exact alias-set membership
//! before any CommonJS rule fires.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tree_sitter::{Node, Parser};

use super::helpers::{
    declaration_names, expression_in_set, expression_name, inner_expression, is_block_function,
    is_identifier_named, is_member_access, node_text, object_literal_keys, property_name,
    significant_children, skip_parens, string_value,
};
use super::naming::guess_default_export_name;
use crate::parser::SourceLanguage;
use crate::resolve;

/// Conventional named export some bundlers emit to flag transpiled ES
/// modules; never part of a module's real surface.
const INTEROP_MARKER: &str = "__esModule";

/// Errors that can occur during export analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse {path}{}", span_suffix(.span))]
    Parse {
        path: String,
        /// Line range of the first syntax error, when determinable.
        span: Option<(usize, usize)>,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("tree-sitter language initialization failed")]
    LanguageInit,
}

fn span_suffix(span: &Option<(usize, usize)>) -> String {
    match span {
        Some((start, end)) => format!(" (between lines {start} and {end})"),
        None => String::new(),
    }
}

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// The statically determined export surface of a single module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleExports {
    /// Named exports in source order. Duplicates are possible; only the
    /// interop marker is ever filtered out.
    pub named_exports: Vec<String>,
    /// Whether the module has a default export.
    pub has_default_export: bool,
    /// The default export's name. Only meaningful when `has_default_export`
    /// is set; may still be `None` when no name could be determined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_export_name: Option<String>,
}

/// What a top-level bound name would export if assigned as the module's
/// exports object.
#[derive(Debug, Clone)]
enum RootValue {
    /// Property names: from an object literal, or accumulated `name.prop = …`
    /// assignments.
    Names(Vec<String>),
    /// The canonical name of a function/class binding.
    Canonical(String),
}

/// Analyzer for extracting the export surface from source files.
///
/// Holds one configured parser per grammar so that many files can be
/// analyzed without re-initializing tree-sitter.
pub struct ExportAnalyzer {
    js_parser: Parser,
    ts_parser: Parser,
    tsx_parser: Parser,
}

impl ExportAnalyzer {
    /// Create a new ExportAnalyzer.
    pub fn new() -> AnalysisResult<Self> {
        let build = |language: SourceLanguage| {
            language.build_parser().ok_or(AnalysisError::LanguageInit)
        };
        Ok(Self {
            js_parser: build(SourceLanguage::JavaScript)?,
            ts_parser: build(SourceLanguage::TypeScript)?,
            tsx_parser: build(SourceLanguage::Tsx)?,
        })
    }

    /// Determine the export surface of a module from its source text.
    ///
    /// `path` picks the grammar by extension (unknown extensions fall back
    /// to JavaScript) and feeds the default-name heuristic. When `is_json`
    /// is set the source is treated as a structured-data document instead of
    /// code.
    pub fn find_exports(
        &mut self,
        source: &str,
        path: &Path,
        is_json: bool,
    ) -> AnalysisResult<ModuleExports> {
        let mut visited = HashSet::from([path.to_path_buf()]);
        self.analyze(source, path, is_json, &mut visited)
    }

    /// Read a file and determine its export surface. `.json` files take the
    /// structured-data fast path.
    pub fn analyze_file(&mut self, path: &Path) -> AnalysisResult<ModuleExports> {
        let source = fs::read_to_string(path)?;
        self.find_exports(&source, path, is_json_path(path))
    }

    fn analyze(
        &mut self,
        source: &str,
        path: &Path,
        is_json: bool,
        visited: &mut HashSet<PathBuf>,
    ) -> AnalysisResult<ModuleExports> {
        if is_json {
            return json_exports(source, path);
        }

        let language = SourceLanguage::from_path(path).unwrap_or(SourceLanguage::JavaScript);
        let tree = self
            .parser_for(language)
            .parse(source, None)
            .ok_or_else(|| AnalysisError::Parse {
                path: path.display().to_string(),
                span: None,
            })?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(AnalysisError::Parse {
                path: path.display().to_string(),
                span: error_span(root),
            });
        }

        let body = module_body(root);
        let aliases = module_exports_aliases(&body, source);
        let roots = root_object_identifiers(&body, source);

        let mut exports = ModuleExports::default();
        for statement in &body {
            collect_es_exports(*statement, source, &mut exports);
            self.collect_cjs_exports(
                *statement,
                source,
                path,
                &aliases,
                &roots,
                &mut exports,
                visited,
            );
        }

        if exports.has_default_export && exports.default_export_name.is_none() {
            exports.default_export_name = Some(guess_default_export_name(path));
        }
        exports.named_exports.retain(|name| name != INTEROP_MARKER);
        Ok(exports)
    }

    fn parser_for(&mut self, language: SourceLanguage) -> &mut Parser {
        match language {
            SourceLanguage::JavaScript | SourceLanguage::Jsx => &mut self.js_parser,
            SourceLanguage::TypeScript => &mut self.ts_parser,
            SourceLanguage::Tsx => &mut self.tsx_parser,
        }
    }

    /// Apply the CommonJS export rules to one top-level statement.
    #[allow(clippy::too_many_arguments)]
    fn collect_cjs_exports(
        &mut self,
        statement: Node,
        source: &str,
        path: &Path,
        aliases: &HashSet<String>,
        roots: &HashMap<String, RootValue>,
        exports: &mut ModuleExports,
        visited: &mut HashSet<PathBuf>,
    ) {
        match statement.kind() {
            "expression_statement" => {
                let Some(expression) = inner_expression(statement).map(skip_parens) else {
                    return;
                };
                match expression.kind() {
                    "call_expression" => {
                        collect_define_property(expression, source, aliases, exports);
                    }
                    "assignment_expression" => {
                        self.collect_cjs_assignment(
                            expression, source, path, aliases, roots, exports, visited,
                        );
                    }
                    _ => {}
                }
            }
            // const x = exports.foo = … also counts
            "lexical_declaration" | "variable_declaration" => {
                for declarator in significant_children(statement) {
                    if declarator.kind() != "variable_declarator" {
                        continue;
                    }
                    let Some(value) = declarator.child_by_field_name("value").map(skip_parens)
                    else {
                        continue;
                    };
                    if value.kind() == "assignment_expression" {
                        self.collect_cjs_assignment(
                            value, source, path, aliases, roots, exports, visited,
                        );
                    }
                }
            }
            _ => {}
        }
    }

    /// Handle `<lhs> = <rhs>` at the module's top level: direct assignment
    /// to an exports alias, property assignment on an alias, or neither.
    #[allow(clippy::too_many_arguments)]
    fn collect_cjs_assignment(
        &mut self,
        assignment: Node,
        source: &str,
        path: &Path,
        aliases: &HashSet<String>,
        roots: &HashMap<String, RootValue>,
        exports: &mut ModuleExports,
        visited: &mut HashSet<PathBuf>,
    ) {
        let Some(left) = assignment.child_by_field_name("left") else {
            return;
        };
        let Some(right) = assignment.child_by_field_name("right").map(skip_parens) else {
            return;
        };
        // a chained `exports.a = exports.b = …` exports both names
        if right.kind() == "assignment_expression" {
            self.collect_cjs_assignment(right, source, path, aliases, roots, exports, visited);
        }

        if expression_in_set(aliases, left, source) {
            let terminal = assignment_terminal(right);
            if let Some(specifier) = require_specifier(terminal, source) {
                // module.exports = require('./other'): adopt the other
                // module's surface wholesale; unresolvable targets and
                // cycles are skipped, keeping what was already collected
                if let Some(other) = self.resolve_and_analyze(&specifier, path, visited) {
                    exports.named_exports = other.named_exports;
                    if other.has_default_export {
                        exports.has_default_export = true;
                    }
                    if other.default_export_name.is_some() {
                        exports.default_export_name = other.default_export_name;
                    }
                }
                return;
            }
            match classify_terminal(terminal, source, roots) {
                Terminal::Names(names) => exports.named_exports = names,
                Terminal::Default(name) => {
                    exports.has_default_export = true;
                    if name.is_some() {
                        exports.default_export_name = name;
                    }
                }
            }
        } else {
            collect_alias_property_assignment(assignment, left, source, aliases, roots, exports);
        }
    }

    /// Resolve a require specifier and analyze the target file. `None` on
    /// any failure (unresolvable, unreadable, unparseable) or when the
    /// target is already on the in-progress require chain.
    fn resolve_and_analyze(
        &mut self,
        specifier: &str,
        importer: &Path,
        visited: &mut HashSet<PathBuf>,
    ) -> Option<ModuleExports> {
        let base_dir = importer.parent()?;
        let resolved = resolve::resolve_import(specifier, base_dir)?;
        if !visited.insert(resolved.clone()) {
            return None;
        }
        let result = fs::read_to_string(&resolved).ok().and_then(|source| {
            self.analyze(&source, &resolved, is_json_path(&resolved), visited)
                .ok()
        });
        visited.remove(&resolved);
        result
    }
}

impl Default for ExportAnalyzer {
    fn default() -> Self {
        Self::new().expect("failed to initialize ExportAnalyzer")
    }
}

/// Determine the export surface of a module from its source text.
///
/// One-shot convenience over [`ExportAnalyzer`]; prefer the analyzer when
/// processing many files.
pub fn find_exports(source: &str, path: &Path, is_json: bool) -> AnalysisResult<ModuleExports> {
    ExportAnalyzer::new()?.find_exports(source, path, is_json)
}

/// Read a single file and determine its export surface.
pub fn analyze_file(path: &Path) -> AnalysisResult<ModuleExports> {
    ExportAnalyzer::new()?.analyze_file(path)
}

fn is_json_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Structured-data fast path: the document's value is the default export and
/// its top-level keys (when it is an object) are the named exports.
fn json_exports(source: &str, path: &Path) -> AnalysisResult<ModuleExports> {
    let value: serde_json::Value =
        serde_json::from_str(source).map_err(|error| AnalysisError::Json {
            path: path.display().to_string(),
            source: error,
        })?;
    let named_exports = value
        .as_object()
        .map(|object| object.keys().cloned().collect())
        .unwrap_or_default();
    Ok(ModuleExports {
        named_exports,
        has_default_export: true,
        default_export_name: None,
    })
}

/// The top-level statements to analyze. A program that consists of exactly
/// one IIFE — `(function () { … })()`, `(function () { … }).call(this)` or
/// an arrow equivalent — is unwrapped to that function's body; this is the
/// common bundler wrapper. Exactly one level is unwrapped.
fn module_body(root: Node) -> Vec<Node> {
    let statements = top_level_statements(root);
    if statements.len() == 1 && statements[0].kind() == "expression_statement" {
        if let Some(body) = iife_body(statements[0]) {
            return top_level_statements(body);
        }
    }
    statements
}

fn top_level_statements(node: Node) -> Vec<Node> {
    significant_children(node)
        .into_iter()
        .filter(|child| child.kind() != "hash_bang_line")
        .collect()
}

fn iife_body<'t>(statement: Node<'t>) -> Option<Node<'t>> {
    let expression = skip_parens(inner_expression(statement)?);
    if expression.kind() != "call_expression" {
        return None;
    }
    let callee = skip_parens(expression.child_by_field_name("function")?);
    // (fn)() directly, or (fn).call(this) / (fn).apply(this)
    let target = if matches!(callee.kind(), "member_expression" | "subscript_expression") {
        skip_parens(callee.child_by_field_name("object")?)
    } else {
        callee
    };
    if !is_block_function(target) {
        return None;
    }
    target.child_by_field_name("body")
}

/// Find the local names that are synonyms for the module's exports object:
/// top-level `const x = module.exports` or `= exports` bindings. Nested
/// scopes and reassignment are deliberately not tracked.
fn module_exports_aliases(body: &[Node], source: &str) -> HashSet<String> {
    let mut aliases = HashSet::from(["module.exports".to_string(), "exports".to_string()]);
    for statement in body {
        if !matches!(
            statement.kind(),
            "lexical_declaration" | "variable_declaration"
        ) {
            continue;
        }
        for declarator in significant_children(*statement) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(name) = declarator.child_by_field_name("name") else {
                continue;
            };
            if name.kind() != "identifier" {
                continue;
            }
            let Some(value) = declarator.child_by_field_name("value").map(skip_parens) else {
                continue;
            };
            if is_member_access(value, source, "module", "exports")
                || is_identifier_named(value, source, "exports")
            {
                aliases.insert(node_text(name, source).to_string());
            }
        }
    }
    aliases
}

/// Record, for each top-level bound name, what it would export if assigned
/// as the module's exports object. Used to resolve the indirect
/// `const api = { … }; module.exports = api;` pattern.
fn root_object_identifiers(body: &[Node], source: &str) -> HashMap<String, RootValue> {
    let mut roots = HashMap::new();
    for statement in body {
        match statement.kind() {
            // api.prop = … accumulates property names
            "expression_statement" => {
                let Some(expression) = inner_expression(*statement).map(skip_parens) else {
                    continue;
                };
                if expression.kind() != "assignment_expression" {
                    continue;
                }
                if let Some(left) = expression.child_by_field_name("left") {
                    record_property_assignment(left, source, &mut roots);
                }
            }
            "lexical_declaration" | "variable_declaration" => {
                for declarator in significant_children(*statement) {
                    if declarator.kind() != "variable_declarator" {
                        continue;
                    }
                    let Some(name) = declarator.child_by_field_name("name") else {
                        continue;
                    };
                    if name.kind() != "identifier" {
                        continue;
                    }
                    let Some(value) = declarator.child_by_field_name("value").map(skip_parens)
                    else {
                        continue;
                    };
                    let bound = node_text(name, source).to_string();
                    match value.kind() {
                        "object" => {
                            roots.insert(bound, RootValue::Names(object_literal_keys(value, source)));
                        }
                        "function_expression" | "function" | "generator_function" | "class" => {
                            let canonical = value
                                .child_by_field_name("name")
                                .map(|id| node_text(id, source).to_string())
                                .filter(|id| !id.is_empty())
                                .unwrap_or_else(|| bound.clone());
                            roots.insert(bound, RootValue::Canonical(canonical));
                        }
                        _ => {}
                    }
                }
            }
            "function_declaration"
            | "generator_function_declaration"
            | "class_declaration"
            | "abstract_class_declaration" => {
                if let Some(name) = statement.child_by_field_name("name") {
                    let name = node_text(name, source).to_string();
                    roots.insert(name.clone(), RootValue::Canonical(name));
                }
            }
            _ => {}
        }
    }
    roots
}

/// For `name.a.b = …`, append the property directly under `name` ("a") to
/// `name`'s accumulated list. Canonical entries are never mutated.
fn record_property_assignment(left: Node, source: &str, roots: &mut HashMap<String, RootValue>) {
    if !matches!(left.kind(), "member_expression" | "subscript_expression") {
        return;
    }
    let mut object = left;
    let mut property = None;
    while matches!(object.kind(), "member_expression" | "subscript_expression") {
        property = property_name(object, source);
        let Some(next) = object.child_by_field_name("object") else {
            return;
        };
        object = next;
    }
    if object.kind() != "identifier" {
        return;
    }
    let Some(property) = property else {
        return;
    };
    match roots.entry(node_text(object, source).to_string()) {
        Entry::Occupied(mut entry) => {
            if let RootValue::Names(names) = entry.get_mut() {
                names.push(property);
            }
        }
        Entry::Vacant(entry) => {
            entry.insert(RootValue::Names(vec![property]));
        }
    }
}

/// Apply the native ES module export rules to one top-level statement.
fn collect_es_exports(statement: Node, source: &str, exports: &mut ModuleExports) {
    if statement.kind() != "export_statement" {
        return;
    }

    // export { a, b as c } — with or without a `from` source
    for child in significant_children(statement) {
        if child.kind() != "export_clause" {
            continue;
        }
        for specifier in significant_children(child) {
            if specifier.kind() == "export_specifier" {
                collect_export_specifier(specifier, source, exports);
            }
        }
    }

    let declaration = statement
        .child_by_field_name("declaration")
        .or_else(|| statement.child_by_field_name("value"));
    if has_default_keyword(statement) {
        exports.has_default_export = true;
        if let Some(declared) = declaration.map(skip_parens) {
            if let Some(name) = expression_name(declared, source) {
                exports.default_export_name = Some(name);
            }
        }
    } else if let Some(declared) = declaration {
        exports
            .named_exports
            .extend(declaration_names(declared, source));
    }
}

fn has_default_keyword(statement: Node) -> bool {
    let mut cursor = statement.walk();
    let has_default = statement
        .children(&mut cursor)
        .any(|child| child.kind() == "default");
    has_default
}

fn collect_export_specifier(specifier: Node, source: &str, exports: &mut ModuleExports) {
    let Some(name) = specifier.child_by_field_name("name") else {
        return;
    };
    let local = export_name_text(name, source);
    let exported = specifier
        .child_by_field_name("alias")
        .map(|alias| export_name_text(alias, source))
        .unwrap_or_else(|| local.clone());
    if exported == "default" {
        // export { foo as default }
        exports.has_default_export = true;
        exports.default_export_name = Some(local);
    } else {
        exports.named_exports.push(exported);
    }
}

fn export_name_text(node: Node, source: &str) -> String {
    string_value(node, source).unwrap_or_else(|| node_text(node, source).to_string())
}

/// `Object.defineProperty(exports, 'name', …)` / `Reflect.defineProperty`
/// with a literal name and an aliased exports object as the target.
fn collect_define_property(
    call: Node,
    source: &str,
    aliases: &HashSet<String>,
    exports: &mut ModuleExports,
) {
    let Some(callee) = call.child_by_field_name("function").map(skip_parens) else {
        return;
    };
    if !is_member_access(callee, source, "Object", "defineProperty")
        && !is_member_access(callee, source, "Reflect", "defineProperty")
    {
        return;
    }
    let Some(arguments) = call.child_by_field_name("arguments") else {
        return;
    };
    let arguments = significant_children(arguments);
    if arguments.len() < 2 {
        return;
    }
    if !expression_in_set(aliases, skip_parens(arguments[0]), source) {
        return;
    }
    if let Some(name) = string_value(arguments[1], source) {
        exports.named_exports.push(name);
    }
}

/// Descend a right-hand side to the expression that actually determines the
/// export: through chained assignments to the innermost value, and through
/// ternaries always along the consequence branch (an intentional
/// simplification, not symbolic evaluation).
fn assignment_terminal(node: Node) -> Node {
    let mut node = node;
    loop {
        node = skip_parens(node);
        let next = match node.kind() {
            "assignment_expression" => node.child_by_field_name("right"),
            "ternary_expression" => node.child_by_field_name("consequence"),
            _ => None,
        };
        match next {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

/// `require('<specifier>')` with a literal first argument.
fn require_specifier(node: Node, source: &str) -> Option<String> {
    if node.kind() != "call_expression" {
        return None;
    }
    let callee = skip_parens(node.child_by_field_name("function")?);
    if !is_identifier_named(callee, source, "require") {
        return None;
    }
    let arguments = significant_children(node.child_by_field_name("arguments")?);
    string_value(*arguments.first()?, source)
}

/// What a terminal right-hand side contributes when assigned to an exports
/// alias.
enum Terminal {
    /// A list of names replaces the named-export list wholesale.
    Names(Vec<String>),
    /// A default export, possibly with a determinate name.
    Default(Option<String>),
}

fn classify_terminal(
    terminal: Node,
    source: &str,
    roots: &HashMap<String, RootValue>,
) -> Terminal {
    if terminal.kind() == "identifier" {
        // module.exports = api, where api was bound earlier at top level
        if let Some(entry) = roots.get(node_text(terminal, source)) {
            return match entry {
                RootValue::Names(names) => Terminal::Names(names.clone()),
                RootValue::Canonical(name) => Terminal::Default(Some(name.clone())),
            };
        }
    }
    if terminal.kind() == "object" {
        return Terminal::Names(object_literal_keys(terminal, source));
    }
    Terminal::Default(expression_name(terminal, source))
}

/// `exports.name = …` and nested `module.exports.outer.inner = …` forms:
/// the export name is the property directly under the alias.
fn collect_alias_property_assignment(
    assignment: Node,
    left: Node,
    source: &str,
    aliases: &HashSet<String>,
    roots: &HashMap<String, RootValue>,
    exports: &mut ModuleExports,
) {
    let mut object = left;
    let mut property: Option<String> = None;
    let mut parent_property: Option<String> = None;
    while matches!(object.kind(), "member_expression" | "subscript_expression") {
        parent_property = property.take();
        property = property_name(object, source);
        let Some(next) = object.child_by_field_name("object") else {
            return;
        };
        object = next;
    }
    if object.kind() != "identifier" {
        return;
    }
    let object_name = node_text(object, source);
    let Some(property) = property else {
        return;
    };

    // module.exports.foo → the chain bottoms out at module.exports with
    // "foo" one level up; exports.foo → at the bare alias itself
    let export_name = if parent_property.is_some()
        && aliases.contains(&format!("{object_name}.{property}"))
    {
        parent_property
    } else if aliases.contains(object_name) {
        Some(property)
    } else {
        None
    };
    let Some(export_name) = export_name else {
        return;
    };

    if export_name == "default" {
        exports.has_default_export = true;
        let Some(right) = assignment.child_by_field_name("right").map(skip_parens) else {
            return;
        };
        if right.kind() == "identifier" {
            let right_name = node_text(right, source);
            let canonical = match roots.get(right_name) {
                Some(RootValue::Canonical(name)) => name.clone(),
                _ => right_name.to_string(),
            };
            exports.default_export_name = Some(canonical);
        }
    } else {
        exports.named_exports.push(export_name);
    }
}

fn error_span(root: Node) -> Option<(usize, usize)> {
    find_error_node(root).map(|node| (node.start_position().row + 1, node.end_position().row + 1))
}

fn find_error_node<'t>(node: Node<'t>) -> Option<Node<'t>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    for child in children {
        if let Some(found) = find_error_node(child) {
            return Some(found);
        }
    }
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn find(source: &str) -> ModuleExports {
        let mut analyzer = ExportAnalyzer::new().unwrap();
        analyzer
            .find_exports(source, Path::new("/virtual/test.js"), false)
            .unwrap()
    }

    fn find_at(source: &str, path: &str) -> ModuleExports {
        let mut analyzer = ExportAnalyzer::new().unwrap();
        analyzer
            .find_exports(source, Path::new(path), false)
            .unwrap()
    }

    fn write_file(path: &Path, content: &str) {
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    // ===== Native export forms =====

    #[test]
    fn test_export_default_class() {
        let exports = find("export default class Foo {}");
        assert!(exports.has_default_export);
        assert_eq!(exports.default_export_name.as_deref(), Some("Foo"));
        assert!(exports.named_exports.is_empty());
    }

    #[test]
    fn test_export_default_named_function() {
        let exports = find("export default function start() {}");
        assert!(exports.has_default_export);
        assert_eq!(exports.default_export_name.as_deref(), Some("start"));
    }

    #[test]
    fn test_export_default_anonymous_function_uses_heuristic() {
        let exports = find("export default function () {}");
        assert!(exports.has_default_export);
        assert_eq!(exports.default_export_name.as_deref(), Some("test"));
    }

    #[test]
    fn test_export_default_identifier() {
        let exports = find("const app = 1;\nexport default app;");
        assert!(exports.has_default_export);
        assert_eq!(exports.default_export_name.as_deref(), Some("app"));
    }

    #[test]
    fn test_export_default_object_literal_uses_heuristic() {
        let exports = find_at(
            "export default { a: 1 };",
            "/project/widgets/index.js",
        );
        assert!(exports.has_default_export);
        assert_eq!(exports.default_export_name.as_deref(), Some("widgets"));
    }

    #[test]
    fn test_export_named_specifiers() {
        let exports = find("const a = 1, b = 2;\nexport { a, b as c };");
        assert_eq!(exports.named_exports, vec!["a", "c"]);
        assert!(!exports.has_default_export);
    }

    #[test]
    fn test_export_specifier_as_default() {
        let exports = find("const foo = 1;\nexport { foo as default };");
        assert!(exports.has_default_export);
        assert_eq!(exports.default_export_name.as_deref(), Some("foo"));
        assert!(exports.named_exports.is_empty());
    }

    #[test]
    fn test_export_declaration_forms() {
        let exports = find(
            "export const x = 1;\nexport function helper() {}\nexport class Widget {}",
        );
        assert_eq!(exports.named_exports, vec!["x", "helper", "Widget"]);
        assert!(!exports.has_default_export);
    }

    #[test]
    fn test_export_destructured_declaration() {
        let exports = find("export const { a, b: c } = settings;");
        assert_eq!(exports.named_exports, vec!["a", "c"]);
    }

    #[test]
    fn test_export_star_contributes_nothing() {
        let exports = find("export * from './other';");
        assert!(exports.named_exports.is_empty());
        assert!(!exports.has_default_export);
    }

    // ===== CommonJS export forms =====

    #[test]
    fn test_property_assignments() {
        let exports = find("exports.foo = 1;\nexports.bar = 2;");
        assert_eq!(exports.named_exports, vec!["foo", "bar"]);
        assert!(!exports.has_default_export);
    }

    #[test]
    fn test_duplicate_names_are_kept() {
        let exports = find("exports.a = 1;\nexports.a = 2;");
        assert_eq!(exports.named_exports, vec!["a", "a"]);
    }

    #[test]
    fn test_direct_object_literal() {
        let exports = find("module.exports = { a: 1, b() {}, ...rest };");
        assert_eq!(exports.named_exports, vec!["a", "b"]);
        assert!(!exports.has_default_export);
    }

    #[test]
    fn test_indirect_object_resolution() {
        let exports = find("const api = { a, b, c };\nmodule.exports = api;");
        assert_eq!(exports.named_exports, vec!["a", "b", "c"]);
        assert!(!exports.has_default_export);
    }

    #[test]
    fn test_accumulated_property_assignments() {
        let exports = find(
            "const api = {};\napi.first = 1;\napi.second = 2;\nmodule.exports = api;",
        );
        assert_eq!(exports.named_exports, vec!["first", "second"]);
    }

    #[test]
    fn test_default_anonymous_function_uses_heuristic() {
        let exports = find_at(
            "module.exports = function () {};",
            "/project/widgets/index.js",
        );
        assert!(exports.has_default_export);
        assert_eq!(exports.default_export_name.as_deref(), Some("widgets"));
    }

    #[test]
    fn test_default_named_function() {
        let exports = find("module.exports = function Widget() {};");
        assert!(exports.has_default_export);
        assert_eq!(exports.default_export_name.as_deref(), Some("Widget"));
    }

    #[test]
    fn test_canonical_name_through_binding() {
        let exports = find("const W = function Widget() {};\nmodule.exports = W;");
        assert!(exports.has_default_export);
        assert_eq!(exports.default_export_name.as_deref(), Some("Widget"));
    }

    #[test]
    fn test_class_declaration_indirect() {
        let exports = find("class Widget {}\nmodule.exports = Widget;");
        assert!(exports.has_default_export);
        assert_eq!(exports.default_export_name.as_deref(), Some("Widget"));
    }

    #[test]
    fn test_alias_binding() {
        let exports = find("const self = module.exports;\nself.thing = 1;");
        assert_eq!(exports.named_exports, vec!["thing"]);
    }

    #[test]
    fn test_exports_alias_binding() {
        let exports = find("var out = exports;\nout.item = 1;");
        assert_eq!(exports.named_exports, vec!["item"]);
    }

    #[test]
    fn test_subscript_alias_assignment() {
        let exports = find("module['exports'] = settings;");
        assert!(exports.has_default_export);
        assert_eq!(exports.default_export_name.as_deref(), Some("settings"));
    }

    #[test]
    fn test_subscript_property_name() {
        let exports = find("exports['dash-name'] = 1;");
        assert_eq!(exports.named_exports, vec!["dash-name"]);
    }

    #[test]
    fn test_nested_property_chain_exports_outer() {
        let exports = find("module.exports.outer.inner = 1;");
        assert_eq!(exports.named_exports, vec!["outer"]);
    }

    #[test]
    fn test_assignment_in_declarator() {
        let exports = find("const x = exports.foo = 1;");
        assert_eq!(exports.named_exports, vec!["foo"]);
    }

    #[test]
    fn test_chained_assignment_resolves_innermost() {
        let exports = find("module.exports = exports = { a: 1 };");
        assert_eq!(exports.named_exports, vec!["a"]);
        assert!(!exports.has_default_export);
    }

    #[test]
    fn test_ternary_resolves_consequence_branch() {
        let exports = find("module.exports = flag ? primary : fallback;");
        assert!(exports.has_default_export);
        assert_eq!(exports.default_export_name.as_deref(), Some("primary"));
    }

    #[test]
    fn test_define_property() {
        let exports = find("Object.defineProperty(exports, 'version', { value: '1.0' });");
        assert_eq!(exports.named_exports, vec!["version"]);
    }

    #[test]
    fn test_define_property_reflect_on_alias() {
        let exports = find("Reflect.defineProperty(module.exports, 'thing', {});");
        assert_eq!(exports.named_exports, vec!["thing"]);
    }

    #[test]
    fn test_define_property_unrelated_target_ignored() {
        let exports = find("Object.defineProperty(window, 'thing', {});");
        assert!(exports.named_exports.is_empty());
    }

    #[test]
    fn test_default_property_takes_canonical_name() {
        let exports = find("function Widget() {}\nexports.default = Widget;");
        assert!(exports.has_default_export);
        assert_eq!(exports.default_export_name.as_deref(), Some("Widget"));
    }

    #[test]
    fn test_default_property_plain_identifier() {
        let exports = find("exports.default = settings;");
        assert!(exports.has_default_export);
        assert_eq!(exports.default_export_name.as_deref(), Some("settings"));
    }

    // ===== Interop marker =====

    #[test]
    fn test_interop_marker_never_survives() {
        let exports = find(
            "Object.defineProperty(exports, '__esModule', { value: true });\n\
             exports.__esModule = true;\n\
             exports.real = 1;",
        );
        assert_eq!(exports.named_exports, vec!["real"]);
    }

    // ===== Wrapper IIFEs =====

    #[test]
    fn test_iife_unwrapping() {
        let exports = find("(function () {\n  module.exports = function Widget() {};\n})();");
        assert!(exports.has_default_export);
        assert_eq!(exports.default_export_name.as_deref(), Some("Widget"));
    }

    #[test]
    fn test_iife_call_form() {
        let exports = find("(function () {\n  exports.a = 1;\n}).call(this);");
        assert_eq!(exports.named_exports, vec!["a"]);
    }

    #[test]
    fn test_arrow_iife() {
        let exports = find("(() => {\n  exports.a = 1;\n})();");
        assert_eq!(exports.named_exports, vec!["a"]);
    }

    #[test]
    fn test_nested_wrapper_not_unwrapped() {
        let exports = find("(function () {\n  (function () {\n    exports.a = 1;\n  })();\n})();");
        assert!(exports.named_exports.is_empty());
    }

    // ===== JSON fast path =====

    #[test]
    fn test_json_fast_path() {
        let mut analyzer = ExportAnalyzer::new().unwrap();
        let exports = analyzer
            .find_exports(r#"{"a": 1, "b": 2}"#, Path::new("/virtual/data.json"), true)
            .unwrap();
        assert_eq!(exports.named_exports, vec!["a", "b"]);
        assert!(exports.has_default_export);
        assert_eq!(exports.default_export_name, None);
    }

    #[test]
    fn test_json_non_object_top_level() {
        let mut analyzer = ExportAnalyzer::new().unwrap();
        let exports = analyzer
            .find_exports("[1, 2, 3]", Path::new("/virtual/data.json"), true)
            .unwrap();
        assert!(exports.named_exports.is_empty());
        assert!(exports.has_default_export);
    }

    #[test]
    fn test_json_invalid() {
        let mut analyzer = ExportAnalyzer::new().unwrap();
        let result = analyzer.find_exports("{ broken", Path::new("/virtual/data.json"), true);
        assert!(matches!(result, Err(AnalysisError::Json { .. })));
    }

    // ===== Re-export by require =====

    #[test]
    fn test_reexport_adopts_target_surface() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            &dir.path().join("other.js"),
            "export const x = 1;\nexport default class Y {}",
        );
        write_file(
            &dir.path().join("main.js"),
            "module.exports = require('./other');",
        );

        let mut analyzer = ExportAnalyzer::new().unwrap();
        let exports = analyzer.analyze_file(&dir.path().join("main.js")).unwrap();
        assert_eq!(exports.named_exports, vec!["x"]);
        assert!(exports.has_default_export);
        assert_eq!(exports.default_export_name.as_deref(), Some("Y"));
    }

    #[test]
    fn test_reexport_json_target() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("config.json"), r#"{"port": 80}"#);
        write_file(
            &dir.path().join("main.js"),
            "module.exports = require('./config.json');",
        );

        let mut analyzer = ExportAnalyzer::new().unwrap();
        let exports = analyzer.analyze_file(&dir.path().join("main.js")).unwrap();
        assert_eq!(exports.named_exports, vec!["port"]);
        assert!(exports.has_default_export);
        // the target had no name of its own, so the importer's path names it
        assert_eq!(exports.default_export_name.as_deref(), Some("main"));
    }

    #[test]
    fn test_reexport_failure_is_lenient() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            &dir.path().join("main.js"),
            "exports.kept = 1;\nmodule.exports = require('./missing');",
        );

        let mut analyzer = ExportAnalyzer::new().unwrap();
        let exports = analyzer.analyze_file(&dir.path().join("main.js")).unwrap();
        assert_eq!(exports.named_exports, vec!["kept"]);
        assert!(!exports.has_default_export);
    }

    #[test]
    fn test_require_cycle_terminates() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("a.js"), "module.exports = require('./b');");
        write_file(&dir.path().join("b.js"), "module.exports = require('./a');");

        let mut analyzer = ExportAnalyzer::new().unwrap();
        let exports = analyzer.analyze_file(&dir.path().join("a.js")).unwrap();
        assert!(exports.named_exports.is_empty());
        assert!(!exports.has_default_export);
    }

    // ===== Errors =====

    #[test]
    fn test_parse_error_carries_path() {
        let mut analyzer = ExportAnalyzer::new().unwrap();
        let result = analyzer.find_exports("const = ;", Path::new("/virtual/broken.js"), false);
        let error = result.unwrap_err();
        assert!(matches!(error, AnalysisError::Parse { .. }));
        assert!(error.to_string().contains("broken.js"));
    }

    #[test]
    fn test_missing_file() {
        let mut analyzer = ExportAnalyzer::new().unwrap();
        let result = analyzer.analyze_file(Path::new("/virtual/does-not-exist.js"));
        assert!(matches!(result, Err(AnalysisError::FileRead(_))));
    }

    // ===== General properties =====

    #[test]
    fn test_typescript_source() {
        let mut analyzer = ExportAnalyzer::new().unwrap();
        let exports = analyzer
            .find_exports(
                "export const x: number = 1;\nexport default class Foo {}",
                Path::new("/virtual/test.ts"),
                false,
            )
            .unwrap();
        assert_eq!(exports.named_exports, vec!["x"]);
        assert!(exports.has_default_export);
        assert_eq!(exports.default_export_name.as_deref(), Some("Foo"));
    }

    #[test]
    fn test_idempotence() {
        let source = "exports.a = 1;\nmodule.exports = function Widget() {};";
        let first = find(source);
        let second = find(source);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unrecognized_statements_are_skipped() {
        let exports = find(
            "if (x) { exports; }\nfor (;;) break;\nlabel: while (0) {}\nexports.ok = 1;",
        );
        assert_eq!(exports.named_exports, vec!["ok"]);
    }

    #[test]
    fn test_serialization_shape() {
        let exports = find("export default class Foo {}");
        let json = serde_json::to_value(&exports).unwrap();
        assert_eq!(json["hasDefaultExport"], true);
        assert_eq!(json["defaultExportName"], "Foo");
        assert_eq!(json["namedExports"], serde_json::json!([]));
    }
}

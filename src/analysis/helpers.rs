//! Tree-shape helpers for export analysis.
//!
//! Small, pure predicates and classifiers over tree-sitter nodes: member
//! access matching, object literal keys, binding pattern names, and the
//! single-name classification used for default exports. No I/O, no state.

use std::collections::HashSet;

use tree_sitter::Node;

/// Extract the text content of a node.
pub fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    source.get(node.start_byte()..node.end_byte()).unwrap_or("")
}

/// Extract a string literal's value (removes quotes). `None` for non-strings.
pub fn string_value(node: Node, source: &str) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }
    let text = node_text(node, source);
    let trimmed = text
        .trim_start_matches(['"', '\'', '`'])
        .trim_end_matches(['"', '\'', '`']);
    Some(trimmed.to_string())
}

/// The named children of a node, with comments dropped.
pub fn significant_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// The expression wrapped by an expression statement (or any single-child
/// wrapper node), ignoring comments.
pub fn inner_expression(node: Node) -> Option<Node> {
    significant_children(node).into_iter().next()
}

/// Strip any number of surrounding parentheses from an expression.
pub fn skip_parens(node: Node) -> Node {
    let mut node = node;
    while node.kind() == "parenthesized_expression" {
        match inner_expression(node) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

/// True if the expression is a plain identifier with the given name.
pub fn is_identifier_named(node: Node, source: &str, name: &str) -> bool {
    node.kind() == "identifier" && node_text(node, source) == name
}

/// The property name of a one-step member access: `property` for
/// `obj.property`, the string value for `obj['property']`.
pub fn property_name(node: Node, source: &str) -> Option<String> {
    match node.kind() {
        "member_expression" => {
            let property = node.child_by_field_name("property")?;
            Some(node_text(property, source).to_string())
        }
        "subscript_expression" => {
            let index = node.child_by_field_name("index")?;
            string_value(index, source)
        }
        _ => None,
    }
}

/// True if the expression is `objectName.propName` or `objectName['propName']`.
pub fn is_member_access(node: Node, source: &str, object_name: &str, prop_name: &str) -> bool {
    if !matches!(node.kind(), "member_expression" | "subscript_expression") {
        return false;
    }
    let Some(object) = node.child_by_field_name("object") else {
        return false;
    };
    is_identifier_named(object, source, object_name)
        && property_name(node, source).as_deref() == Some(prop_name)
}

/// Render an identifier or one-step member access as a dotted path
/// (`exports`, `module.exports`). `None` for anything deeper or computed.
pub fn access_path(node: Node, source: &str) -> Option<String> {
    match node.kind() {
        "identifier" => Some(node_text(node, source).to_string()),
        "member_expression" | "subscript_expression" => {
            let object = node.child_by_field_name("object")?;
            if object.kind() != "identifier" {
                return None;
            }
            let property = property_name(node, source)?;
            Some(format!("{}.{}", node_text(object, source), property))
        }
        _ => None,
    }
}

/// True if the expression's dotted path is a member of the given set.
pub fn expression_in_set(set: &HashSet<String>, node: Node, source: &str) -> bool {
    access_path(node, source).is_some_and(|path| set.contains(&path))
}

/// True for function/class expressions and arrow functions whose body is a
/// statement block (an arrow with an expression body has no statements to
/// scan).
pub fn is_block_function(node: Node) -> bool {
    match node.kind() {
        "function_expression" | "function" | "generator_function" => true,
        "arrow_function" => node
            .child_by_field_name("body")
            .is_some_and(|body| body.kind() == "statement_block"),
        _ => false,
    }
}

/// The own, non-computed property and method keys of an object literal, in
/// source order. Spread properties and computed keys contribute nothing.
pub fn object_literal_keys(node: Node, source: &str) -> Vec<String> {
    let mut keys = Vec::new();
    for child in significant_children(node) {
        match child.kind() {
            "pair" => {
                if let Some(key) = child.child_by_field_name("key") {
                    if let Some(name) = property_key_name(key, source) {
                        keys.push(name);
                    }
                }
            }
            "shorthand_property_identifier" => {
                keys.push(node_text(child, source).to_string());
            }
            "method_definition" => {
                if let Some(name) = child.child_by_field_name("name") {
                    if let Some(name) = property_key_name(name, source) {
                        keys.push(name);
                    }
                }
            }
            _ => {}
        }
    }
    keys
}

fn property_key_name(key: Node, source: &str) -> Option<String> {
    match key.kind() {
        "property_identifier" | "number" => Some(node_text(key, source).to_string()),
        "string" => string_value(key, source),
        // computed_property_name and private names contribute nothing
        _ => None,
    }
}

/// The identifiers bound by a declarator pattern. Plain identifiers bind
/// themselves; array/object destructuring patterns are unwrapped recursively,
/// skipping rest markers and default-value wrappers.
pub fn pattern_names(node: Node, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    collect_pattern_names(node, source, &mut names);
    names
}

fn collect_pattern_names(node: Node, source: &str, names: &mut Vec<String>) {
    match node.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => {
            names.push(node_text(node, source).to_string());
        }
        "object_pattern" | "array_pattern" => {
            for child in significant_children(node) {
                collect_pattern_names(child, source, names);
            }
        }
        "pair_pattern" => {
            if let Some(value) = node.child_by_field_name("value") {
                collect_pattern_names(value, source, names);
            }
        }
        "assignment_pattern" | "object_assignment_pattern" => {
            if let Some(left) = node.child_by_field_name("left") {
                collect_pattern_names(left, source, names);
            }
        }
        // rest_pattern and anything unrecognized bind nothing we report
        _ => {}
    }
}

/// The names contributed by a declaration node: a function/class declaration
/// contributes its identifier, a variable declaration the bound names of
/// every declarator pattern.
pub fn declaration_names(node: Node, source: &str) -> Vec<String> {
    match node.kind() {
        "function_declaration"
        | "generator_function_declaration"
        | "class_declaration"
        | "abstract_class_declaration" => node
            .child_by_field_name("name")
            .map(|name| vec![node_text(name, source).to_string()])
            .unwrap_or_default(),
        "lexical_declaration" | "variable_declaration" => {
            let mut names = Vec::new();
            for declarator in significant_children(node) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                if let Some(pattern) = declarator.child_by_field_name("name") {
                    names.extend(pattern_names(pattern, source));
                }
            }
            names
        }
        _ => Vec::new(),
    }
}

/// The single name an expression carries, if any: an identifier names itself,
/// a named function/class expression its own identifier, a member access its
/// final property. Anonymous functions, object literals and everything else
/// have no determinate single name.
pub fn expression_name(node: Node, source: &str) -> Option<String> {
    let name = match node.kind() {
        "identifier" => Some(node_text(node, source).to_string()),
        "function_expression" | "function" | "generator_function" | "class" => node
            .child_by_field_name("name")
            .map(|name| node_text(name, source).to_string()),
        "function_declaration" | "generator_function_declaration" | "class_declaration"
        | "abstract_class_declaration" => node
            .child_by_field_name("name")
            .map(|name| node_text(name, source).to_string()),
        "member_expression" => node
            .child_by_field_name("property")
            .map(|property| node_text(property, source).to_string()),
        _ => None,
    };
    name.filter(|name| !name.is_empty())
}

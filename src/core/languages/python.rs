use std::borrow::Cow;

use tree_sitter::Node;

pub const MODULE: &str = "module";
pub const CLASS_DEFINITION: &str = "class_definition";
pub const FUNCTION_DEFINITION: &str = "function_definition";
pub const DECORATED_DEFINITION: &str = "decorated_definition";
pub const EXPRESSION_STATEMENT: &str = "expression_statement";
pub const STRING: &str = "string";
pub const CONCATENATED_STRING: &str = "concatenated_string";
pub const COMMENT: &str = "comment";

/// Marker that starts a single-line comment
pub const COMMENT_MARKER: char = '#';

/// Source with every `\r\n` and lone `\r` turned into `\n`.
///
/// Python accepts all three line endings, while tree-sitter only advances
/// its row count on `\n`.
pub fn normalize_newlines(source: &str) -> Cow<'_, str> {
    if !source.contains('\r') {
        return Cow::Borrowed(source);
    }
    Cow::Owned(source.replace("\r\n", "\n").replace('\r', "\n"))
}

/// The class or function a statement defines, looking through decorators
pub fn definition<'t>(statement: Node<'t>) -> Option<Node<'t>> {
    match statement.kind() {
        CLASS_DEFINITION | FUNCTION_DEFINITION => Some(statement),
        DECORATED_DEFINITION => statement.child_by_field_name("definition"),
        _ => None,
    }
}

/// Decorator names of a decorated definition, without `@` or call arguments
pub fn decorator_names(statement: Node, source: &str) -> Vec<String> {
    if statement.kind() != DECORATED_DEFINITION {
        return Vec::new();
    }

    let mut decorators = Vec::new();
    let mut cursor = statement.walk();
    for child in statement.children(&mut cursor) {
        if child.kind() == "decorator" {
            let text = node_text(child, source).trim().trim_start_matches('@').trim();
            let name = match text.find('(') {
                Some(paren_idx) => &text[..paren_idx],
                None => text,
            };
            decorators.push(name.trim().to_string());
        }
    }
    decorators
}

/// Statement nodes of a module or a definition's body, comments skipped
pub fn statements<'t>(container: Node<'t>) -> Vec<Node<'t>> {
    let body = if container.kind() == MODULE {
        Some(container)
    } else {
        container.child_by_field_name("body")
    };

    let Some(body) = body else {
        return Vec::new();
    };

    let mut cursor = body.walk();
    body.named_children(&mut cursor)
        .filter(|child| child.kind() != COMMENT)
        .collect()
}

/// Definitions that live in the scope of a module or class body.
///
/// Compound statements such as `if`, `try` and `with` do not open a new
/// scope, so definitions under them are included; bodies of the returned
/// definitions are not searched. Items are the outer statements, so
/// decorated definitions keep their decorators.
pub fn scope_definitions<'t>(container: Node<'t>) -> Vec<Node<'t>> {
    let mut found = Vec::new();
    let mut pending: Vec<Node<'t>> = statements(container);
    pending.reverse();

    while let Some(node) = pending.pop() {
        if definition(node).is_some() {
            found.push(node);
            continue;
        }

        let mut cursor = node.walk();
        let children: Vec<Node<'t>> = node.named_children(&mut cursor).collect();
        pending.extend(children.into_iter().rev());
    }
    found
}

/// The string literal in documentation position of a module, class or
/// function, if its first statement is a bare text string.
pub fn documentation_node<'t>(container: Node<'t>, source: &str) -> Option<Node<'t>> {
    let first = statements(container).into_iter().next()?;
    let literal = bare_string(first)?;
    literal_value(literal, source).map(|_| literal)
}

/// Verbatim documentation of a module, class or function.
///
/// Blank documentation strings count as absent.
pub fn docstring(container: Node, source: &str) -> Option<String> {
    let literal = documentation_node(container, source)?;
    literal_value(literal, source).filter(|value| !value.trim().is_empty())
}

/// The string literal of an expression statement that consists of nothing else
pub fn bare_string<'t>(statement: Node<'t>) -> Option<Node<'t>> {
    if statement.kind() != EXPRESSION_STATEMENT || statement.named_child_count() != 1 {
        return None;
    }
    let expr = statement.named_child(0)?;
    matches!(expr.kind(), STRING | CONCATENATED_STRING).then_some(expr)
}

/// Content of a text string literal node, `None` for f-strings and bytes.
pub fn literal_value(literal: Node, source: &str) -> Option<String> {
    match literal.kind() {
        STRING => string_content(node_text(literal, source)).map(str::to_string),
        CONCATENATED_STRING => {
            let mut value = String::new();
            let mut cursor = literal.walk();
            for part in literal.named_children(&mut cursor) {
                if part.kind() == STRING {
                    value.push_str(string_content(node_text(part, source))?);
                }
            }
            Some(value)
        }
        _ => None,
    }
}

/// Whether a string literal uses triple quotation delimiters
pub fn is_triple_quoted(literal_text: &str) -> bool {
    let (_, quoted) = split_prefix(literal_text);
    quoted.starts_with("\"\"\"") || quoted.starts_with("'''")
}

/// Text between the quotes of a single string literal token.
///
/// Returns `None` for formatted or bytes literals, which never act as
/// documentation.
pub fn string_content(literal_text: &str) -> Option<&str> {
    let (prefix, quoted) = split_prefix(literal_text);
    if prefix.chars().any(|c| matches!(c, 'f' | 'F' | 'b' | 'B')) {
        return None;
    }

    let delimiter = ["\"\"\"", "'''", "\"", "'"]
        .into_iter()
        .find(|d| quoted.starts_with(d))?;
    let inner = &quoted[delimiter.len()..];
    Some(inner.strip_suffix(delimiter).unwrap_or(inner))
}

fn split_prefix(literal_text: &str) -> (&str, &str) {
    let split = literal_text
        .find(|c: char| c == '"' || c == '\'')
        .unwrap_or(literal_text.len());
    literal_text.split_at(split)
}

/// 1-based first and last line of a node
pub fn line_range(node: Node) -> (usize, usize) {
    (node.start_position().row + 1, node.end_position().row + 1)
}

pub fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    source.get(node.byte_range()).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_content_plain_and_triple() {
        assert_eq!(string_content("\"hello\""), Some("hello"));
        assert_eq!(string_content("'hi'"), Some("hi"));
        assert_eq!(string_content("\"\"\"Doc.\n    More.\n    \"\"\""), Some("Doc.\n    More.\n    "));
        assert_eq!(string_content("'''x'''"), Some("x"));
    }

    #[test]
    fn test_string_content_prefixes() {
        assert_eq!(string_content("r\"\"\"raw \\d\"\"\""), Some("raw \\d"));
        assert_eq!(string_content("u'text'"), Some("text"));
        assert_eq!(string_content("f\"{x}\""), None);
        assert_eq!(string_content("b'bytes'"), None);
        assert_eq!(string_content("Rb'bytes'"), None);
    }

    #[test]
    fn test_normalize_newlines() {
        assert!(matches!(normalize_newlines("a\nb\n"), Cow::Borrowed(_)));
        assert_eq!(normalize_newlines("a\r\nb\rc\n"), "a\nb\nc\n");
        assert_eq!(normalize_newlines("\r\r\n"), "\n\n");
    }

    #[test]
    fn test_is_triple_quoted() {
        assert!(is_triple_quoted("\"\"\"block\"\"\""));
        assert!(is_triple_quoted("r'''block'''"));
        assert!(!is_triple_quoted("\"single\""));
        assert!(!is_triple_quoted("''"));
    }
}

use tree_sitter::Node;

use crate::error::ParseError;
use super::languages::python::{self, COMMENT, MODULE, STRING};

/// Deepest node nesting accepted; anything deeper is rejected before the
/// later passes walk the tree
pub const MAX_NESTING_DEPTH: usize = 1000;

/// Indentation width with tabs counted as 8 columns and as 1 column.
///
/// Python requires both readings to agree on how two lines compare.
type IndentWidth = (usize, usize);

/// Checks the rules Python 3 enforces that tree-sitter's error recovery lets
/// through without ERROR nodes: indentation, Python 2 statements, backquote
/// repr, parameter ordering and nesting depth.
///
/// The tree is walked with an explicit stack in document order, so the first
/// problem in the file is the one reported.
pub fn check(root: Node, source: &str) -> Result<(), ParseError> {
    let mut stack = vec![(root, 0usize)];

    while let Some((node, depth)) = stack.pop() {
        if depth > MAX_NESTING_DEPTH {
            return Err(error_at(node, "too deeply nested"));
        }

        match node.kind() {
            MODULE => check_statements(node, source, Some((0, 0)), None)?,
            "block" => check_block(node, source)?,
            "print_statement" => {
                return Err(error_at(node, "missing parentheses in call to `print`"));
            }
            "exec_statement" => {
                return Err(error_at(node, "missing parentheses in call to `exec`"));
            }
            STRING if is_backquoted(node, source) => {
                return Err(error_at(node, "backquote repr is not supported, use `repr()`"));
            }
            "parameters" | "lambda_parameters" => check_parameters(node)?,
            _ => {}
        }

        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
    }

    Ok(())
}

fn check_block(block: Node, source: &str) -> Result<(), ParseError> {
    // A suite made only of a newline still becomes a `block`
    let mut cursor = block.walk();
    let has_statement = block
        .named_children(&mut cursor)
        .any(|child| child.kind() != COMMENT);
    if !has_statement {
        let header_end = block.prev_sibling().unwrap_or(block).end_position();
        return Err(ParseError::new(header_end.row + 2, 1, "expected an indented block"));
    }

    let header = block
        .parent()
        .and_then(|parent| line_indent(parent, source))
        .map(width);
    check_statements(block, source, None, header)
}

/// Statements that start their own line must share one indentation, and
/// that indentation must be deeper than the header's.
fn check_statements(
    container: Node,
    source: &str,
    mut reference: Option<IndentWidth>,
    header: Option<IndentWidth>,
) -> Result<(), ParseError> {
    let mut inline_suite = false;

    let mut cursor = container.walk();
    let statements = container
        .named_children(&mut cursor)
        .filter(|child| child.kind() != COMMENT);

    for (index, statement) in statements.enumerate() {
        let Some(indent) = line_indent(statement, source) else {
            // `if x: a` or a statement after `;`
            inline_suite |= index == 0 && container.kind() != MODULE;
            continue;
        };
        if inline_suite {
            return Err(error_at(statement, "unexpected indent"));
        }

        let current = width(indent);
        match reference {
            None => {
                if let Some(outer) = header {
                    let deeper = (current.0 > outer.0, current.1 > outer.1);
                    if deeper.0 != deeper.1 {
                        return Err(error_at(statement, "inconsistent use of tabs and spaces in indentation"));
                    }
                    if !deeper.0 {
                        return Err(error_at(statement, "expected an indented block"));
                    }
                }
                reference = Some(current);
            }
            Some(expected) => {
                let same = (current.0 == expected.0, current.1 == expected.1);
                if same.0 != same.1 {
                    return Err(error_at(statement, "inconsistent use of tabs and spaces in indentation"));
                }
                if !same.0 {
                    let message = if current.0 > expected.0 {
                        "unexpected indent"
                    } else {
                        "unindent does not match any outer indentation level"
                    };
                    return Err(error_at(statement, message));
                }
            }
        }
    }

    Ok(())
}

/// Positional parameters without a default may not follow one with a default
fn check_parameters(list: Node) -> Result<(), ParseError> {
    let mut seen_default = false;

    let mut cursor = list.walk();
    for child in list.named_children(&mut cursor) {
        match child.kind() {
            "tuple_pattern" => {
                return Err(error_at(child, "tuple parameters are not supported"));
            }
            "default_parameter" | "typed_default_parameter" => {
                if child
                    .child_by_field_name("name")
                    .is_some_and(|name| name.kind() == "tuple_pattern")
                {
                    return Err(error_at(child, "tuple parameters are not supported"));
                }
                seen_default = true;
            }
            // Everything after these is keyword-only
            "list_splat_pattern" | "dictionary_splat_pattern" | "keyword_separator" => return Ok(()),
            "typed_parameter" if is_splat(child) => return Ok(()),
            "identifier" | "typed_parameter" if seen_default => {
                return Err(error_at(child, "parameter without a default follows parameter with a default"));
            }
            _ => {}
        }
    }

    Ok(())
}

fn is_splat(typed_parameter: Node) -> bool {
    typed_parameter
        .named_child(0)
        .is_some_and(|target| matches!(target.kind(), "list_splat_pattern" | "dictionary_splat_pattern"))
}

fn is_backquoted(literal: Node, source: &str) -> bool {
    python::node_text(literal, source)
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .starts_with('`')
}

/// Leading whitespace of the line a node starts on, `None` when other text
/// precedes the node on that line
fn line_indent<'s>(node: Node, source: &'s str) -> Option<&'s str> {
    let before = source.get(..node.start_byte())?;
    let line_start = before.rfind(|c: char| c == '\n' || c == '\r').map_or(0, |i| i + 1);
    let indent = &before[line_start..];
    indent
        .chars()
        .all(|c| matches!(c, ' ' | '\t' | '\x0c'))
        .then_some(indent)
}

fn width(indent: &str) -> IndentWidth {
    let (mut wide, mut narrow) = (0, 0);
    for c in indent.chars() {
        match c {
            '\t' => {
                wide = (wide / 8 + 1) * 8;
                narrow += 1;
            }
            // Form feed resets the column
            '\x0c' => (wide, narrow) = (0, 0),
            _ => {
                wide += 1;
                narrow += 1;
            }
        }
    }
    (wide, narrow)
}

fn error_at(node: Node, message: &str) -> ParseError {
    let position = node.start_position();
    ParseError::new(position.row + 1, position.column + 1, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser::SyntaxTreeBuilder;

    fn rejects(source: &str) -> ParseError {
        let mut builder = SyntaxTreeBuilder::new().unwrap();
        match builder.build(source) {
            Ok(_) => panic!("accepted malformed source: {:?}", source),
            Err(e) => e,
        }
    }

    fn accepts(source: &str) {
        let mut builder = SyntaxTreeBuilder::new().unwrap();
        if let Err(e) = builder.build(source) {
            panic!("rejected valid source {:?}: {}", source, e);
        }
    }

    #[test]
    fn test_missing_indented_block() {
        let err = rejects("def f():\nreturn 1\n");
        assert_eq!(err.line, 2);
        assert_eq!(err.message, "expected an indented block");

        let err = rejects("x = 0\nclass A:\npass\n");
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_comment_only_body_is_not_a_block() {
        rejects("def f():\n    # nothing here\n");
    }

    #[test]
    fn test_unexpected_indent() {
        let err = rejects("x = 1\n    y = 2\n");
        assert_eq!((err.line, err.column), (2, 5));
        assert_eq!(err.message, "unexpected indent");

        let err = rejects("    x = 1\n");
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_unexpected_indent_inside_block() {
        rejects("def f():\n    a = 1\n        b = 2\n");
    }

    #[test]
    fn test_mixed_tabs_and_spaces() {
        let err = rejects("if True:\n\tx = 1\n        y = 2\n");
        assert_eq!(err.line, 3);
        assert!(err.message.contains("tabs and spaces"));
    }

    #[test]
    fn test_python2_statements() {
        assert!(rejects("print \"hello\"\n").message.contains("print"));
        assert!(rejects("print >>f, 'x'\n").message.contains("print"));
        assert!(rejects("exec \"x = 1\"\n").message.contains("exec"));
        assert!(rejects("x = `1`\n").message.contains("backquote"));
        rejects("def f(a, (b, c)):\n    pass\n");
    }

    #[test]
    fn test_default_ordering() {
        let err = rejects("def f(a=1, b):\n    pass\n");
        assert_eq!(err.line, 1);
        assert!(err.message.contains("without a default"));

        rejects("g = lambda a=1, b: a\n");
        rejects("def f(a: int = 1, b: int):\n    pass\n");
    }

    #[test]
    fn test_valid_layouts() {
        accepts("print(\"hello\")\n");
        accepts("def f(a, b=1, *args, c, d=2, **kwargs):\n    pass\n");
        accepts("def f(a=1, *, b):\n    pass\n");
        accepts("def f(a=1, /, b=2):\n    pass\n");
        accepts("if x: y = 1\nelse: y = 2\n");
        accepts("class A: pass\n");
        accepts("x = 1; y = 2\n");
        accepts("def f():\n\tif x:\n\t\treturn 1\n\treturn 2\n");
        accepts("def f():\n    x = (1,\n  2)\n    # comment\n    return x\n");
        accepts("total = 1 + \\\n  2\nvalue = 3\n");
        accepts("s = '`not a repr`'\n");
        accepts("class A:\n    def f(self):\n        pass\n\n    def g(self):\n        pass\n");
    }

    #[test]
    fn test_nesting_depth_limit() {
        let deep = format!("x = {}1\n", "-".repeat(5_000));
        let err = rejects(&deep);
        assert_eq!(err.message, "too deeply nested");

        let shallow = format!("x = {}1\n", "-".repeat(100));
        accepts(&shallow);
    }

    #[test]
    fn test_width_counts_tabs_both_ways() {
        assert_eq!(width(""), (0, 0));
        assert_eq!(width("    "), (4, 4));
        assert_eq!(width("\t"), (8, 1));
        assert_eq!(width("  \t"), (8, 3));
        assert_eq!(width("\x0c  "), (2, 2));
    }
}

use tracing::debug;
use tree_sitter::{Node, Parser, Tree};

use crate::error::ParseError;
use super::validator;

/// Longest snippet of offending source quoted in a parse error message
const SNIPPET_LIMIT: usize = 40;

/// A syntactically valid Python tree together with the text it was built from.
pub struct SyntaxTree<'src> {
    tree: Tree,
    source: &'src str,
}

impl<'src> SyntaxTree<'src> {
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Source text covered by a node
    pub fn text(&self, node: Node) -> &'src str {
        self.source.get(node.byte_range()).unwrap_or("")
    }
}

/// Turns Python source text into a syntax tree, rejecting anything the
/// grammar does not accept.
///
/// Tree-sitter recovers from errors by inserting `ERROR` and `MISSING`
/// nodes; the builder refuses such trees so later stages only ever see
/// well-formed input. Indentation mistakes, Python 2 syntax and runaway
/// nesting produce no such nodes and are caught by a second pass.
pub struct SyntaxTreeBuilder {
    parser: Parser,
}

impl SyntaxTreeBuilder {
    pub fn new() -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        let python_language = tree_sitter_python::language();
        parser
            .set_language(&python_language)
            .map_err(|e| ParseError::new(0, 0, format!("Failed to set Python language: {}", e)))?;

        Ok(Self { parser })
    }

    /// Parse source text into a tree rooted at the module
    pub fn build<'src>(&mut self, source: &'src str) -> Result<SyntaxTree<'src>, ParseError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| ParseError::new(1, 1, "Failed to parse Python source"))?;

        let root = tree.root_node();
        if root.has_error() {
            let error = first_syntax_error(root, source)
                .unwrap_or_else(|| ParseError::new(1, 1, "invalid syntax"));
            debug!(line = error.line, column = error.column, "Rejected malformed source");
            return Err(error);
        }

        if let Err(error) = validator::check(root, source) {
            debug!(line = error.line, column = error.column, "Rejected source: {}", error.message);
            return Err(error);
        }

        Ok(SyntaxTree { tree, source })
    }
}

/// Depth-first search for the earliest error or missing node.
///
/// Only subtrees that contain an error are entered.
fn first_syntax_error(root: Node, source: &str) -> Option<ParseError> {
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(describe_error(node, source));
        }

        let mut cursor = node.walk();
        let children: Vec<Node> = node
            .children(&mut cursor)
            .filter(|child| child.has_error())
            .collect();
        stack.extend(children.into_iter().rev());
    }
    None
}

fn describe_error(node: Node, source: &str) -> ParseError {
    let position = node.start_position();
    let message = if node.is_missing() {
        format!("missing `{}`", node.kind())
    } else {
        let text = source.get(node.byte_range()).unwrap_or("");
        let snippet: String = text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("")
            .chars()
            .take(SNIPPET_LIMIT)
            .collect();
        if snippet.is_empty() {
            "invalid syntax".to_string()
        } else {
            format!("invalid syntax near `{}`", snippet)
        }
    };

    ParseError::new(position.row + 1, position.column + 1, message)
}

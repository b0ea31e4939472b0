use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::debug;
use tree_sitter::Node;

use super::languages::python::{self, CLASS_DEFINITION, CONCATENATED_STRING, FUNCTION_DEFINITION, STRING};
use super::model::{CommentKind, CommentRecord, CommentScan, CommentSummary, SourceUnit};
use super::parser::SyntaxTree;

/// Line positions of string literals, gathered from the tree
#[derive(Default)]
struct StringLayout {
    /// Lines covered by documentation strings
    documentation: BTreeSet<usize>,

    /// Lines covered by triple-quoted strings used as statements elsewhere
    blocks: BTreeSet<usize>,

    /// Continuation lines of any multi-line string literal
    inside_strings: BTreeSet<usize>,
}

/// Tags source lines as single-line comments or block-string lines.
///
/// Single-line comments are found on the raw lines: a line counts when its
/// stripped content starts with `#`. Whether a triple-quoted string is
/// documentation or a block comment depends on its position in the tree,
/// so that decision is made once from the syntax tree and the line scan
/// only consumes it. Lines that belong to a string literal are never
/// re-read as `#` comments.
pub struct CommentClassifier<'a, 'src> {
    tree: &'a SyntaxTree<'src>,
}

impl<'a, 'src> CommentClassifier<'a, 'src> {
    pub fn new(tree: &'a SyntaxTree<'src>) -> Self {
        Self { tree }
    }

    pub fn classify(&self, unit: &SourceUnit) -> CommentScan {
        let layout = self.string_layout();
        let owners = OwnerIndex::new(unit);

        let mut records = BTreeMap::new();
        for (index, line) in self.tree.source().lines().enumerate() {
            let number = index + 1;
            let kind = if layout.documentation.contains(&number) {
                None
            } else if layout.blocks.contains(&number) {
                Some(CommentKind::Block)
            } else if layout.inside_strings.contains(&number) {
                None
            } else if line.trim_start().starts_with(python::COMMENT_MARKER) {
                Some(CommentKind::SingleLine)
            } else {
                None
            };

            if let Some(kind) = kind {
                records.insert(number, CommentRecord {
                    line: number,
                    kind,
                    owner: owners.owner_of(number),
                });
            }
        }

        let records: Vec<CommentRecord> = records.into_values().collect();
        let summary = CommentSummary {
            single_line: records.iter().filter(|r| r.kind == CommentKind::SingleLine).count(),
            block_lines: records.iter().filter(|r| r.kind == CommentKind::Block).count(),
            docstring_lines: layout.documentation.len(),
        };

        debug!(
            single_line = summary.single_line,
            block_lines = summary.block_lines,
            docstring_lines = summary.docstring_lines,
            "Classified comment lines"
        );

        CommentScan { records, summary }
    }

    fn string_layout(&self) -> StringLayout {
        let root = self.tree.root();
        let source = self.tree.source();

        let mut documentation_starts = HashSet::new();
        let mut layout = StringLayout::default();
        let mut statements = Vec::new();

        if let Some(literal) = python::documentation_node(root, source) {
            documentation_starts.insert(literal.start_byte());
            add_lines(&mut layout.documentation, literal);
        }
        self.walk(root, &mut documentation_starts, &mut layout, &mut statements);

        for literal in statements {
            if !documentation_starts.contains(&literal.start_byte()) {
                add_lines(&mut layout.blocks, literal);
            }
        }

        layout
    }

    /// Record documentation strings of every definition, multi-line string
    /// spans, and triple-quoted statement candidates
    fn walk<'t>(
        &self,
        root: Node<'t>,
        documentation_starts: &mut HashSet<usize>,
        layout: &mut StringLayout,
        statements: &mut Vec<Node<'t>>,
    ) {
        let source = self.tree.source();
        let mut cursor = root.walk();

        // Preorder traversal on the cursor itself, no recursion
        loop {
            let node = cursor.node();
            match node.kind() {
                CLASS_DEFINITION | FUNCTION_DEFINITION => {
                    if let Some(literal) = python::documentation_node(node, source) {
                        documentation_starts.insert(literal.start_byte());
                        add_lines(&mut layout.documentation, literal);
                    }
                }
                STRING => {
                    let (start, end) = python::line_range(node);
                    layout.inside_strings.extend(start + 1..=end);
                }
                _ => {}
            }

            if let Some(literal) = python::bare_string(node) {
                if self.is_triple_quoted(literal) {
                    statements.push(literal);
                }
            }

            if cursor.goto_first_child() {
                continue;
            }
            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return;
                }
            }
        }
    }

    fn is_triple_quoted(&self, literal: Node) -> bool {
        let first = if literal.kind() == CONCATENATED_STRING {
            literal.named_child(0)
        } else {
            Some(literal)
        };
        first
            .map(|part| python::is_triple_quoted(self.tree.text(part)))
            .unwrap_or(false)
    }
}

fn add_lines(lines: &mut BTreeSet<usize>, node: Node) {
    let (start, end) = python::line_range(node);
    lines.extend(start..=end);
}

/// Line spans of the extracted entities, for attributing comments
struct OwnerIndex {
    spans: Vec<(usize, usize, String)>,
}

impl OwnerIndex {
    fn new(unit: &SourceUnit) -> Self {
        let mut spans = Vec::new();
        for function in &unit.functions {
            spans.push((function.start_line, function.end_line, function.name.clone()));
        }
        for class in &unit.classes {
            spans.push((class.start_line, class.end_line, class.name.clone()));
            for method in &class.methods {
                spans.push((
                    method.start_line,
                    method.end_line,
                    format!("{}.{}", class.name, method.name),
                ));
            }
        }
        Self { spans }
    }

    /// Innermost entity whose range contains the line, `None` for the module
    fn owner_of(&self, line: usize) -> Option<String> {
        self.spans
            .iter()
            .filter(|(start, end, _)| *start <= line && line <= *end)
            .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
            .map(|(_, _, name)| name.clone())
    }
}

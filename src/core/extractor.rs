use tracing::debug;
use tree_sitter::Node;

use super::languages::python::{self, CLASS_DEFINITION, FUNCTION_DEFINITION};
use super::model::{ClassEntity, FunctionEntity, FunctionKind, Parameter, ParameterKind, SourceUnit};
use super::parser::SyntaxTree;

/// Builds the entity forest of a module from its syntax tree.
///
/// Classes and functions are collected from module scope; methods from the
/// scope of a class body. Definitions inside function bodies are
/// implementation detail and never enter the forest. A class nested in a
/// class body becomes its own entity with a dotted name, placed right after
/// its parent.
pub struct EntityExtractor<'a, 'src> {
    tree: &'a SyntaxTree<'src>,
}

impl<'a, 'src> EntityExtractor<'a, 'src> {
    pub fn new(tree: &'a SyntaxTree<'src>) -> Self {
        Self { tree }
    }

    pub fn extract(&self, file_name: &str) -> SourceUnit {
        let root = self.tree.root();
        let source = self.tree.source();

        let mut classes = Vec::new();
        let mut functions = Vec::new();

        for statement in python::scope_definitions(root) {
            let Some(definition) = python::definition(statement) else {
                continue;
            };
            match definition.kind() {
                CLASS_DEFINITION => self.collect_class(statement, definition, None, &mut classes),
                FUNCTION_DEFINITION => {
                    functions.push(self.function(statement, definition, FunctionKind::Function))
                }
                _ => {}
            }
        }

        let unit = SourceUnit {
            file_name: file_name.to_string(),
            text: source.to_string(),
            module_docstring: python::docstring(root, source),
            classes,
            functions,
        };

        debug!(
            file = file_name,
            classes = unit.classes.len(),
            functions = unit.functions.len(),
            callables = unit.callables().count(),
            "Extracted entity forest"
        );

        unit
    }

    /// Push a class, then every class nested in its body, in source order
    fn collect_class(
        &self,
        statement: Node,
        definition: Node,
        parent: Option<&str>,
        classes: &mut Vec<ClassEntity>,
    ) {
        let source = self.tree.source();
        let simple_name = self.field_text(definition, "name").unwrap_or_default();
        let name = match parent {
            Some(parent) => format!("{}.{}", parent, simple_name),
            None => simple_name,
        };

        let mut methods = Vec::new();
        let mut nested = Vec::new();
        for inner in python::scope_definitions(definition) {
            let Some(inner_definition) = python::definition(inner) else {
                continue;
            };
            match inner_definition.kind() {
                FUNCTION_DEFINITION => {
                    methods.push(self.function(inner, inner_definition, FunctionKind::Method))
                }
                CLASS_DEFINITION => nested.push((inner, inner_definition)),
                _ => {}
            }
        }

        let docstring = python::docstring(definition, source);
        let (start_line, end_line) = python::line_range(definition);

        classes.push(ClassEntity {
            bases: self.bases(definition),
            decorators: python::decorator_names(statement, source),
            start_line,
            end_line,
            documented: docstring.is_some(),
            docstring,
            generated_docstring: None,
            methods,
            name: name.clone(),
        });

        for (inner, inner_definition) in nested {
            self.collect_class(inner, inner_definition, Some(name.as_str()), classes);
        }
    }

    fn function(&self, statement: Node, definition: Node, kind: FunctionKind) -> FunctionEntity {
        let source = self.tree.source();
        let docstring = python::docstring(definition, source);
        let (start_line, end_line) = python::line_range(definition);

        let mut cursor = definition.walk();
        let is_async = definition
            .children(&mut cursor)
            .any(|child| child.kind() == "async");

        let mut parameters = self.parameters(definition);
        if kind == FunctionKind::Method && parameters.first().is_some_and(is_receiver) {
            parameters.remove(0);
        }

        FunctionEntity {
            name: self.field_text(definition, "name").unwrap_or_default(),
            kind,
            start_line,
            end_line,
            parameters,
            return_annotation: self.field_text(definition, "return_type"),
            decorators: python::decorator_names(statement, source),
            is_async,
            documented: docstring.is_some(),
            docstring,
            generated_docstring: None,
        }
    }

    /// Parameters in declaration order
    fn parameters(&self, definition: Node) -> Vec<Parameter> {
        let Some(list) = definition.child_by_field_name("parameters") else {
            return Vec::new();
        };

        let mut params = Vec::new();
        let mut keyword_only = false;

        let mut cursor = list.walk();
        for child in list.named_children(&mut cursor) {
            let named_kind = if keyword_only {
                ParameterKind::KeywordOnly
            } else {
                ParameterKind::Positional
            };

            match child.kind() {
                "identifier" => {
                    params.push(Parameter {
                        kind: named_kind,
                        ..Parameter::positional(self.text(child))
                    });
                }
                "default_parameter" => {
                    params.push(Parameter {
                        default: self.field_text(child, "value"),
                        kind: named_kind,
                        ..Parameter::positional(self.field_text(child, "name").unwrap_or_default())
                    });
                }
                "typed_default_parameter" => {
                    params.push(Parameter {
                        name: self.field_text(child, "name").unwrap_or_default(),
                        annotation: self.field_text(child, "type"),
                        default: self.field_text(child, "value"),
                        kind: named_kind,
                    });
                }
                "typed_parameter" => {
                    // The name part may itself be a `*args` / `**kwargs` pattern
                    let Some(target) = child.named_child(0) else {
                        continue;
                    };
                    let kind = match target.kind() {
                        "list_splat_pattern" => ParameterKind::VarPositional,
                        "dictionary_splat_pattern" => ParameterKind::VarKeyword,
                        _ => named_kind,
                    };
                    if kind == ParameterKind::VarPositional {
                        keyword_only = true;
                    }
                    params.push(Parameter {
                        name: strip_sigils(self.text(target)),
                        annotation: self.field_text(child, "type"),
                        default: None,
                        kind,
                    });
                }
                "list_splat_pattern" => {
                    keyword_only = true;
                    params.push(Parameter {
                        kind: ParameterKind::VarPositional,
                        ..Parameter::positional(strip_sigils(self.text(child)))
                    });
                }
                "dictionary_splat_pattern" => {
                    params.push(Parameter {
                        kind: ParameterKind::VarKeyword,
                        ..Parameter::positional(strip_sigils(self.text(child)))
                    });
                }
                "keyword_separator" => keyword_only = true,
                // positional_separator and comments carry no parameter
                _ => {}
            }
        }

        params
    }

    fn bases(&self, definition: Node) -> Vec<String> {
        let Some(arguments) = definition.child_by_field_name("superclasses") else {
            return Vec::new();
        };

        let mut cursor = arguments.walk();
        arguments
            .named_children(&mut cursor)
            .filter(|arg| arg.kind() != python::COMMENT)
            .map(|arg| self.text(arg).to_string())
            .collect()
    }

    fn field_text(&self, node: Node, field: &str) -> Option<String> {
        node.child_by_field_name(field)
            .map(|child| self.text(child).to_string())
    }

    fn text(&self, node: Node) -> &'src str {
        self.tree.text(node)
    }
}

/// Implicit first parameter of a method, left out of the method's parameters
fn is_receiver(param: &Parameter) -> bool {
    param.kind == ParameterKind::Positional && matches!(param.name.as_str(), "self" | "cls")
}

fn strip_sigils(text: &str) -> String {
    text.trim_start_matches('*').trim().to_string()
}

use regex::Regex;

use super::model::{ClassEntity, FunctionEntity, Parameter, ParameterKind, SourceUnit};

/// Closing line of every generated docstring, so generated text can never be
/// mistaken for hand-written documentation
pub const GENERATED_MARKER: &str = "Generated placeholder: replace with a hand-written description.";

/// Type shown for parameters without an annotation
pub const PLACEHOLDER_TYPE: &str = "Any";

/// Return annotation meaning "returns nothing"
const NO_VALUE: &str = "None";

const INDENT: &str = "    ";

/// Generated documentation for one class and its methods, in forest order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassDocs {
    pub docstring: Option<String>,
    pub methods: Vec<Option<String>>,
}

/// Generated documentation for a whole forest; `None` where an entity
/// already has documentation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynthesizedDocs {
    pub classes: Vec<ClassDocs>,
    pub functions: Vec<Option<String>>,
}

/// Writes baseline Google-style docstrings for undocumented entities.
///
/// The text depends only on the entity's name, parameters and return
/// annotation. No `Raises` section is produced.
pub struct DocstringSynthesizer {
    /// `HTTPServer` -> `HTTP Server`
    acronym_boundary: Regex,

    /// `getName` -> `get Name`
    case_boundary: Regex,
}

impl DocstringSynthesizer {
    pub fn new() -> Self {
        Self {
            acronym_boundary: Regex::new(r"([A-Z]+)([A-Z][a-z])")
                .expect("Invalid acronym boundary regex"),
            case_boundary: Regex::new(r"([a-z0-9])([A-Z])")
                .expect("Invalid case boundary regex"),
        }
    }

    pub fn synthesize(&self, unit: &SourceUnit) -> SynthesizedDocs {
        let classes = unit
            .classes
            .iter()
            .map(|class| ClassDocs {
                docstring: (!class.documented).then(|| self.class_docstring(class)),
                methods: class
                    .methods
                    .iter()
                    .map(|method| (!method.documented).then(|| self.function_docstring(method)))
                    .collect(),
            })
            .collect();

        let functions = unit
            .functions
            .iter()
            .map(|function| (!function.documented).then(|| self.function_docstring(function)))
            .collect();

        SynthesizedDocs { classes, functions }
    }

    pub fn function_docstring(&self, function: &FunctionEntity) -> String {
        let returns = function
            .return_annotation
            .as_deref()
            .map(str::trim)
            .filter(|annotation| *annotation != NO_VALUE);

        self.render(&function.name, &function.parameters, returns)
    }

    /// Classes are described by their constructor parameters
    pub fn class_docstring(&self, class: &ClassEntity) -> String {
        let simple_name = class.name.rsplit('.').next().unwrap_or(&class.name);
        let parameters = class
            .initializer()
            .map(|init| init.parameters.as_slice())
            .unwrap_or(&[]);

        self.render(simple_name, parameters, None)
    }

    /// One-line phrase derived from an identifier: `get_user_name` and
    /// `getUserName` both become `Get user name.`
    pub fn summary(&self, name: &str) -> String {
        let trimmed = name.trim_matches('_');
        let base = if trimmed.is_empty() { name } else { trimmed };

        let spaced = self.acronym_boundary.replace_all(base, "${1} ${2}");
        let spaced = self.case_boundary.replace_all(&spaced, "${1} ${2}");
        let phrase = spaced
            .replace('_', " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        let mut chars = phrase.chars();
        match chars.next() {
            Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
            None => format!("{}.", name),
        }
    }

    /// Method receivers never reach here; the extractor leaves them out
    fn render(&self, name: &str, parameters: &[Parameter], returns: Option<&str>) -> String {
        let mut lines = vec![self.summary(name)];

        if !parameters.is_empty() {
            lines.push(String::new());
            lines.push("Args:".to_string());
            lines.extend(parameters.iter().map(argument_line));
        }

        if let Some(annotation) = returns {
            lines.push(String::new());
            lines.push("Returns:".to_string());
            lines.push(format!("{}{}: Description of return value.", INDENT, collapse(annotation)));
        }

        lines.push(String::new());
        lines.push(GENERATED_MARKER.to_string());
        lines.join("\n")
    }
}

impl Default for DocstringSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

fn argument_line(param: &Parameter) -> String {
    let type_text = param
        .annotation
        .as_deref()
        .map(collapse)
        .unwrap_or_else(|| PLACEHOLDER_TYPE.to_string());

    match param.kind {
        ParameterKind::VarPositional => {
            format!("{}*{} ({}): Variable positional arguments.", INDENT, param.name, type_text)
        }
        ParameterKind::VarKeyword => {
            format!("{}**{} ({}): Variable keyword arguments.", INDENT, param.name, type_text)
        }
        ParameterKind::Positional | ParameterKind::KeywordOnly => {
            let mut line = format!("{}{} ({}): Description of {}.", INDENT, param.name, type_text, param.name);
            if let Some(default) = &param.default {
                line.push_str(&format!(" Defaults to {}.", collapse(default)));
            }
            line
        }
    }
}

/// Source text squeezed onto one line
fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::FunctionKind;

    fn method(name: &str, parameters: Vec<Parameter>, return_annotation: Option<&str>) -> FunctionEntity {
        FunctionEntity {
            name: name.to_string(),
            kind: FunctionKind::Method,
            start_line: 1,
            end_line: 2,
            parameters,
            return_annotation: return_annotation.map(str::to_string),
            decorators: Vec::new(),
            is_async: false,
            documented: false,
            docstring: None,
            generated_docstring: None,
        }
    }

    fn typed(name: &str, annotation: &str) -> Parameter {
        Parameter {
            annotation: Some(annotation.to_string()),
            ..Parameter::positional(name)
        }
    }

    #[test]
    fn test_summary_from_names() {
        let synthesizer = DocstringSynthesizer::new();
        assert_eq!(synthesizer.summary("get_user_name"), "Get user name.");
        assert_eq!(synthesizer.summary("getUserName"), "Get user name.");
        assert_eq!(synthesizer.summary("HTTPServer"), "Http server.");
        assert_eq!(synthesizer.summary("__init__"), "Init.");
        assert_eq!(synthesizer.summary("_"), "_.");
    }

    #[test]
    fn test_method_docstring_layout() {
        let synthesizer = DocstringSynthesizer::new();
        let greet = method("greet", vec![Parameter::positional("name")], None);
        let doc = synthesizer.function_docstring(&greet);
        assert_eq!(
            doc,
            "Greet.\n\nArgs:\n    name (Any): Description of name.\n\n".to_string() + GENERATED_MARKER
        );
    }

    #[test]
    fn test_returns_section_only_for_values() {
        let synthesizer = DocstringSynthesizer::new();

        let with_value = method("load", vec![typed("path", "str")], Some("dict[str, int]"));
        let doc = synthesizer.function_docstring(&with_value);
        assert!(doc.contains("Returns:\n    dict[str, int]: Description of return value."));
        assert!(doc.contains("    path (str): Description of path."));

        let no_value = method("save", vec![], Some("None"));
        let doc = synthesizer.function_docstring(&no_value);
        assert!(!doc.contains("Returns:"));
        assert!(!doc.contains("Args:"));
        assert!(!doc.contains("Raises:"));
    }

    #[test]
    fn test_variadic_and_default_lines() {
        let synthesizer = DocstringSynthesizer::new();
        let mut function = method(
            "run",
            vec![
                Parameter {
                    default: Some("30".to_string()),
                    ..typed("timeout", "int")
                },
                Parameter {
                    kind: ParameterKind::VarPositional,
                    ..Parameter::positional("args")
                },
                Parameter {
                    kind: ParameterKind::VarKeyword,
                    ..typed("kwargs", "str")
                },
            ],
            None,
        );
        function.kind = FunctionKind::Function;

        let doc = synthesizer.function_docstring(&function);
        assert!(doc.contains("    timeout (int): Description of timeout. Defaults to 30."));
        assert!(doc.contains("    *args (Any): Variable positional arguments."));
        assert!(doc.contains("    **kwargs (str): Variable keyword arguments."));
    }

    #[test]
    fn test_class_uses_initializer_parameters() {
        let synthesizer = DocstringSynthesizer::new();
        let class = ClassEntity {
            name: "Outer.HttpClient".to_string(),
            bases: Vec::new(),
            decorators: Vec::new(),
            start_line: 1,
            end_line: 5,
            documented: false,
            docstring: None,
            generated_docstring: None,
            methods: vec![method(
                "__init__",
                vec![typed("base_url", "str")],
                Some("None"),
            )],
        };
        let doc = synthesizer.class_docstring(&class);
        assert!(doc.starts_with("Http client.\n\nArgs:\n    base_url (str): Description of base_url."));
        assert!(!doc.contains("Returns:"));
        assert!(doc.ends_with(GENERATED_MARKER));
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let synthesizer = DocstringSynthesizer::new();
        let other = DocstringSynthesizer::new();
        let function = method("parse", vec![typed("text", "str")], Some("Tree"));
        assert_eq!(synthesizer.function_docstring(&function), other.function_docstring(&function));
    }
}

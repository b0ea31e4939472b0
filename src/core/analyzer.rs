use tracing::debug;

use crate::error::ParseError;
use super::comments::CommentClassifier;
use super::coverage::CoverageCalculator;
use super::extractor::EntityExtractor;
use super::languages::python;
use super::model::{AnalysisReport, SourceMetadata};
use super::parser::SyntaxTreeBuilder;
use super::report::ReportAssembler;
use super::synthesizer::DocstringSynthesizer;

/// Analyze one Python source text.
///
/// Runs the whole pipeline in a single pass: parse, extract entities,
/// classify comments, compute coverage, synthesize baseline docs and
/// assemble the report. Every call builds its own parser and owns all of
/// its intermediate state, so concurrent calls never interact. Parsing is
/// the only step that can fail; no partial report is ever produced.
pub fn analyze(source: &str, file_name: &str) -> Result<AnalysisReport, ParseError> {
    let normalized = python::normalize_newlines(source);
    let mut builder = SyntaxTreeBuilder::new()?;
    let tree = builder.build(&normalized)?;

    let unit = EntityExtractor::new(&tree).extract(file_name);
    let comments = CommentClassifier::new(&tree).classify(&unit);
    let coverage = CoverageCalculator::calculate(&unit);
    let docs = DocstringSynthesizer::new().synthesize(&unit);
    let metadata = SourceMetadata::of(source);

    debug!(
        file = file_name,
        documented = coverage.documented,
        total = coverage.total,
        "Analysis complete"
    );

    Ok(ReportAssembler::assemble(unit, comments, coverage, docs, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{CommentKind, FunctionKind};
    use crate::core::synthesizer::GENERATED_MARKER;

    #[test]
    fn test_greeter_example() {
        let source = "class Greeter:\n    def greet(self, name):\n        print(name)\n";
        let report = analyze(source, "greeter.py").unwrap();

        assert_eq!(report.file_name, "greeter.py");
        assert!(!report.module_documented);
        assert_eq!(report.classes.len(), 1);
        assert!(report.functions.is_empty());

        let greeter = &report.classes[0];
        assert_eq!(greeter.name, "Greeter");
        assert_eq!(greeter.methods.len(), 1);

        let greet = &greeter.methods[0];
        assert_eq!(greet.name, "greet");
        assert_eq!(greet.kind, FunctionKind::Method);
        assert!(!greet.documented);
        assert_eq!(greet.parameters.len(), 1);
        assert_eq!(greet.parameters[0].name, "name");
        assert!(greet.parameters[0].annotation.is_none());
        assert!(greet.parameters[0].default.is_none());
        let generated = greet.generated_docstring.as_deref().unwrap();
        assert!(generated.contains("Args:\n    name (Any)"));
        assert!(!generated.contains("self"));

        assert_eq!(report.coverage.total, 2);
        assert_eq!(report.coverage.documented, 0);
        assert_eq!(report.coverage.percentage, 0.0);
    }

    #[test]
    fn test_comment_only_module() {
        let report = analyze("# a comment", "notes.py").unwrap();
        assert_eq!(report.comments.len(), 1);
        assert_eq!(report.comments[0].line, 1);
        assert_eq!(report.comments[0].kind, CommentKind::SingleLine);
        assert!(report.classes.is_empty());
        assert!(report.functions.is_empty());
        assert_eq!(report.coverage.percentage, 100.0);
    }

    #[test]
    fn test_documented_entities_get_no_generated_text() {
        let source = r#""""Utilities."""

def documented():
    """Already documented."""

def undocumented(x):
    return x
"#;
        let report = analyze(source, "utils.py").unwrap();
        assert!(report.module_documented);
        assert_eq!(report.coverage.total, 3);
        assert_eq!(report.coverage.documented, 2);

        let documented = &report.functions[0];
        assert!(documented.docstring.is_some());
        assert!(documented.generated_docstring.is_none());

        let undocumented = &report.functions[1];
        assert!(undocumented.docstring.is_none());
        assert!(undocumented.generated_docstring.as_deref().unwrap().contains(GENERATED_MARKER));
    }

    #[test]
    fn test_carriage_return_line_endings() {
        let report = analyze("# a\r# b\rx = 1\r", "cr.py").unwrap();
        let lines: Vec<_> = report.comments.iter().map(|c| c.line).collect();
        assert_eq!(lines, vec![1, 2]);
        assert_eq!(report.metadata.lines_of_code, 3);

        let report = analyze("def f():\r\n    \"\"\"Doc.\r\n    More.\"\"\"\r\n", "crlf.py").unwrap();
        assert_eq!(report.functions[0].end_line, 3);
        assert_eq!(report.functions[0].docstring.as_deref(), Some("Doc.\n    More."));
        assert_eq!(report.comment_summary.docstring_lines, 2);
    }

    #[test]
    fn test_deep_nesting_is_a_parse_error() {
        let source = format!("x = {}1\n", "-".repeat(5_000));
        let handle = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(move || analyze(&source, "deep.py"))
            .unwrap();
        let err = handle.join().unwrap().unwrap_err();
        assert_eq!(err.message, "too deeply nested");
    }

    #[test]
    fn test_parse_error_aborts() {
        let err = analyze("def broken(:\n    pass\n", "broken.py").unwrap_err();
        assert_eq!(err.line, 1);
    }
}

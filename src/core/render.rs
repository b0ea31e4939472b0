use chrono::{SecondsFormat, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tera::{Context, Tera};

use crate::error::Result;
use super::model::AnalysisReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Markdown,
}

const MACROS_TEMPLATE: &str = r##"{% macro callable(f, owner) %}
### `{% if owner %}{{ owner }}.{% endif %}{{ f.name }}` ({{ f.kind }}, lines {{ f.startLine }}-{{ f.endLine }})

- Parameters: {% if f.parameters | length == 0 %}none{% endif %}{% for p in f.parameters %}`{{ p.name }}{% if p.annotation %}: {{ p.annotation }}{% endif %}{% if p.default %} = {{ p.default }}{% endif %}`{% if not loop.last %}, {% endif %}{% endfor %}
{% if f.returnAnnotation %}- Returns: `{{ f.returnAnnotation }}`
{% endif %}
{% if f.documented %}Documented:

```text
{{ f.docstring }}
```
{% else %}Missing documentation. Suggested baseline:

```text
{{ f.generatedDocstring }}
```
{% endif %}
{% endmacro callable %}
"##;

const REPORT_TEMPLATE: &str = r##"{% import "macros.md" as macros %}# {{ report.fileName }}

_Generated {{ generated_at }}_

Coverage: **{{ report.coverage.percentage | round(precision=1) }}%** ({{ report.coverage.documented }} of {{ report.coverage.total }} entities documented)

| Kind | Documented | Total |
|------|-----------:|------:|
| Module | {% if report.moduleDocumented %}1 | 1{% else %}0 | 0{% endif %} |
| Classes | {{ report.coverage.breakdown.classes.documented }} | {{ report.coverage.breakdown.classes.total }} |
| Functions | {{ report.coverage.breakdown.functions.documented }} | {{ report.coverage.breakdown.functions.total }} |
| Methods | {{ report.coverage.breakdown.methods.documented }} | {{ report.coverage.breakdown.methods.total }} |

Comments: {{ report.commentSummary.singleLine }} single-line, {{ report.commentSummary.blockLines }} block-string lines, {{ report.commentSummary.docstringLines }} docstring lines.
{% for item in report.classes %}
## Class `{{ item.name }}` (lines {{ item.startLine }}-{{ item.endLine }})

{% if item.documented %}Documented:

```text
{{ item.docstring }}
```
{% else %}Missing documentation. Suggested baseline:

```text
{{ item.generatedDocstring }}
```
{% endif %}{% for method in item.methods %}{{ macros::callable(f=method, owner=item.name) }}{% endfor %}{% endfor %}
{% if report.functions | length > 0 %}
## Functions
{% for function in report.functions %}{{ macros::callable(f=function, owner="") }}{% endfor %}{% endif %}"##;

/// Renders analysis reports as JSON or Markdown.
pub struct ReportRenderer {
    tera: Tera,
    pretty: bool,
}

impl ReportRenderer {
    pub fn new(pretty: bool) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("macros.md", MACROS_TEMPLATE),
            ("report.md", REPORT_TEMPLATE),
        ])?;

        Ok(Self { tera, pretty })
    }

    pub fn render(&self, reports: &[AnalysisReport], format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => self.render_json(reports),
            OutputFormat::Markdown => self.render_markdown(reports),
        }
    }

    /// A single report is written as an object, several as an array
    fn render_json(&self, reports: &[AnalysisReport]) -> Result<String> {
        let rendered = match (reports, self.pretty) {
            ([single], true) => serde_json::to_string_pretty(single)?,
            ([single], false) => serde_json::to_string(single)?,
            (many, true) => serde_json::to_string_pretty(many)?,
            (many, false) => serde_json::to_string(many)?,
        };
        Ok(rendered)
    }

    fn render_markdown(&self, reports: &[AnalysisReport]) -> Result<String> {
        let generated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut sections = Vec::with_capacity(reports.len());
        for report in reports {
            let mut context = Context::new();
            context.insert("report", report);
            context.insert("generated_at", &generated_at);
            sections.push(self.tera.render("report.md", &context)?);
        }

        Ok(sections.join("\n---\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analyze;

    fn sample() -> AnalysisReport {
        let source = r#"class Greeter:
    """Says hello."""

    def greet(self, name: str = "world") -> str:
        return name

def shout(text):
    return text.upper()
"#;
        analyze(source, "greeter.py").unwrap()
    }

    #[test]
    fn test_json_single_report_is_object() {
        let renderer = ReportRenderer::new(false).unwrap();
        let json = renderer.render(&[sample()], OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["fileName"], "greeter.py");
        assert_eq!(value["classes"][0]["methods"][0]["kind"], "method");
        assert_eq!(value["classes"][0]["methods"][0]["parameters"][0]["default"], "\"world\"");
        assert_eq!(value["coverage"]["total"], 3);
        assert!(value["functions"][0]["docstring"].is_null());
        assert!(value["functions"][0]["generatedDocstring"].is_string());
    }

    #[test]
    fn test_json_many_reports_is_array() {
        let renderer = ReportRenderer::new(true).unwrap();
        let json = renderer.render(&[sample(), sample()], OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_markdown_sections() {
        let renderer = ReportRenderer::new(true).unwrap();
        let markdown = renderer.render(&[sample()], OutputFormat::Markdown).unwrap();

        assert!(markdown.starts_with("# greeter.py"));
        assert!(markdown.contains("Coverage: **33.3%** (1 of 3 entities documented)"));
        assert!(markdown.contains("## Class `Greeter`"));
        assert!(markdown.contains("### `Greeter.greet` (method, lines 4-5)"));
        assert!(markdown.contains("### `shout` (function, lines 7-8)"));
        assert!(markdown.contains("Suggested baseline"));
        assert!(markdown.contains("Says hello."));
    }
}

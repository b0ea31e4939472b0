//! Entity forest and report types.
//!
//! The module owns its classes and top-level functions outright and every
//! class owns its methods; nothing holds a back-reference, so the forest is
//! a plain tree of owned values. All types serialize with camelCase keys.

use serde::{Deserialize, Serialize};

/// Whether a callable sits at module scope or directly in a class body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FunctionKind {
    Function,
    Method,
}

/// How a parameter binds its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParameterKind {
    Positional,
    KeywordOnly,
    VarPositional,
    VarKeyword,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    /// Name without `*` / `**` sigils
    pub name: String,

    /// Annotation source text
    pub annotation: Option<String>,

    /// Default value source text
    pub default: Option<String>,

    pub kind: ParameterKind,
}

impl Parameter {
    pub fn positional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: None,
            default: None,
            kind: ParameterKind::Positional,
        }
    }
}

/// A top-level function or a method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEntity {
    pub name: String,
    pub kind: FunctionKind,
    pub start_line: usize,
    pub end_line: usize,
    pub parameters: Vec<Parameter>,
    pub return_annotation: Option<String>,
    pub decorators: Vec<String>,
    pub is_async: bool,
    pub documented: bool,

    /// Hand-written documentation, verbatim
    pub docstring: Option<String>,

    /// Baseline documentation, present only when `docstring` is absent
    pub generated_docstring: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassEntity {
    /// Dotted path for classes nested in other class bodies (`Outer.Inner`)
    pub name: String,
    pub bases: Vec<String>,
    pub decorators: Vec<String>,
    pub start_line: usize,
    pub end_line: usize,
    pub documented: bool,
    pub docstring: Option<String>,
    pub generated_docstring: Option<String>,
    pub methods: Vec<FunctionEntity>,
}

impl ClassEntity {
    /// The `__init__` method, whose parameters describe the constructor.
    pub fn initializer(&self) -> Option<&FunctionEntity> {
        self.methods.iter().find(|m| m.name == "__init__")
    }
}

/// The whole analyzed file as produced by the extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUnit {
    pub file_name: String,
    pub text: String,
    pub module_docstring: Option<String>,
    pub classes: Vec<ClassEntity>,
    pub functions: Vec<FunctionEntity>,
}

impl SourceUnit {
    /// Iterate over every callable in the forest: top-level functions first,
    /// then methods in class order.
    pub fn callables(&self) -> impl Iterator<Item = &FunctionEntity> {
        self.functions
            .iter()
            .chain(self.classes.iter().flat_map(|c| c.methods.iter()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommentKind {
    SingleLine,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    pub line: usize,
    pub kind: CommentKind,

    /// Qualified name of the owning entity; `None` means the module
    pub owner: Option<String>,
}

/// Line counts per comment category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSummary {
    pub single_line: usize,
    pub block_lines: usize,
    pub docstring_lines: usize,
}

/// Output of the comment classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentScan {
    pub records: Vec<CommentRecord>,
    pub summary: CommentSummary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub documented: usize,
    pub total: usize,
}

impl Tally {
    pub fn record(&mut self, documented: bool) {
        self.total += 1;
        if documented {
            self.documented += 1;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageBreakdown {
    pub classes: Tally,
    pub functions: Tally,
    pub methods: Tally,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub documented: usize,
    pub total: usize,

    /// In [0, 100]; 100 when there is nothing to document
    pub percentage: f64,

    pub breakdown: CoverageBreakdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMetadata {
    pub file_size_bytes: usize,
    pub lines_of_code: usize,
    pub content_hash: String,
}

/// Final analysis result handed to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub file_name: String,
    pub module_documented: bool,
    pub module_docstring: Option<String>,
    pub classes: Vec<ClassEntity>,
    pub functions: Vec<FunctionEntity>,
    pub comments: Vec<CommentRecord>,
    pub comment_summary: CommentSummary,
    pub coverage: CoverageReport,
    pub metadata: SourceMetadata,
}

impl AnalysisReport {
    /// Every function and method, top-level functions first.
    pub fn callables(&self) -> impl Iterator<Item = &FunctionEntity> {
        self.functions
            .iter()
            .chain(self.classes.iter().flat_map(|c| c.methods.iter()))
    }
}

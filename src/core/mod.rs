mod analyzer;
mod comments;
mod coverage;
mod engine;
mod extractor;
mod parser;
mod render;
mod report;
mod synthesizer;
mod validator;

pub mod languages;
pub mod model;

pub use analyzer::analyze;
pub use comments::CommentClassifier;
pub use coverage::CoverageCalculator;
pub use extractor::EntityExtractor;
pub use parser::{SyntaxTree, SyntaxTreeBuilder};
pub use render::{OutputFormat, ReportRenderer};
pub use report::ReportAssembler;
pub use synthesizer::{ClassDocs, DocstringSynthesizer, SynthesizedDocs, GENERATED_MARKER, PLACEHOLDER_TYPE};

// Export the main engine
pub use engine::{analyze_bytes, AnalyzeOptions, Engine, FileAnalysis};

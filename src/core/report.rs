use sha2::{Digest, Sha256};

use super::languages::python;
use super::model::{
    AnalysisReport, ClassEntity, CommentScan, CoverageReport, FunctionEntity, SourceMetadata, SourceUnit,
};
use super::synthesizer::{ClassDocs, SynthesizedDocs};

impl SourceMetadata {
    /// Size and hash of the text as given; lines counted with any line ending
    pub fn of(text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());

        Self {
            file_size_bytes: text.len(),
            lines_of_code: python::normalize_newlines(text).lines().count(),
            content_hash: format!("{:x}", hasher.finalize()),
        }
    }
}

/// Merges the outputs of the pipeline stages into one report.
///
/// Generated docstrings are moved onto the entities they belong to; nothing
/// else is computed here.
pub struct ReportAssembler;

impl ReportAssembler {
    pub fn assemble(
        unit: SourceUnit,
        comments: CommentScan,
        coverage: CoverageReport,
        docs: SynthesizedDocs,
        metadata: SourceMetadata,
    ) -> AnalysisReport {
        let classes = unit
            .classes
            .into_iter()
            .zip(docs.classes)
            .map(|(class, class_docs)| attach_class(class, class_docs))
            .collect();

        let functions = unit
            .functions
            .into_iter()
            .zip(docs.functions)
            .map(|(function, generated)| attach(function, generated))
            .collect();

        AnalysisReport {
            file_name: unit.file_name,
            module_documented: unit.module_docstring.is_some(),
            module_docstring: unit.module_docstring,
            classes,
            functions,
            comments: comments.records,
            comment_summary: comments.summary,
            coverage,
            metadata,
        }
    }
}

fn attach_class(class: ClassEntity, docs: ClassDocs) -> ClassEntity {
    debug_assert!(class.docstring.is_none() || docs.docstring.is_none());

    let methods = class
        .methods
        .into_iter()
        .zip(docs.methods)
        .map(|(method, generated)| attach(method, generated))
        .collect();

    ClassEntity {
        generated_docstring: docs.docstring,
        methods,
        ..class
    }
}

fn attach(function: FunctionEntity, generated: Option<String>) -> FunctionEntity {
    debug_assert!(function.docstring.is_none() || generated.is_none());

    FunctionEntity {
        generated_docstring: generated,
        ..function
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_of_text() {
        let metadata = SourceMetadata::of("a = 1\nb = 2\n");
        assert_eq!(metadata.file_size_bytes, 12);
        assert_eq!(metadata.lines_of_code, 2);
        assert_eq!(metadata.content_hash.len(), 64);
        assert_eq!(metadata, SourceMetadata::of("a = 1\nb = 2\n"));
        assert_ne!(metadata.content_hash, SourceMetadata::of("a = 1\n").content_hash);
    }

    #[test]
    fn test_empty_text_hash() {
        let metadata = SourceMetadata::of("");
        assert_eq!(metadata.lines_of_code, 0);
        assert_eq!(
            metadata.content_hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}

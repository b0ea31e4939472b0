use std::path::PathBuf;
use thiserror::Error;

/// Source text that is not valid Python.
///
/// This is the only failure the analysis core can produce. Line and column
/// are 1-based; the column counts bytes within the line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Main error type for Docscope operations
#[derive(Error, Debug)]
pub enum DocscopeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },

    #[error("Encoding error in {path}: file must be UTF-8 encoded ({source})")]
    Encoding {
        path: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("File {path} is {size} bytes, above the {limit} byte limit")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        limit: u64,
    },

    #[error("Unsupported file type: {0} (expected one of the configured extensions)")]
    UnsupportedFile(PathBuf),
}

pub type Result<T> = std::result::Result<T, DocscopeError>;

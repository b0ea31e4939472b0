//! Docstring coverage analysis for Python source files.
//!
//! [`analyze`] turns one source text into an [`core::model::AnalysisReport`]:
//! the module's classes and top-level functions, which of them carry a
//! docstring, every comment line, a coverage percentage and a generated
//! baseline docstring for each undocumented entity. The [`core::Engine`]
//! layers file discovery, concurrency and rendering on top of it.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;

pub use crate::core::analyze;
pub use crate::error::{DocscopeError, ParseError, Result};

//! Grammar-specific knowledge about the analyzed language.
//!
//! Everything that depends on tree-sitter node kinds or on the lexical
//! shape of Python literals lives here, so the pipeline stages can talk in
//! terms of bodies, definitions and documentation strings.

pub mod python;

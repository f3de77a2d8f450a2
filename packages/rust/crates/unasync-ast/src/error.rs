//! Error types for parsing.

use thiserror::Error;

/// Failure to turn source text into a [`crate::SyntaxTree`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The grammar could not be loaded into the parser.
    #[error("Failed to load Python grammar: {0}")]
    Language(String),

    /// tree-sitter returned no tree.
    #[error("Parser produced no tree")]
    NoTree,

    /// The source is not valid Python.
    #[error("Syntax error at line {line}, column {column}: {message} near `{snippet}`")]
    Syntax {
        /// 1-indexed line.
        line: usize,
        /// 1-indexed column.
        column: usize,
        /// What went wrong.
        message: String,
        /// The offending source line, trimmed.
        snippet: String,
    },
}

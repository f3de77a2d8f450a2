//! Error types for rule tables and rewriting.

use thiserror::Error;
use unasync_ast::ParseError;

/// An inconsistent rename table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// A key is both a type rename and a factory rename.
    #[error("`{0}` appears in both the type and factory rename tables")]
    Overlap(String),

    /// A key appears twice in one table.
    #[error("duplicate rename key `{0}`")]
    Duplicate(String),

    /// A key or target is a Python keyword.
    #[error("`{0}` is a Python keyword and cannot be renamed")]
    Keyword(String),

    /// A key or target is not a Python identifier.
    #[error("`{0}` is not a valid identifier")]
    InvalidIdentifier(String),

    /// A module rename side is not a dotted path.
    #[error("`{0}` is not a valid module path")]
    InvalidModulePath(String),

    /// The entry point has no type rename.
    #[error("entry point `{0}` has no type rename")]
    UnknownEntryPoint(String),

    /// The forward-reference matcher could not be compiled.
    #[error("forward reference pattern: {0}")]
    Pattern(String),
}

/// Failure while rewriting one file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewriteError {
    /// The source could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// An async construct outside the supported rule set.
    #[error("line {line}: unsupported async construct `{construct}`")]
    UnrecognizedConstruct {
        /// 1-indexed line of the enclosing node.
        line: usize,
        /// The construct as written.
        construct: String,
    },

    /// A suspension construct is still present after the pass.
    #[error("line {line}: `{construct}` survived rewriting")]
    ResidualSuspension {
        /// 1-indexed line of the enclosing node.
        line: usize,
        /// The leftover keyword.
        construct: String,
    },
}

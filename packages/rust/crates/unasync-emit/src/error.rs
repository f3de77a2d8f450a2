//! Error types for mirror emission.

use thiserror::Error;
use unasync_ast::ParseError;
use unasync_io::IoError;
use unasync_rewrite::{RewriteError, RuleError};

/// Failure of an emit or check run. Nothing is published when one occurs.
#[derive(Error, Debug)]
pub enum EmitError {
    /// Reading sources or writing the mirror failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// Listing the resources or mirror directory failed.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A source file is not valid Python.
    #[error("{path}: {source}")]
    Parse {
        /// Source path relative to the source root.
        path: String,
        /// Parser diagnostic.
        #[source]
        source: ParseError,
    },

    /// A source file holds a construct the rewriter rejects.
    #[error("{path}: {source}")]
    Rewrite {
        /// Source path relative to the source root.
        path: String,
        /// Rewriter diagnostic.
        #[source]
        source: RewriteError,
    },

    /// The rename tables and the sources disagree on public symbols.
    #[error("rename tables are out of date:\n  {}", missing.join("\n  "))]
    RenameDrift {
        /// One line per missing or stale entry.
        missing: Vec<String>,
    },

    /// The rename tables are inconsistent.
    #[error("invalid rename table: {0}")]
    Rules(#[from] RuleError),

    /// A fixed top-level module does not exist.
    #[error("missing input module: {0}")]
    MissingInput(String),
}

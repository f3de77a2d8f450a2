//! unasync-rewrite - Async to blocking Python rewriting
//!
//! Holds the rename tables of the Tideline SDK and the tree rewriter that
//! turns its async sources into the blocking mirror.
//!
//! # Architecture
//!
//! ```text
//! unasync-rewrite/src/
//! ├── lib.rs       # Re-exports (this file)
//! ├── error.rs     # RuleError, RewriteError
//! ├── builtin.rs   # Embedded rename tables
//! ├── rules.rs     # RenameTable, AsyncConstructRule
//! └── rewriter.rs  # TreeRewriter (bottom-up dispatch)
//! ```
//!
//! # Example
//!
//! ```rust
//! use unasync_rewrite::{RenameTable, TreeRewriter};
//!
//! let table = RenameTable::builtin().unwrap();
//! let out = TreeRewriter::new(table)
//!     .rewrite_source("async def f(c: AsyncTideline):\n    await c.aclose()\n")
//!     .unwrap();
//! assert_eq!(out, "def f(c: Tideline):\n    c.close()\n");
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod builtin;
mod error;
mod rewriter;
mod rules;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use error::{RewriteError, RuleError};
pub use rewriter::{RewriteReport, TreeRewriter, find_residual_suspension};
pub use rules::{
    ASYNC_ITERATOR, AsyncConstructRule, BLOCKING_MODULE, LIFECYCLE_HOOKS, RenameTable,
    SCHEDULER_MODULE, SLEEP, TRANSPORT_ATTRIBUTES, UNSUPPORTED_NAMES, is_scheduler_path,
    is_unsupported_name, lifecycle_hook, transport_attribute,
};

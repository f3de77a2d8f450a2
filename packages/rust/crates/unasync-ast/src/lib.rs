//! unasync-ast - Lossless Python syntax trees
//!
//! Parses Python with tree-sitter and lowers the result into an owned tree
//! that the rewriter can mutate freely and serialize back to source text.
//!
//! ## Architecture
//!
//! ```text
//! unasync-ast/src/
//! ├── lib.rs      # Re-exports (entry point)
//! ├── error.rs    # ParseError
//! ├── tree.rs     # SyntaxTree, Node, Token, NodeKind, TokenKind
//! ├── parser.rs   # PythonParser (tree-sitter lowering)
//! └── symbols.rs  # Top-level class/function extraction
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use unasync_ast::SyntaxTree;
//!
//! let code = "async def main():\n    await run()\n";
//! let tree = SyntaxTree::parse(code).unwrap();
//! assert_eq!(tree.to_source(), code);
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod error;
mod parser;
mod symbols;
mod tree;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::ParseError;
pub use parser::PythonParser;
pub use symbols::{Symbol, SymbolKind, top_level_symbols};
pub use tree::{ComprehensionKind, Element, Node, NodeKind, SyntaxTree, Token, TokenKind};

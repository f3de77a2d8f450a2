#![allow(clippy::doc_markdown)]

//! unasync-emit - Blocking mirror generation for the Tideline SDK
//!
//! Runs the rewriter over the async package, checks the rename tables
//! against the public symbols it finds, writes the manifest and publishes the
//! `_sync` mirror atomically.
//!
//! # Architecture
//!
//! ```text
//! unasync-emit/src/
//! ├── lib.rs       # Re-exports (this file)
//! ├── main.rs      # `unasync` CLI
//! ├── config.rs    # EmitConfig, unasync.yaml settings
//! ├── error.rs     # EmitError enum (thiserror)
//! ├── diff.rs      # Unified diffs for check mode
//! ├── manifest.rs  # Mirror __init__.py
//! ├── validate.rs  # Rename-table drift checks
//! └── emitter.rs   # Emitter (rayon rewrite, staged publish)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use unasync_emit::{EmitConfig, Emitter};
//! use unasync_rewrite::RenameTable;
//!
//! let table = RenameTable::builtin()?;
//! let report = Emitter::new(EmitConfig::load("src/tideline"), table).emit()?;
//! println!("converted {} files", report.converted);
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod config;
mod diff;
mod emitter;
mod error;
mod manifest;
mod validate;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use config::{DEFAULT_SOURCE_ROOT, EmitConfig, EmitSettings, SETTINGS_FILE, load_settings};
pub use diff::generate_unified_diff;
pub use emitter::{CheckReport, ConvertedFile, EmitReport, Emitter};
pub use error::EmitError;
pub use manifest::{MANIFEST_FILE, declared_exports, render_manifest};
pub use validate::{ModuleSymbols, check_rename_drift};

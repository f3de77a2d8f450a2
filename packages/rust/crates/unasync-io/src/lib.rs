#![allow(clippy::doc_markdown)]

//! unasync-io - File I/O for the unasync mirror generator
//!
//! Reads Python sources with size and binary checks, and publishes generated
//! files without ever leaving a half-written mirror behind.
//!
//! # Features
//!
//! - **Safe reads**: size limit, NULL-byte binary detection, strict UTF-8
//! - **Atomic writes**: temp file in the destination directory, then rename
//! - **Staged publish**: build a whole directory aside, then swap it into place
//!
//! # Architecture
//!
//! ```text
//! unasync-io/src/
//! ├── lib.rs      # Re-exports (this file)
//! ├── error.rs    # IoError enum
//! ├── detect.rs   # Binary detection & decoding
//! ├── read.rs     # Source reads
//! ├── write.rs    # Atomic single-file writes
//! └── staging.rs  # StagedDir (write aside, publish by rename)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use unasync_io::{read_source, StagedDir};
//!
//! let text = read_source("src/tideline/client.py", 1024 * 1024)?;
//! let mut staged = StagedDir::create("src/tideline/.mirror.staging")?;
//! staged.write("client.py", &text)?;
//! staged.publish("src/tideline/_sync")?;
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod detect;
mod error;
mod read;
mod staging;
mod write;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use detect::{decode_source, is_binary};
pub use error::IoError;
pub use read::read_source;
pub use staging::StagedDir;
pub use write::write_atomic;

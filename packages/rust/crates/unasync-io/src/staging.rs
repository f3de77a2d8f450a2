//! Staged directory publishing.
//!
//! A `StagedDir` collects a complete output tree next to its final location
//! and swaps it in with directory renames. Dropping an unpublished stage
//! removes it, so a failed run never touches the live directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::IoError;
use crate::write::write_atomic;

/// A directory being filled before it replaces a live directory.
///
/// Publishing swaps whole directories: anything in the live directory that
/// was not written into the stage is gone afterwards.
#[derive(Debug)]
pub struct StagedDir {
    root: PathBuf,
    files: usize,
    published: bool,
}

impl StagedDir {
    /// Create an empty staging directory, clearing leftovers from an earlier
    /// interrupted run.
    ///
    /// # Errors
    /// Propagates filesystem failures.
    pub fn create<P: AsRef<Path>>(root: P) -> Result<Self, IoError> {
        let root = root.as_ref().to_path_buf();
        if root.exists() {
            tracing::debug!(path = %root.display(), "removing stale staging directory");
            fs::remove_dir_all(&root)?;
        }
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            files: 0,
            published: false,
        })
    }

    /// Staging directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Number of files written so far.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files
    }

    /// Write a file at `relative` inside the stage.
    ///
    /// # Errors
    /// Propagates filesystem failures.
    pub fn write<P: AsRef<Path>>(&mut self, relative: P, contents: &str) -> Result<(), IoError> {
        write_atomic(self.root.join(relative), contents)?;
        self.files += 1;
        Ok(())
    }

    /// Replace `target` with the staged tree.
    ///
    /// The live directory is moved to a sibling backup first and restored if
    /// the final rename fails. Files only present in `target` are not carried
    /// over.
    ///
    /// # Errors
    /// Propagates filesystem failures; `target` is left as it was on error.
    pub fn publish<P: AsRef<Path>>(mut self, target: P) -> Result<(), IoError> {
        let target = target.as_ref();
        let name = target
            .file_name()
            .ok_or_else(|| IoError::NoParent(target.to_string_lossy().to_string()))?;
        let backup = target.with_file_name(format!(".{}.old", name.to_string_lossy()));

        if backup.exists() {
            fs::remove_dir_all(&backup)?;
        }
        let had_previous = target.exists();
        if had_previous {
            fs::rename(target, &backup)?;
        }

        if let Err(e) = fs::rename(&self.root, target) {
            if had_previous {
                fs::rename(&backup, target)?;
            }
            return Err(IoError::System(e));
        }
        self.published = true;

        if had_previous {
            fs::remove_dir_all(&backup)?;
        }
        tracing::debug!(target = %target.display(), files = self.files, "published staged directory");
        Ok(())
    }
}

impl Drop for StagedDir {
    fn drop(&mut self) {
        if !self.published && self.root.exists() {
            if let Err(e) = fs::remove_dir_all(&self.root) {
                tracing::warn!(path = %self.root.display(), error = %e, "failed to remove staging directory");
            }
        }
    }
}

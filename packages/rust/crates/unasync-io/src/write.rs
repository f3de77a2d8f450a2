//! Atomic single-file writes.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::IoError;

/// Write `contents` to `path` so readers never observe a partial file.
///
/// The data goes to a temporary file in the destination directory first and
/// is then renamed over `path`. Missing parent directories are created.
///
/// # Errors
/// Returns `IoError::NoParent` for a path without a parent and
/// `IoError::System` for any filesystem failure.
pub fn write_atomic<P: AsRef<Path>>(path: P, contents: &str) -> Result<(), IoError> {
    let path = path.as_ref();
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| IoError::NoParent(path.to_string_lossy().to_string()))?;
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| IoError::System(e.error))?;

    tracing::trace!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("a").join("b").join("out.py");
        write_atomic(&p, "x = 1\n").unwrap();
        assert_eq!(fs::read_to_string(&p).unwrap(), "x = 1\n");
    }

    #[test]
    fn test_write_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("out.py");
        fs::write(&p, "old").unwrap();
        write_atomic(&p, "new").unwrap();
        assert_eq!(fs::read_to_string(&p).unwrap(), "new");
        // No temp files left next to the target
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}

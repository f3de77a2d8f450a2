//! Source file reads.

use std::fs;
use std::io::Read;
use std::path::Path;

use crate::detect::decode_source;
use crate::error::IoError;

/// Read a source file with size, binary and encoding checks.
///
/// # Arguments
/// * `path` - Path to the file
/// * `max_bytes` - Maximum file size in bytes
///
/// # Errors
/// Returns `IoError::NotFound` when the path cannot be stat'ed, `TooLarge`
/// above `max_bytes`, and the decoding errors of [`decode_source`].
pub fn read_source<P: AsRef<Path>>(path: P, max_bytes: u64) -> Result<String, IoError> {
    let path = path.as_ref();
    let origin = path.to_string_lossy().to_string();

    let metadata = fs::metadata(path).map_err(|_| IoError::NotFound(origin.clone()))?;
    if metadata.len() > max_bytes {
        return Err(IoError::TooLarge {
            path: origin,
            size: metadata.len(),
            limit: max_bytes,
        });
    }

    let mut file = fs::File::open(path)?;
    let mut buffer = Vec::with_capacity(usize::try_from(metadata.len()).unwrap_or_default());
    file.read_to_end(&mut buffer)?;

    decode_source(buffer, &origin)
}

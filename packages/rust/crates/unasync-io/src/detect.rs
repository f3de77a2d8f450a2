//! Binary detection and source decoding.

use memchr::memchr;

use crate::error::IoError;

/// Quick binary detection - checks the first 8KB for NULL bytes.
#[must_use]
pub fn is_binary(buffer: &[u8]) -> bool {
    let check_len = std::cmp::min(buffer.len(), 8192);
    memchr(0, &buffer[..check_len]).is_some()
}

/// Decode a Python source buffer.
///
/// Unlike a lossy text read, invalid UTF-8 is an error: a replacement
/// character written into the mirror would silently change program text.
///
/// # Errors
/// `IoError::BinaryFile` on NULL bytes, `IoError::Encoding` on invalid UTF-8.
pub fn decode_source(buffer: Vec<u8>, origin: &str) -> Result<String, IoError> {
    if is_binary(&buffer) {
        return Err(IoError::BinaryFile(origin.to_string()));
    }
    String::from_utf8(buffer).map_err(|_| IoError::Encoding(origin.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_not_binary() {
        assert!(!is_binary(b"async def main():\n    pass\n"));
    }

    #[test]
    fn test_null_byte_is_binary() {
        assert!(is_binary(b"abc\x00def"));
    }

    #[test]
    fn test_null_after_window_is_ignored() {
        let mut buffer = vec![b'a'; 9000];
        buffer.push(0);
        assert!(!is_binary(&buffer));
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let result = decode_source(vec![b'x', 0xff, 0xfe], "bad.py");
        assert!(matches!(result, Err(IoError::Encoding(p)) if p == "bad.py"));
    }
}

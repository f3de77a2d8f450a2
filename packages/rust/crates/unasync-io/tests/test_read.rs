//! Tests for source reads.

use std::io::Write;
use tempfile::TempDir;

use unasync_io::{IoError, read_source};

#[test]
fn test_read_utf8_source() {
    let dir = TempDir::new().unwrap();
    let p = dir.path().join("client.py");
    std::fs::write(&p, "# AUTO-GENERATED — do not edit.\n").unwrap();
    assert_eq!(
        read_source(&p, 1024).unwrap(),
        "# AUTO-GENERATED — do not edit.\n"
    );
}

#[test]
fn test_binary_source_rejected() {
    let dir = TempDir::new().unwrap();
    let p = dir.path().join("blob.py");
    let mut file = std::fs::File::create(&p).unwrap();
    file.write_all(b"\x00\x01\x02\x03").unwrap();
    assert!(matches!(read_source(&p, 1024), Err(IoError::BinaryFile(_))));
}

#[test]
fn test_missing_source() {
    let result = read_source("/nonexistent/client.py", 1024);
    assert!(matches!(result, Err(IoError::NotFound(_))));
}

//! Tests for staged directory publishing.

use std::fs;

use tempfile::TempDir;
use unasync_io::StagedDir;

#[test]
fn test_publish_into_empty_target() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("_sync");

    let mut staged = StagedDir::create(dir.path().join(".stage")).unwrap();
    staged.write("client.py", "x = 1\n").unwrap();
    staged.write("resources/companies.py", "y = 2\n").unwrap();
    assert_eq!(staged.file_count(), 2);
    staged.publish(&target).unwrap();

    assert_eq!(fs::read_to_string(target.join("client.py")).unwrap(), "x = 1\n");
    assert_eq!(
        fs::read_to_string(target.join("resources/companies.py")).unwrap(),
        "y = 2\n"
    );
    assert!(!dir.path().join(".stage").exists());
}

#[test]
fn test_publish_replaces_previous_tree() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("_sync");
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("stale.py"), "old\n").unwrap();

    let mut staged = StagedDir::create(dir.path().join(".stage")).unwrap();
    staged.write("client.py", "new\n").unwrap();
    staged.publish(&target).unwrap();

    assert!(!target.join("stale.py").exists());
    assert!(target.join("client.py").exists());
    assert!(!dir.path().join("._sync.old").exists());
}

#[test]
fn test_dropped_stage_is_removed_and_target_untouched() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("_sync");
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("client.py"), "live\n").unwrap();

    {
        let mut staged = StagedDir::create(dir.path().join(".stage")).unwrap();
        staged.write("client.py", "half\n").unwrap();
    }

    assert!(!dir.path().join(".stage").exists());
    assert_eq!(fs::read_to_string(target.join("client.py")).unwrap(), "live\n");
}

#[test]
fn test_create_clears_leftover_stage() {
    let dir = TempDir::new().unwrap();
    let stage = dir.path().join(".stage");
    fs::create_dir_all(&stage).unwrap();
    fs::write(stage.join("leftover.py"), "x").unwrap();

    let staged = StagedDir::create(&stage).unwrap();
    assert_eq!(fs::read_dir(staged.path()).unwrap().count(), 0);
}

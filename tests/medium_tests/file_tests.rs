//! Tests for FileMedium
//!
//! These tests verify:
//! - A missing image starts erased
//! - Writes stay in the cache until commit
//! - Commit persists the image atomically
//! - Access before init fails
//! - The staging file never collides with the image or its siblings

use std::path::PathBuf;
use nvblock::medium::{FileMedium, Medium, ERASED_BYTE};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_image() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("eeprom.bin");
    (temp_dir, path)
}

// =============================================================================
// Init Tests
// =============================================================================

#[test]
fn test_missing_image_reads_erased() {
    let (_temp, path) = setup_temp_image();
    let mut medium = FileMedium::new(&path, 8);

    medium.init();

    let mut buf = [0u8; 8];
    assert!(medium.is_ready());
    assert_eq!(medium.read(&mut buf, 0), 8);
    assert!(buf.iter().all(|&b| b == ERASED_BYTE));
    assert!(!path.exists());
}

#[test]
fn test_short_image_padded_with_erased_bytes() {
    let (_temp, path) = setup_temp_image();
    std::fs::write(&path, [1u8, 2]).unwrap();

    let mut medium = FileMedium::new(&path, 4);
    medium.init();

    let mut buf = [0u8; 4];
    medium.read(&mut buf, 0);
    assert_eq!(buf, [1, 2, ERASED_BYTE, ERASED_BYTE]);
}

#[test]
fn test_access_before_init_fails() {
    let (_temp, path) = setup_temp_image();
    let mut medium = FileMedium::new(&path, 4);

    let mut buf = [0u8; 2];
    assert_eq!(medium.read(&mut buf, 0), 0);
    assert_eq!(medium.write(&[1], 0), 0);
    assert!(!medium.commit());
}

// =============================================================================
// Commit Tests
// =============================================================================

#[test]
fn test_commit_persists_image() {
    let (_temp, path) = setup_temp_image();

    let mut medium = FileMedium::new(&path, 4);
    medium.init();
    assert_eq!(medium.write(&[7, 8], 1), 2);
    assert!(medium.is_dirty());
    assert!(medium.commit());
    assert!(!medium.is_dirty());

    let image = std::fs::read(&path).unwrap();
    assert_eq!(image, vec![ERASED_BYTE, 7, 8, ERASED_BYTE]);
    assert!(!path.with_file_name("eeprom.bin.tmp").exists());
}

#[test]
fn test_uncommitted_writes_are_lost_on_reload() {
    let (_temp, path) = setup_temp_image();

    {
        let mut medium = FileMedium::new(&path, 2);
        medium.init();
        medium.write(&[1, 1], 0);
        medium.commit();
        medium.write(&[2, 2], 0);
    }

    let mut medium = FileMedium::new(&path, 2);
    medium.init();
    let mut buf = [0u8; 2];
    medium.read(&mut buf, 0);
    assert_eq!(buf, [1, 1]);
}

#[test]
fn test_identical_write_does_not_dirty() {
    let (_temp, path) = setup_temp_image();

    let mut medium = FileMedium::new(&path, 2);
    medium.init();
    medium.write(&[ERASED_BYTE, ERASED_BYTE], 0);

    assert!(!medium.is_dirty());
    assert!(medium.commit());
    assert!(!path.exists());
}

#[test]
fn test_commit_leaves_sibling_tmp_file_alone() {
    let (temp, path) = setup_temp_image();
    let sibling = temp.path().join("eeprom.tmp");
    std::fs::write(&sibling, b"keep").unwrap();

    let mut medium = FileMedium::new(&path, 2);
    medium.init();
    medium.write(&[1, 2], 0);
    assert!(medium.commit());

    assert_eq!(std::fs::read(&sibling).unwrap(), b"keep");
    assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2]);
}

#[test]
fn test_commit_image_named_tmp() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("image.tmp");

    let mut medium = FileMedium::new(&path, 2);
    medium.init();
    medium.write(&[3, 4], 0);
    assert!(medium.commit());

    assert_eq!(std::fs::read(&path).unwrap(), vec![3, 4]);
    assert!(!temp.path().join("image.tmp.tmp").exists());
}

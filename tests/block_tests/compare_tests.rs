//! Tests for the guarded byte primitives
//!
//! These tests verify:
//! - compare_bytes reports Equal only for valid, matching input
//! - copy_bytes copies only for valid input
//! - Absent buffers, non-positive sizes and oversized requests are rejected

use nvblock::{compare_bytes, copy_bytes, DataCompare};

// =============================================================================
// Compare Tests
// =============================================================================

#[test]
fn test_compare_equal_buffers() {
    let a = [1u8, 2, 3, 4];
    let b = [1u8, 2, 3, 4];

    assert_eq!(compare_bytes(Some(&a[..]), Some(&b[..]), 4), DataCompare::Equal);
}

#[test]
fn test_compare_different_buffers() {
    let a = [1u8, 2, 3, 4];
    let b = [1u8, 2, 3, 5];

    assert_eq!(compare_bytes(Some(&a[..]), Some(&b[..]), 4), DataCompare::NotEqual);
}

#[test]
fn test_compare_prefix_only() {
    let a = [1u8, 2, 3, 4];
    let b = [1u8, 2, 9, 9];

    assert!(compare_bytes(Some(&a[..]), Some(&b[..]), 2).is_equal());
}

#[test]
fn test_compare_absent_buffer() {
    let a = [0u8; 4];

    assert_eq!(compare_bytes(None, Some(&a[..]), 4), DataCompare::NotEqual);
    assert_eq!(compare_bytes(Some(&a[..]), None, 4), DataCompare::NotEqual);
    assert_eq!(compare_bytes(None, None, 4), DataCompare::NotEqual);
}

#[test]
fn test_compare_absent_buffer_any_size() {
    let a = [0u8; 4];

    for size in [0, -1, isize::MIN, 1, isize::MAX] {
        assert_eq!(compare_bytes(None, Some(&a[..]), size), DataCompare::NotEqual);
        assert_eq!(compare_bytes(Some(&a[..]), None, size), DataCompare::NotEqual);
        assert_eq!(compare_bytes(None, None, size), DataCompare::NotEqual);
    }
}

#[test]
fn test_compare_non_positive_size() {
    let a = [0u8; 4];

    assert_eq!(compare_bytes(Some(&a[..]), Some(&a[..]), 0), DataCompare::NotEqual);
    assert_eq!(compare_bytes(Some(&a[..]), Some(&a[..]), -1), DataCompare::NotEqual);
}

#[test]
fn test_compare_size_exceeds_buffer() {
    let a = [0u8; 4];

    assert_eq!(compare_bytes(Some(&a[..]), Some(&a[..]), 5), DataCompare::NotEqual);
}

// =============================================================================
// Copy Tests
// =============================================================================

#[test]
fn test_copy_valid() {
    let src = [7u8, 8, 9];
    let mut dst = [0u8; 3];

    assert!(copy_bytes(Some(&src[..]), Some(&mut dst[..]), 3));
    assert_eq!(dst, src);
}

#[test]
fn test_copy_partial() {
    let src = [7u8, 8, 9];
    let mut dst = [0u8; 3];

    assert!(copy_bytes(Some(&src[..]), Some(&mut dst[..]), 2));
    assert_eq!(dst, [7, 8, 0]);
}

#[test]
fn test_copy_absent_buffers() {
    let src = [1u8; 2];
    let mut dst = [0u8; 2];

    assert!(!copy_bytes(None, Some(&mut dst[..]), 2));
    assert!(!copy_bytes(Some(&src[..]), None, 2));
    assert_eq!(dst, [0, 0]);
}

#[test]
fn test_copy_absent_buffers_any_size() {
    let src = [1u8; 2];
    let mut dst = [0u8; 2];

    for size in [0, -1, isize::MIN, 2, isize::MAX] {
        assert!(!copy_bytes(None, Some(&mut dst[..]), size));
        assert!(!copy_bytes(Some(&src[..]), None, size));
        assert!(!copy_bytes(None, None, size));
    }
    assert_eq!(dst, [0, 0]);
}

#[test]
fn test_copy_non_positive_size_leaves_destination() {
    let src = [1u8; 2];
    let mut dst = [0u8; 2];

    assert!(!copy_bytes(Some(&src[..]), Some(&mut dst[..]), 0));
    assert!(!copy_bytes(Some(&src[..]), Some(&mut dst[..]), -1));
    assert_eq!(dst, [0, 0]);
}

#[test]
fn test_copy_size_exceeds_buffer() {
    let src = [1u8; 2];
    let mut dst = [0u8; 4];

    assert!(!copy_bytes(Some(&src[..]), Some(&mut dst[..]), 3));
    assert_eq!(dst, [0; 4]);
}

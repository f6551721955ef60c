//! Tests for Version
//!
//! These tests verify:
//! - Packing into and out of the little-endian u32
//! - Ordering by packed value
//! - Parsing and display

use nvblock::{NvError, Version};

// =============================================================================
// Packing Tests
// =============================================================================

#[test]
fn test_packed_byte_order() {
    let version = Version::new(1, 2, 3);

    assert_eq!(version.to_le_bytes(), [3, 2, 1, 0]);
    assert_eq!(version.as_u32(), 0x0001_0203);
}

#[test]
fn test_from_u32_restores_fields() {
    let version = Version::from_u32(0x0403_0201);

    assert_eq!(version.patch, 1);
    assert_eq!(version.minor, 2);
    assert_eq!(version.major, 3);
    assert_eq!(version.reserved, 4);
    assert_eq!(Version::from_le_bytes([1, 2, 3, 4]), version);
}

#[test]
fn test_zero_is_default() {
    assert_eq!(Version::default(), Version::ZERO);
    assert_eq!(Version::ZERO.as_u32(), 0);
}

// =============================================================================
// Ordering Tests
// =============================================================================

#[test]
fn test_major_dominates_minor_and_patch() {
    assert!(Version::new(2, 0, 0) > Version::new(1, 255, 255));
    assert!(Version::new(1, 1, 0) > Version::new(1, 0, 9));
    assert!(Version::new(1, 0, 1) > Version::new(1, 0, 0));
}

#[test]
fn test_reserved_byte_dominates() {
    let mut flagged = Version::new(0, 0, 1);
    flagged.reserved = 1;

    assert!(flagged > Version::new(9, 9, 9));
}

#[test]
fn test_equal_versions() {
    assert_eq!(Version::new(1, 2, 3), Version::from((1, 2, 3)));
    assert!(Version::new(1, 2, 3) <= Version::new(1, 2, 3));
}

// =============================================================================
// Parse / Display Tests
// =============================================================================

#[test]
fn test_parse_and_display() {
    let version: Version = "1.2.3".parse().unwrap();

    assert_eq!(version, Version::new(1, 2, 3));
    assert_eq!(version.to_string(), "1.2.3");
}

#[test]
fn test_parse_rejects_malformed() {
    for input in ["1.2", "1.2.3.4", "a.b.c", "1.2.256", ""] {
        let result: Result<Version, NvError> = input.parse();
        assert!(matches!(result, Err(NvError::InvalidVersion(_))), "input {:?}", input);
    }
}

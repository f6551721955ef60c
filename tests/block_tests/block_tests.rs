//! Tests for Block, BlockParams and Header
//!
//! These tests verify:
//! - Block construction and length checks
//! - Typed values through bincode
//! - Params record encoding with and without the CRC field
//! - Header decoding of blank and garbage payloads

use nvblock::{
    Block, BlockParams, CrcKind, DataSource, Header, Layout, NvError, Status, Version, WritePolicy,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Calibration {
    gain: u16,
    offset: i16,
    enabled: bool,
}

// =============================================================================
// Construction Tests
// =============================================================================

#[test]
fn test_new_block_has_no_mirror_or_default() {
    let block = Block::new("speed", vec![1, 2, 3]);

    assert_eq!(block.key(), "speed");
    assert_eq!(block.len(), 3);
    assert_eq!(block.working(), &[1, 2, 3]);
    assert!(block.mirror().is_none());
    assert!(block.default_data().is_none());
    assert_eq!(block.status(), Status::Uninit);
    assert_eq!(block.write_policy(), WritePolicy::NotConfigured);
    assert!(!block.params_dirty());
}

#[test]
fn test_with_default_starts_from_default() {
    let block = Block::with_default("mode", vec![9, 9]);

    assert_eq!(block.working(), &[9, 9]);
    assert_eq!(block.data(DataSource::Default), Some(&[9u8, 9][..]));
    assert_eq!(block.data(DataSource::Mirror), None);
}

#[test]
fn test_with_data_rejects_length_mismatch() {
    let result = Block::with_data("bad", vec![0; 4], vec![0; 3]);

    assert!(matches!(
        result,
        Err(NvError::LengthMismatch { expected: 4, actual: 3, .. })
    ));
}

#[test]
fn test_zero_length_block_is_empty() {
    let block = Block::zeroed("inert", 0);

    assert!(block.is_empty());
}

#[test]
fn test_builder_sets_params() {
    let block = Block::zeroed("log", 8)
        .with_write_policy(WritePolicy::Cyclic)
        .with_cycle_time(500)
        .with_crc(CrcKind::Crc32);

    assert_eq!(block.write_policy(), WritePolicy::Cyclic);
    assert_eq!(block.cycle_time(), 500);
    assert_eq!(block.crc(), Some(CrcKind::Crc32));
}

#[test]
fn test_content_eq_ignores_key() {
    let a = Block::with_default("a", vec![1, 2]);
    let b = Block::with_default("b", vec![1, 2]);
    let c = Block::with_default("c", vec![1, 3]);

    assert!(a.content_eq(&b));
    assert!(!a.content_eq(&c));
}

// =============================================================================
// Typed Value Tests
// =============================================================================

#[test]
fn test_from_value_roundtrip() {
    let value = Calibration { gain: 1200, offset: -5, enabled: true };
    let default = Calibration { gain: 1000, offset: 0, enabled: false };

    let block = Block::from_value("cal", &value, Some(&default)).unwrap();

    assert_eq!(block.len(), 5);
    assert_eq!(block.value::<Calibration>().unwrap(), value);
    assert!(block.default_data().is_some());
}

#[test]
fn test_from_value_without_default() {
    let block = Block::from_value("counter", &42u32, None).unwrap();

    assert_eq!(block.working(), &42u32.to_le_bytes());
    assert!(block.default_data().is_none());
}

// =============================================================================
// Params Encoding Tests
// =============================================================================

#[test]
fn test_params_size_without_crc() {
    let params = BlockParams {
        status: Status::Ok,
        write_policy: WritePolicy::OnChange,
        crc: None,
        cycle_time: 100,
    };

    let encoded = params.encode(Layout::new(false));

    assert_eq!(encoded.len(), 12);
    assert_eq!(&encoded[0..4], &0x33u32.to_le_bytes());
    assert_eq!(&encoded[4..8], &2u32.to_le_bytes());
    assert_eq!(&encoded[8..12], &100u32.to_le_bytes());
    assert_eq!(BlockParams::decode(&encoded, Layout::new(false)), Some(params));
}

#[test]
fn test_params_size_with_crc() {
    let layout = Layout::new(true);
    let params = BlockParams {
        status: Status::NotOk,
        write_policy: WritePolicy::Cyclic,
        crc: Some(CrcKind::Crc16),
        cycle_time: 7,
    };

    let encoded = params.encode(layout);

    assert_eq!(encoded.len(), 16);
    assert_eq!(&encoded[8..12], &3u32.to_le_bytes());
    assert_eq!(BlockParams::decode(&encoded, layout), Some(params));
}

#[test]
fn test_params_decode_rejects_erased_bytes() {
    let erased = [0xFFu8; 12];

    assert_eq!(BlockParams::decode(&erased, Layout::new(false)), None);
}

#[test]
fn test_params_decode_rejects_short_buffer() {
    assert_eq!(BlockParams::decode(&[0x33, 0, 0, 0], Layout::new(false)), None);
}

// =============================================================================
// Header Tests
// =============================================================================

#[test]
fn test_header_encode_decode() {
    let layout = Layout::new(true);
    let header = Header {
        version: Version::new(2, 1, 0),
        status: Status::Ok,
        crc: 0xDEAD_BEEF,
    };

    let encoded = header.encode(layout);

    assert_eq!(encoded.len(), layout.header_payload_size());
    assert_eq!(Header::decode(&encoded, layout), header);
    assert_eq!(header.trusted_version(), Version::new(2, 1, 0));
}

#[test]
fn test_header_without_crc_field_drops_crc() {
    let layout = Layout::new(false);
    let header = Header {
        version: Version::new(1, 0, 0),
        status: Status::Ok,
        crc: 5,
    };

    let decoded = Header::decode(&header.encode(layout), layout);

    assert_eq!(decoded.crc, 0);
    assert_eq!(decoded.version, Version::new(1, 0, 0));
}

#[test]
fn test_erased_header_is_untrusted() {
    let header = Header::decode(&[0xFF; 8], Layout::new(false));

    assert_eq!(header.status, Status::Uninit);
    assert_eq!(header.trusted_version(), Version::ZERO);
}

#[test]
fn test_header_not_ok_is_untrusted() {
    let header = Header {
        version: Version::new(3, 0, 0),
        status: Status::NotOk,
        crc: 0,
    };

    assert_eq!(header.trusted_version(), Version::ZERO);
}

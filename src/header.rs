//! Header payload
//!
//! The header is the reserved block at index 0. Its payload records the
//! schema version the medium was laid out for, a status marker, and (when the
//! layout carries CRC fields) the aggregate checksum of all tagged blocks.

use crate::block::Status;
use crate::layout::{Layout, FIELD_SIZE};
use crate::version::Version;

/// Key under which the manager registers the header block
pub const HEADER_KEY: &str = "__header__";

/// Index of the header block
pub const HEADER_INDEX: usize = 0;

/// Decoded header payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: Version,
    pub status: Status,
    pub crc: u32,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            version: Version::ZERO,
            status: Status::Uninit,
            crc: 0,
        }
    }
}

impl Header {
    /// Encode to `layout.header_payload_size()` bytes
    pub fn encode(&self, layout: Layout) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(layout.header_payload_size());
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&(self.status as u32).to_le_bytes());
        if layout.crc_field() {
            bytes.extend_from_slice(&self.crc.to_le_bytes());
        }
        bytes
    }

    /// Decode a header payload.
    ///
    /// Never fails: missing bytes read as zero and an unknown status marker
    /// reads as `Uninit`, which is exactly what a blank medium should look like.
    pub fn decode(bytes: &[u8], layout: Layout) -> Self {
        let field = |idx: usize| -> u32 {
            let mut raw = [0u8; FIELD_SIZE];
            if let Some(chunk) = bytes.get(idx * FIELD_SIZE..(idx + 1) * FIELD_SIZE) {
                raw.copy_from_slice(chunk);
            }
            u32::from_le_bytes(raw)
        };

        Self {
            version: Version::from_u32(field(0)),
            status: Status::from_u32(field(1)).unwrap_or(Status::Uninit),
            crc: if layout.crc_field() { field(2) } else { 0 },
        }
    }

    /// The version this header vouches for.
    ///
    /// Only a header marked `Ok` was written by a completed migration; any
    /// other marker means the version bytes are noise and read as 0.0.0.
    pub fn trusted_version(&self) -> Version {
        if self.status == Status::Ok {
            self.version
        } else {
            Version::ZERO
        }
    }
}

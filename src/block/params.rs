//! Block metadata record
//!
//! Stored on the medium directly after each block's payload.

use crate::layout::{Layout, FIELD_SIZE};

/// Status of a block, the header, or the manager as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Status {
    /// Verification exhausted its attempts, or a read-back was invalid
    Error = 0x00,
    /// Not verified yet, or a migration just finished
    Uninit = 0x11,
    /// A write failed to persist
    NotOk = 0x22,
    Ok = 0x33,
}

impl Status {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0x00 => Some(Status::Error),
            0x11 => Some(Status::Uninit),
            0x22 => Some(Status::NotOk),
            0x33 => Some(Status::Ok),
            _ => None,
        }
    }
}

/// When a block is eligible for writeback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum WritePolicy {
    /// Written only on shutdown, removal and migration
    NotConfigured = 0x00,
    /// Written (if changed) once per `cycle_time` milliseconds
    Cyclic = 0x01,
    /// Written on every tick in which it changed
    OnChange = 0x02,
    /// Written on shutdown
    OnShutdown = 0x03,
    /// Filter sentinel matching every block
    AllBlocks = 0x04,
}

impl WritePolicy {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0x00 => Some(WritePolicy::NotConfigured),
            0x01 => Some(WritePolicy::Cyclic),
            0x02 => Some(WritePolicy::OnChange),
            0x03 => Some(WritePolicy::OnShutdown),
            0x04 => Some(WritePolicy::AllBlocks),
            _ => None,
        }
    }
}

/// Checksum algorithm a block asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CrcKind {
    Crc8 = 0x01,
    Crc8H2F = 0x02,
    Crc16 = 0x03,
    Crc32 = 0x04,
}

impl CrcKind {
    /// On-medium tag; 0 means "no checksum"
    pub fn encode(kind: Option<CrcKind>) -> u32 {
        kind.map_or(0, |k| k as u32)
    }

    pub fn decode(tag: u32) -> Result<Option<CrcKind>, u32> {
        match tag {
            0x00 => Ok(None),
            0x01 => Ok(Some(CrcKind::Crc8)),
            0x02 => Ok(Some(CrcKind::Crc8H2F)),
            0x03 => Ok(Some(CrcKind::Crc16)),
            0x04 => Ok(Some(CrcKind::Crc32)),
            other => Err(other),
        }
    }
}

/// Per-block metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockParams {
    pub status: Status,
    pub write_policy: WritePolicy,
    pub crc: Option<CrcKind>,
    /// Period for `WritePolicy::Cyclic`, in milliseconds
    pub cycle_time: u32,
}

impl Default for BlockParams {
    fn default() -> Self {
        Self {
            status: Status::Uninit,
            write_policy: WritePolicy::NotConfigured,
            crc: None,
            cycle_time: 0,
        }
    }
}

impl BlockParams {
    /// Encode to `layout.params_size()` bytes
    pub fn encode(&self, layout: Layout) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(layout.params_size());
        bytes.extend_from_slice(&(self.status as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.write_policy as u32).to_le_bytes());
        if layout.crc_field() {
            bytes.extend_from_slice(&CrcKind::encode(self.crc).to_le_bytes());
        }
        bytes.extend_from_slice(&self.cycle_time.to_le_bytes());
        bytes
    }

    /// Decode a record read from the medium.
    ///
    /// Returns `None` when the buffer is short or any enum field holds an
    /// unknown value (blank or corrupted metadata).
    pub fn decode(bytes: &[u8], layout: Layout) -> Option<Self> {
        if bytes.len() < layout.params_size() {
            return None;
        }

        let mut fields = bytes[..layout.params_size()]
            .chunks_exact(FIELD_SIZE)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));

        let status = Status::from_u32(fields.next()?)?;
        let write_policy = WritePolicy::from_u32(fields.next()?)?;
        let crc = if layout.crc_field() {
            CrcKind::decode(fields.next()?).ok()?
        } else {
            None
        };
        let cycle_time = fields.next()?;

        Some(Self {
            status,
            write_policy,
            crc,
            cycle_time,
        })
    }

    /// Whether the configuration fields (everything except status) match
    pub(crate) fn same_config(&self, other: &BlockParams, layout: Layout) -> bool {
        self.write_policy == other.write_policy
            && self.cycle_time == other.cycle_time
            && (!layout.crc_field() || self.crc == other.crc)
    }
}

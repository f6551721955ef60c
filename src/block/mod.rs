//! Block Module
//!
//! One logical record mapped to a contiguous region of the medium.
//!
//! ## Buffers
//! - **working**: the application's live data
//! - **mirror**: what the manager believes is on the medium (`None` = unknown)
//! - **default**: factory fallback used by migration (`None` = zeros)
//!
//! All three share one length for the lifetime of the block. A block with
//! length 0 is inert and never read or written.

mod compare;
mod params;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{NvError, Result};
use crate::layout::Layout;

pub use compare::{compare_bytes, copy_bytes, DataCompare};
pub use params::{BlockParams, CrcKind, Status, WritePolicy};

/// Which of a block's buffers an operation reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Working,
    Mirror,
    Default,
}

/// A registered record
#[derive(Debug, Clone)]
pub struct Block {
    /// Identity used for lookup and removal
    key: String,
    working: Vec<u8>,
    mirror: Option<Vec<u8>>,
    default: Option<Vec<u8>>,
    params: BlockParams,
    /// Set when `params` differ from what is stored on the medium
    params_dirty: bool,
    /// Last time a `Cyclic` block was serviced (not persisted)
    last_cycle_ms: Option<u64>,
}

impl Block {
    /// Create a block from its initial working data, without a default
    pub fn new(key: impl Into<String>, working: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            working,
            mirror: None,
            default: None,
            params: BlockParams::default(),
            params_dirty: false,
            last_cycle_ms: None,
        }
    }

    /// Create a zero-filled block of `len` bytes
    pub fn zeroed(key: impl Into<String>, len: usize) -> Self {
        Self::new(key, vec![0; len])
    }

    /// Create a block whose working data starts as a copy of `default`
    pub fn with_default(key: impl Into<String>, default: Vec<u8>) -> Self {
        let mut block = Self::new(key, default.clone());
        block.default = Some(default);
        block
    }

    /// Create a block with distinct working and default data.
    ///
    /// Fails with `LengthMismatch` if the two buffers differ in length.
    pub fn with_data(key: impl Into<String>, working: Vec<u8>, default: Vec<u8>) -> Result<Self> {
        let key = key.into();
        if working.len() != default.len() {
            return Err(NvError::LengthMismatch {
                key,
                expected: working.len(),
                actual: default.len(),
            });
        }

        let mut block = Self::new(key, working);
        block.default = Some(default);
        Ok(block)
    }

    /// Create a block from a serde value, encoded with bincode.
    ///
    /// The block length is the encoded size of `value`, so only types with a
    /// fixed encoded size round-trip through `Manager::set_value`.
    pub fn from_value<T: Serialize>(
        key: impl Into<String>,
        value: &T,
        default: Option<&T>,
    ) -> Result<Self> {
        let working = bincode::serialize(value)?;
        match default {
            Some(default) => Self::with_data(key, working, bincode::serialize(default)?),
            None => Ok(Self::new(key, working)),
        }
    }

    // =========================================================================
    // Configuration (builder style)
    // =========================================================================

    pub fn with_write_policy(mut self, policy: WritePolicy) -> Self {
        self.params.write_policy = policy;
        self
    }

    /// Period for `WritePolicy::Cyclic`, in milliseconds
    pub fn with_cycle_time(mut self, cycle_time_ms: u32) -> Self {
        self.params.cycle_time = cycle_time_ms;
        self
    }

    /// Ask for a checksum of this block to be folded into the header CRC
    pub fn with_crc(mut self, kind: CrcKind) -> Self {
        self.params.crc = Some(kind);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.working.len()
    }

    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }

    pub fn working(&self) -> &[u8] {
        &self.working
    }

    /// Mutable view of the working data (fixed length)
    pub fn working_mut(&mut self) -> &mut [u8] {
        &mut self.working
    }

    pub fn mirror(&self) -> Option<&[u8]> {
        self.mirror.as_deref()
    }

    pub fn default_data(&self) -> Option<&[u8]> {
        self.default.as_deref()
    }

    /// The buffer selected by `source`, if present
    pub fn data(&self, source: DataSource) -> Option<&[u8]> {
        match source {
            DataSource::Working => Some(self.working.as_slice()),
            DataSource::Mirror => self.mirror.as_deref(),
            DataSource::Default => self.default.as_deref(),
        }
    }

    pub fn params(&self) -> &BlockParams {
        &self.params
    }

    pub fn status(&self) -> Status {
        self.params.status
    }

    pub fn write_policy(&self) -> WritePolicy {
        self.params.write_policy
    }

    pub fn crc(&self) -> Option<CrcKind> {
        self.params.crc
    }

    pub fn cycle_time(&self) -> u32 {
        self.params.cycle_time
    }

    pub fn params_dirty(&self) -> bool {
        self.params_dirty
    }

    /// Decode the working data as a bincode-encoded value
    pub fn value<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(bincode::deserialize(&self.working)?)
    }

    /// Deep comparison of working, mirror and default buffers.
    ///
    /// Content only: two blocks with different keys but identical bytes are
    /// equal here. Use keys or indices to look a block up.
    pub fn content_eq(&self, other: &Block) -> bool {
        self.working == other.working
            && self.mirror == other.mirror
            && self.default == other.default
    }

    // =========================================================================
    // Manager-side mutation
    // =========================================================================

    /// Record a new status; marks params dirty only when it changes
    pub(crate) fn set_status(&mut self, status: Status) {
        if self.params.status != status {
            self.params.status = status;
            self.params_dirty = true;
        }
    }

    pub(crate) fn mark_params_dirty(&mut self) {
        self.params_dirty = true;
    }

    pub(crate) fn clear_params_dirty(&mut self) {
        self.params_dirty = false;
    }

    /// Adopt the status read from the medium.
    ///
    /// Configuration fields (policy, crc tag, cycle time) always come from
    /// registration; if the stored copy disagrees the params become dirty so
    /// the next write refreshes them.
    pub(crate) fn load_params(&mut self, stored: BlockParams, layout: Layout) {
        self.params.status = stored.status;
        self.params_dirty = !self.params.same_config(&stored, layout);
    }

    /// Mirror buffer for a read, allocated zero-filled on first use
    pub(crate) fn mirror_buf(&mut self) -> &mut [u8] {
        let len = self.working.len();
        self.mirror.get_or_insert_with(|| vec![0; len])
    }

    /// Copy `source` into the mirror ahead of a write.
    ///
    /// An absent default stages zeros; an absent mirror cannot be its own
    /// source and fails.
    pub(crate) fn stage_mirror(&mut self, source: DataSource) -> bool {
        if source == DataSource::Mirror {
            return self.mirror.is_some();
        }

        let len = self.working.len();
        let mirror = self.mirror.get_or_insert_with(|| vec![0; len]);
        match source {
            DataSource::Default => match self.default.as_deref() {
                Some(default) => copy_bytes(Some(default), Some(mirror.as_mut_slice()), len as isize),
                None => {
                    mirror.fill(0);
                    true
                }
            },
            _ => copy_bytes(Some(self.working.as_slice()), Some(mirror.as_mut_slice()), len as isize),
        }
    }

    pub(crate) fn invalidate_mirror(&mut self) {
        self.mirror = None;
    }

    /// Put back a mirror taken before a write that never reached the medium
    pub(crate) fn restore_mirror(&mut self, mirror: Option<Vec<u8>>) {
        self.mirror = mirror;
    }

    /// Copy the mirror into the working buffer
    pub(crate) fn mirror_to_working(&mut self) -> bool {
        let len = self.working.len() as isize;
        copy_bytes(self.mirror.as_deref(), Some(self.working.as_mut_slice()), len)
    }

    /// Reset the working buffer to the default data (zeros if absent)
    pub(crate) fn restore_default(&mut self) {
        match self.default.as_deref() {
            Some(default) => self.working.copy_from_slice(default),
            None => self.working.fill(0),
        }
    }

    pub(crate) fn set_working(&mut self, data: Vec<u8>) -> Result<()> {
        if data.len() != self.working.len() {
            return Err(NvError::LengthMismatch {
                key: self.key.clone(),
                expected: self.working.len(),
                actual: data.len(),
            });
        }
        self.working = data;
        Ok(())
    }

    pub(crate) fn last_cycle_ms(&self) -> Option<u64> {
        self.last_cycle_ms
    }

    pub(crate) fn set_last_cycle_ms(&mut self, now_ms: u64) {
        self.last_cycle_ms = Some(now_ms);
    }
}

//! Manager Module
//!
//! Owns the ordered block sequence and drives the medium.
//!
//! ## Responsibilities
//! - Register blocks; the header is always index 0
//! - Derive every block's offset from registration order
//! - Verify or migrate the medium on startup
//! - Write back only blocks whose working data changed, then commit once
//!
//! ## Ownership
//! The manager is driven from a single context: `begin()` once, then `tick()`
//! and eventually `shutdown()` + `commit()`. Every mutating operation takes
//! `&mut self`; there is no shared state and nothing to lock.

mod io;
mod verify;

use serde::{de::DeserializeOwned, Serialize};

use crate::block::{Block, DataSource, Status, WritePolicy};
use crate::checksum::Checksum;
use crate::config::Config;
use crate::error::{NvError, Result};
use crate::header::{Header, HEADER_INDEX, HEADER_KEY};
use crate::layout::Layout;
use crate::medium::Medium;
use crate::version::Version;

pub use io::WriteReport;
use io::WriteMode;

/// Identifies a registered block for removal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRef<'a> {
    Index(usize),
    Key(&'a str),
}

impl From<usize> for BlockRef<'_> {
    fn from(index: usize) -> Self {
        BlockRef::Index(index)
    }
}

impl<'a> From<&'a str> for BlockRef<'a> {
    fn from(key: &'a str) -> Self {
        BlockRef::Key(key)
    }
}

/// Block-oriented record manager over a [`Medium`]
pub struct Manager<M: Medium> {
    /// Backing store
    medium: M,

    /// Registered blocks; index 0 is the header
    blocks: Vec<Block>,

    /// Schema version the application expects on the medium
    expected_version: Version,

    /// Field sizes (fixed for the lifetime of the manager)
    layout: Layout,

    /// Verify passes made by `begin()`
    verify_attempts: u8,

    /// Outcome of the last `begin()`
    status: Status,

    /// Provider for blocks that declare a CRC tag
    checksum: Option<Box<dyn Checksum>>,
}

impl<M: Medium> Manager<M> {
    /// Create a manager over `medium`.
    ///
    /// Registers the header block, then every block in `config`.
    pub fn new(medium: M, config: Config) -> Result<Self> {
        let layout = config.layout();
        let header = Header::default().encode(layout);

        let mut manager = Self {
            medium,
            blocks: vec![Block::with_default(HEADER_KEY, header)],
            expected_version: config.expected_version,
            layout,
            verify_attempts: config.verify_attempts.max(1),
            status: Status::Uninit,
            checksum: None,
        };
        manager.add_config(config)?;

        Ok(manager)
    }

    /// Apply a configuration: expected version, verify attempts, and the
    /// config's blocks appended after those already registered.
    ///
    /// Layout options are fixed at construction and are not changed here.
    pub fn add_config(&mut self, config: Config) -> Result<()> {
        if config.layout() != self.layout {
            tracing::warn!("Layout options differ from construction; keeping the construction-time layout");
        }

        self.expected_version = config.expected_version;
        self.verify_attempts = config.verify_attempts.max(1);
        for block in config.blocks {
            self.add_block(block)?;
        }
        Ok(())
    }

    /// Install the checksum provider used for blocks with a CRC tag
    pub fn set_checksum(&mut self, provider: impl Checksum + 'static) {
        self.checksum = Some(Box::new(provider));
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Append a block.
    ///
    /// Returns the number of registered blocks, header included. Every later
    /// offset is derived on demand, so nothing else is recomputed here.
    pub fn add_block(&mut self, block: Block) -> Result<usize> {
        if self.index_of(block.key()).is_some() {
            return Err(NvError::DuplicateKey(block.key().to_string()));
        }

        tracing::debug!("New block '{}' ({} bytes)", block.key(), block.len());
        self.blocks.push(block);
        tracing::debug!("Block list size = {}", self.blocks.len());

        Ok(self.blocks.len())
    }

    /// Zero a block, write the zeros, and remove it from the sequence.
    ///
    /// Blocks after the removed one shift down and are rewritten (data and
    /// params) at their new offsets, whatever their write policy. With
    /// `erase_on_medium` the result is committed.
    pub fn remove_block<'a>(
        &mut self,
        target: impl Into<BlockRef<'a>>,
        erase_on_medium: bool,
    ) -> Result<()> {
        let index = self.resolve(target.into()).map_err(|e| {
            tracing::error!("Remove rejected: {}", e);
            e
        })?;

        self.blocks[index].working_mut().fill(0);
        self.write_entry(index, DataSource::Working);

        let removed = self.blocks.remove(index);
        tracing::debug!("Removed block '{}' from index {}", removed.key(), index);
        self.relocate_from(index);
        self.refresh_header_crc();

        if erase_on_medium && !self.medium.commit() {
            tracing::error!("Commit after removing '{}' failed", removed.key());
        }
        Ok(())
    }

    /// Zero and remove every application block, then commit once.
    ///
    /// The header stays registered. Returns the commit result.
    pub fn delete_all(&mut self) -> bool {
        for index in 1..self.blocks.len() {
            self.blocks[index].working_mut().fill(0);
            self.write_entry(index, DataSource::Working);
        }

        self.blocks.truncate(1);
        self.refresh_header_crc();
        self.medium.commit()
    }

    fn resolve(&self, target: BlockRef<'_>) -> Result<usize> {
        let index = match target {
            BlockRef::Index(index) => index,
            BlockRef::Key(key) => self
                .index_of(key)
                .ok_or_else(|| NvError::UnknownBlock(key.to_string()))?,
        };

        if index == HEADER_INDEX {
            return Err(NvError::ReservedIndex);
        }
        if index >= self.blocks.len() {
            return Err(NvError::IndexOutOfRange {
                index,
                len: self.blocks.len(),
            });
        }
        Ok(index)
    }

    /// Lay every block from `from` on down at its current offset.
    ///
    /// A block whose rewrite fails keeps an unknown mirror and dirty params,
    /// so an `OnChange` block is retried by the next `tick()`.
    fn relocate_from(&mut self, from: usize) -> WriteReport {
        let mut report = WriteReport::default();

        for index in from..self.blocks.len() {
            let block = &mut self.blocks[index];
            block.invalidate_mirror();
            block.mark_params_dirty();
            if block.is_empty() {
                continue;
            }
            self.write_block(index, DataSource::Working, WriteMode::Force, &mut report);
        }

        if report.failed > 0 {
            tracing::error!("{} shifted blocks could not be relocated", report.failed);
        }
        report
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Initialize the medium and bring the blocks in line with it.
    ///
    /// Reads the header, then runs verification up to `verify_attempts` times
    /// or until it reports `Ok`. A migration that never reads back cleanly is
    /// reported as `Error`; what to do about it is the caller's decision.
    pub fn begin(&mut self) -> Status {
        tracing::info!(
            "Starting: {} blocks, expected version {}",
            self.blocks.len() - 1,
            self.expected_version
        );

        self.medium.init();
        self.read_entry(HEADER_INDEX);

        let mut status = Status::Error;
        for attempt in 1..=self.verify_attempts {
            status = self.verify();
            tracing::debug!("Verify attempt {}: {:?}", attempt, status);
            if status == Status::Ok {
                break;
            }
        }

        if status == Status::Uninit {
            status = Status::Error;
        }

        self.status = status;
        status
    }

    /// Periodic writeback of `OnChange` blocks.
    ///
    /// Writes every changed block, then commits once if anything was written.
    pub fn tick(&mut self) -> WriteReport {
        let report = self.write_all(WritePolicy::OnChange, DataSource::Working, WriteMode::OnChange);
        self.finish_pass(report)
    }

    /// `tick()` plus every `Cyclic` block whose cycle time has elapsed.
    ///
    /// A cyclic block is serviced on its first call and then every
    /// `cycle_time` milliseconds; it is written only if it changed. A failed
    /// write is retried on the next call.
    pub fn tick_at(&mut self, now_ms: u64) -> WriteReport {
        let mut report =
            self.write_all(WritePolicy::OnChange, DataSource::Working, WriteMode::OnChange);

        let due: Vec<usize> = (1..self.blocks.len())
            .filter(|&index| {
                let block = &self.blocks[index];
                block.write_policy() == WritePolicy::Cyclic
                    && !block.is_empty()
                    && block
                        .last_cycle_ms()
                        .map_or(true, |last| now_ms.saturating_sub(last) >= block.cycle_time() as u64)
            })
            .collect();

        for index in due {
            let failed = report.failed;
            self.write_block(index, DataSource::Working, WriteMode::OnChange, &mut report);
            if report.failed == failed {
                self.blocks[index].set_last_cycle_ms(now_ms);
            }
        }

        self.finish_pass(report)
    }

    fn finish_pass(&mut self, mut report: WriteReport) -> WriteReport {
        if report.any_written() {
            self.refresh_header_crc();
            report.committed = self.medium.commit();
            if !report.committed {
                tracing::error!("Commit failed after writing {} blocks", report.written);
            }
        }
        report
    }

    /// Write every application block regardless of change state.
    ///
    /// Does not commit; call `commit()` afterwards.
    pub fn shutdown(&mut self) -> WriteReport {
        tracing::info!("Shutdown: writing all blocks");
        let report = self.write_all(WritePolicy::AllBlocks, DataSource::Working, WriteMode::Force);
        self.refresh_header_crc();
        report
    }

    /// Flush pending writes to durable storage
    pub fn commit(&mut self) -> bool {
        tracing::debug!("Commit to medium");
        self.medium.commit()
    }

    /// Reset every application block's working data to its default.
    ///
    /// Nothing is written here; the next writeback persists the change.
    pub fn restore_defaults(&mut self) {
        for block in self.blocks.iter_mut().skip(1) {
            block.restore_default();
        }
    }

    // =========================================================================
    // Block Access
    // =========================================================================

    /// Index of the block registered under `key`
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.blocks.iter().position(|block| block.key() == key)
    }

    /// Block at `index` (0 is the header)
    pub fn block(&self, index: usize) -> Option<&Block> {
        let block = self.blocks.get(index);
        if block.is_none() {
            tracing::error!("Invalid block index {}", index);
        }
        block
    }

    pub fn block_by_key(&self, key: &str) -> Option<&Block> {
        self.blocks.iter().find(|block| block.key() == key)
    }

    /// All registered blocks, header first
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Working data of the block registered under `key`
    pub fn working(&self, key: &str) -> Option<&[u8]> {
        self.block_by_key(key).map(Block::working)
    }

    /// Mutable working data of the block registered under `key`.
    ///
    /// The slice has the block's fixed length.
    pub fn working_mut(&mut self, key: &str) -> Option<&mut [u8]> {
        self.blocks
            .iter_mut()
            .find(|block| block.key() == key)
            .map(Block::working_mut)
    }

    /// Decode the working data of `key` as a bincode value
    pub fn value<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        self.block_by_key(key)
            .ok_or_else(|| NvError::UnknownBlock(key.to_string()))?
            .value()
    }

    /// Encode `value` into the working data of `key`.
    ///
    /// Fails with `LengthMismatch` if the encoding does not fill the block
    /// exactly.
    pub fn set_value<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let encoded = bincode::serialize(value)?;
        self.blocks
            .iter_mut()
            .find(|block| block.key() == key)
            .ok_or_else(|| NvError::UnknownBlock(key.to_string()))?
            .set_working(encoded)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Outcome of the last `begin()` (`Uninit` before the first)
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn expected_version(&self) -> Version {
        self.expected_version
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Number of registered blocks, header included
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    pub fn medium_mut(&mut self) -> &mut M {
        &mut self.medium
    }

    /// Consume the manager, returning the medium
    pub fn into_medium(self) -> M {
        self.medium
    }
}

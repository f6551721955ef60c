//! Unit read/write primitives
//!
//! Everything here addresses the medium through `offset_of`, so a block's
//! location is always derived from the current registration order.

use std::ops::AddAssign;

use crate::block::{compare_bytes, Block, BlockParams, DataCompare, DataSource, Status, WritePolicy};
use crate::medium::Medium;

use super::Manager;

/// Whether a writeback pass compares before writing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteMode {
    /// Skip blocks whose mirror already equals the source
    OnChange,
    /// Write every qualifying block
    Force,
}

/// Outcome of a writeback pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Blocks whose data reached the medium
    pub written: usize,
    /// Blocks skipped because nothing changed
    pub unchanged: usize,
    /// Blocks whose data write failed
    pub failed: usize,
    /// Whether the pass ended with a successful commit
    pub committed: bool,
}

impl WriteReport {
    pub fn any_written(&self) -> bool {
        self.written > 0
    }
}

impl AddAssign for WriteReport {
    fn add_assign(&mut self, other: WriteReport) {
        self.written += other.written;
        self.unchanged += other.unchanged;
        self.failed += other.failed;
        self.committed |= other.committed;
    }
}

/// Convert a byte range into a medium address.
///
/// The medium contract is 16-bit; anything past it is unaddressable.
fn address(offset: usize, len: usize) -> Option<u16> {
    let end = offset.checked_add(len)?;
    if len > u16::MAX as usize || end > u16::MAX as usize + 1 {
        tracing::error!(
            "Range {}..{} exceeds the 16-bit medium address space",
            offset,
            end
        );
        return None;
    }
    u16::try_from(offset).ok()
}

impl<M: Medium> Manager<M> {
    /// Byte offset of block `index` on the medium.
    ///
    /// Sum of `length + params_size` over all blocks before `index`; 0 for
    /// the header. Recomputed on every call. Indices past the end yield the
    /// total laid-out size.
    pub fn offset_of(&self, index: usize) -> usize {
        let offset = self
            .layout
            .offset_of(self.blocks.iter().map(Block::len), index);
        tracing::trace!("Offset of block {} = {}", index, offset);
        offset
    }

    /// Total number of medium bytes the current registration occupies
    pub fn total_size(&self) -> usize {
        self.offset_of(self.blocks.len())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Read block data into the mirror, then copy the mirror into working.
    ///
    /// A short read leaves the mirror unknown and the working data untouched.
    pub(crate) fn read_entry(&mut self, index: usize) -> bool {
        let len = match self.blocks.get(index) {
            Some(block) if !block.is_empty() => block.len(),
            Some(_) => return false,
            None => {
                tracing::error!("Read of unknown block index {}", index);
                return false;
            }
        };

        let offset = self.offset_of(index);
        tracing::debug!("Read block {} ({} bytes at {})", index, len, offset);

        let block = &mut self.blocks[index];
        let Some(addr) = address(offset, len) else {
            block.invalidate_mirror();
            return false;
        };

        let read = self.medium.read(block.mirror_buf(), addr) as usize;
        if read != len {
            tracing::error!("Block {}: short read ({} of {} bytes)", index, read, len);
            block.invalidate_mirror();
            return false;
        }

        block.mirror_to_working()
    }

    /// Read the params record that follows block `index`.
    ///
    /// Returns true when the record decodes and reports `Ok`.
    pub(crate) fn read_params(&mut self, index: usize) -> bool {
        let Some(len) = self.blocks.get(index).map(Block::len) else {
            tracing::error!("Params read of unknown block index {}", index);
            return false;
        };

        let size = self.layout.params_size();
        let offset = self.offset_of(index) + len;
        let Some(addr) = address(offset, size) else {
            return false;
        };

        let mut raw = vec![0u8; size];
        let read = self.medium.read(&mut raw, addr) as usize;

        let block = &mut self.blocks[index];
        if read != size {
            tracing::error!("Block {}: short params read ({} of {} bytes)", index, read, size);
            block.mark_params_dirty();
            return false;
        }

        match BlockParams::decode(&raw, self.layout) {
            Some(stored) => {
                block.load_params(stored, self.layout);
                if stored.status != Status::Ok {
                    tracing::debug!("Block {}: stored status {:?}", index, stored.status);
                }
                stored.status == Status::Ok
            }
            None => {
                tracing::warn!("Block {} ('{}'): params unreadable", index, block.key());
                block.mark_params_dirty();
                false
            }
        }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Copy `source` into the mirror and write the mirror to the medium.
    ///
    /// The block ends `Ok` on a full write and `NotOk` otherwise. A write that
    /// moved no bytes restores the mirror to what the medium still holds; a
    /// short write leaves it unknown.
    pub(crate) fn write_entry(&mut self, index: usize, source: DataSource) -> bool {
        let len = match self.blocks.get(index) {
            Some(block) if !block.is_empty() => block.len(),
            Some(_) => return false,
            None => {
                tracing::error!("Write of unknown block index {}", index);
                return false;
            }
        };

        let offset = self.offset_of(index);
        let block = &mut self.blocks[index];

        let persisted = block.mirror().map(<[u8]>::to_vec);
        let staged = block.stage_mirror(source);
        let written = match (staged, block.mirror(), address(offset, len)) {
            (true, Some(mirror), Some(addr)) => self.medium.write(mirror, addr) as usize,
            _ => {
                tracing::error!(
                    "Block {} ('{}'): nothing to write from {:?}",
                    index,
                    block.key(),
                    source
                );
                0
            }
        };

        if written == len {
            tracing::debug!("Block {}: {} bytes written at {}", index, len, offset);
            block.set_status(Status::Ok);
            true
        } else {
            tracing::error!("Block {}: write failed ({} of {} bytes)", index, written, len);
            if written == 0 {
                block.restore_mirror(persisted);
            } else {
                block.invalidate_mirror();
            }
            block.set_status(Status::NotOk);
            false
        }
    }

    /// Write the params record of block `index`, if it is dirty
    pub(crate) fn write_params(&mut self, index: usize) -> bool {
        let Some(block) = self.blocks.get(index) else {
            return false;
        };
        if !block.params_dirty() {
            return false;
        }

        let len = block.len();
        let raw = block.params().encode(self.layout);
        let offset = self.offset_of(index) + len;
        let Some(addr) = address(offset, raw.len()) else {
            return false;
        };

        let written = self.medium.write(&raw, addr) as usize;
        if written == raw.len() {
            tracing::debug!("Block {}: params updated", index);
            self.blocks[index].clear_params_dirty();
            true
        } else {
            tracing::error!("Block {}: params write failed", index);
            false
        }
    }

    /// Compare the mirror of block `index` with `source`
    pub(crate) fn compare_entry(&self, index: usize, source: DataSource) -> DataCompare {
        match self.blocks.get(index) {
            Some(block) => compare_bytes(block.mirror(), block.data(source), block.len() as isize),
            None => DataCompare::NotEqual,
        }
    }

    /// Write back every qualifying application block.
    ///
    /// A block qualifies when its policy equals `filter` or `filter` is
    /// `AllBlocks`. Params are written only after a successful data write.
    pub(crate) fn write_all(
        &mut self,
        filter: WritePolicy,
        source: DataSource,
        mode: WriteMode,
    ) -> WriteReport {
        let mut report = WriteReport::default();

        for index in 1..self.blocks.len() {
            let block = &self.blocks[index];
            if block.is_empty() {
                continue;
            }
            if filter != WritePolicy::AllBlocks && block.write_policy() != filter {
                continue;
            }
            self.write_block(index, source, mode, &mut report);
        }

        report
    }

    /// Write one block, tallying the outcome into `report`
    pub(crate) fn write_block(
        &mut self,
        index: usize,
        source: DataSource,
        mode: WriteMode,
        report: &mut WriteReport,
    ) {
        if mode == WriteMode::OnChange && self.compare_entry(index, source).is_equal() {
            report.unchanged += 1;
            return;
        }

        tracing::debug!("Block {}: differences found", index);
        if self.write_entry(index, source) {
            report.written += 1;
            self.write_params(index);
        } else {
            report.failed += 1;
        }
    }
}

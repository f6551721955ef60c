//! Checksum hook
//!
//! The manager never assumes an algorithm. Blocks declare a [`CrcKind`]; the
//! caller installs a provider that knows how to compute it. The header CRC
//! folds every tagged block's checksum over its mirror data (see [`aggregate`]).

use crate::block::{Block, CrcKind};

/// Computes a checksum of the requested kind
pub trait Checksum {
    /// Returns `None` if the provider does not support `kind`
    fn checksum(&self, kind: CrcKind, data: &[u8]) -> Option<u32>;
}

impl<F> Checksum for F
where
    F: Fn(CrcKind, &[u8]) -> Option<u32>,
{
    fn checksum(&self, kind: CrcKind, data: &[u8]) -> Option<u32> {
        self(kind, data)
    }
}

/// CRC-32 (IEEE) provider backed by crc32fast
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32;

impl Checksum for Crc32 {
    fn checksum(&self, kind: CrcKind, data: &[u8]) -> Option<u32> {
        match kind {
            CrcKind::Crc32 => Some(crc32fast::hash(data)),
            _ => None,
        }
    }
}

/// Fold the checksums of all tagged blocks' mirror data.
///
/// Each checksum is rotated left by the block's position in `blocks` before
/// it is XORed in, so two blocks swapping contents or taking the same
/// corruption still change the result. The fold is not a checksum of the
/// whole medium: untagged blocks and params records are not covered.
///
/// Blocks without a tag, without a mirror, or whose kind the provider does
/// not support are skipped.
pub fn aggregate<'a, I>(provider: &dyn Checksum, blocks: I) -> u32
where
    I: IntoIterator<Item = &'a Block>,
{
    blocks
        .into_iter()
        .enumerate()
        .filter_map(|(position, block)| {
            let kind = block.crc()?;
            let data = block.mirror()?;
            let value = provider.checksum(kind, data);
            if value.is_none() {
                tracing::warn!("Block '{}': checksum kind {:?} not supported", block.key(), kind);
            }
            value.map(|value| value.rotate_left(position as u32))
        })
        .fold(0, |acc, value| acc ^ value)
}

//! Medium Module
//!
//! The byte-addressable backing store the manager lays blocks onto.
//!
//! ## Contract
//! - `init()` is called once from `Manager::begin()`
//! - `read`/`write` move `buf.len()` bytes at `offset` and return how many
//!   bytes were actually transferred; a short count is a failure
//! - `commit()` flushes pending writes to durable storage
//!
//! Implementations report failure through counts and booleans, never panics.
//!
//! ## Implementations
//! - [`RamMedium`]: vector-backed, with fault injection and I/O counters
//! - [`FileMedium`]: EEPROM emulation over an image file (RAM cache + commit)

mod file;
mod ram;

pub use file::FileMedium;
pub use ram::{RamMedium, RamStats};

/// Erased state of EEPROM and NOR flash cells
pub const ERASED_BYTE: u8 = 0xFF;

/// A linear byte-addressable storage medium
pub trait Medium {
    /// One-time setup
    fn init(&mut self);

    /// Read `dst.len()` bytes starting at `offset`; returns bytes read
    fn read(&mut self, dst: &mut [u8], offset: u16) -> u16;

    /// Write `src` starting at `offset`; returns bytes written
    fn write(&mut self, src: &[u8], offset: u16) -> u16;

    /// Flush pending writes to durable storage
    fn commit(&mut self) -> bool {
        true
    }
}

impl<M: Medium + ?Sized> Medium for &mut M {
    fn init(&mut self) {
        (**self).init()
    }

    fn read(&mut self, dst: &mut [u8], offset: u16) -> u16 {
        (**self).read(dst, offset)
    }

    fn write(&mut self, src: &[u8], offset: u16) -> u16 {
        (**self).write(src, offset)
    }

    fn commit(&mut self) -> bool {
        (**self).commit()
    }
}

/// Clamp an access of `len` bytes at `offset` to a store of `capacity` bytes.
///
/// Returns the byte range that is actually addressable.
pub(crate) fn clamp_range(offset: u16, len: usize, capacity: usize) -> std::ops::Range<usize> {
    let start = (offset as usize).min(capacity);
    let end = start.saturating_add(len).min(capacity);
    start..end
}

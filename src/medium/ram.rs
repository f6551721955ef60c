//! RAM Medium
//!
//! Vector-backed medium with EEPROM-like commit semantics: writes land in
//! `cells`, `commit()` copies them into `durable`. Keeps I/O counters and can
//! be told to fail, which makes it the medium of choice for tests.

use super::{clamp_range, Medium, ERASED_BYTE};

/// I/O counters for a [`RamMedium`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RamStats {
    pub inits: u64,
    pub reads: u64,
    pub writes: u64,
    pub bytes_written: u64,
    pub commits: u64,
}

/// In-memory medium
#[derive(Debug, Clone)]
pub struct RamMedium {
    /// Working cells (what `read` sees)
    cells: Vec<u8>,
    /// Cells as of the last successful commit
    durable: Vec<u8>,
    stats: RamStats,
    fail_writes: bool,
    fail_commits: bool,
}

impl RamMedium {
    /// A medium of `capacity` erased (0xFF) bytes
    pub fn new(capacity: usize) -> Self {
        Self::filled(capacity, ERASED_BYTE)
    }

    /// A medium of `capacity` bytes set to `byte`
    pub fn filled(capacity: usize, byte: u8) -> Self {
        Self::from_bytes(vec![byte; capacity])
    }

    /// A medium whose committed contents are `bytes`
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            durable: bytes.clone(),
            cells: bytes,
            stats: RamStats::default(),
            fail_writes: false,
            fail_commits: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// Current cell contents, including uncommitted writes
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }

    /// Cell contents as of the last commit
    pub fn durable_bytes(&self) -> &[u8] {
        &self.durable
    }

    /// Simulate a power cycle: uncommitted writes are lost
    pub fn power_cycle(&mut self) {
        self.cells.copy_from_slice(&self.durable);
    }

    pub fn stats(&self) -> RamStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = RamStats::default();
    }

    /// Make every subsequent write report 0 bytes written
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Make every subsequent commit report failure
    pub fn set_fail_commits(&mut self, fail: bool) {
        self.fail_commits = fail;
    }
}

impl Medium for RamMedium {
    fn init(&mut self) {
        self.stats.inits += 1;
    }

    fn read(&mut self, dst: &mut [u8], offset: u16) -> u16 {
        self.stats.reads += 1;
        let range = clamp_range(offset, dst.len(), self.cells.len());
        let n = range.len();
        dst[..n].copy_from_slice(&self.cells[range]);
        n as u16
    }

    fn write(&mut self, src: &[u8], offset: u16) -> u16 {
        self.stats.writes += 1;
        if self.fail_writes {
            return 0;
        }

        let range = clamp_range(offset, src.len(), self.cells.len());
        let n = range.len();
        self.cells[range].copy_from_slice(&src[..n]);
        self.stats.bytes_written += n as u64;
        n as u16
    }

    fn commit(&mut self) -> bool {
        self.stats.commits += 1;
        if self.fail_commits {
            return false;
        }

        self.durable.copy_from_slice(&self.cells);
        true
    }
}

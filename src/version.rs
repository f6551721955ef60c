//! Schema version
//!
//! Four bytes `(patch, minor, major, reserved)` packed little-endian into a
//! `u32`. Ordering is the numeric order of the packed value, so the reserved
//! byte dominates when it is set.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{NvError, Result};

/// Schema version recorded in the header block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    pub patch: u8,
    pub minor: u8,
    pub major: u8,
    pub reserved: u8,
}

impl Version {
    /// Version 0.0.0, which every blank medium reports
    pub const ZERO: Version = Version::new(0, 0, 0);

    pub const fn new(major: u8, minor: u8, patch: u8) -> Self {
        Self {
            patch,
            minor,
            major,
            reserved: 0,
        }
    }

    /// Packed representation: patch is the low byte, reserved the high byte
    pub const fn as_u32(&self) -> u32 {
        u32::from_le_bytes([self.patch, self.minor, self.major, self.reserved])
    }

    pub const fn from_u32(value: u32) -> Self {
        let [patch, minor, major, reserved] = value.to_le_bytes();
        Self {
            patch,
            minor,
            major,
            reserved,
        }
    }

    pub const fn to_le_bytes(&self) -> [u8; 4] {
        [self.patch, self.minor, self.major, self.reserved]
    }

    pub const fn from_le_bytes(bytes: [u8; 4]) -> Self {
        Self::from_u32(u32::from_le_bytes(bytes))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_u32().cmp(&other.as_u32())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = NvError;

    /// Parse `"major.minor.patch"`; each part must fit in a byte
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(NvError::InvalidVersion(s.to_string()));
        }

        let mut numbers = [0u8; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| NvError::InvalidVersion(s.to_string()))?;
        }

        Ok(Version::new(numbers[0], numbers[1], numbers[2]))
    }
}

impl From<(u8, u8, u8)> for Version {
    fn from((major, minor, patch): (u8, u8, u8)) -> Self {
        Version::new(major, minor, patch)
    }
}

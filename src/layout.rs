//! On-medium layout
//!
//! ```text
//! offset 0
//! ┌──────────────────────────────┬──────────────────────────────┐
//! │ Header payload               │ Header params                │
//! │ version(4) status(4) [crc(4)]│                              │
//! ├──────────────────────────────┼──────────────────────────────┤
//! │ Block 1 payload (len bytes)  │ Block 1 params               │
//! ├──────────────────────────────┼──────────────────────────────┤
//! │ ...                          │ ...                          │
//! └──────────────────────────────┴──────────────────────────────┘
//!
//! params = status(4) | write_policy(4) | [crc_tag(4)] | cycle_time(4)
//! ```
//!
//! Every field is a little-endian `u32`. The bracketed CRC fields are present
//! only when the layout is built with `crc_field = true`.

/// Size of one encoded enum or integer field
pub const FIELD_SIZE: usize = 4;

/// Field sizes derived from the layout options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Layout {
    crc_field: bool,
}

impl Layout {
    pub const fn new(crc_field: bool) -> Self {
        Self { crc_field }
    }

    /// Whether the header carries a CRC and the params carry a CRC tag
    pub const fn crc_field(&self) -> bool {
        self.crc_field
    }

    /// Size of the metadata record that follows every payload
    pub const fn params_size(&self) -> usize {
        if self.crc_field {
            4 * FIELD_SIZE
        } else {
            3 * FIELD_SIZE
        }
    }

    /// Size of the header payload (version, status and optional crc)
    pub const fn header_payload_size(&self) -> usize {
        if self.crc_field {
            3 * FIELD_SIZE
        } else {
            2 * FIELD_SIZE
        }
    }

    /// Byte offset of entry `index` given the payload lengths of all entries
    /// in registration order (header first).
    ///
    /// Indices past the end yield the total laid-out size.
    pub fn offset_of<I>(&self, lengths: I, index: usize) -> usize
    where
        I: IntoIterator<Item = usize>,
    {
        lengths
            .into_iter()
            .take(index)
            .map(|len| len + self.params_size())
            .sum()
    }
}

//! Configuration for nvblock
//!
//! Centralized configuration with sensible defaults.

use crate::block::Block;
use crate::layout::Layout;
use crate::version::Version;

/// Main configuration for a Manager instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Schema Configuration
    // -------------------------------------------------------------------------
    /// Schema version the application expects on the medium.
    /// A medium recording an older version is reset to defaults.
    pub expected_version: Version,

    /// Application blocks, registered in order after the header
    pub blocks: Vec<Block>,

    // -------------------------------------------------------------------------
    // Startup Configuration
    // -------------------------------------------------------------------------
    /// How many verify passes `begin()` makes before giving up.
    /// Migration needs two: one to lay down defaults, one to read them back.
    pub verify_attempts: u8,

    // -------------------------------------------------------------------------
    // Layout Configuration
    // -------------------------------------------------------------------------
    /// Carry a CRC in the header and a CRC tag in every block's params.
    /// Changes the on-medium layout; must match across boots.
    pub crc_field: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            expected_version: Version::new(0, 0, 1),
            blocks: Vec::new(),
            verify_attempts: 2,
            crc_field: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Layout derived from the layout options
    pub fn layout(&self) -> Layout {
        Layout::new(self.crc_field)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the schema version the application expects
    pub fn expected_version(mut self, version: impl Into<Version>) -> Self {
        self.config.expected_version = version.into();
        self
    }

    /// Append one application block
    pub fn block(mut self, block: Block) -> Self {
        self.config.blocks.push(block);
        self
    }

    /// Append several application blocks
    pub fn blocks(mut self, blocks: impl IntoIterator<Item = Block>) -> Self {
        self.config.blocks.extend(blocks);
        self
    }

    /// Set the number of verify passes made by `begin()` (at least 1)
    pub fn verify_attempts(mut self, attempts: u8) -> Self {
        self.config.verify_attempts = attempts.max(1);
        self
    }

    /// Enable or disable CRC fields in the layout
    pub fn crc_field(mut self, enabled: bool) -> Self {
        self.config.crc_field = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

//! # nvblock
//!
//! A block-oriented record manager for EEPROM-style non-volatile memory:
//! - Fixed-size blocks laid out back to back in registration order
//! - RAM mirrors so only changed blocks are written back
//! - A versioned header that resets the medium to defaults on schema bumps
//! - Pluggable media and checksum providers
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Application                             │
//! │        (working buffers, set_value / working_mut)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Manager                                │
//! │        begin() → verify / migrate, tick(), shutdown()        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Blocks    │          │   Header    │
//!   │  (mirrors)  │          │  (version)  │
//!   └──────┬──────┘          └──────┬──────┘
//!          │                        │
//!          └───────────┬────────────┘
//!                      ▼
//!              ┌─────────────┐
//!              │   Medium    │
//!              │ (RAM/File)  │
//!              └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod version;
pub mod layout;
pub mod block;
pub mod header;
pub mod checksum;
pub mod medium;
pub mod manager;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{NvError, Result};
pub use config::Config;
pub use version::Version;
pub use layout::Layout;
pub use block::{compare_bytes, copy_bytes, Block, BlockParams, CrcKind, DataCompare, DataSource, Status, WritePolicy};
pub use header::Header;
pub use checksum::{Checksum, Crc32};
pub use medium::{FileMedium, Medium, RamMedium};
pub use manager::{BlockRef, Manager, WriteReport};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of nvblock
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

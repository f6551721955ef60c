//! Startup verification and schema migration
//!
//! ```text
//!             begin()
//!                │
//!        read header block
//!                │
//!      ┌─────────▼─────────┐   expected <= on medium   ┌──────────┐
//!      │      verify()     ├──────────────────────────►│ read_all │──► Ok / Error
//!      └─────────┬─────────┘                           └──────────┘
//!                │ expected > on medium
//!                ▼
//!   write defaults, bump header, commit ──► Uninit (verify again) / NotOk
//! ```

use crate::block::{DataSource, Status, WritePolicy};
use crate::checksum;
use crate::header::{Header, HEADER_INDEX};
use crate::medium::Medium;

use super::io::WriteMode;
use super::Manager;

impl<M: Medium> Manager<M> {
    /// Decoded header as currently held in RAM
    pub fn header(&self) -> Header {
        Header::decode(self.blocks[HEADER_INDEX].working(), self.layout)
    }

    fn set_header(&mut self, header: Header) {
        let encoded = header.encode(self.layout);
        if let Err(e) = self.blocks[HEADER_INDEX].set_working(encoded) {
            tracing::error!("Header update rejected: {}", e);
        }
    }

    /// One verification pass.
    ///
    /// Migrates iff the expected version is newer than the version the header
    /// vouches for; never on equality.
    pub(crate) fn verify(&mut self) -> Status {
        let header = self.header();
        let on_medium = header.trusted_version();

        tracing::debug!(
            "Expected version {}, medium version {} (header status {:?})",
            self.expected_version,
            on_medium,
            header.status
        );

        if self.expected_version <= on_medium {
            tracing::debug!("Medium version up to date");
            if self.read_all() {
                tracing::info!("Medium verified: {} blocks loaded", self.blocks.len() - 1);
                Status::Ok
            } else {
                tracing::error!("Medium verification failed");
                Status::Error
            }
        } else {
            self.migrate()
        }
    }

    /// Load every application block from the medium.
    ///
    /// Returns true when every non-inert block read fully with `Ok` params and
    /// the header CRC (if in use) matches the loaded data.
    pub(crate) fn read_all(&mut self) -> bool {
        let mut all_valid = true;

        for index in 1..self.blocks.len() {
            if self.blocks[index].is_empty() {
                continue;
            }

            let params_valid = self.read_params(index);
            let data_valid = self.read_entry(index);
            if !(params_valid && data_valid) {
                tracing::debug!("Invalid block parameters: block {}", index);
                all_valid = false;
            }
        }

        if all_valid && !self.header_crc_matches() {
            tracing::error!("Header CRC does not match block contents");
            all_valid = false;
        }

        all_valid
    }

    /// Reset the medium to defaults and stamp the expected version
    fn migrate(&mut self) -> Status {
        tracing::info!(
            "Medium version outdated, writing defaults for version {}",
            self.expected_version
        );

        let report = self.write_all(WritePolicy::AllBlocks, DataSource::Default, WriteMode::OnChange);
        tracing::debug!("Default write: {:?}", report);
        if report.failed > 0 {
            tracing::error!("Writing default data failed for {} blocks", report.failed);
            return Status::NotOk;
        }

        let previous = self.header();
        let mut header = previous;
        header.version = self.expected_version;
        header.status = Status::Ok;
        header.crc = self.compute_crc();
        self.set_header(header);

        if !self.write_entry(HEADER_INDEX, DataSource::Working) {
            tracing::error!("Memory version update failed");
            self.set_header(previous);
            return Status::NotOk;
        }
        self.write_params(HEADER_INDEX);

        if !self.medium.commit() {
            // Until a commit lands the medium still carries the old version.
            tracing::error!("Commit after migration failed");
            self.set_header(previous);
            self.blocks[HEADER_INDEX].invalidate_mirror();
            return Status::NotOk;
        }

        Status::Uninit
    }

    // =========================================================================
    // Header CRC
    // =========================================================================

    fn crc_active(&self) -> bool {
        self.layout.crc_field() && self.checksum.is_some()
    }

    fn compute_crc(&self) -> u32 {
        match &self.checksum {
            Some(provider) if self.layout.crc_field() => {
                checksum::aggregate(&**provider, self.blocks.iter().skip(1))
            }
            _ => 0,
        }
    }

    fn header_crc_matches(&self) -> bool {
        !self.crc_active() || self.compute_crc() == self.header().crc
    }

    /// Recompute the header CRC and write the header if it changed
    pub(crate) fn refresh_header_crc(&mut self) -> bool {
        if !self.crc_active() {
            return false;
        }

        let mut header = self.header();
        let crc = self.compute_crc();
        if header.crc == crc {
            return false;
        }

        tracing::debug!("Header CRC {:08x} -> {:08x}", header.crc, crc);
        header.crc = crc;
        self.set_header(header);
        self.write_entry(HEADER_INDEX, DataSource::Working)
    }
}

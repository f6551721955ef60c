//! File Medium
//!
//! EEPROM emulation backed by an image file.
//!
//! On `init()` the image is loaded into a RAM cache of fixed size (a missing
//! or short file reads as erased bytes). Reads and writes touch only the
//! cache. `commit()` writes the cache to `<image>.tmp`, fsyncs it, and renames
//! it over the image so a crash leaves either the old or the new image.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use super::{clamp_range, Medium, ERASED_BYTE};

/// File-backed EEPROM emulation
#[derive(Debug)]
pub struct FileMedium {
    path: PathBuf,
    size: usize,
    cache: Vec<u8>,
    /// Cache differs from the image on disk
    dirty: bool,
    /// `init()` ran and loaded the image
    ready: bool,
}

impl FileMedium {
    /// Create a medium of `size` bytes for the image at `path`.
    ///
    /// No I/O happens until `init()`.
    pub fn new(path: impl Into<PathBuf>, size: usize) -> Self {
        Self {
            path: path.into(),
            size,
            cache: Vec::new(),
            dirty: false,
            ready: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Whether the cache holds writes that have not been committed
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// `<image>.tmp`, next to the image and never equal to it
    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn load(&mut self) -> io::Result<()> {
        let mut cache = vec![ERASED_BYTE; self.size];

        match File::open(&self.path) {
            Ok(mut file) => {
                let mut image = Vec::with_capacity(self.size);
                file.read_to_end(&mut image)?;
                let n = image.len().min(self.size);
                cache[..n].copy_from_slice(&image[..n]);
                tracing::debug!("Loaded {} bytes from {}", n, self.path.display());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!("No image at {}, starting erased", self.path.display());
            }
            Err(e) => return Err(e),
        }

        self.cache = cache;
        self.dirty = false;
        Ok(())
    }

    fn store(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.staging_path();
        {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&tmp_path)?;
            file.write_all(&self.cache)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl Medium for FileMedium {
    fn init(&mut self) {
        match self.load() {
            Ok(()) => self.ready = true,
            Err(e) => {
                tracing::error!("Failed to load image {}: {}", self.path.display(), e);
                self.ready = false;
            }
        }
    }

    fn read(&mut self, dst: &mut [u8], offset: u16) -> u16 {
        if !self.ready {
            tracing::error!("Read before init: {}", self.path.display());
            return 0;
        }

        let range = clamp_range(offset, dst.len(), self.cache.len());
        let n = range.len();
        dst[..n].copy_from_slice(&self.cache[range]);
        n as u16
    }

    fn write(&mut self, src: &[u8], offset: u16) -> u16 {
        if !self.ready {
            tracing::error!("Write before init: {}", self.path.display());
            return 0;
        }

        let range = clamp_range(offset, src.len(), self.cache.len());
        let n = range.len();
        if self.cache[range.clone()] != src[..n] {
            self.cache[range].copy_from_slice(&src[..n]);
            self.dirty = true;
        }
        n as u16
    }

    fn commit(&mut self) -> bool {
        if !self.ready {
            return false;
        }
        if !self.dirty {
            return true;
        }

        match self.store() {
            Ok(()) => {
                tracing::debug!("Committed {} bytes to {}", self.cache.len(), self.path.display());
                self.dirty = false;
                true
            }
            Err(e) => {
                tracing::error!("Commit to {} failed: {}", self.path.display(), e);
                false
            }
        }
    }
}

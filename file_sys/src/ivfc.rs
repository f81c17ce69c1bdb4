//! # IVFC Archive
//!
//! Read-only archive over a container's payload window.
//!
//! The archive exposes a single flat payload: every path opens the same file,
//! every directory is empty, and every mutation is refused with
//! [`ERR_UNSUPPORTED_OPERATION`].
//!
//! ## Reads
//!
//! Reads are widened to cipher-block alignment so an encrypted payload can be
//! decrypted from a block boundary:
//!
//! 1. `pad = offset % 16`, `aligned = offset - pad`
//! 2. read `min(length + pad, data_size - aligned)` bytes from
//!    `data_offset + aligned`
//! 3. if the source is encrypted, run the keystream from block
//!    `(aligned + counter_header_offset) / 16` past the source's counter seed
//! 4. hand back everything after the first `pad` bytes

use crate::backend::{ArchiveBackend, DirectoryBackend, Entry, FileBackend};
use crate::config::{IvfcConfig, CIPHER_BLOCK_SIZE};
use crate::crypto::apply_ctr_keystream;
use crate::errors::{ArchiveError, ERR_NO_ROMFS, ERR_ROMFS_IO, ERR_UNSUPPORTED_OPERATION};
use crate::path::{Mode, Path};
use core_types::{ResultCode, ResultVal};
use hal::{RomSourceError, SharedRomSource};

const ARCHIVE_NAME: &str = "IVFC";

/// Read-only archive backed by a container window
pub struct IvfcArchive {
    source: Option<SharedRomSource>,
    data_offset: u64,
    data_size: u64,
    config: IvfcConfig,
}

impl IvfcArchive {
    /// Creates an archive over `data_size` bytes at `data_offset` of `source`
    ///
    /// An archive without a source can be constructed; its files fail every
    /// read with [`ERR_NO_ROMFS`].
    pub fn new(
        source: Option<SharedRomSource>,
        data_offset: u64,
        data_size: u64,
    ) -> Result<Self, ArchiveError> {
        if let Some(source) = &source {
            let source_size = source.borrow().size();
            let fits = data_offset
                .checked_add(data_size)
                .is_some_and(|end| end <= source_size);
            if !fits {
                return Err(ArchiveError::WindowOutOfBounds {
                    data_offset,
                    data_size,
                    source_size,
                });
            }
        }

        Ok(Self {
            source,
            data_offset,
            data_size,
            config: IvfcConfig::default(),
        })
    }

    /// Replaces the decryption parameters
    pub fn with_config(mut self, config: IvfcConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &IvfcConfig {
        &self.config
    }

    pub fn data_size(&self) -> u64 {
        self.data_size
    }

    fn refuse(&self, operation: &str, path: &Path) -> ResultVal<()> {
        tracing::error!(
            archive = ARCHIVE_NAME,
            operation,
            path = %path,
            "attempted to mutate a read-only archive"
        );
        Err(ERR_UNSUPPORTED_OPERATION)
    }

    fn refuse_rename(&self, operation: &str, src: &Path, dest: &Path) -> ResultVal<()> {
        tracing::error!(
            archive = ARCHIVE_NAME,
            operation,
            src = %src,
            dest = %dest,
            "attempted to rename inside a read-only archive"
        );
        Err(ERR_UNSUPPORTED_OPERATION)
    }
}

impl ArchiveBackend for IvfcArchive {
    fn name(&self) -> &str {
        ARCHIVE_NAME
    }

    fn open_file(&self, path: &Path, mode: Mode) -> ResultVal<Box<dyn FileBackend>> {
        tracing::trace!(path = %path, mode = mode.raw(), "opening payload file");
        Ok(Box::new(IvfcFile {
            source: self.source.clone(),
            data_offset: self.data_offset,
            data_size: self.data_size,
            config: self.config,
        }))
    }

    fn delete_file(&self, path: &Path) -> ResultVal<()> {
        self.refuse("delete_file", path)
    }

    fn rename_file(&self, src: &Path, dest: &Path) -> ResultVal<()> {
        self.refuse_rename("rename_file", src, dest)
    }

    fn delete_directory(&self, path: &Path) -> ResultVal<()> {
        self.refuse("delete_directory", path)
    }

    fn delete_directory_recursively(&self, path: &Path) -> ResultVal<()> {
        self.refuse("delete_directory_recursively", path)
    }

    fn create_file(&self, path: &Path, size: u64) -> ResultVal<()> {
        tracing::debug!(size, "create_file refused");
        self.refuse("create_file", path)
    }

    fn create_directory(&self, path: &Path) -> ResultVal<()> {
        self.refuse("create_directory", path)
    }

    fn rename_directory(&self, src: &Path, dest: &Path) -> ResultVal<()> {
        self.refuse_rename("rename_directory", src, dest)
    }

    fn open_directory(&self, path: &Path) -> ResultVal<Box<dyn DirectoryBackend>> {
        tracing::trace!(path = %path, "opening directory");
        Ok(Box::new(IvfcDirectory))
    }

    fn free_bytes(&self) -> u64 {
        tracing::warn!(archive = ARCHIVE_NAME, "attempted to get free space");
        0
    }
}

/// The archive's payload, opened for reading
pub struct IvfcFile {
    source: Option<SharedRomSource>,
    data_offset: u64,
    data_size: u64,
    config: IvfcConfig,
}

fn source_failure(err: RomSourceError) -> ResultCode {
    tracing::error!(error = %err, "payload source failed");
    ERR_ROMFS_IO
}

impl FileBackend for IvfcFile {
    fn read(&self, offset: u64, buffer: &mut [u8]) -> ResultVal<usize> {
        let length = buffer.len() as u64;
        tracing::trace!(offset, length, "read");

        let Some(source) = &self.source else {
            tracing::error!(offset, length, "read with no backing container");
            return Err(ERR_NO_ROMFS);
        };

        let pad = offset % CIPHER_BLOCK_SIZE;
        let aligned_offset = offset - pad;
        let aligned_length = length
            .saturating_add(pad)
            .min(self.data_size.saturating_sub(aligned_offset));
        if aligned_length == 0 {
            return Ok(0);
        }

        let mut scratch = vec![0u8; aligned_length as usize];
        let Ok(mut source) = source.try_borrow_mut() else {
            tracing::error!(offset, length, "payload source is already in use");
            return Err(ERR_ROMFS_IO);
        };
        source
            .seek(self.data_offset + aligned_offset)
            .map_err(source_failure)?;
        let read = source.read_bytes(&mut scratch).map_err(source_failure)?;

        if source.encrypted() {
            let blocks = (aligned_offset + self.config.counter_header_offset) / CIPHER_BLOCK_SIZE;
            apply_ctr_keystream(
                &self.config.base_key,
                &source.counter(),
                blocks,
                &mut scratch[..read],
            );
        }

        let pad = pad as usize;
        let count = read.saturating_sub(pad);
        if count > 0 {
            buffer[..count].copy_from_slice(&scratch[pad..pad + count]);
        }
        Ok(count)
    }

    fn write(&self, offset: u64, data: &[u8], _flush: bool) -> ResultVal<usize> {
        tracing::error!(offset, length = data.len(), "attempted to write to a read-only file");
        Err(ERR_UNSUPPORTED_OPERATION)
    }

    fn size(&self) -> u64 {
        tracing::trace!(size = self.data_size, "size");
        self.data_size
    }

    fn set_size(&self, size: u64) -> bool {
        tracing::error!(size, "attempted to resize a read-only file");
        false
    }

    fn close(&self) -> ResultVal<()> {
        Ok(())
    }

    fn flush(&self) -> ResultVal<()> {
        Ok(())
    }
}

/// Directory handle for the archive; it never lists anything
#[derive(Debug, Default)]
pub struct IvfcDirectory;

impl DirectoryBackend for IvfcDirectory {
    fn read(&mut self, _max_entries: usize) -> Vec<Entry> {
        Vec::new()
    }

    fn close(&mut self) -> ResultVal<()> {
        Ok(())
    }
}

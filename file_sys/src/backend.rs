//! Archive backend traits
//!
//! Archives, files and directories are trait objects so the file-system
//! service can hold any backend behind one interface.

use crate::path::{Mode, Path};
use core_types::ResultVal;
use serde::{Deserialize, Serialize};

/// One directory listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub is_directory: bool,
    pub file_size: u64,
}

/// An archive the guest has opened
pub trait ArchiveBackend {
    /// Short backend name used in logs
    fn name(&self) -> &str;

    fn open_file(&self, path: &Path, mode: Mode) -> ResultVal<Box<dyn FileBackend>>;

    fn delete_file(&self, path: &Path) -> ResultVal<()>;

    fn rename_file(&self, src: &Path, dest: &Path) -> ResultVal<()>;

    fn delete_directory(&self, path: &Path) -> ResultVal<()>;

    fn delete_directory_recursively(&self, path: &Path) -> ResultVal<()>;

    fn create_file(&self, path: &Path, size: u64) -> ResultVal<()>;

    fn create_directory(&self, path: &Path) -> ResultVal<()>;

    fn rename_directory(&self, src: &Path, dest: &Path) -> ResultVal<()>;

    fn open_directory(&self, path: &Path) -> ResultVal<Box<dyn DirectoryBackend>>;

    /// Bytes available for new data
    fn free_bytes(&self) -> u64;
}

/// An open file
pub trait FileBackend {
    /// Reads up to `buffer.len()` bytes starting at `offset`
    ///
    /// Returns how many bytes were produced. Short reads are not errors.
    fn read(&self, offset: u64, buffer: &mut [u8]) -> ResultVal<usize>;

    /// Writes `data` at `offset`, returning how many bytes were written
    fn write(&self, offset: u64, data: &[u8], flush: bool) -> ResultVal<usize>;

    fn size(&self) -> u64;

    /// Resizes the file; returns false if the backend refuses
    fn set_size(&self, size: u64) -> bool;

    fn close(&self) -> ResultVal<()>;

    fn flush(&self) -> ResultVal<()>;
}

/// An open directory
pub trait DirectoryBackend {
    /// Returns up to `max_entries` further entries
    fn read(&mut self, max_entries: usize) -> Vec<Entry>;

    fn close(&mut self) -> ResultVal<()>;
}

//! Read-only byte sources backing archive containers
//!
//! A source is a seekable byte stream plus the decryption parameters of the
//! container it was loaded from. Archive files query the parameters instead of
//! keeping their own copy.

use std::cell::RefCell;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;

/// Size of the counter seed (one cipher block)
pub const COUNTER_SIZE: usize = 16;

/// Source errors
#[derive(Debug, Error)]
pub enum RomSourceError {
    /// Seek or read failed on the underlying medium
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read-only container byte source
///
/// `seek` positions the cursor; `read_bytes` fills as much of the buffer as
/// the source can supply from the cursor and advances it. Reading at or past
/// the end yields zero bytes, which is not an error.
pub trait RomSource {
    /// Total size of the source in bytes
    fn size(&self) -> u64;

    /// Moves the read cursor to an absolute position
    fn seek(&mut self, position: u64) -> Result<(), RomSourceError>;

    /// Reads up to `buffer.len()` bytes, returning how many were read
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, RomSourceError>;

    /// Whether the payload is stored encrypted
    fn encrypted(&self) -> bool;

    /// Counter seed for decrypting this container
    fn counter(&self) -> [u8; COUNTER_SIZE];
}

/// A source shared read-only by every file opened from one archive
///
/// Guest I/O is serialized on the emulation timeline, so the cell only guards
/// the seek cursor.
pub type SharedRomSource = Rc<RefCell<dyn RomSource>>;

/// In-memory source
///
/// Useful for tests and for containers that were already loaded whole.
#[derive(Debug, Clone)]
pub struct MemoryRomSource {
    data: Vec<u8>,
    position: u64,
    counter: Option<[u8; COUNTER_SIZE]>,
}

impl MemoryRomSource {
    /// Creates an unencrypted source over `data`
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            position: 0,
            counter: None,
        }
    }

    /// Creates a source whose bytes are ciphertext under `counter`
    pub fn with_counter(data: Vec<u8>, counter: [u8; COUNTER_SIZE]) -> Self {
        Self {
            data,
            position: 0,
            counter: Some(counter),
        }
    }

    /// Wraps the source for sharing between archive files
    pub fn into_shared(self) -> SharedRomSource {
        Rc::new(RefCell::new(self))
    }

    /// Current cursor position
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl RomSource for MemoryRomSource {
    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn seek(&mut self, position: u64) -> Result<(), RomSourceError> {
        self.position = position;
        Ok(())
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, RomSourceError> {
        let start = usize::try_from(self.position)
            .unwrap_or(usize::MAX)
            .min(self.data.len());
        let available = &self.data[start..];
        let count = available.len().min(buffer.len());
        buffer[..count].copy_from_slice(&available[..count]);
        self.position += count as u64;
        Ok(count)
    }

    fn encrypted(&self) -> bool {
        self.counter.is_some()
    }

    fn counter(&self) -> [u8; COUNTER_SIZE] {
        self.counter.unwrap_or([0; COUNTER_SIZE])
    }
}

/// Source backed by a container file on the host
#[derive(Debug)]
pub struct FileRomSource {
    file: File,
    size: u64,
    counter: Option<[u8; COUNTER_SIZE]>,
}

impl FileRomSource {
    /// Opens an unencrypted container file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RomSourceError> {
        let file = File::open(path)?;
        Self::from_file(file, None)
    }

    /// Opens a container file whose payload is encrypted under `counter`
    pub fn open_encrypted(
        path: impl AsRef<Path>,
        counter: [u8; COUNTER_SIZE],
    ) -> Result<Self, RomSourceError> {
        let file = File::open(path)?;
        Self::from_file(file, Some(counter))
    }

    /// Wraps an already-open file
    pub fn from_file(
        file: File,
        counter: Option<[u8; COUNTER_SIZE]>,
    ) -> Result<Self, RomSourceError> {
        let size = file.metadata()?.len();
        Ok(Self {
            file,
            size,
            counter,
        })
    }

    /// Wraps the source for sharing between archive files
    pub fn into_shared(self) -> SharedRomSource {
        Rc::new(RefCell::new(self))
    }
}

impl RomSource for FileRomSource {
    fn size(&self) -> u64 {
        self.size
    }

    fn seek(&mut self, position: u64) -> Result<(), RomSourceError> {
        self.file.seek(SeekFrom::Start(position))?;
        Ok(())
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, RomSourceError> {
        let mut total = 0;
        while total < buffer.len() {
            match self.file.read(&mut buffer[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(total)
    }

    fn encrypted(&self) -> bool {
        self.counter.is_some()
    }

    fn counter(&self) -> [u8; COUNTER_SIZE] {
        self.counter.unwrap_or([0; COUNTER_SIZE])
    }
}

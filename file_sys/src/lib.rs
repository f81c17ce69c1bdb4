//! # Archive File System
//!
//! This crate defines the archive backends that serve guest file-system
//! requests.
//!
//! ## Philosophy
//!
//! **An archive is a contract, not a directory tree.**
//!
//! Guest code opens archives, then files and directories inside them. Every
//! backend answers the same [`ArchiveBackend`] surface; a read-only backend
//! answers mutations with a structured refusal instead of pretending to
//! succeed.
//!
//! ## Design
//!
//! - **ArchiveBackend / FileBackend / DirectoryBackend**: the backend traits
//! - **Path / Mode**: guest path and open-mode arguments, already decoded
//! - **IvfcArchive**: read-only archive over a (possibly encrypted) container
//!   window, with alignment-aware AES-128-CTR reads
//! - **IvfcConfig**: decryption parameters, loadable from JSON

pub mod backend;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod ivfc;
pub mod path;

pub use backend::{ArchiveBackend, DirectoryBackend, Entry, FileBackend};
pub use config::IvfcConfig;
pub use errors::{ArchiveError, ERR_NO_ROMFS, ERR_ROMFS_IO, ERR_UNSUPPORTED_OPERATION};
pub use ivfc::{IvfcArchive, IvfcDirectory, IvfcFile};
pub use path::{Mode, Path};

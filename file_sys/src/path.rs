//! Guest path and open-mode arguments

use serde::{Deserialize, Serialize};
use std::fmt;

/// Decoded guest path
///
/// The guest sends a type word and a byte buffer; the type decides how the
/// bytes are interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Path {
    Invalid,
    Empty,
    Binary(Vec<u8>),
    /// NUL-terminated ASCII
    Char(String),
    /// NUL-terminated UTF-16LE
    Wide(String),
}

impl Path {
    /// Decodes a guest path from its type word and raw bytes
    pub fn from_raw(kind: u32, data: &[u8]) -> Self {
        match kind {
            1 => Path::Empty,
            2 => Path::Binary(data.to_vec()),
            3 => {
                let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
                Path::Char(String::from_utf8_lossy(&data[..end]).into_owned())
            }
            4 => {
                let units: Vec<u16> = data
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .take_while(|&unit| unit != 0)
                    .collect();
                Path::Wide(String::from_utf16_lossy(&units))
            }
            _ => Path::Invalid,
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, Path::Invalid)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::Invalid => write!(f, "[invalid]"),
            Path::Empty => write!(f, "[empty]"),
            Path::Binary(bytes) => {
                write!(f, "[binary: ")?;
                for byte in bytes {
                    write!(f, "{byte:02X}")?;
                }
                write!(f, "]")
            }
            Path::Char(text) | Path::Wide(text) => write!(f, "{text}"),
        }
    }
}

/// File open mode bits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    pub read: bool,
    pub write: bool,
    pub create: bool,
}

impl Mode {
    pub const READ: Mode = Mode {
        read: true,
        write: false,
        create: false,
    };

    /// Decodes the guest's mode word (bit 0 read, bit 1 write, bit 2 create)
    pub fn from_raw(raw: u32) -> Self {
        Self {
            read: raw & 1 != 0,
            write: raw & 2 != 0,
            create: raw & 4 != 0,
        }
    }

    pub fn raw(&self) -> u32 {
        u32::from(self.read) | u32::from(self.write) << 1 | u32::from(self.create) << 2
    }
}

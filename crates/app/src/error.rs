//! Error types for the huffcode command-line tool.

use thiserror::Error;

/// Top-level error for a CLI run.
#[derive(Debug, Error)]
pub enum AppError {
    /// Codec failure (tree build, tree file, bit stream, decode)
    #[error(transparent)]
    Codec(#[from] huffcode_core::Error),

    /// Compressed container could not be parsed
    #[error("container error: {0}")]
    Container(#[from] ContainerError),

    /// File I/O error
    #[error("I/O error on {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Input holds a symbol the tree has no code for
    #[error("symbol {0} has no code in this tree")]
    Unencodable(huffcode_core::Symbol),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Compressed container errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContainerError {
    /// Invalid magic number in header
    #[error("invalid magic number: expected {expected:?}, got {actual:?}")]
    InvalidMagic { expected: [u8; 4], actual: [u8; 4] },

    /// Container is too short to hold a header
    #[error("container too short: need at least {required} bytes, got {actual}")]
    TooShort { required: usize, actual: usize },

    /// Payload length doesn't match the bit length in the header
    #[error("payload length mismatch: header implies {expected} bytes, got {actual}")]
    PayloadLengthMismatch { expected: usize, actual: usize },

    /// CRC validation failed, indicating data corruption
    #[error("CRC mismatch: expected {expected:#010x}, got {actual:#010x}")]
    Crc { expected: u32, actual: u32 },
}

pub type Result<T> = std::result::Result<T, AppError>;

//! Compressed container serialization and parsing.
//!
//! The `.short` file wraps the packed code bits with enough metadata to
//! decode them exactly:
//!
//! ```text
//! +------------------+
//! | Magic (4 bytes)  |  0x48 0x55 0x46 0x42 ("HUFB")
//! +------------------+
//! | bit_len (8)      |  u64 little-endian, meaningful payload bits
//! +------------------+
//! | crc32 (4)        |  u32 little-endian
//! +------------------+
//! | payload          |  ceil(bit_len / 8) bytes, MSB-first, zero padded
//! | (variable)       |
//! +------------------+
//! ```
//!
//! The decoder runs until its bit source is empty, so the exact bit length
//! is what keeps padding bits from being decoded as extra symbols.
//!
//! # CRC Coverage
//!
//! The CRC32 covers `bit_len` and the payload.

use crate::error::{ContainerError, Result};

/// Magic number for containers: "HUFB"
const MAGIC: [u8; 4] = [0x48, 0x55, 0x46, 0x42];

/// Size of the container header in bytes
pub const HEADER_SIZE: usize = 16;

/// A parsed container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Number of meaningful bits in `payload`
    pub bit_len: u64,

    /// Packed codes
    pub payload: Vec<u8>,

    /// CRC32 checksum (for validation)
    pub crc32: u32,
}

/// Serialize packed bits into container bytes.
pub fn serialize_container(bit_len: u64, payload: &[u8]) -> Vec<u8> {
    let crc32 = compute_crc(bit_len, payload);

    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&bit_len.to_le_bytes());
    out.extend_from_slice(&crc32.to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// Parse a container from bytes.
///
/// # Errors
/// - `ContainerError::TooShort` if the buffer can't hold a header
/// - `ContainerError::InvalidMagic` if magic number doesn't match
/// - `ContainerError::PayloadLengthMismatch` if the payload isn't exactly
///   `ceil(bit_len / 8)` bytes
/// - `ContainerError::Crc` if CRC validation fails
pub fn parse_container(bytes: &[u8]) -> Result<Container> {
    if bytes.len() < HEADER_SIZE {
        return Err(ContainerError::TooShort {
            required: HEADER_SIZE,
            actual: bytes.len(),
        }
        .into());
    }

    let (magic, rest) = bytes.split_at(4);
    let (bit_len, rest) = rest.split_at(8);
    let (crc32, payload) = rest.split_at(4);

    let magic = le_array::<4>(magic);
    if magic != MAGIC {
        return Err(ContainerError::InvalidMagic {
            expected: MAGIC,
            actual: magic,
        }
        .into());
    }

    let bit_len = u64::from_le_bytes(le_array(bit_len));
    let crc32 = u32::from_le_bytes(le_array(crc32));

    let expected = bit_len.div_ceil(8);
    if expected != payload.len() as u64 {
        return Err(ContainerError::PayloadLengthMismatch {
            expected: usize::try_from(expected).unwrap_or(usize::MAX),
            actual: payload.len(),
        }
        .into());
    }

    let computed = compute_crc(bit_len, payload);
    if computed != crc32 {
        return Err(ContainerError::Crc {
            expected: crc32,
            actual: computed,
        }
        .into());
    }

    Ok(Container {
        bit_len,
        payload: payload.to_vec(),
        crc32,
    })
}

/// Copy a slice of known length into an array.
fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}

/// Compute CRC32 over the protected fields.
fn compute_crc(bit_len: u64, payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&bit_len.to_le_bytes());
    hasher.update(payload);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn container_err(result: Result<Container>) -> ContainerError {
        match result {
            Err(AppError::Container(err)) => err,
            other => panic!("expected container error, got {other:?}"),
        }
    }

    #[test]
    fn test_serialize_parse_round_trip() {
        let payload = vec![0b10110000, 0xFF, 0x01];
        let bytes = serialize_container(20, &payload);
        assert_eq!(bytes.len(), HEADER_SIZE + 3);

        let container = parse_container(&bytes).unwrap();
        assert_eq!(container.bit_len, 20);
        assert_eq!(container.payload, payload);
    }

    #[test]
    fn test_empty_payload() {
        let bytes = serialize_container(0, &[]);
        let container = parse_container(&bytes).unwrap();
        assert_eq!(container.bit_len, 0);
        assert!(container.payload.is_empty());
    }

    #[test]
    fn test_invalid_magic() {
        let mut bytes = serialize_container(8, &[0xAB]);
        bytes[0] = 0xFF;
        assert!(matches!(
            container_err(parse_container(&bytes)),
            ContainerError::InvalidMagic { .. }
        ));
    }

    #[test]
    fn test_too_short() {
        assert_eq!(
            container_err(parse_container(&[0u8; 10])),
            ContainerError::TooShort {
                required: HEADER_SIZE,
                actual: 10
            }
        );
    }

    #[test]
    fn test_payload_length_mismatch() {
        let mut bytes = serialize_container(9, &[0xFF, 0x80]);
        bytes.pop();
        assert_eq!(
            container_err(parse_container(&bytes)),
            ContainerError::PayloadLengthMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_crc_mismatch() {
        let mut bytes = serialize_container(16, &[0x12, 0x34]);
        let len = bytes.len();
        bytes[len - 1] ^= 0x01;
        assert!(matches!(
            container_err(parse_container(&bytes)),
            ContainerError::Crc { .. }
        ));
    }
}

//! Packs input bytes into a bit stream using a tree's codes.
//!
//! Uses [`CodeTree::code_table`], so a single-symbol input is written as
//! one `0` bit per byte; the core decoder reads it back the same way.

use huffcode_core::bitio::BitWriter;
use huffcode_core::{CodeTree, Symbol};
use tracing::debug;

use crate::error::{AppError, Result};

/// Packed output of [`encode_bytes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub payload: Vec<u8>,
    pub bit_len: u64,
}

/// Encode every byte of `data` with the tree's codes.
///
/// # Errors
/// `AppError::Unencodable` if a byte has no leaf in the tree.
pub fn encode_bytes(tree: &CodeTree, data: &[u8]) -> Result<Encoded> {
    let table = tree.code_table();
    let mut writer = BitWriter::new();

    for &byte in data {
        let symbol = Symbol::from(byte);
        let code = table.get(symbol).ok_or(AppError::Unencodable(symbol))?;
        writer.write_code(code);
    }

    let bit_len = writer.bit_len() as u64;
    let payload = writer.finish();
    debug!(bytes = data.len(), bit_len, "encoded input");

    Ok(Encoded { payload, bit_len })
}

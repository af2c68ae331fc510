//! Bit-by-bit decoding against a code tree.
//!
//! The decoder walks the tree from the root, reading one bit per internal
//! node, and emits a symbol whenever it lands on a leaf. The bit source is
//! only asked whether more bits remain while the walk is at the root, i.e.
//! on a symbol boundary.
//!
//! # Source contract
//!
//! The source must run dry exactly on a symbol boundary. A source that
//! ends mid-code is an encoder bug: the decoder does not try to recover and
//! surfaces whatever error the source's `next_bit` returns (for
//! [`BitReader`](crate::bitio::BitReader), `BitIoError::UnexpectedEof`).
//!
//! # Degenerate trees
//!
//! A single-leaf tree has no branch to consume bits. Matching the encoding
//! side (see [`CodeTree::code_table`]), every bit read from the source
//! counts as one occurrence of the symbol, whatever its value.

use std::io::Write;
use std::iter::Peekable;

use tracing::{debug, instrument};

use crate::error::{DecodeError, Result};
use crate::tree::{CodeTree, Node, Symbol};

/// Sequential source of bits.
pub trait BitSource {
    /// True if at least one more bit can be read.
    fn has_next_bit(&mut self) -> bool;

    /// Read the next bit (`false` = 0, `true` = 1).
    fn next_bit(&mut self) -> Result<bool>;
}

/// Receives decoded symbols in decode order.
pub trait SymbolSink {
    fn emit(&mut self, symbol: Symbol) -> Result<()>;
}

impl<I: Iterator<Item = bool>> BitSource for Peekable<I> {
    fn has_next_bit(&mut self) -> bool {
        self.peek().is_some()
    }

    fn next_bit(&mut self) -> Result<bool> {
        self.next()
            .ok_or_else(|| crate::error::BitIoError::UnexpectedEof.into())
    }
}

impl SymbolSink for Vec<Symbol> {
    fn emit(&mut self, symbol: Symbol) -> Result<()> {
        self.push(symbol);
        Ok(())
    }
}

/// Writes each symbol as a single byte.
#[derive(Debug)]
pub struct ByteSink<W> {
    writer: W,
    written: u64,
}

impl<W: Write> ByteSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush and hand back the writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> SymbolSink for ByteSink<W> {
    fn emit(&mut self, symbol: Symbol) -> Result<()> {
        let byte = u8::try_from(symbol).map_err(|_| DecodeError::SymbolOutOfRange { symbol })?;
        self.writer.write_all(&[byte])?;
        self.written += 1;
        Ok(())
    }
}

/// Decode `source` until it is exhausted, sending symbols to `sink`.
///
/// Returns the number of symbols emitted.
///
/// # Errors
/// - errors from `source.next_bit` (a truncated final code)
/// - errors from `sink.emit`
#[instrument(level = "debug", skip_all)]
pub fn decode<B, S>(tree: &CodeTree, source: &mut B, sink: &mut S) -> Result<u64>
where
    B: BitSource + ?Sized,
    S: SymbolSink + ?Sized,
{
    let root = tree.root();
    let mut emitted = 0u64;

    if let Node::Leaf { symbol } = root {
        while source.has_next_bit() {
            source.next_bit()?;
            sink.emit(*symbol)?;
            emitted += 1;
        }
        debug!(emitted, "decoded single-symbol stream");
        return Ok(emitted);
    }

    while source.has_next_bit() {
        let mut current = root;
        loop {
            match current {
                Node::Leaf { symbol } => {
                    sink.emit(*symbol)?;
                    emitted += 1;
                    break;
                }
                Node::Internal { left, right } => {
                    current = if source.next_bit()? { &**right } else { &**left };
                }
            }
        }
    }

    debug!(emitted, "decoded stream");
    Ok(emitted)
}

/// Decode into a freshly allocated vector.
pub fn decode_to_vec<B>(tree: &CodeTree, source: &mut B) -> Result<Vec<Symbol>>
where
    B: BitSource + ?Sized,
{
    let mut symbols = Vec::new();
    decode(tree, source, &mut symbols)?;
    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitio::{BitReader, BitWriter};
    use crate::error::{BitIoError, Error};
    use crate::format;

    fn bits(text: &str) -> Peekable<std::vec::IntoIter<bool>> {
        text.chars()
            .map(|c| c == '1')
            .collect::<Vec<_>>()
            .into_iter()
            .peekable()
    }

    fn small_tree() -> CodeTree {
        // a=0, b=10, c=11
        format::deserialize([(97, "0"), (98, "10"), (99, "11")]).unwrap()
    }

    #[test]
    fn test_decode_known_bits() {
        let symbols = decode_to_vec(&small_tree(), &mut bits("0101100")).unwrap();
        assert_eq!(symbols, vec![97, 98, 99, 97, 97]);
    }

    #[test]
    fn test_decode_empty_source() {
        let symbols = decode_to_vec(&small_tree(), &mut bits("")).unwrap();
        assert!(symbols.is_empty());
    }

    #[test]
    fn test_truncated_code_surfaces_source_error() {
        let result = decode_to_vec(&small_tree(), &mut bits("01"));
        assert!(matches!(
            result,
            Err(Error::BitIo(BitIoError::UnexpectedEof))
        ));
    }

    #[test]
    fn test_decode_from_bit_reader() {
        let tree = small_tree();
        let table = tree.code_table();

        let mut writer = BitWriter::new();
        for &symbol in b"abcabc" {
            writer.write_code(table.get(u32::from(symbol)).unwrap());
        }
        let bit_len = writer.bit_len();
        let bytes = writer.finish();

        let mut reader = BitReader::with_bit_len(&bytes, bit_len).unwrap();
        let symbols = decode_to_vec(&tree, &mut reader).unwrap();
        assert_eq!(symbols, vec![97, 98, 99, 97, 98, 99]);
    }

    #[test]
    fn test_degenerate_tree_one_symbol_per_bit() {
        let tree = CodeTree::from_counts([(42, 5)]).unwrap();
        let symbols = decode_to_vec(&tree, &mut bits("00000")).unwrap();
        assert_eq!(symbols, vec![42; 5]);
    }

    #[test]
    fn test_byte_sink() {
        let mut sink = ByteSink::new(Vec::new());
        let count = decode(&small_tree(), &mut bits("01011"), &mut sink).unwrap();

        assert_eq!(count, 3);
        assert_eq!(sink.written(), 3);
        assert_eq!(sink.into_inner().unwrap(), b"abc".to_vec());
    }

    #[test]
    fn test_byte_sink_rejects_wide_symbols() {
        let tree = format::deserialize([(300, "0"), (1, "1")]).unwrap();
        let mut sink = ByteSink::new(Vec::new());
        let result = decode(&tree, &mut bits("10"), &mut sink);

        assert!(matches!(
            result,
            Err(Error::Decode(DecodeError::SymbolOutOfRange { symbol: 300 }))
        ));
        // the symbol before the failure was delivered
        assert_eq!(sink.written(), 1);
    }
}

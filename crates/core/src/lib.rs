//! huffcode-core: Huffman prefix-code trees
//!
//! This library covers the three pieces of a Huffman codec that need care:
//! - Building an optimal prefix-code tree from symbol frequencies
//! - Persisting that tree as a line-oriented text description and reading
//!   it back
//! - Decoding a bitstream against the tree, one bit at a time
//!
//! # Architecture
//!
//! - `tree`: tree construction, codes and frequency tables
//! - `format`: text serialization and deserialization of trees
//! - `decode`: bit-source driven decoding into a symbol sink
//! - `bitio`: MSB-first bit writer/reader
//! - `error`: structured errors
//!
//! Packing encoded output is left to callers: [`CodeTree::code_table`]
//! gives the codes and [`bitio::BitWriter`] packs them.
//!
//! # Example
//! ```
//! use huffcode_core::{bitio::{BitReader, BitWriter}, decode, format, CodeTree, FrequencyTable};
//!
//! let text = b"abracadabra";
//! let tree = CodeTree::from_table(&FrequencyTable::from_bytes(text)).unwrap();
//!
//! let table = tree.code_table();
//! let mut writer = BitWriter::new();
//! for &byte in text {
//!     writer.write_code(table.get(u32::from(byte)).unwrap());
//! }
//! let bit_len = writer.bit_len();
//! let bytes = writer.finish();
//!
//! let stored = format::serialize(&tree);
//! let restored = format::parse_lines(&stored).unwrap();
//!
//! let mut reader = BitReader::with_bit_len(&bytes, bit_len).unwrap();
//! let symbols = decode::decode_to_vec(&restored, &mut reader).unwrap();
//! let decoded: Vec<u8> = symbols.into_iter().map(|s| s as u8).collect();
//! assert_eq!(decoded, text);
//! ```

pub mod bitio;
pub mod decode;
pub mod error;
pub mod format;
pub mod tree;

// Re-export commonly used types
pub use error::{Error, Result};
pub use tree::{Code, CodeTable, CodeTree, FrequencyTable, Node, Symbol};

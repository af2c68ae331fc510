//! Error types for the huffcode core.
//!
//! All operations return structured errors rather than panicking.
//! Every failure is terminal for the current build, parse or decode pass
//! and is surfaced to the caller; nothing in the core retries.

use thiserror::Error;

use crate::tree::Symbol;

/// Top-level error type for all operations in the core.
///
/// Each variant corresponds to a specific failure domain:
/// - Bit I/O: reading/writing bits from/to byte buffers
/// - Huffman: tree construction from a frequency table
/// - Format: the line-oriented text description of a tree
/// - Decode: delivering decoded symbols to a sink
/// - I/O: reading or writing the text description
#[derive(Debug, Error)]
pub enum Error {
    /// Bit I/O operation failed (e.g., reading past end of buffer)
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// Tree construction failed
    #[error("huffman error: {0}")]
    Huffman(#[from] HuffmanError),

    /// Malformed tree description
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// Decoded symbol could not be delivered
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Underlying reader or writer failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bit-level I/O errors.
#[derive(Debug, Error)]
pub enum BitIoError {
    /// Attempted to read past the end of the stream
    #[error("unexpected end of bit stream")]
    UnexpectedEof,

    /// Declared bit length is larger than the backing buffer
    #[error("insufficient bits: requested {requested}, available {available}")]
    InsufficientBits { requested: usize, available: usize },

    /// Invalid bit count (more than 64 bits in one call)
    #[error("invalid bit count: {0}")]
    InvalidBitCount(usize),
}

/// Tree construction errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HuffmanError {
    /// No symbols with non-zero frequency
    #[error("empty frequency table: at least one symbol needs a positive count")]
    EmptyFrequencyTable,
}

/// Errors in the text description of a tree.
///
/// Line numbers are 1-based and refer to the line that triggered the
/// error. Errors raised from in-memory `(symbol, code)` pairs report the
/// position a line reader would have assigned to the code line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// Symbol line is not a decimal integer
    #[error("line {line}: invalid symbol {text:?}")]
    InvalidSymbol { line: usize, text: String },

    /// Symbol line with no code line after it
    #[error("line {line}: symbol {symbol} has no code line")]
    MissingCode { line: usize, symbol: Symbol },

    /// Code contains something other than '0' or '1'
    #[error("line {line}: invalid character {ch:?} in code")]
    InvalidCodeChar { line: usize, ch: char },

    /// Code is deeper than any tree over the alphabet can be
    #[error("line {line}: code for symbol {symbol} has {len} bits, at most {max} allowed")]
    CodeTooLong {
        line: usize,
        symbol: Symbol,
        len: usize,
        max: usize,
    },

    /// One code is a strict prefix of another
    #[error("line {line}: code {code:?} for symbol {symbol} conflicts with a prefix of another code")]
    PrefixConflict {
        line: usize,
        symbol: Symbol,
        code: String,
    },

    /// Two different symbols share the same code
    #[error("line {line}: code {code:?} for symbol {symbol} is already assigned to symbol {existing}")]
    CodeCollision {
        line: usize,
        symbol: Symbol,
        existing: Symbol,
        code: String,
    },

    /// Same symbol listed twice with different codes
    #[error("line {line}: symbol {symbol} listed with code {second:?} but already has code {first:?}")]
    DuplicateSymbol {
        line: usize,
        symbol: Symbol,
        first: String,
        second: String,
    },

    /// Some branch has only one child
    #[error("incomplete tree: no code reaches path {path:?}")]
    IncompleteTree { path: String },

    /// Description holds no pairs at all
    #[error("empty tree description")]
    EmptyTree,
}

/// Errors raised while emitting decoded symbols.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Symbol does not fit the sink's output unit
    #[error("symbol {symbol} does not fit in a byte")]
    SymbolOutOfRange { symbol: Symbol },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;

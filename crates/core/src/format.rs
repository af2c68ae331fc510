//! Line-oriented text format for code trees.
//!
//! A tree is stored as one pair of lines per leaf: the symbol in decimal,
//! then its root-to-leaf path as `'0'`/`'1'` characters (`'0'` = left).
//!
//! ```text
//! 102
//! 0
//! 99
//! 100
//! 100
//! 101
//! ```
//!
//! Pairs carry no ordering meaning and there is no header, count or
//! checksum: the end of the input is the end of the tree. Internal nodes
//! are implied by the paths. A degenerate single-leaf tree is stored as its
//! symbol followed by an empty code line.
//!
//! # Reading
//!
//! Blank lines are skipped wherever a symbol line is expected, so trailing
//! blank lines are harmless. The line after a symbol is always taken as its
//! code, even when empty. A trailing `'\r'` is stripped from every line.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use tracing::{debug, instrument};

use crate::error::{FormatError, Result};
use crate::tree::{Code, CodeTree, Node, Symbol};

/// Longest code accepted when reading. A full tree over the 256 byte
/// values is at most 255 levels deep.
pub const MAX_CODE_LEN: usize = 255;

/// Serialize a tree into its text lines, leaves in pre-order.
pub fn serialize(tree: &CodeTree) -> Vec<String> {
    tree.leaves()
        .into_iter()
        .flat_map(|(symbol, code)| [symbol.to_string(), code.to_string()])
        .collect()
}

/// Write a tree's text lines, each terminated by `'\n'`.
pub fn write_tree<W: Write>(tree: &CodeTree, mut writer: W) -> Result<()> {
    for line in serialize(tree) {
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Rebuild a tree from `(symbol, code)` pairs.
///
/// Errors report the line number the code would occupy in the text form
/// (pair `i` has its code on line `2i + 2`).
///
/// # Errors
/// - `FormatError::InvalidCodeChar` for characters other than `'0'`/`'1'`
/// - `FormatError::CodeTooLong` for codes over [`MAX_CODE_LEN`] bits
/// - `FormatError::PrefixConflict` if one code is a strict prefix of another
/// - `FormatError::CodeCollision` if two symbols share a code
/// - `FormatError::DuplicateSymbol` if a symbol appears with two codes
/// - `FormatError::IncompleteTree` if a branch is left with one child
/// - `FormatError::EmptyTree` if there are no pairs
#[instrument(level = "debug", skip_all)]
pub fn deserialize<I, S>(pairs: I) -> Result<CodeTree>
where
    I: IntoIterator<Item = (Symbol, S)>,
    S: AsRef<str>,
{
    let mut builder = TrieBuilder::default();
    for (index, (symbol, code)) in pairs.into_iter().enumerate() {
        builder.insert(2 * index + 2, symbol, code.as_ref())?;
    }
    builder.finish()
}

/// Parse the text form from an iterator of lines.
///
/// Same failure modes as [`deserialize`], plus `FormatError::InvalidSymbol`
/// for a symbol line that is not a decimal integer and
/// `FormatError::MissingCode` when the input ends right after a symbol.
#[instrument(level = "debug", skip_all)]
pub fn parse_lines<I, S>(lines: I) -> Result<CodeTree>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = TrieBuilder::default();
    let mut lines = lines.into_iter().enumerate().map(|(i, line)| (i + 1, line));

    while let Some((line_no, line)) = lines.next() {
        let text = line.as_ref().trim();
        if text.is_empty() {
            continue;
        }

        let symbol: Symbol = text.parse().map_err(|_| FormatError::InvalidSymbol {
            line: line_no,
            text: text.to_string(),
        })?;

        let Some((code_line, code)) = lines.next() else {
            return Err(FormatError::MissingCode {
                line: line_no,
                symbol,
            }
            .into());
        };
        builder.insert(code_line, symbol, code.as_ref().trim_end_matches('\r'))?;
    }

    builder.finish()
}

/// Read the text form from a buffered reader until end of stream.
pub fn read_tree<R: BufRead>(reader: R) -> Result<CodeTree> {
    let lines = reader.lines().collect::<std::io::Result<Vec<String>>>()?;
    parse_lines(lines)
}

/// Trie position during reconstruction. Children stay `None` until some
/// code passes through them.
enum Slot {
    Leaf(Symbol),
    Branch {
        left: Option<Box<Slot>>,
        right: Option<Box<Slot>>,
    },
}

// A rejected trie is dropped child by child from a work stack, so its
// depth never reaches the call stack.
impl Drop for Slot {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        if let Slot::Branch { left, right } = self {
            stack.extend(left.take());
            stack.extend(right.take());
        }
        while let Some(mut slot) = stack.pop() {
            if let Slot::Branch { left, right } = slot.as_mut() {
                stack.extend(left.take());
                stack.extend(right.take());
            }
        }
    }
}

#[derive(Default)]
struct TrieBuilder {
    root: Option<Box<Slot>>,
    seen: HashMap<Symbol, Code>,
}

impl TrieBuilder {
    fn insert(&mut self, line: usize, symbol: Symbol, text: &str) -> Result<()> {
        let code = Code::parse(text).map_err(|ch| FormatError::InvalidCodeChar { line, ch })?;
        if code.len() > MAX_CODE_LEN {
            return Err(FormatError::CodeTooLong {
                line,
                symbol,
                len: code.len(),
                max: MAX_CODE_LEN,
            }
            .into());
        }

        if let Some(first) = self.seen.get(&symbol) {
            if *first == code {
                return Ok(());
            }
            return Err(FormatError::DuplicateSymbol {
                line,
                symbol,
                first: first.to_string(),
                second: code.to_string(),
            }
            .into());
        }

        let prefix_conflict = || FormatError::PrefixConflict {
            line,
            symbol,
            code: code.to_string(),
        };

        let mut slot = &mut self.root;
        for bit in code.iter() {
            let node = slot.get_or_insert_with(|| {
                Box::new(Slot::Branch {
                    left: None,
                    right: None,
                })
            });
            slot = match node.as_mut() {
                Slot::Branch { left, right } => {
                    if bit {
                        right
                    } else {
                        left
                    }
                }
                // an existing leaf sits on our path
                Slot::Leaf(_) => return Err(prefix_conflict().into()),
            };
        }

        match slot.as_deref() {
            None => *slot = Some(Box::new(Slot::Leaf(symbol))),
            Some(Slot::Leaf(existing)) => {
                return Err(FormatError::CodeCollision {
                    line,
                    symbol,
                    existing: *existing,
                    code: code.to_string(),
                }
                .into());
            }
            // our code ends where other codes continue
            Some(Slot::Branch { .. }) => return Err(prefix_conflict().into()),
        }

        self.seen.insert(symbol, code);
        Ok(())
    }

    fn finish(self) -> Result<CodeTree> {
        let root = self.root.ok_or(FormatError::EmptyTree)?;
        let root = freeze(*root, &mut String::new())?;
        debug!(leaves = self.seen.len(), "parsed code tree");
        Ok(CodeTree::from_root(root))
    }
}

/// Convert a finished trie into nodes, rejecting half-filled branches.
fn freeze(mut slot: Slot, path: &mut String) -> std::result::Result<Node, FormatError> {
    match &mut slot {
        Slot::Leaf(symbol) => Ok(Node::leaf(*symbol)),
        Slot::Branch { left, right } => {
            let left = freeze_child(left.take(), '0', path)?;
            let right = freeze_child(right.take(), '1', path)?;
            Ok(Node::internal(left, right))
        }
    }
}

fn freeze_child(
    child: Option<Box<Slot>>,
    step: char,
    path: &mut String,
) -> std::result::Result<Node, FormatError> {
    path.push(step);
    let node = match child {
        Some(slot) => freeze(*slot, path),
        None => Err(FormatError::IncompleteTree { path: path.clone() }),
    };
    path.pop();
    node
}

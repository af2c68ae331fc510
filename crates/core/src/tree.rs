//! Huffman code tree construction.
//!
//! A [`CodeTree`] is built once from a frequency table and is read-only
//! afterwards. Construction is the classic greedy merge: every symbol with a
//! positive count starts as a leaf in a min-priority queue, the two lightest
//! entries are repeatedly popped and merged, and the last remaining entry is
//! the root.
//!
//! # Tie-break
//!
//! Queue entries are ordered by `(weight, sequence)`, where `sequence` is a
//! counter incremented on every push. Leaves are pushed in ascending symbol
//! order before any merge happens, so among equal weights:
//! - leaves are popped before merged nodes
//! - lower symbols are popped before higher symbols
//! - older merged nodes are popped before newer ones
//!
//! The first entry popped in a merge becomes the `left` child (bit `0`),
//! the second becomes the `right` child (bit `1`).
//!
//! # Degenerate trees
//!
//! When only one symbol has a positive count the root is a single leaf and
//! its path from the root is empty. [`CodeTree::paths`] reports that empty
//! path (it is what the text format stores), while [`CodeTree::code_table`]
//! assigns the synthetic one-bit code `0` so an encoder spends exactly one
//! bit per occurrence. The decoder mirrors this: against a single-leaf tree
//! every bit read yields one symbol.

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap};
use std::fmt;

use tracing::{debug, instrument};

use crate::error::{HuffmanError, Result};

/// Symbol identifier carried by a leaf (a code point; bytes use 0-255).
pub type Symbol = u32;

/// A node of the code tree.
///
/// Every `Internal` node owns exactly two children, so the tree is always a
/// full binary tree and the prefix-free property holds structurally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: Symbol,
    },
    Internal {
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn leaf(symbol: Symbol) -> Self {
        Node::Leaf { symbol }
    }

    pub fn internal(left: Node, right: Node) -> Self {
        Node::Internal {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Child reached by following `bit` (`false` = left, `true` = right).
    ///
    /// Returns `None` on a leaf.
    pub fn child(&self, bit: bool) -> Option<&Node> {
        match self {
            Node::Leaf { .. } => None,
            Node::Internal { left, right } => Some(if bit { right } else { left }),
        }
    }

    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Internal { left, right } => 1 + left.depth().max(right.depth()),
        }
    }

    fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Internal { left, right } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Pre-order walk collecting every leaf with its root-to-leaf path.
    fn collect_leaves(&self, prefix: &mut Vec<bool>, out: &mut Vec<(Symbol, Code)>) {
        match self {
            Node::Leaf { symbol } => out.push((*symbol, Code::from_bits(prefix.iter().copied()))),
            Node::Internal { left, right } => {
                prefix.push(false);
                left.collect_leaves(prefix, out);
                prefix.pop();

                prefix.push(true);
                right.collect_leaves(prefix, out);
                prefix.pop();
            }
        }
    }
}

/// A prefix code: the bits on the path from the root to a leaf.
///
/// Displays as a string of `'0'`/`'1'` characters, `'0'` for each left step.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Code {
    bits: Vec<bool>,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bits(bits: impl IntoIterator<Item = bool>) -> Self {
        Self {
            bits: bits.into_iter().collect(),
        }
    }

    /// Parse a string of `'0'`/`'1'` characters.
    ///
    /// On failure returns the first character that is not a binary digit.
    pub fn parse(text: &str) -> std::result::Result<Self, char> {
        text.chars()
            .map(|ch| match ch {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(other),
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(|bits| Self { bits })
    }

    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }

    /// True if `self` is a prefix of `other` (including equality).
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.bits.starts_with(&self.bits)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Symbol -> code assignment, iterated in ascending symbol order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<Symbol, Code>,
}

impl CodeTable {
    pub fn get(&self, symbol: Symbol) -> Option<&Code> {
        self.codes.get(&symbol)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &Code)> {
        self.codes.iter().map(|(&symbol, code)| (symbol, code))
    }

    /// Code length per symbol.
    pub fn lengths(&self) -> BTreeMap<Symbol, usize> {
        self.codes
            .iter()
            .map(|(&symbol, code)| (symbol, code.len()))
            .collect()
    }
}

impl FromIterator<(Symbol, Code)> for CodeTable {
    fn from_iter<I: IntoIterator<Item = (Symbol, Code)>>(iter: I) -> Self {
        Self {
            codes: iter.into_iter().collect(),
        }
    }
}

/// Sparse symbol frequency counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: BTreeMap<Symbol, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every byte of `data`.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut table = Self::new();
        for &byte in data {
            table.add(Symbol::from(byte));
        }
        table
    }

    pub fn add(&mut self, symbol: Symbol) {
        self.add_count(symbol, 1);
    }

    pub fn add_count(&mut self, symbol: Symbol, count: u64) {
        let entry = self.counts.entry(symbol).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    pub fn count(&self, symbol: Symbol) -> u64 {
        self.counts.get(&symbol).copied().unwrap_or(0)
    }

    /// Number of symbols with a positive count.
    pub fn distinct(&self) -> usize {
        self.counts.values().filter(|&&count| count > 0).count()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().fold(0u64, |acc, &c| acc.saturating_add(c))
    }

    pub fn is_empty(&self) -> bool {
        self.distinct() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, u64)> + '_ {
        self.counts.iter().map(|(&symbol, &count)| (symbol, count))
    }
}

impl FromIterator<(Symbol, u64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (Symbol, u64)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (symbol, count) in iter {
            table.add_count(symbol, count);
        }
        table
    }
}

/// Queue entry used only while building; weights never reach the tree.
struct Pending {
    weight: u64,
    sequence: u64,
    node: Node,
}

impl Pending {
    fn key(&self) -> (u64, u64) {
        (self.weight, self.sequence)
    }
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// An immutable Huffman code tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTree {
    root: Node,
}

impl CodeTree {
    /// Wrap an already-built root.
    pub fn from_root(root: Node) -> Self {
        Self { root }
    }

    /// Build from a dense table where the index is the symbol.
    ///
    /// # Errors
    /// `HuffmanError::EmptyFrequencyTable` if no entry is positive.
    pub fn from_frequencies(frequencies: &[u64]) -> Result<Self> {
        Self::from_counts(
            frequencies
                .iter()
                .enumerate()
                .map(|(symbol, &count)| (symbol as Symbol, count)),
        )
    }

    pub fn from_table(table: &FrequencyTable) -> Result<Self> {
        Self::from_counts(table.iter())
    }

    /// Build from sparse `(symbol, count)` pairs.
    ///
    /// Counts for a repeated symbol are summed; zero counts are dropped and
    /// the symbol does not appear in the tree.
    ///
    /// # Errors
    /// `HuffmanError::EmptyFrequencyTable` if no symbol has a positive count.
    #[instrument(level = "debug", skip_all)]
    pub fn from_counts(counts: impl IntoIterator<Item = (Symbol, u64)>) -> Result<Self> {
        let table: FrequencyTable = counts.into_iter().collect();

        let mut heap = BinaryHeap::new();
        let mut sequence = 0u64;
        for (symbol, weight) in table.iter().filter(|&(_, count)| count > 0) {
            heap.push(Reverse(Pending {
                weight,
                sequence,
                node: Node::leaf(symbol),
            }));
            sequence += 1;
        }

        let root = loop {
            let Some(Reverse(left)) = heap.pop() else {
                return Err(HuffmanError::EmptyFrequencyTable.into());
            };
            let Some(Reverse(right)) = heap.pop() else {
                break left.node;
            };

            heap.push(Reverse(Pending {
                weight: left.weight.saturating_add(right.weight),
                sequence,
                node: Node::internal(left.node, right.node),
            }));
            sequence += 1;
        };

        let tree = Self { root };
        debug!(
            leaves = tree.leaf_count(),
            depth = tree.depth(),
            "built code tree"
        );
        Ok(tree)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// True when the root is a single leaf (only one symbol was present).
    pub fn is_degenerate(&self) -> bool {
        self.root.is_leaf()
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Every leaf with its root-to-leaf path, in pre-order (left first).
    pub fn leaves(&self) -> Vec<(Symbol, Code)> {
        let mut out = Vec::with_capacity(self.leaf_count());
        self.root.collect_leaves(&mut Vec::new(), &mut out);
        out
    }

    /// Root-to-leaf paths per symbol. A degenerate tree maps its symbol to
    /// the empty code.
    pub fn paths(&self) -> CodeTable {
        self.leaves().into_iter().collect()
    }

    /// Codes an encoder should emit.
    ///
    /// Identical to [`paths`](Self::paths) except for the degenerate tree,
    /// whose single symbol gets the one-bit code `0`.
    pub fn code_table(&self) -> CodeTable {
        match &self.root {
            Node::Leaf { symbol } => std::iter::once((*symbol, Code::from_bits([false]))).collect(),
            Node::Internal { .. } => self.paths(),
        }
    }

    /// Total encoded length `Σ count × len(path)` for the given counts.
    ///
    /// Symbols absent from the tree contribute nothing. The total saturates
    /// at `u64::MAX`.
    pub fn weighted_length(&self, counts: impl IntoIterator<Item = (Symbol, u64)>) -> u64 {
        let paths = self.paths();
        counts
            .into_iter()
            .filter_map(|(symbol, count)| {
                paths
                    .get(symbol)
                    .map(|code| count.saturating_mul(code.len() as u64))
            })
            .fold(0, u64::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn textbook() -> Vec<(Symbol, u64)> {
        vec![
            ('a' as Symbol, 5),
            ('b' as Symbol, 9),
            ('c' as Symbol, 12),
            ('d' as Symbol, 13),
            ('e' as Symbol, 16),
            ('f' as Symbol, 45),
        ]
    }

    #[test]
    fn test_textbook_weighted_length() {
        let tree = CodeTree::from_counts(textbook()).unwrap();
        assert_eq!(tree.weighted_length(textbook()), 224);
        assert_eq!(tree.leaf_count(), 6);
    }

    #[test]
    fn test_textbook_code_lengths() {
        let tree = CodeTree::from_counts(textbook()).unwrap();
        let lengths = tree.paths().lengths();

        assert_eq!(lengths[&('f' as Symbol)], 1);
        assert_eq!(lengths[&('c' as Symbol)], 3);
        assert_eq!(lengths[&('d' as Symbol)], 3);
        assert_eq!(lengths[&('e' as Symbol)], 3);
        assert_eq!(lengths[&('a' as Symbol)], 4);
        assert_eq!(lengths[&('b' as Symbol)], 4);
    }

    #[test]
    fn test_textbook_exact_codes() {
        // f(45) is popped before the 55-weight node, so it is the root's
        // left child; a(5) and b(9) are the first pair so a is left of b.
        let tree = CodeTree::from_counts(textbook()).unwrap();
        let paths = tree.paths();

        assert_eq!(paths.get('f' as Symbol).unwrap().to_string(), "0");
        assert_eq!(paths.get('c' as Symbol).unwrap().to_string(), "100");
        assert_eq!(paths.get('d' as Symbol).unwrap().to_string(), "101");
        assert_eq!(paths.get('a' as Symbol).unwrap().to_string(), "1100");
        assert_eq!(paths.get('b' as Symbol).unwrap().to_string(), "1101");
        assert_eq!(paths.get('e' as Symbol).unwrap().to_string(), "111");
    }

    #[test]
    fn test_empty_table_fails() {
        let result = CodeTree::from_frequencies(&[]);
        assert!(matches!(
            result,
            Err(Error::Huffman(HuffmanError::EmptyFrequencyTable))
        ));
    }

    #[test]
    fn test_all_zero_counts_fail() {
        let result = CodeTree::from_frequencies(&[0; 256]);
        assert!(matches!(
            result,
            Err(Error::Huffman(HuffmanError::EmptyFrequencyTable))
        ));
    }

    #[test]
    fn test_zero_counts_are_excluded() {
        let mut freqs = [0u64; 256];
        freqs[b'x' as usize] = 3;
        freqs[b'y' as usize] = 1;

        let tree = CodeTree::from_frequencies(&freqs).unwrap();
        assert_eq!(tree.leaf_count(), 2);

        let paths = tree.paths();
        assert!(paths.get(b'z' as Symbol).is_none());
        // y is lighter so it is popped first and lands on the left
        assert_eq!(paths.get(b'y' as Symbol).unwrap().to_string(), "0");
        assert_eq!(paths.get(b'x' as Symbol).unwrap().to_string(), "1");
    }

    #[test]
    fn test_single_symbol_is_degenerate() {
        let tree = CodeTree::from_counts([(65, 10)]).unwrap();

        assert!(tree.is_degenerate());
        assert_eq!(tree.root(), &Node::leaf(65));
        assert!(tree.paths().get(65).unwrap().is_empty());
        assert_eq!(tree.code_table().get(65).unwrap().to_string(), "0");
        assert_eq!(tree.weighted_length([(65, 10)]), 0);
    }

    #[test]
    fn test_tie_break_prefers_lower_symbol_and_older_entries() {
        // Four equal weights: (0,1) merge first, then (2,3), then the two
        // merged nodes in creation order.
        let tree = CodeTree::from_counts([(3, 1), (1, 1), (0, 1), (2, 1)]).unwrap();
        let paths = tree.paths();

        assert_eq!(paths.get(0).unwrap().to_string(), "00");
        assert_eq!(paths.get(1).unwrap().to_string(), "01");
        assert_eq!(paths.get(2).unwrap().to_string(), "10");
        assert_eq!(paths.get(3).unwrap().to_string(), "11");
    }

    #[test]
    fn test_tie_break_leaf_before_merged_node() {
        // After merging 0 and 1 (weight 2), symbol 2 (weight 2) is older and
        // must be popped first, becoming the left child of the root.
        let tree = CodeTree::from_counts([(0, 1), (1, 1), (2, 2)]).unwrap();
        let paths = tree.paths();

        assert_eq!(paths.get(2).unwrap().to_string(), "0");
        assert_eq!(paths.get(0).unwrap().to_string(), "10");
        assert_eq!(paths.get(1).unwrap().to_string(), "11");
    }

    #[test]
    fn test_build_is_deterministic() {
        let freqs: Vec<u64> = (0..64).map(|i| (i % 7) + 1).collect();
        let first = CodeTree::from_frequencies(&freqs).unwrap();
        let second = CodeTree::from_frequencies(&freqs).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_repeated_symbols_are_summed() {
        let tree = CodeTree::from_counts([(1, 2), (2, 3), (1, 2)]).unwrap();
        // 1 now weighs 4 and 2 weighs 3, so 2 goes left
        assert_eq!(tree.paths().get(2).unwrap().to_string(), "0");
    }

    #[test]
    fn test_weighted_length_saturates() {
        let counts = [(0, u64::MAX), (1, 1)];
        let tree = CodeTree::from_counts(counts).unwrap();
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.weighted_length(counts), u64::MAX);

        let counts = [(0, u64::MAX / 2), (1, u64::MAX / 2), (2, u64::MAX / 2)];
        let tree = CodeTree::from_counts(counts).unwrap();
        assert_eq!(tree.weighted_length(counts), u64::MAX);
    }

    #[test]
    fn test_full_binary_and_prefix_free() {
        let freqs: Vec<u64> = (1..=40).collect();
        let tree = CodeTree::from_frequencies(&freqs).unwrap();

        fn assert_full(node: &Node) {
            if let Node::Internal { left, right } = node {
                assert_full(left);
                assert_full(right);
            }
        }
        assert_full(tree.root());

        let leaves = tree.leaves();
        assert_eq!(leaves.len(), 40);
        for (i, (_, a)) in leaves.iter().enumerate() {
            for (j, (_, b)) in leaves.iter().enumerate() {
                if i != j {
                    assert!(!a.is_prefix_of(b), "{a} is a prefix of {b}");
                }
            }
        }
    }

    #[test]
    fn test_code_parse_and_display() {
        let code = Code::parse("01101").unwrap();
        assert_eq!(code.len(), 5);
        assert_eq!(code.to_string(), "01101");
        assert_eq!(Code::parse("01a1"), Err('a'));
        assert!(Code::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_code_prefix() {
        let short = Code::parse("01").unwrap();
        let long = Code::parse("0110").unwrap();
        assert!(short.is_prefix_of(&long));
        assert!(!long.is_prefix_of(&short));
        assert!(Code::new().is_prefix_of(&short));
    }

    #[test]
    fn test_frequency_table_from_bytes() {
        let table = FrequencyTable::from_bytes(b"abracadabra");
        assert_eq!(table.count(b'a' as Symbol), 5);
        assert_eq!(table.count(b'b' as Symbol), 2);
        assert_eq!(table.count(b'z' as Symbol), 0);
        assert_eq!(table.distinct(), 5);
        assert_eq!(table.total(), 11);
    }
}

//! Huffman coding tree construction.
//!
//! Builds the tree by the classic greedy merge: take the two lowest-frequency
//! entries out of the priority queue, hang them under a new internal node
//! whose frequency is their sum, and put that node back. When one entry is
//! left it is the root.
//!
//! # Historical Context
//!
//! David Huffman (1952) developed this algorithm as a term paper at MIT.
//! It was the first practical algorithm for constructing optimal prefix codes.

use std::ascii;
use std::fmt;

use log::debug;

use crate::error::{Error, Result};
use crate::queue::{PriorityQueue, TreeHandle};
use crate::symbol::{Frequency, FrequencyTable, Symbol};

/// A node of the Huffman tree.
///
/// Leaves carry an input symbol. Internal nodes carry a merged symbol
/// holding the summed frequency and own exactly two children.
pub struct TreeNode {
    symbol: Symbol,
    children: Option<(TreeHandle, TreeHandle)>,
}

impl TreeNode {
    /// A leaf for `character` occurring `frequency` times.
    pub fn leaf(character: u8, frequency: Frequency) -> Self {
        Self {
            symbol: Symbol::new(character, frequency),
            children: None,
        }
    }

    fn internal(symbol: Symbol, left: TreeHandle, right: TreeHandle) -> Self {
        Self {
            symbol,
            children: Some((left, right)),
        }
    }

    /// The symbol carried by this node.
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Frequency of this node's symbol.
    pub fn frequency(&self) -> Frequency {
        self.symbol.frequency()
    }

    /// Returns true for leaves.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// The left child of an internal node.
    pub fn left(&self) -> Option<&TreeNode> {
        self.children.as_ref().map(|(left, _)| &**left)
    }

    /// The right child of an internal node.
    pub fn right(&self) -> Option<&TreeNode> {
        self.children.as_ref().map(|(_, right)| &**right)
    }

    /// Pre-order walk of this subtree yielding each node with its depth
    /// below `self`.
    pub fn walk(&self) -> impl Iterator<Item = (&TreeNode, usize)> + '_ {
        let mut pending = vec![(self, 0usize)];
        std::iter::from_fn(move || {
            let (node, depth) = pending.pop()?;
            if let Some((left, right)) = &node.children {
                pending.push((&**right, depth + 1));
                pending.push((&**left, depth + 1));
            }
            Some((node, depth))
        })
    }
}

// Summaries only: a derived impl would recurse once per tree level.
impl fmt::Debug for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.children {
            None => f.debug_tuple("Leaf").field(&self.symbol).finish(),
            Some((left, right)) => f
                .debug_struct("Internal")
                .field("symbol", &self.symbol)
                .field("left", &left.symbol)
                .field("right", &right.symbol)
                .finish(),
        }
    }
}

impl Drop for TreeNode {
    // Unlink children onto a work stack so deep trees do not recurse.
    fn drop(&mut self) {
        let Some((left, right)) = self.children.take() else {
            return;
        };
        let mut pending = vec![left, right];
        while let Some(mut node) = pending.pop() {
            if let Some((left, right)) = node.children.take() {
                pending.push(left);
                pending.push(right);
            }
        }
    }
}

/// Merge the two lowest-frequency entries of `queue` into one.
///
/// On success the queue shrinks by exactly one entry. On failure both
/// extracted entries are put back, so the queue holds the same entries as
/// before the call.
///
/// # Errors
/// Returns `Error::EmptyStructure` if fewer than two entries are queued,
/// `Error::FrequencyOverflow` if the merged frequency does not fit and
/// `Error::AllocationFailure` if the merged node cannot be queued.
pub fn merge_step(queue: &mut PriorityQueue) -> Result<()> {
    if queue.len() < 2 {
        return Err(Error::EmptyStructure {
            required: 2,
            available: queue.len(),
        });
    }

    let first = queue.extract()?;
    let second = match queue.extract() {
        Ok(node) => node,
        Err(err) => {
            queue.reinsert(first)?;
            return Err(err);
        }
    };

    let merged = first
        .symbol()
        .merge(second.symbol())
        .and_then(|symbol| queue.reserve(1).map(|()| symbol));
    match merged {
        Ok(symbol) => {
            debug!(
                "merge {} + {} -> {}",
                first.symbol(),
                second.symbol(),
                symbol
            );
            queue.reinsert(Box::new(TreeNode::internal(symbol, first, second)))
        }
        Err(err) => {
            debug!("merge step failed ({err}), restoring both entries");
            queue.reinsert(first)?;
            queue.reinsert(second)?;
            Err(err)
        }
    }
}

/// A finished Huffman coding tree.
pub struct HuffmanTree {
    root: TreeHandle,
}

impl HuffmanTree {
    /// Build the tree for `symbols` with the matching `frequencies`.
    ///
    /// # Errors
    /// Returns `Error::EmptyStructure` for empty input, plus any error from
    /// [`PriorityQueue::new`] or [`merge_step`].
    pub fn new(symbols: &[u8], frequencies: &[Frequency]) -> Result<Self> {
        let mut queue = PriorityQueue::new(symbols, frequencies)?;
        Self::from_queue(&mut queue)
    }

    /// Build the tree for the byte frequencies of `data`.
    ///
    /// # Errors
    /// Returns `Error::EmptyStructure` if `data` is empty.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut queue = PriorityQueue::from_table(&FrequencyTable::from_bytes(data))?;
        Self::from_queue(&mut queue)
    }

    /// Merge the entries of `queue` until one is left and take it as the root.
    ///
    /// A queue with a single entry yields that entry without merging. On
    /// success the queue is left empty. On failure it stays consistent and
    /// holds whatever merging had produced so far.
    ///
    /// # Errors
    /// Returns `Error::EmptyStructure` if the queue is empty, or the first
    /// error reported by [`merge_step`].
    pub fn from_queue(queue: &mut PriorityQueue) -> Result<Self> {
        if queue.is_empty() {
            return Err(Error::EmptyStructure {
                required: 1,
                available: 0,
            });
        }
        while queue.len() > 1 {
            merge_step(queue)?;
        }
        let root = queue.extract()?;
        debug!("huffman tree finished, root {}", root.symbol());
        Ok(Self { root })
    }

    /// The root node.
    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Give up the tree, keeping its root.
    pub fn into_root(self) -> TreeHandle {
        self.root
    }

    /// Total frequency, i.e. the root's.
    pub fn frequency(&self) -> Frequency {
        self.root.frequency()
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.root.walk().filter(|(node, _)| node.is_leaf()).count()
    }

    /// Length of the longest root-to-leaf path, in edges.
    pub fn depth(&self) -> usize {
        self.root.walk().map(|(_, depth)| depth).max().unwrap_or(0)
    }

    /// The prefix code of every leaf, in left-to-right leaf order.
    ///
    /// Left edges contribute `0`, right edges `1`. A tree that is a single
    /// leaf gives that leaf the code `0`.
    pub fn codes(&self) -> CodeTable {
        let mut entries = Vec::new();
        let mut pending = vec![(&*self.root, String::new())];
        while let Some((node, prefix)) = pending.pop() {
            match (&node.children, node.symbol.character()) {
                (Some((left, right)), _) => {
                    pending.push((&**right, format!("{prefix}1")));
                    pending.push((&**left, format!("{prefix}0")));
                }
                (None, Some(character)) => {
                    let code = if prefix.is_empty() {
                        "0".to_string()
                    } else {
                        prefix
                    };
                    entries.push((character, code));
                }
                // Leaves are only built by `TreeNode::leaf`, which always
                // sets a character.
                (None, None) => unreachable!("leaf without a character"),
            }
        }
        CodeTable { entries }
    }
}

impl fmt::Debug for HuffmanTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HuffmanTree")
            .field("root", &self.root.symbol)
            .field("leaves", &self.leaf_count())
            .field("depth", &self.depth())
            .finish()
    }
}

/// Prefix codes derived from a [`HuffmanTree`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeTable {
    entries: Vec<(u8, String)>,
}

impl CodeTable {
    /// Code of `character`, as a string of `0`/`1`.
    pub fn get(&self, character: u8) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == character)
            .map(|(_, code)| code.as_str())
    }

    /// All `(character, code)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &str)> + '_ {
        self.entries.iter().map(|(c, code)| (*c, code.as_str()))
    }

    /// Number of coded characters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no character is coded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for CodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (character, code) in self.iter() {
            writeln!(f, "{}: {}", ascii::escape_default(character), code)?;
        }
        Ok(())
    }
}

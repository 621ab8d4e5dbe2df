//! Frequency-ordered priority queue of Huffman tree nodes.

use std::cmp::Ordering;

use log::debug;

use crate::error::{Error, Result};
use crate::heap::{Compare, Heap};
use crate::huffman::TreeNode;
use crate::symbol::{Frequency, FrequencyTable, Symbol};

/// Owning handle to a tree node, the payload type of the queue.
pub type TreeHandle = Box<TreeNode>;

/// Orders tree nodes by the frequency of the symbol they carry.
///
/// Equal frequencies compare equal; which of two equal entries surfaces
/// first is unspecified.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrequencyOrder;

impl Compare<TreeHandle> for FrequencyOrder {
    fn compare(&self, a: &TreeHandle, b: &TreeHandle) -> Ordering {
        a.symbol().frequency().cmp(&b.symbol().frequency())
    }
}

/// Min-heap of tree nodes keyed on frequency.
#[derive(Debug)]
pub struct PriorityQueue {
    heap: Heap<TreeHandle, FrequencyOrder>,
}

impl PriorityQueue {
    /// Create a queue holding one leaf per `(symbols[i], frequencies[i])`.
    ///
    /// Empty input yields an empty queue.
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` if the slices differ in length and
    /// `Error::AllocationFailure` if a node cannot be allocated. No queue is
    /// returned on failure; everything built so far is released.
    pub fn new(symbols: &[u8], frequencies: &[Frequency]) -> Result<Self> {
        if symbols.len() != frequencies.len() {
            return Err(Error::InvalidArgument(
                "symbols and frequencies differ in length",
            ));
        }

        let mut heap = Heap::with_capacity(symbols.len(), FrequencyOrder)?;
        for (&character, &frequency) in symbols.iter().zip(frequencies) {
            heap.insert(Box::new(TreeNode::leaf(character, frequency)))?;
        }

        debug!("priority queue seeded with {} symbols", heap.len());
        Ok(Self { heap })
    }

    /// Create a queue from the non-zero entries of `table`.
    ///
    /// # Errors
    /// Returns `Error::AllocationFailure` if a node cannot be allocated.
    pub fn from_table(table: &FrequencyTable) -> Result<Self> {
        let (symbols, frequencies) = table.to_parts();
        Self::new(&symbols, &frequencies)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if the queue holds nothing.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The lowest-frequency entry, if any.
    pub fn peek(&self) -> Option<&TreeNode> {
        self.heap.peek().map(|node| &**node)
    }

    /// Add a node.
    ///
    /// # Errors
    /// Returns `Error::AllocationFailure` if the queue cannot grow.
    pub fn insert(&mut self, node: TreeHandle) -> Result<()> {
        self.heap.insert(node)
    }

    /// Remove the lowest-frequency entry.
    ///
    /// # Errors
    /// Returns `Error::EmptyStructure` if the queue is empty.
    pub fn extract(&mut self) -> Result<TreeHandle> {
        self.heap.extract()
    }

    /// Check the underlying heap's invariants.
    ///
    /// # Errors
    /// Returns `Error::InvariantViolation` on the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.heap.validate()
    }

    pub(crate) fn reserve(&mut self, additional: usize) -> Result<()> {
        self.heap.reserve(additional)
    }

    /// Put back a node whose slot was freed by an earlier extract.
    pub(crate) fn reinsert(&mut self, node: TreeHandle) -> Result<()> {
        self.heap.insert_reserved(node)
    }
}

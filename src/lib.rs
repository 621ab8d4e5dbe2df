//! # Huffman trees on a node-linked heap
//!
//! *Greedy prefix-code construction driven by a linked min-heap.*
//!
//! ## Intuition First
//!
//! Imagine a pile of cards, each labelled with a character and how often it
//! shows up. Pick up the two rarest cards, staple them under a new card whose
//! count is their sum, and drop that card back on the pile. Keep going until
//! one card is left. That card is the root of a tree in which frequent
//! characters sit near the top and rare ones deep down, and reading the
//! left/right turns from the root to a leaf gives that character's code.
//!
//! The "pile" has to hand back the rarest card quickly, every time. That is a
//! min-heap.
//!
//! ## The Problem
//!
//! An array-backed heap finds a node's children with arithmetic. A heap whose
//! complete tree is made of linked nodes has no such shortcut: to insert it
//! must locate the first free position, and to extract it must locate the
//! last occupied one. Both are found by reading the position number in binary
//! as a route from the root (see [`heap`]).
//!
//! ## Historical Context
//!
//! ```text
//! 1952  Huffman     Minimum-redundancy codes by greedy merging
//! 1964  Williams    Binary heap (heapsort)
//! 1964  Floyd       Bottom-up heap construction
//! ```
//!
//! ## Complexity Analysis
//!
//! - **Heap**: $O(\log n)$ insert and extract; the route to a position has one
//!   step per tree level.
//! - **Tree build**: $n - 1$ merge steps of two extracts and one insert each,
//!   so $O(n \log n)$ overall.
//!
//! ## Failure Modes
//!
//! 1. **Frequency overflow**: summed frequencies are checked; a merge that
//!    would overflow fails and the queue is restored.
//! 2. **Allocation failure**: node storage is reserved fallibly; a failed
//!    insert or merge leaves the structure exactly as it was.
//!
//! ## Implementation Notes
//!
//! This crate provides:
//! - [`Heap`]: the generic node-linked min-heap with a caller-supplied comparator.
//! - [`PriorityQueue`]: a heap of tree nodes ordered by frequency.
//! - [`HuffmanTree`]: the merge loop, plus prefix-code derivation.
//!
//! Encoding data with the resulting codes is left to the caller.
//!
//! ## References
//!
//! - Huffman, D. A. (1952). "A Method for the Construction of Minimum-Redundancy Codes."
//! - Williams, J. W. J. (1964). "Algorithm 232: Heapsort."

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod heap;
pub mod huffman;
pub mod queue;
pub mod symbol;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use heap::{Compare, Heap};
pub use huffman::{merge_step, CodeTable, HuffmanTree, TreeNode};
pub use queue::{FrequencyOrder, PriorityQueue, TreeHandle};
pub use symbol::{Frequency, FrequencyTable, Symbol};

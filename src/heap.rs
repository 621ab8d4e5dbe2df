//! Node-linked binary min-heap.
//!
//! Most heaps are a flat array where the children of slot `i` sit at `2i + 1`
//! and `2i + 2`. This one keeps the complete binary tree as real nodes with
//! `parent`, `left` and `right` links, so the heap has to *find* the next free
//! position (on insert) and the last occupied one (on extract) by walking
//! down from the root.
//!
//! # Addressing
//!
//! Number the positions of a complete binary tree 1, 2, 3, ... in level order.
//! Writing position `k` in binary, the bits after the leading `1` spell out the
//! route from the root, most significant first: `0` steps left, `1` steps right.
//!
//! ```text
//!                1                 6 = 0b1_10
//!            /       \                    ││
//!          2           3                  │└─ left
//!        /   \       /   \                └── right
//!       4     5     6     7
//! ```
//!
//! The parent of position `k` is `k / 2`, i.e. the same route minus its last
//! step, and that last step says which side the child hangs on. Both walks are
//! `O(log n)` because the route has one step per tree level.
//!
//! # Storage
//!
//! Nodes live in an index arena. Links are `NodeId`s into it, the `parent`
//! link is a plain back-reference, and vacated slots form an intrusive free
//! list so a remove followed by an insert never touches the allocator.
//! Payloads move between nodes (sift-up/sift-down swap `data`); the links of
//! a node never change while it is alive.

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;
use std::mem;

use log::trace;

use crate::error::{Error, Result};

/// A three-way ordering over heap payloads.
///
/// `Less` means the first argument belongs nearer the root. Any
/// `Fn(&T, &T) -> Ordering` is a comparator, so `i32::cmp` or a closure works
/// directly.
pub trait Compare<T: ?Sized> {
    /// Compares `a` with `b`.
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

impl<T: ?Sized, F> Compare<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct NodeId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    /// The side selected by the lowest bit of `bits`.
    fn of(bits: usize) -> Self {
        if bits & 1 == 1 {
            Side::Right
        } else {
            Side::Left
        }
    }
}

/// Returns the route from the root to the 1-based `index`, first step first.
fn path(index: usize) -> impl Iterator<Item = Side> {
    debug_assert!(index >= 1, "heap positions are 1-based");
    let depth = index.ilog2();
    (0..depth).rev().map(move |bit| Side::of(index >> bit))
}

#[derive(Debug)]
struct HeapNode<T> {
    data: T,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

impl<T> HeapNode<T> {
    fn leaf(data: T, parent: Option<NodeId>) -> Self {
        Self {
            data,
            parent,
            left: None,
            right: None,
        }
    }

    fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    fn child_mut(&mut self, side: Side) -> &mut Option<NodeId> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

#[derive(Debug)]
enum Slot<T> {
    Occupied(HeapNode<T>),
    Vacant { next_free: Option<NodeId> },
}

/// A min-heap whose complete-tree shape is held in parent/child links.
///
/// The ordering is supplied by a comparator value owned by the heap, so any
/// number of heaps with different orderings can coexist.
///
/// # Time Complexity
///
/// | [insert] | [extract]     | [peek] |
/// |----------|---------------|--------|
/// | *O*(log *n*) | *O*(log *n*) | *O*(1) |
///
/// [insert]: Heap::insert
/// [extract]: Heap::extract
/// [peek]: Heap::peek
pub struct Heap<T, C> {
    slots: Vec<Slot<T>>,
    free: Option<NodeId>,
    root: Option<NodeId>,
    size: usize,
    comparator: C,
}

impl<T, C> Heap<T, C> {
    /// Create an empty heap ordered by `comparator`.
    pub fn new(comparator: C) -> Self {
        Self {
            slots: Vec::new(),
            free: None,
            root: None,
            size: 0,
            comparator,
        }
    }

    /// Create an empty heap with room for `capacity` nodes.
    ///
    /// # Errors
    /// Returns `Error::AllocationFailure` if the node arena cannot be sized.
    pub fn with_capacity(capacity: usize, comparator: C) -> Result<Self> {
        let mut heap = Self::new(comparator);
        heap.reserve(capacity)?;
        Ok(heap)
    }

    /// Number of payloads in the heap.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if the heap holds nothing.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The minimum payload, if any.
    pub fn peek(&self) -> Option<&T> {
        self.root.map(|root| &self.node(root).data)
    }

    /// The comparator this heap orders by.
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Make sure the next `additional` inserts will not need to allocate.
    ///
    /// # Errors
    /// Returns `Error::AllocationFailure` if the arena cannot grow. The heap
    /// is unchanged in that case.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        if additional == 0 {
            return Ok(());
        }

        #[cfg(test)]
        if failpoint::take() {
            return Err(Error::AllocationFailure {
                requested: additional,
            });
        }

        let vacant = self.slots.len() - self.size;
        let needed = additional.saturating_sub(vacant);
        self.slots
            .try_reserve(needed)
            .map_err(|_| Error::AllocationFailure { requested: needed })
    }

    /// Tear the heap down, handing every payload to `free_data`.
    ///
    /// Payloads are visited in post-order: both subtrees of a node are
    /// released before the node itself. Dropping a heap instead simply drops
    /// the payloads.
    pub fn delete_with<F>(mut self, mut free_data: F)
    where
        F: FnMut(T),
    {
        let mut pending = Vec::new();
        if let Some(root) = self.root.take() {
            pending.push((root, false));
        }

        while let Some((id, expanded)) = pending.pop() {
            if expanded {
                free_data(self.release(id).data);
                continue;
            }
            let node = self.node(id);
            let (left, right) = (node.left, node.right);
            pending.push((id, true));
            pending.extend(right.map(|r| (r, false)));
            pending.extend(left.map(|l| (l, false)));
        }

        self.size = 0;
    }

    fn node(&self, id: NodeId) -> &HeapNode<T> {
        match &self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("dangling heap link to slot {}", id.0),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut HeapNode<T> {
        match &mut self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("dangling heap link to slot {}", id.0),
        }
    }

    fn try_node(&self, id: NodeId) -> Result<&HeapNode<T>> {
        match self.slots.get(id.0) {
            Some(Slot::Occupied(node)) => Ok(node),
            _ => Err(Error::InvariantViolation(format!(
                "link to slot {} does not name a live node",
                id.0
            ))),
        }
    }

    /// Place `node` in a vacant slot, reusing the free list first.
    fn alloc(&mut self, node: HeapNode<T>) -> NodeId {
        match self.free {
            Some(id) => {
                let slot = mem::replace(&mut self.slots[id.0], Slot::Occupied(node));
                self.free = match slot {
                    Slot::Vacant { next_free } => next_free,
                    Slot::Occupied(_) => unreachable!("free list names occupied slot {}", id.0),
                };
                id
            }
            None => {
                self.slots.push(Slot::Occupied(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    fn release(&mut self, id: NodeId) -> HeapNode<T> {
        let vacant = Slot::Vacant {
            next_free: self.free,
        };
        match mem::replace(&mut self.slots[id.0], vacant) {
            Slot::Occupied(node) => {
                self.free = Some(id);
                node
            }
            Slot::Vacant { .. } => unreachable!("double release of heap slot {}", id.0),
        }
    }

    /// Follow the route of the 1-based `index` down from the root.
    fn walk(&self, index: usize) -> Option<NodeId> {
        let mut node = self.root?;
        for side in path(index) {
            node = self.node(node).child(side)?;
        }
        Some(node)
    }

    /// Parent and side for the node that will occupy `index`, or `None` when
    /// `index` is the root position.
    fn locate_insertion_parent(&self, index: usize) -> Result<Option<(NodeId, Side)>> {
        if index == 1 {
            return Ok(None);
        }
        let parent = self.walk(index / 2).ok_or_else(|| {
            Error::InvariantViolation(format!("no parent node for position {index}"))
        })?;
        Ok(Some((parent, Side::of(index))))
    }

    fn locate_last_node(&self) -> Result<NodeId> {
        self.walk(self.size).ok_or_else(|| {
            Error::InvariantViolation(format!("no node at last position {}", self.size))
        })
    }

    fn swap_data(&mut self, a: NodeId, b: NodeId) {
        let (lo, hi) = if a.0 < b.0 { (a.0, b.0) } else { (b.0, a.0) };
        let (head, tail) = self.slots.split_at_mut(hi);
        match (&mut head[lo], &mut tail[0]) {
            (Slot::Occupied(x), Slot::Occupied(y)) => mem::swap(&mut x.data, &mut y.data),
            _ => unreachable!("swap involving a vacant heap slot"),
        }
    }
}

impl<T, C: Compare<T>> Heap<T, C> {
    /// Insert `data`, keeping the tree complete and heap-ordered.
    ///
    /// # Errors
    /// Returns `Error::AllocationFailure` if no node can be allocated. The
    /// heap is left exactly as it was and `data` is dropped.
    pub fn insert(&mut self, data: T) -> Result<()> {
        self.reserve(1)?;
        self.insert_reserved(data)
    }

    /// Insert into room made by an earlier [`Heap::reserve`] or by a slot that
    /// a previous extract vacated.
    pub(crate) fn insert_reserved(&mut self, data: T) -> Result<()> {
        let index = self.size + 1;
        let id = match self.locate_insertion_parent(index)? {
            Some((parent, side)) => {
                let id = self.alloc(HeapNode::leaf(data, Some(parent)));
                *self.node_mut(parent).child_mut(side) = Some(id);
                id
            }
            None => {
                let id = self.alloc(HeapNode::leaf(data, None));
                self.root = Some(id);
                id
            }
        };
        self.size = index;
        trace!("heap insert at position {index}");

        self.sift_up(id);
        Ok(())
    }

    /// Remove and return the minimum payload.
    ///
    /// # Errors
    /// Returns `Error::EmptyStructure` if the heap is empty.
    pub fn extract(&mut self) -> Result<T> {
        let root = self.root.ok_or(Error::EmptyStructure {
            required: 1,
            available: 0,
        })?;

        if self.size == 1 {
            let node = self.release(root);
            self.root = None;
            self.size = 0;
            // Nothing is linked any more; keep the capacity, drop the free list.
            self.slots.clear();
            self.free = None;
            return Ok(node.data);
        }

        let last = self.locate_last_node()?;
        let side = Side::of(self.size);
        let last = self.release(last);
        if let Some(parent) = last.parent {
            *self.node_mut(parent).child_mut(side) = None;
        }
        self.size -= 1;
        trace!("heap extract, last position now {}", self.size);

        let min = mem::replace(&mut self.node_mut(root).data, last.data);
        self.sift_down(root);
        Ok(min)
    }

    /// Drain the heap in comparator order.
    ///
    /// # Errors
    /// Returns `Error::InvariantViolation` if the heap turns out to be
    /// inconsistent partway through the drain.
    pub fn into_sorted_vec(mut self) -> Result<Vec<T>> {
        let mut sorted = Vec::with_capacity(self.size);
        while !self.is_empty() {
            sorted.push(self.extract()?);
        }
        Ok(sorted)
    }

    /// Check the shape, size, link and ordering invariants.
    ///
    /// # Errors
    /// Returns `Error::InvariantViolation` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let violation = |msg: String| Err(Error::InvariantViolation(msg));

        let Some(root) = self.root else {
            if self.size != 0 {
                return violation(format!("size is {} but there is no root", self.size));
            }
            return Ok(());
        };
        if self.try_node(root)?.parent.is_some() {
            return violation("root has a parent link".to_string());
        }

        let mut reachable = 0usize;
        let mut pending = VecDeque::from([(root, 1usize)]);
        while let Some((id, index)) = pending.pop_front() {
            reachable += 1;
            if index > self.size {
                return violation(format!(
                    "node at position {index} lies past size {}",
                    self.size
                ));
            }
            let node = self.try_node(id)?;
            for (side, child_index) in [(Side::Left, 2 * index), (Side::Right, 2 * index + 1)] {
                match node.child(side) {
                    Some(child) => {
                        let child_node = self.try_node(child)?;
                        if child_node.parent != Some(id) {
                            return violation(format!(
                                "position {child_index} does not link back to its parent"
                            ));
                        }
                        if self.comparator.compare(&node.data, &child_node.data)
                            == Ordering::Greater
                        {
                            return violation(format!(
                                "position {index} orders after its child at {child_index}"
                            ));
                        }
                        pending.push_back((child, child_index));
                    }
                    None if child_index <= self.size => {
                        return violation(format!("position {child_index} is missing"));
                    }
                    None => {}
                }
            }
        }

        if reachable != self.size {
            return violation(format!(
                "{reachable} nodes reachable but size is {}",
                self.size
            ));
        }
        Ok(())
    }

    fn sift_up(&mut self, mut id: NodeId) {
        while let Some(parent) = self.node(id).parent {
            let order = self
                .comparator
                .compare(&self.node(id).data, &self.node(parent).data);
            if order != Ordering::Less {
                break;
            }
            self.swap_data(id, parent);
            id = parent;
        }
    }

    fn sift_down(&mut self, mut id: NodeId) {
        loop {
            let node = self.node(id);
            let mut smallest = id;
            // Strict comparison: on ties the left child wins.
            for child in [node.left, node.right].into_iter().flatten() {
                let order = self
                    .comparator
                    .compare(&self.node(child).data, &self.node(smallest).data);
                if order == Ordering::Less {
                    smallest = child;
                }
            }
            if smallest == id {
                break;
            }
            self.swap_data(id, smallest);
            id = smallest;
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for Heap<T, C> {
    /// Lists payloads in level order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Heap ")?;
        f.debug_list()
            .entries(
                (1..=self.size)
                    .filter_map(|index| self.walk(index))
                    .map(|id| &self.node(id).data),
            )
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::init_test;
    use proptest::prelude::*;
    use std::cmp::Reverse;
    use std::collections::BinaryHeap;

    fn heap_of(values: &[i32]) -> Heap<i32, fn(&i32, &i32) -> Ordering> {
        let mut heap = Heap::new(i32::cmp as fn(&i32, &i32) -> Ordering);
        for &v in values {
            heap.insert(v).unwrap();
        }
        heap
    }

    #[test]
    fn test_path_decoding() {
        use Side::{Left, Right};
        assert_eq!(path(1).collect::<Vec<_>>(), Vec::<Side>::new());
        assert_eq!(path(2).collect::<Vec<_>>(), vec![Left]);
        assert_eq!(path(3).collect::<Vec<_>>(), vec![Right]);
        assert_eq!(path(5).collect::<Vec<_>>(), vec![Left, Right]);
        assert_eq!(path(6).collect::<Vec<_>>(), vec![Right, Left]);
        assert_eq!(path(13).collect::<Vec<_>>(), vec![Right, Left, Right]);
    }

    #[test]
    fn test_locate_positions() {
        // Ascending inserts never sift, so position k holds k.
        let heap = heap_of(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(heap.node(heap.locate_last_node().unwrap()).data, 6);

        let (parent, side) = heap.locate_insertion_parent(7).unwrap().unwrap();
        assert_eq!(heap.node(parent).data, 3);
        assert_eq!(side, Side::Right);

        let (parent, side) = heap.locate_insertion_parent(8).unwrap().unwrap();
        assert_eq!(heap.node(parent).data, 4);
        assert_eq!(side, Side::Left);

        assert!(heap.locate_insertion_parent(1).unwrap().is_none());
    }

    #[test]
    fn test_insert_and_drain() {
        init_test();
        let heap = heap_of(&[5, 3, 8, 1, 9, 2, 7]);
        assert_eq!(heap.len(), 7);
        assert_eq!(heap.peek(), Some(&1));
        heap.validate().unwrap();
        assert_eq!(heap.into_sorted_vec().unwrap(), vec![1, 2, 3, 5, 7, 8, 9]);
    }

    #[test]
    fn test_extract_empty() {
        let mut heap = heap_of(&[]);
        assert_eq!(
            heap.extract(),
            Err(Error::EmptyStructure {
                required: 1,
                available: 0
            })
        );
        assert!(heap.is_empty());
        assert!(heap.peek().is_none());
        heap.validate().unwrap();
    }

    #[test]
    fn test_extract_single() {
        let mut heap = heap_of(&[42]);
        assert_eq!(heap.extract(), Ok(42));
        assert!(heap.is_empty());
        assert!(heap.root.is_none());
        heap.validate().unwrap();
    }

    #[test]
    fn test_vacated_slots_are_reused() {
        let mut heap = heap_of(&[4, 1, 3, 2]);
        let slots = heap.slots.len();
        heap.extract().unwrap();
        heap.insert(0).unwrap();
        assert_eq!(heap.slots.len(), slots);
        heap.validate().unwrap();
        assert_eq!(heap.into_sorted_vec().unwrap(), vec![0, 2, 3, 4]);
    }

    #[test]
    fn test_duplicates() {
        let heap = heap_of(&[2, 2, 1, 1, 2, 1]);
        heap.validate().unwrap();
        assert_eq!(heap.into_sorted_vec().unwrap(), vec![1, 1, 1, 2, 2, 2]);
    }

    #[test]
    fn test_custom_comparator() {
        let mut heap = Heap::new(|a: &i32, b: &i32| b.cmp(a));
        for v in [3, 9, 1, 7] {
            heap.insert(v).unwrap();
        }
        heap.validate().unwrap();
        assert_eq!(heap.extract(), Ok(9));
        assert_eq!(heap.extract(), Ok(7));
    }

    #[test]
    fn test_insert_allocation_failure_leaves_heap_untouched() {
        let mut heap = heap_of(&[3, 1, 2]);
        failpoint::fail_nth_reserve(1);
        assert_eq!(
            heap.insert(0),
            Err(Error::AllocationFailure { requested: 1 })
        );
        assert_eq!(heap.len(), 3);
        heap.validate().unwrap();
        assert_eq!(heap.peek(), Some(&1));
        heap.insert(0).unwrap();
        assert_eq!(heap.into_sorted_vec().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_sorted_drain_reports_broken_shape() {
        let mut heap = heap_of(&[1, 2, 3]);
        // Claim a fourth position that no node occupies.
        heap.size = 4;
        assert!(heap.validate().is_err());
        assert!(matches!(
            heap.into_sorted_vec(),
            Err(Error::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_delete_with_is_post_order() {
        let heap = heap_of(&[1, 2, 3, 4, 5, 6, 7]);
        let mut freed = Vec::new();
        heap.delete_with(|v| freed.push(v));
        assert_eq!(freed, vec![4, 5, 2, 6, 7, 3, 1]);
    }

    #[test]
    fn test_delete_with_empty() {
        let mut calls = 0;
        heap_of(&[]).delete_with(|_| calls += 1);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_debug_is_level_order() {
        let heap = heap_of(&[1, 2, 3]);
        assert_eq!(format!("{heap:?}"), "Heap [1, 2, 3]");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_matches_binary_heap(
            ops in prop::collection::vec(prop::option::weighted(0.7, -50i32..50), 1..200),
        ) {
            let mut heap = heap_of(&[]);
            let mut model = BinaryHeap::new();
            for op in ops {
                match op {
                    Some(v) => {
                        heap.insert(v).unwrap();
                        model.push(Reverse(v));
                    }
                    None => {
                        let got = heap.extract().ok();
                        let want = model.pop().map(|Reverse(v)| v);
                        prop_assert_eq!(got, want);
                    }
                }
                prop_assert_eq!(heap.len(), model.len());
                prop_assert!(heap.validate().is_ok());
            }
        }
    }
}

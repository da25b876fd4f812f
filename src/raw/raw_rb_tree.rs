use alloc::collections::VecDeque;
use alloc::vec::Vec;

use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Color, Links, Node, Side};
use crate::error::AllocError;
use crate::tracing_helpers::debug_log;

/// The node graph backing `RbTree`: the node store, the sentinel and the element count.
///
/// This layer knows nothing about keys or ordering. It links nodes where it is told to, keeps the
/// red-black shape through `rebalance`, and walks in-order through `traverse`.
pub(crate) struct RawRbTree<T> {
    /// Slot store holding every content node.
    nodes: Arena<Node<T>>,
    /// Links of the sentinel; addressed as `Handle::SENTINEL`.
    header: Links,
    /// Number of content nodes linked into the tree.
    len: usize,
}

impl<T> RawRbTree<T> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            header: Links::empty_header(),
            len: 0,
        }
    }

    /// Creates a new tree whose node store is pre-sized for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            header: Links::empty_header(),
            len: 0,
        }
    }

    /// Creates a new tree that refuses to hold more than `limit` nodes.
    pub(crate) fn with_node_limit(limit: usize) -> Self {
        Self {
            nodes: Arena::with_limit(limit),
            header: Links::empty_header(),
            len: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) const fn node_limit(&self) -> usize {
        self.nodes.limit()
    }

    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), AllocError> {
        self.nodes.try_reserve(additional)
    }

    // ─── Link access ────────────────────────────────────────────────────────

    #[inline]
    pub(crate) fn links(&self, handle: Handle) -> &Links {
        if handle.is_sentinel() {
            &self.header
        } else {
            &self.nodes.get(handle).links
        }
    }

    #[inline]
    pub(crate) fn links_mut(&mut self, handle: Handle) -> &mut Links {
        if handle.is_sentinel() {
            &mut self.header
        } else {
            &mut self.nodes.get_mut(handle).links
        }
    }

    #[inline]
    pub(crate) fn parent(&self, handle: Handle) -> Handle {
        self.links(handle).parent
    }

    #[inline]
    pub(crate) fn left(&self, handle: Handle) -> Option<Handle> {
        self.links(handle).left
    }

    #[inline]
    pub(crate) fn right(&self, handle: Handle) -> Option<Handle> {
        self.links(handle).right
    }

    #[inline]
    pub(crate) fn child(&self, handle: Handle, side: Side) -> Option<Handle> {
        self.links(handle).child(side)
    }

    #[inline]
    pub(crate) fn color(&self, handle: Handle) -> Color {
        self.links(handle).color
    }

    #[inline]
    pub(crate) fn set_color(&mut self, handle: Handle, color: Color) {
        self.links_mut(handle).color = color;
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, handle: Handle, parent: Handle) {
        self.links_mut(handle).parent = parent;
    }

    #[inline]
    pub(crate) fn set_child(&mut self, handle: Handle, side: Side, child: Option<Handle>) {
        self.links_mut(handle).set_child(side, child);
    }

    /// Null slots count as black.
    #[inline]
    pub(crate) fn is_red(&self, handle: Option<Handle>) -> bool {
        handle.is_some_and(|h| self.color(h) == Color::Red)
    }

    /// Which child of its parent `handle` is. Must not be called on the root.
    #[inline]
    pub(crate) fn side_of(&self, handle: Handle) -> Side {
        if self.left(self.parent(handle)) == Some(handle) {
            Side::Left
        } else {
            Side::Right
        }
    }

    // ─── Sentinel bookkeeping ───────────────────────────────────────────────

    pub(crate) fn root(&self) -> Option<Handle> {
        let root = self.header.parent;
        (!root.is_sentinel()).then_some(root)
    }

    #[inline]
    pub(crate) fn is_root(&self, handle: Handle) -> bool {
        self.header.parent == handle
    }

    #[inline]
    pub(crate) fn set_root(&mut self, root: Handle) {
        self.header.parent = root;
    }

    /// The minimum node, or the sentinel when empty.
    #[inline]
    pub(crate) fn leftmost(&self) -> Handle {
        self.header.left.unwrap_or(Handle::SENTINEL)
    }

    /// The maximum node, or the sentinel when empty.
    #[inline]
    pub(crate) fn rightmost(&self) -> Handle {
        self.header.right.unwrap_or(Handle::SENTINEL)
    }

    #[inline]
    pub(crate) fn set_leftmost(&mut self, handle: Handle) {
        self.header.left = Some(handle);
    }

    #[inline]
    pub(crate) fn set_rightmost(&mut self, handle: Handle) {
        self.header.right = Some(handle);
    }

    pub(crate) fn min_node(&self, mut handle: Handle) -> Handle {
        while let Some(left) = self.left(handle) {
            handle = left;
        }
        handle
    }

    pub(crate) fn max_node(&self, mut handle: Handle) -> Handle {
        while let Some(right) = self.right(handle) {
            handle = right;
        }
        handle
    }

    pub(crate) fn reset_header(&mut self) {
        self.header = Links::empty_header();
    }

    // ─── Payload access ─────────────────────────────────────────────────────

    #[inline]
    pub(crate) fn value(&self, handle: Handle) -> &T {
        &self.nodes.get(handle).value
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, handle: Handle) -> &mut T {
        &mut self.nodes.get_mut(handle).value
    }

    /// Exchanges the payloads of two distinct nodes, leaving their links in place.
    pub(crate) fn swap_values(&mut self, a: Handle, b: Handle) {
        let (a, b) = self.nodes.get_pair_mut(a, b);
        core::mem::swap(&mut a.value, &mut b.value);
    }

    // ─── Node lifecycle ─────────────────────────────────────────────────────

    fn create_node(&mut self, value: T) -> Handle {
        self.nodes.alloc(Node::new(value))
    }

    pub(crate) fn destroy_node(&mut self, handle: Handle) -> T {
        self.nodes.take(handle).value
    }

    /// Links `value` as the `side` child of `parent` (the sentinel for an empty tree) and restores
    /// the red-black shape.
    ///
    /// The slot is allocated before any link changes, so a failed allocation leaves the tree as it
    /// was. Callers guarantee the slot is empty and that the position keeps the in-order sequence.
    pub(crate) fn insert_at(&mut self, parent: Handle, side: Side, value: T) -> Handle {
        let node = self.create_node(value);

        if parent.is_sentinel() {
            self.set_root(node);
            self.set_leftmost(node);
            self.set_rightmost(node);
        } else {
            self.set_child(parent, side, Some(node));
            match side {
                Side::Left if self.leftmost() == parent => self.set_leftmost(node),
                Side::Right if self.rightmost() == parent => self.set_rightmost(node),
                _ => {}
            }
        }
        self.set_parent(node, parent);

        self.rebalance_after_insert(node);
        self.len += 1;
        node
    }

    /// Unlinks and destroys a node, returning the payload that was stored at `handle` when the call
    /// began.
    ///
    /// When the node has two children, its in-order successor's payload moves into `handle` and the
    /// successor's slot is the one released.
    pub(crate) fn erase(&mut self, handle: Handle) -> T {
        let value = self.erase_node(handle);
        self.len -= 1;
        value
    }

    /// Destroys every node, walking level by level with an auxiliary queue so that tree depth never
    /// turns into call-stack depth.
    pub(crate) fn clear(&mut self) {
        let Some(root) = self.root() else {
            return;
        };

        let mut queue: VecDeque<Handle> = VecDeque::new();
        queue.push_back(root);
        let mut destroyed = 0usize;
        while let Some(current) = queue.pop_front() {
            let links = *self.links(current);
            if let Some(left) = links.left {
                queue.push_back(left);
            }
            if let Some(right) = links.right {
                queue.push_back(right);
            }
            drop(self.destroy_node(current));
            destroyed += 1;
        }
        debug_assert_eq!(destroyed, self.len);
        debug_log!(destroyed, "cleared tree");

        self.nodes.clear();
        self.reset_header();
        self.len = 0;
    }

    /// Removes every payload in in-order sequence.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<T> {
        let mut order = Vec::with_capacity(self.len);
        let mut current = self.leftmost();
        while !current.is_sentinel() {
            order.push(current);
            current = self.increment(current);
        }

        let result = order.into_iter().map(|handle| self.destroy_node(handle)).collect();
        self.nodes.clear();
        self.reset_header();
        self.len = 0;
        result
    }
}

impl<T: Clone> Clone for RawRbTree<T> {
    /// Pre-order copy of the node graph, colors included. The copy's cached extremes are derived
    /// from its own nodes once the structure is in place.
    fn clone(&self) -> Self {
        let mut copy = Self {
            nodes: Arena::with_limit(self.nodes.limit()),
            header: Links::empty_header(),
            len: self.len,
        };

        let Some(root) = self.root() else {
            return copy;
        };

        // (source node, parent of the copy, side of the copy under that parent)
        let mut stack: SmallVec<[(Handle, Handle, Side); 64]> = SmallVec::new();
        stack.push((root, Handle::SENTINEL, Side::Left));
        while let Some((source, parent, side)) = stack.pop() {
            let node = copy.nodes.alloc(Node {
                links: Links {
                    color: self.color(source),
                    parent,
                    left: None,
                    right: None,
                },
                value: self.value(source).clone(),
            });
            if parent.is_sentinel() {
                copy.set_root(node);
            } else {
                copy.set_child(parent, side, Some(node));
            }

            // Right first so the left subtree is copied first.
            if let Some(right) = self.right(source) {
                stack.push((right, node, Side::Right));
            }
            if let Some(left) = self.left(source) {
                stack.push((left, node, Side::Left));
            }
        }

        let copy_root = copy.header.parent;
        let (min, max) = (copy.min_node(copy_root), copy.max_node(copy_root));
        copy.set_leftmost(min);
        copy.set_rightmost(max);
        debug_log!(len = copy.len, "deep-copied tree");
        copy
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::uninlined_format_args)]
mod tests {
    use super::*;
    use alloc::string::String;
    use alloc::vec;
    use proptest::prelude::*;

    impl<T> RawRbTree<T> {
        /// Validates the structural red-black invariants and returns the tree's black-height.
        /// Panics with a descriptive message if any are violated.
        pub(crate) fn validate_structure(&self) -> usize {
            let mut errors: Vec<String> = Vec::new();

            if self.header.color != Color::Red {
                errors.push("sentinel must keep its red marker".into());
            }

            let Some(root) = self.root() else {
                assert_eq!(self.len, 0, "Empty tree should have len 0");
                assert_eq!(self.leftmost(), Handle::SENTINEL, "Empty tree should cache the sentinel as minimum");
                assert_eq!(self.rightmost(), Handle::SENTINEL, "Empty tree should cache the sentinel as maximum");
                assert!(self.nodes.is_empty(), "Empty tree should hold no nodes");
                return 0;
            };

            if self.parent(root) != Handle::SENTINEL {
                errors.push(alloc::format!("root {:?} does not point back at the sentinel", root));
            }
            if self.color(root) != Color::Black {
                errors.push(alloc::format!("root {:?} is not black", root));
            }

            let mut count = 0usize;
            let black_height = self.validate_node(root, &mut count, &mut errors);

            if count != self.len {
                errors.push(alloc::format!("len mismatch: self.len={}, reachable={}", self.len, count));
            }
            if count != self.nodes.len() {
                errors.push(alloc::format!("store holds {} nodes but {} are reachable", self.nodes.len(), count));
            }
            if self.leftmost() != self.min_node(root) {
                errors.push(alloc::format!("leftmost cache {:?} != minimum {:?}", self.leftmost(), self.min_node(root)));
            }
            if self.rightmost() != self.max_node(root) {
                errors.push(alloc::format!("rightmost cache {:?} != maximum {:?}", self.rightmost(), self.max_node(root)));
            }

            assert!(errors.is_empty(), "Tree invariant violations:\n{}", errors.join("\n"));
            black_height
        }

        fn validate_node(&self, handle: Handle, count: &mut usize, errors: &mut Vec<String>) -> usize {
            *count += 1;
            let links = *self.links(handle);

            let mut heights = [0usize; 2];
            for (slot, side) in [Side::Left, Side::Right].into_iter().enumerate() {
                let Some(child) = links.child(side) else {
                    continue;
                };
                if self.parent(child) != handle {
                    errors.push(alloc::format!("child {:?} of {:?} has parent {:?}", child, handle, self.parent(child)));
                }
                if links.color == Color::Red && self.color(child) == Color::Red {
                    errors.push(alloc::format!("red node {:?} has red child {:?}", handle, child));
                }
                heights[slot] = self.validate_node(child, count, errors);
            }

            if heights[0] != heights[1] {
                errors.push(alloc::format!(
                    "black-height mismatch under {:?}: left={}, right={}",
                    handle,
                    heights[0],
                    heights[1]
                ));
            }
            heights[0] + usize::from(links.color == Color::Black)
        }

        /// Values in in-order sequence, read by walking the cursor protocol.
        pub(crate) fn in_order(&self) -> Vec<&T> {
            let mut out = Vec::new();
            let mut current = self.leftmost();
            while !current.is_sentinel() {
                out.push(self.value(current));
                current = self.increment(current);
            }
            out
        }
    }

    impl<T: Ord> RawRbTree<T> {
        /// Plain binary-search-tree descent; ties go right.
        pub(crate) fn insert_ord(&mut self, value: T) -> Handle {
            let mut parent = Handle::SENTINEL;
            let mut side = Side::Left;
            let mut current = self.root();
            while let Some(node) = current {
                parent = node;
                side = if value < *self.value(node) {
                    Side::Left
                } else {
                    Side::Right
                };
                current = self.child(node, side);
            }
            self.insert_at(parent, side, value)
        }

        pub(crate) fn find_ord(&self, value: &T) -> Option<Handle> {
            let mut current = self.root();
            while let Some(node) = current {
                match value.cmp(self.value(node)) {
                    core::cmp::Ordering::Less => current = self.left(node),
                    core::cmp::Ordering::Greater => current = self.right(node),
                    core::cmp::Ordering::Equal => return Some(node),
                }
            }
            None
        }
    }

    #[test]
    fn empty_tree_is_valid() {
        let tree: RawRbTree<i32> = RawRbTree::new();
        assert_eq!(tree.validate_structure(), 0);
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
    }

    #[test]
    fn single_node_is_root_min_and_max() {
        let mut tree = RawRbTree::new();
        let node = tree.insert_ord(42);
        tree.validate_structure();
        assert_eq!(tree.root(), Some(node));
        assert_eq!(tree.leftmost(), node);
        assert_eq!(tree.rightmost(), node);
        assert_eq!(tree.color(node), Color::Black);
        assert_eq!(tree.parent(node), Handle::SENTINEL);
    }

    #[test]
    fn ascending_inserts_stay_balanced() {
        let mut tree = RawRbTree::new();
        for i in 0..1000 {
            tree.insert_ord(i);
        }
        let black_height = tree.validate_structure();
        // A red-black tree of n nodes has black-height at most log2(n + 1).
        assert!(black_height <= 10, "black height {} too large", black_height);
        assert_eq!(tree.in_order().into_iter().copied().collect::<Vec<_>>(), (0..1000).collect::<Vec<_>>());
    }

    #[test]
    fn clear_resets_to_empty_state() {
        let mut tree = RawRbTree::new();
        for i in (0..200).rev() {
            tree.insert_ord(i);
        }
        tree.clear();
        assert_eq!(tree.validate_structure(), 0);

        // The tree remains usable after clearing.
        tree.insert_ord(7);
        tree.validate_structure();
        assert_eq!(tree.in_order(), vec![&7]);
    }

    #[test]
    fn clear_of_large_tree_uses_no_recursion() {
        let mut tree = RawRbTree::new();
        for i in 0..50_000u32 {
            tree.insert_ord(i);
        }
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.leftmost(), Handle::SENTINEL);
    }

    #[test]
    fn clone_preserves_shape_and_colors() {
        let mut tree = RawRbTree::new();
        for i in [10, 7, 8, 15, 5, 6, 11, 13, 12] {
            tree.insert_ord(i);
        }
        let copy = tree.clone();
        copy.validate_structure();

        let colors = |t: &RawRbTree<i32>| {
            let mut out = Vec::new();
            let mut current = t.leftmost();
            while !current.is_sentinel() {
                out.push((*t.value(current), t.color(current)));
                current = t.increment(current);
            }
            out
        };
        assert_eq!(colors(&tree), colors(&copy));
        assert_eq!(copy.value(copy.root().unwrap()), tree.value(tree.root().unwrap()));
    }

    #[test]
    fn clone_of_empty_tree_is_empty() {
        let tree: RawRbTree<i32> = RawRbTree::with_node_limit(4);
        let copy = tree.clone();
        assert_eq!(copy.validate_structure(), 0);
        assert_eq!(copy.node_limit(), 4);
    }

    #[test]
    fn drain_yields_in_order_and_empties() {
        let mut tree = RawRbTree::new();
        for i in [5, 1, 4, 2, 3] {
            tree.insert_ord(i);
        }
        assert_eq!(tree.drain_to_vec(), vec![1, 2, 3, 4, 5]);
        assert_eq!(tree.validate_structure(), 0);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Remove(i32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0i32..300).prop_map(Op::Insert),
            2 => (0i32..300).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn structure_maintained_after_operations(ops in prop::collection::vec(op_strategy(), 0..400)) {
            let mut tree: RawRbTree<i32> = RawRbTree::new();
            let mut model: Vec<i32> = Vec::new();

            for op in ops {
                match op {
                    Op::Insert(value) => {
                        tree.insert_ord(value);
                        let at = model.partition_point(|&v| v <= value);
                        model.insert(at, value);
                    }
                    Op::Remove(value) => {
                        if let Some(handle) = tree.find_ord(&value) {
                            prop_assert_eq!(tree.erase(handle), value);
                            let at = model.iter().position(|&v| v == value).unwrap();
                            model.remove(at);
                        } else {
                            prop_assert!(!model.contains(&value));
                        }
                    }
                }
                tree.validate_structure();
                prop_assert_eq!(tree.in_order().into_iter().copied().collect::<Vec<_>>(), model.clone());
            }
        }

        #[test]
        fn clone_is_independent(values in prop::collection::vec(0i32..1000, 1..200)) {
            let mut tree: RawRbTree<i32> = RawRbTree::new();
            for &v in &values {
                tree.insert_ord(v);
            }
            let before: Vec<i32> = tree.in_order().into_iter().copied().collect();

            let mut copy = tree.clone();
            copy.validate_structure();
            let root = copy.root().unwrap();
            copy.erase(root);
            copy.insert_ord(-1);
            copy.validate_structure();

            tree.validate_structure();
            prop_assert_eq!(tree.in_order().into_iter().copied().collect::<Vec<_>>(), before);
            prop_assert_eq!(tree.len(), values.len());
        }
    }
}

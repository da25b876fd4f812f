use super::handle::Handle;
use super::node::Color;
use super::raw_rb_tree::RawRbTree;

impl<T> RawRbTree<T> {
    /// `true` for the sentinel: the only red node whose grandparent is itself.
    ///
    /// The root's grandparent is also the root, but the root is always black.
    #[inline]
    pub(crate) fn is_header(&self, node: Handle) -> bool {
        self.color(node) == Color::Red && self.parent(self.parent(node)) == node
    }

    /// The in-order successor of `node`; the sentinel after the maximum. Stepping from the sentinel
    /// stays on the sentinel.
    pub(crate) fn increment(&self, node: Handle) -> Handle {
        if node.is_sentinel() {
            return node;
        }
        if let Some(right) = self.right(node) {
            return self.min_node(right);
        }

        let mut node = node;
        let mut parent = self.parent(node);
        while self.right(parent) == Some(node) {
            node = parent;
            parent = self.parent(node);
        }
        // Climbing from the maximum of a tree whose root has no right subtree ends with `node` on
        // the sentinel and `parent` on the root; `node` is then already the answer.
        if self.right(node) != Some(parent) {
            node = parent;
        }
        node
    }

    /// The in-order predecessor of `node`; the maximum when `node` is the sentinel, and the
    /// sentinel when `node` is the minimum.
    pub(crate) fn decrement(&self, node: Handle) -> Handle {
        if self.is_header(node) {
            return self.rightmost();
        }
        if let Some(left) = self.left(node) {
            return self.max_node(left);
        }
        if node == self.leftmost() {
            return Handle::SENTINEL;
        }

        let mut node = node;
        let mut parent = self.parent(node);
        while self.left(parent) == Some(node) {
            node = parent;
            parent = self.parent(node);
        }
        parent
    }
}

//! Rotations and the two bottom-up repair procedures that keep the red-black invariants.
//!
//! Every case is written once against a [`Side`]; its mirror image is the same code with the
//! sides exchanged.

use super::handle::Handle;
use super::node::{Color, Side};
use super::raw_rb_tree::RawRbTree;
use crate::tracing_helpers::trace_log;

impl<T> RawRbTree<T> {
    /// Points whatever referenced `old` as a child (its parent, or the sentinel's root slot) at
    /// `new` instead.
    fn replace_in_parent(&mut self, old: Handle, new: Option<Handle>) {
        if self.is_root(old) {
            self.set_root(new.unwrap_or(Handle::SENTINEL));
        } else {
            let parent = self.parent(old);
            let side = self.side_of(old);
            self.set_child(parent, side, new);
        }
    }

    /// Rotates the subtree rooted at `x` so that `x` moves down on `side`.
    ///
    /// `x`'s child on the opposite side takes its place; that child's inner subtree is re-homed
    /// under `x`. In-order sequence is unchanged. Colors are untouched.
    ///
    /// # Panics
    ///
    /// Panics if `x` has no child on the opposite side.
    pub(crate) fn rotate(&mut self, x: Handle, side: Side) {
        let y = self
            .child(x, side.opposite())
            .expect("`RawRbTree::rotate()` - the pivot needs a child on the rising side!");
        trace_log!(?x, ?y, ?side, "rotate");

        let inner = self.child(y, side);
        self.set_child(x, side.opposite(), inner);
        if let Some(inner) = inner {
            self.set_parent(inner, x);
        }

        let parent = self.parent(x);
        self.replace_in_parent(x, Some(y));
        self.set_parent(y, parent);

        self.set_child(y, side, Some(x));
        self.set_parent(x, y);
    }

    /// Restores the red-black shape after `x` was linked in as a leaf.
    pub(crate) fn rebalance_after_insert(&mut self, mut x: Handle) {
        self.set_color(x, Color::Red);

        while !self.is_root(x) && self.color(self.parent(x)) == Color::Red {
            // A red parent is never the root, so the grandparent is a content node.
            let parent = self.parent(x);
            let grandparent = self.parent(parent);
            let side = self.side_of(parent);
            let uncle = self.child(grandparent, side.opposite());

            if self.is_red(uncle) {
                trace_log!(?x, "insert fix-up: red uncle, recolor");
                self.set_color(parent, Color::Black);
                if let Some(uncle) = uncle {
                    self.set_color(uncle, Color::Black);
                }
                self.set_color(grandparent, Color::Red);
                x = grandparent;
            } else {
                if self.side_of(x) != side {
                    trace_log!(?x, "insert fix-up: inner child, straighten");
                    x = parent;
                    self.rotate(x, side);
                }
                trace_log!(?x, "insert fix-up: outer child, rotate grandparent");
                let parent = self.parent(x);
                let grandparent = self.parent(parent);
                self.set_color(parent, Color::Black);
                self.set_color(grandparent, Color::Red);
                self.rotate(grandparent, side.opposite());
            }
        }

        if let Some(root) = self.root() {
            self.set_color(root, Color::Black);
        }
    }

    /// Unlinks `z` and releases one node slot, returning the payload `z` held.
    ///
    /// The three shapes:
    /// * two children: the in-order successor's payload moves into `z`, then the successor (which
    ///   has at most a right child) is erased in its place;
    /// * one child: `z` is black and its child red, so the child is spliced up and painted black;
    /// * leaf: a red leaf is simply detached; a black leaf first runs the double-black fix-up
    ///   with itself as the deficient node, then is detached.
    pub(crate) fn erase_node(&mut self, z: Handle) -> T {
        let links = *self.links(z);
        match (links.left, links.right) {
            (Some(_), Some(right)) => {
                let successor = self.min_node(right);
                self.swap_values(z, successor);
                self.erase_node(successor)
            }
            (Some(child), None) | (None, Some(child)) => {
                self.replace_in_parent(z, Some(child));
                self.set_parent(child, links.parent);
                self.set_color(child, Color::Black);

                if self.leftmost() == z {
                    let min = self.min_node(child);
                    self.set_leftmost(min);
                }
                if self.rightmost() == z {
                    let max = self.max_node(child);
                    self.set_rightmost(max);
                }
                self.destroy_node(z)
            }
            (None, None) => {
                if self.is_root(z) {
                    self.reset_header();
                    return self.destroy_node(z);
                }

                if links.color == Color::Black {
                    self.rebalance_for_erase(z);
                }

                // The fix-up never moves `z` off the leaf position it holds.
                let parent = self.parent(z);
                let side = self.side_of(z);
                self.set_child(parent, side, None);
                if self.leftmost() == z {
                    self.set_leftmost(parent);
                }
                if self.rightmost() == z {
                    self.set_rightmost(parent);
                }
                self.destroy_node(z)
            }
        }
    }

    /// Double-black fix-up. `x` is a black, non-root node whose side of the tree is one black node
    /// short once `x` goes away.
    fn rebalance_for_erase(&mut self, mut x: Handle) {
        while !self.is_root(x) && self.color(x) == Color::Black {
            let parent = self.parent(x);
            let side = self.side_of(x);
            let sibling = self
                .child(parent, side.opposite())
                .expect("`RawRbTree::rebalance_for_erase()` - a double-black node always has a sibling!");

            if self.color(sibling) == Color::Red {
                trace_log!(?x, "erase fix-up: red sibling");
                self.rotate(parent, side);
                self.set_color(sibling, Color::Black);
                self.set_color(parent, Color::Red);
                continue;
            }

            let far = self.child(sibling, side.opposite());
            let near = self.child(sibling, side);

            if let Some(far) = far.filter(|&h| self.color(h) == Color::Red) {
                trace_log!(?x, "erase fix-up: far nephew red");
                let parent_color = self.color(parent);
                self.rotate(parent, side);
                self.set_color(sibling, parent_color);
                self.set_color(parent, Color::Black);
                self.set_color(far, Color::Black);
                return;
            }

            if let Some(near) = near.filter(|&h| self.color(h) == Color::Red) {
                trace_log!(?x, "erase fix-up: near nephew red");
                self.rotate(sibling, side.opposite());
                self.set_color(sibling, Color::Red);
                self.set_color(near, Color::Black);
                continue;
            }

            trace_log!(?x, "erase fix-up: black nephews, recolor");
            self.set_color(sibling, Color::Red);
            if self.color(parent) == Color::Red {
                self.set_color(parent, Color::Black);
                return;
            }
            x = parent;
        }

        self.set_color(x, Color::Black);
    }
}

use crate::raw::Handle;

/// A position in an [`RbTree`](crate::RbTree): one element, or the end.
///
/// A cursor is a plain token. It borrows nothing, so it stays `Copy` while the tree is mutated,
/// and every access goes back through the tree ([`RbTree::get`](crate::RbTree::get),
/// [`RbTree::increment`](crate::RbTree::increment), ...). A cursor stays valid until the element
/// it names is erased; erasing an element with two children also relocates its in-order successor
/// (see [`RbTree::erase`](crate::RbTree::erase)). Using an invalidated cursor is a logic error that
/// may panic or name an unrelated element, but never causes undefined behavior.
///
/// # Examples
///
/// ```
/// use rbtree_core::RbTree;
///
/// let tree: RbTree<i32> = [2, 1, 3].into_iter().collect();
/// let mut cursor = tree.begin();
/// let mut seen = Vec::new();
/// while cursor != tree.end() {
///     seen.push(*tree.get(cursor).unwrap());
///     cursor = tree.increment(cursor);
/// }
/// assert_eq!(seen, [1, 2, 3]);
/// assert!(tree.end().is_end());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cursor(pub(crate) Handle);

impl Cursor {
    pub(crate) const END: Self = Self(Handle::SENTINEL);

    /// Returns `true` if this is the past-the-end position.
    #[must_use]
    #[inline]
    pub const fn is_end(self) -> bool {
        self.0.is_sentinel()
    }
}

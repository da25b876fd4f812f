use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::ops::{Bound, RangeBounds};

use crate::compare::{Compare, Less};
use crate::cursor::Cursor;
use crate::error::AllocError;
use crate::key_of::{Identity, KeyOf};
use crate::raw::{Handle, RawRbTree, Side};
use crate::tracing_helpers::debug_log;

mod iter;

pub use iter::{IntoIter, Iter, Range};

/// An ordered container built on a red-black tree.
///
/// `RbTree` is the engine behind [`RbSet`](crate::RbSet), [`RbMultiSet`](crate::RbMultiSet),
/// [`RbMap`](crate::RbMap) and [`RbMultiMap`](crate::RbMultiMap), and can be used directly when
/// those don't fit. Elements of type `T` are ordered by the key that `X` projects out of them
/// (see [`KeyOf`]), compared with the strict weak ordering `C` (see [`Compare`]).
///
/// The tree stores duplicates or rejects them per call: [`insert_unique`](RbTree::insert_unique)
/// refuses an element whose key is equivalent to one already present, while
/// [`insert_equal`](RbTree::insert_equal) always inserts, after any equivalent elements.
///
/// Positions are [`Cursor`]s. The past-the-end position [`end`](RbTree::end) closes the ring:
/// stepping forward from the maximum reaches it and stepping backward from it reaches the maximum.
///
/// Search, insertion and removal take O(log n) time; stepping a cursor takes amortized O(1) and
/// worst-case O(log n). Nodes live in a slot store owned by the tree, so no operation recurses on
/// tree depth.
///
/// It is a logic error for an element's key to be modified in such a way that its ordering
/// relative to any other key changes while it is in the tree. The behavior resulting from such a
/// logic error is not specified, but will be encapsulated to the `RbTree` that observed it and not
/// result in undefined behavior.
///
/// # Examples
///
/// ```
/// use rbtree_core::RbTree;
///
/// let mut tree: RbTree<i32> = RbTree::new();
/// let (_, inserted) = tree.insert_unique(10);
/// assert!(inserted);
/// let (cursor, inserted) = tree.insert_unique(10);
/// assert!(!inserted);
/// assert_eq!(tree.get(cursor), Some(&10));
///
/// tree.insert_equal(10);
/// tree.insert_equal(5);
/// assert_eq!(tree.count(&10), 2);
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [5, 10, 10]);
/// ```
pub struct RbTree<T, X = Identity, C = Less> {
    raw: RawRbTree<T>,
    compare: C,
    key_of: PhantomData<fn() -> X>,
}

/// Where an insertion will link its node: as the `side` child of `parent`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct InsertPosition {
    parent: Handle,
    side: Side,
}

impl<T, X, C: Default> RbTree<T, X, C> {
    /// Makes a new, empty `RbTree` ordered by `C::default()`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbTree;
    ///
    /// let mut tree: RbTree<&str> = RbTree::new();
    /// tree.insert_unique("a");
    /// assert_eq!(tree.len(), 1);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_compare(C::default())
    }

    /// Makes a new, empty `RbTree` with room for at least `capacity` nodes before the node store
    /// reallocates.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbTree;
    ///
    /// let tree: RbTree<u8> = RbTree::with_capacity(16);
    /// assert!(tree.capacity() >= 16);
    /// assert!(tree.is_empty());
    /// ```
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            raw: RawRbTree::with_capacity(capacity),
            compare: C::default(),
            key_of: PhantomData,
        }
    }

    /// Makes a new, empty `RbTree` that will never hold more than `limit` elements.
    ///
    /// Once the limit is reached, the `try_insert_*` methods return [`AllocError::NodeLimit`]
    /// and the infallible insertions panic.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::{AllocError, RbTree};
    ///
    /// let mut tree: RbTree<i32> = RbTree::with_node_limit(2);
    /// assert!(tree.try_insert_equal(1).is_ok());
    /// assert!(tree.try_insert_equal(1).is_ok());
    /// assert_eq!(tree.try_insert_equal(1), Err(AllocError::NodeLimit { limit: 2 }));
    ///
    /// // Rejected duplicates never need a node.
    /// assert_eq!(tree.try_insert_unique(1).map(|(_, inserted)| inserted), Ok(false));
    /// ```
    #[must_use]
    pub fn with_node_limit(limit: usize) -> Self {
        Self::with_compare_and_node_limit(C::default(), limit)
    }
}

impl<T, X, C> RbTree<T, X, C> {
    /// Makes a new, empty `RbTree` ordered by `compare`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::{FnCompare, Identity, RbTree};
    ///
    /// let mut tree: RbTree<i32, Identity, _> = RbTree::with_compare(FnCompare(|a: &i32, b: &i32| a.abs() < b.abs()));
    /// tree.insert_equal(-3);
    /// tree.insert_equal(2);
    /// tree.insert_equal(-1);
    /// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [-1, 2, -3]);
    /// ```
    #[must_use]
    pub const fn with_compare(compare: C) -> Self {
        Self {
            raw: RawRbTree::new(),
            compare,
            key_of: PhantomData,
        }
    }

    /// Makes a new, empty `RbTree` ordered by `compare` that will never hold more than `limit`
    /// elements.
    #[must_use]
    pub fn with_compare_and_node_limit(compare: C, limit: usize) -> Self {
        Self {
            raw: RawRbTree::with_node_limit(limit),
            compare,
            key_of: PhantomData,
        }
    }

    /// Returns the ordering predicate.
    #[must_use]
    pub const fn key_compare(&self) -> &C {
        &self.compare
    }

    /// Returns the number of elements in the tree.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no elements.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the number of nodes the node store can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns the maximum number of elements this tree will ever hold.
    #[must_use]
    pub const fn node_limit(&self) -> usize {
        self.raw.node_limit()
    }

    /// Tries to make room for at least `additional` more elements.
    ///
    /// After a successful call, the next `additional` insertions cannot fail for lack of a node.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the node limit would be exceeded or the allocator fails. The
    /// tree is unchanged in that case.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), AllocError> {
        self.raw.try_reserve(additional)
    }

    /// Returns a cursor on the first (minimum) element, or [`end`](RbTree::end) when empty.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn begin(&self) -> Cursor {
        Cursor(self.raw.leftmost())
    }

    /// Returns the past-the-end cursor.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn end(&self) -> Cursor {
        Cursor::END
    }

    /// Returns the cursor after `cursor` in ascending order. Stepping from the maximum yields
    /// [`end`](RbTree::end); stepping from `end` stays at `end`.
    ///
    /// # Panics
    ///
    /// May panic if `cursor` has been invalidated.
    #[must_use]
    pub fn increment(&self, cursor: Cursor) -> Cursor {
        Cursor(self.raw.increment(cursor.0))
    }

    /// Returns the cursor before `cursor` in ascending order. Stepping from
    /// [`end`](RbTree::end) yields the maximum; stepping from [`begin`](RbTree::begin) yields
    /// `end`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbTree;
    ///
    /// let tree: RbTree<i32> = [1, 2].into_iter().collect();
    /// let last = tree.decrement(tree.end());
    /// assert_eq!(tree.get(last), Some(&2));
    /// assert_eq!(tree.decrement(tree.begin()), tree.end());
    /// ```
    ///
    /// # Panics
    ///
    /// May panic if `cursor` has been invalidated.
    #[must_use]
    pub fn decrement(&self, cursor: Cursor) -> Cursor {
        Cursor(self.raw.decrement(cursor.0))
    }

    /// Returns the element at `cursor`, or `None` for [`end`](RbTree::end).
    ///
    /// # Panics
    ///
    /// May panic if `cursor` has been invalidated.
    #[must_use]
    pub fn get(&self, cursor: Cursor) -> Option<&T> {
        (!cursor.is_end()).then(|| self.raw.value(cursor.0))
    }

    /// Mutable access to the element at `cursor`. Callers must not change its key.
    pub(crate) fn get_mut(&mut self, cursor: Cursor) -> Option<&mut T> {
        (!cursor.is_end()).then(|| self.raw.value_mut(cursor.0))
    }

    /// Like `get_mut`, for a cursor known to name an element.
    pub(crate) fn element_mut(&mut self, cursor: Cursor) -> &mut T {
        self.raw.value_mut(cursor.0)
    }

    /// Returns the minimum element.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.get(self.begin())
    }

    /// Returns the maximum element.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.get(Cursor(self.raw.rightmost()))
    }

    /// Removes the element at `cursor` and returns the cursor of the element that followed it.
    ///
    /// The returned cursor is valid even when the erased node had two children: in that case its
    /// in-order successor's element moves into the erased node's position, so the returned
    /// cursor equals `cursor`, and any cursor previously held on that successor is invalidated.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbTree;
    ///
    /// let mut tree: RbTree<i32> = (1..=5).collect();
    /// let mut cursor = tree.find(&2);
    /// cursor = tree.erase(cursor);
    /// assert_eq!(tree.get(cursor), Some(&3));
    /// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 3, 4, 5]);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `cursor` is [`end`](RbTree::end), and may panic if it has been invalidated.
    pub fn erase(&mut self, cursor: Cursor) -> Cursor {
        assert!(!cursor.is_end(), "`RbTree::erase()` - cannot erase the end position!");
        let node = cursor.0;
        let next = if self.has_two_children(node) {
            node
        } else {
            self.raw.increment(node)
        };
        drop(self.raw.erase(node));
        Cursor(next)
    }

    /// Removes and returns the element at `cursor`, or returns `None` for
    /// [`end`](RbTree::end).
    ///
    /// Invalidates the same cursors as [`erase`](RbTree::erase).
    ///
    /// # Panics
    ///
    /// May panic if `cursor` has been invalidated.
    pub fn remove(&mut self, cursor: Cursor) -> Option<T> {
        (!cursor.is_end()).then(|| self.raw.erase(cursor.0))
    }

    /// Removes every element in `[first, last)` and returns the cursor now holding the element
    /// `last` held (which may have moved).
    ///
    /// Erasing the whole tree, `[begin, end)`, is a [`clear`](RbTree::clear).
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbTree;
    ///
    /// let mut tree: RbTree<i32> = (0..10).collect();
    /// let last = tree.erase_range(tree.lower_bound(&2), tree.lower_bound(&8));
    /// assert_eq!(tree.get(last), Some(&8));
    /// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [0, 1, 8, 9]);
    /// ```
    ///
    /// # Panics
    ///
    /// May panic if either cursor has been invalidated, or if `last` is not reachable from
    /// `first`.
    pub fn erase_range(&mut self, first: Cursor, last: Cursor) -> Cursor {
        if first == self.begin() && last.is_end() {
            self.clear();
            return Cursor::END;
        }

        let mut current = first.0;
        let mut last = last.0;
        let mut erased = 0usize;
        while current != last {
            if self.has_two_children(current) {
                let successor = self.raw.min_node(self.raw.right(current).unwrap_or(current));
                if successor == last {
                    // `last`'s element is about to move into `current`.
                    last = current;
                }
            }
            current = self.erase(Cursor(current)).0;
            erased += 1;
        }
        debug_log!(erased, "erased range");
        Cursor(last)
    }

    /// Removes and returns the minimum element.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_first(&mut self) -> Option<T> {
        self.remove(self.begin())
    }

    /// Removes and returns the maximum element.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_last(&mut self) -> Option<T> {
        self.remove(Cursor(self.raw.rightmost()))
    }

    /// Removes every element, releasing all nodes. Does not recurse, whatever the tree's shape.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Exchanges the contents (and ordering predicates) of two trees in O(1).
    ///
    /// Cursors stay attached to their elements: after the swap, cursors obtained from `self`
    /// must be used with `other`.
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Gets an iterator over the elements in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbTree;
    ///
    /// let tree: RbTree<i32> = [3, 1, 2].into_iter().collect();
    /// let mut iter = tree.iter();
    /// assert_eq!(iter.next(), Some(&1));
    /// assert_eq!(iter.next_back(), Some(&3));
    /// assert_eq!(iter.next(), Some(&2));
    /// assert_eq!(iter.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.raw, self.raw.leftmost(), Handle::SENTINEL, self.raw.len())
    }

    fn has_two_children(&self, node: Handle) -> bool {
        self.raw.left(node).is_some() && self.raw.right(node).is_some()
    }
}

impl<T, X, C> RbTree<T, X, C>
where
    X: KeyOf<T>,
    C: Compare<X::Key>,
{
    #[inline]
    fn key(&self, node: Handle) -> &X::Key {
        X::key_of(self.raw.value(node))
    }

    #[inline]
    fn key_less<Q: ?Sized>(&self, a: &Q, b: &Q) -> bool
    where
        C: Compare<Q>,
    {
        <C as Compare<Q>>::less(&self.compare, a, b)
    }

    /// Returns a cursor on the first element whose key is not less than `key`, or
    /// [`end`](RbTree::end) if there is none.
    ///
    /// The key may be any borrowed form of the tree's key type, but the ordering on the borrowed
    /// form *must* match the ordering on the key type.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbTree;
    ///
    /// let tree: RbTree<i32> = [10, 20, 30].into_iter().collect();
    /// assert_eq!(tree.get(tree.lower_bound(&20)), Some(&20));
    /// assert_eq!(tree.get(tree.lower_bound(&21)), Some(&30));
    /// assert!(tree.lower_bound(&31).is_end());
    /// ```
    pub fn lower_bound<Q>(&self, key: &Q) -> Cursor
    where
        X::Key: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let mut bound = Handle::SENTINEL;
        let mut current = self.raw.root();
        while let Some(node) = current {
            if self.key_less::<Q>(self.key(node).borrow(), key) {
                current = self.raw.right(node);
            } else {
                bound = node;
                current = self.raw.left(node);
            }
        }
        Cursor(bound)
    }

    /// Returns a cursor on the first element whose key is greater than `key`, or
    /// [`end`](RbTree::end) if there is none.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbTree;
    ///
    /// let tree: RbTree<i32> = [10, 20, 20, 30].into_iter().collect();
    /// assert_eq!(tree.get(tree.upper_bound(&20)), Some(&30));
    /// assert_eq!(tree.get(tree.upper_bound(&5)), Some(&10));
    /// ```
    pub fn upper_bound<Q>(&self, key: &Q) -> Cursor
    where
        X::Key: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let mut bound = Handle::SENTINEL;
        let mut current = self.raw.root();
        while let Some(node) = current {
            if self.key_less::<Q>(key, self.key(node).borrow()) {
                bound = node;
                current = self.raw.left(node);
            } else {
                current = self.raw.right(node);
            }
        }
        Cursor(bound)
    }

    /// Returns `(lower_bound(key), upper_bound(key))`: the span of elements equivalent to `key`.
    pub fn equal_range<Q>(&self, key: &Q) -> (Cursor, Cursor)
    where
        X::Key: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        (self.lower_bound(key), self.upper_bound(key))
    }

    /// Returns a cursor on the first element equivalent to `key`, or [`end`](RbTree::end).
    ///
    /// With duplicates present, the cursor names the earliest of them, so stepping forward from it
    /// visits all of them.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::{First, RbTree};
    ///
    /// let mut tree: RbTree<(i32, char), First> = RbTree::new();
    /// tree.insert_equal((1, 'a'));
    /// tree.insert_equal((1, 'b'));
    /// assert_eq!(tree.get(tree.find(&1)), Some(&(1, 'a')));
    /// assert!(tree.find(&2).is_end());
    /// ```
    pub fn find<Q>(&self, key: &Q) -> Cursor
    where
        X::Key: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let lower = self.lower_bound(key);
        if !lower.is_end() && !self.key_less::<Q>(key, self.key(lower.0).borrow()) {
            lower
        } else {
            Cursor::END
        }
    }

    /// Returns `true` if an element equivalent to `key` is present.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        X::Key: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        !self.find(key).is_end()
    }

    /// Returns the number of elements equivalent to `key`.
    ///
    /// # Complexity
    ///
    /// O(log n + k) for k matches.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        X::Key: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let mut count = 0;
        let mut current = self.lower_bound(key).0;
        while !current.is_sentinel() && !self.key_less::<Q>(key, self.key(current).borrow()) {
            count += 1;
            current = self.raw.increment(current);
        }
        count
    }

    /// Constructs a double-ended iterator over a sub-range of elements. The simplest way is to
    /// use the range syntax `min..max`, thus `range(min..max)` will yield elements from min
    /// (inclusive) to max (exclusive).
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`. An empty range whose bounds are both excluded and
    /// equivalent yields nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbTree;
    /// use std::ops::Bound::{Excluded, Included};
    ///
    /// let tree: RbTree<i32> = [3, 5, 8, 8, 11].into_iter().collect();
    /// assert_eq!(tree.range(4..=8).copied().collect::<Vec<_>>(), [5, 8, 8]);
    /// assert_eq!(tree.range((Excluded(5), Included(11))).copied().collect::<Vec<_>>(), [8, 8, 11]);
    /// assert_eq!(tree.range(..).count(), 5);
    /// ```
    pub fn range<Q, R>(&self, range: R) -> Range<'_, T>
    where
        X::Key: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
        R: RangeBounds<Q>,
    {
        let (start, end) = (range.start_bound(), range.end_bound());
        if let (Bound::Included(s) | Bound::Excluded(s), Bound::Included(e) | Bound::Excluded(e)) = (start, end) {
            assert!(!self.key_less::<Q>(e, s), "`RbTree::range()` - range start is greater than range end!");
            if matches!((start, end), (Bound::Excluded(_), Bound::Excluded(_))) && !self.key_less::<Q>(s, e) {
                let at = self.lower_bound(s).0;
                return Range::new(&self.raw, at, at);
            }
        }

        let front = match start {
            Bound::Included(key) => self.lower_bound(key).0,
            Bound::Excluded(key) => self.upper_bound(key).0,
            Bound::Unbounded => self.raw.leftmost(),
        };
        let back = match end {
            Bound::Included(key) => self.upper_bound(key).0,
            Bound::Excluded(key) => self.lower_bound(key).0,
            Bound::Unbounded => Handle::SENTINEL,
        };
        Range::new(&self.raw, front, back)
    }

    /// Finds where an element with `key` would be linked if no equivalent key is present;
    /// otherwise returns the cursor of the equivalent element.
    ///
    /// Only the in-order predecessor of the landing slot can be equivalent to `key`, so one
    /// comparison after the descent settles it.
    pub(crate) fn locate_unique(&self, key: &X::Key) -> Result<InsertPosition, Cursor> {
        let mut parent = Handle::SENTINEL;
        let mut goes_left = true;
        let mut current = self.raw.root();
        while let Some(node) = current {
            parent = node;
            goes_left = self.key_less::<X::Key>(key, self.key(node));
            current = if goes_left {
                self.raw.left(node)
            } else {
                self.raw.right(node)
            };
        }

        let position = InsertPosition {
            parent,
            side: if goes_left {
                Side::Left
            } else {
                Side::Right
            },
        };

        let mut predecessor = parent;
        if goes_left {
            if parent == self.raw.leftmost() {
                return Ok(position);
            }
            predecessor = self.raw.decrement(parent);
        }
        if self.key_less::<X::Key>(self.key(predecessor), key) {
            Ok(position)
        } else {
            Err(Cursor(predecessor))
        }
    }

    /// Finds where an element with `key` is linked so that it lands after every equivalent
    /// element.
    fn locate_equal(&self, key: &X::Key) -> InsertPosition {
        let mut parent = Handle::SENTINEL;
        let mut side = Side::Left;
        let mut current = self.raw.root();
        while let Some(node) = current {
            parent = node;
            side = if self.key_less::<X::Key>(key, self.key(node)) {
                Side::Left
            } else {
                Side::Right
            };
            current = self.raw.child(node, side);
        }
        InsertPosition {
            parent,
            side,
        }
    }

    /// Links `value` at a position obtained from `locate_*` with no mutation in between.
    pub(crate) fn link(&mut self, position: InsertPosition, value: T) -> Cursor {
        Cursor(self.raw.insert_at(position.parent, position.side, value))
    }

    /// Inserts `value` unless an element with an equivalent key is present.
    ///
    /// Returns the cursor of the inserted element and `true`, or the cursor of the element that
    /// blocked the insertion and `false`. A rejected `value` is dropped.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Panics
    ///
    /// Panics if the node limit is reached. See [`try_insert_unique`](RbTree::try_insert_unique).
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbTree;
    ///
    /// let mut tree: RbTree<i32> = RbTree::new();
    /// let (first, inserted) = tree.insert_unique(10);
    /// assert!(inserted);
    /// assert_eq!(tree.insert_unique(10), (first, false));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert_unique(&mut self, value: T) -> (Cursor, bool) {
        match self.locate_unique(X::key_of(&value)) {
            Ok(position) => (self.link(position, value), true),
            Err(existing) => (existing, false),
        }
    }

    /// Inserts `value` after any elements with an equivalent key and returns its cursor.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Panics
    ///
    /// Panics if the node limit is reached. See [`try_insert_equal`](RbTree::try_insert_equal).
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbTree;
    ///
    /// let mut tree: RbTree<i32> = RbTree::new();
    /// for v in [5, 3, 5, 5, 1] {
    ///     tree.insert_equal(v);
    /// }
    /// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 3, 5, 5, 5]);
    /// assert_eq!(tree.count(&5), 3);
    /// ```
    pub fn insert_equal(&mut self, value: T) -> Cursor {
        let position = self.locate_equal(X::key_of(&value));
        self.link(position, value)
    }

    /// Like [`insert_unique`](RbTree::insert_unique), but reports a missing node slot instead of
    /// panicking.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if a node is needed and cannot be obtained. The tree is unchanged
    /// and `value` is dropped.
    pub fn try_insert_unique(&mut self, value: T) -> Result<(Cursor, bool), AllocError> {
        match self.locate_unique(X::key_of(&value)) {
            Ok(position) => {
                self.raw.try_reserve(1)?;
                Ok((self.link(position, value), true))
            }
            Err(existing) => Ok((existing, false)),
        }
    }

    /// Like [`insert_equal`](RbTree::insert_equal), but reports a missing node slot instead of
    /// panicking.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if no node can be obtained. The tree is unchanged and `value` is
    /// dropped.
    pub fn try_insert_equal(&mut self, value: T) -> Result<Cursor, AllocError> {
        self.raw.try_reserve(1)?;
        Ok(self.insert_equal(value))
    }

    /// Inserts every element of `iter` with [`insert_unique`](RbTree::insert_unique) semantics.
    pub fn insert_unique_iter<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert_unique(value);
        }
    }

    /// Inserts every element of `iter` with [`insert_equal`](RbTree::insert_equal) semantics.
    pub fn insert_equal_iter<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert_equal(value);
        }
    }

    /// Removes every element equivalent to `key` and returns how many were removed.
    ///
    /// # Complexity
    ///
    /// O(log n + k) for k matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbTree;
    ///
    /// let mut tree: RbTree<i32> = [1, 2, 2, 2, 3].into_iter().collect();
    /// assert_eq!(tree.erase_key(&2), 3);
    /// assert_eq!(tree.erase_key(&2), 0);
    /// assert_eq!(tree.len(), 2);
    /// ```
    pub fn erase_key<Q>(&mut self, key: &Q) -> usize
    where
        X::Key: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let mut erased = 0;
        let mut current = self.lower_bound(key);
        while !current.is_end() && !self.key_less::<Q>(key, self.key(current.0).borrow()) {
            current = self.erase(current);
            erased += 1;
        }
        debug_log!(erased, "erased by key");
        erased
    }
}

impl<T: Clone, X, C: Clone> Clone for RbTree<T, X, C> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            compare: self.compare.clone(),
            key_of: PhantomData,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.clear();
        self.raw = source.raw.clone();
        self.compare.clone_from(&source.compare);
    }
}

impl<T: fmt::Debug, X, C> fmt::Debug for RbTree<T, X, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, X, C: Default> Default for RbTree<T, X, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Hash, X, C> Hash for RbTree<T, X, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for elt in self {
            elt.hash(state);
        }
    }
}

impl<T: PartialEq, X, C> PartialEq for RbTree<T, X, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq, X, C> Eq for RbTree<T, X, C> {}

impl<T: PartialOrd, X, C> PartialOrd for RbTree<T, X, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, X, C> Ord for RbTree<T, X, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T, X, C> FromIterator<T> for RbTree<T, X, C>
where
    X: KeyOf<T>,
    C: Compare<X::Key> + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.insert_equal_iter(iter);
        tree
    }
}

impl<T, X, C> Extend<T> for RbTree<T, X, C>
where
    X: KeyOf<T>,
    C: Compare<X::Key>,
{
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.insert_equal_iter(iter);
    }
}

impl<'a, T: Copy + 'a, X, C> Extend<&'a T> for RbTree<T, X, C>
where
    X: KeyOf<T>,
    C: Compare<X::Key>,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.insert_equal_iter(iter.into_iter().copied());
    }
}

impl<T, X, C, const N: usize> From<[T; N]> for RbTree<T, X, C>
where
    X: KeyOf<T>,
    C: Compare<X::Key> + Default,
{
    fn from(arr: [T; N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, T, X, C> IntoIterator for &'a RbTree<T, X, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T, X, C> IntoIterator for RbTree<T, X, C> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Gets an owning iterator over the elements in ascending order.
    fn into_iter(mut self) -> IntoIter<T> {
        IntoIter::new(self.raw.drain_to_vec())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::uninlined_format_args)]
mod tests {
    use super::*;
    use crate::compare::{FnCompare, Greater};
    use crate::key_of::{First, Second};
    use alloc::vec;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    impl<T, X, C> RbTree<T, X, C>
    where
        X: KeyOf<T>,
        C: Compare<X::Key>,
    {
        /// Checks the red-black and cache invariants, then that no element is ordered before its
        /// in-order predecessor.
        fn validate_invariants(&self) {
            self.raw.validate_structure();
            let mut previous: Option<Handle> = None;
            let mut current = self.raw.leftmost();
            while !current.is_sentinel() {
                if let Some(previous) = previous {
                    assert!(
                        !self.key_less::<X::Key>(self.key(current), self.key(previous)),
                        "in-order sequence decreases at {:?}",
                        current
                    );
                }
                previous = Some(current);
                current = self.raw.increment(current);
            }
        }
    }

    fn collect<T: Clone, X, C>(tree: &RbTree<T, X, C>) -> Vec<T> {
        tree.iter().cloned().collect()
    }

    #[test]
    fn known_sequence_traverses_in_order() {
        let mut tree: RbTree<i32> = RbTree::new();
        for v in [10, 7, 8, 15, 5, 6, 11, 13, 12] {
            assert!(tree.insert_unique(v).1);
            tree.validate_invariants();
        }
        assert_eq!(collect(&tree), [5, 6, 7, 8, 10, 11, 12, 13, 15]);
        let root = tree.raw.root().unwrap();
        assert_eq!(*tree.raw.value(root), 8);

        let mut cursor = tree.begin();
        let mut steps = 0;
        while cursor != tree.end() {
            cursor = tree.increment(cursor);
            steps += 1;
        }
        assert_eq!(steps, 9);
    }

    #[test]
    fn duplicates_stay_contiguous() {
        let mut tree: RbTree<i32> = RbTree::new();
        for v in [5, 3, 5, 5, 1] {
            tree.insert_equal(v);
        }
        tree.validate_invariants();
        assert_eq!(collect(&tree), [1, 3, 5, 5, 5]);
        assert_eq!(tree.count(&5), 3);

        let (lower, upper) = tree.equal_range(&5);
        assert_eq!(lower, tree.find(&5));
        assert!(upper.is_end());
        assert_eq!(tree.get(tree.decrement(lower)), Some(&3));
    }

    #[test]
    fn unique_rejection_points_at_original() {
        let mut tree: RbTree<(i32, &str), First> = RbTree::new();
        let (original, inserted) = tree.insert_unique((10, "first"));
        assert!(inserted);
        let (cursor, inserted) = tree.insert_unique((10, "second"));
        assert!(!inserted);
        assert_eq!(cursor, original);
        assert_eq!(tree.get(cursor), Some(&(10, "first")));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn unique_rejection_at_both_ends() {
        let mut tree: RbTree<i32> = (0..10).map(|v| v * 2).collect();
        assert!(!tree.insert_unique(0).1);
        assert!(!tree.insert_unique(18).1);
        assert!(tree.insert_unique(-1).1);
        assert!(tree.insert_unique(19).1);
        tree.validate_invariants();
        assert_eq!(tree.first(), Some(&-1));
        assert_eq!(tree.last(), Some(&19));
    }

    #[test]
    fn equal_insertion_keeps_arrival_order() {
        let mut tree: RbTree<(u8, u32), First> = RbTree::new();
        for (i, key) in [3u8, 1, 3, 2, 3, 1].into_iter().enumerate() {
            tree.insert_equal((key, i as u32));
        }
        tree.validate_invariants();
        assert_eq!(collect(&tree), [(1, 1), (1, 5), (2, 3), (3, 0), (3, 2), (3, 4)]);
    }

    #[test]
    fn deep_copy_is_independent() {
        let mut original: RbTree<i32> = (0..100).collect();
        let mut copy = original.clone();
        copy.validate_invariants();
        assert_eq!(copy, original);

        copy.erase_key(&50);
        copy.insert_equal(1000);
        copy.validate_invariants();
        assert_eq!(original.len(), 100);
        assert_eq!(collect(&original), (0..100).collect::<Vec<_>>());

        original.clear();
        assert_eq!(copy.len(), 100);
        assert!(copy.contains(&1000));
    }

    #[test]
    fn clone_from_replaces_contents() {
        let source: RbTree<i32> = [4, 2, 9].into_iter().collect();
        let mut target: RbTree<i32> = (100..200).collect();
        target.clone_from(&source);
        target.validate_invariants();
        assert_eq!(collect(&target), [2, 4, 9]);
    }

    #[test]
    fn clear_handles_large_trees() {
        let mut tree: RbTree<u32> = (0..50_000).collect();
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.begin(), tree.end());
        tree.validate_invariants();
    }

    #[test]
    fn cursor_ring_closes_on_end() {
        let tree: RbTree<i32> = [1, 2, 3].into_iter().collect();
        assert_eq!(tree.increment(tree.end()), tree.end());
        assert_eq!(tree.decrement(tree.begin()), tree.end());
        assert_eq!(tree.get(tree.decrement(tree.end())), Some(&3));
        assert_eq!(tree.get(tree.end()), None);

        let empty: RbTree<i32> = RbTree::new();
        assert_eq!(empty.begin(), empty.end());
        assert_eq!(empty.decrement(empty.end()), empty.end());
    }

    #[test]
    fn erase_returns_following_cursor_in_every_shape() {
        let mut tree: RbTree<i32> = (0..64).collect();
        let mut cursor = tree.begin();
        let mut expected = 0;
        while !cursor.is_end() {
            assert_eq!(tree.get(cursor), Some(&expected));
            // Erase every other element, stepping over the survivors.
            cursor = tree.erase(cursor);
            tree.validate_invariants();
            expected += 1;
            if !cursor.is_end() {
                assert_eq!(tree.get(cursor), Some(&expected));
                cursor = tree.increment(cursor);
                expected += 1;
            }
        }
        assert_eq!(collect(&tree), (0..64).filter(|v| v % 2 == 1).collect::<Vec<_>>());
    }

    #[test]
    fn erase_range_keeps_relocated_last() {
        let mut tree: RbTree<i32> = (0..32).collect();
        // Erasing the root relocates its successor, which is exactly `last` here.
        let root = tree.raw.root().unwrap();
        let root_value = *tree.raw.value(root);
        let last = tree.increment(Cursor(root));
        let last = tree.erase_range(Cursor(root), last);
        tree.validate_invariants();
        assert_eq!(tree.get(last), Some(&(root_value + 1)));
        assert!(!tree.contains(&root_value));

        let last = tree.erase_range(tree.begin(), tree.find(&20));
        assert_eq!(tree.get(last), Some(&20));
        assert_eq!(tree.first(), Some(&20));
        tree.validate_invariants();

        assert!(tree.erase_range(tree.begin(), tree.end()).is_end());
        assert!(tree.is_empty());
    }

    #[test]
    #[should_panic(expected = "`RbTree::erase()` - cannot erase the end position!")]
    fn erasing_end_panics() {
        let mut tree: RbTree<i32> = [1].into_iter().collect();
        let end = tree.end();
        tree.erase(end);
    }

    #[test]
    fn pop_from_both_ends() {
        let mut tree: RbTree<i32> = [3, 1, 2].into_iter().collect();
        assert_eq!(tree.pop_first(), Some(1));
        assert_eq!(tree.pop_last(), Some(3));
        assert_eq!(tree.pop_last(), Some(2));
        assert_eq!(tree.pop_first(), None);
        assert_eq!(tree.remove(tree.end()), None);
        tree.validate_invariants();
    }

    #[test]
    fn node_limit_failure_leaves_tree_untouched() {
        let mut tree: RbTree<i32> = RbTree::with_node_limit(3);
        for v in [1, 2, 3] {
            assert!(tree.try_insert_unique(v).unwrap().1);
        }
        let before = collect(&tree);
        assert_eq!(tree.try_insert_unique(4), Err(AllocError::NodeLimit { limit: 3 }));
        assert_eq!(tree.try_insert_equal(0), Err(AllocError::NodeLimit { limit: 3 }));
        assert_eq!(tree.try_reserve(1), Err(AllocError::NodeLimit { limit: 3 }));
        tree.validate_invariants();
        assert_eq!(collect(&tree), before);

        // Freed slots are reused.
        tree.erase_key(&2);
        assert!(tree.try_insert_unique(4).unwrap().1);
        assert_eq!(collect(&tree), [1, 3, 4]);
    }

    #[test]
    #[should_panic(expected = "node limit (1) reached")]
    fn infallible_insert_past_limit_panics() {
        let mut tree: RbTree<i32> = RbTree::with_node_limit(1);
        tree.insert_equal(1);
        tree.insert_equal(2);
    }

    #[test]
    fn custom_orderings() {
        let mut descending: RbTree<i32, Identity, Greater> = RbTree::new();
        descending.insert_equal_iter([2, 9, 4]);
        descending.validate_invariants();
        assert_eq!(collect(&descending), [9, 4, 2]);
        assert_eq!(descending.get(descending.lower_bound(&5)), Some(&4));

        let mut by_second: RbTree<(&str, i32), Second> = RbTree::new();
        by_second.insert_unique_iter([("x", 3), ("y", 1), ("z", 3)]);
        assert_eq!(collect(&by_second), [("y", 1), ("x", 3)]);

        let mut modulo: RbTree<u32, Identity, _> = RbTree::with_compare(FnCompare(|a: &u32, b: &u32| a % 10 < b % 10));
        modulo.insert_equal_iter([21, 13, 3, 40]);
        modulo.validate_invariants();
        assert_eq!(modulo.count(&33), 2);
        assert_eq!(collect(&modulo), [40, 21, 13, 3]);
    }

    #[test]
    fn range_bounds() {
        let tree: RbTree<i32> = [1, 3, 3, 5, 7].into_iter().collect();
        assert_eq!(tree.range(3..7).copied().collect::<Vec<_>>(), [3, 3, 5]);
        assert_eq!(tree.range(3..=7).rev().copied().collect::<Vec<_>>(), [7, 5, 3, 3]);
        assert_eq!(tree.range(..3).copied().collect::<Vec<_>>(), [1]);
        assert_eq!(tree.range(4..).copied().collect::<Vec<_>>(), [5, 7]);
        assert_eq!(tree.range(3..3).count(), 0);
        assert_eq!(tree.range((Bound::Excluded(3), Bound::Excluded(3))).count(), 0);
        assert_eq!(tree.range(8..).count(), 0);
    }

    #[test]
    #[should_panic(expected = "`RbTree::range()` - range start is greater than range end!")]
    fn inverted_range_panics() {
        let tree: RbTree<i32> = [1, 2].into_iter().collect();
        let _ = tree.range(2..1);
    }

    #[test]
    fn swap_exchanges_everything() {
        let mut a: RbTree<i32> = [1, 2, 3].into_iter().collect();
        let mut b: RbTree<i32> = vec![9].into_iter().collect();
        a.swap(&mut b);
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 3);
        assert_eq!(collect(&a), [9]);
        assert_eq!(collect(&b), [1, 2, 3]);
        a.validate_invariants();
        b.validate_invariants();
    }

    #[test]
    fn into_iter_is_ordered_and_double_ended() {
        let tree: RbTree<i32> = [4, 1, 3, 2].into_iter().collect();
        let mut iter = tree.into_iter();
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.next(), Some(1));
        assert_eq!(iter.next_back(), Some(4));
        assert_eq!(iter.collect::<Vec<_>>(), [2, 3]);
    }

    #[derive(Clone, Debug)]
    enum Op {
        InsertUnique(i16),
        InsertEqual(i16),
        EraseKey(i16),
        EraseAt(usize),
        EraseRange(usize, usize),
        PopFirst,
        PopLast,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (-100i16..100).prop_map(Op::InsertUnique),
            4 => (-100i16..100).prop_map(Op::InsertEqual),
            2 => (-100i16..100).prop_map(Op::EraseKey),
            2 => any::<usize>().prop_map(Op::EraseAt),
            1 => (any::<usize>(), 0usize..8).prop_map(|(at, len)| Op::EraseRange(at, len)),
            1 => Just(Op::PopFirst),
            1 => Just(Op::PopLast),
        ]
    }

    fn nth_cursor<T, X, C>(tree: &RbTree<T, X, C>, n: usize) -> Cursor {
        let mut cursor = tree.begin();
        for _ in 0..n {
            cursor = tree.increment(cursor);
        }
        cursor
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn matches_sorted_vec_model(ops in prop::collection::vec(op_strategy(), 0..300)) {
            let mut tree: RbTree<i16> = RbTree::new();
            let mut model: Vec<i16> = Vec::new();

            for op in ops {
                match op {
                    Op::InsertUnique(v) => {
                        let (cursor, inserted) = tree.insert_unique(v);
                        // The predecessor check agrees with a full lookup.
                        prop_assert_eq!(inserted, !model.contains(&v));
                        prop_assert_eq!(tree.get(cursor), Some(&v));
                        if inserted {
                            let at = model.partition_point(|&x| x < v);
                            model.insert(at, v);
                        }
                    }
                    Op::InsertEqual(v) => {
                        let cursor = tree.insert_equal(v);
                        prop_assert_eq!(tree.get(cursor), Some(&v));
                        let at = model.partition_point(|&x| x <= v);
                        model.insert(at, v);
                    }
                    Op::EraseKey(v) => {
                        let before = model.len();
                        model.retain(|&x| x != v);
                        prop_assert_eq!(tree.erase_key(&v), before - model.len());
                    }
                    Op::EraseAt(which) => {
                        if model.is_empty() {
                            continue;
                        }
                        let index = which % model.len();
                        let next = tree.erase(nth_cursor(&tree, index));
                        model.remove(index);
                        prop_assert_eq!(tree.get(next), model.get(index));
                    }
                    Op::EraseRange(at, len) => {
                        let start = if model.is_empty() { 0 } else { at % model.len() };
                        let end = (start + len).min(model.len());
                        let last = tree.erase_range(nth_cursor(&tree, start), nth_cursor(&tree, end));
                        model.drain(start..end);
                        prop_assert_eq!(tree.get(last), model.get(start));
                    }
                    Op::PopFirst => {
                        let expected = (!model.is_empty()).then(|| model.remove(0));
                        prop_assert_eq!(tree.pop_first(), expected);
                    }
                    Op::PopLast => {
                        prop_assert_eq!(tree.pop_last(), model.pop());
                    }
                }

                tree.validate_invariants();
                prop_assert_eq!(tree.len(), model.len());
                prop_assert_eq!(collect(&tree), model.clone());
            }
        }

        #[test]
        fn round_trip_empties_tree(
            keys in prop::collection::btree_set(any::<i32>(), 0..200)
                .prop_map(|set| set.into_iter().collect::<Vec<_>>())
                .prop_shuffle()
        ) {
            let mut tree: RbTree<i32> = RbTree::new();
            for &k in &keys {
                prop_assert!(tree.insert_unique(k).1);
            }
            tree.validate_invariants();

            let mut order = keys.clone();
            order.reverse();
            for k in order {
                prop_assert_eq!(tree.erase_key(&k), 1);
                tree.validate_invariants();
            }
            prop_assert_eq!(tree.len(), 0);
            prop_assert_eq!(tree.begin(), tree.end());
        }

        #[test]
        fn bounds_match_partition_points(
            values in prop::collection::vec(-50i32..50, 0..100),
            probe in -60i32..60,
        ) {
            let tree: RbTree<i32> = values.iter().copied().collect();
            let mut sorted = values.clone();
            sorted.sort_unstable();

            let lower = sorted.partition_point(|&x| x < probe);
            let upper = sorted.partition_point(|&x| x <= probe);
            prop_assert_eq!(tree.lower_bound(&probe), nth_cursor(&tree, lower));
            prop_assert_eq!(tree.upper_bound(&probe), nth_cursor(&tree, upper));
            prop_assert_eq!(tree.count(&probe), upper - lower);
            prop_assert_eq!(tree.contains(&probe), upper > lower);
        }
    }
}

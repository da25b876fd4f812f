use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::RangeBounds;

use crate::compare::{Compare, Less};
use crate::error::AllocError;
use crate::key_of::Identity;
use crate::rb_tree::{IntoIter, Iter, Range, RbTree};

/// An ordered multiset based on a red-black tree.
///
/// Like [`RbSet`](crate::RbSet), but equivalent elements may be stored any number of times. They
/// are kept next to each other in the order they were inserted.
///
/// # Examples
///
/// ```
/// use rbtree_core::RbMultiSet;
///
/// let mut rolls = RbMultiSet::new();
/// for roll in [4, 2, 6, 2, 4, 4] {
///     rolls.insert(roll);
/// }
/// assert_eq!(rolls.len(), 6);
/// assert_eq!(rolls.count(&4), 3);
///
/// assert!(rolls.remove_one(&4));
/// assert_eq!(rolls.remove_all(&2), 2);
/// assert_eq!(rolls.iter().copied().collect::<Vec<_>>(), [4, 4, 6]);
/// ```
pub struct RbMultiSet<T, C = Less> {
    tree: RbTree<T, Identity, C>,
}

impl<T> RbMultiSet<T> {
    /// Makes a new, empty `RbMultiSet` in ascending [`Ord`] order.
    ///
    /// Does not allocate anything on its own.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_compare(Less)
    }

    /// Makes a new, empty `RbMultiSet` that holds at most `limit` elements.
    #[must_use]
    pub fn with_node_limit(limit: usize) -> Self {
        Self::with_compare_and_node_limit(Less, limit)
    }
}

impl<T, C> RbMultiSet<T, C> {
    /// Makes a new, empty `RbMultiSet` ordered by `compare`.
    #[must_use]
    pub const fn with_compare(compare: C) -> Self {
        Self {
            tree: RbTree::with_compare(compare),
        }
    }

    /// Makes a new, empty `RbMultiSet` ordered by `compare` that holds at most `limit` elements.
    #[must_use]
    pub fn with_compare_and_node_limit(compare: C, limit: usize) -> Self {
        Self {
            tree: RbTree::with_compare_and_node_limit(compare, limit),
        }
    }

    /// Returns the number of elements, counting duplicates.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the multiset contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Clears the multiset, removing all elements.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Exchanges the contents of two multisets.
    pub fn swap(&mut self, other: &mut Self) {
        self.tree.swap(&mut other.tree);
    }

    /// Returns the minimum element. With duplicates, the earliest inserted of them.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.tree.first()
    }

    /// Returns the maximum element. With duplicates, the latest inserted of them.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.tree.last()
    }

    /// Removes and returns the first element.
    pub fn pop_first(&mut self) -> Option<T> {
        self.tree.pop_first()
    }

    /// Removes and returns the last element.
    pub fn pop_last(&mut self) -> Option<T> {
        self.tree.pop_last()
    }

    /// Gets an iterator over every element in ascending order, duplicates included.
    pub fn iter(&self) -> Iter<'_, T> {
        self.tree.iter()
    }
}

impl<T, C: Compare<T>> RbMultiSet<T, C> {
    /// Adds a value, after any equivalent values already present.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Panics
    ///
    /// Panics if the multiset was built with a node limit that is already reached.
    pub fn insert(&mut self, value: T) {
        self.tree.insert_equal(value);
    }

    /// Like [`RbMultiSet::insert`], but reports a missing node slot instead of panicking.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if no node can be obtained. The multiset is unchanged.
    pub fn try_insert(&mut self, value: T) -> Result<(), AllocError> {
        self.tree.try_insert_equal(value).map(|_| ())
    }

    /// Returns the number of elements equivalent to `value`.
    ///
    /// # Complexity
    ///
    /// O(log n + k) for k matches.
    pub fn count<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.count(value)
    }

    /// Returns `true` if at least one element is equivalent to `value`.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.contains(value)
    }

    /// Removes every element equivalent to `value`, returning how many were removed.
    pub fn remove_all<Q>(&mut self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.erase_key(value)
    }

    /// Removes the earliest inserted element equivalent to `value`. Returns whether one was found.
    pub fn remove_one<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let cursor = self.tree.find(value);
        self.tree.remove(cursor).is_some()
    }

    /// Constructs a double-ended iterator over a sub-range of elements, duplicates included.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbMultiSet;
    ///
    /// let set: RbMultiSet<i32> = [1, 2, 2, 3].into_iter().collect();
    /// assert_eq!(set.range(2..).copied().collect::<Vec<_>>(), [2, 2, 3]);
    /// ```
    pub fn range<Q, R>(&self, range: R) -> Range<'_, T>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
        R: RangeBounds<Q>,
    {
        self.tree.range(range)
    }
}

impl<T: Clone, C: Clone> Clone for RbMultiSet<T, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.tree.clone_from(&source.tree);
    }
}

impl<T: fmt::Debug, C> fmt::Debug for RbMultiSet<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, C: Default> Default for RbMultiSet<T, C> {
    fn default() -> Self {
        Self::with_compare(C::default())
    }
}

impl<T: Hash, C> Hash for RbMultiSet<T, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tree.hash(state);
    }
}

impl<T: PartialEq, C> PartialEq for RbMultiSet<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<T: Eq, C> Eq for RbMultiSet<T, C> {}

impl<T: PartialOrd, C> PartialOrd for RbMultiSet<T, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.tree.partial_cmp(&other.tree)
    }
}

impl<T: Ord, C> Ord for RbMultiSet<T, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tree.cmp(&other.tree)
    }
}

impl<T, C: Compare<T> + Default> FromIterator<T> for RbMultiSet<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<T, C: Compare<T>> Extend<T> for RbMultiSet<T, C> {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.tree.insert_equal_iter(iter);
    }
}

impl<'a, T: 'a + Copy, C: Compare<T>> Extend<&'a T> for RbMultiSet<T, C> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.tree.insert_equal_iter(iter.into_iter().copied());
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for RbMultiSet<T> {
    /// ```
    /// use rbtree_core::RbMultiSet;
    ///
    /// let set = RbMultiSet::from([1, 1, 2]);
    /// assert_eq!(set.len(), 3);
    /// ```
    fn from(arr: [T; N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, T, C> IntoIterator for &'a RbMultiSet<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T, C> IntoIterator for RbMultiSet<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        self.tree.into_iter()
    }
}

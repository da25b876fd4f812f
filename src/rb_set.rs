use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::RangeBounds;

use crate::compare::{Compare, Less};
use crate::error::AllocError;
use crate::key_of::Identity;
use crate::rb_tree::{IntoIter, Iter, Range, RbTree};

/// An ordered set of unique elements based on a red-black tree.
///
/// Elements are ordered by the strict weak ordering `C`, [`Less`] (ascending [`Ord`]) by default.
/// Two elements are duplicates when neither orders before the other; inserting a duplicate leaves
/// the set unchanged.
///
/// It is a logic error for an item to be modified in such a way that the item's ordering relative
/// to any other item, as determined by `C`, changes while it is in the set. This is normally only
/// possible through [`Cell`], [`RefCell`], global state, I/O, or unsafe code. The behavior
/// resulting from such a logic error is not specified, but will be encapsulated to the `RbSet`
/// that observed the logic error and not result in undefined behavior.
///
/// Iterators returned by [`RbSet::iter`] and [`RbSet::into_iter`] produce their items in order,
/// and take worst-case logarithmic and amortized constant time per item returned.
///
/// [`Cell`]: core::cell::Cell
/// [`RefCell`]: core::cell::RefCell
///
/// # Examples
///
/// ```
/// use rbtree_core::RbSet;
///
/// let mut books = RbSet::new();
///
/// // Add some books.
/// books.insert("A Dance With Dragons");
/// books.insert("To Kill a Mockingbird");
/// books.insert("The Odyssey");
/// books.insert("The Great Gatsby");
///
/// // Check for a specific one.
/// if !books.contains("The Winds of Winter") {
///     println!("We have {} books, but The Winds of Winter ain't one.", books.len());
/// }
///
/// // Remove a book.
/// books.remove("The Odyssey");
///
/// // Iterate over everything.
/// for book in &books {
///     println!("{book}");
/// }
/// ```
///
/// A `RbSet` with a known list of items can be initialized from an array:
///
/// ```
/// use rbtree_core::RbSet;
///
/// let set = RbSet::from([1, 2, 3]);
/// ```
pub struct RbSet<T, C = Less> {
    tree: RbTree<T, Identity, C>,
}

impl<T> RbSet<T> {
    /// Makes a new, empty `RbSet` in ascending [`Ord`] order.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbSet;
    ///
    /// let mut set: RbSet<i32> = RbSet::new();
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self::with_compare(Less)
    }

    /// Makes a new, empty `RbSet` with room for `capacity` elements before reallocating.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tree: RbTree::with_capacity(capacity),
        }
    }

    /// Makes a new, empty `RbSet` that holds at most `limit` elements.
    ///
    /// See [`RbSet::try_insert`].
    #[must_use]
    pub fn with_node_limit(limit: usize) -> Self {
        Self::with_compare_and_node_limit(Less, limit)
    }
}

impl<T, C> RbSet<T, C> {
    /// Makes a new, empty `RbSet` ordered by `compare`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::{FnCompare, RbSet};
    ///
    /// let mut set = RbSet::with_compare(FnCompare(|a: &&str, b: &&str| a.len() < b.len()));
    /// assert!(set.insert("abc"));
    /// assert!(!set.insert("xyz"));
    /// assert!(set.insert("z"));
    /// assert_eq!(set.iter().copied().collect::<Vec<_>>(), ["z", "abc"]);
    /// ```
    #[must_use]
    pub const fn with_compare(compare: C) -> Self {
        Self {
            tree: RbTree::with_compare(compare),
        }
    }

    /// Makes a new, empty `RbSet` ordered by `compare` that holds at most `limit` elements.
    #[must_use]
    pub fn with_compare_and_node_limit(compare: C, limit: usize) -> Self {
        Self {
            tree: RbTree::with_compare_and_node_limit(compare, limit),
        }
    }

    /// Returns the number of elements in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbSet;
    ///
    /// let mut v = RbSet::new();
    /// assert_eq!(v.len(), 0);
    /// v.insert(1);
    /// assert_eq!(v.len(), 1);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the set contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of elements the set can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.tree.capacity()
    }

    /// Tries to make room for at least `additional` more elements.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the node limit would be exceeded or the allocator fails.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), AllocError> {
        self.tree.try_reserve(additional)
    }

    /// Clears the set, removing all elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbSet;
    ///
    /// let mut v = RbSet::new();
    /// v.insert(1);
    /// v.clear();
    /// assert!(v.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Exchanges the contents of two sets.
    pub fn swap(&mut self, other: &mut Self) {
        self.tree.swap(&mut other.tree);
    }

    /// Returns a reference to the first element in the set, if any. This element is always the
    /// minimum of all elements in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbSet;
    ///
    /// let mut set = RbSet::new();
    /// assert_eq!(set.first(), None);
    /// set.insert(1);
    /// assert_eq!(set.first(), Some(&1));
    /// set.insert(2);
    /// assert_eq!(set.first(), Some(&1));
    /// ```
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.tree.first()
    }

    /// Returns a reference to the last element in the set, if any. This element is always the
    /// maximum of all elements in the set.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.tree.last()
    }

    /// Removes the first element from the set and returns it, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbSet;
    ///
    /// let mut set = RbSet::new();
    /// set.insert(1);
    /// while let Some(n) = set.pop_first() {
    ///     assert_eq!(n, 1);
    /// }
    /// assert!(set.is_empty());
    /// ```
    pub fn pop_first(&mut self) -> Option<T> {
        self.tree.pop_first()
    }

    /// Removes the last element from the set and returns it, if any.
    pub fn pop_last(&mut self) -> Option<T> {
        self.tree.pop_last()
    }

    /// Gets an iterator that visits the elements in the `RbSet` in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbSet;
    ///
    /// let set = RbSet::from([3, 1, 2]);
    /// let mut set_iter = set.iter();
    /// assert_eq!(set_iter.next(), Some(&1));
    /// assert_eq!(set_iter.next(), Some(&2));
    /// assert_eq!(set_iter.next(), Some(&3));
    /// assert_eq!(set_iter.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        self.tree.iter()
    }
}

impl<T, C: Compare<T>> RbSet<T, C> {
    /// Adds a value to the set.
    ///
    /// Returns whether the value was newly inserted. That is:
    ///
    /// - If the set did not previously contain an equivalent value, `true` is returned.
    /// - If the set already contained an equivalent value, `false` is returned, and the set is
    ///   not modified: original value is not replaced, and the value passed as argument is dropped.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Panics
    ///
    /// Panics if the set was built with a node limit that is already reached.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbSet;
    ///
    /// let mut set = RbSet::new();
    ///
    /// assert_eq!(set.insert(2), true);
    /// assert_eq!(set.insert(2), false);
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        self.tree.insert_unique(value).1
    }

    /// Like [`RbSet::insert`], but reports a missing node slot instead of panicking.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if `value` is new and no node can be obtained. The set is unchanged.
    pub fn try_insert(&mut self, value: T) -> Result<bool, AllocError> {
        self.tree.try_insert_unique(value).map(|(_, inserted)| inserted)
    }

    /// Returns `true` if the set contains an element equivalent to the value.
    ///
    /// The value may be any borrowed form of the set's element type, but the ordering on the
    /// borrowed form *must* match the ordering on the element type.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbSet;
    ///
    /// let set = RbSet::from([1, 2, 3]);
    /// assert_eq!(set.contains(&1), true);
    /// assert_eq!(set.contains(&4), false);
    /// ```
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.contains(value)
    }

    /// Returns a reference to the element in the set, if any, that is equivalent to the value.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbSet;
    ///
    /// let set = RbSet::from([1, 2, 3]);
    /// assert_eq!(set.get(&2), Some(&2));
    /// assert_eq!(set.get(&4), None);
    /// ```
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.get(self.tree.find(value))
    }

    /// If the set contains an element equivalent to the value, removes it from the set and drops
    /// it. Returns whether such an element was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbSet;
    ///
    /// let mut set = RbSet::new();
    ///
    /// set.insert(2);
    /// assert_eq!(set.remove(&2), true);
    /// assert_eq!(set.remove(&2), false);
    /// ```
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.take(value).is_some()
    }

    /// Removes and returns the element in the set, if any, that is equivalent to the value.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbSet;
    ///
    /// let mut set = RbSet::from([1, 2, 3]);
    /// assert_eq!(set.take(&2), Some(2));
    /// assert_eq!(set.take(&2), None);
    /// ```
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let cursor = self.tree.find(value);
        self.tree.remove(cursor)
    }

    /// Returns the least element not ordered before `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbSet;
    ///
    /// let set = RbSet::from([10, 20, 30]);
    /// assert_eq!(set.lower_bound(&20), Some(&20));
    /// assert_eq!(set.lower_bound(&25), Some(&30));
    /// assert_eq!(set.lower_bound(&35), None);
    /// ```
    pub fn lower_bound<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.get(self.tree.lower_bound(value))
    }

    /// Returns the least element ordered after `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbSet;
    ///
    /// let set = RbSet::from([10, 20, 30]);
    /// assert_eq!(set.upper_bound(&20), Some(&30));
    /// assert_eq!(set.upper_bound(&5), Some(&10));
    /// assert_eq!(set.upper_bound(&30), None);
    /// ```
    pub fn upper_bound<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.get(self.tree.upper_bound(value))
    }

    /// Constructs a double-ended iterator over a sub-range of elements in the set.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbSet;
    /// use std::ops::Bound::Included;
    ///
    /// let mut set = RbSet::new();
    /// set.insert(3);
    /// set.insert(5);
    /// set.insert(8);
    /// for &elem in set.range((Included(&4), Included(&8))) {
    ///     println!("{elem}");
    /// }
    /// assert_eq!(Some(&5), set.range(4..).next());
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

impl<T: Clone, C: Clone> Clone for RbSet<T, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.tree.clone_from(&source.tree);
    }
}

impl<T: fmt::Debug, C> fmt::Debug for RbSet<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, C: Default> Default for RbSet<T, C> {
    fn default() -> Self {
        Self::with_compare(C::default())
    }
}

impl<T: Hash, C> Hash for RbSet<T, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tree.hash(state);
    }
}

impl<T: PartialEq, C> PartialEq for RbSet<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<T: Eq, C> Eq for RbSet<T, C> {}

impl<T: PartialOrd, C> PartialOrd for RbSet<T, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.tree.partial_cmp(&other.tree)
    }
}

impl<T: Ord, C> Ord for RbSet<T, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tree.cmp(&other.tree)
    }
}

impl<T, C: Compare<T> + Default> FromIterator<T> for RbSet<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<T, C: Compare<T>> Extend<T> for RbSet<T, C> {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.tree.insert_unique_iter(iter);
    }
}

impl<'a, T: 'a + Copy, C: Compare<T>> Extend<&'a T> for RbSet<T, C> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.tree.insert_unique_iter(iter.into_iter().copied());
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for RbSet<T> {
    /// Converts a `[T; N]` into a `RbSet<T>`.
    ///
    /// ```
    /// use rbtree_core::RbSet;
    ///
    /// let set1 = RbSet::from([1, 2, 3, 4]);
    /// let set2: RbSet<_> = [1, 2, 3, 4].into();
    /// assert_eq!(set1, set2);
    /// ```
    fn from(arr: [T; N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, T, C> IntoIterator for &'a RbSet<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T, C> IntoIterator for RbSet<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Gets an iterator for moving out the `RbSet`'s contents in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_core::RbSet;
    ///
    /// let set = RbSet::from([1, 2, 3, 4]);
    ///
    /// let v: Vec<_> = set.into_iter().collect();
    /// assert_eq!(v, [1, 2, 3, 4]);
    /// ```
    fn into_iter(self) -> IntoIter<T> {
        self.tree.into_iter()
    }
}

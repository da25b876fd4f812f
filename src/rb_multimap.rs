use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::ops::{Bound, RangeBounds};

use crate::compare::{Compare, Less};
use crate::error::AllocError;
use crate::key_of::First;
use crate::rb_map::{IntoIter, Iter, Keys, Range, Values};
use crate::rb_tree::{self, RbTree};

/// An ordered multimap based on a red-black tree.
///
/// Like [`RbMap`](crate::RbMap), but a key may be associated with any number of values. Entries
/// with equivalent keys sit next to each other in the order they were inserted.
///
/// # Examples
///
/// ```
/// use rbtree_core::RbMultiMap;
///
/// let mut index = RbMultiMap::new();
/// index.insert("rust", 3);
/// index.insert("tree", 1);
/// index.insert("rust", 7);
///
/// assert_eq!(index.count("rust"), 2);
/// assert_eq!(index.get_all("rust").copied().collect::<Vec<_>>(), [3, 7]);
/// assert_eq!(index.remove_all("rust"), 2);
/// assert_eq!(index.len(), 1);
/// ```
pub struct RbMultiMap<K, V, C = Less> {
    tree: RbTree<(K, V), First, C>,
}

/// An iterator over the values stored under one key of an `RbMultiMap`, in insertion order.
///
/// This `struct` is created by the [`get_all`] method on [`RbMultiMap`]. See its documentation
/// for more.
///
/// [`get_all`]: RbMultiMap::get_all
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct GetAll<'a, K: 'a, V: 'a> {
    inner: rb_tree::Range<'a, (K, V)>,
}

impl<K, V> RbMultiMap<K, V> {
    /// Makes a new, empty `RbMultiMap` in ascending key order.
    ///
    /// Does not allocate anything on its own.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_compare(Less)
    }

    /// Makes a new, empty `RbMultiMap` that holds at most `limit` entries.
    #[must_use]
    pub fn with_node_limit(limit: usize) -> Self {
        Self::with_compare_and_node_limit(Less, limit)
    }
}

impl<K, V, C> RbMultiMap<K, V, C> {
    /// Makes a new, empty `RbMultiMap` ordered by `compare`.
    #[must_use]
    pub const fn with_compare(compare: C) -> Self {
        Self {
            tree: RbTree::with_compare(compare),
        }
    }

    /// Makes a new, empty `RbMultiMap` ordered by `compare` that holds at most `limit` entries.
    #[must_use]
    pub fn with_compare_and_node_limit(compare: C, limit: usize) -> Self {
        Self {
            tree: RbTree::with_compare_and_node_limit(compare, limit),
        }
    }

    /// Returns the number of entries, counting every value of every key.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the multimap contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Clears the multimap, removing all entries.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Exchanges the contents of two multimaps.
    pub fn swap(&mut self, other: &mut Self) {
        self.tree.swap(&mut other.tree);
    }

    /// Returns the entry with the minimum key, the earliest inserted one if the key repeats.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.tree.first().map(|(k, v)| (k, v))
    }

    /// Returns the entry with the maximum key, the latest inserted one if the key repeats.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.tree.last().map(|(k, v)| (k, v))
    }

    /// Removes and returns the first entry.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.tree.pop_first()
    }

    /// Removes and returns the last entry.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.tree.pop_last()
    }

    /// Gets an iterator over every entry, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.tree.iter(),
        }
    }

    /// Gets an iterator over the keys, one per entry.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys {
            inner: self.iter(),
        }
    }

    /// Gets an iterator over the values, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values {
            inner: self.iter(),
        }
    }
}

impl<K, V, C: Compare<K>> RbMultiMap<K, V, C> {
    /// Adds an entry after any entries with an equivalent key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Panics
    ///
    /// Panics if the multimap was built with a node limit that is already reached.
    pub fn insert(&mut self, key: K, value: V) {
        self.tree.insert_equal((key, value));
    }

    /// Like [`RbMultiMap::insert`], but reports a missing node slot instead of panicking.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if no node can be obtained. The multimap is unchanged.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<(), AllocError> {
        self.tree.try_insert_equal((key, value)).map(|_| ())
    }

    /// Returns the values stored under `key`, in the order they were inserted.
    ///
    /// # Complexity
    ///
    /// O(log n) to locate the run, then O(1) amortized per value.
    pub fn get_all<Q>(&self, key: &Q) -> GetAll<'_, K, V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        GetAll {
            inner: self.tree.range((Bound::Included(key), Bound::Included(key))),
        }
    }

    /// Returns the number of entries whose key is equivalent to `key`.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.count(key)
    }

    /// Returns `true` if at least one entry has a key equivalent to `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.contains(key)
    }

    /// Removes every entry under `key`, returning how many were removed.
    pub fn remove_all<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.erase_key(key)
    }

    /// Constructs a double-ended iterator over the entries whose keys fall in `range`.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`.
    pub fn range<Q, R>(&self, range: R) -> Range<'_, K, V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
        R: RangeBounds<Q>,
    {
        Range {
            inner: self.tree.range(range),
        }
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for RbMultiMap<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.tree.clone_from(&source.tree);
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for RbMultiMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C: Default> Default for RbMultiMap<K, V, C> {
    fn default() -> Self {
        Self::with_compare(C::default())
    }
}

impl<K: Hash, V: Hash, C> Hash for RbMultiMap<K, V, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tree.hash(state);
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for RbMultiMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<K: Eq, V: Eq, C> Eq for RbMultiMap<K, V, C> {}

impl<K: PartialOrd, V: PartialOrd, C> PartialOrd for RbMultiMap<K, V, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.tree.partial_cmp(&other.tree)
    }
}

impl<K: Ord, V: Ord, C> Ord for RbMultiMap<K, V, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tree.cmp(&other.tree)
    }
}

impl<K, V, C: Compare<K> + Default> FromIterator<(K, V)> for RbMultiMap<K, V, C> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, C: Compare<K>> Extend<(K, V)> for RbMultiMap<K, V, C> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        self.tree.insert_equal_iter(iter);
    }
}

impl<'a, K: Copy, V: Copy, C: Compare<K>> Extend<(&'a K, &'a V)> for RbMultiMap<K, V, C> {
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        self.tree.insert_equal_iter(iter.into_iter().map(|(&k, &v)| (k, v)));
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for RbMultiMap<K, V> {
    /// ```
    /// use rbtree_core::RbMultiMap;
    ///
    /// let map = RbMultiMap::from([(1, 'a'), (1, 'b')]);
    /// assert_eq!(map.count(&1), 2);
    /// ```
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, K, V, C> IntoIterator for &'a RbMultiMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K, V, C> IntoIterator for RbMultiMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        self.tree.into_iter()
    }
}

impl<'a, K: 'a, V: 'a> Iterator for GetAll<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }
}

impl<'a, K: 'a, V: 'a> DoubleEndedIterator for GetAll<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a V> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> FusedIterator for GetAll<'_, K, V> {}

impl<K, V> Clone for GetAll<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug> fmt::Debug for GetAll<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

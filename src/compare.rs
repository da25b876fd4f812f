//! Ordering predicates.
//!
//! A tree is parameterized by a strict weak ordering over its keys. Two keys are *equivalent* when
//! neither is less than the other; equivalence, not equality, decides whether a unique insertion
//! is rejected and which elements a lookup finds.

/// A strict weak ordering over `K`.
///
/// Implementations must be irreflexive (`!less(a, a)`), transitive, and have transitive
/// equivalence. Breaking these rules is a logic error: the tree stays memory-safe but lookups
/// and iteration order become unspecified.
///
/// # Examples
///
/// ```
/// use rbtree_core::{Compare, FnCompare, Greater, Less};
///
/// assert!(Less.less(&1, &2));
/// assert!(Greater.less(&2, &1));
///
/// let by_len = FnCompare(|a: &&str, b: &&str| a.len() < b.len());
/// assert!(by_len.equivalent(&"abc", &"xyz"));
/// ```
pub trait Compare<K: ?Sized> {
    /// Returns `true` if `a` is ordered strictly before `b`.
    fn less(&self, a: &K, b: &K) -> bool;

    /// Returns `true` if neither key is ordered before the other.
    #[inline]
    fn equivalent(&self, a: &K, b: &K) -> bool {
        !self.less(a, b) && !self.less(b, a)
    }
}

/// Ascending order by [`Ord`]. The default predicate of every container in this crate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Less;

impl<K: Ord + ?Sized> Compare<K> for Less {
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        a < b
    }
}

/// Descending order by [`Ord`].
///
/// ```
/// use rbtree_core::{Greater, RbSet};
///
/// let set: RbSet<i32, Greater> = [1, 3, 2].into_iter().collect();
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), [3, 2, 1]);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Greater;

impl<K: Ord + ?Sized> Compare<K> for Greater {
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        a > b
    }
}

/// Adapts a closure `Fn(&K, &K) -> bool` into a [`Compare`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FnCompare<F>(pub F);

impl<K: ?Sized, F> Compare<K> for FnCompare<F>
where
    F: Fn(&K, &K) -> bool,
{
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        (self.0)(a, b)
    }
}

use alloc::vec;
use core::fmt;
use core::iter::FusedIterator;

use crate::raw::{Handle, RawRbTree};

/// An iterator over the elements of an `RbTree`, in ascending order.
///
/// This `struct` is created by the [`iter`] method on [`RbTree`]. See its documentation for more.
///
/// [`iter`]: crate::RbTree::iter
/// [`RbTree`]: crate::RbTree
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T: 'a> {
    raw: &'a RawRbTree<T>,
    front: Handle,
    // One past the next element yielded from the back.
    back: Handle,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(raw: &'a RawRbTree<T>, front: Handle, back: Handle, remaining: usize) -> Self {
        Self {
            raw,
            front,
            back,
            remaining,
        }
    }
}

impl<'a, T: 'a> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let value = self.raw.value(self.front);
        self.front = self.raw.increment(self.front);
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }

    fn last(mut self) -> Option<&'a T> {
        self.next_back()
    }

    fn min(mut self) -> Option<&'a T>
    where
        &'a T: Ord,
    {
        self.next()
    }

    fn max(mut self) -> Option<&'a T>
    where
        &'a T: Ord,
    {
        self.next_back()
    }
}

impl<'a, T: 'a> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        self.back = self.raw.decrement(self.back);
        self.remaining -= 1;
        Some(self.raw.value(self.back))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// An iterator over a sub-range of elements of an `RbTree`.
///
/// This `struct` is created by the [`range`] method on [`RbTree`]. See its documentation for more.
///
/// [`range`]: crate::RbTree::range
/// [`RbTree`]: crate::RbTree
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, T: 'a> {
    raw: &'a RawRbTree<T>,
    // `[front, back)` in cursor order; empty once they meet.
    front: Handle,
    back: Handle,
}

impl<'a, T> Range<'a, T> {
    pub(crate) fn new(raw: &'a RawRbTree<T>, front: Handle, back: Handle) -> Self {
        Self {
            raw,
            front,
            back,
        }
    }
}

impl<'a, T: 'a> Iterator for Range<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }
        let value = self.raw.value(self.front);
        self.front = self.raw.increment(self.front);
        Some(value)
    }

    fn last(mut self) -> Option<&'a T> {
        self.next_back()
    }
}

impl<'a, T: 'a> DoubleEndedIterator for Range<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }
        self.back = self.raw.decrement(self.back);
        Some(self.raw.value(self.back))
    }
}

impl<T> FusedIterator for Range<'_, T> {}

impl<T> Clone for Range<'_, T> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw,
            front: self.front,
            back: self.back,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Range<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// An owning iterator over the elements of an `RbTree`, in ascending order.
///
/// This `struct` is created by the [`into_iter`] method on [`RbTree`] (provided by the
/// [`IntoIterator`] trait). See its documentation for more.
///
/// [`into_iter`]: crate::RbTree#method.into_iter
/// [`RbTree`]: crate::RbTree
pub struct IntoIter<T> {
    inner: vec::IntoIter<T>,
}

impl<T> IntoIter<T> {
    pub(crate) fn new(ordered: alloc::vec::Vec<T>) -> Self {
        Self {
            inner: ordered.into_iter(),
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Default for IntoIter<T> {
    fn default() -> Self {
        Self::new(alloc::vec::Vec::new())
    }
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.as_slice()).finish()
    }
}

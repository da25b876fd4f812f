use alloc::vec::Vec;

use super::handle::Handle;
use crate::error::AllocError;
use crate::tracing_helpers::warn_log;

/// Slot store handing out one fixed-size slot per node, recycling released slots first.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<Handle>,
    // Maximum number of live elements; never above `Handle::MAX + 1`.
    limit: usize,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            limit: Handle::MAX + 1,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            limit: Handle::MAX + 1,
        }
    }

    pub(crate) fn with_limit(limit: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            limit: limit.min(Handle::MAX + 1),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) const fn limit(&self) -> usize {
        self.limit
    }

    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Makes sure the next `additional` calls to [`Arena::alloc`] succeed without growing past the
    /// limit or hitting the global allocator.
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), AllocError> {
        let needed = self.len().checked_add(additional).ok_or(AllocError::CapacityOverflow)?;
        if needed > self.limit {
            warn_log!(needed, limit = self.limit, "node store refused to grow past its limit");
            return Err(AllocError::NodeLimit {
                limit: self.limit,
            });
        }

        let spare = self.free.len() + (self.slots.capacity() - self.slots.len());
        if additional > spare {
            self.slots.try_reserve(additional - self.free.len())?;
        }
        Ok(())
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        assert!(self.len() < self.limit, "`Arena::alloc()` - node limit ({}) reached", self.limit);
        if let Some(h) = self.free.pop() {
            // Reuse a free slot/handle.
            self.slots[h.to_index()] = Some(element);
            h
        } else {
            // Allocate a new slot/handle.
            self.slots.push(Some(element));
            Handle::from_index(self.slots.len() - 1)
        }
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()].as_ref().expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()].as_mut().expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    /// Returns mutable references to two distinct elements at once.
    pub(crate) fn get_pair_mut(&mut self, a: Handle, b: Handle) -> (&mut T, &mut T) {
        let (i, j) = (a.to_index(), b.to_index());
        assert_ne!(i, j, "`Arena::get_pair_mut()` - handles must differ!");
        let (low, high) = if i < j {
            (i, j)
        } else {
            (j, i)
        };
        let (head, tail) = self.slots.split_at_mut(high);
        let low_ref = head[low].as_mut().expect("`Arena::get_pair_mut()` - `handle` is invalid!");
        let high_ref = tail[0].as_mut().expect("`Arena::get_pair_mut()` - `handle` is invalid!");
        if i < j {
            (low_ref, high_ref)
        } else {
            (high_ref, low_ref)
        }
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let element = self.slots[handle.to_index()].take().expect("`Arena::take()` - `handle` is invalid!");
        self.free.push(handle);
        element
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

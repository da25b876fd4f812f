use super::handle::Handle;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Black,
}

/// Which child slot of a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Color and tree links shared by content nodes and the sentinel.
///
/// On the sentinel, `parent` is the root (the sentinel itself while the tree is empty) and
/// `left`/`right` cache the minimum/maximum node (again the sentinel itself while empty).
#[derive(Clone, Copy, Debug)]
pub(crate) struct Links {
    pub(crate) color: Color,
    pub(crate) parent: Handle,
    pub(crate) left: Option<Handle>,
    pub(crate) right: Option<Handle>,
}

impl Links {
    /// Links of a freshly created node: red and detached.
    pub(crate) const fn detached() -> Self {
        Self {
            color: Color::Red,
            parent: Handle::SENTINEL,
            left: None,
            right: None,
        }
    }

    /// Links of the sentinel of an empty tree.
    pub(crate) const fn empty_header() -> Self {
        Self {
            // Red marks the sentinel for `decrement`.
            color: Color::Red,
            parent: Handle::SENTINEL,
            left: Some(Handle::SENTINEL),
            right: Some(Handle::SENTINEL),
        }
    }

    #[inline]
    pub(crate) const fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, side: Side, child: Option<Handle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }
}

/// A content node: links plus the stored element.
#[derive(Clone)]
pub(crate) struct Node<T> {
    pub(crate) links: Links,
    pub(crate) value: T,
}

impl<T> Node<T> {
    pub(crate) const fn new(value: T) -> Self {
        Self {
            links: Links::detached(),
            value,
        }
    }
}

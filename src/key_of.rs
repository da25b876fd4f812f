//! Key projections: how a tree finds the ordering key inside a stored element.

/// Extracts the ordering key from an element of type `T`.
///
/// The projection is fixed per tree type, so it is a type parameter rather than a stored value.
/// Sets store bare keys and use [`Identity`]; maps store `(K, V)` pairs and use [`First`].
///
/// # Examples
///
/// ```
/// use rbtree_core::{RbTree, Second};
///
/// // Order `(name, score)` pairs by score.
/// let mut scores: RbTree<(&str, u32), Second> = RbTree::new();
/// scores.insert_equal(("carol", 92));
/// scores.insert_equal(("alice", 100));
/// scores.insert_equal(("bob", 85));
///
/// let names: Vec<_> = scores.iter().map(|(name, _)| *name).collect();
/// assert_eq!(names, ["bob", "carol", "alice"]);
/// ```
pub trait KeyOf<T> {
    /// The key type the tree orders by.
    type Key: ?Sized;

    /// Returns the key of `value`.
    fn key_of(value: &T) -> &Self::Key;
}

/// The element is its own key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Identity;

impl<T> KeyOf<T> for Identity {
    type Key = T;

    #[inline]
    fn key_of(value: &T) -> &T {
        value
    }
}

/// The first field of a pair is the key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct First;

impl<A, B> KeyOf<(A, B)> for First {
    type Key = A;

    #[inline]
    fn key_of(value: &(A, B)) -> &A {
        &value.0
    }
}

/// The second field of a pair is the key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Second;

impl<A, B> KeyOf<(A, B)> for Second {
    type Key = B;

    #[inline]
    fn key_of(value: &(A, B)) -> &B {
        &value.1
    }
}

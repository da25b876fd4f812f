use alloc::collections::TryReserveError;
use core::fmt;

/// The error returned when the node store cannot provide a slot for a new node.
///
/// A failed insertion never modifies the tree: the node is only linked in after its slot has been
/// secured.
///
/// # Examples
///
/// ```
/// use rbtree_core::{AllocError, RbSet};
///
/// let mut set = RbSet::with_node_limit(1);
/// assert_eq!(set.try_insert(1), Ok(true));
/// assert_eq!(set.try_insert(2), Err(AllocError::NodeLimit { limit: 1 }));
/// assert_eq!(set.len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum AllocError {
    /// The requested number of nodes exceeds what a node handle can address.
    CapacityOverflow,
    /// The tree was built with a node limit and every permitted node is in use.
    NodeLimit {
        /// The configured maximum number of nodes.
        limit: usize,
    },
    /// The global allocator refused to grow the node store.
    Reserve(TryReserveError),
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::CapacityOverflow => f.write_str("node count exceeds the addressable maximum"),
            AllocError::NodeLimit {
                limit,
            } => write!(f, "node limit of {limit} reached"),
            AllocError::Reserve(err) => write!(f, "node store allocation failed: {err}"),
        }
    }
}

impl core::error::Error for AllocError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            AllocError::Reserve(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TryReserveError> for AllocError {
    fn from(err: TryReserveError) -> Self {
        AllocError::Reserve(err)
    }
}

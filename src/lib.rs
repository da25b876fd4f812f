//! Red-black tree collections for Rust.
//!
//! This crate provides one balanced-tree engine, [`RbTree`], and four ordered containers built on
//! it:
//!
//! - [`RbSet`] - unique elements
//! - [`RbMultiSet`] - elements that may repeat
//! - [`RbMap`] - key-value pairs with unique keys
//! - [`RbMultiMap`] - key-value pairs whose keys may repeat
//!
//! Every container is parameterized by a strict weak ordering ([`Compare`]), ascending [`Ord`]
//! ([`Less`]) unless another is given. Elements that compare equivalent are kept next to each
//! other in the order they were inserted.
//!
//! # Example
//!
//! ```
//! use rbtree_core::{Greater, RbMap, RbMultiSet};
//!
//! let mut scores = RbMap::with_compare(Greater);
//! scores.insert(100, "Alice");
//! scores.insert(85, "Bob");
//! scores.insert(92, "Carol");
//!
//! // Highest score first
//! assert_eq!(scores.first_key_value(), Some((&100, &"Alice")));
//! assert_eq!(scores.values().copied().collect::<Vec<_>>(), ["Alice", "Carol", "Bob"]);
//!
//! let mut words: RbMultiSet<&str> = RbMultiSet::new();
//! words.extend(["tree", "red", "tree", "black"]);
//! assert_eq!(words.count("tree"), 2);
//! ```
//!
//! # Cursors
//!
//! [`RbTree`] exposes positions as [`Cursor`] tokens. The past-the-end position
//! ([`RbTree::end`]) closes the ring: stepping forward from the last element reaches it, and
//! stepping back from the first element does too.
//!
//! ```
//! use rbtree_core::RbTree;
//!
//! let mut tree: RbTree<i32> = [5, 1, 3].into_iter().collect();
//! let at = tree.find(&3);
//! let next = tree.erase(at);
//! assert_eq!(tree.get(next), Some(&5));
//! assert_eq!(tree.decrement(tree.begin()), tree.end());
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Fallible insertion** - `try_insert` reports [`AllocError`] instead of panicking, and
//!   leaves the container untouched
//! - **`tracing`** - Emits rebalancing and bulk-operation events through the `tracing` crate
//!
//! # Implementation
//!
//! Nodes live in a contiguous arena and link to each other through 32-bit handles, so the crate
//! is free of `unsafe`. A header record outside the arena holds the root and caches the minimum
//! and maximum nodes, which makes `first`, `last` and `begin` O(1).

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod tracing_helpers;

mod cursor;
mod error;
mod raw;

pub mod compare;
pub mod key_of;
pub mod rb_map;
pub mod rb_multimap;
pub mod rb_multiset;
pub mod rb_set;
pub mod rb_tree;

pub use compare::{Compare, FnCompare, Greater, Less};
pub use cursor::Cursor;
pub use error::AllocError;
pub use key_of::{First, Identity, KeyOf, Second};
pub use rb_map::RbMap;
pub use rb_multimap::RbMultiMap;
pub use rb_multiset::RbMultiSet;
pub use rb_set::RbSet;
pub use rb_tree::RbTree;

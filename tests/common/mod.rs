//! Common test utilities with tracing setup.
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//!
//! #[test]
//! fn my_test() {
//!     common::init_tracing();
//!     // ... test code
//! }
//! ```
//!
//! Structural events (rotations, fix-up cases, bulk erases) are only emitted when the crate is
//! built with the `tracing` feature:
//!
//! ```bash
//! RUST_LOG=rbtree_core=trace cargo test --features tracing -- --nocapture
//! ```

#![allow(dead_code)]

use std::sync::Once;

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Ensures tracing is only initialized once across all tests.
static INIT: Once = Once::new();

/// Default level when `RUST_LOG` is not set.
const DEFAULT_LEVEL: Level = Level::WARN;

/// Initialize the tracing subscriber with console logging routed through the test harness.
///
/// Safe to call multiple times - only the first call takes effect.
pub fn init_tracing() {
    INIT.call_once(|| {
        // Another harness may already have installed a global subscriber.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(make_filter(DEFAULT_LEVEL))
            .with_test_writer()
            .with_target(true)
            .compact()
            .try_init();
    });
}

/// Create an EnvFilter from RUST_LOG or use default level.
fn make_filter(default_level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("{default_level}")))
}

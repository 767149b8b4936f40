//! Memoization Module
//!
//! Caches the results of a callable through an [`LruCache`](crate::LruCache),
//! keyed by a hash of the call's arguments.

mod args;
mod hash;
mod memoized;

pub use args::CallArgs;
pub use hash::{HashStrategy, PlainHash, TypedHash};
pub use memoized::{Memoize, Memoized};

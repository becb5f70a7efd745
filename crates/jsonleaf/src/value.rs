//! The parsed tree representation.
//!
//! Trees are plain [`serde_json::Value`]s built with insertion-ordered maps, so
//! serialization writes object keys back in the order they were read or
//! inserted. Lookups do not depend on that order.

/// A parsed JSON value of any kind.
pub type Tree = serde_json::Value;

/// The key/value map held by an object [`Tree`].
pub type Map = serde_json::Map<String, Tree>;

//! Typed extraction of scalar leaves.
//!
//! Extraction only runs on a node that exists. What happens when the node has
//! a different kind than requested depends on the target type:
//!
//! | target   | matching node            | any other node |
//! |----------|--------------------------|----------------|
//! | `String` | the text                 | absent         |
//! | `i32`    | integral part            | `0`            |
//! | `f64`    | the number               | `0.0`          |
//! | `bool`   | the boolean              | `false`        |
//!
//! Text is the only kind where a mismatch reads as "not found". The numeric
//! and boolean targets always produce a value once the node exists. Callers
//! porting code that expects a type error on mismatch should check the node
//! kind through [`Document::object_node`](crate::Document::object_node) first.

use crate::Tree;

/// A scalar that can be read off an existing tree node.
pub trait Leaf: Sized {
    /// Converts `node`, or returns `None` when the node counts as absent for
    /// this type.
    fn from_node(node: &Tree) -> Option<Self>;
}

impl Leaf for String {
    fn from_node(node: &Tree) -> Option<Self> {
        node.as_str().map(str::to_owned)
    }
}

impl Leaf for i32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn from_node(node: &Tree) -> Option<Self> {
        let Tree::Number(n) = node else {
            return Some(0);
        };
        // Out-of-range integers keep their low 32 bits; doubles truncate
        // toward zero and saturate.
        let value = if let Some(i) = n.as_i64() {
            i as i32
        } else if let Some(u) = n.as_u64() {
            u as i32
        } else {
            n.as_f64().map_or(0, |f| f as i32)
        };
        Some(value)
    }
}

impl Leaf for f64 {
    fn from_node(node: &Tree) -> Option<Self> {
        Some(node.as_f64().unwrap_or(0.0))
    }
}

impl Leaf for bool {
    fn from_node(node: &Tree) -> Option<Self> {
        Some(node.as_bool().unwrap_or(false))
    }
}

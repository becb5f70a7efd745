//! Re-readable JSON documents.
//!
//! A [`Document`] wraps any [`ByteSource`], parses it once on first
//! structural access, and offers JSON Pointer navigation ([`Document::at`])
//! plus typed leaf extraction ([`Document::leaf`], [`Document::leaf_as_int`],
//! ...). Absent nodes are represented by a missing document rather than an
//! error, and [`Builder`] assembles new objects field by field.
//!
//! ```rust
//! use jsonleaf::{Builder, Document};
//!
//! let mut nereid = Builder::new();
//! nereid.with("hair", "red").with("age", 77.5);
//!
//! let mut ocean = Builder::new();
//! ocean.with("rock1", Builder::new().with("nereid2", &nereid));
//!
//! let doc = ocean.into_document();
//! let rock = doc.at("/rock1/nereid2").unwrap();
//! assert_eq!(rock.leaf("hair").unwrap(), "red");
//! assert_eq!(doc.leaf_as_int("/rock1/nereid2/age").unwrap(), 77);
//! assert!(doc.at("/rock2").unwrap().is_missing().unwrap());
//! ```

mod builder;
mod document;
mod engine;
mod error;
mod leaf;
mod options;
mod source;
mod value;


pub use builder::Builder;
pub use document::{Document, Lookup};
pub use error::{Error, Result};
pub use leaf::Leaf;
pub use options::{LineEnding, PrettyOptions};
pub use source::{ByteSource, FileSource, Literal, Missing, StreamSource};
pub use value::{Map, Tree};
